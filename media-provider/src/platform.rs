//! Default provider for the current operating system

use std::path::Path;

use crate::provider::Provider;

/// Helper executable sampled on Windows
///
/// Looked up next to the running executable first; when it is not there the
/// bare name is spawned, which searches the working directory and `PATH`.
pub const WINDOWS_HELPER: &str = "winmedia_helper.exe";

/// Name of the backend family [`default_provider`] selects
pub fn platform_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "apple-script"
    } else if cfg!(target_os = "windows") {
        "windows-helper"
    } else if cfg!(all(target_os = "linux", feature = "mpris")) {
        "mpris"
    } else {
        "idle"
    }
}

/// Build the provider for this platform
///
/// Platforms without a backend get an [`IdleProvider`](crate::IdleProvider)
/// that never reports anything playing.
pub fn default_provider() -> Box<dyn Provider> {
    platform_provider()
}

#[cfg(target_os = "macos")]
fn platform_provider() -> Box<dyn Provider> {
    Box::new(crate::apple_script::apple_script_provider())
}

#[cfg(target_os = "windows")]
fn platform_provider() -> Box<dyn Provider> {
    use crate::helper::{HelperCommand, HelperProvider};
    use crate::protocol::FieldLayout;

    let exe = std::env::current_exe().ok();
    let helper = helper_beside(exe.as_deref(), WINDOWS_HELPER);

    Box::new(
        HelperProvider::new("windows", HelperCommand::new(helper)).with_layout(FieldLayout::Basic),
    )
}

/// `helper` in the directory of `exe` if present there, else the bare name
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn helper_beside(exe: Option<&Path>, helper: &str) -> String {
    exe.and_then(Path::parent)
        .map(|dir| dir.join(helper))
        .filter(|path| path.exists())
        .map(|path| path.to_string_lossy().into_owned())
        .unwrap_or_else(|| helper.to_string())
}

#[cfg(all(target_os = "linux", feature = "mpris"))]
fn platform_provider() -> Box<dyn Provider> {
    Box::new(crate::mpris_backend::MprisProvider::new())
}

#[cfg(not(any(
    target_os = "macos",
    target_os = "windows",
    all(target_os = "linux", feature = "mpris")
)))]
fn platform_provider() -> Box<dyn Provider> {
    Box::new(crate::provider::IdleProvider::new())
}
