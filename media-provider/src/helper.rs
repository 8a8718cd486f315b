//! Backend that shells out to an external helper program
//!
//! Each sample runs the helper once and parses its stdout with the
//! [`protocol`](crate::protocol) line format. Control commands are optional
//! extra invocations, one per [`ControlCommand`].
//!
//! Helpers are bounded by a timeout; a helper that hangs, or leaves a
//! background process holding its output open, is killed and the sample
//! reported as `Absent`.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::command::ControlCommand;
use crate::error::ControlError;
use crate::model::MediaState;
use crate::protocol::{parse_output, FieldLayout};
use crate::provider::Provider;

/// Default upper bound for a single helper invocation
pub const DEFAULT_HELPER_TIMEOUT: Duration = Duration::from_secs(2);

const WAIT_STEP: Duration = Duration::from_millis(10);

/// Errors from running a helper program
#[derive(Error, Debug)]
pub enum HelperError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    #[error("{command} exited with {status}")]
    Failed { command: String, status: ExitStatus },

    #[error("failed to read helper output: {0}")]
    Io(#[from] io::Error),
}

/// Program plus arguments, run without a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperCommand {
    program: String,
    args: Vec<String>,
}

impl HelperCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    /// Run to completion and return stdout
    ///
    /// The whole invocation is bounded by `timeout`: the process must exit
    /// and its stdout must reach end-of-file before the deadline. Stdout is
    /// read on a separate thread so a chatty helper cannot block on a full
    /// pipe while we wait for it to exit.
    ///
    /// On unix the helper leads its own process group, and a timeout kills
    /// the whole group, including background processes it left behind.
    pub fn run(&self, timeout: Duration) -> Result<String, HelperError> {
        let mut command = self.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|source| HelperError::Spawn {
            command: self.to_string(),
            source,
        })?;

        let (output_tx, output_rx) = mpsc::channel();
        let stdout = child.stdout.take();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let result = match stdout {
                Some(mut stdout) => stdout.read_to_end(&mut buf).map(|_| buf),
                None => Ok(buf),
            };
            let _ = output_tx.send(result);
        });

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    terminate(&mut child);
                    return Err(e.into());
                }
            }
            if Instant::now() >= deadline {
                terminate(&mut child);
                return Err(self.timed_out(timeout));
            }
            thread::sleep(WAIT_STEP);
        };

        if !status.success() {
            return Err(HelperError::Failed {
                command: self.to_string(),
                status,
            });
        }

        // A background process may still hold the pipe open
        let remaining = deadline.saturating_duration_since(Instant::now());
        match output_rx.recv_timeout(remaining) {
            Ok(output) => Ok(String::from_utf8_lossy(&output?).into_owned()),
            Err(RecvTimeoutError::Timeout) => {
                kill_process_group(&child);
                Err(self.timed_out(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(io::Error::other("output reader panicked").into())
            }
        }
    }

    fn timed_out(&self, timeout: Duration) -> HelperError {
        HelperError::TimedOut {
            command: self.to_string(),
            timeout,
        }
    }
}

/// Kill and reap a helper that is still running
fn terminate(child: &mut Child) {
    kill_process_group(child);
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(unix)]
fn kill_process_group(child: &Child) {
    let Ok(group) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: kill(2) only delivers a signal; a negative pid addresses the
    // process group the helper was started in.
    unsafe {
        libc::kill(-group, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

impl fmt::Display for HelperCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains('\n') {
                f.write_str(" <script>")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Provider backed by an external helper program
///
/// # Example
///
/// ```rust,no_run
/// use media_provider::{FieldLayout, HelperCommand, HelperProvider, Provider};
///
/// let provider = HelperProvider::new("windows", HelperCommand::new("nowplaying.exe"))
///     .with_layout(FieldLayout::Basic);
///
/// println!("{:?}", provider.sample());
/// ```
#[derive(Debug, Clone)]
pub struct HelperProvider {
    name: String,
    sample_command: HelperCommand,
    layout: FieldLayout,
    timeout: Duration,
    controls: HashMap<ControlCommand, HelperCommand>,
}

impl HelperProvider {
    pub fn new(name: impl Into<String>, sample_command: HelperCommand) -> Self {
        Self {
            name: name.into(),
            sample_command,
            layout: FieldLayout::default(),
            timeout: DEFAULT_HELPER_TIMEOUT,
            controls: HashMap::new(),
        }
    }

    pub fn with_layout(mut self, layout: FieldLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register the invocation that executes `command`
    pub fn with_control(mut self, command: ControlCommand, invocation: HelperCommand) -> Self {
        self.controls.insert(command, invocation);
        self
    }

    pub fn layout(&self) -> FieldLayout {
        self.layout
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn supports(&self, command: ControlCommand) -> bool {
        self.controls.contains_key(&command)
    }
}

impl Provider for HelperProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&self) -> MediaState {
        match self.sample_command.run(self.timeout) {
            Ok(output) => parse_output(&output, self.layout, &self.name),
            Err(e) => {
                debug!(backend = %self.name, error = %e, "helper sample failed");
                MediaState::Absent
            }
        }
    }

    fn control(&self, command: ControlCommand) -> Result<(), ControlError> {
        let invocation =
            self.controls
                .get(&command)
                .ok_or_else(|| ControlError::Unsupported {
                    backend: self.name.clone(),
                    command,
                })?;

        invocation.run(self.timeout).map(|_| ()).map_err(|e| {
            warn!(backend = %self.name, %command, error = %e, "helper control failed");
            ControlError::rejected(&self.name, command, e)
        })
    }
}
