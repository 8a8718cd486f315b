//! Lifecycle controller wiring provider, sampler, store and broadcaster
//!
//! A [`MediaListener`] is an explicitly constructed service object: created
//! by [`MediaListener::start`], handed to transport code by reference (or in
//! an `Arc`), torn down by [`MediaListener::stop`] or on drop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use media_provider::{ControlCommand, ControlError, MediaState, Provider};
use parking_lot::Mutex;
use state_store::{Broadcaster, StateReader, Subscription};
use tracing::{debug, error, info, warn};

use crate::config::ListenerConfig;
use crate::error::Result;
use crate::event::ChangeEvent;
use crate::sampler::{spawn_sampler, Sampler, SamplerCommand};

struct Worker {
    commands: mpsc::Sender<SamplerCommand>,
    handle: JoinHandle<()>,
}

/// Running media listener
///
/// # Example
///
/// ```rust,no_run
/// use media_listener::{ChangeEvent, ListenerConfig, MediaListener};
/// use media_provider::default_provider;
///
/// let listener = MediaListener::start(default_provider(), ListenerConfig::default())?;
///
/// // Initial state comes from the store, later changes from the mailbox
/// let (current, subscription) = listener.subscribe_with_current();
/// println!("now: {:?}", current);
///
/// for event in subscription {
///     match event {
///         ChangeEvent::NewSnapshot(snapshot) => println!("playing {:?}", snapshot.title()),
///         ChangeEvent::Stopped => println!("stopped"),
///     }
/// }
/// # Ok::<(), media_listener::ListenerError>(())
/// ```
pub struct MediaListener {
    provider: Arc<dyn Provider>,
    reader: StateReader<MediaState>,
    broadcaster: Broadcaster<ChangeEvent>,
    config: ListenerConfig,
    running: AtomicBool,
    worker: Mutex<Option<Worker>>,
}

impl MediaListener {
    /// Start sampling `provider` in the background
    ///
    /// The store starts as `Absent` with no subscribers; the first sample is
    /// taken immediately.
    pub fn start<P>(provider: P, config: ListenerConfig) -> Result<Self>
    where
        P: Provider + 'static,
    {
        config.validate()?;

        let provider: Arc<dyn Provider> = Arc::new(provider);
        let broadcaster = Broadcaster::new(config.mailbox_capacity);
        let sampler = Sampler::new(Arc::clone(&provider), broadcaster.clone());
        let reader = sampler.reader();

        let (commands, command_rx) = mpsc::channel();
        let handle = spawn_sampler(sampler, config.poll_interval, command_rx)?;

        info!(
            provider = provider.name(),
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            mailbox_capacity = config.mailbox_capacity,
            "media listener started"
        );

        Ok(Self {
            provider,
            reader,
            broadcaster,
            config,
            running: AtomicBool::new(true),
            worker: Mutex::new(Some(Worker { commands, handle })),
        })
    }

    /// Stop sampling and close every subscription
    ///
    /// The sampler finishes its current tick before exiting. Safe to call
    /// any number of times; calls after the first do nothing.
    pub fn stop(&self) {
        let mut worker = self.worker.lock();
        let Some(Worker { commands, handle }) = worker.take() else {
            debug!("media listener already stopped");
            return;
        };
        self.running.store(false, Ordering::SeqCst);

        // A send error means the worker already exited
        let _ = commands.send(SamplerCommand::Shutdown);
        if handle.join().is_err() {
            error!("sampler thread panicked");
        }

        self.broadcaster.shutdown();
        self.provider.shutdown();
        info!("media listener stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current media state, without blocking on the sampler
    pub fn current(&self) -> Arc<MediaState> {
        self.reader.get()
    }

    /// Read handle on the current state, usable independently of the listener
    pub fn reader(&self) -> StateReader<MediaState> {
        self.reader.clone()
    }

    /// Subscribe to changes published after this call
    ///
    /// After [`stop`](Self::stop) the returned subscription is already closed.
    pub fn subscribe(&self) -> Subscription<ChangeEvent> {
        self.broadcaster.subscribe()
    }

    /// Subscribe and read the current state
    ///
    /// The mailbox is registered before the read, so no change can slip
    /// between the two. A change racing the call may show up both as the
    /// returned state and as the first event.
    pub fn subscribe_with_current(&self) -> (Arc<MediaState>, Subscription<ChangeEvent>) {
        let subscription = self.subscribe();
        (self.current(), subscription)
    }

    /// Forward a playback command to the provider
    ///
    /// Never touches the stored state. Fails with
    /// [`ControlError::Unavailable`] once the listener is stopped.
    pub fn control(&self, command: ControlCommand) -> std::result::Result<(), ControlError> {
        if !self.is_running() {
            return Err(ControlError::Unavailable);
        }

        match self.provider.control(command) {
            Ok(()) => {
                info!(%command, "executed control command");
                Ok(())
            }
            Err(e) => {
                warn!(%command, error = %e, "control command failed");
                Err(e)
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }
}

impl Drop for MediaListener {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for MediaListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaListener")
            .field("provider", &self.provider.name())
            .field("running", &self.is_running())
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}
