//! Periodic sampling loop
//!
//! The [`Sampler`] is the only writer of the current state. Each tick asks
//! the provider for a sample, swaps it into the store when it differs from
//! the current value and publishes the resulting [`ChangeEvent`].
//!
//! The background worker runs ticks strictly one after another on a
//! dedicated thread. It waits for the poll interval (measured from the start
//! of the previous tick) on its command channel, so a shutdown request is
//! noticed at the next tick boundary without interrupting a sample.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use media_provider::{MediaState, Provider};
use state_store::{Broadcaster, StateReader, StateStore};
use tracing::{debug, error, info, trace};

use crate::event::ChangeEvent;

/// Commands accepted by the sampler worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SamplerCommand {
    Shutdown,
}

/// Change detector owning the single writable state store
pub struct Sampler {
    provider: Arc<dyn Provider>,
    store: StateStore<MediaState>,
    broadcaster: Broadcaster<ChangeEvent>,
}

impl Sampler {
    /// Create a sampler starting from `Absent`
    pub fn new(provider: Arc<dyn Provider>, broadcaster: Broadcaster<ChangeEvent>) -> Self {
        Self {
            provider,
            store: StateStore::new(MediaState::Absent),
            broadcaster,
        }
    }

    /// Read handle on the state this sampler writes
    pub fn reader(&self) -> StateReader<MediaState> {
        self.store.reader()
    }

    /// Run one poll step
    ///
    /// Returns the event that was published, if the state changed.
    pub fn tick(&mut self) -> Option<ChangeEvent> {
        let sample = self.sample();
        let previous = self.store.replace_if_changed(sample)?;
        let event = ChangeEvent::between(&previous, &self.store.get())?;

        let report = self.broadcaster.publish(event.clone());
        debug!(
            event = ?event,
            delivered = report.delivered,
            dropped = report.dropped,
            "published media change"
        );

        Some(event)
    }

    fn sample(&self) -> MediaState {
        match panic::catch_unwind(AssertUnwindSafe(|| self.provider.sample())) {
            Ok(state) => state,
            Err(payload) => {
                error!(
                    provider = self.provider.name(),
                    panic = panic_message(payload.as_ref()),
                    "provider panicked while sampling, treating as nothing playing"
                );
                MediaState::Absent
            }
        }
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("provider", &self.provider.name())
            .field("current", &self.store.get())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Spawns the sampler worker thread
///
/// The worker ticks immediately, then once per `interval` until it receives
/// [`SamplerCommand::Shutdown`] or the command channel is dropped. A tick that
/// overruns the interval is followed directly by the next one.
pub(crate) fn spawn_sampler(
    mut sampler: Sampler,
    interval: Duration,
    commands: mpsc::Receiver<SamplerCommand>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("media-sampler".to_string())
        .spawn(move || {
            info!(
                provider = sampler.provider.name(),
                interval_ms = interval.as_millis() as u64,
                "sampler started"
            );

            loop {
                let started = Instant::now();
                sampler.tick();
                trace!(elapsed = ?started.elapsed(), "tick finished");

                let remaining = interval.saturating_sub(started.elapsed());
                match commands.recv_timeout(remaining) {
                    Ok(SamplerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }

            info!("sampler stopped");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_provider::testing::{playing, ScriptedProvider};
    use media_provider::{ControlCommand, ControlError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sampler_with(provider: Arc<dyn Provider>) -> (Sampler, Broadcaster<ChangeEvent>) {
        let broadcaster = Broadcaster::new(5);
        (Sampler::new(provider, broadcaster.clone()), broadcaster)
    }

    #[test]
    fn test_identical_samples_publish_once() {
        let provider = Arc::new(ScriptedProvider::with_script([
            playing("A", "x", "y"),
            playing("A", "x", "y"),
        ]));
        let (mut sampler, broadcaster) = sampler_with(provider);
        let sub = broadcaster.subscribe();
        let reader = sampler.reader();

        assert!(sampler.tick().is_some());
        let after_first = reader.get();
        assert!(sampler.tick().is_none());

        // Store untouched by the identical sample
        assert!(Arc::ptr_eq(&after_first, &reader.get()));
        assert_eq!(sub.try_iter().count(), 1);
    }

    #[test]
    fn test_absent_to_absent_is_silent() {
        let provider = Arc::new(ScriptedProvider::new());
        let (mut sampler, broadcaster) = sampler_with(provider);
        let sub = broadcaster.subscribe();

        assert_eq!(sampler.tick(), None);
        assert_eq!(sampler.tick(), None);
        assert!(sub.try_recv().is_err());
    }

    struct Panicking;

    impl Provider for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn sample(&self) -> MediaState {
            panic!("backend exploded");
        }

        fn control(&self, _command: ControlCommand) -> Result<(), ControlError> {
            Err(ControlError::NoActiveBackend)
        }
    }

    #[test]
    fn test_provider_panic_is_absent() {
        let (mut sampler, _broadcaster) = sampler_with(Arc::new(Panicking));
        assert_eq!(sampler.tick(), None);
        assert_eq!(*sampler.reader().get(), MediaState::Absent);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_worker_stops_on_shutdown_command() {
        let provider = Arc::new(ScriptedProvider::constant(playing("A", "x", "y")));
        let (sampler, broadcaster) = sampler_with(provider.clone());
        let sub = broadcaster.subscribe();
        let (tx, rx) = mpsc::channel();

        let handle = spawn_sampler(sampler, Duration::from_millis(10), rx).unwrap();

        // First tick is immediate
        assert!(sub.recv_timeout(Duration::from_secs(1)).is_some());

        tx.send(SamplerCommand::Shutdown).unwrap();
        handle.join().unwrap();
        assert!(provider.sample_count() >= 1);
    }

    #[test]
    fn test_worker_stops_when_commands_dropped() {
        let provider = Arc::new(ScriptedProvider::new());
        let (sampler, _broadcaster) = sampler_with(provider);
        let (tx, rx) = mpsc::channel::<SamplerCommand>();

        let handle = spawn_sampler(sampler, Duration::from_secs(60), rx).unwrap();
        drop(tx);
        handle.join().unwrap();
    }

    /// Sleeps through every sample and records how many overlap
    struct Slow {
        delay: Duration,
        active: AtomicUsize,
        max_active: AtomicUsize,
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl Slow {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
                started: AtomicUsize::new(0),
                finished: AtomicUsize::new(0),
            }
        }
    }

    impl Provider for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        fn sample(&self) -> MediaState {
            self.started.fetch_add(1, Ordering::SeqCst);
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);

            thread::sleep(self.delay);

            self.active.fetch_sub(1, Ordering::SeqCst);
            self.finished.fetch_add(1, Ordering::SeqCst);
            MediaState::Absent
        }

        fn control(&self, _command: ControlCommand) -> Result<(), ControlError> {
            Ok(())
        }
    }

    #[test]
    fn test_overrunning_sample_delays_next_tick() {
        let provider = Arc::new(Slow::new(Duration::from_millis(30)));
        let (sampler, _broadcaster) = sampler_with(provider.clone());
        let (tx, rx) = mpsc::channel();

        let started = Instant::now();
        let handle = spawn_sampler(sampler, Duration::from_millis(5), rx).unwrap();
        thread::sleep(Duration::from_millis(200));
        tx.send(SamplerCommand::Shutdown).unwrap();
        handle.join().unwrap();
        let elapsed = started.elapsed();

        let samples = provider.started.load(Ordering::SeqCst);
        assert_eq!(provider.max_active.load(Ordering::SeqCst), 1);
        // Overruns are followed directly by the next tick
        assert!(samples >= 2, "only {samples} samples");
        // Serial ticks cannot outnumber what fits back to back
        assert!(samples as u128 <= elapsed.as_millis() / 30 + 1);
    }

    #[test]
    fn test_shutdown_waits_for_sample_in_flight() {
        let provider = Arc::new(Slow::new(Duration::from_millis(200)));
        let (sampler, _broadcaster) = sampler_with(provider.clone());
        let (tx, rx) = mpsc::channel();

        let handle = spawn_sampler(sampler, Duration::from_millis(10), rx).unwrap();

        let deadline = Instant::now() + Duration::from_secs(1);
        while provider.active.load(Ordering::SeqCst) == 0 {
            assert!(Instant::now() < deadline, "sample never started");
            thread::sleep(Duration::from_millis(1));
        }

        tx.send(SamplerCommand::Shutdown).unwrap();
        handle.join().unwrap();

        assert_eq!(provider.active.load(Ordering::SeqCst), 0);
        assert_eq!(
            provider.started.load(Ordering::SeqCst),
            provider.finished.load(Ordering::SeqCst)
        );
        // Shutdown is taken at the boundary, before another tick starts
        assert_eq!(provider.started.load(Ordering::SeqCst), 1);
    }
}
