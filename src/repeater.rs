use std::{
    fmt,
    future::Future,
    sync::Arc,
    time::{Duration, SystemTime},
};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{condition::StopCondition, delay::IntoDelay, state::Shared, Status};

/// Boxed error returned by a failing action invocation.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Repeats an action with a fixed delay between calls.
///
/// Built by [`crate::repeat`]. Configure the delay with [`Self::every`],
/// then drive it with one of [`Self::repeat`], [`Self::until`] or
/// [`Self::infinite`]. One instance can be driven several times; each
/// driver call starts a fresh run with fresh counters and timestamps, and
/// the configured delay carries over.
pub struct Repeater<F> {
    action: F,
    delay: Option<Duration>,
    shared: Arc<Shared>,
}

impl<F> Repeater<F> {
    pub fn new(action: F) -> Self {
        Self {
            action,
            delay: None,
            shared: Arc::new(Shared::new()),
        }
    }

    /// Configure the delay applied before every action call, the first one
    /// included.
    ///
    /// Takes milliseconds, a [`Duration`], or a suffixed string ("500ms",
    /// "2s", "1m"). A string that does not parse leaves the current delay
    /// unchanged. Call this before a driver to affect that run.
    pub fn every(&mut self, delay: impl IntoDelay) -> &mut Self {
        if let Some(delay) = delay.into_delay() {
            self.delay = Some(delay);
        }
        self
    }

    /// Run the action exactly `count` times, with call indices 1..=count.
    ///
    /// Resolves once the last call has finished. `count == 0` performs no
    /// calls but still runs through a complete lifecycle. An `Err` from the
    /// action aborts the run: the error is returned, no end date or run
    /// time is recorded, and the call counter is left at the failing index.
    pub async fn repeat<Fut>(&mut self, count: u64) -> Result<&mut Self, ActionFailed>
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = Result<(), ActionError>>,
    {
        debug!(count, "starting counted run");
        self.shared.begin_run();

        for _ in 0..count {
            if let Some(delay) = self.delay {
                sleep(delay).await;
            }
            let call = self.shared.bump_calls();
            (self.action)(call)
                .await
                .map_err(|source| ActionFailed { call, source })?;
        }

        self.shared.finish_run();
        Ok(self)
    }

    /// Run the action until `condition` is met.
    ///
    /// The condition is checked after each call with the running call
    /// count, so the action always runs at least once and is never called
    /// again after the condition first holds. A condition that never holds
    /// never resolves. Action errors abort the run as in [`Self::repeat`].
    pub async fn until<Fut>(
        &mut self,
        mut condition: impl StopCondition,
    ) -> Result<&mut Self, ActionFailed>
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = Result<(), ActionError>>,
    {
        debug!("starting conditional run");
        self.shared.begin_run();

        loop {
            if let Some(delay) = self.delay {
                sleep(delay).await;
            }
            let call = self.shared.bump_calls();
            (self.action)(call)
                .await
                .map_err(|source| ActionFailed { call, source })?;
            if condition.is_met(call) {
                break;
            }
        }

        self.shared.finish_run();
        Ok(self)
    }

    /// Run the action in a background task until [`Self::stop`] is called.
    ///
    /// Returns immediately; the instance is a handle to the spawned loop,
    /// not the loop itself. Starting any driver afterwards supersedes the
    /// loop, which exits at its next tick. An `Err` from the action ends
    /// the loop with a warning and without completion bookkeeping.
    pub fn infinite<Fut>(&mut self) -> &mut Self
    where
        F: FnMut(u64) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        debug!("starting background run");
        let token = self.shared.begin_run();
        let shared = Arc::clone(&self.shared);
        let action = self.action.clone();
        let delay = self.delay;

        tokio::spawn(run_loop(action, delay, shared, token));

        self
    }

    /// Stop a background run.
    ///
    /// Cancels the loop and performs completion bookkeeping right away, so
    /// status reads complete while the loop may still be sleeping out its
    /// last delay. That delay elapses in full; the action for that tick is
    /// skipped.
    pub fn stop(&mut self) -> &mut Self {
        debug!("stop requested");
        self.shared.request_stop();
        self
    }

    /// Current lifecycle position.
    pub fn status(&self) -> Status {
        self.shared.status()
    }

    /// Calls made in the current run; 0 once a run completes.
    pub fn call_count(&self) -> u64 {
        self.shared.calls()
    }

    /// The configured delay, if any.
    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    /// Wall-clock start of the most recent run.
    pub fn start_date(&self) -> Option<SystemTime> {
        self.shared.start_date()
    }

    /// Wall-clock end of the most recent completed run.
    pub fn end_date(&self) -> Option<SystemTime> {
        self.shared.end_date()
    }

    /// Duration of the most recent completed run.
    pub fn run_time(&self) -> Option<Duration> {
        self.shared.run_time()
    }
}

impl<F> fmt::Debug for Repeater<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repeater")
            .field("status", &self.status())
            .field("delay", &self.delay)
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

/// Tick order: bump the counter, wait the delay, then check for a stop
/// before invoking. A stop that lands during the delay lets the delay
/// elapse and skips that tick's action.
async fn run_loop<F, Fut>(
    mut action: F,
    delay: Option<Duration>,
    shared: Arc<Shared>,
    token: CancellationToken,
) where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<(), ActionError>>,
{
    loop {
        if token.is_cancelled() {
            break;
        }
        let call = shared.bump_calls();
        match delay {
            Some(delay) => sleep(delay).await,
            // Without a delay the loop has to yield somewhere, or a stop
            // would never get a chance to land.
            None => tokio::task::yield_now().await,
        }
        if token.is_cancelled() {
            break;
        }
        if let Err(error) = (action)(call).await {
            warn!(call, %error, "background action failed, ending run");
            break;
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error("action failed on call {call}")]
pub struct ActionFailed {
    call: u64,
    #[source]
    source: ActionError,
}

impl ActionFailed {
    /// 1-based index of the call that failed.
    pub fn call(&self) -> u64 {
        self.call
    }

    pub fn into_source(self) -> ActionError {
        self.source
    }
}
