use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Where a [`crate::Repeater`] is in its lifecycle.
///
/// Transitions only idle → running → complete; starting a fresh driver call
/// re-arms a complete instance back to running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running,
    Complete,
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const COMPLETE: u8 = 2;

/// Run-state shared between a repeater handle and its background loop.
///
/// Reads while a background run is live are advisory (relaxed atomics); the
/// cancellation token carries the actual shutdown edge.
pub(crate) struct Shared {
    status: AtomicU8,
    calls: AtomicU64,
    stop: Mutex<CancellationToken>,
    timing: Mutex<Timing>,
}

#[derive(Default)]
struct Timing {
    start_date: Option<SystemTime>,
    end_date: Option<SystemTime>,
    run_started: Option<Instant>,
    run_time: Option<Duration>,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            status: AtomicU8::new(IDLE),
            calls: AtomicU64::new(0),
            stop: Mutex::new(CancellationToken::new()),
            timing: Mutex::new(Timing::default()),
        }
    }

    /// Arm a fresh run: cancel any loop left over from a previous run, hand
    /// out a new token, zero the counter and restart the clocks.
    pub(crate) fn begin_run(&self) -> CancellationToken {
        let token = {
            let mut stop = self.stop.lock().expect("stop mutex poisoned");
            stop.cancel();
            *stop = CancellationToken::new();
            (*stop).clone()
        };

        self.calls.store(0, Ordering::Relaxed);
        {
            let mut timing = self.timing.lock().expect("timing mutex poisoned");
            timing.start_date = Some(SystemTime::now());
            timing.end_date = None;
            timing.run_started = Some(Instant::now());
            timing.run_time = None;
        }
        self.status.store(RUNNING, Ordering::Relaxed);

        token
    }

    /// Completion bookkeeping: end date, run time, counter back to zero.
    pub(crate) fn finish_run(&self) {
        {
            let mut timing = self.timing.lock().expect("timing mutex poisoned");
            timing.end_date = Some(SystemTime::now());
            timing.run_time = timing.run_started.map(|started| started.elapsed());
        }
        self.calls.store(0, Ordering::Relaxed);
        self.status.store(COMPLETE, Ordering::Relaxed);
    }

    /// Cancel the current run's token and finish immediately. The background
    /// loop may still be sleeping out its last delay; it notices the token
    /// afterwards and skips that tick's action.
    pub(crate) fn request_stop(&self) {
        self.stop.lock().expect("stop mutex poisoned").cancel();
        self.finish_run();
    }

    pub(crate) fn bump_calls(&self) -> u64 {
        self.calls.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn status(&self) -> Status {
        match self.status.load(Ordering::Relaxed) {
            IDLE => Status::Idle,
            RUNNING => Status::Running,
            _ => Status::Complete,
        }
    }

    pub(crate) fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub(crate) fn start_date(&self) -> Option<SystemTime> {
        self.timing.lock().expect("timing mutex poisoned").start_date
    }

    pub(crate) fn end_date(&self) -> Option<SystemTime> {
        self.timing.lock().expect("timing mutex poisoned").end_date
    }

    pub(crate) fn run_time(&self) -> Option<Duration> {
        self.timing.lock().expect("timing mutex poisoned").run_time
    }
}
