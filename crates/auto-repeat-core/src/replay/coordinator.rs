//! Presentation-facing orchestration of capture and runs.

use crate::{
    error::{ReplayError, Result},
    replay::{
        capture::CaptureListener,
        executor::Executor,
        injector::{ActionInjector, EnigoInjector},
        notification::{Notification, TerminalStatus},
        settings::RunSettings,
    },
};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Bounded wait for the worker's terminal status inside
/// [`RunCoordinator::request_stop`].
const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// How often the scheduled-start waiter rechecks the wall clock and the
/// cancellation flag. Remaining time is still reported once per whole second.
const SCHEDULE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Lifecycle of the background execution task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run active; capture and run requests are accepted.
    Idle,
    /// Waiting for the scheduled wall-clock start time.
    AwaitingScheduledStart,
    /// Start-delay countdown in progress.
    CountingDown,
    /// Repeat loop in progress.
    Running,
    /// Stop requested; waiting for the worker's terminal status.
    Stopping,
}

/// Factory for the injector a run's worker thread uses.
///
/// Called inside the spawned thread — the production injector is not `Send`.
pub type InjectorFactory = Arc<dyn Fn() -> Result<Box<dyn ActionInjector>> + Send + Sync>;

/// The live background task plus its cooperative cancellation flag.
struct ExecutorHandle {
    run_id: Uuid,
    cancel: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

/// Owns the run state machine, the single executor handle, and the capture
/// listener — everything the presentation layer talks to.
///
/// All operations report errors synchronously; nothing crosses the
/// background-task boundary except notifications. The only blocking call in
/// the control domain is the bounded wait inside
/// [`request_stop`](Self::request_stop).
pub struct RunCoordinator {
    state: RunState,
    listener: CaptureListener,
    handle: Option<ExecutorHandle>,
    notify_tx: Sender<Notification>,
    notify_rx: Receiver<Notification>,
    pending: VecDeque<Notification>,
    injector_factory: InjectorFactory,
}

impl RunCoordinator {
    /// Coordinator with the production enigo injector.
    pub fn new() -> Self {
        Self::with_injector_factory(Arc::new(|| {
            let injector = EnigoInjector::new()?;
            Ok(Box::new(injector) as Box<dyn ActionInjector>)
        }))
    }

    /// Coordinator with a custom injector factory (used by tests).
    pub fn with_injector_factory(injector_factory: InjectorFactory) -> Self {
        let (notify_tx, notify_rx) = unbounded();

        Self {
            state: RunState::Idle,
            listener: CaptureListener::new(notify_tx.clone()),
            handle: None,
            notify_tx,
            notify_rx,
            pending: VecDeque::new(),
            injector_factory,
        }
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Arm the one-shot capture listener.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidState`] unless idle, or
    /// [`ReplayError::TaskSpawnFailed`] if the hook thread cannot be spawned.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn request_capture(&mut self) -> Result<()> {
        if self.state != RunState::Idle {
            return Err(ReplayError::InvalidState {
                operation: "capture an input",
                state: self.state,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.listener.start_listening()
    }

    /// Start a run now, or at `scheduled_at`.
    ///
    /// A scheduled run waits on the worker thread, reporting the remaining
    /// seconds, then starts with a zero start delay — the schedule already
    /// provided the wait.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidState`] unless idle (no side effects),
    /// [`ReplayError::InvalidSchedule`] if `scheduled_at` is not strictly in
    /// the future, or [`ReplayError::TaskSpawnFailed`] if the worker thread
    /// cannot be spawned.
    #[track_caller]
    #[instrument(skip(self, settings), fields(repeat_count = settings.repeat_count))]
    pub fn request_run(
        &mut self,
        settings: RunSettings,
        scheduled_at: Option<DateTime<Local>>,
    ) -> Result<()> {
        if self.state != RunState::Idle {
            return Err(ReplayError::InvalidState {
                operation: "start a run",
                state: self.state,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(at) = scheduled_at {
            if at <= Local::now() {
                return Err(ReplayError::InvalidSchedule {
                    scheduled_at: at.format("%H:%M:%S").to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        let run_id = Uuid::new_v4();
        let cancel = Arc::new(AtomicBool::new(false));
        let counting_down = settings.start_delay_secs > 0;

        let worker_cancel = Arc::clone(&cancel);
        let notify_tx = self.notify_tx.clone();
        let factory = Arc::clone(&self.injector_factory);

        let handle = thread::Builder::new()
            .name("repeat-worker".to_owned())
            .spawn(move || {
                run_worker(run_id, settings, scheduled_at, worker_cancel, notify_tx, factory);
            })
            .map_err(|e| ReplayError::TaskSpawnFailed {
                reason: format!("Failed to spawn worker thread: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.handle = Some(ExecutorHandle {
            run_id,
            cancel,
            thread: Some(handle),
        });
        self.state = if scheduled_at.is_some() {
            RunState::AwaitingScheduledStart
        } else if counting_down {
            RunState::CountingDown
        } else {
            RunState::Running
        };

        info!(run_id = %run_id, scheduled = scheduled_at.is_some(), "run requested");

        Ok(())
    }

    /// Cancel any scheduled wait or active run and wait (bounded) for the
    /// worker's terminal status.
    ///
    /// Idempotent: with no active run this is a no-op, as is a stop that
    /// races a run that already finished.
    #[instrument(skip(self))]
    pub fn request_stop(&mut self) {
        let Some(mut handle) = self.handle.take() else {
            debug!("stop requested with no active run");
            return;
        };

        self.state = RunState::Stopping;
        handle.cancel.store(true, Ordering::SeqCst);

        let deadline = Instant::now() + STOP_TIMEOUT;
        let mut finished = false;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            // Drained messages are queued for the next poll so the
            // presentation layer still sees them in emission order.
            match self.notify_rx.recv_timeout(deadline - now) {
                Ok(Notification::Finished(status)) => {
                    info!(run_id = %handle.run_id, %status, "run stopped");
                    self.pending.push_back(Notification::Finished(status));
                    finished = true;
                    break;
                }
                Ok(other) => self.pending.push_back(other),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if finished {
            // The terminal status is the worker's final act; the join
            // completes promptly.
            if let Some(thread) = handle.thread.take() {
                let _ = thread.join();
            }
        } else {
            warn!(run_id = %handle.run_id, "worker unresponsive, detaching");
        }

        self.state = RunState::Idle;
    }

    /// Drain notifications accumulated since the last call, applying state
    /// transitions. Non-blocking; called once per presentation frame.
    pub fn poll(&mut self) -> Vec<Notification> {
        let mut batch: Vec<Notification> = self.pending.drain(..).collect();
        while let Ok(notification) = self.notify_rx.try_recv() {
            batch.push(notification);
        }

        for notification in &batch {
            self.apply(notification);
        }

        batch
    }

    /// Stop any active run and disarm the capture listener. Called when the
    /// presentation layer is closing.
    pub fn shutdown(&mut self) {
        self.request_stop();
        self.listener.stop_listening();
    }

    fn apply(&mut self, notification: &Notification) {
        match notification {
            Notification::Started => {
                if self.state != RunState::Idle {
                    self.state = RunState::Running;
                }
            }
            Notification::Finished(status) => {
                // The send is the worker's final act; dropping the handle
                // detaches the exiting thread without blocking this domain.
                if let Some(handle) = self.handle.take() {
                    info!(run_id = %handle.run_id, %status, "run finished");
                }
                self.state = RunState::Idle;
            }
            Notification::Captured(_) => self.listener.stop_listening(),
            Notification::Progress(_) => {}
        }
    }
}

impl Default for RunCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of the per-run worker thread: optional scheduled wait, then the
/// executor. Exactly one terminal status is emitted on every path.
fn run_worker(
    run_id: Uuid,
    mut settings: RunSettings,
    scheduled_at: Option<DateTime<Local>>,
    cancel: Arc<AtomicBool>,
    notify_tx: Sender<Notification>,
    factory: InjectorFactory,
) {
    if let Some(at) = scheduled_at {
        if !wait_until(at, &cancel, &notify_tx) {
            info!(run_id = %run_id, "scheduled start cancelled");
            let _ = notify_tx.send(Notification::Finished(TerminalStatus::Cancelled));
            return;
        }
        // The schedule provided the wait; skip the countdown.
        settings.start_delay_secs = 0;
    }

    let injector = match factory() {
        Ok(injector) => injector,
        Err(e) => {
            warn!(run_id = %run_id, error = %e, "injector unavailable");
            let _ = notify_tx.send(Notification::Finished(TerminalStatus::Failed(e.to_string())));
            return;
        }
    };

    Executor::new(injector, cancel, notify_tx).run(&settings);
}

/// Wait for the wall clock to reach `at`, reporting whole seconds remaining.
/// Returns `false` if cancelled first.
fn wait_until(at: DateTime<Local>, cancel: &AtomicBool, notify_tx: &Sender<Notification>) -> bool {
    let mut reported = None;
    loop {
        if cancel.load(Ordering::SeqCst) {
            return false;
        }

        let remaining_ms = (at - Local::now()).num_milliseconds();
        if remaining_ms <= 0 {
            return true;
        }

        let secs = (remaining_ms as u64).div_ceil(1000);
        if reported != Some(secs) {
            let _ = notify_tx.send(Notification::Progress(format!(
                "{secs}s until scheduled start"
            )));
            reported = Some(secs);
        }

        thread::sleep(SCHEDULE_POLL_INTERVAL);
    }
}
