use crate::replay::{
    injector::ActionInjector,
    notification::{Notification, TerminalStatus},
    settings::RunSettings,
};

use std::{
    panic::AssertUnwindSafe,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::Sender;
use tracing::{debug, info, instrument, warn};

/// Upper bound on how long a cancellation can go unnoticed mid-sleep.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The repeating-action worker.
///
/// Runs on a dedicated thread and communicates exclusively through the
/// notification channel and the shared cancellation flag.
pub(crate) struct Executor<I> {
    injector: I,
    cancel: Arc<AtomicBool>,
    notify_tx: Sender<Notification>,
}

impl<I: ActionInjector> Executor<I> {
    pub(crate) fn new(
        injector: I,
        cancel: Arc<AtomicBool>,
        notify_tx: Sender<Notification>,
    ) -> Self {
        Self {
            injector,
            cancel,
            notify_tx,
        }
    }

    /// Run the countdown and repeat loop, then emit the terminal status.
    ///
    /// Exactly one [`Notification::Finished`] is sent on every path,
    /// including a panic inside the loop body.
    #[instrument(skip(self, settings), fields(repeat_count = settings.repeat_count))]
    pub(crate) fn run(mut self, settings: &RunSettings) -> TerminalStatus {
        let notify_tx = self.notify_tx.clone();

        let status =
            match std::panic::catch_unwind(AssertUnwindSafe(move || self.execute(settings))) {
                Ok(status) => status,
                Err(_) => {
                    warn!("worker panicked");
                    TerminalStatus::Failed("background worker panicked".to_owned())
                }
            };

        info!(%status, "run finished");
        let _ = notify_tx.send(Notification::Finished(status.clone()));

        status
    }

    fn execute(&mut self, settings: &RunSettings) -> TerminalStatus {
        for remaining in (1..=settings.start_delay_secs).rev() {
            if self.cancelled() {
                return TerminalStatus::Cancelled;
            }
            self.progress(format!("{remaining}s until start"));
            if !self.sleep_cancellable(Duration::from_secs(1)) {
                return TerminalStatus::Cancelled;
            }
        }

        let _ = self.notify_tx.send(Notification::Started);

        // Resolve up front: a malformed capture fails before any repetition.
        let input = match settings.action.resolve() {
            Ok(input) => input,
            Err(e) => {
                warn!(error = %e, "captured action cannot be replayed");
                return TerminalStatus::Failed(e.to_string());
            }
        };

        let interval = settings.interval();
        for done in 0..settings.repeat_count {
            if self.cancelled() {
                return TerminalStatus::Cancelled;
            }
            self.progress(format!("{} remaining", settings.repeat_count - done));
            if let Err(e) = self.injector.inject(&input) {
                warn!(error = %e, "injection failed");
                return TerminalStatus::Failed(e.to_string());
            }
            if !self.sleep_cancellable(interval) {
                return TerminalStatus::Cancelled;
            }
        }

        TerminalStatus::Completed
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn progress(&self, text: String) {
        debug!(%text, "progress");
        let _ = self.notify_tx.send(Notification::Progress(text));
    }

    /// Sleep in slices so a cancellation is observed within
    /// [`CANCEL_POLL_INTERVAL`]. Returns `false` if cancelled mid-sleep.
    fn sleep_cancellable(&self, total: Duration) -> bool {
        let deadline = Instant::now() + total;
        loop {
            if self.cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(CANCEL_POLL_INTERVAL.min(deadline - now));
        }
    }
}
