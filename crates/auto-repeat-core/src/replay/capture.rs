//! One-shot global input capture.
//!
//! The OS hook (`rdev::listen`) cannot be unhooked once installed, so the
//! hook thread is spawned once and lives for the rest of the process; what
//! arms and disarms a capture is an atomic flag flipped from the control
//! domain. Teardown is therefore non-blocking, idempotent, and safe to
//! invoke from the event callback's own thread — no join anywhere.

use crate::{
    error::{ReplayError, Result},
    replay::{action::CapturedAction, notification::Notification},
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use crossbeam_channel::Sender;
use error_location::ErrorLocation;
use rdev::EventType;
use tracing::{debug, error, instrument};

/// One-shot global capture listener.
///
/// While armed, the first mouse-button or key press anywhere on the desktop
/// disarms the listener and emits a single [`Notification::Captured`].
pub struct CaptureListener {
    armed: Arc<AtomicBool>,
    notify_tx: Sender<Notification>,
    hook_spawned: bool,
}

impl CaptureListener {
    /// Listener reporting captures on `notify_tx`.
    ///
    /// The OS hook is not installed until the first
    /// [`start_listening`](Self::start_listening).
    pub(crate) fn new(notify_tx: Sender<Notification>) -> Self {
        Self {
            armed: Arc::new(AtomicBool::new(false)),
            notify_tx,
            hook_spawned: false,
        }
    }

    /// Arm the one-shot capture. No-op while already armed.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::TaskSpawnFailed`] if the hook thread cannot be
    /// spawned.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start_listening(&mut self) -> Result<()> {
        if self.armed.load(Ordering::SeqCst) {
            debug!("capture already armed");
            return Ok(());
        }

        if !self.hook_spawned {
            self.spawn_hook()?;
            self.hook_spawned = true;
        }

        self.armed.store(true, Ordering::SeqCst);
        debug!("capture armed");

        Ok(())
    }

    /// Disarm the capture. Idempotent, non-blocking, safe if never armed.
    pub fn stop_listening(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    #[track_caller]
    fn spawn_hook(&self) -> Result<()> {
        let armed = Arc::clone(&self.armed);
        let notify_tx = self.notify_tx.clone();

        thread::Builder::new()
            .name("input-capture".to_owned())
            .spawn(move || {
                // Occupies this thread for the rest of the process.
                if let Err(e) = rdev::listen(move |event| {
                    handle_event(&armed, &notify_tx, &event.event_type, event.name.as_deref());
                }) {
                    error!(error = ?e, "Global input hook failed");
                }
            })
            .map_err(|e| ReplayError::TaskSpawnFailed {
                reason: format!("Failed to spawn input hook thread: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!("global input hook installed");

        Ok(())
    }
}

/// Translate one hook event while armed; disarm on the first qualifying one.
///
/// Runs on the hook thread. It only flips the flag and sends — coordinator
/// state is never touched from here.
pub(crate) fn handle_event(
    armed: &AtomicBool,
    notify_tx: &Sender<Notification>,
    event_type: &EventType,
    name: Option<&str>,
) {
    if !armed.load(Ordering::SeqCst) {
        return;
    }

    let action = match event_type {
        EventType::ButtonPress(button) => CapturedAction::MouseButton {
            button: format!("{button:?}"),
        },
        EventType::KeyPress(key) => match printable_char(name) {
            Some(ch) => CapturedAction::KeyboardChar { ch },
            None => CapturedAction::KeyboardKey {
                key: format!("{key:?}"),
            },
        },
        _ => return,
    };

    // The swap keeps the capture one-shot under rapid event bursts.
    if armed.swap(false, Ordering::SeqCst) {
        debug!(kind = action.kind(), value = %action.value(), "input captured");
        let _ = notify_tx.send(Notification::Captured(action));
    }
}

/// The single printable character a key press produced, if any.
fn printable_char(name: Option<&str>) -> Option<char> {
    let mut chars = name?.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if !ch.is_control() => Some(ch),
        _ => None,
    }
}
