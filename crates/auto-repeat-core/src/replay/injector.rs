//! Input synthesis seam between the repeat loop and the OS.

use crate::{
    error::{ReplayError, Result},
    replay::action::ResolvedAction,
};

use std::panic::Location;

use enigo::{Direction, Enigo, Keyboard, Mouse, Settings};
use error_location::ErrorLocation;
use tracing::debug;

/// Performs the captured action's side effect once per call.
///
/// The executor only ever sees this trait; production uses [`EnigoInjector`],
/// tests substitute a recording mock.
pub trait ActionInjector {
    /// Synthesize the resolved input once (press and release).
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Injection`] when the OS rejects the event.
    fn inject(&mut self, input: &ResolvedAction) -> Result<()>;
}

impl<T: ActionInjector + ?Sized> ActionInjector for Box<T> {
    fn inject(&mut self, input: &ResolvedAction) -> Result<()> {
        (**self).inject(input)
    }
}

/// Production injector backed by enigo.
///
/// `Enigo` is not `Send`, so this is constructed inside the worker thread
/// that uses it rather than handed across the channel.
pub struct EnigoInjector {
    enigo: Enigo,
}

impl EnigoInjector {
    /// Open a platform connection for input synthesis.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Injection`] if the connection cannot be
    /// established.
    #[track_caller]
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| ReplayError::Injection {
            reason: format!("Failed to create Enigo: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!("EnigoInjector initialized");

        Ok(Self { enigo })
    }
}

impl ActionInjector for EnigoInjector {
    #[track_caller]
    fn inject(&mut self, input: &ResolvedAction) -> Result<()> {
        match input {
            ResolvedAction::Button(button) => self
                .enigo
                .button(*button, Direction::Click)
                .map_err(|e| ReplayError::Injection {
                    reason: format!("Failed to click {button:?}: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                }),
            ResolvedAction::Key(key) => {
                self.enigo
                    .key(*key, Direction::Click)
                    .map_err(|e| ReplayError::Injection {
                        reason: format!("Failed to tap {key:?}: {e}"),
                        location: ErrorLocation::from(Location::caller()),
                    })
            }
        }
    }
}
