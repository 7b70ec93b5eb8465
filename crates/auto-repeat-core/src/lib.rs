//! Auto-repeat Core Library
//!
//! Background state machine for replaying a single captured input action on
//! a timer: a one-shot global capture listener, a cancellable repeat
//! executor, and the coordinator that keeps a presentation layer
//! synchronized through an ordered notification channel.
//!
//! # Example
//!
//! ```no_run
//! use auto_repeat_core::{CapturedAction, CoreResult, RunCoordinator, RunSettings};
//!
//! fn main() -> CoreResult<()> {
//!     let mut coordinator = RunCoordinator::new();
//!
//!     coordinator.request_run(
//!         RunSettings {
//!             repeat_count: 10,
//!             interval_millis: 50,
//!             start_delay_secs: 3,
//!             action: CapturedAction::default(),
//!         },
//!         None,
//!     )?;
//!
//!     for notification in coordinator.poll() {
//!         println!("{notification:?}");
//!     }
//!
//!     Ok(())
//! }
//! ```

mod error;
mod replay;

pub use {
    error::{ReplayError, Result as CoreResult},
    replay::{
        ActionInjector, CapturedAction, EnigoInjector, INTERVAL_MILLIS_RANGE, InjectorFactory,
        Notification, REPEAT_COUNT_RANGE, ResolvedAction, RunCoordinator, RunSettings, RunState,
        START_DELAY_SECS_RANGE, TerminalStatus,
    },
};
