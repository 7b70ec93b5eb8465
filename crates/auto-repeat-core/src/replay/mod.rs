mod action;
pub(crate) mod capture;
mod coordinator;
pub(crate) mod executor;
mod injector;
mod notification;
mod settings;

pub use {
    action::{CapturedAction, ResolvedAction},
    capture::CaptureListener,
    coordinator::{InjectorFactory, RunCoordinator, RunState},
    injector::{ActionInjector, EnigoInjector},
    notification::{Notification, TerminalStatus},
    settings::{
        INTERVAL_MILLIS_RANGE, REPEAT_COUNT_RANGE, RunSettings, START_DELAY_SECS_RANGE,
    },
};
