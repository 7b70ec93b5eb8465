use crate::{
    ActionInjector, CapturedAction, CoreResult, Notification, ReplayError, ResolvedAction,
    RunSettings, TerminalStatus, replay::executor::Executor,
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam_channel::unbounded;
use error_location::ErrorLocation;

struct RecordingInjector {
    injected: Arc<AtomicUsize>,
}

impl ActionInjector for RecordingInjector {
    fn inject(&mut self, _input: &ResolvedAction) -> CoreResult<()> {
        self.injected.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingInjector;

impl ActionInjector for FailingInjector {
    fn inject(&mut self, _input: &ResolvedAction) -> CoreResult<()> {
        Err(ReplayError::Injection {
            reason: "synthetic failure".to_owned(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

fn settings(repeat_count: u32, interval_millis: u64, start_delay_secs: u32) -> RunSettings {
    RunSettings {
        repeat_count,
        interval_millis,
        start_delay_secs,
        action: CapturedAction::default(),
    }
}

fn finished_count(notifications: &[Notification]) -> usize {
    notifications
        .iter()
        .filter(|n| matches!(n, Notification::Finished(_)))
        .count()
}

/// WHAT: A full run emits one progress line per repetition and a single
///       Completed status, in order, with one injection per repetition
/// WHY: The notification sequence is the contract the status display renders
#[test]
fn given_three_repetitions_when_run_completes_then_exact_notification_sequence() {
    let (tx, rx) = unbounded();
    let injected = Arc::new(AtomicUsize::new(0));
    let executor = Executor::new(
        RecordingInjector {
            injected: Arc::clone(&injected),
        },
        Arc::new(AtomicBool::new(false)),
        tx,
    );

    let status = executor.run(&settings(3, 5, 0));

    assert_eq!(status, TerminalStatus::Completed);
    assert_eq!(injected.load(Ordering::SeqCst), 3);

    let received: Vec<Notification> = rx.try_iter().collect();
    assert_eq!(
        received,
        vec![
            Notification::Started,
            Notification::Progress("3 remaining".to_owned()),
            Notification::Progress("2 remaining".to_owned()),
            Notification::Progress("1 remaining".to_owned()),
            Notification::Finished(TerminalStatus::Completed),
        ]
    );
}

/// WHAT: A start delay emits one countdown line per second before the run
/// WHY: The countdown precedes the repeat phase in the status display
#[test]
fn given_two_second_delay_when_run_then_countdown_precedes_repetitions() {
    let (tx, rx) = unbounded();
    let injected = Arc::new(AtomicUsize::new(0));
    let executor = Executor::new(
        RecordingInjector {
            injected: Arc::clone(&injected),
        },
        Arc::new(AtomicBool::new(false)),
        tx,
    );

    let status = executor.run(&settings(1, 1, 2));

    assert_eq!(status, TerminalStatus::Completed);

    let received: Vec<Notification> = rx.try_iter().collect();
    assert_eq!(
        received,
        vec![
            Notification::Progress("2s until start".to_owned()),
            Notification::Progress("1s until start".to_owned()),
            Notification::Started,
            Notification::Progress("1 remaining".to_owned()),
            Notification::Finished(TerminalStatus::Completed),
        ]
    );
}

/// WHAT: A pre-set cancellation aborts before any side effect
/// WHY: Cancellation is checked before each countdown iteration
#[test]
fn given_cancelled_flag_when_run_starts_then_cancelled_without_side_effects() {
    let (tx, rx) = unbounded();
    let injected = Arc::new(AtomicUsize::new(0));
    let executor = Executor::new(
        RecordingInjector {
            injected: Arc::clone(&injected),
        },
        Arc::new(AtomicBool::new(true)),
        tx,
    );

    let status = executor.run(&settings(5, 1, 3));

    assert_eq!(status, TerminalStatus::Cancelled);
    assert_eq!(injected.load(Ordering::SeqCst), 0);

    let received: Vec<Notification> = rx.try_iter().collect();
    assert_eq!(
        received,
        vec![Notification::Finished(TerminalStatus::Cancelled)]
    );
}

/// WHAT: Cancelling during a countdown sleep yields Cancelled with zero
///       injections
/// WHY: No action side effect may occur once cancelled mid-delay
#[test]
#[allow(clippy::unwrap_used)]
fn given_cancel_during_countdown_sleep_then_no_injection() {
    let (tx, rx) = unbounded();
    let injected = Arc::new(AtomicUsize::new(0));
    let cancel = Arc::new(AtomicBool::new(false));
    let executor = Executor::new(
        RecordingInjector {
            injected: Arc::clone(&injected),
        },
        Arc::clone(&cancel),
        tx,
    );

    let worker = thread::spawn(move || executor.run(&settings(5, 1, 5)));
    thread::sleep(Duration::from_millis(150));
    cancel.store(true, Ordering::SeqCst);
    let status = worker.join().unwrap();

    assert_eq!(status, TerminalStatus::Cancelled);
    assert_eq!(injected.load(Ordering::SeqCst), 0);

    let received: Vec<Notification> = rx.try_iter().collect();
    assert_eq!(finished_count(&received), 1);
    assert_eq!(
        received.last(),
        Some(&Notification::Finished(TerminalStatus::Cancelled))
    );
}

/// WHAT: Cancelling during an interval sleep yields a single Cancelled
///       status with no further progress
/// WHY: Cancellation latency is bounded by the sleep slice, not the interval
#[test]
#[allow(clippy::unwrap_used)]
fn given_cancel_during_interval_sleep_then_single_cancelled_status() {
    let (tx, rx) = unbounded();
    let injected = Arc::new(AtomicUsize::new(0));
    let cancel = Arc::new(AtomicBool::new(false));
    let executor = Executor::new(
        RecordingInjector {
            injected: Arc::clone(&injected),
        },
        Arc::clone(&cancel),
        tx,
    );

    let worker = thread::spawn(move || executor.run(&settings(10_000, 60_000, 0)));
    thread::sleep(Duration::from_millis(150));
    cancel.store(true, Ordering::SeqCst);
    let status = worker.join().unwrap();

    assert_eq!(status, TerminalStatus::Cancelled);
    assert_eq!(injected.load(Ordering::SeqCst), 1);

    let received: Vec<Notification> = rx.try_iter().collect();
    assert_eq!(
        received,
        vec![
            Notification::Started,
            Notification::Progress("10000 remaining".to_owned()),
            Notification::Finished(TerminalStatus::Cancelled),
        ]
    );
}

/// WHAT: An unresolvable action fails before any repetition
/// WHY: The failure is reported on the first check, with zero injections
#[test]
fn given_unmapped_key_when_run_then_failed_before_any_repetition() {
    let (tx, rx) = unbounded();
    let injected = Arc::new(AtomicUsize::new(0));
    let executor = Executor::new(
        RecordingInjector {
            injected: Arc::clone(&injected),
        },
        Arc::new(AtomicBool::new(false)),
        tx,
    );

    let status = executor.run(&RunSettings {
        repeat_count: 4,
        interval_millis: 1,
        start_delay_secs: 0,
        action: CapturedAction::KeyboardKey {
            key: "NumLock".to_owned(),
        },
    });

    assert!(matches!(status, TerminalStatus::Failed(_)));
    assert_eq!(injected.load(Ordering::SeqCst), 0);

    let received: Vec<Notification> = rx.try_iter().collect();
    assert_eq!(received.len(), 2);
    assert_eq!(received.first(), Some(&Notification::Started));
    assert!(matches!(
        received.last(),
        Some(Notification::Finished(TerminalStatus::Failed(_)))
    ));
}

/// WHAT: An injector error ends the run with a Failed status
/// WHY: Worker failures become a terminal status, never a crash
#[test]
fn given_failing_injector_when_run_then_failed_terminal_status() {
    let (tx, rx) = unbounded();
    let executor = Executor::new(FailingInjector, Arc::new(AtomicBool::new(false)), tx);

    let status = executor.run(&settings(3, 1, 0));

    assert!(matches!(status, TerminalStatus::Failed(_)));

    let received: Vec<Notification> = rx.try_iter().collect();
    assert_eq!(finished_count(&received), 1);
    assert_eq!(
        received[1],
        Notification::Progress("3 remaining".to_owned())
    );
    assert!(matches!(
        received.last(),
        Some(Notification::Finished(TerminalStatus::Failed(_)))
    ));
}
