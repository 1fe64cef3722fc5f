//! Door sequence: unlock, hold open, lock, each clocked by the tick source.

use crate::mock_hw::{Harness, MockActuators, Peer, Trace, count, motor_phases};

use doorlock::adapters::memory_store::MemoryStore;
use doorlock::app::events::AppEvent;
use doorlock::app::ports::Rotation;
use doorlock::app::service::Verification;
use doorlock::config::LockConfig;
use doorlock::fsm::StateId;

fn open_door(config: LockConfig, burst: u32) -> Harness {
    let mut h = Harness::build(
        config,
        &Peer::new().verify("12345", b'+'),
        burst,
        Harness::store_with("12345"),
    );
    assert_eq!(h.service.verify(&mut h.sink).unwrap(), Verification::Opened);
    h
}

#[test]
fn phases_run_for_configured_ticks() {
    let h = open_door(LockConfig::default(), 1);
    assert_eq!(
        motor_phases(&h.timeline),
        vec![
            (Rotation::Forward, 15),
            (Rotation::Stop, 3),
            (Rotation::Reverse, 15),
            (Rotation::Stop, 0),
        ]
    );
}

#[test]
fn motor_runs_at_full_speed() {
    let h = open_door(LockConfig::default(), 1);
    let speeds: Vec<u8> = h
        .timeline
        .borrow()
        .iter()
        .filter_map(|t| match t {
            Trace::Motor { speed, .. } => Some(*speed),
            _ => None,
        })
        .collect();
    assert_eq!(speeds, vec![100, 0, 100, 0]);
}

#[test]
fn timer_runs_only_during_sequence() {
    let h = open_door(LockConfig::default(), 1);
    let tl = h.timeline.borrow();
    assert_eq!(count(&h.timeline, Trace::TimerStart), 1);
    assert_eq!(count(&h.timeline, Trace::TimerStop), 1);
    assert_eq!(
        tl[0],
        Trace::Motor {
            rotation: Rotation::Forward,
            speed: 100
        }
    );
    assert_eq!(tl[1], Trace::TimerStart);
    assert_eq!(tl.last(), Some(&Trace::TimerStop));
    assert_eq!(count(&h.timeline, Trace::Tick), 33);
}

#[test]
fn phase_events_in_order() {
    let h = open_door(LockConfig::default(), 1);
    let phases: Vec<(StateId, StateId)> = h
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::PhaseChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (StateId::Idle, StateId::Unlocking),
            (StateId::Unlocking, StateId::HoldOpen),
            (StateId::HoldOpen, StateId::Locking),
            (StateId::Locking, StateId::Idle),
        ]
    );
}

#[test]
fn tick_bursts_never_skip_a_phase() {
    // Seven ticks arrive per wake-up; phase boundaries fall mid-burst.
    let h = open_door(LockConfig::default(), 7);
    let rotations: Vec<Rotation> = motor_phases(&h.timeline).iter().map(|p| p.0).collect();
    assert_eq!(
        rotations,
        vec![Rotation::Forward, Rotation::Stop, Rotation::Reverse, Rotation::Stop]
    );
    assert_eq!(h.service.state(), StateId::Idle);
    // 33 ticks needed, delivered in bursts of 7.
    assert_eq!(count(&h.timeline, Trace::Tick), 35);
}

#[test]
fn custom_timings_and_speed() {
    let config = LockConfig {
        unlock_ticks: 4,
        hold_open_ticks: 10,
        lock_ticks: 6,
        motor_speed_percent: 70,
        ..Default::default()
    };
    let h = open_door(config, 1);
    assert_eq!(
        motor_phases(&h.timeline),
        vec![
            (Rotation::Forward, 4),
            (Rotation::Stop, 10),
            (Rotation::Reverse, 6),
            (Rotation::Stop, 0),
        ]
    );
    assert!(h.timeline.borrow().contains(&Trace::Motor {
        rotation: Rotation::Reverse,
        speed: 70
    }));
}

#[test]
fn door_can_open_twice() {
    let peer = Peer::new().verify("pin", b'+').verify("pin", b'+');
    let mut h = Harness::build(LockConfig::default(), &peer, 1, Harness::store_with("pin"));
    h.service.verify(&mut h.sink).unwrap();
    h.service.verify(&mut h.sink).unwrap();
    assert_eq!(count(&h.timeline, Trace::Tick), 66);
    assert_eq!(motor_phases(&h.timeline).len(), 8);
}

#[test]
fn actuator_fault_mid_sequence_fails_safe() {
    // Second rotate call (Unlocking -> HoldOpen stop) fails.
    let mut h = Harness::build_with(
        LockConfig::default(),
        &Peer::new().verify("pin", b'+'),
        Harness::store_with("pin"),
        |t| t,
        |a: MockActuators| {
            let mut a = a;
            a.fail_rotate_at = Some(2);
            a
        },
    );

    let err = h.service.verify(&mut h.sink).unwrap_err();

    assert_eq!(err.to_string(), "actuator: PWM write failed");
    let tl = h.timeline.borrow();
    assert_eq!(tl.iter().filter(|t| **t == Trace::Tick).count(), 15);
    assert!(tl.ends_with(&[Trace::TimerStop, Trace::AllOff]));
    assert!(!h.service.timer().is_running());
    assert_eq!(h.service.state(), StateId::Idle);
    assert!(matches!(h.sink.events.last(), Some(AppEvent::FailSafe(_))));
}

#[test]
fn store_fault_during_compare_fails_safe() {
    let mut store = MemoryStore::new();
    store.set_fault(Some(doorlock::app::ports::StorageError::Bus));
    let mut h = Harness::build(LockConfig::default(), &Peer::new().verify("pin", b'+'), 1, store);

    let err = h.service.verify(&mut h.sink).unwrap_err();

    assert_eq!(err.to_string(), "storage: bus error");
    assert!(h.sent().is_empty(), "no verdict on a storage fault");
    assert_eq!(*h.timeline.borrow(), vec![Trace::AllOff]);
}
