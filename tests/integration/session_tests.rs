//! Whole-session runs through `ControlService::run`, ending when the
//! scripted peer goes quiet.

use crate::mock_hw::{Harness, Peer, Trace, alarm_lengths, motor_phases};

use doorlock::app::events::AppEvent;
use doorlock::app::ports::{LinkError, Rotation, TimerError};
use doorlock::config::LockConfig;
use doorlock::error::Error;
use doorlock::fsm::StateId;
use doorlock::protocol::{ACCEPTED, DENIED, ERROR_DETECTED, READY};

#[test]
fn full_session() {
    let peer = Peer::new()
        // First registration fails, second succeeds.
        .register("1111", "1112")
        .register("1111", "1111")
        // Open the door.
        .verify("1111", b'+')
        // Change the credential.
        .verify("1111", b'-')
        .register("2222", "2222")
        // Old password no longer works, new one does.
        .verify("1111", b'+')
        .verify("2222", b'+');
    let mut h = Harness::new(&peer);

    let Err(err) = h.service.run(&mut h.sink);

    assert_eq!(err, Error::Link(LinkError::Disconnected));
    assert_eq!(
        h.sent(),
        &[
            READY, DENIED, //
            READY, ACCEPTED, //
            READY, ACCEPTED, //
            READY, ACCEPTED, //
            READY, ACCEPTED, //
            READY, DENIED, READY, //
            READY, ACCEPTED,
        ]
    );
    assert_eq!(h.stored_credential(), b"2222\0");

    let rotations: Vec<Rotation> = motor_phases(&h.timeline).iter().map(|p| p.0).collect();
    assert_eq!(rotations.len(), 8, "door opened exactly twice");

    assert_eq!(h.sink.events.first(), Some(&AppEvent::Started));
    assert_eq!(
        h.sink.events.last(),
        Some(&AppEvent::FailSafe(Error::Link(LinkError::Disconnected)))
    );
    assert_eq!(h.service.state(), StateId::Idle);
}

#[test]
fn every_boot_starts_with_registration() {
    // A credential is already stored, but the first exchange is still
    // treated as registration.
    let peer = Peer::new().register("new", "new");
    let store = Harness::store_with("old");
    let mut h = Harness::build(LockConfig::default(), &peer, 1, store);

    let Err(_) = h.service.run(&mut h.sink);

    assert_eq!(h.stored_credential(), b"new\0");
    assert_eq!(h.sent(), &[READY, ACCEPTED]);
}

#[test]
fn lockout_inside_a_session() {
    let peer = Peer::new()
        .register("pin", "pin")
        .verify("a", b'+')
        .verify("b", b'+')
        .verify("c", b'+')
        .verify("pin", b'+');
    let mut h = Harness::new(&peer);

    let Err(_) = h.service.run(&mut h.sink);

    assert_eq!(alarm_lengths(&h.timeline), vec![60]);
    assert!(
        h.sent()
            .windows(2)
            .any(|w| w == [READY, ERROR_DETECTED])
    );
    assert_eq!(motor_phases(&h.timeline).len(), 4, "door opened after the alarm");
    assert_eq!(h.service.failures(), 0);
}

#[test]
fn run_starts_with_outputs_off() {
    let mut h = Harness::new(&Peer::new());
    let Err(_) = h.service.run(&mut h.sink);
    let tl = h.timeline.borrow();
    assert_eq!(tl.first(), Some(&Trace::AllOff));
}

#[test]
fn disconnect_mid_frame_fails_safe() {
    let peer = Peer::new().ready().raw(b"12");
    let mut h = Harness::new(&peer);

    let Err(err) = h.service.run(&mut h.sink);

    assert_eq!(err, Error::Link(LinkError::Disconnected));
    assert!(!h.service.timer().is_running());
    assert_eq!(h.service.store().writes(), 0);
    assert_eq!(*h.timeline.borrow(), vec![Trace::AllOff, Trace::AllOff]);
}

#[test]
fn timer_start_failure_fails_safe_with_motor_stopped() {
    let peer = Peer::new().verify("pin", b'+');
    let mut h = Harness::build_with(
        LockConfig::default(),
        &peer,
        Harness::store_with("pin"),
        |mut t| {
            t.fail_start = true;
            t
        },
        |a| a,
    );

    let err = h.service.verify(&mut h.sink).unwrap_err();

    assert_eq!(err, Error::Timer(TimerError::StartFailed(-1)));
    let tl = h.timeline.borrow();
    assert_eq!(
        *tl,
        vec![
            Trace::Motor {
                rotation: Rotation::Forward,
                speed: 100
            },
            Trace::AllOff,
        ]
    );
    assert_eq!(h.service.state(), StateId::Idle);
}

#[test]
fn timer_is_configured_for_one_second_ticks() {
    let h = Harness::new(&Peer::new());
    let cfg = h.service.timer().config.expect("configured at construction");
    assert_eq!(cfg.period_us(), 1_000_000);
}
