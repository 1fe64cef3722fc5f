//! Verification exchange against a stored credential, and command dispatch.

use crate::mock_hw::{Harness, Peer, Trace, count};

use doorlock::app::events::AppEvent;
use doorlock::app::service::Verification;
use doorlock::config::LockConfig;
use doorlock::fsm::StateId;
use doorlock::protocol::{ACCEPTED, DENIED, READY};

fn stored(password: &str, peer: &Peer) -> Harness {
    Harness::build(LockConfig::default(), peer, 1, Harness::store_with(password))
}

#[test]
fn correct_password_with_change_command() {
    let mut h = stored("12345", &Peer::new().verify("12345", b'-'));

    let outcome = h.service.verify(&mut h.sink).unwrap();

    assert_eq!(outcome, Verification::ChangeRequested);
    assert_eq!(h.sent(), &[READY, ACCEPTED]);
    assert_eq!(
        h.sink.events,
        vec![AppEvent::AccessGranted, AppEvent::CredentialChangeRequested]
    );
    assert_eq!(count(&h.timeline, Trace::TimerStart), 0);
    assert!(h.timeline.borrow().is_empty());
}

#[test]
fn wrong_password_is_denied_then_ready() {
    let mut h = stored("12345", &Peer::new().verify("12346", b'+'));

    let outcome = h.service.verify(&mut h.sink).unwrap();

    assert_eq!(outcome, Verification::Denied { failures: 1 });
    assert_eq!(h.sent(), &[READY, DENIED, READY]);
    assert_eq!(h.service.failures(), 1);
    assert!(h.timeline.borrow().is_empty(), "denied command must not run");
}

#[test]
fn verification_never_writes_the_store() {
    let peer = Peer::new().verify("12345", b'-').verify("nope", b'+');
    let mut h = stored("12345", &peer);
    let before = h.service.store().writes();
    h.service.verify(&mut h.sink).unwrap();
    h.service.verify(&mut h.sink).unwrap();
    assert_eq!(h.service.store().writes(), before);
}

#[test]
fn same_candidate_gives_same_verdict() {
    let peer = Peer::new()
        .verify("abc", b'-')
        .verify("abc", b'-')
        .verify("abd", b'-')
        .verify("abd", b'-');
    let mut h = stored("abc", &peer);

    assert_eq!(h.service.verify(&mut h.sink).unwrap(), Verification::ChangeRequested);
    assert_eq!(h.service.verify(&mut h.sink).unwrap(), Verification::ChangeRequested);
    assert_eq!(
        h.service.verify(&mut h.sink).unwrap(),
        Verification::Denied { failures: 1 }
    );
    assert_eq!(
        h.service.verify(&mut h.sink).unwrap(),
        Verification::Denied { failures: 2 }
    );
}

#[test]
fn success_resets_failures() {
    let peer = Peer::new()
        .verify("x", b'-')
        .verify("x", b'-')
        .verify("12345", b'-')
        .verify("x", b'-');
    let mut h = stored("12345", &peer);

    h.service.verify(&mut h.sink).unwrap();
    h.service.verify(&mut h.sink).unwrap();
    assert_eq!(h.service.failures(), 2);
    h.service.verify(&mut h.sink).unwrap();
    assert_eq!(h.service.failures(), 0);
    assert_eq!(
        h.service.verify(&mut h.sink).unwrap(),
        Verification::Denied { failures: 1 }
    );
}

#[test]
fn prefix_of_stored_credential_is_denied() {
    let peer = Peer::new().verify("123", b'+').verify("123456", b'+');
    let mut h = stored("12345", &peer);
    assert_eq!(
        h.service.verify(&mut h.sink).unwrap(),
        Verification::Denied { failures: 1 }
    );
    assert_eq!(
        h.service.verify(&mut h.sink).unwrap(),
        Verification::Denied { failures: 2 }
    );
}

#[test]
fn unknown_command_is_acknowledged_and_ignored() {
    let mut h = stored("pin", &Peer::new().verify("pin", b'*'));

    let outcome = h.service.verify(&mut h.sink).unwrap();

    assert_eq!(outcome, Verification::Ignored(b'*'));
    assert_eq!(h.sent(), &[READY, ACCEPTED]);
    assert!(h.sink.events.contains(&AppEvent::UnknownCommand(b'*')));
    assert!(h.timeline.borrow().is_empty());
    assert_eq!(h.service.state(), StateId::Idle);
}

#[test]
fn unknown_command_after_failures_still_resets_counter() {
    let peer = Peer::new().verify("bad", b'+').verify("pin", b'?');
    let mut h = stored("pin", &peer);
    h.service.verify(&mut h.sink).unwrap();
    assert_eq!(h.service.failures(), 1);
    h.service.verify(&mut h.sink).unwrap();
    assert_eq!(h.service.failures(), 0);
}

#[test]
fn empty_stored_credential_matches_empty_candidate() {
    let peer = Peer::new().verify("", b'-').verify("1", b'-');
    let mut h = stored("", &peer);
    assert_eq!(h.service.verify(&mut h.sink).unwrap(), Verification::ChangeRequested);
    assert_eq!(
        h.service.verify(&mut h.sink).unwrap(),
        Verification::Denied { failures: 1 }
    );
}

#[test]
fn blank_store_never_matches() {
    // An erased 24C16 reads 0xFF everywhere, which no candidate can hold.
    let peer = Peer::new().verify("", b'-');
    let mut h = Harness::new(&peer);
    assert_eq!(
        h.service.verify(&mut h.sink).unwrap(),
        Verification::Denied { failures: 1 }
    );
}
