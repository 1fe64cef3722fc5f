//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (log to serial, count them
//! in a test, ...).
//!
//! Events never carry credential bytes, only lengths and outcomes.

use crate::error::Error;
use crate::fsm::StateId;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started; actuators are off and the FSM is idle.
    Started,

    /// Both candidates matched and the credential was stored.
    RegistrationAccepted { len: usize },

    /// The two candidates differed (or were malformed); nothing stored.
    RegistrationRejected,

    /// The candidate matched the stored credential.
    AccessGranted,

    /// The candidate did not match.
    AccessDenied { failures: u8, threshold: u8 },

    /// Threshold reached, alarm running for `ticks`.
    LockoutStarted { ticks: u32 },

    /// Alarm finished; verification resumes with a cleared counter.
    LockoutCleared,

    /// A timed phase ended and the next one began.
    PhaseChanged { from: StateId, to: StateId },

    /// The peer asked to replace the credential.
    CredentialChangeRequested,

    /// A verified peer sent a command byte with no meaning.
    UnknownCommand(u8),

    /// An error escaped a protocol step; outputs were forced off.
    FailSafe(Error),
}
