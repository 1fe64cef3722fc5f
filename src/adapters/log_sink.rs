//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (UART console on the board, stderr on the host).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::fsm::StateId;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | outputs off, awaiting registration");
            }
            AppEvent::RegistrationAccepted { len } => {
                info!("AUTH | credential registered, len={}", len);
            }
            AppEvent::RegistrationRejected => {
                info!("AUTH | registration rejected, candidates differ");
            }
            AppEvent::AccessGranted => {
                info!("AUTH | access granted");
            }
            AppEvent::AccessDenied {
                failures,
                threshold,
            } => {
                warn!("AUTH | access denied, failures={}/{}", failures, threshold);
            }
            AppEvent::LockoutStarted { ticks } => {
                warn!("LOCKOUT | alarm on for {} ticks", ticks);
            }
            AppEvent::LockoutCleared => {
                info!("LOCKOUT | cleared");
            }
            AppEvent::PhaseChanged { from, to } => {
                let tag = if *to == StateId::Alarm || *from == StateId::Alarm {
                    "LOCKOUT"
                } else {
                    "DOOR"
                };
                info!("{} | {:?} -> {:?}", tag, from, to);
            }
            AppEvent::CredentialChangeRequested => {
                info!("AUTH | credential change requested");
            }
            AppEvent::UnknownCommand(byte) => {
                warn!("LINK | unknown command 0x{:02X} ignored", byte);
            }
            AppEvent::FailSafe(cause) => {
                error!("FAILSAFE | outputs forced off: {}", cause);
            }
        }
    }
}
