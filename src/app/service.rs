//! Control service: the hexagonal core.
//!
//! [`ControlService`] owns the phase FSM, the failure counter and the
//! tick counter shared with the timer interrupt.  It drives the peer
//! protocol over a [`LinkPort`], keeps the credential in a [`ByteStore`]
//! and clocks every timed phase from a [`TickSource`].
//!
//! ```text
//!    LinkPort ◀─▶ ┌──────────────────────────┐ ──▶ EventSink
//!   ByteStore ◀─▶ │      ControlService       │
//!  TickSource ──▶ │ register · verify · FSM   │ ──▶ ActuatorPort
//!                 └──────────────────────────┘
//! ```
//!
//! Session flow:
//!
//! ```text
//!  boot ──▶ REGISTER ──[accepted]──▶ VERIFY ──[ '-' ]──▶ REGISTER
//!             ▲  │                    │  ▲
//!             └──┘ [rejected]         └──┘ [ '+' door / denied / lockout ]
//! ```

use core::convert::Infallible;
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::config::LockConfig;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::fsm::context::{ActuatorCommands, FsmContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::protocol::{READY, Reply};
use crate::tick::TickCounter;

use super::commands::PeerCommand;
use super::events::AppEvent;
use super::lockout::LockoutState;
use super::ports::{ActuatorPort, ByteStore, EventSink, LinkError, LinkPort, TickSource};

// ───────────────────────────────────────────────────────────────
// Step outcomes
// ───────────────────────────────────────────────────────────────

/// Result of one registration exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Candidates matched; the credential is persisted.
    Accepted,
    /// Candidates differed; the store is untouched.
    Rejected,
}

/// Result of one verification exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Verified `+`: the door sequence ran to completion.
    Opened,
    /// Verified `-`: the caller should register a new credential.
    ChangeRequested,
    /// Verified, but the command byte had no meaning.
    Ignored(u8),
    /// Wrong password, threshold not yet reached.
    Denied { failures: u8 },
    /// Wrong password hit the threshold; the alarm cycle has completed.
    LockedOut,
}

// ───────────────────────────────────────────────────────────────
// ControlService
// ───────────────────────────────────────────────────────────────

pub struct ControlService<L, S, T, A> {
    config: LockConfig,
    link: L,
    store: S,
    timer: T,
    actuators: A,
    fsm: Fsm,
    ctx: FsmContext,
    /// Last commands successfully written to the actuators.
    applied: ActuatorCommands,
    lockout: LockoutState,
    ticks: Arc<TickCounter>,
}

impl<L, S, T, A> ControlService<L, S, T, A>
where
    L: LinkPort,
    S: ByteStore,
    T: TickSource,
    A: ActuatorPort,
{
    /// Validate `config`, configure the tick source and hand it the
    /// tick counter.  The timer is left stopped.
    pub fn new(config: LockConfig, link: L, store: S, mut timer: T, actuators: A) -> Result<Self> {
        config.validate()?;

        let ticks = Arc::new(TickCounter::new());
        timer.configure(&config.timer_config())?;
        timer.set_listener(ticks.clone());

        let mut ctx = FsmContext::new(&config);
        let mut fsm = Fsm::new(build_state_table(), StateId::Idle);
        fsm.start(&mut ctx);

        let lockout = LockoutState::new(config.max_failed_attempts);

        Ok(Self {
            config,
            link,
            store,
            timer,
            actuators,
            fsm,
            ctx,
            applied: ActuatorCommands::all_off(),
            lockout,
            ticks,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Force every output off and announce the service.
    pub fn start(&mut self, sink: &mut impl EventSink) -> Result<()> {
        let outcome = self.actuators.all_off().map_err(Error::from);
        self.guard(outcome, sink)?;
        self.applied = ActuatorCommands::all_off();
        sink.emit(&AppEvent::Started);
        info!("ControlService started in {:?}", self.fsm.current_state());
        Ok(())
    }

    /// Drive the protocol forever: register, then verify until the peer
    /// asks for a new credential, then register again.
    ///
    /// Only returns on an error, after the fail-safe state was applied.
    pub fn run(&mut self, sink: &mut impl EventSink) -> Result<Infallible> {
        self.start(sink)?;
        loop {
            while self.register(sink)? == Registration::Rejected {}
            while self.verify(sink)? != Verification::ChangeRequested {}
        }
    }

    // ── Protocol steps ────────────────────────────────────────

    /// One registration exchange: READY, two candidates, verdict.
    pub fn register(&mut self, sink: &mut impl EventSink) -> Result<Registration> {
        let outcome = self.try_register(sink);
        self.guard(outcome, sink)
    }

    /// One verification exchange: READY, candidate, command, verdict and
    /// whatever the verdict triggers (door sequence or alarm).
    pub fn verify(&mut self, sink: &mut impl EventSink) -> Result<Verification> {
        let outcome = self.try_verify(sink);
        self.guard(outcome, sink)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Consecutive wrong passwords since the last success or alarm.
    pub fn failures(&self) -> u8 {
        self.lockout.failures()
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    // ── Internal: registration / verification ─────────────────

    fn try_register(&mut self, sink: &mut impl EventSink) -> Result<Registration> {
        self.wait_for_ready()?;
        let first = self.receive_candidate()?;
        let second = self.receive_candidate()?;

        let accepted = match (&first, &second) {
            (Some(a), Some(b)) => a.matches(b),
            _ => false,
        };

        match first.filter(|_| accepted) {
            Some(credential) => {
                self.reply(Reply::Accepted)?;
                self.persist(&credential)?;
                info!("Registration accepted ({} bytes)", credential.len());
                sink.emit(&AppEvent::RegistrationAccepted {
                    len: credential.len(),
                });
                Ok(Registration::Accepted)
            }
            None => {
                self.reply(Reply::Denied)?;
                info!("Registration rejected: candidates differ");
                sink.emit(&AppEvent::RegistrationRejected);
                Ok(Registration::Rejected)
            }
        }
    }

    fn try_verify(&mut self, sink: &mut impl EventSink) -> Result<Verification> {
        self.wait_for_ready()?;
        let candidate = self.receive_candidate()?;
        let command = PeerCommand::from_byte(self.link.receive_byte()?);

        let matched = match &candidate {
            Some(c) => self.matches_stored(c)?,
            None => false,
        };

        if !matched {
            return self.deny(sink);
        }

        self.lockout.reset();
        self.reply(Reply::Accepted)?;
        sink.emit(&AppEvent::AccessGranted);

        match command {
            PeerCommand::OpenDoor => {
                info!("Access granted: opening door");
                self.run_timed_sequence(StateId::Unlocking, sink)?;
                Ok(Verification::Opened)
            }
            PeerCommand::ChangeCredential => {
                info!("Access granted: credential change requested");
                sink.emit(&AppEvent::CredentialChangeRequested);
                Ok(Verification::ChangeRequested)
            }
            PeerCommand::Unknown(byte) => {
                warn!("Access granted: unknown command 0x{:02X} ignored", byte);
                sink.emit(&AppEvent::UnknownCommand(byte));
                Ok(Verification::Ignored(byte))
            }
        }
    }

    fn deny(&mut self, sink: &mut impl EventSink) -> Result<Verification> {
        self.reply(Reply::Denied)?;
        let tripped = self.lockout.record_failure();
        let failures = self.lockout.failures();
        warn!(
            "Access denied ({}/{})",
            failures,
            self.lockout.threshold()
        );
        sink.emit(&AppEvent::AccessDenied {
            failures,
            threshold: self.lockout.threshold(),
        });

        if tripped {
            self.run_lockout(sink)?;
            return Ok(Verification::LockedOut);
        }

        self.link.send_byte(READY)?;
        Ok(Verification::Denied { failures })
    }

    fn run_lockout(&mut self, sink: &mut impl EventSink) -> Result<()> {
        self.reply(Reply::ErrorDetected)?;
        warn!(
            "Lockout: alarm for {} ticks, peer ignored",
            self.config.alarm_ticks
        );
        sink.emit(&AppEvent::LockoutStarted {
            ticks: self.config.alarm_ticks,
        });

        self.run_timed_sequence(StateId::Alarm, sink)?;

        self.lockout.reset();
        info!("Lockout cleared");
        sink.emit(&AppEvent::LockoutCleared);
        Ok(())
    }

    /// Read one password frame.  Malformed frames come back as `None`
    /// and always mismatch; transport faults propagate.
    fn receive_candidate(&mut self) -> Result<Option<Credential>> {
        match self.link.receive_string() {
            Ok(frame) => match Credential::new(&frame) {
                Ok(credential) => Ok(Some(credential)),
                Err(e) => {
                    debug!("Candidate rejected: {}", e);
                    Ok(None)
                }
            },
            Err(LinkError::FrameTooLong) => {
                debug!("Candidate rejected: frame too long");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn wait_for_ready(&mut self) -> Result<()> {
        loop {
            let byte = self.link.receive_byte()?;
            if byte == READY {
                return Ok(());
            }
            debug!("Discarding 0x{:02X} while waiting for READY", byte);
        }
    }

    fn reply(&mut self, reply: Reply) -> Result<()> {
        self.link.send_byte(READY)?;
        self.link.send_byte(reply.byte())?;
        Ok(())
    }

    // ── Internal: credential storage ──────────────────────────

    fn persist(&mut self, credential: &Credential) -> Result<()> {
        let base = self.config.credential_base_address;
        for (offset, byte) in (0u16..).zip(credential.terminated_bytes()) {
            self.store.write_byte(base + offset, byte)?;
        }
        Ok(())
    }

    fn matches_stored(&mut self, candidate: &Credential) -> Result<bool> {
        let base = self.config.credential_base_address;
        let store = &mut self.store;
        let matched = candidate.matches_with(|offset| {
            let offset = u16::try_from(offset).unwrap_or(u16::MAX);
            store.read_byte(base.saturating_add(offset))
        })?;
        Ok(matched)
    }

    // ── Internal: timed phases ────────────────────────────────

    /// Force the FSM into `entry` and clock it until it settles in Idle.
    ///
    /// Every pending tick is fed to the FSM on its own, so a burst of
    /// interrupts can never skip a phase.  The link is not touched until
    /// the sequence finishes.
    fn run_timed_sequence(&mut self, entry: StateId, sink: &mut impl EventSink) -> Result<()> {
        let from = self.fsm.current_state();
        self.fsm.force_transition(entry, &mut self.ctx);
        sink.emit(&AppEvent::PhaseChanged { from, to: entry });
        self.apply_commands()?;

        self.ticks.reset();
        self.timer.start()?;

        while self.fsm.current_state() != StateId::Idle {
            let pending = self.await_ticks();
            for _ in 0..pending {
                let before = self.fsm.current_state();
                self.fsm.tick(&mut self.ctx);
                let after = self.fsm.current_state();
                if after != before {
                    sink.emit(&AppEvent::PhaseChanged {
                        from: before,
                        to: after,
                    });
                    self.apply_commands()?;
                }
                if after == StateId::Idle {
                    break;
                }
            }
        }

        self.timer.stop()?;
        self.ticks.reset();
        Ok(())
    }

    /// Block until at least one tick is pending, then take them all.
    fn await_ticks(&mut self) -> u32 {
        loop {
            let pending = self.ticks.take();
            if pending > 0 {
                return pending;
            }
            self.timer.idle();
        }
    }

    /// Push changed FSM commands out to the actuators.
    fn apply_commands(&mut self) -> Result<()> {
        let want = self.ctx.commands;

        if want.rotation != self.applied.rotation || want.motor_speed != self.applied.motor_speed {
            self.actuators.rotate(want.rotation, want.motor_speed)?;
            self.applied.rotation = want.rotation;
            self.applied.motor_speed = want.motor_speed;
        }

        if want.buzzer != self.applied.buzzer {
            if want.buzzer {
                self.actuators.buzzer_on()?;
            } else {
                self.actuators.buzzer_off()?;
            }
            self.applied.buzzer = want.buzzer;
        }

        Ok(())
    }

    // ── Internal: failure path ────────────────────────────────

    fn guard<R>(&mut self, outcome: Result<R>, sink: &mut impl EventSink) -> Result<R> {
        if let Err(e) = &outcome {
            self.fail_safe(*e, sink);
        }
        outcome
    }

    /// Stop the clock, silence the buzzer and stop the motor.  Secondary
    /// failures are logged and otherwise ignored.
    fn fail_safe(&mut self, cause: Error, sink: &mut impl EventSink) {
        error!("Fail-safe after: {}", cause);

        if let Err(e) = self.timer.stop() {
            warn!("Fail-safe: timer stop failed: {}", e);
        }
        self.fsm.force_transition(StateId::Idle, &mut self.ctx);
        if let Err(e) = self.actuators.all_off() {
            warn!("Fail-safe: actuator shutdown failed: {}", e);
        }
        self.applied = ActuatorCommands::all_off();
        self.ticks.reset();

        sink.emit(&AppEvent::FailSafe(cause));
    }
}
