//! Mock hardware for integration tests.
//!
//! The timer and the actuators append to one shared [`Timeline`], so tests
//! can assert on the interleaving of motor commands, buzzer changes and
//! ticks without touching real GPIO/PWM registers.  The link is the real
//! [`SerialLink`] over a scripted [`BufferTransport`]; once the script runs
//! dry the link reports a disconnect.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use doorlock::adapters::memory_store::MemoryStore;
use doorlock::app::events::AppEvent;
use doorlock::app::ports::{
    ActuatorError, ActuatorPort, EventSink, Rotation, TickSource, TimerConfig, TimerError,
};
use doorlock::app::service::ControlService;
use doorlock::config::LockConfig;
use doorlock::link::SerialLink;
use doorlock::link::transport::BufferTransport;
use doorlock::protocol::{READY, WIRE_TERMINATOR};
use doorlock::tick::SharedListener;

// ── Timeline ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    Motor { rotation: Rotation, speed: u8 },
    BuzzerOn,
    BuzzerOff,
    AllOff,
    TimerStart,
    TimerStop,
    Tick,
}

pub type Timeline = Rc<RefCell<Vec<Trace>>>;

/// Ticks seen after each motor command, in order.
pub fn motor_phases(timeline: &Timeline) -> Vec<(Rotation, u32)> {
    let mut phases: Vec<(Rotation, u32)> = Vec::new();
    for t in timeline.borrow().iter() {
        match t {
            Trace::Motor { rotation, .. } => phases.push((*rotation, 0)),
            Trace::Tick => {
                if let Some(last) = phases.last_mut() {
                    last.1 += 1;
                }
            }
            _ => {}
        }
    }
    phases
}

/// Ticks seen between each BuzzerOn and the following BuzzerOff.
pub fn alarm_lengths(timeline: &Timeline) -> Vec<u32> {
    let mut lengths = Vec::new();
    let mut current: Option<u32> = None;
    for t in timeline.borrow().iter() {
        match t {
            Trace::BuzzerOn => current = Some(0),
            Trace::Tick => {
                if let Some(n) = current.as_mut() {
                    *n += 1;
                }
            }
            Trace::BuzzerOff | Trace::AllOff => {
                if let Some(n) = current.take() {
                    lengths.push(n);
                }
            }
            _ => {}
        }
    }
    lengths
}

pub fn count(timeline: &Timeline, trace: Trace) -> usize {
    timeline.borrow().iter().filter(|t| **t == trace).count()
}

// ── MockTimer ─────────────────────────────────────────────────

/// Fires `burst` ticks per `idle()` while started.
pub struct MockTimer {
    timeline: Timeline,
    listener: Option<SharedListener>,
    running: bool,
    burst: u32,
    pub config: Option<TimerConfig>,
    pub fail_start: bool,
}

impl MockTimer {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            listener: None,
            running: false,
            burst: 1,
            config: None,
            fail_start: false,
        }
    }

    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = burst.max(1);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl TickSource for MockTimer {
    fn configure(&mut self, config: &TimerConfig) -> Result<(), TimerError> {
        self.config = Some(*config);
        Ok(())
    }

    fn set_listener(&mut self, listener: SharedListener) {
        self.listener = Some(listener);
    }

    fn start(&mut self) -> Result<(), TimerError> {
        if self.fail_start {
            return Err(TimerError::StartFailed(-1));
        }
        self.running = true;
        self.timeline.borrow_mut().push(Trace::TimerStart);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TimerError> {
        if self.running {
            self.timeline.borrow_mut().push(Trace::TimerStop);
        }
        self.running = false;
        Ok(())
    }

    fn idle(&mut self) {
        assert!(self.running, "service waited on a stopped timer");
        let listener = self.listener.as_ref().expect("listener not injected");
        for _ in 0..self.burst {
            self.timeline.borrow_mut().push(Trace::Tick);
            listener.on_tick();
        }
    }
}

// ── MockActuators ─────────────────────────────────────────────

pub struct MockActuators {
    timeline: Timeline,
    /// Fail the n-th `rotate` call (1-based).
    pub fail_rotate_at: Option<usize>,
    rotations: usize,
}

impl MockActuators {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            fail_rotate_at: None,
            rotations: 0,
        }
    }

    /// Last buzzer state implied by the timeline.
    pub fn buzzer_on(&self) -> bool {
        self.timeline
            .borrow()
            .iter()
            .rev()
            .find_map(|t| match t {
                Trace::BuzzerOn => Some(true),
                Trace::BuzzerOff | Trace::AllOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Last motor rotation implied by the timeline.
    pub fn rotation(&self) -> Rotation {
        self.timeline
            .borrow()
            .iter()
            .rev()
            .find_map(|t| match t {
                Trace::Motor { rotation, .. } => Some(*rotation),
                Trace::AllOff => Some(Rotation::Stop),
                _ => None,
            })
            .unwrap_or(Rotation::Stop)
    }
}

impl ActuatorPort for MockActuators {
    fn rotate(&mut self, rotation: Rotation, speed_percent: u8) -> Result<(), ActuatorError> {
        self.rotations += 1;
        if self.fail_rotate_at == Some(self.rotations) {
            return Err(ActuatorError::PwmWriteFailed);
        }
        self.timeline.borrow_mut().push(Trace::Motor {
            rotation,
            speed: speed_percent,
        });
        Ok(())
    }

    fn buzzer_on(&mut self) -> Result<(), ActuatorError> {
        self.timeline.borrow_mut().push(Trace::BuzzerOn);
        Ok(())
    }

    fn buzzer_off(&mut self) -> Result<(), ActuatorError> {
        self.timeline.borrow_mut().push(Trace::BuzzerOff);
        Ok(())
    }

    fn all_off(&mut self) -> Result<(), ActuatorError> {
        self.timeline.borrow_mut().push(Trace::AllOff);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Peer script builder ───────────────────────────────────────

/// Bytes the HMI unit would send, in order.
#[derive(Default, Clone)]
pub struct Peer {
    bytes: Vec<u8>,
}

impl Peer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(mut self) -> Self {
        self.bytes.push(READY);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn string(mut self, s: &str) -> Self {
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(WIRE_TERMINATOR);
        self
    }

    pub fn command(mut self, byte: u8) -> Self {
        self.bytes.push(byte);
        self
    }

    /// One registration attempt.
    pub fn register(self, first: &str, second: &str) -> Self {
        self.ready().string(first).string(second)
    }

    /// One verification attempt.
    pub fn verify(self, password: &str, command: u8) -> Self {
        self.ready().string(password).command(command)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

// ── Harness ───────────────────────────────────────────────────

pub type TestService = ControlService<SerialLink<BufferTransport>, MemoryStore, MockTimer, MockActuators>;

pub struct Harness {
    pub service: TestService,
    pub timeline: Timeline,
    pub sink: RecordingSink,
}

impl Harness {
    pub fn new(peer: &Peer) -> Self {
        Self::build(LockConfig::default(), peer, 1, MemoryStore::new())
    }

    pub fn with_config(config: LockConfig, peer: &Peer) -> Self {
        Self::build(config, peer, 1, MemoryStore::new())
    }

    pub fn build(config: LockConfig, peer: &Peer, burst: u32, store: MemoryStore) -> Self {
        Self::build_with(config, peer, store, |t| t.with_burst(burst), |a| a)
    }

    pub fn build_with(
        config: LockConfig,
        peer: &Peer,
        store: MemoryStore,
        timer: impl FnOnce(MockTimer) -> MockTimer,
        actuators: impl FnOnce(MockActuators) -> MockActuators,
    ) -> Self {
        let timeline: Timeline = Rc::default();
        let link = SerialLink::new(BufferTransport::with_inbound(peer.bytes()));
        let service = ControlService::new(
            config,
            link,
            store,
            timer(MockTimer::new(timeline.clone())),
            actuators(MockActuators::new(timeline.clone())),
        )
        .expect("valid config");
        Self {
            service,
            timeline,
            sink: RecordingSink::new(),
        }
    }

    /// Everything the service has sent to the peer so far.
    pub fn sent(&self) -> &[u8] {
        self.service.link().transport().outbound()
    }

    /// Drop the recorded replies, returning them.
    pub fn take_sent(&mut self) -> Vec<u8> {
        self.service.link_mut().transport_mut().take_outbound()
    }

    /// Stored credential bytes, up to and including the terminator.
    pub fn stored_credential(&self) -> Vec<u8> {
        let base = self.service.config().credential_base_address;
        let cells = self.service.store().slice(base, 6);
        match cells.iter().position(|&b| b == 0) {
            Some(end) => cells[..=end].to_vec(),
            None => cells.to_vec(),
        }
    }

    /// A store already holding `password` at the default base address.
    pub fn store_with(password: &str) -> MemoryStore {
        use doorlock::app::ports::ByteStore;
        let mut store = MemoryStore::new();
        let base = LockConfig::default().credential_base_address;
        for (i, b) in password.bytes().chain(std::iter::once(0)).enumerate() {
            store.write_byte(base + i as u16, b).unwrap();
        }
        store
    }
}
