//! Fuzz target: `ControlService::run`
//!
//! Treats the input as everything a hostile HMI unit sends, runs the full
//! protocol until the script is exhausted, and asserts the service always
//! ends in the fail-safe state with the timer stopped.
//!
//! cargo fuzz run fuzz_session

#![no_main]

use doorlock::adapters::memory_store::MemoryStore;
use doorlock::app::events::AppEvent;
use doorlock::app::ports::{
    ActuatorError, ActuatorPort, EventSink, LinkError, Rotation, TickSource, TimerConfig,
    TimerError,
};
use doorlock::app::service::ControlService;
use doorlock::config::LockConfig;
use doorlock::error::Error;
use doorlock::fsm::StateId;
use doorlock::link::SerialLink;
use doorlock::link::transport::BufferTransport;
use doorlock::tick::SharedListener;
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct InstantTimer {
    listener: Option<SharedListener>,
    running: bool,
}

impl TickSource for InstantTimer {
    fn configure(&mut self, _config: &TimerConfig) -> Result<(), TimerError> {
        Ok(())
    }
    fn set_listener(&mut self, listener: SharedListener) {
        self.listener = Some(listener);
    }
    fn start(&mut self) -> Result<(), TimerError> {
        self.running = true;
        Ok(())
    }
    fn stop(&mut self) -> Result<(), TimerError> {
        self.running = false;
        Ok(())
    }
    fn idle(&mut self) {
        assert!(self.running, "waited on a stopped timer");
        if let Some(l) = &self.listener {
            l.on_tick();
        }
    }
}

#[derive(Default)]
struct Outputs {
    buzzer: bool,
    rotation: Option<Rotation>,
}

impl ActuatorPort for Outputs {
    fn rotate(&mut self, rotation: Rotation, _speed: u8) -> Result<(), ActuatorError> {
        self.rotation = Some(rotation);
        Ok(())
    }
    fn buzzer_on(&mut self) -> Result<(), ActuatorError> {
        self.buzzer = true;
        Ok(())
    }
    fn buzzer_off(&mut self) -> Result<(), ActuatorError> {
        self.buzzer = false;
        Ok(())
    }
    fn all_off(&mut self) -> Result<(), ActuatorError> {
        self.buzzer = false;
        self.rotation = Some(Rotation::Stop);
        Ok(())
    }
}

struct LastEvent(Option<AppEvent>);

impl EventSink for LastEvent {
    fn emit(&mut self, event: &AppEvent) {
        self.0 = Some(event.clone());
    }
}

fuzz_target!(|data: &[u8]| {
    let config = LockConfig {
        unlock_ticks: 2,
        hold_open_ticks: 1,
        lock_ticks: 2,
        alarm_ticks: 3,
        ..Default::default()
    };
    let link = SerialLink::new(BufferTransport::with_inbound(data));
    let Ok(mut service) = ControlService::new(
        config,
        link,
        MemoryStore::new(),
        InstantTimer::default(),
        Outputs::default(),
    ) else {
        return;
    };
    let mut sink = LastEvent(None);

    let Err(err) = service.run(&mut sink);

    assert_eq!(err, Error::Link(LinkError::Disconnected));
    assert_eq!(sink.0, Some(AppEvent::FailSafe(err)));
    assert_eq!(service.state(), StateId::Idle);
    assert!(!service.timer().running);
    assert!(!service.actuators().buzzer);
    assert_eq!(service.actuators().rotation, Some(Rotation::Stop));
});
