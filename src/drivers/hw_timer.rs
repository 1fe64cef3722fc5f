//! Periodic tick source.
//!
//! On ESP-IDF: a periodic `esp_timer` whose callback hands each expiry to
//! the injected [`TickListener`](crate::tick::TickListener).  The callback
//! runs in the esp_timer task (not an ISR) and only bumps an atomic.
//!
//! On host/test: ticks are derived from `std::time::Instant` inside
//! [`TickSource::idle`], so simulation runs in real time without threads.

use crate::app::ports::{TickSource, TimerConfig, TimerError};
use crate::tick::SharedListener;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(not(target_os = "espidf"))]
use std::time::{Duration, Instant};

/// Upper bound on one `idle()` wait, in microseconds.
const MAX_IDLE_US: u64 = 10_000;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` points at the `SharedListener` boxed inside the owning
    // `HwTimer`; the timer is deleted before that box is dropped or replaced.
    let listener = unsafe { &*(arg as *const SharedListener) };
    listener.on_tick();
}

pub struct HwTimer {
    config: Option<TimerConfig>,
    /// Boxed so its address stays fixed while the C timer holds it.
    listener: Option<Box<SharedListener>>,
    running: bool,
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,
    #[cfg(not(target_os = "espidf"))]
    started_at: Option<Instant>,
    #[cfg(not(target_os = "espidf"))]
    delivered: u64,
}

impl HwTimer {
    pub fn new() -> Self {
        Self {
            config: None,
            listener: None,
            running: false,
            #[cfg(target_os = "espidf")]
            handle: core::ptr::null_mut(),
            #[cfg(not(target_os = "espidf"))]
            started_at: None,
            #[cfg(not(target_os = "espidf"))]
            delivered: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn period_us(&self) -> Result<u64, TimerError> {
        self.config
            .as_ref()
            .map(|c| c.period_us().max(1))
            .ok_or(TimerError::NotConfigured)
    }

    fn idle_us(&self) -> u64 {
        self.period_us().map_or(MAX_IDLE_US, |p| (p / 4).clamp(1, MAX_IDLE_US))
    }
}

impl Default for HwTimer {
    fn default() -> Self {
        Self::new()
    }
}

// ── ESP-IDF backend ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl HwTimer {
    fn ensure_created(&mut self) -> Result<(), TimerError> {
        if !self.handle.is_null() {
            return Ok(());
        }
        let listener = self.listener.as_ref().ok_or(TimerError::NotConfigured)?;
        let arg = &**listener as *const SharedListener as *mut core::ffi::c_void;

        let args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg,
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"lock_tick\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        // SAFETY: `args` outlives the call; `arg` stays valid until
        // `delete()` runs (see `set_listener` and `Drop`).
        let ret = unsafe { esp_timer_create(&args, &raw mut self.handle) };
        if ret != ESP_OK {
            self.handle = core::ptr::null_mut();
            return Err(TimerError::CreateFailed(ret));
        }
        Ok(())
    }

    fn delete(&mut self) {
        if self.handle.is_null() {
            return;
        }
        // SAFETY: handle was returned by esp_timer_create and is deleted once.
        unsafe {
            if self.running {
                esp_timer_stop(self.handle);
            }
            esp_timer_delete(self.handle);
        }
        self.handle = core::ptr::null_mut();
        self.running = false;
    }
}

#[cfg(target_os = "espidf")]
impl Drop for HwTimer {
    fn drop(&mut self) {
        self.delete();
    }
}

#[cfg(target_os = "espidf")]
impl TickSource for HwTimer {
    fn configure(&mut self, config: &TimerConfig) -> Result<(), TimerError> {
        if self.running {
            self.stop()?;
        }
        self.config = Some(*config);
        info!("hw_timer: tick every {} us", config.period_us());
        Ok(())
    }

    fn set_listener(&mut self, listener: SharedListener) {
        self.delete();
        self.listener = Some(Box::new(listener));
    }

    fn start(&mut self) -> Result<(), TimerError> {
        let period = self.period_us()?;
        self.ensure_created()?;
        if self.running {
            return Ok(());
        }
        // SAFETY: handle is a live esp_timer created above.
        let ret = unsafe { esp_timer_start_periodic(self.handle, period) };
        if ret != ESP_OK {
            return Err(TimerError::StartFailed(ret));
        }
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TimerError> {
        if !self.running || self.handle.is_null() {
            self.running = false;
            return Ok(());
        }
        // SAFETY: handle is a live, running esp_timer.
        let ret = unsafe { esp_timer_stop(self.handle) };
        if ret != ESP_OK {
            return Err(TimerError::StopFailed(ret));
        }
        self.running = false;
        Ok(())
    }

    fn idle(&mut self) {
        let ms = (self.idle_us() / 1000).max(1) as u32;
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }
}

// ── Host simulation backend ───────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl TickSource for HwTimer {
    fn configure(&mut self, config: &TimerConfig) -> Result<(), TimerError> {
        self.stop()?;
        self.config = Some(*config);
        log::info!("hw_timer(sim): tick every {} us", config.period_us());
        Ok(())
    }

    fn set_listener(&mut self, listener: SharedListener) {
        self.listener = Some(Box::new(listener));
    }

    fn start(&mut self) -> Result<(), TimerError> {
        self.period_us()?;
        if self.listener.is_none() {
            return Err(TimerError::NotConfigured);
        }
        if !self.running {
            self.started_at = Some(Instant::now());
            self.delivered = 0;
            self.running = true;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TimerError> {
        self.running = false;
        self.started_at = None;
        Ok(())
    }

    fn idle(&mut self) {
        std::thread::sleep(Duration::from_micros(self.idle_us()));

        let (Some(started), Some(listener), Ok(period)) =
            (self.started_at, self.listener.as_ref(), self.period_us())
        else {
            return;
        };
        if !self.running {
            return;
        }
        let due = started.elapsed().as_micros() as u64 / period;
        while self.delivered < due {
            listener.on_tick();
            self.delivered += 1;
        }
    }
}
