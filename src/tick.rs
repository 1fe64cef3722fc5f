//! Interrupt-side tick bookkeeping.
//!
//! The tick source's interrupt (or timer task) only ever touches a
//! [`TickCounter`]: one atomic increment, nothing else.  The control
//! service drains the counter from the main task and feeds each tick to
//! the phase FSM.
//!
//! ```text
//! ┌─────────────┐  on_tick()  ┌──────────────┐  take()  ┌──────────────┐
//! │ Timer ISR   │────────────▶│ TickCounter  │─────────▶│ ControlSvc   │
//! │ / esp_timer │             │ (AtomicU32)  │          │ (main task)  │
//! └─────────────┘             └──────────────┘          └──────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use std::sync::Arc;

/// Capability handed to a tick source once at startup.
/// Implementations must be O(1) and non-blocking.
pub trait TickListener {
    fn on_tick(&self);
}

/// Listener handle as stored by tick sources.
pub type SharedListener = Arc<dyn TickListener + Send + Sync>;

/// Ticks elapsed since the last drain.
#[derive(Debug, Default)]
pub struct TickCounter {
    pending: AtomicU32,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
        }
    }

    /// Record one tick.  Safe from interrupt context.
    pub fn increment(&self) {
        self.pending.fetch_add(1, Ordering::Release);
    }

    /// Ticks recorded and not yet taken.
    pub fn get(&self) -> u32 {
        self.pending.load(Ordering::Acquire)
    }

    /// Take every pending tick, leaving zero behind.
    pub fn take(&self) -> u32 {
        self.pending.swap(0, Ordering::AcqRel)
    }

    pub fn reset(&self) {
        self.pending.store(0, Ordering::Release);
    }
}

impl TickListener for TickCounter {
    fn on_tick(&self) {
        self.increment();
    }
}
