//! Concrete state handler functions and table builder.
//!
//! Each phase is three plain `fn` pointers held in a static-size table.
//!
//! ```text
//!  IDLE ──[open]──▶ UNLOCKING ──[unlock_ticks]──▶ HOLD_OPEN
//!    ▲                                                │
//!    │                                         [hold_open_ticks]
//!    │                                                ▼
//!    ├──────────────[lock_ticks]────────────────── LOCKING
//!    │
//!    └──────[alarm_ticks]────── ALARM ◀──[lockout]── IDLE
//! ```
//!
//! Entry into UNLOCKING and ALARM is forced by the control service; every
//! other edge is taken by `on_update` once the phase clock runs out.

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::app::ports::Rotation;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: StateId::Unlocking,
            name: "Unlocking",
            on_enter: Some(unlocking_enter),
            on_exit: None,
            on_update: unlocking_update,
        },
        StateDescriptor {
            id: StateId::HoldOpen,
            name: "HoldOpen",
            on_enter: Some(hold_open_enter),
            on_exit: None,
            on_update: hold_open_update,
        },
        StateDescriptor {
            id: StateId::Locking,
            name: "Locking",
            on_enter: Some(locking_enter),
            on_exit: Some(locking_exit),
            on_update: locking_update,
        },
        StateDescriptor {
            id: StateId::Alarm,
            name: "Alarm",
            on_enter: Some(alarm_enter),
            on_exit: Some(alarm_exit),
            on_update: alarm_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: door locked, waiting on the protocol loop
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.drive_motor(Rotation::Stop);
    ctx.commands.buzzer = false;
    debug!("IDLE: bolt thrown, buzzer off");
}

fn idle_update(_ctx: &mut FsmContext) -> Option<StateId> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNLOCKING: motor forward
// ═══════════════════════════════════════════════════════════════════════════

fn unlocking_enter(ctx: &mut FsmContext) {
    ctx.drive_motor(Rotation::Forward);
    info!(
        "UNLOCKING: motor forward at {}% for {} ticks",
        ctx.commands.motor_speed, ctx.timings.unlock_ticks
    );
}

fn unlocking_update(ctx: &mut FsmContext) -> Option<StateId> {
    (ctx.ticks_in_state >= ctx.timings.unlock_ticks).then_some(StateId::HoldOpen)
}

// ═══════════════════════════════════════════════════════════════════════════
//  HOLD_OPEN: motor stopped, door free
// ═══════════════════════════════════════════════════════════════════════════

fn hold_open_enter(ctx: &mut FsmContext) {
    ctx.drive_motor(Rotation::Stop);
    info!("HOLD_OPEN: door free for {} ticks", ctx.timings.hold_open_ticks);
}

fn hold_open_update(ctx: &mut FsmContext) -> Option<StateId> {
    (ctx.ticks_in_state >= ctx.timings.hold_open_ticks).then_some(StateId::Locking)
}

// ═══════════════════════════════════════════════════════════════════════════
//  LOCKING: motor reverse
// ═══════════════════════════════════════════════════════════════════════════

fn locking_enter(ctx: &mut FsmContext) {
    ctx.drive_motor(Rotation::Reverse);
    info!(
        "LOCKING: motor reverse at {}% for {} ticks",
        ctx.commands.motor_speed, ctx.timings.lock_ticks
    );
}

fn locking_exit(ctx: &mut FsmContext) {
    ctx.drive_motor(Rotation::Stop);
}

fn locking_update(ctx: &mut FsmContext) -> Option<StateId> {
    (ctx.ticks_in_state >= ctx.timings.lock_ticks).then_some(StateId::Idle)
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALARM: buzzer on, protocol suspended
// ═══════════════════════════════════════════════════════════════════════════

fn alarm_enter(ctx: &mut FsmContext) {
    ctx.drive_motor(Rotation::Stop);
    ctx.commands.buzzer = true;
    warn!("ALARM: buzzer on for {} ticks", ctx.timings.alarm_ticks);
}

fn alarm_exit(ctx: &mut FsmContext) {
    ctx.commands.buzzer = false;
    info!("ALARM: cleared");
}

fn alarm_update(ctx: &mut FsmContext) -> Option<StateId> {
    (ctx.ticks_in_state >= ctx.timings.alarm_ticks).then_some(StateId::Idle)
}
