//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual clock only (no wall-clock reads, no sleeps)
//! - Seeded RNG only
//! - Timers fire in (due time, schedule order)
//! - No rendering, audio or platform dependencies

pub mod engine;
pub mod observer;
pub mod state;
pub mod timer;

pub use engine::RoundEngine;
pub use observer::RoundObserver;
pub use state::{
    CircleColor, FailureReason, GameEvent, RngState, Round, RoundPhase, RoundSnapshot, TimerSlots,
};
pub use timer::{Fired, TimerHandle, TimerKind, TimerQueue};
