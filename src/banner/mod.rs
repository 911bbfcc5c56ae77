//! Advertising banner display engine.
//!
//! Split into a pure state machine ([`machine`]) that maps events to
//! effects, and an async driver ([`engine`]) that owns the timers, the
//! fetch lifecycle, and the telemetry tasks. The machine is exhaustively
//! unit-tested; the driver only translates effects into tokio tasks.

pub mod engine;
pub mod machine;

pub use engine::BannerEngine;
pub use machine::{BannerMachine, Effect, Event, RenderState};
