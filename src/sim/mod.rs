//! Deterministic simulation module
//!
//! All collision logic lives here. This module must be pure and deterministic:
//! - Time advances in jumps between predicted events, never fixed ticks
//! - Seeded RNG only
//! - Stable ordering (equal event times pop in insertion order)
//! - No platform dependencies; drawing only goes through `render::Renderer`

pub mod body;
pub mod event;
pub mod geometry;
pub mod response;
pub mod spawn;
pub mod system;

pub use body::{Body, BodyBuilder, Color, Shape};
pub use event::{Event, EventKind, EventQueue, EventRecord};
pub use geometry::{Segment, apparent_radius};
pub use spawn::build_bodies;
pub use system::{CollisionSystem, RunLimits, RunSummary, StopReason};
