//! Bounce Sim - event-driven rigid body collisions in a 2D arena
//!
//! Core modules:
//! - `sim`: Deterministic event-driven engine (bodies, contact prediction, response)
//! - `render`: Drawing collaborator contract and headless renderers
//! - `settings`: Data-driven simulation setup
//! - `error`: Error kinds shared by the crate

pub mod error;
pub mod render;
pub mod settings;
pub mod sim;

pub use error::{Result, SimError};
pub use settings::SimConfig;
pub use sim::{Body, CollisionSystem, RunLimits, RunSummary, Shape};

/// Simulation defaults
pub mod consts {
    /// Arena dimensions (matches the classic 500x500 window)
    pub const DEFAULT_ARENA_WIDTH: f64 = 500.0;
    pub const DEFAULT_ARENA_HEIGHT: f64 = 500.0;

    /// Events further than this past the clock are not actionable
    pub const DEFAULT_HORIZON: f64 = 1000.0;

    /// Body defaults
    pub const DEFAULT_RADIUS: f64 = 5.0;
    pub const DEFAULT_RECT_SIZE: f64 = 10.0;
    pub const DEFAULT_MASS: f64 = 1.0;
    /// Random velocity components are drawn from [-MAX, MAX]
    pub const DEFAULT_MAX_SPEED: f64 = 200.0;

    /// Placement attempts per random body before giving up
    pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

    /// Centres closer than this cannot define a contact normal
    pub const CONTACT_EPSILON: f64 = 1e-12;
}
