//! Simulation setup
//!
//! Loaded from JSON files; every field has a default so partial files work.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::sim::Segment;

/// Built-in starting setups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Identical small circles bouncing around
    #[default]
    Balls,
    /// Circles and rectangles with varied mass
    Mixed,
    /// Circles among pinned posts and angled barriers
    Obstacles,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Balls => "balls",
            Preset::Mixed => "mixed",
            Preset::Obstacles => "obstacles",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "balls" | "ball" => Some(Preset::Balls),
            "mixed" | "mix" => Some(Preset::Mixed),
            "obstacles" | "obstacle" => Some(Preset::Obstacles),
            _ => None,
        }
    }

    pub fn config(&self) -> SimConfig {
        let mut config = SimConfig::default();
        match self {
            Preset::Balls => {}
            Preset::Mixed => {
                config.random = Some(RandomBodies {
                    count: 6,
                    shape: ShapeSpec::Circle { radius: None },
                    immovable: false,
                });
                config.bodies = (0..4)
                    .map(|_| BodySpec {
                        shape: ShapeSpec::Rect {
                            width: Some(24.0),
                            height: Some(12.0),
                        },
                        mass: Some(3.0),
                        ..Default::default()
                    })
                    .collect();
                config.ranges.mass = SampleRange::new(0.5, 2.0);
                config.ranges.radius = SampleRange::new(4.0, 10.0);
            }
            Preset::Obstacles => {
                let (w, h) = (config.arena.width, config.arena.height);
                config.bodies = [(0.3, 0.3), (0.7, 0.3), (0.5, 0.6)]
                    .iter()
                    .map(|&(fx, fy)| BodySpec {
                        x: Some(w * fx),
                        y: Some(h * fy),
                        shape: ShapeSpec::Circle { radius: Some(20.0) },
                        color: Some("#404040".into()),
                        immovable: true,
                        ..Default::default()
                    })
                    .collect();
                config.segments = vec![
                    Segment::new([0.1 * w, 0.85 * h].into(), [0.4 * w, 0.75 * h].into()),
                    Segment::new([0.6 * w, 0.75 * h].into(), [0.9 * w, 0.85 * h].into()),
                ];
            }
        }
        config
    }
}

/// Arena size; walls sit at 0 and at these values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_ARENA_WIDTH,
            height: DEFAULT_ARENA_HEIGHT,
        }
    }
}

/// Inclusive uniform sampling range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRange {
    pub min: f64,
    pub max: f64,
}

impl SampleRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(SimError::config(format!(
                "{name} range must be finite with min <= max"
            )));
        }
        Ok(())
    }
}

/// Ranges used for any value a body spec leaves out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRanges {
    pub vx: SampleRange,
    pub vy: SampleRange,
    pub mass: SampleRange,
    pub radius: SampleRange,
}

impl Default for SpawnRanges {
    fn default() -> Self {
        Self {
            vx: SampleRange::new(-DEFAULT_MAX_SPEED, DEFAULT_MAX_SPEED),
            vy: SampleRange::new(-DEFAULT_MAX_SPEED, DEFAULT_MAX_SPEED),
            mass: SampleRange::fixed(DEFAULT_MASS),
            radius: SampleRange::fixed(DEFAULT_RADIUS),
        }
    }
}

/// Shape of a configured body; missing dimensions use defaults or ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpec {
    Circle {
        #[serde(default)]
        radius: Option<f64>,
    },
    Rect {
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
    },
}

impl Default for ShapeSpec {
    fn default() -> Self {
        ShapeSpec::Circle { radius: None }
    }
}

/// One explicitly configured body. `None` fields are sampled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySpec {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub vx: Option<f64>,
    pub vy: Option<f64>,
    pub mass: Option<f64>,
    pub shape: ShapeSpec,
    /// `#rgb`, `#rrggbb` or `random`
    pub color: Option<String>,
    pub immovable: bool,
}

/// Bulk population of sampled bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomBodies {
    pub count: usize,
    #[serde(default)]
    pub shape: ShapeSpec,
    #[serde(default)]
    pub immovable: bool,
}

/// Full simulation setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub arena: ArenaConfig,
    /// Events further than this past the clock are dropped
    pub horizon: f64,
    /// Seed for every sampled value
    pub seed: u64,
    /// Explicit bodies, created first and in order
    pub bodies: Vec<BodySpec>,
    /// Sampled bodies appended after the explicit ones
    pub random: Option<RandomBodies>,
    pub ranges: SpawnRanges,
    /// Static barrier segments
    pub segments: Vec<Segment>,
    /// Keep every processed event in memory
    pub record_trace: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            horizon: DEFAULT_HORIZON,
            seed: 0,
            bodies: Vec::new(),
            random: Some(RandomBodies {
                count: 10,
                shape: ShapeSpec::default(),
                immovable: false,
            }),
            ranges: SpawnRanges::default(),
            segments: Vec::new(),
            record_trace: false,
        }
    }
}

impl SimConfig {
    /// Total number of bodies this config creates
    pub fn body_count(&self) -> usize {
        self.bodies.len() + self.random.as_ref().map_or(0, |r| r.count)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let ArenaConfig { width, height } = self.arena;
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(SimError::config("arena width and height must be finite and > 0"));
        }
        if self.horizon.is_nan() || self.horizon <= 0.0 {
            return Err(SimError::config("horizon must be > 0"));
        }

        self.ranges.vx.validate("vx")?;
        self.ranges.vy.validate("vy")?;
        self.ranges.mass.validate("mass")?;
        self.ranges.radius.validate("radius")?;
        if self.ranges.mass.min <= 0.0 {
            return Err(SimError::config("mass range must be > 0"));
        }
        if self.ranges.radius.min <= 0.0 {
            return Err(SimError::config("radius range must be > 0"));
        }

        for (i, spec) in self.bodies.iter().enumerate() {
            if let Some(mass) = spec.mass {
                if !mass.is_finite() || mass <= 0.0 {
                    return Err(SimError::config(format!("body {i}: mass must be finite and > 0")));
                }
            }
            let dims = match spec.shape {
                ShapeSpec::Circle { radius } => vec![radius],
                ShapeSpec::Rect { width, height } => vec![width, height],
            };
            if dims.iter().flatten().any(|d| !d.is_finite() || *d <= 0.0) {
                return Err(SimError::config(format!("body {i}: shape size must be finite and > 0")));
            }
        }

        for (i, seg) in self.segments.iter().enumerate() {
            if !seg.start.is_finite() || !seg.end.is_finite() || seg.length() == 0.0 {
                return Err(SimError::config(format!("segment {i}: endpoints must be finite and distinct")));
            }
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Config saved to {}", path.as_ref().display());
        Ok(())
    }
}
