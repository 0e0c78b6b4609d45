//! Tunables for the playfield and the trainer.
//!
//! Both configs deserialize from JSON with every field optional; missing
//! fields fall back to the defaults below.

use crate::geom::Playfield;
use crate::render::Rgb;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSize {
    pub w: u32,
    pub h: u32,
}

impl SpriteSize {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

/// Collision/draw box size for each kind of sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteSizes {
    pub agent: SpriteSize,
    pub food: SpriteSize,
    pub killer: SpriteSize,
    pub decoration: SpriteSize,
}

impl Default for SpriteSizes {
    fn default() -> Self {
        Self {
            agent: SpriteSize::new(32, 32),
            food: SpriteSize::new(20, 20),
            killer: SpriteSize::new(28, 28),
            decoration: SpriteSize::new(24, 24),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub playfield: Playfield,
    pub food_count: usize,
    pub killer_count: usize,
    pub decoration_count: usize,
    pub sprites: SpriteSizes,
    /// Entity speeds are drawn uniformly from `[speed_min, speed_max]`.
    pub speed_min: f64,
    pub speed_max: f64,
    /// Agent spawn point as a fraction of the playfield size.
    pub agent_start: (f64, f64),
    /// Seed for the world's generator. `None` seeds from the OS.
    pub seed: Option<u64>,
    pub background: Rgb,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            playfield: Playfield::new(1200, 800),
            food_count: 10,
            killer_count: 10,
            decoration_count: 10,
            sprites: SpriteSizes::default(),
            speed_min: 0.5,
            speed_max: 2.0,
            agent_start: (0.5, 0.7),
            seed: None,
            background: Rgb::new(230, 230, 230),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("playfield must be non-empty, got {width}x{height}")]
    EmptyPlayfield { width: u32, height: u32 },
    #[error("{0} sprite must have a non-zero size")]
    EmptySprite(&'static str),
    #[error("speed range [{min}, {max}] must be ordered, finite and non-negative")]
    SpeedRange { min: f64, max: f64 },
    #[error("agent start ({x}, {y}) must be fractions in [0, 1]")]
    AgentStart { x: f64, y: f64 },
}

impl WorldConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading world config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing world config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Playfield { width, height } = self.playfield;
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyPlayfield { width, height });
        }
        let sprites = [
            ("agent", self.sprites.agent),
            ("food", self.sprites.food),
            ("killer", self.sprites.killer),
            ("decoration", self.sprites.decoration),
        ];
        for (name, size) in sprites {
            if size.w == 0 || size.h == 0 {
                return Err(ConfigError::EmptySprite(name));
            }
        }
        let (min, max) = (self.speed_min, self.speed_max);
        if !(min.is_finite() && max.is_finite() && min >= 0.0 && min <= max) {
            return Err(ConfigError::SpeedRange { min, max });
        }
        let (x, y) = self.agent_start;
        if !((0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y)) {
            return Err(ConfigError::AgentStart { x, y });
        }
        Ok(())
    }
}

/// Hyper-parameters for the tabular Q-learning population trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub population: usize,
    pub epochs: usize,
    /// Steps after which an episode is cut short.
    pub step_limit: usize,
    pub epsilon: f32,
    pub min_epsilon: f32,
    pub decay: f32,
    pub alpha: f32,
    pub gamma: f32,
    /// Half-width of the uniform jitter applied to mutated children.
    pub mutation_sigma: f32,
    pub terminate_on_kill: bool,
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            population: 10,
            epochs: 50,
            step_limit: 3000,
            epsilon: 0.3,
            min_epsilon: 0.1,
            decay: 0.9985,
            alpha: 0.4,
            gamma: 0.95,
            mutation_sigma: 0.25,
            terminate_on_kill: true,
            seed: 0,
        }
    }
}

impl TrainerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading trainer config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing trainer config {}", path.display()))
    }
}
