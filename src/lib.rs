//! Forage arena: an agent collects food and dodges killers on a bounded
//! playfield.
//!
//! [`World`] is the simulation. Drive it with [`World::step`] for
//! programmatic control, or wrap it in a [`Session`] for keyboard play with a
//! [`Renderer`] and an [`InputSource`]. [`ForageEnv`] and [`EvoTrainer`] add
//! episodes and tabular Q-learning on top.

pub mod agent;
pub mod config;
pub mod entity;
pub mod env;
pub mod geom;
pub mod input;
pub mod logging;
pub mod qlearn;
pub mod render;
pub mod session;
pub mod world;

pub use agent::{Action, Agent, Direction};
pub use config::{ConfigError, SpriteSize, SpriteSizes, TrainerConfig, WorldConfig};
pub use entity::{Entity, EntityKind};
pub use env::{ForageEnv, StepResult};
pub use geom::{Playfield, Rect, Vec2};
pub use input::{InputEvent, InputSource, KeyboardControl, ScriptedInput};
pub use logging::init as init_logging;
pub use qlearn::{EvoTrainer, QAgent};
pub use render::{Canvas, Renderer, Rgb, Sprite};
pub use session::{Session, SessionState};
pub use world::{Collisions, Observation, StepOutcome, World};
