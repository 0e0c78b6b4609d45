//! The playfield: one agent, three entity populations and the score.

use crate::agent::{Action, Agent};
use crate::config::WorldConfig;
use crate::entity::{Entity, EntityKind};
use crate::geom::Vec2;
use crate::render::{Renderer, Rgb, Sprite};
use log::{debug, info, trace};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Positions of everything on the field after a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub agent: Vec2,
    pub foods: Vec<Vec2>,
    pub killers: Vec<Vec2>,
    pub decorations: Vec<Vec2>,
}

/// Result of resolving agent contacts for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Collisions {
    /// Killer penalty if any killer was touched, otherwise the food reward.
    pub reward: i32,
    pub consumed: usize,
    pub killed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub reward: i32,
    pub killed: bool,
    pub consumed: usize,
    pub observation: Observation,
}

pub struct World<R = SmallRng> {
    config: WorldConfig,
    rng: R,
    agent: Agent,
    foods: Vec<Entity>,
    killers: Vec<Entity>,
    decorations: Vec<Entity>,
    score: u64,
    frames: u64,
}

impl World<SmallRng> {
    /// Build a world seeded from `config.seed`, or from OS entropy when unset.
    pub fn new(config: WorldConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> World<R> {
    /// Populate a fresh world, drawing every entity from `rng`.
    pub fn with_rng(config: WorldConfig, mut rng: R) -> Self {
        let agent = Agent::spawn(&config);
        let mut populate = |kind: EntityKind, count: usize| -> Vec<Entity> {
            (0..count).map(|_| Entity::spawn(kind, &config, &mut rng)).collect()
        };
        let foods = populate(EntityKind::Food, config.food_count);
        let killers = populate(EntityKind::Killer, config.killer_count);
        let decorations = populate(EntityKind::Decoration, config.decoration_count);
        info!(
            "world {}x{}: {} food, {} killers, {} decorations, agent at ({}, {})",
            config.playfield.width,
            config.playfield.height,
            foods.len(),
            killers.len(),
            decorations.len(),
            agent.x,
            agent.y
        );
        Self::from_parts(config, rng, agent, foods, killers, decorations)
    }

    /// Assemble a world from explicit pieces. `rng` is still used to respawn
    /// consumed food.
    pub fn from_parts(
        config: WorldConfig,
        rng: R,
        agent: Agent,
        foods: Vec<Entity>,
        killers: Vec<Entity>,
        decorations: Vec<Entity>,
    ) -> Self {
        Self {
            config,
            rng,
            agent,
            foods,
            killers,
            decorations,
            score: 0,
            frames: 0,
        }
    }

    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub const fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn foods(&self) -> &[Entity] {
        &self.foods
    }

    pub fn killers(&self) -> &[Entity] {
        &self.killers
    }

    pub fn decorations(&self) -> &[Entity] {
        &self.decorations
    }

    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Frames stepped since construction.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance one frame: move the agent, move every entity, then resolve
    /// contacts.
    pub fn step(&mut self, action: Action) -> StepOutcome {
        self.agent.apply(action, self.config.playfield);
        self.advance_entities();
        let hits = self.resolve_collisions();
        self.frames += 1;
        trace!(
            "frame {}: {:?} -> agent ({}, {}), reward {}",
            self.frames, action, self.agent.x, self.agent.y, hits.reward
        );
        StepOutcome {
            reward: hits.reward,
            killed: hits.killed,
            consumed: hits.consumed,
            observation: self.observe(),
        }
    }

    /// One motion update for every food, killer and decoration.
    pub fn advance_entities(&mut self) {
        let field = self.config.playfield;
        self.foods
            .iter_mut()
            .chain(self.killers.iter_mut())
            .chain(self.decorations.iter_mut())
            .for_each(|e| e.advance(field));
    }

    /// Eat overlapping food (respawning each one), then check killers.
    ///
    /// Food is always consumed and scored even when a killer is touched in
    /// the same frame; the killer penalty then replaces the food reward.
    pub fn resolve_collisions(&mut self) -> Collisions {
        let agent_box = self.agent.bounds();
        let mut consumed = 0;
        for i in 0..self.foods.len() {
            if !self.foods[i].bounds().intersects(&agent_box) {
                continue;
            }
            let eaten = self.foods[i].position;
            self.foods[i] = Entity::spawn(EntityKind::Food, &self.config, &mut self.rng);
            debug!(
                "food eaten at ({:.1}, {:.1}), respawned at ({:.1}, {:.1})",
                eaten.x, eaten.y, self.foods[i].position.x, self.foods[i].position.y
            );
            consumed += 1;
        }
        self.score += consumed as u64;

        let killed = self
            .killers
            .iter()
            .any(|k| k.bounds().intersects(&agent_box));
        if killed {
            info!(
                "agent killed at ({}, {}) with score {}",
                self.agent.x, self.agent.y, self.score
            );
            return Collisions {
                reward: EntityKind::Killer.reward(),
                consumed,
                killed,
            };
        }
        Collisions {
            reward: consumed as i32 * EntityKind::Food.reward(),
            consumed,
            killed,
        }
    }

    pub fn observe(&self) -> Observation {
        let positions = |es: &[Entity]| -> Vec<Vec2> { es.iter().map(|e| e.position).collect() };
        Observation {
            agent: self.agent.position(),
            foods: positions(&self.foods),
            killers: positions(&self.killers),
            decorations: positions(&self.decorations),
        }
    }

    /// Draw the current frame: background, decorations, food, killers and
    /// finally the agent on top.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        renderer.clear_background(self.config.background);
        for e in self.decorations.iter().chain(&self.foods).chain(&self.killers) {
            renderer.present(e.kind.sprite(), e.bounds());
        }
        renderer.present(Sprite::Agent, self.agent.bounds());
    }

    /// Draw the score readout in the top-left corner.
    pub fn render_score(&self, renderer: &mut dyn Renderer) {
        renderer.draw_text(&format!("SCORES: {}", self.score), 50, 50, 3, Rgb::new(255, 0, 0));
    }
}
