//! Episodic wrapper over [`World`] for reinforcement-learning loops.

use crate::agent::Action;
use crate::config::WorldConfig;
use crate::world::{Observation, World};
use log::debug;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: i32,
    /// Killer touched while `terminate_on_kill` is set.
    pub terminated: bool,
    /// Step limit reached.
    pub truncated: bool,
    pub killed: bool,
}

impl StepResult {
    pub const fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Episodes of a [`World`], each rebuilt from the config with its own seed.
pub struct ForageEnv {
    config: WorldConfig,
    world: World,
    seed: u64,
    episode: u64,
    steps: usize,
    max_steps: usize,
    terminate_on_kill: bool,
    terminated: bool,
    truncated: bool,
    episode_return: i64,
}

impl ForageEnv {
    pub fn new(config: WorldConfig, seed: u64, max_steps: usize, terminate_on_kill: bool) -> Self {
        let world = World::with_rng(config.clone(), SmallRng::seed_from_u64(seed));
        Self {
            config,
            world,
            seed,
            episode: 0,
            steps: 0,
            max_steps,
            terminate_on_kill,
            terminated: false,
            truncated: false,
            episode_return: 0,
        }
    }

    /// Start the next episode on a freshly populated world.
    pub fn reset(&mut self) -> Observation {
        self.episode += 1;
        let rng = SmallRng::seed_from_u64(self.seed.wrapping_add(self.episode));
        self.world = World::with_rng(self.config.clone(), rng);
        self.steps = 0;
        self.terminated = false;
        self.truncated = false;
        self.episode_return = 0;
        self.world.observe()
    }

    /// Advance one frame. Once the episode is over every further step returns
    /// zero reward with the terminal flags repeated, until [`reset`](Self::reset).
    pub fn step(&mut self, action: Action) -> StepResult {
        if self.is_done() {
            return StepResult {
                observation: self.world.observe(),
                reward: 0,
                terminated: self.terminated,
                truncated: self.truncated,
                killed: false,
            };
        }
        let outcome = self.world.step(action);
        self.steps += 1;
        self.episode_return += i64::from(outcome.reward);

        let terminated = self.terminate_on_kill && outcome.killed;
        let truncated = !terminated && self.steps >= self.max_steps;
        self.terminated = terminated;
        self.truncated = truncated;
        if terminated || truncated {
            debug!(
                "episode {} over after {} steps: return {}, score {}",
                self.episode,
                self.steps,
                self.episode_return,
                self.world.score()
            );
        }
        StepResult {
            observation: outcome.observation,
            reward: outcome.reward,
            terminated,
            truncated,
            killed: outcome.killed,
        }
    }

    pub const fn world(&self) -> &World {
        &self.world
    }

    pub const fn action_count(&self) -> usize {
        Action::ALL.len()
    }

    pub const fn steps(&self) -> usize {
        self.steps
    }

    pub const fn episode(&self) -> u64 {
        self.episode
    }

    pub const fn episode_return(&self) -> i64 {
        self.episode_return
    }

    pub const fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_config() -> WorldConfig {
        WorldConfig {
            food_count: 0,
            killer_count: 0,
            decoration_count: 0,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn truncates_at_step_limit() {
        let mut env = ForageEnv::new(empty_config(), 1, 3, true);
        env.reset();
        assert!(!env.step(Action::Left).done());
        assert!(!env.step(Action::Left).done());
        let last = env.step(Action::Left);
        assert!(last.truncated);
        assert!(!last.terminated);
        assert!(env.is_done());
    }

    #[test]
    fn steps_after_done_are_inert() {
        let mut env = ForageEnv::new(empty_config(), 1, 1, false);
        env.reset();
        let before = env.step(Action::Right).observation.agent;
        let after = env.step(Action::Right);
        assert_eq!(after.reward, 0);
        assert!(after.done());
        assert_eq!(after.observation.agent, before);
        assert_eq!(env.steps(), 1);
    }

    #[test]
    fn reset_starts_a_new_episode() {
        let mut env = ForageEnv::new(WorldConfig::default(), 9, 2, true);
        env.reset();
        env.step(Action::Up);
        env.step(Action::Up);
        assert!(env.is_done());
        let obs = env.reset();
        assert_eq!(env.episode(), 2);
        assert_eq!(env.steps(), 0);
        assert!(!env.is_done());
        assert_eq!(obs.foods.len(), 10);
        assert_eq!(env.action_count(), 5);
    }
}
