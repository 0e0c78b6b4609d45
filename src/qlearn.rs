//! Tabular Q-learning and a small evolutionary trainer on top of it.
//!
//! Every individual in the population owns its own environment and generator,
//! so an epoch's episodes run in parallel and stay reproducible for a seed.

use crate::agent::{Action, Direction};
use crate::config::{TrainerConfig, WorldConfig};
use crate::env::ForageEnv;
use crate::geom::Rect;
use crate::world::World;
use ahash::AHashMap;
use anyhow::{Context, Result};
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

const ACTIONS: usize = Action::ALL.len();

/// How far ahead (in pixels) to look for killers in each direction.
pub const DANGER_PROBE: i32 = 12;

/// Foods closer than this on an axis count as aligned on that axis.
const ALIGN_SLACK: f64 = 4.0;

/// Bits 0-3: killer within [`DANGER_PROBE`] to the right/left/up/down.
/// Bits 4-5: nearest food x class (0 left, 1 aligned, 2 right).
/// Bits 6-7: nearest food y class (0 above, 1 aligned, 2 below).
pub type StateKey = u16;

pub fn state_key<R: Rng>(world: &World<R>) -> StateKey {
    let agent = world.agent();
    let here = agent.bounds();
    let mut key: StateKey = 0;
    for (bit, dir) in [Direction::Right, Direction::Left, Direction::Up, Direction::Down]
        .into_iter()
        .enumerate()
    {
        let (dx, dy) = dir.offset();
        let probe = Rect::new(here.x + dx * DANGER_PROBE, here.y + dy * DANGER_PROBE, here.w, here.h);
        if world.killers().iter().any(|k| k.bounds().intersects(&probe)) {
            key |= 1 << bit;
        }
    }

    let me = agent.position();
    let nearest = world
        .foods()
        .iter()
        .map(|f| f.position)
        .min_by(|a, b| me.distance_squared(*a).total_cmp(&me.distance_squared(*b)));
    let class = |delta: f64| -> StateKey {
        if delta < -ALIGN_SLACK {
            0
        } else if delta > ALIGN_SLACK {
            2
        } else {
            1
        }
    };
    let (fx, fy) = nearest.map_or((1, 1), |p| (class(p.x - me.x), class(p.y - me.y)));
    key | (fx << 4) | (fy << 6)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QAgent {
    q: AHashMap<StateKey, [f32; ACTIONS]>,
    pub epsilon: f32,
    pub min_epsilon: f32,
    pub decay: f32,
    pub alpha: f32,
    pub gamma: f32,
    pub steps: u64,
    pub episodes: u64,
}

impl QAgent {
    pub fn new(cfg: &TrainerConfig) -> Self {
        Self {
            q: AHashMap::new(),
            epsilon: cfg.epsilon,
            min_epsilon: cfg.min_epsilon,
            decay: cfg.decay,
            alpha: cfg.alpha,
            gamma: cfg.gamma,
            steps: 0,
            episodes: 0,
        }
    }

    pub fn q_values(&self, s: StateKey) -> [f32; ACTIONS] {
        self.q.get(&s).copied().unwrap_or([0.0; ACTIONS])
    }

    pub fn states_seen(&self) -> usize {
        self.q.len()
    }

    /// Highest-valued action; ties go to the lowest action code.
    pub fn greedy_action(&self, s: StateKey) -> Action {
        let qs = self.q_values(s);
        let mut best = 0;
        for (i, v) in qs.iter().enumerate().skip(1) {
            if *v > qs[best] {
                best = i;
            }
        }
        Action::ALL[best]
    }

    pub fn select_action<R: Rng>(&self, s: StateKey, rng: &mut R) -> Action {
        if rng.r#gen::<f32>() < self.epsilon {
            Action::ALL[rng.gen_range(0..ACTIONS)]
        } else {
            self.greedy_action(s)
        }
    }

    pub fn learn(&mut self, s: StateKey, a: Action, r: f32, ns: StateKey, done: bool) {
        let next_max = if done {
            0.0
        } else {
            self.q_values(ns).into_iter().fold(f32::NEG_INFINITY, f32::max)
        };
        let (alpha, gamma) = (self.alpha, self.gamma);
        let qsa = self.q.entry(s).or_insert([0.0; ACTIONS]);
        let idx = a.code();
        let td_target = r + gamma * next_max;
        qsa[idx] += alpha * (td_target - qsa[idx]);
        self.steps += 1;
    }

    pub fn end_episode(&mut self) {
        self.episodes += 1;
        self.epsilon = (self.epsilon * self.decay).max(self.min_epsilon);
    }

    /// Jitter every learned value uniformly within `±sigma` and decay ε.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R, sigma: f32) {
        if sigma > 0.0 {
            for arr in self.q.values_mut() {
                for v in arr.iter_mut() {
                    *v += rng.gen_range(-sigma..sigma);
                }
            }
        }
        self.epsilon = (self.epsilon * self.decay).max(self.min_epsilon);
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing Q-table")?;
        std::fs::write(path, json).with_context(|| format!("writing Q-table {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading Q-table {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing Q-table {}", path.display()))
    }
}

/// Outcome of one individual's episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EpisodeStats {
    pub episode_return: i64,
    pub score: u64,
    pub steps: usize,
    pub killed: bool,
}

impl EpisodeStats {
    /// Selection order: food eaten first, then return.
    pub const fn rank(&self) -> (u64, i64) {
        (self.score, self.episode_return)
    }
}

/// Play one full episode, learning after every step.
pub fn run_episode<R: Rng>(agent: &mut QAgent, env: &mut ForageEnv, rng: &mut R) -> EpisodeStats {
    env.reset();
    let mut killed = false;
    let mut s = state_key(env.world());
    loop {
        let action = agent.select_action(s, rng);
        let result = env.step(action);
        let ns = state_key(env.world());
        agent.learn(s, action, result.reward as f32, ns, result.terminated);
        killed |= result.killed;
        s = ns;
        if result.done() {
            break;
        }
    }
    agent.end_episode();
    EpisodeStats {
        episode_return: env.episode_return(),
        score: env.world().score(),
        steps: env.steps(),
        killed,
    }
}

struct Individual {
    agent: QAgent,
    env: ForageEnv,
    rng: SmallRng,
    last: EpisodeStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochSummary {
    pub epoch: usize,
    pub best: EpisodeStats,
    pub killed: usize,
}

/// Population of Q-agents. Each epoch every individual plays one episode; the
/// one that ate the most food survives (ties broken by return, then by lowest
/// index) and the rest are replaced by mutated copies of it.
pub struct EvoTrainer {
    cfg: TrainerConfig,
    pop: Vec<Individual>,
    rng: SmallRng,
    epoch: usize,
    history: Vec<EpochSummary>,
    best_ever: Option<(EpisodeStats, QAgent)>,
}

impl EvoTrainer {
    pub fn new(world: WorldConfig, cfg: TrainerConfig) -> Self {
        let pop = (0..cfg.population.max(1))
            .map(|i| {
                let seed = cfg.seed.wrapping_mul(1_000_003).wrapping_add(i as u64);
                Individual {
                    agent: QAgent::new(&cfg),
                    env: ForageEnv::new(world.clone(), seed, cfg.step_limit, cfg.terminate_on_kill),
                    rng: SmallRng::seed_from_u64(seed ^ 0x5eed),
                    last: EpisodeStats::default(),
                }
            })
            .collect();
        Self {
            rng: SmallRng::seed_from_u64(cfg.seed),
            cfg,
            pop,
            epoch: 0,
            history: Vec::new(),
            best_ever: None,
        }
    }

    pub const fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn population(&self) -> usize {
        self.pop.len()
    }

    pub fn history(&self) -> &[EpochSummary] {
        &self.history
    }

    /// Best agent seen across all epochs, with the episode that earned it.
    pub fn best(&self) -> Option<(&EpisodeStats, &QAgent)> {
        self.best_ever.as_ref().map(|(s, a)| (s, a))
    }

    /// Play one episode per individual, then reproduce from the winner.
    pub fn run_epoch(&mut self) -> EpochSummary {
        self.pop.par_iter_mut().for_each(|ind| {
            ind.last = run_episode(&mut ind.agent, &mut ind.env, &mut ind.rng);
        });

        let best_idx = self.fittest();
        let best = self.pop[best_idx].last;
        let killed = self.pop.iter().filter(|ind| ind.last.killed).count();
        let summary = EpochSummary {
            epoch: self.epoch,
            best,
            killed,
        };
        info!(
            "epoch {}: best score {} (return {}, {} steps), {}/{} killed",
            self.epoch,
            best.score,
            best.episode_return,
            best.steps,
            killed,
            self.pop.len()
        );

        self.reproduce(best_idx);
        self.history.push(summary);
        self.epoch += 1;
        summary
    }

    fn fittest(&self) -> usize {
        (0..self.pop.len())
            .max_by_key(|&i| (self.pop[i].last.rank(), std::cmp::Reverse(i)))
            .unwrap_or(0)
    }

    /// Keep `parent_idx` as is and replace everyone else with a mutated clone.
    fn reproduce(&mut self, parent_idx: usize) {
        let stats = self.pop[parent_idx].last;
        let parent = self.pop[parent_idx].agent.clone();
        if self
            .best_ever
            .as_ref()
            .is_none_or(|(s, _)| stats.rank() > s.rank())
        {
            self.best_ever = Some((stats, parent.clone()));
        }
        for (i, ind) in self.pop.iter_mut().enumerate() {
            if i != parent_idx {
                let mut child = parent.clone();
                child.mutate(&mut self.rng, self.cfg.mutation_sigma);
                ind.agent = child;
            }
        }
    }

    /// Run the configured number of epochs.
    pub fn train(&mut self) -> Option<(&EpisodeStats, &QAgent)> {
        for _ in 0..self.cfg.epochs {
            self.run_epoch();
        }
        self.best()
    }
}
