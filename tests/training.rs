use forage_arena::qlearn::{run_episode, state_key};
use forage_arena::{Action, EvoTrainer, ForageEnv, QAgent, TrainerConfig, WorldConfig};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::io::Write;

fn small_trainer() -> TrainerConfig {
    TrainerConfig {
        population: 3,
        epochs: 4,
        step_limit: 300,
        seed: 5,
        ..TrainerConfig::default()
    }
}

#[test]
fn episode_ends_on_kill_or_step_limit() {
    let cfg = small_trainer();
    let mut env = ForageEnv::new(WorldConfig::default(), 11, cfg.step_limit, true);
    let mut agent = QAgent::new(&cfg);
    let mut rng = SmallRng::seed_from_u64(11);

    let stats = run_episode(&mut agent, &mut env, &mut rng);

    assert!(stats.steps <= cfg.step_limit);
    assert!(stats.killed || stats.steps == cfg.step_limit);
    assert_eq!(agent.episodes, 1);
    assert_eq!(agent.steps, stats.steps as u64);
    assert!(agent.states_seen() > 0);
}

#[test]
fn kill_without_termination_runs_to_the_limit() {
    let world = WorldConfig {
        killer_count: 60,
        ..WorldConfig::default()
    };
    let mut env = ForageEnv::new(world, 4, 500, false);
    env.reset();
    let results: Vec<_> = (0..500).map(|_| env.step(Action::Left)).collect();
    assert!(results.iter().any(|r| r.killed));
    assert!(results.iter().all(|r| !r.terminated));
    let last = results.last().expect("stepped");
    assert!(last.truncated);
    assert_eq!(env.steps(), 500);
}

#[test]
fn trainer_records_history_and_keeps_a_best_agent() {
    let mut trainer = EvoTrainer::new(WorldConfig::default(), small_trainer());
    let best_rank = trainer.train().map(|(stats, _)| stats.rank());
    assert_eq!(trainer.history().len(), 4);
    assert_eq!(trainer.population(), 3);
    let best_seen = trainer.history().iter().map(|e| e.best.rank()).max();
    assert_eq!(best_rank, best_seen);
}

#[test]
fn q_table_survives_a_save_load_cycle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("q.json");

    let mut trainer = EvoTrainer::new(WorldConfig::default(), small_trainer());
    let (_, agent) = trainer.train().expect("trained");
    agent.save(&path).expect("save");
    let loaded = QAgent::load(&path).expect("load");

    let env = ForageEnv::new(WorldConfig::default(), 1, 10, true);
    let s = state_key(env.world());
    assert_eq!(loaded.states_seen(), agent.states_seen());
    assert_eq!(loaded.q_values(s), agent.q_values(s));
    assert_eq!(loaded.greedy_action(s), agent.greedy_action(s));
}

#[test]
fn world_config_loads_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(file, r#"{{ "playfield": {{ "width": 300, "height": 200 }}, "food_count": 2 }}"#)
        .expect("write");
    let cfg = WorldConfig::load(file.path()).expect("load");
    assert_eq!(cfg.playfield.width, 300);
    assert_eq!(cfg.food_count, 2);
    assert_eq!(cfg.killer_count, 10);
}

#[test]
fn invalid_world_config_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(file, r#"{{ "speed_min": 5.0, "speed_max": 1.0 }}"#).expect("write");
    let err = WorldConfig::load(file.path()).expect_err("should fail");
    assert!(err.to_string().contains("speed range"));
}
