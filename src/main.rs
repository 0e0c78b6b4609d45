use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use forage_arena::{
    Canvas, Direction, EvoTrainer, InputEvent, InputSource, Session, SessionState, TrainerConfig,
    World, WorldConfig, init_logging,
};
use log::{error, info};
use pixels::{Pixels, SurfaceTexture};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

/// Collect food, dodge killers.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a window and play with the arrow keys (or WASD)
    Play(PlayArgs),
    /// Train a population of Q-learning agents headless
    Train(TrainArgs),
}

#[derive(Args)]
struct PlayArgs {
    /// World config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for entity placement and motion
    #[arg(long)]
    seed: Option<u64>,
    /// Simulation frames per second
    #[arg(long, default_value_t = 120)]
    fps: u32,
}

#[derive(Args)]
struct TrainArgs {
    /// World config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Trainer config (JSON); flags below override it
    #[arg(long)]
    trainer: Option<PathBuf>,
    #[arg(long)]
    epochs: Option<usize>,
    #[arg(long)]
    population: Option<usize>,
    #[arg(long)]
    step_limit: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Where to write the best Q-table
    #[arg(long, default_value = "qtable.json")]
    out: PathBuf,
}

fn load_world_config(path: Option<&PathBuf>) -> Result<WorldConfig> {
    match path {
        Some(p) => WorldConfig::load(p),
        None => Ok(WorldConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Play(args) => play(args),
        Command::Train(args) => train(args),
    }
}

fn train(args: TrainArgs) -> Result<()> {
    let world = load_world_config(args.config.as_ref())?;
    let mut cfg = match &args.trainer {
        Some(p) => TrainerConfig::load(p)?,
        None => TrainerConfig::default(),
    };
    cfg.epochs = args.epochs.unwrap_or(cfg.epochs);
    cfg.population = args.population.unwrap_or(cfg.population);
    cfg.step_limit = args.step_limit.unwrap_or(cfg.step_limit);
    cfg.seed = args.seed.unwrap_or(cfg.seed);
    info!(
        "training {} agents for {} epochs ({} steps max per episode)",
        cfg.population, cfg.epochs, cfg.step_limit
    );

    let mut trainer = EvoTrainer::new(world, cfg);
    let Some((stats, agent)) = trainer.train() else {
        info!("no epochs run, nothing to save");
        return Ok(());
    };
    info!(
        "best score {} (return {}), {} states learned",
        stats.score,
        stats.episode_return,
        agent.states_seen()
    );
    agent.save(&args.out)?;
    info!("Q-table written to {}", args.out.display());
    Ok(())
}

/// Keyboard state from winit, buffered until the next simulation frame.
#[derive(Default)]
struct WindowInput {
    pending: Vec<InputEvent>,
}

const KEYMAP: [(VirtualKeyCode, Direction); 8] = [
    (VirtualKeyCode::Right, Direction::Right),
    (VirtualKeyCode::D, Direction::Right),
    (VirtualKeyCode::Left, Direction::Left),
    (VirtualKeyCode::A, Direction::Left),
    (VirtualKeyCode::Up, Direction::Up),
    (VirtualKeyCode::W, Direction::Up),
    (VirtualKeyCode::Down, Direction::Down),
    (VirtualKeyCode::S, Direction::Down),
];

impl WindowInput {
    /// Presses and releases of keys outside [`KEYMAP`] never reach the
    /// helper's per-key queries, so pick them off the raw events.
    fn observe(&mut self, event: &Event<'_, ()>) {
        let Event::WindowEvent {
            event:
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                },
            ..
        } = event
        else {
            return;
        };
        if *key == VirtualKeyCode::Escape || KEYMAP.iter().any(|(k, _)| k == key) {
            return;
        }
        self.pending.push(match state {
            ElementState::Pressed => InputEvent::OtherKeyDown,
            ElementState::Released => InputEvent::KeyUp,
        });
    }

    fn collect(&mut self, input: &WinitInputHelper) {
        if input.key_pressed(VirtualKeyCode::Escape) || input.close_requested() || input.destroyed() {
            self.pending.push(InputEvent::Quit);
            return;
        }
        for (key, dir) in KEYMAP {
            if input.key_pressed(key) {
                self.pending.push(InputEvent::KeyDown(dir));
            }
            if input.key_released(key) {
                self.pending.push(InputEvent::KeyUp);
            }
        }
    }
}

impl InputSource for WindowInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }
}

fn play(args: PlayArgs) -> Result<()> {
    let mut config = load_world_config(args.config.as_ref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let (width, height) = (config.playfield.width, config.playfield.height);

    let event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();
    let window = WindowBuilder::new()
        .with_title("Forage Arena")
        .with_inner_size(LogicalSize::new(width, height))
        .with_resizable(false)
        .build(&event_loop)
        .context("creating window")?;

    let mut pixels = {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, &window);
        Pixels::new(width, height, surface).context("creating pixel surface")?
    };

    let mut session = Session::new(World::new(config));
    let mut canvas = Canvas::new(width, height);
    let mut keys = WindowInput::default();
    let frame_time = Duration::from_secs_f64(1.0 / f64::from(args.fps.max(1)));
    let mut last_frame = Instant::now();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Event::RedrawRequested(_) = event {
            pixels.frame_mut().copy_from_slice(canvas.frame());
            if let Err(err) = pixels.render() {
                error!("render failed: {err}");
                *control_flow = ControlFlow::Exit;
            }
            return;
        }

        keys.observe(&event);
        if !input.update(&event) {
            return;
        }
        keys.collect(&input);
        if last_frame.elapsed() < frame_time && !keys.pending.contains(&InputEvent::Quit) {
            return;
        }
        last_frame = Instant::now();

        match session.frame(&mut keys, &mut canvas) {
            Ok(SessionState::Quit) => *control_flow = ControlFlow::Exit,
            Ok(_) => window.request_redraw(),
            Err(err) => {
                error!("frame failed: {err:#}");
                *control_flow = ControlFlow::Exit;
            }
        }
    });
}
