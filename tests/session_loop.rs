use anyhow::Result;
use forage_arena::{
    Agent, Canvas, Direction, Entity, EntityKind, InputEvent, Rect, Renderer, Rgb, ScriptedInput,
    Session, SessionState, Sprite, SpriteSize, Vec2, World, WorldConfig,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Default)]
struct Recorder {
    cleared: usize,
    sprites: Vec<(Sprite, Rect)>,
    texts: Vec<String>,
    flips: usize,
}

impl Renderer for Recorder {
    fn clear_background(&mut self, _color: Rgb) {
        self.cleared += 1;
        self.sprites.clear();
        self.texts.clear();
    }

    fn present(&mut self, sprite: Sprite, bounds: Rect) {
        self.sprites.push((sprite, bounds));
    }

    fn draw_text(&mut self, text: &str, _x: i32, _y: i32, _scale: u32, _color: Rgb) {
        self.texts.push(text.to_owned());
    }

    fn flip(&mut self) -> Result<()> {
        self.flips += 1;
        Ok(())
    }
}

fn still(kind: EntityKind, x: f64, y: f64) -> Entity {
    Entity::new(kind, Vec2::new(x, y), 0.0, 0.0, SpriteSize::new(20, 20))
}

fn session(foods: Vec<Entity>, killers: Vec<Entity>) -> Session {
    let cfg = WorldConfig::default();
    let agent = Agent::new(600, 400, cfg.sprites.agent);
    let world = World::from_parts(cfg, SmallRng::seed_from_u64(1), agent, foods, killers, Vec::new());
    Session::new(world)
}

#[test]
fn held_key_moves_one_pixel_per_frame_until_released() {
    let mut s = session(Vec::new(), Vec::new());
    let mut input = ScriptedInput::new([
        vec![InputEvent::KeyDown(Direction::Right)],
        vec![],
        vec![],
        vec![InputEvent::KeyUp],
        vec![],
    ]);
    let mut r = Recorder::default();
    for _ in 0..5 {
        assert_eq!(s.frame(&mut input, &mut r).expect("frame"), SessionState::Running);
    }
    assert_eq!(s.world().agent().position(), Vec2::new(603.0, 400.0));
    assert_eq!(r.flips, 5);
    assert!(!s.control().moving);
}

#[test]
fn unbound_key_press_stops_the_agent() {
    let mut s = session(Vec::new(), Vec::new());
    let mut input = ScriptedInput::new([
        vec![InputEvent::KeyDown(Direction::Left)],
        vec![InputEvent::OtherKeyDown],
        vec![],
    ]);
    let mut r = Recorder::default();
    for _ in 0..3 {
        s.frame(&mut input, &mut r).expect("frame");
    }
    assert_eq!(s.world().agent().position(), Vec2::new(599.0, 400.0));
}

#[test]
fn every_frame_draws_all_entities_agent_and_score() {
    let mut s = session(
        vec![still(EntityKind::Food, 100.0, 100.0)],
        vec![still(EntityKind::Killer, 1000.0, 100.0)],
    );
    let mut r = Recorder::default();
    s.frame(&mut ScriptedInput::default(), &mut r).expect("frame");
    let kinds: Vec<Sprite> = r.sprites.iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds, vec![Sprite::Food, Sprite::Killer, Sprite::Agent]);
    assert_eq!(r.texts, vec!["SCORES: 0".to_owned()]);
}

#[test]
fn killer_freezes_the_session_until_quit() {
    let mut s = session(Vec::new(), vec![still(EntityKind::Killer, 640.0, 400.0)]);
    let mut input = ScriptedInput::default();
    input.push_frame(vec![InputEvent::KeyDown(Direction::Right)]);
    let mut r = Recorder::default();

    let mut state = SessionState::Running;
    for _ in 0..20 {
        state = s.frame(&mut input, &mut r).expect("frame");
        if state == SessionState::Killed {
            break;
        }
    }
    assert_eq!(state, SessionState::Killed);
    assert!(r.texts.iter().any(|t| t == "KILLED"));

    let frozen = s.world().agent().position();
    let frames = s.world().frames();
    input.push_frame(vec![InputEvent::KeyDown(Direction::Left)]);
    input.push_frame(vec![]);
    s.frame(&mut input, &mut r).expect("frame");
    s.frame(&mut input, &mut r).expect("frame");
    assert_eq!(s.world().agent().position(), frozen);
    assert_eq!(s.world().frames(), frames);
    assert_eq!(s.state(), SessionState::Killed);

    input.push_frame(vec![InputEvent::Quit]);
    assert_eq!(s.frame(&mut input, &mut r).expect("frame"), SessionState::Quit);
}

#[test]
fn quit_stops_run_without_another_flip() {
    let mut s = session(Vec::new(), Vec::new());
    let mut input = ScriptedInput::new([vec![], vec![], vec![InputEvent::Quit]]);
    let mut r = Recorder::default();
    let state = s.run(&mut input, &mut r, None).expect("run");
    assert_eq!(state, SessionState::Quit);
    assert_eq!(r.flips, 2);
}

#[test]
fn run_honours_frame_cap() {
    let mut s = session(Vec::new(), Vec::new());
    let mut r = Recorder::default();
    let state = s.run(&mut ScriptedInput::default(), &mut r, Some(7)).expect("run");
    assert_eq!(state, SessionState::Running);
    assert_eq!(r.flips, 7);
}

#[test]
fn canvas_renders_a_full_session_frame() {
    let mut s = session(vec![still(EntityKind::Food, 100.0, 100.0)], Vec::new());
    let mut canvas = Canvas::new(1200, 800);
    s.frame(&mut ScriptedInput::default(), &mut canvas).expect("frame");
    assert_eq!(canvas.frames_presented(), 1);
    // Background corner, food centre, agent centre.
    assert_eq!(canvas.pixel(1199, 799), Some([230, 230, 230, 255]));
    assert_ne!(canvas.pixel(100, 100), Some([230, 230, 230, 255]));
    assert_ne!(canvas.pixel(600, 400), Some([230, 230, 230, 255]));
}
