use crate::config::{SpriteSize, WorldConfig};
use crate::geom::{Playfield, Rect, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    /// Unit step in screen coordinates (y grows downwards).
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }
}

/// Discrete action accepted by the step API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Action {
    Right,
    Left,
    Up,
    Down,
    #[default]
    None,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Right,
        Action::Left,
        Action::Up,
        Action::Down,
        Action::None,
    ];

    /// Decode a raw action code. Unknown codes are treated as `None`.
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Action::Right,
            1 => Action::Left,
            2 => Action::Up,
            3 => Action::Down,
            _ => Action::None,
        }
    }

    pub const fn code(self) -> usize {
        match self {
            Action::Right => 0,
            Action::Left => 1,
            Action::Up => 2,
            Action::Down => 3,
            Action::None => 4,
        }
    }

    pub const fn direction(self) -> Option<Direction> {
        match self {
            Action::Right => Some(Direction::Right),
            Action::Left => Some(Direction::Left),
            Action::Up => Some(Direction::Up),
            Action::Down => Some(Direction::Down),
            Action::None => None,
        }
    }
}

impl From<Direction> for Action {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Right => Action::Right,
            Direction::Left => Action::Left,
            Direction::Up => Action::Up,
            Direction::Down => Action::Down,
        }
    }
}

/// The player. Only moves when told to, one pixel at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub x: i32,
    pub y: i32,
    pub size: SpriteSize,
}

impl Agent {
    pub const fn new(x: i32, y: i32, size: SpriteSize) -> Self {
        Self { x, y, size }
    }

    /// Agent at the configured start point. Fractions outside `0..=1` are
    /// clamped so the agent always starts inside the playfield.
    pub fn spawn(cfg: &WorldConfig) -> Self {
        let Playfield { width, height } = cfg.playfield;
        let (fx, fy) = cfg.agent_start;
        let x = (f64::from(width) * fx.clamp(0.0, 1.0)) as i32;
        let y = (f64::from(height) * fy.clamp(0.0, 1.0)) as i32;
        Self::new(x, y, cfg.sprites.agent)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(f64::from(self.x), f64::from(self.y))
    }

    pub const fn bounds(&self) -> Rect {
        Rect::from_center(self.x, self.y, self.size.w, self.size.h)
    }

    /// Move one pixel for `action`. A step that would leave the playfield is
    /// dropped; `None` is a no-op.
    pub fn apply(&mut self, action: Action, field: Playfield) {
        let Some(dir) = action.direction() else {
            return;
        };
        let (dx, dy) = dir.offset();
        let nx = self.x + dx;
        let ny = self.y + dy;
        if (0..=field.width as i32).contains(&nx) && (0..=field.height as i32).contains(&ny) {
            self.x = nx;
            self.y = ny;
        }
    }
}
