use crate::agent::{Action, Direction};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Direction),
    /// A key with no direction bound to it.
    OtherKeyDown,
    KeyUp,
}

/// Source of player input. Each poll returns everything that arrived since
/// the previous one.
pub trait InputSource {
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// Replays a fixed list of per-frame event batches, then reports nothing.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<InputEvent>>,
    {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push_frame(&mut self, events: Vec<InputEvent>) {
        self.frames.push_back(events);
    }

    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Held-key state for interactive play.
///
/// A key-down starts movement in that direction and a key-up stops it; the
/// last direction is remembered across releases. Pressing any other key
/// forgets it, so the agent stays put until a direction key is pressed again.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardControl {
    pub moving: bool,
    pub last_key: Option<Direction>,
}

impl KeyboardControl {
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(dir) => {
                self.moving = true;
                self.last_key = Some(dir);
            }
            InputEvent::OtherKeyDown => {
                self.moving = true;
                self.last_key = None;
            }
            InputEvent::KeyUp => self.moving = false,
            InputEvent::Quit => {}
        }
    }

    /// Action for this frame.
    pub fn action(&self) -> Action {
        match (self.moving, self.last_key) {
            (true, Some(dir)) => dir.into(),
            _ => Action::None,
        }
    }
}
