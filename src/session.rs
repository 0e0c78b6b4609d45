//! Interactive play: keyboard-driven frames over a [`World`] with the
//! "killed" freeze.

use crate::input::{InputEvent, InputSource, KeyboardControl};
use crate::render::{Renderer, Rgb};
use crate::world::World;
use anyhow::Result;
use log::{debug, info};
use rand::Rng;
use rand::rngs::SmallRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    /// A killer was touched. The scene stays frozen until quit.
    Killed,
    Quit,
}

pub struct Session<R = SmallRng> {
    world: World<R>,
    control: KeyboardControl,
    state: SessionState,
}

impl<R: Rng> Session<R> {
    pub fn new(world: World<R>) -> Self {
        Self {
            world,
            control: KeyboardControl::default(),
            state: SessionState::Running,
        }
    }

    pub const fn world(&self) -> &World<R> {
        &self.world
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn control(&self) -> KeyboardControl {
        self.control
    }

    /// Run one frame: drain input, step the world unless frozen, redraw and
    /// flip. Nothing is drawn once quit has been requested.
    pub fn frame(
        &mut self,
        input: &mut dyn InputSource,
        renderer: &mut dyn Renderer,
    ) -> Result<SessionState> {
        if self.state == SessionState::Quit {
            return Ok(self.state);
        }
        for event in input.poll() {
            if event == InputEvent::Quit {
                info!("quit requested, final score {}", self.world.score());
                self.state = SessionState::Quit;
                return Ok(self.state);
            }
            if self.state == SessionState::Running {
                self.control.handle(event);
            }
        }

        if self.state == SessionState::Running {
            let outcome = self.world.step(self.control.action());
            if outcome.killed {
                self.state = SessionState::Killed;
            } else if outcome.consumed > 0 {
                debug!("score {}", self.world.score());
            }
        }

        self.world.render(renderer);
        self.world.render_score(renderer);
        if self.state == SessionState::Killed {
            renderer.draw_text("KILLED", 500, 300, 12, Rgb::new(255, 0, 0));
        }
        renderer.flip()?;
        Ok(self.state)
    }

    /// Drive frames until quit, or until `max_frames` frames have run.
    pub fn run(
        &mut self,
        input: &mut dyn InputSource,
        renderer: &mut dyn Renderer,
        max_frames: Option<u64>,
    ) -> Result<SessionState> {
        let mut frames = 0;
        while self.state != SessionState::Quit && max_frames.is_none_or(|max| frames < max) {
            self.frame(input, renderer)?;
            frames += 1;
        }
        Ok(self.state)
    }
}
