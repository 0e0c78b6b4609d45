//! Autonomous playfield entities: food, killers and decorations.

use crate::config::{SpriteSize, WorldConfig};
use crate::geom::{Playfield, Rect, Vec2};
use crate::render::Sprite;
use rand::Rng;
use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Food,
    Killer,
    Decoration,
}

impl EntityKind {
    /// Reward handed to the agent on contact.
    pub const fn reward(self) -> i32 {
        match self {
            EntityKind::Food => 1,
            EntityKind::Killer => -100,
            EntityKind::Decoration => 0,
        }
    }

    pub const fn sprite(self) -> Sprite {
        match self {
            EntityKind::Food => Sprite::Food,
            EntityKind::Killer => Sprite::Killer,
            EntityKind::Decoration => Sprite::Decoration,
        }
    }

    pub const fn size(self, cfg: &WorldConfig) -> SpriteSize {
        match self {
            EntityKind::Food => cfg.sprites.food,
            EntityKind::Killer => cfg.sprites.killer,
            EntityKind::Decoration => cfg.sprites.decoration,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub position: Vec2,
    /// Radians, kept in `[0, 2π)`.
    pub heading: f64,
    pub speed: f64,
    pub size: SpriteSize,
    pub movable: bool,
}

impl Entity {
    pub fn new(kind: EntityKind, position: Vec2, heading: f64, speed: f64, size: SpriteSize) -> Self {
        Self {
            kind,
            position,
            heading: heading.rem_euclid(TAU),
            speed: speed.max(0.0),
            size,
            movable: true,
        }
    }

    /// Fresh entity at a uniformly random spot with random heading and speed.
    pub fn spawn<R: Rng + ?Sized>(kind: EntityKind, cfg: &WorldConfig, rng: &mut R) -> Self {
        let Playfield { width, height } = cfg.playfield;
        let position = Vec2::new(
            rng.r#gen::<f64>() * f64::from(width),
            rng.r#gen::<f64>() * f64::from(height),
        );
        let heading = rng.gen_range(0.0..TAU);
        let speed = if cfg.speed_max > cfg.speed_min {
            rng.gen_range(cfg.speed_min..=cfg.speed_max)
        } else {
            cfg.speed_min
        };
        Self::new(kind, position, heading, speed, kind.size(cfg))
    }

    pub const fn reward(&self) -> i32 {
        self.kind.reward()
    }

    pub fn bounds(&self) -> Rect {
        let (cx, cy) = self.position.to_pixel();
        Rect::from_center(cx, cy, self.size.w, self.size.h)
    }

    /// Move one speed-unit along the heading, bouncing off the playfield edges.
    ///
    /// Each axis is handled on its own. Leaving through either vertical edge
    /// maps the heading to `π − h`; leaving through either horizontal edge maps
    /// it to `−h`. The same transform applies at the low and the high edge.
    pub fn advance(&mut self, field: Playfield) {
        if !self.movable {
            return;
        }
        let width = f64::from(field.width);
        let height = f64::from(field.height);
        let nx = self.position.x + self.speed * self.heading.cos();
        let ny = self.position.y + self.speed * self.heading.sin();

        if nx > width {
            self.position.x = width;
            self.heading = PI - self.heading;
        } else if nx < 0.0 {
            self.position.x = 0.0;
            self.heading = PI - self.heading;
        } else {
            self.position.x = nx;
        }

        if ny > height {
            self.position.y = height;
            self.heading = -self.heading;
        } else if ny < 0.0 {
            self.position.y = 0.0;
            self.heading = -self.heading;
        } else {
            self.position.y = ny;
        }

        self.heading = self.heading.rem_euclid(TAU);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rstest::rstest;

    const FIELD: Playfield = Playfield::new(1200, 800);

    fn food_at(x: f64, y: f64, heading: f64, speed: f64) -> Entity {
        Entity::new(EntityKind::Food, Vec2::new(x, y), heading, speed, SpriteSize::new(20, 20))
    }

    #[test]
    fn right_edge_reflects_to_pi_then_moves_left() {
        let mut e = food_at(1200.0, 400.0, 0.0, 1.5);
        e.advance(FIELD);
        assert_relative_eq!(e.position.x, 1200.0);
        assert_relative_eq!(e.heading, PI);
        e.advance(FIELD);
        assert!(e.position.x < 1200.0);
        assert_relative_eq!(e.position.x, 1198.5, epsilon = 1e-9);
    }

    #[test]
    fn left_edge_uses_same_horizontal_rule() {
        let mut e = food_at(0.5, 400.0, PI, 1.0);
        e.advance(FIELD);
        assert_relative_eq!(e.position.x, 0.0);
        // π − π = 0: heading now points right.
        assert_relative_eq!(e.heading, 0.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case::bottom(400.0, 799.5, PI / 2.0)]
    #[case::top(400.0, 0.5, 3.0 * PI / 2.0)]
    fn vertical_edges_negate_heading(#[case] x: f64, #[case] y: f64, #[case] heading: f64) {
        let mut e = food_at(x, y, heading, 1.0);
        e.advance(FIELD);
        assert_relative_eq!(e.heading, (-heading).rem_euclid(TAU), epsilon = 1e-12);
        assert!(FIELD.contains(e.position));
    }

    #[test]
    fn corner_hit_reflects_both_axes() {
        let mut e = food_at(1199.8, 799.8, PI / 4.0, 2.0);
        e.advance(FIELD);
        assert_relative_eq!(e.position.x, 1200.0);
        assert_relative_eq!(e.position.y, 800.0);
        // π − π/4 = 3π/4, then negated.
        assert_relative_eq!(e.heading, (-3.0 * PI / 4.0).rem_euclid(TAU), epsilon = 1e-12);
    }

    #[test]
    fn random_walk_stays_inside_field() {
        let cfg = WorldConfig { speed_max: 25.0, ..WorldConfig::default() };
        let mut rng = SmallRng::seed_from_u64(11);
        let mut entities: Vec<Entity> = (0..30)
            .map(|i| {
                let kind = [EntityKind::Food, EntityKind::Killer, EntityKind::Decoration][i % 3];
                Entity::spawn(kind, &cfg, &mut rng)
            })
            .collect();
        for _ in 0..5_000 {
            for e in &mut entities {
                e.advance(cfg.playfield);
                assert!(cfg.playfield.contains(e.position), "{:?} escaped", e.position);
                assert!((0.0..=TAU).contains(&e.heading));
            }
        }
    }

    #[test]
    fn spawn_respects_speed_range_and_kind_size() {
        let cfg = WorldConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..100 {
            let e = Entity::spawn(EntityKind::Killer, &cfg, &mut rng);
            assert!((cfg.speed_min..=cfg.speed_max).contains(&e.speed));
            assert_eq!(e.size, cfg.sprites.killer);
            assert!(cfg.playfield.contains(e.position));
        }
    }

    #[test]
    fn bounds_track_rounded_position() {
        let e = food_at(600.6, 399.4, 0.0, 0.0);
        assert_eq!(e.bounds().center(), (601, 399));
    }

    #[test]
    fn rewards_per_kind() {
        assert_eq!(EntityKind::Food.reward(), 1);
        assert_eq!(EntityKind::Killer.reward(), -100);
        assert_eq!(EntityKind::Decoration.reward(), 0);
    }
}
