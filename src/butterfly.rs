//! Butterflies drifting over the finished painting.
//!
//! Unlike stems and flowers, butterflies are painted onto the display
//! surface after compositing, so they flutter above the watercolor texture
//! and never smear into it.  Motion is a heading random walk with a
//! sinusoidal speed swell; leaving the view by more than the wrap margin
//! teleports the butterfly to the opposite edge.

use std::f32::consts::TAU;

use bevy::math::Vec2;
use rand::Rng;

use crate::brush::{Brush, WingLobe, WingSide};
use crate::palette::{self, Hsl};

/// How far past an edge a butterfly may wander before wrapping.
pub const WRAP_MARGIN: f32 = 50.0;

pub struct Butterfly {
    pos: Vec2,
    heading: f32,
    fore_color: Hsl,
    hind_color: Hsl,
    scale: f32,
    /// Personal offset into the speed and flap oscillators.
    phase: f32,
    bounds: Vec2,
}

impl Butterfly {
    pub fn new(rng: &mut impl Rng, width: f32, height: f32) -> Self {
        let colors = palette::BUTTERFLIES[rng.random_range(0..palette::BUTTERFLIES.len())];
        Self {
            pos: Vec2::new(rng.random::<f32>() * width, rng.random::<f32>() * height),
            heading: rng.random::<f32>() * TAU,
            fore_color: colors.fore,
            hind_color: colors.hind,
            scale: 0.5 + rng.random::<f32>() * 0.5,
            phase: rng.random::<f32>() * TAU,
            bounds: Vec2::new(width, height),
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    /// One step of wander: jitter the heading, swell the speed with the
    /// clock, integrate, wrap around the margins.
    pub fn advance(&mut self, rng: &mut impl Rng, clock: f32) {
        self.heading += rng.random_range(-0.1..0.1);
        let speed = 1.2 + (clock + self.phase).sin() * 0.8;
        self.pos += Vec2::new(self.heading.cos(), self.heading.sin()) * speed;

        if self.pos.x < -WRAP_MARGIN {
            self.pos.x = self.bounds.x + WRAP_MARGIN;
        }
        if self.pos.x > self.bounds.x + WRAP_MARGIN {
            self.pos.x = -WRAP_MARGIN;
        }
        if self.pos.y < -WRAP_MARGIN {
            self.pos.y = self.bounds.y + WRAP_MARGIN;
        }
        if self.pos.y > self.bounds.y + WRAP_MARGIN {
            self.pos.y = -WRAP_MARGIN;
        }
    }

    /// Paint four wing lobes and a three-blob body at the current pose.
    pub fn draw(&self, brush: &mut Brush<'_>, rng: &mut impl Rng, clock: f32) {
        let wing = 12.0 * self.scale;
        let flap = clock * 10.0 + self.phase;

        for side in [WingSide::Right, WingSide::Left] {
            brush.butterfly_wing(
                rng,
                self.pos,
                wing,
                self.heading,
                side,
                WingLobe::Upper,
                self.fore_color,
                0.6,
                flap,
            );
            brush.butterfly_wing(
                rng,
                self.pos,
                wing * 0.7,
                self.heading,
                side,
                WingLobe::Lower,
                self.hind_color,
                0.5,
                flap,
            );
        }

        let axis = Vec2::new(self.heading.cos(), self.heading.sin());
        let body = palette::BUTTERFLY_BODY;
        brush.blob(rng, self.pos, 2.0 * self.scale, body, 0.3, Some(self.heading), Some(1.2));
        brush.blob(
            rng,
            self.pos + axis * 3.0 * self.scale,
            1.5 * self.scale,
            body,
            0.3,
            Some(self.heading),
            Some(1.0),
        );
        brush.blob(
            rng,
            self.pos - axis * 4.0 * self.scale,
            1.8 * self.scale,
            body,
            0.3,
            Some(self.heading),
            Some(2.5),
        );
    }
}

// --- tests ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn wander_stays_within_the_wrapped_field() {
        for seed in 0..6 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut butterfly = Butterfly::new(&mut rng, 320.0, 200.0);
            for tick in 0..5000 {
                butterfly.advance(&mut rng, tick as f32 / 60.0);
                let p = butterfly.pos();
                assert!((-WRAP_MARGIN..=320.0 + WRAP_MARGIN).contains(&p.x));
                assert!((-WRAP_MARGIN..=200.0 + WRAP_MARGIN).contains(&p.y));
            }
        }
    }

    #[test]
    fn spawn_lands_inside_the_view() {
        for seed in 0..12 {
            let mut rng = StdRng::seed_from_u64(seed);
            let butterfly = Butterfly::new(&mut rng, 640.0, 480.0);
            let p = butterfly.pos();
            assert!((0.0..640.0).contains(&p.x));
            assert!((0.0..480.0).contains(&p.y));
            assert!((0.5..1.0).contains(&butterfly.scale));
        }
    }

    #[test]
    fn drawing_paints_wings_around_the_body() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut butterfly = Butterfly::new(&mut rng, 128.0, 128.0);
        butterfly.pos = Vec2::new(64.0, 64.0);
        butterfly.scale = 1.0;

        let mut surface = Surface::new(128, 128).unwrap();
        // Flap pose chosen fully open so both sides must show.
        butterfly.phase = 0.0;
        butterfly.draw(&mut Brush::new(&mut surface), &mut rng, 0.0);

        let painted = surface.data().chunks(4).filter(|px| px[3] > 0).count();
        assert!(painted > 50, "an open butterfly covers a visible area, got {painted}");
    }
}
