//! Blooms placed at stem tips.
//!
//! Like stems, a flower's layout is frozen at construction: petal angles,
//! distances, radii and colors never change afterwards.  Age does the
//! animating.  Each frame the flower repaints a random fraction of its
//! petals at a bloom scale derived from age, which layers translucent
//! pigment into a shimmering head rather than a static stamp, then fades
//! out of the simulation once past its lifespan.

use std::f32::consts::TAU;

use bevy::math::Vec2;
use rand::Rng;

use crate::brush::Brush;
use crate::palette::{self, Hsl};
use crate::stem::Species;

/// Petal fraction repainted on any given frame.
const PETAL_TURNOUT: f32 = 0.4;
/// Center-dot fraction repainted once the heart shows.
const CENTER_TURNOUT: f32 = 0.7;
/// Growth fraction at which center dots start appearing.
const HEART_THRESHOLD: f32 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BloomPhase {
    Blooming,
    Faded,
}

#[derive(Clone, Copy, Debug)]
struct Petal {
    angle: f32,
    dist: f32,
    radius: f32,
    stretch: f32,
    color: Hsl,
}

#[derive(Clone, Copy, Debug)]
struct CenterDot {
    offset: Vec2,
    radius: f32,
}

pub struct Flower {
    pos: Vec2,
    scale: f32,
    species: Species,
    age: f32,
    max_age: f32,
    petals: Vec<Petal>,
    centers: Vec<CenterDot>,
    center_color: Hsl,
    phase: BloomPhase,
}

impl Flower {
    /// Freeze a bloom layout at `pos`.
    ///
    /// Sunflowers get a dense ring of long petals around a wide dotted
    /// disc.  Every other species picks one of five wildflower layouts
    /// (petal count, spread and elongation) with an adjacent-hue accent
    /// color sprinkled through roughly a fifth of the petals.
    pub fn new(rng: &mut impl Rng, pos: Vec2, scale: f32, species: Species) -> Self {
        let max_age = if species == Species::Sunflower { 150.0 } else { 100.0 }
            + rng.random::<f32>() * 50.0;

        let mut petals = Vec::new();
        let mut centers = Vec::new();
        let center_color;

        if species == Species::Sunflower {
            center_color = palette::SUNFLOWER_CENTER;
            let count = 30 + rng.random_range(0..20);
            for i in 0..count {
                let angle = TAU / count as f32 * i as f32;
                petals.push(Petal {
                    angle,
                    dist: (15.0 + rng.random::<f32>() * 10.0) * scale,
                    radius: (8.0 + rng.random::<f32>() * 4.0) * scale,
                    stretch: 3.5,
                    color: if rng.random::<f32>() > 0.5 {
                        palette::SUNFLOWER_PETALS
                    } else {
                        palette::SUNFLOWER_PETALS_DEEP
                    },
                });
            }
            for _ in 0..40 {
                let a = rng.random::<f32>() * TAU;
                let d = rng.random::<f32>() * 12.0 * scale;
                centers.push(CenterDot {
                    offset: Vec2::new(a.cos(), a.sin()) * d,
                    radius: (2.0 + rng.random::<f32>() * 2.0) * scale,
                });
            }
        } else {
            center_color = palette::FLOWER_CENTERS;
            let layout = rng.random_range(0..5);
            let color_idx = rng.random_range(0..palette::FLOWERS.len());
            let main = palette::FLOWERS[color_idx];
            let accent = palette::FLOWERS[(color_idx + 1) % palette::FLOWERS.len()];

            let count = [4, 12, 8, 20, 6][layout];
            let (base_dist, base_radius, stretch) = match layout {
                0 => (8.0, 15.0, 1.2),
                1 => (12.0, 4.0, 2.5),
                3 => (5.0, 8.0, 3.0),
                _ => (10.0, 10.0, 1.5),
            };

            for i in 0..count {
                let angle = TAU / count as f32 * i as f32 + rng.random_range(-0.25..0.25);
                petals.push(Petal {
                    angle,
                    dist: (base_dist + rng.random::<f32>() * 5.0) * scale,
                    radius: (base_radius + rng.random::<f32>() * 3.0) * scale,
                    stretch,
                    color: if rng.random::<f32>() > 0.8 { accent } else { main },
                });
            }

            let center_count = if layout == 3 { 15 } else { 5 };
            for _ in 0..center_count {
                let a = rng.random::<f32>() * TAU;
                let d = rng.random::<f32>() * 3.0 * scale;
                centers.push(CenterDot {
                    offset: Vec2::new(a.cos(), a.sin()) * d,
                    radius: (1.5 + rng.random::<f32>()) * scale,
                });
            }
        }

        Self {
            pos,
            scale,
            species,
            age: 0.0,
            max_age,
            petals,
            centers,
            center_color,
            phase: BloomPhase::Blooming,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn phase(&self) -> BloomPhase {
        self.phase
    }

    /// Whether this bloom still wants frames.
    pub fn is_active(&self) -> bool {
        self.age < self.max_age
    }

    /// Age one frame and repaint a shimmering slice of the bloom.
    ///
    /// `clock` drives the sway term; its pairing with the flower's x
    /// position desynchronizes neighbors.  Past `max_age` this becomes a
    /// permanent no-op, leaving the last painted state on the surface.
    pub fn draw(&mut self, brush: &mut Brush<'_>, rng: &mut impl Rng, clock: f32) {
        if self.age > self.max_age {
            self.phase = BloomPhase::Faded;
            return;
        }
        self.age += 1.0;

        let growth = (self.age / 60.0).min(1.0);
        let bloom = 0.2 + growth * 0.8;
        let sway = (clock + self.pos.x).sin() * 2.0 * self.scale;
        let at = Vec2::new(self.pos.x + sway, self.pos.y);

        let petal_opacity = if self.species == Species::Sunflower { 0.1 } else { 0.06 };
        for petal in &self.petals {
            if rng.random::<f32>() >= PETAL_TURNOUT {
                continue;
            }
            let out = Vec2::new(petal.angle.cos(), petal.angle.sin()) * (petal.dist * bloom);
            brush.blob(
                rng,
                at + out,
                petal.radius * bloom,
                petal.color,
                petal_opacity,
                Some(petal.angle),
                Some(petal.stretch),
            );
        }

        if growth > HEART_THRESHOLD {
            for dot in &self.centers {
                if rng.random::<f32>() < CENTER_TURNOUT {
                    brush.blob(
                        rng,
                        at + dot.offset * bloom,
                        dot.radius,
                        self.center_color,
                        0.1,
                        Some(0.0),
                        Some(1.0),
                    );
                }
            }
        }
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
    fn sunflower_heads_are_dense_and_long_lived() {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let flower = Flower::new(&mut rng, Vec2::new(400.0, 200.0), 1.0, Species::Sunflower);
            assert!((30..50).contains(&flower.petals.len()));
            assert_eq!(flower.centers.len(), 40);
            assert!((150.0..200.0).contains(&flower.max_age));
            for petal in &flower.petals {
                assert_eq!(petal.stretch, 3.5);
                assert!((15.0..25.0).contains(&petal.dist));
            }
        }
    }

    #[test]
    fn wildflower_layouts_come_from_the_table() {
        let mut seen_counts = std::collections::HashSet::new();
        for seed in 0..60 {
            let mut rng = StdRng::seed_from_u64(seed);
            let flower = Flower::new(&mut rng, Vec2::new(100.0, 100.0), 1.0, Species::Wildflower);
            let count = flower.petals.len();
            assert!([4, 12, 8, 20, 6].contains(&count), "unexpected petal count {count}");
            seen_counts.insert(count);

            // The twenty-petal layout carries the dense dotted heart.
            let expected_centers = if count == 20 { 15 } else { 5 };
            assert_eq!(flower.centers.len(), expected_centers);

            for petal in &flower.petals {
                assert!(palette::FLOWERS.contains(&petal.color));
            }
        }
        assert!(seen_counts.len() >= 4, "sixty seeds should hit most layouts");
    }

    #[test]
    fn vine_species_fall_back_to_wildflower_layouts() {
        let mut rng = StdRng::seed_from_u64(8);
        let flower = Flower::new(&mut rng, Vec2::new(50.0, 50.0), 0.7, Species::Pothos);
        assert!([4, 12, 8, 20, 6].contains(&flower.petals.len()));
        assert_eq!(flower.center_color, palette::FLOWER_CENTERS);
    }

    #[test]
    fn shimmer_accumulates_pigment_within_a_few_frames() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut flower = Flower::new(&mut rng, Vec2::new(64.0, 64.0), 1.0, Species::Wildflower);
        let mut surface = Surface::new(128, 128).unwrap();
        for _ in 0..10 {
            flower.draw(&mut Brush::new(&mut surface), &mut rng, 0.0);
        }
        assert!(
            surface.data().chunks(4).any(|px| px[3] > 0),
            "ten frames of shimmer must leave pigment"
        );
    }

    #[test]
    fn faded_flowers_never_paint_again() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut flower = Flower::new(&mut rng, Vec2::new(64.0, 64.0), 1.0, Species::Wildflower);
        let mut surface = Surface::new(128, 128).unwrap();

        let mut frames = 0;
        while flower.is_active() {
            flower.draw(&mut Brush::new(&mut surface), &mut rng, frames as f32 / 60.0);
            frames += 1;
            assert!(frames < 400, "flower should fade within its lifespan");
        }
        // One more call crosses the age threshold and latches the fade.
        flower.draw(&mut Brush::new(&mut surface), &mut rng, 99.0);
        flower.draw(&mut Brush::new(&mut surface), &mut rng, 99.0);
        assert_eq!(flower.phase(), BloomPhase::Faded);

        let settled = surface.clone();
        for i in 0..5 {
            flower.draw(&mut Brush::new(&mut surface), &mut rng, i as f32);
        }
        assert_eq!(surface.data(), settled.data(), "faded blooms leave the paint alone");
    }
}
