//! Stalks, vines and their foliage.
//!
//! A stem's whole geometry is computed eagerly at construction: a randomized
//! walk lays down every segment and decides leaf placement up front.  What
//! animates afterwards is only a growth cursor.  Each tick the cursor moves
//! by the stem's growth rate and [`Stem::draw`] paints the short window of
//! segments just behind it, so strokes accumulate on the paint surface
//! frame over frame instead of being redrawn whole.

use std::f32::consts::FRAC_PI_2;

use bevy::math::Vec2;
use rand::Rng;

use crate::brush::Brush;
use crate::palette::{self, Hsl};

// --- tuning constants -------------------------------------------------------

/// Heading jitter per walk step, radians (half range).
const WANDER: f32 = 0.12;
/// Sunflowers walk straighter.
const WANDER_SUNFLOWER: f32 = 0.05;
/// Upright stems drifting more than this from vertical get steered back.
const UPRIGHT_TOLERANCE: f32 = 0.4;
const UPRIGHT_CORRECTION: f32 = 0.03;

/// Plant species, fixed at seeding time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Species {
    Wildflower,
    Sunflower,
    Pothos,
}

/// What a stem grows into.  Vines never flower; grass stems stay bare
/// stalks with blade leaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StemStyle {
    Bloom,
    Grass,
    Vine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthPhase {
    Growing,
    Grown,
}

/// One node of the walk.  `heading` is the direction the walk left this
/// node with, kept for leaf orientation.
#[derive(Clone, Copy, Debug)]
pub struct Segment {
    pub pos: Vec2,
    pub heading: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafShape {
    Pointed,
    Blade,
    Broad,
    Heart,
}

/// A leaf anchored to one segment.  Positions are not stored; the leaf is
/// painted at its segment's node when the growth cursor first reaches it.
#[derive(Clone, Copy, Debug)]
pub struct Leaf {
    pub segment: usize,
    pub angle: f32,
    pub length: f32,
    pub width: f32,
    pub shape: LeafShape,
    pub color: Hsl,
    pub drawn: bool,
}

pub struct Stem {
    origin: Vec2,
    pub(crate) scale: f32,
    pub(crate) species: Species,
    pub(crate) style: StemStyle,
    color: Hsl,
    growth_rate: f32,
    grown: f32,
    phase: GrowthPhase,
    segments: Vec<Segment>,
    leaves: Vec<Leaf>,
    tip: Vec2,
    pub(crate) flower_spawned: bool,
}

impl Stem {
    /// Lay down the full walk for a stem rooted at `origin`.
    ///
    /// `target_height` is the total walk length in pixels (already scaled by
    /// the caller).  `initial_heading` overrides the species default of
    /// straight up for upright plants and a downward trail for vines.
    pub fn new(
        rng: &mut impl Rng,
        origin: Vec2,
        target_height: f32,
        scale: f32,
        species: Species,
        initial_heading: Option<f32>,
    ) -> Self {
        debug_assert!(scale > 0.0, "stem scale must be positive");

        let growth_rate = (1.5 + rng.random::<f32>() * 2.0)
            * if species == Species::Sunflower { 0.7 } else { 1.0 };
        let style = match species {
            Species::Pothos => StemStyle::Vine,
            _ if rng.random::<f32>() > 0.3 => StemStyle::Bloom,
            _ => StemStyle::Grass,
        };
        let color = match species {
            Species::Pothos => palette::STEMS[4],
            _ => palette::STEMS[rng.random_range(0..4)],
        };

        let mut heading = initial_heading.unwrap_or_else(|| match species {
            Species::Wildflower => -FRAC_PI_2 + rng.random_range(-0.2..0.2),
            Species::Sunflower => -FRAC_PI_2,
            Species::Pothos => FRAC_PI_2 + rng.random_range(-0.5..0.5),
        });

        let step = scale * if species == Species::Sunflower { 10.0 } else { 6.0 };
        let total_steps = (target_height / step).floor() as usize;
        let wander = if species == Species::Sunflower {
            WANDER_SUNFLOWER
        } else {
            WANDER
        };

        let mut segments = Vec::with_capacity(total_steps);
        let mut leaves = Vec::new();
        let mut cursor = origin;

        for i in 0..total_steps {
            heading += rng.random_range(-wander..wander);
            if species != Species::Pothos {
                if heading < -FRAC_PI_2 - UPRIGHT_TOLERANCE {
                    heading += UPRIGHT_CORRECTION;
                }
                if heading > -FRAC_PI_2 + UPRIGHT_TOLERANCE {
                    heading -= UPRIGHT_CORRECTION;
                }
            }
            cursor += Vec2::new(heading.cos(), heading.sin()) * step;
            segments.push(Segment { pos: cursor, heading });

            let steps_f = total_steps as f32;
            let at = i as f32;
            match species {
                Species::Sunflower if at > steps_f * 0.3 && rng.random::<f32>() < 0.2 => {
                    push_leaf(rng, &mut leaves, i, heading, scale, LeafShape::Broad);
                }
                Species::Pothos if rng.random::<f32>() < 0.4 => {
                    push_leaf(rng, &mut leaves, i, heading, scale, LeafShape::Heart);
                }
                Species::Wildflower => {
                    if style == StemStyle::Bloom
                        && at > steps_f * 0.2
                        && at < steps_f * 0.85
                        && rng.random::<f32>() < 0.15
                    {
                        push_leaf(rng, &mut leaves, i, heading, scale, LeafShape::Pointed);
                    } else if style == StemStyle::Grass
                        && at > steps_f * 0.3
                        && rng.random::<f32>() < 0.25
                    {
                        push_leaf(rng, &mut leaves, i, heading, scale, LeafShape::Blade);
                    }
                }
                _ => {}
            }
        }

        Self {
            origin,
            scale,
            species,
            style,
            color,
            growth_rate,
            grown: 0.0,
            phase: GrowthPhase::Growing,
            tip: segments.last().map_or(origin, |s| s.pos),
            segments,
            leaves,
            flower_spawned: false,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn style(&self) -> StemStyle {
        self.style
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Position of the final segment (where a bloom appears).
    pub fn tip(&self) -> Vec2 {
        self.tip
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_grown(&self) -> bool {
        self.phase == GrowthPhase::Grown
    }

    /// Move the growth cursor one tick.  Returns `true` once the stem has
    /// reached full height; the cursor then stays pinned at the end.
    pub fn advance(&mut self) -> bool {
        if self.phase == GrowthPhase::Growing {
            self.grown += self.growth_rate;
            if self.grown >= self.segments.len() as f32 {
                self.grown = self.segments.len() as f32;
                self.phase = GrowthPhase::Grown;
            }
        }
        self.phase == GrowthPhase::Grown
    }

    /// Cut the walk short at its first step into forbidden territory.
    /// Everything from that node on is discarded, along with the leaves
    /// anchored there, and the tip moves to the last surviving node.
    pub fn truncate_trailing(&mut self, forbidden: impl Fn(Vec2) -> bool) {
        if let Some(first) = self.segments.iter().position(|s| forbidden(s.pos)) {
            self.segments.truncate(first);
            self.leaves.retain(|leaf| leaf.segment < first);
            self.tip = self.segments.last().map_or(self.origin, |s| s.pos);
        }
    }

    /// Paint the trailing window of segments just behind the growth cursor.
    ///
    /// Each segment gets a base stroke plus a narrower darker core; a leaf
    /// is painted exactly once, the first time its segment enters the
    /// window.  Once a flower has been placed at the tip the final segment
    /// is left to the bloom and no longer restroked.
    pub fn draw(&mut self, brush: &mut Brush<'_>, rng: &mut impl Rng) {
        let max_index = self.grown.floor() as usize;
        if max_index < 1 {
            return;
        }
        let draw_end = if self.flower_spawned {
            max_index.saturating_sub(1).max(1)
        } else {
            max_index
        };
        let reach = self.growth_rate.ceil() as usize + 1;
        let start = draw_end.saturating_sub(reach).max(1);

        let segments = &self.segments;
        let total = segments.len() as f32;
        for i in start..draw_end {
            let prev = segments[i - 1].pos;
            let curr = segments[i].pos;
            let t = i as f32 / total;

            let width = match self.species {
                Species::Pothos => 3.0 * self.scale,
                Species::Sunflower => 8.0 * self.scale * (1.0 - t * 0.4),
                Species::Wildflower => 4.0 * self.scale * (1.0 - t * 0.4),
            };

            brush.stroke(rng, prev, curr, self.color, width, 0.25);
            brush.stroke(rng, prev, curr, self.color.darker(10.0), width * 0.6, 0.15);

            for leaf in self.leaves.iter_mut().filter(|l| l.segment == i) {
                if !leaf.drawn {
                    paint_leaf(brush, rng, curr, leaf);
                    leaf.drawn = true;
                }
            }
        }
    }
}

fn push_leaf(
    rng: &mut impl Rng,
    leaves: &mut Vec<Leaf>,
    segment: usize,
    heading: f32,
    scale: f32,
    shape: LeafShape,
) {
    let side = if rng.random::<f32>() < 0.5 { -1.0 } else { 1.0 };
    let angle = heading + side * (0.8 + rng.random::<f32>() * 0.6);

    let (length, width, color) = match shape {
        LeafShape::Pointed => (
            (15.0 + rng.random::<f32>() * 20.0) * scale,
            (4.0 + rng.random::<f32>() * 4.0) * scale,
            palette::LEAVES,
        ),
        LeafShape::Blade => (
            (20.0 + rng.random::<f32>() * 30.0) * scale,
            (2.0 + rng.random::<f32>() * 2.0) * scale,
            palette::LEAVES,
        ),
        LeafShape::Broad => (
            (25.0 + rng.random::<f32>() * 35.0) * scale,
            (15.0 + rng.random::<f32>() * 20.0) * scale,
            palette::LEAVES,
        ),
        LeafShape::Heart => (
            (15.0 + rng.random::<f32>() * 25.0) * scale,
            (12.0 + rng.random::<f32>() * 18.0) * scale,
            palette::VINE_LEAVES[rng.random_range(0..palette::VINE_LEAVES.len())],
        ),
    };

    leaves.push(Leaf {
        segment,
        angle,
        length,
        width,
        shape,
        color,
        drawn: false,
    });
}

fn paint_leaf(brush: &mut Brush<'_>, rng: &mut impl Rng, base: Vec2, leaf: &Leaf) {
    let dir = Vec2::new(leaf.angle.cos(), leaf.angle.sin());
    let tip = base + dir * leaf.length;
    let mid = base + dir * (leaf.length * 0.5);
    let c = leaf.color;

    match leaf.shape {
        LeafShape::Blade => {
            brush.stroke(rng, base, tip, c, leaf.width, 0.3);
        }
        LeafShape::Broad => {
            brush.blob(rng, mid, leaf.width, c, 0.2, Some(leaf.angle), Some(1.8));
            brush.stroke(rng, base, tip, c.darker(15.0), leaf.width * 0.2, 0.2);
        }
        LeafShape::Heart => {
            // Two lobes straddling the midrib approximate the heart.
            let offset = leaf.width * 0.3;
            for tilt in [0.5, -0.5] {
                let lobe = mid + Vec2::new((leaf.angle + tilt).cos(), (leaf.angle + tilt).sin()) * offset;
                brush.blob(rng, lobe, leaf.width * 0.6, c, 0.2, Some(leaf.angle), Some(1.5));
            }
            brush.stroke(rng, base, tip, c.darker(10.0), 1.0, 0.1);
        }
        LeafShape::Pointed => {
            brush.blob(rng, mid, leaf.width * 2.0, c, 0.15, Some(leaf.angle), Some(2.5));
            brush.stroke(rng, base, tip, c.darker(15.0), leaf.width * 0.3, 0.2);
        }
    }
}

// --- tests ------------------------------------------------------------------
