//! Watercolor brush primitives.
//!
//! A [`Brush`] borrows a [`Surface`] and rasterizes soft shapes into it:
//! round-capped strokes, layered elliptical blobs, radial washes, and
//! butterfly wings.  Every primitive perturbs its inputs slightly through
//! the caller's RNG so that repeated marks with the same arguments never
//! land twice as identical pixels.  That jitter is the entire watercolor
//! illusion at this layer; the paper texture is applied later by the
//! composite filter.
//!
//! Coordinates are y-down screen space.  Marks may extend past the surface;
//! off-surface pixels are clipped, but the RNG is always advanced the same
//! way so a scene stays deterministic regardless of where it is painted.

use bevy::math::Vec2;
use rand::Rng;

use crate::palette::Hsl;
use crate::surface::Surface;

// --- tuning constants -------------------------------------------------------

/// Line segments used to flatten each wing bezier.
const CURVE_STEPS: usize = 12;

/// Translucent passes layered per wing call.
const WING_PASSES: usize = 3;

/// Which half of the body a wing sprouts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WingSide {
    Left,
    Right,
}

impl WingSide {
    fn sign(self) -> f32 {
        match self {
            WingSide::Left => -1.0,
            WingSide::Right => 1.0,
        }
    }
}

/// Forewing or hindwing outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WingLobe {
    Upper,
    Lower,
}

/// Horizontal wing extension for a flap phase given in turns: 1.0 at the
/// open pose, floored at 0.1 so a wing edge-on never vanishes completely.
pub fn flap_extension(phase: f32) -> f32 {
    (0.4 + (phase * std::f32::consts::TAU).cos() * 0.6).max(0.1)
}

/// Paints into a borrowed surface.
pub struct Brush<'a> {
    surface: &'a mut Surface,
}

impl<'a> Brush<'a> {
    pub fn new(surface: &'a mut Surface) -> Self {
        Self { surface }
    }

    /// A round-capped stroke from `from` to `to`.
    ///
    /// Hue, saturation, lightness and width are each jittered once per call;
    /// `opacity` is used as-is, so layered strokes build up density.
    pub fn stroke(
        &mut self,
        rng: &mut impl Rng,
        from: Vec2,
        to: Vec2,
        color: Hsl,
        width: f32,
        opacity: f32,
    ) {
        let tone = Hsl {
            h: color.h + rng.random_range(-4.0..4.0),
            s: color.s + rng.random_range(-5.0..5.0),
            l: color.l + rng.random_range(-5.0..5.0),
        };
        let rgb = tone.to_rgb();
        let half = (width * rng.random_range(0.85..1.15)).max(0.1) * 0.5;

        let w = self.surface.width() as i32;
        let h = self.surface.height() as i32;
        let min_x = ((from.x.min(to.x) - half - 1.0).floor() as i32).max(0);
        let max_x = ((from.x.max(to.x) + half + 1.0).ceil() as i32).min(w - 1);
        let min_y = ((from.y.min(to.y) - half - 1.0).floor() as i32).max(0);
        let max_y = ((from.y.max(to.y) + half + 1.0).ceil() as i32).min(h - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let cover = (half + 0.5 - segment_distance(p, from, to)).clamp(0.0, 1.0);
                if cover > 0.0 {
                    self.surface.blend_pixel(x, y, rgb, opacity * cover);
                }
            }
        }
    }

    /// A soft pigment pool: two overlapping ellipses, each with its own
    /// small center, radius, tone and tilt perturbation.
    ///
    /// `angle` and `stretch` fix the ellipse orientation and elongation;
    /// when absent they are drawn from the RNG (a random tilt with a mild
    /// 1.1..1.3 stretch).
    pub fn blob(
        &mut self,
        rng: &mut impl Rng,
        center: Vec2,
        radius: f32,
        color: Hsl,
        opacity: f32,
        angle: Option<f32>,
        stretch: Option<f32>,
    ) {
        let base_angle = angle.unwrap_or_else(|| rng.random::<f32>() * std::f32::consts::PI);
        let stretch = stretch.unwrap_or_else(|| rng.random_range(1.1..1.3));

        for _ in 0..2 {
            let offset = Vec2::new(rng.random_range(-0.2..0.2), rng.random_range(-0.2..0.2)) * radius;
            let r = (radius * rng.random_range(0.8..1.2)).max(0.5);
            let rx = r * stretch;
            let ry = r * rng.random_range(0.7..1.0);
            let tone = Hsl {
                h: color.h + rng.random_range(-6.0..6.0),
                l: color.l + rng.random_range(-4.0..4.0),
                ..color
            };
            let tilt = base_angle + rng.random_range(-0.1..0.1);
            self.fill_ellipse(center + offset, rx, ry, tilt, tone.to_rgb(), opacity);
        }
    }

    /// A broad elliptical gradient, fully transparent at its rim.  Used for
    /// ground tinting; unlike the other primitives it applies no jitter.
    pub fn wash(&mut self, center: Vec2, width: f32, height: f32, color: Hsl, opacity: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let rgb = color.to_rgb();
        let w = self.surface.width() as i32;
        let h = self.surface.height() as i32;
        let min_x = ((center.x - width).floor() as i32).max(0);
        let max_x = ((center.x + width).ceil() as i32).min(w - 1);
        let min_y = ((center.y - height).floor() as i32).max(0);
        let max_y = ((center.y + height).ceil() as i32).min(h - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = (x as f32 + 0.5 - center.x) / width;
                let dy = (y as f32 + 0.5 - center.y) / height;
                let nd = (dx * dx + dy * dy).sqrt();
                if nd < 1.0 {
                    self.surface.blend_pixel(x, y, rgb, opacity * (1.0 - nd));
                }
            }
        }
    }

    /// One wing lobe: three jittered translucent fills of a bezier outline,
    /// mirrored by `side` and squashed horizontally by the flap phase.
    ///
    /// `size` is the wing scale in pixels, `heading` the body axis in
    /// radians, `flap_phase` in turns (see [`flap_extension`]).  Each pass
    /// carries a third of `opacity`.
    #[allow(clippy::too_many_arguments)]
    pub fn butterfly_wing(
        &mut self,
        rng: &mut impl Rng,
        center: Vec2,
        size: f32,
        heading: f32,
        side: WingSide,
        lobe: WingLobe,
        color: Hsl,
        opacity: f32,
        flap_phase: f32,
    ) {
        let flap = flap_extension(flap_phase) * side.sign();
        let (sin, cos) = heading.sin_cos();
        let per_pass = opacity / WING_PASSES as f32;
        let mut points = Vec::with_capacity(2 * CURVE_STEPS);

        for _ in 0..WING_PASSES {
            let jitter = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
            let s = size * rng.random_range(0.9..1.1);
            let tone = Hsl {
                h: color.h + rng.random_range(-5.0..5.0),
                l: color.l + rng.random_range(-5.0..5.0),
                ..color
            };

            points.clear();
            wing_outline(lobe, s, &mut points);
            for p in &mut points {
                let local = *p + jitter;
                let flapped = Vec2::new(local.x * flap, local.y);
                *p = center + Vec2::new(flapped.x * cos - flapped.y * sin, flapped.x * sin + flapped.y * cos);
            }
            self.fill_polygon(&points, tone.to_rgb(), per_pass);
        }
    }

    fn fill_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, angle: f32, rgb: [f32; 3], opacity: f32) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let extent = rx.max(ry) + 1.0;
        let w = self.surface.width() as i32;
        let h = self.surface.height() as i32;
        let min_x = ((center.x - extent).floor() as i32).max(0);
        let max_x = ((center.x + extent).ceil() as i32).min(w - 1);
        let min_y = ((center.y - extent).floor() as i32).max(0);
        let max_y = ((center.y + extent).ceil() as i32).min(h - 1);

        let (sin, cos) = angle.sin_cos();
        // Gradient of the normalized distance is ~1/min_r at the rim, which
        // turns the one-pixel AA band back into pixel units.
        let min_r = rx.min(ry).max(0.25);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                let u = dx * cos + dy * sin;
                let v = -dx * sin + dy * cos;
                let nd = ((u / rx).powi(2) + (v / ry).powi(2)).sqrt();
                let cover = ((1.0 - nd) * min_r + 0.5).clamp(0.0, 1.0);
                if cover > 0.0 {
                    self.surface.blend_pixel(x, y, rgb, opacity * cover);
                }
            }
        }
    }

    /// Scanline fill with fractional coverage at span ends.  Vertical edges
    /// get horizontal antialiasing only, which is plenty under three
    /// overlapping passes.
    fn fill_polygon(&mut self, points: &[Vec2], rgb: [f32; 3], opacity: f32) {
        if points.len() < 3 {
            return;
        }
        let h = self.surface.height() as i32;
        let w = self.surface.width() as i32;
        let min_y = (points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor() as i32).max(0);
        let max_y = (points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil() as i32).min(h - 1);

        let mut crossings: Vec<f32> = Vec::with_capacity(8);
        for y in min_y..=max_y {
            let yc = y as f32 + 0.5;
            crossings.clear();
            for i in 0..points.len() {
                let p = points[i];
                let q = points[(i + 1) % points.len()];
                if (p.y <= yc && yc < q.y) || (q.y <= yc && yc < p.y) {
                    let t = (yc - p.y) / (q.y - p.y);
                    crossings.push(p.x + t * (q.x - p.x));
                }
            }
            crossings.sort_by(f32::total_cmp);

            for pair in crossings.chunks_exact(2) {
                let (x0, x1) = (pair[0], pair[1]);
                let first = (x0.floor() as i32).max(0);
                let last = ((x1.ceil() as i32) - 1).min(w - 1);
                for x in first..=last {
                    let cell = x as f32;
                    let cover = (x1.min(cell + 1.0) - x0.max(cell)).clamp(0.0, 1.0);
                    if cover > 0.0 {
                        self.surface.blend_pixel(x, y, rgb, opacity * cover);
                    }
                }
            }
        }
    }
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Flattened wing outline in unit space, +x away from the body, origin at
/// the wing root.  The upper lobe sweeps forward and up, the lower lobe
/// trails down and back.
fn wing_outline(lobe: WingLobe, s: f32, out: &mut Vec<Vec2>) {
    let curves: [[Vec2; 4]; 2] = match lobe {
        WingLobe::Upper => [
            [
                Vec2::ZERO,
                Vec2::new(0.5, -1.5),
                Vec2::new(2.5, -0.5),
                Vec2::new(1.5, 0.2),
            ],
            [
                Vec2::new(1.5, 0.2),
                Vec2::new(1.0, 0.5),
                Vec2::new(0.2, 0.2),
                Vec2::ZERO,
            ],
        ],
        WingLobe::Lower => [
            [
                Vec2::ZERO,
                Vec2::new(1.2, 0.5),
                Vec2::new(1.5, 1.8),
                Vec2::new(0.5, 1.2),
            ],
            [
                Vec2::new(0.5, 1.2),
                Vec2::new(0.2, 0.8),
                Vec2::new(0.0, 0.2),
                Vec2::ZERO,
            ],
        ],
    };

    for [p0, p1, p2, p3] in curves {
        for step in 1..=CURVE_STEPS {
            let t = step as f32 / CURVE_STEPS as f32;
            out.push(cubic_point(p0 * s, p1 * s, p2 * s, p3 * s, t));
        }
    }
}

fn cubic_point(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

// --- tests ------------------------------------------------------------------
