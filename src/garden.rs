//! Scene orchestration: seeding, the tick loop, and completion.
//!
//! A [`Garden`] owns every entity plus two surfaces.  Brush marks accumulate
//! on the paint surface; each tick the composite filter rebuilds the display
//! surface from it and butterflies are painted on top, so they hover over
//! the painting instead of leaving trails in it.
//!
//! Time is a logical clock: [`Garden::tick`] advances the scene by exactly
//! one frame and bumps the clock by [`TICK_SECONDS`].  Nothing reads wall
//! time, so a garden can be run headless, stepped in tests, or fast-forwarded
//! to completion, and the same config always paints the same picture.

use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::brush::Brush;
use crate::butterfly::Butterfly;
use crate::flower::Flower;
use crate::palette;
use crate::stem::{Species, Stem, StemStyle};
use crate::surface::{Surface, SurfaceError};
use crate::watercolor::{CompositeFilter, WatercolorWash};

use std::f32::consts::{FRAC_PI_2, PI};

// --- tuning constants -------------------------------------------------------

/// Seconds of scene time per tick.
pub const TICK_SECONDS: f32 = 1.0 / 60.0;
/// Soft ground tint passes painted at seeding.
const GROUND_WASHES: usize = 20;
/// Side length of the keep-clear square in the top-right corner.
const ZONE_SIZE: f32 = 450.0;

/// Scene recipe selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GardenMode {
    #[default]
    Wildflower,
    Sunflower,
    Pothos,
    Mixed,
    Meadow,
}

/// Where vines are allowed to take root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VineSeeding {
    /// Bottom, both sides, ceiling, and free-floating interior points.
    Everywhere,
    /// Bottom and sides only.
    EdgesOnly,
}

/// Everything mode-dependent about seeding, as plain data.
pub struct ModeProfile {
    pub species: &'static [Species],
    /// Population is `surface width / density_divisor`.
    pub density_divisor: f32,
    pub butterflies: bool,
    pub exclusion_zone: bool,
    pub vine_seeding: VineSeeding,
    /// Drop half of all vine candidates (keeps mixed scenes airy).
    pub thin_vines: bool,
    /// Occasionally hang a second, smaller bloom off a stem's flank.
    pub side_blooms: bool,
    /// Wildflower target height as (base, span) fractions of surface height.
    pub wildflower_height: (f32, f32),
    /// Fixed spawn heading for upright species; `None` lets each stem pick
    /// its natural lean.
    pub upright_heading: Option<f32>,
}

const WILDFLOWER_PROFILE: ModeProfile = ModeProfile {
    species: &[Species::Wildflower],
    density_divisor: 30.0,
    butterflies: true,
    exclusion_zone: true,
    vine_seeding: VineSeeding::EdgesOnly,
    thin_vines: false,
    side_blooms: false,
    wildflower_height: (0.2, 0.5),
    upright_heading: Some(-FRAC_PI_2),
};

const SUNFLOWER_PROFILE: ModeProfile = ModeProfile {
    species: &[Species::Sunflower],
    density_divisor: 60.0,
    ..WILDFLOWER_PROFILE
};

const POTHOS_PROFILE: ModeProfile = ModeProfile {
    species: &[Species::Pothos],
    density_divisor: 25.0,
    vine_seeding: VineSeeding::Everywhere,
    ..WILDFLOWER_PROFILE
};

const MIXED_PROFILE: ModeProfile = ModeProfile {
    species: &[Species::Wildflower, Species::Sunflower, Species::Pothos],
    density_divisor: 35.0,
    thin_vines: true,
    ..WILDFLOWER_PROFILE
};

const MEADOW_PROFILE: ModeProfile = ModeProfile {
    species: &[Species::Wildflower],
    density_divisor: 25.0,
    butterflies: false,
    exclusion_zone: false,
    side_blooms: true,
    wildflower_height: (0.3, 0.4),
    upright_heading: None,
    ..WILDFLOWER_PROFILE
};

impl GardenMode {
    pub const ALL: [GardenMode; 5] = [
        GardenMode::Wildflower,
        GardenMode::Sunflower,
        GardenMode::Pothos,
        GardenMode::Mixed,
        GardenMode::Meadow,
    ];

    pub fn profile(self) -> &'static ModeProfile {
        match self {
            GardenMode::Wildflower => &WILDFLOWER_PROFILE,
            GardenMode::Sunflower => &SUNFLOWER_PROFILE,
            GardenMode::Pothos => &POTHOS_PROFILE,
            GardenMode::Mixed => &MIXED_PROFILE,
            GardenMode::Meadow => &MEADOW_PROFILE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GardenMode::Wildflower => "wildflower",
            GardenMode::Sunflower => "sunflower",
            GardenMode::Pothos => "pothos",
            GardenMode::Mixed => "mixed",
            GardenMode::Meadow => "meadow",
        }
    }
}

/// Square region where nothing may be seeded or persist.  Containment is
/// strict-interior, so points exactly on an edge count as outside.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExclusionZone {
    pub corner: Vec2,
    pub size: Vec2,
}

impl ExclusionZone {
    /// Zone hugging the top-right corner of a surface `width` wide.
    pub fn top_right(width: f32, size: Vec2) -> Self {
        Self {
            corner: Vec2::new(width - size.x, 0.0),
            size,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.corner.x
            && p.x < self.corner.x + self.size.x
            && p.y > self.corner.y
            && p.y < self.corner.y + self.size.y
    }
}

/// Mode and seed; two gardens with equal config and size paint identical
/// pictures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GardenConfig {
    pub mode: GardenMode,
    pub seed: u64,
}

/// Outcome of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Something is still growing, blooming, or fluttering.
    pub active: bool,
    /// This was the first inactive frame; raised exactly once per scene.
    pub just_finished: bool,
}

pub struct Garden {
    config: GardenConfig,
    paint: Surface,
    display: Surface,
    filter: Box<dyn CompositeFilter>,
    rng: StdRng,
    clock: f32,
    ticks: u64,
    stems: Vec<Stem>,
    flowers: Vec<Flower>,
    butterflies: Vec<Butterfly>,
    zone: Option<ExclusionZone>,
    finished: bool,
}

impl Garden {
    /// Seed a scene with the default watercolor composite.
    pub fn new(config: GardenConfig, width: u32, height: u32) -> Result<Self, SurfaceError> {
        Self::with_filter(config, width, height, Box::new(WatercolorWash::default()))
    }

    pub fn with_filter(
        config: GardenConfig,
        width: u32,
        height: u32,
        filter: Box<dyn CompositeFilter>,
    ) -> Result<Self, SurfaceError> {
        let mut garden = Self {
            config,
            paint: Surface::new(width, height)?,
            display: Surface::new(width, height)?,
            filter,
            rng: StdRng::seed_from_u64(config.seed),
            clock: 0.0,
            ticks: 0,
            stems: Vec::new(),
            flowers: Vec::new(),
            butterflies: Vec::new(),
            zone: None,
            finished: false,
        };
        garden.seed_scene();
        Ok(garden)
    }

    pub fn config(&self) -> GardenConfig {
        self.config
    }

    pub fn mode(&self) -> GardenMode {
        self.config.mode
    }

    pub fn size(&self) -> (u32, u32) {
        (self.paint.width(), self.paint.height())
    }

    /// The composited picture, butterflies included.
    pub fn display(&self) -> &Surface {
        &self.display
    }

    /// The raw accumulating brushwork, before the paper filter.
    pub fn paint(&self) -> &Surface {
        &self.paint
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn stems(&self) -> &[Stem] {
        &self.stems
    }

    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    pub fn exclusion_zone(&self) -> Option<ExclusionZone> {
        self.zone
    }

    /// Reallocate both surfaces and reseed.  The composite filter is kept,
    /// so a custom filter survives window resizes.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.paint = Surface::new(width, height)?;
        self.display = Surface::new(width, height)?;
        self.reseed(self.config);
        Ok(())
    }

    /// Throw the scene away and seed a fresh one on the same surfaces.
    pub fn reseed(&mut self, config: GardenConfig) {
        self.config = config;
        self.rng = StdRng::seed_from_u64(config.seed);
        self.clock = 0.0;
        self.ticks = 0;
        self.paint.clear();
        self.display.clear();
        self.stems.clear();
        self.flowers.clear();
        self.butterflies.clear();
        self.finished = false;
        self.seed_scene();
    }

    fn seed_scene(&mut self) {
        let profile = self.config.mode.profile();
        let width = self.paint.width() as f32;
        let height = self.paint.height() as f32;
        let rng = &mut self.rng;

        {
            let mut brush = Brush::new(&mut self.paint);
            let ground_band = height * 0.15;
            for _ in 0..GROUND_WASHES {
                let x = rng.random::<f32>() * width;
                let y = height - rng.random::<f32>() * ground_band;
                let spread = 100.0 + rng.random::<f32>() * 200.0;
                let color = palette::GROUND[rng.random_range(0..palette::GROUND.len())];
                brush.wash(Vec2::new(x, y), spread, spread * 0.3, color, 0.05);
            }
        }

        self.zone = profile
            .exclusion_zone
            .then(|| ExclusionZone::top_right(width, Vec2::splat(ZONE_SIZE)));

        let population = (width / profile.density_divisor).floor() as usize;
        for _ in 0..population {
            let species = profile.species[rng.random_range(0..profile.species.len())];
            if profile.thin_vines && species == Species::Pothos && rng.random::<f32>() < 0.5 {
                continue;
            }

            let x = rng.random::<f32>() * width;
            let depth = rng.random::<f32>();

            let (origin, scale, reach, heading) = match species {
                Species::Pothos => {
                    let (origin, heading) = vine_spawn(rng, profile.vine_seeding, width, height);
                    let scale = 0.6 + depth * 0.8;
                    let reach = height * 0.4 + rng.random::<f32>() * (height * 0.5);
                    (origin, scale, reach, Some(heading))
                }
                Species::Sunflower => {
                    let origin = Vec2::new(x, height + 20.0 + depth * 40.0);
                    let reach = height * 0.5 + rng.random::<f32>() * (height * 0.3);
                    (origin, 0.8 + depth, reach, profile.upright_heading)
                }
                Species::Wildflower => {
                    let (base, span) = profile.wildflower_height;
                    let origin = Vec2::new(x, height + 10.0 + depth * 40.0);
                    let reach = height * base + rng.random::<f32>() * (height * span);
                    (origin, 0.5 + depth * 0.7, reach, profile.upright_heading)
                }
            };

            if self.zone.is_some_and(|zone| zone.contains(origin)) {
                continue;
            }

            let mut stem = Stem::new(rng, origin, reach * scale, scale, species, heading);
            if let Some(zone) = self.zone {
                stem.truncate_trailing(|p| zone.contains(p));
            }
            if stem.segments().is_empty() {
                continue;
            }
            self.stems.push(stem);
        }

        if profile.butterflies {
            let flock = 5 + rng.random_range(0..5);
            for _ in 0..flock {
                self.butterflies.push(Butterfly::new(rng, width, height));
            }
        }

        // Larger (nearer) stems paint last, on top.
        self.stems.sort_by(|a, b| a.scale().total_cmp(&b.scale()));
    }

    /// Advance the scene one frame.
    ///
    /// Order within a tick: every stem advances and paints, freshly grown
    /// bloom stems spawn their flower (subject to the exclusion zone at the
    /// tip), every flower paints, the display is recomposited from the
    /// paint surface, and butterflies move and paint over the composite.
    /// After the first inactive frame the garden is finished and further
    /// calls are no-ops.
    pub fn tick(&mut self) -> TickReport {
        if self.finished {
            return TickReport {
                active: false,
                just_finished: false,
            };
        }

        let profile = self.config.mode.profile();
        let clock = self.clock;
        let zone = self.zone;
        let rng = &mut self.rng;
        let mut active = false;

        {
            let mut brush = Brush::new(&mut self.paint);

            for stem in &mut self.stems {
                let done = stem.advance();
                stem.draw(&mut brush, rng);
                if !done {
                    active = true;
                } else if stem.style == StemStyle::Bloom && !stem.flower_spawned {
                    let tip = stem.tip();
                    if !zone.is_some_and(|z| z.contains(tip)) {
                        self.flowers
                            .push(Flower::new(rng, tip, stem.scale, stem.species));

                        if profile.side_blooms
                            && rng.random::<f32>() > 0.7
                            && stem.segments().len() > 20
                        {
                            let at = (stem.segments().len() as f32 * 0.7).floor() as usize;
                            let node = stem.segments()[at].pos;
                            self.flowers.push(Flower::new(
                                rng,
                                node + Vec2::new(20.0 * stem.scale, 0.0),
                                stem.scale * 0.7,
                                stem.species,
                            ));
                        }
                    }
                    stem.flower_spawned = true;
                }
            }

            for flower in &mut self.flowers {
                flower.draw(&mut brush, rng, clock);
                if flower.is_active() {
                    active = true;
                }
            }
        }

        self.filter.composite(&self.paint, &mut self.display);

        {
            let mut brush = Brush::new(&mut self.display);
            for butterfly in &mut self.butterflies {
                butterfly.advance(rng, clock);
                butterfly.draw(&mut brush, rng, clock);
                active = true;
            }
        }

        self.clock += TICK_SECONDS;
        self.ticks += 1;

        let just_finished = !active;
        if just_finished {
            self.finished = true;
        }
        TickReport {
            active,
            just_finished,
        }
    }
}

/// Pick a vine root and initial heading.
///
/// The rich table roots vines on every edge plus free interior points with
/// random headings; the edge table keeps them to the bottom and sides,
/// always growing up into the scene.
fn vine_spawn(rng: &mut impl Rng, seeding: VineSeeding, width: f32, height: f32) -> (Vec2, f32) {
    let spawn = rng.random::<f32>();
    match seeding {
        VineSeeding::Everywhere => {
            if spawn < 0.25 {
                (
                    Vec2::new(rng.random::<f32>() * width, height + 20.0),
                    -FRAC_PI_2,
                )
            } else if spawn < 0.5 {
                let x = if spawn < 0.37 { -20.0 } else { width + 20.0 };
                (Vec2::new(x, rng.random::<f32>() * height), -FRAC_PI_2)
            } else if spawn < 0.75 {
                (Vec2::new(rng.random::<f32>() * width, -20.0), FRAC_PI_2)
            } else {
                let x = width * 0.1 + rng.random::<f32>() * (width * 0.8);
                let heading = (rng.random::<f32>() - 0.5) * PI * 2.0;
                (Vec2::new(x, rng.random::<f32>() * height), heading)
            }
        }
        VineSeeding::EdgesOnly => {
            if spawn < 0.45 {
                (
                    Vec2::new(rng.random::<f32>() * width, height + 20.0),
                    -FRAC_PI_2,
                )
            } else {
                let x = if spawn < 0.75 { -20.0 } else { width + 20.0 };
                (Vec2::new(x, rng.random::<f32>() * height), -FRAC_PI_2)
            }
        }
    }
}

// --- tests ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watercolor::PlainBlit;

    fn fast_garden(mode: GardenMode, seed: u64, width: u32, height: u32) -> Garden {
        Garden::with_filter(
            GardenConfig { mode, seed },
            width,
            height,
            Box::new(PlainBlit),
        )
        .unwrap()
    }

    #[test]
    fn population_respects_density_and_sorting() {
        let garden = fast_garden(GardenMode::Wildflower, 1, 800, 600);
        assert!(garden.stems.len() <= 26, "800 / 30 caps the population");
        assert!(!garden.stems.is_empty());
        for pair in garden.stems.windows(2) {
            assert!(pair[0].scale() <= pair[1].scale(), "stems sort by ascending scale");
        }
        for stem in &garden.stems {
            assert_eq!(stem.species(), Species::Wildflower);
        }
    }

    #[test]
    fn no_retained_segment_sits_inside_the_zone() {
        for mode in [
            GardenMode::Wildflower,
            GardenMode::Sunflower,
            GardenMode::Pothos,
            GardenMode::Mixed,
        ] {
            for seed in 0..4 {
                let garden = fast_garden(mode, seed, 900, 700);
                let zone = garden.exclusion_zone().expect("garden modes keep a clear corner");
                for stem in &garden.stems {
                    for seg in stem.segments() {
                        assert!(
                            !zone.contains(seg.pos),
                            "{:?} seed {seed}: segment at {:?} violates the zone",
                            mode,
                            seg.pos
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn meadow_mode_has_no_zone_and_no_butterflies() {
        let garden = fast_garden(GardenMode::Meadow, 7, 640, 480);
        assert!(garden.exclusion_zone().is_none());
        assert!(garden.butterflies.is_empty());
    }

    #[test]
    fn meadow_runs_to_completion_and_latches() {
        let mut garden = fast_garden(GardenMode::Meadow, 3, 640, 480);
        let mut finish_signals = 0;
        let mut ticks = 0;
        while !garden.is_finished() {
            let report = garden.tick();
            if report.just_finished {
                finish_signals += 1;
                assert!(!report.active);
            }
            ticks += 1;
            assert!(ticks < 3000, "a meadow must wind down on its own");
        }
        assert_eq!(finish_signals, 1);
        assert!(
            garden.display.data().chunks(4).any(|px| px[3] > 0),
            "a finished meadow leaves a painting behind"
        );

        let after = garden.tick();
        assert!(!after.active);
        assert!(!after.just_finished, "completion is only signaled once");
        let frozen = garden.ticks();
        garden.tick();
        assert_eq!(garden.ticks(), frozen, "a finished garden stops counting");
    }

    #[test]
    fn butterfly_scenes_stay_active_forever() {
        let mut garden = fast_garden(GardenMode::Wildflower, 2, 320, 240);
        assert!(!garden.butterflies.is_empty());
        for _ in 0..600 {
            let report = garden.tick();
            assert!(report.active);
        }
        assert!(!garden.is_finished());
    }

    #[test]
    fn flowers_appear_once_stems_finish_growing() {
        let mut garden = fast_garden(GardenMode::Meadow, 11, 480, 360);
        assert!(garden.flowers.is_empty());
        for _ in 0..200 {
            garden.tick();
        }
        assert!(
            !garden.flowers.is_empty(),
            "grown bloom stems must have spawned flowers"
        );
        for flower in &garden.flowers {
            assert_eq!(flower.species(), Species::Wildflower);
        }
    }

    #[test]
    fn equal_configs_paint_equal_pixels() {
        let run = |seed: u64| {
            let mut garden = fast_garden(GardenMode::Wildflower, seed, 320, 240);
            for _ in 0..120 {
                garden.tick();
            }
            garden.display.data().to_vec()
        };
        assert_eq!(run(9), run(9));
        assert_ne!(run(9), run(10));
    }

    #[test]
    fn mixed_mode_draws_from_the_full_pool() {
        let garden = fast_garden(GardenMode::Mixed, 5, 1400, 800);
        let species: std::collections::HashSet<_> = garden
            .stems
            .iter()
            .map(|s| format!("{:?}", s.species()))
            .collect();
        assert!(species.len() >= 2, "a wide mixed garden mingles species");
    }

    #[test]
    fn reseed_starts_a_fresh_scene() {
        let mut garden = fast_garden(GardenMode::Meadow, 4, 320, 240);
        for _ in 0..50 {
            garden.tick();
        }
        assert!(garden.ticks() > 0);

        garden.reseed(GardenConfig {
            mode: GardenMode::Pothos,
            seed: 8,
        });
        assert_eq!(garden.ticks(), 0);
        assert_eq!(garden.clock(), 0.0);
        assert!(!garden.is_finished());
        assert_eq!(garden.mode(), GardenMode::Pothos);
        assert!(
            garden.display.data().iter().all(|&b| b == 0),
            "the display clears until the first new tick"
        );
        assert!(
            garden.paint.data().chunks(4).any(|px| px[3] > 0),
            "fresh ground washes land immediately"
        );
        assert!(garden.stems.iter().all(|s| s.species() == Species::Pothos));
    }

    // Saved presets are plain JSON, so field and variant names are a contract.
    #[test]
    fn config_parses_saved_presets() {
        let preset: GardenConfig =
            serde_json::from_str(r#"{"mode":"Sunflower","seed":12}"#).unwrap();
        assert_eq!(preset.mode, GardenMode::Sunflower);
        assert_eq!(preset.seed, 12);
        assert_eq!(
            serde_json::to_string(&preset).unwrap(),
            r#"{"mode":"Sunflower","seed":12}"#
        );
    }
}
