use std::hint::black_box;

use bevy::math::Vec2;
use bevy_brushwood::brush::Brush;
use bevy_brushwood::garden::{Garden, GardenConfig, GardenMode};
use bevy_brushwood::palette;
use bevy_brushwood::surface::Surface;
use bevy_brushwood::watercolor::{CompositeFilter, WatercolorWash};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn bench_stroke(c: &mut Criterion) {
    let mut surface = Surface::new(512, 512).expect("valid size");
    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("stroke_512", |b| {
        b.iter(|| {
            let mut brush = Brush::new(&mut surface);
            brush.stroke(
                &mut rng,
                black_box(Vec2::new(10.0, 500.0)),
                black_box(Vec2::new(500.0, 10.0)),
                palette::STEMS[0],
                6.0,
                0.3,
            );
        })
    });
}

fn bench_blob(c: &mut Criterion) {
    let mut surface = Surface::new(512, 512).expect("valid size");
    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("blob_512", |b| {
        b.iter(|| {
            let mut brush = Brush::new(&mut surface);
            brush.blob(
                &mut rng,
                black_box(Vec2::new(256.0, 256.0)),
                black_box(40.0),
                palette::FLOWERS[0],
                0.1,
                None,
                None,
            );
        })
    });
}

fn bench_wash_composite(c: &mut Criterion) {
    let mut paint = Surface::new(512, 512).expect("valid size");
    let mut display = Surface::new(512, 512).expect("valid size");
    let mut rng = StdRng::seed_from_u64(7);
    let mut brush = Brush::new(&mut paint);
    for i in 0..40 {
        let x = (i * 12) as f32 + 10.0;
        brush.stroke(
            &mut rng,
            Vec2::new(x, 500.0),
            Vec2::new(x, 40.0),
            palette::STEMS[1],
            5.0,
            0.3,
        );
    }

    let mut wash = WatercolorWash::default();
    c.bench_function("wash_composite_512", |b| {
        b.iter(|| wash.composite(black_box(&paint), &mut display))
    });
}

fn bench_garden_tick(c: &mut Criterion) {
    // Butterfly scenes never finish, so every iteration does a full frame.
    let config = GardenConfig {
        mode: GardenMode::Wildflower,
        seed: 7,
    };
    let mut garden = Garden::new(config, 512, 512).expect("valid size");
    c.bench_function("garden_tick_512", |b| b.iter(|| garden.tick()));
}

fn bench_meadow_complete(c: &mut Criterion) {
    c.bench_function("meadow_complete_320", |b| {
        b.iter(|| {
            let config = GardenConfig {
                mode: GardenMode::Meadow,
                seed: 7,
            };
            let mut garden = Garden::new(config, 320, 200).expect("valid size");
            while !garden.tick().just_finished {}
            black_box(garden.ticks())
        })
    });
}

criterion_group!(
    benches,
    bench_stroke,
    bench_blob,
    bench_wash_composite,
    bench_garden_tick,
    bench_meadow_complete
);
criterion_main!(benches);
