//! `paint_png`: paints a meadow headlessly and saves it as `garden.png`.
//!
//! Run with:
//!   cargo run --example paint_png --release
//!
//! No window, no Bevy app; this drives a [`Garden`] directly.

use bevy_brushwood::{Garden, GardenConfig, GardenMode};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;
/// Meadows always paint themselves out, but cap the loop anyway.
const MAX_TICKS: u64 = 20_000;

/// Warm paper tint, used to flatten the alpha away.
const PAPER: [u32; 3] = [0xfb, 0xf9, 0xf2];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GardenConfig {
        mode: GardenMode::Meadow,
        seed: rand::random(),
    };
    let mut garden = Garden::new(config, WIDTH, HEIGHT)?;

    loop {
        let report = garden.tick();
        if report.just_finished || garden.ticks() >= MAX_TICKS {
            break;
        }
    }

    let mut pixels = garden.display().data().to_vec();
    for px in pixels.chunks_exact_mut(4) {
        let a = px[3] as u32;
        for (c, paper) in px[..3].iter_mut().zip(PAPER) {
            *c = ((*c as u32 * a + paper * (255 - a)) / 255) as u8;
        }
        px[3] = 255;
    }

    let image =
        image::RgbaImage::from_raw(WIDTH, HEIGHT, pixels).ok_or("display buffer size mismatch")?;
    image.save("garden.png")?;

    println!(
        "painted a {} garden in {} ticks -> garden.png",
        garden.mode().label(),
        garden.ticks()
    );
    Ok(())
}
