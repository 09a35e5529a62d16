//! `garden_viewer`: watches a garden paint itself in a window.
//!
//! Run with:
//!   cargo run --example garden_viewer
//!
//! Keys 1-5 switch between the scene modes; R replants the current mode with
//! a fresh seed. Resizing the window replants at the new size.

use bevy::prelude::*;
use bevy::window::WindowResized;
use bevy_brushwood::{BrushwoodPlugin, GardenCanvas, GardenConfig, GardenFinished, GardenMode};

/// Paper tint behind the painting.
const PAPER: Color = Color::srgb_u8(0xfb, 0xf9, 0xf2);

const MODE_KEYS: [(KeyCode, GardenMode); 5] = [
    (KeyCode::Digit1, GardenMode::Wildflower),
    (KeyCode::Digit2, GardenMode::Sunflower),
    (KeyCode::Digit3, GardenMode::Pothos),
    (KeyCode::Digit4, GardenMode::Mixed),
    (KeyCode::Digit5, GardenMode::Meadow),
];

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "bevy_brushwood: wildflower garden".into(),
                resolution: (960, 600).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(BrushwoodPlugin)
        .insert_resource(ClearColor(PAPER))
        .add_systems(Startup, plant)
        .add_systems(Update, (switch_modes, follow_resizes, report_finished))
        .run();
}

fn plant(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    window: Single<&Window>,
) -> Result {
    commands.spawn(Camera2d);

    let width = window.width().max(1.0) as u32;
    let height = window.height().max(1.0) as u32;
    let config = GardenConfig {
        mode: GardenMode::Wildflower,
        seed: rand::random(),
    };
    let canvas = GardenCanvas::new(config, width, height, &mut images)?;

    commands.spawn((
        Sprite {
            image: canvas.image().clone(),
            custom_size: Some(Vec2::new(width as f32, height as f32)),
            ..default()
        },
        canvas,
    ));
    Ok(())
}

fn switch_modes(
    keys: Res<ButtonInput<KeyCode>>,
    mut canvases: Query<&mut GardenCanvas>,
    mut window: Single<&mut Window>,
) {
    let mut pick = None;
    for (key, mode) in MODE_KEYS {
        if keys.just_pressed(key) {
            pick = Some(mode);
        }
    }
    if pick.is_none() && !keys.just_pressed(KeyCode::KeyR) {
        return;
    }

    for mut canvas in &mut canvases {
        let mode = pick.unwrap_or(canvas.garden().mode());
        canvas.regenerate(GardenConfig {
            mode,
            seed: rand::random(),
        });
        window.title = format!("bevy_brushwood: {} garden", mode.label());
    }
}

/// Replant at the new size, keeping the sprite stretched over the window.
fn follow_resizes(
    mut resizes: MessageReader<WindowResized>,
    mut canvases: Query<(&mut GardenCanvas, &mut Sprite)>,
    mut images: ResMut<Assets<Image>>,
) -> Result {
    let Some(last) = resizes.read().last() else {
        return Ok(());
    };

    let width = last.width.max(1.0) as u32;
    let height = last.height.max(1.0) as u32;
    for (mut canvas, mut sprite) in &mut canvases {
        canvas.resize(width, height, &mut images)?;
        sprite.custom_size = Some(Vec2::new(width as f32, height as f32));
    }
    Ok(())
}

fn report_finished(
    mut finished: MessageReader<GardenFinished>,
    mut window: Single<&mut Window>,
) {
    for message in finished.read() {
        window.title = format!(
            "bevy_brushwood: finished in {} ticks (R to replant)",
            message.ticks
        );
    }
}
