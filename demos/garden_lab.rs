//! `garden_lab`: egui playground for scene modes and seeds.
//!
//! Run with:
//!   cargo run --example garden_lab --features egui

use bevy::prelude::*;
use bevy_brushwood::{BrushwoodPlugin, GardenCanvas, GardenConfig, GardenFinished, GardenMode};
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};

const CANVAS_WIDTH: u32 = 900;
const CANVAS_HEIGHT: u32 = 560;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "bevy_brushwood: garden lab".into(),
                resolution: (960, 620).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin::default())
        .add_plugins(BrushwoodPlugin)
        .insert_resource(ClearColor(Color::srgb_u8(0xfb, 0xf9, 0xf2)))
        .init_resource::<LabState>()
        .add_systems(Startup, plant)
        .add_systems(EguiPrimaryContextPass, lab_panel)
        .add_systems(Update, note_finished)
        .run();
}

#[derive(Resource)]
struct LabState {
    config: GardenConfig,
    finished_ticks: Option<u64>,
}

impl Default for LabState {
    fn default() -> Self {
        Self {
            config: GardenConfig {
                mode: GardenMode::Mixed,
                seed: 1,
            },
            finished_ticks: None,
        }
    }
}

fn plant(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    state: Res<LabState>,
) -> Result {
    commands.spawn(Camera2d);

    let canvas = GardenCanvas::new(state.config, CANVAS_WIDTH, CANVAS_HEIGHT, &mut images)?;
    commands.spawn((
        Sprite {
            image: canvas.image().clone(),
            custom_size: Some(Vec2::new(CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32)),
            ..default()
        },
        canvas,
    ));
    Ok(())
}

fn lab_panel(
    mut contexts: EguiContexts,
    mut state: ResMut<LabState>,
    mut canvases: Query<&mut GardenCanvas>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    let mut replant = false;
    egui::Window::new("garden lab").show(ctx, |ui| {
        egui::ComboBox::from_label("mode")
            .selected_text(state.config.mode.label())
            .show_ui(ui, |ui| {
                for mode in GardenMode::ALL {
                    if ui
                        .selectable_value(&mut state.config.mode, mode, mode.label())
                        .changed()
                    {
                        replant = true;
                    }
                }
            });

        ui.horizontal(|ui| {
            ui.label("seed");
            if ui.add(egui::DragValue::new(&mut state.config.seed)).changed() {
                replant = true;
            }
        });

        if ui.button("replant").clicked() {
            state.config.seed = rand::random();
            replant = true;
        }

        if let Some(ticks) = state.finished_ticks {
            ui.label(format!("finished in {ticks} ticks"));
        } else {
            ui.label("painting...");
        }
    });

    if replant {
        state.finished_ticks = None;
        for mut canvas in &mut canvases {
            canvas.regenerate(state.config);
        }
    }
    Ok(())
}

fn note_finished(mut finished: MessageReader<GardenFinished>, mut state: ResMut<LabState>) {
    for message in finished.read() {
        state.finished_ticks = Some(message.ticks);
    }
}
