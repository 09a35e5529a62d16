//! Bevy-side plumbing for gardens.
//!
//! A [`GardenCanvas`] pairs a [`Garden`] with the GPU texture its display
//! surface uploads into.  The [`advance_gardens`] system ticks every canvas
//! once per frame and pushes the fresh pixels to the texture; show the
//! texture with an ordinary [`Sprite`] (or any material that takes an image
//! handle).  When a scene paints itself out, a [`GardenFinished`] message is
//! sent once.

use bevy::prelude::*;

use crate::garden::{Garden, GardenConfig};
use crate::surface::SurfaceError;
use crate::watercolor::CompositeFilter;

/// A garden bound to the image asset it renders into.
#[derive(Component)]
pub struct GardenCanvas {
    garden: Garden,
    image: Handle<Image>,
}

impl GardenCanvas {
    /// Seed a garden and allocate its backing image.
    pub fn new(
        config: GardenConfig,
        width: u32,
        height: u32,
        images: &mut Assets<Image>,
    ) -> Result<Self, SurfaceError> {
        let garden = Garden::new(config, width, height)?;
        let image = images.add(garden.display().to_image());
        Ok(Self { garden, image })
    }

    /// As [`GardenCanvas::new`] with a custom composite filter.
    pub fn with_filter(
        config: GardenConfig,
        width: u32,
        height: u32,
        filter: Box<dyn CompositeFilter>,
        images: &mut Assets<Image>,
    ) -> Result<Self, SurfaceError> {
        let garden = Garden::with_filter(config, width, height, filter)?;
        let image = images.add(garden.display().to_image());
        Ok(Self { garden, image })
    }

    /// Handle of the texture the garden renders into.  Stable across
    /// regeneration and resize, so sprites keep working.
    pub fn image(&self) -> &Handle<Image> {
        &self.image
    }

    pub fn garden(&self) -> &Garden {
        &self.garden
    }

    /// Start over with a new mode or seed at the current size.
    pub fn regenerate(&mut self, config: GardenConfig) {
        self.garden.reseed(config);
    }

    /// Rebuild the scene at a new size, replacing the texture contents
    /// behind the existing handle.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        images: &mut Assets<Image>,
    ) -> Result<(), SurfaceError> {
        self.garden.resize(width, height)?;
        images.insert(&self.image, self.garden.display().to_image());
        Ok(())
    }
}

/// Sent once per scene, the frame a garden stops being active.
#[derive(Message)]
pub struct GardenFinished {
    pub canvas: Entity,
    /// Frames the scene took to paint itself out.
    pub ticks: u64,
}

/// Tick every unfinished garden and upload its display surface.
///
/// A canvas whose image asset is not resident yet is skipped this frame and
/// picked up again on the next; a size mismatch (mid-resize) suppresses the
/// upload instead of corrupting the texture.
pub fn advance_gardens(
    mut canvases: Query<(Entity, &mut GardenCanvas)>,
    mut images: ResMut<Assets<Image>>,
    mut finished: MessageWriter<GardenFinished>,
) {
    for (entity, mut canvas) in &mut canvases {
        if canvas.garden.is_finished() {
            continue;
        }
        let Some(image) = images.get_mut(&canvas.image) else {
            continue;
        };

        let report = canvas.garden.tick();
        if !canvas.garden.display().copy_into_image(image) {
            let (w, h) = canvas.garden.size();
            debug!("garden display {w}x{h} does not match its texture; upload skipped");
        }

        if report.just_finished {
            info!(
                "garden ({}) painted itself out after {} ticks",
                canvas.garden.mode().label(),
                canvas.garden.ticks()
            );
            finished.write(GardenFinished {
                canvas: entity,
                ticks: canvas.garden.ticks(),
            });
        }
    }
}

// --- tests ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garden::GardenMode;

    #[derive(Resource, Default)]
    struct FinishTally(usize);

    fn tally(mut reader: MessageReader<GardenFinished>, mut count: ResMut<FinishTally>) {
        count.0 += reader.read().count();
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<Assets<Image>>()
            .init_resource::<FinishTally>()
            .add_message::<GardenFinished>()
            .add_systems(Update, (advance_gardens, tally).chain());
        app
    }

    fn spawn_canvas(app: &mut App, mode: GardenMode, width: u32, height: u32) -> Entity {
        let canvas = {
            let mut images = app.world_mut().resource_mut::<Assets<Image>>();
            GardenCanvas::new(GardenConfig { mode, seed: 6 }, width, height, &mut images).unwrap()
        };
        app.world_mut().spawn(canvas).id()
    }

    #[test]
    fn a_meadow_canvas_finishes_exactly_once() {
        let mut app = test_app();
        let entity = spawn_canvas(&mut app, GardenMode::Meadow, 96, 72);

        for _ in 0..2000 {
            app.update();
            if app.world().resource::<FinishTally>().0 > 0 {
                break;
            }
        }
        assert_eq!(app.world().resource::<FinishTally>().0, 1);

        let settled_ticks = app.world().get::<GardenCanvas>(entity).unwrap().garden().ticks();
        for _ in 0..10 {
            app.update();
        }
        assert_eq!(
            app.world().resource::<FinishTally>().0,
            1,
            "completion must not re-fire"
        );
        assert_eq!(
            app.world().get::<GardenCanvas>(entity).unwrap().garden().ticks(),
            settled_ticks,
            "finished gardens stop ticking"
        );
    }

    #[test]
    fn the_texture_mirrors_the_display_surface() {
        let mut app = test_app();
        let entity = spawn_canvas(&mut app, GardenMode::Meadow, 64, 48);

        for _ in 0..30 {
            app.update();
        }

        let canvas = app.world().get::<GardenCanvas>(entity).unwrap();
        let images = app.world().resource::<Assets<Image>>();
        let image = images.get(canvas.image()).unwrap();
        assert_eq!(image.data.as_deref(), Some(canvas.garden().display().data()));
    }

    #[test]
    fn resize_keeps_the_handle_and_replaces_the_pixels() {
        let mut app = test_app();
        let entity = spawn_canvas(&mut app, GardenMode::Meadow, 64, 48);
        app.update();

        let handle = app
            .world()
            .get::<GardenCanvas>(entity)
            .unwrap()
            .image()
            .clone();

        app.world_mut()
            .resource_scope(|world, mut images: Mut<Assets<Image>>| {
                let mut canvas = world.get_mut::<GardenCanvas>(entity).unwrap();
                canvas.resize(128, 96, &mut images).unwrap();
            });

        let canvas = app.world().get::<GardenCanvas>(entity).unwrap();
        assert_eq!(canvas.image(), &handle);
        assert_eq!(canvas.garden().size(), (128, 96));

        let images = app.world().resource::<Assets<Image>>();
        let image = images.get(&handle).unwrap();
        assert_eq!(image.texture_descriptor.size.width, 128);

        // The system keeps uploading at the new size.
        app.update();
        let canvas = app.world().get::<GardenCanvas>(entity).unwrap();
        let images = app.world().resource::<Assets<Image>>();
        let image = images.get(&handle).unwrap();
        assert_eq!(image.data.as_deref(), Some(canvas.garden().display().data()));
    }
}
