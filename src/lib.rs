//! `bevy_brushwood`: procedural watercolor gardens that paint themselves onto
//! Bevy textures.
//!
//! # Architecture
//! A [`Garden`] owns two CPU-side [`Surface`] buffers. Each [`Garden::tick`]
//! grows stems, blooms flowers and moves butterflies, painting them through
//! the layered [`brush`](crate::brush) primitives into the paint surface.
//! A [`CompositeFilter`] (by default [`WatercolorWash`], a noise-warp plus
//! blur pipeline) then composites paint into the display surface, and
//! butterflies are drawn on top so they stay crisp.
//!
//! Spawn a [`GardenCanvas`] component to mirror the display surface into
//! [`bevy::asset::Assets<Image>`]; the [`BrushwoodPlugin`] registers the
//! system that advances every canvas once per frame and emits
//! [`GardenFinished`] when a garden stops changing.
//!
//! All randomness flows from the seed in [`GardenConfig`], so the same
//! configuration always paints the same garden.

pub mod brush;
pub mod butterfly;
pub mod canvas;
pub mod flower;
pub mod garden;
pub mod palette;
pub mod stem;
pub mod surface;
pub mod watercolor;

pub use canvas::{GardenCanvas, GardenFinished, advance_gardens};
pub use garden::{Garden, GardenConfig, GardenMode, TickReport};
pub use surface::{Surface, SurfaceError};
pub use watercolor::{CompositeFilter, WatercolorWash};

use bevy::prelude::*;

/// Bevy plugin. Registers [`GardenFinished`] and the per-frame system that
/// ticks every [`GardenCanvas`].
pub struct BrushwoodPlugin;

impl Plugin for BrushwoodPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<GardenFinished>()
            .add_systems(Update, canvas::advance_gardens);
    }
}
