//! Bevy front end for the hex grid.
//!
//! Builds a [`HexGrid`](crate::hex_grid::HexGrid) on a [`WidgetSurface`] at
//! startup, spawns one 2D mesh per tile under a [`GridRoot`], and keeps the
//! meshes in step with tile opacity every frame. Pointer events reach tiles
//! through picking observers; window resizes reach the surface through the
//! grid's debounce. Send [`TeardownGrid`] to remove the whole widget.

mod entities;
mod systems;

pub use entities::{
    ActiveGrid, GridRoot, GridTweens, HexTile, TeardownGrid, TileCoord, WidgetSurface,
};

use bevy::picking::mesh_picking::MeshPickingPlugin;
use bevy::prelude::*;

use crate::surface::TileStyle;
use crate::tween::Easing;

/// Configuration of the grid widget.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct HexGridConfig {
    /// Tile size parameter; a tile is `4 * tile_size` wide.
    pub tile_size: f32,
    /// Fixed surface size in pixels. `None` follows the primary window.
    pub surface_size: Option<Vec2>,
    /// Fill and outline of every tile.
    pub style: TileStyle,
    /// Curve every fade follows.
    pub easing: Easing,
    /// Seconds of quiet after the last window resize before the surface follows.
    pub resize_debounce: f32,
    /// Background clear color.
    pub clear_color: Color,
}

impl Default for HexGridConfig {
    fn default() -> Self {
        Self {
            tile_size: 10.0,
            surface_size: None,
            style: TileStyle::default(),
            easing: Easing::QuadOut,
            resize_debounce: 1.0,
            clear_color: Color::BLACK,
        }
    }
}

/// Hex grid widget: surface, tween driver, pointer forwarding, resize and teardown.
pub struct HexGridPlugin(pub HexGridConfig);

impl Plugin for HexGridPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<MeshPickingPlugin>() {
            app.add_plugins(MeshPickingPlugin);
        }
        app.register_type::<HexGridConfig>()
            .register_type::<GridRoot>()
            .register_type::<TileCoord>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(self.0.clear_color))
            .add_message::<TeardownGrid>()
            .add_systems(Startup, (systems::configure_outlines, systems::setup_grid))
            .add_systems(
                Update,
                (
                    systems::advance_tweens,
                    systems::spawn_tile_shapes,
                    systems::sync_tile_opacity,
                    systems::draw_tile_outlines,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    systems::forward_window_resize,
                    systems::apply_debounced_resize,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                systems::teardown_on_request.after(systems::draw_tile_outlines),
            );
    }
}
