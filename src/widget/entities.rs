use std::sync::Arc;

use bevy::prelude::*;

use crate::coords::Coord;
use crate::hex_grid::HexGrid;
use crate::surface::{HexShape, RenderSurface};
use crate::tween::TweenEngine;

/// Parent of every tile entity; positioned at the surface's top-left corner.
#[derive(Component, Reflect)]
pub struct GridRoot;

/// A spawned tile hexagon.
#[derive(Component)]
pub struct HexTile {
    /// Shape the mesh, outline and pointer events belong to.
    pub shape: HexShape,
}

/// Grid coordinate of a tile entity, for inspection.
#[derive(Component, Reflect)]
pub struct TileCoord(pub Coord);

/// The live grid. Removed on teardown.
#[derive(Resource, Deref, DerefMut)]
pub struct ActiveGrid(pub HexGrid<WidgetSurface>);

/// Tween engine stepped once per frame. Removed on teardown.
#[derive(Resource, Clone, Deref)]
pub struct GridTweens(pub Arc<TweenEngine>);

/// Request to cancel every animation and despawn the widget.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct TeardownGrid;

/// Render surface backed by the ECS.
///
/// Shapes arrive while the grid is being built, before any system can spawn
/// them, so they are queued until the next frame.
#[derive(Debug, Default)]
pub struct WidgetSurface {
    size: Vec2,
    pending: Vec<HexShape>,
    detached: bool,
}

impl WidgetSurface {
    /// An empty surface of `size` pixels.
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            ..default()
        }
    }

    /// Shapes added since the last call.
    pub fn take_pending(&mut self) -> Vec<HexShape> {
        std::mem::take(&mut self.pending)
    }

    /// Whether [`RenderSurface::detach`] has been called.
    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

impl RenderSurface for WidgetSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn add_child(&mut self, shape: HexShape) {
        if self.detached {
            warn!("ignoring tile {} added to a detached surface", shape.tile().coord());
            return;
        }
        self.pending.push(shape);
    }

    fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    fn detach(&mut self) {
        self.detached = true;
        self.pending.clear();
    }
}
