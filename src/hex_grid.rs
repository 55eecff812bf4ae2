//! The handle a host holds on to: grid, surface, and resize forwarding together.

use std::sync::Arc;

use bevy::log::{debug, info};
use bevy::prelude::Vec2;
use futures::future::JoinAll;

use crate::coords::Coord;
use crate::grid::{Grid, GridError};
use crate::group::{HoneycombSet, TileGroup};
use crate::surface::{RenderSurface, ResizeDebounce};
use crate::tile::{Fade, FadeOptions, Tile};
use crate::tween::Tweener;
use crate::widget::HexGridConfig;

/// A rendered hex grid bound to its surface.
///
/// Dropping the handle drops every tile; [`HexGrid::teardown`] additionally
/// cancels animations and detaches the surface.
pub struct HexGrid<S: RenderSurface> {
    grid: Grid,
    surface: S,
    resize: ResizeDebounce,
}

impl<S: RenderSurface> HexGrid<S> {
    /// Builds the grid on `surface` and renders every tile into it.
    pub fn new(
        config: &HexGridConfig,
        mut surface: S,
        tweener: Arc<dyn Tweener>,
    ) -> Result<Self, GridError> {
        let grid = Grid::new(config.tile_size, &mut surface, tweener, config.style.clone())?;
        info!(
            "hex grid ready: {} columns x {} rows",
            grid.columns(),
            grid.rows()
        );
        Ok(Self {
            grid,
            surface,
            resize: ResizeDebounce::new(config.resize_debounce),
        })
    }

    /// The underlying grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The surface tiles are drawn into.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, for the host that presents it.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // ── Lookup ─────────────────────────────────────────────────────

    /// The tile at `coord`, if on the grid.
    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.grid.get_tile(coord)
    }

    /// Every tile.
    pub fn all(&self) -> TileGroup {
        self.grid.get_all()
    }

    /// The honeycomb centred on `coord`.
    pub fn honeycomb(&self, coord: Coord) -> HoneycombSet {
        self.grid.get_honeycomb(coord)
    }

    /// The diagonal line down and right from `coord`.
    pub fn line(&self, coord: Coord) -> TileGroup {
        self.grid.get_line(coord)
    }

    // ── Animation shortcuts ────────────────────────────────────────

    /// Fades in the tile at `coord`; `None` if there is no tile there.
    pub fn fade_tile_in(&self, coord: Coord, options: FadeOptions) -> Option<Fade> {
        self.tile(coord).map(|t| t.fade_in(options))
    }

    /// Fades out the tile at `coord`; `None` if there is no tile there.
    pub fn fade_tile_out(&self, coord: Coord, options: FadeOptions) -> Option<Fade> {
        self.tile(coord).map(|t| t.fade_out(options))
    }

    /// Flickers the tile at `coord`; `None` if there is no tile there.
    pub fn flicker_tile(&self, coord: Coord, options: FadeOptions) -> Option<Fade> {
        self.tile(coord).map(|t| t.flicker(options))
    }

    /// Fades in the honeycomb centred on `coord`.
    pub fn fade_honeycomb_in(&self, coord: Coord, options: FadeOptions) -> JoinAll<Fade> {
        self.honeycomb(coord).fade_in(options)
    }

    /// Fades out the honeycomb centred on `coord`.
    pub fn fade_honeycomb_out(&self, coord: Coord, options: FadeOptions) -> JoinAll<Fade> {
        self.honeycomb(coord).fade_out(options)
    }

    /// Flickers the honeycomb centred on `coord`.
    pub fn flicker_honeycomb(&self, coord: Coord, options: FadeOptions) -> JoinAll<Fade> {
        self.honeycomb(coord).flicker(options)
    }

    /// Cancels every animation on the grid.
    pub fn kill_all_animations(&self) {
        self.grid.kill_all_animations();
    }

    // ── Surface lifecycle ──────────────────────────────────────────

    /// Asks for the surface to be resized once resize requests go quiet.
    pub fn request_resize(&mut self, size: Vec2) {
        self.resize.request(size);
    }

    /// Advances the resize debounce; returns the size applied to the surface, if any.
    pub fn tick(&mut self, dt: f32) -> Option<Vec2> {
        let size = self.resize.tick(dt)?;
        debug!("resizing hex grid surface to {size}");
        self.surface.resize(size);
        Some(size)
    }

    /// Cancels all animations, detaches the surface, and drops the pending resize.
    ///
    /// Returns the detached surface so the host can release whatever backs it.
    pub fn teardown(self) -> S {
        let Self {
            grid, mut surface, ..
        } = self;
        grid.kill_all_animations();
        surface.detach();
        info!("hex grid torn down");
        surface
    }
}
