//! Ownership and coordinate lookup for every tile of the widget.
//!
//! The grid is sized once, from the surface size at construction, and renders
//! every tile eagerly. Groups handed out by the lookup methods only hold weak
//! references, so the grid stays the single owner.

use std::sync::Arc;

use bevy::log::debug;
use bevy::prelude::Vec2;
use thiserror::Error;

use crate::coords::Coord;
use crate::group::{HoneycombSet, TileGroup};
use crate::math;
use crate::neighbors;
use crate::surface::{RenderSurface, TileStyle};
use crate::tile::Tile;
use crate::tween::Tweener;

/// Upper bound on the number of tiles a single grid may hold.
pub const MAX_TILES: usize = 1 << 20;

/// Rejected grid configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Tile size was zero, negative, or not finite.
    #[error("tile size must be a finite positive number, got {0}")]
    InvalidTileSize(f32),
    /// Surface size had a negative or non-finite component.
    #[error("surface size must be finite and non-negative, got {0}")]
    InvalidSurfaceSize(Vec2),
    /// The surface would need more than [`MAX_TILES`] tiles at this tile size.
    #[error("a {columns}x{rows} grid exceeds the tile limit")]
    TooManyTiles {
        /// Requested columns.
        columns: usize,
        /// Requested rows.
        rows: usize,
    },
}

/// Rectangular set of tiles addressed by [`Coord`].
pub struct Grid {
    size: f32,
    columns: usize,
    rows: usize,
    /// Column-major: the tile at `(x, y)` lives at `x * rows + y`.
    tiles: Vec<Tile>,
}

impl Grid {
    /// Builds a grid covering `surface` with tiles of `size`, rendering each one.
    pub fn new(
        size: f32,
        surface: &mut dyn RenderSurface,
        tweener: Arc<dyn Tweener>,
        style: TileStyle,
    ) -> Result<Self, GridError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(GridError::InvalidTileSize(size));
        }
        let extent = surface.size();
        if !extent.is_finite() || extent.min_element() < 0.0 {
            return Err(GridError::InvalidSurfaceSize(extent));
        }
        let (columns, rows) = math::grid_extent(extent, size);
        if columns.checked_mul(rows).is_none_or(|count| count > MAX_TILES) {
            return Err(GridError::TooManyTiles { columns, rows });
        }

        let mut tiles = Vec::with_capacity(columns * rows);
        for x in 0..columns {
            for y in 0..rows {
                let coord = Coord::new(x as i32, y as i32);
                let tile = Tile::new(coord, size, style.clone(), tweener.clone());
                tile.render(surface);
                tiles.push(tile);
            }
        }
        debug!("built {columns}x{rows} hex grid for a {extent} surface");

        Ok(Self {
            size,
            columns,
            rows,
            tiles,
        })
    }

    /// Tile size the grid was built with.
    pub fn tile_size(&self) -> f32 {
        self.size
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Every tile, column by column.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        let x = usize::try_from(coord.x).ok()?;
        let y = usize::try_from(coord.y).ok()?;
        (x < self.columns && y < self.rows).then_some(x * self.rows + y)
    }

    /// The tile at `coord`, or `None` outside the grid.
    pub fn get_tile(&self, coord: Coord) -> Option<&Tile> {
        self.index(coord).map(|i| &self.tiles[i])
    }

    /// Every tile as one group.
    pub fn get_all(&self) -> TileGroup {
        TileGroup::new(&self.tiles)
    }

    /// The honeycomb centred on `coord`; slots off the grid are empty.
    pub fn get_honeycomb(&self, coord: Coord) -> HoneycombSet {
        let coords = neighbors::honeycomb(coord);
        HoneycombSet::new(coords.0.map(|c| c.and_then(|c| self.get_tile(c))))
    }

    /// The diagonal line down and right from `coord`, up to the first coordinate
    /// off the grid.
    pub fn get_line(&self, coord: Coord) -> TileGroup {
        TileGroup::new(neighbors::line(coord).map_while(|c| self.get_tile(c)))
    }

    /// Cancels every animation on every tile.
    pub fn kill_all_animations(&self) {
        for tile in &self.tiles {
            tile.kill_all_animations();
        }
    }
}
