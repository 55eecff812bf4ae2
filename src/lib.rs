#![warn(missing_docs)]
//! Interactive grid of hexagonal tiles with fade and flicker animations.
//!
//! Tiles are addressed by `(column, row)` on a brick layout where even rows sit
//! half a column to the right. Single tiles, diagonal lines, seven-tile
//! honeycombs and the whole grid can be faded in parallel or one after another.
//! The core is engine agnostic behind [`RenderSurface`] and [`Tweener`];
//! [`HexGridPlugin`] supplies both for Bevy.

pub mod coords;
pub mod grid;
pub mod group;
pub mod hex_grid;
pub mod math;
pub mod neighbors;
pub mod surface;
pub mod tile;
pub mod tween;
pub mod widget;

pub use coords::Coord;
pub use grid::{Grid, GridError};
pub use group::{HoneycombSet, Staggered, TileGroup};
pub use hex_grid::HexGrid;
pub use neighbors::HoneycombSlot;
pub use surface::{HexShape, RenderSurface, TileStyle};
pub use tile::{Fade, FadeOptions, Tile, TileEvent};
pub use tween::{Easing, TweenEngine, Tweener};
pub use widget::{ActiveGrid, HexGridConfig, HexGridPlugin, TeardownGrid};
