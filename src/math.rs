//! Pure computation helpers extracted for testability.
//!
//! Layout and easing math used by the grid and the tween engine. Free of Bevy ECS
//! dependencies; everything operates on plain numbers and `Vec2`.

use bevy::prelude::Vec2;

use crate::coords::Coord;

/// Horizontal distance between tile centres in the same row, as a multiple of tile size.
pub const COLUMN_PERIOD: f32 = 4.0;
/// Vertical distance between tile rows, as a multiple of tile size.
pub const ROW_PERIOD: f32 = 3.0;
/// Horizontal shift applied to even rows, as a multiple of tile size.
pub const EVEN_ROW_SHIFT: f32 = 2.0;

/// Linear interpolation between `from` and `to`.
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Quadratic ease-out curve: `1 - (1 - t)^2`.
pub fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(2)
}

/// Cubic ease-out curve: `1 - (1 - t)^3`. Sharper deceleration than [`ease_out_quad`].
pub fn ease_out_cubic(t: f32) -> f32 {
    let rest = 1.0 - t;
    1.0 - rest * rest * rest
}

/// The six corners of a tile hexagon of the given size, relative to its centre.
///
/// Surface space, y pointing down. Order: top-left, top, top-right, bottom-right,
/// bottom, bottom-left.
pub fn hexagon_vertices(size: f32) -> [Vec2; 6] {
    let double = size * 2.0;
    [
        Vec2::new(-double, -size),
        Vec2::new(0.0, -double),
        Vec2::new(double, -size),
        Vec2::new(double, size),
        Vec2::new(0.0, double),
        Vec2::new(-double, size),
    ]
}

/// Surface-space centre of the tile at `coord` on the brick layout.
///
/// Even rows are shifted right by half a column.
pub fn tile_center(coord: Coord, size: f32) -> Vec2 {
    let shift = if coord.is_even_row() {
        size * EVEN_ROW_SHIFT
    } else {
        0.0
    };
    Vec2::new(
        coord.x as f32 * size * COLUMN_PERIOD + shift,
        coord.y as f32 * size * ROW_PERIOD,
    )
}

/// Number of `(columns, rows)` needed to cover a surface, plus one of each for the edges.
pub fn grid_extent(surface: Vec2, size: f32) -> (usize, usize) {
    let columns = (surface.x / (size * COLUMN_PERIOD)).ceil() as usize + 1;
    let rows = (surface.y / (size * ROW_PERIOD)).ceil() as usize + 1;
    (columns, rows)
}

/// Converts a surface-space offset (y down) into Bevy world space (y up).
pub fn surface_to_world(point: Vec2) -> Vec2 {
    Vec2::new(point.x, -point.y)
}

/// World position of the surface's top-left corner for a camera centred on the surface.
pub fn surface_origin(surface: Vec2) -> Vec2 {
    Vec2::new(-surface.x / 2.0, surface.y / 2.0)
}
