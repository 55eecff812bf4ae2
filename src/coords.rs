//! Grid addressing.

use bevy::prelude::*;

/// A `(column, row)` address on the brick layout.
///
/// Not validated against any grid; a coordinate is only "valid" if a lookup finds a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub struct Coord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Coord {
    /// Builds a coordinate from column and row.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Even rows are the ones shifted right by half a column.
    pub fn is_even_row(self) -> bool {
        self.y.rem_euclid(2) == 0
    }

    /// This coordinate moved by `(dx, dy)`, or `None` if either component
    /// leaves the `i32` range.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_of_negative_rows() {
        assert!(Coord::new(0, 0).is_even_row());
        assert!(!Coord::new(0, 1).is_even_row());
        assert!(!Coord::new(0, -1).is_even_row());
        assert!(Coord::new(0, -2).is_even_row());
    }

    #[test]
    fn offset_and_conversion() {
        assert_eq!(Coord::new(1, 2).offset(-1, 1), Some(Coord::from((0, 3))));
        assert_eq!(Coord::new(i32::MAX, 0).offset(1, 0), None);
        assert_eq!(Coord::new(0, i32::MIN).offset(0, -1), None);
        assert_eq!(Coord::new(-1, 4).to_string(), "(-1, 4)");
    }
}
