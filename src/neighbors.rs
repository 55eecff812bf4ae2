//! Coordinate derivation for honeycombs and diagonal lines.
//!
//! Both algorithms depend on the parity of the origin row, because even rows sit
//! half a column to the right of odd rows. Nothing here knows about grid bounds;
//! callers resolve the coordinates and decide what "off the grid" means.

use bevy::prelude::*;

use crate::coords::Coord;

/// Named slots of a honeycomb: a centre tile and its six neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum HoneycombSlot {
    /// The origin tile.
    Center,
    /// Same row, one column left.
    Left,
    /// Row above/below on the left side (parity dependent).
    TopLeft,
    /// Row above/below on the right side (parity dependent).
    TopRight,
    /// Same row, one column right.
    Right,
    /// Opposite row to `TopRight`.
    BottomRight,
    /// Opposite row to `TopLeft`.
    BottomLeft,
}

impl HoneycombSlot {
    /// All slots, centre first.
    pub const ALL: [HoneycombSlot; 7] = [
        HoneycombSlot::Center,
        HoneycombSlot::Left,
        HoneycombSlot::TopLeft,
        HoneycombSlot::TopRight,
        HoneycombSlot::Right,
        HoneycombSlot::BottomRight,
        HoneycombSlot::BottomLeft,
    ];

    /// Position of this slot in [`HoneycombSlot::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The seven coordinates of a honeycomb, indexed by [`HoneycombSlot`].
///
/// A slot is `None` when its coordinate falls outside the `i32` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoneycombCoords(pub [Option<Coord>; 7]);

impl HoneycombCoords {
    /// Coordinate of one slot.
    pub fn get(&self, slot: HoneycombSlot) -> Option<Coord> {
        self.0[slot.index()]
    }

    /// `(slot, coord)` pairs in [`HoneycombSlot::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (HoneycombSlot, Option<Coord>)> + '_ {
        HoneycombSlot::ALL.into_iter().zip(self.0)
    }
}

/// Slot offsets around an even-row origin, in [`HoneycombSlot::ALL`] order.
const EVEN_ROW_OFFSETS: [(i32, i32); 7] =
    [(0, 0), (-1, 0), (0, 1), (1, 1), (1, 0), (1, -1), (0, -1)];
/// Slot offsets around an odd-row origin.
const ODD_ROW_OFFSETS: [(i32, i32); 7] =
    [(0, 0), (-1, 0), (-1, -1), (0, -1), (1, 0), (0, 1), (-1, 1)];

/// Coordinates of the honeycomb centred on `origin`.
pub fn honeycomb(origin: Coord) -> HoneycombCoords {
    let offsets = if origin.is_even_row() {
        EVEN_ROW_OFFSETS
    } else {
        ODD_ROW_OFFSETS
    };
    HoneycombCoords(offsets.map(|(dx, dy)| origin.offset(dx, dy)))
}

/// The `step`-th coordinate of the diagonal line walking down and right from `origin`.
///
/// Row advances every step; column advances every second step. An even origin row
/// advances the column on the first step of each pair, an odd one on the second.
/// `None` once the walk leaves the `i32` range.
pub fn line_step(origin: Coord, step: u32) -> Option<Coord> {
    let step = i32::try_from(step).ok()?;
    let column_steps = if origin.is_even_row() {
        step - step / 2
    } else {
        step / 2
    };
    origin.offset(column_steps, step)
}

/// Diagonal walk from `origin`, ending only at the edge of the `i32` range;
/// the caller decides where it stops.
pub fn line(origin: Coord) -> impl Iterator<Item = Coord> {
    (0..).map_while(move |step| line_step(origin, step))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── honeycomb ───────────────────────────────────────────────────

    #[test]
    fn even_row_honeycomb() {
        let hc = honeycomb(Coord::new(3, 4));
        assert_eq!(hc.get(HoneycombSlot::Center), Some(Coord::new(3, 4)));
        assert_eq!(hc.get(HoneycombSlot::Left), Some(Coord::new(2, 4)));
        assert_eq!(hc.get(HoneycombSlot::Right), Some(Coord::new(4, 4)));
        assert_eq!(hc.get(HoneycombSlot::TopLeft), Some(Coord::new(3, 5)));
        assert_eq!(hc.get(HoneycombSlot::TopRight), Some(Coord::new(4, 5)));
        assert_eq!(hc.get(HoneycombSlot::BottomLeft), Some(Coord::new(3, 3)));
        assert_eq!(hc.get(HoneycombSlot::BottomRight), Some(Coord::new(4, 3)));
    }

    #[test]
    fn odd_row_honeycomb() {
        let hc = honeycomb(Coord::new(3, 5));
        assert_eq!(hc.get(HoneycombSlot::Left), Some(Coord::new(2, 5)));
        assert_eq!(hc.get(HoneycombSlot::Right), Some(Coord::new(4, 5)));
        assert_eq!(hc.get(HoneycombSlot::TopLeft), Some(Coord::new(2, 4)));
        assert_eq!(hc.get(HoneycombSlot::TopRight), Some(Coord::new(3, 4)));
        assert_eq!(hc.get(HoneycombSlot::BottomLeft), Some(Coord::new(2, 6)));
        assert_eq!(hc.get(HoneycombSlot::BottomRight), Some(Coord::new(3, 6)));
    }

    #[test]
    fn honeycomb_neighbours_are_geometrically_adjacent() {
        // Every neighbour centre lies at the same distance class from the origin
        // on the brick layout: 4s horizontally, or (2s, 3s) diagonally.
        let size = 1.0;
        for origin in [Coord::new(2, 2), Coord::new(2, 3), Coord::new(0, -1)] {
            let centre = crate::math::tile_center(origin, size);
            for (slot, coord) in honeycomb(origin).iter().skip(1) {
                let coord = coord.expect("in range");
                let d = (crate::math::tile_center(coord, size) - centre).abs();
                let ok = d == Vec2::new(4.0, 0.0) || d == Vec2::new(2.0, 3.0);
                assert!(ok, "{slot:?} of {origin} is not adjacent: {d:?}");
            }
        }
    }

    #[test]
    fn honeycomb_slots_are_distinct() {
        for origin in [Coord::new(0, 0), Coord::new(5, 7)] {
            let hc = honeycomb(origin);
            for i in 0..7 {
                for j in (i + 1)..7 {
                    assert_ne!(hc.0[i], hc.0[j]);
                }
            }
        }
    }

    #[test]
    fn honeycomb_at_the_edge_of_i32_drops_overflowing_slots() {
        let hc = honeycomb(Coord::new(i32::MAX, 0));
        assert_eq!(hc.get(HoneycombSlot::Center), Some(Coord::new(i32::MAX, 0)));
        assert_eq!(hc.get(HoneycombSlot::Left), Some(Coord::new(i32::MAX - 1, 0)));
        assert_eq!(hc.get(HoneycombSlot::Right), None);
        assert_eq!(hc.get(HoneycombSlot::TopRight), None);
        assert_eq!(hc.get(HoneycombSlot::BottomRight), None);

        let hc = honeycomb(Coord::new(0, i32::MIN));
        assert_eq!(hc.get(HoneycombSlot::BottomLeft), None);
        assert_eq!(hc.get(HoneycombSlot::BottomRight), None);
        assert_eq!(hc.get(HoneycombSlot::TopLeft), Some(Coord::new(0, i32::MIN + 1)));
    }

    // ── line ────────────────────────────────────────────────────────

    #[test]
    fn line_from_even_origin() {
        let got: Vec<Coord> = line(Coord::new(0, 0)).take(7).collect();
        let want: Vec<Coord> = [(0, 0), (1, 1), (1, 2), (2, 3), (2, 4), (3, 5), (3, 6)]
            .into_iter()
            .map(Coord::from)
            .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn line_from_odd_origin() {
        let got: Vec<Coord> = line(Coord::new(2, 1)).take(5).collect();
        let want: Vec<Coord> = [(2, 1), (2, 2), (3, 3), (3, 4), (4, 5)]
            .into_iter()
            .map(Coord::from)
            .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn line_ends_at_the_edge_of_i32() {
        assert_eq!(line(Coord::new(i32::MAX, 0)).count(), 1);
        assert_eq!(line(Coord::new(0, i32::MAX)).count(), 1);
        assert_eq!(line_step(Coord::new(0, 0), u32::MAX), None);
    }

    #[test]
    fn line_steps_are_down_right_neighbours() {
        for origin in [Coord::new(0, 0), Coord::new(0, 1)] {
            let coords: Vec<Coord> = line(origin).take(10).collect();
            for pair in coords.windows(2) {
                let hc = honeycomb(pair[0]);
                let down_right = if pair[0].is_even_row() {
                    hc.get(HoneycombSlot::TopRight)
                } else {
                    hc.get(HoneycombSlot::BottomRight)
                };
                assert_eq!(Some(pair[1]), down_right);
            }
        }
    }
}
