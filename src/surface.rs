//! The drawing side of the widget, seen from the grid.
//!
//! A [`RenderSurface`] receives one [`HexShape`] per tile and owns however those
//! are drawn. Shapes keep a handle to their tile so the surface can read the live
//! opacity every frame and forward pointer events.

use bevy::prelude::*;

use crate::tile::Tile;

/// Fill and outline of every tile.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct TileStyle {
    /// Hexagon fill colour.
    pub fill: Color,
    /// Outline colour.
    pub stroke: Color,
    /// Outline width in pixels.
    pub stroke_width: f32,
}

impl Default for TileStyle {
    fn default() -> Self {
        Self {
            fill: Color::srgb_u8(0x0b, 0x94, 0x44),
            stroke: Color::WHITE,
            stroke_width: 1.0,
        }
    }
}

/// A drawable hexagon bound to its tile.
#[derive(Clone, Debug)]
pub struct HexShape {
    tile: Tile,
}

impl HexShape {
    pub(crate) fn new(tile: Tile) -> Self {
        Self { tile }
    }

    /// The tile this shape draws.
    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    /// Surface-space centre.
    pub fn position(&self) -> Vec2 {
        self.tile.position()
    }

    /// Corner points relative to [`HexShape::position`], in drawing order.
    pub fn points(&self) -> [Vec2; 6] {
        self.tile.vertices()
    }

    /// Fill and outline.
    pub fn style(&self) -> &TileStyle {
        self.tile.style()
    }

    /// Opacity to draw with this frame.
    pub fn opacity(&self) -> f32 {
        self.tile.opacity()
    }
}

/// Scene the grid draws into.
pub trait RenderSurface: Send + Sync {
    /// Drawable area in pixels.
    fn size(&self) -> Vec2;

    /// Adds a shape to the scene.
    fn add_child(&mut self, shape: HexShape);

    /// Changes the drawable area. Existing shapes keep their layout.
    fn resize(&mut self, size: Vec2);

    /// Removes the scene from its host. The surface is not drawn to afterwards.
    fn detach(&mut self);
}

/// Trailing-edge debounce for resize requests.
///
/// Every request restarts the timer; only the last size is applied once the
/// timer runs out.
#[derive(Debug, Clone)]
pub struct ResizeDebounce {
    wait: f32,
    pending: Option<(Vec2, f32)>,
}

impl ResizeDebounce {
    /// Debounce with `wait` seconds of quiet before a resize is released.
    pub fn new(wait: f32) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    /// Records a new target size and restarts the timer.
    pub fn request(&mut self, size: Vec2) {
        self.pending = Some((size, self.wait));
    }

    /// Whether a resize is waiting for the timer.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advances the timer; returns the size to apply once it has elapsed.
    pub fn tick(&mut self, dt: f32) -> Option<Vec2> {
        let (size, remaining) = self.pending.as_mut()?;
        *remaining -= dt;
        if *remaining > 0.0 {
            return None;
        }
        let size = *size;
        self.pending = None;
        Some(size)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Surface that keeps everything it is given.
    pub(crate) struct RecordingSurface {
        pub size: Vec2,
        pub shapes: Vec<HexShape>,
        pub resizes: Vec<Vec2>,
        pub detached: bool,
    }

    impl RecordingSurface {
        pub fn new(size: Vec2) -> Self {
            Self {
                size,
                shapes: Vec::new(),
                resizes: Vec::new(),
                detached: false,
            }
        }
    }

    impl RenderSurface for RecordingSurface {
        fn size(&self) -> Vec2 {
            self.size
        }

        fn add_child(&mut self, shape: HexShape) {
            assert!(!self.detached, "drawing into a detached surface");
            self.shapes.push(shape);
        }

        fn resize(&mut self, size: Vec2) {
            self.size = size;
            self.resizes.push(size);
        }

        fn detach(&mut self) {
            self.detached = true;
        }
    }

    // ── style ───────────────────────────────────────────────────────

    #[test]
    fn default_style_matches_widget_palette() {
        let style = TileStyle::default();
        assert_eq!(style.fill, Color::srgb_u8(11, 148, 68));
        assert_eq!(style.stroke, Color::WHITE);
        assert_eq!(style.stroke_width, 1.0);
    }

    // ── resize debounce ─────────────────────────────────────────────

    #[test]
    fn debounce_releases_last_size_after_quiet_period() {
        let mut debounce = ResizeDebounce::new(1.0);
        assert_eq!(debounce.tick(5.0), None);

        debounce.request(Vec2::new(100.0, 100.0));
        assert_eq!(debounce.tick(0.6), None);
        debounce.request(Vec2::new(200.0, 150.0));
        assert_eq!(debounce.tick(0.6), None);
        assert!(debounce.is_pending());
        assert_eq!(debounce.tick(0.4), Some(Vec2::new(200.0, 150.0)));
        assert!(!debounce.is_pending());
        assert_eq!(debounce.tick(1.0), None);
    }

    #[test]
    fn zero_wait_releases_on_first_tick() {
        let mut debounce = ResizeDebounce::new(0.0);
        debounce.request(Vec2::splat(64.0));
        assert_eq!(debounce.tick(0.0), Some(Vec2::splat(64.0)));
    }
}
