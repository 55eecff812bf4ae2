//! A single hexagon tile: geometry, animated opacity, and pointer listeners.
//!
//! [`Tile`] is a cheap shared handle; the [`crate::grid::Grid`] owns the only
//! long-lived strong references. Fades start the moment they are requested and
//! return a [`Completion`] future that may be awaited or dropped.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll};

use bevy::log::warn;
use bevy::prelude::{Reflect, Vec2};
use futures::FutureExt;
use futures::channel::oneshot;

use crate::coords::Coord;
use crate::math;
use crate::surface::{HexShape, RenderSurface, TileStyle};
use crate::tween::{TweenHandle, TweenSpec, Tweenable, Tweener, lock};

/// Timing of a fade.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct FadeOptions {
    /// Duration of the fade in seconds.
    pub speed: f32,
    /// Seconds to wait before the fade starts.
    pub delay: f32,
}

impl Default for FadeOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            delay: 0.0,
        }
    }
}

impl FadeOptions {
    /// Quick in-and-out timing used for flickers.
    pub const FLICKER: FadeOptions = FadeOptions {
        speed: 0.5,
        delay: 0.1,
    };

    /// Options with the given duration and no delay.
    pub fn with_speed(speed: f32) -> Self {
        Self { speed, delay: 0.0 }
    }

    /// Same timing, different delay.
    pub fn delayed(self, delay: f32) -> Self {
        Self { delay, ..self }
    }
}

/// Which way an animation moves the opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum FadeDirection {
    /// Towards fully opaque.
    In,
    /// Towards fully transparent.
    Out,
}

impl FadeDirection {
    fn target(self) -> f32 {
        match self {
            FadeDirection::In => 1.0,
            FadeDirection::Out => 0.0,
        }
    }
}

/// An animation that has started and has neither completed nor been cancelled.
#[derive(Debug, Clone)]
pub struct ActiveAnimation {
    /// Direction of the fade.
    pub direction: FadeDirection,
    /// Handle into the tween engine.
    pub handle: TweenHandle,
}

/// Pointer interactions a tile reports to its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum TileEvent {
    /// The pointer entered the tile.
    PointerOver,
    /// The pointer left the tile.
    PointerOut,
    /// The tile was clicked.
    Click,
}

/// Returned by [`Tile::on`]; pass to [`Tile::off`] to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&Tile) + Send + Sync>;

/// Opacity clamped to `[0, 1]`, stored as `f32` bits.
#[derive(Debug, Default)]
pub struct Opacity(AtomicU32);

impl Opacity {
    /// Current opacity.
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Sets the opacity, clamped into `[0, 1]`.
    pub fn set(&self, value: f32) {
        self.0
            .store(value.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }
}

impl Tweenable for Opacity {
    fn value(&self) -> f32 {
        self.get()
    }

    fn set_value(&self, value: f32) {
        self.set(value);
    }
}

/// Future resolving when an animation chain completes.
///
/// If any animation in the chain is cancelled the future stays pending forever.
pub struct Completion<T> {
    receiver: Option<oneshot::Receiver<T>>,
}

/// Completion of a single tile's fade or flicker.
pub type Fade = Completion<Tile>;

impl<T> Completion<T> {
    pub(crate) fn channel() -> (oneshot::Sender<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { receiver: Some(rx) })
    }
}

impl<T> Future for Completion<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Poll::Pending;
        };
        match receiver.poll_unpin(cx) {
            Poll::Ready(Ok(value)) => Poll::Ready(value),
            Poll::Ready(Err(oneshot::Canceled)) => {
                // Sender dropped: the tween was cancelled or its tile torn down.
                self.receiver = None;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

struct TrackedAnimation {
    id: u64,
    animation: ActiveAnimation,
}

struct TileInner {
    coord: Coord,
    size: f32,
    style: TileStyle,
    opacity: Arc<Opacity>,
    tweener: Arc<dyn Tweener>,
    next_id: AtomicU64,
    animations: Mutex<Vec<TrackedAnimation>>,
    listeners: Mutex<Vec<(ListenerId, TileEvent, Listener)>>,
    rendered: AtomicBool,
}

/// Shared handle to one hexagon of the grid.
#[derive(Clone)]
pub struct Tile {
    inner: Arc<TileInner>,
}

/// Non-owning reference to a [`Tile`].
#[derive(Clone)]
pub struct WeakTile(Weak<TileInner>);

impl WeakTile {
    /// The tile, if its grid still exists.
    pub fn upgrade(&self) -> Option<Tile> {
        self.0.upgrade().map(|inner| Tile { inner })
    }
}

impl Tile {
    pub(crate) fn new(
        coord: Coord,
        size: f32,
        style: TileStyle,
        tweener: Arc<dyn Tweener>,
    ) -> Self {
        Self {
            inner: Arc::new(TileInner {
                coord,
                size,
                style,
                opacity: Arc::new(Opacity::default()),
                tweener,
                next_id: AtomicU64::new(0),
                animations: Mutex::new(Vec::new()),
                listeners: Mutex::new(Vec::new()),
                rendered: AtomicBool::new(false),
            }),
        }
    }

    // ── Identity and geometry ──────────────────────────────────────

    /// Grid coordinate of this tile.
    pub fn coord(&self) -> Coord {
        self.inner.coord
    }

    /// Size parameter the hexagon is derived from.
    pub fn size(&self) -> f32 {
        self.inner.size
    }

    /// Fill and stroke of the hexagon.
    pub fn style(&self) -> &TileStyle {
        &self.inner.style
    }

    /// Surface-space centre (y down).
    pub fn position(&self) -> Vec2 {
        math::tile_center(self.inner.coord, self.inner.size)
    }

    /// Hexagon corners relative to [`Tile::position`].
    pub fn vertices(&self) -> [Vec2; 6] {
        math::hexagon_vertices(self.inner.size)
    }

    /// Whether both handles refer to the same tile.
    pub fn ptr_eq(a: &Tile, b: &Tile) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// A non-owning reference to this tile.
    pub fn downgrade(&self) -> WeakTile {
        WeakTile(Arc::downgrade(&self.inner))
    }

    // ── Opacity and animation ──────────────────────────────────────

    /// Current opacity in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        self.inner.opacity.get()
    }

    /// Animates opacity to 1.
    pub fn fade_in(&self, options: FadeOptions) -> Fade {
        self.fade(FadeDirection::In, options)
    }

    /// Animates opacity to 0.
    pub fn fade_out(&self, options: FadeOptions) -> Fade {
        self.fade(FadeDirection::Out, options)
    }

    /// Fades in without delay, then fades out with `options`.
    ///
    /// The fade-out starts when the fade-in completes, whether or not the returned
    /// future is polled.
    pub fn flicker(&self, options: FadeOptions) -> Fade {
        let (tx, fade) = Fade::channel();
        let fade_in = FadeOptions {
            delay: 0.0,
            ..options
        };
        self.start_fade(FadeDirection::In, fade_in, move |tile| {
            tile.start_fade(FadeDirection::Out, options, move |tile| {
                let _ = tx.send(tile);
            });
        });
        fade
    }

    /// Cancels every running animation on this tile. Their futures never resolve.
    pub fn kill_all_animations(&self) {
        let mut animations = lock(&self.inner.animations);
        for tracked in animations.drain(..) {
            tracked.animation.handle.cancel();
        }
    }

    /// Snapshot of the animations currently running on this tile.
    pub fn all_animations(&self) -> Vec<ActiveAnimation> {
        lock(&self.inner.animations)
            .iter()
            .map(|tracked| tracked.animation.clone())
            .collect()
    }

    fn fade(&self, direction: FadeDirection, options: FadeOptions) -> Fade {
        let (tx, fade) = Fade::channel();
        self.start_fade(direction, options, move |tile| {
            let _ = tx.send(tile);
        });
        fade
    }

    /// Starts a tween and registers it; `then` runs after it completes and is
    /// deregistered. Never runs `then` if the tween is cancelled.
    ///
    /// The animation set stays locked from `animate` until the entry is pushed, so
    /// a completion on another thread always finds its entry. A completion whose
    /// entry is already gone lost a race with [`Tile::kill_all_animations`].
    pub(crate) fn start_fade(
        &self,
        direction: FadeDirection,
        options: FadeOptions,
        then: impl FnOnce(Tile) + Send + 'static,
    ) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let weak = Arc::downgrade(&self.inner);
        let spec = TweenSpec {
            to: direction.target(),
            duration: options.speed,
            delay: options.delay,
        };
        let mut animations = lock(&self.inner.animations);
        let handle = self.inner.tweener.animate(
            self.inner.opacity.clone(),
            spec,
            Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let tile = Tile { inner };
                let was_running = {
                    let mut animations = lock(&tile.inner.animations);
                    let before = animations.len();
                    animations.retain(|tracked| tracked.id != id);
                    animations.len() != before
                };
                if was_running {
                    then(tile);
                }
            }),
        );
        animations.push(TrackedAnimation {
            id,
            animation: ActiveAnimation { direction, handle },
        });
    }

    // ── Rendering and events ───────────────────────────────────────

    /// Adds this tile's hexagon to the surface. Only the first call has an effect.
    pub fn render(&self, surface: &mut dyn RenderSurface) {
        if self.inner.rendered.swap(true, Ordering::AcqRel) {
            warn!("tile {} was already rendered", self.inner.coord);
            return;
        }
        surface.add_child(HexShape::new(self.clone()));
    }

    /// Calls `listener` every time `event` is emitted on this tile.
    pub fn on(
        &self,
        event: TileEvent,
        listener: impl Fn(&Tile) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.inner.listeners).push((id, event, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not subscribed.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = lock(&self.inner.listeners);
        let before = listeners.len();
        listeners.retain(|(listener_id, _, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Notifies the listeners subscribed to `event`.
    pub fn emit(&self, event: TileEvent) {
        let matching: Vec<Listener> = lock(&self.inner.listeners)
            .iter()
            .filter(|(_, subscribed, _)| *subscribed == event)
            .map(|(_, _, listener)| listener.clone())
            .collect();
        for listener in matching {
            listener(self);
        }
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        Tile::ptr_eq(self, other)
    }
}

impl Eq for Tile {}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field("coord", &self.inner.coord)
            .field("opacity", &self.opacity())
            .finish()
    }
}
