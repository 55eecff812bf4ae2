//! Frame-stepped tweening of scalar values.
//!
//! [`Tweener`] is the seam the tiles animate through; [`TweenEngine`] is the
//! implementation the widget drives once per frame. Completion callbacks run
//! outside the engine's lock, so a callback may start the next tween of a chain.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy::prelude::*;

use crate::math;

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scalar property a tween can read and write.
pub trait Tweenable: Send + Sync {
    /// Current value.
    fn value(&self) -> f32;
    /// Overwrites the value.
    fn set_value(&self, value: f32);
}

/// Interpolation curve applied to normalized tween progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Quadratic deceleration.
    #[default]
    QuadOut,
    /// Cubic deceleration.
    CubicOut,
}

impl Easing {
    /// Maps progress `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::QuadOut => math::ease_out_quad(t),
            Easing::CubicOut => math::ease_out_cubic(t),
        }
    }
}

/// What to animate towards, and when.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSpec {
    /// Final value.
    pub to: f32,
    /// Seconds from start to finish (after the delay).
    pub duration: f32,
    /// Seconds to wait before the start value is sampled.
    pub delay: f32,
}

/// Unique id of a tween within its engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

/// Cancellable reference to a running tween.
#[derive(Debug, Clone)]
pub struct TweenHandle {
    id: TweenId,
    cancelled: Arc<AtomicBool>,
}

impl TweenHandle {
    /// A fresh, uncancelled handle.
    pub fn new(id: TweenId) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The tween this handle refers to.
    pub fn id(&self) -> TweenId {
        self.id
    }

    /// Stops the tween where it is. Its completion callback is never invoked.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`TweenHandle::cancel`] was called on any clone of this handle.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Callback fired once when a tween reaches its target.
pub type OnComplete = Box<dyn FnOnce() + Send>;

/// Something that can animate a [`Tweenable`] over time.
///
/// Implementations must never invoke `on_complete` from inside `animate`; the
/// caller registers the returned handle after `animate` returns.
pub trait Tweener: Send + Sync {
    /// Starts animating `target` according to `spec`.
    fn animate(
        &self,
        target: Arc<dyn Tweenable>,
        spec: TweenSpec,
        on_complete: OnComplete,
    ) -> TweenHandle;
}

struct ActiveTween {
    handle: TweenHandle,
    target: Arc<dyn Tweenable>,
    spec: TweenSpec,
    easing: Easing,
    elapsed: f32,
    from: Option<f32>,
    on_complete: Option<OnComplete>,
}

impl ActiveTween {
    /// Advances by `dt`; returns `true` once the target value has been written.
    fn step(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        let active = self.elapsed - self.spec.delay;
        if active < 0.0 {
            return false;
        }
        let from = *self.from.get_or_insert_with(|| self.target.value());
        let t = if self.spec.duration <= 0.0 {
            1.0
        } else {
            (active / self.spec.duration).min(1.0)
        };
        self.target
            .set_value(math::lerp(from, self.spec.to, self.easing.apply(t)));
        t >= 1.0
    }
}

/// Tween engine advanced explicitly with a frame delta.
pub struct TweenEngine {
    next_id: AtomicU64,
    easing: Easing,
    tweens: Mutex<Vec<ActiveTween>>,
}

impl Default for TweenEngine {
    fn default() -> Self {
        Self::new(Easing::default())
    }
}

impl TweenEngine {
    /// An idle engine. Every tween it runs follows `easing`.
    pub fn new(easing: Easing) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            easing,
            tweens: Mutex::new(Vec::new()),
        }
    }

    /// Number of tweens that are neither finished nor dropped after cancellation.
    pub fn active_count(&self) -> usize {
        lock(&self.tweens)
            .iter()
            .filter(|t| !t.handle.is_cancelled())
            .count()
    }

    /// Steps every tween by `dt` seconds and fires the callbacks of those that finished.
    ///
    /// Cancelled tweens are discarded without touching their target. Returns how many
    /// tweens completed during this step.
    pub fn advance(&self, dt: f32) -> usize {
        let finished: Vec<OnComplete> = {
            let mut tweens = lock(&self.tweens);
            let mut finished = Vec::new();
            tweens.retain_mut(|tween| {
                if tween.handle.is_cancelled() {
                    return false;
                }
                if !tween.step(dt) {
                    return true;
                }
                if let Some(done) = tween.on_complete.take() {
                    finished.push(done);
                }
                false
            });
            finished
        };
        let count = finished.len();
        for done in finished {
            done();
        }
        count
    }
}

impl Tweener for TweenEngine {
    fn animate(
        &self,
        target: Arc<dyn Tweenable>,
        spec: TweenSpec,
        on_complete: OnComplete,
    ) -> TweenHandle {
        let id = TweenId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = TweenHandle::new(id);
        lock(&self.tweens).push(ActiveTween {
            handle: handle.clone(),
            target,
            spec,
            easing: self.easing,
            elapsed: 0.0,
            from: None,
            on_complete: Some(on_complete),
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    struct Value(Mutex<f32>);

    impl Tweenable for Value {
        fn value(&self) -> f32 {
            *lock(&self.0)
        }
        fn set_value(&self, value: f32) {
            *lock(&self.0) = value;
        }
    }

    fn value(v: f32) -> Arc<Value> {
        Arc::new(Value(Mutex::new(v)))
    }

    fn spec(to: f32, duration: f32, delay: f32) -> TweenSpec {
        TweenSpec {
            to,
            duration,
            delay,
        }
    }

    fn counter() -> (Arc<AtomicUsize>, OnComplete) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (
            count,
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    // ── progress ────────────────────────────────────────────────────

    #[test]
    fn interpolates_then_completes_once() {
        let engine = TweenEngine::new(Easing::Linear);
        let target = value(0.0);
        let (done, cb) = counter();
        engine.animate(target.clone(), spec(1.0, 1.0, 0.0), cb);

        engine.advance(0.5);
        assert!((target.value() - 0.5).abs() < 1e-6);
        assert_eq!(done.load(Ordering::SeqCst), 0);

        assert_eq!(engine.advance(0.5), 1);
        assert_eq!(target.value(), 1.0);
        assert_eq!(done.load(Ordering::SeqCst), 1);

        assert_eq!(engine.advance(1.0), 0);
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn delay_holds_value_and_samples_start_late() {
        let engine = TweenEngine::new(Easing::Linear);
        let target = value(0.2);
        engine.animate(target.clone(), spec(1.0, 1.0, 0.5), Box::new(|| {}));

        engine.advance(0.25);
        assert_eq!(target.value(), 0.2);

        // Start value is read when the delay elapses, not when the tween is created.
        target.set_value(0.0);
        engine.advance(0.25);
        engine.advance(0.5);
        assert!((target.value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_duration_finishes_on_next_step() {
        let engine = TweenEngine::default();
        let target = value(1.0);
        let (done, cb) = counter();
        engine.animate(target.clone(), spec(0.0, 0.0, 0.0), cb);
        assert_eq!(done.load(Ordering::SeqCst), 0);
        engine.advance(0.0);
        assert_eq!(target.value(), 0.0);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn engine_easing_shapes_progress() {
        let engine = TweenEngine::new(Easing::CubicOut);
        let target = value(0.0);
        engine.animate(target.clone(), spec(1.0, 1.0, 0.0), Box::new(|| {}));
        engine.advance(0.5);
        assert!((target.value() - math::ease_out_cubic(0.5)).abs() < 1e-6);
    }

    // ── cancellation ────────────────────────────────────────────────

    #[test]
    fn cancelled_tween_never_completes() {
        let engine = TweenEngine::new(Easing::Linear);
        let target = value(0.0);
        let (done, cb) = counter();
        let handle = engine.animate(target.clone(), spec(1.0, 1.0, 0.0), cb);
        engine.advance(0.25);
        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(engine.active_count(), 0);

        engine.advance(5.0);
        assert_eq!(done.load(Ordering::SeqCst), 0);
        assert!((target.value() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn callback_may_start_another_tween() {
        let engine = Arc::new(TweenEngine::new(Easing::Linear));
        let target = value(0.0);
        let chained = {
            let engine = engine.clone();
            let target = target.clone();
            Box::new(move || {
                engine.animate(target, spec(0.0, 1.0, 0.0), Box::new(|| {}));
            })
        };
        engine.animate(target.clone(), spec(1.0, 1.0, 0.0), chained);
        engine.advance(1.0);
        assert_eq!(target.value(), 1.0);
        assert_eq!(engine.active_count(), 1);
        engine.advance(1.0);
        assert_eq!(target.value(), 0.0);
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn ids_are_unique() {
        let engine = TweenEngine::default();
        let a = engine.animate(value(0.0), spec(1.0, 1.0, 0.0), Box::new(|| {}));
        let b = engine.animate(value(0.0), spec(1.0, 1.0, 0.0), Box::new(|| {}));
        assert_ne!(a.id(), b.id());
    }
}
