//! Non-owning collections of tiles that animate together.
//!
//! A [`TileGroup`] dispatches fades to all its members at once, or one after the
//! other for the staggered variants. A [`HoneycombSet`] keeps the named slots of
//! a honeycomb and converts to a group when the slot names no longer matter.

use std::collections::VecDeque;

use bevy::log::warn;
use futures::channel::oneshot;
use futures::future::{JoinAll, join_all};

use crate::neighbors::HoneycombSlot;
use crate::tile::{Completion, Fade, FadeDirection, FadeOptions, Tile, WeakTile};

/// Completion of a staggered fade: the members in the order they finished.
pub type Staggered = Completion<Vec<Tile>>;

/// Tiles taken from one grid, animated as a unit.
///
/// Members are held weakly; a tile whose grid has been dropped silently leaves
/// the group.
#[derive(Clone, Default)]
pub struct TileGroup {
    members: Vec<WeakTile>,
}

impl TileGroup {
    /// Groups `tiles`, warning when there are none.
    pub fn new<'a>(tiles: impl IntoIterator<Item = &'a Tile>) -> Self {
        let group = Self::collect(tiles);
        if group.members.is_empty() {
            warn!("tile group is empty; every requested tile is off the grid");
        }
        group
    }

    fn collect<'a>(tiles: impl IntoIterator<Item = &'a Tile>) -> Self {
        Self {
            members: tiles.into_iter().map(Tile::downgrade).collect(),
        }
    }

    /// The members that are still alive, in group order.
    pub fn tiles(&self) -> Vec<Tile> {
        self.members.iter().filter_map(WeakTile::upgrade).collect()
    }

    /// Number of live members.
    pub fn len(&self) -> usize {
        self.tiles().len()
    }

    /// Whether no member is alive.
    pub fn is_empty(&self) -> bool {
        self.members.iter().all(|m| m.upgrade().is_none())
    }

    /// Fades every member in at once.
    pub fn fade_in(&self, options: FadeOptions) -> JoinAll<Fade> {
        join_all(self.tiles().iter().map(|t| t.fade_in(options)))
    }

    /// Fades every member out at once.
    pub fn fade_out(&self, options: FadeOptions) -> JoinAll<Fade> {
        join_all(self.tiles().iter().map(|t| t.fade_out(options)))
    }

    /// Flickers every member at once.
    pub fn flicker(&self, options: FadeOptions) -> JoinAll<Fade> {
        join_all(self.tiles().iter().map(|t| t.flicker(options)))
    }

    /// Fades members in one at a time; each starts when the previous one finishes.
    pub fn staggered_fade_in(&self, options: FadeOptions) -> Staggered {
        self.staggered(FadeDirection::In, options)
    }

    /// Fades members out one at a time; each starts when the previous one finishes.
    pub fn staggered_fade_out(&self, options: FadeOptions) -> Staggered {
        self.staggered(FadeDirection::Out, options)
    }

    fn staggered(&self, direction: FadeDirection, options: FadeOptions) -> Staggered {
        let (tx, completion) = Staggered::channel();
        let queue = self.members.iter().cloned().collect();
        advance_wave(queue, direction, options, Vec::new(), tx);
        completion
    }

    /// Calls `f` with each live member, its index, and the full member list.
    pub fn for_each(&self, mut f: impl FnMut(&Tile, usize, &[Tile])) {
        let tiles = self.tiles();
        for (i, tile) in tiles.iter().enumerate() {
            f(tile, i, &tiles);
        }
    }

    /// Cancels every animation on every member.
    pub fn kill_all_animations(&self) {
        for tile in self.tiles() {
            tile.kill_all_animations();
        }
    }
}

/// Starts the next live tile of `queue`, re-entering from its completion callback.
fn advance_wave(
    mut queue: VecDeque<WeakTile>,
    direction: FadeDirection,
    options: FadeOptions,
    mut finished: Vec<Tile>,
    tx: oneshot::Sender<Vec<Tile>>,
) {
    let Some(tile) = std::iter::from_fn(|| queue.pop_front()).find_map(|m| m.upgrade()) else {
        let _ = tx.send(finished);
        return;
    };
    tile.start_fade(direction, options, move |tile| {
        finished.push(tile);
        advance_wave(queue, direction, options, finished, tx);
    });
}

/// The seven slots of a honeycomb; slots off the grid are empty.
#[derive(Clone)]
pub struct HoneycombSet {
    slots: [Option<WeakTile>; 7],
}

impl HoneycombSet {
    /// Builds the set from tiles ordered as [`HoneycombSlot::ALL`].
    pub fn new(slots: [Option<&Tile>; 7]) -> Self {
        if slots.iter().all(Option::is_none) {
            warn!("honeycomb is entirely off the grid");
        }
        Self {
            slots: slots.map(|slot| slot.map(Tile::downgrade)),
        }
    }

    /// The tile in `slot`, if any.
    pub fn get(&self, slot: HoneycombSlot) -> Option<Tile> {
        self.slots[slot.index()].as_ref()?.upgrade()
    }

    /// The centre tile, if it is on the grid.
    pub fn center(&self) -> Option<Tile> {
        self.get(HoneycombSlot::Center)
    }

    /// Present slots as a group, centre first.
    pub fn to_group(&self) -> TileGroup {
        let tiles: Vec<Tile> = self.slots.iter().flatten().filter_map(WeakTile::upgrade).collect();
        TileGroup::collect(&tiles)
    }

    /// Fades every present tile in at once.
    pub fn fade_in(&self, options: FadeOptions) -> JoinAll<Fade> {
        self.to_group().fade_in(options)
    }

    /// Fades every present tile out at once.
    pub fn fade_out(&self, options: FadeOptions) -> JoinAll<Fade> {
        self.to_group().fade_out(options)
    }

    /// Flickers every present tile at once.
    pub fn flicker(&self, options: FadeOptions) -> JoinAll<Fade> {
        self.to_group().flicker(options)
    }

    /// Fades the present tiles in one at a time, centre first then clockwise from the left.
    pub fn staggered_fade_in(&self, options: FadeOptions) -> Staggered {
        self.to_group().staggered_fade_in(options)
    }

    /// Fades the present tiles out one at a time.
    pub fn staggered_fade_out(&self, options: FadeOptions) -> Staggered {
        self.to_group().staggered_fade_out(options)
    }

    /// Calls `f` with each present tile, its index, and all present tiles.
    pub fn for_each(&self, f: impl FnMut(&Tile, usize, &[Tile])) {
        self.to_group().for_each(f);
    }

    /// Cancels every animation on every present tile.
    pub fn kill_all_animations(&self) {
        self.to_group().kill_all_animations();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::FutureExt;

    use super::*;
    use crate::coords::Coord;
    use crate::surface::TileStyle;
    use crate::tween::{Easing, TweenEngine};

    fn tiles(n: i32) -> (Vec<Tile>, Arc<TweenEngine>) {
        let engine = Arc::new(TweenEngine::new(Easing::Linear));
        let tiles = (0..n)
            .map(|x| Tile::new(Coord::new(x, 0), 10.0, TileStyle::default(), engine.clone()))
            .collect();
        (tiles, engine)
    }

    fn opacities(tiles: &[Tile]) -> Vec<f32> {
        tiles.iter().map(Tile::opacity).collect()
    }

    // ── parallel ────────────────────────────────────────────────────

    #[test]
    fn fade_in_runs_members_together() {
        let (tiles, engine) = tiles(3);
        let group = TileGroup::new(&tiles);
        let mut all = group.fade_in(FadeOptions::default());
        engine.advance(0.5);
        assert_eq!(opacities(&tiles), vec![0.5; 3]);
        assert!((&mut all).now_or_never().is_none());

        engine.advance(0.5);
        assert_eq!(all.now_or_never().map(|done| done.len()), Some(3));
    }

    #[test]
    fn flicker_returns_members_to_transparent() {
        let (tiles, engine) = tiles(2);
        let _ = TileGroup::new(&tiles).flicker(FadeOptions::with_speed(1.0));
        engine.advance(1.0);
        assert_eq!(opacities(&tiles), vec![1.0; 2]);
        engine.advance(1.0);
        assert_eq!(opacities(&tiles), vec![0.0; 2]);
    }

    #[test]
    fn fade_out_then_kill_leaves_nothing_tracked() {
        let (tiles, engine) = tiles(4);
        let group = TileGroup::new(&tiles);
        let _ = group.fade_out(FadeOptions::default());
        group.kill_all_animations();
        assert!(tiles.iter().all(|t| t.all_animations().is_empty()));
        engine.advance(2.0);
        assert!(tiles.iter().all(|t| t.all_animations().is_empty()));
        assert_eq!(engine.active_count(), 0);
    }

    // ── staggered ───────────────────────────────────────────────────

    #[test]
    fn staggered_fade_in_starts_each_after_previous() {
        let (tiles, engine) = tiles(3);
        let mut staggered = TileGroup::new(&tiles).staggered_fade_in(FadeOptions::default());

        engine.advance(0.5);
        assert_eq!(opacities(&tiles), vec![0.5, 0.0, 0.0]);
        assert!(tiles[1].all_animations().is_empty());

        engine.advance(0.5);
        assert_eq!(opacities(&tiles), vec![1.0, 0.0, 0.0]);
        assert_eq!(tiles[1].all_animations().len(), 1);

        engine.advance(1.0);
        assert_eq!(opacities(&tiles), vec![1.0, 1.0, 0.0]);
        assert!((&mut staggered).now_or_never().is_none());
        engine.advance(1.0);
        assert_eq!(staggered.now_or_never(), Some(tiles.clone()));
        assert_eq!(opacities(&tiles), vec![1.0; 3]);
    }

    #[test]
    fn staggered_runs_without_being_polled() {
        let (tiles, engine) = tiles(2);
        drop(TileGroup::new(&tiles).staggered_fade_in(FadeOptions::with_speed(1.0)));
        for _ in 0..3 {
            engine.advance(1.0);
        }
        assert_eq!(opacities(&tiles), vec![1.0; 2]);
    }

    #[test]
    fn staggered_chain_stops_when_killed() {
        let (tiles, engine) = tiles(2);
        let group = TileGroup::new(&tiles);
        let staggered = group.staggered_fade_in(FadeOptions::default());
        engine.advance(0.5);
        group.kill_all_animations();
        for _ in 0..4 {
            engine.advance(1.0);
        }
        assert_eq!(opacities(&tiles), vec![0.5, 0.0]);
        assert!(staggered.now_or_never().is_none());
    }

    #[test]
    fn staggered_on_empty_group_resolves_immediately() {
        let done = TileGroup::default().staggered_fade_out(FadeOptions::default());
        assert_eq!(done.now_or_never(), Some(Vec::new()));
    }

    // ── membership ──────────────────────────────────────────────────

    #[test]
    fn dropped_tiles_leave_the_group() {
        let (mut tiles, _) = tiles(3);
        let group = TileGroup::new(&tiles);
        tiles.truncate(1);
        assert_eq!(group.len(), 1);
        assert_eq!(group.tiles(), tiles);
        tiles.clear();
        assert!(group.is_empty());
    }

    #[test]
    fn for_each_sees_index_and_members() {
        let (tiles, _) = tiles(3);
        let mut seen = Vec::new();
        TileGroup::new(&tiles).for_each(|tile, i, all| {
            assert_eq!(all.len(), 3);
            assert!(Tile::ptr_eq(tile, &all[i]));
            seen.push(tile.coord().x);
        });
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn honeycomb_drops_absent_slots() {
        let (tiles, engine) = tiles(2);
        let honeycomb = HoneycombSet::new([
            Some(&tiles[0]),
            None,
            None,
            Some(&tiles[1]),
            None,
            None,
            None,
        ]);
        assert_eq!(honeycomb.center(), Some(tiles[0].clone()));
        assert_eq!(honeycomb.get(HoneycombSlot::TopRight), Some(tiles[1].clone()));
        assert!(honeycomb.get(HoneycombSlot::Left).is_none());
        assert_eq!(honeycomb.to_group().tiles(), tiles);

        let _ = honeycomb.fade_in(FadeOptions::with_speed(1.0));
        engine.advance(1.0);
        assert_eq!(opacities(&tiles), vec![1.0; 2]);
    }
}
