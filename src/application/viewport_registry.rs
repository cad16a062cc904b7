//! Registry of the view rectangles covered by secondary cameras.
//!
//! One registry exists per loaded world. Navigators register their aligned
//! view rect once, then replace it every tick. The renderer asks for the
//! union of all of them with its own view before culling, once per frame.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::domain::{CellPos, CellRect, EntityId, WorldBounds, WorldProvider};

/// Frames between maintenance sweeps of the active set
pub const SWEEP_INTERVAL_FRAMES: u64 = 60;

/// Stable handle to one registered viewport. Never reused within a registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ViewportId(pub u32);

/// Counters for how much work the registry has done
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RegistryStats {
    /// Times the combined viewport was actually recomputed
    pub recomputations: u64,
    /// Maintenance sweeps run
    pub sweeps: u64,
}

#[derive(Clone, Copy, Debug)]
struct CachedUnion {
    frame: u64,
    primary: CellRect,
    combined: CellRect,
}

#[derive(Debug)]
pub struct ViewportRegistry {
    bounds: WorldBounds,
    by_id: HashMap<ViewportId, CellRect>,
    /// Distinct active rects with the number of ids holding each one.
    /// Identical rects from different ids share one entry.
    active: HashMap<CellRect, u32>,
    next_id: u32,
    frame: u64,
    last_sweep_frame: u64,
    cache: Option<CachedUnion>,
    stats: RegistryStats,
}

impl ViewportRegistry {
    /// Create an empty registry for a map of the given size
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            by_id: HashMap::new(),
            active: HashMap::new(),
            next_id: 1,
            frame: 0,
            last_sweep_frame: 0,
            cache: None,
            stats: RegistryStats::default(),
        }
    }

    pub const fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Current frame stamp
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Move to the next frame. Cached results from earlier frames go stale.
    pub fn advance_frame(&mut self) {
        self.frame += 1;
    }

    /// Start tracking `rect`. Returns `None` for an empty rect.
    pub fn register(&mut self, rect: CellRect) -> Option<ViewportId> {
        if rect.is_empty() {
            return None;
        }
        let id = ViewportId(self.next_id);
        self.next_id += 1;
        self.by_id.insert(id, rect);
        self.add_active(rect);
        self.invalidate();
        debug!("registered viewport #{} at {}", id.0, rect);
        Some(id)
    }

    /// Replace the rect held by `id`. Unknown ids and empty rects are ignored.
    pub fn update(&mut self, id: ViewportId, rect: CellRect) {
        if rect.is_empty() {
            return;
        }
        let Some(slot) = self.by_id.get_mut(&id) else {
            return;
        };
        let previous = std::mem::replace(slot, rect);
        if previous == rect {
            return;
        }
        self.remove_active(previous);
        self.add_active(rect);
        self.invalidate();
    }

    /// Stop tracking `id`. Unknown ids are ignored.
    pub fn unregister(&mut self, id: ViewportId) {
        if let Some(rect) = self.by_id.remove(&id) {
            self.remove_active(rect);
            self.invalidate();
            debug!("unregistered viewport #{}", id.0);
        }
    }

    /// Drop every viewport
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.active.clear();
        self.invalidate();
        debug!("cleared all viewports");
    }

    /// Rect currently held by `id`
    pub fn get(&self, id: ViewportId) -> Option<CellRect> {
        self.by_id.get(&id).copied()
    }

    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Number of registered ids
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub const fn stats(&self) -> RegistryStats {
        self.stats
    }

    /// Distinct active rects, in no particular order
    pub fn active_rects(&self) -> impl Iterator<Item = CellRect> + '_ {
        self.active.keys().copied()
    }

    /// Union of `primary` with every active rect, clipped to the map.
    ///
    /// Computed at most once per frame for a given `primary`; any mutation
    /// forces a recompute on the next call, even within the same frame.
    pub fn combined_viewport(&mut self, primary: CellRect) -> CellRect {
        if self.frame.saturating_sub(self.last_sweep_frame) >= SWEEP_INTERVAL_FRAMES {
            self.sweep();
            self.last_sweep_frame = self.frame;
        }

        if let Some(cache) = self.cache {
            if cache.frame == self.frame && cache.primary == primary {
                return cache.combined;
            }
        }

        let combined = self
            .active
            .keys()
            .fold(primary, |acc, rect| acc.encapsulate(*rect));
        let combined = self.bounds.clip(combined);

        self.stats.recomputations += 1;
        self.cache = Some(CachedUnion {
            frame: self.frame,
            primary,
            combined,
        });
        combined
    }

    /// The rect a renderer should cull against this frame.
    ///
    /// `primary` untouched while no secondary view is active, otherwise the
    /// combined viewport, unless that came out empty.
    pub fn effective_view_rect(&mut self, primary: CellRect) -> CellRect {
        if !self.has_active() {
            return primary;
        }
        let combined = self.combined_viewport(primary);
        if combined.is_empty() { primary } else { combined }
    }

    /// Whether any secondary view covers `cell`
    pub fn contains_point(&self, cell: CellPos) -> bool {
        self.active.keys().any(|rect| rect.contains(cell))
    }

    /// Whether any secondary view shares a cell with `region`
    pub fn overlaps_region(&self, region: CellRect) -> bool {
        self.active.keys().any(|rect| rect.overlaps(&region))
    }

    /// Whether any secondary view currently shows `entity`. Absent entities are never visible.
    pub fn contains_entity(&self, world: &impl WorldProvider, entity: EntityId) -> bool {
        world
            .locate(entity)
            .is_some_and(|(x, z)| self.contains_point(CellPos::from_world(x, z)))
    }

    fn add_active(&mut self, rect: CellRect) {
        *self.active.entry(rect).or_insert(0) += 1;
    }

    fn remove_active(&mut self, rect: CellRect) {
        if let Some(count) = self.active.get_mut(&rect) {
            *count -= 1;
            if *count == 0 {
                self.active.remove(&rect);
            }
        }
    }

    fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Drop empty rects and ids whose rect is no longer active, then rebuild the counts
    fn sweep(&mut self) {
        self.stats.sweeps += 1;
        let before = (self.by_id.len(), self.active.len());

        self.active.retain(|rect, count| !rect.is_empty() && *count > 0);
        let active = &self.active;
        self.by_id.retain(|_, rect| !rect.is_empty() && active.contains_key(rect));

        let mut counts: HashMap<CellRect, u32> = HashMap::with_capacity(self.by_id.len());
        for rect in self.by_id.values() {
            *counts.entry(*rect).or_insert(0) += 1;
        }

        if (self.by_id.len(), counts.len()) != before || counts != self.active {
            debug!(
                "viewport sweep: {} ids, {} rects (was {} ids, {} rects)",
                self.by_id.len(),
                counts.len(),
                before.0,
                before.1
            );
            self.active = counts;
            self.invalidate();
        }
    }

    #[cfg(test)]
    fn inject_raw(&mut self, id: ViewportId, rect: CellRect) {
        self.by_id.insert(id, rect);
        *self.active.entry(rect).or_insert(0) += 1;
    }
}

impl fmt::Display for ViewportRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "active viewports: {}, cached: {}",
            self.active.len(),
            if self.cache.is_some() { "yes" } else { "no" }
        )
    }
}
