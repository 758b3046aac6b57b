// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The per-variant calculated-bus cache of one voltage level.
//!
//! Invalidation is eager, recomputation lazy: mutations refresh a slot's
//! stamp immediately, queries fill the slot on demand.  Stamps come from a
//! per-level monotonic counter and are never reused, so a
//! [`BusRef`][crate::topology::BusRef] minted under an older stamp can
//! always be told apart from the current topology.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::topology::{BusSet, TopologyView};
use crate::variant::array::VariantOp;

#[derive(Clone, Debug)]
struct CacheSlot {
    stamp: u64,
    bus: Option<Arc<BusSet>>,
    bus_breaker: Option<Arc<BusSet>>,
}

#[derive(Debug)]
struct CacheInner {
    slots: Vec<CacheSlot>,
    next_stamp: u64,
}

impl CacheInner {
    fn fresh_slot(&mut self) -> CacheSlot {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        CacheSlot {
            stamp,
            bus: None,
            bus_breaker: None,
        }
    }

    fn refresh(&mut self, index: usize) {
        let slot = self.fresh_slot();
        self.slots[index] = slot;
    }
}

/// Lazily computed calculated buses, one slot per variant, two views per
/// slot.
#[derive(Debug)]
pub(crate) struct TopologyCache {
    inner: RwLock<CacheInner>,
}

impl TopologyCache {
    pub(crate) fn new(variants: usize) -> Self {
        let mut inner = CacheInner {
            slots: Vec::new(),
            next_stamp: 0,
        };
        for _ in 0..variants {
            let slot = inner.fresh_slot();
            inner.slots.push(slot);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Returns the cached bus set for `(view, variant)`, computing it first
    /// if the slot is empty.  The returned stamp identifies the validity
    /// epoch the result belongs to.
    pub(crate) fn get_or_compute(
        &self,
        view: TopologyView,
        variant: usize,
        compute: impl FnOnce() -> BusSet,
    ) -> (u64, Arc<BusSet>) {
        let mut inner = self.inner.write();
        let slot = &mut inner.slots[variant];
        let stamp = slot.stamp;
        let cached = match view {
            TopologyView::Bus => &mut slot.bus,
            TopologyView::BusBreaker => &mut slot.bus_breaker,
        };
        let set = match cached {
            Some(set) => set.clone(),
            None => {
                let set = Arc::new(compute());
                *cached = Some(set.clone());
                set
            }
        };
        (stamp, set)
    }

    /// Whether `(view, variant)` currently holds a computed result.
    pub(crate) fn is_cached(&self, view: TopologyView, variant: usize) -> bool {
        let inner = self.inner.read();
        let slot = &inner.slots[variant];
        match view {
            TopologyView::Bus => slot.bus.is_some(),
            TopologyView::BusBreaker => slot.bus_breaker.is_some(),
        }
    }

    /// Drops the cached result of one variant and opens a new validity
    /// epoch for it.  Other variants keep their results and stamps.
    pub(crate) fn invalidate_variant(&self, variant: usize) {
        self.inner.write().refresh(variant);
    }

    /// Drops every variant's cached result (structural mutations).
    pub(crate) fn invalidate_all(&self) {
        let mut inner = self.inner.write();
        for index in 0..inner.slots.len() {
            inner.refresh(index);
        }
    }

    /// Whether a handle minted under `stamp` for `variant` is still valid.
    pub(crate) fn validate(&self, variant: usize, stamp: u64) -> bool {
        let inner = self.inner.read();
        inner
            .slots
            .get(variant)
            .is_some_and(|slot| slot.stamp == stamp)
    }

    /// Variant lifecycle: new and recycled slots start empty in a fresh
    /// epoch, so handles into removed variants can never validate again.
    pub(crate) fn apply(&mut self, op: &VariantOp<'_>) {
        let inner = self.inner.get_mut();
        match *op {
            VariantOp::Extend { count, .. } => {
                for _ in 0..count {
                    let slot = inner.fresh_slot();
                    inner.slots.push(slot);
                }
            }
            VariantOp::Reduce { count } => {
                let keep = inner.slots.len() - count;
                inner.slots.truncate(keep);
            }
            VariantOp::Delete { index } => inner.refresh(index),
            VariantOp::Allocate { indexes, .. } => {
                for &index in indexes {
                    inner.refresh(index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_bus_set() -> BusSet {
        BusSet::default()
    }

    #[test]
    fn test_compute_once_per_epoch() {
        let cache = TopologyCache::new(1);
        let mut computed = 0;

        let (stamp, _) = cache.get_or_compute(TopologyView::Bus, 0, || {
            computed += 1;
            one_bus_set()
        });
        let (again, _) = cache.get_or_compute(TopologyView::Bus, 0, || {
            computed += 1;
            one_bus_set()
        });

        assert_eq!(computed, 1);
        assert_eq!(stamp, again);
        assert!(cache.validate(0, stamp));
    }

    #[test]
    fn test_views_cached_independently() {
        let cache = TopologyCache::new(1);
        cache.get_or_compute(TopologyView::Bus, 0, one_bus_set);

        assert!(cache.is_cached(TopologyView::Bus, 0));
        assert!(!cache.is_cached(TopologyView::BusBreaker, 0));
    }

    #[test]
    fn test_invalidation_is_per_variant() {
        let mut cache = TopologyCache::new(1);
        cache.apply(&VariantOp::Extend { count: 1, source: 0 });
        let (stamp_a, _) = cache.get_or_compute(TopologyView::Bus, 0, one_bus_set);
        let (stamp_b, _) = cache.get_or_compute(TopologyView::Bus, 1, one_bus_set);

        cache.invalidate_variant(0);

        assert!(!cache.validate(0, stamp_a));
        assert!(!cache.is_cached(TopologyView::Bus, 0));
        assert!(cache.validate(1, stamp_b));
        assert!(cache.is_cached(TopologyView::Bus, 1));
    }

    #[test]
    fn test_lifecycle_opens_fresh_epochs() {
        let mut cache = TopologyCache::new(1);
        let (stamp, _) = cache.get_or_compute(TopologyView::Bus, 0, one_bus_set);

        cache.apply(&VariantOp::Extend { count: 2, source: 0 });
        assert!(!cache.is_cached(TopologyView::Bus, 1));

        cache.apply(&VariantOp::Delete { index: 0 });
        assert!(!cache.validate(0, stamp));

        cache.apply(&VariantOp::Reduce { count: 2 });
        assert!(!cache.validate(1, 0));
    }
}
