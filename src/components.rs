// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Whole-network component indexing.
//!
//! Connected components are computed over the bipartite graph of bus-view
//! calculated buses and closed, connected branch equipment; synchronous
//! components run the same sweep restricted to AC edges, so they refine the
//! connected partition.  Results are cached per variant and renumbered from
//! scratch on every recomputation, with the largest component numbered 0.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use petgraph::unionfind::UnionFind;

use crate::identifiers::VoltageLevelHandle;
use crate::variant::array::VariantOp;

/// Which partition a [`ComponentRef`] belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComponentKind {
    Connected,
    Synchronous,
}

/// A handle to one component of one variant's partition.
///
/// Like bus handles, component handles are stale-checked: after any
/// connectivity mutation in the handle's variant, reads through it fail and
/// the component must be requested again.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComponentRef {
    pub(crate) kind: ComponentKind,
    pub(crate) number: usize,
    pub(crate) variant: usize,
    pub(crate) stamp: u64,
}

impl ComponentRef {
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// The component number within its recomputation.  Numbers are not
    /// stable across recomputations.
    pub fn number(&self) -> usize {
        self.number
    }
}

/// One bus-view calculated bus, globally addressed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GlobalBus {
    pub(crate) voltage_level: VoltageLevelHandle,
    pub(crate) bus: usize,
    /// The owning level's topology stamp at indexing time, so component
    /// members can be handed back out as live bus handles.
    pub(crate) stamp: u64,
}

/// One partition of the global buses into components.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Partition {
    /// Bus position → component number.
    pub(crate) assignment: Vec<usize>,
    /// Component number → bus count.
    pub(crate) sizes: Vec<usize>,
}

/// The full component index of one variant.
#[derive(Clone, Debug, Default)]
pub(crate) struct ComputedComponents {
    pub(crate) buses: Vec<GlobalBus>,
    /// `(voltage level arena index, bus position in its set)` → position in
    /// `buses`.
    pub(crate) index: HashMap<(usize, usize), usize>,
    pub(crate) connected: Partition,
    pub(crate) synchronous: Partition,
}

impl ComputedComponents {
    pub(crate) fn partition(&self, kind: ComponentKind) -> &Partition {
        match kind {
            ComponentKind::Connected => &self.connected,
            ComponentKind::Synchronous => &self.synchronous,
        }
    }
}

/// Partitions `bus_count` buses along `edges` and numbers the resulting
/// components by descending size, ties broken by discovery order.
///
/// The sweep is deterministic for a fixed input: union-find roots are
/// grouped in bus-position order before numbering.
pub(crate) fn compute_partition(
    bus_count: usize,
    edges: impl IntoIterator<Item = (usize, usize)>,
) -> Partition {
    let mut union_find = UnionFind::<usize>::new(bus_count);
    for (a, b) in edges {
        union_find.union(a, b);
    }
    let labels = union_find.into_labeling();

    let mut discovered: HashMap<usize, usize> = HashMap::new();
    let mut assignment = vec![0; bus_count];
    let mut sizes = Vec::new();
    for (position, &label) in labels.iter().enumerate() {
        let next = discovered.len();
        let number = *discovered.entry(label).or_insert(next);
        if number == sizes.len() {
            sizes.push(0);
        }
        sizes[number] += 1;
        assignment[position] = number;
    }

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by_key(|&number| (std::cmp::Reverse(sizes[number]), number));
    let mut renumbered = vec![0; sizes.len()];
    for (new_number, &old_number) in order.iter().enumerate() {
        renumbered[old_number] = new_number;
    }

    Partition {
        assignment: assignment.into_iter().map(|n| renumbered[n]).collect(),
        sizes: order.into_iter().map(|old| sizes[old]).collect(),
    }
}

#[derive(Clone, Debug)]
struct CacheSlot {
    stamp: u64,
    components: Option<Arc<ComputedComponents>>,
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
            components: None,
        }
    }

    fn refresh(&mut self, index: usize) {
        let slot = self.fresh_slot();
        self.slots[index] = slot;
    }
}

/// The per-variant component index cache, owned by the network.
///
/// Same discipline as the topology caches: eager invalidation with fresh
/// stamps, lazy recomputation on the next query.
#[derive(Debug)]
pub(crate) struct ComponentCache {
    inner: RwLock<CacheInner>,
}

impl ComponentCache {
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

    pub(crate) fn get_or_compute(
        &self,
        variant: usize,
        compute: impl FnOnce() -> ComputedComponents,
    ) -> (u64, Arc<ComputedComponents>) {
        let mut inner = self.inner.write();
        let slot = &mut inner.slots[variant];
        let stamp = slot.stamp;
        let components = match &slot.components {
            Some(components) => components.clone(),
            None => {
                let components = Arc::new(compute());
                slot.components = Some(components.clone());
                components
            }
        };
        (stamp, components)
    }

    pub(crate) fn invalidate_variant(&self, variant: usize) {
        self.inner.write().refresh(variant);
    }

    pub(crate) fn invalidate_all(&self) {
        let mut inner = self.inner.write();
        for index in 0..inner.slots.len() {
            inner.refresh(index);
        }
    }

    pub(crate) fn validate(&self, variant: usize, stamp: u64) -> bool {
        let inner = self.inner.read();
        inner
            .slots
            .get(variant)
            .is_some_and(|slot| slot.stamp == stamp)
    }

    pub(crate) fn is_cached(&self, variant: usize) -> bool {
        self.inner.read().slots[variant].components.is_some()
    }

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

    #[test]
    fn test_isolated_buses_each_form_a_component() {
        let partition = compute_partition(3, []);

        assert_eq!(partition.sizes, vec![1, 1, 1]);
        assert_eq!(partition.assignment, vec![0, 1, 2]);
    }

    #[test]
    fn test_largest_component_is_number_zero() {
        // Buses 2-3-4 form the largest group; 0-1 the smaller one.
        let partition = compute_partition(5, [(0, 1), (2, 3), (3, 4)]);

        assert_eq!(partition.sizes, vec![3, 2]);
        assert_eq!(partition.assignment, vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_ties_broken_by_discovery_order() {
        let partition = compute_partition(4, [(0, 1), (2, 3)]);

        assert_eq!(partition.sizes, vec![2, 2]);
        assert_eq!(partition.assignment, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_partition_is_deterministic() {
        let edges = [(4, 2), (1, 0), (2, 0)];
        let first = compute_partition(6, edges);
        let second = compute_partition(6, edges);

        assert_eq!(first, second);
        assert_eq!(first.sizes, vec![4, 1, 1]);
    }

    #[test]
    fn test_synchronous_refines_connected() {
        // An asynchronous edge (3, 4) is present in the connected sweep and
        // absent from the synchronous one.
        let all_edges = [(0, 1), (1, 2), (3, 4)];
        let ac_edges = [(0, 1), (1, 2)];

        let connected = compute_partition(5, all_edges);
        let synchronous = compute_partition(5, ac_edges);

        assert_eq!(connected.sizes, vec![3, 2]);
        assert_eq!(synchronous.sizes, vec![3, 1, 1]);
        // Every synchronous component is inside one connected component.
        for position in 0..5 {
            for other in 0..5 {
                if synchronous.assignment[position] == synchronous.assignment[other] {
                    assert_eq!(
                        connected.assignment[position],
                        connected.assignment[other]
                    );
                }
            }
        }
    }

    #[test]
    fn test_cache_epochs() {
        let cache = ComponentCache::new(2);
        let mut computed = 0;
        let build = |computed: &mut usize| {
            *computed += 1;
            ComputedComponents {
                buses: Vec::new(),
                index: HashMap::new(),
                connected: compute_partition(0, []),
                synchronous: compute_partition(0, []),
            }
        };

        let (stamp, _) = cache.get_or_compute(0, || build(&mut computed));
        cache.get_or_compute(0, || build(&mut computed));
        assert_eq!(computed, 1);
        assert!(cache.validate(0, stamp));

        cache.invalidate_variant(0);
        assert!(!cache.validate(0, stamp));
        assert!(!cache.is_cached(0));

        let (new_stamp, _) = cache.get_or_compute(0, || build(&mut computed));
        assert_eq!(computed, 2);
        assert_ne!(stamp, new_stamp);
    }
}
