// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The variant registry: live variant names, their dense array indexes, and
//! the planning of clone and removal operations.
//!
//! The registry has no knowledge of network semantics.  It decides *which*
//! slots a clone fills (recycled holes first, tail growth second) and whether
//! a removal physically shrinks the array or leaves a hole; the owner of the
//! object graph broadcasts the resulting plan to every stateful object.

use std::collections::HashMap;

use crate::Error;

/// The id of the variant every network starts with.  It always exists and
/// cannot be removed.
pub const INITIAL_VARIANT_ID: &str = "initial";

/// The slots a clone operation must fill, as decided by
/// [`VariantRegistry::clone_variants`].
///
/// `allocated` slots are recycled holes (or overwritten existing variants)
/// and are filled with [`allocate`][crate::variant::MultiVariantObject];
/// `extended` slots are appended at the tail with `extend`.  Both copy the
/// value at `source_index`.
#[derive(Debug, PartialEq)]
pub(crate) struct ClonePlan {
    pub(crate) source_index: usize,
    pub(crate) allocated: Vec<usize>,
    pub(crate) extended: usize,
}

/// The outcome of [`VariantRegistry::remove`]: which index died and whether
/// the dense array physically shrank.
#[derive(Debug, PartialEq)]
pub(crate) struct RemovalPlan {
    pub(crate) index: usize,
    pub(crate) tail: bool,
}

/// Tracks the set of live variant ids and maps each to a dense array index.
///
/// Indexes may be recycled after a variant is removed, so an index is not
/// stable across a variant's lifetime; only the id is.
#[derive(Debug)]
pub(crate) struct VariantRegistry {
    /// Dense slot table; `None` marks a hole left by a removed variant.
    slots: Vec<Option<String>>,
    indices: HashMap<String, usize>,
    /// Live ids in creation order, for deterministic enumeration.
    order: Vec<String>,
}

impl VariantRegistry {
    pub(crate) fn new() -> Self {
        Self {
            slots: vec![Some(INITIAL_VARIANT_ID.to_string())],
            indices: HashMap::from([(INITIAL_VARIANT_ID.to_string(), 0)]),
            order: vec![INITIAL_VARIANT_ID.to_string()],
        }
    }

    /// Returns the dense array index of the variant with the given id.
    pub(crate) fn index_of(&self, id: &str) -> Result<usize, Error> {
        self.indices
            .get(id)
            .copied()
            .ok_or_else(|| Error::not_found(format!("Variant '{}' not found.", id)))
    }

    /// Returns the id of the variant at the given index, if the slot is live.
    pub(crate) fn id_of(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|slot| slot.as_deref())
    }

    /// Live variant ids in creation order.
    pub(crate) fn variant_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    pub(crate) fn variant_count(&self) -> usize {
        self.indices.len()
    }

    /// The physical size of every per-variant array, holes included.
    pub(crate) fn array_size(&self) -> usize {
        self.slots.len()
    }

    /// Registers `targets` as clones of `source` and returns the slots the
    /// owner must fill.
    ///
    /// Holes left by removed variants are recycled before the array grows.
    /// With `may_overwrite`, a target that already exists (and is distinct
    /// from the source) keeps its index and is listed for reallocation.
    pub(crate) fn clone_variants(
        &mut self,
        source: &str,
        targets: &[&str],
        may_overwrite: bool,
    ) -> Result<ClonePlan, Error> {
        if targets.is_empty() {
            return Err(Error::invalid_argument("Empty target variant id list."));
        }
        let source_index = self.index_of(source)?;

        let mut allocated = Vec::new();
        let mut extended = 0;
        for (position, target) in targets.iter().enumerate() {
            if targets[..position].contains(target) {
                return Err(Error::duplicate_id(format!(
                    "Duplicate target variant id '{}'.",
                    target
                )));
            }
            if let Some(&existing) = self.indices.get(*target) {
                if !may_overwrite || existing == source_index {
                    return Err(Error::duplicate_id(format!(
                        "Target variant '{}' already exists.",
                        target
                    )));
                }
                allocated.push(existing);
                continue;
            }
            match self.slots.iter().position(|slot| slot.is_none()) {
                Some(hole) => {
                    self.slots[hole] = Some(target.to_string());
                    self.indices.insert(target.to_string(), hole);
                    allocated.push(hole);
                }
                None => {
                    let index = self.slots.len();
                    self.slots.push(Some(target.to_string()));
                    self.indices.insert(target.to_string(), index);
                    extended += 1;
                }
            }
            self.order.push(target.to_string());
        }

        Ok(ClonePlan {
            source_index,
            allocated,
            extended,
        })
    }

    /// Unregisters a variant.
    ///
    /// Removing the physical tail shrinks the array by exactly one slot;
    /// removing any other variant leaves a hole for the next clone to
    /// recycle.
    pub(crate) fn remove(&mut self, id: &str) -> Result<RemovalPlan, Error> {
        if id == INITIAL_VARIANT_ID {
            return Err(Error::invalid_argument(
                "Removing initial variant is forbidden.",
            ));
        }
        let index = self.index_of(id)?;
        self.indices.remove(id);
        self.order.retain(|known| known != id);

        let tail = index == self.slots.len() - 1;
        if tail {
            self.slots.pop();
        } else {
            self.slots[index] = None;
        }
        Ok(RemovalPlan { index, tail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_variant_exists() {
        let registry = VariantRegistry::new();

        assert_eq!(registry.index_of(INITIAL_VARIANT_ID), Ok(0));
        assert_eq!(registry.variant_count(), 1);
        assert_eq!(registry.array_size(), 1);
        assert_eq!(registry.variant_ids(), vec![INITIAL_VARIANT_ID]);
    }

    #[test]
    fn test_clone_extends_tail() {
        let mut registry = VariantRegistry::new();
        let plan = registry
            .clone_variants(INITIAL_VARIANT_ID, &["a", "b"], false)
            .unwrap();

        assert_eq!(
            plan,
            ClonePlan {
                source_index: 0,
                allocated: vec![],
                extended: 2,
            }
        );
        assert_eq!(registry.index_of("a"), Ok(1));
        assert_eq!(registry.index_of("b"), Ok(2));
        assert_eq!(registry.array_size(), 3);
    }

    #[test]
    fn test_clone_errors() {
        let mut registry = VariantRegistry::new();

        assert_eq!(
            registry.clone_variants(INITIAL_VARIANT_ID, &[], false),
            Err(Error::invalid_argument("Empty target variant id list."))
        );
        assert_eq!(
            registry.clone_variants("ghost", &["a"], false),
            Err(Error::not_found("Variant 'ghost' not found."))
        );
        assert_eq!(
            registry.clone_variants(INITIAL_VARIANT_ID, &["a", "a"], false),
            Err(Error::duplicate_id("Duplicate target variant id 'a'."))
        );

        registry
            .clone_variants(INITIAL_VARIANT_ID, &["a"], false)
            .unwrap();
        assert_eq!(
            registry.clone_variants(INITIAL_VARIANT_ID, &["a"], false),
            Err(Error::duplicate_id("Target variant 'a' already exists."))
        );
        // Overwriting the source itself is forbidden even with overwrite on.
        assert_eq!(
            registry.clone_variants("a", &["a"], true),
            Err(Error::duplicate_id("Target variant 'a' already exists."))
        );
    }

    #[test]
    fn test_clone_overwrite_reuses_index() {
        let mut registry = VariantRegistry::new();
        registry
            .clone_variants(INITIAL_VARIANT_ID, &["a"], false)
            .unwrap();

        let plan = registry
            .clone_variants(INITIAL_VARIANT_ID, &["a"], true)
            .unwrap();
        assert_eq!(
            plan,
            ClonePlan {
                source_index: 0,
                allocated: vec![1],
                extended: 0,
            }
        );
        assert_eq!(registry.array_size(), 2);
    }

    #[test]
    fn test_non_tail_removal_leaves_hole() {
        let mut registry = VariantRegistry::new();
        registry
            .clone_variants(INITIAL_VARIANT_ID, &["a", "b", "c", "d"], false)
            .unwrap();

        let plan = registry.remove("b").unwrap();
        assert_eq!(plan, RemovalPlan { index: 2, tail: false });
        // The array keeps its physical size; only the slot is dead.
        assert_eq!(registry.array_size(), 5);
        assert_eq!(registry.variant_count(), 4);
        assert_eq!(registry.id_of(2), None);

        // The next clone recycles the hole instead of growing.
        let plan = registry
            .clone_variants(INITIAL_VARIANT_ID, &["e"], false)
            .unwrap();
        assert_eq!(
            plan,
            ClonePlan {
                source_index: 0,
                allocated: vec![2],
                extended: 0,
            }
        );
        assert_eq!(registry.array_size(), 5);
        assert_eq!(registry.index_of("e"), Ok(2));
    }

    #[test]
    fn test_tail_removal_shrinks_array() {
        let mut registry = VariantRegistry::new();
        registry
            .clone_variants(INITIAL_VARIANT_ID, &["a", "b"], false)
            .unwrap();

        let plan = registry.remove("b").unwrap();
        assert_eq!(plan, RemovalPlan { index: 2, tail: true });
        assert_eq!(registry.array_size(), 2);
    }

    #[test]
    fn test_remove_errors() {
        let mut registry = VariantRegistry::new();

        assert_eq!(
            registry.remove(INITIAL_VARIANT_ID),
            Err(Error::invalid_argument(
                "Removing initial variant is forbidden."
            ))
        );
        assert_eq!(
            registry.remove("ghost"),
            Err(Error::not_found("Variant 'ghost' not found."))
        );
    }
}
