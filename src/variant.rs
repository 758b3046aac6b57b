// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Multi-variant state management.
//!
//! A *variant* is a named, independently mutable snapshot of every stateful
//! object's attributes.  The [`VariantManager`] wraps the
//! [registry][crate::variant::registry::VariantRegistry] with the working
//! variant pointer that all attribute reads and writes go through, either one
//! pointer shared by the whole process (the default) or one per thread
//! (opt-in, for concurrent per-variant computations).
//!
//! Variant lifecycle operations (clone, removal) live on
//! [`Network`][crate::Network], because they are broadcast to every object in
//! the arenas before they return.

pub(crate) mod array;
pub(crate) mod registry;

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use parking_lot::RwLock;

use crate::Error;

pub use registry::INITIAL_VARIANT_ID;

/// The contract between the variant registry and every object with
/// per-variant state.
///
/// Lifecycle events are broadcast synchronously to every registered object,
/// so no object is ever observed partially migrated.  A failure during
/// broadcast is a programming error, not a recoverable condition, which is
/// why these methods are infallible.
pub(crate) trait MultiVariantObject {
    /// Appends `count` variant slots, each copying the value at
    /// `source_index`.
    fn extend_variants(&mut self, count: usize, source_index: usize);

    /// Drops the last `count` variant slots.
    fn reduce_variants(&mut self, count: usize);

    /// Marks a non-tail variant slot unused.
    fn delete_variant(&mut self, index: usize);

    /// Overwrites recycled slots with copies of the value at `source_index`.
    fn allocate_variants(&mut self, indexes: &[usize], source_index: usize);
}

/// Dispatches one lifecycle event to a registered object.
pub(crate) fn broadcast(object: &mut dyn MultiVariantObject, op: &array::VariantOp<'_>) {
    match *op {
        array::VariantOp::Extend { count, source } => object.extend_variants(count, source),
        array::VariantOp::Reduce { count } => object.reduce_variants(count),
        array::VariantOp::Delete { index } => object.delete_variant(index),
        array::VariantOp::Allocate { indexes, source } => {
            object.allocate_variants(indexes, source)
        }
    }
}

/// The working variant pointer.
///
/// `Shared` is the default single-process-pointer mode; `PerThread` gives
/// every calling thread its own pointer and is what makes concurrent
/// per-variant reads safe without locking the object graph.
#[derive(Debug)]
enum WorkingVariant {
    Shared(Option<usize>),
    PerThread(HashMap<ThreadId, usize>),
}

/// The public state machine around the variant registry: working variant
/// selection and the multi-thread access toggle.
#[derive(Debug)]
pub struct VariantManager {
    registry: registry::VariantRegistry,
    working: RwLock<WorkingVariant>,
}

impl VariantManager {
    pub(crate) fn new() -> Self {
        Self {
            registry: registry::VariantRegistry::new(),
            // The initial variant starts out as the working variant.
            working: RwLock::new(WorkingVariant::Shared(Some(0))),
        }
    }

    /// Returns the id of the working variant of the calling thread.
    pub fn working_variant_id(&self) -> Result<String, Error> {
        let index = self.working_index()?;
        self.registry
            .id_of(index)
            .map(str::to_string)
            .ok_or_else(|| Error::internal(format!("No variant at index {}.", index)))
    }

    /// Returns the dense array index of the working variant of the calling
    /// thread.
    pub(crate) fn working_index(&self) -> Result<usize, Error> {
        let unset = || Error::variant_not_set("Variant index not set.");
        match &*self.working.read() {
            WorkingVariant::Shared(index) => index.ok_or_else(unset),
            WorkingVariant::PerThread(table) => {
                table.get(&thread::current().id()).copied().ok_or_else(unset)
            }
        }
    }

    /// Selects the working variant for the calling thread (or for the whole
    /// process in shared mode).
    pub fn set_working_variant(&self, id: &str) -> Result<(), Error> {
        let index = self.registry.index_of(id)?;
        match &mut *self.working.write() {
            WorkingVariant::Shared(current) => *current = Some(index),
            WorkingVariant::PerThread(table) => {
                table.insert(thread::current().id(), index);
            }
        }
        Ok(())
    }

    /// Switches between the shared working variant pointer and one pointer
    /// per thread.
    ///
    /// The calling thread's current selection carries over; other threads
    /// start unset and must call
    /// [`set_working_variant`][Self::set_working_variant] before reading.
    pub fn allow_multi_thread_access(&self, allow: bool) {
        let mut working = self.working.write();
        let carried = match &*working {
            WorkingVariant::Shared(index) => *index,
            WorkingVariant::PerThread(table) => table.get(&thread::current().id()).copied(),
        };
        *working = if allow {
            let mut table = HashMap::new();
            if let Some(index) = carried {
                table.insert(thread::current().id(), index);
            }
            WorkingVariant::PerThread(table)
        } else {
            WorkingVariant::Shared(carried)
        };
    }

    /// Whether the working variant pointer is per-thread.
    pub fn is_multi_thread_access(&self) -> bool {
        matches!(&*self.working.read(), WorkingVariant::PerThread(_))
    }

    /// Live variant ids in creation order.
    pub fn variant_ids(&self) -> Vec<String> {
        self.registry.variant_ids()
    }

    /// The number of live variants.
    pub fn variant_count(&self) -> usize {
        self.registry.variant_count()
    }

    pub(crate) fn registry(&self) -> &registry::VariantRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut registry::VariantRegistry {
        &mut self.registry
    }

    /// Clears every working pointer that refers to a removed index, so later
    /// reads fail instead of hitting a recycled slot.
    pub(crate) fn clear_pointers_to(&self, index: usize) {
        match &mut *self.working.write() {
            WorkingVariant::Shared(current) => {
                if *current == Some(index) {
                    *current = None;
                }
            }
            WorkingVariant::PerThread(table) => {
                table.retain(|_, pointed| *pointed != index);
            }
        }
    }
}
