// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The root container of the object graph.
//!
//! A [`Network`] owns the arenas every other object lives in (substations,
//! voltage levels, equipment), the identifiable store mapping external ids
//! to arena handles, the variant manager, the component index cache and the
//! registered listeners.  Mutations are methods on `Network` so that
//! listener notification and cache invalidation cannot be bypassed; reads
//! go through lightweight views and handles.

mod attributes;
mod build;
mod merge;
mod retrieval;
mod state;
mod topology;

pub use attributes::{
    DanglingLineView, GeneratorView, HvdcLinkView, LineView, LoadView, SwitchView, TieLineView,
    TransformerView,
};

use crate::components::ComponentCache;
use crate::equipment::EquipmentEntry;
use crate::identifiers::{
    EquipmentHandle, ObjectRef, ObjectStore, SubstationHandle, VoltageLevelHandle,
};
use crate::listener::{AttributeValue, NetworkListener};
use crate::topology::VoltageLevel;
use crate::variant::array::VariantOp;
use crate::variant::{broadcast, VariantManager};
use crate::Error;

/// A substation arena entry.
#[derive(Debug)]
pub(crate) struct SubstationEntry {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    pub(crate) subnetwork: Option<String>,
    pub(crate) voltage_levels: Vec<VoltageLevelHandle>,
}

/// A subnetwork record.  Subnetworks are tags over the root arenas, one
/// level deep; they come into existence through merging and disappear
/// through detach or flatten.
#[derive(Clone, Debug)]
pub(crate) struct Subnetwork {
    pub(crate) id: String,
}

/// The in-memory model of one power network.
pub struct Network {
    id: String,
    pub(crate) store: ObjectStore,
    pub(crate) substations: Vec<Option<SubstationEntry>>,
    pub(crate) voltage_levels: Vec<Option<VoltageLevel>>,
    pub(crate) equipment: Vec<Option<EquipmentEntry>>,
    pub(crate) subnetworks: Vec<Subnetwork>,
    pub(crate) variants: VariantManager,
    pub(crate) components: ComponentCache,
    listeners: Vec<Box<dyn NetworkListener>>,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("id", &self.id)
            .field("objects", &self.store.ids().count())
            .field("variants", &self.variants.variant_count())
            .finish()
    }
}

impl Network {
    /// Creates an empty network with a single `initial` variant.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            store: ObjectStore::new(),
            substations: Vec::new(),
            voltage_levels: Vec::new(),
            equipment: Vec::new(),
            subnetworks: Vec::new(),
            variants: VariantManager::new(),
            components: ComponentCache::new(1),
            listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The variant manager: working variant selection and the multi-thread
    /// access toggle.  Variant clone/removal live on the network itself
    /// because they are broadcast to every object.
    pub fn variant_manager(&self) -> &VariantManager {
        &self.variants
    }

    /// Registers a listener for object lifecycle and attribute updates.
    pub fn add_listener(&mut self, listener: Box<dyn NetworkListener>) {
        self.listeners.push(listener);
    }

    pub(crate) fn notify_creation(&self, id: &str) {
        for listener in &self.listeners {
            listener.on_creation(id);
        }
    }

    pub(crate) fn notify_removal(&self, id: &str) {
        for listener in &self.listeners {
            listener.before_removal(id);
        }
    }

    pub(crate) fn notify_update(
        &self,
        id: &str,
        attribute: &str,
        old: AttributeValue,
        new: AttributeValue,
    ) {
        for listener in &self.listeners {
            listener.on_update(id, attribute, &old, &new);
        }
    }

    /// Resolves an id or alias to its object reference.
    pub(crate) fn object(&self, id: &str) -> Result<(&str, ObjectRef), Error> {
        self.store
            .resolve(id)
            .ok_or_else(|| Error::not_found(format!("Object '{}' not found.", id)))
    }

    pub(crate) fn equipment_ref(&self, handle: EquipmentHandle) -> Result<&EquipmentEntry, Error> {
        self.equipment
            .get(handle.0)
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| Error::internal(format!("No equipment at index {}.", handle.0)))
    }

    pub(crate) fn equipment_mut(
        &mut self,
        handle: EquipmentHandle,
    ) -> Result<&mut EquipmentEntry, Error> {
        self.equipment
            .get_mut(handle.0)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| Error::internal(format!("No equipment at index {}.", handle.0)))
    }

    pub(crate) fn voltage_level_ref(
        &self,
        handle: VoltageLevelHandle,
    ) -> Result<&VoltageLevel, Error> {
        self.voltage_levels
            .get(handle.0)
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| Error::internal(format!("No voltage level at index {}.", handle.0)))
    }

    pub(crate) fn voltage_level_mut(
        &mut self,
        handle: VoltageLevelHandle,
    ) -> Result<&mut VoltageLevel, Error> {
        self.voltage_levels
            .get_mut(handle.0)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| Error::internal(format!("No voltage level at index {}.", handle.0)))
    }

    pub(crate) fn substation_mut(
        &mut self,
        handle: SubstationHandle,
    ) -> Result<&mut SubstationEntry, Error> {
        self.substations
            .get_mut(handle.0)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| Error::internal(format!("No substation at index {}.", handle.0)))
    }

    /// Broadcasts one variant lifecycle event to every stateful object and
    /// cache, synchronously, in arena order.
    pub(crate) fn apply_variant_op(&mut self, op: &VariantOp<'_>) {
        for entry in self.equipment.iter_mut().flatten() {
            broadcast(entry, op);
        }
        for level in self.voltage_levels.iter_mut().flatten() {
            broadcast(level, op);
        }
        self.components.apply(op);
    }

    /// The physical per-variant array size new objects must be created
    /// with.
    pub(crate) fn variant_array_size(&self) -> usize {
        self.variants.registry().array_size()
    }
}
