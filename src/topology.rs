// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Per-voltage-level topology: the raw node/switch (or bus/switch) graphs
//! and the calculated buses derived from them.
//!
//! A voltage level owns one of two raw representations:
//!
//! - *node-breaker*: integer nodes joined by switches and permanent internal
//!   connections, with equipment terminals attached to nodes;
//! - *bus-breaker*: named configured buses joined by switches, with
//!   terminals attached to buses.
//!
//! From either, two calculated views are derived lazily and cached per
//! variant: the *bus-breaker view*, where retained switches keep their
//! endpoints in distinct buses, and the *bus view*, where every closed
//! switch merges its endpoints.

pub(crate) mod bus_breaker;
pub(crate) mod cache;
pub(crate) mod node_breaker;

use std::collections::HashMap;

use crate::identifiers::{EquipmentHandle, SubstationHandle, SwitchHandle, VoltageLevelHandle};
use crate::variant::array::{VariantArray, VariantOp};
use crate::variant::MultiVariantObject;

/// The raw topology representation of a voltage level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TopologyKind {
    NodeBreaker,
    BusBreaker,
}

/// A calculated topology view.
///
/// [`TopologyView::BusBreaker`] keeps retained switches visible as edges
/// between distinct buses; [`TopologyView::Bus`] merges through every closed
/// switch.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TopologyView {
    Bus,
    BusBreaker,
}

/// The kind of a switch.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SwitchKind {
    #[default]
    Breaker,
    Disconnector,
    LoadBreakSwitch,
}

/// A switch arena entry.  Open/closed state is per-variant; the `retained`
/// flag only matters in node-breaker levels.
#[derive(Clone, Debug)]
pub(crate) struct SwitchEntry {
    pub(crate) id: String,
    pub(crate) kind: SwitchKind,
    pub(crate) retained: bool,
    pub(crate) open: VariantArray<bool>,
}

/// Descriptor for
/// [`Network::add_node_breaker_switch`][crate::Network::add_node_breaker_switch].
#[derive(Clone, Debug, Default)]
pub struct SwitchSpec {
    pub id: String,
    pub kind: SwitchKind,
    pub node1: usize,
    pub node2: usize,
    pub open: bool,
    pub retained: bool,
}

/// Descriptor for
/// [`Network::add_bus_breaker_switch`][crate::Network::add_bus_breaker_switch].
#[derive(Clone, Debug, Default)]
pub struct BusSwitchSpec {
    pub id: String,
    pub kind: SwitchKind,
    pub bus1: String,
    pub bus2: String,
    pub open: bool,
}

/// Descriptor for
/// [`Network::add_voltage_level`][crate::Network::add_voltage_level].
#[derive(Clone, Debug)]
pub struct VoltageLevelSpec {
    pub id: String,
    pub name: Option<String>,
    pub substation: Option<String>,
    pub nominal_v: f64,
    pub topology: TopologyKind,
}

impl Default for VoltageLevelSpec {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: None,
            substation: None,
            nominal_v: 0.0,
            topology: TopologyKind::NodeBreaker,
        }
    }
}

/// A voltage level arena entry.
#[derive(Debug)]
pub(crate) struct VoltageLevel {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    pub(crate) subnetwork: Option<String>,
    pub(crate) substation: Option<SubstationHandle>,
    pub(crate) nominal_v: f64,
    pub(crate) model: TopologyModel,
    /// Terminals attached to this level, as `(equipment, terminal slot)`.
    pub(crate) attachments: Vec<(EquipmentHandle, usize)>,
    pub(crate) cache: cache::TopologyCache,
}

#[derive(Debug)]
pub(crate) enum TopologyModel {
    NodeBreaker(node_breaker::NodeBreakerTopology),
    BusBreaker(bus_breaker::BusBreakerTopology),
}

impl VoltageLevel {
    pub(crate) fn kind(&self) -> TopologyKind {
        match &self.model {
            TopologyModel::NodeBreaker(_) => TopologyKind::NodeBreaker,
            TopologyModel::BusBreaker(_) => TopologyKind::BusBreaker,
        }
    }

    pub(crate) fn switch(&self, handle: SwitchHandle) -> Option<&SwitchEntry> {
        match &self.model {
            TopologyModel::NodeBreaker(topology) => topology.switch(handle),
            TopologyModel::BusBreaker(topology) => topology.switch(handle),
        }
    }

    pub(crate) fn switch_mut(&mut self, handle: SwitchHandle) -> Option<&mut SwitchEntry> {
        match &mut self.model {
            TopologyModel::NodeBreaker(topology) => topology.switch_mut(handle),
            TopologyModel::BusBreaker(topology) => topology.switch_mut(handle),
        }
    }

    fn apply(&mut self, op: &VariantOp<'_>) {
        let switches = match &mut self.model {
            TopologyModel::NodeBreaker(topology) => &mut topology.switches,
            TopologyModel::BusBreaker(topology) => &mut topology.switches,
        };
        for entry in switches.iter_mut().flatten() {
            entry.open.apply(op);
        }
        self.cache.apply(op);
    }
}

impl MultiVariantObject for VoltageLevel {
    fn extend_variants(&mut self, count: usize, source_index: usize) {
        self.apply(&VariantOp::Extend {
            count,
            source: source_index,
        });
    }

    fn reduce_variants(&mut self, count: usize) {
        self.apply(&VariantOp::Reduce { count });
    }

    fn delete_variant(&mut self, index: usize) {
        self.apply(&VariantOp::Delete { index });
    }

    fn allocate_variants(&mut self, indexes: &[usize], source_index: usize) {
        self.apply(&VariantOp::Allocate {
            indexes,
            source: source_index,
        });
    }
}

/// One calculated bus: a maximal set of nodes (or configured buses) joined
/// by closed switches and internal connections, carrying the connected
/// terminals found there.
#[derive(Clone, Debug)]
pub(crate) struct BusData {
    pub(crate) id: String,
    /// Member nodes, ascending (node-breaker levels only).
    pub(crate) nodes: Vec<usize>,
    /// Member configured bus ids (bus-breaker levels only).
    pub(crate) configured_buses: Vec<String>,
    /// Connected terminals, as `(equipment, terminal slot)`.
    pub(crate) terminals: Vec<(EquipmentHandle, usize)>,
}

/// The calculated buses of one voltage level, one view, one variant.
#[derive(Clone, Debug, Default)]
pub(crate) struct BusSet {
    pub(crate) buses: Vec<BusData>,
    /// Node number (or configured bus arena index) → bus position.
    pub(crate) point_to_bus: HashMap<usize, usize>,
    /// `(equipment arena index, terminal slot)` → bus position.
    pub(crate) terminal_to_bus: HashMap<(usize, usize), usize>,
}

impl BusSet {
    pub(crate) fn bus_of_terminal(&self, equipment: EquipmentHandle, slot: usize) -> Option<usize> {
        self.terminal_to_bus.get(&(equipment.0, slot)).copied()
    }
}

/// A handle to a calculated bus.
///
/// The handle is only valid until the owning voltage level's topology is
/// invalidated (in the handle's variant); any later read through it fails
/// with a `StaleHandle` error instead of returning stale data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BusRef {
    pub(crate) voltage_level: VoltageLevelHandle,
    pub(crate) view: TopologyView,
    pub(crate) variant: usize,
    pub(crate) stamp: u64,
    pub(crate) index: usize,
}

impl BusRef {
    /// The view this bus was calculated for.
    pub fn view(&self) -> TopologyView {
        self.view
    }
}
