// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Topology and component queries on the network, and the mutations that
//! invalidate them.
//!
//! Invalidation is eager and as narrow as the mutation allows: switch state
//! and terminal connections only dirty the mutated variant; structural
//! changes (handled in the build methods) dirty every variant.
//! Recomputation happens on the next query.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::components::{
    compute_partition, ComponentKind, ComponentRef, ComputedComponents, GlobalBus,
};
use crate::equipment::{AttachedTerminal, Attachment, KindPredicates, Side};
use crate::identifiers::{EquipmentHandle, ObjectRef, VoltageLevelHandle};
use crate::listener::AttributeValue;
use crate::topology::{BusRef, BusSet, TopologyModel, TopologyView, VoltageLevel};
use crate::traversal::{traverse_bus_breaker, traverse_node_breaker, TopologyVisitor, TraversalOrder};
use crate::{Error, Network};

impl Network {
    /// Opens or closes a switch in the working variant.
    pub fn set_switch_open(&mut self, id: &str, open: bool) -> Result<(), Error> {
        let variant = self.working_index()?;
        let (canonical, object) = self.object(id)?;
        let ObjectRef::Switch(level_handle, switch_handle) = object else {
            return Err(Error::invalid_argument(format!(
                "Object '{}' is not a switch.",
                id
            )));
        };
        let canonical = canonical.to_string();
        let level = self.voltage_level_mut(level_handle)?;
        let entry = level
            .switch_mut(switch_handle)
            .ok_or_else(|| Error::internal(format!("No switch at index {}.", switch_handle.0)))?;
        let old = *entry.open.get(variant);
        if old == open {
            return Ok(());
        }
        entry.open.set(variant, open);
        level.cache.invalidate_variant(variant);
        self.components.invalidate_variant(variant);
        self.notify_update(
            &canonical,
            "open",
            AttributeValue::Bool(old),
            AttributeValue::Bool(open),
        );
        Ok(())
    }

    /// Connects a terminal in the working variant.
    pub fn connect_terminal(&mut self, id: &str, side: Side) -> Result<(), Error> {
        self.set_terminal_connected(id, side, true)
    }

    /// Disconnects a terminal in the working variant.  The terminal stays
    /// attached to its node or bus.
    pub fn disconnect_terminal(&mut self, id: &str, side: Side) -> Result<(), Error> {
        self.set_terminal_connected(id, side, false)
    }

    fn set_terminal_connected(&mut self, id: &str, side: Side, connected: bool) -> Result<(), Error> {
        let variant = self.working_index()?;
        let (_, object) = self.object(id)?;
        let ObjectRef::Equipment(handle) = object else {
            return Err(Error::invalid_argument(format!(
                "Object '{}' has no terminals.",
                id
            )));
        };
        let entry = self.equipment_mut(handle)?;
        let canonical = entry.id.clone();
        let terminal = entry.terminal_mut(side).ok_or_else(|| {
            Error::invalid_argument(format!("Object '{}' has no side {} terminal.", id, side))
        })?;
        let old = *terminal.connected.get(variant);
        if old == connected {
            return Ok(());
        }
        terminal.connected.set(variant, connected);
        let level_handle = terminal.voltage_level;
        self.voltage_level_ref(level_handle)?
            .cache
            .invalidate_variant(variant);
        self.components.invalidate_variant(variant);
        self.notify_update(
            &canonical,
            "connected",
            AttributeValue::Bool(old),
            AttributeValue::Bool(connected),
        );
        Ok(())
    }

    /// The calculated bus a terminal belongs to, or `None` while the
    /// terminal is electrically isolated in the requested view.
    pub fn bus(&self, id: &str, side: Side, view: TopologyView) -> Result<Option<BusRef>, Error> {
        let variant = self.working_index()?;
        let (_, object) = self.object(id)?;
        let ObjectRef::Equipment(handle) = object else {
            return Err(Error::invalid_argument(format!(
                "Object '{}' has no terminals.",
                id
            )));
        };
        let entry = self.equipment_ref(handle)?;
        let terminal = entry.terminal(side).ok_or_else(|| {
            Error::invalid_argument(format!("Object '{}' has no side {} terminal.", id, side))
        })?;
        let level_handle = terminal.voltage_level;
        let slot = match side {
            Side::One => 0,
            Side::Two => 1,
        };
        let (stamp, set) = self.bus_set_for(level_handle, view, variant)?;
        Ok(set.bus_of_terminal(handle, slot).map(|index| BusRef {
            voltage_level: level_handle,
            view,
            variant,
            stamp,
            index,
        }))
    }

    /// All calculated buses of a voltage level in the requested view.
    pub fn buses(&self, voltage_level: &str, view: TopologyView) -> Result<Vec<BusRef>, Error> {
        let variant = self.working_index()?;
        let handle = self.voltage_level_handle(voltage_level)?;
        let (stamp, set) = self.bus_set_for(handle, view, variant)?;
        Ok((0..set.buses.len())
            .map(|index| BusRef {
                voltage_level: handle,
                view,
                variant,
                stamp,
                index,
            })
            .collect())
    }

    /// The id of a calculated bus.  Fails with a `StaleHandle` error if the
    /// topology was invalidated since the handle was obtained.
    pub fn bus_id(&self, bus: BusRef) -> Result<String, Error> {
        Ok(self.resolve_bus(&bus)?.buses[bus.index].id.clone())
    }

    /// The member nodes of a calculated bus (node-breaker levels).
    pub fn bus_nodes(&self, bus: BusRef) -> Result<Vec<usize>, Error> {
        Ok(self.resolve_bus(&bus)?.buses[bus.index].nodes.clone())
    }

    /// The member configured buses of a calculated bus (bus-breaker
    /// levels).
    pub fn bus_configured_buses(&self, bus: BusRef) -> Result<Vec<String>, Error> {
        Ok(self.resolve_bus(&bus)?.buses[bus.index]
            .configured_buses
            .clone())
    }

    /// The number of connected terminals on a calculated bus.
    pub fn bus_terminal_count(&self, bus: BusRef) -> Result<usize, Error> {
        Ok(self.resolve_bus(&bus)?.buses[bus.index].terminals.len())
    }

    /// The connected component of a bus-view calculated bus.
    pub fn connected_component(&self, bus: BusRef) -> Result<ComponentRef, Error> {
        self.component_of(bus, ComponentKind::Connected)
    }

    /// The synchronous component of a bus-view calculated bus.
    pub fn synchronous_component(&self, bus: BusRef) -> Result<ComponentRef, Error> {
        self.component_of(bus, ComponentKind::Synchronous)
    }

    fn component_of(&self, bus: BusRef, kind: ComponentKind) -> Result<ComponentRef, Error> {
        if bus.view != TopologyView::Bus {
            return Err(Error::invalid_argument(
                "Components are defined over bus view buses.",
            ));
        }
        self.resolve_bus(&bus)?;
        let (stamp, components) = self.components_for(bus.variant)?;
        let position = components
            .index
            .get(&(bus.voltage_level.0, bus.index))
            .copied()
            .ok_or_else(|| Error::internal("Bus missing from the component index."))?;
        let number = components.partition(kind).assignment[position];
        Ok(ComponentRef {
            kind,
            number,
            variant: bus.variant,
            stamp,
        })
    }

    /// The number of buses in a component.  Fails with a `StaleHandle`
    /// error after any connectivity mutation in the handle's variant.
    pub fn component_size(&self, component: ComponentRef) -> Result<usize, Error> {
        let components = self.resolve_components(&component)?;
        components
            .partition(component.kind)
            .sizes
            .get(component.number)
            .copied()
            .ok_or_else(|| Error::internal("Component number out of range."))
    }

    /// The number of components in the partition the handle belongs to.
    pub fn component_count(&self, component: ComponentRef) -> Result<usize, Error> {
        let components = self.resolve_components(&component)?;
        Ok(components.partition(component.kind).sizes.len())
    }

    /// The member buses of a component.
    pub fn component_buses(&self, component: ComponentRef) -> Result<Vec<BusRef>, Error> {
        let components = self.resolve_components(&component)?;
        let partition = components.partition(component.kind);
        Ok(components
            .buses
            .iter()
            .enumerate()
            .filter(|(position, _)| partition.assignment[*position] == component.number)
            .map(|(_, global)| BusRef {
                voltage_level: global.voltage_level,
                view: TopologyView::Bus,
                variant: component.variant,
                stamp: global.stamp,
                index: global.bus,
            })
            .collect())
    }

    /// Visitor traversal of a node-breaker level from `node`.
    pub fn traverse_from_node(
        &self,
        voltage_level: &str,
        node: usize,
        order: TraversalOrder,
        visitor: &mut dyn TopologyVisitor,
    ) -> Result<(), Error> {
        let variant = self.working_index()?;
        let handle = self.voltage_level_handle(voltage_level)?;
        let level = self.voltage_level_ref(handle)?;
        let TopologyModel::NodeBreaker(topology) = &level.model else {
            return Err(Error::invalid_topology(format!(
                "Voltage level '{}' is not node-breaker.",
                voltage_level
            )));
        };
        if node >= topology.node_count() {
            return Err(Error::not_found(format!(
                "Node {} not found in voltage level '{}'.",
                node, voltage_level
            )));
        }
        let flags = self.connected_terminal_flags(level, variant, topology.node_count())?;
        traverse_node_breaker(topology, variant, node, order, &flags, visitor);
        Ok(())
    }

    /// Visitor traversal of a bus-breaker level from a configured bus.
    pub fn traverse_from_bus(
        &self,
        bus_id: &str,
        order: TraversalOrder,
        visitor: &mut dyn TopologyVisitor,
    ) -> Result<(), Error> {
        let variant = self.working_index()?;
        let (_, object) = self.object(bus_id)?;
        let ObjectRef::ConfiguredBus(level_handle, bus_handle) = object else {
            return Err(Error::invalid_argument(format!(
                "Object '{}' is not a configured bus.",
                bus_id
            )));
        };
        let level = self.voltage_level_ref(level_handle)?;
        let TopologyModel::BusBreaker(topology) = &level.model else {
            return Err(Error::internal("Configured bus outside a bus-breaker level."));
        };
        let flags = self.connected_terminal_flags(level, variant, topology.buses.len())?;
        traverse_bus_breaker(topology, variant, bus_handle.0, order, &flags, visitor);
        Ok(())
    }

    /// The number of nodes of a node-breaker level.
    pub fn node_count(&self, voltage_level: &str) -> Result<usize, Error> {
        let handle = self.voltage_level_handle(voltage_level)?;
        match &self.voltage_level_ref(handle)?.model {
            TopologyModel::NodeBreaker(topology) => Ok(topology.node_count()),
            TopologyModel::BusBreaker(_) => Err(Error::invalid_topology(format!(
                "Voltage level '{}' is not node-breaker.",
                voltage_level
            ))),
        }
    }

    /// The number of internal connections of a node-breaker level.
    pub fn internal_connection_count(&self, voltage_level: &str) -> Result<usize, Error> {
        let handle = self.voltage_level_handle(voltage_level)?;
        match &self.voltage_level_ref(handle)?.model {
            TopologyModel::NodeBreaker(topology) => Ok(topology.internal_connection_count()),
            TopologyModel::BusBreaker(_) => Err(Error::invalid_topology(format!(
                "Voltage level '{}' is not node-breaker.",
                voltage_level
            ))),
        }
    }

    fn connected_terminal_flags(
        &self,
        level: &VoltageLevel,
        variant: usize,
        size: usize,
    ) -> Result<Vec<bool>, Error> {
        let mut flags = vec![false; size];
        for terminal in self.attached_terminals(level, variant)? {
            if terminal.connected && terminal.point < size {
                flags[terminal.point] = true;
            }
        }
        Ok(flags)
    }

    /// Resolves a voltage level's attachments against the equipment arena.
    fn attached_terminals(
        &self,
        level: &VoltageLevel,
        variant: usize,
    ) -> Result<Vec<AttachedTerminal>, Error> {
        let mut terminals = Vec::with_capacity(level.attachments.len());
        for &(handle, slot) in &level.attachments {
            let entry = self.equipment_ref(handle)?;
            let terminal = entry
                .terminals
                .get(slot)
                .ok_or_else(|| Error::internal(format!("No terminal slot {} on '{}'.", slot, entry.id)))?;
            let point = match terminal.attachment {
                Attachment::Node(node) => node,
                Attachment::Bus(bus) => bus.0,
            };
            terminals.push(AttachedTerminal {
                equipment: handle,
                slot,
                point,
                busbar: entry.is_busbar_section(),
                connected: *terminal.connected.get(variant),
            });
        }
        Ok(terminals)
    }

    /// The calculated buses of `(level, view, variant)`, recomputing if the
    /// cache slot is empty.
    pub(crate) fn bus_set_for(
        &self,
        handle: VoltageLevelHandle,
        view: TopologyView,
        variant: usize,
    ) -> Result<(u64, Arc<BusSet>), Error> {
        let level = self.voltage_level_ref(handle)?;
        let terminals = self.attached_terminals(level, variant)?;
        Ok(level.cache.get_or_compute(view, variant, || {
            debug!(voltage_level = %level.id, ?view, variant, "computing calculated buses");
            match &level.model {
                TopologyModel::NodeBreaker(topology) => {
                    topology.compute_buses(&level.id, view, variant, &terminals)
                }
                TopologyModel::BusBreaker(topology) => {
                    topology.compute_buses(&level.id, view, variant, &terminals)
                }
            }
        }))
    }

    fn resolve_bus(&self, bus: &BusRef) -> Result<Arc<BusSet>, Error> {
        let stale = || Error::stale_handle("Bus has been invalidated.");
        let level = self.voltage_level_ref(bus.voltage_level)?;
        if !level.cache.validate(bus.variant, bus.stamp) {
            return Err(stale());
        }
        let (stamp, set) = self.bus_set_for(bus.voltage_level, bus.view, bus.variant)?;
        if stamp != bus.stamp {
            return Err(stale());
        }
        if bus.index >= set.buses.len() {
            return Err(Error::internal("Bus index out of range for its epoch."));
        }
        Ok(set)
    }

    /// The component index of one variant, recomputing if needed.
    pub(crate) fn components_for(
        &self,
        variant: usize,
    ) -> Result<(u64, Arc<ComputedComponents>), Error> {
        // Bus sets are gathered before taking the component cache lock.
        let mut computed = if self.components.is_cached(variant) {
            None
        } else {
            debug!(variant, "indexing connected and synchronous components");
            Some(self.index_components(variant)?)
        };
        Ok(self
            .components
            .get_or_compute(variant, || computed.take().unwrap_or_default()))
    }

    fn index_components(&self, variant: usize) -> Result<ComputedComponents, Error> {
        let mut buses = Vec::new();
        let mut index = HashMap::new();
        let mut sets: HashMap<usize, Arc<BusSet>> = HashMap::new();
        for (level_index, slot) in self.voltage_levels.iter().enumerate() {
            if slot.is_none() {
                continue;
            }
            let handle = VoltageLevelHandle(level_index);
            let (stamp, set) = self.bus_set_for(handle, TopologyView::Bus, variant)?;
            for bus_index in 0..set.buses.len() {
                index.insert((level_index, bus_index), buses.len());
                buses.push(GlobalBus {
                    voltage_level: handle,
                    bus: bus_index,
                    stamp,
                });
            }
            sets.insert(level_index, set);
        }

        let mut all_edges = Vec::new();
        let mut synchronous_edges = Vec::new();
        for (equipment_index, slot) in self.equipment.iter().enumerate() {
            let Some(entry) = slot else {
                continue;
            };
            if !entry.is_branch() || entry.terminals.len() != 2 {
                continue;
            }
            let mut ends = Vec::with_capacity(2);
            for (terminal_slot, terminal) in entry.terminals.iter().enumerate() {
                if !*terminal.connected.get(variant) {
                    break;
                }
                let Some(set) = sets.get(&terminal.voltage_level.0) else {
                    break;
                };
                let Some(bus) =
                    set.bus_of_terminal(EquipmentHandle(equipment_index), terminal_slot)
                else {
                    break;
                };
                let Some(&position) = index.get(&(terminal.voltage_level.0, bus)) else {
                    break;
                };
                ends.push(position);
            }
            if ends.len() != 2 {
                continue;
            }
            all_edges.push((ends[0], ends[1]));
            if entry.joins_synchronously() {
                synchronous_edges.push((ends[0], ends[1]));
            }
        }

        let connected = compute_partition(buses.len(), all_edges);
        let synchronous = compute_partition(buses.len(), synchronous_edges);
        Ok(ComputedComponents {
            buses,
            index,
            connected,
            synchronous,
        })
    }

    fn resolve_components(
        &self,
        component: &ComponentRef,
    ) -> Result<Arc<ComputedComponents>, Error> {
        let stale = || Error::stale_handle("Component has been invalidated.");
        if !self.components.validate(component.variant, component.stamp) {
            return Err(stale());
        }
        let (stamp, components) = self.components_for(component.variant)?;
        if stamp != component.stamp {
            return Err(stale());
        }
        Ok(components)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{hvdc_network, node_breaker_network, two_level_network};
    use crate::variant::INITIAL_VARIANT_ID;
    use crate::{
        BusbarSectionSpec, Error, Network, Side, SwitchKind, SwitchSpec, TopologyKind,
        TopologyView, TraversalOrder, TraversalPoint, TraverseResult, VoltageLevelSpec,
    };

    #[test]
    fn test_open_breaker_isolates_the_load() {
        let mut network = node_breaker_network();

        let generator_bus = network.bus("G", Side::One, TopologyView::Bus).unwrap();
        assert!(generator_bus.is_some());
        assert_eq!(network.bus_id(generator_bus.unwrap()).unwrap(), "VL1_0");
        assert_eq!(
            network.bus_nodes(generator_bus.unwrap()).unwrap(),
            vec![0, 1]
        );
        // The isolated load carries a single feeder and no busbar: no bus
        // in the bus view.
        assert_eq!(network.bus("L", Side::One, TopologyView::Bus).unwrap(), None);
        // The bus-breaker view accepts any node set with a terminal.
        assert!(network
            .bus("L", Side::One, TopologyView::BusBreaker)
            .unwrap()
            .is_some());

        // Closing the breaker merges generator and load into one bus.
        network.set_switch_open("B1", false).unwrap();
        let generator_bus = network
            .bus("G", Side::One, TopologyView::Bus)
            .unwrap()
            .unwrap();
        let load_bus = network
            .bus("L", Side::One, TopologyView::Bus)
            .unwrap()
            .unwrap();
        assert_eq!(generator_bus, load_bus);
        assert_eq!(network.bus_nodes(load_bus).unwrap(), vec![0, 1, 2]);
        assert_eq!(network.bus_terminal_count(load_bus).unwrap(), 3);
    }

    #[test]
    fn test_bus_handles_go_stale_on_mutation() {
        let mut network = node_breaker_network();
        let bus = network
            .bus("G", Side::One, TopologyView::Bus)
            .unwrap()
            .unwrap();
        assert_eq!(network.bus_id(bus).unwrap(), "VL1_0");

        network.set_switch_open("B1", false).unwrap();

        assert_eq!(
            network.bus_id(bus),
            Err(Error::stale_handle("Bus has been invalidated."))
        );
        assert_eq!(
            network.bus_nodes(bus),
            Err(Error::stale_handle("Bus has been invalidated."))
        );
    }

    #[test]
    fn test_invalidation_is_per_variant() {
        let mut network = node_breaker_network();
        network.clone_variant(INITIAL_VARIANT_ID, &["a"]).unwrap();

        let initial_bus = network
            .bus("G", Side::One, TopologyView::Bus)
            .unwrap()
            .unwrap();

        // Mutating variant "a" must not invalidate the initial variant's
        // cached buses.
        network.set_working_variant("a").unwrap();
        network.set_switch_open("B1", false).unwrap();
        assert_eq!(network.bus_id(initial_bus).unwrap(), "VL1_0");
        assert_eq!(network.bus_nodes(initial_bus).unwrap(), vec![0, 1]);

        // And the two variants disagree about the load.
        assert!(network
            .bus("L", Side::One, TopologyView::Bus)
            .unwrap()
            .is_some());
        network.set_working_variant(INITIAL_VARIANT_ID).unwrap();
        assert!(network
            .bus("L", Side::One, TopologyView::Bus)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_retained_switch_stays_visible_in_bus_breaker_view() {
        let mut network = Network::new("test");
        network
            .add_voltage_level(VoltageLevelSpec {
                id: "VL1".to_string(),
                nominal_v: 400.0,
                topology: TopologyKind::NodeBreaker,
                ..Default::default()
            })
            .unwrap();
        for (id, node) in [("BBS1", 0), ("BBS2", 1)] {
            network
                .add_busbar_section(BusbarSectionSpec {
                    id: id.to_string(),
                    voltage_level: "VL1".to_string(),
                    node,
                    ..Default::default()
                })
                .unwrap();
        }
        network
            .add_node_breaker_switch(
                "VL1",
                SwitchSpec {
                    id: "COUPLER".to_string(),
                    kind: SwitchKind::Breaker,
                    node1: 0,
                    node2: 1,
                    open: false,
                    retained: true,
                },
            )
            .unwrap();

        assert_eq!(network.buses("VL1", TopologyView::Bus).unwrap().len(), 1);
        let split = network.buses("VL1", TopologyView::BusBreaker).unwrap();
        assert_eq!(split.len(), 2);
        assert_eq!(network.bus_id(split[0]).unwrap(), "VL1_0");
        assert_eq!(network.bus_id(split[1]).unwrap(), "VL1_1");

        // Opening the retained coupler splits the bus view as well.
        network.set_switch_open("COUPLER", true).unwrap();
        assert_eq!(network.buses("VL1", TopologyView::Bus).unwrap().len(), 2);
    }

    #[test]
    fn test_disconnect_removes_terminal_from_bus() {
        let mut network = two_level_network();
        assert!(network
            .bus("L2", Side::One, TopologyView::Bus)
            .unwrap()
            .is_some());

        network.disconnect_terminal("L2", Side::One).unwrap();
        assert!(network
            .bus("L2", Side::One, TopologyView::Bus)
            .unwrap()
            .is_none());
        assert!(!network.load("L2").unwrap().is_connected());

        network.connect_terminal("L2", Side::One).unwrap();
        assert!(network
            .bus("L2", Side::One, TopologyView::Bus)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_connected_components_follow_the_line() {
        let mut network = two_level_network();
        let bus1 = network
            .bus("G1", Side::One, TopologyView::Bus)
            .unwrap()
            .unwrap();
        let bus2 = network
            .bus("L2", Side::One, TopologyView::Bus)
            .unwrap()
            .unwrap();

        let component1 = network.connected_component(bus1).unwrap();
        let component2 = network.connected_component(bus2).unwrap();
        assert_eq!(component1.number(), 0);
        assert_eq!(component1.number(), component2.number());
        assert_eq!(network.component_size(component1).unwrap(), 2);
        assert_eq!(network.component_count(component1).unwrap(), 1);

        // Disconnecting one line end splits the network in two.
        network.disconnect_terminal("X12", Side::Two).unwrap();
        assert_eq!(
            network.component_size(component1),
            Err(Error::stale_handle("Component has been invalidated."))
        );
        let bus1 = network
            .bus("G1", Side::One, TopologyView::Bus)
            .unwrap()
            .unwrap();
        let component1 = network.connected_component(bus1).unwrap();
        assert_eq!(network.component_count(component1).unwrap(), 2);
        assert_eq!(network.component_size(component1).unwrap(), 1);
    }

    #[test]
    fn test_component_recomputation_is_idempotent() {
        let network = two_level_network();
        let bus = network
            .bus("G1", Side::One, TopologyView::Bus)
            .unwrap()
            .unwrap();

        let first = network.connected_component(bus).unwrap();
        let second = network.connected_component(bus).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            network.component_size(first).unwrap(),
            network.component_size(second).unwrap()
        );

        let buses = network.component_buses(first).unwrap();
        assert_eq!(buses.len(), 2);
        for member in buses {
            assert!(network.bus_id(member).is_ok());
        }
    }

    #[test]
    fn test_hvdc_joins_connected_but_not_synchronous() {
        let network = hvdc_network();
        let buses: Vec<_> = ["VL1", "VL2", "VL3", "VL4"]
            .iter()
            .map(|level| network.buses(level, TopologyView::Bus).unwrap()[0])
            .collect();

        // One connected component spanning all four buses.
        for &bus in &buses {
            let component = network.connected_component(bus).unwrap();
            assert_eq!(component.number(), 0);
            assert_eq!(network.component_size(component).unwrap(), 4);
        }

        // Two synchronous components of two buses each, split at the HVDC
        // link; the one discovered first is number 0.
        let sync: Vec<_> = buses
            .iter()
            .map(|&bus| network.synchronous_component(bus).unwrap())
            .collect();
        assert_eq!(sync[0].number(), sync[1].number());
        assert_eq!(sync[2].number(), sync[3].number());
        assert_ne!(sync[0].number(), sync[2].number());
        assert_eq!(sync[0].number(), 0);
        assert_eq!(network.component_size(sync[0]).unwrap(), 2);
        assert_eq!(network.component_count(sync[0]).unwrap(), 2);
    }

    #[test]
    fn test_components_require_bus_view_handles() {
        let network = node_breaker_network();
        let bus = network
            .bus("L", Side::One, TopologyView::BusBreaker)
            .unwrap()
            .unwrap();

        assert_eq!(
            network.connected_component(bus).err(),
            Some(Error::invalid_argument(
                "Components are defined over bus view buses."
            ))
        );
    }

    #[test]
    fn test_terminal_side_errors() {
        let network = node_breaker_network();

        assert_eq!(
            network.bus("L", Side::Two, TopologyView::Bus).err(),
            Some(Error::invalid_argument(
                "Object 'L' has no side 2 terminal."
            ))
        );
        assert_eq!(
            network.bus("VL1", Side::One, TopologyView::Bus).err(),
            Some(Error::invalid_argument("Object 'VL1' has no terminals."))
        );
    }

    #[test]
    fn test_network_traversal_offers_open_switches() {
        let network = node_breaker_network();

        struct Collector {
            points: Vec<(usize, bool)>,
            switches: Vec<(String, bool)>,
        }
        impl crate::TopologyVisitor for Collector {
            fn visit_point(
                &mut self,
                point: TraversalPoint<'_>,
                has_connected_terminal: bool,
            ) -> TraverseResult {
                let TraversalPoint::Node(node) = point else {
                    panic!()
                };
                self.points.push((node, has_connected_terminal));
                TraverseResult::Continue
            }

            fn visit_switch(&mut self, switch: &crate::SwitchInfo<'_>) -> bool {
                self.switches.push((switch.id.to_string(), switch.open));
                !switch.open
            }
        }

        let mut collector = Collector {
            points: Vec::new(),
            switches: Vec::new(),
        };
        network
            .traverse_from_node("VL1", 0, TraversalOrder::BreadthFirst, &mut collector)
            .unwrap();

        // The open breaker is offered and refused, so node 2 stays
        // unvisited; every visited node carries a connected terminal.
        assert_eq!(collector.points, vec![(0, true), (1, true)]);
        let mut switches = collector.switches.clone();
        switches.sort();
        assert_eq!(
            switches,
            vec![("B1".to_string(), true), ("D1".to_string(), false)]
        );

        assert_eq!(
            network
                .traverse_from_node("VL1", 99, TraversalOrder::DepthFirst, &mut collector)
                .err(),
            Some(Error::not_found("Node 99 not found in voltage level 'VL1'."))
        );
    }
}
