// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The bus-breaker topology model: named configured buses joined by
//! switches.
//!
//! Configured buses are explicit, externally created objects, so the raw
//! bus-breaker view simply exposes them; only the bus view is calculated,
//! by merging configured buses through closed switches.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::VecDeque;

use crate::equipment::AttachedTerminal;
use crate::identifiers::{BusHandle, SwitchHandle};
use crate::topology::{BusData, BusSet, SwitchEntry, TopologyView};

/// A configured bus arena entry.
#[derive(Clone, Debug)]
pub(crate) struct ConfiguredBus {
    pub(crate) id: String,
}

/// The raw bus/switch graph of one bus-breaker voltage level.
#[derive(Debug, Default)]
pub(crate) struct BusBreakerTopology {
    graph: UnGraph<BusHandle, SwitchHandle>,
    pub(crate) buses: Vec<Option<ConfiguredBus>>,
    bus_nodes: Vec<NodeIndex>,
    pub(crate) switches: Vec<Option<SwitchEntry>>,
}

impl BusBreakerTopology {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_bus(&mut self, id: &str) -> BusHandle {
        let handle = BusHandle(self.buses.len());
        self.buses.push(Some(ConfiguredBus { id: id.to_string() }));
        self.bus_nodes.push(self.graph.add_node(handle));
        handle
    }

    pub(crate) fn bus(&self, handle: BusHandle) -> Option<&ConfiguredBus> {
        self.buses.get(handle.0)?.as_ref()
    }

    pub(crate) fn bus_count(&self) -> usize {
        self.buses.iter().flatten().count()
    }

    pub(crate) fn add_switch(
        &mut self,
        entry: SwitchEntry,
        bus1: BusHandle,
        bus2: BusHandle,
    ) -> SwitchHandle {
        let handle = SwitchHandle(self.switches.len());
        self.switches.push(Some(entry));
        self.graph
            .add_edge(self.bus_nodes[bus1.0], self.bus_nodes[bus2.0], handle);
        handle
    }

    pub(crate) fn remove_switch(&mut self, handle: SwitchHandle) -> Option<SwitchEntry> {
        let entry = self.switches.get_mut(handle.0)?.take()?;
        if let Some(edge) = self
            .graph
            .edge_indices()
            .find(|&edge| self.graph[edge] == handle)
        {
            self.graph.remove_edge(edge);
        }
        Some(entry)
    }

    pub(crate) fn switch(&self, handle: SwitchHandle) -> Option<&SwitchEntry> {
        self.switches.get(handle.0)?.as_ref()
    }

    pub(crate) fn switch_mut(&mut self, handle: SwitchHandle) -> Option<&mut SwitchEntry> {
        self.switches.get_mut(handle.0)?.as_mut()
    }

    /// The switches incident to a configured bus, as `(other bus, switch)`.
    pub(crate) fn incident(
        &self,
        bus: BusHandle,
    ) -> impl Iterator<Item = (BusHandle, SwitchHandle)> + '_ {
        let index = self.bus_nodes[bus.0];
        self.graph.edges(index).map(move |edge| {
            let other = if edge.source() == index {
                edge.target()
            } else {
                edge.source()
            };
            (self.graph[other], *edge.weight())
        })
    }

    /// Groups configured buses into calculated buses.
    ///
    /// In the bus-breaker view every configured bus stands alone; in the bus
    /// view closed switches merge them.  Either way every configured bus
    /// belongs to exactly one calculated bus: configured buses are explicit
    /// objects and never dropped for lacking terminals.
    pub(crate) fn compute_buses(
        &self,
        _vl_id: &str,
        view: TopologyView,
        variant: usize,
        terminals: &[AttachedTerminal],
    ) -> BusSet {
        let mut set = BusSet::default();
        let mut visited = vec![false; self.buses.len()];

        for start in 0..self.buses.len() {
            if visited[start] || self.buses[start].is_none() {
                continue;
            }
            let mut members = vec![start];
            visited[start] = true;
            if view == TopologyView::Bus {
                let mut queue = VecDeque::from([BusHandle(start)]);
                while let Some(bus) = queue.pop_front() {
                    for (other, switch) in self.incident(bus) {
                        let closed = self
                            .switch(switch)
                            .is_some_and(|entry| !*entry.open.get(variant));
                        if closed && !visited[other.0] {
                            visited[other.0] = true;
                            members.push(other.0);
                            queue.push_back(other);
                        }
                    }
                }
                members.sort_unstable();
            }

            let position = set.buses.len();
            let mut bus_terminals = Vec::new();
            for terminal in terminals {
                if terminal.connected && members.contains(&terminal.point) {
                    bus_terminals.push((terminal.equipment, terminal.slot));
                    set.terminal_to_bus
                        .insert((terminal.equipment.0, terminal.slot), position);
                }
            }
            for &member in &members {
                set.point_to_bus.insert(member, position);
            }
            let configured_buses: Vec<String> = members
                .iter()
                .filter_map(|&member| self.buses[member].as_ref())
                .map(|bus| bus.id.clone())
                .collect();
            set.buses.push(BusData {
                // The first member names the merged bus.
                id: configured_buses[0].clone(),
                nodes: Vec::new(),
                configured_buses,
                terminals: bus_terminals,
            });
        }

        set
    }
}
