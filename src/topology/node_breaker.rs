// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The node-breaker topology model: integer nodes joined by switches and
//! internal connections, and the traversal that groups nodes into
//! calculated buses.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::VecDeque;

use crate::equipment::AttachedTerminal;
use crate::identifiers::SwitchHandle;
use crate::topology::{BusData, BusSet, SwitchEntry, TopologyView};

/// What an edge of the raw node graph is.
///
/// Internal connections are permanent switch-less links; they keep the node
/// graph connected without introducing a manageable entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum EdgeWeight {
    Switch(SwitchHandle),
    InternalConnection,
}

/// The raw node/switch graph of one node-breaker voltage level.
///
/// Node `n` is `NodeIndex::new(n)`; nodes are created on demand and never
/// removed, so the mapping is stable.  Switch entries live in an arena so
/// that switch handles survive edge removals.
#[derive(Debug, Default)]
pub(crate) struct NodeBreakerTopology {
    pub(crate) graph: UnGraph<(), EdgeWeight>,
    pub(crate) switches: Vec<Option<SwitchEntry>>,
}

impl NodeBreakerTopology {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Makes sure nodes `0..=node` exist.
    pub(crate) fn ensure_node(&mut self, node: usize) {
        while self.graph.node_count() <= node {
            self.graph.add_node(());
        }
    }

    pub(crate) fn add_switch(
        &mut self,
        entry: SwitchEntry,
        node1: usize,
        node2: usize,
    ) -> SwitchHandle {
        self.ensure_node(node1.max(node2));
        let handle = SwitchHandle(self.switches.len());
        self.switches.push(Some(entry));
        self.graph.add_edge(
            NodeIndex::new(node1),
            NodeIndex::new(node2),
            EdgeWeight::Switch(handle),
        );
        handle
    }

    pub(crate) fn remove_switch(&mut self, handle: SwitchHandle) -> Option<SwitchEntry> {
        let entry = self.switches.get_mut(handle.0)?.take()?;
        if let Some(edge) = self
            .graph
            .edge_indices()
            .find(|&edge| self.graph[edge] == EdgeWeight::Switch(handle))
        {
            self.graph.remove_edge(edge);
        }
        Some(entry)
    }

    pub(crate) fn add_internal_connection(&mut self, node1: usize, node2: usize) {
        self.ensure_node(node1.max(node2));
        self.graph.add_edge(
            NodeIndex::new(node1),
            NodeIndex::new(node2),
            EdgeWeight::InternalConnection,
        );
    }

    pub(crate) fn internal_connection_count(&self) -> usize {
        self.graph
            .edge_references()
            .filter(|edge| *edge.weight() == EdgeWeight::InternalConnection)
            .count()
    }

    pub(crate) fn switch(&self, handle: SwitchHandle) -> Option<&SwitchEntry> {
        self.switches.get(handle.0)?.as_ref()
    }

    pub(crate) fn switch_mut(&mut self, handle: SwitchHandle) -> Option<&mut SwitchEntry> {
        self.switches.get_mut(handle.0)?.as_mut()
    }

    /// The edges incident to `node`, as `(other end, weight)`.
    pub(crate) fn incident(&self, node: usize) -> impl Iterator<Item = (usize, &EdgeWeight)> {
        let index = NodeIndex::new(node);
        self.graph.edges(index).map(move |edge| {
            let other = if edge.source() == index {
                edge.target()
            } else {
                edge.source()
            };
            (other.index(), edge.weight())
        })
    }

    /// Whether an edge joins its endpoints into the same calculated bus of
    /// the given view.
    fn merges(&self, weight: &EdgeWeight, view: TopologyView, variant: usize) -> bool {
        match weight {
            EdgeWeight::InternalConnection => true,
            EdgeWeight::Switch(handle) => match self.switch(*handle) {
                Some(entry) => {
                    !*entry.open.get(variant)
                        && (view == TopologyView::Bus || !entry.retained)
                }
                None => false,
            },
        }
    }

    /// Groups nodes into calculated buses for one view and one variant.
    ///
    /// Every maximal node set joined by merging edges becomes a candidate;
    /// a candidate only yields a bus when it satisfies the view's validity
    /// rule, so isolated terminal-less nodes never form an empty bus.
    pub(crate) fn compute_buses(
        &self,
        vl_id: &str,
        view: TopologyView,
        variant: usize,
        terminals: &[AttachedTerminal],
    ) -> BusSet {
        let mut set = BusSet::default();
        let mut visited = vec![false; self.node_count()];

        for start in 0..self.node_count() {
            if visited[start] {
                continue;
            }
            // The start node is the smallest member: anything smaller in the
            // same candidate set was already swept.
            let mut members = Vec::new();
            let mut queue = VecDeque::from([start]);
            visited[start] = true;
            while let Some(node) = queue.pop_front() {
                members.push(node);
                for (other, weight) in self.incident(node) {
                    if !visited[other] && self.merges(weight, view, variant) {
                        visited[other] = true;
                        queue.push_back(other);
                    }
                }
            }
            members.sort_unstable();

            let mut busbars = 0;
            let mut feeders = 0;
            let mut bus_terminals = Vec::new();
            for terminal in terminals {
                if !terminal.connected || !members.contains(&terminal.point) {
                    continue;
                }
                if terminal.busbar {
                    busbars += 1;
                } else {
                    feeders += 1;
                }
                bus_terminals.push((terminal.equipment, terminal.slot));
            }

            let valid = match view {
                TopologyView::Bus => busbars >= 1 || feeders >= 2,
                TopologyView::BusBreaker => busbars + feeders >= 1,
            };
            if !valid {
                continue;
            }

            let position = set.buses.len();
            for &node in &members {
                set.point_to_bus.insert(node, position);
            }
            for &(equipment, slot) in &bus_terminals {
                set.terminal_to_bus.insert((equipment.0, slot), position);
            }
            set.buses.push(BusData {
                id: format!("{}_{}", vl_id, start),
                nodes: members,
                configured_buses: Vec::new(),
                terminals: bus_terminals,
            });
        }

        set
    }
}
