// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Visitor-driven traversal of raw voltage level topology.
//!
//! Unlike the calculated-bus computation, which always walks closed
//! switches in one fixed order, this traversal hands every decision to the
//! caller: the visitor chooses whether to cross each switch (open ones are
//! offered too) and can prune a path or stop the whole traversal.  The
//! visit order is a public choice; depth-first and breadth-first observably
//! differ whenever the graph has diamonds.

use std::collections::VecDeque;

use crate::topology::bus_breaker::BusBreakerTopology;
use crate::topology::node_breaker::{EdgeWeight, NodeBreakerTopology};
use crate::topology::SwitchKind;

/// The visit order of a traversal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TraversalOrder {
    DepthFirst,
    BreadthFirst,
}

/// What the traverser should do after visiting a node or bus.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TraverseResult {
    /// Keep going through this point's edges.
    Continue,
    /// Do not expand this point, but keep traversing other paths.
    TerminatePath,
    /// Stop the whole traversal.
    TerminateTraverser,
}

/// A switch offered to [`TopologyVisitor::visit_switch`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchInfo<'a> {
    pub id: &'a str,
    pub kind: SwitchKind,
    /// Open/closed state in the traversed variant.  The visitor decides
    /// whether an open switch is crossed.
    pub open: bool,
    pub retained: bool,
}

/// A point visited during traversal: an integer node (node-breaker levels)
/// or a configured bus (bus-breaker levels).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraversalPoint<'a> {
    Node(usize),
    Bus(&'a str),
}

/// The caller-supplied visitor contract.
pub trait TopologyVisitor {
    /// Called once per reached point, with whether any connected terminal
    /// is attached there.
    fn visit_point(
        &mut self,
        point: TraversalPoint<'_>,
        has_connected_terminal: bool,
    ) -> TraverseResult;

    /// Whether to continue through this switch.  Internal connections are
    /// not switches and are always followed.
    fn visit_switch(&mut self, switch: &SwitchInfo<'_>) -> bool {
        let _ = switch;
        true
    }
}

/// A worklist that is a stack or a queue depending on the chosen order.
struct Worklist {
    order: TraversalOrder,
    items: VecDeque<usize>,
}

impl Worklist {
    fn new(order: TraversalOrder, start: usize) -> Self {
        Self {
            order,
            items: VecDeque::from([start]),
        }
    }

    fn push(&mut self, item: usize) {
        self.items.push_back(item);
    }

    fn pop(&mut self) -> Option<usize> {
        match self.order {
            TraversalOrder::DepthFirst => self.items.pop_back(),
            TraversalOrder::BreadthFirst => self.items.pop_front(),
        }
    }
}

/// Traverses a node-breaker topology from `start`.
///
/// `has_terminal[n]` tells whether node `n` carries a connected terminal in
/// the traversed variant.
pub(crate) fn traverse_node_breaker(
    topology: &NodeBreakerTopology,
    variant: usize,
    start: usize,
    order: TraversalOrder,
    has_terminal: &[bool],
    visitor: &mut dyn TopologyVisitor,
) {
    let mut visited = vec![false; topology.node_count()];
    let mut worklist = Worklist::new(order, start);
    visited[start] = true;

    while let Some(node) = worklist.pop() {
        let connected = has_terminal.get(node).copied().unwrap_or(false);
        match visitor.visit_point(TraversalPoint::Node(node), connected) {
            TraverseResult::Continue => {}
            TraverseResult::TerminatePath => continue,
            TraverseResult::TerminateTraverser => return,
        }
        for (other, weight) in topology.incident(node) {
            if visited[other] {
                continue;
            }
            let crossed = match weight {
                EdgeWeight::InternalConnection => true,
                EdgeWeight::Switch(handle) => topology.switch(*handle).is_some_and(|entry| {
                    visitor.visit_switch(&SwitchInfo {
                        id: &entry.id,
                        kind: entry.kind,
                        open: *entry.open.get(variant),
                        retained: entry.retained,
                    })
                }),
            };
            if crossed {
                visited[other] = true;
                worklist.push(other);
            }
        }
    }
}

/// Traverses a bus-breaker topology from the configured bus at arena index
/// `start`.
pub(crate) fn traverse_bus_breaker(
    topology: &BusBreakerTopology,
    variant: usize,
    start: usize,
    order: TraversalOrder,
    has_terminal: &[bool],
    visitor: &mut dyn TopologyVisitor,
) {
    let mut visited = vec![false; topology.buses.len()];
    let mut worklist = Worklist::new(order, start);
    visited[start] = true;

    while let Some(index) = worklist.pop() {
        let Some(bus) = topology.buses[index].as_ref() else {
            continue;
        };
        let connected = has_terminal.get(index).copied().unwrap_or(false);
        match visitor.visit_point(TraversalPoint::Bus(&bus.id), connected) {
            TraverseResult::Continue => {}
            TraverseResult::TerminatePath => continue,
            TraverseResult::TerminateTraverser => return,
        }
        for (other, switch) in topology.incident(crate::identifiers::BusHandle(index)) {
            if visited[other.0] {
                continue;
            }
            let crossed = topology.switch(switch).is_some_and(|entry| {
                visitor.visit_switch(&SwitchInfo {
                    id: &entry.id,
                    kind: entry.kind,
                    open: *entry.open.get(variant),
                    retained: entry.retained,
                })
            });
            if crossed {
                visited[other.0] = true;
                worklist.push(other.0);
            }
        }
    }
}
