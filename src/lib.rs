// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Power Network Topology

This is a library for representing an electrical power network as a typed
object graph (substations, voltage levels, buses, switches, branches and
injections) and for answering the two questions every consumer of such a
graph keeps asking: *which objects are electrically merged into the same
bus?* and *which parts of the grid are connected together?*

## Variants

Every mutable attribute of every network object (load setpoints, switch
positions, terminal connections) is stored in a per-variant array, so a
whole scenario can be branched with [`Network::clone_variant`], switched
with [`Network::set_working_variant`] and discarded with
[`Network::remove_variant`] in O(1) per object, without copying the object
graph.  The initial variant ([`INITIAL_VARIANT_ID`]) always exists.  An
opt-in multi-thread mode
([`VariantManager::allow_multi_thread_access`]) gives every thread its own
working variant so parallel computations can read different scenarios of
one shared network.

## Topology views

Voltage levels carry either a *node-breaker* topology (integer nodes,
explicit switch objects, permanent internal connections) or a
*bus-breaker* topology (named configured buses and switches between
them).  From the raw graph two calculated views are derived lazily and
cached per variant:

- [`TopologyView::BusBreaker`]: retained switches keep their endpoints in
  distinct calculated buses;
- [`TopologyView::Bus`]: every closed switch merges its endpoints.

On top of the bus view, the network indexes *connected components* (buses
joined by any closed branch) and *synchronous components* (the same,
excluding DC-mediated links such as HVDC).  Mutations invalidate the
affected caches eagerly; recomputation happens on the next query.  Handles
([`BusRef`], [`ComponentRef`]) are stale-checked: reading through a handle
after an invalidation fails instead of returning stale data.

## Merging

[`Network::merge`] joins two single-variant networks into one root,
nesting each as a subnetwork and replacing paired dangling lines (same id
or same pairing key) with tie lines.  [`Network::detach`] is the
structural inverse and [`Network::flatten`] collapses the nesting.

## Example

```
use power_network_topology::{
    AttachPoint, LoadSpec, Network, TopologyKind, VoltageLevelSpec, INITIAL_VARIANT_ID,
};

fn main() -> Result<(), power_network_topology::Error> {
    let mut network = Network::new("sim");
    network.add_voltage_level(VoltageLevelSpec {
        id: "VL1".to_string(),
        nominal_v: 400.0,
        topology: TopologyKind::BusBreaker,
        ..Default::default()
    })?;
    network.add_configured_bus("VL1", "B1")?;
    network.add_load(LoadSpec {
        id: "L1".to_string(),
        voltage_level: "VL1".to_string(),
        attachment: AttachPoint::Bus("B1".to_string()),
        p0: 600.0,
        q0: 200.0,
        ..Default::default()
    })?;

    network.clone_variant(INITIAL_VARIANT_ID, &["contingency"])?;
    network.set_working_variant("contingency")?;
    network.set_load_p0("L1", 650.0)?;

    network.set_working_variant(INITIAL_VARIANT_ID)?;
    assert_eq!(network.load("L1")?.p0(), 600.0);
    Ok(())
}
```
*/

mod components;
mod equipment;
mod error;
mod identifiers;
mod iterators;
mod listener;
mod network;
#[cfg(test)]
mod test_utils;
mod topology;
mod traversal;
mod variant;

pub use components::{ComponentKind, ComponentRef};
pub use equipment::{
    AttachPoint, BusbarSectionSpec, DanglingLineSpec, EquipmentKind, GeneratorSpec, HvdcLinkSpec,
    LineSpec, LoadSpec, Side, TransformerSpec,
};
pub use error::Error;
pub use iterators::{EquipmentIds, Ids, SwitchIds};
pub use listener::{AttributeValue, NetworkListener};
pub use network::{
    DanglingLineView, GeneratorView, HvdcLinkView, LineView, LoadView, Network, SwitchView,
    TieLineView, TransformerView,
};
pub use topology::{
    BusRef, BusSwitchSpec, SwitchKind, SwitchSpec, TopologyKind, TopologyView, VoltageLevelSpec,
};
pub use traversal::{SwitchInfo, TopologyVisitor, TraversalOrder, TraversalPoint, TraverseResult};
pub use variant::{VariantManager, INITIAL_VARIANT_ID};
