// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains the
//! network fixtures shared by the test modules of the crate.

use crate::{
    AttachPoint, BusbarSectionSpec, DanglingLineSpec, GeneratorSpec, HvdcLinkSpec, LineSpec,
    LoadSpec, Network, SwitchKind, SwitchSpec, TopologyKind, VoltageLevelSpec,
};

/// One bus-breaker voltage level `VL1` with configured bus `B1` and load
/// `L1` (p0 = 100, q0 = 20).
pub(crate) fn single_load_network() -> Network {
    let mut network = Network::new("test");
    network
        .add_voltage_level(VoltageLevelSpec {
            id: "VL1".to_string(),
            nominal_v: 400.0,
            topology: TopologyKind::BusBreaker,
            ..Default::default()
        })
        .unwrap();
    network.add_configured_bus("VL1", "B1").unwrap();
    network
        .add_load(LoadSpec {
            id: "L1".to_string(),
            voltage_level: "VL1".to_string(),
            attachment: AttachPoint::Bus("B1".to_string()),
            p0: 100.0,
            q0: 20.0,
            ..Default::default()
        })
        .unwrap();
    network
}

/// One node-breaker voltage level `VL1`:
///
/// - node 0: busbar section `BBS`;
/// - node 1: generator `G`, joined to node 0 by closed disconnector `D1`;
/// - node 2: load `L`, joined to node 0 by open breaker `B1`.
pub(crate) fn node_breaker_network() -> Network {
    let mut network = Network::new("test");
    network
        .add_voltage_level(VoltageLevelSpec {
            id: "VL1".to_string(),
            nominal_v: 225.0,
            topology: TopologyKind::NodeBreaker,
            ..Default::default()
        })
        .unwrap();
    network
        .add_busbar_section(BusbarSectionSpec {
            id: "BBS".to_string(),
            voltage_level: "VL1".to_string(),
            node: 0,
            ..Default::default()
        })
        .unwrap();
    network
        .add_generator(GeneratorSpec {
            id: "G".to_string(),
            voltage_level: "VL1".to_string(),
            attachment: AttachPoint::Node(1),
            target_p: 50.0,
            target_v: 230.0,
            ..Default::default()
        })
        .unwrap();
    network
        .add_node_breaker_switch(
            "VL1",
            SwitchSpec {
                id: "D1".to_string(),
                kind: SwitchKind::Disconnector,
                node1: 0,
                node2: 1,
                open: false,
                retained: false,
            },
        )
        .unwrap();
    network
        .add_load(LoadSpec {
            id: "L".to_string(),
            voltage_level: "VL1".to_string(),
            attachment: AttachPoint::Node(2),
            p0: 10.0,
            q0: 1.0,
            ..Default::default()
        })
        .unwrap();
    network
        .add_node_breaker_switch(
            "VL1",
            SwitchSpec {
                id: "B1".to_string(),
                kind: SwitchKind::Breaker,
                node1: 0,
                node2: 2,
                open: true,
                retained: false,
            },
        )
        .unwrap();
    network
}

fn bus_breaker_level(network: &mut Network, level: &str, bus: &str) {
    network
        .add_voltage_level(VoltageLevelSpec {
            id: level.to_string(),
            nominal_v: 400.0,
            topology: TopologyKind::BusBreaker,
            ..Default::default()
        })
        .unwrap();
    network.add_configured_bus(level, bus).unwrap();
}

/// Two bus-breaker levels joined by line `X12`, with generator `G1` on
/// `B1` and load `L2` on `B2`.
pub(crate) fn two_level_network() -> Network {
    let mut network = Network::new("test");
    bus_breaker_level(&mut network, "VL1", "B1");
    bus_breaker_level(&mut network, "VL2", "B2");
    network
        .add_generator(GeneratorSpec {
            id: "G1".to_string(),
            voltage_level: "VL1".to_string(),
            attachment: AttachPoint::Bus("B1".to_string()),
            target_p: 100.0,
            target_v: 400.0,
            ..Default::default()
        })
        .unwrap();
    network
        .add_load(LoadSpec {
            id: "L2".to_string(),
            voltage_level: "VL2".to_string(),
            attachment: AttachPoint::Bus("B2".to_string()),
            p0: 80.0,
            q0: 10.0,
            ..Default::default()
        })
        .unwrap();
    network
        .add_line(LineSpec {
            id: "X12".to_string(),
            voltage_level1: "VL1".to_string(),
            attachment1: AttachPoint::Bus("B1".to_string()),
            voltage_level2: "VL2".to_string(),
            attachment2: AttachPoint::Bus("B2".to_string()),
            r: 0.5,
            x: 5.0,
            ..Default::default()
        })
        .unwrap();
    network
}

/// Four bus-breaker levels in a row: `VL1 --X12-- VL2 --H23-- VL3 --X34--
/// VL4`, where `H23` is an HVDC link.  One connected component, two
/// synchronous components.
pub(crate) fn hvdc_network() -> Network {
    let mut network = Network::new("test");
    for (level, bus) in [("VL1", "B1"), ("VL2", "B2"), ("VL3", "B3"), ("VL4", "B4")] {
        bus_breaker_level(&mut network, level, bus);
    }
    network
        .add_line(LineSpec {
            id: "X12".to_string(),
            voltage_level1: "VL1".to_string(),
            attachment1: AttachPoint::Bus("B1".to_string()),
            voltage_level2: "VL2".to_string(),
            attachment2: AttachPoint::Bus("B2".to_string()),
            r: 0.5,
            x: 5.0,
            ..Default::default()
        })
        .unwrap();
    network
        .add_hvdc_link(HvdcLinkSpec {
            id: "H23".to_string(),
            voltage_level1: "VL2".to_string(),
            attachment1: AttachPoint::Bus("B2".to_string()),
            voltage_level2: "VL3".to_string(),
            attachment2: AttachPoint::Bus("B3".to_string()),
            target_p: 200.0,
            ..Default::default()
        })
        .unwrap();
    network
        .add_line(LineSpec {
            id: "X34".to_string(),
            voltage_level1: "VL3".to_string(),
            attachment1: AttachPoint::Bus("B3".to_string()),
            voltage_level2: "VL4".to_string(),
            attachment2: AttachPoint::Bus("B4".to_string()),
            r: 0.5,
            x: 5.0,
            ..Default::default()
        })
        .unwrap();
    network
}

/// A single-level network carrying one dangling line, for merge tests.
/// Object ids are suffixed with the network id so two of these never
/// collide except on the dangling line id.
pub(crate) fn boundary_network(id: &str, dangling_id: &str, key: Option<&str>) -> Network {
    let mut network = Network::new(id);
    let level = format!("VL-{}", id);
    let bus = format!("B-{}", id);
    bus_breaker_level(&mut network, &level, &bus);
    network
        .add_generator(GeneratorSpec {
            id: format!("G-{}", id),
            voltage_level: level.clone(),
            attachment: AttachPoint::Bus(bus.clone()),
            target_p: 10.0,
            target_v: 400.0,
            ..Default::default()
        })
        .unwrap();
    network
        .add_dangling_line(DanglingLineSpec {
            id: dangling_id.to_string(),
            name: None,
            voltage_level: level,
            attachment: AttachPoint::Bus(bus),
            p0: 25.0,
            q0: 5.0,
            pairing_key: key.map(str::to_string),
        })
        .unwrap();
    network
}
