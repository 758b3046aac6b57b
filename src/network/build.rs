// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for building up and tearing down the object graph: substations,
//! voltage levels, topology primitives and equipment.
//!
//! Everything here follows the same sequence: validate, register the id,
//! mutate the arenas, invalidate the affected caches, notify listeners.
//! Registration happens against a predicted arena handle so a duplicate id
//! fails before anything is mutated.

use crate::equipment::{
    AttachPoint, Attachment, BusbarSectionSpec, DanglingLineSpec, EquipmentAttrs, EquipmentEntry,
    GeneratorSpec, HvdcLinkSpec, LineSpec, LoadSpec, TerminalData, TransformerSpec,
};
use crate::identifiers::{
    BusHandle, EquipmentHandle, ObjectRef, SubstationHandle, SwitchHandle, VoltageLevelHandle,
};
use crate::network::SubstationEntry;
use crate::topology::bus_breaker::BusBreakerTopology;
use crate::topology::cache::TopologyCache;
use crate::topology::node_breaker::NodeBreakerTopology;
use crate::topology::{
    BusSwitchSpec, SwitchEntry, SwitchSpec, TopologyKind, TopologyModel, VoltageLevel,
    VoltageLevelSpec,
};
use crate::variant::array::VariantArray;
use crate::{Error, Network};

impl Network {
    pub fn add_substation(&mut self, id: &str) -> Result<(), Error> {
        let handle = SubstationHandle(self.substations.len());
        self.store.register(id, ObjectRef::Substation(handle))?;
        self.substations.push(Some(SubstationEntry {
            id: id.to_string(),
            name: None,
            subnetwork: None,
            voltage_levels: Vec::new(),
        }));
        self.notify_creation(id);
        Ok(())
    }

    pub fn add_voltage_level(&mut self, spec: VoltageLevelSpec) -> Result<(), Error> {
        let substation = match &spec.substation {
            Some(substation_id) => {
                let (_, object) = self.object(substation_id)?;
                let ObjectRef::Substation(handle) = object else {
                    return Err(Error::invalid_argument(format!(
                        "Object '{}' is not a substation.",
                        substation_id
                    )));
                };
                Some(handle)
            }
            None => None,
        };
        let subnetwork = match substation {
            Some(handle) => self
                .substations
                .get(handle.0)
                .and_then(|slot| slot.as_ref())
                .and_then(|entry| entry.subnetwork.clone()),
            None => None,
        };

        let handle = VoltageLevelHandle(self.voltage_levels.len());
        self.store.register(&spec.id, ObjectRef::VoltageLevel(handle))?;
        let model = match spec.topology {
            TopologyKind::NodeBreaker => TopologyModel::NodeBreaker(NodeBreakerTopology::new()),
            TopologyKind::BusBreaker => TopologyModel::BusBreaker(BusBreakerTopology::new()),
        };
        let cache = TopologyCache::new(self.variant_array_size());
        self.voltage_levels.push(Some(VoltageLevel {
            id: spec.id.clone(),
            name: spec.name,
            subnetwork,
            substation,
            nominal_v: spec.nominal_v,
            model,
            attachments: Vec::new(),
            cache,
        }));
        if let Some(substation) = substation {
            self.substation_mut(substation)?.voltage_levels.push(handle);
        }
        self.notify_creation(&spec.id);
        Ok(())
    }

    pub fn add_configured_bus(&mut self, voltage_level: &str, id: &str) -> Result<(), Error> {
        let handle = self.voltage_level_handle(voltage_level)?;
        let level = self.voltage_level_ref(handle)?;
        let TopologyModel::BusBreaker(topology) = &level.model else {
            return Err(Error::invalid_topology(format!(
                "Voltage level '{}' is not bus-breaker.",
                voltage_level
            )));
        };
        let predicted = BusHandle(topology.buses.len());
        self.store
            .register(id, ObjectRef::ConfiguredBus(handle, predicted))?;

        let level = self.voltage_level_mut(handle)?;
        let TopologyModel::BusBreaker(topology) = &mut level.model else {
            return Err(Error::internal("Topology model changed under us."));
        };
        topology.add_bus(id);
        level.cache.invalidate_all();
        self.components.invalidate_all();
        self.notify_creation(id);
        Ok(())
    }

    pub fn add_node_breaker_switch(
        &mut self,
        voltage_level: &str,
        spec: SwitchSpec,
    ) -> Result<(), Error> {
        if spec.node1 == spec.node2 {
            return Err(Error::invalid_argument(format!(
                "Switch '{}' cannot connect a node to itself.",
                spec.id
            )));
        }
        let handle = self.voltage_level_handle(voltage_level)?;
        let level = self.voltage_level_ref(handle)?;
        let TopologyModel::NodeBreaker(topology) = &level.model else {
            return Err(Error::invalid_topology(format!(
                "Voltage level '{}' is not node-breaker.",
                voltage_level
            )));
        };
        let predicted = SwitchHandle(topology.switches.len());
        self.store
            .register(&spec.id, ObjectRef::Switch(handle, predicted))?;

        let entry = SwitchEntry {
            id: spec.id.clone(),
            kind: spec.kind,
            retained: spec.retained,
            open: VariantArray::new(self.variant_array_size(), spec.open),
        };
        let level = self.voltage_level_mut(handle)?;
        let TopologyModel::NodeBreaker(topology) = &mut level.model else {
            return Err(Error::internal("Topology model changed under us."));
        };
        topology.add_switch(entry, spec.node1, spec.node2);
        level.cache.invalidate_all();
        self.components.invalidate_all();
        self.notify_creation(&spec.id);
        Ok(())
    }

    pub fn add_bus_breaker_switch(
        &mut self,
        voltage_level: &str,
        spec: BusSwitchSpec,
    ) -> Result<(), Error> {
        let handle = self.voltage_level_handle(voltage_level)?;
        let bus1 = self.configured_bus_handle(handle, voltage_level, &spec.bus1)?;
        let bus2 = self.configured_bus_handle(handle, voltage_level, &spec.bus2)?;
        if bus1 == bus2 {
            return Err(Error::invalid_argument(format!(
                "Switch '{}' cannot connect a bus to itself.",
                spec.id
            )));
        }
        let level = self.voltage_level_ref(handle)?;
        let TopologyModel::BusBreaker(topology) = &level.model else {
            return Err(Error::internal("Configured buses outside a bus-breaker level."));
        };
        let predicted = SwitchHandle(topology.switches.len());
        self.store
            .register(&spec.id, ObjectRef::Switch(handle, predicted))?;

        let entry = SwitchEntry {
            id: spec.id.clone(),
            kind: spec.kind,
            retained: false,
            open: VariantArray::new(self.variant_array_size(), spec.open),
        };
        let level = self.voltage_level_mut(handle)?;
        let TopologyModel::BusBreaker(topology) = &mut level.model else {
            return Err(Error::internal("Topology model changed under us."));
        };
        topology.add_switch(entry, bus1, bus2);
        level.cache.invalidate_all();
        self.components.invalidate_all();
        self.notify_creation(&spec.id);
        Ok(())
    }

    /// Adds a permanent switch-less link between two nodes of a
    /// node-breaker level.
    pub fn add_internal_connection(
        &mut self,
        voltage_level: &str,
        node1: usize,
        node2: usize,
    ) -> Result<(), Error> {
        if node1 == node2 {
            return Err(Error::invalid_argument(
                "An internal connection cannot connect a node to itself.",
            ));
        }
        let handle = self.voltage_level_handle(voltage_level)?;
        let level = self.voltage_level_mut(handle)?;
        let TopologyModel::NodeBreaker(topology) = &mut level.model else {
            return Err(Error::invalid_topology(format!(
                "Voltage level '{}' is not node-breaker.",
                voltage_level
            )));
        };
        topology.add_internal_connection(node1, node2);
        level.cache.invalidate_all();
        self.components.invalidate_all();
        Ok(())
    }

    pub fn add_load(&mut self, spec: LoadSpec) -> Result<(), Error> {
        let terminal = self.attachment(&spec.id, &spec.voltage_level, &spec.attachment)?;
        let size = self.variant_array_size();
        self.insert_equipment(
            &spec.id,
            spec.name,
            vec![terminal],
            EquipmentAttrs::Load {
                p0: VariantArray::new(size, spec.p0),
                q0: VariantArray::new(size, spec.q0),
            },
        )
    }

    pub fn add_generator(&mut self, spec: GeneratorSpec) -> Result<(), Error> {
        let terminal = self.attachment(&spec.id, &spec.voltage_level, &spec.attachment)?;
        let size = self.variant_array_size();
        self.insert_equipment(
            &spec.id,
            spec.name,
            vec![terminal],
            EquipmentAttrs::Generator {
                target_p: VariantArray::new(size, spec.target_p),
                target_v: VariantArray::new(size, spec.target_v),
            },
        )
    }

    pub fn add_busbar_section(&mut self, spec: BusbarSectionSpec) -> Result<(), Error> {
        let handle = self.voltage_level_handle(&spec.voltage_level)?;
        if self.voltage_level_ref(handle)?.kind() != TopologyKind::NodeBreaker {
            return Err(Error::invalid_topology(
                "Busbar sections only exist in node-breaker voltage levels.",
            ));
        }
        let terminal = self.attachment(
            &spec.id,
            &spec.voltage_level,
            &AttachPoint::Node(spec.node),
        )?;
        self.insert_equipment(
            &spec.id,
            spec.name,
            vec![terminal],
            EquipmentAttrs::BusbarSection,
        )
    }

    pub fn add_dangling_line(&mut self, spec: DanglingLineSpec) -> Result<(), Error> {
        let terminal = self.attachment(&spec.id, &spec.voltage_level, &spec.attachment)?;
        let size = self.variant_array_size();
        self.insert_equipment(
            &spec.id,
            spec.name,
            vec![terminal],
            EquipmentAttrs::DanglingLine {
                p0: VariantArray::new(size, spec.p0),
                q0: VariantArray::new(size, spec.q0),
                pairing_key: spec.pairing_key,
            },
        )
    }

    pub fn add_line(&mut self, spec: LineSpec) -> Result<(), Error> {
        let terminal1 = self.attachment(&spec.id, &spec.voltage_level1, &spec.attachment1)?;
        let terminal2 = self.attachment(&spec.id, &spec.voltage_level2, &spec.attachment2)?;
        self.check_same_subnetwork(&spec.id, terminal1.0, terminal2.0)?;
        self.insert_equipment(
            &spec.id,
            spec.name,
            vec![terminal1, terminal2],
            EquipmentAttrs::Line {
                r: spec.r,
                x: spec.x,
            },
        )
    }

    pub fn add_transformer(&mut self, spec: TransformerSpec) -> Result<(), Error> {
        let terminal1 = self.attachment(&spec.id, &spec.voltage_level1, &spec.attachment1)?;
        let terminal2 = self.attachment(&spec.id, &spec.voltage_level2, &spec.attachment2)?;
        let substation1 = self.voltage_level_ref(terminal1.0)?.substation;
        let substation2 = self.voltage_level_ref(terminal2.0)?.substation;
        if substation1.is_none() || substation1 != substation2 {
            return Err(Error::invalid_topology(format!(
                "Transformer '{}' endpoints must be in voltage levels of the same substation.",
                spec.id
            )));
        }
        self.insert_equipment(
            &spec.id,
            spec.name,
            vec![terminal1, terminal2],
            EquipmentAttrs::Transformer {
                r: spec.r,
                x: spec.x,
                ratio: spec.ratio,
            },
        )
    }

    pub fn add_hvdc_link(&mut self, spec: HvdcLinkSpec) -> Result<(), Error> {
        let terminal1 = self.attachment(&spec.id, &spec.voltage_level1, &spec.attachment1)?;
        let terminal2 = self.attachment(&spec.id, &spec.voltage_level2, &spec.attachment2)?;
        self.check_same_subnetwork(&spec.id, terminal1.0, terminal2.0)?;
        let size = self.variant_array_size();
        self.insert_equipment(
            &spec.id,
            spec.name,
            vec![terminal1, terminal2],
            EquipmentAttrs::HvdcLink {
                target_p: VariantArray::new(size, spec.target_p),
            },
        )
    }

    /// Removes a piece of equipment.  Listeners see it while it is still
    /// fully readable.
    pub fn remove_equipment(&mut self, id: &str) -> Result<(), Error> {
        let (canonical, object) = self.object(id)?;
        let ObjectRef::Equipment(handle) = object else {
            return Err(Error::invalid_argument(format!(
                "Object '{}' is not equipment.",
                id
            )));
        };
        let canonical = canonical.to_string();
        self.notify_removal(&canonical);
        self.store.unregister(&canonical);
        let entry = self
            .equipment
            .get_mut(handle.0)
            .and_then(Option::take)
            .ok_or_else(|| Error::internal(format!("No equipment at index {}.", handle.0)))?;
        for (slot, terminal) in entry.terminals.iter().enumerate() {
            let level = self.voltage_level_mut(terminal.voltage_level)?;
            level
                .attachments
                .retain(|&(attached, attached_slot)| !(attached == handle && attached_slot == slot));
            level.cache.invalidate_all();
        }
        self.components.invalidate_all();
        Ok(())
    }

    pub fn remove_switch(&mut self, id: &str) -> Result<(), Error> {
        let (canonical, object) = self.object(id)?;
        let ObjectRef::Switch(level_handle, switch_handle) = object else {
            return Err(Error::invalid_argument(format!(
                "Object '{}' is not a switch.",
                id
            )));
        };
        let canonical = canonical.to_string();
        self.notify_removal(&canonical);
        self.store.unregister(&canonical);
        let level = self.voltage_level_mut(level_handle)?;
        match &mut level.model {
            TopologyModel::NodeBreaker(topology) => topology.remove_switch(switch_handle),
            TopologyModel::BusBreaker(topology) => topology.remove_switch(switch_handle),
        };
        level.cache.invalidate_all();
        self.components.invalidate_all();
        Ok(())
    }

    pub(crate) fn voltage_level_handle(&self, id: &str) -> Result<VoltageLevelHandle, Error> {
        let (_, object) = self.object(id)?;
        match object {
            ObjectRef::VoltageLevel(handle) => Ok(handle),
            _ => Err(Error::invalid_argument(format!(
                "Object '{}' is not a voltage level.",
                id
            ))),
        }
    }

    fn configured_bus_handle(
        &self,
        level: VoltageLevelHandle,
        level_id: &str,
        bus_id: &str,
    ) -> Result<BusHandle, Error> {
        let (_, object) = self.object(bus_id)?;
        match object {
            ObjectRef::ConfiguredBus(owner, handle) if owner == level => Ok(handle),
            ObjectRef::ConfiguredBus(..) => Err(Error::invalid_topology(format!(
                "Configured bus '{}' is not in voltage level '{}'.",
                bus_id, level_id
            ))),
            _ => Err(Error::invalid_argument(format!(
                "Object '{}' is not a configured bus.",
                bus_id
            ))),
        }
    }

    /// Resolves a public attachment descriptor against a voltage level,
    /// enforcing that nodes go with node-breaker levels and configured
    /// buses with bus-breaker levels.
    fn attachment(
        &self,
        equipment_id: &str,
        level_id: &str,
        point: &AttachPoint,
    ) -> Result<(VoltageLevelHandle, Attachment), Error> {
        let handle = self.voltage_level_handle(level_id)?;
        let level = self.voltage_level_ref(handle)?;
        match (&level.model, point) {
            (TopologyModel::NodeBreaker(_), AttachPoint::Node(node)) => {
                Ok((handle, Attachment::Node(*node)))
            }
            (TopologyModel::BusBreaker(_), AttachPoint::Bus(bus_id)) => {
                let bus = self.configured_bus_handle(handle, level_id, bus_id)?;
                Ok((handle, Attachment::Bus(bus)))
            }
            (TopologyModel::NodeBreaker(_), AttachPoint::Bus(_)) => {
                Err(Error::invalid_topology(format!(
                    "Terminal of '{}' must attach to a node: voltage level '{}' is node-breaker.",
                    equipment_id, level_id
                )))
            }
            (TopologyModel::BusBreaker(_), AttachPoint::Node(_)) => {
                Err(Error::invalid_topology(format!(
                    "Terminal of '{}' must attach to a configured bus: voltage level '{}' is bus-breaker.",
                    equipment_id, level_id
                )))
            }
        }
    }

    fn check_same_subnetwork(
        &self,
        id: &str,
        level1: VoltageLevelHandle,
        level2: VoltageLevelHandle,
    ) -> Result<(), Error> {
        let subnetwork1 = &self.voltage_level_ref(level1)?.subnetwork;
        let subnetwork2 = &self.voltage_level_ref(level2)?.subnetwork;
        if subnetwork1 != subnetwork2 {
            return Err(Error::invalid_topology(format!(
                "Branch '{}' would span subnetworks.",
                id
            )));
        }
        Ok(())
    }

    /// Registers and inserts an equipment entry, wires its terminals into
    /// the owning voltage levels, and invalidates every touched cache.
    fn insert_equipment(
        &mut self,
        id: &str,
        name: Option<String>,
        terminals: Vec<(VoltageLevelHandle, Attachment)>,
        attrs: EquipmentAttrs,
    ) -> Result<(), Error> {
        let size = self.variant_array_size();
        let handle = EquipmentHandle(self.equipment.len());
        self.store.register(id, ObjectRef::Equipment(handle))?;

        let subnetwork = terminals
            .first()
            .map(|(level, _)| self.voltage_level_ref(*level))
            .transpose()?
            .and_then(|level| level.subnetwork.clone());
        let terminal_data: Vec<TerminalData> = terminals
            .iter()
            .map(|(level, attachment)| TerminalData {
                voltage_level: *level,
                attachment: *attachment,
                connected: VariantArray::new(size, true),
            })
            .collect();
        self.equipment.push(Some(EquipmentEntry {
            id: id.to_string(),
            name,
            subnetwork,
            terminals: terminal_data,
            attrs,
        }));

        for (slot, (level_handle, attachment)) in terminals.iter().enumerate() {
            let level = self.voltage_level_mut(*level_handle)?;
            level.attachments.push((handle, slot));
            if let (TopologyModel::NodeBreaker(topology), Attachment::Node(node)) =
                (&mut level.model, attachment)
            {
                topology.ensure_node(*node);
            }
            level.cache.invalidate_all();
        }
        self.components.invalidate_all();
        self.notify_creation(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        AttachPoint, BusSwitchSpec, Error, LineSpec, LoadSpec, Network, SwitchSpec, TopologyKind,
        TransformerSpec, VoltageLevelSpec,
    };

    fn bus_breaker_level(network: &mut Network, id: &str, bus: &str) {
        network
            .add_voltage_level(VoltageLevelSpec {
                id: id.to_string(),
                nominal_v: 400.0,
                topology: TopologyKind::BusBreaker,
                ..Default::default()
            })
            .unwrap();
        network.add_configured_bus(id, bus).unwrap();
    }

    #[test]
    fn test_duplicate_id_rejected_everywhere() {
        let mut network = Network::new("n");
        bus_breaker_level(&mut network, "VL1", "B1");

        assert_eq!(
            network.add_configured_bus("VL1", "VL1"),
            Err(Error::duplicate_id("Object with id 'VL1' already exists."))
        );
        assert_eq!(
            network.add_load(LoadSpec {
                id: "B1".to_string(),
                voltage_level: "VL1".to_string(),
                attachment: AttachPoint::Bus("B1".to_string()),
                ..Default::default()
            }),
            Err(Error::duplicate_id("Object with id 'B1' already exists."))
        );
    }

    #[test]
    fn test_attachment_must_match_topology_kind() {
        let mut network = Network::new("n");
        bus_breaker_level(&mut network, "VL1", "B1");
        network
            .add_voltage_level(VoltageLevelSpec {
                id: "VL2".to_string(),
                nominal_v: 225.0,
                topology: TopologyKind::NodeBreaker,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            network.add_load(LoadSpec {
                id: "L1".to_string(),
                voltage_level: "VL1".to_string(),
                attachment: AttachPoint::Node(0),
                ..Default::default()
            }),
            Err(Error::invalid_topology(
                "Terminal of 'L1' must attach to a configured bus: voltage level 'VL1' is bus-breaker."
            ))
        );
        assert_eq!(
            network.add_load(LoadSpec {
                id: "L1".to_string(),
                voltage_level: "VL2".to_string(),
                attachment: AttachPoint::Bus("B1".to_string()),
                ..Default::default()
            }),
            Err(Error::invalid_topology(
                "Terminal of 'L1' must attach to a node: voltage level 'VL2' is node-breaker."
            ))
        );
        assert_eq!(
            network.add_configured_bus("VL2", "B2"),
            Err(Error::invalid_topology(
                "Voltage level 'VL2' is not bus-breaker."
            ))
        );
        assert_eq!(
            network.add_node_breaker_switch(
                "VL1",
                SwitchSpec {
                    id: "SW".to_string(),
                    node1: 0,
                    node2: 1,
                    ..Default::default()
                }
            ),
            Err(Error::invalid_topology(
                "Voltage level 'VL1' is not node-breaker."
            ))
        );
    }

    #[test]
    fn test_switch_self_loops_rejected() {
        let mut network = Network::new("n");
        bus_breaker_level(&mut network, "VL1", "B1");
        network
            .add_voltage_level(VoltageLevelSpec {
                id: "VL2".to_string(),
                topology: TopologyKind::NodeBreaker,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            network.add_node_breaker_switch(
                "VL2",
                SwitchSpec {
                    id: "SW".to_string(),
                    node1: 3,
                    node2: 3,
                    ..Default::default()
                }
            ),
            Err(Error::invalid_argument(
                "Switch 'SW' cannot connect a node to itself."
            ))
        );
        assert_eq!(
            network.add_bus_breaker_switch(
                "VL1",
                BusSwitchSpec {
                    id: "SW".to_string(),
                    bus1: "B1".to_string(),
                    bus2: "B1".to_string(),
                    ..Default::default()
                }
            ),
            Err(Error::invalid_argument(
                "Switch 'SW' cannot connect a bus to itself."
            ))
        );
    }

    #[test]
    fn test_transformer_requires_one_substation() {
        let mut network = Network::new("n");
        network.add_substation("S1").unwrap();
        network.add_substation("S2").unwrap();
        for (level, substation, bus) in [("VL1", "S1", "B1"), ("VL2", "S2", "B2")] {
            network
                .add_voltage_level(VoltageLevelSpec {
                    id: level.to_string(),
                    substation: Some(substation.to_string()),
                    topology: TopologyKind::BusBreaker,
                    ..Default::default()
                })
                .unwrap();
            network.add_configured_bus(level, bus).unwrap();
        }

        assert_eq!(
            network.add_transformer(TransformerSpec {
                id: "T1".to_string(),
                voltage_level1: "VL1".to_string(),
                attachment1: AttachPoint::Bus("B1".to_string()),
                voltage_level2: "VL2".to_string(),
                attachment2: AttachPoint::Bus("B2".to_string()),
                ratio: 1.0,
                ..Default::default()
            }),
            Err(Error::invalid_topology(
                "Transformer 'T1' endpoints must be in voltage levels of the same substation."
            ))
        );

        // A line between the two substations is fine.
        assert!(network
            .add_line(LineSpec {
                id: "X1".to_string(),
                voltage_level1: "VL1".to_string(),
                attachment1: AttachPoint::Bus("B1".to_string()),
                voltage_level2: "VL2".to_string(),
                attachment2: AttachPoint::Bus("B2".to_string()),
                ..Default::default()
            })
            .is_ok());
    }

    #[test]
    fn test_remove_equipment_and_switch() {
        let mut network = Network::new("n");
        bus_breaker_level(&mut network, "VL1", "B1");
        network.add_configured_bus("VL1", "B2").unwrap();
        network
            .add_bus_breaker_switch(
                "VL1",
                BusSwitchSpec {
                    id: "SW".to_string(),
                    bus1: "B1".to_string(),
                    bus2: "B2".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        network
            .add_load(LoadSpec {
                id: "L1".to_string(),
                voltage_level: "VL1".to_string(),
                attachment: AttachPoint::Bus("B1".to_string()),
                ..Default::default()
            })
            .unwrap();

        network.remove_equipment("L1").unwrap();
        assert!(!network.contains("L1"));
        assert_eq!(
            network.remove_equipment("L1"),
            Err(Error::not_found("Object 'L1' not found."))
        );
        assert_eq!(
            network.remove_equipment("SW"),
            Err(Error::invalid_argument("Object 'SW' is not equipment."))
        );

        network.remove_switch("SW").unwrap();
        assert!(!network.contains("SW"));
    }

    #[test]
    fn test_unknown_references() {
        let mut network = Network::new("n");

        assert_eq!(
            network.add_load(LoadSpec {
                id: "L1".to_string(),
                voltage_level: "VL1".to_string(),
                ..Default::default()
            }),
            Err(Error::not_found("Object 'VL1' not found."))
        );
        assert_eq!(
            network.add_voltage_level(VoltageLevelSpec {
                id: "VL1".to_string(),
                substation: Some("S1".to_string()),
                ..Default::default()
            }),
            Err(Error::not_found("Object 'S1' not found."))
        );
    }
}
