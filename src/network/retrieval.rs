// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Lookup and enumeration: ids, aliases, kinds, subnetworks and the
//! iterator accessors.

use crate::equipment::{EquipmentKind, KindPredicates};
use crate::identifiers::ObjectRef;
use crate::iterators::{EquipmentIds, Ids, SwitchIds};
use crate::topology::TopologyModel;
use crate::{Error, Network};

impl Network {
    /// Whether an id or alias refers to an object in this network.
    pub fn contains(&self, id_or_alias: &str) -> bool {
        self.store.contains(id_or_alias)
    }

    /// The kind of the equipment with the given id.
    pub fn equipment_kind(&self, id: &str) -> Result<EquipmentKind, Error> {
        let (_, object) = self.object(id)?;
        let ObjectRef::Equipment(handle) = object else {
            return Err(Error::invalid_argument(format!(
                "Object '{}' is not equipment.",
                id
            )));
        };
        Ok(self.equipment_ref(handle)?.kind())
    }

    /// The human-readable name of an object, if one was given.
    pub fn name_of(&self, id: &str) -> Result<Option<String>, Error> {
        let (_, object) = self.object(id)?;
        Ok(match object {
            ObjectRef::Equipment(handle) => self.equipment_ref(handle)?.name.clone(),
            ObjectRef::VoltageLevel(handle) => self.voltage_level_ref(handle)?.name.clone(),
            ObjectRef::Substation(handle) => self
                .substations
                .get(handle.0)
                .and_then(|slot| slot.as_ref())
                .and_then(|entry| entry.name.clone()),
            ObjectRef::ConfiguredBus(..) | ObjectRef::Switch(..) => None,
        })
    }

    /// The nominal voltage of a voltage level, in kV.
    pub fn nominal_voltage(&self, voltage_level: &str) -> Result<f64, Error> {
        let handle = self.voltage_level_handle(voltage_level)?;
        Ok(self.voltage_level_ref(handle)?.nominal_v)
    }

    /// Registers an additional id for an existing object.
    pub fn add_alias(&mut self, id: &str, alias: &str) -> Result<(), Error> {
        let (canonical, _) = self.object(id)?;
        let canonical = canonical.to_string();
        self.store.add_alias(&canonical, alias)
    }

    pub fn remove_alias(&mut self, alias: &str) -> Result<(), Error> {
        self.store.remove_alias(alias)
    }

    /// The aliases of one object, sorted for determinism.
    pub fn aliases_of(&self, id: &str) -> Result<Vec<String>, Error> {
        let (canonical, _) = self.object(id)?;
        let mut aliases = self.store.aliases_of(canonical);
        aliases.sort_unstable();
        Ok(aliases)
    }

    /// The subnetwork an object belongs to, or `None` for root-level
    /// objects.
    pub fn subnetwork_of(&self, id: &str) -> Result<Option<String>, Error> {
        let (_, object) = self.object(id)?;
        Ok(match object {
            ObjectRef::Equipment(handle) => self.equipment_ref(handle)?.subnetwork.clone(),
            ObjectRef::VoltageLevel(handle) => {
                self.voltage_level_ref(handle)?.subnetwork.clone()
            }
            ObjectRef::ConfiguredBus(handle, _) | ObjectRef::Switch(handle, _) => {
                self.voltage_level_ref(handle)?.subnetwork.clone()
            }
            ObjectRef::Substation(handle) => self
                .substations
                .get(handle.0)
                .and_then(|slot| slot.as_ref())
                .and_then(|entry| entry.subnetwork.clone()),
        })
    }

    /// The ids of the subnetworks nested in this network.
    pub fn subnetwork_ids(&self) -> Vec<String> {
        self.subnetworks
            .iter()
            .map(|subnetwork| subnetwork.id.clone())
            .collect()
    }

    /// All identifiable ids, in registration order.
    pub fn identifiable_ids(&self) -> Ids<'_> {
        Ids {
            iter: self.store.ordered().iter(),
        }
    }

    pub fn loads(&self) -> EquipmentIds<'_> {
        self.equipment_ids(EquipmentKind::Load)
    }

    pub fn generators(&self) -> EquipmentIds<'_> {
        self.equipment_ids(EquipmentKind::Generator)
    }

    pub fn busbar_sections(&self) -> EquipmentIds<'_> {
        self.equipment_ids(EquipmentKind::BusbarSection)
    }

    pub fn lines(&self) -> EquipmentIds<'_> {
        self.equipment_ids(EquipmentKind::Line)
    }

    pub fn transformers(&self) -> EquipmentIds<'_> {
        self.equipment_ids(EquipmentKind::Transformer)
    }

    pub fn dangling_lines(&self) -> EquipmentIds<'_> {
        self.equipment_ids(EquipmentKind::DanglingLine)
    }

    pub fn tie_lines(&self) -> EquipmentIds<'_> {
        self.equipment_ids(EquipmentKind::TieLine)
    }

    pub fn hvdc_links(&self) -> EquipmentIds<'_> {
        self.equipment_ids(EquipmentKind::HvdcLink)
    }

    fn equipment_ids(&self, kind: EquipmentKind) -> EquipmentIds<'_> {
        EquipmentIds {
            iter: self.equipment.iter(),
            kind,
        }
    }

    /// The switch ids of one voltage level, in arena order.
    pub fn switch_ids(&self, voltage_level: &str) -> Result<SwitchIds<'_>, Error> {
        let handle = self.voltage_level_handle(voltage_level)?;
        let level = self.voltage_level_ref(handle)?;
        let switches = match &level.model {
            TopologyModel::NodeBreaker(topology) => &topology.switches,
            TopologyModel::BusBreaker(topology) => &topology.switches,
        };
        Ok(SwitchIds {
            iter: switches.iter(),
        })
    }

    /// The ids of all voltage levels, in arena order.
    pub fn voltage_level_ids(&self) -> Vec<String> {
        self.voltage_levels
            .iter()
            .flatten()
            .map(|level| level.id.clone())
            .collect()
    }

    /// The ids of all substations, in arena order.
    pub fn substation_ids(&self) -> Vec<String> {
        self.substations
            .iter()
            .flatten()
            .map(|entry| entry.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{node_breaker_network, two_level_network};
    use crate::Error;

    #[test]
    fn test_iterators() {
        let network = two_level_network();

        assert_eq!(
            network.identifiable_ids().collect::<Vec<_>>(),
            vec!["VL1", "B1", "VL2", "B2", "G1", "L2", "X12"]
        );
        assert_eq!(network.loads().collect::<Vec<_>>(), vec!["L2"]);
        assert_eq!(network.generators().collect::<Vec<_>>(), vec!["G1"]);
        assert_eq!(network.lines().collect::<Vec<_>>(), vec!["X12"]);
        assert!(network.tie_lines().next().is_none());
        assert_eq!(network.voltage_level_ids(), vec!["VL1", "VL2"]);
    }

    #[test]
    fn test_switch_ids() {
        let network = node_breaker_network();

        assert_eq!(
            network.switch_ids("VL1").unwrap().collect::<Vec<_>>(),
            vec!["D1", "B1"]
        );
        assert_eq!(
            network.switch_ids("BBS").err(),
            Some(Error::invalid_argument(
                "Object 'BBS' is not a voltage level."
            ))
        );
    }

    #[test]
    fn test_alias_surface() {
        let mut network = two_level_network();
        network.add_alias("G1", "gen-one").unwrap();
        network.add_alias("gen-one", "gen-1").unwrap();

        assert!(network.contains("gen-1"));
        assert_eq!(
            network.aliases_of("G1").unwrap(),
            vec!["gen-1".to_string(), "gen-one".to_string()]
        );
        network.remove_alias("gen-1").unwrap();
        assert!(!network.contains("gen-1"));
        assert_eq!(
            network.remove_alias("gen-1"),
            Err(Error::not_found("Alias 'gen-1' not found."))
        );
    }

    #[test]
    fn test_subnetworks_empty_on_plain_networks() {
        let network = two_level_network();

        assert!(network.subnetwork_ids().is_empty());
        assert_eq!(network.subnetwork_of("G1").unwrap(), None);
    }

    #[test]
    fn test_names_and_nominal_voltage() {
        let network = two_level_network();

        assert_eq!(network.nominal_voltage("VL1").unwrap(), 400.0);
        assert_eq!(network.name_of("G1").unwrap(), None);
        assert_eq!(
            network.name_of("ghost").err(),
            Some(Error::not_found("Object 'ghost' not found."))
        );
    }
}
