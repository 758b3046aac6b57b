// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Merging, detaching and flattening networks.
//!
//! `merge` nests two single-variant networks as subnetworks of a new root,
//! replacing paired dangling lines with tie lines.  `detach` is the
//! structural inverse: tie lines spanning the detached boundary are split
//! back into the dangling lines recorded in their halves.  `flatten`
//! collapses the one level of nesting into the root namespace.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::equipment::{
    DanglingHalf, EquipmentAttrs, EquipmentEntry, EquipmentKind, KindPredicates, TerminalData,
};
use crate::identifiers::{EquipmentHandle, ObjectRef, SubstationHandle, VoltageLevelHandle};
use crate::network::Subnetwork;
use crate::topology::cache::TopologyCache;
use crate::variant::array::VariantArray;
use crate::{Error, Network};

/// A dangling line lifted out of an absorbed network, waiting to become
/// half of a tie line.
struct PendingHalf {
    id: String,
    pairing_key: Option<String>,
    p0: VariantArray<f64>,
    q0: VariantArray<f64>,
    terminal: TerminalData,
}

impl Network {
    /// Merges two networks into a new root network, nesting each as a
    /// subnetwork.
    ///
    /// Both sides must carry exactly one variant.  Dangling lines sharing
    /// an id must agree on their pairing key; those pairs, and pairs formed
    /// by equal pairing keys, are replaced by tie lines.  Any other id or
    /// alias collision aborts the merge.
    pub fn merge(n1: Network, n2: Network) -> Result<Network, Error> {
        if n1.id == n2.id {
            return Err(Error::invalid_merge(format!(
                "Networks must have distinct ids; both are '{}'.",
                n1.id
            )));
        }
        for network in [&n1, &n2] {
            let count = network.variants.variant_count();
            if count != 1 {
                return Err(Error::invalid_merge(format!(
                    "Network '{}' has {} variants; merge requires exactly one.",
                    network.id, count
                )));
            }
        }

        // Shared ids are only legal for dangling line pairs that agree on
        // their boundary code.
        let mut id_pairs: Vec<String> = Vec::new();
        for id in n2.store.ids() {
            if !n1.store.contains(id) {
                continue;
            }
            match (n1.dangling_pairing_key(id), n2.dangling_pairing_key(id)) {
                (Some(key1), Some(key2)) => {
                    if key1 != key2 {
                        return Err(Error::invalid_merge(format!(
                            "Inconsistent boundary codes for dangling line pair '{}'.",
                            id
                        )));
                    }
                    id_pairs.push(id.to_string());
                }
                _ => {
                    return Err(Error::duplicate_id(format!(
                        "Object with id '{}' exists in both networks.",
                        id
                    )))
                }
            }
        }
        for (alias, _) in n1.store.aliases() {
            if n2.store.contains(alias) {
                return Err(Error::invalid_merge(format!(
                    "Alias '{}' collides across networks.",
                    alias
                )));
            }
        }
        for (alias, _) in n2.store.aliases() {
            if n1.store.contains(alias) {
                return Err(Error::invalid_merge(format!(
                    "Alias '{}' collides across networks.",
                    alias
                )));
            }
        }

        // Remaining dangling lines pair on equal boundary codes.
        let already_paired: HashSet<String> = id_pairs.iter().cloned().collect();
        let candidates1 = n1.boundary_candidates(&already_paired);
        let candidates2 = n2.boundary_candidates(&already_paired);
        let mut shared_keys: Vec<&String> = candidates1
            .keys()
            .filter(|key| candidates2.contains_key(*key))
            .collect();
        shared_keys.sort();
        let mut key_pairs: Vec<(String, String)> = Vec::new();
        for key in shared_keys {
            let ids1 = &candidates1[key];
            let ids2 = &candidates2[key];
            if ids1.len() > 1 || ids2.len() > 1 {
                return Err(Error::invalid_merge(format!(
                    "Multiple dangling lines with pairing key '{}' are candidates for merging.",
                    key
                )));
            }
            key_pairs.push((ids1[0].clone(), ids2[0].clone()));
        }

        let mut skip1 = already_paired.clone();
        let mut skip2 = already_paired;
        for (id1, id2) in &key_pairs {
            skip1.insert(id1.clone());
            skip2.insert(id2.clone());
        }

        let merged_id = format!("{}+{}", n1.id, n2.id);
        let mut merged = Network::new(&merged_id);
        let mut halves1 = merged.absorb(n1, &skip1)?;
        let mut halves2 = merged.absorb(n2, &skip2)?;

        let pair_count = id_pairs.len() + key_pairs.len();
        for id in id_pairs {
            let half1 = halves1
                .remove(&id)
                .ok_or_else(|| Error::internal(format!("Missing boundary half '{}'.", id)))?;
            let half2 = halves2
                .remove(&id)
                .ok_or_else(|| Error::internal(format!("Missing boundary half '{}'.", id)))?;
            merged.create_tie_line(half1, half2)?;
        }
        for (id1, id2) in key_pairs {
            let half1 = halves1
                .remove(&id1)
                .ok_or_else(|| Error::internal(format!("Missing boundary half '{}'.", id1)))?;
            let half2 = halves2
                .remove(&id2)
                .ok_or_else(|| Error::internal(format!("Missing boundary half '{}'.", id2)))?;
            merged.create_tie_line(half1, half2)?;
        }
        debug!(id = %merged.id, pairs = pair_count, "merged networks");
        Ok(merged)
    }

    /// Extracts a previously merged subnetwork into its own network.
    ///
    /// Tie lines spanning the boundary are split back into their recorded
    /// dangling lines first; any other spanning branch aborts the detach.
    pub fn detach(&mut self, subnetwork_id: &str) -> Result<Network, Error> {
        if !self.subnetworks.iter().any(|record| record.id == subnetwork_id) {
            return Err(Error::not_found(format!(
                "Subnetwork '{}' not found.",
                subnetwork_id
            )));
        }
        if self.variants.variant_count() != 1 {
            return Err(Error::invalid_merge(
                "Detaching from a multi-variant network is not supported.",
            ));
        }

        let mut spanning_ties: Vec<String> = Vec::new();
        for entry in self.equipment.iter().flatten() {
            if entry.terminals.len() != 2 {
                continue;
            }
            let inside1 = self.level_in_subnetwork(&entry.terminals[0], subnetwork_id)?;
            let inside2 = self.level_in_subnetwork(&entry.terminals[1], subnetwork_id)?;
            if inside1 == inside2 {
                continue;
            }
            if entry.kind() == EquipmentKind::TieLine {
                spanning_ties.push(entry.id.clone());
            } else {
                return Err(Error::invalid_merge(format!(
                    "Cannot detach '{}': branch '{}' spans its boundary.",
                    subnetwork_id, entry.id
                )));
            }
        }
        // Split spanning tie lines.  The half outside the boundary goes
        // straight back into this network; the inside half waits until the
        // detached network exists (both halves may share one id, so they
        // cannot coexist in one namespace).
        let mut pending_inside: Vec<(DanglingHalf, TerminalData)> = Vec::new();
        for id in &spanning_ties {
            let (inside, outside) = self.take_tie_line(id, subnetwork_id)?;
            self.restore_dangling_line(outside.0, outside.1)?;
            pending_inside.push(inside);
        }

        let mut detached = Network::new(subnetwork_id);
        let mut substation_map: HashMap<usize, SubstationHandle> = HashMap::new();
        for (index, slot) in self.substations.iter_mut().enumerate() {
            if slot
                .as_ref()
                .is_some_and(|entry| entry.subnetwork.as_deref() == Some(subnetwork_id))
            {
                if let Some(mut entry) = slot.take() {
                    entry.subnetwork = None;
                    entry.voltage_levels.clear();
                    substation_map.insert(index, SubstationHandle(detached.substations.len()));
                    detached.substations.push(Some(entry));
                }
            }
        }

        let mut level_map: HashMap<usize, VoltageLevelHandle> = HashMap::new();
        for (index, slot) in self.voltage_levels.iter_mut().enumerate() {
            if slot
                .as_ref()
                .is_some_and(|level| level.subnetwork.as_deref() == Some(subnetwork_id))
            {
                if let Some(mut level) = slot.take() {
                    level.subnetwork = None;
                    let new_handle = VoltageLevelHandle(detached.voltage_levels.len());
                    level_map.insert(index, new_handle);
                    level.substation = match level.substation {
                        Some(old) => {
                            let new = substation_map.get(&old.0).copied().ok_or_else(|| {
                                Error::internal("Voltage level's substation left behind.")
                            })?;
                            detached.substation_mut(new)?.voltage_levels.push(new_handle);
                            Some(new)
                        }
                        None => None,
                    };
                    level.cache = TopologyCache::new(1);
                    detached.voltage_levels.push(Some(level));
                }
            }
        }

        let mut equipment_map: HashMap<usize, EquipmentHandle> = HashMap::new();
        for (index, slot) in self.equipment.iter_mut().enumerate() {
            if slot
                .as_ref()
                .is_some_and(|entry| entry.subnetwork.as_deref() == Some(subnetwork_id))
            {
                if let Some(mut entry) = slot.take() {
                    entry.subnetwork = None;
                    for terminal in &mut entry.terminals {
                        terminal.voltage_level = level_map
                            .get(&terminal.voltage_level.0)
                            .copied()
                            .ok_or_else(|| {
                                Error::internal("Equipment terminal's voltage level left behind.")
                            })?;
                    }
                    equipment_map.insert(index, EquipmentHandle(detached.equipment.len()));
                    detached.equipment.push(Some(entry));
                }
            }
        }
        for level in detached.voltage_levels.iter_mut().flatten() {
            let attachments = std::mem::take(&mut level.attachments);
            level.attachments = attachments
                .into_iter()
                .filter_map(|(handle, slot)| {
                    equipment_map.get(&handle.0).map(|&new| (new, slot))
                })
                .collect();
        }

        let ids: Vec<String> = self.store.ordered().to_vec();
        for id in ids {
            let Some(object) = self.store.get(&id) else {
                continue;
            };
            let moved = match object {
                ObjectRef::Substation(handle) => substation_map
                    .get(&handle.0)
                    .map(|&new| ObjectRef::Substation(new)),
                ObjectRef::VoltageLevel(handle) => level_map
                    .get(&handle.0)
                    .map(|&new| ObjectRef::VoltageLevel(new)),
                ObjectRef::ConfiguredBus(level, bus) => level_map
                    .get(&level.0)
                    .map(|&new| ObjectRef::ConfiguredBus(new, bus)),
                ObjectRef::Switch(level, switch) => level_map
                    .get(&level.0)
                    .map(|&new| ObjectRef::Switch(new, switch)),
                ObjectRef::Equipment(handle) => equipment_map
                    .get(&handle.0)
                    .map(|&new| ObjectRef::Equipment(new)),
            };
            if let Some(remapped) = moved {
                let aliases = self.store.aliases_of(&id);
                self.store.unregister(&id);
                detached.store.register(&id, remapped)?;
                for alias in aliases {
                    detached.store.add_alias(&id, &alias)?;
                }
            }
        }

        for (half, mut terminal) in pending_inside {
            terminal.voltage_level = level_map
                .get(&terminal.voltage_level.0)
                .copied()
                .ok_or_else(|| Error::internal("Tie line half's voltage level left behind."))?;
            detached.restore_dangling_line(half, terminal)?;
        }

        self.subnetworks.retain(|record| record.id != subnetwork_id);
        self.components.invalidate_all();
        debug!(id = subnetwork_id, "detached subnetwork");
        Ok(detached)
    }

    /// Promotes every subnetwork's objects into the root namespace,
    /// dropping the subnetwork records.
    pub fn flatten(&mut self) {
        for entry in self.substations.iter_mut().flatten() {
            entry.subnetwork = None;
        }
        for level in self.voltage_levels.iter_mut().flatten() {
            level.subnetwork = None;
        }
        for entry in self.equipment.iter_mut().flatten() {
            entry.subnetwork = None;
        }
        self.subnetworks.clear();
    }

    /// Removes a tie line and returns its halves as
    /// `(inside boundary, outside boundary)` pairs of recorded dangling
    /// line data and terminal.
    fn take_tie_line(
        &mut self,
        id: &str,
        subnetwork_id: &str,
    ) -> Result<((DanglingHalf, TerminalData), (DanglingHalf, TerminalData)), Error> {
        let (canonical, object) = self.object(id)?;
        let ObjectRef::Equipment(handle) = object else {
            return Err(Error::internal(format!("'{}' is not a tie line.", id)));
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
        let EquipmentAttrs::TieLine { half1, half2 } = entry.attrs else {
            return Err(Error::internal("Tie line entry without halves."));
        };
        let mut terminals = entry.terminals.into_iter();
        let terminal1 = terminals
            .next()
            .ok_or_else(|| Error::internal("Tie line with fewer than two terminals."))?;
        let terminal2 = terminals
            .next()
            .ok_or_else(|| Error::internal("Tie line with fewer than two terminals."))?;
        let inside1 = self.voltage_level_ref(terminal1.voltage_level)?.subnetwork.as_deref()
            == Some(subnetwork_id);
        if inside1 {
            Ok(((half1, terminal1), (half2, terminal2)))
        } else {
            Ok(((half2, terminal2), (half1, terminal1)))
        }
    }

    /// Moves every arena of `source` into `self`, tagging objects with
    /// their subnetwork and lifting out the dangling lines in `skip`.
    fn absorb(
        &mut self,
        source: Network,
        skip: &HashSet<String>,
    ) -> Result<HashMap<String, PendingHalf>, Error> {
        let plain = source.subnetworks.is_empty();
        if plain {
            self.push_subnetwork_record(&source.id)?;
        } else {
            for record in &source.subnetworks {
                self.push_subnetwork_record(&record.id)?;
            }
        }
        let tag = source.id.clone();
        let retag = |existing: Option<String>| -> Option<String> {
            if plain {
                Some(tag.clone())
            } else {
                existing
            }
        };

        let substation_offset = self.substations.len();
        let level_offset = self.voltage_levels.len();
        let equipment_offset = self.equipment.len();

        let mut skip_handles: HashSet<usize> = HashSet::new();
        for id in skip {
            if let Some(ObjectRef::Equipment(handle)) = source.store.get(id) {
                skip_handles.insert(handle.0);
            }
        }

        let Network {
            store,
            substations,
            voltage_levels,
            equipment,
            ..
        } = source;

        for slot in substations {
            self.substations.push(slot.map(|mut entry| {
                entry.subnetwork = retag(entry.subnetwork);
                entry.voltage_levels = entry
                    .voltage_levels
                    .into_iter()
                    .map(|handle| VoltageLevelHandle(handle.0 + level_offset))
                    .collect();
                entry
            }));
        }
        for slot in voltage_levels {
            self.voltage_levels.push(slot.map(|mut level| {
                level.subnetwork = retag(level.subnetwork);
                level.substation = level
                    .substation
                    .map(|handle| SubstationHandle(handle.0 + substation_offset));
                level.attachments = level
                    .attachments
                    .into_iter()
                    .filter(|(handle, _)| !skip_handles.contains(&handle.0))
                    .map(|(handle, slot)| (EquipmentHandle(handle.0 + equipment_offset), slot))
                    .collect();
                // Cached bus sets hold pre-merge handles; start clean.
                level.cache = TopologyCache::new(1);
                level
            }));
        }

        let mut halves = HashMap::new();
        for (index, slot) in equipment.into_iter().enumerate() {
            let Some(mut entry) = slot else {
                self.equipment.push(None);
                continue;
            };
            for terminal in &mut entry.terminals {
                terminal.voltage_level = VoltageLevelHandle(terminal.voltage_level.0 + level_offset);
            }
            if skip_handles.contains(&index) {
                let EquipmentAttrs::DanglingLine {
                    p0,
                    q0,
                    pairing_key,
                } = entry.attrs
                else {
                    return Err(Error::internal("Boundary pair is not a dangling line."));
                };
                let terminal = entry
                    .terminals
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::internal("Dangling line without a terminal."))?;
                halves.insert(
                    entry.id.clone(),
                    PendingHalf {
                        id: entry.id,
                        pairing_key,
                        p0,
                        q0,
                        terminal,
                    },
                );
                self.equipment.push(None);
                continue;
            }
            entry.subnetwork = retag(entry.subnetwork);
            self.equipment.push(Some(entry));
        }

        for id in store.ordered().to_vec() {
            if skip.contains(&id) {
                continue;
            }
            let Some(object) = store.get(&id) else {
                continue;
            };
            let remapped = match object {
                ObjectRef::Substation(handle) => {
                    ObjectRef::Substation(SubstationHandle(handle.0 + substation_offset))
                }
                ObjectRef::VoltageLevel(handle) => {
                    ObjectRef::VoltageLevel(VoltageLevelHandle(handle.0 + level_offset))
                }
                ObjectRef::ConfiguredBus(level, bus) => {
                    ObjectRef::ConfiguredBus(VoltageLevelHandle(level.0 + level_offset), bus)
                }
                ObjectRef::Switch(level, switch) => {
                    ObjectRef::Switch(VoltageLevelHandle(level.0 + level_offset), switch)
                }
                ObjectRef::Equipment(handle) => {
                    ObjectRef::Equipment(EquipmentHandle(handle.0 + equipment_offset))
                }
            };
            self.store.register(&id, remapped)?;
            for alias in store.aliases_of(&id) {
                self.store.add_alias(&id, &alias)?;
            }
        }

        Ok(halves)
    }

    fn push_subnetwork_record(&mut self, id: &str) -> Result<(), Error> {
        if self.subnetworks.iter().any(|record| record.id == id) {
            return Err(Error::invalid_merge(format!(
                "Duplicate subnetwork id '{}'.",
                id
            )));
        }
        self.subnetworks.push(Subnetwork { id: id.to_string() });
        Ok(())
    }

    fn create_tie_line(&mut self, half1: PendingHalf, half2: PendingHalf) -> Result<(), Error> {
        let id = if half1.id == half2.id {
            half1.id.clone()
        } else {
            format!("{} + {}", half1.id, half2.id)
        };
        let handle = EquipmentHandle(self.equipment.len());
        self.store.register(&id, ObjectRef::Equipment(handle))?;

        let terminals = vec![half1.terminal, half2.terminal];
        let entry = EquipmentEntry {
            id: id.clone(),
            name: None,
            // Tie lines span subnetworks and live at the root.
            subnetwork: None,
            terminals,
            attrs: EquipmentAttrs::TieLine {
                half1: DanglingHalf {
                    id: half1.id,
                    pairing_key: half1.pairing_key,
                    p0: half1.p0,
                    q0: half1.q0,
                },
                half2: DanglingHalf {
                    id: half2.id,
                    pairing_key: half2.pairing_key,
                    p0: half2.p0,
                    q0: half2.q0,
                },
            },
        };
        let levels: Vec<VoltageLevelHandle> = entry
            .terminals
            .iter()
            .map(|terminal| terminal.voltage_level)
            .collect();
        self.equipment.push(Some(entry));
        for (slot, level_handle) in levels.into_iter().enumerate() {
            let level = self.voltage_level_mut(level_handle)?;
            level.attachments.push((handle, slot));
            level.cache.invalidate_all();
        }
        self.components.invalidate_all();
        Ok(())
    }

    fn restore_dangling_line(
        &mut self,
        half: DanglingHalf,
        terminal: TerminalData,
    ) -> Result<(), Error> {
        let handle = EquipmentHandle(self.equipment.len());
        self.store.register(&half.id, ObjectRef::Equipment(handle))?;
        let level_handle = terminal.voltage_level;
        let tag = self.voltage_level_ref(level_handle)?.subnetwork.clone();
        self.equipment.push(Some(EquipmentEntry {
            id: half.id.clone(),
            name: None,
            subnetwork: tag,
            terminals: vec![terminal],
            attrs: EquipmentAttrs::DanglingLine {
                p0: half.p0,
                q0: half.q0,
                pairing_key: half.pairing_key,
            },
        }));
        let level = self.voltage_level_mut(level_handle)?;
        level.attachments.push((handle, 0));
        level.cache.invalidate_all();
        self.notify_creation(&half.id);
        Ok(())
    }

    fn level_in_subnetwork(
        &self,
        terminal: &TerminalData,
        subnetwork_id: &str,
    ) -> Result<bool, Error> {
        Ok(self
            .voltage_level_ref(terminal.voltage_level)?
            .subnetwork
            .as_deref()
            == Some(subnetwork_id))
    }

    fn dangling_pairing_key(&self, id: &str) -> Option<Option<String>> {
        let ObjectRef::Equipment(handle) = self.store.get(id)? else {
            return None;
        };
        let entry = self.equipment.get(handle.0)?.as_ref()?;
        match &entry.attrs {
            EquipmentAttrs::DanglingLine { pairing_key, .. } => Some(pairing_key.clone()),
            _ => None,
        }
    }

    /// Dangling lines eligible for key-based pairing, grouped by key.
    fn boundary_candidates(&self, exclude: &HashSet<String>) -> HashMap<String, Vec<String>> {
        let mut candidates: HashMap<String, Vec<String>> = HashMap::new();
        for entry in self.equipment.iter().flatten() {
            if exclude.contains(&entry.id) {
                continue;
            }
            if let EquipmentAttrs::DanglingLine { pairing_key, .. } = &entry.attrs {
                match pairing_key {
                    Some(key) => candidates
                        .entry(key.clone())
                        .or_default()
                        .push(entry.id.clone()),
                    None => warn!(id = %entry.id, "dangling line has no pairing key and stays unpaired"),
                }
            }
        }
        candidates
    }
}
