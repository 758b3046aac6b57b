// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Identifiable bookkeeping: typed arena handles, the canonical id → object
//! map, and the alias map.
//!
//! Objects live in arenas owned by the [`Network`][crate::Network]; the
//! store only maps external ids to arena handles.  Back-references between
//! objects are handle lookups, never owning pointers, so ownership stays
//! acyclic even though the object graph is not.

use std::collections::HashMap;

use crate::Error;

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub(crate) struct $name(pub(crate) usize);
    };
}

handle!(
    /// Index into the substation arena.
    SubstationHandle
);
handle!(
    /// Index into the voltage level arena.
    VoltageLevelHandle
);
handle!(
    /// Index into the equipment arena.
    EquipmentHandle
);
handle!(
    /// Index into a voltage level's switch arena.
    SwitchHandle
);
handle!(
    /// Index into a bus-breaker voltage level's configured bus arena.
    BusHandle
);

/// A typed reference to any identifiable object in the network.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ObjectRef {
    Substation(SubstationHandle),
    VoltageLevel(VoltageLevelHandle),
    ConfiguredBus(VoltageLevelHandle, BusHandle),
    Switch(VoltageLevelHandle, SwitchHandle),
    Equipment(EquipmentHandle),
}

/// The canonical id → object map, plus the alias → id map.
///
/// Ids are enumerated in registration order so that every whole-network
/// sweep (variant broadcasts, component indexing, merge) is deterministic.
#[derive(Debug, Default)]
pub(crate) struct ObjectStore {
    refs: HashMap<String, ObjectRef>,
    order: Vec<String>,
    aliases: HashMap<String, String>,
}

impl ObjectStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers an object under its canonical id.
    pub(crate) fn register(&mut self, id: &str, object: ObjectRef) -> Result<(), Error> {
        if id.is_empty() {
            return Err(Error::invalid_argument("Object id must not be empty."));
        }
        if self.refs.contains_key(id) || self.aliases.contains_key(id) {
            return Err(Error::duplicate_id(format!(
                "Object with id '{}' already exists.",
                id
            )));
        }
        self.refs.insert(id.to_string(), object);
        self.order.push(id.to_string());
        Ok(())
    }

    /// Unregisters an object and every alias pointing at it.
    pub(crate) fn unregister(&mut self, id: &str) -> Option<ObjectRef> {
        let object = self.refs.remove(id)?;
        self.order.retain(|known| known != id);
        self.aliases.retain(|_, target| target != id);
        Some(object)
    }

    /// Looks an object up by canonical id only.
    pub(crate) fn get(&self, id: &str) -> Option<ObjectRef> {
        self.refs.get(id).copied()
    }

    /// Looks an object up by id or alias, returning the canonical id.
    pub(crate) fn resolve(&self, id_or_alias: &str) -> Option<(&str, ObjectRef)> {
        if let Some((id, object)) = self.refs.get_key_value(id_or_alias) {
            return Some((id.as_str(), *object));
        }
        let id = self.aliases.get(id_or_alias)?;
        self.refs
            .get_key_value(id)
            .map(|(id, object)| (id.as_str(), *object))
    }

    pub(crate) fn contains(&self, id_or_alias: &str) -> bool {
        self.refs.contains_key(id_or_alias) || self.aliases.contains_key(id_or_alias)
    }

    /// Registers an additional id for an existing object.
    pub(crate) fn add_alias(&mut self, id: &str, alias: &str) -> Result<(), Error> {
        if !self.refs.contains_key(id) {
            return Err(Error::not_found(format!("Object '{}' not found.", id)));
        }
        if self.contains(alias) {
            return Err(Error::duplicate_id(format!(
                "Alias '{}' collides with an existing id or alias.",
                alias
            )));
        }
        self.aliases.insert(alias.to_string(), id.to_string());
        Ok(())
    }

    pub(crate) fn remove_alias(&mut self, alias: &str) -> Result<(), Error> {
        self.aliases
            .remove(alias)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("Alias '{}' not found.", alias)))
    }

    /// Aliases of one object, unordered.
    pub(crate) fn aliases_of(&self, id: &str) -> Vec<String> {
        self.aliases
            .iter()
            .filter(|(_, target)| target.as_str() == id)
            .map(|(alias, _)| alias.clone())
            .collect()
    }

    /// All aliases with their targets, for merge-time collision checks.
    pub(crate) fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|(alias, id)| (alias.as_str(), id.as_str()))
    }

    /// Canonical ids in registration order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The backing id list, for iterator adapters.
    pub(crate) fn ordered(&self) -> &[String] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut store = ObjectStore::new();
        store
            .register("L1", ObjectRef::Equipment(EquipmentHandle(0)))
            .unwrap();

        assert_eq!(store.get("L1"), Some(ObjectRef::Equipment(EquipmentHandle(0))));
        assert_eq!(
            store.register("L1", ObjectRef::Equipment(EquipmentHandle(1))),
            Err(Error::duplicate_id("Object with id 'L1' already exists."))
        );
        assert_eq!(
            store.register("", ObjectRef::Equipment(EquipmentHandle(1))),
            Err(Error::invalid_argument("Object id must not be empty."))
        );
    }

    #[test]
    fn test_aliases() {
        let mut store = ObjectStore::new();
        store
            .register("L1", ObjectRef::Equipment(EquipmentHandle(0)))
            .unwrap();
        store.add_alias("L1", "load-one").unwrap();

        let (id, object) = store.resolve("load-one").unwrap();
        assert_eq!(id, "L1");
        assert_eq!(object, ObjectRef::Equipment(EquipmentHandle(0)));
        assert_eq!(store.aliases_of("L1"), vec!["load-one".to_string()]);

        // Aliases share the id namespace in both directions.
        assert_eq!(
            store.add_alias("L1", "load-one"),
            Err(Error::duplicate_id(
                "Alias 'load-one' collides with an existing id or alias."
            ))
        );
        assert_eq!(
            store.register("load-one", ObjectRef::Equipment(EquipmentHandle(1))),
            Err(Error::duplicate_id(
                "Object with id 'load-one' already exists."
            ))
        );
        assert_eq!(
            store.add_alias("ghost", "g"),
            Err(Error::not_found("Object 'ghost' not found."))
        );
    }

    #[test]
    fn test_unregister_drops_aliases() {
        let mut store = ObjectStore::new();
        store
            .register("L1", ObjectRef::Equipment(EquipmentHandle(0)))
            .unwrap();
        store.add_alias("L1", "load-one").unwrap();

        assert!(store.unregister("L1").is_some());
        assert!(!store.contains("L1"));
        assert!(!store.contains("load-one"));
        assert!(store.unregister("L1").is_none());
    }

    #[test]
    fn test_ids_keep_registration_order() {
        let mut store = ObjectStore::new();
        for id in ["b", "a", "c"] {
            store
                .register(id, ObjectRef::Equipment(EquipmentHandle(0)))
                .unwrap();
        }
        store.unregister("a");

        assert_eq!(store.ids().collect::<Vec<_>>(), vec!["b", "c"]);
    }
}
