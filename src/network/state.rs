// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Variant lifecycle operations on the network.
//!
//! Cloning and removing variants are registry-wide structural mutations:
//! the registry decides which slots change and the network broadcasts the
//! event to every equipment entry, every voltage level (switches and
//! topology caches) and the component cache before the call returns.

use tracing::debug;

use crate::variant::array::VariantOp;
use crate::{Error, Network};

impl Network {
    /// Clones the `source` variant into one or more new variants, copying
    /// every object's current values into the new slots.
    pub fn clone_variant(&mut self, source: &str, targets: &[&str]) -> Result<(), Error> {
        self.clone_variant_impl(source, targets, false)
    }

    /// Like [`clone_variant`][Self::clone_variant], but an existing target
    /// variant (other than the source itself) is overwritten in place.
    pub fn clone_variant_overwriting(
        &mut self,
        source: &str,
        targets: &[&str],
    ) -> Result<(), Error> {
        self.clone_variant_impl(source, targets, true)
    }

    fn clone_variant_impl(
        &mut self,
        source: &str,
        targets: &[&str],
        may_overwrite: bool,
    ) -> Result<(), Error> {
        let plan = self
            .variants
            .registry_mut()
            .clone_variants(source, targets, may_overwrite)?;
        if plan.extended > 0 {
            self.apply_variant_op(&VariantOp::Extend {
                count: plan.extended,
                source: plan.source_index,
            });
        }
        if !plan.allocated.is_empty() {
            self.apply_variant_op(&VariantOp::Allocate {
                indexes: &plan.allocated,
                source: plan.source_index,
            });
        }
        debug!(source, targets = targets.len(), "cloned variants");
        Ok(())
    }

    /// Removes a variant.  Removing the physical tail shrinks every
    /// per-variant array by one; removing any other variant leaves a slot
    /// for the next clone to recycle.
    pub fn remove_variant(&mut self, id: &str) -> Result<(), Error> {
        let plan = self.variants.registry_mut().remove(id)?;
        if plan.tail {
            self.apply_variant_op(&VariantOp::Reduce { count: 1 });
        } else {
            self.apply_variant_op(&VariantOp::Delete { index: plan.index });
        }
        self.variants.clear_pointers_to(plan.index);
        debug!(id, tail = plan.tail, "removed variant");
        Ok(())
    }

    /// Selects the working variant for the calling thread.
    pub fn set_working_variant(&self, id: &str) -> Result<(), Error> {
        self.variants.set_working_variant(id)
    }

    /// The id of the calling thread's working variant.
    pub fn working_variant_id(&self) -> Result<String, Error> {
        self.variants.working_variant_id()
    }

    /// Live variant ids in creation order.
    pub fn variant_ids(&self) -> Vec<String> {
        self.variants.variant_ids()
    }

    pub(crate) fn working_index(&self) -> Result<usize, Error> {
        self.variants.working_index()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::single_load_network;
    use crate::variant::INITIAL_VARIANT_ID;
    use crate::Error;

    #[test]
    fn test_clone_fidelity() {
        let mut network = single_load_network();
        network.set_load_p0("L1", 75.0).unwrap();

        network
            .clone_variant(INITIAL_VARIANT_ID, &["a", "b"])
            .unwrap();

        for variant in ["a", "b", INITIAL_VARIANT_ID] {
            network.set_working_variant(variant).unwrap();
            assert_eq!(network.load("L1").unwrap().p0(), 75.0);
        }
    }

    #[test]
    fn test_variant_isolation() {
        let mut network = single_load_network();
        network.clone_variant(INITIAL_VARIANT_ID, &["a", "b"]).unwrap();

        network.set_working_variant("a").unwrap();
        network.set_load_p0("L1", 999.0).unwrap();

        network.set_working_variant("b").unwrap();
        assert_eq!(network.load("L1").unwrap().p0(), 100.0);
        network.set_working_variant(INITIAL_VARIANT_ID).unwrap();
        assert_eq!(network.load("L1").unwrap().p0(), 100.0);
        network.set_working_variant("a").unwrap();
        assert_eq!(network.load("L1").unwrap().p0(), 999.0);
    }

    #[test]
    fn test_forbidden_operations() {
        let mut network = single_load_network();

        assert_eq!(
            network.clone_variant(INITIAL_VARIANT_ID, &[]),
            Err(Error::invalid_argument("Empty target variant id list."))
        );
        assert_eq!(
            network.remove_variant(INITIAL_VARIANT_ID),
            Err(Error::invalid_argument(
                "Removing initial variant is forbidden."
            ))
        );
        assert_eq!(
            network.remove_variant("ghost"),
            Err(Error::not_found("Variant 'ghost' not found."))
        );
        assert_eq!(
            network.set_working_variant("ghost"),
            Err(Error::not_found("Variant 'ghost' not found."))
        );
    }

    #[test]
    fn test_non_tail_removal_recycles_then_tail_removal_shrinks() {
        let mut network = single_load_network();
        network
            .clone_variant(INITIAL_VARIANT_ID, &["a", "b", "c", "d"])
            .unwrap();
        assert_eq!(network.variant_array_size(), 5);

        network.remove_variant("b").unwrap();
        // Non-tail removal keeps the physical array size.
        assert_eq!(network.variant_array_size(), 5);
        assert_eq!(
            network.variant_ids(),
            vec![INITIAL_VARIANT_ID, "a", "c", "d"]
        );

        // The next clone recycles the hole.
        network.clone_variant("a", &["e"]).unwrap();
        assert_eq!(network.variant_array_size(), 5);

        // Tail removal shrinks by exactly one.
        network.remove_variant("d").unwrap();
        assert_eq!(network.variant_array_size(), 4);
    }

    #[test]
    fn test_recycled_slot_copies_source_not_leftovers() {
        let mut network = single_load_network();
        network.clone_variant(INITIAL_VARIANT_ID, &["a", "b"]).unwrap();
        network.set_working_variant("a").unwrap();
        network.set_load_p0("L1", 555.0).unwrap();

        // Remove the non-tail variant "a" and recycle its slot for "c",
        // cloned from the initial variant.
        network.remove_variant("a").unwrap();
        network.clone_variant(INITIAL_VARIANT_ID, &["c"]).unwrap();

        network.set_working_variant("c").unwrap();
        assert_eq!(network.load("L1").unwrap().p0(), 100.0);
    }

    #[test]
    fn test_removing_working_variant_unsets_pointer() {
        let mut network = single_load_network();
        network.clone_variant(INITIAL_VARIANT_ID, &["a"]).unwrap();
        network.set_working_variant("a").unwrap();

        network.remove_variant("a").unwrap();
        assert_eq!(
            network.working_variant_id(),
            Err(Error::variant_not_set("Variant index not set."))
        );
        assert_eq!(
            network.load("L1").map(|_| ()),
            Err(Error::variant_not_set("Variant index not set."))
        );

        network.set_working_variant(INITIAL_VARIANT_ID).unwrap();
        assert_eq!(network.load("L1").unwrap().p0(), 100.0);
    }

    #[test]
    fn test_new_equipment_after_clone_covers_all_variants() {
        let mut network = single_load_network();
        network.clone_variant(INITIAL_VARIANT_ID, &["a"]).unwrap();

        network
            .add_load(crate::LoadSpec {
                id: "L2".to_string(),
                voltage_level: "VL1".to_string(),
                attachment: crate::AttachPoint::Bus("B1".to_string()),
                p0: 5.0,
                ..Default::default()
            })
            .unwrap();

        network.set_working_variant("a").unwrap();
        assert_eq!(network.load("L2").unwrap().p0(), 5.0);
    }

    #[test]
    fn test_multi_thread_reads_use_per_thread_variants() {
        let mut network = single_load_network();
        network.clone_variant(INITIAL_VARIANT_ID, &["a"]).unwrap();
        network.set_working_variant("a").unwrap();
        network.set_load_p0("L1", 42.0).unwrap();
        network.variant_manager().allow_multi_thread_access(true);

        std::thread::scope(|scope| {
            let network = &network;
            scope.spawn(move || {
                assert_eq!(
                    network.load("L1").map(|_| ()),
                    Err(Error::variant_not_set("Variant index not set."))
                );
                network.set_working_variant(INITIAL_VARIANT_ID).unwrap();
                assert_eq!(network.load("L1").unwrap().p0(), 100.0);
            });
            scope.spawn(move || {
                network.set_working_variant("a").unwrap();
                assert_eq!(network.load("L1").unwrap().p0(), 42.0);
            });
        });
    }
}
