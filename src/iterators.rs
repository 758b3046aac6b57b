// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Iterators over the identifiable objects of a `Network`.

use crate::equipment::{EquipmentEntry, EquipmentKind, KindPredicates};
use crate::topology::SwitchEntry;

/// An iterator over all identifiable ids of a network, in registration
/// order.
pub struct Ids<'a> {
    pub(crate) iter: std::slice::Iter<'a, String>,
}

impl<'a> Iterator for Ids<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(String::as_str)
    }
}

/// An iterator over the ids of all equipment of one kind, in arena order.
pub struct EquipmentIds<'a> {
    pub(crate) iter: std::slice::Iter<'a, Option<EquipmentEntry>>,
    pub(crate) kind: EquipmentKind,
}

impl<'a> Iterator for EquipmentIds<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.iter.by_ref() {
            if let Some(entry) = slot {
                if entry.kind() == self.kind {
                    return Some(&entry.id);
                }
            }
        }
        None
    }
}

/// An iterator over the switch ids of one voltage level, in arena order.
pub struct SwitchIds<'a> {
    pub(crate) iter: std::slice::Iter<'a, Option<SwitchEntry>>,
}

impl<'a> Iterator for SwitchIds<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.iter.by_ref() {
            if let Some(entry) = slot {
                return Some(&entry.id);
            }
        }
        None
    }
}
