// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Per-variant attribute access.
//!
//! Reads go through lightweight views that capture the calling thread's
//! working variant once at lookup time.  Writes are methods on the network
//! so the old value can be reported to listeners; attribute writes never
//! invalidate topology (connectivity mutations live in the topology
//! methods).

use crate::equipment::{EquipmentAttrs, EquipmentEntry, EquipmentKind, KindPredicates, Side};
use crate::identifiers::ObjectRef;
use crate::listener::AttributeValue;
use crate::topology::{SwitchEntry, SwitchKind};
use crate::variant::array::VariantArray;
use crate::{Error, Network};

/// Read access to a load in the working variant.
pub struct LoadView<'a> {
    entry: &'a EquipmentEntry,
    p0: &'a VariantArray<f64>,
    q0: &'a VariantArray<f64>,
    variant: usize,
}

impl LoadView<'_> {
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn p0(&self) -> f64 {
        *self.p0.get(self.variant)
    }

    pub fn q0(&self) -> f64 {
        *self.q0.get(self.variant)
    }

    pub fn is_connected(&self) -> bool {
        *self.entry.terminals[0].connected.get(self.variant)
    }
}

/// Read access to a generator in the working variant.
pub struct GeneratorView<'a> {
    entry: &'a EquipmentEntry,
    target_p: &'a VariantArray<f64>,
    target_v: &'a VariantArray<f64>,
    variant: usize,
}

impl GeneratorView<'_> {
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn target_p(&self) -> f64 {
        *self.target_p.get(self.variant)
    }

    pub fn target_v(&self) -> f64 {
        *self.target_v.get(self.variant)
    }

    pub fn is_connected(&self) -> bool {
        *self.entry.terminals[0].connected.get(self.variant)
    }
}

/// Read access to a dangling line in the working variant.
pub struct DanglingLineView<'a> {
    entry: &'a EquipmentEntry,
    p0: &'a VariantArray<f64>,
    q0: &'a VariantArray<f64>,
    pairing_key: Option<&'a str>,
    variant: usize,
}

impl DanglingLineView<'_> {
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn p0(&self) -> f64 {
        *self.p0.get(self.variant)
    }

    pub fn q0(&self) -> f64 {
        *self.q0.get(self.variant)
    }

    /// The boundary code this dangling line pairs on at merge time.
    pub fn pairing_key(&self) -> Option<&str> {
        self.pairing_key
    }
}

/// Read access to a line.
pub struct LineView<'a> {
    entry: &'a EquipmentEntry,
    r: f64,
    x: f64,
}

impl LineView<'_> {
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn x(&self) -> f64 {
        self.x
    }
}

/// Read access to a transformer.
pub struct TransformerView<'a> {
    entry: &'a EquipmentEntry,
    r: f64,
    x: f64,
    ratio: f64,
}

impl TransformerView<'_> {
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

/// Read access to a tie line: the merged equivalent of two paired dangling
/// lines.
pub struct TieLineView<'a> {
    entry: &'a EquipmentEntry,
    half1_id: &'a str,
    half2_id: &'a str,
    pairing_key: Option<&'a str>,
}

impl TieLineView<'_> {
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn half1_id(&self) -> &str {
        self.half1_id
    }

    pub fn half2_id(&self) -> &str {
        self.half2_id
    }

    pub fn pairing_key(&self) -> Option<&str> {
        self.pairing_key
    }
}

/// Read access to an HVDC link in the working variant.
pub struct HvdcLinkView<'a> {
    entry: &'a EquipmentEntry,
    target_p: &'a VariantArray<f64>,
    variant: usize,
}

impl HvdcLinkView<'_> {
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn target_p(&self) -> f64 {
        *self.target_p.get(self.variant)
    }
}

/// Read access to a switch in the working variant.
pub struct SwitchView<'a> {
    entry: &'a SwitchEntry,
    variant: usize,
}

impl SwitchView<'_> {
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn kind(&self) -> SwitchKind {
        self.entry.kind
    }

    pub fn is_open(&self) -> bool {
        *self.entry.open.get(self.variant)
    }

    pub fn is_retained(&self) -> bool {
        self.entry.retained
    }
}

impl Network {
    pub(crate) fn equipment_by_kind(
        &self,
        id: &str,
        kind: EquipmentKind,
    ) -> Result<&EquipmentEntry, Error> {
        let (_, object) = self.object(id)?;
        let ObjectRef::Equipment(handle) = object else {
            return Err(Error::invalid_argument(format!(
                "Object '{}' is not a {}.",
                id, kind
            )));
        };
        let entry = self.equipment_ref(handle)?;
        if entry.kind() != kind {
            return Err(Error::invalid_argument(format!(
                "Object '{}' is not a {}.",
                id, kind
            )));
        }
        Ok(entry)
    }

    pub fn load(&self, id: &str) -> Result<LoadView<'_>, Error> {
        let variant = self.working_index()?;
        let entry = self.equipment_by_kind(id, EquipmentKind::Load)?;
        let EquipmentAttrs::Load { p0, q0 } = &entry.attrs else {
            return Err(Error::internal("Load entry without load attributes."));
        };
        Ok(LoadView {
            entry,
            p0,
            q0,
            variant,
        })
    }

    pub fn generator(&self, id: &str) -> Result<GeneratorView<'_>, Error> {
        let variant = self.working_index()?;
        let entry = self.equipment_by_kind(id, EquipmentKind::Generator)?;
        let EquipmentAttrs::Generator { target_p, target_v } = &entry.attrs else {
            return Err(Error::internal(
                "Generator entry without generator attributes.",
            ));
        };
        Ok(GeneratorView {
            entry,
            target_p,
            target_v,
            variant,
        })
    }

    pub fn dangling_line(&self, id: &str) -> Result<DanglingLineView<'_>, Error> {
        let variant = self.working_index()?;
        let entry = self.equipment_by_kind(id, EquipmentKind::DanglingLine)?;
        let EquipmentAttrs::DanglingLine {
            p0,
            q0,
            pairing_key,
        } = &entry.attrs
        else {
            return Err(Error::internal(
                "Dangling line entry without dangling line attributes.",
            ));
        };
        Ok(DanglingLineView {
            entry,
            p0,
            q0,
            pairing_key: pairing_key.as_deref(),
            variant,
        })
    }

    pub fn line(&self, id: &str) -> Result<LineView<'_>, Error> {
        let entry = self.equipment_by_kind(id, EquipmentKind::Line)?;
        let EquipmentAttrs::Line { r, x } = &entry.attrs else {
            return Err(Error::internal("Line entry without line attributes."));
        };
        Ok(LineView {
            entry,
            r: *r,
            x: *x,
        })
    }

    pub fn transformer(&self, id: &str) -> Result<TransformerView<'_>, Error> {
        let entry = self.equipment_by_kind(id, EquipmentKind::Transformer)?;
        let EquipmentAttrs::Transformer { r, x, ratio } = &entry.attrs else {
            return Err(Error::internal(
                "Transformer entry without transformer attributes.",
            ));
        };
        Ok(TransformerView {
            entry,
            r: *r,
            x: *x,
            ratio: *ratio,
        })
    }

    pub fn tie_line(&self, id: &str) -> Result<TieLineView<'_>, Error> {
        let entry = self.equipment_by_kind(id, EquipmentKind::TieLine)?;
        let EquipmentAttrs::TieLine { half1, half2 } = &entry.attrs else {
            return Err(Error::internal("Tie line entry without halves."));
        };
        Ok(TieLineView {
            entry,
            half1_id: &half1.id,
            half2_id: &half2.id,
            pairing_key: half1.pairing_key.as_deref(),
        })
    }

    pub fn hvdc_link(&self, id: &str) -> Result<HvdcLinkView<'_>, Error> {
        let variant = self.working_index()?;
        let entry = self.equipment_by_kind(id, EquipmentKind::HvdcLink)?;
        let EquipmentAttrs::HvdcLink { target_p } = &entry.attrs else {
            return Err(Error::internal("HVDC entry without HVDC attributes."));
        };
        Ok(HvdcLinkView {
            entry,
            target_p,
            variant,
        })
    }

    pub fn switch(&self, id: &str) -> Result<SwitchView<'_>, Error> {
        let variant = self.working_index()?;
        let (_, object) = self.object(id)?;
        let ObjectRef::Switch(level, switch) = object else {
            return Err(Error::invalid_argument(format!(
                "Object '{}' is not a switch.",
                id
            )));
        };
        let entry = self
            .voltage_level_ref(level)?
            .switch(switch)
            .ok_or_else(|| Error::internal(format!("No switch at index {}.", switch.0)))?;
        Ok(SwitchView { entry, variant })
    }

    /// Whether a terminal is connected in the working variant.
    pub fn is_connected(&self, id: &str, side: Side) -> Result<bool, Error> {
        let variant = self.working_index()?;
        let (_, object) = self.object(id)?;
        let ObjectRef::Equipment(handle) = object else {
            return Err(Error::invalid_argument(format!(
                "Object '{}' has no terminals.",
                id
            )));
        };
        let entry = self.equipment_ref(handle)?;
        let terminal = entry.terminal(side).ok_or_else(|| {
            Error::invalid_argument(format!("Object '{}' has no side {} terminal.", id, side))
        })?;
        Ok(*terminal.connected.get(variant))
    }

    pub fn set_load_p0(&mut self, id: &str, value: f64) -> Result<(), Error> {
        self.set_double(id, EquipmentKind::Load, "p0", value)
    }

    pub fn set_load_q0(&mut self, id: &str, value: f64) -> Result<(), Error> {
        self.set_double(id, EquipmentKind::Load, "q0", value)
    }

    pub fn set_generator_target_p(&mut self, id: &str, value: f64) -> Result<(), Error> {
        self.set_double(id, EquipmentKind::Generator, "target_p", value)
    }

    pub fn set_generator_target_v(&mut self, id: &str, value: f64) -> Result<(), Error> {
        self.set_double(id, EquipmentKind::Generator, "target_v", value)
    }

    pub fn set_dangling_line_p0(&mut self, id: &str, value: f64) -> Result<(), Error> {
        self.set_double(id, EquipmentKind::DanglingLine, "p0", value)
    }

    pub fn set_dangling_line_q0(&mut self, id: &str, value: f64) -> Result<(), Error> {
        self.set_double(id, EquipmentKind::DanglingLine, "q0", value)
    }

    pub fn set_hvdc_link_target_p(&mut self, id: &str, value: f64) -> Result<(), Error> {
        self.set_double(id, EquipmentKind::HvdcLink, "target_p", value)
    }

    /// Writes one double attribute in the working variant and reports the
    /// change to listeners.
    fn set_double(
        &mut self,
        id: &str,
        kind: EquipmentKind,
        attribute: &str,
        value: f64,
    ) -> Result<(), Error> {
        let variant = self.working_index()?;
        // Look the entry up first so kind mismatches fail without mutation.
        let canonical = self.equipment_by_kind(id, kind)?.id.clone();
        let (_, object) = self.object(&canonical)?;
        let ObjectRef::Equipment(handle) = object else {
            return Err(Error::internal("Equipment id resolved to non-equipment."));
        };
        let entry = self.equipment_mut(handle)?;
        let array = match (&mut entry.attrs, attribute) {
            (EquipmentAttrs::Load { p0, .. }, "p0") => p0,
            (EquipmentAttrs::Load { q0, .. }, "q0") => q0,
            (EquipmentAttrs::Generator { target_p, .. }, "target_p") => target_p,
            (EquipmentAttrs::Generator { target_v, .. }, "target_v") => target_v,
            (EquipmentAttrs::DanglingLine { p0, .. }, "p0") => p0,
            (EquipmentAttrs::DanglingLine { q0, .. }, "q0") => q0,
            (EquipmentAttrs::HvdcLink { target_p }, "target_p") => target_p,
            _ => {
                return Err(Error::internal(format!(
                    "Attribute '{}' not stored on a {}.",
                    attribute, kind
                )))
            }
        };
        let old = array.set(variant, value);
        self.notify_update(
            &canonical,
            attribute,
            AttributeValue::Double(old),
            AttributeValue::Double(value),
        );
        Ok(())
    }
}
