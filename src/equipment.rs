// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The typed leaves of the object graph: equipment kinds, their per-variant
//! attributes, and the terminals that attach them to voltage level topology.
//!
//! Equipment is a closed tagged enum rather than an interface hierarchy:
//! every kind carries exactly the per-variant arrays it needs, and all of
//! them share the variant lifecycle contract through
//! [`MultiVariantObject`][crate::variant::MultiVariantObject].

use crate::identifiers::{BusHandle, EquipmentHandle, VoltageLevelHandle};
use crate::variant::array::{VariantArray, VariantOp};
use crate::variant::MultiVariantObject;

/// One side of a piece of equipment.  Injections only have [`Side::One`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    One,
    Two,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::One => write!(f, "1"),
            Side::Two => write!(f, "2"),
        }
    }
}

/// Where a terminal attaches inside its voltage level: an integer node in a
/// node-breaker level, or a configured bus in a bus-breaker level.
#[derive(Clone, Debug, PartialEq)]
pub enum AttachPoint {
    Node(usize),
    Bus(String),
}

impl Default for AttachPoint {
    fn default() -> Self {
        AttachPoint::Node(0)
    }
}

/// The kind of a piece of equipment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EquipmentKind {
    Load,
    Generator,
    BusbarSection,
    DanglingLine,
    Line,
    Transformer,
    TieLine,
    HvdcLink,
}

impl std::fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EquipmentKind::Load => write!(f, "Load"),
            EquipmentKind::Generator => write!(f, "Generator"),
            EquipmentKind::BusbarSection => write!(f, "BusbarSection"),
            EquipmentKind::DanglingLine => write!(f, "DanglingLine"),
            EquipmentKind::Line => write!(f, "Line"),
            EquipmentKind::Transformer => write!(f, "Transformer"),
            EquipmentKind::TieLine => write!(f, "TieLine"),
            EquipmentKind::HvdcLink => write!(f, "HvdcLink"),
        }
    }
}

/// Predicates over equipment kinds.
pub(crate) trait KindPredicates {
    fn kind(&self) -> EquipmentKind;

    /// Branch-like equipment with two terminals, eligible as a component
    /// edge.
    fn is_branch(&self) -> bool {
        matches!(
            self.kind(),
            EquipmentKind::Line
                | EquipmentKind::Transformer
                | EquipmentKind::TieLine
                | EquipmentKind::HvdcLink
        )
    }

    /// Whether a closed, connected instance preserves AC synchronism across
    /// its terminals.  DC-mediated links do not.
    fn joins_synchronously(&self) -> bool {
        self.is_branch() && self.kind() != EquipmentKind::HvdcLink
    }

    fn is_busbar_section(&self) -> bool {
        self.kind() == EquipmentKind::BusbarSection
    }

    fn is_dangling_line(&self) -> bool {
        self.kind() == EquipmentKind::DanglingLine
    }
}

/// A terminal: the attachment of one equipment side to a voltage level.
///
/// The attachment point is fixed at creation; whether the terminal is
/// *connected* (conducting) is per-variant state.
#[derive(Clone, Debug)]
pub(crate) struct TerminalData {
    pub(crate) voltage_level: VoltageLevelHandle,
    pub(crate) attachment: Attachment,
    pub(crate) connected: VariantArray<bool>,
}

/// The resolved, internal form of [`AttachPoint`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Attachment {
    Node(usize),
    Bus(BusHandle),
}

/// Kind-specific attributes.  Per-variant attributes are `VariantArray`s;
/// everything else is fixed at creation.
#[derive(Clone, Debug)]
pub(crate) enum EquipmentAttrs {
    Load {
        p0: VariantArray<f64>,
        q0: VariantArray<f64>,
    },
    Generator {
        target_p: VariantArray<f64>,
        target_v: VariantArray<f64>,
    },
    BusbarSection,
    DanglingLine {
        p0: VariantArray<f64>,
        q0: VariantArray<f64>,
        pairing_key: Option<String>,
    },
    Line {
        r: f64,
        x: f64,
    },
    Transformer {
        r: f64,
        x: f64,
        ratio: f64,
    },
    TieLine {
        half1: DanglingHalf,
        half2: DanglingHalf,
    },
    HvdcLink {
        target_p: VariantArray<f64>,
    },
}

/// One half of a tie line: everything needed to reconstruct the original
/// dangling line if the merged networks are detached again.
#[derive(Clone, Debug)]
pub(crate) struct DanglingHalf {
    pub(crate) id: String,
    pub(crate) pairing_key: Option<String>,
    pub(crate) p0: VariantArray<f64>,
    pub(crate) q0: VariantArray<f64>,
}

/// An equipment arena entry.
#[derive(Clone, Debug)]
pub(crate) struct EquipmentEntry {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    /// Id of the owning subnetwork; `None` for root-level objects and for
    /// tie lines, which span subnetworks by construction.
    pub(crate) subnetwork: Option<String>,
    pub(crate) terminals: Vec<TerminalData>,
    pub(crate) attrs: EquipmentAttrs,
}

impl KindPredicates for EquipmentEntry {
    fn kind(&self) -> EquipmentKind {
        match &self.attrs {
            EquipmentAttrs::Load { .. } => EquipmentKind::Load,
            EquipmentAttrs::Generator { .. } => EquipmentKind::Generator,
            EquipmentAttrs::BusbarSection => EquipmentKind::BusbarSection,
            EquipmentAttrs::DanglingLine { .. } => EquipmentKind::DanglingLine,
            EquipmentAttrs::Line { .. } => EquipmentKind::Line,
            EquipmentAttrs::Transformer { .. } => EquipmentKind::Transformer,
            EquipmentAttrs::TieLine { .. } => EquipmentKind::TieLine,
            EquipmentAttrs::HvdcLink { .. } => EquipmentKind::HvdcLink,
        }
    }
}

impl EquipmentEntry {
    pub(crate) fn terminal(&self, side: Side) -> Option<&TerminalData> {
        self.terminals.get(terminal_slot(side))
    }

    pub(crate) fn terminal_mut(&mut self, side: Side) -> Option<&mut TerminalData> {
        self.terminals.get_mut(terminal_slot(side))
    }

    fn apply(&mut self, op: &VariantOp<'_>) {
        for terminal in &mut self.terminals {
            terminal.connected.apply(op);
        }
        match &mut self.attrs {
            EquipmentAttrs::Load { p0, q0 } | EquipmentAttrs::DanglingLine { p0, q0, .. } => {
                p0.apply(op);
                q0.apply(op);
            }
            EquipmentAttrs::Generator { target_p, target_v } => {
                target_p.apply(op);
                target_v.apply(op);
            }
            EquipmentAttrs::TieLine { half1, half2 } => {
                for half in [half1, half2] {
                    half.p0.apply(op);
                    half.q0.apply(op);
                }
            }
            EquipmentAttrs::HvdcLink { target_p } => target_p.apply(op),
            EquipmentAttrs::BusbarSection
            | EquipmentAttrs::Line { .. }
            | EquipmentAttrs::Transformer { .. } => {}
        }
    }
}

impl MultiVariantObject for EquipmentEntry {
    fn extend_variants(&mut self, count: usize, source_index: usize) {
        self.apply(&VariantOp::Extend {
            count,
            source: source_index,
        });
    }

    fn reduce_variants(&mut self, count: usize) {
        self.apply(&VariantOp::Reduce { count });
    }

    fn delete_variant(&mut self, index: usize) {
        self.apply(&VariantOp::Delete { index });
    }

    fn allocate_variants(&mut self, indexes: &[usize], source_index: usize) {
        self.apply(&VariantOp::Allocate {
            indexes,
            source: source_index,
        });
    }
}

pub(crate) fn terminal_slot(side: Side) -> usize {
    match side {
        Side::One => 0,
        Side::Two => 1,
    }
}

/// A terminal attachment resolved against a voltage level, as consumed by
/// the calculated-bus computation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AttachedTerminal {
    pub(crate) equipment: EquipmentHandle,
    pub(crate) slot: usize,
    /// Node number in a node-breaker level; configured bus arena index in a
    /// bus-breaker level.
    pub(crate) point: usize,
    pub(crate) busbar: bool,
    pub(crate) connected: bool,
}

/// Descriptor for [`Network::add_load`][crate::Network::add_load].
#[derive(Clone, Debug, Default)]
pub struct LoadSpec {
    pub id: String,
    pub name: Option<String>,
    pub voltage_level: String,
    pub attachment: AttachPoint,
    pub p0: f64,
    pub q0: f64,
}

/// Descriptor for [`Network::add_generator`][crate::Network::add_generator].
#[derive(Clone, Debug, Default)]
pub struct GeneratorSpec {
    pub id: String,
    pub name: Option<String>,
    pub voltage_level: String,
    pub attachment: AttachPoint,
    pub target_p: f64,
    pub target_v: f64,
}

/// Descriptor for
/// [`Network::add_busbar_section`][crate::Network::add_busbar_section].
/// Busbar sections only exist in node-breaker levels.
#[derive(Clone, Debug, Default)]
pub struct BusbarSectionSpec {
    pub id: String,
    pub name: Option<String>,
    pub voltage_level: String,
    pub node: usize,
}

/// Descriptor for
/// [`Network::add_dangling_line`][crate::Network::add_dangling_line].
///
/// The `pairing_key` is the cross-network boundary code two dangling lines
/// must share to be merged into a tie line.
#[derive(Clone, Debug, Default)]
pub struct DanglingLineSpec {
    pub id: String,
    pub name: Option<String>,
    pub voltage_level: String,
    pub attachment: AttachPoint,
    pub p0: f64,
    pub q0: f64,
    pub pairing_key: Option<String>,
}

/// Descriptor for [`Network::add_line`][crate::Network::add_line].
#[derive(Clone, Debug, Default)]
pub struct LineSpec {
    pub id: String,
    pub name: Option<String>,
    pub voltage_level1: String,
    pub attachment1: AttachPoint,
    pub voltage_level2: String,
    pub attachment2: AttachPoint,
    pub r: f64,
    pub x: f64,
}

/// Descriptor for [`Network::add_transformer`][crate::Network::add_transformer].
/// Both ends must be in voltage levels of the same substation.
#[derive(Clone, Debug, Default)]
pub struct TransformerSpec {
    pub id: String,
    pub name: Option<String>,
    pub voltage_level1: String,
    pub attachment1: AttachPoint,
    pub voltage_level2: String,
    pub attachment2: AttachPoint,
    pub r: f64,
    pub x: f64,
    pub ratio: f64,
}

/// Descriptor for [`Network::add_hvdc_link`][crate::Network::add_hvdc_link].
///
/// An HVDC link joins its two sides into one connected component but never
/// into one synchronous component.
#[derive(Clone, Debug, Default)]
pub struct HvdcLinkSpec {
    pub id: String,
    pub name: Option<String>,
    pub voltage_level1: String,
    pub attachment1: AttachPoint,
    pub voltage_level2: String,
    pub attachment2: AttachPoint,
    pub target_p: f64,
}
