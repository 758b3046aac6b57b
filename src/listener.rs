// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The listener contract for external subscribers (format exporters,
//! validation layers) that want to observe object lifecycle and attribute
//! changes.
//!
//! Listeners are invoked synchronously from the mutating call, after the
//! mutation has been applied (`on_update`) or before it happens
//! (`before_removal`).

use std::fmt::Display;

/// An attribute value reported to [`NetworkListener::on_update`].
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Double(f64),
    Int(i64),
    Text(String),
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Bool(value) => write!(f, "{}", value),
            AttributeValue::Double(value) => write!(f, "{}", value),
            AttributeValue::Int(value) => write!(f, "{}", value),
            AttributeValue::Text(value) => write!(f, "{}", value),
        }
    }
}

/// Receives notifications about changes to the network.
///
/// All methods have empty default bodies so implementers only override what
/// they care about.  Listeners must be `Send + Sync`: the network is shared
/// across threads and notifications fire from whichever thread mutates it.
pub trait NetworkListener: Send + Sync {
    /// An identifiable object was added to the network.
    fn on_creation(&self, _id: &str) {}

    /// An identifiable object is about to be removed.  The object is still
    /// fully readable when this fires.
    fn before_removal(&self, _id: &str) {}

    /// A per-variant attribute of an object changed in the working variant.
    fn on_update(&self, _id: &str, _attribute: &str, _old: &AttributeValue, _new: &AttributeValue) {
    }
}
