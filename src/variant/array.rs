// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Dense per-variant value storage.
//!
//! Every mutable attribute of a stateful network object is stored in a
//! [`VariantArray`], one slot per live variant.  The slot at a given index
//! belongs to the variant the [registry][crate::variant::registry] currently
//! maps to that index; a slot left behind by a removed non-tail variant stays
//! physically present until the next clone recycles it.

/// A dense array of per-variant values.
///
/// Indexes are assigned and recycled by the variant registry; this type only
/// carries the values and the four lifecycle operations the registry
/// broadcasts.
#[derive(Clone, Debug)]
pub(crate) struct VariantArray<T> {
    values: Vec<T>,
}

impl<T: Clone> VariantArray<T> {
    /// Creates an array of `size` slots, each holding a copy of `init`.
    pub(crate) fn new(size: usize, init: T) -> Self {
        Self {
            values: vec![init; size],
        }
    }

    /// Returns the value of the variant at `index`.
    pub(crate) fn get(&self, index: usize) -> &T {
        &self.values[index]
    }

    /// Replaces the value of the variant at `index`, returning the old value.
    pub(crate) fn set(&mut self, index: usize, value: T) -> T {
        std::mem::replace(&mut self.values[index], value)
    }

    /// Appends `count` copies of the value at `source_index`.
    pub(crate) fn extend(&mut self, count: usize, source_index: usize) {
        let source = self.values[source_index].clone();
        self.values
            .extend(std::iter::repeat(source).take(count));
    }

    /// Drops the last `count` slots.
    pub(crate) fn reduce(&mut self, count: usize) {
        self.values.truncate(self.values.len() - count);
    }

    /// Marks a non-tail slot unused.  The value stays in place and must not
    /// be read again until [`allocate`][Self::allocate] overwrites it.
    pub(crate) fn delete(&mut self, _index: usize) {}

    /// Overwrites each recycled slot in `indexes` with a copy of the value at
    /// `source_index`.
    pub(crate) fn allocate(&mut self, indexes: &[usize], source_index: usize) {
        let source = self.values[source_index].clone();
        for &index in indexes {
            self.values[index] = source.clone();
        }
    }

    /// The physical size of the array, recycled slots included.
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Applies one broadcast lifecycle event.
    ///
    /// Objects holding several arrays forward the same event to each of
    /// them; see [`MultiVariantObject`][crate::variant::MultiVariantObject].
    pub(crate) fn apply(&mut self, op: &VariantOp<'_>) {
        match *op {
            VariantOp::Extend { count, source } => self.extend(count, source),
            VariantOp::Reduce { count } => self.reduce(count),
            VariantOp::Delete { index } => self.delete(index),
            VariantOp::Allocate { indexes, source } => self.allocate(indexes, source),
        }
    }
}

/// A variant lifecycle event in broadcastable form.
#[derive(Clone, Copy, Debug)]
pub(crate) enum VariantOp<'a> {
    Extend { count: usize, source: usize },
    Reduce { count: usize },
    Delete { index: usize },
    Allocate { indexes: &'a [usize], source: usize },
}
