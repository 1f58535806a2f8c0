// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `register` module defines the [RegisterDescriptor] type.

/// Describes an IR value produced by the code generator: the virtual register (or
/// immediate) that holds it, plus lightweight compile-time knowledge about it.
///
/// The descriptor is the generator's constant-propagation currency. A value whose
/// `name` is a decimal immediate costs no instruction to materialize; a value that is
/// statically zero lets the generator elide byte truncation and detect zero divisors.
/// Tracking is lexical, not flow-sensitive: a value that is zero only along some
/// dynamic path is not considered zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDescriptor {
    /// The virtual register name (e.g. `%t7`), or a decimal immediate (e.g. `0`).
    /// For a variable symbol this is the stack-slot pointer register; the zero/value
    /// fields then describe the content currently stored in the slot.
    pub name: String,
    /// Is the value statically known to be zero?
    pub is_zero: bool,
    /// The value, when it is statically known.
    pub known_value: Option<i64>,
}

impl RegisterDescriptor {
    /// Creates a descriptor for a register with an unknown value.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_zero: false, known_value: None }
    }

    /// Creates a descriptor for a register whose value is statically known.
    pub fn known(name: impl Into<String>, value: i64) -> Self {
        Self { name: name.into(), is_zero: value == 0, known_value: Some(value) }
    }

    /// Creates a descriptor for a known constant, using the decimal immediate itself
    /// as the operand name so that no instruction is needed to materialize it.
    pub fn immediate(value: i64) -> Self {
        Self::known(value.to_string(), value)
    }

    /// Creates a descriptor with the given name, carrying over another descriptor's
    /// statically-known value.
    pub fn renamed(name: impl Into<String>, source: &RegisterDescriptor) -> Self {
        Self { name: name.into(), is_zero: source.is_zero, known_value: source.known_value }
    }
}
