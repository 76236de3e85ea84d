//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two instances holding the same values are
/// the same value (an email address, a score). They are immutable; "changing"
/// one means constructing a new one through its validating constructor.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
