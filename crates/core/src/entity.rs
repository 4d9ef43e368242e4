//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A catalog item keeps its identity through every update and stock
/// adjustment; two snapshots with the same id describe the same item.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
