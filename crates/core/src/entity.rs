//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Products are entities (two products with the same id are the same product,
/// whatever the catalog refresh brought in); prices are not.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
