//! Entity trait: identity + continuity across state changes.
//!
//! Keyed sub-entities of the tender aggregate (lots, items, documents,
//! persons, business functions) implement this; the reconciler merges
//! collections of them by key.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
