//! Body identifiers with generational indices.

use std::fmt;

/// Identifier of a body owned by the simulation.
///
/// The generation counter increments each time a slot is reused after the body
/// living there is killed, so an id kept past its body's lifetime never aliases
/// the slot's next occupant.
///
/// A `BodyId` is only meaningful inside the `Space` that issued it. It is never
/// written to a save file; persistence goes through stable registry indices.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BodyId {
    /// Slot in body storage.
    pub slot: u32,
    /// Generation counter for stale reference detection.
    pub generation: u32,
}

impl BodyId {
    /// Creates a body ID with the given slot and generation.
    #[must_use]
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }
}

impl fmt::Debug for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BodyId({}v{})", self.slot, self.generation)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body({})", self.slot)
    }
}
