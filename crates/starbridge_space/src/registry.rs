//! Stable body indices for save and load.
//!
//! A [`BodyId`] is only meaningful inside the process that issued it, so
//! nothing that reaches a save file ever holds one. Saves store the small
//! integer a registry assigns instead, and a load binds each index to the body
//! reconstructed for it.

use std::collections::HashMap;

use starbridge_foundation::{BodyId, Error, Result};

use crate::space::Space;

/// Bidirectional mapping between live bodies and stable indices.
///
/// Index `0` is reserved for "no body" and is never assigned.
pub trait EntityRegistry {
    /// Returns the index for `body`, assigning the next free one if it has none.
    fn index_of(&mut self, body: BodyId) -> u32;

    /// Returns the body bound to `index`, or `None` if it was never bound or
    /// has not been reconstructed yet.
    fn entity_at(&self, index: u32) -> Option<BodyId>;
}

/// The session's registry.
///
/// Indices are assigned during the save phase and bound during the load
/// phase. Outside those phases the table is only read. Indices are never
/// reused within a session, so a saved index keeps naming the same body
/// across every save; bodies that died are dropped from the table the next
/// time [`index_all`](Self::index_all) runs.
#[derive(Debug, Default, Clone)]
pub struct BodyIndex {
    by_body: HashMap<BodyId, u32>,
    by_index: HashMap<u32, BodyId>,
    /// Highest index handed out or bound so far.
    last: u32,
}

impl BodyIndex {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets bodies that are no longer alive in `space`, then assigns
    /// indices to every persistable body, in body order.
    ///
    /// Bodies that already have an index keep it.
    pub fn index_all(&mut self, space: &Space) {
        self.by_body.retain(|id, _| space.exists(*id));
        self.by_index.retain(|_, id| space.exists(*id));
        for (id, body) in space.bodies() {
            if body.object_type().is_persistable() {
                self.index_of(id);
            }
        }
    }

    /// Binds `index` to a reconstructed body.
    ///
    /// # Errors
    ///
    /// Returns a malformed-record error for index `0` or an index already
    /// bound to a different body.
    pub fn bind(&mut self, index: u32, body: BodyId) -> Result<()> {
        if index == 0 {
            return Err(Error::malformed("body index above 0", "0"));
        }
        match self.by_index.get(&index) {
            Some(&existing) if existing != body => Err(Error::malformed(
                format!("index {index} bound once"),
                format!("{existing:?} and {body:?}"),
            )),
            _ => {
                self.by_index.insert(index, body);
                self.by_body.insert(body, index);
                self.last = self.last.max(index);
                Ok(())
            }
        }
    }

    /// Forgets every assignment.
    pub fn clear(&mut self) {
        self.by_body.clear();
        self.by_index.clear();
        self.last = 0;
    }

    /// Returns the number of bodies with an index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_body.len()
    }

    /// Returns true if no body has an index.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_body.is_empty()
    }

    /// Returns the index already assigned to `body`, without assigning one.
    #[must_use]
    pub fn lookup(&self, body: BodyId) -> Option<u32> {
        self.by_body.get(&body).copied()
    }

    fn next_free(&self) -> u32 {
        match self.last.checked_add(1) {
            Some(next) => next,
            // Only reachable after binding u32::MAX; fill the lowest gap.
            None => (1..=u32::MAX)
                .find(|i| !self.by_index.contains_key(i))
                .unwrap_or(u32::MAX),
        }
    }
}

impl EntityRegistry for BodyIndex {
    fn index_of(&mut self, body: BodyId) -> u32 {
        if let Some(&index) = self.by_body.get(&body) {
            return index;
        }
        let index = self.next_free();
        self.last = self.last.max(index);
        self.by_index.insert(index, body);
        self.by_body.insert(body, index);
        index
    }

    fn entity_at(&self, index: u32) -> Option<BodyId> {
        self.by_index.get(&index).copied()
    }
}
