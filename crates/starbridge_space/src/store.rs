//! Generational slot storage.
//!
//! `BodyStore` hands out [`BodyId`]s and detects stale ids held past the
//! lifetime of the value they were issued for.

// Slot counts stay far below u32::MAX
#![allow(clippy::cast_possible_truncation)]

use starbridge_foundation::{BodyId, Error, Result};

#[derive(Debug, Clone)]
struct Slot<T> {
    /// Even generations are free, odd generations are occupied.
    generation: u32,
    value: Option<T>,
}

/// Values addressed by generational ids.
///
/// Freed slots go on a free list and are reused; their generation is
/// incremented on both removal and reuse, so an id never matches two values.
#[derive(Debug, Clone)]
pub struct BodyStore<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    live_count: usize,
}

impl<T> Default for BodyStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BodyStore<T> {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live_count: 0,
        }
    }

    /// Inserts a value, returns its ID.
    ///
    /// Reuses slots from the free list when available.
    pub fn insert(&mut self, value: T) -> BodyId {
        self.live_count += 1;

        if let Some(slot) = self.free_list.pop() {
            let entry = &mut self.slots[slot as usize];
            // Was even/free, now odd/occupied
            entry.generation += 1;
            entry.value = Some(value);
            BodyId::new(slot, entry.generation)
        } else {
            let slot = self.slots.len() as u32;
            // New slots start at generation 1 (odd = occupied)
            self.slots.push(Slot {
                generation: 1,
                value: Some(value),
            });
            BodyId::new(slot, 1)
        }
    }

    /// Removes a value and frees its slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is stale or was never issued.
    pub fn remove(&mut self, id: BodyId) -> Result<T> {
        self.validate(id)?;

        let entry = &mut self.slots[id.slot as usize];
        // Was odd/occupied, now even/free
        entry.generation += 1;
        self.free_list.push(id.slot);
        self.live_count -= 1;
        entry
            .value
            .take()
            .ok_or_else(|| Error::body_not_found(id))
    }

    /// Checks if an ID refers to a current value.
    #[must_use]
    pub fn contains(&self, id: BodyId) -> bool {
        self.validate(id).is_ok()
    }

    /// Validates that an ID is current.
    ///
    /// # Errors
    ///
    /// Returns a stale-body error on generation mismatch, or body-not-found if
    /// the slot was never allocated or is free.
    pub fn validate(&self, id: BodyId) -> Result<()> {
        let Some(entry) = self.slots.get(id.slot as usize) else {
            return Err(Error::body_not_found(id));
        };

        if entry.generation != id.generation {
            // Value was removed and the slot possibly reused
            return Err(Error::stale_body(id));
        }

        if entry.generation % 2 == 0 {
            return Err(Error::body_not_found(id));
        }

        Ok(())
    }

    /// Returns the value for a current ID.
    #[must_use]
    pub fn get(&self, id: BodyId) -> Option<&T> {
        self.slots
            .get(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.value.as_ref())
    }

    /// Returns the value for a current ID mutably.
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut T> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.value.as_mut())
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates over stored values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(slot, entry)| {
            entry
                .value
                .as_ref()
                .map(|value| (BodyId::new(slot as u32, entry.generation), value))
        })
    }

    /// Returns the current generation for a slot, if it exists.
    #[must_use]
    pub fn generation(&self, slot: u32) -> Option<u32> {
        self.slots.get(slot as usize).map(|entry| entry.generation)
    }
}
