//! Deletion notification.
//!
//! Every body in [`Space`](crate::Space) carries a [`Signal`] that fires once,
//! synchronously, when the body is killed. Anything holding a non-owning
//! reference to the body connects a slot and clears itself from that slot.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

type Slot = Box<dyn FnMut()>;

#[derive(Default)]
struct Slots {
    next_id: u64,
    slots: BTreeMap<u64, Slot>,
}

/// A one-shot, multi-subscriber notification.
#[derive(Default)]
pub struct Signal {
    slots: Rc<RefCell<Slots>>,
}

impl Signal {
    /// Creates a signal with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `slot`, returning the handle that unsubscribes it.
    pub fn connect(&self, slot: impl FnMut() + 'static) -> Connection {
        let mut slots = self.slots.borrow_mut();
        let id = slots.next_id;
        slots.next_id += 1;
        slots.slots.insert(id, Box::new(slot));
        Connection {
            slots: Rc::downgrade(&self.slots),
            id,
        }
    }

    /// Calls every subscribed slot once, in subscription order, and drops them.
    ///
    /// Slots run after the subscriber list has been emptied, so a slot may
    /// disconnect itself or anything else without re-entering the signal.
    pub fn emit(&self) {
        let drained = std::mem::take(&mut self.slots.borrow_mut().slots);
        for (_, mut slot) in drained {
            slot();
        }
    }

    /// Returns the number of connected slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.borrow().slots.len()
    }

    /// Returns true if nothing is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal").field("slots", &self.len()).finish()
    }
}

/// Subscription to a [`Signal`].
///
/// Dropping a connection does not disconnect it; call [`Connection::disconnect`].
#[derive(Debug, Default)]
pub struct Connection {
    slots: Weak<RefCell<Slots>>,
    id: u64,
}

impl Connection {
    /// Removes the slot from its signal.
    ///
    /// Safe to call any number of times, after the signal has fired, or after
    /// the signal itself has been dropped.
    pub fn disconnect(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            // A slot disconnecting itself during emit finds the list already drained.
            if let Ok(mut slots) = slots.try_borrow_mut() {
                slots.slots.remove(&self.id);
            }
        }
        self.slots = Weak::new();
    }

    /// Returns true while the slot is still subscribed.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.slots
            .upgrade()
            .is_some_and(|slots| slots.borrow().slots.contains_key(&self.id))
    }
}
