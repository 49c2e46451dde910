//! Script-visible references to live bodies.
//!
//! A [`LiveHandle`] never owns its body. It subscribes to the body's deletion
//! signal when it is created and is cleared, synchronously, when the body is
//! killed. Every accessor answers with a neutral value once the handle is
//! cleared, so scripts can keep a handle around indefinitely without ever
//! reaching a dead body.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use starbridge_foundation::BodyId;
use starbridge_space::{BBAdvert, Body, Connection, ObjectType, SBodyPath, SharedSpace, Space};
use tracing::debug;

/// A non-owning reference to a body in [`Space`], or nothing.
pub struct LiveHandle {
    target: Rc<Cell<Option<BodyId>>>,
    kind: Option<ObjectType>,
    space: Weak<RefCell<Space>>,
    connection: Connection,
}

impl LiveHandle {
    /// Wraps `id`. Never fails: a body that is already gone yields a cleared
    /// handle.
    ///
    /// Borrows `space` immutably, so it must not be called while the space is
    /// mutably borrowed.
    #[must_use]
    pub fn wrap(space: &SharedSpace, id: BodyId) -> Self {
        let guard = space.borrow();
        let (Some(body), Some(signal)) = (guard.get(id), guard.on_delete(id)) else {
            return Self::empty();
        };
        let target = Rc::new(Cell::new(Some(id)));
        let cleared = Rc::clone(&target);
        let connection = signal.connect(move || cleared.set(None));
        Self {
            target,
            kind: Some(body.object_type()),
            space: Rc::downgrade(space),
            connection,
        }
    }

    /// A handle that refers to nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            target: Rc::new(Cell::new(None)),
            kind: None,
            space: Weak::new(),
            connection: Connection::default(),
        }
    }

    /// Clears the handle and drops its subscription. Safe to call repeatedly.
    pub fn on_delete(&mut self) {
        self.target.set(None);
        self.connection.disconnect();
    }

    /// The referenced body, while it is alive.
    #[must_use]
    pub fn body_id(&self) -> Option<BodyId> {
        self.target.get()
    }

    /// The referent's kind, resolved when the handle was created.
    #[must_use]
    pub fn object_type(&self) -> Option<ObjectType> {
        self.target.get().and(self.kind)
    }

    /// Returns true while the referent is alive.
    #[must_use]
    pub fn is_entity(&self) -> bool {
        self.target.get().is_some()
    }

    /// Returns true if the referent is alive and is, or specializes, `kind`.
    #[must_use]
    pub fn is(&self, kind: ObjectType) -> bool {
        self.object_type().is_some_and(|own| own.is_a(kind))
    }

    /// Returns true for any live body.
    #[must_use]
    pub fn is_body(&self) -> bool {
        self.is(ObjectType::Body)
    }

    /// Returns true for live ships, including the player's.
    #[must_use]
    pub fn is_ship(&self) -> bool {
        self.is(ObjectType::Ship)
    }

    /// Returns true for live space stations.
    #[must_use]
    pub fn is_station(&self) -> bool {
        self.is(ObjectType::SpaceStation)
    }

    /// Returns true for the live player ship.
    #[must_use]
    pub fn is_player(&self) -> bool {
        self.is(ObjectType::Player)
    }

    fn with_body<R>(&self, f: impl FnOnce(&Space, &Body) -> R) -> Option<R> {
        let id = self.target.get()?;
        let space = self.space.upgrade()?;
        let guard = space.try_borrow().ok()?;
        guard.get(id).map(|body| f(&guard, body))
    }

    fn with_body_mut(&self, f: impl FnOnce(&mut Body)) {
        let Some(id) = self.target.get() else { return };
        let Some(space) = self.space.upgrade() else {
            return;
        };
        let Ok(mut guard) = space.try_borrow_mut() else {
            return;
        };
        if let Some(body) = guard.get_mut(id) {
            f(body);
        }
    }

    /// The referent's label, or `""`.
    #[must_use]
    pub fn label(&self) -> String {
        self.with_body(|_, body| body.label.clone())
            .unwrap_or_default()
    }

    /// The referent's credit balance, or `0.0` for anything but a live ship.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn money(&self) -> f64 {
        self.with_body(|_, body| body.ship_data().map_or(0.0, |ship| ship.money as f64 * 0.01))
            .unwrap_or(0.0)
    }

    /// Sets the credit balance of a live ship.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_money(&self, credits: f64) {
        let cents = (credits * 100.0).round() as i64;
        self.with_body_mut(|body| {
            if let Some(ship) = body.ship_data_mut() {
                ship.money = cents;
            }
        });
    }

    /// A fresh handle to the station a live ship is docked with.
    #[must_use]
    pub fn docked_with(&self) -> Option<LiveHandle> {
        let station = self
            .with_body(|_, body| body.ship_data().and_then(|ship| ship.docked_with))
            .flatten()?;
        let space = self.space.upgrade()?;
        let handle = LiveHandle::wrap(&space, station);
        handle.is_entity().then_some(handle)
    }

    /// Docks a live ship with `station`, or undocks it for `None`.
    ///
    /// Does nothing if this handle is cleared or not a ship, or if `station`
    /// is cleared or not a station.
    pub fn set_docked_with(&self, station: Option<&LiveHandle>) {
        let Some(ship) = self.target.get().filter(|_| self.is_ship()) else {
            return;
        };
        let Some(space) = self.space.upgrade() else {
            return;
        };
        let Ok(mut guard) = space.try_borrow_mut() else {
            return;
        };
        match station {
            None => guard.undock(ship),
            Some(station) => {
                let Some(id) = station.body_id().filter(|_| station.is_station()) else {
                    return;
                };
                if let Err(err) = guard.dock(ship, id) {
                    debug!(
                        target: "starbridge::script",
                        body = ?ship,
                        %err,
                        "dock request ignored"
                    );
                }
            }
        }
    }

    /// Path of the static body the referent is attached to.
    #[must_use]
    pub fn sbody_path(&self) -> Option<SBodyPath> {
        self.with_body(|space, body| {
            let sbody = body.sbody?;
            space.current_system()?.path_of(sbody)
        })
        .flatten()
    }

    /// Adds a bulletin-board advert to a live station.
    pub fn add_advert(&self, module: &str, reference: i32, description: &str) {
        self.with_body_mut(|body| {
            if let Some(station) = body.station_data_mut() {
                station.add_advert(BBAdvert {
                    module: module.to_string(),
                    reference,
                    description: description.to_string(),
                });
            }
        });
    }

    /// Removes a bulletin-board advert from a live station.
    pub fn remove_advert(&self, module: &str, reference: i32) {
        self.with_body_mut(|body| {
            if let Some(station) = body.station_data_mut() {
                station.remove_advert(module, reference);
            }
        });
    }

    /// Returns true if both handles refer to the same body, or both to nothing.
    #[must_use]
    pub fn same_referent(&self, other: &LiveHandle) -> bool {
        self.body_id() == other.body_id()
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        self.connection.disconnect();
    }
}

impl fmt::Debug for LiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveHandle")
            .field("target", &self.target.get())
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for LiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.object_type() {
            Some(kind) => write!(f, "ObjectWrapper({kind} {:?})", self.label()),
            None => f.write_str("ObjectWrapper(nil)"),
        }
    }
}
