//! The simulation's body container.
//!
//! `Space` owns every body. Killing a body fires its deletion signal before
//! `kill_body` returns, so every non-owning reference to it is cleared
//! synchronously.

use std::cell::RefCell;
use std::rc::Rc;

use starbridge_foundation::{BodyId, Error, ErrorKind, Result};
use tracing::debug;

use crate::object::{Body, FlightState, ObjectType};
use crate::signal::Signal;
use crate::store::BodyStore;
use crate::system::{StarSystem, SysLoc};

/// Space shared between the simulation and script-side handles.
pub type SharedSpace = Rc<RefCell<Space>>;

#[derive(Debug)]
struct Entry {
    body: Body,
    on_delete: Signal,
}

/// All bodies in the current system, plus game time.
#[derive(Debug, Default)]
pub struct Space {
    bodies: BodyStore<Entry>,
    /// Insertion order, which is also save order.
    order: Vec<BodyId>,
    player: Option<BodyId>,
    game_time: f64,
    system: Option<Rc<StarSystem>>,
}

impl Space {
    /// Creates an empty space at game time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps this space for sharing.
    #[must_use]
    pub fn into_shared(self) -> SharedSpace {
        Rc::new(RefCell::new(self))
    }

    /// Adds a body. The first player body added becomes the player.
    pub fn add_body(&mut self, body: Body) -> BodyId {
        let is_player = body.object_type() == ObjectType::Player;
        let label = body.label.clone();
        let id = self.bodies.insert(Entry {
            body,
            on_delete: Signal::new(),
        });
        self.order.push(id);
        if is_player && self.player.is_none() {
            self.player = Some(id);
        }
        debug!(target: "starbridge::space", body = ?id, %label, "added body");
        id
    }

    /// Removes a body and notifies everything subscribed to its deletion.
    ///
    /// Ships docked with the body are undocked first.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is stale or was never issued.
    pub fn kill_body(&mut self, id: BodyId) -> Result<Body> {
        let entry = self.bodies.remove(id)?;
        self.order.retain(|&other| other != id);
        if self.player == Some(id) {
            self.player = None;
        }
        for other in &self.order {
            if let Some(ship) = self
                .bodies
                .get_mut(*other)
                .and_then(|e| e.body.ship_data_mut())
                .filter(|ship| ship.docked_with == Some(id))
            {
                ship.docked_with = None;
            }
        }
        debug!(
            target: "starbridge::space",
            body = ?id,
            label = %entry.body.label,
            subscribers = entry.on_delete.len(),
            "killed body"
        );
        entry.on_delete.emit();
        Ok(entry.body)
    }

    /// Kills every body, in insertion order, and forgets the player.
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.order) {
            if let Ok(entry) = self.bodies.remove(id) {
                entry.on_delete.emit();
            }
        }
        self.player = None;
    }

    /// Returns a body.
    #[must_use]
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id).map(|e| &e.body)
    }

    /// Returns a body mutably.
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id).map(|e| &mut e.body)
    }

    /// Returns true if `id` names a live body.
    #[must_use]
    pub fn exists(&self, id: BodyId) -> bool {
        self.bodies.contains(id)
    }

    /// Returns the deletion signal of a live body.
    #[must_use]
    pub fn on_delete(&self, id: BodyId) -> Option<&Signal> {
        self.bodies.get(id).map(|e| &e.on_delete)
    }

    /// Iterates over live bodies in insertion order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.get(id).map(|body| (id, body)))
    }

    /// Returns the number of live bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns true if space holds no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Finds the first body with the given label.
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<BodyId> {
        self.bodies()
            .find(|(_, body)| body.label == label)
            .map(|(id, _)| id)
    }

    /// Returns the player's ship.
    #[must_use]
    pub fn player(&self) -> Option<BodyId> {
        self.player.filter(|&id| self.exists(id))
    }

    /// Makes `id` the player's ship.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a live player body.
    pub fn set_player(&mut self, id: BodyId) -> Result<()> {
        match self.get(id) {
            Some(body) if body.object_type() == ObjectType::Player => {
                self.player = Some(id);
                Ok(())
            }
            Some(body) => Err(Error::new(ErrorKind::Internal(format!(
                "{id:?} is a {}, not a player",
                body.object_type()
            )))),
            None => Err(Error::body_not_found(id)),
        }
    }

    /// Current game time in seconds.
    #[must_use]
    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    /// Sets the game time without running arrivals.
    pub fn set_game_time(&mut self, time: f64) {
        self.game_time = time;
    }

    /// The loaded star system.
    #[must_use]
    pub fn current_system(&self) -> Option<&Rc<StarSystem>> {
        self.system.as_ref()
    }

    /// Replaces the loaded star system.
    pub fn set_current_system(&mut self, system: StarSystem) {
        self.system = Some(Rc::new(system));
    }

    /// Drops the loaded star system.
    pub fn unload_system(&mut self) {
        self.system = None;
    }

    /// Location of the loaded star system, rebuilt from it on every call.
    #[must_use]
    pub fn current_location(&self) -> Option<SysLoc> {
        self.system.as_ref().map(|system| system.loc())
    }

    /// Advances game time and brings out of hyperspace every ship whose
    /// arrival has come. Returns the ships that arrived.
    pub fn time_step(&mut self, dt: f64) -> Vec<BodyId> {
        self.game_time += dt;
        let now = self.game_time;
        let mut arrived = Vec::new();
        for &id in &self.order {
            let Some(ship) = self.bodies.get_mut(id).and_then(|e| e.body.ship_data_mut()) else {
                continue;
            };
            if let FlightState::Hyperspace { arrival } = ship.flight {
                if arrival <= now {
                    ship.flight = FlightState::Flying;
                    arrived.push(id);
                }
            }
        }
        for id in &arrived {
            debug!(target: "starbridge::space", body = ?id, time = now, "hyperspace arrival");
        }
        arrived
    }

    /// Docks a ship with a station.
    ///
    /// # Errors
    ///
    /// Returns an error if either body is gone or is the wrong kind.
    pub fn dock(&mut self, ship: BodyId, station: BodyId) -> Result<()> {
        match self.get(station) {
            Some(body) if body.is_type(ObjectType::SpaceStation) => {}
            Some(body) => {
                return Err(Error::new(ErrorKind::Internal(format!(
                    "cannot dock with a {}",
                    body.object_type()
                ))));
            }
            None => return Err(Error::body_not_found(station)),
        }
        let ship_data = self
            .get_mut(ship)
            .ok_or_else(|| Error::body_not_found(ship))?
            .ship_data_mut()
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("{ship:?} is not a ship"))))?;
        ship_data.docked_with = Some(station);
        Ok(())
    }

    /// Undocks a ship. No effect if it is not docked.
    pub fn undock(&mut self, ship: BodyId) {
        if let Some(data) = self.get_mut(ship).and_then(Body::ship_data_mut) {
            data.docked_with = None;
        }
    }
}
