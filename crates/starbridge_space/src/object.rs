//! Simulated bodies and their closed set of kinds.

use std::fmt;

use starbridge_foundation::BodyId;

use crate::system::SBodyId;

/// Kind of a simulated object.
///
/// `Body` and `ModelBody` are abstract: no body reports them as its own type,
/// but every concrete kind answers [`ObjectType::is_a`] for the abstractions
/// it belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// Anything that exists in space.
    Body,
    /// A body rendered from a model (ships, stations, cargo).
    ModelBody,
    /// A ship.
    Ship,
    /// The player's ship.
    Player,
    /// A space station.
    SpaceStation,
    /// A planet or moon.
    Planet,
    /// A star.
    Star,
    /// A floating cargo canister.
    CargoBody,
    /// Transient weapon fire.
    Projectile,
}

impl ObjectType {
    /// Returns true if this kind is `other` or specializes it.
    #[must_use]
    pub fn is_a(self, other: ObjectType) -> bool {
        if self == other {
            return true;
        }
        match other {
            Self::Body => true,
            Self::ModelBody => matches!(
                self,
                Self::Ship | Self::Player | Self::SpaceStation | Self::CargoBody
            ),
            Self::Ship => self == Self::Player,
            _ => false,
        }
    }

    /// Returns true if bodies of this kind are written to save files.
    #[must_use]
    pub fn is_persistable(self) -> bool {
        !matches!(self, Self::Projectile | Self::Body | Self::ModelBody)
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Body => "Body",
            Self::ModelBody => "ModelBody",
            Self::Ship => "Ship",
            Self::Player => "Player",
            Self::SpaceStation => "SpaceStation",
            Self::Planet => "Planet",
            Self::Star => "Star",
            Self::CargoBody => "CargoBody",
            Self::Projectile => "Projectile",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a ship is in normal space or still in transit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlightState {
    /// In normal space.
    Flying,
    /// In hyperspace, emerging at the given game time.
    Hyperspace {
        /// Game time of arrival in seconds.
        arrival: f64,
    },
}

/// Ship-specific state.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipData {
    /// Name of the ship's type in the ship catalog.
    pub ship_type: String,
    /// Credits in cents.
    pub money: i64,
    /// Station the ship is docked with.
    pub docked_with: Option<BodyId>,
    /// Flight state.
    pub flight: FlightState,
}

impl ShipData {
    /// Creates a flying, undocked, penniless ship of the given type.
    #[must_use]
    pub fn new(ship_type: impl Into<String>) -> Self {
        Self {
            ship_type: ship_type.into(),
            money: 0,
            docked_with: None,
            flight: FlightState::Flying,
        }
    }
}

/// A bulletin-board advert posted by a script module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BBAdvert {
    /// Name of the script module that owns the advert.
    pub module: String,
    /// Module-local reference number.
    pub reference: i32,
    /// Text shown on the board.
    pub description: String,
}

/// Station-specific state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StationData {
    adverts: Vec<BBAdvert>,
}

impl StationData {
    /// Posts an advert.
    pub fn add_advert(&mut self, advert: BBAdvert) {
        self.adverts.push(advert);
    }

    /// Removes every advert with the given owner and reference.
    /// Returns true if any were removed.
    pub fn remove_advert(&mut self, module: &str, reference: i32) -> bool {
        let before = self.adverts.len();
        self.adverts
            .retain(|a| !(a.module == module && a.reference == reference));
        self.adverts.len() != before
    }

    /// Returns the posted adverts in posting order.
    #[must_use]
    pub fn adverts(&self) -> &[BBAdvert] {
        &self.adverts
    }
}

/// Per-kind body state.
#[derive(Clone, Debug, PartialEq)]
pub enum BodyData {
    /// A non-player ship.
    Ship(ShipData),
    /// The player's ship.
    Player(ShipData),
    /// A space station.
    SpaceStation(StationData),
    /// A planet or moon.
    Planet,
    /// A star.
    Star,
    /// A cargo canister holding the named commodity.
    CargoBody(String),
    /// Weapon fire.
    Projectile,
}

/// A simulated body.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// Display label.
    pub label: String,
    /// Position in the system frame, in metres.
    pub position: [f64; 3],
    /// Static topology node this body was generated from.
    pub sbody: Option<SBodyId>,
    /// Per-kind state.
    pub data: BodyData,
}

impl Body {
    fn with_data(label: impl Into<String>, data: BodyData) -> Self {
        Self {
            label: label.into(),
            position: [0.0; 3],
            sbody: None,
            data,
        }
    }

    /// Creates a ship of the given type.
    #[must_use]
    pub fn ship(label: impl Into<String>, ship_type: impl Into<String>) -> Self {
        Self::with_data(label, BodyData::Ship(ShipData::new(ship_type)))
    }

    /// Creates the player's ship.
    #[must_use]
    pub fn player(label: impl Into<String>, ship_type: impl Into<String>) -> Self {
        Self::with_data(label, BodyData::Player(ShipData::new(ship_type)))
    }

    /// Creates a space station.
    #[must_use]
    pub fn station(label: impl Into<String>) -> Self {
        Self::with_data(label, BodyData::SpaceStation(StationData::default()))
    }

    /// Creates a planet.
    #[must_use]
    pub fn planet(label: impl Into<String>) -> Self {
        Self::with_data(label, BodyData::Planet)
    }

    /// Creates a star.
    #[must_use]
    pub fn star(label: impl Into<String>) -> Self {
        Self::with_data(label, BodyData::Star)
    }

    /// Creates a cargo canister.
    #[must_use]
    pub fn cargo(label: impl Into<String>, commodity: impl Into<String>) -> Self {
        Self::with_data(label, BodyData::CargoBody(commodity.into()))
    }

    /// Creates a projectile.
    #[must_use]
    pub fn projectile(label: impl Into<String>) -> Self {
        Self::with_data(label, BodyData::Projectile)
    }

    /// Sets the position.
    #[must_use]
    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }

    /// Sets the static topology node.
    #[must_use]
    pub fn with_sbody(mut self, sbody: SBodyId) -> Self {
        self.sbody = Some(sbody);
        self
    }

    /// Sets the money balance of a ship. No effect on other kinds.
    #[must_use]
    pub fn with_money(mut self, cents: i64) -> Self {
        if let Some(ship) = self.ship_data_mut() {
            ship.money = cents;
        }
        self
    }

    /// Returns the concrete kind of this body.
    #[must_use]
    pub fn object_type(&self) -> ObjectType {
        match self.data {
            BodyData::Ship(_) => ObjectType::Ship,
            BodyData::Player(_) => ObjectType::Player,
            BodyData::SpaceStation(_) => ObjectType::SpaceStation,
            BodyData::Planet => ObjectType::Planet,
            BodyData::Star => ObjectType::Star,
            BodyData::CargoBody(_) => ObjectType::CargoBody,
            BodyData::Projectile => ObjectType::Projectile,
        }
    }

    /// Returns true if this body is `kind` or a specialization of it.
    #[must_use]
    pub fn is_type(&self, kind: ObjectType) -> bool {
        self.object_type().is_a(kind)
    }

    /// Returns ship state for ships and the player.
    #[must_use]
    pub fn ship_data(&self) -> Option<&ShipData> {
        match &self.data {
            BodyData::Ship(ship) | BodyData::Player(ship) => Some(ship),
            _ => None,
        }
    }

    /// Returns mutable ship state for ships and the player.
    pub fn ship_data_mut(&mut self) -> Option<&mut ShipData> {
        match &mut self.data {
            BodyData::Ship(ship) | BodyData::Player(ship) => Some(ship),
            _ => None,
        }
    }

    /// Returns station state.
    #[must_use]
    pub fn station_data(&self) -> Option<&StationData> {
        match &self.data {
            BodyData::SpaceStation(station) => Some(station),
            _ => None,
        }
    }

    /// Returns mutable station state.
    pub fn station_data_mut(&mut self) -> Option<&mut StationData> {
        match &mut self.data {
            BodyData::SpaceStation(station) => Some(station),
            _ => None,
        }
    }
}
