//! The ship catalog.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Static description of a ship model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShipType {
    /// Catalog name.
    pub name: &'static str,
    /// Model used to render the ship.
    pub model: &'static str,
    /// Cargo capacity in tonnes.
    pub capacity: u32,
    /// Empty hull mass in tonnes.
    pub hull_mass: u32,
    /// Base price in cents.
    pub base_price: i64,
    /// Class of the fitted hyperdrive; 0 means none.
    pub hyperdrive_class: u8,
}

impl ShipType {
    /// Ladybird Starfighter.
    pub const LADYBIRD: &'static str = "Ladybird Starfighter";
    /// Sirius Interdictor.
    pub const SIRIUS_INTERDICTOR: &'static str = "Sirius Interdictor";
    /// Guided missile.
    pub const MISSILE_GUIDED: &'static str = "MISSILE_GUIDED";
    /// Unguided missile.
    pub const MISSILE_UNGUIDED: &'static str = "MISSILE_UNGUIDED";

    /// Looks up a ship type by name.
    #[must_use]
    pub fn get(name: &str) -> Option<&'static ShipType> {
        CATALOG.get(name)
    }

    /// Names of every ship type, in sorted order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        CATALOG.keys().copied()
    }

    /// Returns true for missiles, which scripts may not spawn as ships.
    #[must_use]
    pub fn is_missile(&self) -> bool {
        self.name.starts_with("MISSILE_")
    }
}

static CATALOG: LazyLock<BTreeMap<&'static str, ShipType>> = LazyLock::new(|| {
    [
        ShipType {
            name: ShipType::LADYBIRD,
            model: "ladybird",
            capacity: 60,
            hull_mass: 40,
            base_price: 8_700_000,
            hyperdrive_class: 2,
        },
        ShipType {
            name: ShipType::SIRIUS_INTERDICTOR,
            model: "interdictor",
            capacity: 90,
            hull_mass: 60,
            base_price: 14_000_000,
            hyperdrive_class: 3,
        },
        ShipType {
            name: "Eagle Long Range Fighter",
            model: "eagle_lrf",
            capacity: 20,
            hull_mass: 10,
            base_price: 3_800_000,
            hyperdrive_class: 1,
        },
        ShipType {
            name: "Cobra Mk III",
            model: "cobra3",
            capacity: 80,
            hull_mass: 40,
            base_price: 12_400_000,
            hyperdrive_class: 3,
        },
        ShipType {
            name: ShipType::MISSILE_GUIDED,
            model: "missile",
            capacity: 0,
            hull_mass: 1,
            base_price: 5_000,
            hyperdrive_class: 0,
        },
        ShipType {
            name: ShipType::MISSILE_UNGUIDED,
            model: "missile",
            capacity: 0,
            hull_mass: 1,
            base_price: 3_000,
            hyperdrive_class: 0,
        },
    ]
    .into_iter()
    .map(|t| (t.name, t))
    .collect()
});
