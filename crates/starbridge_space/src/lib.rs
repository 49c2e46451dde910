//! Engine-side state that scripts hold references into.
//!
//! This crate provides:
//! - [`Space`] - Generational body storage with per-body deletion signals
//! - [`Body`] and [`ObjectType`] - The closed set of simulated object kinds
//! - [`Signal`] / [`Connection`] - Deletion notification
//! - [`StarSystem`], [`SysLoc`], [`SBodyPath`] - Static system topology and references into it
//! - [`EntityRegistry`] / [`BodyIndex`] - Stable body indices for save and load
//! - [`ShipType`] - The ship catalog

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod object;
pub mod persist;
pub mod registry;
pub mod ship_type;
pub mod signal;
pub mod space;
pub mod store;
pub mod system;

pub use object::{BBAdvert, Body, BodyData, FlightState, ObjectType, ShipData, StationData};
pub use registry::{BodyIndex, EntityRegistry};
pub use ship_type::ShipType;
pub use signal::{Connection, Signal};
pub use space::{SharedSpace, Space};
pub use store::BodyStore;
pub use system::{SBody, SBodyId, SBodyKind, SBodyPath, StarSystem, SysLoc, SystemGenerator};
