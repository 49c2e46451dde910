//! The Lua bridge for Starbridge.
//!
//! This crate provides:
//! - [`LiveHandle`] - Script-visible references to bodies that clear themselves when the body dies
//! - [`codec`] - The tagged text encoding of handles, paths, and locations
//! - [`lua`] - Userdata classes and the `Pi`, `Rand`, and `Date` globals
//! - [`Session`] - A Lua state bound to a simulation, with save and load
//! - [`save`] - `MessagePack` save files

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod codec;
pub mod config;
pub mod handle;
pub mod lua;
pub mod persist;
pub mod save;
pub mod session;

pub use codec::{Decoded, WireRef, OBJECT_WRAPPER_TAG, SBODY_PATH_TAG, SYSLOC_TAG};
pub use config::SessionConfig;
pub use handle::LiveHandle;
pub use lua::{Bridge, LuaSBodyPath, LuaSysLoc, Message};
pub use save::{SaveGame, SavedTable, SavedValue, SAVE_VERSION};
pub use session::Session;
