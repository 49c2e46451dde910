//! Lua registration.
//!
//! [`install`] stores a [`Bridge`] in the Lua state's app data and registers
//! the userdata classes and global tables scripts use:
//!
//! - `ObjectWrapper` userdata for [`LiveHandle`](crate::LiveHandle)
//! - `SysLoc` and `SBodyPath` userdata, plus the `SysLoc.new` constructor
//! - `UserDataSerialize` / `UserDataUnserialize`
//! - the `Pi`, `Rand`, and `Date` tables

use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Error as LuaError, Lua, Result as LuaResult};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use starbridge_foundation::Error;
use starbridge_space::{BodyIndex, SharedSpace};

use crate::config::SessionConfig;

mod codec;
mod globals;
mod object;
mod values;

pub(crate) use codec::{decoded_into_lua, encode_userdata};
pub use values::{LuaSBodyPath, LuaSysLoc};

/// A message shown to the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Sender name; empty for system messages.
    pub from: String,
    /// Message text.
    pub text: String,
    /// Whether the message interrupts the player.
    pub important: bool,
}

/// Engine state reachable from script callbacks.
///
/// Every field is shared with the owning session.
#[derive(Clone, Debug)]
pub struct Bridge {
    /// The simulation's bodies.
    pub space: SharedSpace,
    /// Stable body indices for the codec.
    pub registry: Rc<RefCell<BodyIndex>>,
    /// Session RNG.
    pub rng: Rc<RefCell<ChaCha8Rng>>,
    /// Messages sent by scripts, oldest first.
    pub messages: Rc<RefCell<Vec<Message>>>,
    /// Session configuration.
    pub config: Rc<SessionConfig>,
}

impl Bridge {
    /// Creates a bridge over `space` with an empty registry and a freshly
    /// seeded RNG.
    #[must_use]
    pub fn new(space: SharedSpace, config: SessionConfig) -> Self {
        Self {
            space,
            registry: Rc::new(RefCell::new(BodyIndex::new())),
            rng: Rc::new(RefCell::new(ChaCha8Rng::seed_from_u64(config.seed))),
            messages: Rc::new(RefCell::new(Vec::new())),
            config: Rc::new(config),
        }
    }
}

/// Registers every class and global, and stores `bridge` as app data.
///
/// # Errors
///
/// Returns an error if the Lua state rejects a registration.
pub fn install(lua: &Lua, bridge: Bridge) -> LuaResult<()> {
    lua.set_app_data(bridge);
    values::register(lua)?;
    codec::register(lua)?;
    globals::register(lua)?;
    Ok(())
}

/// The bridge installed in `lua`.
pub(crate) fn bridge(lua: &Lua) -> LuaResult<Bridge> {
    lua.app_data_ref::<Bridge>()
        .map(|bridge| Bridge::clone(&bridge))
        .ok_or_else(|| LuaError::RuntimeError("starbridge bridge is not installed".to_string()))
}

/// Converts an engine error into a Lua error.
pub(crate) fn lua_error(err: Error) -> LuaError {
    LuaError::external(err)
}
