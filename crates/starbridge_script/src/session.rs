//! Scripting sessions.
//!
//! A [`Session`] owns a Lua state wired to a shared [`Space`], the body index
//! used by the reference codec, the session RNG, and the message log. It is
//! also where saves are taken and restored.

use std::cell::Ref;

use mlua::{FromLuaMulti, Lua, Table};
use starbridge_foundation::{BodyId, Error, ErrorKind, Reader, Result, Writer};
use starbridge_space::{Body, BodyIndex, SharedSpace, Space, SystemGenerator};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::handle::LiveHandle;
use crate::lua::{self, Bridge, Message};
use crate::persist::{check_table, restore_table, save_table, script_error};
use crate::save::SaveGame;

/// A Lua state bound to a simulation.
pub struct Session {
    lua: Lua,
    bridge: Bridge,
}

fn already_borrowed(what: &str) -> Error {
    Error::new(ErrorKind::Internal(format!("{what} is already borrowed")))
}

impl Session {
    /// Creates a session over `space` and sets its clock to the configured
    /// start time.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if `config` does not validate, or an error
    /// if the Lua bindings cannot be installed.
    pub fn new(mut space: Space, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        space.set_game_time(config.start_time);
        let bridge = Bridge::new(space.into_shared(), config);
        let lua = Lua::new();
        lua::install(&lua, bridge.clone()).map_err(script_error)?;

        let session = Self { lua, bridge };
        let persistent = session.lua.create_table().map_err(script_error)?;
        session.set_persistent(persistent)?;
        debug!(target: "starbridge::script", seed = session.bridge.config.seed, "session started");
        Ok(session)
    }

    /// The Lua state.
    #[must_use]
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// The simulation's bodies.
    #[must_use]
    pub fn space(&self) -> &SharedSpace {
        &self.bridge.space
    }

    /// The body index used by the reference codec.
    #[must_use]
    pub fn registry(&self) -> Ref<'_, BodyIndex> {
        self.bridge.registry.borrow()
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.bridge.config
    }

    /// Messages sent by scripts since the last call, oldest first.
    pub fn take_messages(&self) -> Vec<Message> {
        std::mem::take(&mut *self.bridge.messages.borrow_mut())
    }

    /// Creates a handle to `id`.
    #[must_use]
    pub fn wrap(&self, id: BodyId) -> LiveHandle {
        LiveHandle::wrap(&self.bridge.space, id)
    }

    /// Adds a body to space.
    pub fn add_body(&self, body: Body) -> BodyId {
        self.bridge.space.borrow_mut().add_body(body)
    }

    /// Kills a body, clearing every handle to it.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a live body.
    pub fn kill_body(&self, id: BodyId) -> Result<Body> {
        self.bridge
            .space
            .try_borrow_mut()
            .map_err(|_| already_borrowed("space"))?
            .kill_body(id)
    }

    /// Advances game time. Returns the ships that arrived from hyperspace.
    pub fn time_step(&self, dt: f64) -> Vec<BodyId> {
        self.bridge.space.borrow_mut().time_step(dt)
    }

    /// Sets a Lua global to a handle for `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the global cannot be set.
    pub fn expose(&self, name: &str, id: BodyId) -> Result<()> {
        self.lua
            .globals()
            .set(name, self.wrap(id))
            .map_err(script_error)
    }

    /// Runs a chunk of Lua.
    ///
    /// # Errors
    ///
    /// Returns a script error if the chunk fails to compile or raises.
    pub fn exec(&self, chunk: &str) -> Result<()> {
        self.lua.load(chunk).exec().map_err(script_error)
    }

    /// Runs a chunk of Lua and converts its results.
    ///
    /// # Errors
    ///
    /// Returns a script error if the chunk fails or its results do not convert.
    pub fn eval<T: FromLuaMulti>(&self, chunk: &str) -> Result<T> {
        self.lua.load(chunk).eval().map_err(script_error)
    }

    /// The table scripts keep saved state in.
    ///
    /// # Errors
    ///
    /// Returns an error if the global has been replaced by something that is
    /// not a table.
    pub fn persistent(&self) -> Result<Table> {
        self.lua
            .globals()
            .get(self.bridge.config.persist_global.as_str())
            .map_err(script_error)
    }

    fn set_persistent(&self, table: Table) -> Result<()> {
        self.lua
            .globals()
            .set(self.bridge.config.persist_global.as_str(), table)
            .map_err(script_error)
    }

    /// Captures space and the persistent script table.
    ///
    /// Every persistable body gets an index first, in body order, so the
    /// same session saved twice produces the same indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent table holds something that cannot
    /// be saved. Handles to dead or transient bodies are skipped instead.
    pub fn save(&self) -> Result<SaveGame> {
        let mut registry = self
            .bridge
            .registry
            .try_borrow_mut()
            .map_err(|_| already_borrowed("body index"))?;

        let mut wr = Writer::new();
        {
            let space = self
                .bridge
                .space
                .try_borrow()
                .map_err(|_| already_borrowed("space"))?;
            registry.index_all(&space);
            space.save(&mut wr, &mut *registry);
        }

        let script = save_table(&self.persistent()?, &mut *registry)?;
        info!(
            target: "starbridge::save",
            bodies = registry.len(),
            entries = script.len(),
            "saved session"
        );
        Ok(SaveGame::new(wr.into_string(), script))
    }

    /// Replaces space and the persistent script table with a save.
    ///
    /// Every body alive before the load is killed first, so handles scripts
    /// still hold to them are cleared. A save that fails to parse is rejected
    /// before anything is killed.
    ///
    /// # Errors
    ///
    /// Returns an error if the save is from another version, its space record
    /// does not parse, its system cannot be generated, or a reference in the
    /// script table does not decode.
    pub fn load(&self, save: &SaveGame, generator: &dyn SystemGenerator) -> Result<()> {
        save.check_version()?;
        check_table(&save.script)?;
        {
            let mut registry = self
                .bridge
                .registry
                .try_borrow_mut()
                .map_err(|_| already_borrowed("body index"))?;
            let mut space = self
                .bridge
                .space
                .try_borrow_mut()
                .map_err(|_| already_borrowed("space"))?;
            space
                .load(&mut Reader::new(&save.space), generator, &mut registry)
                .map_err(|e| e.with_source("space record"))?;
        }

        let table = {
            let registry = self.bridge.registry.borrow();
            restore_table(&self.lua, &save.script, &self.bridge.space, &*registry)?
        };
        self.set_persistent(table)?;
        info!(
            target: "starbridge::save",
            bodies = self.bridge.space.borrow().len(),
            entries = save.script.len(),
            "loaded session"
        );
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}
