//! `SysLoc` and `SBodyPath` userdata.

use mlua::{AnyUserData, Lua, MetaMethod, Result as LuaResult, UserData, UserDataMethods};
use starbridge_space::{SBodyPath, SysLoc};
use tracing::debug;

use super::bridge;

/// A [`SysLoc`] as a Lua value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LuaSysLoc(pub SysLoc);

/// An [`SBodyPath`] as a Lua value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LuaSBodyPath(pub SBodyPath);

impl UserData for LuaSysLoc {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("GetSectorX", |_, this, ()| Ok(this.0.sector_x()));
        methods.add_method("GetSectorY", |_, this, ()| Ok(this.0.sector_y()));
        methods.add_method("GetSectorZ", |_, this, ()| Ok(this.0.sector_z()));
        methods.add_method("GetSystemNum", |_, this, ()| Ok(this.0.system_index()));
        methods.add_method("IsCurrentSystem", |lua, this, ()| {
            let bridge = bridge(lua)?;
            let current = bridge
                .space
                .try_borrow()
                .map_err(mlua::Error::external)?
                .current_location();
            Ok(current == Some(this.0))
        });

        methods.add_meta_method(MetaMethod::Eq, |_, this, other: AnyUserData| {
            Ok(other.borrow::<LuaSysLoc>().is_ok_and(|other| other.0 == this.0))
        });
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!("SysLoc{}", this.0))
        });
    }
}

impl UserData for LuaSBodyPath {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("GetSystem", |_, this, ()| Ok(LuaSysLoc(this.0.system())));
        methods.add_method("GetBodyName", |lua, this, ()| {
            let bridge = bridge(lua)?;
            let space = bridge.space.try_borrow().map_err(mlua::Error::external)?;
            let Some(system) = space.current_system() else {
                return Ok(None);
            };
            match this.0.resolve(system) {
                Ok(id) => Ok(system.body(id).map(|body| body.name.clone())),
                Err(err) => {
                    debug!(
                        target: "starbridge::script",
                        path = %this.0,
                        %err,
                        "path does not resolve"
                    );
                    Ok(None)
                }
            }
        });

        methods.add_meta_method(MetaMethod::Eq, |_, this, other: AnyUserData| {
            Ok(other
                .borrow::<LuaSBodyPath>()
                .is_ok_and(|other| other.0 == this.0))
        });
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!("SBodyPath{}", this.0))
        });
    }
}

/// Registers the `SysLoc` constructor table.
pub(super) fn register(lua: &Lua) -> LuaResult<()> {
    let sysloc = lua.create_table()?;
    sysloc.set(
        "new",
        lua.create_function(|_, (x, y, z, index): (i32, i32, i32, u32)| {
            Ok(LuaSysLoc(SysLoc::new(x, y, z, index)))
        })?,
    )?;
    lua.globals().set("SysLoc", sysloc)?;
    Ok(())
}
