//! `UserDataSerialize` and `UserDataUnserialize`.

use mlua::{AnyUserData, IntoLua, Lua, Result as LuaResult, Value};
use starbridge_foundation::{Error, Result};
use starbridge_space::{EntityRegistry, SharedSpace};
use tracing::error;

use super::{bridge, lua_error, LuaSBodyPath, LuaSysLoc};
use crate::codec::{self, Decoded, WireRef};
use crate::handle::LiveHandle;

/// Encodes a script-held reference.
pub(crate) fn encode_userdata(
    ud: &AnyUserData,
    registry: &mut dyn EntityRegistry,
) -> Result<String> {
    if let Ok(handle) = ud.borrow::<LiveHandle>() {
        return codec::encode(WireRef::Handle(&*handle), registry);
    }
    if let Ok(loc) = ud.borrow::<LuaSysLoc>() {
        return codec::encode(WireRef::Loc(&loc.0), registry);
    }
    if let Ok(path) = ud.borrow::<LuaSBodyPath>() {
        return codec::encode(WireRef::Path(&path.0), registry);
    }
    Err(codec::unknown_type(&userdata_type_name(ud)))
}

fn userdata_type_name(ud: &AnyUserData) -> String {
    ud.metatable()
        .ok()
        .and_then(|mt| mt.get::<Option<String>>("__name").ok().flatten())
        .unwrap_or_else(|| "userdata".to_string())
}

/// Decodes a reference and converts it into a Lua value.
pub(crate) fn decoded_into_lua(lua: &Lua, decoded: Decoded) -> LuaResult<Value> {
    match decoded {
        Decoded::Handle(handle) => handle.into_lua(lua),
        Decoded::Path(path) => LuaSBodyPath(path).into_lua(lua),
        Decoded::Loc(loc) => LuaSysLoc(loc).into_lua(lua),
    }
}

/// Decodes `data` against the session's space and registry.
pub(crate) fn decode_text(
    lua: &Lua,
    data: &str,
    space: &SharedSpace,
    registry: &dyn EntityRegistry,
) -> LuaResult<Value> {
    let decoded = codec::decode(data, space, registry).map_err(lua_error)?;
    decoded_into_lua(lua, decoded)
}

fn bad_argument(function: &str, expected: &str, value: &Value) -> mlua::Error {
    let err = Error::bad_argument(function, 1, expected, value.type_name());
    error!(target: "starbridge::codec", %err, "rejected codec argument");
    lua_error(err)
}

pub(super) fn register(lua: &Lua) -> LuaResult<()> {
    let globals = lua.globals();

    globals.set(
        "UserDataSerialize",
        lua.create_function(|lua, value: Value| {
            let Value::UserData(ud) = &value else {
                return Err(bad_argument("UserDataSerialize", "userdata", &value));
            };
            let bridge = bridge(lua)?;
            let mut registry = bridge.registry.try_borrow_mut().map_err(mlua::Error::external)?;
            encode_userdata(ud, &mut *registry).map_err(lua_error)
        })?,
    )?;

    globals.set(
        "UserDataUnserialize",
        lua.create_function(|lua, value: Value| {
            let Value::String(data) = &value else {
                return Err(bad_argument("UserDataUnserialize", "string", &value));
            };
            let data = data.to_str()?.to_string();
            let bridge = bridge(lua)?;
            let registry = bridge.registry.try_borrow().map_err(mlua::Error::external)?;
            decode_text(lua, &data, &bridge.space, &*registry)
        })?,
    )?;

    Ok(())
}
