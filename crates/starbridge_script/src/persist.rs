//! Walking the persistent script table.
//!
//! Saving flattens a Lua table into a [`SavedTable`]. Plain values are copied,
//! nested tables are walked, and userdata goes through the reference codec.
//! A handle the codec refuses as unsupported is dropped from the save along
//! with its key; every other codec failure aborts the save.

use std::ffi::c_void;

use mlua::{Lua, Table, Value};
use starbridge_foundation::{Error, ErrorKind, Result, SerializationError};
use starbridge_space::{EntityRegistry, SharedSpace};
use tracing::warn;

use crate::codec;
use crate::lua::{decoded_into_lua, encode_userdata};
use crate::save::{SavedTable, SavedValue};

/// Converts a Lua error into an engine error.
pub(crate) fn script_error(err: mlua::Error) -> Error {
    Error::new(ErrorKind::Script(err.to_string()))
}

/// Flattens `table`, assigning registry indices to every handle it holds.
///
/// # Errors
///
/// Returns an error if the table holds a function, thread, or cycle, or if
/// the codec rejects a userdata value for any reason other than an
/// unsupported handle.
pub fn save_table(table: &Table, registry: &mut dyn EntityRegistry) -> Result<SavedTable> {
    let mut walker = SaveWalker {
        registry,
        open: Vec::new(),
        path: Vec::new(),
    };
    walker.table(table)
}

struct SaveWalker<'a> {
    registry: &'a mut dyn EntityRegistry,
    /// Tables currently being walked, for cycle detection.
    open: Vec<*const c_void>,
    /// Keys from the root to the current value, for diagnostics.
    path: Vec<String>,
}

impl SaveWalker<'_> {
    fn table(&mut self, table: &Table) -> Result<SavedTable> {
        let ptr = table.to_pointer();
        if self.open.contains(&ptr) {
            return Err(Error::new(ErrorKind::Script(format!(
                "cannot persist a table that contains itself at {}",
                self.location()
            ))));
        }
        self.open.push(ptr);

        let mut saved = Vec::new();
        for pair in table.pairs::<Value, Value>() {
            let (key, value) = pair.map_err(script_error)?;
            self.path.push(describe_key(&key));
            let entry = match self.value(&key)? {
                Some(key) => self.value(&value)?.map(|value| (key, value)),
                None => None,
            };
            self.path.pop();
            saved.extend(entry);
        }

        self.open.pop();
        Ok(saved)
    }

    fn value(&mut self, value: &Value) -> Result<Option<SavedValue>> {
        let saved = match value {
            Value::Nil => return Ok(None),
            Value::Boolean(b) => SavedValue::Bool(*b),
            Value::Integer(i) => SavedValue::Integer(*i),
            Value::Number(n) => SavedValue::Number(*n),
            Value::String(s) => SavedValue::String(String::from(s.to_string_lossy())),
            Value::Table(t) => SavedValue::Table(self.table(t)?),
            Value::UserData(ud) => match encode_userdata(ud, &mut *self.registry) {
                Ok(text) => SavedValue::Reference(text),
                Err(err)
                    if err.as_serialization() == Some(&SerializationError::UnsupportedHandle) =>
                {
                    warn!(
                        target: "starbridge::save",
                        at = %self.location(),
                        "skipping handle to a body that cannot be saved"
                    );
                    return Ok(None);
                }
                Err(err) => return Err(err.with_frame(self.location())),
            },
            other => {
                return Err(Error::new(ErrorKind::Script(format!(
                    "cannot persist a {} value at {}",
                    other.type_name(),
                    self.location()
                ))));
            }
        };
        Ok(Some(saved))
    }

    fn location(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.join(".")
        }
    }
}

fn describe_key(key: &Value) -> String {
    match key {
        Value::String(s) => String::from(s.to_string_lossy()),
        Value::Integer(i) => format!("[{i}]"),
        other => format!("[{}]", other.type_name()),
    }
}

/// Checks that [`restore_table`] would succeed on `saved`, without creating
/// anything.
///
/// # Errors
///
/// Returns the codec error of the first reference that does not decode, or a
/// script error for a NaN key.
pub fn check_table(saved: &SavedTable) -> Result<()> {
    for (key, value) in saved {
        if matches!(key, SavedValue::Number(n) if n.is_nan()) {
            return Err(Error::new(ErrorKind::Script("table key is NaN".to_string())));
        }
        for item in [key, value] {
            match item {
                SavedValue::Table(t) => check_table(t)?,
                SavedValue::Reference(text) => codec::check(text)?,
                _ => {}
            }
        }
    }
    Ok(())
}

/// Rebuilds a Lua table, decoding references against `space` and `registry`.
///
/// # Errors
///
/// Returns an error if a reference does not decode.
pub fn restore_table(
    lua: &Lua,
    saved: &SavedTable,
    space: &SharedSpace,
    registry: &dyn EntityRegistry,
) -> Result<Table> {
    let table = lua.create_table().map_err(script_error)?;
    for (key, value) in saved {
        let key = restore_value(lua, key, space, registry)?;
        let value = restore_value(lua, value, space, registry)?;
        table.raw_set(key, value).map_err(script_error)?;
    }
    Ok(table)
}

fn restore_value(
    lua: &Lua,
    saved: &SavedValue,
    space: &SharedSpace,
    registry: &dyn EntityRegistry,
) -> Result<Value> {
    Ok(match saved {
        SavedValue::Bool(b) => Value::Boolean(*b),
        SavedValue::Integer(i) => Value::Integer(*i),
        SavedValue::Number(n) => Value::Number(*n),
        SavedValue::String(s) => Value::String(lua.create_string(s).map_err(script_error)?),
        SavedValue::Table(t) => Value::Table(restore_table(lua, t, space, registry)?),
        SavedValue::Reference(text) => {
            let decoded = codec::decode(text, space, registry)?;
            decoded_into_lua(lua, decoded).map_err(script_error)?
        }
    })
}
