//! The `Pi`, `Rand`, and `Date` tables.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use mlua::{Lua, Result as LuaResult};
use rand::seq::SliceRandom;
use rand::Rng;
use starbridge_foundation::{BodyId, Error};
use starbridge_space::{Body, FlightState, ShipType};
use tracing::{debug, info};

use super::{bridge, lua_error, Bridge, LuaSysLoc, Message};
use crate::handle::LiveHandle;

const UNKNOWN_SHIP_TYPE: &str = "Unknown ship type";
const TOO_LATE_TO_SPAWN: &str = "Insufficient time to generate ship entry";

const MALE_NAMES: &[&str] = &[
    "Adam", "Bertram", "Casimir", "Dmitri", "Emil", "Farid", "Gideon", "Hiroshi", "Ivo", "Jonas",
    "Kwame", "Lars", "Mateo", "Nikolai", "Omar", "Pavel", "Quentin", "Rafael", "Soren", "Tobias",
];

const FEMALE_NAMES: &[&str] = &[
    "Alia", "Beatrix", "Chiara", "Dagny", "Elena", "Freya", "Greta", "Hana", "Ines", "Jun",
    "Katya", "Leila", "Mira", "Noor", "Olga", "Priya", "Rosa", "Signe", "Tamsin", "Yara",
];

const SURNAMES: &[&str] = &[
    "Abara", "Brennan", "Castellanos", "Dahl", "Eriksen", "Fontaine", "Gruber", "Haddad",
    "Ivanova", "Jansen", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "Okafor", "Petrov",
    "Quist", "Romano", "Sato", "Varga",
];

/// The date shown for game time zero.
fn calendar_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(3200, 1, 1)?.and_hms_opt(0, 0, 0)
}

/// Formats game time as a calendar date, e.g. `"09:30:00 14 Feb 3201"`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn format_date(seconds: f64) -> String {
    let date = calendar_epoch().and_then(|epoch| {
        let delta = TimeDelta::try_seconds(seconds.floor() as i64)?;
        epoch.checked_add_signed(delta)
    });
    match date {
        Some(date) => date.format("%H:%M:%S %-d %b %Y").to_string(),
        None => String::from("??:??:?? ?? ??? ????"),
    }
}

fn random_registration(bridge: &Bridge) -> String {
    let mut rng = bridge.rng.borrow_mut();
    let a = char::from(b'A' + rng.gen_range(0..26u8));
    let b = char::from(b'A' + rng.gen_range(0..26u8));
    format!("{a}{b}-{:04}", rng.gen_range(0..10_000))
}

/// Puts a new ship into hyperspace, due to arrive at `due`.
///
/// Returns the reason scripts see when the ship cannot be spawned.
fn spawn_ship(bridge: &Bridge, due: f64, type_name: &str) -> Result<BodyId, &'static str> {
    let Some(ship_type) = ShipType::get(type_name).filter(|t| !t.is_missile()) else {
        return Err(UNKNOWN_SHIP_TYPE);
    };
    let now = bridge.space.borrow().game_time();
    if due <= now {
        return Err(TOO_LATE_TO_SPAWN);
    }

    let label = random_registration(bridge);
    let radius = bridge.config.spawn_radius;
    let position = {
        let mut rng = bridge.rng.borrow_mut();
        [
            rng.gen_range(-radius..=radius),
            rng.gen_range(-radius..=radius),
            rng.gen_range(-radius..=radius),
        ]
    };
    let mut body = Body::ship(label.clone(), ship_type.name).with_position(position);
    if let Some(ship) = body.ship_data_mut() {
        ship.flight = FlightState::Hyperspace { arrival: due };
    }
    let id = bridge.space.borrow_mut().add_body(body);
    debug!(
        target: "starbridge::script",
        body = ?id,
        %label,
        ship_type = ship_type.name,
        due,
        "spawned ship"
    );
    Ok(id)
}

fn register_pi(lua: &Lua) -> LuaResult<()> {
    let pi = lua.create_table()?;

    pi.set(
        "GetPlayer",
        lua.create_function(|lua, ()| {
            let bridge = bridge(lua)?;
            let player = bridge.space.try_borrow().map_err(mlua::Error::external)?.player();
            Ok(player.map(|id| LiveHandle::wrap(&bridge.space, id)))
        })?,
    )?;

    pi.set(
        "GetCurrentSystem",
        lua.create_function(|lua, ()| {
            let bridge = bridge(lua)?;
            let loc = bridge
                .space
                .try_borrow()
                .map_err(mlua::Error::external)?
                .current_location();
            Ok(loc.map(LuaSysLoc))
        })?,
    )?;

    pi.set(
        "GetGameTime",
        lua.create_function(|lua, ()| {
            let bridge = bridge(lua)?;
            let time = bridge.space.try_borrow().map_err(mlua::Error::external)?.game_time();
            Ok(time)
        })?,
    )?;

    for (name, important) in [("Message", false), ("ImportantMessage", true)] {
        pi.set(
            name,
            lua.create_function(move |lua, (text, from): (String, Option<String>)| {
                let bridge = bridge(lua)?;
                let from = from.unwrap_or_default();
                info!(target: "starbridge::script", %from, important, "{text}");
                bridge.messages.borrow_mut().push(Message {
                    from,
                    text,
                    important,
                });
                Ok(())
            })?,
        )?;
    }

    pi.set(
        "SpawnShip",
        lua.create_function(|lua, (due, type_name): (f64, String)| {
            if !due.is_finite() {
                return Err(lua_error(Error::bad_argument(
                    "SpawnShip",
                    1,
                    "finite number",
                    due.to_string(),
                )));
            }
            let bridge = bridge(lua)?;
            match spawn_ship(&bridge, due, &type_name) {
                Ok(id) => Ok((Some(LiveHandle::wrap(&bridge.space, id)), None)),
                Err(reason) => Ok((None, Some(reason))),
            }
        })?,
    )?;

    lua.globals().set("Pi", pi)
}

fn register_rand(lua: &Lua) -> LuaResult<()> {
    let rand = lua.create_table()?;

    rand.set(
        "Int",
        lua.create_function(|lua, (min, max): (i64, i64)| {
            if min > max {
                return Err(lua_error(Error::bad_argument(
                    "Int",
                    2,
                    format!("number >= {min}"),
                    max.to_string(),
                )));
            }
            let bridge = bridge(lua)?;
            let value = bridge.rng.borrow_mut().gen_range(min..=max);
            Ok(value)
        })?,
    )?;

    rand.set(
        "Real",
        lua.create_function(|lua, (min, max): (f64, f64)| {
            if !min.is_finite() {
                return Err(lua_error(Error::bad_argument(
                    "Real",
                    1,
                    "finite number",
                    min.to_string(),
                )));
            }
            if !max.is_finite() || min > max {
                return Err(lua_error(Error::bad_argument(
                    "Real",
                    2,
                    format!("finite number >= {min}"),
                    max.to_string(),
                )));
            }
            if !(max - min).is_finite() {
                return Err(lua_error(Error::bad_argument(
                    "Real",
                    2,
                    format!("number within {} of {min}", f64::MAX),
                    max.to_string(),
                )));
            }
            if min == max {
                return Ok(min);
            }
            let bridge = bridge(lua)?;
            let value = bridge.rng.borrow_mut().gen_range(min..max);
            Ok(value)
        })?,
    )?;

    rand.set(
        "PersonName",
        lua.create_function(|lua, female: Option<bool>| {
            let bridge = bridge(lua)?;
            let mut rng = bridge.rng.borrow_mut();
            let female = female.unwrap_or_else(|| rng.gen_bool(0.5));
            let first = if female { FEMALE_NAMES } else { MALE_NAMES };
            let first = first.choose(&mut *rng).copied().unwrap_or_default();
            let last = SURNAMES.choose(&mut *rng).copied().unwrap_or_default();
            Ok(format!("{first} {last}"))
        })?,
    )?;

    lua.globals().set("Rand", rand)
}

fn register_date(lua: &Lua) -> LuaResult<()> {
    let date = lua.create_table()?;
    date.set(
        "Format",
        lua.create_function(|_, seconds: f64| Ok(format_date(seconds)))?,
    )?;
    lua.globals().set("Date", date)
}

pub(super) fn register(lua: &Lua) -> LuaResult<()> {
    register_pi(lua)?;
    register_rand(lua)?;
    register_date(lua)
}
