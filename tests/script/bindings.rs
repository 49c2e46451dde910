//! Integration tests for the Lua surface
//!
//! Everything here goes through a `Session`, the way game scripts see it.

use starbridge_foundation::ErrorKind;
use starbridge_space::{Body, FlightState, SBodyKind, Space, StarSystem, SysLoc};
use mlua::{AnyUserData, Table};
use starbridge_script::{LiveHandle, Session, SessionConfig};

fn lave() -> StarSystem {
    let mut sys = StarSystem::new(SysLoc::new(-1, 4, 0, 2), "Lave");
    let star = sys.add_root("Lave", SBodyKind::Star);
    let planet = sys.add_child(star, "Lave I", SBodyKind::Planet).unwrap();
    sys.add_child(planet, "Lave Station", SBodyKind::OrbitalStarport)
        .unwrap();
    sys
}

fn session_in_lave() -> Session {
    let mut space = Space::new();
    space.set_current_system(lave());
    Session::new(space, SessionConfig::testing()).unwrap()
}

// =============================================================================
// Object wrappers
// =============================================================================

#[test]
fn handles_compare_by_referent() {
    let s = session_in_lave();
    let id = s.add_body(Body::station("Lave Station"));
    let other = s.add_body(Body::station("Elsewhere"));
    s.expose("a", id).unwrap();
    s.expose("b", id).unwrap();
    s.expose("c", other).unwrap();

    let (same, different): (bool, bool) = s.eval("return a == b, a == c").unwrap();
    assert!(same);
    assert!(!different);
}

#[test]
fn sbody_of_a_station() {
    let s = session_in_lave();
    let node = s
        .space()
        .borrow()
        .current_system()
        .unwrap()
        .find("Lave Station")
        .unwrap();
    let id = s.add_body(Body::station("Lave Station").with_sbody(node));
    s.expose("port", id).unwrap();

    let (name, text, here): (String, String, bool) = s
        .eval(
            "local p = port:GetSBody() \
             return p:GetBodyName(), tostring(p), p:GetSystem():IsCurrentSystem()",
        )
        .unwrap();
    assert_eq!(name, "Lave Station");
    assert_eq!(text, "SBodyPath(-1,4,0):2/0/0/0");
    assert!(here);
}

#[test]
fn adverts_from_lua() {
    let s = session_in_lave();
    let id = s.add_body(Body::station("Lave Station"));
    s.expose("port", id).unwrap();

    s.exec(
        "port:SpaceStationAddAdvert('Taxi', 1, 'Passenger wanted') \
         port:SpaceStationAddAdvert('Taxi', 2, 'Second passenger') \
         port:SpaceStationRemoveAdvert('Taxi', 1)",
    )
    .unwrap();

    let space = s.space().borrow();
    let adverts = space.get(id).unwrap().station_data().unwrap().adverts();
    assert_eq!(adverts.len(), 1);
    assert_eq!(adverts[0].description, "Second passenger");
}

// =============================================================================
// Codec functions
// =============================================================================

#[test]
fn serialize_then_unserialize_in_lua() {
    let s = session_in_lave();
    let id = s.add_body(Body::ship("Vagabond", "Cobra Mk III"));
    s.expose("ship", id).unwrap();

    let (text, label, same): (String, String, bool) = s
        .eval(
            "local text = UserDataSerialize(ship) \
             local back = UserDataUnserialize(text) \
             return text, back:GetLabel(), back == ship",
        )
        .unwrap();

    assert_eq!(text, "ObjectWrapper\n1\n");
    assert_eq!(label, "Vagabond");
    assert!(same);
    assert_eq!(s.registry().lookup(id), Some(1));
}

#[test]
fn sysloc_round_trips_in_lua() {
    let s = session_in_lave();
    let same: bool = s
        .eval(
            "local loc = SysLoc.new(3, -1, 0, 2) \
             return UserDataUnserialize(UserDataSerialize(loc)) == loc",
        )
        .unwrap();
    assert!(same);
}

#[test]
fn serializing_a_dead_handle_raises() {
    let s = session_in_lave();
    let id = s.add_body(Body::ship("Vagabond", "Cobra Mk III"));
    s.expose("ship", id).unwrap();
    s.kill_body(id).unwrap();

    let err = s.exec("UserDataSerialize(ship)").unwrap_err();
    assert!(
        matches!(err.kind, ErrorKind::Script(ref msg) if msg.contains("persistable")),
        "{err}"
    );
}

#[test]
fn serializing_a_number_raises() {
    let s = session_in_lave();
    let (ok, msg): (bool, String) = s
        .eval("local ok, err = pcall(UserDataSerialize, 42) return ok, tostring(err)")
        .unwrap();
    assert!(!ok);
    assert!(msg.contains("UserDataSerialize"), "{msg}");
}

// =============================================================================
// Pi
// =============================================================================

#[test]
fn spawn_ship_rules() {
    let s = session_in_lave();
    let now: f64 = s.eval("return Pi.GetGameTime()").unwrap();

    let (_, unknown): (Option<bool>, String) = s
        .eval("return Pi.SpawnShip(Pi.GetGameTime() + 10, 'Flying Teapot')")
        .unwrap();
    assert_eq!(unknown, "Unknown ship type");

    let (_, missile): (Option<bool>, String) = s
        .eval("return Pi.SpawnShip(Pi.GetGameTime() + 10, 'MISSILE_GUIDED')")
        .unwrap();
    assert_eq!(missile, "Unknown ship type");

    let (_, late): (Option<bool>, String) = s
        .eval("return Pi.SpawnShip(Pi.GetGameTime(), 'Cobra Mk III')")
        .unwrap();
    assert_eq!(late, "Insufficient time to generate ship entry");

    let is_ship: bool = s
        .eval(
            "local ship = Pi.SpawnShip(Pi.GetGameTime() + 60, 'Cobra Mk III') \
             spawned = ship return ship:IsShip()",
        )
        .unwrap();
    assert!(is_ship);

    let arrived = s.time_step(60.0);
    assert_eq!(arrived.len(), 1);
    let space = s.space().borrow();
    let ship = space.get(arrived[0]).unwrap().ship_data().unwrap();
    assert_eq!(ship.flight, FlightState::Flying);
    assert!((space.game_time() - now - 60.0).abs() < 1e-9);
}

#[test]
fn spawned_ships_are_reproducible_from_the_seed() {
    let spawn = || {
        let s = session_in_lave();
        s.eval::<String>(
            "return Pi.SpawnShip(Pi.GetGameTime() + 1, 'Ladybird Starfighter'):GetLabel()",
        )
        .unwrap()
    };
    let label = spawn();
    assert_eq!(label, spawn());
    assert_eq!(label.len(), 7);
    assert_eq!(label.as_bytes()[2], b'-');
}

#[test]
fn current_system_and_player() {
    let s = session_in_lave();
    let me = s.add_body(Body::player("Commander", "Cobra Mk III"));
    s.exec("here = Pi.GetCurrentSystem()").unwrap();

    let (x, index, name): (i32, u32, String) = s
        .eval("return here:GetSectorX(), here:GetSystemNum(), Pi.GetPlayer():GetLabel()")
        .unwrap();
    assert_eq!((x, index), (-1, 2));
    assert_eq!(name, "Commander");

    s.kill_body(me).unwrap();
    let gone: bool = s.eval("return Pi.GetPlayer() == nil").unwrap();
    assert!(gone);
}

#[test]
fn messages_reach_the_host() {
    let s = session_in_lave();
    s.exec("Pi.ImportantMessage('Hull breach', 'Computer')").unwrap();

    let messages = s.take_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].from, "Computer");
    assert!(messages[0].important);
}

// =============================================================================
// Rand and Date
// =============================================================================

#[test]
fn rand_stays_in_range() {
    let s = session_in_lave();
    let ok: bool = s
        .eval(
            "for _ = 1, 200 do \
               local i = Rand.Int(-3, 3) \
               local r = Rand.Real(0.5, 0.75) \
               if i < -3 or i > 3 or r < 0.5 or r >= 0.75 then return false end \
             end \
             return true",
        )
        .unwrap();
    assert!(ok);
}

#[test]
fn rand_rejects_inverted_range() {
    let s = session_in_lave();
    assert!(s.exec("Rand.Int(5, 1)").is_err());
    assert!(s.exec("Rand.Real(1.0, 0.0)").is_err());
}

#[test]
fn rand_real_rejects_unbounded_range() {
    let s = session_in_lave();
    for chunk in ["Rand.Real(-math.huge, math.huge)", "Rand.Real(-1e308, 1e308)"] {
        let err = s.exec(chunk).unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::Script(ref msg) if msg.contains("bad argument")),
            "{chunk}: {err}"
        );
    }
}

#[test]
fn person_names_have_two_parts() {
    let s = session_in_lave();
    let name: String = s.eval("return Rand.PersonName(true)").unwrap();
    assert_eq!(name.split(' ').count(), 2);
}

#[test]
fn date_counts_from_the_epoch() {
    let s = session_in_lave();
    let text: String = s.eval("return Date.Format(86400 * 365 + 12 * 3600)").unwrap();
    assert_eq!(text, "12:00:00 31 Dec 3200");
}

// =============================================================================
// Host access
// =============================================================================

#[test]
fn exposed_handles_are_live_handle_userdata() {
    let s = session_in_lave();
    let id = s.add_body(Body::ship("Vagabond", "Cobra Mk III"));
    s.expose("ship", id).unwrap();

    let ud: AnyUserData = s.lua().globals().get("ship").unwrap();
    let handle = ud.borrow::<LiveHandle>().unwrap();
    assert_eq!(handle.body_id(), Some(id));
    assert_eq!(handle.label(), "Vagabond");
}

#[test]
fn host_writes_to_the_persistent_table_reach_scripts() {
    let s = session_in_lave();
    let table: Table = s.persistent().unwrap();
    table.set("reward", 750).unwrap();

    let reward: i64 = s.eval("return PersistentData.reward").unwrap();
    assert_eq!(reward, 750);
}
