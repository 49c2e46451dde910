//! Identity of script-held references across save and load

use starbridge_foundation::ErrorKind;
use starbridge_script::save::{from_bytes, to_bytes};
use starbridge_script::{SavedValue, Session, SessionConfig};
use starbridge_space::{Body, SBodyKind, Space, StarSystem, SysLoc, SystemGenerator};

/// Generates the same three-body system at every location.
struct Procedural;

impl SystemGenerator for Procedural {
    fn generate(&self, loc: &SysLoc) -> Option<StarSystem> {
        let mut sys = StarSystem::new(*loc, format!("System {}", loc.system_index()));
        let star = sys.add_root("Primary", SBodyKind::Star);
        let planet = sys.add_child(star, "Inner", SBodyKind::Planet).ok()?;
        sys.add_child(planet, "Highport", SBodyKind::OrbitalStarport)
            .ok()?;
        Some(sys)
    }
}

fn new_game() -> Session {
    let mut space = Space::new();
    space.set_current_system(Procedural.generate(&SysLoc::new(0, 1, 0, 3)).unwrap());
    Session::new(space, SessionConfig::testing()).unwrap()
}

fn populate(s: &Session) {
    let node = s
        .space()
        .borrow()
        .current_system()
        .unwrap()
        .find("Highport")
        .unwrap();
    let port = s.add_body(Body::station("Highport").with_sbody(node));
    let me = s.add_body(Body::player("Commander", "Cobra Mk III").with_money(100_000));
    let target = s.add_body(Body::ship("Smuggler", "Eagle Long Range Fighter"));
    s.space().borrow_mut().dock(me, port).unwrap();
    s.expose("port", port).unwrap();
    s.expose("target", target).unwrap();
    s.exec(
        "PersistentData.assassination = { \
           target = target, \
           target_again = target, \
           client = port, \
           where = port:GetSBody(), \
           home = Pi.GetCurrentSystem(), \
           reward = 2500.5, \
           flavour = 'Make it look like an accident', \
         }",
    )
    .unwrap();
}

/// Saves `s`, pushes the save through its byte encoding, and loads it into
/// a brand-new session.
fn reload(s: &Session) -> Session {
    let bytes = to_bytes(&s.save().unwrap()).unwrap();
    let fresh = new_game();
    fresh.load(&from_bytes(&bytes).unwrap(), &Procedural).unwrap();
    fresh
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn one_body_stays_one_body() {
    let s = new_game();
    populate(&s);
    let loaded = reload(&s);

    let (same, label, is_ship): (bool, String, bool) = loaded
        .eval(
            "local a = PersistentData.assassination \
             return a.target == a.target_again, a.target:GetLabel(), a.target:IsShip()",
        )
        .unwrap();
    assert!(same);
    assert_eq!(label, "Smuggler");
    assert!(is_ship);
}

#[test]
fn relationships_survive() {
    let s = new_game();
    populate(&s);
    let loaded = reload(&s);

    let (docked_is_client, money, place, current): (bool, f64, String, bool) = loaded
        .eval(
            "local a = PersistentData.assassination \
             local me = Pi.GetPlayer() \
             return me:GetDockedWith() == a.client, me:GetMoney(), \
                    a.where:GetBodyName(), a.home:IsCurrentSystem()",
        )
        .unwrap();
    assert!(docked_is_client);
    assert!((money - 1_000.0).abs() < 1e-9);
    assert_eq!(place, "Highport");
    assert!(current);
}

#[test]
fn plain_values_survive() {
    let s = new_game();
    populate(&s);
    let loaded = reload(&s);

    let (reward, flavour): (f64, String) = loaded
        .eval("local a = PersistentData.assassination return a.reward, a.flavour")
        .unwrap();
    assert!((reward - 2500.5).abs() < f64::EPSILON);
    assert_eq!(flavour, "Make it look like an accident");
}

#[test]
fn killing_after_load_clears_restored_handles() {
    let s = new_game();
    populate(&s);
    let loaded = reload(&s);

    let id = loaded.space().borrow().find_by_label("Smuggler").unwrap();
    loaded.kill_body(id).unwrap();

    let (a, b): (bool, bool) = loaded
        .eval(
            "local a = PersistentData.assassination \
             return a.target:IsEntity(), a.target_again:IsEntity()",
        )
        .unwrap();
    assert!(!a && !b);
}

#[test]
fn dead_references_are_dropped_from_the_save() {
    let s = new_game();
    populate(&s);
    let target = s.space().borrow().find_by_label("Smuggler").unwrap();
    s.kill_body(target).unwrap();

    let save = s.save().unwrap();
    let SavedValue::Table(mission) = &save.script[0].1 else {
        panic!("expected the mission table");
    };
    assert!(!mission
        .iter()
        .any(|(k, _)| *k == SavedValue::String("target".to_string())));
    assert!(mission
        .iter()
        .any(|(k, _)| *k == SavedValue::String("client".to_string())));

    let loaded = reload(&s);
    let gone: bool = loaded
        .eval("return PersistentData.assassination.target == nil")
        .unwrap();
    assert!(gone);
}

#[test]
fn loading_over_a_running_game_clears_its_handles() {
    let s = new_game();
    populate(&s);
    let save = s.save().unwrap();

    s.exec("old_target = target").unwrap();
    s.load(&save, &Procedural).unwrap();

    let (old, restored): (bool, bool) = s
        .eval("return old_target:IsEntity(), PersistentData.assassination.target:IsEntity()")
        .unwrap();
    assert!(!old);
    assert!(restored);
}

#[test]
fn save_is_deterministic() {
    let s = new_game();
    populate(&s);
    let first = to_bytes(&s.save().unwrap()).unwrap();
    let second = to_bytes(&s.save().unwrap()).unwrap();
    assert_eq!(first.len(), second.len());
    assert_eq!(
        from_bytes(&first).unwrap().space,
        from_bytes(&second).unwrap().space
    );
}

#[test]
fn functions_in_persistent_data_abort_the_save() {
    let s = new_game();
    s.exec("PersistentData.callback = function() end").unwrap();
    let err = s.save().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Script(_)));
}
