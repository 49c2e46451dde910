//! Integration tests for the reference codec

use starbridge_foundation::SerializationError;
use starbridge_script::codec::{self, Decoded, WireRef};
use starbridge_script::LiveHandle;
use starbridge_space::{
    Body, BodyIndex, EntityRegistry, SBodyKind, SBodyPath, Space, StarSystem, SysLoc,
};

fn kind_of(err: &starbridge_foundation::Error) -> Option<&SerializationError> {
    err.as_serialization()
}

// =============================================================================
// Encoding
// =============================================================================

#[test]
fn same_body_always_gets_the_same_index() {
    let space = Space::new().into_shared();
    let a = space.borrow_mut().add_body(Body::station("Port Hope"));
    let b = space.borrow_mut().add_body(Body::ship("Vagabond", "Cobra Mk III"));
    let mut registry = BodyIndex::new();

    let mut encode = |id| {
        codec::encode(WireRef::Handle(&LiveHandle::wrap(&space, id)), &mut registry).unwrap()
    };
    let first = encode(b);
    let other = encode(a);
    let again = encode(b);

    assert_eq!(first, "ObjectWrapper\n1\n");
    assert_eq!(other, "ObjectWrapper\n2\n");
    assert_eq!(again, first);
}

#[test]
fn transient_bodies_are_unsupported() {
    let space = Space::new().into_shared();
    let id = space.borrow_mut().add_body(Body::projectile("pulse"));
    let mut registry = BodyIndex::new();

    let err = codec::encode(WireRef::Handle(&LiveHandle::wrap(&space, id)), &mut registry)
        .unwrap_err();

    assert_eq!(kind_of(&err), Some(&SerializationError::UnsupportedHandle));
    assert!(registry.is_empty());
}

#[test]
fn path_text_layout() {
    let mut sys = StarSystem::new(SysLoc::new(0, 0, 0, 0), "Sol");
    let sun = sys.add_root("Sol", SBodyKind::Star);
    sys.add_child(sun, "Mercury", SBodyKind::Planet).unwrap();
    let earth = sys.add_child(sun, "Earth", SBodyKind::Planet).unwrap();
    let path = sys.path_of(earth).unwrap();

    let text = codec::encode(WireRef::Path(&path), &mut BodyIndex::new()).unwrap();

    assert_eq!(text, "SBodyPath\n0\n0\n0\n0\n2\n0\n1\n");
}

#[test]
fn unknown_type_names_the_type() {
    let err = codec::unknown_type("Teapot");
    assert_eq!(
        kind_of(&err),
        Some(&SerializationError::UnknownType("Teapot".to_string()))
    );
}

// =============================================================================
// Decoding
// =============================================================================

#[test]
fn decode_does_not_assign_indices() {
    let space = Space::new().into_shared();
    let registry = BodyIndex::new();

    let Decoded::Handle(handle) = codec::decode("ObjectWrapper\n7\n", &space, &registry).unwrap()
    else {
        panic!("expected a handle");
    };

    assert!(!handle.is_entity());
    assert!(registry.is_empty());
}

#[test]
fn decoded_handle_tracks_the_bound_body() {
    let space = Space::new().into_shared();
    let id = space.borrow_mut().add_body(Body::station("Port Hope"));
    let mut registry = BodyIndex::new();
    registry.bind(3, id).unwrap();

    let Decoded::Handle(handle) = codec::decode("ObjectWrapper\n3\n", &space, &registry).unwrap()
    else {
        panic!("expected a handle");
    };
    assert!(handle.is_station());

    space.borrow_mut().kill_body(id).unwrap();
    assert!(!handle.is_entity());
}

#[test]
fn path_and_location_decode() {
    let space = Space::new().into_shared();
    let registry = BodyIndex::new();

    match codec::decode("SBodyPath\n1\n2\n3\n4\n1\n0\n", &space, &registry).unwrap() {
        Decoded::Path(path) => {
            assert_eq!(path, SBodyPath::new(SysLoc::new(1, 2, 3, 4), vec![0]));
        }
        other => panic!("expected a path, got {other:?}"),
    }
    match codec::decode("SysLoc\n-5\n0\n7\n12\n", &space, &registry).unwrap() {
        Decoded::Loc(loc) => assert_eq!(loc, SysLoc::new(-5, 0, 7, 12)),
        other => panic!("expected a location, got {other:?}"),
    }
}

#[test]
fn unrecognized_tag_reports_first_line() {
    let space = Space::new().into_shared();
    let err = codec::decode("Lightsaber\n1\n", &space, &BodyIndex::new()).unwrap_err();
    assert_eq!(
        kind_of(&err),
        Some(&SerializationError::UnrecognizedTag("Lightsaber\n".to_string()))
    );
}

#[test]
fn tag_without_newline_is_unrecognized() {
    let space = Space::new().into_shared();
    let err = codec::decode("SysLoc", &space, &BodyIndex::new()).unwrap_err();
    assert!(matches!(
        kind_of(&err),
        Some(SerializationError::UnrecognizedTag(_))
    ));
}

#[test]
fn truncated_payload_is_malformed() {
    let space = Space::new().into_shared();
    let err = codec::decode("SysLoc\n1\n2\n", &space, &BodyIndex::new()).unwrap_err();
    assert!(matches!(
        kind_of(&err),
        Some(SerializationError::Malformed { .. })
    ));
}

#[test]
fn entity_at_zero_is_nothing() {
    let space = Space::new().into_shared();
    let id = space.borrow_mut().add_body(Body::planet("Earth"));
    let mut registry = BodyIndex::new();
    registry.index_of(id);

    let Decoded::Handle(handle) = codec::decode("ObjectWrapper\n0\n", &space, &registry).unwrap()
    else {
        panic!("expected a handle");
    };
    assert!(!handle.is_entity());
}
