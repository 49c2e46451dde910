//! The tagged reference codec.
//!
//! Every reference a script can hold encodes to a self-describing text block:
//! a tag line naming the kind, then the kind's record.
//!
//! ```text
//! ObjectWrapper\n<index>\n
//! SBodyPath\n<x>\n<y>\n<z>\n<system>\n<len>\n<child>\n...
//! SysLoc\n<x>\n<y>\n<z>\n<system>\n
//! ```
//!
//! Live handles encode as the registry index of their body. Decoding resolves
//! the index back through the registry and wraps whatever it finds there.

use starbridge_foundation::{Error, Reader, Result, Writer};
use starbridge_space::{EntityRegistry, SBodyPath, SharedSpace, SysLoc};
use tracing::{error, trace};

use crate::handle::LiveHandle;

/// Tag line for live body handles.
pub const OBJECT_WRAPPER_TAG: &str = "ObjectWrapper\n";
/// Tag line for static body paths.
pub const SBODY_PATH_TAG: &str = "SBodyPath\n";
/// Tag line for system locations.
pub const SYSLOC_TAG: &str = "SysLoc\n";

/// A reference to encode.
#[derive(Debug, Clone, Copy)]
pub enum WireRef<'a> {
    /// A live body handle.
    Handle(&'a LiveHandle),
    /// A path into static system topology.
    Path(&'a SBodyPath),
    /// A star-system location.
    Loc(&'a SysLoc),
}

/// A decoded reference.
#[derive(Debug)]
pub enum Decoded {
    /// A handle, possibly empty if its index resolved to nothing.
    Handle(LiveHandle),
    /// A path into static system topology.
    Path(SBodyPath),
    /// A star-system location.
    Loc(SysLoc),
}

/// Encodes a reference.
///
/// # Errors
///
/// Returns `UnsupportedHandle` for a handle that is cleared or whose body is
/// of a kind that is never saved.
pub fn encode(value: WireRef<'_>, registry: &mut dyn EntityRegistry) -> Result<String> {
    let mut wr = Writer::new();
    match value {
        WireRef::Handle(handle) => {
            let (Some(id), Some(kind)) = (handle.body_id(), handle.object_type()) else {
                return Err(Error::unsupported_handle());
            };
            if !kind.is_persistable() {
                return Err(Error::unsupported_handle());
            }
            let index = registry.index_of(id);
            trace!(target: "starbridge::codec", body = ?id, index, "encoded handle");
            wr.uint32(index);
            Ok(format!("{OBJECT_WRAPPER_TAG}{}", wr.into_string()))
        }
        WireRef::Path(path) => {
            path.serialize(&mut wr);
            Ok(format!("{SBODY_PATH_TAG}{}", wr.into_string()))
        }
        WireRef::Loc(loc) => {
            loc.serialize(&mut wr);
            Ok(format!("{SYSLOC_TAG}{}", wr.into_string()))
        }
    }
}

/// Reports a value the codec has no encoding for.
///
/// Always returns `UnknownType`, after logging it.
pub fn unknown_type(type_name: &str) -> Error {
    error!(target: "starbridge::codec", type_name, "tried to serialize unknown userdata type");
    Error::unknown_type(type_name)
}

/// A reference parsed from its text, before any index is resolved.
enum Parsed {
    Index(u32),
    Path(SBodyPath),
    Loc(SysLoc),
}

fn parse(data: &str) -> Result<Parsed> {
    if let Some(rest) = data.strip_prefix(OBJECT_WRAPPER_TAG) {
        Reader::new(rest).uint32().map(Parsed::Index)
    } else if let Some(rest) = data.strip_prefix(SBODY_PATH_TAG) {
        SBodyPath::unserialize(&mut Reader::new(rest)).map(Parsed::Path)
    } else if let Some(rest) = data.strip_prefix(SYSLOC_TAG) {
        SysLoc::unserialize(&mut Reader::new(rest)).map(Parsed::Loc)
    } else {
        let tag = data.split_inclusive('\n').next().unwrap_or_default();
        error!(target: "starbridge::codec", tag, "unrecognized tag");
        Err(Error::unrecognized_tag(tag))
    }
}

/// Checks that a reference would decode, without touching any space.
///
/// # Errors
///
/// Fails exactly where [`decode`] would.
pub fn check(data: &str) -> Result<()> {
    parse(data).map(|_| ())
}

/// Decodes a reference. The registry is only read.
///
/// # Errors
///
/// Returns `UnrecognizedTag` if the first line matches no tag, or a
/// malformed-record error if the record after the tag does not parse.
pub fn decode(data: &str, space: &SharedSpace, registry: &dyn EntityRegistry) -> Result<Decoded> {
    Ok(match parse(data)? {
        Parsed::Index(index) => {
            let handle = match registry.entity_at(index) {
                Some(id) => LiveHandle::wrap(space, id),
                None => LiveHandle::empty(),
            };
            trace!(target: "starbridge::codec", index, live = handle.is_entity(), "decoded handle");
            Decoded::Handle(handle)
        }
        Parsed::Path(path) => Decoded::Path(path),
        Parsed::Loc(loc) => Decoded::Loc(loc),
    })
}
