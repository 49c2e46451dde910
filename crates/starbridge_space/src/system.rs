//! Static star-system topology and value references into it.
//!
//! A [`StarSystem`] is produced by an external generator from its [`SysLoc`]
//! and never changes afterwards. [`SysLoc`] and [`SBodyPath`] are plain values
//! that stay meaningful without any live state; a path only needs a loaded
//! system when it is resolved.

use std::fmt;

use starbridge_foundation::{Error, Reader, Result, Writer};

/// Longest child-index chain a path may carry.
pub const MAX_PATH_DEPTH: usize = 16;

/// Location of a star system: sector coordinates plus the system's index
/// within that sector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SysLoc {
    sector_x: i32,
    sector_y: i32,
    sector_z: i32,
    system_index: u32,
}

impl SysLoc {
    /// Creates a location.
    #[must_use]
    pub const fn new(sector_x: i32, sector_y: i32, sector_z: i32, system_index: u32) -> Self {
        Self {
            sector_x,
            sector_y,
            sector_z,
            system_index,
        }
    }

    /// Sector X coordinate.
    #[must_use]
    pub const fn sector_x(&self) -> i32 {
        self.sector_x
    }

    /// Sector Y coordinate.
    #[must_use]
    pub const fn sector_y(&self) -> i32 {
        self.sector_y
    }

    /// Sector Z coordinate.
    #[must_use]
    pub const fn sector_z(&self) -> i32 {
        self.sector_z
    }

    /// Index of the system within its sector.
    #[must_use]
    pub const fn system_index(&self) -> u32 {
        self.system_index
    }

    /// Returns true if both locations are in the same sector.
    #[must_use]
    pub fn same_sector(&self, other: &SysLoc) -> bool {
        self.sector_x == other.sector_x
            && self.sector_y == other.sector_y
            && self.sector_z == other.sector_z
    }

    /// Writes the sector coordinates and system index.
    pub fn serialize(&self, wr: &mut Writer) {
        wr.int32(self.sector_x);
        wr.int32(self.sector_y);
        wr.int32(self.sector_z);
        wr.uint32(self.system_index);
    }

    /// Reads a location written by [`SysLoc::serialize`].
    ///
    /// # Errors
    ///
    /// Returns a malformed-record error if any field does not parse.
    pub fn unserialize(rd: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            sector_x: rd.int32()?,
            sector_y: rd.int32()?,
            sector_z: rd.int32()?,
            system_index: rd.uint32()?,
        })
    }
}

impl fmt::Display for SysLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{},{}):{}",
            self.sector_x, self.sector_y, self.sector_z, self.system_index
        )
    }
}

/// Path to a node in a system's static body tree.
///
/// The first chain element picks a root body, each following element picks a
/// child of the previous node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SBodyPath {
    system: SysLoc,
    chain: Vec<u32>,
}

impl SBodyPath {
    /// Creates a path.
    #[must_use]
    pub fn new(system: SysLoc, chain: Vec<u32>) -> Self {
        Self { system, chain }
    }

    /// The system the path points into.
    #[must_use]
    pub fn system(&self) -> SysLoc {
        self.system
    }

    /// Child indices from a root body down to the target.
    #[must_use]
    pub fn chain(&self) -> &[u32] {
        &self.chain
    }

    /// Finds the node this path names in `system`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `system` is a different system or its tree does
    /// not contain the path.
    pub fn resolve(&self, system: &StarSystem) -> Result<SBodyId> {
        if system.loc() != self.system {
            return Err(Error::not_found(format!(
                "path {self} points into a different system than {}",
                system.loc()
            )));
        }
        let missing = || Error::not_found(format!("path {self} in {}", system.name()));

        let (first, rest) = self.chain.split_first().ok_or_else(missing)?;
        let mut node = *system.roots.get(*first as usize).ok_or_else(missing)?;
        for &child in rest {
            node = *system
                .bodies[node.index()]
                .children
                .get(child as usize)
                .ok_or_else(missing)?;
        }
        Ok(node)
    }

    /// Writes the system location, chain length, and each chain element.
    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize(&self, wr: &mut Writer) {
        self.system.serialize(wr);
        wr.uint32(self.chain.len() as u32);
        for &child in &self.chain {
            wr.uint32(child);
        }
    }

    /// Reads a path written by [`SBodyPath::serialize`].
    ///
    /// # Errors
    ///
    /// Returns a malformed-record error if a field does not parse or the
    /// chain is longer than [`MAX_PATH_DEPTH`].
    pub fn unserialize(rd: &mut Reader<'_>) -> Result<Self> {
        let system = SysLoc::unserialize(rd)?;
        let len = rd.uint32()? as usize;
        if len > MAX_PATH_DEPTH {
            return Err(Error::malformed(
                format!("path depth of at most {MAX_PATH_DEPTH}"),
                len.to_string(),
            ));
        }
        let chain = (0..len)
            .map(|_| rd.uint32())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { system, chain })
    }
}

impl fmt::Display for SBodyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.system)?;
        for child in &self.chain {
            write!(f, "/{child}")?;
        }
        Ok(())
    }
}

/// Index of a node in a [`StarSystem`]'s body arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SBodyId(u32);

impl SBodyId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of a static system body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SBodyKind {
    /// A star.
    Star,
    /// A planet.
    Planet,
    /// A moon.
    Moon,
    /// A starport in orbit.
    OrbitalStarport,
    /// A starport on a planet's surface.
    SurfaceStarport,
}

/// A node in a system's static body tree.
#[derive(Clone, Debug, PartialEq)]
pub struct SBody {
    /// Body name.
    pub name: String,
    /// Body kind.
    pub kind: SBodyKind,
    /// Parent node; `None` for roots.
    pub parent: Option<SBodyId>,
    /// Child nodes in orbit order.
    pub children: Vec<SBodyId>,
}

/// Static topology of one star system.
#[derive(Clone, Debug, PartialEq)]
pub struct StarSystem {
    loc: SysLoc,
    name: String,
    bodies: Vec<SBody>,
    roots: Vec<SBodyId>,
}

// Body counts stay far below u32::MAX
#[allow(clippy::cast_possible_truncation)]
impl StarSystem {
    /// Creates a system with no bodies.
    #[must_use]
    pub fn new(loc: SysLoc, name: impl Into<String>) -> Self {
        Self {
            loc,
            name: name.into(),
            bodies: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// The system's location.
    #[must_use]
    pub fn loc(&self) -> SysLoc {
        self.loc
    }

    /// The system's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a root body (usually a star).
    pub fn add_root(&mut self, name: impl Into<String>, kind: SBodyKind) -> SBodyId {
        let id = self.push(name.into(), kind, None);
        self.roots.push(id);
        id
    }

    /// Adds a body orbiting `parent`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `parent` is not a body of this system.
    pub fn add_child(
        &mut self,
        parent: SBodyId,
        name: impl Into<String>,
        kind: SBodyKind,
    ) -> Result<SBodyId> {
        if self.body(parent).is_none() {
            return Err(Error::not_found(format!("parent {parent:?} in {}", self.name)));
        }
        let id = self.push(name.into(), kind, Some(parent));
        self.bodies[parent.index()].children.push(id);
        Ok(id)
    }

    fn push(&mut self, name: String, kind: SBodyKind, parent: Option<SBodyId>) -> SBodyId {
        let id = SBodyId(self.bodies.len() as u32);
        self.bodies.push(SBody {
            name,
            kind,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Returns a node.
    #[must_use]
    pub fn body(&self, id: SBodyId) -> Option<&SBody> {
        self.bodies.get(id.index())
    }

    /// Finds a node by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<SBodyId> {
        self.bodies
            .iter()
            .position(|b| b.name == name)
            .map(|i| SBodyId(i as u32))
    }

    /// Returns the path naming `id`, or `None` if it is not in this system.
    #[must_use]
    pub fn path_of(&self, id: SBodyId) -> Option<SBodyPath> {
        let mut chain = Vec::new();
        let mut node = id;
        loop {
            let body = self.body(node)?;
            let siblings = match body.parent {
                Some(parent) => &self.bodies[parent.index()].children,
                None => &self.roots,
            };
            let position = siblings.iter().position(|&s| s == node)?;
            chain.push(position as u32);
            match body.parent {
                Some(parent) => node = parent,
                None => break,
            }
        }
        chain.reverse();
        Some(SBodyPath::new(self.loc, chain))
    }
}

/// Produces star systems on demand.
///
/// Generation is deterministic: the same location always yields the same tree,
/// which is what lets a saved [`SBodyPath`] resolve again after a load.
pub trait SystemGenerator {
    /// Generates the system at `loc`, or `None` if no system exists there.
    fn generate(&self, loc: &SysLoc) -> Option<StarSystem>;
}
