//! Save files.
//!
//! A save is a [`SaveGame`] written with `MessagePack`. The space record and
//! every script-held reference inside it are text blocks produced by the
//! record writer and the tagged reference codec; `MessagePack` only frames
//! them.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use starbridge_foundation::{Error, ErrorKind, Result};

/// Save format version this build reads and writes.
pub const SAVE_VERSION: u32 = 1;

/// A value from the persistent script table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SavedValue {
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A float.
    Number(f64),
    /// A string.
    String(String),
    /// A nested table.
    Table(SavedTable),
    /// A handle or value reference, as encoded by the reference codec.
    Reference(String),
}

/// Key/value pairs of a script table.
pub type SavedTable = Vec<(SavedValue, SavedValue)>;

/// Everything needed to restore a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    /// Format version.
    pub version: u32,
    /// The space record.
    pub space: String,
    /// The persistent script table.
    pub script: SavedTable,
}

impl SaveGame {
    /// Creates a save at the current version.
    #[must_use]
    pub fn new(space: String, script: SavedTable) -> Self {
        Self {
            version: SAVE_VERSION,
            space,
            script,
        }
    }

    /// Checks that this build can read the save.
    ///
    /// # Errors
    ///
    /// Returns `SaveVersion` if the save was written by another format version.
    pub fn check_version(&self) -> Result<()> {
        if self.version == SAVE_VERSION {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::SaveVersion {
                expected: SAVE_VERSION,
                found: self.version,
            }))
        }
    }
}

/// Serializes a save to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(save: &SaveGame) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(save).map_err(|e| Error::new(ErrorKind::EncodingError(e.to_string())))
}

/// Deserializes a save from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_bytes(bytes: &[u8]) -> Result<SaveGame> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::EncodingError(e.to_string())))
}

/// Writes a save file, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(save: &SaveGame, path: P) -> Result<()> {
    let path = path.as_ref();
    let io_err = |action: &str, e: std::io::Error| {
        Error::new(ErrorKind::IoError(format!(
            "failed to {action} '{}': {e}",
            path.display()
        )))
    };

    let bytes = to_bytes(save)?;
    let file = File::create(path).map_err(|e| io_err("create", e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(|e| io_err("write", e))?;
    writer.flush().map_err(|e| io_err("flush", e))?;
    Ok(())
}

/// Reads a save file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not decode.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<SaveGame> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to open '{}': {e}",
            path.display()
        )))
    })?;

    let mut bytes = Vec::new();
    BufReader::new(file).read_to_end(&mut bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to read '{}': {e}",
            path.display()
        )))
    })?;

    from_bytes(&bytes).map_err(|e| e.with_source(path.display().to_string()))
}
