//! Error types for the Starbridge system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! A live handle whose body has been destroyed is not an error anywhere in
//! this taxonomy; accessors on such a handle return neutral values instead.

use std::fmt;

use thiserror::Error;

use crate::entity::BodyId;

/// The main error type for Starbridge operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Adds a single frame to this error's context, creating it if needed.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Names the file or record this error came from, keeping any line and
    /// frames already attached.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_source(source));
        self
    }

    /// Creates a codec error.
    #[must_use]
    pub fn serialization(err: SerializationError) -> Self {
        Self::new(ErrorKind::Serialization(err))
    }

    /// Creates an error for a live handle that cannot be persisted.
    #[must_use]
    pub fn unsupported_handle() -> Self {
        Self::serialization(SerializationError::UnsupportedHandle)
    }

    /// Creates an error for a value of a type the codec does not know.
    #[must_use]
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        Self::serialization(SerializationError::UnknownType(type_name.into()))
    }

    /// Creates an error for a blob whose leading line is not a known tag.
    #[must_use]
    pub fn unrecognized_tag(tag: impl Into<String>) -> Self {
        Self::serialization(SerializationError::UnrecognizedTag(tag.into()))
    }

    /// Creates an error for a record that does not parse.
    #[must_use]
    pub fn malformed(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::serialization(SerializationError::Malformed {
            expected: expected.into(),
            found: found.into(),
        })
    }

    /// Creates a path-not-found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound(what.into()))
    }

    /// Creates a body not found error.
    #[must_use]
    pub fn body_not_found(id: BodyId) -> Self {
        Self::new(ErrorKind::BodyNotFound(id))
    }

    /// Creates a stale body reference error.
    #[must_use]
    pub fn stale_body(id: BodyId) -> Self {
        Self::new(ErrorKind::StaleBody(id))
    }

    /// Creates a bad script argument error.
    #[must_use]
    pub fn bad_argument(
        function: impl Into<String>,
        position: usize,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::BadArgument {
            function: function.into(),
            position,
            expected: expected.into(),
            actual: actual.into(),
        })
    }

    /// Returns the codec error inside this error, if it is one.
    #[must_use]
    pub fn as_serialization(&self) -> Option<&SerializationError> {
        match &self.kind {
            ErrorKind::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The tagged reference codec rejected a value or a blob.
    #[error("serialization error: {0}")]
    Serialization(SerializationError),

    /// A static path does not exist in the loaded star system.
    #[error("not found: {0}")]
    NotFound(String),

    /// Body was not found in space.
    #[error("body not found: {0:?}")]
    BodyNotFound(BodyId),

    /// Body reference is stale (generation mismatch).
    #[error("stale body reference: {0:?}")]
    StaleBody(BodyId),

    /// A script passed a value of the wrong type to a native function.
    #[error("bad argument #{position} to '{function}' ({expected} expected, got {actual})")]
    BadArgument {
        /// Name of the native function.
        function: String,
        /// Argument position (1-indexed, as Lua reports it).
        position: usize,
        /// Description of the accepted type.
        expected: String,
        /// Type name of the value actually passed.
        actual: String,
    },

    /// Save file was written by an incompatible version.
    #[error("unsupported save version: expected {expected}, found {found}")]
    SaveVersion {
        /// Version this build reads and writes.
        expected: u32,
        /// Version recorded in the file.
        found: u32,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// File system failure.
    #[error("io error: {0}")]
    IoError(String),

    /// Save container encoding failure.
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// Error raised inside the scripting runtime.
    #[error("script error: {0}")]
    Script(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failures of the tagged reference codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    /// A live handle was cleared or refers to a body kind that is never saved.
    #[error("live handle does not refer to a persistable body")]
    UnsupportedHandle,

    /// A value of a type the codec does not know reached it.
    #[error("tried to serialize unknown userdata type: {0}")]
    UnknownType(String),

    /// A blob's leading line matched none of the known tags.
    #[error("unrecognized tag: {0:?}")]
    UnrecognizedTag(String),

    /// A record field did not parse.
    #[error("malformed record: expected {expected}, found {found:?}")]
    Malformed {
        /// What the reader was looking for.
        expected: String,
        /// What it found instead.
        found: String,
    },
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Save file, script, or record name.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Chain of keys or calls leading to the failure, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source, self.line) {
            (Some(source), Some(line)) => write!(f, "at {source}:{line}")?,
            (Some(source), None) => write!(f, "at {source}")?,
            (None, Some(line)) => write!(f, "at line {line}")?,
            (None, None) => {}
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
