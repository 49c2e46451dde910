//! Newline-delimited record format.
//!
//! Every scalar is written as its decimal text followed by `\n`. Strings are
//! written as a byte length line followed by the raw bytes and a newline, so
//! they may themselves contain newlines. This is the structural encoding used
//! by `SysLoc`, `SBodyPath`, and the space save records.

use std::fmt::Display;
use std::str::FromStr;

use crate::{Error, ErrorContext, Result};

/// Appends fields to a text record.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    data: String,
}

impl Writer {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, value: impl Display) {
        use std::fmt::Write;
        // Writing to a String never fails.
        let _ = writeln!(self.data, "{value}");
    }

    /// Writes a signed 32-bit integer.
    pub fn int32(&mut self, value: i32) {
        self.line(value);
    }

    /// Writes an unsigned 32-bit integer.
    pub fn uint32(&mut self, value: u32) {
        self.line(value);
    }

    /// Writes a signed 64-bit integer.
    pub fn int64(&mut self, value: i64) {
        self.line(value);
    }

    /// Writes a float using the shortest representation that reads back exactly.
    pub fn double(&mut self, value: f64) {
        self.line(value);
    }

    /// Writes a boolean as `1` or `0`.
    pub fn bool(&mut self, value: bool) {
        self.line(u8::from(value));
    }

    /// Writes a length-prefixed string.
    pub fn string(&mut self, value: &str) {
        self.line(value.len());
        self.data.push_str(value);
        self.data.push('\n');
    }

    /// Returns the record written so far.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Consumes the writer, returning the record.
    #[must_use]
    pub fn into_string(self) -> String {
        self.data
    }
}

/// Reads fields back from a text record, in the order they were written.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a str) -> Self {
        Self {
            data,
            pos: 0,
            line: 1,
        }
    }

    /// Returns true when every byte has been consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Returns the 1-indexed line the next field starts on.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the unread remainder of the record.
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        &self.data[self.pos..]
    }

    fn next_line(&mut self, expected: &str) -> Result<&'a str> {
        let rest = self.remaining();
        let Some(end) = rest.find('\n') else {
            let found = if rest.is_empty() { "end of data" } else { rest };
            return Err(self.malformed(expected, found));
        };
        self.pos += end + 1;
        self.line += 1;
        Ok(&rest[..end])
    }

    /// Malformed-record error tagged with the line the reader is on.
    fn malformed(&self, expected: impl Into<String>, found: impl Into<String>) -> Error {
        malformed_at(self.line, expected, found)
    }

    fn parse<T: FromStr>(&mut self, expected: &str) -> Result<T> {
        let start = self.line;
        let line = self.next_line(expected)?;
        line.parse()
            .map_err(|_| malformed_at(start, expected, line))
    }

    /// Reads a signed 32-bit integer.
    ///
    /// # Errors
    ///
    /// Returns a malformed-record error if the next line is not an `i32`.
    pub fn int32(&mut self) -> Result<i32> {
        self.parse("32-bit integer")
    }

    /// Reads an unsigned 32-bit integer.
    ///
    /// # Errors
    ///
    /// Returns a malformed-record error if the next line is not a `u32`.
    pub fn uint32(&mut self) -> Result<u32> {
        self.parse("unsigned 32-bit integer")
    }

    /// Reads a signed 64-bit integer.
    ///
    /// # Errors
    ///
    /// Returns a malformed-record error if the next line is not an `i64`.
    pub fn int64(&mut self) -> Result<i64> {
        self.parse("64-bit integer")
    }

    /// Reads a float.
    ///
    /// # Errors
    ///
    /// Returns a malformed-record error if the next line is not a float.
    pub fn double(&mut self) -> Result<f64> {
        self.parse("float")
    }

    /// Reads a boolean written as `1` or `0`.
    ///
    /// # Errors
    ///
    /// Returns a malformed-record error for any other line.
    pub fn bool(&mut self) -> Result<bool> {
        let start = self.line;
        match self.next_line("boolean")? {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(malformed_at(start, "boolean", other)),
        }
    }

    /// Reads a length-prefixed string.
    ///
    /// # Errors
    ///
    /// Returns a malformed-record error if the length is invalid or the data
    /// is truncated.
    pub fn string(&mut self) -> Result<String> {
        let len: usize = self.parse("string length")?;
        let start = self.pos;
        let Some(body) = start.checked_add(len).and_then(|end| self.data.get(start..end)) else {
            return Err(self.malformed(format!("{len} bytes of string"), self.remaining()));
        };
        let end = start + len;
        if self.data.as_bytes().get(end) != Some(&b'\n') {
            return Err(self.malformed("newline after string", &self.data[end..]));
        }
        self.pos = end + 1;
        self.line += body.matches('\n').count() + 1;
        Ok(body.to_string())
    }
}

fn malformed_at(line: usize, expected: impl Into<String>, found: impl Into<String>) -> Error {
    Error::malformed(expected, found).with_context(ErrorContext::new().with_line(line))
}
