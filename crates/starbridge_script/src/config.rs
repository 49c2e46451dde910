//! Configuration for a scripting session.

use starbridge_foundation::{Error, ErrorKind, Result};

/// Configuration for a scripting session.
///
/// Controls randomness, the starting clock, and where scripts keep the state
/// that is written to saves.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Seed for the session RNG.
    pub seed: u64,

    /// Game time, in seconds, a fresh session starts at.
    pub start_time: f64,

    /// Radius, in metres, around the origin in which spawned ships appear.
    pub spawn_radius: f64,

    /// Name of the Lua global table written to and restored from saves.
    pub persist_global: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            start_time: 0.0,
            spawn_radius: 1.0e9,
            persist_global: "PersistentData".to_string(),
        }
    }
}

impl SessionConfig {
    /// Creates a configuration for a new game: seeded from the clock,
    /// starting at the beginning of the calendar.
    #[must_use]
    pub fn new_game() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Creates a deterministic configuration for tests.
    #[must_use]
    pub fn testing() -> Self {
        Self {
            seed: 0x5eed,
            start_time: 1_000.0,
            spawn_radius: 1.0e6,
            ..Self::default()
        }
    }

    /// Builder method to set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method to set the starting game time.
    #[must_use]
    pub fn with_start_time(mut self, seconds: f64) -> Self {
        self.start_time = seconds;
        self
    }

    /// Builder method to set the spawn radius.
    #[must_use]
    pub fn with_spawn_radius(mut self, radius: f64) -> Self {
        self.spawn_radius = radius;
        self
    }

    /// Checks that every value can be used as-is.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error for a non-finite start time, a spawn radius
    /// that is negative or not finite, or an empty persistent global name.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(Error::new(ErrorKind::Config(msg))) };
        if !self.start_time.is_finite() {
            return invalid(format!("start_time must be finite, got {}", self.start_time));
        }
        if !self.spawn_radius.is_finite() || self.spawn_radius < 0.0 {
            return invalid(format!(
                "spawn_radius must be finite and non-negative, got {}",
                self.spawn_radius
            ));
        }
        if self.persist_global.is_empty() {
            return invalid("persist_global must not be empty".to_string());
        }
        Ok(())
    }

    /// Builder method to set the persistent global's name.
    #[must_use]
    pub fn with_persist_global(mut self, name: impl Into<String>) -> Self {
        self.persist_global = name.into();
        self
    }
}
