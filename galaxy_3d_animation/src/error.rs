//! Error types for the Galaxy3D animation core
//!
//! Errors only surface from construction paths (clips, armatures, scheduler).
//! Per-frame faults degrade to a stale pose and are logged instead.

use std::fmt;

/// Result type for Galaxy3D animation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D animation errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed animation data (empty track, unordered keyframes, bad rate)
    InvalidAnimation(String),

    /// Malformed bone hierarchy (unknown parent, second root, ...)
    InvalidArmature(String),

    /// Initialization failed (worker pool, subsystems)
    InitializationFailed(String),

    /// A shared lock was poisoned by a panicking writer
    LockPoisoned(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidAnimation(msg) => write!(f, "Invalid animation: {}", msg),
            Error::InvalidArmature(msg) => write!(f, "Invalid armature: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::LockPoisoned(msg) => write!(f, "Lock poisoned: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
