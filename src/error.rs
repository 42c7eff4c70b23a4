//! Error types for burstpool.
//!
//! This module provides error types for emission requests, color parsing,
//! configuration loading, cross-thread queueing, and renderer-side disposal.

use glam::Vec3;
use thiserror::Error;

/// Reasons an emission request is rejected.
///
/// Bad requests are refused outright, never clamped into range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmitError {
    /// A group must contain at least one particle.
    #[error("particle count must be greater than zero")]
    ZeroCount,
    /// Lifetime must be positive, finite and at most 2^40 ticks long.
    #[error("lifetime must be positive, finite and at most 2^40 ticks, got {0}")]
    InvalidLifetime(f32),
    /// Speed scale must be non-negative and finite.
    #[error("speed scale must be non-negative and finite, got {0}")]
    InvalidSpeed(f32),
    /// Gravity acceleration must be non-negative and finite.
    #[error("gravity acceleration must be non-negative and finite, got {0}")]
    InvalidGravity(f32),
    /// Base size must be non-negative and finite.
    #[error("base size must be non-negative and finite, got {0}")]
    InvalidSize(f32),
    /// Origin must not contain NaN or infinity.
    #[error("origin must be finite, got {0}")]
    InvalidOrigin(Vec3),
    /// The assumed frame rate used to derive decay was not positive.
    #[error("assumed frame rate must be positive and finite, got {0}")]
    InvalidFrameRate(f32),
}

/// A color string could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized color `{input}`")]
pub struct ParseColorError {
    /// The text that failed to parse.
    pub input: String,
}

impl ParseColorError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// Errors that can occur while loading a [`PoolConfig`](crate::PoolConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file was not valid JSON or had the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The values parsed but are out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors returned by [`EmissionSender::send`](crate::EmissionSender::send).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueueError {
    /// The request failed validation on the sending thread.
    #[error("rejected emission request: {0}")]
    Rejected(#[from] EmitError),
    /// The pool that owned the queue has been dropped.
    #[error("emission queue is closed")]
    Closed,
}

/// A renderer failed to release the resources tied to a retired group.
///
/// Returned from [`GroupObserver::on_retire`](crate::GroupObserver::on_retire).
/// The pool forgets the group regardless; this only reports a leak.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to dispose group resources: {reason}")]
pub struct DisposeError {
    /// Human-readable description of what went wrong.
    pub reason: String,
}

impl DisposeError {
    /// Create a disposal error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
