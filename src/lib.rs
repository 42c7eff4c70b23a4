//! # burstpool
//!
//! CPU particle bursts for gesture-driven visual toys.
//!
//! A hand tracker (or any other event source) asks for a burst; burstpool
//! creates a group of particles, flies them outward each frame, fades them,
//! and hands them back to the renderer for disposal once they're spent.
//! It never touches the GPU: renderers read plain attribute slices each
//! frame and get a callback when a group is gone.
//!
//! ## Quick Start
//!
//! ```
//! use burstpool::prelude::*;
//!
//! let mut pool = ParticlePool::new();
//!
//! // A pinch was detected at the fingertip.
//! pool.emit(EmissionRequest::pop(Vec3::new(0.1, 0.4, 0.0), Color::from_hex(0xff8800)))
//!     .unwrap();
//!
//! // Once per rendered frame:
//! pool.tick(1.0 / 60.0);
//! for view in pool.views() {
//!     // upload view.positions / view.sizes / view.colors, fade by view.opacity
//!     assert!(view.opacity < 1.0);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Groups
//!
//! Every emission produces one [`ParticleGroup`]: a fixed-size batch of
//! particles that share a single life clock. Life starts at `1.0`, drops by
//! `1 / (lifetime * 60)` every tick, and the group is retired the tick it
//! reaches zero.
//!
//! ### Ticks
//!
//! Each [`ParticlePool::tick`] moves every particle by its velocity, pulls
//! velocity down by the group's gravity, and damps it by 2%. Damping and decay
//! are per tick, not per second, unless configured otherwise (see
//! [`lifecycle`]).
//!
//! ### Observers
//!
//! Renderers implement [`GroupObserver`] to allocate resources when a group
//! spawns and free them when it retires. Each callback fires exactly once
//! per group.
//!
//! ### Threads
//!
//! The pool is single-threaded. Other threads submit bursts through an
//! [`EmissionSender`]; they are applied at the start of the next tick.
//!
//! ## Feature Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`emitter`] | [`EmissionRequest`], [`Emitter`], presets |
//! | [`pool`] | [`ParticlePool`], [`TickReport`], [`PoolStats`] |
//! | [`lifecycle`] | [`GroupObserver`], [`DecayMode`], [`DragMode`] |
//! | [`render`] | [`GroupView`], [`PointVertex`], [`PointsMaterial`] |
//! | [`config`] | [`PoolConfig`] with JSON loading |
//! | [`time`] | [`FrameClock`] for host loops |

pub mod color;
pub mod config;
pub mod emitter;
pub mod error;
pub mod group;
pub mod lifecycle;
pub mod pool;
mod queue;
pub mod render;
pub mod time;

pub use bytemuck;
pub use color::Color;
pub use config::PoolConfig;
pub use emitter::{EmissionRequest, Emitter};
pub use error::{ConfigError, DisposeError, EmitError, ParseColorError, QueueError};
pub use glam::Vec3;
pub use group::{GroupHandle, ParticleGroup};
pub use lifecycle::{DecayMode, DragMode, GroupObserver, RetirementLog};
pub use pool::{ParticlePool, PoolStats, TickReport};
pub use queue::EmissionSender;
pub use render::{BlendMode, GroupView, PointVertex, PointsMaterial};
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// ```
/// use burstpool::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::config::PoolConfig;
    pub use crate::emitter::EmissionRequest;
    pub use crate::error::{DisposeError, EmitError};
    pub use crate::group::{GroupHandle, ParticleGroup};
    pub use crate::lifecycle::GroupObserver;
    pub use crate::pool::ParticlePool;
    pub use crate::queue::EmissionSender;
    pub use crate::render::{GroupView, PointVertex, PointsMaterial};
    pub use crate::Vec3;
}
