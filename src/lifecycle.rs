//! Group lifecycle: decay, drag, and retirement hooks.
//!
//! Every group starts with a life of `1.0` and loses `decay` per tick.
//! Internally life is a count of remaining ticks, `lifetime * fps`, so long
//! lifetimes retire on exactly the right tick. The first tick life reaches
//! zero, the pool removes the group and tells its
//! [`GroupObserver`] to release whatever it allocated for it.
//!
//! # Timing Modes
//!
//! Both life decay and velocity drag are, by default, fixed amounts per tick
//! that ignore the elapsed time passed to [`tick`](crate::ParticlePool::tick).
//! A slow frame therefore fades a group by the same amount as a fast one.
//! The alternative modes rescale by `dt * assumed_frame_rate`, which makes
//! timing independent of frame rate.
//!
//! | Mode | Per-tick effect |
//! |------|-----------------|
//! | [`DecayMode::PerTick`] | `remaining_ticks -= 1` |
//! | [`DecayMode::ElapsedScaled`] | `remaining_ticks -= dt * fps` |
//! | [`DragMode::PerTick`] | `velocity *= drag` |
//! | [`DragMode::TimeScaled`] | `velocity *= drag.powf(dt * fps)` |
//!
//! # Observers
//!
//! ```ignore
//! struct GpuPoints { meshes: HashMap<GroupHandle, PointsMesh> }
//!
//! impl GroupObserver for GpuPoints {
//!     fn on_spawn(&mut self, handle: GroupHandle, group: &ParticleGroup) {
//!         self.meshes.insert(handle, PointsMesh::new(group.count()));
//!     }
//!
//!     fn on_retire(&mut self, handle: GroupHandle) -> Result<(), DisposeError> {
//!         let mesh = self.meshes.remove(&handle)
//!             .ok_or_else(|| DisposeError::new("no mesh for group"))?;
//!         mesh.destroy();
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::DisposeError;
use crate::group::{GroupHandle, ParticleGroup};
use serde::{Deserialize, Serialize};

/// How group life decreases per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayMode {
    /// Subtract the group's decay once per tick regardless of elapsed time.
    #[default]
    PerTick,
    /// Subtract `decay * dt * assumed_frame_rate`, so lifetimes hold in seconds.
    ElapsedScaled,
}

impl DecayMode {
    /// Ticks of life consumed by a tick of `dt` seconds.
    #[inline]
    pub fn scale(self, dt: f32, assumed_frame_rate: f32) -> f64 {
        match self {
            DecayMode::PerTick => 1.0,
            DecayMode::ElapsedScaled => f64::from(dt) * f64::from(assumed_frame_rate),
        }
    }
}

/// How velocity damping is applied per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    /// Multiply velocity by `drag` once per tick.
    #[default]
    PerTick,
    /// Multiply velocity by `drag^(dt * assumed_frame_rate)`.
    TimeScaled,
}

impl DragMode {
    /// Velocity multiplier for a tick of `dt` seconds.
    #[inline]
    pub fn factor(self, drag: f32, dt: f32, assumed_frame_rate: f32) -> f32 {
        match self {
            DragMode::PerTick => drag,
            DragMode::TimeScaled => drag.powf(dt * assumed_frame_rate),
        }
    }
}

/// Number of ticks a group of `lifetime_secs` lives at a nominal frame rate.
#[inline]
pub fn lifetime_ticks(lifetime_secs: f32, assumed_frame_rate: f32) -> f64 {
    f64::from(lifetime_secs) * f64::from(assumed_frame_rate)
}

/// Per-tick decay of normalized life for a lifetime in seconds.
///
/// A group with this decay reaches zero life after
/// `lifetime_secs * assumed_frame_rate` ticks.
#[inline]
pub fn decay_for(lifetime_secs: f32, assumed_frame_rate: f32) -> f64 {
    1.0 / lifetime_ticks(lifetime_secs, assumed_frame_rate)
}

/// Receives spawn and retirement notifications from a pool.
///
/// This is the seam between the simulation and whatever draws it. A renderer
/// typically allocates geometry in `on_spawn` and frees it in `on_retire`.
///
/// An observer sees exactly one `on_spawn` and exactly one `on_retire` for
/// each group. When a pool's observer is replaced with
/// [`with_observer`](crate::ParticlePool::with_observer), the outgoing one
/// retires every live group and the incoming one spawns them.
///
/// Retirement callbacks run after the pool has already forgotten the groups,
/// so a panicking `on_retire` cannot leave a dead group in the pool. It does
/// skip the remaining notifications for that tick.
pub trait GroupObserver {
    /// A fully initialized group joined the pool.
    fn on_spawn(&mut self, _handle: GroupHandle, _group: &ParticleGroup) {}

    /// A group left the pool and its buffers have been dropped.
    ///
    /// Returning an error does not keep the group alive; the pool logs the
    /// failure, counts it, and moves on.
    fn on_retire(&mut self, handle: GroupHandle) -> Result<(), DisposeError>;
}

/// No-op observer for pools whose groups own no external resources.
impl GroupObserver for () {
    fn on_retire(&mut self, _handle: GroupHandle) -> Result<(), DisposeError> {
        Ok(())
    }
}

impl<T: GroupObserver + ?Sized> GroupObserver for Box<T> {
    fn on_spawn(&mut self, handle: GroupHandle, group: &ParticleGroup) {
        (**self).on_spawn(handle, group)
    }

    fn on_retire(&mut self, handle: GroupHandle) -> Result<(), DisposeError> {
        (**self).on_retire(handle)
    }
}

/// Observer that only records handles. Handy in tests and for hosts that
/// poll for retirements instead of reacting to them.
#[derive(Debug, Default, Clone)]
pub struct RetirementLog {
    pub spawned: Vec<GroupHandle>,
    pub retired: Vec<GroupHandle>,
}

impl RetirementLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `handle` has been retired.
    pub fn retire_count(&self, handle: GroupHandle) -> usize {
        self.retired.iter().filter(|h| **h == handle).count()
    }
}

impl GroupObserver for RetirementLog {
    fn on_spawn(&mut self, handle: GroupHandle, _group: &ParticleGroup) {
        self.spawned.push(handle);
    }

    fn on_retire(&mut self, handle: GroupHandle) -> Result<(), DisposeError> {
        self.retired.push(handle);
        Ok(())
    }
}
