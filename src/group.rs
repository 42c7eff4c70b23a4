//! Particle groups: one batch of particles per emission.
//!
//! A group stores its particles as parallel attribute buffers (structure of
//! arrays) so a renderer can copy each attribute straight into a vertex
//! buffer. All particles in a group share one life clock.
//!
//! | Buffer | Mutability | Per |
//! |--------|------------|-----|
//! | `positions` | advanced every tick | particle |
//! | `velocities` | gravity + drag every tick | particle |
//! | `sizes` | fixed at emission | particle |
//! | `colors` | fixed at emission | particle |
//! | `life` | decays every tick | group |
//!
//! Life is tracked as remaining ticks in `f64`. Under per-tick decay each
//! tick subtracts exactly `1.0`, which is exact for any integral tick count
//! below 2^53, so a group retires on precisely its `lifetime * fps`-th tick
//! however long it lives.

use glam::Vec3;
use std::fmt;

/// Remaining ticks at or below this count as expired.
///
/// Covers the `f32` representation error of the requested lifetime, e.g.
/// `0.1_f32 * 60` is `6.0000000894` ticks and retires on tick 6.
pub const RETIRE_TOLERANCE_TICKS: f64 = 1e-3;

/// Longest accepted lifetime, in ticks. Above this one tick's worth of
/// elapsed-time decay could round away against the remaining count.
pub const MAX_LIFETIME_TICKS: f64 = (1u64 << 40) as f64;

/// Generation-tagged reference to a group in a [`ParticlePool`](crate::ParticlePool).
///
/// Handles stay cheap to copy and safe to hold after the group is retired:
/// once a slot is recycled its generation changes, so a stale handle simply
/// stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl GroupHandle {
    /// Slot index inside the pool's arena.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// How many times the slot had been reused when this handle was issued.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for GroupHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}v{}", self.index, self.generation)
    }
}

/// Outcome of advancing a group by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Life is still positive; particles were integrated.
    Alive,
    /// Life crossed zero this tick; nothing was integrated.
    Expired,
}

/// Per-tick integration parameters resolved by the pool.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StepParams {
    /// Seconds used for position/gravity integration.
    pub dt: f32,
    /// Ticks of life consumed this step (1.0 for fixed-rate decay).
    pub elapsed_ticks: f64,
    /// Multiplier applied to every velocity component after integration.
    pub drag_factor: f32,
}

/// A batch of particles created by a single emission.
///
/// Buffers are sized once at creation and never grow or shrink.
#[derive(Debug, Clone)]
pub struct ParticleGroup {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    sizes: Vec<f32>,
    colors: Vec<Vec3>,
    /// Remaining life in ticks.
    remaining_ticks: f64,
    lifetime_ticks: f64,
    gravity: f32,
    ticks: u64,
}

impl ParticleGroup {
    /// Assemble a group from fully populated buffers.
    ///
    /// All four buffers must have the same non-zero length and
    /// `lifetime_ticks` must be positive. Only the emitter builds groups, so
    /// this is checked with debug assertions.
    pub(crate) fn from_buffers(
        positions: Vec<Vec3>,
        velocities: Vec<Vec3>,
        sizes: Vec<f32>,
        colors: Vec<Vec3>,
        lifetime_ticks: f64,
        gravity: f32,
    ) -> Self {
        debug_assert!(!positions.is_empty());
        debug_assert!(lifetime_ticks > 0.0);
        debug_assert_eq!(positions.len(), velocities.len());
        debug_assert_eq!(positions.len(), sizes.len());
        debug_assert_eq!(positions.len(), colors.len());
        Self {
            positions,
            velocities,
            sizes,
            colors,
            remaining_ticks: lifetime_ticks,
            lifetime_ticks,
            gravity,
            ticks: 0,
        }
    }

    /// Number of particles in the group.
    #[inline]
    pub fn count(&self) -> u32 {
        self.positions.len() as u32
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    #[inline]
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Positions as a flat `x, y, z, x, y, z, ...` slice.
    #[inline]
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Colors as a flat `r, g, b, r, g, b, ...` slice.
    #[inline]
    pub fn colors_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Remaining normalized life. Starts at 1.0 and only decreases.
    #[inline]
    pub fn life(&self) -> f64 {
        self.remaining_ticks / self.lifetime_ticks
    }

    /// Opacity hint for the renderer: life clamped to `0.0..=1.0`.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.life().clamp(0.0, 1.0) as f32
    }

    /// Life lost per tick at the nominal frame rate.
    #[inline]
    pub fn decay(&self) -> f64 {
        1.0 / self.lifetime_ticks
    }

    /// Ticks left before retirement at the nominal frame rate.
    #[inline]
    pub fn remaining_ticks(&self) -> f64 {
        self.remaining_ticks
    }

    /// Downward acceleration in units per second squared.
    #[inline]
    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Ticks this group has been integrated for.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.remaining_ticks <= RETIRE_TOLERANCE_TICKS
    }

    /// Advance the group by one tick.
    ///
    /// Life is decremented first. If it has run out the particles are left
    /// untouched and the caller is expected to retire the group.
    pub(crate) fn step(&mut self, params: StepParams) -> StepOutcome {
        self.remaining_ticks -= params.elapsed_ticks;
        if self.is_expired() {
            self.remaining_ticks = self.remaining_ticks.min(0.0);
            return StepOutcome::Expired;
        }

        let dt = params.dt;
        let fall = self.gravity * dt;
        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *position += *velocity * dt;
            velocity.y -= fall;
            *velocity *= params.drag_factor;
        }
        self.ticks += 1;
        StepOutcome::Alive
    }
}
