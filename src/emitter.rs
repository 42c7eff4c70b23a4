//! Burst emission.
//!
//! An [`EmissionRequest`] describes one burst: how many particles, where,
//! what color, how fast and how long they live. The [`Emitter`] turns a
//! request into a fully initialized [`ParticleGroup`].
//!
//! # Sampling
//!
//! Every particle in a burst starts at the origin. The rest is randomized
//! per particle:
//!
//! | Attribute | Distribution |
//! |-----------|--------------|
//! | Direction | Uniform on the unit sphere |
//! | Speed | `speed * U(0.5, 1.0)` |
//! | Size | `size * U(0.5, 1.0)` |
//! | Color | `color * U(0.8, 1.2)`, same factor for all channels |
//!
//! Directions use `phi = acos(2u - 1)` for the polar angle. Drawing `phi`
//! uniformly instead would cluster particles around the poles.
//!
//! # Example
//!
//! ```
//! use burstpool::{EmissionRequest, Vec3};
//!
//! let request = EmissionRequest::new(40, "#ff8800".parse().unwrap())
//!     .at(Vec3::new(0.2, 1.0, 0.0))
//!     .speed(2.0)
//!     .lifetime(0.8)
//!     .gravity(3.0);
//! assert!(request.validate().is_ok());
//! ```

use crate::color::Color;
use crate::error::EmitError;
use crate::group::{ParticleGroup, MAX_LIFETIME_TICKS};
use crate::lifecycle::lifetime_ticks;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Parameters for a single burst of particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionRequest {
    /// Number of particles. Must be greater than zero.
    pub count: u32,
    /// Base color; each particle gets a brightness variation of it.
    pub color: Color,
    /// Where every particle starts.
    pub origin: Vec3,
    /// Base point size; each particle gets 50-100% of it.
    pub size: f32,
    /// Maximum initial speed; each particle gets 50-100% of it.
    pub speed: f32,
    /// Seconds until the group is retired, at the nominal frame rate.
    pub lifetime: f32,
    /// Downward acceleration (units/s²). Zero means particles drift freely.
    pub gravity: f32,
}

impl Default for EmissionRequest {
    fn default() -> Self {
        Self {
            count: 1,
            color: Color::WHITE,
            origin: Vec3::ZERO,
            size: 0.1,
            speed: 1.0,
            lifetime: 1.0,
            gravity: 0.0,
        }
    }
}

impl EmissionRequest {
    /// Start a request for `count` particles of the given color.
    pub fn new(count: u32, color: Color) -> Self {
        Self {
            count,
            color,
            ..Default::default()
        }
    }

    /// Set the origin every particle starts from.
    pub fn at(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    /// Set the base particle size.
    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Set the speed scale.
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the lifetime in seconds.
    pub fn lifetime(mut self, seconds: f32) -> Self {
        self.lifetime = seconds;
        self
    }

    /// Set the downward acceleration.
    pub fn gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Pop preset: a quick, dense burst for a pinch or a bubble popping.
    pub fn pop(origin: Vec3, color: Color) -> Self {
        Self::new(60, color)
            .at(origin)
            .size(0.12)
            .speed(2.5)
            .lifetime(0.6)
            .gravity(1.5)
    }

    /// Sparkle preset: slow, long-lived glitter that drifts down.
    pub fn sparkle(origin: Vec3, color: Color) -> Self {
        Self::new(30, color)
            .at(origin)
            .size(0.06)
            .speed(0.4)
            .lifetime(2.0)
            .gravity(0.3)
    }

    /// Trail preset: a handful of tiny particles dropped along a drawn stroke.
    pub fn trail(origin: Vec3, color: Color) -> Self {
        Self::new(4, color)
            .at(origin)
            .size(0.04)
            .speed(0.1)
            .lifetime(0.5)
    }

    /// Check every precondition of an emission.
    ///
    /// NaN and infinite values are rejected along with out-of-range ones.
    pub fn validate(&self) -> Result<(), EmitError> {
        if self.count == 0 {
            return Err(EmitError::ZeroCount);
        }
        if !(self.lifetime.is_finite() && self.lifetime > 0.0) {
            return Err(EmitError::InvalidLifetime(self.lifetime));
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(EmitError::InvalidSpeed(self.speed));
        }
        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return Err(EmitError::InvalidGravity(self.gravity));
        }
        if !(self.size.is_finite() && self.size >= 0.0) {
            return Err(EmitError::InvalidSize(self.size));
        }
        if !self.origin.is_finite() {
            return Err(EmitError::InvalidOrigin(self.origin));
        }
        Ok(())
    }
}

/// Builds particle groups from emission requests.
///
/// Owns its own RNG so bursts can be made reproducible with a seed.
#[derive(Debug, Clone)]
pub struct Emitter {
    rng: SmallRng,
}

impl Emitter {
    /// Emitter seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Emitter with a fixed seed; the same requests yield the same groups.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Validate `request` and build a fully populated group.
    ///
    /// The group is complete when this returns; nothing is left for the
    /// integrator to fill in.
    pub fn build(
        &mut self,
        request: &EmissionRequest,
        assumed_frame_rate: f32,
    ) -> Result<ParticleGroup, EmitError> {
        request.validate()?;
        if !(assumed_frame_rate.is_finite() && assumed_frame_rate > 0.0) {
            return Err(EmitError::InvalidFrameRate(assumed_frame_rate));
        }
        let ticks = lifetime_ticks(request.lifetime, assumed_frame_rate);
        if ticks > MAX_LIFETIME_TICKS {
            return Err(EmitError::InvalidLifetime(request.lifetime));
        }

        let n = request.count as usize;
        let positions = vec![request.origin; n];
        let mut velocities = Vec::with_capacity(n);
        let mut sizes = Vec::with_capacity(n);
        let mut colors = Vec::with_capacity(n);

        for _ in 0..n {
            let speed = self.random_speed(request.speed);
            velocities.push(self.random_direction() * speed);
            sizes.push(self.random_size(request.size));
            colors.push(self.random_tint(request.color).to_vec3());
        }

        Ok(ParticleGroup::from_buffers(
            positions,
            velocities,
            sizes,
            colors,
            ticks,
            request.gravity,
        ))
    }

    // ========== Sampling helpers ==========

    /// Uniformly distributed unit vector.
    pub fn random_direction(&mut self) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let phi = (2.0 * self.rng.gen::<f32>() - 1.0).acos();
        Vec3::new(
            phi.sin() * theta.cos(),
            phi.sin() * theta.sin(),
            phi.cos(),
        )
    }

    /// Speed in `[0.5, 1.0) * scale`.
    #[inline]
    pub fn random_speed(&mut self, scale: f32) -> f32 {
        scale * (0.5 + 0.5 * self.rng.gen::<f32>())
    }

    /// Size in `[0.5, 1.0) * base`.
    #[inline]
    pub fn random_size(&mut self, base: f32) -> f32 {
        base * (0.5 + 0.5 * self.rng.gen::<f32>())
    }

    /// `color` brightened or dimmed by a factor in `[0.8, 1.2)`.
    #[inline]
    pub fn random_tint(&mut self, color: Color) -> Color {
        color.scaled(self.rng.gen_range(0.8..1.2))
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EmissionRequest {
        EmissionRequest::new(10, Color::rgb(0.5, 0.25, 1.0))
            .at(Vec3::new(1.0, 2.0, 3.0))
            .size(0.2)
            .speed(4.0)
            .lifetime(1.0)
    }

    #[test]
    fn test_buffers_sized_to_count() {
        let mut emitter = Emitter::from_seed(1);
        for count in [1, 7, 250] {
            let mut r = request();
            r.count = count;
            let g = emitter.build(&r, 60.0).unwrap();
            assert_eq!(g.count(), count);
            assert_eq!(g.positions().len(), count as usize);
            assert_eq!(g.velocities().len(), count as usize);
            assert_eq!(g.sizes().len(), count as usize);
            assert_eq!(g.colors().len(), count as usize);
        }
    }

    #[test]
    fn test_initial_state() {
        let mut emitter = Emitter::from_seed(2);
        let r = request();
        let g = emitter.build(&r, 60.0).unwrap();

        assert_eq!(g.life(), 1.0);
        assert!((g.decay() - 1.0 / 60.0).abs() < 1e-7);
        assert!(g.positions().iter().all(|p| *p == r.origin));

        for v in g.velocities() {
            let speed = v.length();
            assert!(speed >= 0.5 * 4.0 - 1e-4 && speed <= 4.0 + 1e-4, "speed {speed}");
        }
        for s in g.sizes() {
            assert!(*s >= 0.1 - 1e-6 && *s <= 0.2 + 1e-6);
        }
        for c in g.colors() {
            let factor = c.x / 0.5;
            assert!((0.8 - 1e-5..=1.2 + 1e-5).contains(&factor));
            // Same factor on every channel.
            assert!((c.y / 0.25 - factor).abs() < 1e-4);
            assert!((c.z / 1.0 - factor).abs() < 1e-4);
        }
    }

    #[test]
    fn test_directions_are_unit_length() {
        let mut emitter = Emitter::from_seed(3);
        for _ in 0..1000 {
            assert!((emitter.random_direction().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_same_seed_same_group() {
        let a = Emitter::from_seed(42).build(&request(), 60.0).unwrap();
        let b = Emitter::from_seed(42).build(&request(), 60.0).unwrap();
        assert_eq!(a.velocities(), b.velocities());
        assert_eq!(a.sizes(), b.sizes());
        assert_eq!(a.colors(), b.colors());
    }

    #[test]
    fn test_zero_speed_is_allowed() {
        let mut emitter = Emitter::from_seed(4);
        let g = emitter.build(&request().speed(0.0), 60.0).unwrap();
        assert!(g.velocities().iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn test_rejects_invalid_requests() {
        let mut emitter = Emitter::from_seed(5);
        let cases = [
            (EmissionRequest { count: 0, ..request() }, EmitError::ZeroCount),
            (request().lifetime(0.0), EmitError::InvalidLifetime(0.0)),
            (request().lifetime(-2.0), EmitError::InvalidLifetime(-2.0)),
            (request().speed(-1.0), EmitError::InvalidSpeed(-1.0)),
            (request().gravity(-9.8), EmitError::InvalidGravity(-9.8)),
            (request().size(-0.1), EmitError::InvalidSize(-0.1)),
        ];
        for (r, expected) in cases {
            assert_eq!(emitter.build(&r, 60.0).unwrap_err(), expected);
        }

        assert!(matches!(
            emitter.build(&request().lifetime(f32::NAN), 60.0),
            Err(EmitError::InvalidLifetime(_))
        ));
        assert!(matches!(
            emitter.build(&request().at(Vec3::new(f32::INFINITY, 0.0, 0.0)), 60.0),
            Err(EmitError::InvalidOrigin(_))
        ));
        assert_eq!(
            emitter.build(&request(), 0.0).unwrap_err(),
            EmitError::InvalidFrameRate(0.0)
        );
        assert_eq!(
            emitter.build(&request().lifetime(1.0e12), 60.0).unwrap_err(),
            EmitError::InvalidLifetime(1.0e12)
        );
        assert!(emitter.build(&request().lifetime(1.0e9), 60.0).is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        let origin = Vec3::new(0.0, 1.0, 0.0);
        for r in [
            EmissionRequest::pop(origin, Color::WHITE),
            EmissionRequest::sparkle(origin, Color::WHITE),
            EmissionRequest::trail(origin, Color::WHITE),
        ] {
            assert!(r.validate().is_ok());
            assert_eq!(r.origin, origin);
        }
    }

    #[test]
    fn test_request_from_json() {
        let r: EmissionRequest = serde_json::from_str(
            r#"{ "count": 12, "color": "hotpink", "origin": [0.0, 1.0, 0.0], "lifetime": 2.0 }"#,
        )
        .unwrap();
        assert_eq!(r.count, 12);
        assert_eq!(r.color, Color::from_hex(0xff69b4));
        assert_eq!(r.origin, Vec3::Y);
        assert_eq!(r.gravity, 0.0);
        assert_eq!(r.speed, 1.0);
    }
}
