//! Renderer-facing views of live groups.
//!
//! The pool never talks to a GPU. Each frame a renderer walks
//! [`ParticlePool::views`](crate::ParticlePool::views), copies what it needs
//! into its own vertex buffers, and updates its material opacity.
//!
//! # Example
//!
//! ```ignore
//! let mut scratch = Vec::new();
//! for view in pool.views() {
//!     view.write_vertices(&mut scratch);
//!     queue.write_buffer(&buffers[&view.handle], 0, bytemuck::cast_slice(&scratch));
//!     materials.get_mut(&view.handle).unwrap().opacity = view.opacity;
//! }
//! ```

use crate::group::{GroupHandle, ParticleGroup};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Borrowed, read-only view of one live group for a single frame.
#[derive(Debug, Clone, Copy)]
pub struct GroupView<'a> {
    pub handle: GroupHandle,
    pub positions: &'a [Vec3],
    pub sizes: &'a [f32],
    pub colors: &'a [Vec3],
    /// Group life clamped to `0.0..=1.0`; fades the group out.
    pub opacity: f32,
}

impl<'a> GroupView<'a> {
    pub fn new(handle: GroupHandle, group: &'a ParticleGroup) -> Self {
        Self {
            handle,
            positions: group.positions(),
            sizes: group.sizes(),
            colors: group.colors(),
            opacity: group.opacity(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Interleave this group's attributes into `out`, replacing its contents.
    ///
    /// `out` is reused across frames so steady-state rendering does not
    /// allocate.
    pub fn write_vertices(&self, out: &mut Vec<PointVertex>) {
        out.clear();
        out.extend(
            self.positions
                .iter()
                .zip(self.sizes)
                .zip(self.colors)
                .map(|((p, s), c)| PointVertex {
                    position: p.to_array(),
                    size: *s,
                    color: [c.x, c.y, c.z, self.opacity],
                }),
        );
    }
}

/// One interleaved point-sprite vertex, ready for upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub size: f32,
    /// RGB from the particle, alpha from the group's opacity.
    pub color: [f32; 4],
}

/// How overlapping particles combine on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Standard alpha blending.
    Alpha,
    /// Colors add up, so dense bursts glow.
    #[default]
    Additive,
    /// Colors multiply, darkening what is behind.
    Multiply,
}

/// Material hints for drawing a group as points.
///
/// Defaults match the toy's look: small additive points with vertex colors
/// and no depth writes, so bursts glow through each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsMaterial {
    /// World-space point size multiplier.
    pub point_size: f32,
    pub vertex_colors: bool,
    pub transparent: bool,
    pub blend_mode: BlendMode,
    pub depth_write: bool,
    pub opacity: f32,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            point_size: 0.1,
            vertex_colors: true,
            transparent: true,
            blend_mode: BlendMode::Additive,
            depth_write: false,
            opacity: 1.0,
        }
    }
}

impl PointsMaterial {
    /// Copy the view's opacity onto the material.
    #[inline]
    pub fn sync(&mut self, view: &GroupView<'_>) {
        self.opacity = view.opacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::emitter::{EmissionRequest, Emitter};

    fn sample_group() -> ParticleGroup {
        Emitter::from_seed(9)
            .build(&EmissionRequest::new(5, Color::rgb(1.0, 0.5, 0.0)), 60.0)
            .unwrap()
    }

    fn handle() -> GroupHandle {
        GroupHandle {
            index: 0,
            generation: 0,
        }
    }

    #[test]
    fn test_point_vertex_layout() {
        assert_eq!(std::mem::size_of::<PointVertex>(), 32);
    }

    #[test]
    fn test_write_vertices_interleaves() {
        let group = sample_group();
        let view = GroupView::new(handle(), &group);
        let mut out = vec![PointVertex::zeroed(); 99];
        view.write_vertices(&mut out);

        assert_eq!(out.len(), 5);
        for (i, v) in out.iter().enumerate() {
            assert_eq!(v.position, group.positions()[i].to_array());
            assert_eq!(v.size, group.sizes()[i]);
            assert_eq!(v.color[3], 1.0);
        }
        let bytes: &[u8] = bytemuck::cast_slice(&out);
        assert_eq!(bytes.len(), 5 * 32);
    }

    #[test]
    fn test_material_defaults_and_sync() {
        let mut material = PointsMaterial::default();
        assert_eq!(material.blend_mode, BlendMode::Additive);
        assert!(!material.depth_write);

        let group = sample_group();
        let mut view = GroupView::new(handle(), &group);
        view.opacity = 0.25;
        material.sync(&view);
        assert_eq!(material.opacity, 0.25);
    }

    #[test]
    fn test_material_from_partial_json() {
        let material: PointsMaterial =
            serde_json::from_str(r#"{ "point_size": 0.3, "blend_mode": "alpha" }"#).unwrap();
        assert_eq!(material.point_size, 0.3);
        assert_eq!(material.blend_mode, BlendMode::Alpha);
        assert!(material.transparent);
    }
}
