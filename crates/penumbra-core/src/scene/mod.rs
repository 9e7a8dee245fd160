// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The scene-side contract consumed by shadow generators.
//!
//! Generators never own scene geometry. They store [`MeshId`] handles and
//! resolve bounds and hierarchy through the [`Scene`] trait when needed, so a
//! mesh removed from the scene simply stops resolving.

use crate::math::{Aabb, Mat4, Vec3};

/// An opaque, non-owning handle to a mesh in the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// A handle returned when registering a per-frame hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub u64);

/// A callback the host loop invokes once per frame, before rendering.
pub type BeforeRenderHook = Box<dyn FnMut(&dyn Scene)>;

/// Snapshot of the active camera, as needed for cascade fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// World-to-view transform (right-handed, looking down `-Z`).
    pub view: Mat4,
    /// View-to-clip perspective projection.
    pub projection: Mat4,
    /// Distance to the near clip plane.
    pub near: f32,
    /// Distance to the far clip plane.
    pub far: f32,
}

impl CameraView {
    /// Creates a camera snapshot from explicit matrices.
    pub fn new(view: Mat4, projection: Mat4, near: f32, far: f32) -> Self {
        Self {
            view,
            projection,
            near,
            far,
        }
    }

    /// Creates a perspective camera at `eye` looking at `target`.
    pub fn perspective(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, Vec3::Y),
            projection: Mat4::perspective_rh(fov_y, aspect, near, far),
            near,
            far,
        }
    }

    /// Returns `far - near`.
    #[inline]
    pub fn depth_range(&self) -> f32 {
        self.far - self.near
    }

    /// Returns the camera position in world space.
    pub fn world_position(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }

    /// Returns the eight world-space corners of the frustum slab between
    /// view-space distances `near` and `far`.
    ///
    /// The first four corners lie on the near plane, the last four on the far plane.
    pub fn slice_corners(&self, near: f32, far: f32) -> [Vec3; 8] {
        let tan_half_y = 1.0 / self.projection.y_axis.y;
        let tan_half_x = 1.0 / self.projection.x_axis.x;
        let inv_view = self.view.inverse();
        std::array::from_fn(|i| {
            let d = if i < 4 { near } else { far };
            let sx = if i & 1 == 0 { -1.0 } else { 1.0 };
            let sy = if i & 2 == 0 { -1.0 } else { 1.0 };
            inv_view.transform_point3(Vec3::new(sx * d * tan_half_x, sy * d * tan_half_y, -d))
        })
    }
}

/// The scene a shadow generator is bound to.
pub trait Scene {
    /// The global shadow toggle.
    fn shadows_enabled(&self) -> bool;

    /// The camera currently used for rendering, if any.
    fn active_camera(&self) -> Option<CameraView>;

    /// World-space bounds of `mesh`, or `None` if it no longer exists.
    fn world_bounds(&self, mesh: MeshId) -> Option<Aabb>;

    /// Direct children of `mesh` that are meshes.
    fn child_meshes(&self, mesh: MeshId) -> Vec<MeshId>;

    /// Whether `mesh` is rendered with alpha blending.
    fn is_transparent(&self, _mesh: MeshId) -> bool {
        false
    }

    /// Registers a hook run once per frame before rendering.
    fn add_before_render_hook(&mut self, hook: BeforeRenderHook) -> HookId;

    /// Removes a previously registered hook. Returns `false` if it was unknown.
    fn remove_before_render_hook(&mut self, id: HookId) -> bool;
}

/// Collects every mesh below `root` in depth-first order, excluding `root`.
pub fn descendant_meshes(scene: &dyn Scene, root: MeshId) -> Vec<MeshId> {
    let mut out = Vec::new();
    let mut stack: Vec<MeshId> = scene.child_meshes(root).into_iter().rev().collect();
    while let Some(mesh) = stack.pop() {
        out.push(mesh);
        stack.extend(scene.child_meshes(mesh).into_iter().rev());
    }
    out
}
