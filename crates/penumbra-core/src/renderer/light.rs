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

//! Defines the light contract consumed by shadow generators.
//!
//! A shadow generator does not own its light. It reads the light's kind,
//! orientation and depth range each frame, and notifies it when a setting
//! changes the shader variant of every material the light touches.

use crate::math::Vec3;
use crate::scene::CameraView;
use std::cell::Cell;

/// The kind of a light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Infinitely distant light with parallel rays (the sun).
    Directional,
    /// Omnidirectional light emitted from a point.
    Point,
    /// Cone-shaped light emitted from a point.
    Spot,
    /// Ambient sky/ground light. Never casts shadows.
    Hemispheric,
}

impl LightKind {
    /// Returns `true` if shadows for this kind are rendered into a cube map.
    #[inline]
    pub fn needs_cube(&self) -> bool {
        matches!(self, LightKind::Point)
    }
}

/// A light that can drive a shadow generator.
pub trait ShadowLight {
    /// The kind of the light. Cascaded shadows require [`LightKind::Directional`].
    fn kind(&self) -> LightKind;

    /// The light's own shadow toggle.
    fn shadow_enabled(&self) -> bool;

    /// The direction light travels, normalized.
    fn direction(&self) -> Vec3;

    /// The near depth used when sampling this light's shadows from `camera`.
    fn depth_min_z(&self, camera: &CameraView) -> f32;

    /// The far depth used when sampling this light's shadows from `camera`.
    fn depth_max_z(&self, camera: &CameraView) -> f32;

    /// Flags every material lit by this light for a shader-variant rebuild.
    fn mark_materials_dirty(&self);
}

/// A directional light source that illuminates from a uniform direction.
///
/// Directional lights simulate infinitely distant light sources like the sun.
/// The depth range defaults to the camera's near/far planes unless
/// overridden through [`DirectionalLight::with_shadow_depth_range`].
///
/// # Examples
///
/// ```
/// use penumbra_core::renderer::light::{DirectionalLight, ShadowLight};
/// use penumbra_core::math::Vec3;
///
/// let sun = DirectionalLight::new(Vec3::new(-0.5, -1.0, -0.3));
/// assert!(sun.shadow_enabled());
/// assert!((sun.direction().length() - 1.0).abs() < 1e-5);
/// ```
#[derive(Debug)]
pub struct DirectionalLight {
    direction: Cell<Vec3>,
    shadow_enabled: Cell<bool>,
    shadow_min_z: Option<f32>,
    shadow_max_z: Option<f32>,
    dirty_generation: Cell<u64>,
}

impl DirectionalLight {
    /// Creates a shadow-casting directional light travelling along `direction`.
    pub fn new(direction: Vec3) -> Self {
        Self {
            direction: Cell::new(direction.try_normalize().unwrap_or(Vec3::NEG_Y)),
            shadow_enabled: Cell::new(true),
            shadow_min_z: None,
            shadow_max_z: None,
            dirty_generation: Cell::new(0),
        }
    }

    /// Overrides the depth range reported to the lighting shader.
    pub fn with_shadow_depth_range(mut self, min_z: f32, max_z: f32) -> Self {
        self.shadow_min_z = Some(min_z);
        self.shadow_max_z = Some(max_z);
        self
    }

    /// Re-orients the light.
    pub fn set_direction(&self, direction: Vec3) {
        self.direction.set(direction.try_normalize().unwrap_or(Vec3::NEG_Y));
    }

    /// Toggles shadow casting for this light.
    pub fn set_shadow_enabled(&self, enabled: bool) {
        self.shadow_enabled.set(enabled);
    }

    /// Number of times dependent materials were marked dirty.
    pub fn dirty_generation(&self) -> u64 {
        self.dirty_generation.get()
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -1.0, -0.5))
    }
}

impl ShadowLight for DirectionalLight {
    fn kind(&self) -> LightKind {
        LightKind::Directional
    }

    fn shadow_enabled(&self) -> bool {
        self.shadow_enabled.get()
    }

    fn direction(&self) -> Vec3 {
        self.direction.get()
    }

    fn depth_min_z(&self, camera: &CameraView) -> f32 {
        self.shadow_min_z.unwrap_or(camera.near)
    }

    fn depth_max_z(&self, camera: &CameraView) -> f32 {
        self.shadow_max_z.unwrap_or(camera.far)
    }

    fn mark_materials_dirty(&self) {
        self.dirty_generation.set(self.dirty_generation.get() + 1);
    }
}
