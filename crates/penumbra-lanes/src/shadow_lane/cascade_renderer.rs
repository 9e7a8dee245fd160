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

//! A single shadow map covering one depth band of the camera frustum.
//!
//! The renderer owns its render target and filtering settings. It does not
//! own the caster list; the orchestrating generator lends it a slice of
//! handles each frame so every cascade sees the same list.

use super::settings::{FilteringQuality, ShadowFilter, ShadowMapSettings};
use super::shaders::SHADOW_MAP_EFFECT;
use super::split_scheme::CascadeSplit;
use ahash::AHashSet;
use penumbra_core::math::{snap_down, Aabb, Mat4, Vec2, Vec3, EPSILON};
use penumbra_core::renderer::{
    CommandEncoder, CullMode, DefineTable, DepthState, EffectKey, GraphicsDevice, LightKind,
    RenderPassDescriptor, ResourceError, ShadowPassUniforms, TextureDescriptor, TextureFormat,
    TextureId,
};
use penumbra_core::scene::{CameraView, MeshId, Scene};

/// Renders casters into one shadow map for one depth band.
#[derive(Debug)]
pub struct CascadeShadowRenderer {
    index: usize,
    map_size: u32,
    settings: ShadowMapSettings,
    shadow_map: Option<(TextureId, TextureFormat)>,
    view: Mat4,
    projection: Mat4,
    depth_range: (f32, f32),
    light_space_box: Aabb,
}

impl CascadeShadowRenderer {
    /// Creates a renderer without allocating its target.
    pub fn new(index: usize, map_size: u32, settings: ShadowMapSettings) -> Self {
        Self {
            index,
            map_size: map_size.max(1),
            settings,
            shadow_map: None,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            depth_range: (0.0, 1.0),
            light_space_box: Aabb::INVALID,
        }
    }

    /// The cascade index, used in labels and shader names.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Width and height of the shadow map, in texels.
    pub fn map_size(&self) -> u32 {
        self.map_size
    }

    /// Current settings.
    pub fn settings(&self) -> &ShadowMapSettings {
        &self.settings
    }

    /// Mutable settings. A filter change takes effect on the target at the
    /// next [`ensure_shadow_map`](Self::ensure_shadow_map).
    pub fn settings_mut(&mut self) -> &mut ShadowMapSettings {
        &mut self.settings
    }

    /// The allocated render target, if any.
    pub fn shadow_map(&self) -> Option<TextureId> {
        self.shadow_map.map(|(id, _)| id)
    }

    /// Allocates the render target, or reallocates it when the filter now
    /// needs a different format. Returns the current target.
    pub fn ensure_shadow_map(&mut self, device: &dyn GraphicsDevice) -> Result<TextureId, ResourceError> {
        let format = self.settings.filter.map_format();
        if let Some((id, current)) = self.shadow_map {
            if current == format {
                return Ok(id);
            }
        }
        self.release(device);
        let descriptor = TextureDescriptor::square(
            format!("Cascade Shadow Map {}", self.index),
            self.map_size,
            format,
        );
        let id = device.create_texture(&descriptor)?;
        log::debug!(
            "CascadeShadowRenderer: cascade {} allocated {}x{} {:?} target {:?}",
            self.index,
            self.map_size,
            self.map_size,
            format,
            id
        );
        self.shadow_map = Some((id, format));
        Ok(id)
    }

    /// Destroys and rebuilds the render target with unchanged settings.
    pub fn recreate_shadow_map(&mut self, device: &dyn GraphicsDevice) -> Result<TextureId, ResourceError> {
        self.release(device);
        self.ensure_shadow_map(device)
    }

    /// Destroys the render target. Failures are logged.
    pub fn release(&mut self, device: &dyn GraphicsDevice) {
        if let Some((id, _)) = self.shadow_map.take() {
            if let Err(e) = device.destroy_texture(id) {
                log::warn!(
                    "CascadeShadowRenderer: failed to destroy shadow map of cascade {}: {e}",
                    self.index
                );
            }
        }
    }

    /// Fits the light view and orthographic projection to the camera slab
    /// `slab`, tightened to the caster bounds.
    ///
    /// The light view is anchored at the world origin so light-space
    /// coordinates do not move with the camera.
    pub fn update_matrices(
        &mut self,
        camera: &CameraView,
        light_direction: Vec3,
        slab: CascadeSplit,
        casters: &Aabb,
        stabilize: bool,
    ) {
        let (near, far) = slab.to_depths(camera.near, camera.far);
        let corners = camera.slice_corners(near, far);

        let direction = light_direction.try_normalize().unwrap_or(Vec3::NEG_Y);
        let up = if direction.dot(Vec3::Y).abs() > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_to_rh(Vec3::ZERO, direction, up);

        let slice = corners
            .iter()
            .fold(Aabb::INVALID, |acc, c| acc.merged_with_point(view.transform_point3(*c)));
        let casters_ls = casters.transform(&view);

        let (min, max) = if stabilize {
            let center = corners.iter().copied().sum::<Vec3>() / 8.0;
            let radius = corners
                .iter()
                .map(|c| c.distance(center))
                .fold(0.0_f32, f32::max);
            let radius = (radius * 16.0).ceil() / 16.0;
            let c = view.transform_point3(center).truncate();
            // One texel of margin so snapping the origin never uncovers the sphere.
            let n = self.map_size.max(2) as f32;
            let extent = 2.0 * radius * n / (n - 1.0);
            let texel = extent / n;
            let min = Vec2::new(snap_down(c.x - radius, texel), snap_down(c.y - radius, texel));
            (min, min + Vec2::splat(extent))
        } else {
            let mut lo = slice.min.truncate();
            let mut hi = slice.max.truncate();
            if casters_ls.is_valid() {
                let clipped_lo = lo.max(casters_ls.min.truncate());
                let clipped_hi = hi.min(casters_ls.max.truncate());
                if clipped_lo.cmplt(clipped_hi).all() {
                    lo = clipped_lo;
                    hi = clipped_hi;
                }
            }
            (lo, hi)
        };

        // Casters between the light and the slab must land in the map unless
        // the depth pass clamps them onto the near plane.
        let mut z_top = slice.max.z;
        if !self.settings.depth_clamp && casters_ls.is_valid() {
            z_top = z_top.max(casters_ls.max.z);
        }
        let z_bottom = slice.min.z;
        let near_plane = -z_top;
        let far_plane = (-z_bottom).max(near_plane + EPSILON);

        self.view = view;
        self.projection = Mat4::orthographic_rh(min.x, max.x, min.y, max.y, near_plane, far_plane);
        self.depth_range = (near_plane, far_plane);
        self.light_space_box = Aabb {
            min: Vec3::new(min.x, min.y, z_bottom),
            max: Vec3::new(max.x, max.y, f32::INFINITY),
        };
    }

    /// The light view matrix from the last fit.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// The orthographic projection from the last fit.
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// `projection * view`, mapping world space to the map's clip space.
    pub fn transform_matrix(&self) -> Mat4 {
        self.projection * self.view
    }

    /// [`transform_matrix`](Self::transform_matrix) flattened row by row.
    pub fn transform_matrix_rows(&self) -> [f32; 16] {
        self.transform_matrix().transpose().to_cols_array()
    }

    /// Ortho near and far planes from the last fit.
    pub fn depth_range(&self) -> (f32, f32) {
        self.depth_range
    }

    /// Returns `true` if a caster with these world bounds can touch the map.
    pub fn is_caster_visible(&self, world_bounds: &Aabb) -> bool {
        world_bounds
            .transform(&self.view)
            .intersects_aabb(&self.light_space_box)
    }

    /// Fixed-function state of the depth pass.
    pub fn depth_state(&self) -> DepthState {
        DepthState {
            bias: self.settings.bias,
            normal_bias: self.settings.normal_bias,
            depth_clamp: self.settings.depth_clamp,
            cull_mode: if self.settings.force_back_faces_only {
                CullMode::Front
            } else {
                CullMode::Back
            },
        }
    }

    /// Defines selecting the depth-pass variant.
    pub fn depth_defines(&self, use_instances: bool) -> DefineTable {
        let mut defines = DefineTable::new();
        if self.settings.filter.uses_depth_texture() {
            defines.set_bool("SM_DEPTHTEXTURE", true);
        }
        if self.settings.filter.is_exponential() {
            defines.set_bool("SM_ESM", true);
        }
        if self.settings.depth_clamp {
            defines.set_bool("SM_DEPTHCLAMP", true);
        }
        if self.settings.normal_bias != 0.0 {
            defines.set_bool("SM_NORMALBIAS", true);
        }
        if use_instances {
            defines.set_bool("INSTANCES", true);
        }
        defines
    }

    /// Returns `true` once the target exists and the depth variant for
    /// `drawable` is compiled.
    pub fn is_ready(&self, device: &dyn GraphicsDevice, drawable: MeshId, use_instances: bool) -> bool {
        if self.shadow_map.is_none() {
            return false;
        }
        device.is_effect_ready(&EffectKey {
            effect: SHADOW_MAP_EFFECT,
            drawable,
            defines: self.depth_defines(use_instances),
        })
    }

    /// Writes the lighting-shader defines for this map's filter.
    pub fn prepare_defines(&self, defines: &mut DefineTable, light_index: usize, light_kind: LightKind) {
        defines.set_bool(format!("SHADOW{light_index}"), true);

        let filtered_quality = match self.settings.filter {
            ShadowFilter::Pcf => {
                defines.set_bool(format!("SHADOWPCF{light_index}"), true);
                true
            }
            ShadowFilter::Pcss => {
                defines.set_bool(format!("SHADOWPCSS{light_index}"), true);
                true
            }
            ShadowFilter::Poisson => {
                defines.set_bool(format!("SHADOWPOISSON{light_index}"), true);
                false
            }
            ShadowFilter::Exponential | ShadowFilter::BlurExponential => {
                defines.set_bool(format!("SHADOWESM{light_index}"), true);
                false
            }
            ShadowFilter::CloseExponential | ShadowFilter::BlurCloseExponential => {
                defines.set_bool(format!("SHADOWCLOSEESM{light_index}"), true);
                false
            }
            ShadowFilter::None => false,
        };

        if filtered_quality {
            match self.settings.filtering_quality {
                FilteringQuality::Low => {
                    defines.set_bool(format!("SHADOWLOWQUALITY{light_index}"), true)
                }
                FilteringQuality::Medium => {
                    defines.set_bool(format!("SHADOWMEDIUMQUALITY{light_index}"), true)
                }
                FilteringQuality::High => {}
            }
        }

        if light_kind.needs_cube() {
            defines.set_bool(format!("SHADOWCUBE{light_index}"), true);
        }
    }

    /// The packed `shadowsInfo` vector for this map's filter:
    ///
    /// - PCF: `(darkness, size, 1 / size, edge falloff)`
    /// - PCSS: `(darkness, 1 / size, light size ratio * size, edge falloff)`
    /// - others: `(darkness, blur scale / size, depth scale, edge falloff)`
    pub fn shadows_info(&self) -> [f32; 4] {
        let s = &self.settings;
        let size = self.map_size as f32;
        match s.filter {
            ShadowFilter::Pcf => [s.darkness, size, 1.0 / size, s.frustum_edge_falloff],
            ShadowFilter::Pcss => [
                s.darkness,
                1.0 / size,
                s.contact_hardening_light_size_uv_ratio * size,
                s.frustum_edge_falloff,
            ],
            _ => [s.darkness, s.blur_scale / size, s.depth_scale, s.frustum_edge_falloff],
        }
    }

    /// Records the depth pass for `casters`. Returns the number of draws.
    ///
    /// Unresolvable, culled and (unless enabled) transparent casters are
    /// skipped, and duplicates are drawn once.
    pub fn render(
        &self,
        scene: &dyn Scene,
        encoder: &mut dyn CommandEncoder,
        casters: &[MeshId],
        light_direction: Vec3,
    ) -> usize {
        let Some((map, format)) = self.shadow_map else {
            return 0;
        };
        let is_depth = format.is_depth();
        let label = format!("Cascade Shadow Pass {}", self.index);
        let descriptor = RenderPassDescriptor {
            label: Some(label.as_str()),
            color_target: (!is_depth).then_some(map),
            depth_target: is_depth.then_some(map),
            clear_color: (!is_depth).then_some([1.0; 4]),
            clear_depth: is_depth.then_some(1.0),
            force_full_viewport: false,
        };

        let uniforms = ShadowPassUniforms::new(
            self.transform_matrix(),
            light_direction,
            self.settings.bias,
            self.settings.normal_bias,
            self.depth_range.0,
            self.depth_range.1,
        );

        let mut pass = encoder.begin_render_pass(&descriptor);
        pass.set_shader(SHADOW_MAP_EFFECT, &self.depth_defines(false));
        pass.set_depth_state(&self.depth_state());
        pass.set_uniforms(bytemuck::bytes_of(&uniforms));

        let mut drawn = AHashSet::with_capacity(casters.len());
        for &mesh in casters {
            if !self.settings.transparency_shadow && scene.is_transparent(mesh) {
                continue;
            }
            let Some(bounds) = scene.world_bounds(mesh) else {
                continue;
            };
            if !self.is_caster_visible(&bounds) || !drawn.insert(mesh) {
                continue;
            }
            pass.draw_mesh(mesh);
        }
        drawn.len()
    }
}
