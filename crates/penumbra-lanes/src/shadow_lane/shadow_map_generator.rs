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

//! A single shadow map spanning the whole camera frustum.

use super::cascade_renderer::CascadeShadowRenderer;
use super::caster_set::{CasterTracker, ShadowCasterSet};
use super::settings::{ShadowFilter, ShadowMapSettings};
use super::shaders::ensure_shader_registered;
use super::split_scheme::CascadeSplit;
use crate::error::ShadowError;
use penumbra_core::lane::{Lane, LaneKind};
use penumbra_core::math::{Aabb, Mat4};
use penumbra_core::renderer::{
    DefineTable, GraphicsDevice, ShaderBindingTarget, ShadowGenerator, ShadowLight, TextureId,
};
use penumbra_core::scene::{MeshId, Scene};
use std::cell::Ref;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// One shadow map for one light, fitted to the full view frustum.
///
/// Like the cascaded generator, it must be disposed to unregister its hook.
pub struct ShadowMapGenerator {
    light: Rc<dyn ShadowLight>,
    device: Arc<dyn GraphicsDevice>,
    renderer: Option<CascadeShadowRenderer>,
    casters: CasterTracker,
}

impl fmt::Debug for ShadowMapGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowMapGenerator")
            .field("light_kind", &self.light.kind())
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl ShadowMapGenerator {
    /// Creates the generator and allocates its shadow map. An allocation
    /// failure is logged and retried on render.
    pub fn new(
        map_size: u32,
        settings: ShadowMapSettings,
        light: Rc<dyn ShadowLight>,
        device: Arc<dyn GraphicsDevice>,
        scene: &mut dyn Scene,
    ) -> Self {
        ensure_shader_registered();
        let mut renderer = CascadeShadowRenderer::new(0, map_size, settings);
        if let Err(e) = renderer.ensure_shadow_map(device.as_ref()) {
            log::error!("ShadowMapGenerator: shadow map allocation failed: {e}");
        }
        Self {
            light,
            device,
            renderer: Some(renderer),
            casters: CasterTracker::new(scene, false),
        }
    }

    /// Adds `mesh`, and its descendants when requested, to the caster list.
    pub fn add_shadow_caster(&mut self, scene: &dyn Scene, mesh: MeshId, include_descendants: bool) {
        self.casters.add(scene, mesh, include_descendants);
    }

    /// Removes the first entry of `mesh`, and of each descendant when requested.
    pub fn remove_shadow_caster(&mut self, scene: &dyn Scene, mesh: MeshId, include_descendants: bool) -> bool {
        self.casters.remove(scene, mesh, include_descendants)
    }

    /// The caster list.
    pub fn shadow_casters(&self) -> Ref<'_, ShadowCasterSet> {
        self.casters.casters()
    }

    /// Returns `true` if there is anything to render.
    pub fn must_render(&self) -> bool {
        !self.casters.casters().is_empty()
    }

    /// World bounds of all casters, as of the last frame.
    pub fn shadow_casters_bounding_info(&self) -> Aabb {
        self.casters.casters().bounds()
    }

    /// Current settings. `None` once disposed.
    pub fn settings(&self) -> Option<&ShadowMapSettings> {
        self.renderer.as_ref().map(|r| r.settings())
    }

    /// Replaces the settings, reallocating the target if the filter now needs
    /// a different format.
    pub fn set_settings(&mut self, settings: ShadowMapSettings) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let variant_changed = renderer.settings().filter != settings.filter
            || renderer.settings().filtering_quality != settings.filtering_quality;
        *renderer.settings_mut() = settings;
        if let Err(e) = renderer.ensure_shadow_map(self.device.as_ref()) {
            log::error!("ShadowMapGenerator: shadow map reallocation failed: {e}");
        }
        if variant_changed {
            self.light.mark_materials_dirty();
        }
    }

    /// World-to-map transform from the last render.
    pub fn transform_matrix(&self) -> Option<Mat4> {
        self.renderer.as_ref().map(|r| r.transform_matrix())
    }

    /// Fits the map to the active camera and records its depth pass.
    /// Returns the number of draws.
    pub fn render(&mut self, scene: &dyn Scene) -> usize {
        if !scene.shadows_enabled() || !self.light.shadow_enabled() {
            return 0;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return 0;
        };
        let Some(camera) = scene.active_camera() else {
            return 0;
        };
        let casters = self.casters.casters();
        if casters.is_empty() {
            return 0;
        }
        if renderer.shadow_map().is_none() {
            if let Err(e) = renderer.ensure_shadow_map(self.device.as_ref()) {
                log::trace!("ShadowMapGenerator: shadow map still unallocated: {e}");
                return 0;
            }
        }

        let direction = self.light.direction();
        renderer.update_matrices(&camera, direction, CascadeSplit::FULL, &casters.bounds(), false);

        let mut encoder = self.device.create_command_encoder(Some("Shadow Map"));
        let draws = renderer.render(scene, encoder.as_mut(), casters.as_slice(), direction);
        self.device.submit_command_buffer(encoder.finish());
        draws
    }

    /// Rebuilds the render target with unchanged settings.
    pub fn recreate_shadow_map(&mut self) -> Result<(), ShadowError> {
        let renderer = self.renderer.as_mut().ok_or(ShadowError::Disposed)?;
        renderer
            .recreate_shadow_map(self.device.as_ref())
            .map(|_| ())
            .map_err(|source| ShadowError::ShadowMapAllocation { cascade: 0, source })
    }
}

impl ShadowGenerator for ShadowMapGenerator {
    fn is_ready(&self, drawable: MeshId, use_instances: bool) -> bool {
        self.renderer
            .as_ref()
            .is_some_and(|r| r.is_ready(self.device.as_ref(), drawable, use_instances))
    }

    fn prepare_shader_defines(&self, scene: &dyn Scene, defines: &mut DefineTable, light_index: usize) {
        if !scene.shadows_enabled() || !self.light.shadow_enabled() {
            return;
        }
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.prepare_defines(defines, light_index, self.light.kind());
        }
    }

    fn bind_to_shader(&mut self, scene: &dyn Scene, light_index: usize, target: &mut dyn ShaderBindingTarget) {
        if !scene.shadows_enabled() || !self.light.shadow_enabled() {
            return;
        }
        let Some(camera) = scene.active_camera() else {
            return;
        };
        let Some(renderer) = self.renderer.as_ref() else {
            return;
        };
        let Some(texture) = renderer.shadow_map() else {
            return;
        };

        if !self.light.kind().needs_cube() {
            target.set_matrices(&format!("lightMatrix{light_index}"), &renderer.transform_matrix_rows());
        }
        let sampler = format!("shadowSampler{light_index}");
        match renderer.settings().filter {
            ShadowFilter::Pcf => target.set_depth_stencil_texture(&sampler, texture),
            ShadowFilter::Pcss => {
                target.set_depth_stencil_texture(&sampler, texture);
                target.set_texture(&format!("depthSampler{light_index}"), texture);
            }
            _ => target.set_texture(&sampler, texture),
        }

        let label = light_index.to_string();
        target.update_float4("shadowsInfo", renderer.shadows_info(), &label);
        let min_z = self.light.depth_min_z(&camera);
        let max_z = self.light.depth_max_z(&camera);
        target.update_float2("depthValues", [min_z, min_z + max_z], &label);
    }

    fn shadow_map_textures(&self) -> Vec<TextureId> {
        self.renderer
            .as_ref()
            .and_then(|r| r.shadow_map())
            .into_iter()
            .collect()
    }

    fn dispose(&mut self, scene: &mut dyn Scene) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.release(self.device.as_ref());
        }
        self.casters.detach(scene);
        self.casters.casters_mut().clear();
    }
}

impl Lane for ShadowMapGenerator {
    fn strategy_name(&self) -> &'static str {
        "ShadowMap"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Shadow
    }

    fn estimate_cost(&self) -> f32 {
        self.casters.casters().len() as f32 * 0.001
    }
}
