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

//! Cascaded shadow maps for a directional light.
//!
//! The generator owns one [`CascadeShadowRenderer`] per cascade and a
//! single caster list that every cascade draws from. Split fractions are
//! recomputed only when a split parameter changes or the host calls
//! [`CascadedShadowGenerator::split_frustum`].

use super::cascade_renderer::CascadeShadowRenderer;
use super::caster_set::{CasterTracker, ShadowCasterSet};
use super::config::CascadedShadowConfig;
use super::settings::{FilteringQuality, ShadowFilter, ShadowMapSettings};
use super::shaders::ensure_shader_registered;
use super::split_scheme::{compute_splits, CascadeSplit, SplitParams};
use crate::error::ShadowError;
use crate::reduction_lane::{MinMaxReducer, ReductionValueType};
use penumbra_core::lane::{Lane, LaneKind};
use penumbra_core::math::{saturate, Aabb, Mat4};
use penumbra_core::renderer::{
    DefineTable, GraphicsDevice, LightKind, ShaderBindingTarget, ShadowGenerator, ShadowLight,
    TextureId,
};
use penumbra_core::scene::{MeshId, Scene};
use std::cell::Ref;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Which cascades the per-cascade property accessors address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActiveCascade {
    /// Setters write every cascade; getters read cascade 0.
    #[default]
    All,
    /// A single cascade.
    Index(usize),
}

#[derive(Debug)]
struct Cascade {
    renderer: CascadeShadowRenderer,
    split: CascadeSplit,
}

/// Splits the view frustum into depth bands, each with its own shadow map.
///
/// Call [`ShadowGenerator::dispose`] before dropping it so the scene's
/// before-render hook is removed.
pub struct CascadedShadowGenerator {
    light: Rc<dyn ShadowLight>,
    device: Arc<dyn GraphicsDevice>,
    cascades: Vec<Cascade>,
    active: ActiveCascade,
    casters: CasterTracker,
    map_size: u32,
    lambda: f32,
    min_distance: f32,
    max_distance: f32,
    stabilize_cascades: bool,
    debug: bool,
    camera_range: Option<(f32, f32)>,
    light_matrix_buffer: Vec<f32>,
    cascade_depth_buffer: Vec<f32>,
    depth_reducer: Option<MinMaxReducer>,
    disposed: bool,
}

impl fmt::Debug for CascadedShadowGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CascadedShadowGenerator")
            .field("light_kind", &self.light.kind())
            .field("cascades", &self.cascades)
            .field("active", &self.active)
            .field("lambda", &self.lambda)
            .field("min_distance", &self.min_distance)
            .field("max_distance", &self.max_distance)
            .field("depth_reducer", &self.depth_reducer)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl CascadedShadowGenerator {
    /// Creates the generator and allocates every cascade's shadow map.
    ///
    /// A non-directional light or a cascade count below one is logged and
    /// coerced; construction itself never fails. Cascades whose target
    /// cannot be allocated stay unallocated and are retried on render.
    pub fn new(
        config: CascadedShadowConfig,
        light: Rc<dyn ShadowLight>,
        device: Arc<dyn GraphicsDevice>,
        scene: &mut dyn Scene,
    ) -> Self {
        if light.kind() != LightKind::Directional {
            log::error!(
                "CascadedShadowGenerator: only directional lights are supported, got {:?}",
                light.kind()
            );
        }
        let num_cascades = if config.num_cascades < 1 {
            log::warn!(
                "CascadedShadowGenerator: num_cascades must be at least 1, got {}; using 1",
                config.num_cascades
            );
            1
        } else {
            config.num_cascades
        };

        ensure_shader_registered();

        let settings = config.map_settings();
        let cascades = (0..num_cascades)
            .map(|index| {
                let mut renderer = CascadeShadowRenderer::new(index, config.map_size, settings.clone());
                if let Err(e) = renderer.ensure_shadow_map(device.as_ref()) {
                    log::error!("CascadedShadowGenerator: cascade {index} has no shadow map: {e}");
                }
                Cascade {
                    renderer,
                    split: CascadeSplit::default(),
                }
            })
            .collect();

        let casters = CasterTracker::new(scene, config.freeze_shadow_casters_bounding_info);

        let mut generator = Self {
            light,
            device,
            cascades,
            active: ActiveCascade::All,
            casters,
            map_size: config.map_size.max(1),
            lambda: 0.5,
            min_distance: 0.0,
            max_distance: 1.0,
            stabilize_cascades: config.stabilize_cascades,
            debug: config.debug,
            camera_range: None,
            light_matrix_buffer: vec![0.0; num_cascades * 16],
            cascade_depth_buffer: vec![0.0; num_cascades],
            depth_reducer: None,
            disposed: false,
        };
        generator.lambda = clamp_unit("lambda", config.lambda);
        generator.store_min_max_distance(config.min_distance, config.max_distance);
        generator.uniform_splits();
        generator.split_frustum(scene);
        generator
    }

    // --- Caster list ---

    /// Adds `mesh`, and its descendants when requested, to the caster list.
    pub fn add_shadow_caster(&mut self, scene: &dyn Scene, mesh: MeshId, include_descendants: bool) {
        self.casters.add(scene, mesh, include_descendants);
    }

    /// Removes the first entry of `mesh`, and of each descendant when
    /// requested. Returns `true` if `mesh` was in the list.
    pub fn remove_shadow_caster(&mut self, scene: &dyn Scene, mesh: MeshId, include_descendants: bool) -> bool {
        self.casters.remove(scene, mesh, include_descendants)
    }

    /// The caster list shared by all cascades.
    pub fn shadow_casters(&self) -> Ref<'_, ShadowCasterSet> {
        self.casters.casters()
    }

    /// Returns `true` if there is anything to render.
    pub fn must_render(&self) -> bool {
        !self.casters.casters().is_empty()
    }

    /// World bounds of all casters, as of the last refresh.
    pub fn shadow_casters_bounding_info(&self) -> Aabb {
        self.casters.casters().bounds()
    }

    /// Returns `true` if caster bounds are frozen.
    pub fn freeze_shadow_casters_bounding_info(&self) -> bool {
        self.casters.is_frozen()
    }

    /// Freezing captures the bounds now and stops refreshing them; unfreezing
    /// refreshes them again from the next frame on.
    pub fn set_freeze_shadow_casters_bounding_info(&mut self, scene: &mut dyn Scene, frozen: bool) {
        self.casters.set_frozen(scene, frozen);
    }

    // --- Cascade selection ---

    /// Number of cascades. Zero after [`dispose`](ShadowGenerator::dispose).
    pub fn num_cascades(&self) -> usize {
        self.cascades.len()
    }

    /// Width and height of every cascade's shadow map.
    pub fn map_size(&self) -> u32 {
        self.map_size
    }

    /// The current selection.
    pub fn active_cascade(&self) -> ActiveCascade {
        self.active
    }

    /// Selects the cascades addressed by property accessors. Indices past
    /// the last cascade select cascade 0.
    pub fn set_active_cascade(&mut self, active: ActiveCascade) {
        self.active = match active {
            ActiveCascade::Index(i) if i >= self.cascades.len() => ActiveCascade::Index(0),
            other => other,
        };
    }

    fn read_renderer(&self) -> Option<&CascadeShadowRenderer> {
        let index = match self.active {
            ActiveCascade::All => 0,
            ActiveCascade::Index(i) => i,
        };
        self.cascades.get(index).map(|c| &c.renderer)
    }

    fn read_setting<T>(&self, read: impl FnOnce(&ShadowMapSettings) -> T) -> Option<T> {
        self.read_renderer().map(|r| read(r.settings()))
    }

    fn selected_mut(&mut self) -> impl Iterator<Item = &mut CascadeShadowRenderer> {
        let len = self.cascades.len();
        let range = match self.active {
            ActiveCascade::All => 0..len,
            ActiveCascade::Index(i) => i.min(len)..(i + 1).min(len),
        };
        self.cascades[range].iter_mut().map(|c| &mut c.renderer)
    }

    /// Applies `write` to every selected cascade. Returns `true` if any
    /// cascade's settings changed.
    fn write_settings(&mut self, mut write: impl FnMut(&mut ShadowMapSettings)) -> bool {
        let mut changed = false;
        for renderer in self.selected_mut() {
            let before = renderer.settings().clone();
            write(renderer.settings_mut());
            changed |= *renderer.settings() != before;
        }
        changed
    }

    // --- Split scheme ---

    /// Split blend factor.
    pub fn lambda(&self) -> f32 {
        self.lambda
    }

    /// Sets the split blend factor, clamped to `[0, 1]`, and re-splits.
    pub fn set_lambda(&mut self, lambda: f32) {
        let lambda = clamp_unit("lambda", lambda);
        if lambda != self.lambda {
            self.lambda = lambda;
            self.resplit();
        }
    }

    /// Start of the shadowed range, as a fraction of the camera range.
    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    /// End of the shadowed range, as a fraction of the camera range.
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Sets the shadowed range and re-splits. Values are clamped to `[0, 1]`;
    /// an inverted range resets to `(0, 1)`.
    pub fn set_min_max_distance(&mut self, min: f32, max: f32) {
        let before = (self.min_distance, self.max_distance);
        self.store_min_max_distance(min, max);
        if (self.min_distance, self.max_distance) != before {
            self.resplit();
        }
    }

    fn store_min_max_distance(&mut self, min: f32, max: f32) {
        if min > max {
            log::warn!(
                "CascadedShadowGenerator: min distance {min} is greater than max distance {max}; using (0, 1)"
            );
            self.min_distance = 0.0;
            self.max_distance = 1.0;
            return;
        }
        self.min_distance = clamp_unit("min distance", min);
        self.max_distance = clamp_unit("max distance", max);
    }

    /// Recomputes the splits from the active camera's near and far planes.
    /// Without an active camera the previous splits are kept.
    pub fn split_frustum(&mut self, scene: &dyn Scene) {
        let Some(camera) = scene.active_camera() else {
            return;
        };
        self.camera_range = Some((camera.near, camera.far));
        self.resplit();
    }

    fn resplit(&mut self) {
        let Some((camera_near, camera_far)) = self.camera_range else {
            return;
        };
        let splits = compute_splits(&SplitParams {
            lambda: self.lambda,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            num_cascades: self.cascades.len(),
            camera_near,
            camera_far,
        });
        if splits.len() != self.cascades.len() {
            return;
        }
        for (cascade, split) in self.cascades.iter_mut().zip(splits) {
            cascade.split = split;
        }
    }

    /// Evenly spaced splits over the shadowed range, used until a camera is known.
    fn uniform_splits(&mut self) {
        let n = self.cascades.len() as f32;
        let (min, range) = (self.min_distance, self.max_distance - self.min_distance);
        let mut prev = min;
        for (i, cascade) in self.cascades.iter_mut().enumerate() {
            let split = min + range * (i + 1) as f32 / n;
            cascade.split = CascadeSplit { prev, split };
            prev = split;
        }
    }

    /// Returns `true` if cascades are fitted to bounding spheres and snapped to texels.
    pub fn stabilize_cascades(&self) -> bool {
        self.stabilize_cascades
    }

    /// Enables or disables cascade stabilization.
    pub fn set_stabilize_cascades(&mut self, stabilize: bool) {
        self.stabilize_cascades = stabilize;
    }

    /// Returns `true` if cascades are tinted in the lighting shader.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Toggles cascade tinting.
    pub fn set_debug(&mut self, debug: bool) {
        if debug != self.debug {
            self.debug = debug;
            self.light.mark_materials_dirty();
        }
    }

    // --- Cascade queries ---

    /// The depth band of cascade `index`.
    pub fn cascade_split(&self, index: usize) -> Option<CascadeSplit> {
        self.cascades.get(index).map(|c| c.split)
    }

    /// Light view matrix of cascade `index` from the last render.
    pub fn cascade_view_matrix(&self, index: usize) -> Option<Mat4> {
        self.cascades.get(index).map(|c| c.renderer.view_matrix())
    }

    /// Orthographic projection of cascade `index` from the last render.
    pub fn cascade_projection_matrix(&self, index: usize) -> Option<Mat4> {
        self.cascades.get(index).map(|c| c.renderer.projection_matrix())
    }

    /// World-to-map transform of cascade `index` from the last render.
    pub fn cascade_transform_matrix(&self, index: usize) -> Option<Mat4> {
        self.cascades.get(index).map(|c| c.renderer.transform_matrix())
    }

    /// The light view matrix of the active cascade.
    pub fn view_matrix(&self) -> Option<Mat4> {
        self.read_renderer().map(|r| r.view_matrix())
    }

    /// Per-cascade row-major transforms as written by the last bind.
    pub fn light_matrix_buffer(&self) -> &[f32] {
        &self.light_matrix_buffer
    }

    /// Per-cascade world-space split depths as written by the last bind.
    pub fn cascade_depth_buffer(&self) -> &[f32] {
        &self.cascade_depth_buffer
    }

    // --- Per-cascade properties ---

    /// Constant depth bias of the active cascade.
    pub fn bias(&self) -> Option<f32> {
        self.read_setting(|s| s.bias)
    }

    /// Sets the constant depth bias of the selected cascades.
    pub fn set_bias(&mut self, bias: f32) {
        self.write_settings(|s| s.bias = bias);
    }

    /// Normal bias of the active cascade.
    pub fn normal_bias(&self) -> Option<f32> {
        self.read_setting(|s| s.normal_bias)
    }

    /// Sets the normal bias of the selected cascades.
    pub fn set_normal_bias(&mut self, normal_bias: f32) {
        self.write_settings(|s| s.normal_bias = normal_bias);
    }

    /// Blur box offset of the active cascade.
    pub fn blur_box_offset(&self) -> Option<u32> {
        self.read_setting(|s| s.blur_box_offset)
    }

    /// Sets the blur box offset of the selected cascades.
    pub fn set_blur_box_offset(&mut self, offset: u32) {
        self.write_settings(|s| s.blur_box_offset = offset);
    }

    /// Blur scale of the active cascade.
    pub fn blur_scale(&self) -> Option<f32> {
        self.read_setting(|s| s.blur_scale)
    }

    /// Sets the blur scale of the selected cascades.
    pub fn set_blur_scale(&mut self, scale: f32) {
        self.write_settings(|s| s.blur_scale = scale);
    }

    /// Blur kernel size of the active cascade.
    pub fn blur_kernel(&self) -> Option<u32> {
        self.read_setting(|s| s.blur_kernel)
    }

    /// Sets the blur kernel size of the selected cascades.
    pub fn set_blur_kernel(&mut self, kernel: u32) {
        self.write_settings(|s| s.blur_kernel = kernel);
    }

    /// Whether the active cascade uses a kernel blur.
    pub fn use_kernel_blur(&self) -> Option<bool> {
        self.read_setting(|s| s.use_kernel_blur)
    }

    /// Switches the selected cascades between kernel and box blur.
    pub fn set_use_kernel_blur(&mut self, use_kernel_blur: bool) {
        self.write_settings(|s| s.use_kernel_blur = use_kernel_blur);
    }

    /// Exponential depth scale of the active cascade.
    pub fn depth_scale(&self) -> Option<f32> {
        self.read_setting(|s| s.depth_scale)
    }

    /// Sets the exponential depth scale of the selected cascades.
    pub fn set_depth_scale(&mut self, depth_scale: f32) {
        self.write_settings(|s| s.depth_scale = depth_scale);
    }

    /// Filter of the active cascade.
    pub fn filter(&self) -> Option<ShadowFilter> {
        self.read_setting(|s| s.filter)
    }

    /// Sets the filter of the selected cascades, reallocating targets whose
    /// format no longer matches.
    pub fn set_filter(&mut self, filter: ShadowFilter) {
        if !self.write_settings(|s| s.filter = filter) {
            return;
        }
        let device = Arc::clone(&self.device);
        for renderer in self.selected_mut() {
            if let Err(e) = renderer.ensure_shadow_map(device.as_ref()) {
                log::error!(
                    "CascadedShadowGenerator: cascade {} lost its shadow map on filter change: {e}",
                    renderer.index()
                );
            }
        }
        self.light.mark_materials_dirty();
    }

    /// Filtering quality of the active cascade.
    pub fn filtering_quality(&self) -> Option<FilteringQuality> {
        self.read_setting(|s| s.filtering_quality)
    }

    /// Sets the filtering quality of the selected cascades.
    pub fn set_filtering_quality(&mut self, quality: FilteringQuality) {
        if self.write_settings(|s| s.filtering_quality = quality) {
            self.light.mark_materials_dirty();
        }
    }

    /// Contact hardening light size ratio of the active cascade.
    pub fn contact_hardening_light_size_uv_ratio(&self) -> Option<f32> {
        self.read_setting(|s| s.contact_hardening_light_size_uv_ratio)
    }

    /// Sets the contact hardening light size ratio of the selected cascades.
    pub fn set_contact_hardening_light_size_uv_ratio(&mut self, ratio: f32) {
        self.write_settings(|s| s.contact_hardening_light_size_uv_ratio = ratio);
    }

    /// Darkness of the active cascade.
    pub fn darkness(&self) -> Option<f32> {
        self.read_setting(|s| s.darkness)
    }

    /// Sets the darkness of the selected cascades, clamped to `[0, 1]`.
    pub fn set_darkness(&mut self, darkness: f32) {
        let darkness = saturate(darkness);
        self.write_settings(|s| s.darkness = darkness);
    }

    /// Whether transparent meshes cast shadows in the active cascade.
    pub fn transparency_shadow(&self) -> Option<bool> {
        self.read_setting(|s| s.transparency_shadow)
    }

    /// Lets transparent meshes cast shadows in the selected cascades.
    pub fn set_transparency_shadow(&mut self, enabled: bool) {
        self.write_settings(|s| s.transparency_shadow = enabled);
    }

    /// Whether the active cascade renders back faces only.
    pub fn force_back_faces_only(&self) -> Option<bool> {
        self.read_setting(|s| s.force_back_faces_only)
    }

    /// Makes the selected cascades render back faces only.
    pub fn set_force_back_faces_only(&mut self, enabled: bool) {
        self.write_settings(|s| s.force_back_faces_only = enabled);
    }

    /// Whether the active cascade clamps depth.
    pub fn depth_clamp(&self) -> Option<bool> {
        self.read_setting(|s| s.depth_clamp)
    }

    /// Enables depth clamping in the selected cascades.
    pub fn set_depth_clamp(&mut self, enabled: bool) {
        self.write_settings(|s| s.depth_clamp = enabled);
    }

    /// Edge falloff of the active cascade.
    pub fn frustum_edge_falloff(&self) -> Option<f32> {
        self.read_setting(|s| s.frustum_edge_falloff)
    }

    /// Sets the edge falloff of the selected cascades.
    pub fn set_frustum_edge_falloff(&mut self, falloff: f32) {
        self.write_settings(|s| s.frustum_edge_falloff = falloff);
    }

    // --- Auto depth bounds ---

    /// Derives the shadowed range from `source`, a depth texture of the
    /// camera's view, through a GPU min/max reduction evaluated each render.
    pub fn enable_auto_depth_bounds(&mut self, source: TextureId, width: u32, height: u32) -> Result<(), ShadowError> {
        if self.disposed {
            return Err(ShadowError::Disposed);
        }
        if let Some(mut previous) = self.depth_reducer.take() {
            previous.dispose();
        }
        let mut reducer = MinMaxReducer::new(Arc::clone(&self.device));
        reducer.set_source_texture(source, width, height, true, ReductionValueType::Float, true)?;
        reducer.activate();
        self.depth_reducer = Some(reducer);
        Ok(())
    }

    /// Stops deriving depth bounds and resets the shadowed range to `(0, 1)`.
    pub fn disable_auto_depth_bounds(&mut self) {
        if let Some(mut reducer) = self.depth_reducer.take() {
            reducer.dispose();
            self.set_min_max_distance(0.0, 1.0);
        }
    }

    /// Returns `true` while depth bounds are derived automatically.
    pub fn auto_depth_bounds(&self) -> bool {
        self.depth_reducer.is_some()
    }

    /// How often the depth bounds are re-derived. See [`MinMaxReducer::set_refresh_rate`].
    pub fn set_auto_depth_bounds_refresh_rate(&mut self, refresh_rate: u32) {
        if let Some(reducer) = self.depth_reducer.as_mut() {
            reducer.set_refresh_rate(refresh_rate);
        }
    }

    /// Feeds a reduced `(min, max)` depth pair into the split scheme.
    ///
    /// An empty or inverted pair means nothing was drawn and resets the
    /// range to `(0, 1)`. Splits are recomputed only when the range changes.
    pub fn apply_depth_bounds(&mut self, min: f32, max: f32) {
        let (min, max) = if min >= max { (0.0, 1.0) } else { (min, max) };
        if min != self.min_distance || max != self.max_distance {
            self.set_min_max_distance(min, max);
        }
    }

    // --- Rendering ---

    /// Fits every cascade to the active camera and records their depth
    /// passes into one command buffer. Returns the number of draws.
    ///
    /// Does nothing while shadows are disabled, there is no camera, or the
    /// caster list is empty.
    pub fn render(&mut self, scene: &dyn Scene) -> usize {
        if self.cascades.is_empty() || !scene.shadows_enabled() || !self.light.shadow_enabled() {
            return 0;
        }
        let Some(camera) = scene.active_camera() else {
            log::trace!("CascadedShadowGenerator: no active camera, skipping");
            return 0;
        };

        let reduced = self.depth_reducer.as_mut().and_then(|r| r.execute());
        if let Some(bounds) = reduced {
            self.apply_depth_bounds(bounds.min, bounds.max);
        }

        let casters = self.casters.casters();
        if casters.is_empty() {
            return 0;
        }
        let caster_bounds = casters.bounds();
        let direction = self.light.direction();

        let mut encoder = self.device.create_command_encoder(Some("Cascaded Shadow Maps"));
        let mut draws = 0;
        for cascade in self.cascades.iter_mut() {
            let renderer = &mut cascade.renderer;
            if renderer.shadow_map().is_none() {
                if let Err(e) = renderer.ensure_shadow_map(self.device.as_ref()) {
                    log::trace!("CascadedShadowGenerator: cascade {} still unallocated: {e}", renderer.index());
                    continue;
                }
            }
            renderer.update_matrices(&camera, direction, cascade.split, &caster_bounds, self.stabilize_cascades);
            draws += renderer.render(scene, encoder.as_mut(), casters.as_slice(), direction);
        }
        drop(casters);

        let command_buffer = encoder.finish();
        self.device.submit_command_buffer(command_buffer);
        draws
    }

    /// Rebuilds every cascade's render target with unchanged settings.
    ///
    /// All cascades are attempted; the first failure is returned.
    pub fn recreate_shadow_maps(&mut self) -> Result<(), ShadowError> {
        if self.disposed {
            return Err(ShadowError::Disposed);
        }
        let mut first_error = None;
        for cascade in self.cascades.iter_mut() {
            if let Err(source) = cascade.renderer.recreate_shadow_map(self.device.as_ref()) {
                log::error!(
                    "CascadedShadowGenerator: failed to recreate cascade {}: {source}",
                    cascade.renderer.index()
                );
                if first_error.is_none() {
                    first_error = Some(ShadowError::ShadowMapAllocation {
                        cascade: cascade.renderer.index(),
                        source,
                    });
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Snapshot of the current configuration. Per-cascade values come from
    /// the active cascade, or the defaults once disposed.
    pub fn config(&self) -> CascadedShadowConfig {
        let settings = self
            .read_renderer()
            .map(|r| r.settings().clone())
            .unwrap_or_default();
        CascadedShadowConfig {
            num_cascades: self.cascades.len(),
            map_size: self.map_size,
            lambda: self.lambda,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            stabilize_cascades: self.stabilize_cascades,
            filter: settings.filter,
            filtering_quality: settings.filtering_quality,
            bias: settings.bias,
            normal_bias: settings.normal_bias,
            darkness: settings.darkness,
            frustum_edge_falloff: settings.frustum_edge_falloff,
            debug: self.debug,
            depth_clamp: settings.depth_clamp,
            freeze_shadow_casters_bounding_info: self.casters.is_frozen(),
        }
    }

    fn shadows_active(&self, scene: &dyn Scene) -> bool {
        scene.shadows_enabled() && self.light.shadow_enabled() && !self.cascades.is_empty()
    }
}

fn clamp_unit(what: &str, value: f32) -> f32 {
    let clamped = saturate(value);
    if clamped != value {
        log::warn!("CascadedShadowGenerator: {what} {value} is outside [0, 1]; using {clamped}");
    }
    clamped
}

impl ShadowGenerator for CascadedShadowGenerator {
    fn is_ready(&self, drawable: MeshId, use_instances: bool) -> bool {
        self.cascades
            .iter()
            .all(|c| c.renderer.is_ready(self.device.as_ref(), drawable, use_instances))
    }

    fn prepare_shader_defines(&self, scene: &dyn Scene, defines: &mut DefineTable, light_index: usize) {
        if !self.shadows_active(scene) {
            return;
        }
        self.cascades[0]
            .renderer
            .prepare_defines(defines, light_index, self.light.kind());
        defines.set_bool(format!("SHADOWCSM{light_index}"), true);
        defines.set_int(
            format!("SHADOWCSM{light_index}_NUMCASCADES"),
            self.cascades.len() as i32,
        );
        defines.set_bool(format!("SHADOWCSM{light_index}_DEBUG"), self.debug);
    }

    fn bind_to_shader(&mut self, scene: &dyn Scene, light_index: usize, target: &mut dyn ShaderBindingTarget) {
        if !self.shadows_active(scene) {
            return;
        }
        let Some(camera) = scene.active_camera() else {
            return;
        };
        if self.cascades.iter().any(|c| c.renderer.shadow_map().is_none()) {
            return;
        }
        let first = &self.cascades[0].renderer;
        let pcf = first.settings().filter == ShadowFilter::Pcf;
        let shadows_info = first.shadows_info();

        let n = self.cascades.len();
        self.light_matrix_buffer.resize(n * 16, 0.0);
        self.cascade_depth_buffer.resize(n, 0.0);
        let camera_range = camera.far - camera.near;
        let mut textures = Vec::with_capacity(n);

        for (i, cascade) in self.cascades.iter().enumerate() {
            self.light_matrix_buffer[i * 16..(i + 1) * 16]
                .copy_from_slice(&cascade.renderer.transform_matrix_rows());
            if let Some(texture) = cascade.renderer.shadow_map() {
                if pcf {
                    target.set_depth_stencil_texture(&format!("shadowSampler{light_index}_{i}"), texture);
                } else {
                    textures.push(texture);
                }
            }
            self.cascade_depth_buffer[i] = camera.near + cascade.split.split * camera_range;
        }

        if !self.light.kind().needs_cube() {
            target.set_matrices(&format!("lightMatrix{light_index}"), &self.light_matrix_buffer);
        }
        target.set_int(&format!("numCascades{light_index}"), n as i32);
        if !pcf {
            target.set_texture_array(&format!("shadowSampler{light_index}"), &textures);
        }
        target.set_float_array(&format!("cascadeSplits{light_index}"), &self.cascade_depth_buffer);

        let label = light_index.to_string();
        target.update_float4("shadowsInfo", shadows_info, &label);
        let min_z = self.light.depth_min_z(&camera);
        let max_z = self.light.depth_max_z(&camera);
        target.update_float2("depthValues", [min_z, min_z + max_z], &label);
    }

    fn shadow_map_textures(&self) -> Vec<TextureId> {
        self.cascades
            .iter()
            .filter_map(|c| c.renderer.shadow_map())
            .collect()
    }

    fn dispose(&mut self, scene: &mut dyn Scene) {
        for cascade in self.cascades.iter_mut() {
            cascade.renderer.release(self.device.as_ref());
        }
        self.cascades.clear();
        self.active = ActiveCascade::All;
        self.casters.detach(scene);
        self.casters.casters_mut().clear();
        if let Some(mut reducer) = self.depth_reducer.take() {
            reducer.dispose();
        }
        self.light_matrix_buffer.clear();
        self.cascade_depth_buffer.clear();
        if !self.disposed {
            log::debug!("CascadedShadowGenerator: disposed");
        }
        self.disposed = true;
    }
}

impl Lane for CascadedShadowGenerator {
    fn strategy_name(&self) -> &'static str {
        "CascadedShadowMap"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Shadow
    }

    fn estimate_cost(&self) -> f32 {
        (self.cascades.len() as f32) * (self.casters.casters().len() as f32) * 0.001
    }
}
