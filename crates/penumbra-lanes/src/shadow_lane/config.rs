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

//! Construction-time configuration of a cascaded shadow generator.

use super::settings::{FilteringQuality, ShadowFilter, ShadowMapSettings};
use serde::{Deserialize, Serialize};

/// Configuration of a [`CascadedShadowGenerator`](super::CascadedShadowGenerator).
///
/// Missing fields fall back to their defaults when deserializing, so a
/// config file only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadedShadowConfig {
    /// Number of cascades. Values below one are coerced to one.
    pub num_cascades: usize,
    /// Width and height of every cascade's shadow map.
    pub map_size: u32,
    /// Blend between logarithmic (`1.0`) and uniform (`0.0`) split placement.
    pub lambda: f32,
    /// Start of the shadowed range, as a fraction of the camera range.
    pub min_distance: f32,
    /// End of the shadowed range, as a fraction of the camera range.
    pub max_distance: f32,
    /// Fit cascades to bounding spheres and snap them to texels.
    pub stabilize_cascades: bool,
    /// Filtering mode of every cascade.
    pub filter: ShadowFilter,
    /// PCF/PCSS quality of every cascade.
    pub filtering_quality: FilteringQuality,
    /// Constant depth bias.
    pub bias: f32,
    /// Offset along the surface normal.
    pub normal_bias: f32,
    /// Shadow darkness, `0.0` is fully dark.
    pub darkness: f32,
    /// Fraction of each map over which shadows fade at its edges.
    pub frustum_edge_falloff: f32,
    /// Tint each cascade in the lighting shader.
    pub debug: bool,
    /// Clamp casters outside a cascade's near plane.
    pub depth_clamp: bool,
    /// Capture caster bounds once instead of every frame.
    pub freeze_shadow_casters_bounding_info: bool,
}

impl Default for CascadedShadowConfig {
    fn default() -> Self {
        Self {
            num_cascades: 4,
            map_size: 1024,
            lambda: 0.5,
            min_distance: 0.0,
            max_distance: 1.0,
            stabilize_cascades: false,
            filter: ShadowFilter::Pcf,
            filtering_quality: FilteringQuality::High,
            bias: 0.00005,
            normal_bias: 0.0,
            darkness: 0.0,
            frustum_edge_falloff: 0.0,
            debug: false,
            depth_clamp: true,
            freeze_shadow_casters_bounding_info: false,
        }
    }
}

impl CascadedShadowConfig {
    /// Sets the number of cascades.
    pub fn with_num_cascades(mut self, num_cascades: usize) -> Self {
        self.num_cascades = num_cascades;
        self
    }

    /// Sets the shadow map resolution.
    pub fn with_map_size(mut self, map_size: u32) -> Self {
        self.map_size = map_size;
        self
    }

    /// Sets the split blend factor.
    pub fn with_lambda(mut self, lambda: f32) -> Self {
        self.lambda = lambda;
        self
    }

    /// Sets the shadowed range as fractions of the camera range.
    pub fn with_distances(mut self, min_distance: f32, max_distance: f32) -> Self {
        self.min_distance = min_distance;
        self.max_distance = max_distance;
        self
    }

    /// Enables or disables cascade stabilization.
    pub fn with_stabilize_cascades(mut self, stabilize: bool) -> Self {
        self.stabilize_cascades = stabilize;
        self
    }

    /// Sets the filter mode.
    pub fn with_filter(mut self, filter: ShadowFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the PCF/PCSS quality.
    pub fn with_filtering_quality(mut self, quality: FilteringQuality) -> Self {
        self.filtering_quality = quality;
        self
    }

    /// Sets the constant and normal biases.
    pub fn with_bias(mut self, bias: f32, normal_bias: f32) -> Self {
        self.bias = bias;
        self.normal_bias = normal_bias;
        self
    }

    /// Sets the shadow darkness.
    pub fn with_darkness(mut self, darkness: f32) -> Self {
        self.darkness = darkness;
        self
    }

    /// Sets the edge falloff.
    pub fn with_frustum_edge_falloff(mut self, falloff: f32) -> Self {
        self.frustum_edge_falloff = falloff;
        self
    }

    /// Enables cascade tinting.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enables or disables depth clamping.
    pub fn with_depth_clamp(mut self, depth_clamp: bool) -> Self {
        self.depth_clamp = depth_clamp;
        self
    }

    /// Freezes caster bounds from construction on.
    pub fn with_frozen_bounds(mut self, frozen: bool) -> Self {
        self.freeze_shadow_casters_bounding_info = frozen;
        self
    }

    /// The per-cascade settings this config starts every cascade with.
    pub fn map_settings(&self) -> ShadowMapSettings {
        ShadowMapSettings {
            bias: self.bias,
            normal_bias: self.normal_bias,
            filter: self.filter,
            filtering_quality: self.filtering_quality,
            darkness: self.darkness,
            frustum_edge_falloff: self.frustum_edge_falloff,
            depth_clamp: self.depth_clamp,
            ..ShadowMapSettings::default()
        }
    }
}
