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

//! Filtering modes and per-map settings of a shadow renderer.

use penumbra_core::renderer::TextureFormat;
use serde::{Deserialize, Serialize};

/// How a shadow map is filtered when sampled by the lighting shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShadowFilter {
    /// Single hard-edged depth comparison.
    None,
    /// Exponential shadow map.
    Exponential,
    /// Poisson-disk sampling.
    Poisson,
    /// Exponential shadow map with a blur pass.
    BlurExponential,
    /// Close exponential shadow map (reduces light bleeding near casters).
    CloseExponential,
    /// Close exponential shadow map with a blur pass.
    BlurCloseExponential,
    /// Hardware percentage-closer filtering through depth-compare samplers.
    #[default]
    Pcf,
    /// Percentage-closer soft shadows (contact hardening).
    Pcss,
}

impl ShadowFilter {
    /// Returns `true` if the map is a depth texture sampled with comparison.
    #[inline]
    pub fn uses_depth_texture(&self) -> bool {
        matches!(self, ShadowFilter::Pcf | ShadowFilter::Pcss)
    }

    /// Returns `true` for the exponential family.
    #[inline]
    pub fn is_exponential(&self) -> bool {
        matches!(
            self,
            ShadowFilter::Exponential
                | ShadowFilter::BlurExponential
                | ShadowFilter::CloseExponential
                | ShadowFilter::BlurCloseExponential
        )
    }

    /// The render target format this filter samples from.
    #[inline]
    pub fn map_format(&self) -> TextureFormat {
        if self.uses_depth_texture() {
            TextureFormat::Depth32Float
        } else {
            TextureFormat::R32Float
        }
    }
}

/// Sample count used by PCF and PCSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilteringQuality {
    /// Fewest taps.
    Low,
    /// Balanced.
    Medium,
    /// Most taps.
    #[default]
    High,
}

/// Per-map settings of a [`CascadeShadowRenderer`](super::CascadeShadowRenderer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowMapSettings {
    /// Constant depth bias.
    pub bias: f32,
    /// Offset along the surface normal.
    pub normal_bias: f32,
    /// Box blur offset, in texels.
    pub blur_box_offset: u32,
    /// Downscale factor of the blur target.
    pub blur_scale: f32,
    /// Kernel size of the gaussian blur.
    pub blur_kernel: u32,
    /// Use a gaussian kernel blur instead of a box blur.
    pub use_kernel_blur: bool,
    /// Depth scale of exponential maps.
    pub depth_scale: f32,
    /// Filtering mode.
    pub filter: ShadowFilter,
    /// PCF/PCSS quality.
    pub filtering_quality: FilteringQuality,
    /// Light size relative to the map, for contact hardening.
    pub contact_hardening_light_size_uv_ratio: f32,
    /// Shadow darkness, `0.0` is fully dark and `1.0` is no shadow.
    pub darkness: f32,
    /// Let transparent meshes cast shadows.
    pub transparency_shadow: bool,
    /// Render back faces only, reducing acne on closed meshes.
    pub force_back_faces_only: bool,
    /// Clamp casters outside the ortho near plane instead of widening it.
    pub depth_clamp: bool,
    /// Fraction of the map over which shadows fade out at its edges.
    pub frustum_edge_falloff: f32,
}

impl Default for ShadowMapSettings {
    fn default() -> Self {
        Self {
            bias: 0.00005,
            normal_bias: 0.0,
            blur_box_offset: 1,
            blur_scale: 2.0,
            blur_kernel: 1,
            use_kernel_blur: false,
            depth_scale: 50.0,
            filter: ShadowFilter::Pcf,
            filtering_quality: FilteringQuality::High,
            contact_hardening_light_size_uv_ratio: 0.1,
            darkness: 0.0,
            transparency_shadow: false,
            force_back_faces_only: false,
            depth_clamp: true,
            frustum_edge_falloff: 0.0,
        }
    }
}
