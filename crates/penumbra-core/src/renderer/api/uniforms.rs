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

//! GPU-layout uniform blocks pushed by the shadow and reduction passes.

use crate::math::{Mat4, Vec3};

/// Per-pass uniforms for a shadow depth pass.
///
/// Layout matches a WGSL struct of one `mat4x4<f32>` followed by two `vec4<f32>`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowPassUniforms {
    /// Light view-projection matrix, column-major.
    pub view_projection: [[f32; 4]; 4],
    /// `xyz`: direction the light travels. `w`: unused.
    pub light_direction: [f32; 4],
    /// `x`: bias, `y`: normal bias, `z`: ortho near, `w`: ortho far.
    pub depth_params: [f32; 4],
}

impl ShadowPassUniforms {
    /// Packs the uniforms for one depth pass.
    pub fn new(
        view_projection: Mat4,
        light_direction: Vec3,
        bias: f32,
        normal_bias: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            view_projection: view_projection.to_cols_array_2d(),
            light_direction: light_direction.extend(0.0).to_array(),
            depth_params: [bias, normal_bias, near, far],
        }
    }
}

/// Per-pass uniforms for one min/max reduction step.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ReductionUniforms {
    /// Size in texels of the texture being read.
    pub tex_size: [f32; 2],
    /// Padding to 16 bytes.
    pub _padding: [f32; 2],
}

impl ReductionUniforms {
    /// Packs the source size of a reduction step.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            tex_size: [width as f32, height as f32],
            _padding: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<ShadowPassUniforms>(), 96);
        assert_eq!(std::mem::size_of::<ReductionUniforms>(), 16);
    }

    #[test]
    fn test_shadow_pass_uniform_packing() {
        let u = ShadowPassUniforms::new(Mat4::IDENTITY, Vec3::NEG_Y, 0.01, 0.02, 1.0, 50.0);
        assert_eq!(u.view_projection[3], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(u.light_direction, [0.0, -1.0, 0.0, 0.0]);
        assert_eq!(u.depth_params, [0.01, 0.02, 1.0, 50.0]);
        assert_eq!(bytemuck::bytes_of(&u).len(), 96);
    }
}
