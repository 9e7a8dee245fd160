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

use crate::renderer::api::TextureId;

/// The uniform/sampler setters of a bound shader effect.
///
/// A material system hands one of these to every shadow generator affecting
/// the draw. Names follow the lighting shader's conventions
/// (`lightMatrix0`, `shadowSampler0`, ...).
pub trait ShaderBindingTarget {
    /// Uploads an array of 4x4 matrices, 16 floats per matrix.
    fn set_matrices(&mut self, name: &str, matrices: &[f32]);

    /// Uploads a single integer.
    fn set_int(&mut self, name: &str, value: i32);

    /// Uploads an array of floats.
    fn set_float_array(&mut self, name: &str, values: &[f32]);

    /// Binds a texture to a regular sampler.
    fn set_texture(&mut self, name: &str, texture: TextureId);

    /// Binds a depth texture to a depth-compare sampler.
    fn set_depth_stencil_texture(&mut self, name: &str, texture: TextureId);

    /// Binds an ordered list of textures to a texture-array sampler.
    fn set_texture_array(&mut self, name: &str, textures: &[TextureId]);

    /// Writes a vec4 member of the uniform block owned by the light `light_index`.
    fn update_float4(&mut self, name: &str, value: [f32; 4], light_index: &str);

    /// Writes a vec2 member of the uniform block owned by the light `light_index`.
    fn update_float2(&mut self, name: &str, value: [f32; 2], light_index: &str);
}
