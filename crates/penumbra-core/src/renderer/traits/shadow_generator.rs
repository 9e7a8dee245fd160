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

use crate::renderer::api::{DefineTable, TextureId};
use crate::renderer::traits::ShaderBindingTarget;
use crate::scene::{MeshId, Scene};

/// The capability a lighting system consumes from any shadow technique.
///
/// Single-map and cascaded generators both implement this trait so the
/// material pipeline can treat them uniformly, typically as
/// `Box<dyn ShadowGenerator>` attached to a light.
///
/// None of the per-frame methods return errors. A generator that cannot
/// contribute this frame (shadows disabled, no camera, target not allocated)
/// does nothing and the draw simply receives no shadowing.
pub trait ShadowGenerator {
    /// Returns `true` when every shader variant needed to draw `drawable`
    /// into this generator's shadow map(s) is compiled.
    fn is_ready(&self, drawable: MeshId, use_instances: bool) -> bool;

    /// Injects the defines the lighting shader needs for light `light_index`.
    fn prepare_shader_defines(&self, scene: &dyn Scene, defines: &mut DefineTable, light_index: usize);

    /// Binds matrices, samplers and packed uniforms for light `light_index`.
    fn bind_to_shader(
        &mut self,
        scene: &dyn Scene,
        light_index: usize,
        target: &mut dyn ShaderBindingTarget,
    );

    /// Returns the allocated shadow map targets in cascade order.
    fn shadow_map_textures(&self) -> Vec<TextureId>;

    /// Releases GPU resources and detaches from the scene. Terminal.
    ///
    /// Dropping a generator without calling this leaves an inert
    /// before-render hook registered with the scene.
    fn dispose(&mut self, scene: &mut dyn Scene);
}
