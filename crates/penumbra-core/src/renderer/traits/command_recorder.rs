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

use crate::renderer::api::{CommandBufferId, DefineTable, DepthState, RenderPassDescriptor, TextureId};
use crate::scene::MeshId;

/// A trait representing an active render pass, used for recording drawing commands.
///
/// The `'pass` lifetime ensures that the pass object cannot outlive the
/// [`CommandEncoder`] that created it.
pub trait RenderPass<'pass> {
    /// Selects the shader variant used by subsequent draws.
    fn set_shader(&mut self, effect: &str, defines: &DefineTable);

    /// Sets the fixed-function depth state for subsequent draws.
    fn set_depth_state(&mut self, state: &DepthState);

    /// Uploads the pass uniform block. `data` is a `bytemuck`-cast struct.
    fn set_uniforms(&mut self, data: &[u8]);

    /// Binds a texture to a named sampler slot.
    fn set_texture(&mut self, name: &str, texture: TextureId);

    /// Records a draw of every submesh of `mesh`.
    fn draw_mesh(&mut self, mesh: MeshId);

    /// Records a full-screen triangle draw.
    fn draw_fullscreen(&mut self);
}

/// A trait for an object that records a sequence of GPU commands.
pub trait CommandEncoder {
    /// Begins a new render pass, returning a mutable `RenderPass` object.
    ///
    /// The returned `RenderPass` object borrows the encoder mutably, so only one
    /// pass can be active at a time. When the `RenderPass` object is dropped,
    /// the pass is ended.
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &RenderPassDescriptor<'encoder>,
    ) -> Box<dyn RenderPass<'encoder> + 'encoder>;

    /// Finalizes the command recording and returns a handle to the resulting command buffer.
    fn finish(self: Box<Self>) -> CommandBufferId;
}
