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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::CommandEncoder;
use std::fmt::Debug;

/// The subset of a graphics device the shadow and reduction lanes drive.
///
/// Backends implement this over their native API. Lanes hold it as
/// `Arc<dyn GraphicsDevice>` and only ever see opaque handles.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a 2D render target.
    /// ## Arguments
    /// * `descriptor` - Size, format and label of the texture.
    /// ## Returns
    /// A `Result` containing the ID of the created texture.
    /// ## Errors
    /// * `ResourceError` - If the texture creation fails.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys the texture associated with the given ID.
    /// ## Arguments
    /// * `id` - The ID of the texture to be destroyed.
    /// ## Errors
    /// * `ResourceError` - If the texture does not exist or cannot be released.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Creates a new command encoder to record GPU commands.
    /// ## Arguments
    /// * `label` - An optional debug label for the command encoder.
    fn create_command_encoder(&self, label: Option<&str>) -> Box<dyn CommandEncoder>;

    /// Submits a recorded command buffer to the device's queue for execution.
    fn submit_command_buffer(&self, command_buffer: CommandBufferId);

    /// Reads back the texels of a texture as `f32` values, four channels per texel.
    ///
    /// This blocks until all submitted work touching the texture has completed.
    /// ## Arguments
    /// * `id` - The texture to read.
    /// * `width`, `height` - The region to read, starting at the origin.
    /// ## Errors
    /// * `ResourceError` - If the texture does not exist or cannot be mapped.
    fn read_texture_f32(
        &self,
        id: TextureId,
        width: u32,
        height: u32,
    ) -> Result<Vec<f32>, ResourceError>;

    /// Returns `true` once the shader variant identified by `key` is compiled and usable.
    ///
    /// Backends typically start compiling a variant on the first query and
    /// report `false` until it is ready.
    fn is_effect_ready(&self, key: &EffectKey) -> bool;
}
