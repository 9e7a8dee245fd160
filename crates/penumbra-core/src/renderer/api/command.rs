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

//! Defines data structures used for recording and describing GPU commands.

use super::TextureId;

/// An opaque handle to a recorded command buffer that is ready for submission.
///
/// This ID is returned by [`CommandEncoder::finish`] and consumed by
/// [`GraphicsDevice::submit_command_buffer`].
///
/// [`CommandEncoder::finish`]: crate::renderer::traits::CommandEncoder::finish
/// [`GraphicsDevice::submit_command_buffer`]: crate::renderer::traits::GraphicsDevice::submit_command_buffer
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CommandBufferId(pub u64);

/// Describes the attachments of a single render pass.
#[derive(Debug, Clone, Default)]
pub struct RenderPassDescriptor<'a> {
    /// A debug label for the pass.
    pub label: Option<&'a str>,
    /// The color attachment, if any.
    pub color_target: Option<TextureId>,
    /// The depth attachment, if any.
    pub depth_target: Option<TextureId>,
    /// Clear value for the color attachment. `None` loads existing contents.
    pub clear_color: Option<[f32; 4]>,
    /// Clear value for the depth attachment. `None` loads existing contents.
    pub clear_depth: Option<f32>,
    /// Ignore any viewport the target carries and cover it entirely.
    pub force_full_viewport: bool,
}

/// Which triangle faces are discarded during rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling.
    None,
    /// Front faces are culled; only back faces reach the depth buffer.
    Front,
    /// Back faces are culled.
    #[default]
    Back,
}

/// Fixed-function state for a depth-only pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthState {
    /// Constant depth bias applied to every fragment.
    pub bias: f32,
    /// Offset along the surface normal, scaled by the texel size.
    pub normal_bias: f32,
    /// Clamp fragments outside the near/far planes instead of clipping them.
    pub depth_clamp: bool,
    /// Face culling mode.
    pub cull_mode: CullMode,
}
