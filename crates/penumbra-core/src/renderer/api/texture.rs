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

//! Defines data structures related to GPU texture resources.

use std::borrow::Cow;

/// An opaque handle to a GPU texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// The memory layout of a texture's texels.
///
/// Only the formats the shadow and reduction lanes render into are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 32-bit float depth, usable with depth-compare samplers.
    Depth32Float,
    /// Single-channel 32-bit float color.
    R32Float,
    /// Two-channel 16-bit float color.
    Rg16Float,
    /// Two-channel 32-bit float color.
    Rg32Float,
    /// Four-channel 16-bit float color.
    Rgba16Float,
}

impl TextureFormat {
    /// Returns `true` if the format is a depth format.
    #[inline]
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth32Float)
    }

    /// Returns the number of color channels a readback yields per texel.
    #[inline]
    pub fn channel_count(&self) -> usize {
        match self {
            TextureFormat::Depth32Float | TextureFormat::R32Float => 1,
            TextureFormat::Rg16Float | TextureFormat::Rg32Float => 2,
            TextureFormat::Rgba16Float => 4,
        }
    }
}

/// A descriptor used to create a 2D render target.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label for the texture.
    pub label: Option<Cow<'a, str>>,
    /// Width in texels. Must be non-zero.
    pub width: u32,
    /// Height in texels. Must be non-zero.
    pub height: u32,
    /// The format of the texture's texels.
    pub format: TextureFormat,
}

impl<'a> TextureDescriptor<'a> {
    /// Creates a descriptor for a square render target.
    pub fn square(label: impl Into<Cow<'a, str>>, size: u32, format: TextureFormat) -> Self {
        Self {
            label: Some(label.into()),
            width: size,
            height: size,
            format,
        }
    }
}
