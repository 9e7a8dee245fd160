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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::renderer::api::TextureId;
use std::fmt;

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// The referenced texture does not exist on the device.
    NotFound {
        /// The ID of the texture that was not found.
        id: TextureId,
    },
    /// The device could not allocate the requested resource.
    OutOfMemory,
    /// The descriptor describes a resource the device cannot create
    /// (zero-sized, unsupported format, ...).
    InvalidDescriptor(String),
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound { id } => write!(f, "Resource not found with ID: {id:?}"),
            ResourceError::OutOfMemory => write!(f, "Out of GPU memory."),
            ResourceError::InvalidDescriptor(msg) => {
                write!(f, "Invalid resource descriptor: {msg}")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// A high-level error that can occur within the rendering system.
#[derive(Debug)]
pub enum RenderError {
    /// A failure related to a specific GPU resource.
    ResourceError(ResourceError),
    /// The graphics device was lost; every render target must be recreated.
    DeviceLost,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ResourceError(err) => write!(f, "Render resource error: {err}"),
            RenderError::DeviceLost => write!(f, "Graphics device lost"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            RenderError::DeviceLost => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_resource_error_display() {
        let err = ResourceError::NotFound { id: TextureId(7) };
        assert_eq!(err.to_string(), "Resource not found with ID: TextureId(7)");
        assert_eq!(
            ResourceError::InvalidDescriptor("zero-sized texture".into()).to_string(),
            "Invalid resource descriptor: zero-sized texture"
        );
    }

    #[test]
    fn test_render_error_source_chain() {
        let err: RenderError = ResourceError::OutOfMemory.into();
        assert_eq!(err.to_string(), "Render resource error: Out of GPU memory.");
        assert!(err.source().is_some());
        assert!(RenderError::DeviceLost.source().is_none());
    }
}
