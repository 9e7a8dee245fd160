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

//! Errors returned by host-invoked lane operations.
//!
//! Per-frame entry points never return these; they log and skip instead.

use penumbra_core::renderer::ResourceError;
use thiserror::Error;

/// Errors raised while (re)building shadow map resources.
#[derive(Debug, Error)]
pub enum ShadowError {
    /// A cascade's render target could not be created.
    #[error("failed to allocate the shadow map of cascade {cascade}: {source}")]
    ShadowMapAllocation {
        /// Index of the cascade whose target failed.
        cascade: usize,
        /// The device error.
        #[source]
        source: ResourceError,
    },
    /// The generator has been disposed and owns no cascades anymore.
    #[error("the shadow generator has been disposed")]
    Disposed,
    /// The auto depth-bounds reducer could not be set up.
    #[error("depth bounds reduction setup failed: {0}")]
    DepthReduction(#[from] ReductionError),
}

/// Errors raised while configuring a min/max reduction.
#[derive(Debug, Error)]
pub enum ReductionError {
    /// The source texture has a zero dimension.
    #[error("reduction source must be at least 1x1, got {width}x{height}")]
    EmptySource {
        /// Source width in texels.
        width: u32,
        /// Source height in texels.
        height: u32,
    },
    /// A pass target could not be created.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}
