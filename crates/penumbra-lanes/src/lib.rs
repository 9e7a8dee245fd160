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

//! # Penumbra Lanes
//!
//! Hot-path execution strategies built on the contracts of `penumbra-core`.
//!
//! - [`shadow_lane`]: cascaded and single-map shadow generators.
//! - [`reduction_lane`]: the GPU min/max reduction used to derive cascade
//!   depth bounds from the scene's depth buffer.

pub mod error;
pub mod reduction_lane;
pub mod shadow_lane;

pub use error::{ReductionError, ShadowError};
pub use reduction_lane::{MinMax, MinMaxReducer, ReductionValueType};
pub use shadow_lane::{
    ActiveCascade, CascadeShadowRenderer, CascadedShadowConfig, CascadedShadowGenerator,
    FilteringQuality, ShadowFilter, ShadowMapGenerator, ShadowMapSettings,
};
