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

//! Shadow map generation strategies.
//!
//! [`CascadedShadowGenerator`] splits the camera frustum into depth bands
//! and drives one [`CascadeShadowRenderer`] per band. [`ShadowMapGenerator`]
//! drives a single renderer over the whole frustum. Both implement
//! [`ShadowGenerator`](penumbra_core::renderer::ShadowGenerator).

mod cascade_renderer;
mod cascaded_generator;
mod caster_set;
mod config;
mod settings;
mod shadow_map_generator;
mod split_scheme;
pub mod shaders;

pub use self::cascade_renderer::*;
pub use self::cascaded_generator::*;
pub use self::caster_set::ShadowCasterSet;
pub use self::config::*;
pub use self::settings::*;
pub use self::shadow_map_generator::*;
pub use self::split_scheme::*;
