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

//! Traits at the seams between the shadow lanes and their host renderer.

mod command_recorder;
mod graphics_device;
mod shader_binding;
mod shadow_generator;

pub use self::command_recorder::*;
pub use self::graphics_device::*;
pub use self::shader_binding::*;
pub use self::shadow_generator::*;
