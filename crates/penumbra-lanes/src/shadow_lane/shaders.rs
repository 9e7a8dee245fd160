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

//! Built-in shader for the shadow depth pass.

use once_cell::sync::OnceCell;
use penumbra_core::renderer::shader_registry;

/// Registry name of the shadow depth effect.
pub const SHADOW_MAP_EFFECT: &str = "shadowMap";

/// Depth-only pass writing either hardware depth or an exponential moment.
pub const SHADOW_MAP_WGSL: &str = r#"
struct ShadowPass {
    view_projection: mat4x4<f32>,
    light_direction: vec4<f32>,
    depth_params: vec4<f32>,
};

@group(0) @binding(0) var<uniform> pass_data: ShadowPass;

struct Model {
    world: mat4x4<f32>,
};

@group(1) @binding(0) var<uniform> model: Model;

struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) depth: f32,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> VertexOutput {
    var world = model.world * vec4<f32>(position, 1.0);
#ifdef SM_NORMALBIAS
    let n = normalize((model.world * vec4<f32>(normal, 0.0)).xyz);
    let cos_angle = clamp(dot(n, -pass_data.light_direction.xyz), 0.0, 1.0);
    let sin_angle = sqrt(1.0 - cos_angle * cos_angle);
    world = vec4<f32>(world.xyz - n * pass_data.depth_params.y * sin_angle, 1.0);
#endif
    var out: VertexOutput;
    out.clip = pass_data.view_projection * world;
#ifdef SM_DEPTHCLAMP
    out.depth = out.clip.z;
    out.clip.z = max(out.clip.z, 0.0);
#else
    out.depth = out.clip.z;
#endif
    out.clip.z = out.clip.z + pass_data.depth_params.x * out.clip.w;
    return out;
}

#ifdef SM_DEPTHTEXTURE
@fragment
fn fs_main(in: VertexOutput) -> @builtin(frag_depth) f32 {
    return clamp(in.depth + pass_data.depth_params.x, 0.0, 1.0);
}
#else
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let depth = clamp(in.depth + pass_data.depth_params.x, 0.0, 1.0);
#ifdef SM_ESM
    return vec4<f32>(depth, 0.0, 0.0, 1.0);
#else
    return vec4<f32>(depth, depth, depth, 1.0);
#endif
}
#endif
"#;

static REGISTERED: OnceCell<()> = OnceCell::new();

/// Registers the depth effect in the process-wide registry. Idempotent.
pub fn ensure_shader_registered() {
    REGISTERED.get_or_init(|| {
        shader_registry::register_shader(SHADOW_MAP_EFFECT, SHADOW_MAP_WGSL);
    });
}
