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

//! Built-in shader for the min/max reduction passes.

use once_cell::sync::OnceCell;
use penumbra_core::renderer::shader_registry;

/// Registry name of the reduction effect.
pub const MIN_MAX_REDUCTION_EFFECT: &str = "minmaxRedux";

/// Fullscreen reduction. Every output texel holds `(min, max)` of a 2x2
/// block of the input, with edge texels clamped for odd sizes.
pub const MIN_MAX_REDUCTION_WGSL: &str = r#"
struct Reduction {
    tex_size: vec2<f32>,
    _padding: vec2<f32>,
};

@group(0) @binding(0) var<uniform> params: Reduction;
@group(0) @binding(1) var sourceTexture: texture_2d<f32>;

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    return vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
}

fn fetch(coord: vec2<i32>) -> vec2<f32> {
    let size = vec2<i32>(params.tex_size);
    let c = clamp(coord, vec2<i32>(0), size - vec2<i32>(1));
    let texel = textureLoad(sourceTexture, c, 0);
#ifdef INITIAL
#ifdef DEPTH_REDUX
    let value = texel.r;
    if (value >= 1.0) {
        return vec2<f32>(1.0, 0.0);
    }
    return vec2<f32>(value, value);
#else
    return vec2<f32>(texel.r, texel.r);
#endif
#else
    return texel.rg;
#endif
}

@fragment
fn fs_main(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
#ifdef INITIAL
    let v = fetch(vec2<i32>(frag.xy));
    return vec4<f32>(v, 0.0, 1.0);
#else
    let base = vec2<i32>(frag.xy) * 2;
    let a = fetch(base);
    let b = fetch(base + vec2<i32>(1, 0));
    let c = fetch(base + vec2<i32>(0, 1));
    let d = fetch(base + vec2<i32>(1, 1));
    let lo = min(min(a.x, b.x), min(c.x, d.x));
    let hi = max(max(a.y, b.y), max(c.y, d.y));
    return vec4<f32>(lo, hi, 0.0, 1.0);
#endif
}
"#;

static REGISTERED: OnceCell<()> = OnceCell::new();

/// Registers the reduction effect once per process.
pub fn ensure_shader_registered() {
    REGISTERED.get_or_init(|| {
        shader_registry::register_shader(MIN_MAX_REDUCTION_EFFECT, MIN_MAX_REDUCTION_WGSL);
    });
}
