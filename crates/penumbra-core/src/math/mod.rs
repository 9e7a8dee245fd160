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

//! Provides the mathematics primitives used by the shadow lanes.
//!
//! Linear algebra comes from `glam` and is re-exported here so downstream crates
//! depend on a single path. The module adds the bounding-volume type and a few
//! scalar helpers on top.

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub mod geometry;

pub use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

pub use self::geometry::Aabb;

/// Clamps a value to the `[0.0, 1.0]` range.
///
/// # Examples
///
/// ```
/// use penumbra_core::math::saturate;
/// assert_eq!(saturate(1.5), 1.0);
/// assert_eq!(saturate(-0.5), 0.0);
/// ```
#[inline]
pub fn saturate(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Checks if two floating-point numbers are approximately equal within [`EPSILON`].
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Snaps `value` down to the nearest multiple of `step`.
///
/// A non-positive `step` returns `value` untouched.
#[inline]
pub fn snap_down(value: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    (value / step).floor() * step
}
