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

//! Cascade split placement.
//!
//! Splits blend a logarithmic progression (dense near the camera) with a
//! uniform one. `lambda = 1` is purely logarithmic, `lambda = 0` purely
//! uniform. Results are fractions of the camera's near/far range so they
//! survive camera changes until the next recomputation.

use penumbra_core::math::EPSILON;

/// Inputs of the split computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitParams {
    /// Blend between logarithmic (`1.0`) and uniform (`0.0`) placement.
    pub lambda: f32,
    /// Start of the shadowed range, as a fraction of the camera range.
    pub min_distance: f32,
    /// End of the shadowed range, as a fraction of the camera range.
    pub max_distance: f32,
    /// Number of cascades. Values below one produce no splits.
    pub num_cascades: usize,
    /// Camera near plane distance.
    pub camera_near: f32,
    /// Camera far plane distance.
    pub camera_far: f32,
}

/// The depth band covered by one cascade, as fractions of the camera range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CascadeSplit {
    /// Where the cascade starts. Equals the previous cascade's `split`.
    pub prev: f32,
    /// Where the cascade ends.
    pub split: f32,
}

impl CascadeSplit {
    /// The full camera range, used by single-map generators.
    pub const FULL: Self = Self {
        prev: 0.0,
        split: 1.0,
    };

    /// Converts both fractions to view-space distances for a camera.
    #[inline]
    pub fn to_depths(&self, camera_near: f32, camera_far: f32) -> (f32, f32) {
        let range = camera_far - camera_near;
        (camera_near + self.prev * range, camera_near + self.split * range)
    }
}

/// Computes the per-cascade split fractions.
///
/// Returns an empty vector when the camera range is empty or inverted, so
/// callers keep their previous splits.
///
/// When the start of the shadowed range sits at depth zero the logarithmic
/// term degenerates; placement then falls back to uniform spacing.
pub fn compute_splits(params: &SplitParams) -> Vec<CascadeSplit> {
    let camera_range = params.camera_far - params.camera_near;
    if params.num_cascades == 0 || camera_range <= EPSILON {
        return Vec::new();
    }

    let min_z = params.camera_near + params.min_distance * camera_range;
    let max_z = params.camera_near + params.max_distance * camera_range;
    let range = max_z - min_z;
    let log_usable = min_z > EPSILON;
    let ratio = if log_usable { max_z / min_z } else { 1.0 };

    let mut splits = Vec::with_capacity(params.num_cascades);
    let mut prev = params.min_distance;
    for i in 0..params.num_cascades {
        let p = (i + 1) as f32 / params.num_cascades as f32;
        let uniform_split = min_z + range * p;
        let d = if log_usable {
            let log_split = min_z * ratio.powf(p);
            params.lambda * (log_split - uniform_split) + uniform_split
        } else {
            uniform_split
        };
        let split = (d - params.camera_near) / camera_range;
        splits.push(CascadeSplit { prev, split });
        prev = split;
    }
    splits
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(lambda: f32) -> SplitParams {
        SplitParams {
            lambda,
            min_distance: 0.0,
            max_distance: 1.0,
            num_cascades: 4,
            camera_near: 1.0,
            camera_far: 101.0,
        }
    }

    #[test]
    fn test_uniform_splits_are_exact() {
        let splits = compute_splits(&params(0.0));
        assert_eq!(splits.len(), 4);
        assert_eq!(splits[0].split, 0.25);
        assert_eq!(splits[1].split, 0.5);
        assert_eq!(splits[2].split, 0.75);
        assert_eq!(splits[3].split, 1.0);
        let (_, depth) = splits[2].to_depths(1.0, 101.0);
        assert_eq!(depth, 76.0);
    }

    #[test]
    fn test_logarithmic_splits() {
        let splits = compute_splits(&params(1.0));
        for (i, s) in splits.iter().enumerate() {
            let p = (i + 1) as f32 / 4.0;
            let expected = (101.0_f32.powf(p) - 1.0) / 100.0;
            assert_relative_eq!(s.split, expected, epsilon = 1e-5);
        }
        assert_relative_eq!(splits[3].split, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_prev_chains_and_starts_at_min_distance() {
        let p = SplitParams {
            lambda: 0.7,
            min_distance: 0.1,
            max_distance: 0.6,
            num_cascades: 5,
            camera_near: 0.5,
            camera_far: 300.0,
        };
        let splits = compute_splits(&p);
        assert_eq!(splits[0].prev, 0.1);
        for w in splits.windows(2) {
            assert_eq!(w[1].prev, w[0].split);
            assert!(w[1].split >= w[0].split);
        }
        for s in &splits {
            assert!(s.split >= 0.1 - 1e-5 && s.split <= 0.6 + 1e-5);
        }
    }

    #[test]
    fn test_monotonic_over_parameter_sweep() {
        for lambda in [0.0, 0.25, 0.5, 0.75, 1.0] {
            for &(near, far) in &[(0.1, 10.0), (1.0, 1000.0), (5.0, 6.0)] {
                for n in 1..=6 {
                    let p = SplitParams {
                        lambda,
                        min_distance: 0.05,
                        max_distance: 0.9,
                        num_cascades: n,
                        camera_near: near,
                        camera_far: far,
                    };
                    let splits = compute_splits(&p);
                    assert_eq!(splits.len(), n);
                    let mut last = p.min_distance;
                    for s in splits {
                        assert!(s.split + 1e-5 >= last);
                        assert!(s.split <= p.max_distance + 1e-4);
                        last = s.split;
                    }
                }
            }
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        let mut p = params(0.5);
        p.num_cascades = 0;
        assert!(compute_splits(&p).is_empty());

        let mut p = params(0.5);
        p.camera_far = p.camera_near;
        assert!(compute_splits(&p).is_empty());
    }

    #[test]
    fn test_zero_start_depth_falls_back_to_uniform() {
        let p = SplitParams {
            lambda: 1.0,
            min_distance: 0.0,
            max_distance: 1.0,
            num_cascades: 2,
            camera_near: 0.0,
            camera_far: 10.0,
        };
        let splits = compute_splits(&p);
        assert_eq!(splits[0].split, 0.5);
        assert_eq!(splits[1].split, 1.0);
    }
}
