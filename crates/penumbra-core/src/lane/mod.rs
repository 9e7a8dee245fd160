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

//! # Lane Abstraction
//!
//! A **Lane** is a swappable processing strategy. Shadow generators and the
//! min/max reducer are lanes: they carry an identity, a classification and a
//! cost estimate so a host can budget GPU work per frame before running them.

/// Classification of lane types, used for routing and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Shadow map generation
    Shadow,
    /// GPU parallel reduction (min/max, averages)
    Reduction,
}

impl std::fmt::Display for LaneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaneKind::Shadow => write!(f, "Shadow"),
            LaneKind::Reduction => write!(f, "Reduction"),
        }
    }
}

/// The common interface shared by all lanes.
pub trait Lane {
    /// Human-readable name identifying this lane's strategy.
    ///
    /// Used for logging and budgeting. Should be unique within a lane kind
    /// (e.g., `"CascadedShadowMap"`, `"MinMaxReduction"`).
    fn strategy_name(&self) -> &'static str;

    /// The kind of processing this lane performs.
    fn lane_kind(&self) -> LaneKind;

    /// Estimated computational cost of running this lane for one frame.
    ///
    /// Higher values indicate more expensive work. Default returns `1.0`.
    fn estimate_cost(&self) -> f32 {
        1.0
    }
}
