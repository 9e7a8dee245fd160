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

//! The sequence of downsampling passes of a min/max reduction.

/// Which variant of the reduction shader a pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReductionStage {
    /// Copies the source into a two-channel `(min, max)` target at full size.
    Initial,
    /// Halves both dimensions.
    Main,
    /// Halves a target where one dimension already reached 1.
    OneBeforeLast,
    /// Produces the final 1x1 texel.
    Last,
}

impl ReductionStage {
    /// The shader define selecting this stage.
    pub fn define(&self) -> &'static str {
        match self {
            ReductionStage::Initial => "INITIAL",
            ReductionStage::Main => "MAIN",
            ReductionStage::OneBeforeLast => "ONEBEFORELAST",
            ReductionStage::Last => "LAST",
        }
    }
}

/// One immutable step of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReductionPass {
    /// Position in the chain, starting at 0.
    pub index: usize,
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
    /// Width of the texture this pass reads.
    pub input_width: u32,
    /// Height of the texture this pass reads.
    pub input_height: u32,
    /// Shader variant.
    pub stage: ReductionStage,
    /// The result of this pass is read back to the CPU.
    pub reads_back: bool,
}

#[inline]
fn halve(x: u32) -> u32 {
    // round(x / 2), never below 1
    ((x + 1) / 2).max(1)
}

/// Builds the pass chain for a `width` x `height` source.
///
/// Returns an empty chain for a zero-sized source. A 1x1 source needs a
/// single [`ReductionStage::Initial`] pass, which is then the one read back.
pub fn build_pass_chain(width: u32, height: u32) -> Vec<ReductionPass> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut passes = vec![ReductionPass {
        index: 0,
        width,
        height,
        input_width: width,
        input_height: height,
        stage: ReductionStage::Initial,
        reads_back: false,
    }];

    let (mut w, mut h) = (width, height);
    while w > 1 || h > 1 {
        let (in_w, in_h) = (w, h);
        w = halve(w);
        h = halve(h);
        let stage = if w == 1 && h == 1 {
            ReductionStage::Last
        } else if w == 1 || h == 1 {
            ReductionStage::OneBeforeLast
        } else {
            ReductionStage::Main
        };
        passes.push(ReductionPass {
            index: passes.len(),
            width: w,
            height: h,
            input_width: in_w,
            input_height: in_h,
            stage,
            reads_back: false,
        });
    }

    if let Some(last) = passes.last_mut() {
        last.reads_back = true;
    }
    passes
}
