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

//! GPU min/max reduction of a texture down to a single texel.
//!
//! Every execution records the whole pass chain into one command buffer,
//! submits it, then reads the final 1x1 target back. The readback stalls
//! until the GPU catches up; it moves four floats.

use super::pass_chain::{build_pass_chain, ReductionPass, ReductionStage};
use super::shaders::{ensure_shader_registered, MIN_MAX_REDUCTION_EFFECT};
use crate::error::ReductionError;
use penumbra_core::lane::{Lane, LaneKind};
use penumbra_core::renderer::{
    DefineTable, GraphicsDevice, ReductionUniforms, RenderPassDescriptor, TextureDescriptor,
    TextureFormat, TextureId,
};
use std::fmt;
use std::sync::Arc;

/// The result of one reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    /// Smallest value of the source.
    pub min: f32,
    /// Largest value of the source.
    pub max: f32,
}

/// Precision of the intermediate targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReductionValueType {
    /// 32-bit float channels.
    #[default]
    Float,
    /// 16-bit float channels.
    HalfFloat,
}

impl ReductionValueType {
    /// The two-channel format holding `(min, max)`.
    pub fn format(&self) -> TextureFormat {
        match self {
            ReductionValueType::Float => TextureFormat::Rg32Float,
            ReductionValueType::HalfFloat => TextureFormat::Rg16Float,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ReductionSource {
    texture: TextureId,
    width: u32,
    height: u32,
    is_depth: bool,
    force_full_viewport: bool,
}

type Observer = Box<dyn FnMut(MinMax)>;

/// Drives the reduction chain for one source texture.
pub struct MinMaxReducer {
    device: Arc<dyn GraphicsDevice>,
    source: Option<ReductionSource>,
    passes: Vec<ReductionPass>,
    targets: Vec<TextureId>,
    active: bool,
    refresh_rate: u32,
    frame_counter: u32,
    ran_once: bool,
    last_result: Option<MinMax>,
    observers: Vec<Observer>,
}

impl fmt::Debug for MinMaxReducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinMaxReducer")
            .field("source", &self.source)
            .field("passes", &self.passes.len())
            .field("active", &self.active)
            .field("refresh_rate", &self.refresh_rate)
            .field("last_result", &self.last_result)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl MinMaxReducer {
    /// Creates an inactive reducer with no source, refreshing every frame.
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        ensure_shader_registered();
        Self {
            device,
            source: None,
            passes: Vec::new(),
            targets: Vec::new(),
            active: false,
            refresh_rate: 1,
            frame_counter: 0,
            ran_once: false,
            last_result: None,
            observers: Vec::new(),
        }
    }

    /// Points the reducer at a new source and rebuilds the pass chain and
    /// its intermediate targets.
    ///
    /// On failure the reducer is left without a source.
    pub fn set_source_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        is_depth: bool,
        value_type: ReductionValueType,
        force_full_viewport: bool,
    ) -> Result<(), ReductionError> {
        self.release_targets();
        self.source = None;
        self.passes.clear();

        if width == 0 || height == 0 {
            return Err(ReductionError::EmptySource { width, height });
        }

        let passes = build_pass_chain(width, height);
        let format = value_type.format();
        let mut targets = Vec::with_capacity(passes.len());
        for pass in &passes {
            let descriptor = TextureDescriptor {
                label: Some(format!("Reduction Target {}", pass.index).into()),
                width: pass.width,
                height: pass.height,
                format,
            };
            match self.device.create_texture(&descriptor) {
                Ok(id) => targets.push(id),
                Err(e) => {
                    for id in targets {
                        if let Err(e) = self.device.destroy_texture(id) {
                            log::warn!("MinMaxReducer: failed to destroy partial target {id:?}: {e}");
                        }
                    }
                    return Err(e.into());
                }
            }
        }

        log::debug!(
            "MinMaxReducer: {}x{} source {:?} reduced in {} passes",
            width,
            height,
            texture,
            passes.len()
        );
        self.source = Some(ReductionSource {
            texture,
            width,
            height,
            is_depth,
            force_full_viewport,
        });
        self.passes = passes;
        self.targets = targets;
        Ok(())
    }

    fn release_targets(&mut self) {
        for id in self.targets.drain(..) {
            if let Err(e) = self.device.destroy_texture(id) {
                log::warn!("MinMaxReducer: failed to destroy reduction target {id:?}: {e}");
            }
        }
    }

    /// Starts reducing on [`execute`](Self::execute) calls and restarts the
    /// refresh cadence.
    pub fn activate(&mut self) {
        if self.source.is_none() {
            log::warn!("MinMaxReducer: activated without a source texture");
        }
        self.active = true;
        self.frame_counter = 0;
        self.ran_once = false;
    }

    /// Stops reducing. The last result stays available.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Returns `true` between [`activate`](Self::activate) and [`deactivate`](Self::deactivate).
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `0` reduces once per activation, `N` every `N` executions.
    pub fn refresh_rate(&self) -> u32 {
        self.refresh_rate
    }

    /// See [`refresh_rate`](Self::refresh_rate).
    pub fn set_refresh_rate(&mut self, refresh_rate: u32) {
        self.refresh_rate = refresh_rate;
    }

    /// Registers a callback fired with every completed reduction.
    pub fn add_observer(&mut self, observer: impl FnMut(MinMax) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// The current pass chain, empty without a source.
    pub fn passes(&self) -> &[ReductionPass] {
        &self.passes
    }

    /// The most recent result.
    pub fn last_result(&self) -> Option<MinMax> {
        self.last_result
    }

    fn should_run(&mut self) -> bool {
        let run = if self.refresh_rate == 0 {
            !self.ran_once
        } else {
            self.frame_counter % self.refresh_rate == 0
        };
        self.frame_counter = self.frame_counter.wrapping_add(1);
        run
    }

    /// Runs the chain if active and due this frame, returning the fresh
    /// result. Observers are notified before returning.
    pub fn execute(&mut self) -> Option<MinMax> {
        if !self.active {
            return None;
        }
        let source = self.source?;
        if self.passes.is_empty() || self.targets.len() != self.passes.len() {
            return None;
        }
        if !self.should_run() {
            return None;
        }
        self.ran_once = true;

        let mut encoder = self.device.create_command_encoder(Some("MinMaxReducer"));
        for pass in &self.passes {
            let input = if pass.index == 0 {
                source.texture
            } else {
                self.targets[pass.index - 1]
            };

            let mut defines = DefineTable::new();
            defines.set_bool(pass.stage.define(), true);
            if pass.stage == ReductionStage::Initial && source.is_depth {
                defines.set_bool("DEPTH_REDUX", true);
            }
            let uniforms = ReductionUniforms::new(pass.input_width, pass.input_height);

            let label = format!("Reduction phase {}", pass.index);
            let descriptor = RenderPassDescriptor {
                label: Some(label.as_str()),
                color_target: Some(self.targets[pass.index]),
                force_full_viewport: source.force_full_viewport,
                ..Default::default()
            };
            let mut render_pass = encoder.begin_render_pass(&descriptor);
            render_pass.set_shader(MIN_MAX_REDUCTION_EFFECT, &defines);
            render_pass.set_texture("sourceTexture", input);
            render_pass.set_uniforms(bytemuck::bytes_of(&uniforms));
            render_pass.draw_fullscreen();
        }
        let command_buffer = encoder.finish();
        self.device.submit_command_buffer(command_buffer);

        let last = *self.targets.last()?;
        let texels = match self.device.read_texture_f32(last, 1, 1) {
            Ok(texels) => texels,
            Err(e) => {
                log::warn!("MinMaxReducer: readback of the final reduction target failed: {e}");
                return None;
            }
        };
        let &[min, max, ..] = texels.as_slice() else {
            log::warn!("MinMaxReducer: readback returned {} values", texels.len());
            return None;
        };

        let result = MinMax { min, max };
        log::trace!("MinMaxReducer: reduced to {result:?}");
        self.last_result = Some(result);
        for observer in self.observers.iter_mut() {
            observer(result);
        }
        Some(result)
    }

    /// Releases every target and forgets the source and observers.
    pub fn dispose(&mut self) {
        self.active = false;
        self.release_targets();
        self.passes.clear();
        self.source = None;
        self.observers.clear();
    }
}

impl Lane for MinMaxReducer {
    fn strategy_name(&self) -> &'static str {
        "MinMaxReduction"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Reduction
    }

    fn estimate_cost(&self) -> f32 {
        match self.source {
            Some(s) => (s.width as f32 * s.height as f32) * 1e-6 + self.passes.len() as f32 * 0.01,
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_formats() {
        assert_eq!(ReductionValueType::Float.format(), TextureFormat::Rg32Float);
        assert_eq!(ReductionValueType::HalfFloat.format(), TextureFormat::Rg16Float);
        assert_eq!(ReductionValueType::default(), ReductionValueType::Float);
    }
}
