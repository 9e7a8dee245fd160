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

//! Shared mocks for the lane integration tests.

#![allow(dead_code)]

use penumbra_core::math::{Aabb, Vec3};
use penumbra_core::renderer::{
    CommandBufferId, CommandEncoder, DefineTable, DepthState, EffectKey, GraphicsDevice,
    LightKind, RenderPass, RenderPassDescriptor, ResourceError, ShaderBindingTarget, ShadowLight,
    TextureDescriptor, TextureFormat, TextureId,
};
use penumbra_core::scene::{BeforeRenderHook, CameraView, HookId, MeshId, Scene};
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ─────────────────────────────────────────────────────────────────────────────
// Graphics device
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PassCommand {
    SetShader(String, DefineTable),
    SetDepthState(DepthState),
    SetUniforms(Vec<u8>),
    SetTexture(String, TextureId),
    DrawMesh(MeshId),
    DrawFullscreen,
}

#[derive(Debug, Clone, Default)]
pub struct RecordedPass {
    pub label: String,
    pub color_target: Option<TextureId>,
    pub depth_target: Option<TextureId>,
    pub force_full_viewport: bool,
    pub commands: Vec<PassCommand>,
}

impl RecordedPass {
    pub fn draws(&self) -> Vec<MeshId> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                PassCommand::DrawMesh(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    pub fn shader(&self) -> Option<(&str, &DefineTable)> {
        self.commands.iter().find_map(|c| match c {
            PassCommand::SetShader(name, defines) => Some((name.as_str(), defines)),
            _ => None,
        })
    }

    pub fn texture(&self, name: &str) -> Option<TextureId> {
        self.commands.iter().find_map(|c| match c {
            PassCommand::SetTexture(n, t) if n == name => Some(*t),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

#[derive(Debug, Default)]
pub struct DeviceLog {
    next_texture: usize,
    next_command_buffer: u64,
    pub live: HashMap<TextureId, TextureInfo>,
    pub created: Vec<TextureId>,
    pub destroyed: Vec<TextureId>,
    pub encoded: Vec<RecordedPass>,
    pub submitted: Vec<CommandBufferId>,
    pub readbacks: usize,
}

#[derive(Debug)]
pub struct MockDevice {
    log: Arc<Mutex<DeviceLog>>,
    fail_allocations: AtomicBool,
    allocation_budget: Mutex<Option<usize>>,
    effects_ready: AtomicBool,
    readback: Mutex<Vec<f32>>,
}

impl MockDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            log: Arc::new(Mutex::new(DeviceLog::default())),
            fail_allocations: AtomicBool::new(false),
            allocation_budget: Mutex::new(None),
            effects_ready: AtomicBool::new(true),
            readback: Mutex::new(vec![0.25, 0.75, 0.0, 1.0]),
        })
    }

    pub fn log(&self) -> MutexGuard<'_, DeviceLog> {
        self.log.lock().unwrap()
    }

    pub fn set_fail_allocations(&self, fail: bool) {
        self.fail_allocations.store(fail, Ordering::SeqCst);
    }

    /// Lets `count` more allocations succeed, then fails the rest.
    pub fn set_allocation_budget(&self, count: usize) {
        *self.allocation_budget.lock().unwrap() = Some(count);
    }

    pub fn set_effects_ready(&self, ready: bool) {
        self.effects_ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_readback(&self, texel: [f32; 4]) {
        *self.readback.lock().unwrap() = texel.to_vec();
    }

    pub fn info(&self, id: TextureId) -> Option<TextureInfo> {
        self.log().live.get(&id).copied()
    }

    pub fn live_count(&self) -> usize {
        self.log().live.len()
    }

    /// Passes recorded and finished since the last call.
    pub fn take_passes(&self) -> Vec<RecordedPass> {
        std::mem::take(&mut self.log().encoded)
    }
}

impl GraphicsDevice for MockDevice {
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        if self.fail_allocations.load(Ordering::SeqCst) {
            return Err(ResourceError::OutOfMemory);
        }
        if let Some(budget) = self.allocation_budget.lock().unwrap().as_mut() {
            if *budget == 0 {
                return Err(ResourceError::OutOfMemory);
            }
            *budget -= 1;
        }
        let mut log = self.log();
        log.next_texture += 1;
        let id = TextureId(log.next_texture);
        log.live.insert(
            id,
            TextureInfo {
                width: descriptor.width,
                height: descriptor.height,
                format: descriptor.format,
            },
        );
        log.created.push(id);
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let mut log = self.log();
        match log.live.remove(&id) {
            Some(_) => {
                log.destroyed.push(id);
                Ok(())
            }
            None => Err(ResourceError::NotFound { id }),
        }
    }

    fn create_command_encoder(&self, label: Option<&str>) -> Box<dyn CommandEncoder> {
        Box::new(MockEncoder {
            _label: label.map(str::to_owned),
            log: Arc::clone(&self.log),
            passes: Vec::new(),
        })
    }

    fn submit_command_buffer(&self, command_buffer: CommandBufferId) {
        self.log().submitted.push(command_buffer);
    }

    fn read_texture_f32(&self, id: TextureId, _width: u32, _height: u32) -> Result<Vec<f32>, ResourceError> {
        let mut log = self.log();
        if !log.live.contains_key(&id) {
            return Err(ResourceError::NotFound { id });
        }
        log.readbacks += 1;
        Ok(self.readback.lock().unwrap().clone())
    }

    fn is_effect_ready(&self, _key: &EffectKey) -> bool {
        self.effects_ready.load(Ordering::SeqCst)
    }
}

struct MockEncoder {
    _label: Option<String>,
    log: Arc<Mutex<DeviceLog>>,
    passes: Vec<RecordedPass>,
}

struct MockPass<'a> {
    pass: &'a mut RecordedPass,
}

impl<'a> RenderPass<'a> for MockPass<'a> {
    fn set_shader(&mut self, effect: &str, defines: &DefineTable) {
        self.pass
            .commands
            .push(PassCommand::SetShader(effect.to_owned(), defines.clone()));
    }

    fn set_depth_state(&mut self, state: &DepthState) {
        self.pass.commands.push(PassCommand::SetDepthState(*state));
    }

    fn set_uniforms(&mut self, data: &[u8]) {
        self.pass.commands.push(PassCommand::SetUniforms(data.to_vec()));
    }

    fn set_texture(&mut self, name: &str, texture: TextureId) {
        self.pass
            .commands
            .push(PassCommand::SetTexture(name.to_owned(), texture));
    }

    fn draw_mesh(&mut self, mesh: MeshId) {
        self.pass.commands.push(PassCommand::DrawMesh(mesh));
    }

    fn draw_fullscreen(&mut self) {
        self.pass.commands.push(PassCommand::DrawFullscreen);
    }
}

impl CommandEncoder for MockEncoder {
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &RenderPassDescriptor<'encoder>,
    ) -> Box<dyn RenderPass<'encoder> + 'encoder> {
        self.passes.push(RecordedPass {
            label: descriptor.label.unwrap_or_default().to_owned(),
            color_target: descriptor.color_target,
            depth_target: descriptor.depth_target,
            force_full_viewport: descriptor.force_full_viewport,
            commands: Vec::new(),
        });
        let pass = self.passes.last_mut().unwrap();
        Box::new(MockPass { pass })
    }

    fn finish(self: Box<Self>) -> CommandBufferId {
        let this = *self;
        let mut log = this.log.lock().unwrap();
        log.next_command_buffer += 1;
        log.encoded.extend(this.passes);
        CommandBufferId(log.next_command_buffer)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scene
// ─────────────────────────────────────────────────────────────────────────────

pub struct StubScene {
    pub shadows_enabled: bool,
    pub camera: Option<CameraView>,
    pub bounds: HashMap<MeshId, Aabb>,
    pub children: HashMap<MeshId, Vec<MeshId>>,
    pub transparent: HashSet<MeshId>,
    hooks: Vec<(HookId, BeforeRenderHook)>,
    next_hook: u64,
}

impl StubScene {
    /// A scene with a camera at `(0, 2, 0)` looking down `-Z`, near 1, far 101.
    pub fn new() -> Self {
        Self {
            shadows_enabled: true,
            camera: Some(CameraView::perspective(
                Vec3::new(0.0, 2.0, 0.0),
                Vec3::new(0.0, 2.0, -10.0),
                std::f32::consts::FRAC_PI_3,
                16.0 / 9.0,
                1.0,
                101.0,
            )),
            bounds: HashMap::new(),
            children: HashMap::new(),
            transparent: HashSet::new(),
            hooks: Vec::new(),
            next_hook: 0,
        }
    }

    /// Places a unit-half-extent box at `center`.
    pub fn place(&mut self, mesh: MeshId, center: Vec3) {
        self.bounds
            .insert(mesh, Aabb::from_center_half_extents(center, Vec3::ONE));
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Runs every before-render hook once.
    pub fn run_frame(&mut self) {
        let mut hooks = std::mem::take(&mut self.hooks);
        for (_, hook) in hooks.iter_mut() {
            hook(&*self);
        }
        hooks.append(&mut self.hooks);
        self.hooks = hooks;
    }
}

impl Scene for StubScene {
    fn shadows_enabled(&self) -> bool {
        self.shadows_enabled
    }

    fn active_camera(&self) -> Option<CameraView> {
        self.camera
    }

    fn world_bounds(&self, mesh: MeshId) -> Option<Aabb> {
        self.bounds.get(&mesh).copied()
    }

    fn child_meshes(&self, mesh: MeshId) -> Vec<MeshId> {
        self.children.get(&mesh).cloned().unwrap_or_default()
    }

    fn is_transparent(&self, mesh: MeshId) -> bool {
        self.transparent.contains(&mesh)
    }

    fn add_before_render_hook(&mut self, hook: BeforeRenderHook) -> HookId {
        self.next_hook += 1;
        let id = HookId(self.next_hook);
        self.hooks.push((id, hook));
        id
    }

    fn remove_before_render_hook(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(h, _)| *h != id);
        self.hooks.len() != before
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Light
// ─────────────────────────────────────────────────────────────────────────────

pub struct StubLight {
    pub kind: LightKind,
    pub enabled: Cell<bool>,
    pub dirty: Cell<u32>,
}

impl StubLight {
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            enabled: Cell::new(true),
            dirty: Cell::new(0),
        }
    }
}

impl ShadowLight for StubLight {
    fn kind(&self) -> LightKind {
        self.kind
    }

    fn shadow_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn direction(&self) -> Vec3 {
        Vec3::new(-0.3, -1.0, -0.2).normalize()
    }

    fn depth_min_z(&self, camera: &CameraView) -> f32 {
        camera.near
    }

    fn depth_max_z(&self, camera: &CameraView) -> f32 {
        camera.far
    }

    fn mark_materials_dirty(&self) {
        self.dirty.set(self.dirty.get() + 1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shader binding target
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Matrices(String, Vec<f32>),
    Int(String, i32),
    FloatArray(String, Vec<f32>),
    Texture(String, TextureId),
    DepthStencilTexture(String, TextureId),
    TextureArray(String, Vec<TextureId>),
    Float4(String, [f32; 4], String),
    Float2(String, [f32; 2], String),
}

impl Binding {
    pub fn name(&self) -> &str {
        match self {
            Binding::Matrices(n, _)
            | Binding::Int(n, _)
            | Binding::FloatArray(n, _)
            | Binding::Texture(n, _)
            | Binding::DepthStencilTexture(n, _)
            | Binding::TextureArray(n, _)
            | Binding::Float4(n, _, _)
            | Binding::Float2(n, _, _) => n,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub bindings: Vec<Binding>,
}

impl RecordingTarget {
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name() == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl ShaderBindingTarget for RecordingTarget {
    fn set_matrices(&mut self, name: &str, matrices: &[f32]) {
        self.bindings
            .push(Binding::Matrices(name.to_owned(), matrices.to_vec()));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.bindings.push(Binding::Int(name.to_owned(), value));
    }

    fn set_float_array(&mut self, name: &str, values: &[f32]) {
        self.bindings
            .push(Binding::FloatArray(name.to_owned(), values.to_vec()));
    }

    fn set_texture(&mut self, name: &str, texture: TextureId) {
        self.bindings.push(Binding::Texture(name.to_owned(), texture));
    }

    fn set_depth_stencil_texture(&mut self, name: &str, texture: TextureId) {
        self.bindings
            .push(Binding::DepthStencilTexture(name.to_owned(), texture));
    }

    fn set_texture_array(&mut self, name: &str, textures: &[TextureId]) {
        self.bindings
            .push(Binding::TextureArray(name.to_owned(), textures.to_vec()));
    }

    fn update_float4(&mut self, name: &str, value: [f32; 4], light_index: &str) {
        self.bindings
            .push(Binding::Float4(name.to_owned(), value, light_index.to_owned()));
    }

    fn update_float2(&mut self, name: &str, value: [f32; 2], light_index: &str) {
        self.bindings
            .push(Binding::Float2(name.to_owned(), value, light_index.to_owned()));
    }
}
