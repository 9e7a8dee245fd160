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

//! Integration tests for the single-map generator, including its use
//! through the shared `ShadowGenerator` capability.

mod common;

use common::{init_logging, Binding, MockDevice, RecordingTarget, StubScene};
use penumbra_core::lane::Lane;
use penumbra_core::math::Vec3;
use penumbra_core::renderer::{
    DefineTable, DirectionalLight, GraphicsDevice, ShadowGenerator, ShadowLight, TextureFormat,
};
use penumbra_core::scene::MeshId;
use penumbra_lanes::{
    CascadedShadowConfig, CascadedShadowGenerator, ShadowError, ShadowFilter, ShadowMapGenerator,
    ShadowMapSettings,
};
use std::rc::Rc;
use std::sync::Arc;

fn generator(
    settings: ShadowMapSettings,
) -> (Arc<MockDevice>, StubScene, Rc<DirectionalLight>, ShadowMapGenerator) {
    init_logging();
    let device = MockDevice::new();
    let mut scene = StubScene::new();
    let light = Rc::new(DirectionalLight::default());
    let generator = ShadowMapGenerator::new(
        256,
        settings,
        light.clone() as Rc<dyn ShadowLight>,
        device.clone() as Arc<dyn GraphicsDevice>,
        &mut scene,
    );
    (device, scene, light, generator)
}

#[test]
fn test_defines_use_the_plain_shadow_flags() {
    let (_, scene, _, generator) = generator(ShadowMapSettings::default());
    let mut defines = DefineTable::new();
    generator.prepare_shader_defines(&scene, &mut defines, 1);
    assert!(defines.is_enabled("SHADOW1"));
    assert!(defines.is_enabled("SHADOWPCF1"));
    assert!(!defines.is_enabled("SHADOWCSM1"));
}

#[test]
fn test_pcf_binds_a_depth_sampler_and_one_matrix() {
    let (_, scene, _, mut generator) = generator(ShadowMapSettings::default());
    let mut target = RecordingTarget::default();
    generator.bind_to_shader(&scene, 0, &mut target);

    let texture = generator.shadow_map_textures()[0];
    assert_eq!(
        target.get("shadowSampler0"),
        Some(&Binding::DepthStencilTexture("shadowSampler0".into(), texture))
    );
    match target.get("lightMatrix0") {
        Some(Binding::Matrices(_, values)) => assert_eq!(values.len(), 16),
        other => panic!("unexpected lightMatrix binding: {other:?}"),
    }
    assert!(target.has("shadowsInfo"));
    assert!(target.has("depthValues"));
}

#[test]
fn test_pcss_also_binds_the_depth_sampler() {
    let settings = ShadowMapSettings {
        filter: ShadowFilter::Pcss,
        ..ShadowMapSettings::default()
    };
    let (_, scene, _, mut generator) = generator(settings);
    let mut target = RecordingTarget::default();
    generator.bind_to_shader(&scene, 3, &mut target);
    assert!(matches!(target.get("shadowSampler3"), Some(Binding::DepthStencilTexture(..))));
    assert!(matches!(target.get("depthSampler3"), Some(Binding::Texture(..))));
}

#[test]
fn test_filter_switch_reallocates_a_color_target() {
    let (device, _, light, mut generator) = generator(ShadowMapSettings::default());
    let settings = ShadowMapSettings {
        filter: ShadowFilter::Exponential,
        ..ShadowMapSettings::default()
    };
    generator.set_settings(settings);
    let texture = generator.shadow_map_textures()[0];
    assert_eq!(device.info(texture).unwrap().format, TextureFormat::R32Float);
    assert_eq!(light.dirty_generation(), 1);
}

#[test]
fn test_render_draws_visible_casters() {
    let (device, mut scene, _, mut generator) = generator(ShadowMapSettings::default());
    scene.place(MeshId(1), Vec3::new(0.0, 0.0, -5.0));
    generator.add_shadow_caster(&scene, MeshId(1), false);
    scene.run_frame();

    assert_eq!(generator.render(&scene), 1);
    let passes = device.take_passes();
    assert_eq!(passes.len(), 1);
    assert_eq!(passes[0].draws(), vec![MeshId(1)]);
    assert!(generator.transform_matrix().is_some());
}

#[test]
fn test_dispose_and_recreate() {
    let (device, mut scene, _, mut generator) = generator(ShadowMapSettings::default());
    generator.recreate_shadow_map().unwrap();
    assert_eq!(device.live_count(), 1);

    generator.dispose(&mut scene);
    assert_eq!(device.live_count(), 0);
    assert_eq!(scene.hook_count(), 0);
    assert!(!generator.is_ready(MeshId(1), false));
    assert!(generator.settings().is_none());
    assert!(matches!(generator.recreate_shadow_map(), Err(ShadowError::Disposed)));
}

#[test]
fn test_generators_are_interchangeable_behind_the_trait() {
    init_logging();
    let device = MockDevice::new();
    let mut scene = StubScene::new();
    let light: Rc<dyn ShadowLight> = Rc::new(DirectionalLight::default());
    let gpu = device.clone() as Arc<dyn GraphicsDevice>;

    let mut generators: Vec<Box<dyn ShadowGenerator>> = vec![
        Box::new(ShadowMapGenerator::new(
            512,
            ShadowMapSettings::default(),
            Rc::clone(&light),
            Arc::clone(&gpu),
            &mut scene,
        )),
        Box::new(CascadedShadowGenerator::new(
            CascadedShadowConfig::default().with_num_cascades(2),
            Rc::clone(&light),
            Arc::clone(&gpu),
            &mut scene,
        )),
    ];

    let counts: Vec<usize> = generators.iter().map(|g| g.shadow_map_textures().len()).collect();
    assert_eq!(counts, vec![1, 2]);
    for (i, g) in generators.iter_mut().enumerate() {
        let mut target = RecordingTarget::default();
        g.bind_to_shader(&scene, i, &mut target);
        assert!(target.has(&format!("lightMatrix{i}")));
        g.dispose(&mut scene);
    }
    assert_eq!(device.live_count(), 0);
    assert_eq!(scene.hook_count(), 0);
}

#[test]
fn test_lane_name() {
    let (_, _, _, generator) = generator(ShadowMapSettings::default());
    assert_eq!(generator.strategy_name(), "ShadowMap");
}
