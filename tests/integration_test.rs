use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use bevy_ecs::prelude::{Schedule, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use splash_fx::config::AssetConfig;
use splash_fx::core::{AssetError, SplashError};
use splash_fx::render::geometry::MeshTemplate;
use splash_fx::render::splash::stepper::{RESPAWN_OPACITY, OPACITY_DECAY};
use splash_fx::render::splash::{
    splash_frame_system, EffectStatus, FrameClock, FrameOutcome, SplashAssets, SplashEffect,
};
use splash_fx::resources::TextureData;
use splash_fx::AssetCache;

const FRAME_MS: f64 = 1000.0 / 60.0;

fn preloaded_cache() -> (Arc<AssetCache>, AssetConfig) {
    let config = AssetConfig::default();
    let cache = AssetCache::new();
    cache.insert_mesh(&config.mesh_path, MeshTemplate::quad());
    cache.insert_texture(
        &config.splash_texture_path,
        TextureData::solid(4, 4, [255, 255, 255, 255]),
    );
    (Arc::new(cache), config)
}

/// 构造一个四边形 GLB（可选省略法线）
fn quad_glb(with_normals: bool) -> Vec<u8> {
    let positions: [[f32; 3]; 4] = [
        [-0.5, 0.0, -0.5],
        [0.5, 0.0, -0.5],
        [0.5, 0.0, 0.5],
        [-0.5, 0.0, 0.5],
    ];
    let normals = [[0.0f32, 1.0, 0.0]; 4];
    let uvs: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let indices: [u16; 6] = [0, 2, 1, 0, 3, 2];

    let mut bin = Vec::new();
    bin.extend_from_slice(bytemuck::cast_slice(&positions));
    bin.extend_from_slice(bytemuck::cast_slice(&normals));
    bin.extend_from_slice(bytemuck::cast_slice(&uvs));
    bin.extend_from_slice(bytemuck::cast_slice(&indices));

    let mut attributes = serde_json::json!({ "POSITION": 0, "TEXCOORD_0": 2 });
    if with_normals {
        attributes["NORMAL"] = serde_json::json!(1);
    }

    let json = serde_json::json!({
        "asset": { "version": "2.0" },
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 48 },
            { "buffer": 0, "byteOffset": 48, "byteLength": 48 },
            { "buffer": 0, "byteOffset": 96, "byteLength": 32 },
            { "buffer": 0, "byteOffset": 128, "byteLength": 12 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
              "min": [-0.5, 0.0, -0.5], "max": [0.5, 0.0, 0.5] },
            { "bufferView": 1, "componentType": 5126, "count": 4, "type": "VEC3" },
            { "bufferView": 2, "componentType": 5126, "count": 4, "type": "VEC2" },
            { "bufferView": 3, "componentType": 5123, "count": 6, "type": "SCALAR" }
        ],
        "meshes": [{ "primitives": [{ "attributes": attributes, "indices": 3 }] }],
        "nodes": [{ "mesh": 0 }],
        "scenes": [{ "nodes": [0] }],
        "scene": 0
    });

    let mut json_bytes = serde_json::to_vec(&json).unwrap();
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json_bytes.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json_bytes);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

fn write_assets(dir: &Path, with_normals: bool) -> Result<AssetConfig> {
    std::fs::create_dir_all(dir.join("assets"))?;
    std::fs::create_dir_all(dir.join("textures"))?;
    std::fs::write(dir.join("assets/splash2.glb"), quad_glb(with_normals))?;
    image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 200, 255, 255]))
        .save(dir.join("textures/splash.png"))?;
    Ok(AssetConfig::default())
}

#[tokio::test]
async fn test_bootstrap_from_cache_becomes_ready() -> Result<()> {
    let (cache, config) = preloaded_cache();
    let (effect, loader) = SplashEffect::bootstrap(SplashAssets::load(cache, config));
    let mut effect = effect.with_rng(StdRng::seed_from_u64(9));

    tokio::spawn(loader).await?;

    let mut stepped = 0;
    for frame in 0..240 {
        if let FrameOutcome::Stepped(report) = effect.on_frame(frame as f64 * FRAME_MS) {
            assert!(report.recycled <= 3);
            stepped += 1;
        }
    }
    assert_eq!(stepped, 240);

    let pool = &effect.renderable().unwrap().pool;
    for slot in 0..pool.particle_count() {
        assert!(pool.opacity(slot) <= RESPAWN_OPACITY / OPACITY_DECAY);
        assert!(pool.scale(slot) >= 0.2);
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_files_leave_effect_inactive() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let cache = Arc::new(AssetCache::with_root(dir.path()));
    let (mut effect, loader) = SplashEffect::bootstrap(SplashAssets::load(cache, AssetConfig::default()));

    assert_eq!(effect.on_frame(0.0), FrameOutcome::Pending);
    tokio::spawn(loader).await?;

    assert_eq!(effect.on_frame(FRAME_MS), FrameOutcome::Inactive);
    assert_eq!(effect.on_frame(2.0 * FRAME_MS), FrameOutcome::Inactive);
    assert!(matches!(
        effect.failure(),
        Some(SplashError::Asset(AssetError::NotFound { .. } | AssetError::Unsupported { .. }))
    ));
    Ok(())
}

#[tokio::test]
async fn test_aborted_loader_leaves_effect_inactive() -> Result<()> {
    let (mut effect, loader) = SplashEffect::bootstrap(async {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        SplashAssets::load(preloaded_cache().0, AssetConfig::default()).await
    });

    let handle = tokio::spawn(loader);
    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());

    assert_eq!(effect.on_frame(0.0), FrameOutcome::Inactive);
    assert!(effect.failure().is_none());
    Ok(())
}

#[cfg(feature = "gltf")]
#[tokio::test]
async fn test_load_glb_and_png_from_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_assets(dir.path(), true)?;
    let cache = Arc::new(AssetCache::with_root(dir.path()));

    let (mut effect, loader) = SplashEffect::bootstrap(SplashAssets::load(cache.clone(), config));
    tokio::spawn(loader).await?;

    assert_eq!(effect.poll_ready(), EffectStatus::Ready);
    let renderable = effect.renderable().unwrap();
    assert_eq!(renderable.texture.width(), 8);
    assert_eq!(renderable.pool.index(), Some(&[0u32, 2, 1, 0, 3, 2][..]));
    assert_eq!(renderable.pool.attribute("position").unwrap().count(), 4);
    assert_eq!(cache.mesh_count(), 1);
    assert_eq!(cache.texture_count(), 1);

    assert!(matches!(effect.on_frame(0.0), FrameOutcome::Stepped(_)));
    Ok(())
}

#[cfg(feature = "gltf")]
#[tokio::test]
async fn test_glb_without_normals_fails_geometry_build() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_assets(dir.path(), false)?;
    let cache = Arc::new(AssetCache::with_root(dir.path()));

    let (mut effect, loader) = SplashEffect::bootstrap(SplashAssets::load(cache, config));
    tokio::spawn(loader).await?;

    assert_eq!(effect.on_frame(0.0), FrameOutcome::Inactive);
    match effect.failure() {
        Some(SplashError::Geometry(e)) => {
            assert_eq!(e.to_string(), "Missing required attribute: normal");
        }
        other => panic!("unexpected failure: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_shared_cache_reuses_decoded_assets() -> Result<()> {
    let (cache, config) = preloaded_cache();
    let (mut first, a) = SplashEffect::bootstrap(SplashAssets::load(cache.clone(), config.clone()));
    let (mut second, b) = SplashEffect::bootstrap(SplashAssets::load(cache.clone(), config));
    tokio::spawn(a).await?;
    tokio::spawn(b).await?;

    first.poll_ready();
    second.poll_ready();
    let t1 = &first.renderable().unwrap().texture;
    let t2 = &second.renderable().unwrap().texture;
    assert!(Arc::ptr_eq(t1, t2));

    // 每个实例拥有独立的粒子池
    first.on_frame(0.0);
    assert_ne!(
        first.renderable().unwrap().pool.opacity(0),
        second.renderable().unwrap().pool.opacity(0)
    );
    Ok(())
}

#[test]
fn test_ecs_drives_effects() {
    let (cache, config) = preloaded_cache();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let (effect, loader) = SplashEffect::bootstrap(SplashAssets::load(cache, config));
    runtime.block_on(loader);

    let mut world = World::new();
    world.insert_resource(FrameClock::default());
    let entity = world.spawn(effect).id();

    let mut schedule = Schedule::default();
    schedule.add_systems(splash_frame_system);
    for _ in 0..10 {
        world.resource_mut::<FrameClock>().advance(FRAME_MS);
        schedule.run(&mut world);
    }

    let effect = world.get::<SplashEffect>(entity).unwrap();
    assert_eq!(effect.status(), EffectStatus::Ready);
    assert!((effect.time() as f64 - 10.0 * FRAME_MS / 1000.0).abs() < 1e-4);
}

/// 有可用适配器时做一次离屏绘制，否则跳过
#[test]
fn test_renderer_uploads_dirty_attributes() {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let Some(adapter) = futures::executor::block_on(instance.request_adapter(
        &wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        },
    )) else {
        return;
    };
    let Ok((device, queue)) =
        futures::executor::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None))
    else {
        return;
    };

    let (cache, config) = preloaded_cache();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let assets = runtime
        .block_on(SplashAssets::load(cache, config))
        .unwrap();
    let mut effect = SplashEffect::from_assets(&assets).unwrap();

    let format = wgpu::TextureFormat::Rgba8Unorm;
    let renderer = splash_fx::SplashRenderer::new(
        &device,
        &queue,
        format,
        None,
        effect.renderable().unwrap(),
    );

    // 新建的池全部是脏的
    assert_eq!(renderer.prepare(&queue, &mut effect, glam::Mat4::IDENTITY), 7);
    assert_eq!(renderer.prepare(&queue, &mut effect, glam::Mat4::IDENTITY), 0);
    effect.on_frame(FRAME_MS);
    assert_eq!(renderer.prepare(&queue, &mut effect, glam::Mat4::IDENTITY), 6);

    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Splash Test Target"),
        size: wgpu::Extent3d {
            width: 16,
            height: 16,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Splash Test Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        renderer.draw(&mut pass);
    }
    queue.submit(Some(encoder.finish()));
    assert_eq!(renderer.instance_count(), 5);
}
