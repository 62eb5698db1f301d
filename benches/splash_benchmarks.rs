//! 溅射特效性能基准测试
//!
//! 测试步进器、几何构建与片元参考实现的开销

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use splash_fx::render::geometry::{build_instanced_geometry, MeshTemplate};
use splash_fx::render::splash::pool::SPLASH_ATTRIBUTE_SPECS;
use splash_fx::render::splash::shader::{shade_fragment, FragmentInput};
use splash_fx::render::splash::{step, ParticlePool};
use splash_fx::resources::{TextureData, WrapMode};

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("splash_step");
    let template = MeshTemplate::quad();

    for particle_count in [5usize, 64, 1024].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(particle_count),
            particle_count,
            |b, &count| {
                let mut pool = ParticlePool::with_capacity(&template, count).unwrap();
                let mut rng = StdRng::seed_from_u64(42);
                b.iter(|| black_box(step(&mut pool, &mut rng)));
            },
        );
    }

    group.finish();
}

fn bench_build_geometry(c: &mut Criterion) {
    let template = MeshTemplate::quad();
    c.bench_function("build_instanced_geometry", |b| {
        b.iter(|| {
            black_box(build_instanced_geometry(
                black_box(&template),
                &SPLASH_ATTRIBUTE_SPECS,
                black_box(5),
            ))
        })
    });
}

fn bench_shade_fragment(c: &mut Criterion) {
    let texture = TextureData::solid(64, 64, [0, 128, 255, 255]);
    let splash = texture.sampler(WrapMode::ClampToEdge);
    let scroll = texture.sampler(WrapMode::Repeat);
    let input = FragmentInput {
        uv: Vec2::new(0.3, 0.7),
        opacity: 4.0,
        distortion_scale_x: 0.05,
        distortion_scale_y: 0.05,
    };

    c.bench_function("shade_fragment", |b| {
        b.iter(|| black_box(shade_fragment(black_box(&input), 1.25, &splash, &scroll)))
    });
}

criterion_group!(benches, bench_step, bench_build_geometry, bench_shade_fragment);
criterion_main!(benches);
