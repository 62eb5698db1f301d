//! 溅射粒子特效
//!
//! 固定容量的实例化粒子池：几何构建器分配实例属性数组，粒子池持有它们，
//! 步进器每帧原地修改并标脏，渲染器只上传脏数组。
//!
//! ## 架构设计
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Splash Effect                        │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Bootstrap（一次性异步）                              │
//! │     - 加载网格模板与溅射纹理                             │
//! │     - build_instanced_geometry → ParticlePool            │
//! │                                                          │
//! │  2. Step（每帧同步）                                     │
//! │     - 回收 opacity <= 0.05 的槽位，每帧最多 3 个         │
//! │     - 透明度衰减、扭曲增长、缩放增长                     │
//! │     - 标脏                                               │
//! │                                                          │
//! │  3. Render（Vertex + Fragment Shader）                   │
//! │     - 缩放 → ×0.01 → 绕 Y 旋转 → 平移                    │
//! │     - floor(B.r * opacity + 0.5) 硬阈值可见性            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 使用示例
//!
//! ```ignore
//! let cache = Arc::new(AssetCache::new());
//! let (effect, loader) =
//!     SplashEffect::bootstrap(SplashAssets::load(cache, AssetConfig::default()));
//! tokio::spawn(loader);
//!
//! commands.spawn(effect);
//! ```

pub mod effect;
pub mod gpu;
pub mod pool;
pub mod shader;
pub mod stepper;
pub mod system;

pub use effect::{EffectStatus, FrameOutcome, SplashAssets, SplashEffect, SplashRenderable};
pub use gpu::{instance_buffer_layouts, SplashRenderer};
pub use pool::{ParticlePool, PARTICLE_COUNT, SPLASH_ATTRIBUTE_SPECS};
pub use shader::{
    shade_fragment, transform_vertex, visibility_gate, FragmentInput, InstanceParams,
    SplashUniforms, TextureSampler,
};
pub use stepper::{step, StepReport};
pub use system::{splash_frame_system, FrameClock};
