//! 溅射特效生命周期
//!
//! 一次性异步加载驱动长期运行的逐帧回调：
//!
//! ```text
//!   bootstrap(load) ──▶ (SplashEffect, loader future)
//!                              │
//!          loader: await load → ParticlePool::new → oneshot::send
//!                              │
//!   on_frame(ts):  Loading ──(收到池)──▶ Ready ──▶ step() 每帧一次
//!                     │
//!                     └──(加载失败 / loader 被丢弃)──▶ Inactive（永久）
//! ```
//!
//! 逐帧回调对所有状态都是全函数，未就绪时直接返回，不会报错。

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use bevy_ecs::prelude::Component;
use futures::channel::oneshot;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::AssetConfig;
use crate::core::{RandomSource, SplashError, SplashResult};
use crate::render::geometry::MeshTemplate;
use crate::resources::{AssetCache, TextureData};

use super::pool::ParticlePool;
use super::shader::SplashUniforms;
use super::stepper::{self, StepReport};

/// 加载完成的资源
#[derive(Clone, Debug)]
pub struct SplashAssets {
    pub template: Arc<MeshTemplate>,
    /// 遮罩与滚动扭曲共用的纹理
    pub texture: Arc<TextureData>,
}

impl SplashAssets {
    /// 通过宿主注入的缓存加载网格与纹理
    pub async fn load(cache: Arc<AssetCache>, config: AssetConfig) -> SplashResult<Self> {
        let mesh_path = PathBuf::from(&config.mesh_path);
        let texture_path = PathBuf::from(&config.splash_texture_path);
        let (template, texture) =
            futures::try_join!(cache.load_mesh(&mesh_path), cache.load_texture(&texture_path))?;
        Ok(Self { template, texture })
    }
}

/// 就绪的可渲染对象
#[derive(Clone, Debug)]
pub struct SplashRenderable {
    pub pool: ParticlePool,
    pub texture: Arc<TextureData>,
}

impl SplashRenderable {
    pub fn from_assets(assets: &SplashAssets) -> SplashResult<Self> {
        let pool = ParticlePool::new(&assets.template)?;
        Ok(Self {
            pool,
            texture: assets.texture.clone(),
        })
    }
}

/// 对外可见的状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectStatus {
    Loading,
    Ready,
    Inactive,
}

/// 逐帧回调结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// 资源尚未就绪
    Pending,
    /// 加载失败，特效不会再激活
    Inactive,
    Stepped(StepReport),
}

enum EffectState {
    Loading(oneshot::Receiver<SplashResult<SplashRenderable>>),
    Ready(SplashRenderable),
    Inactive(Option<SplashError>),
}

/// 溅射特效
#[derive(Component)]
pub struct SplashEffect {
    state: EffectState,
    rng: Box<dyn RandomSource + Send + Sync>,
    /// 最近一帧写入 uniform 的时间（秒）
    time: f32,
}

impl SplashEffect {
    /// 创建特效与对应的加载 future
    ///
    /// 宿主负责驱动返回的 future（例如交给 tokio）。future 被丢弃时特效转为
    /// `Inactive`；特效先被丢弃时，构建好的粒子池随发送失败一起释放。
    pub fn bootstrap<F>(load: F) -> (Self, impl Future<Output = ()> + Send)
    where
        F: Future<Output = SplashResult<SplashAssets>> + Send,
    {
        let (tx, rx) = oneshot::channel();
        let effect = Self {
            state: EffectState::Loading(rx),
            rng: Box::new(StdRng::from_entropy()),
            time: 0.0,
        };

        let loader = async move {
            let result = match load.await {
                Ok(assets) => SplashRenderable::from_assets(&assets),
                Err(e) => Err(e),
            };
            if tx.send(result).is_err() {
                tracing::debug!(target: "splash", "Splash effect dropped before assets were ready");
            }
        };

        (effect, loader)
    }

    /// 由已就绪的资源直接创建
    pub fn from_assets(assets: &SplashAssets) -> SplashResult<Self> {
        Ok(Self {
            state: EffectState::Ready(SplashRenderable::from_assets(assets)?),
            rng: Box::new(StdRng::from_entropy()),
            time: 0.0,
        })
    }

    /// 替换随机源
    pub fn with_rng(mut self, rng: impl RandomSource + Send + Sync + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// 每帧回调，`timestamp_ms` 单调递增
    pub fn on_frame(&mut self, timestamp_ms: f64) -> FrameOutcome {
        self.poll_ready();
        match &mut self.state {
            EffectState::Loading(_) => FrameOutcome::Pending,
            EffectState::Inactive(_) => FrameOutcome::Inactive,
            EffectState::Ready(ready) => {
                let report = stepper::step(&mut ready.pool, self.rng.as_mut());
                self.time = SplashUniforms::time_from_timestamp(timestamp_ms);
                FrameOutcome::Stepped(report)
            }
        }
    }

    /// 检查加载结果，不阻塞
    pub fn poll_ready(&mut self) -> EffectStatus {
        if let EffectState::Loading(rx) = &mut self.state {
            match rx.try_recv() {
                Ok(None) => {}
                Ok(Some(Ok(ready))) => {
                    tracing::info!(
                        target: "splash",
                        particles = ready.pool.particle_count(),
                        "Splash effect ready"
                    );
                    self.state = EffectState::Ready(ready);
                }
                Ok(Some(Err(e))) => {
                    tracing::error!(target: "splash", error = %e, "Splash effect failed to load");
                    self.state = EffectState::Inactive(Some(e));
                }
                Err(oneshot::Canceled) => {
                    tracing::warn!(target: "splash", "Splash asset loader was abandoned");
                    self.state = EffectState::Inactive(None);
                }
            }
        }
        self.status()
    }

    pub fn status(&self) -> EffectStatus {
        match self.state {
            EffectState::Loading(_) => EffectStatus::Loading,
            EffectState::Ready(_) => EffectStatus::Ready,
            EffectState::Inactive(_) => EffectStatus::Inactive,
        }
    }

    /// 加载失败的原因；loader 被丢弃时为 `None`
    pub fn failure(&self) -> Option<&SplashError> {
        match &self.state {
            EffectState::Inactive(e) => e.as_ref(),
            _ => None,
        }
    }

    pub fn renderable(&self) -> Option<&SplashRenderable> {
        match &self.state {
            EffectState::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    pub fn renderable_mut(&mut self) -> Option<&mut SplashRenderable> {
        match &mut self.state {
            EffectState::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    /// uniform 时间（秒）
    pub fn time(&self) -> f32 {
        self.time
    }
}

impl std::fmt::Debug for SplashEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplashEffect")
            .field("status", &self.status())
            .field("time", &self.time)
            .finish()
    }
}
