//! # Splash FX
//!
//! A fixed-capacity, GPU-instanced "splash" particle effect built with Rust.
//!
//! ## Features
//!
//! - **Instanced Geometry**: one template mesh drawn once per particle slot
//! - **Recycling Pool**: a fixed arena of slots, reset in place, never allocated per frame
//! - **Dirty Tracking**: simulation arrays double as GPU buffers, uploaded only when marked dirty
//! - **Shader Contract**: WGSL shader plus a CPU reference used for numeric tests
//! - **Async Bootstrap**: one-shot asset load feeding a per-frame callback that never fails
//!
//! ## Architecture Design
//!
//! - **Data**: `BufferAttribute` arrays owned by `ParticlePool`
//! - **Logic**: `stepper::step` mutates the pool once per frame
//! - **System**: `splash_frame_system` drives every `SplashEffect` from the ECS schedule
//!
//! ### Example
//!
//! ```ignore
//! use splash_fx::render::splash::{SplashAssets, SplashEffect};
//!
//! let (mut effect, loader) = SplashEffect::bootstrap(SplashAssets::load(cache, config.assets));
//! tokio::spawn(loader);
//! effect.on_frame(timestamp_ms);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Errors, logging, randomness
//! - [`config`]: Configuration loading
//! - [`resources`]: Mesh and texture loading with an injected cache
//! - [`render`]: Geometry builder, particle pool, stepper, shader and renderer

/// Errors, logging initialisation and random sources
pub mod core;
/// Configuration system
pub mod config;
/// Resource management for meshes and textures
pub mod resources;
/// Instanced geometry and the splash effect
pub mod render;

pub use crate::core::{SplashError, SplashResult};
pub use crate::render::splash::{
    FrameOutcome, ParticlePool, SplashAssets, SplashEffect, SplashRenderer, StepReport,
};
pub use crate::resources::AssetCache;
