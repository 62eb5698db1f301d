pub mod buffer;
pub mod geometry;
pub mod mesh;
pub mod splash;

// Re-export buffer/geometry primitives for convenience
pub use buffer::{BufferAttribute, StepMode};
pub use geometry::{build_instanced_geometry, AttributeSpec, InstancedGeometry, MeshTemplate};
pub use mesh::{GpuMesh, Vertex3D};

// Re-export Splash Effect components
pub use splash::{
    FrameClock, FrameOutcome, ParticlePool, SplashAssets, SplashEffect, SplashRenderable,
    SplashRenderer, StepReport,
};
