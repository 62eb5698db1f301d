//! 资源模块
//!
//! 网格模板与溅射纹理的加载、解码和缓存。

pub mod cache;
#[cfg(feature = "gltf")]
pub mod gltf_mesh;
pub mod texture;

pub use cache::AssetCache;
#[cfg(feature = "gltf")]
pub use gltf_mesh::mesh_template_from_slice;
pub use texture::{SampledTexture, TextureData, WrapMode};
