//! 资源缓存
//!
//! 由宿主创建并注入特效，多个特效实例可以共享同一份已解码的网格与纹理。
//! 加载过程在 tokio 上执行：文件读取走 `tokio::fs`，解码放到阻塞线程池。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::core::{AssetError, AssetResult};
use crate::render::geometry::MeshTemplate;

use super::texture::TextureData;

/// 网格与纹理缓存
#[derive(Debug, Default)]
pub struct AssetCache {
    /// 相对路径的根目录
    root: Option<PathBuf>,
    textures: RwLock<HashMap<PathBuf, Arc<TextureData>>>,
    meshes: RwLock<HashMap<PathBuf, Arc<MeshTemplate>>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// 解析资源路径
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// 预先放入纹理
    pub fn insert_texture(&self, path: impl AsRef<Path>, texture: TextureData) -> Arc<TextureData> {
        self.store_texture(self.resolve(path), texture)
    }

    /// 预先放入网格
    pub fn insert_mesh(&self, path: impl AsRef<Path>, mesh: MeshTemplate) -> Arc<MeshTemplate> {
        self.store_mesh(self.resolve(path), mesh)
    }

    pub fn cached_texture(&self, path: impl AsRef<Path>) -> Option<Arc<TextureData>> {
        self.texture_entry(&self.resolve(path))
    }

    pub fn cached_mesh(&self, path: impl AsRef<Path>) -> Option<Arc<MeshTemplate>> {
        self.mesh_entry(&self.resolve(path))
    }

    fn texture_entry(&self, key: &Path) -> Option<Arc<TextureData>> {
        self.textures.read().ok()?.get(key).cloned()
    }

    fn mesh_entry(&self, key: &Path) -> Option<Arc<MeshTemplate>> {
        self.meshes.read().ok()?.get(key).cloned()
    }

    fn store_texture(&self, key: PathBuf, texture: TextureData) -> Arc<TextureData> {
        let texture = Arc::new(texture);
        if let Ok(mut map) = self.textures.write() {
            map.insert(key, texture.clone());
        }
        texture
    }

    fn store_mesh(&self, key: PathBuf, mesh: MeshTemplate) -> Arc<MeshTemplate> {
        let mesh = Arc::new(mesh);
        if let Ok(mut map) = self.meshes.write() {
            map.insert(key, mesh.clone());
        }
        mesh
    }

    pub fn texture_count(&self) -> usize {
        self.textures.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut map) = self.textures.write() {
            map.clear();
        }
        if let Ok(mut map) = self.meshes.write() {
            map.clear();
        }
    }

    /// 加载纹理，命中缓存时直接返回
    pub async fn load_texture(&self, path: impl AsRef<Path>) -> AssetResult<Arc<TextureData>> {
        let key = self.resolve(path);
        if let Some(texture) = self.texture_entry(&key) {
            return Ok(texture);
        }

        let bytes = read_bytes(&key).await?;
        let decode_path = key.clone();
        let texture = tokio::task::spawn_blocking(move || TextureData::decode(&bytes, &decode_path))
            .await
            .map_err(|e| AssetError::LoadFailed {
                path: key.display().to_string(),
                reason: e.to_string(),
            })??;

        tracing::info!(
            target: "splash",
            path = %key.display(),
            width = texture.width(),
            height = texture.height(),
            "Loaded texture"
        );
        Ok(self.store_texture(key, texture))
    }

    /// 加载网格模板，命中缓存时直接返回
    #[cfg(feature = "gltf")]
    pub async fn load_mesh(&self, path: impl AsRef<Path>) -> AssetResult<Arc<MeshTemplate>> {
        let key = self.resolve(path);
        if let Some(mesh) = self.mesh_entry(&key) {
            return Ok(mesh);
        }

        let bytes = read_bytes(&key).await?;
        let import_path = key.clone();
        let mesh = tokio::task::spawn_blocking(move || {
            super::gltf_mesh::mesh_template_from_slice(&bytes, &import_path)
        })
        .await
        .map_err(|e| AssetError::LoadFailed {
            path: key.display().to_string(),
            reason: e.to_string(),
        })??;

        tracing::info!(target: "splash", path = %key.display(), "Loaded mesh");
        Ok(self.store_mesh(key, mesh))
    }

    /// 未启用 glTF 时只能使用预先放入的网格
    #[cfg(not(feature = "gltf"))]
    pub async fn load_mesh(&self, path: impl AsRef<Path>) -> AssetResult<Arc<MeshTemplate>> {
        let key = self.resolve(path);
        self.mesh_entry(&key).ok_or_else(|| AssetError::Unsupported {
            path: key.display().to_string(),
        })
    }
}

async fn read_bytes(path: &Path) -> AssetResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AssetError::NotFound {
            path: path.display().to_string(),
        },
        _ => AssetError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_to_root() {
        let cache = AssetCache::with_root("/assets");
        assert_eq!(cache.resolve("a.png"), PathBuf::from("/assets/a.png"));
        assert_eq!(cache.resolve("/abs/b.png"), PathBuf::from("/abs/b.png"));
        assert_eq!(AssetCache::new().resolve("c.png"), PathBuf::from("c.png"));
    }

    #[test]
    fn test_insert_and_lookup() {
        let cache = AssetCache::new();
        cache.insert_texture("splash.png", TextureData::solid(1, 1, [0, 0, 0, 255]));
        cache.insert_mesh("splash.glb", MeshTemplate::quad());
        assert!(cache.cached_texture("splash.png").is_some());
        assert!(cache.cached_mesh("splash.glb").is_some());
        assert_eq!(cache.texture_count(), 1);
        cache.clear();
        assert_eq!(cache.mesh_count(), 0);
    }

    #[tokio::test]
    async fn test_cached_texture_skips_disk() {
        let cache = AssetCache::new();
        let inserted = cache.insert_texture("virtual.png", TextureData::solid(2, 2, [1, 2, 3, 4]));
        let loaded = cache.load_texture("virtual.png").await.unwrap();
        assert!(Arc::ptr_eq(&inserted, &loaded));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::with_root(dir.path());
        let err = cache.load_texture("missing.png").await.unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_load_texture_from_disk_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("splash.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let cache = AssetCache::new();
        let first = cache.load_texture(&path).await.unwrap();
        let second = cache.load_texture(&path).await.unwrap();
        assert_eq!(first.width(), 3);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
