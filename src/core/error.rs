//! 统一错误处理模块
//!
//! 提供溅射特效范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **资源层错误** (`AssetError`): 网格、纹理加载失败（对应 AssetLoadFailure）
//! - **几何层错误** (`GeometryError`): 模板网格缺少必需属性等（对应 MissingAttribute）
//!
//! `SplashError` 可以同时承载以上两类错误以及配置错误。
//! 动画步进器本身是全函数，不产生任何错误。

use thiserror::Error;

use crate::config::ConfigError;

/// 溅射特效顶层错误类型
#[derive(Error, Debug)]
pub enum SplashError {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// 资源加载错误
#[derive(Error, Debug, Clone)]
pub enum AssetError {
    #[error("Asset not found: {path}")]
    NotFound { path: String },

    #[error("Failed to load asset: {path}, reason: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Asset decode error: {path}, reason: {reason}")]
    Decode { path: String, reason: String },

    #[error("Asset contains no triangle mesh: {path}")]
    NoMesh { path: String },

    #[error("Asset format not supported: {path}")]
    Unsupported { path: String },
}

/// 几何构建错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Missing required attribute: {name}")]
    MissingAttribute { name: String },

    #[error("Invalid item size {item_size} for attribute: {name}")]
    InvalidItemSize { name: String, item_size: usize },

    #[error("Attribute {name} has {len} floats, not a multiple of item size {item_size}")]
    LengthMismatch {
        name: String,
        len: usize,
        item_size: usize,
    },
}

impl GeometryError {
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingAttribute { name: name.into() }
    }
}

/// 结果类型别名
pub type SplashResult<T> = Result<T, SplashError>;
pub type AssetResult<T> = Result<T, AssetError>;
pub type GeometryResult<T> = Result<T, GeometryError>;
