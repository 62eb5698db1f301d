/// 统一配置系统
///
/// 提供TOML/JSON配置文件与环境变量覆盖。
/// 粒子容量、重置值与衰减常量是固定的设计参数，不在配置范围内。
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::impl_default;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 溅射特效主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplashConfig {
    /// 资源路径配置
    #[serde(default)]
    pub assets: AssetConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SplashConfig {
    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("SPLASH_MESH_PATH") {
            self.assets.mesh_path = val;
        }
        if let Ok(val) = env::var("SPLASH_TEXTURE_PATH") {
            self.assets.splash_texture_path = val;
        }
        if let Ok(val) = env::var("SPLASH_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.assets.validate()
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./splash.toml
    /// 2. ./splash.json
    /// 3. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file("splash.toml") {
            tracing::info!(target: "splash", "Loaded config from splash.toml");
            return config;
        }

        if let Ok(config) = Self::from_json_file("splash.json") {
            tracing::info!(target: "splash", "Loaded config from splash.json");
            return config;
        }

        tracing::info!(target: "splash", "Using default configuration");
        Self::default()
    }
}

/// 资源路径配置
///
/// 静态遮罩纹理与滚动扭曲纹理来自同一张图片，只是采样的寻址模式不同。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// 溅射网格（glTF/GLB）
    pub mesh_path: String,
    /// 溅射纹理（RGBA）
    pub splash_texture_path: String,
}

impl_default!(AssetConfig {
    mesh_path: "assets/splash2.glb".to_string(),
    splash_texture_path: "textures/splash.png".to_string(),
});

impl AssetConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.mesh_path.trim().is_empty() {
            return Err(ConfigError::ValidationError("Empty mesh path".to_string()));
        }
        if self.splash_texture_path.trim().is_empty() {
            return Err(ConfigError::ValidationError("Empty texture path".to_string()));
        }
        Ok(())
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 解析不区分大小写的级别名
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}
