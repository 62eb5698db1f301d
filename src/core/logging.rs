//! 日志初始化
//!
//! 配置 tracing 日志框架。`RUST_LOG` 环境变量优先，否则使用配置文件中的级别。

use tracing_subscriber::EnvFilter;

use crate::config::{LogLevel, LoggingConfig};

impl LogLevel {
    /// 转换为 EnvFilter 指令
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 初始化日志系统
///
/// 重复调用是安全的：全局订阅者已存在时直接返回 `false`。
pub fn init_logging(config: &LoggingConfig) -> bool {
    if !config.log_to_console {
        return false;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(target: "splash", "Logging initialized at {:?}", config.level);
    }
    installed
}
