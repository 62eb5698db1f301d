//! 核心模块
//!
//! 错误类型、日志初始化、随机数源以及通用宏。

pub mod error;
pub mod logging;
pub mod macros;
pub mod random;

pub use error::{
    AssetError, AssetResult, GeometryError, GeometryResult, SplashError, SplashResult,
};
pub use logging::init_logging;
pub use random::RandomSource;
