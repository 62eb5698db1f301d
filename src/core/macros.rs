//! 核心宏定义

/// 以字段默认值实现 `Default`，用于配置结构体
///
/// ```rust
/// use splash_fx::impl_default;
///
/// struct FrameRun {
///     frames: u64,
///     label: String,
/// }
///
/// impl_default!(FrameRun {
///     frames: 120,
///     label: "headless".to_string(),
/// });
///
/// assert_eq!(FrameRun::default().frames, 120);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}
