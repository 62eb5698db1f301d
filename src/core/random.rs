//! 随机数源抽象
//!
//! 粒子回收时需要均匀分布的随机值。通过 `RandomSource` 注入随机源，
//! 测试中可以使用固定种子或固定序列获得确定的结果。

use std::ops::Range;

use rand::Rng;

/// 均匀随机数源
pub trait RandomSource {
    /// 返回半开区间 `[range.start, range.end)` 内的均匀随机值
    fn uniform(&mut self, range: Range<f32>) -> f32;
}

impl<R: Rng> RandomSource for R {
    #[inline]
    fn uniform(&mut self, range: Range<f32>) -> f32 {
        if range.start >= range.end {
            return range.start;
        }
        self.gen_range(range)
    }
}
