//! 动画步进器
//!
//! 每帧同步调用一次，分两遍扫描槽位：
//!
//! 1. 回收：`opacity <= 0.05` 的槽位重置为新生状态，每帧最多回收 3 个；
//! 2. 衰减/增长：所有槽位（包括本帧刚回收的）透明度衰减、扭曲与缩放增长。
//!
//! 步进器不做 I/O，不会失败；它只修改数组并标脏，上传交给渲染器。

use std::f32::consts::TAU;

use crate::core::RandomSource;

use super::pool::ParticlePool;

/// 死亡阈值（含等号）
pub const DEATH_THRESHOLD: f32 = 0.05;
/// 每帧最多回收数
pub const MAX_RECYCLES_PER_TICK: usize = 3;
/// 回收后的实例偏移
pub const RESPAWN_POSITION: [f32; 3] = [0.0, 1.0, 0.0];
pub const RESPAWN_OPACITY: f32 = 10.0;
pub const RESPAWN_SCALE: f32 = 0.2;
/// 扭曲初值上界（不含）
pub const RESPAWN_DISTORTION_MAX: f32 = 0.1;
pub const OPACITY_DECAY: f32 = 1.02;
pub const DISTORTION_GROWTH: f32 = 1.02;
pub const SCALE_GROWTH: f32 = 0.002;

/// 单帧步进结果
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// 本帧回收的槽位数（0..=3）
    pub recycled: usize,
    slots: [usize; MAX_RECYCLES_PER_TICK],
}

impl StepReport {
    /// 本帧回收的槽位，按下标升序
    pub fn recycled_slots(&self) -> &[usize] {
        &self.slots[..self.recycled]
    }

    fn push(&mut self, slot: usize) {
        self.slots[self.recycled] = slot;
        self.recycled += 1;
    }
}

/// 推进一帧
pub fn step<R: RandomSource + ?Sized>(pool: &mut ParticlePool, rng: &mut R) -> StepReport {
    let count = pool.particle_count();
    let mut report = StepReport::default();

    // 回收
    for i in 0..count {
        if pool.opacity.get_x(i) <= DEATH_THRESHOLD {
            respawn(pool, i, rng);
            report.push(i);
        }
        if report.recycled >= MAX_RECYCLES_PER_TICK {
            break;
        }
    }

    // 衰减/增长，刚回收的槽位同样参与
    for i in 0..count {
        let opacity = pool.opacity.get_x(i);
        pool.opacity.set_x(i, opacity / OPACITY_DECAY);

        let dx = pool.distortion_x.get_x(i);
        pool.distortion_x.set_x(i, dx * DISTORTION_GROWTH);

        let dy = pool.distortion_y.get_x(i);
        pool.distortion_y.set_x(i, dy * DISTORTION_GROWTH);

        let scale = pool.scales.get_x(i);
        pool.scales.set_x(i, scale + SCALE_GROWTH);
    }

    pool.positions.mark_dirty();
    pool.scales.mark_dirty();
    pool.opacity.mark_dirty();
    pool.distortion_x.mark_dirty();
    pool.distortion_y.mark_dirty();
    pool.rotation_y.mark_dirty();

    if report.recycled > 0 {
        tracing::trace!(target: "splash", slots = ?report.recycled_slots(), "Recycled particles");
    }

    report
}

/// 重置单个槽位；随机抽取顺序为 X 扭曲、Y 扭曲、旋转
fn respawn<R: RandomSource + ?Sized>(pool: &mut ParticlePool, slot: usize, rng: &mut R) {
    let [x, y, z] = RESPAWN_POSITION;
    pool.positions.set_xyz(slot, x, y, z);
    pool.opacity.set_x(slot, RESPAWN_OPACITY);
    pool.scales.set_x(slot, RESPAWN_SCALE);
    pool.distortion_x
        .set_x(slot, rng.uniform(0.0..RESPAWN_DISTORTION_MAX));
    pool.distortion_y
        .set_x(slot, rng.uniform(0.0..RESPAWN_DISTORTION_MAX));
    pool.rotation_y.set_x(slot, rng.uniform(0.0..TAU));
}
