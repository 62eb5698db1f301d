use bevy_ecs::prelude::*;

use super::effect::{FrameOutcome, SplashEffect};

/// 宿主每帧写入的时间戳（毫秒，单调递增）
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FrameClock {
    pub timestamp_ms: f64,
}

impl FrameClock {
    /// 前进一帧
    pub fn advance(&mut self, delta_ms: f64) {
        self.timestamp_ms += delta_ms;
    }
}

/// 溅射系统 - 每帧推进所有特效
pub fn splash_frame_system(clock: Res<FrameClock>, mut query: Query<(Entity, &mut SplashEffect)>) {
    for (entity, mut effect) in query.iter_mut() {
        if let FrameOutcome::Stepped(report) = effect.on_frame(clock.timestamp_ms) {
            if report.recycled > 0 {
                tracing::trace!(
                    target: "splash",
                    entity = ?entity,
                    recycled = report.recycled,
                    "Splash frame"
                );
            }
        }
    }
}
