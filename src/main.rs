use std::sync::Arc;
use std::time::Duration;

use splash_fx::config::SplashConfig;
use splash_fx::core::init_logging;
use splash_fx::render::splash::{EffectStatus, FrameOutcome, SplashAssets, SplashEffect};
use splash_fx::AssetCache;

/// 帧间隔（毫秒）
const FRAME_MS: f64 = 1000.0 / 60.0;
const DEFAULT_FRAMES: u64 = 120;

#[tokio::main]
async fn main() {
    let mut config = SplashConfig::load_or_default();
    config.apply_env_overrides();
    init_logging(&config.logging);

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let frames = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let cache = Arc::new(AssetCache::new());
    let (mut effect, loader) = SplashEffect::bootstrap(SplashAssets::load(cache, config.assets));
    let loader = tokio::spawn(loader);

    let mut recycled = 0;
    for frame in 0..frames {
        let timestamp = frame as f64 * FRAME_MS;
        match effect.on_frame(timestamp) {
            FrameOutcome::Stepped(report) => recycled += report.recycled,
            FrameOutcome::Pending => {}
            FrameOutcome::Inactive => break,
        }
        tokio::time::sleep(Duration::from_secs_f64(FRAME_MS / 1000.0)).await;
    }

    if effect.status() == EffectStatus::Loading {
        loader.abort();
    }

    match effect.status() {
        EffectStatus::Ready => {
            tracing::info!(target: "splash", frames, recycled, time = effect.time(), "Run finished");
        }
        status => {
            eprintln!(
                "Splash effect never became active ({:?}): {}",
                status,
                effect
                    .failure()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "assets not loaded".to_string())
            );
            std::process::exit(1);
        }
    }
}
