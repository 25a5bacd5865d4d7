//! # View Runtime
//!
//! Replays a recorded post fixture through a live `PostView` and prints the
//! final ranking.
//!
//! ```text
//! view-runtime <fixture.json>
//! ```
//!
//! Logging is configured through `SYNC_LOG_LEVEL`, `SYNC_JSON_LOGS` and
//! `SYNC_CONSOLE_OUTPUT`. `SYNC_FEED_CAPACITY` sizes the replay bus.

use anyhow::{Context, Result};
use sync_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use tracing::{debug, info};
use view_runtime::{replay, Fixture, ReplayOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::for_component("view-runtime"))
        .context("failed to initialize telemetry")?;

    let path = std::env::args()
        .nth(1)
        .context("usage: view-runtime <fixture.json>")?;
    let fixture = Fixture::load(&path)?;
    info!(fixture = %path, post_id = %fixture.post_id, "Loaded fixture");

    let state = replay(fixture, ReplayOptions::from_env()).await?;

    println!("post {} (revision {})", state.post_id, state.ranking.revision);
    for (position, (option, is_highest)) in state.ranked_options().enumerate() {
        println!(
            "{:>3}. #{:<6} {:>8} {:<12} {}",
            position + 1,
            option.id,
            option.support_metric,
            option.creator_id.as_deref().unwrap_or("-"),
            if is_highest { "highest" } else { "" },
        );
    }

    match encode_metrics() {
        Ok(metrics) => debug!("{}", metrics),
        Err(e) => debug!(error = %e, "Metrics unavailable"),
    }

    Ok(())
}
