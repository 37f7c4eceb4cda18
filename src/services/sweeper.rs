use std::time::Duration;

use tracing::{debug, warn};

use crate::time;

use super::booking::BookingEngine;

/// Periodically completes reservations whose window has passed.
pub async fn run_sweeper(engine: BookingEngine, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        match engine.release_expired(time::now()).await {
            Ok(released) if released.is_empty() => debug!("no stale reservations"),
            Ok(_) => {}
            Err(err) => warn!("stale reservation sweep failed: {err}"),
        }
    }
}
