use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SpotEvent {
    pub event: &'static str,
    pub spot_id: i64,
    pub status: &'static str,
}

impl SpotEvent {
    pub fn update(spot_id: i64, status: &'static str) -> Self {
        Self {
            event: "update",
            spot_id,
            status,
        }
    }
}

/// Best-effort change signal to the subscriber feed. Each call spawns its own
/// delivery task; failures are logged at debug level and otherwise dropped.
#[derive(Clone, Default)]
pub struct Notifier {
    target: Option<Subscriber>,
}

#[derive(Clone)]
struct Subscriber {
    client: reqwest::Client,
    endpoint: Url,
}

impl Notifier {
    /// Builds a notifier for `endpoint`. A client that cannot be built (for
    /// example a broken TLS backend) leaves the notifier disabled and says so.
    pub fn new(endpoint: Option<Url>, timeout: Duration) -> Self {
        let Some(endpoint) = endpoint else {
            return Self::disabled();
        };
        match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => Self {
                target: Some(Subscriber { client, endpoint }),
            },
            Err(err) => {
                warn!(%endpoint, "notifications disabled, http client unavailable: {err}");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    pub fn notify(&self, spot_id: i64) {
        self.notify_with_status(spot_id, "changed");
    }

    pub fn notify_with_status(&self, spot_id: i64, status: &'static str) {
        let Some(Subscriber { client, endpoint }) = self.target.clone() else {
            return;
        };
        let event = SpotEvent::update(spot_id, status);
        tokio::spawn(async move {
            match client.post(endpoint).json(&event).send().await {
                Ok(res) if res.status().is_success() => {}
                Ok(res) => debug!(spot_id, status = %res.status(), "subscriber rejected update"),
                Err(err) => debug!(spot_id, "subscriber unreachable: {err}"),
            }
        });
    }
}
