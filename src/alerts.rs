//! Alert sink: best-effort webhook delivery of health transitions.
//!
//! Delivery is fire-and-forget. The sink never retries, never blocks probing
//! on failure, and ignores the response beyond logging it.

use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::actors::messages::Transition;
use crate::config::{AlertSinkConfig, TargetConfig};

#[derive(Debug, Clone)]
pub struct AlertSink {
    client: Client,
    config: AlertSinkConfig,
}

impl AlertSink {
    pub fn new(config: AlertSinkConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Alert text for a transition of the given target.
    pub fn render(spec: &TargetConfig, transition: Transition) -> String {
        match transition {
            Transition::TimedOut => format!(
                "{} [{}] timed out after {}ms.",
                spec.name, spec.url, spec.timeout
            ),
            Transition::Down => format!("{} [{}] is down.", spec.name, spec.url),
            Transition::Up => format!("{} [{}] is up.", spec.name, spec.url),
        }
    }

    /// Deliver one transition alert to the configured webhook.
    #[instrument(skip(self, spec), fields(target = %spec.id))]
    pub async fn notify(&self, spec: &TargetConfig, transition: Transition) {
        if self.config.url.is_empty() {
            debug!("no alert sink configured, dropping {transition:?} alert");
            return;
        }

        let text = Self::render(spec, transition);
        let payload = json!({
            "username": self.config.username,
            "icon_emoji": self.config.icon_emoji,
            "channel": self.config.channel,
            "text": text,
        });

        match self.client.post(&self.config.url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!("delivered alert: {text}");
            }
            Ok(response) => {
                error!("alert sink responded with status {}", response.status());
            }
            Err(e) => {
                error!("failed to deliver alert: {e}");
            }
        }
    }
}
