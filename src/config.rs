use anyhow::{Context, bail};
use tracing::trace;

/// Top-level configuration document.
///
/// Loaded once at startup; targets are handed to the scheduler as-is after
/// [`Config::validate`] has run.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Alert sink destination (webhook). An empty `url` disables delivery.
    #[serde(default)]
    pub alerts: AlertSinkConfig,

    /// Endpoints to monitor.
    pub targets: Vec<TargetConfig>,
}

/// Webhook destination for health-transition alerts.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct AlertSinkConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub icon_emoji: String,
    #[serde(default)]
    pub channel: String,
}

/// Static probe spec for one monitored endpoint.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TargetConfig {
    pub id: String,
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_method")]
    pub method: String,
    /// Probe interval in seconds.
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_method() -> String {
    String::from("GET")
}

fn default_interval() -> u64 {
    15
}

fn default_timeout() -> u64 {
    5000
}

impl Config {
    /// Reject configurations the scheduling model cannot honor.
    ///
    /// A timeout longer than the interval would allow a probe to still be in
    /// flight when its next firing is due, breaking the one-probe-per-target
    /// invariant the alert edge-detection relies on. URL and method strings
    /// are intentionally not checked here: a malformed one surfaces as a
    /// request-construction error on the target, which is a result, not a
    /// startup failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.targets.is_empty() {
            bail!("no targets configured");
        }

        for target in &self.targets {
            if target.interval == 0 {
                bail!("target '{}': interval must be at least 1 second", target.id);
            }
            if target.timeout == 0 {
                bail!("target '{}': timeout must be at least 1ms", target.id);
            }
            let Some(interval_ms) = target.interval.checked_mul(1000) else {
                bail!(
                    "target '{}': interval ({}s) is out of range",
                    target.id,
                    target.interval
                );
            };
            if target.timeout > interval_ms {
                bail!(
                    "target '{}': timeout ({}ms) exceeds interval ({}s), a probe could overlap its successor",
                    target.id,
                    target.timeout,
                    target.interval
                );
            }
        }

        Ok(())
    }
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{path}'"))?;
    let config: Config =
        serde_json::from_str(&file_content).context("invalid configuration file provided")?;
    trace!("loaded config: {config:?}");
    config.validate()?;
    Ok(config)
}
