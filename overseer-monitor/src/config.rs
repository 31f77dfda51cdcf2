//! Monitor configuration
//!
//! Backend connection settings and the cadences of the two polling loops
//! and the countdown presenter.

use std::time::Duration;

const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
const DEFAULT_JOB_POLL: Duration = Duration::from_millis(3_000);
const DEFAULT_TRAINING_POLL: Duration = Duration::from_millis(1_000);
const DEFAULT_COUNTDOWN: Duration = Duration::from_millis(1_000);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Backend base URL (e.g., "http://localhost:8080")
    pub backend_url: String,

    /// How often the recurring job list is refreshed while a job is running
    pub job_poll_interval: Duration,

    /// How often a tracked training request is polled
    pub training_poll_interval: Duration,

    /// How often countdowns are re-rendered; never touches the network
    pub countdown_interval: Duration,

    /// HTTP request timeout
    pub request_timeout: Duration,
}

impl MonitorConfig {
    /// Creates a new configuration with defaults
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            job_poll_interval: DEFAULT_JOB_POLL,
            training_poll_interval: DEFAULT_TRAINING_POLL,
            countdown_interval: DEFAULT_COUNTDOWN,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - OVERSEER_BACKEND_URL (default: http://localhost:8080)
    /// - OVERSEER_JOB_POLL_MS (default: 3000)
    /// - OVERSEER_TRAINING_POLL_MS (default: 1000)
    /// - OVERSEER_COUNTDOWN_MS (default: 1000)
    /// - OVERSEER_REQUEST_TIMEOUT_SECS (default: 30)
    pub fn from_env() -> anyhow::Result<Self> {
        let backend_url = std::env::var("OVERSEER_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());

        let config = Self {
            backend_url,
            job_poll_interval: env_duration("OVERSEER_JOB_POLL_MS", Duration::from_millis)?
                .unwrap_or(DEFAULT_JOB_POLL),
            training_poll_interval: env_duration(
                "OVERSEER_TRAINING_POLL_MS",
                Duration::from_millis,
            )?
            .unwrap_or(DEFAULT_TRAINING_POLL),
            countdown_interval: env_duration("OVERSEER_COUNTDOWN_MS", Duration::from_millis)?
                .unwrap_or(DEFAULT_COUNTDOWN),
            request_timeout: env_duration("OVERSEER_REQUEST_TIMEOUT_SECS", Duration::from_secs)?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };

        Ok(config)
    }

    /// Replaces the backend URL
    pub fn with_backend_url(mut self, backend_url: impl Into<String>) -> Self {
        self.backend_url = backend_url.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend_url.is_empty() {
            anyhow::bail!("backend_url cannot be empty");
        }

        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://") {
            anyhow::bail!("backend_url must start with http:// or https://");
        }

        if self.job_poll_interval.is_zero() {
            anyhow::bail!("job_poll_interval must be greater than 0");
        }

        if self.training_poll_interval.is_zero() {
            anyhow::bail!("training_poll_interval must be greater than 0");
        }

        if self.countdown_interval.is_zero() {
            anyhow::bail!("countdown_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

/// Reads an integer environment variable as a duration; unset means `None`
fn env_duration(key: &str, unit: fn(u64) -> Duration) -> anyhow::Result<Option<Duration>> {
    match std::env::var(key) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow::anyhow!("{} must be a non-negative integer: {}", key, e))?;
            Ok(Some(unit(value)))
        }
        Err(_) => Ok(None),
    }
}
