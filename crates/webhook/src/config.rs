use std::time::Duration;

use interceptor::Settings;

/// Worker threads used for delivery when not configured otherwise.
pub const DEFAULT_WORKER_THREADS: usize = 2;

/// Transport settings for a [`crate::WebhookDispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Absolute `http` or `https` endpoint.
    pub url: String,
    /// Bound on each request, connection included.
    pub timeout: Duration,
    /// Size of the delivery worker pool.
    pub worker_threads: usize,
    /// Log the outcome of every delivery.
    pub diagnostics: bool,
}

impl WebhookConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            url: settings.url.clone(),
            timeout: settings.timeout,
            worker_threads: DEFAULT_WORKER_THREADS,
            diagnostics: settings.debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_setting_enables_diagnostics() {
        let settings = Settings {
            debug: true,
            send_body: true,
            url: "http://hooks.example.com".to_string(),
            token: "t".to_string(),
            timeout: Duration::from_secs(3),
        };

        let config = WebhookConfig::from_settings(&settings);
        assert!(config.diagnostics);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.url, "http://hooks.example.com");
        assert_eq!(config.worker_threads, DEFAULT_WORKER_THREADS);
    }
}
