//! Discovery configuration and protocol constants.

use std::time::Duration;

/// mDNS service type advertised by Elgato lights.
pub const SERVICE_TYPE: &str = "_elg._tcp.local.";

/// Port the light's REST API listens on.
pub const DEFAULT_PORT: u16 = 9123;

/// Settings for one [`discover`](crate::discover) call.
///
/// Discovery stops listening as soon as `target_count` resolutions have been
/// started or `timeout` has elapsed, whichever comes first. Resolutions
/// already in flight at that point are still awaited.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use elgato_lights_rs::DiscoveryConfig;
///
/// let config = DiscoveryConfig::new()
///     .target_count(2)
///     .timeout(Duration::from_secs(3));
/// assert_eq!(config.get_target_count(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    target_count: Option<usize>,
    timeout: Duration,
    poll_interval: Duration,
    resolve_timeout: Duration,
    service_type: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            target_count: None,
            timeout: Self::DEFAULT_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            resolve_timeout: Self::DEFAULT_RESOLVE_TIMEOUT,
            service_type: SERVICE_TYPE.to_string(),
        }
    }
}

impl DiscoveryConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
    pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(3);

    pub fn new() -> Self {
        Self::default()
    }

    /// Stop listening once this many lights have been seen.
    pub fn target_count(mut self, count: usize) -> Self {
        self.target_count = Some(count);
        self
    }

    /// Upper bound on how long to listen.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How often the listen loop checks the count and timeout.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// How long the mDNS browser waits for a single name to resolve.
    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn service_type(mut self, service_type: &str) -> Self {
        self.service_type = service_type.to_string();
        self
    }

    pub fn get_target_count(&self) -> Option<usize> {
        self.target_count
    }

    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn get_poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn get_resolve_timeout(&self) -> Duration {
        self.resolve_timeout
    }

    pub fn get_service_type(&self) -> &str {
        &self.service_type
    }

    /// Whether the listen loop should keep waiting for more services.
    pub(crate) fn keep_listening(&self, started: usize, elapsed: Duration) -> bool {
        self.target_count.is_none_or(|target| started < target) && elapsed < self.timeout
    }
}
