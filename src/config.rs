//! Configuration for the availability scheduler.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Name reported with every availability report (default: "availscan-agent")
    pub agent_name: String,
    /// Upper bound of the reschedule jitter for platforms and servers (default: 60s)
    pub server_jitter: Duration,
    /// Upper bound of the reschedule jitter for services (default: 10m)
    pub service_jitter: Duration,
    /// How long a single provider call may take before it resolves to UNKNOWN (default: 30s)
    pub provider_timeout: Duration,
    /// Period between scheduled scans (default: 30s)
    pub scan_interval: Duration,
    /// Delay before the first scheduled scan (default: 5s)
    pub initial_delay: Duration,
    /// Number of completed scans kept for introspection (default: 10)
    pub scan_history: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            agent_name: "availscan-agent".to_string(),
            server_jitter: Duration::from_secs(60),
            service_jitter: Duration::from_secs(10 * 60),
            provider_timeout: Duration::from_secs(30),
            scan_interval: Duration::from_secs(30),
            initial_delay: Duration::from_secs(5),
            scan_history: 10,
        }
    }
}

impl SchedulerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables (durations in seconds):
    /// - `AVAILSCAN_AGENT_NAME`
    /// - `AVAILSCAN_SERVER_JITTER`
    /// - `AVAILSCAN_SERVICE_JITTER`
    /// - `AVAILSCAN_PROVIDER_TIMEOUT`
    /// - `AVAILSCAN_SCAN_INTERVAL`
    /// - `AVAILSCAN_INITIAL_DELAY`
    /// - `AVAILSCAN_SCAN_HISTORY`
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(name) = env::var("AVAILSCAN_AGENT_NAME") {
            cfg.agent_name = name;
        }

        set_secs("AVAILSCAN_SERVER_JITTER", &mut cfg.server_jitter);
        set_secs("AVAILSCAN_SERVICE_JITTER", &mut cfg.service_jitter);
        set_secs("AVAILSCAN_PROVIDER_TIMEOUT", &mut cfg.provider_timeout);
        set_secs("AVAILSCAN_SCAN_INTERVAL", &mut cfg.scan_interval);
        set_secs("AVAILSCAN_INITIAL_DELAY", &mut cfg.initial_delay);

        if let Ok(history) = env::var("AVAILSCAN_SCAN_HISTORY") {
            if let Ok(history) = history.parse() {
                cfg.scan_history = history;
            }
        }

        cfg
    }
}

fn set_secs(var: &str, target: &mut Duration) {
    if let Some(secs) = env::var(var).ok().and_then(|v| parse_secs(&v)) {
        *target = secs;
    }
}

/// Parse a non-negative number of seconds, fractions allowed.
fn parse_secs(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}
