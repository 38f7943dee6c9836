//! Configuration for the outbound query client.
//!
//! Every knob is optional: defaults are tuned for polite scraping of a
//! shared public surface, and each field can be overridden through an
//! environment variable. There is no configuration file; the client is
//! embedded in a larger pipeline that owns its own config story.

use std::path::PathBuf;
use std::time::Duration;

/// Tuning knobs for request pacing, retry behaviour, and the response cache.
///
/// Construct with [`SearchConfig::default`] for the stock profile or
/// [`SearchConfig::from_env`] to honour `PROSPECT_*` environment overrides.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Minimum spacing between consecutive outbound requests.
    pub min_delay: Duration,
    /// Upper bound for the random jitter added to every scheduled wait.
    pub jitter_max: Duration,
    /// Maximum attempts for a single logical request (first try included).
    pub max_retries: u32,
    /// Base delay for exponential retry backoff.
    pub retry_base: Duration,
    /// Ceiling on requests admitted within any trailing 60-second window.
    pub per_minute_cap: usize,
    /// How long every request must wait after a throttling response is seen.
    pub cooldown_period: Duration,
    /// How long a cached response stays servable.
    pub cache_ttl: Duration,
    /// Location of the durable cache file.
    pub cache_path: PathBuf,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(2000),
            jitter_max: Duration::from_millis(1000),
            max_retries: 4,
            retry_base: Duration::from_millis(2000),
            per_minute_cap: 10,
            cooldown_period: Duration::from_secs(60),
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            cache_path: PathBuf::from(".cache/prospect/search-cache.json"),
        }
    }
}

impl SearchConfig {
    /// Build a configuration from the environment, falling back to defaults.
    ///
    /// Supported variables (all optional):
    /// - `PROSPECT_MIN_DELAY_MS`
    /// - `PROSPECT_JITTER_MS`
    /// - `PROSPECT_MAX_RETRIES`
    /// - `PROSPECT_RETRY_BASE_MS`
    /// - `PROSPECT_PER_MINUTE_CAP`
    /// - `PROSPECT_COOLDOWN_MS`
    /// - `PROSPECT_CACHE_TTL_SECS`
    /// - `PROSPECT_CACHE_PATH`
    ///
    /// Unparseable values are ignored in favour of the default.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            min_delay: env_millis("PROSPECT_MIN_DELAY_MS").unwrap_or(defaults.min_delay),
            jitter_max: env_millis("PROSPECT_JITTER_MS").unwrap_or(defaults.jitter_max),
            max_retries: env_parse("PROSPECT_MAX_RETRIES").unwrap_or(defaults.max_retries),
            retry_base: env_millis("PROSPECT_RETRY_BASE_MS").unwrap_or(defaults.retry_base),
            per_minute_cap: env_parse("PROSPECT_PER_MINUTE_CAP")
                .unwrap_or(defaults.per_minute_cap),
            cooldown_period: env_millis("PROSPECT_COOLDOWN_MS")
                .unwrap_or(defaults.cooldown_period),
            cache_ttl: env_parse("PROSPECT_CACHE_TTL_SECS")
                .map_or(defaults.cache_ttl, Duration::from_secs),
            cache_path: std::env::var("PROSPECT_CACHE_PATH")
                .map_or(defaults.cache_path, PathBuf::from),
        };
        tracing::debug!(?config, "resolved search config");
        config
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.parse().ok()
}

fn env_millis(name: &str) -> Option<Duration> {
    env_parse(name).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    // Environment variables are process-global and the harness runs tests
    // on parallel threads; tests that touch them hold this lock so none
    // observes another's half-set environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.min_delay, Duration::from_millis(2000));
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.per_minute_cap, 10);
        assert_eq!(
            config.cache_path,
            PathBuf::from(".cache/prospect/search-cache.json")
        );
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        std::env::set_var("PROSPECT_MIN_DELAY_MS", "50");
        std::env::set_var("PROSPECT_MAX_RETRIES", "2");
        std::env::set_var("PROSPECT_CACHE_PATH", "/tmp/prospect-test.json");

        let config = SearchConfig::from_env();
        assert_eq!(config.min_delay, Duration::from_millis(50));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.cache_path, PathBuf::from("/tmp/prospect-test.json"));
        // Untouched fields keep their defaults
        assert_eq!(config.per_minute_cap, 10);

        std::env::remove_var("PROSPECT_MIN_DELAY_MS");
        std::env::remove_var("PROSPECT_MAX_RETRIES");
        std::env::remove_var("PROSPECT_CACHE_PATH");
    }

    #[test]
    fn test_unparseable_env_falls_back() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        std::env::set_var("PROSPECT_PER_MINUTE_CAP", "lots");
        let config = SearchConfig::from_env();
        assert_eq!(config.per_minute_cap, 10);
        std::env::remove_var("PROSPECT_PER_MINUTE_CAP");
    }
}
