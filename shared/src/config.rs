use std::time::Duration;
use tracing::warn;

pub struct Config {
    pub upstream_url: String,
    pub request_timeout: Duration,
    pub event_buffer: usize,
}

impl Config {
    const DEFAULT_UPSTREAM_URL: &str = "http://localhost:8112/api/v1/employee";
    const DEFAULT_TIMEOUT_MS: u64 = 5000;
    const DEFAULT_EVENT_BUFFER: usize = 1000;

    pub fn new(upstream_url: impl Into<String>) -> Self {
        Self {
            upstream_url: upstream_url.into(),
            request_timeout: Duration::from_millis(Self::DEFAULT_TIMEOUT_MS),
            event_buffer: Self::DEFAULT_EVENT_BUFFER,
        }
    }

    pub fn from_env() -> Self {
        let upstream_url = std::env::var("ROSTER_UPSTREAM_URL")
            .unwrap_or_else(|_| Self::DEFAULT_UPSTREAM_URL.to_string());
        let timeout_ms = parse_or_default("ROSTER_UPSTREAM_TIMEOUT_MS", Self::DEFAULT_TIMEOUT_MS);
        let event_buffer = parse_or_default("ROSTER_EVENT_BUFFER", Self::DEFAULT_EVENT_BUFFER);

        Self {
            upstream_url: upstream_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_millis(timeout_ms),
            event_buffer: event_buffer.max(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::DEFAULT_UPSTREAM_URL)
    }
}

fn parse_or_default<T>(var: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("{} has unparsable value '{}', using {}", var, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = Config::new("http://directory.test/employee");
        assert_eq!(config.upstream_url, "http://directory.test/employee");
        assert_eq!(config.request_timeout, Duration::from_millis(5000));
        assert_eq!(config.event_buffer, 1000);
    }

    #[test]
    fn test_unset_variable_falls_back() {
        let value: u64 = parse_or_default("ROSTER_TEST_SURELY_UNSET_VARIABLE", 7);
        assert_eq!(value, 7);
    }
}
