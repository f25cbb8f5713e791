//! Dispatch engine configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Fallback order used when a recipient has no preference.
    pub default_order: Vec<String>,
    /// Retries per channel after the initial attempt.
    pub max_retries: u32,
    /// First backoff delay; doubles per failed attempt.
    pub base_backoff: Duration,
    /// Backoff ceiling.
    pub max_backoff: Duration,
    /// Per-attempt send timeout handed to channels.
    pub send_timeout: Duration,
    /// Duplicate-suppression window.
    pub dedup_ttl: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_order: vec![
                "email".to_string(),
                "telegram".to_string(),
                "sms".to_string(),
            ],
            max_retries: 2,
            base_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            send_timeout: Duration::from_secs(5),
            dedup_ttl: Duration::from_secs(600),
        }
    }
}

impl DispatchConfig {
    /// Defaults overridden from `NOTIFY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("NOTIFY_DEFAULT_ORDER") {
            config.default_order = parse_order("NOTIFY_DEFAULT_ORDER", &raw)?;
        }
        if let Ok(raw) = std::env::var("NOTIFY_MAX_RETRIES") {
            config.max_retries = parse_var("NOTIFY_MAX_RETRIES", &raw)?;
        }
        if let Ok(raw) = std::env::var("NOTIFY_BASE_BACKOFF_MS") {
            config.base_backoff = Duration::from_millis(parse_var("NOTIFY_BASE_BACKOFF_MS", &raw)?);
        }
        if let Ok(raw) = std::env::var("NOTIFY_SEND_TIMEOUT_SECS") {
            config.send_timeout = Duration::from_secs(parse_var("NOTIFY_SEND_TIMEOUT_SECS", &raw)?);
        }
        if let Ok(raw) = std::env::var("NOTIFY_DEDUP_TTL_SECS") {
            config.dedup_ttl = Duration::from_secs(parse_var("NOTIFY_DEDUP_TTL_SECS", &raw)?);
        }

        Ok(config)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{e}"),
    })
}

fn parse_order(key: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let order: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if order.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "expected a comma-separated list of channel names".to_string(),
        });
    }
    Ok(order)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = DispatchConfig::default();
        assert_eq!(config.default_order, ["email", "telegram", "sms"]);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.base_backoff, Duration::from_secs(1));
        assert_eq!(config.max_backoff, Duration::from_secs(10));
        assert_eq!(config.dedup_ttl, Duration::from_secs(600));
    }

    #[test]
    fn parse_order_splits_and_trims() {
        let order = parse_order("NOTIFY_DEFAULT_ORDER", "telegram, sms ,email").unwrap();
        assert_eq!(order, ["telegram", "sms", "email"]);
    }

    #[test]
    fn parse_order_rejects_empty() {
        assert!(parse_order("NOTIFY_DEFAULT_ORDER", " , ").is_err());
    }

    #[test]
    fn parse_var_rejects_garbage() {
        let err = parse_var::<u32>("NOTIFY_MAX_RETRIES", "lots").unwrap_err();
        assert!(err.to_string().contains("NOTIFY_MAX_RETRIES"));
    }
}
