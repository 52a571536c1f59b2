//! Runtime configuration.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `ORDER_STORE_BUFFER` | 64 | store mailbox capacity |
//! | `ORDER_REQUEST_TIMEOUT_MS` | 5000 | per-request deadline, `0` disables it |
//! | `LOG_FORMAT` | compact | `compact` or `json` |

use crate::framework::RequestContext;
use std::time::Duration;

pub const DEFAULT_STORE_BUFFER: usize = 64;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub store_buffer: usize,
    pub request_timeout: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            store_buffer: DEFAULT_STORE_BUFFER,
            request_timeout: Some(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)),
            log_format: LogFormat::Compact,
        }
    }
}

impl SystemConfig {
    /// Loads configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let store_buffer = lookup("ORDER_STORE_BUFFER")
            .and_then(|v| v.parse().ok())
            .filter(|size: &usize| *size > 0)
            .unwrap_or(DEFAULT_STORE_BUFFER);
        let timeout_ms = lookup("ORDER_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
        let log_format = lookup("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();

        Self {
            store_buffer,
            request_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            log_format,
        }
    }

    /// A fresh request context carrying the configured deadline.
    pub fn request_context(&self) -> RequestContext {
        match self.request_timeout {
            Some(timeout) => RequestContext::with_timeout(timeout),
            None => RequestContext::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = SystemConfig::from_lookup(lookup(&[]));
        assert_eq!(config.store_buffer, 64);
        assert_eq!(config.request_timeout, Some(Duration::from_millis(5000)));
        assert_eq!(config.log_format, LogFormat::Compact);
    }

    #[test]
    fn reads_overrides() {
        let config = SystemConfig::from_lookup(lookup(&[
            ("ORDER_STORE_BUFFER", "8"),
            ("ORDER_REQUEST_TIMEOUT_MS", "0"),
            ("LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(config.store_buffer, 8);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn ignores_garbage() {
        let config = SystemConfig::from_lookup(lookup(&[
            ("ORDER_STORE_BUFFER", "0"),
            ("ORDER_REQUEST_TIMEOUT_MS", "soon"),
        ]));
        assert_eq!(config.store_buffer, DEFAULT_STORE_BUFFER);
        assert_eq!(config.request_timeout, Some(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)));
    }
}
