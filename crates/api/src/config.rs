use std::time::Duration;

/// Startup configuration problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Q_ADDR must list at least one queue address")]
    NoQueueAddresses,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Queue proxy settings shared by the consumer and producer.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Proxy base URLs. Consumers run against each; the producer uses the first.
    pub addrs: Vec<String>,
    pub group: String,
    pub read_topic: String,
    /// `Host` header used when reading.
    pub read_queue: String,
    pub write_topic: String,
    /// `Host` header used when writing.
    pub write_queue: String,
    pub authorization: Option<String>,
    /// Pause after an empty poll.
    pub poll_interval: Duration,
}

impl QueueConfig {
    /// Address the producer writes to.
    pub fn producer_addr(&self) -> Option<&str> {
        self.addrs.first().map(String::as_str)
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against a proxy
/// on `localhost:8080`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub service_name: String,
    pub app_name: String,
    pub system_code: String,
    pub panic_guide: String,
    pub queue: QueueConfig,
    /// HTTP request timeout in seconds (default: `10`).
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                  |
    /// |------------------------|------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                |
    /// | `APP_PORT`             | `8084`                                   |
    /// | `SERVICE_NAME`         | `next-video-annotations-mapper`          |
    /// | `APP_NAME`             | `Next Video Annotations Mapper`          |
    /// | `APP_SYSTEM_CODE`      | `next-video-annotations-mapper`          |
    /// | `PANIC_GUIDE`          | `https://runbooks.in.ft.com/up-nvam`     |
    /// | `Q_ADDR`               | `http://localhost:8080` (comma-separated)|
    /// | `Q_GROUP`              | `videoAnnotationsMapper`                 |
    /// | `Q_READ_TOPIC`         | `NativeCmsPublicationEvents`             |
    /// | `Q_READ_QUEUE`         | `kafka`                                  |
    /// | `Q_WRITE_TOPIC`        | `V1ConceptAnnotations`                   |
    /// | `Q_WRITE_QUEUE`        | `kafka`                                  |
    /// | `Q_AUTHORIZATION`      | unset                                    |
    /// | `Q_POLL_INTERVAL_MS`   | `1000`                                   |
    /// | `REQUEST_TIMEOUT_SECS` | `10`                                     |
    /// | `LOG_FORMAT`           | `text`                                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let port = parse_var("APP_PORT", var("APP_PORT", "8084"), "a valid port number")?;

        let addrs: Vec<String> = var("Q_ADDR", "http://localhost:8080")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if addrs.is_empty() {
            return Err(ConfigError::NoQueueAddresses);
        }

        let poll_interval_ms: u64 = parse_var(
            "Q_POLL_INTERVAL_MS",
            var("Q_POLL_INTERVAL_MS", "1000"),
            "a number of milliseconds",
        )?;

        let request_timeout_secs = parse_var(
            "REQUEST_TIMEOUT_SECS",
            var("REQUEST_TIMEOUT_SECS", "10"),
            "a number of seconds",
        )?;

        let log_format = match var("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    expected: "'text' or 'json'",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            service_name: var("SERVICE_NAME", "next-video-annotations-mapper"),
            app_name: var("APP_NAME", "Next Video Annotations Mapper"),
            system_code: var("APP_SYSTEM_CODE", "next-video-annotations-mapper"),
            panic_guide: var("PANIC_GUIDE", "https://runbooks.in.ft.com/up-nvam"),
            queue: QueueConfig {
                addrs,
                group: var("Q_GROUP", "videoAnnotationsMapper"),
                read_topic: var("Q_READ_TOPIC", "NativeCmsPublicationEvents"),
                read_queue: var("Q_READ_QUEUE", "kafka"),
                write_topic: var("Q_WRITE_TOPIC", "V1ConceptAnnotations"),
                write_queue: var("Q_WRITE_QUEUE", "kafka"),
                authorization: lookup("Q_AUTHORIZATION").filter(|a| !a.is_empty()),
                poll_interval: Duration::from_millis(poll_interval_ms),
            },
            request_timeout_secs,
            log_format,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value,
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8084);
        assert_eq!(config.service_name, "next-video-annotations-mapper");
        assert_eq!(config.app_name, "Next Video Annotations Mapper");
        assert_eq!(config.panic_guide, "https://runbooks.in.ft.com/up-nvam");
        assert_eq!(config.queue.addrs, ["http://localhost:8080"]);
        assert_eq!(config.queue.group, "videoAnnotationsMapper");
        assert_eq!(config.queue.read_topic, "NativeCmsPublicationEvents");
        assert_eq!(config.queue.write_topic, "V1ConceptAnnotations");
        assert_eq!(config.queue.read_queue, "kafka");
        assert_eq!(config.queue.authorization, None);
        assert_eq!(config.queue.poll_interval, Duration::from_secs(1));
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn queue_addresses_are_split_and_trimmed() {
        let config = load(&[("Q_ADDR", "http://a:8080, http://b:8080,,")]).unwrap();
        assert_eq!(config.queue.addrs, ["http://a:8080", "http://b:8080"]);
        assert_eq!(config.queue.producer_addr(), Some("http://a:8080"));
    }

    #[test]
    fn empty_queue_addresses_are_rejected() {
        assert_matches!(load(&[("Q_ADDR", " , ")]), Err(ConfigError::NoQueueAddresses));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = load(&[("APP_PORT", "http")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "APP_PORT", .. });
        assert_eq!(err.to_string(), "APP_PORT must be a valid port number, got 'http'");
    }

    #[test]
    fn json_log_format_and_authorization() {
        let config = load(&[("LOG_FORMAT", "JSON"), ("Q_AUTHORIZATION", "Basic xyz")]).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.queue.authorization.as_deref(), Some("Basic xyz"));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert_matches!(
            load(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::Invalid { var: "LOG_FORMAT", .. })
        );
    }
}
