//! Cache configuration

use super::size::{deserialize_size, parse_size};
use crate::error::{Error, Result};
use crate::events::NotifyPriority;
use serde::{Deserialize, Serialize};

/// Default byte budget (64 MiB)
pub const DEFAULT_MAX_SIZE: u64 = 64 * 1024 * 1024;

/// Source of environment variables, injectable for tests
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> std::result::Result<String, std::env::VarError>;
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnvSource;

impl EnvSource for DefaultEnvSource {
    fn var(&self, key: &str) -> std::result::Result<String, std::env::VarError> {
        std::env::var(key)
    }
}

/// Configuration for a [`ResourceCache`](crate::ResourceCache)
///
/// Serializable so it can live inside an application's settings file.
/// `max_size` accepts either a byte count or a string like `"256MiB"`.
///
/// ```rust
/// use rescache::CacheConfig;
///
/// let config: CacheConfig =
///     serde_json::from_str(r#"{ "max_size": "8MiB", "label": "thumbnails" }"#).unwrap();
/// assert_eq!(config.max_size, 8 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Byte budget for all entries together
    #[serde(deserialize_with = "deserialize_size")]
    pub max_size: u64,

    /// Delivery priority of the cache's change listener
    pub priority: NotifyPriority,

    /// Name used in log output and dumps
    pub label: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            // Invalidate before other listeners re-render from the cache
            priority: NotifyPriority::High,
            label: "cache".into(),
        }
    }
}

impl CacheConfig {
    /// Create a new builder for `CacheConfig`
    ///
    /// # Example
    /// ```rust
    /// use rescache::CacheConfig;
    ///
    /// let config = CacheConfig::builder()
    ///     .label("pixbufs")
    ///     .max_size(32 * 1024 * 1024)
    ///     .build();
    /// assert_eq!(config.label, "pixbufs");
    /// ```
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if the label is empty.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::Config("cache label must not be empty".into()));
        }
        Ok(())
    }

    /// Apply overrides from `{PREFIX}_MAX_SIZE` and `{PREFIX}_PRIORITY`
    ///
    /// The priority accepts `high`, `normal` or `low` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn apply_env(&mut self, prefix: &str, source: &dyn EnvSource) -> Result<()> {
        let prefix = prefix.to_uppercase();

        let size_var = format!("{prefix}_MAX_SIZE");
        if let Ok(value) = source.var(&size_var) {
            self.max_size = parse_size(&value)?;
            log::debug!("{size_var} overrides max_size to {} bytes", self.max_size);
        }

        let priority_var = format!("{prefix}_PRIORITY");
        if let Ok(value) = source.var(&priority_var) {
            self.priority = match value.trim().to_ascii_lowercase().as_str() {
                "high" => NotifyPriority::High,
                "normal" => NotifyPriority::Normal,
                "low" => NotifyPriority::Low,
                _ => {
                    return Err(Error::Config(format!(
                        "{priority_var} must be high, normal or low, got '{value}'"
                    )));
                }
            };
        }
        Ok(())
    }
}

/// Builder for creating `CacheConfig` with a fluent API
#[derive(Debug, Clone, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Set the byte budget
    #[must_use]
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.config.max_size = bytes;
        self
    }

    /// Set the change listener priority
    #[must_use]
    pub fn priority(mut self, priority: NotifyPriority) -> Self {
        self.config.priority = priority;
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    pub fn build(self) -> CacheConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env::VarError;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvSource for MapEnv {
        fn var(&self, key: &str) -> std::result::Result<String, VarError> {
            self.0
                .get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn test_builder_defaults() {
        let config = CacheConfig::builder().build();

        assert_eq!(config.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(config.priority, NotifyPriority::High);
        assert_eq!(config.label, "cache");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_label_is_invalid() {
        let config = CacheConfig::builder().label("  ").build();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_deserialize_numeric_and_text_sizes() {
        let numeric: CacheConfig = serde_json::from_str(r#"{ "max_size": 4096 }"#).unwrap();
        assert_eq!(numeric.max_size, 4096);
        assert_eq!(numeric.label, "cache");

        let text: CacheConfig =
            serde_json::from_str(r#"{ "max_size": "2 KiB", "priority": "Low" }"#).unwrap();
        assert_eq!(text.max_size, 2048);
        assert_eq!(text.priority, NotifyPriority::Low);

        assert!(serde_json::from_str::<CacheConfig>(r#"{ "max_size": "lots" }"#).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env = MapEnv(HashMap::from([
            ("PIXBUF_MAX_SIZE", "16MiB"),
            ("PIXBUF_PRIORITY", "low"),
        ]));
        let mut config = CacheConfig::default();
        config.apply_env("pixbuf", &env).unwrap();

        assert_eq!(config.max_size, 16 * 1024 * 1024);
        assert_eq!(config.priority, NotifyPriority::Low);
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let env = MapEnv(HashMap::from([("APP_PRIORITY", "urgent")]));
        let mut config = CacheConfig::default();
        assert!(config.apply_env("APP", &env).is_err());

        let env = MapEnv(HashMap::from([("APP_MAX_SIZE", "huge")]));
        assert!(matches!(
            config.apply_env("APP", &env),
            Err(Error::InvalidSize(_))
        ));
    }
}
