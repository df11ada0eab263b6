//! Cache configuration
//!
//! - `CacheConfig` - budget, listener priority and label of a cache
//! - `parse_size` - human-readable byte sizes (`"64MiB"`)
//! - `EnvSource` - environment variable overrides

mod size;
mod types;

pub use size::parse_size;
pub use types::{CacheConfig, CacheConfigBuilder, DEFAULT_MAX_SIZE, DefaultEnvSource, EnvSource};
