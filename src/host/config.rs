//! Host configuration.
//!
//! # Example
//!
//! ```
//! use pvrpc::host::HostConfig;
//!
//! let config = HostConfig::from_json_str(r#"{ "max_channels": 8 }"#).unwrap();
//! assert_eq!(config.max_channels, 8);
//! assert_eq!(config.channel_capacity, 1024);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::handler::DEFAULT_ARRAY_CHUNK_LIMIT;

/// Default maximum concurrently open channels.
pub const DEFAULT_MAX_CHANNELS: usize = 256;

/// Default per-channel request queue capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Settings for a [`ServiceHost`](super::ServiceHost).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Maximum channels open at once.
    pub max_channels: usize,
    /// Requests that may queue on one channel before callers wait.
    pub channel_capacity: usize,
    /// Elements per chunk when services copy arrays out of arguments.
    pub array_chunk_limit: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_channels: DEFAULT_MAX_CHANNELS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            array_chunk_limit: DEFAULT_ARRAY_CHUNK_LIMIT,
        }
    }
}

impl HostConfig {
    /// Parse from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str::<Self>(json)?.normalized())
    }

    /// Raise zero limits to 1.
    pub fn normalized(mut self) -> Self {
        self.max_channels = self.max_channels.max(1);
        self.channel_capacity = self.channel_capacity.max(1);
        self.array_chunk_limit = self.array_chunk_limit.max(1);
        self
    }
}
