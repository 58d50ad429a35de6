//! Buffer sizing.

use serde::{Deserialize, Serialize};

/// Default buffer capacity in bytes.
pub const DEFAULT_SIZE: usize = 32768;

/// Default number of marker slots.
pub const DEFAULT_MARKERS: usize = 32;

/// Streaming buffer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BufferConfig {
    /// Buffer capacity in bytes; bounds the longest single token.
    /// Default: 32768
    #[serde(default = "default_size")]
    pub size: usize,

    /// Marker table slots.
    /// Default: 32
    #[serde(default = "default_markers")]
    pub markers: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            markers: DEFAULT_MARKERS,
        }
    }
}

impl BufferConfig {
    /// Merge another BufferConfig into this one.
    pub fn merge(&mut self, other: &BufferConfig) {
        self.size = other.size;
        self.markers = other.markers;
    }
}

fn default_size() -> usize {
    DEFAULT_SIZE
}

fn default_markers() -> usize {
    DEFAULT_MARKERS
}
