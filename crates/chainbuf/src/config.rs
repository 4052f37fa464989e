use serde::{Deserialize, Serialize};

/// Configuration for a [`BufferChain`](crate::BufferChain).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Name attached to every tracing event emitted by the chain.
    pub label: String,
    /// Number of chunk slots reserved up front (default: 8).
    pub chunk_capacity: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            label: "chain".to_owned(),
            chunk_capacity: 8,
        }
    }
}

impl ChainConfig {
    /// A default configuration with a custom label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Override the number of chunk slots reserved up front.
    pub fn with_chunk_capacity(mut self, chunk_capacity: usize) -> Self {
        self.chunk_capacity = chunk_capacity;
        self
    }
}
