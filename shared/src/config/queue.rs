//! Notification queue configuration

use serde::{Deserialize, Serialize};

use super::{env_parse, env_string};

/// Queue transport used between the dispatch gateway and the delivery worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackend {
    /// In-process channel consumed by a worker task in the same process
    Memory,
    /// Redis list shared between publisher and worker processes
    Redis,
}

impl std::str::FromStr for QueueBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" | "channel" => Ok(QueueBackend::Memory),
            "redis" => Ok(QueueBackend::Redis),
            _ => Err(format!("Invalid queue backend: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    pub backend: QueueBackend,

    /// Topic the notifications are published to
    pub topic: String,

    /// Buffer size of the in-process channel
    pub capacity: usize,

    /// Seconds a Redis consumer blocks waiting for a message
    pub poll_timeout_seconds: u64,

    /// Run the delivery worker loop inside the API process
    pub embedded_worker: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            backend: QueueBackend::Memory,
            topic: String::from("notifications-topic"),
            capacity: 1024,
            poll_timeout_seconds: 5,
            embedded_worker: true,
        }
    }
}

impl QueueConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env_parse("QUEUE_BACKEND", defaults.backend),
            topic: env_string("PUB_SUB_TOPIC", &defaults.topic),
            capacity: env_parse("QUEUE_CAPACITY", defaults.capacity).max(1),
            poll_timeout_seconds: env_parse("QUEUE_POLL_TIMEOUT_SECONDS", defaults.poll_timeout_seconds)
                .max(1),
            embedded_worker: env_parse("QUEUE_EMBEDDED_WORKER", defaults.embedded_worker),
        }
    }

    /// Fully qualified topic path, namespaced by project
    pub fn topic_path(&self, project_id: &str) -> String {
        format!("projects/{}/topics/{}", project_id, self.topic)
    }
}
