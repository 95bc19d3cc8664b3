use serde::{Deserialize, Serialize};

/// Named channel, identified by the id assigned at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub id: String,
}

/// Envelope carried from a publisher to its subscriber.
///
/// `timestamp` and `id` are opaque and never validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message<T> {
    pub data: T,
    pub timestamp: String,
    pub id: String,
}

impl<T> Message<T> {
    pub fn new(data: T, timestamp: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            data,
            timestamp: timestamp.into(),
            id: id.into(),
        }
    }
}
