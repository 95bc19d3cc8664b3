use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::topicrelay::types::Topic;

/// How topic ids are generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicIdStrategy {
    /// "0", "1", "2", ... never reused, even after a delete
    #[default]
    Sequence,
    /// Random v4 UUIDs
    Uuid,
}

/// Stores topics in creation order. Names need not be unique.
pub struct TopicRegistry {
    topics: RwLock<Vec<Topic>>,
    strategy: TopicIdStrategy,
    next_seq: AtomicU64,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new(TopicIdStrategy::default())
    }
}

impl TopicRegistry {
    pub fn new(strategy: TopicIdStrategy) -> Self {
        Self {
            topics: RwLock::new(Vec::new()),
            strategy,
            next_seq: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> String {
        match self.strategy {
            TopicIdStrategy::Sequence => self.next_seq.fetch_add(1, Ordering::Relaxed).to_string(),
            TopicIdStrategy::Uuid => Uuid::new_v4().to_string(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Topic>> {
        self.topics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Topic>> {
        self.topics.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a new topic. A name that already exists gets a second entry.
    pub fn create_topic(&self, name: &str) -> Topic {
        let topic = Topic {
            name: name.to_string(),
            id: self.next_id(),
        };

        let mut topics = self.write();
        if topics.iter().any(|t| t.name == name) {
            debug!("Topic name {:?} already exists, adding another entry", name);
        }
        topics.push(topic.clone());

        info!("Created topic {:?} with id {}", topic.name, topic.id);
        topic
    }

    /// Removes every topic called `name` and returns how many were removed
    pub fn delete_topic(&self, name: &str) -> usize {
        let mut topics = self.write();
        let before = topics.len();
        topics.retain(|t| t.name != name);
        let removed = before - topics.len();

        if removed == 0 {
            debug!("No topic {:?} to delete", name);
        } else {
            info!("Deleted {} topic(s) named {:?}", removed, name);
        }
        removed
    }

    /// First topic called `name`, if any
    pub fn get_topic(&self, name: &str) -> Option<Topic> {
        let found = self.read().iter().find(|t| t.name == name).cloned();
        debug!("Lookup topic {:?}: found = {}", name, found.is_some());
        found
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().iter().any(|t| t.name == name)
    }

    /// Snapshot of all topics in creation order
    pub fn topics(&self) -> Vec<Topic> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_create_and_get() {
        let registry = TopicRegistry::default();
        let created = registry.create_topic("orders");

        assert_eq!(created.name, "orders");
        assert_eq!(created.id, "0");
        assert_eq!(registry.get_topic("orders"), Some(created));
        assert_eq!(registry.get_topic("missing"), None);
    }

    #[test]
    fn test_duplicate_names_first_match_wins() {
        let registry = TopicRegistry::default();
        let first = registry.create_topic("dup");
        let second = registry.create_topic("dup");

        assert_ne!(first.id, second.id);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_topic("dup"), Some(first));
    }

    #[test]
    fn test_delete_removes_all_with_name() {
        let registry = TopicRegistry::default();
        registry.create_topic("dup");
        registry.create_topic("keep");
        registry.create_topic("dup");

        assert_eq!(registry.delete_topic("dup"), 2);
        assert_eq!(registry.get_topic("dup"), None);
        assert!(registry.contains("keep"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let registry = TopicRegistry::default();
        registry.create_topic("a");
        assert_eq!(registry.delete_topic("b"), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sequence_ids_not_reused_after_delete() {
        let registry = TopicRegistry::default();
        let a = registry.create_topic("a");
        let b = registry.create_topic("b");
        registry.delete_topic("b");
        let c = registry.create_topic("c");

        let ids: HashSet<String> = [a.id, b.id, c.id].into_iter().collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_uuid_ids() {
        let registry = TopicRegistry::new(TopicIdStrategy::Uuid);
        let a = registry.create_topic("a");
        let b = registry.create_topic("a");

        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_topics_keep_creation_order() {
        let registry = TopicRegistry::default();
        for name in ["c", "a", "b"] {
            registry.create_topic(name);
        }
        let names: Vec<String> = registry.topics().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
