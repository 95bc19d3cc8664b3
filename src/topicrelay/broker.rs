use std::any::type_name;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::anymap::AnyMap;
use crate::error::{ErrorCode, RelayError, Result};
use crate::topicrelay::endpoint::{PublisherRef, SubscriberRef, TopicPublisher};
use crate::topicrelay::topics::{TopicIdStrategy, TopicRegistry};
use crate::topicrelay::types::Topic;

/// Lifecycle of a broker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerState {
    Created,
    Running,
    Stopped,
}

impl fmt::Display for BrokerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Subscriber and publisher slots, keyed by topic name
#[derive(Default)]
struct Slots {
    subscribers: AnyMap,
    publishers: AnyMap,
}

/// Routes typed messages between publishers and subscribers of named topics.
///
/// Each topic name has exactly one subscriber slot; registering a second
/// subscriber under the same name replaces the first. Publishers capture the
/// slot's subscriber when they are created and keep delivering to it.
pub struct Broker {
    id: String,
    topics: TopicRegistry,
    slots: Mutex<Slots>,
    state: Mutex<BrokerState>,
    shutdown: CancellationToken,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new("broker", TopicIdStrategy::default())
    }
}

impl Broker {
    pub fn new(id: impl Into<String>, topic_ids: TopicIdStrategy) -> Self {
        Self {
            id: id.into(),
            topics: TopicRegistry::new(topic_ids),
            slots: Mutex::new(Slots::default()),
            state: Mutex::new(BrokerState::Created),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lifecycle(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Puts `subscriber` into the slot of `topic`, replacing any previous one
    pub fn register_subscriber<T: Send + Sync + 'static>(
        &self,
        subscriber: SubscriberRef<T>,
        topic: &Topic,
    ) {
        info!(
            "Registering {} subscriber on topic {:?}",
            type_name::<T>(),
            topic.name
        );

        let mut slots = self.slots();
        if slots.subscribers.contains(&topic.name) {
            debug!("Replacing existing subscriber on topic {:?}", topic.name);
        }
        slots.subscribers.set(topic.name.clone(), subscriber);
    }

    /// Removes the first slot holding `subscriber`. Returns whether one was found.
    pub fn unregister_subscriber<T: Send + Sync + 'static>(
        &self,
        subscriber: &SubscriberRef<T>,
    ) -> bool {
        let removed = self.slots().subscribers.remove_by_value(subscriber);
        info!(
            "Unregistering {} subscriber: removed = {}",
            type_name::<T>(),
            removed
        );
        removed
    }

    /// Current subscriber of `topic`, if one is registered for payload `T`.
    ///
    /// A subscriber of another payload type under the same name is a `TypeMismatch`.
    pub fn subscriber_for<T: Send + Sync + 'static>(
        &self,
        topic: &Topic,
    ) -> Result<Option<SubscriberRef<T>>> {
        Self::lookup(&self.slots(), topic)
    }

    fn lookup<T: Send + Sync + 'static>(
        slots: &Slots,
        topic: &Topic,
    ) -> Result<Option<SubscriberRef<T>>> {
        match slots.subscribers.get::<SubscriberRef<T>>(&topic.name) {
            Ok(subscriber) => Ok(Some(subscriber)),
            Err(e) if e.is(ErrorCode::KeyNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Builds a publisher for `topic` bound to the subscriber registered right now.
    ///
    /// Without a subscriber the publisher is created unbound and publishing is a
    /// no-op. The publisher is also recorded in the publisher slot of the topic.
    pub fn create_publisher<T: Send + Sync + 'static>(
        &self,
        topic: &Topic,
    ) -> Result<PublisherRef<T>> {
        // lookup and bind under one lock so an unregister cannot slip in between
        let mut slots = self.slots();

        let subscriber = Self::lookup::<T>(&slots, topic)?;
        if subscriber.is_none() {
            debug!(
                "No {} subscriber on topic {:?}, publisher will be unbound",
                type_name::<T>(),
                topic.name
            );
        }

        let publisher = PublisherRef::new(TopicPublisher::new(topic.clone(), subscriber));
        slots.publishers.set(topic.name.clone(), publisher.clone());

        info!(
            "Created {} publisher for topic {:?}",
            type_name::<T>(),
            topic.name
        );
        Ok(publisher)
    }

    /// Like [`Broker::create_publisher`], resolving the topic by name first.
    ///
    /// Returns `None` if no topic has that name.
    pub fn create_publisher_for<T: Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Option<PublisherRef<T>>> {
        match self.topics.get_topic(name) {
            Some(topic) => self.create_publisher(&topic).map(Some),
            None => {
                debug!("Cannot create publisher, no topic {:?}", name);
                Ok(None)
            }
        }
    }

    /// Removes the first publisher slot holding `publisher`
    pub fn unregister_publisher<T: Send + Sync + 'static>(
        &self,
        publisher: &PublisherRef<T>,
    ) -> bool {
        let removed = self.slots().publishers.remove_by_value(publisher);
        info!(
            "Unregistering {} publisher: removed = {}",
            type_name::<T>(),
            removed
        );
        removed
    }

    /// Most recently created publisher of `topic` for payload `T`
    pub fn publisher_for<T: Send + Sync + 'static>(
        &self,
        topic: &Topic,
    ) -> Result<Option<PublisherRef<T>>> {
        match self.slots().publishers.get::<PublisherRef<T>>(&topic.name) {
            Ok(publisher) => Ok(Some(publisher)),
            Err(e) if e.is(ErrorCode::KeyNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn create_topic(&self, name: &str) -> Topic {
        self.topics.create_topic(name)
    }

    pub fn delete_topic(&self, name: &str) -> usize {
        self.topics.delete_topic(name)
    }

    pub fn get_topic(&self, name: &str) -> Option<Topic> {
        self.topics.get_topic(name)
    }

    /// Like [`Broker::get_topic`] but reports absence as `TopicNotFound`
    pub fn require_topic(&self, name: &str) -> Result<Topic> {
        self.topics.get_topic(name).ok_or_else(|| {
            RelayError::new(ErrorCode::TopicNotFound, format!("No topic named {}", name))
        })
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.topics.topics()
    }

    pub fn state(&self) -> BrokerState {
        *self.lifecycle()
    }

    /// Marks the broker as running. Allowed once, before `stop`.
    pub fn start(&self) -> Result<()> {
        let mut state = self.lifecycle();
        match *state {
            BrokerState::Created => {
                *state = BrokerState::Running;
                info!("Broker {} started", self.id);
                Ok(())
            }
            current => {
                warn!("Broker {} start called while {}", self.id, current);
                Err(RelayError::new(
                    ErrorCode::AlreadyStarted,
                    format!("Broker {} is {}", self.id, current),
                ))
            }
        }
    }

    /// Marks the broker as stopped and cancels its shutdown token. Allowed once.
    pub fn stop(&self) -> Result<()> {
        let mut state = self.lifecycle();
        match *state {
            BrokerState::Stopped => {
                warn!("Broker {} stop called twice", self.id);
                Err(RelayError::new(
                    ErrorCode::AlreadyStopped,
                    format!("Broker {} is already stopped", self.id),
                ))
            }
            _ => {
                *state = BrokerState::Stopped;
                self.shutdown.cancel();
                info!("Broker {} stopped", self.id);
                Ok(())
            }
        }
    }

    /// Token cancelled by [`Broker::stop`], for whatever wraps the broker
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
