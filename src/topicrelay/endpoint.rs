use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::topicrelay::types::{Message, Topic};

/// Receiving side of a topic
pub trait Subscriber<T>: Send + Sync {
    /// Called synchronously by the publisher the subscriber is bound to
    fn receive(&self, message: &Message<T>) -> Result<()>;
}

/// Sending side of a topic
pub trait Publisher<T>: Send + Sync {
    /// Delivers `message` to the subscriber bound at construction time
    fn publish(&self, message: &Message<T>) -> Result<()>;
}

/// Shared handle that compares by identity, not by value.
///
/// Two handles are equal only if they point at the same allocation. This is
/// the equality the registries use when removing a subscriber or publisher.
pub struct Shared<S: ?Sized>(Arc<S>);

pub type SubscriberRef<T> = Shared<dyn Subscriber<T>>;
pub type PublisherRef<T> = Shared<dyn Publisher<T>>;

impl<S: ?Sized> Shared<S> {
    pub fn as_arc(&self) -> &Arc<S> {
        &self.0
    }
}

impl<T: 'static> Shared<dyn Subscriber<T>> {
    pub fn new<S: Subscriber<T> + 'static>(subscriber: S) -> Self {
        Self(Arc::new(subscriber))
    }

    /// Wraps an existing `Arc`, so the caller keeps a typed handle to the same subscriber
    pub fn from_arc<S: Subscriber<T> + 'static>(subscriber: Arc<S>) -> Self {
        Self(subscriber)
    }
}

impl<T: 'static> Shared<dyn Publisher<T>> {
    pub fn new<P: Publisher<T> + 'static>(publisher: P) -> Self {
        Self(Arc::new(publisher))
    }

    pub fn from_arc<P: Publisher<T> + 'static>(publisher: Arc<P>) -> Self {
        Self(publisher)
    }
}

impl<S: ?Sized> Clone for Shared<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S: ?Sized> PartialEq for Shared<S> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<S: ?Sized> Eq for Shared<S> {}

impl<S: ?Sized> Deref for Shared<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.0
    }
}

impl<S: ?Sized> fmt::Debug for Shared<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({:p})", Arc::as_ptr(&self.0))
    }
}

/// Publisher handed out by the broker.
///
/// The subscriber is resolved once, when the publisher is built. Replacing or
/// unregistering the topic's subscriber later does not affect this publisher.
pub struct TopicPublisher<T> {
    topic: Topic,
    subscriber: Option<SubscriberRef<T>>,
}

impl<T> TopicPublisher<T> {
    pub fn new(topic: Topic, subscriber: Option<SubscriberRef<T>>) -> Self {
        Self { topic, subscriber }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// True if a subscriber was registered when this publisher was created
    pub fn is_bound(&self) -> bool {
        self.subscriber.is_some()
    }
}

impl<T: 'static> Publisher<T> for TopicPublisher<T> {
    fn publish(&self, message: &Message<T>) -> Result<()> {
        match &self.subscriber {
            Some(subscriber) => {
                debug!("Publishing message {} on topic {:?}", message.id, self.topic.name);
                subscriber.receive(message)
            }
            None => {
                debug!(
                    "No subscriber bound for topic {:?}, dropping message {}",
                    self.topic.name, message.id
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::error::{ErrorCode, RelayError};

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Message<u32>>>,
    }

    impl Subscriber<u32> for Recorder {
        fn receive(&self, message: &Message<u32>) -> Result<()> {
            self.seen.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct Failing;

    impl Subscriber<u32> for Failing {
        fn receive(&self, _message: &Message<u32>) -> Result<()> {
            Err(RelayError::new(ErrorCode::SubscriberFailed, "rejected"))
        }
    }

    fn topic() -> Topic {
        Topic {
            name: "numbers".into(),
            id: "0".into(),
        }
    }

    #[test]
    fn test_shared_equality_is_identity() {
        let a = Arc::new(Recorder::default());
        let h1 = SubscriberRef::<u32>::from_arc(a.clone());
        let h2 = SubscriberRef::<u32>::from_arc(a);
        let h3 = SubscriberRef::<u32>::new(Recorder::default());

        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert_eq!(h1.clone(), h1);
    }

    #[test]
    fn test_bound_publisher_delivers_unchanged() {
        let recorder = Arc::new(Recorder::default());
        let publisher = TopicPublisher::new(topic(), Some(SubscriberRef::from_arc(recorder.clone())));
        let msg = Message::new(5u32, "t1", "1");

        assert!(publisher.is_bound());
        publisher.publish(&msg).unwrap();
        assert_eq!(*recorder.seen.lock().unwrap(), vec![msg]);
    }

    #[test]
    fn test_unbound_publisher_is_noop() {
        let publisher: TopicPublisher<u32> = TopicPublisher::new(topic(), None);
        assert!(!publisher.is_bound());
        assert!(publisher.publish(&Message::new(1, "t", "i")).is_ok());
        assert_eq!(publisher.topic().name, "numbers");
    }

    #[test]
    fn test_subscriber_error_propagates() {
        let publisher = TopicPublisher::new(topic(), Some(SubscriberRef::new(Failing)));
        let err = publisher.publish(&Message::new(1, "t", "i")).unwrap_err();
        assert!(err.is(ErrorCode::SubscriberFailed));
    }
}
