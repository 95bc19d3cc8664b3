//! In-process typed publish/subscribe broker.
//!
//! Topics are plain names. Subscribers and publishers of any payload type
//! share one registry per broker and are matched by topic name and exact
//! payload type when a publisher is created.

pub mod anymap;
pub mod error;
pub mod logging;
pub mod topicrelay;

pub use error::{ErrorCode, RelayError, Result};
pub use topicrelay::{
    init, Broker, BrokerConfig, BrokerState, ChannelSubscriber, FnSubscriber, Message, Publisher,
    PublisherRef, Subscriber, SubscriberRef, Topic, TopicIdStrategy,
};
