pub mod broker;
pub mod config;
pub mod endpoint;
pub mod subscribers;
pub mod topics;
pub mod types;

use log::info;

pub use broker::{Broker, BrokerState};
pub use config::BrokerConfig;
pub use endpoint::{Publisher, PublisherRef, Shared, Subscriber, SubscriberRef, TopicPublisher};
pub use subscribers::{ChannelSubscriber, FnSubscriber};
pub use topics::{TopicIdStrategy, TopicRegistry};
pub use types::{Message, Topic};

/// Builds a broker from `config` and creates its configured topics
pub fn init(config: BrokerConfig) -> Broker {
    info!("Initialising broker {}", config.id);

    let broker = Broker::new(config.id, config.topic_ids);
    for name in &config.topics {
        broker.create_topic(name);
    }

    info!("Broker {} ready with {} topic(s)", broker.id(), config.topics.len());
    broker
}
