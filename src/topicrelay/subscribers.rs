//! Ready-made [`Subscriber`] implementations.
//!
//! - [`FnSubscriber`] runs a closure for every message.
//! - [`ChannelSubscriber`] forwards every message into a tokio channel, for
//!   consumers that live on an async task.

use std::marker::PhantomData;

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::error::{ErrorCode, RelayError, Result};
use crate::topicrelay::endpoint::Subscriber;
use crate::topicrelay::types::Message;

/// Closure-backed subscriber
pub struct FnSubscriber<T, F> {
    f: F,
    _payload: PhantomData<fn(&Message<T>)>,
}

impl<T, F> FnSubscriber<T, F>
where
    F: Fn(&Message<T>) -> Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _payload: PhantomData,
        }
    }
}

impl<T, F> Subscriber<T> for FnSubscriber<T, F>
where
    F: Fn(&Message<T>) -> Result<()> + Send + Sync,
{
    fn receive(&self, message: &Message<T>) -> Result<()> {
        (self.f)(message)
    }
}

/// Forwards received messages into an unbounded tokio channel
pub struct ChannelSubscriber<T> {
    tx: mpsc::UnboundedSender<Message<T>>,
}

impl<T> ChannelSubscriber<T> {
    /// Creates the subscriber and the receiving half of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Message<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T: Clone + Send> Subscriber<T> for ChannelSubscriber<T> {
    fn receive(&self, message: &Message<T>) -> Result<()> {
        debug!("Forwarding message {} into channel", message.id);
        self.tx.send(message.clone()).map_err(|_| {
            warn!("Receiver dropped, message {} not forwarded", message.id);
            RelayError::new(
                ErrorCode::ChannelClosed,
                format!("Receiver dropped before message {}", message.id),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_fn_subscriber_runs_closure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sub = FnSubscriber::new(move |msg: &Message<String>| {
            assert_eq!(msg.data, "hello");
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        sub.receive(&Message::new("hello".to_string(), "t", "1")).unwrap();
        sub.receive(&Message::new("hello".to_string(), "t", "2")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_channel_subscriber_forwards() {
        let (sub, mut rx) = ChannelSubscriber::channel();
        let msg = Message::new(vec![1u8, 2, 3], "t", "1");

        sub.receive(&msg).unwrap();
        assert_eq!(rx.recv().await, Some(msg));
    }

    #[tokio::test]
    async fn test_channel_subscriber_closed_receiver() {
        let (sub, rx) = ChannelSubscriber::<u32>::channel();
        drop(rx);

        assert!(sub.is_closed());
        let err = sub.receive(&Message::new(1, "t", "1")).unwrap_err();
        assert!(err.is(ErrorCode::ChannelClosed));
    }
}
