//! Queue transport for the annotations mapper.
//!
//! Talks to the message broker through its REST proxy:
//!
//! - [`message`] is the header/body message model and outbound header rules.
//! - [`envelope`] encodes messages in the `FTMSG/1.0` text envelope.
//! - [`proxy`] wraps the proxy's topic and consumer endpoints.
//! - [`producer`] publishes with retry and reports connectivity.
//! - [`handler`] filters, maps and forwards one inbound message.
//! - [`consumer`] is the long-running poll loop.

pub mod consumer;
pub mod envelope;
pub mod handler;
pub mod message;
pub mod producer;
pub mod proxy;

pub use consumer::{BackoffConfig, ConsumerConfig};
pub use handler::{HandleError, HandleOutcome, QueueHandler};
pub use message::Message;
pub use producer::{ConnectivityCheck, MessageProducer, ProxyProducer, TopicProbe};
pub use proxy::{ProxyClient, ProxyEndpoint, QueueError};
