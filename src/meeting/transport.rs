//! Outbound side of the chat network.
//!
//! A meeting only ever talks through this trait, so it can run against a
//! real network, the console, or a recorder in tests.

use std::sync::Mutex;
use tracing::debug;

pub trait ChatTransport: Send + Sync {
    /// Say something in the channel.
    fn reply(&self, channel: &str, message: &str);

    /// Message one nick directly.
    fn private_reply(&self, nick: &str, message: &str);

    fn set_topic(&self, channel: &str, topic: &str);

    /// Nicks currently in the channel, if the network can tell.
    fn channel_nicks(&self, _channel: &str) -> Option<Vec<String>> {
        None
    }
}

/// Drops everything. Used for replays.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl ChatTransport for NullTransport {
    fn reply(&self, channel: &str, message: &str) {
        debug!("[{}] (dropped) {}", channel, message);
    }

    fn private_reply(&self, nick: &str, message: &str) {
        debug!("-> {} (dropped) {}", nick, message);
    }

    fn set_topic(&self, channel: &str, topic: &str) {
        debug!("[{}] (dropped topic) {}", channel, topic);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Reply { channel: String, message: String },
    Private { nick: String, message: String },
    Topic { channel: String, topic: String },
}

/// Keeps every outgoing message in order.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Outgoing>>,
    nicks: Option<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report these nicks as the channel members.
    pub fn with_channel_nicks(nicks: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            nicks: Some(nicks.iter().map(|n| n.to_string()).collect()),
        }
    }

    pub fn sent(&self) -> Vec<Outgoing> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Channel replies only.
    pub fn replies(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::Reply { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn private_messages(&self, to: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::Private { nick, message } if nick == to => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn topics(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::Topic { topic, .. } => Some(topic),
                _ => None,
            })
            .collect()
    }

    fn push(&self, outgoing: Outgoing) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(outgoing);
    }
}

impl ChatTransport for RecordingTransport {
    fn reply(&self, channel: &str, message: &str) {
        self.push(Outgoing::Reply {
            channel: channel.to_string(),
            message: message.to_string(),
        });
    }

    fn private_reply(&self, nick: &str, message: &str) {
        self.push(Outgoing::Private {
            nick: nick.to_string(),
            message: message.to_string(),
        });
    }

    fn set_topic(&self, channel: &str, topic: &str) {
        self.push(Outgoing::Topic {
            channel: channel.to_string(),
            topic: topic.to_string(),
        });
    }

    fn channel_nicks(&self, _channel: &str) -> Option<Vec<String>> {
        self.nicks.clone()
    }
}
