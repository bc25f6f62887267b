//! Live meetings keyed by (channel, network).

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use tracing::info;

use super::error::RegistryError;
use super::Meeting;

/// How many started meetings `recent()` remembers.
pub const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeetingKey {
    pub channel: String,
    pub network: String,
}

impl MeetingKey {
    pub fn new(channel: &str, network: &str) -> Self {
        Self {
            channel: channel.to_string(),
            network: network.to_string(),
        }
    }
}

impl fmt::Display for MeetingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.channel, self.network)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentMeeting {
    pub key: MeetingKey,
    pub started_at: DateTime<Utc>,
}

/// Holds at most one live meeting per key.
#[derive(Default)]
pub struct MeetingRegistry {
    meetings: BTreeMap<MeetingKey, Meeting>,
    recent: VecDeque<RecentMeeting>,
}

impl MeetingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new meeting. Fails if one is already live for the key.
    pub fn insert(&mut self, key: MeetingKey, meeting: Meeting) -> Result<&mut Meeting, RegistryError> {
        if self.meetings.contains_key(&key) {
            return Err(RegistryError::AlreadyActive(key.to_string()));
        }

        info!("Registered meeting {}", key);
        self.recent.push_back(RecentMeeting {
            key: key.clone(),
            started_at: Utc::now(),
        });
        while self.recent.len() > RECENT_LIMIT {
            self.recent.pop_front();
        }

        Ok(self.meetings.entry(key).or_insert(meeting))
    }

    pub fn get(&self, key: &MeetingKey) -> Option<&Meeting> {
        self.meetings.get(key)
    }

    pub fn get_mut(&mut self, key: &MeetingKey) -> Option<&mut Meeting> {
        self.meetings.get_mut(key)
    }

    pub fn contains(&self, key: &MeetingKey) -> bool {
        self.meetings.contains_key(key)
    }

    pub fn remove(&mut self, key: &MeetingKey) -> Result<Meeting, RegistryError> {
        let meeting = self
            .meetings
            .remove(key)
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))?;
        info!("Removed meeting {}", key);
        Ok(meeting)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &MeetingKey> {
        self.meetings.keys()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&MeetingKey, &mut Meeting)> {
        self.meetings.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.meetings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meetings.is_empty()
    }

    /// Recently started meetings, oldest first, with whether each is still live.
    pub fn recent(&self) -> impl Iterator<Item = (&RecentMeeting, bool)> {
        self.recent
            .iter()
            .map(|recent| (recent, self.meetings.contains_key(&recent.key)))
    }
}
