//! Chat-facing front end.
//!
//! [`MeetBot`] routes channel lines to the live meeting of their
//! (channel, network), creates meetings on `#startmeeting`, forgets them
//! once they are over, and answers private votes and admin requests.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::command::{is_vote_cast, Command, CommandGrammar, ParsedLine};
use crate::config::{Config, ConfigError};
use crate::meeting::{
    ChatTransport, Meeting, MeetingError, MeetingKey, MeetingOptions, MeetingRegistry,
    RegistryError,
};
use crate::normalizer::NormalizedLine;

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Meeting(#[from] MeetingError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub struct MeetBot {
    config: Arc<Config>,
    transport: Arc<dyn ChatTransport>,
    registry: MeetingRegistry,
    grammar: CommandGrammar,
    /// Last known channel topic, restored when a meeting ends.
    topics: BTreeMap<MeetingKey, String>,
}

impl MeetBot {
    pub fn new(
        config: Arc<Config>,
        transport: Arc<dyn ChatTransport>,
        registry: MeetingRegistry,
    ) -> Result<Self, ConfigError> {
        let grammar = CommandGrammar::new(&config.meeting)?;
        Ok(Self {
            config,
            transport,
            registry,
            grammar,
            topics: BTreeMap::new(),
        })
    }

    pub fn registry(&self) -> &MeetingRegistry {
        &self.registry
    }

    /// Remember the channel topic as it was before any meeting touched it.
    pub fn set_channel_topic(&mut self, channel: &str, network: &str, topic: &str) {
        let key = MeetingKey::new(channel, network);
        if !self.registry.contains(&key) {
            self.topics.insert(key, topic.to_string());
        }
    }

    fn is_start(&self, nick: &str, line: &str) -> bool {
        let normalized = NormalizedLine::new(nick, line);
        matches!(
            self.grammar.parse(&normalized.text),
            ParsedLine::Command {
                command: Command::StartMeeting,
                ..
            }
        )
    }

    /// Handle one line said in a channel.
    ///
    /// Lines outside a meeting are ignored unless they start one.
    pub fn handle_channel_line(
        &mut self,
        channel: &str,
        network: &str,
        nick: &str,
        line: &str,
        is_op: bool,
        time: Option<DateTime<Utc>>,
    ) -> Result<(), BotError> {
        let key = MeetingKey::new(channel, network);
        let starting = self.is_start(nick, line);

        if starting && self.registry.contains(&key) {
            self.transport
                .private_reply(nick, "Can't start another meeting, one is in progress");
        } else if starting {
            let options = MeetingOptions {
                owner: Some(nick.to_string()),
                old_topic: self.topics.get(&key).cloned(),
                ..MeetingOptions::default()
            };
            let meeting = Meeting::new(
                channel,
                network,
                options,
                self.config.clone(),
                self.transport.clone(),
            )?;
            self.registry.insert(key.clone(), meeting)?;
        }

        let Some(meeting) = self.registry.get_mut(&key) else {
            return Ok(());
        };
        meeting.add_line(nick, line, is_op, time)?;

        if meeting.is_over() {
            self.registry.remove(&key)?;
            info!("Meeting on {} is over", key);
        }
        Ok(())
    }

    /// Handle a private message to the bot. Only `vote <cast> <#channel>` is understood.
    pub fn handle_private_message(&mut self, nick: &str, text: &str) {
        let text = text.trim();
        let Some(payload) = text
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("vote "))
            .and_then(|_| text.get(5..))
            .map(str::trim)
        else {
            return;
        };
        if !is_vote_cast(payload) {
            return;
        }

        let key = self
            .registry
            .keys()
            .find(|key| payload.ends_with(key.channel.as_str()))
            .cloned();
        let Some(meeting) = key.as_ref().and_then(|key| self.registry.get_mut(key)) else {
            self.transport
                .private_reply(nick, "No active meetings in this channel");
            return;
        };

        match meeting.cast_private_vote(nick, payload) {
            Some(topic) => self
                .transport
                .private_reply(nick, &format!("Received for vote: {}", topic)),
            None => self.transport.private_reply(nick, "No vote in progress"),
        }
    }

    /// Admin: live meetings, sorted by key.
    pub fn list_meetings(&self) -> String {
        if self.registry.is_empty() {
            return "No currently active meetings".to_string();
        }
        self.registry
            .keys()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Admin: save every live meeting without ending it.
    pub fn save_all(&mut self) -> String {
        let mut saved = 0;
        for (key, meeting) in self.registry.iter_mut() {
            match meeting.save_now() {
                Ok(_) => saved += 1,
                Err(e) => warn!("Saving meeting on {} failed: {}", key, e),
            }
        }
        format!("Saved {} meetings", saved)
    }

    /// Admin: grant chair on a live meeting.
    pub fn add_chair(&mut self, channel: &str, network: &str, nick: &str) -> Result<String, BotError> {
        let key = MeetingKey::new(channel, network);
        let meeting = self
            .registry
            .get_mut(&key)
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))?;
        meeting.add_chair(nick);
        Ok(format!("Chair added: {} on {}", nick, key))
    }

    /// Admin: forget a meeting, saving it first when asked.
    pub fn delete_meeting(&mut self, channel: &str, network: &str, save: bool) -> Result<String, BotError> {
        let key = MeetingKey::new(channel, network);
        let mut meeting = self.registry.remove(&key)?;
        if save {
            meeting.save_now()?;
        }
        Ok(format!("Deleted meeting on {}", key))
    }

    /// Admin: the last started meetings and whether they still run.
    pub fn recent(&self) -> String {
        let entries: Vec<String> = self
            .registry
            .recent()
            .map(|(recent, live)| {
                format!(
                    "({}, {}, {}{})",
                    recent.key.channel,
                    recent.key.network,
                    recent.started_at.format("%a %b %e %H:%M:%S %Y"),
                    if live { ", running" } else { "" }
                )
            })
            .collect();
        if entries.is_empty() {
            "No recent meetings in internal state".to_string()
        } else {
            entries.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::RecordingTransport;

    fn bot() -> (MeetBot, Arc<RecordingTransport>) {
        let mut config = Config::default();
        config.output.update_realtime = false;
        // No writers, so nothing reaches the disk.
        config.output.write_raw_log = false;
        config.writers.clear();

        let transport = Arc::new(RecordingTransport::new());
        let bot = MeetBot::new(Arc::new(config), transport.clone(), MeetingRegistry::new()).unwrap();
        (bot, transport)
    }

    fn say(bot: &mut MeetBot, nick: &str, line: &str) {
        bot.handle_channel_line("#dev", "libera", nick, line, false, None)
            .unwrap();
    }

    #[test]
    fn test_lines_outside_meeting_are_ignored() {
        let (mut bot, transport) = bot();
        say(&mut bot, "al", "#topic nothing");
        assert!(bot.registry().is_empty());
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_start_and_end_meeting() {
        let (mut bot, _) = bot();
        say(&mut bot, "al", "#startmeeting");
        assert_eq!(bot.list_meetings(), "(#dev, libera)");

        say(&mut bot, "al", "#endmeeting");
        assert!(bot.registry().is_empty());
        assert_eq!(bot.list_meetings(), "No currently active meetings");
    }

    #[test]
    fn test_second_start_is_rejected() {
        let (mut bot, transport) = bot();
        say(&mut bot, "al", "#startmeeting");
        say(&mut bot, "bo", "#startmeeting");

        assert_eq!(
            transport.private_messages("bo"),
            vec!["Can't start another meeting, one is in progress".to_string()]
        );
        let key = MeetingKey::new("#dev", "libera");
        assert_eq!(bot.registry().get(&key).unwrap().owner(), Some("al"));
    }

    #[test]
    fn test_abort_removes_meeting() {
        let (mut bot, transport) = bot();
        bot.set_channel_topic("#dev", "libera", "Old topic");
        say(&mut bot, "al", "#startmeeting");
        say(&mut bot, "al", "#abortmeeting");

        assert!(bot.registry().is_empty());
        assert_eq!(transport.topics(), vec!["Old topic".to_string()]);
        assert!(bot.recent().ends_with(')'));
        assert!(!bot.recent().contains("running"));
    }

    #[test]
    fn test_private_vote() {
        let (mut bot, transport) = bot();
        say(&mut bot, "al", "#startmeeting");
        say(&mut bot, "al", "#vote Lunch?");
        let replies = transport.replies().len();

        bot.handle_private_message("bo", "vote +1 #dev");
        assert_eq!(
            transport.private_messages("bo"),
            vec!["Received for vote: Lunch?".to_string()]
        );
        assert_eq!(transport.replies().len(), replies);

        let key = MeetingKey::new("#dev", "libera");
        let meeting = bot.registry().get(&key).unwrap();
        let vote = meeting.vote_state().active().unwrap();
        assert!(vote.casts.contains_key("bo"));
    }

    #[test]
    fn test_private_vote_without_meeting() {
        let (mut bot, transport) = bot();
        bot.handle_private_message("bo", "vote -1 #elsewhere");
        bot.handle_private_message("bo", "hello there");

        assert_eq!(
            transport.private_messages("bo"),
            vec!["No active meetings in this channel".to_string()]
        );
    }

    #[test]
    fn test_admin_add_chair() {
        let (mut bot, _) = bot();
        say(&mut bot, "al", "#startmeeting");
        assert_eq!(
            bot.add_chair("#dev", "libera", "cy").unwrap(),
            "Chair added: cy on (#dev, libera)"
        );

        say(&mut bot, "cy", "#topic Chaired");
        let key = MeetingKey::new("#dev", "libera");
        assert_eq!(bot.registry().get(&key).unwrap().current_topic(), "Chaired");

        assert!(matches!(
            bot.add_chair("#ops", "libera", "cy"),
            Err(BotError::Registry(RegistryError::NotFound(_)))
        ));
    }

    #[test]
    fn test_admin_delete_and_recent() {
        let (mut bot, _) = bot();
        say(&mut bot, "al", "#startmeeting");
        assert!(bot.recent().contains("(#dev, libera, "));
        assert!(bot.recent().ends_with(", running)"));

        assert_eq!(
            bot.delete_meeting("#dev", "libera", false).unwrap(),
            "Deleted meeting on (#dev, libera)"
        );
        assert!(bot.registry().is_empty());
        assert!(bot.delete_meeting("#dev", "libera", false).is_err());
    }

    #[test]
    fn test_admin_save_all() {
        let (mut bot, _) = bot();
        assert_eq!(bot.save_all(), "Saved 0 meetings");
        say(&mut bot, "al", "#startmeeting");
        assert_eq!(bot.save_all(), "Saved 1 meetings");
    }
}
