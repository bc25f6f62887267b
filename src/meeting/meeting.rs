//! The meeting state machine.
//!
//! Every chat line goes through [`Meeting::add_line`]: it is appended to the
//! raw transcript, matched against the command grammar, passed through the
//! chair gate and dispatched. Lines are processed one at a time to
//! completion, so nothing in here needs locking.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::command::{is_vote_cast, Command, CommandGrammar, ParsedLine};
use crate::config::naming::NameVars;
use crate::config::{Config, ConfigError};
use crate::minutes::{LinkTarget, MinutesItem};
use crate::normalizer::NormalizedLine;
use crate::writers::{Pipeline, SaveMode, SaveReport};

use super::error::MeetingError;
use super::status::MeetingPhase;
use super::transport::ChatTransport;
use super::vote::{VoteResult, VoteState};

/// Construction options that are not part of the configuration.
#[derive(Debug, Clone, Default)]
pub struct MeetingOptions {
    /// Owner known up front. Replays leave this empty and take the first speaker.
    pub owner: Option<String>,
    /// Channel topic before the meeting, restored when it ends.
    pub old_topic: Option<String>,
    /// Write every output next to this base path instead of the configured
    /// naming pattern. Pinned meetings get no realtime updates.
    pub pinned_output: Option<PathBuf>,
    /// Render every format but write no files.
    pub dont_save: bool,
}

/// Per-line data handed to command handlers.
pub(super) struct LineContext<'a> {
    pub nick: &'a str,
    pub args: &'a str,
    pub linenum: usize,
    pub time: DateTime<Utc>,
}

pub struct Meeting {
    pub(super) channel: String,
    pub(super) network: String,
    pub(super) owner: Option<String>,
    pub(super) phase: MeetingPhase,
    pub(super) start_time: Option<DateTime<Utc>>,
    pub(super) end_time: Option<DateTime<Utc>>,
    pub(super) old_topic: Option<String>,
    pub(super) current_topic: String,
    pub(super) meeting_topic: Option<String>,
    pub(super) meeting_name: Option<String>,
    pub(super) lines: Vec<String>,
    pub(super) minutes: Vec<MinutesItem>,
    pub(super) attendees: BTreeMap<String, usize>,
    pub(super) chairs: BTreeSet<String>,
    pub(super) voters: BTreeSet<String>,
    pub(super) votes_required: i64,
    pub(super) vote: VoteState,
    pub(super) vote_results: Vec<VoteResult>,
    pub(super) lurk: bool,
    pub(super) restrict_logs: bool,
    /// Operator flag of the line being processed.
    pub(super) is_op: bool,
    pinned_output: Option<PathBuf>,
    dont_save: bool,
    pub(super) config: Arc<Config>,
    grammar: CommandGrammar,
    pipeline: Pipeline,
    pub(super) transport: Arc<dyn ChatTransport>,
}

impl Meeting {
    /// Create a meeting. Writer names are resolved here, so a bad
    /// configuration fails before any line is accepted.
    pub fn new(
        channel: &str,
        network: &str,
        options: MeetingOptions,
        config: Arc<Config>,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self, ConfigError> {
        let grammar = CommandGrammar::new(&config.meeting)?;
        let pipeline = Pipeline::from_config(&config)?;

        Ok(Self {
            channel: channel.to_string(),
            network: network.to_string(),
            owner: options.owner,
            phase: MeetingPhase::NotStarted,
            start_time: None,
            end_time: None,
            old_topic: options.old_topic,
            current_topic: String::new(),
            meeting_topic: None,
            meeting_name: None,
            lines: Vec::new(),
            minutes: Vec::new(),
            attendees: BTreeMap::new(),
            chairs: BTreeSet::new(),
            voters: BTreeSet::new(),
            votes_required: 0,
            vote: VoteState::Closed,
            vote_results: Vec::new(),
            lurk: false,
            restrict_logs: false,
            is_op: false,
            pinned_output: options.pinned_output,
            dont_save: options.dont_save,
            config,
            grammar,
            pipeline,
            transport,
        })
    }

    /// Feed one chat line into the meeting.
    ///
    /// The line always lands in the raw transcript, whatever it contains.
    /// `time` defaults to now; replays pass the logged time.
    pub fn add_line(
        &mut self,
        nick: &str,
        line: &str,
        is_op: bool,
        time: Option<DateTime<Utc>>,
    ) -> Result<(), MeetingError> {
        if self.phase == MeetingPhase::Over {
            return Err(MeetingError::Finished(self.channel.clone()));
        }

        let time = time.unwrap_or_else(Utc::now);
        let normalized = NormalizedLine::new(nick, line);
        let linenum = self.add_raw_line(&normalized, time);
        self.is_op = is_op;

        match self.grammar.parse(&normalized.text) {
            ParsedLine::Command { command, args } => {
                let ctx = LineContext {
                    nick,
                    args: &args,
                    linenum,
                    time,
                };
                self.run_command(command, &ctx)?;
            }
            ParsedLine::ImplicitLink(url) => {
                self.add_item(MinutesItem::link(
                    nick,
                    LinkTarget::implicit(&url),
                    linenum,
                    time,
                ));
            }
            ParsedLine::Speech => {}
        }

        if is_vote_cast(&normalized.text) {
            self.cast_vote(nick, &normalized.text, true);
        }

        if self.phase == MeetingPhase::Running && self.config.output.update_realtime {
            if let Err(e) = self.pipeline.run(self, SaveMode::Realtime) {
                warn!("Realtime update for {} failed: {}", self.channel, e);
            }
        }

        Ok(())
    }

    /// Central authorization gate: chair-only commands from anyone else are
    /// dropped without a reply.
    fn run_command(&mut self, command: Command, ctx: &LineContext<'_>) -> Result<(), MeetingError> {
        if command.requires_chair() && !self.is_chair(ctx.nick) {
            debug!(
                "Ignoring #{} from {} in {}: not a chair",
                command.name(),
                ctx.nick,
                self.channel
            );
            return Ok(());
        }
        self.dispatch(command, ctx)
    }

    fn add_raw_line(&mut self, line: &NormalizedLine, time: DateTime<Utc>) -> usize {
        self.add_nick(&line.nick, 1);
        self.lines.push(line.log_line(time));
        self.lines.len()
    }

    pub(super) fn add_nick(&mut self, nick: &str, lines: usize) {
        *self.attendees.entry(nick.to_string()).or_insert(0) += lines;
    }

    pub(super) fn add_item(&mut self, item: MinutesItem) {
        self.minutes.push(item);
    }

    /// Owner, explicit chair, or operator of the line being processed.
    pub fn is_chair(&self, nick: &str) -> bool {
        self.owner.as_deref() == Some(nick) || self.chairs.contains(nick) || self.is_op
    }

    /// Record a vote cast if a vote is open and the nick may vote.
    ///
    /// Returns the open vote's topic when there is one, whether or not
    /// the cast was accepted.
    pub fn cast_vote(&mut self, nick: &str, line: &str, public: bool) -> Option<String> {
        let eligible = self.voters.is_empty()
            || self.voters.contains(nick)
            || self.owner.as_deref() == Some(nick);

        let VoteState::Open(vote) = &mut self.vote else {
            return None;
        };
        let topic = vote.topic.clone();
        if !eligible {
            debug!("{} is not an allowed voter on '{}'", nick, topic);
            return Some(topic);
        }

        vote.cast(nick, line, public);
        if public {
            self.reply(&format!("{} received from {}", line, nick));
        }
        Some(topic)
    }

    /// Private vote, as sent to the bot directly.
    pub fn cast_private_vote(&mut self, nick: &str, line: &str) -> Option<String> {
        self.cast_vote(nick, line, false)
    }

    pub(super) fn reply(&self, message: &str) {
        if !self.lurk {
            self.transport.reply(&self.channel, message);
        }
    }

    pub(super) fn private_reply(&self, nick: &str, message: &str) {
        if !self.lurk {
            self.transport.private_reply(nick, message);
        }
    }

    pub(super) fn set_topic(&self, topic: &str) {
        if !self.lurk {
            self.transport.set_topic(&self.channel, topic);
        }
    }

    /// Externally visible channel topic.
    pub fn composed_topic(&self) -> String {
        let Some(overlay) = &self.meeting_topic else {
            return self.current_topic.clone();
        };
        let overlay = if overlay.to_lowercase().contains("meeting") {
            overlay.clone()
        } else {
            format!("{} Meeting", overlay)
        };
        match &self.old_topic {
            Some(old) => format!("{} | {} | Current topic: {}", old, overlay, self.current_topic),
            None => format!("{} | Current topic: {}", overlay, self.current_topic),
        }
    }

    pub(super) fn publish_topic(&self) {
        self.set_topic(&self.composed_topic());
    }

    pub(super) fn warn_if_absent(&self, nick: &str) {
        if let Some(nicks) = self.transport.channel_nicks(&self.channel) {
            if !nicks.iter().any(|n| n == nick) {
                self.reply(&format!("Warning: '{}' not in channel", nick));
            }
        }
    }

    /// Full save over every registered format.
    pub fn save(&self) -> Result<SaveReport, MeetingError> {
        Ok(self.pipeline.run(self, SaveMode::Full)?)
    }

    /// Admin save: stamps the end time on a running meeting first.
    pub fn save_now(&mut self) -> Result<SaveReport, MeetingError> {
        if self.phase != MeetingPhase::Over {
            self.end_time = Some(Utc::now());
        }
        self.save()
    }

    /// End without saving: restores the topic and marks the meeting over.
    pub fn abort(&mut self, time: DateTime<Utc>) {
        if self.phase == MeetingPhase::Over {
            return;
        }
        if let Some(old) = self.old_topic.clone() {
            self.set_topic(&old);
        }
        self.end_time = Some(time);
        self.phase = MeetingPhase::Over;
    }

    /// Take the first speaker of a replayed log as owner.
    pub fn set_owner_if_missing(&mut self, nick: &str) {
        if self.owner.is_none() {
            self.owner = Some(nick.to_string());
        }
    }

    /// Admin chair grant, bypassing the gate.
    pub fn add_chair(&mut self, nick: &str) {
        if self.owner.as_deref() != Some(nick) {
            self.chairs.insert(nick.to_string());
        }
    }

    pub fn set_start_time(&mut self, time: DateTime<Utc>) {
        self.start_time = Some(time);
    }

    /// Path naming inputs for this meeting.
    pub fn name_vars(&self) -> NameVars<'_> {
        NameVars {
            channel: &self.channel,
            network: &self.network,
            meeting_name: self.meeting_name.as_deref(),
            start_time: self.start_time.unwrap_or_else(Utc::now),
        }
    }

    /// On-disk base path of the outputs (extension not included).
    pub fn output_base(&self) -> Result<PathBuf, ConfigError> {
        match &self.pinned_output {
            Some(pinned) => Ok(pinned.clone()),
            None => self.config.output.file_path(&self.name_vars()),
        }
    }

    /// Public URL base of the outputs.
    pub fn url_base(&self) -> Result<String, ConfigError> {
        match &self.pinned_output {
            Some(pinned) => Ok(pinned.to_string_lossy().into_owned()),
            None => self.config.output.url(&self.name_vars()),
        }
    }

    /// Substitute `{name}` fields in a configured message.
    pub(super) fn render_message(&self, template: &str) -> String {
        let clock = |t: Option<DateTime<Utc>>| {
            t.map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "None".to_string())
        };
        let fields = [
            ("channel", self.channel.clone()),
            ("network", self.network.clone()),
            ("chair", self.owner.clone().unwrap_or_default()),
            ("starttime", clock(self.start_time)),
            ("endtime", clock(self.end_time)),
            ("timeZone", self.config.output.time_zone.clone()),
            ("MeetBotInfoURL", self.config.meeting.info_url.clone()),
            ("urlBasename", self.url_base().unwrap_or_default()),
            ("version", crate::VERSION.to_string()),
        ];

        fields
            .iter()
            .fold(template.to_string(), |message, (name, value)| {
                message.replace(&format!("{{{}}}", name), value)
            })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn phase(&self) -> MeetingPhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == MeetingPhase::Over
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn current_topic(&self) -> &str {
        &self.current_topic
    }

    pub fn meeting_topic(&self) -> Option<&str> {
        self.meeting_topic.as_deref()
    }

    pub fn meeting_name(&self) -> Option<&str> {
        self.meeting_name.as_deref()
    }

    /// Raw transcript; line `n` is at index `n - 1`.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn minutes(&self) -> &[MinutesItem] {
        &self.minutes
    }

    /// Nick to number of lines spoken.
    pub fn attendees(&self) -> &BTreeMap<String, usize> {
        &self.attendees
    }

    /// Explicit chairs; the owner is never listed here.
    pub fn chairs(&self) -> &BTreeSet<String> {
        &self.chairs
    }

    pub fn voters(&self) -> &BTreeSet<String> {
        &self.voters
    }

    pub fn votes_required(&self) -> i64 {
        self.votes_required
    }

    pub fn vote_state(&self) -> &VoteState {
        &self.vote
    }

    /// Closed votes, oldest first.
    pub fn vote_results(&self) -> &[VoteResult] {
        &self.vote_results
    }

    pub fn is_lurking(&self) -> bool {
        self.lurk
    }

    pub fn restricts_logs(&self) -> bool {
        self.restrict_logs
    }

    pub fn pinned_output(&self) -> Option<&Path> {
        self.pinned_output.as_deref()
    }

    pub fn dont_save(&self) -> bool {
        self.dont_save
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
