//! Command handlers. The chair gate has already run when these are called.

use tracing::{debug, info};

use crate::command::Command;
use crate::config::normalize_meeting_name;
use crate::minutes::{ItemKind, LinkTarget, MinutesItem};

use super::error::MeetingError;
use super::meeting::{LineContext, Meeting};
use super::status::MeetingPhase;
use super::vote::{OpenVote, VoteResult, VoteState};

/// Nick lists are separated by commas and/or spaces.
fn split_nicks(args: &str) -> impl Iterator<Item = &str> {
    args.split([',', ' ']).filter(|n| !n.is_empty())
}

impl Meeting {
    pub(super) fn dispatch(&mut self, command: Command, ctx: &LineContext<'_>) -> Result<(), MeetingError> {
        match command {
            Command::StartMeeting => self.start_meeting(ctx),
            Command::EndMeeting => self.end_meeting(ctx)?,
            Command::AbortMeeting => {
                self.abort(ctx.time);
                info!("Meeting in {} aborted by {}", self.channel, ctx.nick);
                self.reply("Meeting ended without saving its logs");
            }
            Command::Topic => {
                self.current_topic = ctx.args.to_string();
                self.record(ItemKind::Topic, ctx);
                self.publish_topic();
            }
            Command::MeetingTopic => self.set_meeting_topic(ctx.args),
            Command::Save => {
                self.end_time = Some(ctx.time);
                self.save()?;
            }
            Command::Subtopic => self.record(ItemKind::Subtopic, ctx),
            Command::Done => self.record(ItemKind::Done, ctx),
            Command::Agreed => {
                self.record(ItemKind::Agreed, ctx);
                if self.config.meeting.be_noisy {
                    self.reply(&format!("AGREED: {}", ctx.args.trim()));
                }
            }
            Command::Accepted => self.record(ItemKind::Accepted, ctx),
            Command::Rejected => self.record(ItemKind::Rejected, ctx),
            Command::Chair => self.chair(ctx.args),
            Command::Unchair => {
                for nick in split_nicks(ctx.args) {
                    self.chairs.remove(nick);
                }
                self.reply_chairs();
            }
            Command::Undo => {
                if let Some(item) = self.minutes.pop() {
                    self.reply(&format!("Removing item from minutes: {}", item.kind.label()));
                }
            }
            Command::RestrictLogs => {
                self.restrict_logs = true;
                self.reply(&format!(
                    "Restricting permissions on minutes: -{:#o} on next #save",
                    self.config.output.restrict_perm
                ));
            }
            Command::Lurk => self.lurk = true,
            Command::Unlurk => self.lurk = false,
            Command::MeetingName => {
                let name = normalize_meeting_name(ctx.args);
                self.reply(&format!("Meeting name set to: {}", name));
                self.meeting_name = if name.is_empty() { None } else { Some(name) };
            }
            Command::Vote => self.open_vote(ctx),
            Command::VotesRequired => {
                self.votes_required = ctx.args.trim().parse().unwrap_or(0);
                self.reply(&format!("Votes now need {} to be passed", self.votes_required));
            }
            Command::EndVote => self.end_vote(ctx),
            Command::Voters => self.set_voters(ctx.args),
            Command::PrivateCommands => self.private_commands(ctx.nick),
            Command::Action => {
                self.record(ItemKind::Action, ctx);
                if self.config.meeting.be_noisy {
                    self.reply(&format!("ACTION: {}", ctx.args.trim()));
                }
            }
            Command::Info => self.record(ItemKind::Info, ctx),
            Command::Idea => self.record(ItemKind::Idea, ctx),
            Command::Help => self.record(ItemKind::Help, ctx),
            Command::Nick => {
                let nicks: Vec<String> = split_nicks(ctx.args).map(str::to_string).collect();
                for nick in nicks {
                    self.add_nick(&nick, 0);
                }
            }
            Command::Link => {
                let item = MinutesItem::link(
                    ctx.nick,
                    LinkTarget::from_command(ctx.args),
                    ctx.linenum,
                    ctx.time,
                );
                self.add_item(item);
            }
            Command::Commands => self.open_commands(),
        }
        Ok(())
    }

    fn record(&mut self, kind: ItemKind, ctx: &LineContext<'_>) {
        let item = MinutesItem::new(kind, ctx.nick, ctx.args, ctx.linenum, ctx.time);
        self.add_item(item);
    }

    fn start_meeting(&mut self, ctx: &LineContext<'_>) {
        if self.phase != MeetingPhase::NotStarted {
            debug!("Meeting in {} already started", self.channel);
            return;
        }

        self.set_owner_if_missing(ctx.nick);
        self.start_time = Some(ctx.time);
        self.phase = MeetingPhase::Running;
        info!(
            "Meeting started in {} on {} by {}",
            self.channel, self.network, ctx.nick
        );

        let message = self.render_message(&self.config.meeting.start_message);
        for line in message.split('\n') {
            self.reply(line);
        }
        if let Some(owner) = self.owner.clone() {
            self.private_commands(&owner);
        }
        let chairs: Vec<String> = self.chairs.iter().cloned().collect();
        for chair in chairs {
            self.private_commands(&chair);
        }
        self.open_commands();

        if !ctx.args.is_empty() {
            self.set_meeting_topic(ctx.args);
        }
    }

    fn end_meeting(&mut self, ctx: &LineContext<'_>) -> Result<(), MeetingError> {
        if self.vote.is_open() {
            self.end_vote(ctx);
        }
        if let Some(old) = self.old_topic.clone() {
            self.set_topic(&old);
        }
        self.end_time = Some(ctx.time);

        // A failed save leaves the meeting running so it can be ended again.
        let report = self.save()?;
        info!(
            "Meeting in {} ended by {} ({} outputs)",
            self.channel,
            ctx.nick,
            report.outputs.len()
        );

        let message = self.render_message(&self.config.meeting.end_message);
        for line in message.split('\n') {
            self.reply(line);
        }
        self.phase = MeetingPhase::Over;

        let notification = self.render_message(&self.config.meeting.end_notification);
        for nick in &self.config.meeting.end_notification_list {
            self.private_reply(nick, &notification);
        }
        Ok(())
    }

    fn set_meeting_topic(&mut self, args: &str) {
        let args = args.trim();
        self.meeting_topic = if args.is_empty()
            || args.eq_ignore_ascii_case("none")
            || args.eq_ignore_ascii_case("unset")
        {
            None
        } else {
            Some(args.to_string())
        };
        self.publish_topic();
    }

    fn chair(&mut self, args: &str) {
        let nicks: Vec<String> = split_nicks(args).map(str::to_string).collect();
        for nick in nicks {
            if self.owner.as_deref() == Some(nick.as_str()) || self.chairs.contains(&nick) {
                continue;
            }
            self.warn_if_absent(&nick);
            self.add_nick(&nick, 0);
            self.chairs.insert(nick.clone());
            self.private_commands(&nick);
        }
        self.reply_chairs();
    }

    fn set_voters(&mut self, args: &str) {
        let nicks: Vec<String> = split_nicks(args).map(str::to_string).collect();
        for nick in nicks {
            if matches!(nick.as_str(), "everyone" | "everybody" | "all") {
                self.voters.clear();
                self.reply("Everyone can now vote");
                return;
            }
            if self.voters.contains(&nick) {
                continue;
            }
            self.warn_if_absent(&nick);
            self.add_nick(&nick, 0);
            self.voters.insert(nick);
        }
        let list = self.with_owner(self.voters.iter());
        self.reply(&format!("Current voters: {}", list));
    }

    fn reply_chairs(&self) {
        let list = self.with_owner(self.chairs.iter());
        self.reply(&format!("Current chairs: {}", list));
    }

    /// Sorted, comma-separated nicks plus the owner.
    fn with_owner<'a>(&'a self, nicks: impl Iterator<Item = &'a String>) -> String {
        let mut all: Vec<&str> = nicks.map(String::as_str).collect();
        if let Some(owner) = self.owner.as_deref() {
            all.push(owner);
        }
        all.sort_unstable();
        all.dedup();
        all.join(", ")
    }

    fn open_vote(&mut self, ctx: &LineContext<'_>) {
        if let Some(active) = self.vote.active() {
            let message = format!("Voting still open on: {}", active.topic);
            self.reply(&message);
            return;
        }

        let topic = ctx.args.trim();
        self.vote = VoteState::Open(OpenVote::new(topic, self.lines.len()));
        info!("Vote opened in {}: {}", self.channel, topic);
        self.reply(&format!("Please vote on: {}", topic));
        self.reply(
            "Public votes can be registered by saying +1, -1 or +0 in channel \
             (for private voting, private message me with 'vote +1|-1|+0 #channelname')",
        );
    }

    pub(super) fn end_vote(&mut self, ctx: &LineContext<'_>) {
        let VoteState::Open(vote) = std::mem::take(&mut self.vote) else {
            self.reply("No vote in progress");
            return;
        };

        self.reply(&format!("Voting ended on: {}", vote.topic));
        let result = VoteResult::close(vote, self.votes_required);
        self.reply(&format!(
            "Votes for: {}, Votes against: {}, Abstentions: {}",
            result.tally.for_votes, result.tally.against, result.tally.abstain
        ));
        self.reply(result.outcome.motion());
        info!("Vote closed in {}: {}", self.channel, result.summary());

        let item = MinutesItem::new(
            ItemKind::Vote,
            ctx.nick,
            &result.minutes_line(),
            ctx.linenum,
            ctx.time,
        );
        self.add_item(item);

        // Same topic again replaces the earlier result.
        match self.vote_results.iter_mut().find(|r| r.topic == result.topic) {
            Some(existing) => *existing = result,
            None => self.vote_results.push(result),
        }
    }

    fn private_commands(&self, nick: &str) {
        let marker = self.config.meeting.command_markers.chars().next().unwrap_or('#');
        let mut names: Vec<String> = Command::all()
            .iter()
            .flat_map(|c| std::iter::once(c.name()).chain(c.aliases().iter().copied()))
            .map(|name| format!("{}{}", marker, name))
            .collect();
        names.sort();
        self.private_reply(nick, &format!("Available commands: {}", names.join(", ")));
    }

    fn open_commands(&self) {
        let mut names: Vec<&str> = Command::all()
            .iter()
            .filter(|c| !c.requires_chair() && **c != Command::StartMeeting)
            .map(|c| c.name())
            .collect();
        names.sort_unstable();
        self.reply(&format!("Available commands: {}", names.join(", ")));
    }
}
