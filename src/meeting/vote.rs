//! Voting sub-protocol: at most one open vote per meeting.

use std::collections::BTreeMap;

use crate::command::VoteChoice;

/// A vote that is currently accepting casts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenVote {
    pub topic: String,
    /// Latest cast per nick, stored verbatim.
    pub casts: BTreeMap<String, String>,
    /// Nicks who cast in the channel, in first-cast order.
    pub public_voters: Vec<String>,
    /// Transcript line the vote was opened on.
    pub start_line: usize,
}

impl OpenVote {
    pub fn new(topic: &str, start_line: usize) -> Self {
        Self {
            topic: topic.to_string(),
            casts: BTreeMap::new(),
            public_voters: Vec::new(),
            start_line,
        }
    }

    /// Record a cast. A later cast from the same nick replaces the earlier one.
    pub fn cast(&mut self, nick: &str, line: &str, public: bool) {
        self.casts.insert(nick.to_string(), line.to_string());
        if public && !self.public_voters.iter().any(|v| v == nick) {
            self.public_voters.push(nick.to_string());
        }
    }

    pub fn tally(&self) -> VoteTally {
        VoteTally::count(self.casts.values().map(String::as_str))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VoteState {
    #[default]
    Closed,
    Open(OpenVote),
}

impl VoteState {
    pub fn active(&self) -> Option<&OpenVote> {
        match self {
            Self::Open(vote) => Some(vote),
            Self::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub for_votes: u32,
    pub against: u32,
    pub abstain: u32,
}

impl VoteTally {
    pub fn count<'a>(casts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tally = Self::default();
        for cast in casts {
            match VoteChoice::classify(cast) {
                Some(VoteChoice::For) => tally.for_votes += 1,
                Some(VoteChoice::Against) => tally.against += 1,
                Some(VoteChoice::Abstain) => tally.abstain += 1,
                None => {}
            }
        }
        tally
    }

    pub fn margin(&self) -> i64 {
        i64::from(self.for_votes) - i64::from(self.against)
    }

    /// `for - against >= required` carries, anything less is denied.
    ///
    /// There is no deadlock outcome: the two comparisons cover every
    /// margin, including a tie against a zero requirement, which carries.
    pub fn outcome(&self, votes_required: i64) -> VoteOutcome {
        if self.margin() >= votes_required {
            VoteOutcome::Carried
        } else {
            VoteOutcome::Denied
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Carried,
    Denied,
}

impl VoteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Carried => "Carried",
            Self::Denied => "Denied",
        }
    }

    pub fn motion(&self) -> &'static str {
        match self {
            Self::Carried => "Motion carried",
            Self::Denied => "Motion denied",
        }
    }
}

/// A closed vote, kept for the minutes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteResult {
    pub topic: String,
    pub tally: VoteTally,
    pub outcome: VoteOutcome,
    pub public_voters: Vec<String>,
    pub start_line: usize,
}

impl VoteResult {
    pub fn close(vote: OpenVote, votes_required: i64) -> Self {
        let tally = vote.tally();
        Self {
            outcome: tally.outcome(votes_required),
            topic: vote.topic,
            tally,
            public_voters: vote.public_voters,
            start_line: vote.start_line,
        }
    }

    /// `Motion carried (For: 2, Against: 0, Abstained: 1)`
    pub fn summary(&self) -> String {
        format!(
            "{} (For: {}, Against: {}, Abstained: {})",
            self.outcome.motion(),
            self.tally.for_votes,
            self.tally.against,
            self.tally.abstain
        )
    }

    /// Line recorded in the minutes: `topic (Carried)`.
    pub fn minutes_line(&self) -> String {
        format!("{} ({})", self.topic, self.outcome.as_str())
    }
}
