//! Meeting command surface and the line grammar that recognizes it.

use regex::Regex;

use crate::config::{ConfigError, MeetingConfig};

/// Every command a meeting understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    StartMeeting,
    EndMeeting,
    AbortMeeting,
    Topic,
    Subtopic,
    MeetingTopic,
    Save,
    Done,
    Agreed,
    Accepted,
    Rejected,
    Chair,
    Unchair,
    Undo,
    RestrictLogs,
    Lurk,
    Unlurk,
    MeetingName,
    Vote,
    VotesRequired,
    EndVote,
    Voters,
    PrivateCommands,
    Action,
    Info,
    Idea,
    Help,
    Nick,
    Link,
    Commands,
}

impl Command {
    pub fn all() -> &'static [Command] {
        use Command::*;
        &[
            StartMeeting,
            EndMeeting,
            AbortMeeting,
            Topic,
            Subtopic,
            MeetingTopic,
            Save,
            Done,
            Agreed,
            Accepted,
            Rejected,
            Chair,
            Unchair,
            Undo,
            RestrictLogs,
            Lurk,
            Unlurk,
            MeetingName,
            Vote,
            VotesRequired,
            EndVote,
            Voters,
            PrivateCommands,
            Action,
            Info,
            Idea,
            Help,
            Nick,
            Link,
            Commands,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::StartMeeting => "startmeeting",
            Self::EndMeeting => "endmeeting",
            Self::AbortMeeting => "abortmeeting",
            Self::Topic => "topic",
            Self::Subtopic => "subtopic",
            Self::MeetingTopic => "meetingtopic",
            Self::Save => "save",
            Self::Done => "done",
            Self::Agreed => "agreed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Chair => "chair",
            Self::Unchair => "unchair",
            Self::Undo => "undo",
            Self::RestrictLogs => "restrictlogs",
            Self::Lurk => "lurk",
            Self::Unlurk => "unlurk",
            Self::MeetingName => "meetingname",
            Self::Vote => "vote",
            Self::VotesRequired => "votesrequired",
            Self::EndVote => "endvote",
            Self::Voters => "voters",
            Self::PrivateCommands => "private_commands",
            Self::Action => "action",
            Self::Info => "info",
            Self::Idea => "idea",
            Self::Help => "help",
            Self::Nick => "nick",
            Self::Link => "link",
            Self::Commands => "commands",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Subtopic => &["progress"],
            Self::Agreed => &["agree"],
            Self::Accepted => &["accept"],
            Self::Rejected => &["reject"],
            Self::Help => &["halp"],
            _ => &[],
        }
    }

    /// Look up a command by name or alias, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|cmd| cmd.name() == name || cmd.aliases().contains(&name.as_str()))
    }

    /// Whether only the owner, a chair or a channel operator may run it.
    pub fn requires_chair(&self) -> bool {
        !matches!(
            self,
            Self::StartMeeting
                | Self::Action
                | Self::Info
                | Self::Idea
                | Self::Help
                | Self::Nick
                | Self::Link
                | Self::Commands
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::StartMeeting => "Begin a meeting",
            Self::EndMeeting => "End the meeting and save the minutes",
            Self::AbortMeeting => "End the meeting without saving",
            Self::Topic => "Set a new topic",
            Self::Subtopic => "Record a subtopic under the current topic",
            Self::MeetingTopic => "Set a meeting topic included in every channel topic",
            Self::Save => "Write all output files now",
            Self::Done => "Record a completed item",
            Self::Agreed => "Record an agreement",
            Self::Accepted => "Record an accepted proposal",
            Self::Rejected => "Record a rejected proposal",
            Self::Chair => "Add chairs",
            Self::Unchair => "Remove chairs",
            Self::Undo => "Remove the last minutes item",
            Self::RestrictLogs => "Remove group/other permissions from written files",
            Self::Lurk => "Stop talking in the channel",
            Self::Unlurk => "Talk in the channel again",
            Self::MeetingName => "Set the name used in output file names",
            Self::Vote => "Open a vote",
            Self::VotesRequired => "Set the margin a vote needs to pass",
            Self::EndVote => "Close the vote and record the result",
            Self::Voters => "Restrict who may vote",
            Self::PrivateCommands => "Privately list every command",
            Self::Action => "Record an action item",
            Self::Info => "Record an informational item",
            Self::Idea => "Record an idea",
            Self::Help => "Record a call for help",
            Self::Nick => "Make a nick known without them speaking",
            Self::Link => "Record a link",
            Self::Commands => "List the commands open to everyone",
        }
    }
}

/// Result of matching one chat line against the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Command { command: Command, args: String },
    /// A bare URL, recorded as a link with the whole line as target.
    ImplicitLink(String),
    Speech,
}

/// Command grammar: one leading marker, a word token, then the argument text.
#[derive(Debug, Clone)]
pub struct CommandGrammar {
    command_re: Regex,
    url_protocols: Vec<String>,
}

impl CommandGrammar {
    pub fn new(config: &MeetingConfig) -> Result<Self, ConfigError> {
        if config.command_markers.is_empty() {
            return Err(ConfigError::CommandMarker(
                "at least one marker character is required".to_string(),
            ));
        }
        let markers: String = config
            .command_markers
            .chars()
            .map(|c| regex::escape(&c.to_string()))
            .collect();
        let pattern = format!(r"^[{}](\w+)(?:\s+(.*?)|)\s*$", markers);
        let command_re =
            Regex::new(&pattern).map_err(|e| ConfigError::CommandMarker(e.to_string()))?;

        Ok(Self {
            command_re,
            url_protocols: config.url_protocols.clone(),
        })
    }

    pub fn parse(&self, line: &str) -> ParsedLine {
        if let Some(caps) = self.command_re.captures(line) {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let args = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            // An unknown `#word` is ordinary speech.
            return match Command::from_name(name) {
                Some(command) => ParsedLine::Command {
                    command,
                    args: args.to_string(),
                },
                None => ParsedLine::Speech,
            };
        }

        if self.is_url(line) {
            return ParsedLine::ImplicitLink(line.to_string());
        }

        ParsedLine::Speech
    }

    fn is_url(&self, line: &str) -> bool {
        match line.split_once("//") {
            Some((scheme, _)) => self.url_protocols.iter().any(|p| p == scheme),
            None => false,
        }
    }
}

/// Whether a line is a vote cast: `+1`, `-1`, `0`, `+0` or `-0` at a word boundary.
pub fn is_vote_cast(line: &str) -> bool {
    VoteChoice::classify(line).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChoice {
    For,
    Against,
    Abstain,
}

impl VoteChoice {
    /// Classify a cast by its leading token; trailing text is ignored.
    pub fn classify(line: &str) -> Option<Self> {
        let (token, rest) = if let Some(rest) = line.strip_prefix("+1") {
            (Self::For, rest)
        } else if let Some(rest) = line.strip_prefix("-1") {
            (Self::Against, rest)
        } else if let Some(rest) = line
            .strip_prefix("+0")
            .or_else(|| line.strip_prefix("-0"))
            .or_else(|| line.strip_prefix('0'))
        {
            (Self::Abstain, rest)
        } else {
            return None;
        };

        // A word character right after the digit means no word boundary.
        match rest.chars().next() {
            Some(c) if c.is_alphanumeric() || c == '_' => None,
            _ => Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> CommandGrammar {
        CommandGrammar::new(&MeetingConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_command_with_args() {
        assert_eq!(
            grammar().parse("#topic  Budget review  "),
            ParsedLine::Command {
                command: Command::Topic,
                args: "Budget review".to_string()
            }
        );
    }

    #[test]
    fn test_command_name_is_case_insensitive() {
        assert_eq!(
            grammar().parse("#StartMeeting"),
            ParsedLine::Command {
                command: Command::StartMeeting,
                args: String::new()
            }
        );
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(Command::from_name("progress"), Some(Command::Subtopic));
        assert_eq!(Command::from_name("AGREE"), Some(Command::Agreed));
        assert_eq!(Command::from_name("halp"), Some(Command::Help));
    }

    #[test]
    fn test_unknown_command_is_speech() {
        assert_eq!(grammar().parse("#hashtag this"), ParsedLine::Speech);
        assert_eq!(grammar().parse("topic without marker"), ParsedLine::Speech);
    }

    #[test]
    fn test_implicit_link() {
        assert_eq!(
            grammar().parse("https://example.org/agenda"),
            ParsedLine::ImplicitLink("https://example.org/agenda".to_string())
        );
        assert_eq!(grammar().parse("see https://example.org"), ParsedLine::Speech);
        assert_eq!(grammar().parse("gopher://old.example"), ParsedLine::Speech);
    }

    #[test]
    fn test_alternate_marker() {
        let config = MeetingConfig {
            command_markers: "#!".to_string(),
            ..MeetingConfig::default()
        };
        let grammar = CommandGrammar::new(&config).unwrap();
        assert!(matches!(
            grammar.parse("!info hi"),
            ParsedLine::Command {
                command: Command::Info,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_marker_rejected() {
        let config = MeetingConfig {
            command_markers: String::new(),
            ..MeetingConfig::default()
        };
        assert!(CommandGrammar::new(&config).is_err());
    }

    #[test]
    fn test_open_commands_do_not_require_chair() {
        let open: Vec<_> = Command::all()
            .iter()
            .filter(|c| !c.requires_chair())
            .map(|c| c.name())
            .collect();
        assert_eq!(
            open,
            vec!["startmeeting", "action", "info", "idea", "help", "nick", "link", "commands"]
        );
    }

    #[test]
    fn test_vote_choice_classification() {
        assert_eq!(VoteChoice::classify("+1"), Some(VoteChoice::For));
        assert_eq!(VoteChoice::classify("+1 sounds good"), Some(VoteChoice::For));
        assert_eq!(VoteChoice::classify("-1"), Some(VoteChoice::Against));
        assert_eq!(VoteChoice::classify("0"), Some(VoteChoice::Abstain));
        assert_eq!(VoteChoice::classify("-0"), Some(VoteChoice::Abstain));
        assert_eq!(VoteChoice::classify("+10"), None);
        assert_eq!(VoteChoice::classify("1"), None);
        assert_eq!(VoteChoice::classify("yes"), None);
    }
}
