//! Console stand-in for a chat network.
//!
//! Input lines look like a chat client's scrollback:
//!
//! ```text
//! <al> #startmeeting          spoken line
//! <@al> #topic Budget         spoken by a channel operator
//! * bo waves                  emote
//! /msg bo vote +1 #dev        private message from bo to the bot
//! /topic Welcome to #dev      channel topic as it was before the meeting
//! /admin list|save|recent     admin requests
//! /admin chair <nick>
//! /admin delete [nosave]
//! ```

use regex::Regex;
use std::sync::OnceLock;

use crate::meeting::ChatTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRequest {
    List,
    SaveAll,
    Recent,
    Chair(String),
    Delete { save: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Channel {
        nick: String,
        text: String,
        is_op: bool,
    },
    Private {
        nick: String,
        text: String,
    },
    Topic(String),
    Admin(AdminRequest),
}

fn spoken_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<(@?)([^>\s]+)>\s?(.*)$").ok())
        .as_ref()
}

fn action_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\s+(\S+)\s*(.*)$").ok())
        .as_ref()
}

impl ConsoleInput {
    /// `None` for blank or unrecognized lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if let Some(rest) = line.strip_prefix("/msg ") {
            let (nick, text) = rest.trim_start().split_once(' ')?;
            return Some(Self::Private {
                nick: nick.to_string(),
                text: text.trim().to_string(),
            });
        }
        if let Some(rest) = line.strip_prefix("/topic") {
            return Some(Self::Topic(rest.trim().to_string()));
        }
        if let Some(rest) = line.strip_prefix("/admin ") {
            return Self::parse_admin(rest.trim()).map(Self::Admin);
        }

        if let Some(caps) = spoken_re()?.captures(line) {
            return Some(Self::Channel {
                nick: caps[2].to_string(),
                text: caps[3].to_string(),
                is_op: !caps[1].is_empty(),
            });
        }
        let caps = action_re()?.captures(line)?;
        Some(Self::Channel {
            nick: caps[1].to_string(),
            text: format!("\x01ACTION {}\x01", &caps[2]),
            is_op: false,
        })
    }

    fn parse_admin(request: &str) -> Option<AdminRequest> {
        let mut words = request.split_whitespace();
        match words.next()? {
            "list" => Some(AdminRequest::List),
            "save" => Some(AdminRequest::SaveAll),
            "recent" => Some(AdminRequest::Recent),
            "chair" => Some(AdminRequest::Chair(words.next()?.to_string())),
            "delete" => Some(AdminRequest::Delete {
                save: words.next() != Some("nosave"),
            }),
            _ => None,
        }
    }
}

/// Prints everything the bot says.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTransport;

impl ChatTransport for ConsoleTransport {
    fn reply(&self, channel: &str, message: &str) {
        println!("[{}] {}", channel, message);
    }

    fn private_reply(&self, nick: &str, message: &str) {
        println!("-> {}: {}", nick, message);
    }

    fn set_topic(&self, channel: &str, topic: &str) {
        println!("[{}] topic: {}", channel, topic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_and_operator_lines() {
        assert_eq!(
            ConsoleInput::parse("<al> #startmeeting Weekly"),
            Some(ConsoleInput::Channel {
                nick: "al".to_string(),
                text: "#startmeeting Weekly".to_string(),
                is_op: false,
            })
        );
        assert_eq!(
            ConsoleInput::parse("<@op> #topic x"),
            Some(ConsoleInput::Channel {
                nick: "op".to_string(),
                text: "#topic x".to_string(),
                is_op: true,
            })
        );
    }

    #[test]
    fn test_action_line() {
        assert_eq!(
            ConsoleInput::parse("* bo waves hello"),
            Some(ConsoleInput::Channel {
                nick: "bo".to_string(),
                text: "\x01ACTION waves hello\x01".to_string(),
                is_op: false,
            })
        );
    }

    #[test]
    fn test_private_topic_and_admin() {
        assert_eq!(
            ConsoleInput::parse("/msg bo vote +1 #dev"),
            Some(ConsoleInput::Private {
                nick: "bo".to_string(),
                text: "vote +1 #dev".to_string(),
            })
        );
        assert_eq!(
            ConsoleInput::parse("/topic Welcome"),
            Some(ConsoleInput::Topic("Welcome".to_string()))
        );
        assert_eq!(
            ConsoleInput::parse("/admin chair cy"),
            Some(ConsoleInput::Admin(AdminRequest::Chair("cy".to_string())))
        );
        assert_eq!(
            ConsoleInput::parse("/admin delete nosave"),
            Some(ConsoleInput::Admin(AdminRequest::Delete { save: false }))
        );
        assert_eq!(
            ConsoleInput::parse("/admin delete"),
            Some(ConsoleInput::Admin(AdminRequest::Delete { save: true }))
        );
    }

    #[test]
    fn test_unrecognized_lines() {
        assert_eq!(ConsoleInput::parse(""), None);
        assert_eq!(ConsoleInput::parse("just text"), None);
        assert_eq!(ConsoleInput::parse("/admin reboot"), None);
    }
}
