use chrono::{DateTime, Utc};

/// Emote lines arrive as `\x01ACTION text\x01`.
const ACTION_MARKER: char = '\x01';
const ACTION_KEYWORD: &str = "ACTION";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Spoken,
    Action,
}

/// A chat line with control markers removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLine {
    pub kind: LineKind,
    pub nick: String,
    /// The text used for command matching. Still starts with `ACTION`
    /// for emotes.
    pub text: String,
}

impl NormalizedLine {
    pub fn new(nick: &str, raw: &str) -> Self {
        let text = raw.trim_matches(ACTION_MARKER).to_string();
        let kind = if text.starts_with(ACTION_KEYWORD) {
            LineKind::Action
        } else {
            LineKind::Spoken
        };

        Self {
            kind,
            nick: nick.to_string(),
            text,
        }
    }

    /// Raw transcript rendering: `HH:MM <nick> text` or `HH:MM * nick text`.
    pub fn log_line(&self, time: DateTime<Utc>) -> String {
        let clock = time.format("%H:%M");
        match self.kind {
            LineKind::Action => {
                // Drop the keyword and the one character that follows it.
                let mut rest = self
                    .text
                    .strip_prefix(ACTION_KEYWORD)
                    .unwrap_or(&self.text)
                    .chars();
                rest.next();
                let body = rest.as_str().trim_start();
                format!("{} * {} {}", clock, self.nick, body)
            }
            LineKind::Spoken => format!("{} <{}> {}", clock, self.nick, self.text),
        }
    }
}
