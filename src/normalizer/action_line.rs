use anyhow::Result;
use regex::Regex;
use tracing::trace;

use crate::normalizer::{parse_clock, LineKind, ReplayLine, TranscriptLineParser};

/// Parser for `[time] * nick text` emote lines
pub struct ActionLineParser {
    line_regex: Regex,
}

impl ActionLineParser {
    pub fn new() -> Result<Self> {
        let line_regex = Regex::new(r"^\[?([0-9: ]*?)\]? *\* *([^ ]+) *(.*?) *$")?;

        Ok(Self { line_regex })
    }
}

impl TranscriptLineParser for ActionLineParser {
    fn parse(&self, line: &str) -> Option<ReplayLine> {
        let caps = self.line_regex.captures(line)?;
        trace!("Matched action line");

        Some(ReplayLine {
            kind: LineKind::Action,
            time: parse_clock(caps.get(1).map_or("", |m| m.as_str())),
            nick: caps.get(2)?.as_str().to_string(),
            text: caps.get(3).map_or("", |m| m.as_str()).to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "ActionLineParser"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_line() {
        let parser = ActionLineParser::new().unwrap();
        let line = parser.parse("12:00 * bob waves hello").unwrap();

        assert_eq!(line.nick, "bob");
        assert_eq!(line.text, "waves hello");
        assert_eq!(line.payload(), "ACTION waves hello");
    }
}
