use anyhow::Result;
use regex::Regex;
use tracing::trace;

use crate::normalizer::{parse_clock, LineKind, ReplayLine, TranscriptLineParser};

/// Parser for `[time] <nick> text` lines
pub struct SpokenLineParser {
    line_regex: Regex,
}

impl SpokenLineParser {
    pub fn new() -> Result<Self> {
        // Optional bracketed time, then a nick with an optional mode prefix like @ or +
        let line_regex = Regex::new(r"^\[?([0-9: ]*?)\]? *<[@%&+ ]?([^>]+)> *(.*?) *$")?;

        Ok(Self { line_regex })
    }
}

impl TranscriptLineParser for SpokenLineParser {
    fn parse(&self, line: &str) -> Option<ReplayLine> {
        let caps = self.line_regex.captures(line)?;
        trace!("Matched spoken line");

        Some(ReplayLine {
            kind: LineKind::Spoken,
            time: parse_clock(caps.get(1).map_or("", |m| m.as_str())),
            nick: caps.get(2)?.as_str().to_string(),
            text: caps.get(3).map_or("", |m| m.as_str()).to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "SpokenLineParser"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_spoken_line_with_brackets() {
        let parser = SpokenLineParser::new().unwrap();
        let line = parser.parse("[12:01:05] <alice> hello  ").unwrap();

        assert_eq!(line.nick, "alice");
        assert_eq!(line.text, "hello");
        assert_eq!(line.time, NaiveTime::from_hms_opt(12, 1, 5));
    }

    #[test]
    fn test_spoken_line_without_time() {
        let parser = SpokenLineParser::new().unwrap();
        let line = parser.parse("<@bob> #startmeeting").unwrap();

        assert_eq!(line.nick, "bob");
        assert_eq!(line.text, "#startmeeting");
        assert!(line.time.is_none());
    }

    #[test]
    fn test_action_line_is_not_spoken() {
        let parser = SpokenLineParser::new().unwrap();
        assert!(parser.parse("12:00 * bob waves").is_none());
    }
}
