use chrono::NaiveTime;

use crate::normalizer::LineKind;

/// One line recovered from a historical transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayLine {
    pub kind: LineKind,
    pub time: Option<NaiveTime>,
    pub nick: String,
    pub text: String,
}

impl ReplayLine {
    /// Text to feed back into a meeting; emotes get their keyword back.
    pub fn payload(&self) -> String {
        match self.kind {
            LineKind::Action => format!("ACTION {}", self.text),
            LineKind::Spoken => self.text.clone(),
        }
    }
}

/// Trait for recognizing one shape of historical log line
pub trait TranscriptLineParser: Send + Sync {
    /// Parse a line, or `None` if it does not have this shape
    fn parse(&self, line: &str) -> Option<ReplayLine>;

    /// Get the name of this parser for logging
    fn name(&self) -> &'static str;
}

/// Parse `HH:MM:SS` or `HH:MM`; anything else means "no time".
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock_formats() {
        assert_eq!(parse_clock("12:30"), NaiveTime::from_hms_opt(12, 30, 0));
        assert_eq!(parse_clock("12:30:15"), NaiveTime::from_hms_opt(12, 30, 15));
        assert_eq!(parse_clock(""), None);
        assert_eq!(parse_clock("noon"), None);
    }
}
