//! Meeting lifecycle phase.

use serde::{Deserialize, Serialize};

/// Phase of a meeting's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingPhase {
    /// Created, waiting for `#startmeeting`.
    NotStarted,
    Running,
    /// Ended or aborted. Only a final save may still read the state.
    Over,
}

impl MeetingPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Over => "over",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_phase_as_str() {
        assert_eq!(MeetingPhase::NotStarted.as_str(), "not_started");
        assert_eq!(MeetingPhase::Running.as_str(), "running");
        assert_eq!(MeetingPhase::Over.as_str(), "over");
    }

    #[test]
    fn test_meeting_phase_serialization() {
        let json = serde_json::to_string(&MeetingPhase::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");

        let parsed: MeetingPhase = serde_json::from_str("\"over\"").unwrap();
        assert_eq!(parsed, MeetingPhase::Over);
    }
}
