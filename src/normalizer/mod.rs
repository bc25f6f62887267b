//! Chat line normalization.
//!
//! Live lines are cleaned and classified before they reach a meeting.
//! Historical transcripts are split back into (time, nick, text) triples
//! by one parser per line shape.

mod action_line;
mod line;
mod replay_parser;
mod spoken_line;
mod transcript_line_parser;

pub use action_line::ActionLineParser;
pub use line::{LineKind, NormalizedLine};
pub use replay_parser::{parse_transcript, ReplayParser};
pub use spoken_line::SpokenLineParser;
pub use transcript_line_parser::{parse_clock, ReplayLine, TranscriptLineParser};
