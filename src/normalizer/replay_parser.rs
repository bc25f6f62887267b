use anyhow::Result;
use tracing::{debug, info};

use crate::normalizer::{ActionLineParser, ReplayLine, SpokenLineParser, TranscriptLineParser};

/// Enum to hold the different historical line shapes
pub enum ReplayParser {
    Spoken(SpokenLineParser),
    Action(ActionLineParser),
}

impl ReplayParser {
    /// Every known line shape, in matching order
    pub fn all() -> Result<Vec<Self>> {
        Ok(vec![
            ReplayParser::Spoken(SpokenLineParser::new()?),
            ReplayParser::Action(ActionLineParser::new()?),
        ])
    }

    /// Run this parser on one line
    pub fn run(&self, line: &str) -> Option<ReplayLine> {
        match self {
            ReplayParser::Spoken(p) => p.parse(line),
            ReplayParser::Action(p) => p.parse(line),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReplayParser::Spoken(p) => p.name(),
            ReplayParser::Action(p) => p.name(),
        }
    }
}

/// Split a whole transcript into lines; unrecognized lines are dropped.
pub fn parse_transcript(contents: &str) -> Result<Vec<ReplayLine>> {
    let parsers = ReplayParser::all()?;
    let mut parsed = Vec::new();
    let mut skipped = 0usize;

    for raw in contents.lines() {
        match parsers.iter().find_map(|p| p.run(raw)) {
            Some(line) => parsed.push(line),
            None => {
                if !raw.trim().is_empty() {
                    debug!("No parser matched line: {:?}", raw);
                }
                skipped += 1;
            }
        }
    }

    info!(
        "Parsed {} transcript lines ({} skipped) using {}",
        parsed.len(),
        skipped,
        parsers
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::LineKind;

    #[test]
    fn test_parse_mixed_transcript() {
        let contents = "\
12:00 <alice> #startmeeting
12:01 * bob waves
-- server notice --

[12:02] <alice> #endmeeting
";
        let lines = parse_transcript(contents).unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "#startmeeting");
        assert_eq!(lines[1].kind, LineKind::Action);
        assert_eq!(lines[1].payload(), "ACTION waves");
        assert_eq!(lines[2].nick, "alice");
    }
}
