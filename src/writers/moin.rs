//! MoinMoin minutes.

use crate::minutes::{escape, ItemKind};

use super::report::Report;
use super::{RenderContext, Writer, WriterError};

const SECTION_SEPARATOR: &str = "\n\n\n\n";

fn heading(name: &str) -> String {
    format!("== {} ==\n", name)
}

pub struct MoinWriter;

impl MoinWriter {
    fn meeting_items(report: &Report<'_>) -> String {
        let mut lines = vec![heading("Meeting summary")];
        let mut have_topic = false;
        let mut have_subtopic = false;
        for item in report.items() {
            let entry = item.moin();
            match item.kind {
                ItemKind::Topic => {
                    have_subtopic = false;
                    if have_topic {
                        lines.push(String::new());
                    }
                    have_topic = true;
                    lines.push(entry);
                }
                ItemKind::Subtopic => {
                    have_subtopic = true;
                    lines.push(format!(" * {}", entry));
                }
                _ if have_subtopic => lines.push(format!("  * {}", entry)),
                _ => {
                    have_topic = true;
                    lines.push(format!(" * {}", entry));
                }
            }
        }
        lines.join("\n")
    }

    fn votes(report: &Report<'_>) -> Option<String> {
        let results = report.meeting.vote_results();
        if results.is_empty() {
            return None;
        }

        let mut lines = vec![heading("Vote results")];
        for result in results {
            lines.push(format!(
                " * [[{}#l-{}|{}]]",
                report.full_logs_url,
                result.start_line,
                escape::moin(&result.topic)
            ));
            lines.push(format!("  * {}", result.summary()));
            if !result.public_voters.is_empty() {
                lines.push(format!("   * Voters: {}", result.public_voters.join(", ")));
            }
        }
        Some(lines.join("\n"))
    }

    fn action_items_by_person(report: &Report<'_>) -> Option<String> {
        let groups = report.action_groups();
        if groups.is_empty() {
            return None;
        }

        let mut lines = vec![heading("Action items, by person")];
        for (nick, items) in &groups.by_nick {
            lines.push(format!(" * {}", escape::moin(nick)));
            lines.extend(items.iter().map(|m| format!("  * {}", escape::moin(&m.line))));
        }
        if !groups.unassigned.is_empty() {
            lines.push(" * **UNASSIGNED**".to_string());
            lines.extend(
                groups
                    .unassigned
                    .iter()
                    .map(|m| format!("  * {}", escape::moin(&m.line))),
            );
        }
        Some(lines.join("\n"))
    }

    fn done_items(report: &Report<'_>) -> Option<String> {
        let done = report.items_of(ItemKind::Done);
        if done.is_empty() {
            return None;
        }
        let mut lines = vec![heading("Done items")];
        lines.extend(done.iter().map(|m| format!(" * {}", escape::moin(&m.line))));
        Some(lines.join("\n"))
    }

    fn people_present(report: &Report<'_>) -> String {
        let mut lines = vec![heading("People present (lines said)")];
        lines.extend(
            report
                .attendees_by_count()
                .into_iter()
                .map(|(nick, count)| format!(" * {} ({})", escape::moin(nick), count)),
        );
        lines.join("\n")
    }

    fn full_log(report: &Report<'_>) -> String {
        let mut lines = vec![heading("Full log")];
        lines.extend(report.meeting.lines().iter().map(|l| format!(" {}", l)));
        lines.join("\n\n")
    }
}

impl Writer for MoinWriter {
    fn name(&self) -> &'static str {
        "moin"
    }

    fn format(&self, ctx: &RenderContext<'_>) -> Result<String, WriterError> {
        let report = ctx.report()?;

        let mut body = vec![format!(
            "== Meeting information ==\n\n \
             * {}, started by {}, {} at {} &mdash; {} {}.\n \
             * Full logs at {}",
            report.page_title,
            report.owner,
            report.start_date,
            report.start_time_short,
            report.end_time_short,
            report.time_zone,
            report.full_logs_url
        )];
        body.push(Self::meeting_items(&report));
        body.extend(Self::votes(&report));
        body.extend(Self::action_items_by_person(&report));
        body.extend(Self::done_items(&report));
        body.push(Self::people_present(&report));
        if ctx.meeting.config().output.moin_full_logs {
            body.push(Self::full_log(&report));
        }
        body.push(format!(
            "Generated by MeetBot {} ({})",
            report.version, report.info_url
        ));

        Ok(body.join(SECTION_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{finished_meeting, meeting_with, render};
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_meeting_information_block() {
        let meeting = finished_meeting();
        let moin = render(&MoinWriter, &meeting, &[]);

        assert!(moin.starts_with(
            "== Meeting information ==\n\n * #dev: Weekly sync meeting, started by al, \
             05 Mar at 14:07 &mdash; 14:22 UTC.\n * Full logs at "
        ));
    }

    #[test]
    fn test_subtopic_items_nest_deeper() {
        let meeting = finished_meeting();
        let moin = render(&MoinWriter, &meeting, &[]);

        assert!(moin.contains("'''Release'''  (al, 14:17:00)\n * ''SUBTOPIC:'' Notes"));
        assert!(moin.contains("\n  * ''LINK:'' http://example.org/notes the notes"));
    }

    #[test]
    fn test_votes_and_done_items() {
        let meeting = finished_meeting();
        let moin = render(&MoinWriter, &meeting, &[]);

        assert!(moin.contains("== Vote results ==\n"));
        assert!(moin.contains("|Ship it?]]\n  * Motion carried (For: 1, Against: 0, Abstained: 0)"));
        assert!(moin.contains("   * Voters: bo"));
        assert!(moin.contains("== Done items ==\n\n * bo shipped the notes"));
    }

    #[test]
    fn test_full_log_toggle() {
        let meeting = finished_meeting();
        assert!(render(&MoinWriter, &meeting, &[]).contains("== Full log =="));

        let mut config = Config::default();
        config.output.moin_full_logs = false;
        let quiet = meeting_with(config, &[("al", "#startmeeting"), ("al", "#endmeeting")]);
        assert!(!render(&MoinWriter, &quiet, &[]).contains("== Full log =="));
    }
}
