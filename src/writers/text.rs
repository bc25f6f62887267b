//! Plain text minutes.

use crate::minutes::{escape, ItemKind};

use super::report::{wrap_list, Report};
use super::{RenderContext, Writer, WriterError};

const SECTION_SEPARATOR: &str = "\n\n\n\n";

fn heading(name: &str) -> String {
    format!("{}\n{}\n", name, "-".repeat(name.chars().count()))
}

fn bullet(line: &str, indent: usize) -> String {
    wrap_list(&format!("* {}", escape::text(line)), indent)
}

pub struct TextWriter;

impl TextWriter {
    fn meeting_items(report: &Report<'_>) -> String {
        let mut lines = vec![heading("Meeting summary")];
        let mut have_topic = false;
        for item in report.items() {
            let entry = format!("* {}", item.text());
            if item.kind.is_topic() {
                if have_topic {
                    lines.push(String::new());
                }
                have_topic = true;
                lines.push(wrap_list(&entry, 0));
            } else {
                lines.push(wrap_list(&entry, if have_topic { 2 } else { 0 }));
            }
        }
        lines.join("\n")
    }

    fn action_items(report: &Report<'_>) -> Option<String> {
        let actions = report.items_of(ItemKind::Action);
        if actions.is_empty() {
            return None;
        }
        let mut lines = vec![heading("Action items")];
        lines.extend(actions.iter().map(|m| bullet(&m.line, 0)));
        Some(lines.join("\n"))
    }

    fn action_items_by_person(report: &Report<'_>) -> Option<String> {
        let groups = report.action_groups();
        if groups.is_empty() {
            return None;
        }

        let mut lines = vec![heading("Action items, by person")];
        for (nick, items) in &groups.by_nick {
            lines.push(format!("* {}", escape::text(nick)));
            lines.extend(items.iter().map(|m| bullet(&m.line, 2)));
        }
        if !groups.unassigned.is_empty() {
            lines.push("* **UNASSIGNED**".to_string());
            lines.extend(groups.unassigned.iter().map(|m| bullet(&m.line, 2)));
        }
        Some(lines.join("\n"))
    }

    fn people_present(report: &Report<'_>) -> String {
        let mut lines = vec![heading("People present (lines said)")];
        lines.extend(
            report
                .attendees_by_count()
                .into_iter()
                .map(|(nick, count)| format!("* {} ({})", escape::text(nick), count)),
        );
        lines.join("\n")
    }
}

impl Writer for TextWriter {
    fn name(&self) -> &'static str {
        "text"
    }

    fn format(&self, ctx: &RenderContext<'_>) -> Result<String, WriterError> {
        let report = ctx.report()?;
        let bar = "=".repeat(report.page_title.chars().count());

        let mut body = vec![format!(
            "{bar}\n{title}\n{bar}\n\n\n{started}",
            bar = bar,
            title = report.page_title,
            started = wrap_list(
                &format!(
                    "Meeting started by {} at {} {}.  The full logs are available at {}",
                    report.owner, report.start_time, report.time_zone, report.full_logs_url
                ),
                0
            ),
        )];
        body.push(Self::meeting_items(&report));
        body.push(format!(
            "Meeting ended at {} {}.",
            report.end_time, report.time_zone
        ));
        body.extend(Self::action_items(&report));
        body.extend(Self::action_items_by_person(&report));
        body.push(Self::people_present(&report));
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
    fn test_items_indented_under_topics() {
        let meeting = finished_meeting();
        let text = render(&TextWriter, &meeting, &[]);

        assert!(text.contains("* Budget  (al, 14:09:00)\n  * INFO: costs are <up>  (al, 14:11:00)"));
        assert!(text.contains("\n\n* Release  (al, 14:17:00)"));
        assert!(text.contains("  * LINK: http://example.org/notes the notes  (al, 14:19:00)"));
    }

    #[test]
    fn test_full_logs_url() {
        let meeting = finished_meeting();
        let text = render(&TextWriter, &meeting, &[]);
        assert!(text.contains("dev/2024/dev.2024-03-05-14.07.log.html"));
    }

    #[test]
    fn test_empty_action_sections_are_left_out() {
        let meeting = meeting_with(
            Config::default(),
            &[("al", "#startmeeting"), ("al", "#endmeeting")],
        );
        let text = render(&TextWriter, &meeting, &[]);

        assert!(!text.contains("Action items"));
        let people = format!("{}\n* al (2)", heading("People present (lines said)"));
        assert!(text.contains(&people));
    }
}
