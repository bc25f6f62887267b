//! reStructuredText minutes.

use std::collections::BTreeSet;

use crate::minutes::{escape, ItemKind};

use super::report::{wrap_list, Report};
use super::{RenderContext, Writer, WriterError};

const SECTION_SEPARATOR: &str = "\n\n\n\n\n";

fn heading(name: &str) -> String {
    format!("{}\n{}", name, "-".repeat(name.chars().count()))
}

pub struct RstWriter;

impl RstWriter {
    fn meeting_items(report: &Report<'_>) -> String {
        let mut items = Vec::new();
        let mut targets = Vec::new();
        let mut seen = BTreeSet::new();
        let mut have_topic = false;

        for item in report.items() {
            let (entry, target) = item.rst(&report.full_logs);
            if seen.insert(item.rst_ref()) {
                targets.push(target);
            }

            let entry = format!("* {}", entry);
            if item.kind.is_topic() {
                if have_topic {
                    items.push(String::new());
                }
                have_topic = true;
                items.push(wrap_list(&entry, 0));
            } else {
                items.push(wrap_list(&entry, if have_topic { 2 } else { 0 }));
            }
        }

        format!("{}\n\n{}", items.join("\n\n"), targets.join("\n"))
    }

    fn action_items(report: &Report<'_>) -> String {
        let items: Vec<String> = report
            .items_of(ItemKind::Action)
            .iter()
            .map(|m| wrap_list(&format!("* {}", escape::rst(&m.line)), 0))
            .collect();
        if items.is_empty() {
            return "* (None)".to_string();
        }
        items.join("\n\n")
    }

    fn action_items_by_person(report: &Report<'_>) -> String {
        let groups = report.action_groups();
        if groups.by_nick.is_empty() && groups.unassigned.is_empty() {
            return "* (None)".to_string();
        }

        let mut lines = Vec::new();
        for (nick, items) in &groups.by_nick {
            lines.push(format!("* {}", escape::rst(nick)));
            for m in items {
                lines.push(wrap_list(&format!("* {}", escape::rst(&m.line)), 2));
            }
        }
        if !groups.unassigned.is_empty() {
            lines.push("* **UNASSIGNED**".to_string());
            for m in &groups.unassigned {
                lines.push(wrap_list(&format!("* {}", escape::rst(&m.line)), 2));
            }
        }
        lines.join("\n\n")
    }
}

impl Writer for RstWriter {
    fn name(&self) -> &'static str {
        "rst"
    }

    fn format(&self, ctx: &RenderContext<'_>) -> Result<String, WriterError> {
        let report = ctx.report()?;
        let title_bar = "=".repeat(report.page_title.chars().count());
        let logs_target = format!(".. _`full logs`: {}", report.full_logs);

        let people: Vec<String> = report
            .attendees_by_count()
            .into_iter()
            .map(|(nick, count)| format!("* {} ({})", escape::rst(nick), count))
            .collect();

        let sections = [
            format!(
                "{bar}\n{title}\n{bar}\n\n\n{started}\n\n{target}",
                bar = title_bar,
                title = report.page_title,
                started = wrap_list(
                    &format!(
                        "Meeting started by {} at {} {} (`full logs`_)",
                        report.owner, report.start_time, report.time_zone
                    ),
                    0
                ),
                target = logs_target,
            ),
            format!(
                "{}\n{}\n\nMeeting ended at {} {} (`full logs`_)\n\n{}",
                heading("Meeting summary"),
                Self::meeting_items(&report),
                report.end_time,
                report.time_zone,
                logs_target
            ),
            format!("{}\n{}", heading("Action items"), Self::action_items(&report)),
            format!(
                "{}\n{}",
                heading("Action items, by person"),
                Self::action_items_by_person(&report)
            ),
            format!(
                "{}\n{}",
                heading("People present (lines said)"),
                people.join("\n\n")
            ),
            format!(
                "Generated by `MeetBot`_ {}\n\n.. _`MeetBot`: {}\n",
                report.version, report.info_url
            ),
        ];

        Ok(sections.join(SECTION_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{finished_meeting, render};
    use super::*;

    #[test]
    fn test_title_block_matches_title() {
        let meeting = finished_meeting();
        let rst = render(&RstWriter, &meeting, &[]);
        let mut lines = rst.lines();

        let bar = lines.next().unwrap();
        let title = lines.next().unwrap();
        assert_eq!(title, "#dev: Weekly sync meeting");
        assert_eq!(bar.len(), title.len());
        assert_eq!(lines.next().unwrap(), bar);
    }

    #[test]
    fn test_items_reference_log_lines() {
        let meeting = finished_meeting();
        let rst = render(&RstWriter, &meeting, &[]);

        assert!(rst.contains("* **Budget**  (`al-3`_)"));
        assert!(rst.contains(".. _`al-3`: dev.2024-03-05-14.07.log.html#l-3"));
        assert!(rst.contains(".. _`full logs`: dev.2024-03-05-14.07.log.html"));
    }

    #[test]
    fn test_unassigned_actions() {
        let meeting = finished_meeting();
        let rst = render(&RstWriter, &meeting, &[]);
        assert!(rst.contains("* **UNASSIGNED**\n\n  * someone checks the numbers"));
    }
}
