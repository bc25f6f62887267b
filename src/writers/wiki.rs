//! MediaWiki and PmWiki minutes. The two dialects only differ in how
//! headings are written.

use crate::minutes::{escape, ItemKind};

use super::report::{wrap_list, Report};
use super::{RenderContext, Writer, WriterError};

const SECTION_SEPARATOR: &str = "\n\n\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    MediaWiki,
    PmWiki,
}

pub struct WikiWriter {
    dialect: Dialect,
}

impl WikiWriter {
    pub fn mediawiki() -> Self {
        Self {
            dialect: Dialect::MediaWiki,
        }
    }

    pub fn pmwiki() -> Self {
        Self {
            dialect: Dialect::PmWiki,
        }
    }

    /// Level 0 is the page title, level 1 a section.
    fn heading(&self, name: &str, level: usize) -> String {
        match self.dialect {
            Dialect::MediaWiki => {
                let marks = "=".repeat(level + 1);
                format!("{} {} {}\n", marks, name, marks)
            }
            Dialect::PmWiki => format!("{} {}\n", "!".repeat(level + 1), name),
        }
    }

    fn meeting_items(&self, report: &Report<'_>) -> String {
        let mut lines = vec![self.heading("Meeting summary", 1)];
        let mut have_topic = false;
        for item in report.items() {
            if item.kind.is_topic() {
                if have_topic {
                    lines.push(String::new());
                }
                have_topic = true;
                lines.push(format!("* {}", item.mediawiki()));
            } else if have_topic {
                lines.push(format!("** {}", item.mediawiki()));
            } else {
                lines.push(format!("* {}", item.mediawiki()));
            }
        }
        lines.join("\n")
    }

    fn action_items(&self, report: &Report<'_>) -> Option<String> {
        let actions = report.items_of(ItemKind::Action);
        if actions.is_empty() {
            return None;
        }
        let mut lines = vec![self.heading("Action items", 1)];
        lines.extend(actions.iter().map(|m| format!("* {}", escape::mediawiki(&m.line))));
        Some(lines.join("\n"))
    }

    fn action_items_by_person(&self, report: &Report<'_>) -> Option<String> {
        let groups = report.action_groups();
        if groups.is_empty() {
            return None;
        }

        let mut lines = vec![self.heading("Action items, by person", 1)];
        for (nick, items) in &groups.by_nick {
            lines.push(format!("* {}", escape::mediawiki(nick)));
            lines.extend(items.iter().map(|m| format!("** {}", escape::mediawiki(&m.line))));
        }
        if !groups.unassigned.is_empty() {
            lines.push("* **UNASSIGNED**".to_string());
            lines.extend(
                groups
                    .unassigned
                    .iter()
                    .map(|m| format!("** {}", escape::mediawiki(&m.line))),
            );
        }
        Some(lines.join("\n"))
    }

    fn people_present(&self, report: &Report<'_>) -> String {
        let mut lines = vec![self.heading("People present (lines said)", 1)];
        lines.extend(
            report
                .attendees_by_count()
                .into_iter()
                .map(|(nick, count)| format!("* {} ({})", escape::mediawiki(nick), count)),
        );
        lines.join("\n")
    }
}

impl Writer for WikiWriter {
    fn name(&self) -> &'static str {
        match self.dialect {
            Dialect::MediaWiki => "mediawiki",
            Dialect::PmWiki => "pmwiki",
        }
    }

    fn format(&self, ctx: &RenderContext<'_>) -> Result<String, WriterError> {
        let report = ctx.report()?;

        let mut body = vec![format!(
            "{}\n{}",
            self.heading(&report.page_title, 0),
            wrap_list(
                &format!(
                    "Meeting started by {} at {} {}.  The full logs are available at {}",
                    report.owner, report.start_time, report.time_zone, report.full_logs_url
                ),
                0
            )
        )];
        body.push(self.meeting_items(&report));
        body.push(format!(
            "Meeting ended at {} {}.",
            report.end_time, report.time_zone
        ));
        body.extend(self.action_items(&report));
        body.extend(self.action_items_by_person(&report));
        body.push(self.people_present(&report));
        body.push(format!(
            "Generated by MeetBot {} ({})",
            report.version, report.info_url
        ));

        Ok(body.join(SECTION_SEPARATOR))
    }
}
