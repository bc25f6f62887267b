//! Table-based HTML minutes.

use crate::minutes::escape;

use super::html::{action_items, action_items_by_person, html_page, people_present};
use super::report::indent_item;
use super::{RenderContext, Writer, WriterError};

pub struct HtmlTableWriter;

impl Writer for HtmlTableWriter {
    fn name(&self) -> &'static str {
        "html-table"
    }

    fn format(&self, ctx: &RenderContext<'_>) -> Result<String, WriterError> {
        let report = ctx.report()?;
        let title = escape::html(&report.page_title);
        let none = || vec![indent_item("<li>(None)</li>", 2)];

        let rows: Vec<String> = report
            .items()
            .iter()
            .map(|item| item.html_row(&report.full_logs))
            .collect();
        let actions = action_items(&report).unwrap_or_else(none);
        let by_person = action_items_by_person(&report).unwrap_or_else(none);

        let body = format!(
            "<h1>{title}</h1>\n\
             Meeting started by {owner} at {start} {tz}\n\
             (<a href=\"{logs}\">full logs</a>)\n\
             <br><br>\n\
             \n\
             <table border=1>\n\
             {rows}\n\
             </table>\n\
             <br><br>\n\
             \n\
             Meeting ended at {end} {tz}\n\
             (<a href=\"{logs}\">full logs</a>)\n\
             <br><br>\n\
             \n\
             <b>Action items</b>\n\
             <ol>\n\
             {actions}\n\
             </ol>\n\
             <br><br>\n\
             \n\
             <b>Action items, by person</b>\n\
             <ol>\n\
             {by_person}\n\
             </ol>\n\
             <br><br>\n\
             \n\
             <b>People present (lines said)</b>\n\
             <ol>\n\
             {people}\n\
             </ol>\n\
             <br><br>\n\
             \n\
             Generated by <a href=\"{info}\">MeetBot</a> {version}",
            title = title,
            owner = escape::html(&report.owner),
            start = report.start_time,
            end = report.end_time,
            tz = report.time_zone,
            logs = report.full_logs,
            rows = rows.join("\n"),
            actions = actions.join("\n"),
            by_person = by_person.join("\n"),
            people = people_present(&report).join("\n"),
            info = report.info_url,
            version = report.version,
        );

        // This layout carries no stylesheet.
        Ok(html_page(&title, "", &body))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{finished_meeting, meeting_with, render};
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_table_rows_for_every_item() {
        let meeting = finished_meeting();
        let html = render(&HtmlTableWriter, &meeting, &[]);

        assert_eq!(html.matches("<tr>").count(), meeting.minutes().len());
        assert!(html.contains("<th colspan=3>Topic: Budget</th>"));
        assert!(html.contains("<b>Action items, by person</b>"));
    }

    #[test]
    fn test_empty_sections_say_none() {
        let meeting = meeting_with(
            Config::default(),
            &[("al", "#startmeeting"), ("al", "#endmeeting")],
        );
        let html = render(&HtmlTableWriter, &meeting, &[]);
        assert_eq!(html.matches("<li>(None)</li>").count(), 2);
    }
}
