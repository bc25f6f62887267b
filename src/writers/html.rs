//! Nested-list HTML minutes, plus pieces shared with the other HTML writers.

use crate::minutes::{escape, ItemKind, MinutesItem};

use super::css::{stylesheet, CssTarget};
use super::nesting::ListNester;
use super::report::{indent_item, wrap_list, Report};
use super::{RenderContext, Writer, WriterError};

const SECTION_SEPARATOR: &str = "\n<br><br>\n\n\n\n";

/// Complete HTML 4.01 document.
pub(super) fn html_page(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01 Transitional//EN\">\n\
         <html>\n\
         <head>\n\
         <meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\">\n\
         <title>{}</title>\n\
         {}\n\
         </head>\n\
         \n\
         <body>\n\
         {}\n\
         </body>\n\
         </html>\n",
        title, head_extra, body
    )
}

/// `<li>` entries of the given items, one per line.
fn item_lines(items: &[&MinutesItem], indent: usize) -> Vec<String> {
    items
        .iter()
        .map(|m| wrap_list(&format!("<li>{}</li>", escape::html(&m.line)), indent))
        .collect()
}

/// Action item entries, or `None` when there are none.
pub(super) fn action_items(report: &Report<'_>) -> Option<Vec<String>> {
    let lines = item_lines(&report.items_of(ItemKind::Action), 2);
    (!lines.is_empty()).then_some(lines)
}

/// Action items grouped by person, unassigned ones last.
pub(super) fn action_items_by_person(report: &Report<'_>) -> Option<Vec<String>> {
    let groups = report.action_groups();
    if groups.is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    for (nick, items) in &groups.by_nick {
        lines.push(indent_item(
            &format!("<li>{}<ol type=\"a\">", escape::html(nick)),
            2,
        ));
        lines.extend(item_lines(items, 4));
        lines.push(indent_item("</ol></li>", 2));
    }
    if !groups.unassigned.is_empty() {
        lines.push(indent_item("<li><b>UNASSIGNED</b><ol>", 2));
        lines.extend(item_lines(&groups.unassigned, 4));
        lines.push(indent_item("</ol></li>", 2));
    }
    Some(lines)
}

pub(super) fn people_present(report: &Report<'_>) -> Vec<String> {
    report
        .attendees_by_count()
        .into_iter()
        .map(|(nick, count)| indent_item(&format!("<li>{} ({})</li>", escape::html(nick), count), 2))
        .collect()
}

fn heading(name: &str) -> String {
    format!("<h3>{}</h3>", name)
}

fn section(name: &str, lines: Vec<String>) -> String {
    let mut out = vec![heading(name), "<ol>".to_string()];
    out.extend(lines);
    out.push("</ol>".to_string());
    out.join("\n")
}

pub struct HtmlWriter;

impl HtmlWriter {
    fn meeting_items(report: &Report<'_>) -> String {
        let mut nester = ListNester::new();
        for item in report.items() {
            nester.push(item.kind, &item.html(&report.full_logs));
        }
        format!("{}\n{}", heading("Meeting summary"), nester.finish())
    }

    fn votes(report: &Report<'_>) -> Option<String> {
        let results = report.meeting.vote_results();
        if results.is_empty() {
            return None;
        }

        let mut lines = vec![heading("Vote results"), "<ol>".to_string()];
        for result in results {
            lines.push(wrap_list(
                &format!(
                    "<li><a href='{}#l-{}'>{}</a>",
                    report.full_logs,
                    result.start_line,
                    escape::html(&result.topic)
                ),
                2,
            ));
            lines.push(wrap_list(
                &format!("<ul><li>{}", escape::html(&result.summary())),
                4,
            ));
            if !result.public_voters.is_empty() {
                lines.push(wrap_list(
                    &format!(
                        "<ul><li>Voters: {}</li></ul>",
                        escape::html(&result.public_voters.join(", "))
                    ),
                    6,
                ));
            }
            lines.push(indent_item("</li></ul>", 4));
            lines.push(indent_item("</li>", 2));
        }
        lines.push("</ol>".to_string());
        Some(lines.join("\n"))
    }
}

impl Writer for HtmlWriter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn format(&self, ctx: &RenderContext<'_>) -> Result<String, WriterError> {
        let report = ctx.report()?;
        let title = escape::html(&report.page_title);

        let mut body = vec![format!(
            "<h1>{}</h1>\n<span class=\"details\">\n\
             Meeting started by {} at {} {}\n\
             (<a href=\"{}\">full logs</a>)</span>",
            title,
            escape::html(&report.owner),
            report.start_time,
            report.time_zone,
            report.full_logs
        )];
        body.push(Self::meeting_items(&report));
        body.push(format!(
            "<span class=\"details\">\n\
             Meeting ended at {} {}\n\
             (<a href=\"{}\">full logs</a>)</span>",
            report.end_time, report.time_zone, report.full_logs
        ));
        body.extend(Self::votes(&report));
        body.extend(action_items(&report).map(|lines| section("Action items", lines)));
        body.extend(
            action_items_by_person(&report).map(|lines| section("Action items, by person", lines)),
        );
        let done = item_lines(&report.items_of(ItemKind::Done), 2);
        if !done.is_empty() {
            body.push(section("Done items", done));
        }
        body.push(section("People present (lines said)", people_present(&report)));
        body.push(format!(
            "<span class=\"details\">Generated by <a href=\"{}\">MeetBot</a> {}</span>",
            report.info_url, report.version
        ));

        let css = stylesheet(ctx.meeting.config(), CssTarget::Minutes)?;
        Ok(html_page(&title, &css, &body.join(SECTION_SEPARATOR)))
    }
}
