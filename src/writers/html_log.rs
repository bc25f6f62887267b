//! The raw transcript as an HTML page with per-line anchors.

use regex::Regex;
use std::sync::OnceLock;

use crate::minutes::escape;

use super::css::{stylesheet, CssTarget};
use super::html::html_page;
use super::{RenderContext, Writer, WriterError};

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn spoken_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(
        &RE,
        r"^\s*(?P<time>\[?[0-9:]*\]?)(?P<nick>\s+<[@+\s]?[^>]+>)\s*(?P<line>.*)$",
    )
}

fn action_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(
        &RE,
        r"^\s*(?P<time>\[?[0-9:]*\]?)(?P<nick>\s+\*\s+[@+\s]?\S+)\s*(?P<line>.*)$",
    )
}

fn highlight_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^(\S+:)( .*)$")
}

pub struct HtmlLogWriter;

impl HtmlLogWriter {
    /// Markup for what was said: commands and `nick:` highlights stand out.
    fn spoken_text(text: &str, markers: &str) -> String {
        let marker = text.chars().next().filter(|c| markers.contains(*c));
        if let Some(marker) = marker {
            let name_start = marker.len_utf8();
            let word_end = text[name_start..]
                .find(char::is_whitespace)
                .map_or(text.len(), |i| i + name_start);
            let args = text[word_end..].trim_start_matches([' ', '\t', '\x0b', '\x0c']);
            let command = &text[..text.len() - args.len()];

            let class = if text[name_start..word_end].eq_ignore_ascii_case("topic") {
                "topic"
            } else {
                "cmd"
            };
            return format!(
                "<span class=\"{class}\">{}</span><span class=\"{class}line\">{}</span>",
                escape::html(command),
                escape::html(args),
                class = class
            );
        }

        if let Some(caps) = highlight_re().and_then(|re| re.captures(text)) {
            return format!(
                "<span class=\"hi\">{}</span>{}",
                escape::html(&caps[1]),
                escape::html(&caps[2])
            );
        }
        escape::html(text)
    }

    fn render_line(line: &str, linenum: usize, markers: &str) -> String {
        if let Some(caps) = spoken_re().and_then(|re| re.captures(line)) {
            return format!(
                "<a href=\"#l-{n}\" name=\"l-{n}\"><span class=\"tm\">{}</span></a>\
                 <span class=\"nk\">{}</span> {}",
                escape::html(&caps["time"]),
                escape::html(&caps["nick"]),
                Self::spoken_text(&caps["line"], markers),
                n = linenum
            );
        }
        if let Some(caps) = action_re().and_then(|re| re.captures(line)) {
            return format!(
                "<a name=\"l-{}\"></a><span class=\"tm\">{}</span>\
                 <span class=\"nka\">{}</span> <span class=\"ac\">{}</span>",
                linenum,
                escape::html(&caps["time"]),
                escape::html(&caps["nick"]),
                escape::html(&caps["line"])
            );
        }
        // Unrecognized lines still get an anchor.
        format!("<a name=\"l-{}\"></a>{}", linenum, escape::html(line))
    }
}

impl Writer for HtmlLogWriter {
    fn name(&self) -> &'static str {
        "html-log"
    }

    fn format(&self, ctx: &RenderContext<'_>) -> Result<String, WriterError> {
        let meeting = ctx.meeting;
        let markers = &meeting.config().meeting.command_markers;

        let lines: Vec<String> = meeting
            .lines()
            .iter()
            .enumerate()
            .map(|(idx, line)| Self::render_line(line, idx + 1, markers))
            .collect();

        let css = stylesheet(meeting.config(), CssTarget::Log)?;
        let title = format!("{} log", escape::html(meeting.channel()));
        let body = format!("<pre>{}</pre>", lines.join("\n"));
        Ok(html_page(&title, &css, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{finished_meeting, render};
    use super::*;

    #[test]
    fn test_spoken_line_anchor() {
        let html = HtmlLogWriter::render_line("14:07 <bo> hello <there>", 3, "#");
        assert_eq!(
            html,
            "<a href=\"#l-3\" name=\"l-3\"><span class=\"tm\">14:07</span></a>\
             <span class=\"nk\"> &lt;bo&gt;</span> hello &lt;there&gt;"
        );
    }

    #[test]
    fn test_topic_and_command_markup() {
        let topic = HtmlLogWriter::spoken_text("#topic Budget", "#");
        assert_eq!(
            topic,
            "<span class=\"topic\">#topic </span><span class=\"topicline\">Budget</span>"
        );

        let command = HtmlLogWriter::spoken_text("#info costs", "#");
        assert!(command.starts_with("<span class=\"cmd\">#info </span>"));
    }

    #[test]
    fn test_highlight_markup() {
        let hi = HtmlLogWriter::spoken_text("al: ping", "#");
        assert_eq!(hi, "<span class=\"hi\">al:</span> ping");
    }

    #[test]
    fn test_action_line() {
        let html = HtmlLogWriter::render_line("14:08 * bo waves", 9, "#");
        assert!(html.starts_with("<a name=\"l-9\"></a>"));
        assert!(html.contains("<span class=\"ac\">waves</span>"));
    }

    #[test]
    fn test_full_log_page() {
        let meeting = finished_meeting();
        let html = render(&HtmlLogWriter, &meeting, &[]);

        assert!(html.contains("<title>#dev log</title>"));
        assert!(html.contains("<pre>"));
        assert_eq!(html.matches("name=\"l-").count(), meeting.lines().len());
    }
}
