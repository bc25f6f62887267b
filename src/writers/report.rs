//! Data shared by the minutes writers.

use chrono::{DateTime, Utc};
use regex::RegexBuilder;

use crate::meeting::Meeting;
use crate::minutes::{ItemKind, MinutesItem};

use super::WriterError;

const WRAP_WIDTH: usize = 72;

/// Action items grouped by the attendee they mention.
#[derive(Debug, Default)]
pub struct ActionGroups<'a> {
    /// Attendees in case-insensitive order, only those with items.
    pub by_nick: Vec<(&'a str, Vec<&'a MinutesItem>)>,
    /// Items that mention nobody.
    pub unassigned: Vec<&'a MinutesItem>,
}

impl ActionGroups<'_> {
    pub fn is_empty(&self) -> bool {
        self.by_nick.is_empty() && self.unassigned.is_empty()
    }
}

/// A meeting snapshot plus the names and header fields every summary uses.
pub struct Report<'a> {
    pub meeting: &'a Meeting,
    pub page_title: String,
    pub owner: String,
    pub start_time: String,
    pub start_time_short: String,
    pub start_date: String,
    pub end_time: String,
    pub end_time_short: String,
    pub time_zone: String,
    /// Relative link to the HTML log.
    pub full_logs: String,
    pub full_logs_url: String,
    pub info_url: String,
    pub version: &'static str,
}

impl<'a> Report<'a> {
    pub fn new(meeting: &'a Meeting) -> Result<Self, WriterError> {
        let base = meeting.output_base()?;
        let basename = base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let url = meeting.url_base()?;

        let fmt = |t: Option<DateTime<Utc>>, f: &str| {
            t.map(|t| t.format(f).to_string())
                .unwrap_or_else(|| "None".to_string())
        };

        Ok(Self {
            meeting,
            page_title: page_title(meeting),
            owner: meeting.owner().unwrap_or_default().to_string(),
            start_time: fmt(meeting.start_time(), "%H:%M:%S"),
            start_time_short: fmt(meeting.start_time(), "%H:%M"),
            start_date: fmt(meeting.start_time(), "%d %b"),
            end_time: fmt(meeting.end_time(), "%H:%M:%S"),
            end_time_short: fmt(meeting.end_time(), "%H:%M"),
            time_zone: meeting.config().output.time_zone.clone(),
            full_logs: format!("{}.log.html", basename),
            full_logs_url: format!("{}.log.html", url),
            info_url: meeting.config().meeting.info_url.clone(),
            version: crate::VERSION,
        })
    }

    pub fn items(&self) -> &'a [MinutesItem] {
        self.meeting.minutes()
    }

    pub fn items_of(&self, kind: ItemKind) -> Vec<&'a MinutesItem> {
        self.items().iter().filter(|m| m.kind == kind).collect()
    }

    /// Attendees by lines spoken, most first. Ties keep nick order.
    pub fn attendees_by_count(&self) -> Vec<(&'a str, usize)> {
        let mut nicks: Vec<(&str, usize)> = self
            .meeting
            .attendees()
            .iter()
            .map(|(nick, count)| (nick.as_str(), *count))
            .collect();
        nicks.sort_by(|a, b| b.1.cmp(&a.1));
        nicks
    }

    /// Group action items under every attendee named in them as a whole
    /// word, ignoring case. One item may land under several attendees.
    pub fn action_groups(&self) -> ActionGroups<'a> {
        let actions = self.items_of(ItemKind::Action);
        let mut nicks: Vec<&str> = self.meeting.attendees().keys().map(String::as_str).collect();
        nicks.sort_by_key(|n| n.to_lowercase());

        let mut assigned = vec![false; actions.len()];
        let mut groups = ActionGroups::default();

        for nick in nicks {
            let Ok(pattern) = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(nick)))
                .case_insensitive(true)
                .build()
            else {
                continue;
            };

            let mut items = Vec::new();
            for (idx, item) in actions.iter().enumerate() {
                if pattern.is_match(&item.line) {
                    assigned[idx] = true;
                    items.push(*item);
                }
            }
            if !items.is_empty() {
                groups.by_nick.push((nick, items));
            }
        }

        groups.unassigned = actions
            .iter()
            .zip(&assigned)
            .filter(|(_, assigned)| !**assigned)
            .map(|(item, _)| *item)
            .collect();
        groups
    }
}

/// `#channel: Topic meeting` when a meeting topic is set, else `#channel meeting`.
pub fn page_title(meeting: &Meeting) -> String {
    match meeting.meeting_topic() {
        Some(topic) if topic.to_lowercase().contains("meeting") => {
            format!("{}: {}", meeting.channel(), topic)
        }
        Some(topic) => format!("{}: {} meeting", meeting.channel(), topic),
        None => format!("{} meeting", meeting.channel()),
    }
}

/// Prefix `text` with `indent` spaces.
pub fn indent_item(text: &str, indent: usize) -> String {
    format!("{}{}", " ".repeat(indent), text)
}

/// Fill `text` to 72 columns. The first line is indented by `indent`,
/// the rest by `indent + 2`. Words are never broken and runs of
/// whitespace inside a line are kept.
pub fn wrap_list(text: &str, indent: usize) -> String {
    let initial = " ".repeat(indent);
    let subsequent = " ".repeat(indent + 2);

    // Alternating whitespace / word chunks, whitespace flattened to spaces.
    let mut chunks: Vec<String> = Vec::new();
    for c in text.chars() {
        let c = if c.is_whitespace() { ' ' } else { c };
        match chunks.last_mut() {
            Some(last) if last.ends_with(' ') == (c == ' ') => last.push(c),
            _ => chunks.push(c.to_string()),
        }
    }
    chunks.reverse();

    let mut lines: Vec<String> = Vec::new();
    while !chunks.is_empty() {
        let indent = if lines.is_empty() { &initial } else { &subsequent };
        let width = WRAP_WIDTH.saturating_sub(indent.len());

        if !lines.is_empty() && chunks.last().is_some_and(|c| c.trim().is_empty()) {
            chunks.pop();
        }

        let mut line: Vec<String> = Vec::new();
        let mut len = 0;
        while let Some(chunk) = chunks.last() {
            let chunk_len = chunk.chars().count();
            if len + chunk_len > width {
                break;
            }
            len += chunk_len;
            line.extend(chunks.pop());
        }

        // A word longer than the line goes on a line of its own.
        if line.is_empty() {
            line.extend(chunks.pop());
        }
        if line.last().is_some_and(|c| c.trim().is_empty()) {
            line.pop();
        }
        if !line.is_empty() {
            lines.push(format!("{}{}", indent, line.concat()));
        }
    }

    lines.join("\n")
}
