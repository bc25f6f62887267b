use chrono::{DateTime, Utc};
use serde::Serialize;

use super::escape;

/// Type of a recorded minutes entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemKind {
    Topic,
    Subtopic,
    Action,
    Info,
    Idea,
    Help,
    Link,
    Done,
    Agreed,
    Accepted,
    Rejected,
    Vote,
}

impl ItemKind {
    /// Label shown in rendered minutes.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Topic => "TOPIC",
            Self::Subtopic => "SUBTOPIC",
            Self::Action => "ACTION",
            Self::Info => "INFO",
            Self::Idea => "IDEA",
            Self::Help => "HELP",
            Self::Link => "LINK",
            Self::Done => "DONE",
            Self::Agreed => "AGREED",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Vote => "VOTE",
        }
    }

    pub fn is_topic(&self) -> bool {
        matches!(self, Self::Topic)
    }
}

/// Where a link item points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub url: String,
    /// Empty when the caption is the URL itself.
    pub caption: String,
}

impl LinkTarget {
    /// `#link <url> [caption]`
    pub fn from_command(args: &str) -> Self {
        let args = args.trim();
        match args.split_once(' ') {
            Some((url, caption)) => Self {
                url: url.to_string(),
                caption: caption.trim().to_string(),
            },
            None => Self {
                url: args.to_string(),
                caption: String::new(),
            },
        }
    }

    /// A bare URL line: the whole line is the target.
    pub fn implicit(line: &str) -> Self {
        Self {
            url: line.trim().to_string(),
            caption: String::new(),
        }
    }
}

/// One recorded event of the minutes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinutesItem {
    pub kind: ItemKind,
    pub nick: String,
    pub line: String,
    /// Raw transcript line this item was recorded from (1-based).
    pub linenum: usize,
    pub time: DateTime<Utc>,
    pub link: Option<LinkTarget>,
}

/// Flat view of an item handed to templates.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateItem {
    pub itemtype: &'static str,
    pub line: String,
    pub nick: String,
    pub time: String,
    pub link: String,
    pub anchor: String,
    pub topic: String,
    pub url: String,
    pub url_quoteescaped: String,
}

impl MinutesItem {
    pub fn new(kind: ItemKind, nick: &str, line: &str, linenum: usize, time: DateTime<Utc>) -> Self {
        Self {
            kind,
            nick: nick.to_string(),
            line: line.trim().to_string(),
            linenum,
            time,
            link: None,
        }
    }

    pub fn link(nick: &str, target: LinkTarget, linenum: usize, time: DateTime<Utc>) -> Self {
        Self {
            kind: ItemKind::Link,
            nick: nick.to_string(),
            line: target.caption.clone(),
            linenum,
            time,
            link: Some(target),
        }
    }

    pub fn anchor(&self) -> String {
        format!("l-{}", self.linenum)
    }

    pub fn clock(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }

    fn url(&self) -> &str {
        self.link.as_ref().map_or("", |l| l.url.as_str())
    }

    /// Line text with the URL in front for link items.
    fn plain_body(&self) -> String {
        match &self.link {
            Some(link) if !link.caption.is_empty() => format!("{} {}", link.url, link.caption),
            Some(link) => link.url.clone(),
            None => self.line.clone(),
        }
    }

    fn html_body(&self) -> String {
        match &self.link {
            Some(link) => {
                let anchor = format!(
                    "<a href=\"{}\">{}</a>",
                    escape::quote(&link.url),
                    escape::html(&link.url)
                );
                if link.caption.is_empty() {
                    anchor
                } else {
                    format!("{} {}", anchor, escape::html(&link.caption))
                }
            }
            None => escape::html(&self.line),
        }
    }

    /// Table row for the table-based HTML minutes.
    pub fn html_row(&self, log_link: &str) -> String {
        let time_cell = format!(
            "<td><a href='{}#{}'>{}</a></td>",
            log_link,
            self.anchor(),
            self.clock()
        );
        if self.kind.is_topic() {
            format!(
                "<tr>{}\n  <th colspan=3>Topic: {}</th>\n  </tr>",
                time_cell,
                escape::html(&self.line)
            )
        } else {
            format!(
                "<tr>{}\n  <td>{}</td><td>{}</td><td>{}</td>\n  </tr>",
                time_cell,
                self.kind.label(),
                self.html_body(),
                escape::html(&self.nick)
            )
        }
    }

    /// List entry for the nested-list HTML minutes.
    pub fn html(&self, log_link: &str) -> String {
        let details = format!(
            "<span class=\"details\">(<a href='{}#{}'>{}</a>, {})</span>",
            log_link,
            self.anchor(),
            escape::html(&self.nick),
            self.clock()
        );
        match self.kind {
            ItemKind::Topic | ItemKind::Subtopic => format!(
                "<b class=\"{}\">{}</b> {}",
                self.kind.label(),
                escape::html(&self.line),
                details
            ),
            ItemKind::Link => format!("{}: {} {}", self.kind.label(), self.html_body(), details),
            _ => format!(
                "<i class=\"{label}\">{label}</i>: {} {}",
                self.html_body(),
                details,
                label = self.kind.label()
            ),
        }
    }

    /// Reference name pointing back at the log line.
    pub fn rst_ref(&self) -> String {
        format!("{}-{}", self.nick, self.linenum)
    }

    /// ReST entry plus the target definition for its back reference.
    pub fn rst(&self, log_link: &str) -> (String, String) {
        let reference = self.rst_ref();
        let body = if self.kind.is_topic() {
            format!("**{}**", escape::rst(&self.line))
        } else {
            format!("*{}*: {}", self.kind.label(), escape::rst(&self.plain_body()))
        };
        (
            format!("{}  (`{}`_)", body, escape::rst(&reference)),
            format!(".. _`{}`: {}#{}", reference, log_link, self.anchor()),
        )
    }

    pub fn text(&self) -> String {
        if self.kind.is_topic() {
            format!("{}  ({}, {})", escape::text(&self.line), self.nick, self.clock())
        } else {
            format!(
                "{}: {}  ({}, {})",
                self.kind.label(),
                escape::text(&self.plain_body()),
                self.nick,
                self.clock()
            )
        }
    }

    /// Shared by MediaWiki and PmWiki.
    pub fn mediawiki(&self) -> String {
        if self.kind.is_topic() {
            format!(
                "'''{}'''  ({}, {})",
                escape::mediawiki(&self.line),
                self.nick,
                self.clock()
            )
        } else {
            format!(
                "''{}:'' {}  ({}, {})",
                self.kind.label(),
                escape::mediawiki(&self.plain_body()),
                self.nick,
                self.clock()
            )
        }
    }

    pub fn moin(&self) -> String {
        if self.kind.is_topic() {
            format!("'''{}'''  ({}, {})", escape::moin(&self.line), self.nick, self.clock())
        } else {
            format!(
                "''{}:'' {}  ({}, {})",
                self.kind.label(),
                escape::moin(&self.plain_body()),
                self.nick,
                self.clock()
            )
        }
    }

    /// Flat view for templates; `escape` is applied to user text.
    pub fn template(&self, log_link: &str, escape: fn(&str) -> String) -> TemplateItem {
        let url = self.url();
        TemplateItem {
            itemtype: self.kind.label(),
            line: if self.kind.is_topic() {
                String::new()
            } else {
                escape(&self.line)
            },
            nick: escape(&self.nick),
            time: self.clock(),
            link: log_link.to_string(),
            anchor: self.anchor(),
            topic: if self.kind.is_topic() {
                escape(&self.line)
            } else {
                String::new()
            },
            url: escape(url),
            url_quoteescaped: escape(&url.replace('"', "%22")),
        }
    }
}
