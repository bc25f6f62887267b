//! User-supplied Tera templates.
//!
//! The template comes from the `template` argument of the extension key:
//! `+minutes.html` and `+minutes.txt` are bundled, anything else is read
//! from disk. Templates whose name ends in `.txt` or `.rst` get raw
//! text; all others get HTML-escaped values.

use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

use crate::minutes::{escape, ItemKind, TemplateItem};

use super::report::Report;
use super::{RenderContext, Writer, WriterError};

const DEFAULT_TEMPLATE: &str = "+minutes.html";

const BUNDLED: &[(&str, &str)] = &[
    ("+minutes.html", include_str!("../../templates/minutes.html.tera")),
    ("+minutes.txt", include_str!("../../templates/minutes.txt.tera")),
];

#[derive(Debug, Serialize)]
struct TimeData {
    start: String,
    end: String,
    timezone: String,
}

#[derive(Debug, Serialize)]
struct MeetingData {
    title: String,
    owner: String,
    logs: String,
    #[serde(rename = "logsFullURL")]
    logs_full_url: String,
}

#[derive(Debug, Serialize)]
struct Attendee {
    nick: String,
    count: usize,
}

#[derive(Debug, Serialize)]
struct AgendaTopic {
    topic: TemplateItem,
    notes: Vec<TemplateItem>,
}

#[derive(Debug, Serialize)]
struct PersonActions {
    nick: String,
    actions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BotData {
    version: &'static str,
    url: String,
}

/// Everything a template can reference.
#[derive(Debug, Serialize)]
struct TemplateData {
    time: TimeData,
    meeting: MeetingData,
    attendees: Vec<Attendee>,
    agenda: Vec<AgendaTopic>,
    actions: Vec<String>,
    actions_person: Vec<PersonActions>,
    meetbot: BotData,
}

fn raw(text: &str) -> String {
    text.to_string()
}

/// Stand-in topic for items recorded before the first `#topic`.
fn prologue() -> TemplateItem {
    TemplateItem {
        itemtype: ItemKind::Topic.label(),
        line: String::new(),
        nick: String::new(),
        time: String::new(),
        link: String::new(),
        anchor: String::new(),
        topic: "Prologue".to_string(),
        url: String::new(),
        url_quoteescaped: String::new(),
    }
}

impl TemplateData {
    fn new(report: &Report<'_>, escape: fn(&str) -> String) -> Self {
        let mut agenda = Vec::new();
        let mut current = AgendaTopic {
            topic: prologue(),
            notes: Vec::new(),
        };
        let mut in_prologue = true;
        for item in report.items() {
            let view = item.template(&report.full_logs, escape);
            if item.kind.is_topic() {
                let finished = std::mem::replace(
                    &mut current,
                    AgendaTopic {
                        topic: view,
                        notes: Vec::new(),
                    },
                );
                if !in_prologue || !finished.notes.is_empty() {
                    agenda.push(finished);
                }
                in_prologue = false;
            } else {
                current.notes.push(view);
            }
        }
        agenda.push(current);

        let groups = report.action_groups();
        let mut actions_person: Vec<PersonActions> = groups
            .by_nick
            .iter()
            .map(|(nick, items)| PersonActions {
                nick: escape(nick),
                actions: items.iter().map(|m| escape(&m.line)).collect(),
            })
            .collect();
        if !groups.unassigned.is_empty() {
            actions_person.push(PersonActions {
                nick: "UNASSIGNED".to_string(),
                actions: groups.unassigned.iter().map(|m| escape(&m.line)).collect(),
            });
        }

        Self {
            time: TimeData {
                start: report.start_time.clone(),
                end: report.end_time.clone(),
                timezone: report.time_zone.clone(),
            },
            meeting: MeetingData {
                title: escape(&report.page_title),
                owner: escape(&report.owner),
                logs: report.full_logs.clone(),
                logs_full_url: report.full_logs_url.clone(),
            },
            attendees: report
                .attendees_by_count()
                .into_iter()
                .map(|(nick, count)| Attendee {
                    nick: escape(nick),
                    count,
                })
                .collect(),
            agenda,
            actions: report
                .items_of(ItemKind::Action)
                .iter()
                .map(|m| escape(&m.line))
                .collect(),
            actions_person,
            meetbot: BotData {
                version: report.version,
                url: report.info_url.clone(),
            },
        }
    }
}

pub struct TemplateWriter;

impl TemplateWriter {
    fn load(name: &str) -> Result<String, WriterError> {
        if name.starts_with('+') {
            return BUNDLED
                .iter()
                .find(|(bundled, _)| *bundled == name)
                .map(|(_, source)| source.to_string())
                .ok_or_else(|| WriterError::TemplateNotFound(name.to_string()));
        }

        let path = Path::new(name);
        if !path.exists() {
            return Err(WriterError::TemplateNotFound(name.to_string()));
        }
        fs::read_to_string(path).map_err(|source| WriterError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Writer for TemplateWriter {
    fn name(&self) -> &'static str {
        "template"
    }

    fn format(&self, ctx: &RenderContext<'_>) -> Result<String, WriterError> {
        let name = ctx
            .args
            .get("template")
            .map(String::as_str)
            .unwrap_or(DEFAULT_TEMPLATE);
        let source = Self::load(name)?;

        let is_text = name.ends_with(".txt") || name.ends_with(".rst");
        let escape_fn: fn(&str) -> String = if is_text { raw } else { escape::html };

        let report = ctx.report()?;
        let data = TemplateData::new(&report, escape_fn);

        // Values are escaped above; Tera must not escape them again.
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(name, &source)?;
        let context = Context::from_serialize(&data)?;
        Ok(tera.render(name, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{finished_meeting, meeting_with, render};
    use super::*;
    use crate::config::Config;
    use std::collections::BTreeMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_bundled_html_template() {
        let meeting = finished_meeting();
        let html = render(&TemplateWriter, &meeting, &[]);

        assert!(html.contains("#dev: Weekly sync meeting"));
        assert!(html.contains("costs are &lt;up&gt;"));
        assert!(html.contains("UNASSIGNED"));
    }

    #[test]
    fn test_bundled_text_template_is_not_escaped() {
        let meeting = finished_meeting();
        let text = render(&TemplateWriter, &meeting, &[("template", "+minutes.txt")]);
        assert!(text.contains("costs are <up>"));
    }

    #[test]
    fn test_template_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "{{% for t in agenda %}}[{{{{ t.topic.topic }}}}:{{{{ t.notes | length }}}}]{{% endfor %}}"
        )
        .unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let meeting = finished_meeting();
        let out = render(&TemplateWriter, &meeting, &[("template", &path)]);
        assert_eq!(out, "[Budget:4][Release:3]");
    }

    #[test]
    fn test_prologue_collects_items_before_first_topic() {
        let meeting = meeting_with(
            Config::default(),
            &[
                ("al", "#startmeeting"),
                ("al", "#info early note"),
                ("al", "#topic Main"),
                ("al", "#endmeeting"),
            ],
        );
        let report = Report::new(&meeting).unwrap();
        let data = TemplateData::new(&report, raw);

        assert_eq!(data.agenda.len(), 2);
        assert_eq!(data.agenda[0].topic.topic, "Prologue");
        assert_eq!(data.agenda[0].notes[0].line, "early note");
        assert_eq!(data.agenda[1].topic.topic, "Main");
    }

    #[test]
    fn test_missing_template() {
        let meeting = finished_meeting();
        let args: BTreeMap<String, String> = [("template".to_string(), "/nonexistent/minutes.html".to_string())]
            .into_iter()
            .collect();
        let ctx = RenderContext {
            meeting: &meeting,
            extension: ".x.html",
            args: &args,
        };
        assert!(matches!(
            TemplateWriter.format(&ctx),
            Err(WriterError::TemplateNotFound(_))
        ));
    }
}
