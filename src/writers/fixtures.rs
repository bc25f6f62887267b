//! Meetings shared by the writer tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Config;
use crate::meeting::{Meeting, MeetingOptions, RecordingTransport};

use super::{RenderContext, Writer};

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap()
}

pub fn meeting_with(config: Config, lines: &[(&str, &str)]) -> Meeting {
    let options = MeetingOptions {
        dont_save: true,
        ..MeetingOptions::default()
    };
    let mut meeting = Meeting::new(
        "#dev",
        "libera",
        options,
        Arc::new(config),
        Arc::new(RecordingTransport::new()),
    )
    .unwrap();

    for (i, (nick, line)) in lines.iter().enumerate() {
        let time = start() + Duration::minutes(i as i64);
        meeting.add_line(nick, line, false, Some(time)).unwrap();
    }
    meeting
}

/// A finished meeting touching every section of the minutes.
pub fn finished_meeting() -> Meeting {
    let mut config = Config::default();
    config.output.update_realtime = false;
    meeting_with(
        config,
        &[
            ("al", "#startmeeting"),
            ("al", "#meetingtopic Weekly sync"),
            ("al", "#topic Budget"),
            ("bo", "hello everyone"),
            ("al", "#info costs are <up>"),
            ("al", "#action bo to file the report"),
            ("al", "#action someone checks the numbers"),
            ("al", "#vote Ship it?"),
            ("bo", "+1"),
            ("al", "#endvote"),
            ("al", "#topic Release"),
            ("al", "#subtopic Notes"),
            ("al", "#link http://example.org/notes the notes"),
            ("al", "#done bo shipped the notes"),
            ("bo", "\x01ACTION waves\x01"),
            ("al", "#endmeeting"),
        ],
    )
}

pub fn render(writer: &dyn Writer, meeting: &Meeting, args: &[(&str, &str)]) -> String {
    let args: BTreeMap<String, String> = args
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let ctx = RenderContext {
        meeting,
        extension: ".test",
        args: &args,
    };
    writer.format(&ctx).unwrap()
}
