//! CLI handler for replaying saved transcripts.

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::meeting::{Meeting, MeetingPhase};
use crate::replay::ReplayRequest;
use crate::writers::SaveReport;

use super::args::ReplayCliArgs;

/// Machine-readable result of one replay.
#[derive(Debug, Serialize)]
struct ReplaySummary {
    channel: String,
    network: String,
    phase: MeetingPhase,
    owner: Option<String>,
    lines: usize,
    items: usize,
    attendees: Vec<(String, usize)>,
    votes: Vec<String>,
    written: Vec<String>,
    failures: Vec<String>,
}

impl ReplaySummary {
    fn new(meeting: &Meeting, report: Option<&SaveReport>) -> Self {
        Self {
            channel: meeting.channel().to_string(),
            network: meeting.network().to_string(),
            phase: meeting.phase(),
            owner: meeting.owner().map(str::to_string),
            lines: meeting.lines().len(),
            items: meeting.minutes().len(),
            attendees: meeting
                .attendees()
                .iter()
                .map(|(nick, count)| (nick.clone(), *count))
                .collect(),
            votes: meeting.vote_results().iter().map(|v| v.minutes_line()).collect(),
            written: report
                .map(|r| r.written.iter().map(|p| p.display().to_string()).collect())
                .unwrap_or_default(),
            failures: report
                .map(|r| {
                    r.failures
                        .iter()
                        .map(|f| format!("{}: {}", f.extension, f.error))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

pub async fn handle_replay_command(args: ReplayCliArgs, config: Config) -> Result<()> {
    let request = ReplayRequest {
        location: args.source,
        channel: args.channel,
        network: args.network,
        output: args.output,
        dont_save: args.dry_run,
        timeout: Duration::from_secs(args.timeout),
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling replay");
            on_interrupt.cancel();
        }
    });

    let meeting = request
        .run(&config, &cancel)
        .await
        .with_context(|| format!("Failed to replay {}", request.location))?;

    // Dry runs render again here so the outputs can be shown.
    let report = if args.dry_run && meeting.is_over() {
        Some(meeting.save().context("Failed to render minutes")?)
    } else {
        None
    };

    if args.json {
        let summary = ReplaySummary::new(&meeting, report.as_ref());
        let json =
            serde_json::to_string_pretty(&summary).context("Failed to serialize replay summary")?;
        println!("{}", json);
        return Ok(());
    }

    println!(
        "Replayed {} lines of {} ({} minutes items)",
        meeting.lines().len(),
        meeting.channel(),
        meeting.minutes().len()
    );
    if !meeting.is_over() {
        println!("No #endmeeting found; nothing was written.");
        return Ok(());
    }

    match report {
        Some(report) => {
            if let Some(text) = report.content(".txt") {
                println!("\n{}", text);
            }
            for failure in &report.failures {
                eprintln!("{} failed: {}", failure.extension, failure.error);
            }
        }
        None => println!("Minutes written next to {}", request.output_base().display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::{MeetingOptions, NullTransport};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    #[test]
    fn test_replay_summary_json() {
        let mut config = Config::default();
        config.output.update_realtime = false;
        let options = MeetingOptions {
            dont_save: true,
            ..MeetingOptions::default()
        };
        let mut meeting = Meeting::new(
            "#dev",
            "replay",
            options,
            Arc::new(config),
            Arc::new(NullTransport),
        )
        .unwrap();
        let time = Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap();
        for line in ["#startmeeting", "#info shipped", "#endmeeting"] {
            meeting.add_line("al", line, false, Some(time)).unwrap();
        }

        let summary = ReplaySummary::new(&meeting, None);
        let json: serde_json::Value = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["channel"], "#dev");
        assert_eq!(json["phase"], "over");
        assert_eq!(json["owner"], "al");
        assert_eq!(json["lines"], 3);
        assert_eq!(json["items"], 1);
        assert_eq!(json["attendees"][0][0], "al");
        assert_eq!(json["attendees"][0][1], 3);
    }
}
