//! Replaying historical transcripts.
//!
//! A saved `.log.txt` (or anything with the same line shapes) is parsed
//! back into chat lines and fed through a fresh meeting, so the minutes
//! can be regenerated. The outputs land next to the source log.

mod source;

pub use source::{fetch_transcript, source_for, FileSource, HttpSource, TranscriptSource};

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::meeting::{Meeting, MeetingError, MeetingOptions, NullTransport};
use crate::normalizer::{parse_transcript, LineKind};
use crate::writers::RAW_LOG_EXTENSION;

/// Default upper bound on fetching a transcript.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Fetching {location} timed out after {seconds}s")]
    Timeout { location: String, seconds: u64 },
    #[error("Fetching {0} was cancelled")]
    Cancelled(String),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to parse transcript: {0}")]
    Parse(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Meeting(#[from] MeetingError),
}

/// Output base for a replayed log: `X.log.txt` becomes `X`, anything else
/// loses its last extension. URLs keep only their file name.
pub fn pinned_base_for(location: &str) -> PathBuf {
    let location = if location.contains("://") {
        file_name(location)
    } else {
        location
    };
    if let Some(base) = location.strip_suffix(".log.txt") {
        return PathBuf::from(base);
    }
    let path = PathBuf::from(location);
    path.with_extension("")
}

fn file_name(location: &str) -> &str {
    location
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(location)
}

/// `logs/dev.2024-03-05-14.07.log.txt` was a meeting in `#dev`.
pub fn channel_from_name(location: &str) -> Option<String> {
    let stem = file_name(location).split('.').next()?;
    if stem.is_empty() {
        None
    } else {
        Some(format!("#{}", stem))
    }
}

fn name_time_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.([0-9]{4}(?:-[0-9]{2}){3}(?:\.[0-9]{2}){1,2})\.").ok())
        .as_ref()
}

/// Start time encoded in a default-pattern file name, if any.
pub fn start_from_name(location: &str) -> Option<NaiveDateTime> {
    let caps = name_time_re()?.captures(file_name(location))?;
    let stamp = caps.get(1)?.as_str();
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d-%H.%M.%S")
        .or_else(|_| NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d-%H.%M"))
        .ok()
}

/// Options of one transcript pass.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub network: String,
    /// Where the outputs go; no files are named from the pattern.
    pub pinned_output: Option<PathBuf>,
    pub dont_save: bool,
    /// Calendar day of the first line; log lines only carry a clock time.
    pub date: Option<NaiveDate>,
}

/// Feed a whole transcript through a new meeting and return it.
///
/// The first speaker becomes the owner. The raw log writer is disabled so
/// the source log is never overwritten.
pub fn process_transcript(
    contents: &str,
    channel: &str,
    options: ProcessOptions,
    config: &Config,
) -> Result<Meeting, ReplayError> {
    let mut config = config.clone();
    config.output.write_raw_log = false;
    config.writers.remove(RAW_LOG_EXTENSION);

    let lines = parse_transcript(contents).map_err(|e| ReplayError::Parse(e.to_string()))?;
    let mut meeting = Meeting::new(
        channel,
        &options.network,
        MeetingOptions {
            owner: None,
            old_topic: None,
            pinned_output: options.pinned_output.clone(),
            dont_save: options.dont_save,
        },
        Arc::new(config),
        Arc::new(NullTransport),
    )?;

    let date = options.date.unwrap_or_else(|| Utc::now().date_naive());
    let mut clock = Clock::new(date);
    for line in &lines {
        if line.kind == LineKind::Spoken {
            meeting.set_owner_if_missing(&line.nick);
        }
        let time = clock.advance(line.time);
        match meeting.add_line(&line.nick, &line.payload(), false, Some(time)) {
            Ok(()) => {}
            Err(MeetingError::Finished(_)) => {
                debug!("Ignoring lines after the meeting ended");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if !meeting.is_over() {
        warn!("Transcript of {} has no #endmeeting; nothing was saved", channel);
    }
    info!(
        "Replayed {} lines into {} ({} minutes items)",
        lines.len(),
        channel,
        meeting.minutes().len()
    );
    Ok(meeting)
}

/// Turns per-line clock times into timestamps, rolling over at midnight.
struct Clock {
    date: NaiveDate,
    last: Option<DateTime<Utc>>,
}

impl Clock {
    fn new(date: NaiveDate) -> Self {
        Self { date, last: None }
    }

    fn advance(&mut self, time: Option<NaiveTime>) -> DateTime<Utc> {
        let Some(time) = time else {
            return self
                .last
                .unwrap_or_else(|| self.date.and_time(NaiveTime::MIN).and_utc());
        };

        let mut stamp = self.date.and_time(time).and_utc();
        if let Some(last) = self.last {
            if stamp < last {
                self.date = self.date.succ_opt().unwrap_or(self.date);
                stamp += ChronoDuration::days(1);
            }
        }
        self.last = Some(stamp);
        stamp
    }
}

/// A replay as asked for on the command line.
#[derive(Debug, Clone)]
pub struct ReplayRequest {
    /// File path or http(s) URL.
    pub location: String,
    /// Defaults to the one in the file name.
    pub channel: Option<String>,
    pub network: String,
    /// Defaults to the source log's base name.
    pub output: Option<PathBuf>,
    pub dont_save: bool,
    pub timeout: Duration,
}

impl ReplayRequest {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            channel: None,
            network: "replay".to_string(),
            output: None,
            dont_save: false,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn channel(&self) -> String {
        self.channel
            .clone()
            .or_else(|| channel_from_name(&self.location))
            .unwrap_or_else(|| "#meeting".to_string())
    }

    pub fn output_base(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| pinned_base_for(&self.location))
    }

    /// Fetch, parse and process the transcript.
    pub async fn run(&self, config: &Config, cancel: &CancellationToken) -> Result<Meeting, ReplayError> {
        let source = source_for(&self.location);
        let contents = fetch_transcript(source.as_ref(), self.timeout, cancel).await?;

        let channel = self.channel();
        let base = self.output_base();
        info!("Replaying {} as {}, saving to {:?}", self.location, channel, base);

        let options = ProcessOptions {
            network: self.network.clone(),
            pinned_output: Some(base),
            dont_save: self.dont_save,
            date: start_from_name(&self.location).map(|t| t.date()),
        };
        process_transcript(&contents, &channel, options, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minutes::ItemKind;
    use chrono::Timelike;
    use std::io::Write;
    use tempfile::TempDir;

    const TRANSCRIPT: &str = "\
14:07 <al> #startmeeting
14:08 <bo> hi
14:08 * bo waves
14:09 <al> #topic Budget
14:10 <bo> #action bo files it
14:11 <al> #endmeeting
14:12 <bo> too late
";

    fn dry_run() -> ProcessOptions {
        ProcessOptions {
            network: "replay".to_string(),
            pinned_output: Some(PathBuf::from("/tmp/never/written")),
            dont_save: true,
            date: NaiveDate::from_ymd_opt(2024, 3, 5),
        }
    }

    #[test]
    fn test_pinned_base_for() {
        assert_eq!(
            pinned_base_for("logs/dev.2024-03-05-14.07.log.txt"),
            PathBuf::from("logs/dev.2024-03-05-14.07")
        );
        assert_eq!(pinned_base_for("notes/meeting.txt"), PathBuf::from("notes/meeting"));
        assert_eq!(
            pinned_base_for("https://example.org/logs/dev.log.txt"),
            PathBuf::from("dev")
        );
    }

    #[test]
    fn test_names_carry_channel_and_time() {
        let location = "logs/dev/2024/dev.2024-03-05-14.07.log.txt";
        assert_eq!(channel_from_name(location), Some("#dev".to_string()));
        assert_eq!(
            start_from_name(location),
            NaiveDate::from_ymd_opt(2024, 3, 5).and_then(|d| d.and_hms_opt(14, 7, 0))
        );
        assert_eq!(start_from_name("logs/notes.log.txt"), None);
    }

    #[test]
    fn test_process_transcript() {
        let meeting = process_transcript(TRANSCRIPT, "#dev", dry_run(), &Config::default()).unwrap();

        assert!(meeting.is_over());
        assert_eq!(meeting.owner(), Some("al"));
        assert_eq!(meeting.lines().len(), 6);
        assert_eq!(meeting.lines()[2], "14:08 * bo waves");

        let kinds: Vec<_> = meeting.minutes().iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![ItemKind::Topic, ItemKind::Action]);
        assert_eq!(meeting.start_time().unwrap().hour(), 14);
    }

    #[test]
    fn test_raw_log_writer_is_disabled() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("dev.2024-03-05-14.07");
        let options = ProcessOptions {
            pinned_output: Some(base.clone()),
            dont_save: false,
            ..dry_run()
        };
        process_transcript(TRANSCRIPT, "#dev", options, &Config::default()).unwrap();

        assert!(dir.path().join("dev.2024-03-05-14.07.html").exists());
        assert!(!dir.path().join("dev.2024-03-05-14.07.log.txt").exists());
    }

    #[test]
    fn test_clock_rolls_over_midnight() {
        let mut clock = Clock::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        let late = clock.advance(NaiveTime::from_hms_opt(23, 59, 0));
        let untimed = clock.advance(None);
        let early = clock.advance(NaiveTime::from_hms_opt(0, 1, 0));

        assert_eq!(untimed, late);
        assert_eq!(early - late, ChronoDuration::minutes(2));
    }

    #[tokio::test]
    async fn test_replay_request_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ops.2024-03-05-14.07.log.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(TRANSCRIPT.as_bytes()).unwrap();

        let location = path.to_string_lossy().into_owned();
        let mut request = ReplayRequest::new(&location);
        request.dont_save = true;

        assert_eq!(request.channel(), "#ops");
        assert_eq!(request.output_base(), dir.path().join("ops.2024-03-05-14.07"));

        let meeting = request
            .run(&Config::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(meeting.channel(), "#ops");
        assert_eq!(
            meeting.start_time().map(|t| t.date_naive()),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }
}
