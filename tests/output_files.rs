//! Output naming and on-disk ordering.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use meetbot::config::Config;
use meetbot::meeting::{Meeting, MeetingError, MeetingOptions, MeetingPhase, NullTransport};
use meetbot::writers::{Pipeline, SaveMode};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap()
}

fn config_in(dir: &Path, pattern: &str) -> Config {
    let mut config = Config::default();
    config.output.log_file_dir = dir.to_path_buf();
    config.output.filename_pattern = pattern.to_string();
    config.output.update_realtime = false;
    config
}

fn meeting(config: Config) -> Meeting {
    Meeting::new(
        "#foo",
        "bar",
        MeetingOptions::default(),
        Arc::new(config),
        Arc::new(NullTransport),
    )
    .unwrap()
}

fn feed(meeting: &mut Meeting, lines: &[(&str, &str)]) -> Result<(), MeetingError> {
    for (i, (nick, line)) in lines.iter().enumerate() {
        let time = start() + Duration::minutes(i as i64);
        meeting.add_line(nick, line, false, Some(time))?;
    }
    Ok(())
}

fn with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(extension);
    PathBuf::from(path)
}

#[test]
fn test_channel_and_network_pattern() {
    let dir = TempDir::new().unwrap();
    let mut m = meeting(config_in(dir.path(), "%(channel)s-%(network)s"));
    feed(&mut m, &[("al", "#startmeeting"), ("al", "#endmeeting")]).unwrap();

    let base = m.output_base().unwrap();
    assert!(base.ends_with("foo-bar"));
    for ext in [".log.txt", ".log.html", ".html", ".txt", ".rst"] {
        let path = with_extension(&base, ext);
        assert!(path.exists(), "{} was not written", path.display());
    }
    assert_eq!(m.url_base().unwrap(), "foo-bar");
}

#[test]
fn test_meeting_name_pattern() {
    let dir = TempDir::new().unwrap();
    let mut m = meeting(config_in(dir.path(), "%(channel)s-%(meetingname)s"));
    feed(
        &mut m,
        &[
            ("al", "#startmeeting"),
            ("al", "#meetingname baz qux"),
            ("al", "#endmeeting"),
        ],
    )
    .unwrap();

    let base = m.output_base().unwrap();
    assert!(base.ends_with("foo-baz_qux"));
    assert!(with_extension(&base, ".html").exists());
}

#[test]
fn test_date_fields_in_pattern() {
    let dir = TempDir::new().unwrap();
    let m = {
        let mut m = meeting(config_in(dir.path(), "%(channel)s/%%Y/%(channel)s.%%F-%%H.%%M"));
        feed(&mut m, &[("al", "#startmeeting")]).unwrap();
        m
    };
    assert_eq!(
        m.output_base().unwrap(),
        dir.path().join("foo/2024/foo.2024-03-05-14.00")
    );
}

#[test]
fn test_raw_log_written_before_failing_writer() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path(), "%(channel)s-%(network)s");
    config.output.safe_mode = false;
    config.writers.insert(
        ".a.html|template=/nonexistent/minutes.html".to_string(),
        "template".to_string(),
    );

    let mut m = meeting(config);
    let result = feed(&mut m, &[("al", "#startmeeting"), ("al", "#endmeeting")]);

    assert!(matches!(result, Err(MeetingError::Save(_))));
    assert_eq!(m.phase(), MeetingPhase::Running);

    let base = m.output_base().unwrap();
    let raw = std::fs::read_to_string(with_extension(&base, ".log.txt")).unwrap();
    assert!(raw.contains("<al> #endmeeting"));
    assert!(!with_extension(&base, ".a.html").exists());
}

#[test]
fn test_raw_log_under_custom_key_written_before_failing_writer() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path(), "%(channel)s");
    config.output.safe_mode = false;
    config.output.write_raw_log = false;
    config.writers.clear();
    config
        .writers
        .insert(".raw.txt".to_string(), "text-log".to_string());
    config.writers.insert(
        ".a.html|template=/nonexistent/minutes.html".to_string(),
        "template".to_string(),
    );

    let mut m = meeting(config);
    let result = feed(&mut m, &[("al", "#startmeeting"), ("al", "#endmeeting")]);

    assert!(matches!(result, Err(MeetingError::Save(_))));
    let raw = std::fs::read_to_string(dir.path().join("foo.raw.txt")).unwrap();
    assert!(raw.contains("<al> #endmeeting"));
}

#[test]
fn test_safe_mode_skips_failing_writer() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path(), "%(channel)s-%(network)s");
    config.writers.insert(
        ".a.html|template=/nonexistent/minutes.html".to_string(),
        "template".to_string(),
    );

    let mut m = meeting(config);
    feed(&mut m, &[("al", "#startmeeting"), ("al", "#endmeeting")]).unwrap();

    assert!(m.is_over());
    let base = m.output_base().unwrap();
    assert!(with_extension(&base, ".txt").exists());
    assert!(!with_extension(&base, ".a.html").exists());
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn realtime_config(dir: &Path) -> Config {
    let mut config = config_in(dir, "%(channel)s");
    config.output.update_realtime = true;
    config
}

#[test]
fn test_realtime_mirrors_only_the_raw_log() {
    let dir = TempDir::new().unwrap();
    let mut m = meeting(realtime_config(dir.path()));

    feed(&mut m, &[("al", "early words")]).unwrap();
    assert!(files_in(dir.path()).is_empty());

    feed(&mut m, &[("al", "#startmeeting")]).unwrap();
    assert_eq!(files_in(dir.path()), vec!["foo.log.txt"]);

    feed(&mut m, &[("bo", "#info mirrored")]).unwrap();
    assert_eq!(files_in(dir.path()), vec!["foo.log.txt"]);
    let raw = std::fs::read_to_string(dir.path().join("foo.log.txt")).unwrap();
    assert!(raw.contains("<al> early words"));
    assert!(raw.contains("<bo> #info mirrored"));
}

#[test]
fn test_realtime_skipped_before_start() {
    let dir = TempDir::new().unwrap();
    let config = realtime_config(dir.path());
    let pipeline = Pipeline::from_config(&config).unwrap();
    let m = meeting(config);

    let report = pipeline.run(&m, SaveMode::Realtime).unwrap();
    assert!(report.outputs.is_empty());
    assert!(report.written.is_empty());
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn test_realtime_skipped_for_pinned_output() {
    let dir = TempDir::new().unwrap();
    let options = MeetingOptions {
        pinned_output: Some(dir.path().join("pinned")),
        ..MeetingOptions::default()
    };
    let mut m = Meeting::new(
        "#foo",
        "bar",
        options,
        Arc::new(realtime_config(dir.path())),
        Arc::new(NullTransport),
    )
    .unwrap();

    feed(&mut m, &[("al", "#startmeeting"), ("al", "hello")]).unwrap();
    assert!(files_in(dir.path()).is_empty());

    feed(&mut m, &[("al", "#endmeeting")]).unwrap();
    assert!(files_in(dir.path()).contains(&"pinned.log.txt".to_string()));
}
