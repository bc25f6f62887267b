use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub mod naming;

pub use naming::{normalize_channel, normalize_meeting_name};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Writer name not found: '{0}'")]
    UnknownWriter(String),
    #[error("Extension must start with '.' and have at least one more character: '{0}'")]
    BadExtension(String),
    #[error("Malformed writer argument '{argument}' in '{extension}'")]
    BadWriterArgument { extension: String, argument: String },
    #[error("Invalid filename pattern '{pattern}': {reason}")]
    FilenamePattern { pattern: String, reason: String },
    #[error("Invalid command marker set: {0}")]
    CommandMarker(String),
    #[error("Expected section.key=value, got '{0}'")]
    Assignment(String),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub meeting: MeetingConfig,
    pub css: CssConfig,
    /// Output extension (optionally with `|name=value` arguments) to writer name.
    /// A writer name of `none` disables a default entry.
    pub writers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where files are stored on disk.
    pub log_file_dir: PathBuf,
    /// Prefix for links to the written files.
    pub log_url_prefix: String,
    /// `%(channel)s`, `%(network)s` and `%(meetingname)s` are substituted
    /// first; the result then goes through strftime, so time codes need
    /// doubled percent signs (`%%Y`).
    pub filename_pattern: String,
    /// Channels whose files never get a date/time in their name.
    pub special_channels: Vec<String>,
    pub special_channel_filename_pattern: String,
    pub time_zone: String,
    /// Permission bits cleared from written files after `#restrictlogs`.
    pub restrict_perm: u32,
    /// Register the raw `.log.txt` transcript writer.
    pub write_raw_log: bool,
    /// Re-render realtime writers after every line.
    pub update_realtime: bool,
    /// Log writer failures and continue instead of aborting the save.
    pub safe_mode: bool,
    /// Include the full log in MoinMoin output.
    pub moin_full_logs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    /// Characters accepted as the leading command marker.
    pub command_markers: String,
    /// Line prefixes (before `//`) that turn a plain line into a link item.
    pub url_protocols: Vec<String>,
    pub info_url: String,
    /// Split on newlines; each part is sent as its own message.
    pub start_message: String,
    pub end_message: String,
    pub end_notification: String,
    /// Nicks privately notified when a meeting ends.
    pub end_notification_list: Vec<String>,
    /// Echo actions and agreements back to the channel.
    pub be_noisy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CssConfig {
    /// `default` (or empty) for the bundled stylesheet, `none` for no
    /// style at all, otherwise a stylesheet path.
    pub file_log: String,
    pub embed_log: bool,
    pub file_minutes: String,
    pub embed_minutes: bool,
}

fn default_writers() -> BTreeMap<String, String> {
    [
        (".log.html", "html-log"),
        (".1.html", "html-table"),
        (".html", "html"),
        (".rst", "rst"),
        (".txt", "text"),
        (".moin.txt", "moin"),
        (".mw.txt", "mediawiki"),
    ]
    .into_iter()
    .map(|(ext, name)| (ext.to_string(), name.to_string()))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            meeting: MeetingConfig::default(),
            css: CssConfig::default(),
            writers: default_writers(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_file_dir: global::logs_dir().unwrap_or_else(|_| PathBuf::from("/tmp/meetbot/logs")),
            log_url_prefix: String::new(),
            filename_pattern: "%(channel)s/%%Y/%(channel)s.%%F-%%H.%%M".to_string(),
            special_channels: vec!["#meetbot-test".to_string(), "#meetbot-test2".to_string()],
            special_channel_filename_pattern: "%(channel)s/%(channel)s".to_string(),
            time_zone: "UTC".to_string(),
            restrict_perm: 0o077,
            write_raw_log: true,
            update_realtime: true,
            safe_mode: true,
            moin_full_logs: true,
        }
    }
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            command_markers: "#".to_string(),
            url_protocols: ["http:", "https:", "irc:", "ftp:", "mailto:", "ssh:"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            info_url: "https://wiki.debian.org/MeetBot".to_string(),
            start_message: "Meeting started at {starttime} {timeZone}.  The chair is {chair}.  \
                            Information about MeetBot at {MeetBotInfoURL}"
                .to_string(),
            end_message: "Meeting ended at {endtime} {timeZone}.  Minutes at {urlBasename}.html"
                .to_string(),
            end_notification: "Meeting in {channel} has just ended".to_string(),
            end_notification_list: Vec::new(),
            be_noisy: true,
        }
    }
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            file_log: "default".to_string(),
            embed_log: true,
            file_minutes: "default".to_string(),
            embed_minutes: true,
        }
    }
}

impl Config {
    /// Load the user config file layered over the built-in defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config = Self::default()
            .with_overrides(&content)
            .context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        global::config_file()
    }

    /// Overlay a TOML document on top of this configuration.
    ///
    /// Tables merge key by key, so an override only replaces what it names.
    pub fn with_overrides(&self, overrides: &str) -> Result<Self, ConfigError> {
        let overlay: toml::Table = toml::from_str(overrides)?;
        self.with_override_table(overlay)
    }

    pub fn with_override_table(&self, overlay: toml::Table) -> Result<Self, ConfigError> {
        let mut base = match toml::Value::try_from(self)? {
            toml::Value::Table(table) => table,
            _ => toml::Table::new(),
        };
        merge_tables(&mut base, overlay);
        Ok(toml::Value::Table(base).try_into()?)
    }

    /// Apply `section.key=value` assignments, as given on the command line.
    ///
    /// The key is everything after the first dot, so writer extensions
    /// work as keys: `writers..pmw=pmwiki`. Values are read as TOML when
    /// they parse as such and as plain strings otherwise.
    pub fn with_assignments(&self, assignments: &[String]) -> Result<Self, ConfigError> {
        let mut overlay = toml::Table::new();
        for assignment in assignments {
            let bad = || ConfigError::Assignment(assignment.clone());
            let (path, raw) = assignment.split_once('=').ok_or_else(bad)?;
            let (section, key) = path.trim().split_once('.').ok_or_else(bad)?;
            if section.is_empty() || key.is_empty() {
                return Err(bad());
            }

            let raw = raw.trim();
            let value = toml::from_str::<toml::Table>(&format!("value = {}", raw))
                .ok()
                .and_then(|mut parsed| parsed.remove("value"))
                .unwrap_or_else(|| toml::Value::String(raw.to_string()));

            match overlay
                .entry(section.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            {
                toml::Value::Table(table) => {
                    table.insert(key.to_string(), value);
                }
                _ => return Err(bad()),
            }
        }
        self.with_override_table(overlay)
    }

    /// Writer entries that are not disabled, in extension order.
    pub fn enabled_writers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.writers
            .iter()
            .filter(|(_, name)| !name.is_empty() && !name.eq_ignore_ascii_case("none"))
            .map(|(ext, name)| (ext.as_str(), name.as_str()))
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
