//! Output path naming.
//!
//! A filename pattern takes `%(channel)s`, `%(network)s` and
//! `%(meetingname)s` substitutions, then gets expanded as a strftime
//! format against the meeting start time. Special channels skip the time
//! expansion and always land on the same path.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

use super::{ConfigError, OutputConfig};

/// Channel name as used in paths: no surrounding `#`/spaces, lowercase, no `/`.
pub fn normalize_channel(channel: &str) -> String {
    channel
        .trim_matches(|c| c == '#' || c == ' ')
        .to_lowercase()
        .replace('/', "")
}

fn normalize_network(network: &str) -> String {
    network.trim_matches(' ').to_lowercase().replace('/', "")
}

/// `#meetingname Weekly Sync` becomes `weekly_sync`.
pub fn normalize_meeting_name(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace('/', "")
}

/// Inputs of one path computation.
#[derive(Debug, Clone)]
pub struct NameVars<'a> {
    pub channel: &'a str,
    pub network: &'a str,
    pub meeting_name: Option<&'a str>,
    pub start_time: DateTime<Utc>,
}

impl OutputConfig {
    /// Path of the output files relative to `log_file_dir`, without extension.
    pub fn relative_basename(&self, vars: &NameVars<'_>) -> Result<String, ConfigError> {
        let channel = normalize_channel(vars.channel);
        let network = normalize_network(vars.network);
        let meeting_name = match vars.meeting_name {
            Some(name) if !name.is_empty() => name.replace('/', ""),
            _ => channel.clone(),
        };
        let substitutions = [
            ("channel", channel.as_str()),
            ("network", network.as_str()),
            ("meetingname", meeting_name.as_str()),
        ];

        if self.special_channels.iter().any(|c| c == vars.channel) {
            return substitute(&self.special_channel_filename_pattern, &substitutions, false);
        }

        let expanded = substitute(&self.filename_pattern, &substitutions, true)?;
        format_time(&expanded, vars.start_time).map_err(|reason| ConfigError::FilenamePattern {
            pattern: self.filename_pattern.clone(),
            reason,
        })
    }

    /// Full on-disk path (without extension).
    pub fn file_path(&self, vars: &NameVars<'_>) -> Result<PathBuf, ConfigError> {
        Ok(self.log_file_dir.join(self.relative_basename(vars)?))
    }

    /// Public URL of the output files (without extension).
    pub fn url(&self, vars: &NameVars<'_>) -> Result<String, ConfigError> {
        let relative = self.relative_basename(vars)?;
        if self.log_url_prefix.is_empty() {
            return Ok(relative);
        }
        if self.log_url_prefix.ends_with('/') {
            Ok(format!("{}{}", self.log_url_prefix, relative))
        } else {
            Ok(format!("{}/{}", self.log_url_prefix, relative))
        }
    }
}

/// First expansion stage: `%(name)s` and `%%`.
///
/// With `escape_values`, substituted values get their `%` doubled so the
/// following strftime pass leaves them alone. Any other `%x` is kept for
/// strftime.
fn substitute(
    pattern: &str,
    substitutions: &[(&str, &str)],
    escape_values: bool,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];

        if let Some(after) = tail.strip_prefix("%%") {
            out.push('%');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("%(") {
            let Some(close) = after.find(")s") else {
                return Err(ConfigError::FilenamePattern {
                    pattern: pattern.to_string(),
                    reason: "unterminated %(name)s substitution".to_string(),
                });
            };
            let name = &after[..close];
            let value = substitutions
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| ConfigError::FilenamePattern {
                    pattern: pattern.to_string(),
                    reason: format!("unknown substitution '{}'", name),
                })?;
            if escape_values {
                out.push_str(&value.replace('%', "%%"));
            } else {
                out.push_str(value);
            }
            rest = &after[close + 2..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);

    Ok(out)
}

fn format_time(format: &str, time: DateTime<Utc>) -> Result<String, String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err("unsupported time format code".to_string());
    }
    Ok(time.format_with_items(items.into_iter()).to_string())
}
