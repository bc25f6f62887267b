use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::{Config, ConfigError};
use crate::meeting::Meeting;

use super::{writer_for_name, RenderContext, Writer, WriterError};

/// The raw transcript extension. Always rendered before anything else.
pub const RAW_LOG_EXTENSION: &str = ".log.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// After every line: realtime writers only.
    Realtime,
    /// Explicit save or meeting end: every writer.
    Full,
}

/// One configured output.
pub struct WriterRegistration {
    pub extension: String,
    pub args: BTreeMap<String, String>,
    pub writer: Box<dyn Writer>,
}

impl WriterRegistration {
    /// Parse a `[writers]` entry: `.ext` or `.ext|name=value|...`.
    pub fn parse(key: &str, writer_name: &str) -> Result<Self, ConfigError> {
        let mut parts = key.split('|');
        let extension = parts.next().unwrap_or_default().to_string();
        if !extension.starts_with('.') || extension.len() < 2 {
            return Err(ConfigError::BadExtension(extension));
        }

        let mut args = BTreeMap::new();
        for argument in parts {
            let (name, value) =
                argument
                    .split_once('=')
                    .ok_or_else(|| ConfigError::BadWriterArgument {
                        extension: extension.clone(),
                        argument: argument.to_string(),
                    })?;
            args.insert(name.to_string(), value.to_string());
        }

        Ok(Self {
            writer: writer_for_name(writer_name)?,
            extension,
            args,
        })
    }
}

#[derive(Debug, Clone)]
pub struct WriterFailure {
    pub extension: String,
    pub error: String,
}

/// What one pipeline pass did.
#[derive(Debug, Clone, Default)]
pub struct SaveReport {
    /// Rendered outputs in the order they ran.
    pub outputs: Vec<(String, String)>,
    /// Files written to disk.
    pub written: Vec<PathBuf>,
    /// Writers that failed and were skipped in safe mode.
    pub failures: Vec<WriterFailure>,
}

impl SaveReport {
    pub fn content(&self, extension: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|(ext, _)| ext == extension)
            .map(|(_, text)| text.as_str())
    }
}

/// Writers registered for one meeting, fixed at construction.
pub struct Pipeline {
    registrations: Vec<WriterRegistration>,
    safe_mode: bool,
    restrict_perm: u32,
}

impl Pipeline {
    /// Resolve every configured writer. Unknown names fail here.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut registrations = Vec::new();
        if config.output.write_raw_log && !config.writers.contains_key(RAW_LOG_EXTENSION) {
            registrations.push(WriterRegistration::parse(RAW_LOG_EXTENSION, "text-log")?);
        }
        for (key, name) in config.enabled_writers() {
            registrations.push(WriterRegistration::parse(key, name)?);
        }

        // Raw logs first, whatever their key, so a later failure still
        // leaves a replayable log.
        registrations.sort_by_key(|r| !r.writer.is_raw_log());

        debug!(
            "Registered writers: {}",
            registrations
                .iter()
                .map(|r| format!("{}={}", r.extension, r.writer.name()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            registrations,
            safe_mode: config.output.safe_mode,
            restrict_perm: config.output.restrict_perm,
        })
    }

    pub fn registrations(&self) -> &[WriterRegistration] {
        &self.registrations
    }

    /// Render (and unless the meeting says otherwise, write) the outputs.
    pub fn run(&self, meeting: &Meeting, mode: SaveMode) -> Result<SaveReport, WriterError> {
        let mut report = SaveReport::default();
        if mode == SaveMode::Realtime
            && (meeting.start_time().is_none() || meeting.pinned_output().is_some())
        {
            return Ok(report);
        }

        let base = meeting.output_base()?;
        if mode == SaveMode::Full {
            info!("Saving meeting in {} to {:?}", meeting.channel(), base);
        }

        for registration in &self.registrations {
            if mode == SaveMode::Realtime && !registration.writer.realtime() {
                continue;
            }

            match self.run_one(meeting, registration, &base) {
                Ok((output, path)) => {
                    report.written.extend(path);
                    report.outputs.push((registration.extension.clone(), output));
                }
                Err(e) if self.safe_mode => {
                    error!(
                        "Writer {} for {} failed, continuing: {}",
                        registration.writer.name(),
                        registration.extension,
                        e
                    );
                    report.failures.push(WriterFailure {
                        extension: registration.extension.clone(),
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    fn run_one(
        &self,
        meeting: &Meeting,
        registration: &WriterRegistration,
        base: &Path,
    ) -> Result<(String, Option<PathBuf>), WriterError> {
        let ctx = RenderContext {
            meeting,
            extension: &registration.extension,
            args: &registration.args,
        };
        let output = registration.writer.format(&ctx)?;

        if meeting.dont_save() {
            return Ok((output, None));
        }

        let mut path = base.as_os_str().to_owned();
        path.push(&registration.extension);
        let path = PathBuf::from(path);
        self.write_file(&path, &output, meeting.restricts_logs())?;
        Ok((output, Some(path)))
    }

    fn write_file(&self, path: &Path, text: &str, restrict: bool) -> Result<(), WriterError> {
        let io_err = |source: std::io::Error| WriterError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, text).map_err(io_err)?;
        if restrict {
            restrict_permissions(path, self.restrict_perm).map_err(io_err)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, restrict_perm: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(path)?.permissions().mode() & !restrict_perm;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn restrict_permissions(path: &Path, _restrict_perm: u32) -> std::io::Result<()> {
    tracing::warn!("Permission restriction unsupported here, left {:?} as is", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registration_arguments() {
        let reg = WriterRegistration::parse(".tmp.html|template=+minutes.html", "template").unwrap();
        assert_eq!(reg.extension, ".tmp.html");
        assert_eq!(reg.args.get("template").map(String::as_str), Some("+minutes.html"));
    }

    #[test]
    fn test_parse_registration_rejects_bad_extension() {
        assert!(matches!(
            WriterRegistration::parse("html", "html"),
            Err(ConfigError::BadExtension(_))
        ));
        assert!(matches!(
            WriterRegistration::parse(".", "html"),
            Err(ConfigError::BadExtension(_))
        ));
    }

    #[test]
    fn test_parse_registration_rejects_bad_argument() {
        assert!(matches!(
            WriterRegistration::parse(".x|template", "template"),
            Err(ConfigError::BadWriterArgument { .. })
        ));
    }

    #[test]
    fn test_raw_log_registered_first() {
        let config = Config::default()
            .with_overrides("[writers]\n\".a.html\" = \"html\"\n")
            .unwrap();
        let pipeline = Pipeline::from_config(&config).unwrap();
        let extensions: Vec<_> = pipeline
            .registrations()
            .iter()
            .map(|r| r.extension.as_str())
            .collect();
        assert_eq!(extensions[0], RAW_LOG_EXTENSION);
        assert!(extensions.contains(&".a.html"));
        assert_eq!(extensions.iter().filter(|e| **e == RAW_LOG_EXTENSION).count(), 1);
    }

    #[test]
    fn test_raw_log_under_other_key_registered_first() {
        let mut config = Config::default();
        config.output.write_raw_log = false;
        config.writers.clear();
        config.writers.insert(".a.html".to_string(), "html".to_string());
        config.writers.insert(".raw.txt".to_string(), "text-log".to_string());
        config.writers.insert(".b.txt".to_string(), "text".to_string());

        let pipeline = Pipeline::from_config(&config).unwrap();
        let extensions: Vec<_> = pipeline
            .registrations()
            .iter()
            .map(|r| r.extension.as_str())
            .collect();
        assert_eq!(extensions, vec![".raw.txt", ".a.html", ".b.txt"]);
    }

    #[test]
    fn test_unknown_writer_fails_registration() {
        let config = Config::default()
            .with_overrides("[writers]\n\".pdf\" = \"pdf\"\n")
            .unwrap();
        assert!(matches!(
            Pipeline::from_config(&config),
            Err(ConfigError::UnknownWriter(_))
        ));
    }
}
