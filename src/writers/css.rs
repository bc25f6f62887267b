//! Stylesheets for the HTML outputs.

use std::fs;
use tracing::error;

use crate::config::Config;

use super::WriterError;

const DEFAULT_LOG_CSS: &str = include_str!("../../assets/css-log-default.css");
const DEFAULT_MINUTES_CSS: &str = include_str!("../../assets/css-minutes-default.css");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssTarget {
    Log,
    Minutes,
}

impl CssTarget {
    fn bundled(self) -> &'static str {
        match self {
            Self::Log => DEFAULT_LOG_CSS,
            Self::Minutes => DEFAULT_MINUTES_CSS,
        }
    }

    fn settings(self, config: &Config) -> (&str, bool) {
        match self {
            Self::Log => (config.css.file_log.as_str(), config.css.embed_log),
            Self::Minutes => (config.css.file_minutes.as_str(), config.css.embed_minutes),
        }
    }
}

fn style_block(css: &str) -> String {
    format!("<style type=\"text/css\">\n{}\n</style>", css)
}

/// The `<head>` snippet for `target`.
///
/// `none` gives nothing, `default` (or empty) embeds the bundled sheet,
/// and a path is either embedded or linked. An unreadable path falls
/// back to the bundled sheet in safe mode.
pub fn stylesheet(config: &Config, target: CssTarget) -> Result<String, WriterError> {
    let (file, embed) = target.settings(config);

    if file.eq_ignore_ascii_case("none") {
        return Ok(String::new());
    }
    if file.is_empty() || file == "default" {
        return Ok(style_block(target.bundled()));
    }
    if !embed {
        return Ok(format!("<link rel=\"stylesheet\" type=\"text/css\" href=\"{}\">", file));
    }

    match fs::read_to_string(file) {
        Ok(css) => Ok(style_block(&css)),
        Err(e) if config.output.safe_mode => {
            error!("Stylesheet {} unreadable, using the default: {}", file, e);
            Ok(style_block(target.bundled()))
        }
        Err(source) => Err(WriterError::Stylesheet {
            path: file.to_string(),
            source,
        }),
    }
}
