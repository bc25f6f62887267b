//! Output writers.
//!
//! Each writer turns a meeting snapshot into one document. The
//! [`Pipeline`] decides which writers run, in which order, and where
//! their output lands.

mod css;
#[cfg(test)]
mod fixtures;
mod html;
mod html_log;
mod html_table;
mod moin;
mod nesting;
mod pipeline;
mod report;
mod rst;
mod template;
mod text;
mod text_log;
mod wiki;

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::meeting::Meeting;

pub use css::{stylesheet, CssTarget};
pub use pipeline::{
    Pipeline, SaveMode, SaveReport, WriterFailure, WriterRegistration, RAW_LOG_EXTENSION,
};
pub use report::{indent_item, wrap_list, ActionGroups, Report};

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Failed to name output files: {0}")]
    Naming(#[from] ConfigError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    #[error("Template rendering failed: {0}")]
    Template(#[from] tera::Error),
    #[error("Stylesheet {path} unavailable: {source}")]
    Stylesheet {
        path: String,
        source: std::io::Error,
    },
}

/// Everything a writer may read during one render.
pub struct RenderContext<'a> {
    pub meeting: &'a Meeting,
    /// Extension key without `|` arguments.
    pub extension: &'a str,
    /// `|name=value` arguments from the extension key.
    pub args: &'a BTreeMap<String, String>,
}

impl<'a> RenderContext<'a> {
    pub fn report(&self) -> Result<Report<'a>, WriterError> {
        Report::new(self.meeting)
    }
}

pub trait Writer: Send + Sync {
    /// Name used in the `[writers]` configuration table.
    fn name(&self) -> &'static str;

    /// Whether this writer re-renders after every line.
    fn realtime(&self) -> bool {
        false
    }

    /// Whether the output is the replayable raw transcript.
    fn is_raw_log(&self) -> bool {
        false
    }

    fn format(&self, ctx: &RenderContext<'_>) -> Result<String, WriterError>;
}

/// Every writer name the configuration may use.
pub const WRITER_NAMES: &[&str] = &[
    "text-log",
    "html-log",
    "html-table",
    "html",
    "rst",
    "text",
    "mediawiki",
    "pmwiki",
    "moin",
    "template",
];

/// Look up a writer by configured name.
pub fn writer_for_name(name: &str) -> Result<Box<dyn Writer>, ConfigError> {
    let writer: Box<dyn Writer> = match name.to_lowercase().as_str() {
        "text-log" => Box::new(text_log::TextLogWriter),
        "html-log" => Box::new(html_log::HtmlLogWriter),
        "html-table" => Box::new(html_table::HtmlTableWriter),
        "html" => Box::new(html::HtmlWriter),
        "rst" => Box::new(rst::RstWriter),
        "text" => Box::new(text::TextWriter),
        "mediawiki" => Box::new(wiki::WikiWriter::mediawiki()),
        "pmwiki" => Box::new(wiki::WikiWriter::pmwiki()),
        "moin" => Box::new(moin::MoinWriter),
        "template" => Box::new(template::TemplateWriter),
        _ => return Err(ConfigError::UnknownWriter(name.to_string())),
    };
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_name_resolves() {
        for name in WRITER_NAMES {
            let writer = writer_for_name(name).unwrap();
            assert_eq!(writer.name(), *name);
        }
    }

    #[test]
    fn test_unknown_writer_name() {
        let result = writer_for_name("pdf");
        assert!(matches!(result, Err(ConfigError::UnknownWriter(name)) if name == "pdf"));
    }

    #[test]
    fn test_only_text_log_is_realtime() {
        let realtime: Vec<_> = WRITER_NAMES
            .iter()
            .filter(|name| writer_for_name(name).unwrap().realtime())
            .collect();
        assert_eq!(realtime, vec![&"text-log"]);
    }
}
