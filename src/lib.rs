//! Meeting minutes secretary for chat channels.
//!
//! Chat lines flow through the line normalizer into a [`meeting::Meeting`],
//! which interprets `#command` lines, records minutes items and drives the
//! writer pipeline that renders the log and minutes documents.

pub mod app;
pub mod bot;
pub mod cli;
pub mod command;
pub mod config;
pub mod global;
pub mod meeting;
pub mod minutes;
pub mod normalizer;
pub mod replay;
pub mod writers;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
