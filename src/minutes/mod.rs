//! Minutes item model.
//!
//! Items are appended by meeting commands and only read by writers. Each
//! item renders itself for every output dialect.

pub mod escape;
mod item;

pub use item::{ItemKind, LinkTarget, MinutesItem, TemplateItem};
