//! Per-format text escaping.
//!
//! Only HTML and ReST escape anything. Plain text and the wiki dialects
//! pass user text through untouched.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

pub fn html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape `_` before a space, a dash or the end of the text, which ReST
/// would read as a hyperlink reference.
pub fn rst(text: &str) -> String {
    static UNDERSCORE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = UNDERSCORE.get_or_init(|| Regex::new(r"_( |-|$)").ok());
    match re {
        Some(re) => re.replace_all(text, r"\_$1").into_owned(),
        None => text.to_string(),
    }
}

pub fn text(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text)
}

pub fn mediawiki(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text)
}

pub fn moin(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text)
}

/// For attribute values in double quotes.
pub fn quote(text: &str) -> String {
    html(text).replace('"', "%22")
}
