//! Nested HTML list for the minutes summary.
//!
//! Three levels: topics, then subtopics and plain items under a topic,
//! then items under a subtopic. Items before any topic still get a
//! containing entry so the markup stays balanced.

use crate::minutes::ItemKind;

use super::report::{indent_item, wrap_list};

#[derive(Debug, Default)]
pub struct ListNester {
    out: Vec<String>,
    have_topic: bool,
    have_subtopic: bool,
    in_sublist: bool,
    in_subsublist: bool,
}

impl ListNester {
    pub fn new() -> Self {
        Self {
            out: vec!["<ol>".to_string()],
            ..Self::default()
        }
    }

    /// Add one item; `body` is its rendered HTML without the `<li>`.
    pub fn push(&mut self, kind: ItemKind, body: &str) {
        let item = format!("<li>{}", body);
        let line = match kind {
            ItemKind::Topic => {
                self.close_sublist();
                if self.have_topic {
                    self.out.push(indent_item("</li><br>", 2));
                }
                self.have_topic = true;
                wrap_list(&item, 2)
            }
            ItemKind::Subtopic => {
                self.open_sublist();
                self.have_subtopic = true;
                wrap_list(&item, 6)
            }
            _ => {
                self.open_sublist();
                if self.have_subtopic {
                    if !self.in_subsublist {
                        self.out.push(indent_item("<ol type=\"i\">", 8));
                        self.in_subsublist = true;
                    }
                    format!("{}</li>", wrap_list(&item, 10))
                } else {
                    format!("{}</li>", wrap_list(&item, 6))
                }
            }
        };
        self.out.push(line);
    }

    fn open_sublist(&mut self) {
        if self.in_sublist {
            return;
        }
        if !self.have_topic {
            self.out.push(indent_item("<li>", 2));
            self.have_topic = true;
        }
        self.out.push(indent_item("<ol type=\"a\">", 4));
        self.in_sublist = true;
    }

    /// Close subtopic and sublist levels before a new topic.
    fn close_sublist(&mut self) {
        if self.have_subtopic {
            if self.in_subsublist {
                self.out.push(indent_item("</ol>", 8));
                self.in_subsublist = false;
            }
            self.out.push(indent_item("</li>", 6));
            self.have_subtopic = false;
        }
        if self.in_sublist {
            self.out.push(indent_item("</ol>", 4));
            self.in_sublist = false;
        }
    }

    pub fn finish(mut self) -> String {
        self.close_sublist();
        if self.have_topic {
            self.out.push(indent_item("</li>", 2));
        }
        self.out.push("</ol>".to_string());
        self.out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced(html: &str, open: &str, close: &str) -> bool {
        html.matches(open).count() == html.matches(close).count()
    }

    fn check(html: &str) {
        assert!(balanced(html, "<ol", "</ol>"), "unbalanced ol:\n{}", html);
        assert!(balanced(html, "<li>", "</li>"), "unbalanced li:\n{}", html);
    }

    #[test]
    fn test_topics_with_items() {
        let mut nester = ListNester::new();
        nester.push(ItemKind::Topic, "A");
        nester.push(ItemKind::Info, "a1");
        nester.push(ItemKind::Topic, "B");
        nester.push(ItemKind::Idea, "b1");
        let html = nester.finish();

        check(&html);
        assert!(html.contains("</li><br>"));
    }

    #[test]
    fn test_subtopic_nesting() {
        let mut nester = ListNester::new();
        nester.push(ItemKind::Topic, "A");
        nester.push(ItemKind::Subtopic, "A.1");
        nester.push(ItemKind::Info, "under A.1");
        nester.push(ItemKind::Info, "also under A.1");
        nester.push(ItemKind::Topic, "B");
        let html = nester.finish();

        check(&html);
        assert_eq!(html.matches("<ol type=\"i\">").count(), 1);
    }

    #[test]
    fn test_items_before_first_topic() {
        let mut nester = ListNester::new();
        nester.push(ItemKind::Info, "early");
        nester.push(ItemKind::Topic, "A");
        let html = nester.finish();

        check(&html);
        assert!(html.starts_with("<ol>\n  <li>\n    <ol type=\"a\">"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(ListNester::new().finish(), "<ol>\n</ol>");
    }
}
