//! Terminal rendering helpers

use colored::Colorize;

use crate::text::diff::{Edit, Op};

pub fn truncate_display(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Keeps a table row on one line
pub fn one_line(s: &str) -> String {
    s.replace("\r\n", "\u{21b5}")
        .replace(['\n', '\r'], "\u{21b5}")
        .replace('\t', "\u{2192}")
}

pub fn colorize_edits(edits: &[Edit]) -> String {
    edits
        .iter()
        .map(|e| match e.op {
            Op::Equal => e.text.normal().to_string(),
            Op::Insert => e.text.green().underline().to_string(),
            Op::Delete => e.text.red().strikethrough().to_string(),
        })
        .collect()
}
