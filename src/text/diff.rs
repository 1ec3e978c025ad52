//! Character diff with semantic cleanup, rendered as annotated HTML spans

use super::escape::fancy_escape;

/// Above this many LCS cells the middle section is reported as a plain replacement
const MAX_LCS_CELLS: usize = 4_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equal,
    Insert,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub op: Op,
    pub text: String,
}

impl Edit {
    fn new(op: Op, chars: &[char]) -> Self {
        Self {
            op,
            text: chars.iter().collect(),
        }
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }
}

pub fn diff(old: &str, new: &str) -> Vec<Edit> {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mut edits = Vec::new();
    if prefix > 0 {
        edits.push(Edit::new(Op::Equal, &a[..prefix]));
    }
    edits.extend(diff_middle(&a[prefix..a.len() - suffix], &b[prefix..b.len() - suffix]));
    if suffix > 0 {
        edits.push(Edit::new(Op::Equal, &a[a.len() - suffix..]));
    }

    merge(edits)
}

fn diff_middle(a: &[char], b: &[char]) -> Vec<Edit> {
    if a.is_empty() && b.is_empty() {
        return Vec::new();
    }
    if a.is_empty() {
        return vec![Edit::new(Op::Insert, b)];
    }
    if b.is_empty() {
        return vec![Edit::new(Op::Delete, a)];
    }
    if a.len().saturating_mul(b.len()) > MAX_LCS_CELLS {
        return vec![Edit::new(Op::Delete, a), Edit::new(Op::Insert, b)];
    }

    let (n, m) = (a.len(), b.len());
    let width = m + 1;
    // lcs[i * width + j] = LCS length of a[i..] and b[j..]
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if a[i] == b[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let mut edits: Vec<Edit> = Vec::new();
    let mut push = |op: Op, c: char| match edits.last_mut() {
        Some(last) if last.op == op => last.text.push(c),
        _ => edits.push(Edit {
            op,
            text: c.to_string(),
        }),
    };

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            push(Op::Equal, a[i]);
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            push(Op::Delete, a[i]);
            i += 1;
        } else {
            push(Op::Insert, b[j]);
            j += 1;
        }
    }
    for &c in &a[i..] {
        push(Op::Delete, c);
    }
    for &c in &b[j..] {
        push(Op::Insert, c);
    }

    cleanup_semantic(edits)
}

/// Dissolves equalities no longer than the edits on either side of them
fn cleanup_semantic(mut edits: Vec<Edit>) -> Vec<Edit> {
    loop {
        let mut changed = false;
        let mut i = 0;
        while i < edits.len() {
            if edits[i].op == Op::Equal && i > 0 && i + 1 < edits.len() {
                let before = edit_run_len(&edits[..i], true);
                let after = edit_run_len(&edits[i + 1..], false);
                let len = edits[i].len();
                if before > 0 && after > 0 && len <= before && len <= after {
                    let text = edits[i].text.clone();
                    edits.splice(
                        i..=i,
                        [
                            Edit {
                                op: Op::Delete,
                                text: text.clone(),
                            },
                            Edit {
                                op: Op::Insert,
                                text,
                            },
                        ],
                    );
                    changed = true;
                }
            }
            i += 1;
        }
        edits = merge(edits);
        if !changed {
            return edits;
        }
    }
}

/// Largest insert or delete length within the edit run adjacent to an equality
fn edit_run_len(edits: &[Edit], backwards: bool) -> usize {
    let (mut inserted, mut deleted) = (0, 0);
    let mut tally = |e: &Edit| match e.op {
        Op::Insert => inserted += e.len(),
        Op::Delete => deleted += e.len(),
        Op::Equal => {}
    };
    if backwards {
        edits
            .iter()
            .rev()
            .take_while(|e| e.op != Op::Equal)
            .for_each(&mut tally);
    } else {
        edits
            .iter()
            .take_while(|e| e.op != Op::Equal)
            .for_each(&mut tally);
    }
    inserted.max(deleted)
}

/// Collapses each run of edits into one delete followed by one insert, joining equalities
fn merge(edits: Vec<Edit>) -> Vec<Edit> {
    let mut out: Vec<Edit> = Vec::with_capacity(edits.len());
    let mut deleted = String::new();
    let mut inserted = String::new();

    let flush = |out: &mut Vec<Edit>, deleted: &mut String, inserted: &mut String| {
        if !deleted.is_empty() {
            out.push(Edit {
                op: Op::Delete,
                text: std::mem::take(deleted),
            });
        }
        if !inserted.is_empty() {
            out.push(Edit {
                op: Op::Insert,
                text: std::mem::take(inserted),
            });
        }
    };

    for edit in edits {
        match edit.op {
            Op::Delete => deleted.push_str(&edit.text),
            Op::Insert => inserted.push_str(&edit.text),
            Op::Equal => {
                flush(&mut out, &mut deleted, &mut inserted);
                if edit.text.is_empty() {
                    continue;
                }
                match out.last_mut() {
                    Some(last) if last.op == Op::Equal => last.text.push_str(&edit.text),
                    _ => out.push(edit),
                }
            }
        }
    }
    flush(&mut out, &mut deleted, &mut inserted);
    out
}

/// Renders `new` against `old`; a deletion directly followed by an insertion becomes one replace span
pub fn render_diff(old: &str, new: &str) -> String {
    let mut rendered = String::new();
    let mut removed: Option<String> = None;

    for edit in diff(old, new) {
        match edit.op {
            Op::Equal => {
                if let Some(text) = removed.take() {
                    rendered.push_str(&span("diff-delete", &text));
                }
                rendered.push_str(&fancy_escape(&edit.text));
            }
            Op::Insert => {
                let class = if removed.take().is_some() {
                    "diff-replace"
                } else {
                    "diff-insert"
                };
                rendered.push_str(&span(class, &edit.text));
            }
            Op::Delete => removed = Some(edit.text),
        }
    }
    if let Some(text) = removed {
        rendered.push_str(&span("diff-delete", &text));
    }

    rendered
}

fn span(class: &str, text: &str) -> String {
    format!(r#"<span class="{}">{}</span>"#, class, fancy_escape(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_only() {
        let edits = diff("hello world", "hello brave world");
        assert_eq!(
            edits,
            vec![
                Edit {
                    op: Op::Equal,
                    text: "hello ".into()
                },
                Edit {
                    op: Op::Insert,
                    text: "brave ".into()
                },
                Edit {
                    op: Op::Equal,
                    text: "world".into()
                },
            ]
        );
        let html = render_diff("hello world", "hello brave world");
        assert_eq!(html, r#"hello <span class="diff-insert">brave </span>world"#);
        assert!(!html.contains("diff-delete"));
    }

    #[test]
    fn test_substitution_is_single_replace() {
        let html = render_diff("foo", "bar");
        assert_eq!(html, r#"<span class="diff-replace">bar</span>"#);
        assert!(!html.contains("diff-delete"));
        assert!(!html.contains("diff-insert"));
    }

    #[test]
    fn test_trailing_delete() {
        assert_eq!(
            render_diff("close window", "close"),
            r#"close<span class="diff-delete"> window</span>"#
        );
    }

    #[test]
    fn test_semantic_cleanup_absorbs_short_equalities() {
        // The lone shared "a" would otherwise split the edit in two
        let edits = diff("cat", "dog and");
        assert!(edits.iter().all(|e| e.op != Op::Equal));
        assert_eq!(edits.len(), 2);
    }

    #[test]
    fn test_escapes_tags_in_output() {
        let html = render_diff("<b>Save</b>", "<b>Save all</b>");
        assert!(html.contains(r#"<span class="highlight-html">&lt;b&gt;</span>"#));
        assert!(html.contains(r#"<span class="diff-insert"> all</span>"#));
    }

    #[test]
    fn test_identical() {
        assert_eq!(render_diff("same & same", "same & same"), "same &amp; same");
        assert!(diff("", "").is_empty());
    }
}
