//! Masks markup and format specifiers before text goes to an MT engine
//!
//! Every protected span is swapped for a `[N]` marker. Tokenizers run in a
//! fixed order over the progressively masked text, so later classes never see
//! what an earlier class already took.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("marker regex"));

/// Ordered tokenizer classes; index assignment follows this order
static TOKENIZERS: Lazy<Vec<(TokenClass, Regex)>> = Lazy::new(|| {
    [
        // Literal markers already in the source, so restoration stays unambiguous
        (TokenClass::Marker, r"\[\d+\]"),
        (TokenClass::HtmlTag, r"</?\w+.*?>"),
        (
            TokenClass::Printf,
            r"%%|%(\d+\$)?([-+'#0 ]*)(\*\d+\$|\*|\d+)?(\.(\*\d+\$|\*|\d+))?([scboxXuidfegEG])",
        ),
        (TokenClass::DotNet, r"\{\d+(,\d+)?(:[a-zA-Z ]+)?\}"),
        (TokenClass::PercentNumber, r"%\d+"),
    ]
    .into_iter()
    .map(|(class, pattern)| (class, Regex::new(pattern).expect("placeholder regex")))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Marker,
    HtmlTag,
    Printf,
    DotNet,
    PercentNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub class: TokenClass,
    pub original: String,
}

/// Placeholder map for a single MT request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    entries: Vec<Substitution>,
    /// The masked source, used to decide where engine-added whitespace is spurious
    masked: String,
}

impl Substitutions {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Substitution> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Substitution> {
        self.entries.iter()
    }
}

pub fn marker(index: usize) -> String {
    format!("[{}]", index)
}

pub fn extract(text: &str) -> (String, Substitutions) {
    let mut entries: Vec<Substitution> = Vec::new();
    let mut masked = text.to_string();

    for (class, re) in TOKENIZERS.iter() {
        masked = re
            .replace_all(&masked, |caps: &Captures| {
                let original = unmask(&caps[0], &entries);
                entries.push(Substitution {
                    class: *class,
                    original,
                });
                marker(entries.len() - 1)
            })
            .into_owned();
    }

    let subs = Substitutions {
        entries,
        masked: masked.clone(),
    };
    (masked, subs)
}

/// Puts back markers of earlier passes swallowed by a wider match, e.g. a tag
/// attribute holding a literal `[N]`
fn unmask(matched: &str, entries: &[Substitution]) -> String {
    MARKER_RE
        .replace_all(matched, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| entries.get(i))
                .map(|e| e.original.clone())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn restore(translated: &str, subs: &Substitutions) -> String {
    let mut text = translated.to_string();

    for i in 0..subs.len() {
        let m = regex::escape(&marker(i));
        let tight_after = Regex::new(&format!(r"{}\S", m)).expect("marker regex");
        let tight_before = Regex::new(&format!(r"\S{}", m)).expect("marker regex");

        if tight_after.is_match(&subs.masked) {
            let loose = Regex::new(&format!(r"{}\s+", m)).expect("marker regex");
            text = loose.replace(&text, marker(i).as_str()).into_owned();
        }
        if tight_before.is_match(&subs.masked) {
            let loose = Regex::new(&format!(r"\s+{}", m)).expect("marker regex");
            text = loose.replace(&text, marker(i).as_str()).into_owned();
        }
    }

    let mut used = vec![false; subs.len()];
    MARKER_RE
        .replace_all(&text, |caps: &Captures| {
            let restored = caps[1]
                .parse::<usize>()
                .ok()
                .filter(|&i| i < used.len() && !used[i]);
            match restored {
                Some(i) => {
                    used[i] = true;
                    subs.entries[i].original.clone()
                }
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_order_and_indices() {
        let (masked, subs) = extract("<b>%s</b> has {0} files, %1 left");
        assert_eq!(masked, "[0][2][1] has [3] files, [4] left");
        assert_eq!(subs.get(0).unwrap().original, "<b>");
        assert_eq!(subs.get(1).unwrap().original, "</b>");
        assert_eq!(subs.get(2).unwrap().class, TokenClass::Printf);
        assert_eq!(subs.get(3).unwrap().original, "{0}");
        assert_eq!(subs.get(4).unwrap().class, TokenClass::PercentNumber);
    }

    #[test]
    fn test_printf_variants() {
        let (masked, subs) = extract("%1$s of %-5.2f at 100%% and %*d");
        assert_eq!(masked, "[0] of [1] at 100[2] and [3]");
        let originals: Vec<&str> = subs.iter().map(|s| s.original.as_str()).collect();
        assert_eq!(originals, vec!["%1$s", "%-5.2f", "%%", "%*d"]);
    }

    #[test]
    fn test_dotnet_variants() {
        let (masked, _) = extract("{0,5} and {1:C} but not {name} or {2:N2}");
        assert_eq!(masked, "[0] and [1] but not {name} or {2:N2}");
    }

    #[test]
    fn test_round_trip_mixed() {
        for text in [
            "Open <a href=\"x\">%s</a> files",
            "%d of %d <br/> done",
            "Line [0] stays <i>{0}</i> %2",
            "[1]<a>",
            "<a title=\"[5]\">x</a>",
            "<img alt='[1]'> %s",
            "<a href=\"[0]\">[0] %d</a>",
            "",
            "plain text",
        ] {
            let (masked, subs) = extract(text);
            assert_eq!(restore(&masked, &subs), text, "round trip of {:?}", text);
        }
    }

    #[test]
    fn test_marker_inside_tag_keeps_its_text() {
        let (masked, subs) = extract("<a title=\"[5]\">x</a>");
        assert_eq!(masked, "[1]x[2]");
        assert_eq!(subs.get(1).unwrap().original, "<a title=\"[5]\">");
        assert_eq!(restore("[1]X[2]", &subs), "<a title=\"[5]\">X</a>");
    }

    #[test]
    fn test_restore_trims_engine_whitespace() {
        let (masked, subs) = extract("<b>Bold</b> text");
        assert_eq!(masked, "[0]Bold[1] text");
        let restored = restore("[0] Gras [1] texte", &subs);
        assert_eq!(restored, "<b>Gras</b> texte");
    }

    #[test]
    fn test_restore_keeps_whitespace_present_in_source() {
        let (_, subs) = extract("Value: %s items");
        assert_eq!(restore("Valeur : [0] éléments", &subs), "Valeur : %s éléments");
    }

    #[test]
    fn test_restore_skips_dropped_marker() {
        let (_, subs) = extract("%s and %d");
        assert_eq!(restore("et [1]", &subs), "et %d");
    }
}
