//! HTML escaping used when rendering units and diffs

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static FANCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^<]*?>|\r\n|[\r\n\t&<>]").expect("fancy escape regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));

const ESCAPE_HL: &str = r#"<span class="highlight-escape">"#;
const HTML_HL: &str = r#"<span class="highlight-html">"#;

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replacen('\n', "<br/>", 1)
}

/// Escapes text while highlighting control characters and raw tags
pub fn fancy_escape(text: &str) -> String {
    FANCY_RE
        .replace_all(text, |caps: &Captures| {
            let m = &caps[0];
            match m {
                "\r\n" => format!("{}\\r\\n</span><br/>\n", ESCAPE_HL),
                "\r" => format!("{}\\r</span><br/>\n", ESCAPE_HL),
                "\n" => format!("{}\\n</span><br/>\n", ESCAPE_HL),
                "\t" => format!("{}\\t</span>\t", ESCAPE_HL),
                "&" => "&amp;".to_string(),
                "<" => "&lt;".to_string(),
                ">" => "&gt;".to_string(),
                tag => format!("{}&lt;{}&gt;</span>", HTML_HL, &tag[1..tag.len() - 1]),
            }
        })
        .into_owned()
}

/// Plain text of an HTML fragment: tags dropped, entities decoded
pub fn html_to_text(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, "");
    html_escape::decode_html_entities(&stripped).into_owned()
}
