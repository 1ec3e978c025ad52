//! URL fragment state: `key=value` pairs joined by `&`

use once_cell::sync::Lazy;
use regex::Regex;

static PAIR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^&;=]+)=?([^&;]*)").expect("pair regex"));

pub fn decode_param(s: &str) -> String {
    let spaced = s.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|c| c.into_owned())
        .unwrap_or(spaced)
}

/// Decoded pairs in fragment order
pub fn parse(fragment: &str) -> Vec<(String, String)> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    PAIR_RE
        .captures_iter(fragment)
        .map(|caps| (decode_param(&caps[1]), decode_param(&caps[2])))
        .collect()
}

/// Last value given for `key`
pub fn get(fragment: &str, key: &str) -> Option<String> {
    parse(fragment)
        .into_iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

/// Sets `part` to `value`, dropping the keys in `remove`; other pairs are kept verbatim
pub fn update_part(fragment: &str, part: &str, value: &str, remove: &[&str]) -> String {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut params = Vec::new();
    let mut found = false;

    for caps in PAIR_RE.captures_iter(fragment) {
        let key = decode_param(&caps[1]);
        if key == part {
            params.push(format!("{}={}", &caps[1], urlencoding::encode(value)));
            found = true;
        } else if !remove.contains(&key.as_str()) {
            params.push(format!("{}={}", &caps[1], &caps[2]));
        }
    }

    if !found {
        params.push(format!(
            "{}={}",
            urlencoding::encode(part),
            urlencoding::encode(value)
        ));
    }

    params.join("&")
}
