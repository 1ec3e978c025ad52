//! Active filter, search terms and the query parameters they produce

use regex::Regex;

/// Fields the server can search in
pub const SEARCH_OPTIONS: &[&str] = &["source", "target", "notes", "locations"];
const DEFAULT_SEARCH_FIELDS: &[&str] = &["source", "target"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub filter: String,
    pub checks: Vec<String>,
    pub search_text: Option<String>,
    pub search_fields: Vec<String>,
    prev_filter: String,
    prev_checks: Vec<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            filter: "all".to_string(),
            checks: Vec::new(),
            search_text: None,
            search_fields: Vec::new(),
            prev_filter: "all".to_string(),
            prev_checks: Vec::new(),
        }
    }
}

impl FilterState {
    /// Applies a `filter=name[,check...]` value, remembering the current state for rollback
    pub fn set_filter(&mut self, value: &str) {
        self.prev_filter = self.filter.clone();
        self.prev_checks = self.checks.clone();

        let mut parts = value.split(',');
        self.filter = parts.next().unwrap_or("all").to_string();
        self.checks = if self.filter == "checks" {
            parts.map(str::to_string).collect()
        } else {
            Vec::new()
        };
    }

    /// A search overrides any other filter given alongside it
    pub fn set_search(&mut self, text: &str, fields: Option<&str>) {
        self.filter = "search".to_string();
        self.search_text = Some(text.to_string());
        if let Some(fields) = fields {
            self.search_fields = fields
                .split(',')
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    /// Restores the filter that was active before the last `set_filter`
    pub fn rollback(&mut self) {
        self.filter = self.prev_filter.clone();
        self.checks = self.prev_checks.clone();
    }

    pub fn is_search(&self) -> bool {
        self.filter == "search"
    }

    pub fn request_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut push = |k: &str, v: &str| params.push((k.to_string(), v.to_string()));

        match self.filter.as_str() {
            "checks" => {
                if !self.checks.is_empty() {
                    push("matchnames", &self.checks.join(","));
                }
            }
            "search" => {
                push("search", self.search_text.as_deref().unwrap_or(""));
                if self.search_fields.is_empty() {
                    for field in DEFAULT_SEARCH_FIELDS {
                        push("sfields", field);
                    }
                } else {
                    for field in &self.search_fields {
                        push("sfields", field);
                    }
                }
            }
            "suggestions" => push("matchnames", "hassuggestion"),
            "mysuggestions" => push("matchnames", "ownsuggestion"),
            "all" => {}
            "incomplete" => push("unitstates", "untranslated,fuzzy"),
            other => push("unitstates", other),
        }

        params
    }

    /// Regex highlighting any word of the active search
    pub fn highlight_pattern(&self) -> Option<Regex> {
        if !self.is_search() {
            return None;
        }
        let text = self.search_text.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }
        let words: Vec<String> = text.split(' ').filter(|w| !w.is_empty()).map(regex::escape).collect();
        Regex::new(&format!("(?i)({})", words.join("|"))).ok()
    }
}

fn is_field_token(part: &str) -> bool {
    part.len() > 3 && part.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("in:"))
}

/// Builds the fragment for a search box entry, honouring inline `in:field` tokens
///
/// When the text carries no field tokens, `selected` (the fields ticked in the
/// advanced search options) is used instead.
pub fn parse_search(text: &str, selected: &[String]) -> String {
    let parts: Vec<&str> = text.split(' ').collect();
    let has_fields = parts.iter().any(|p| is_field_token(p));

    let mut fields: Vec<String> = Vec::new();
    let parsed = if has_fields {
        let mut remaining = Vec::new();
        for part in parts {
            if is_field_token(part) {
                let opt = part.split(':').nth(1).unwrap_or("");
                if SEARCH_OPTIONS.contains(&opt) {
                    fields.push(opt.to_string());
                }
            } else {
                remaining.push(part);
            }
        }
        urlencoding::encode(&remaining.join(" ")).into_owned()
    } else {
        fields.extend(selected.iter().cloned());
        urlencoding::encode(text).into_owned()
    };

    if fields.is_empty() {
        format!("search={}", parsed)
    } else {
        format!("search={}&sfields={}", parsed, fields.join(","))
    }
}
