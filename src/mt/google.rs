//! Google Translate through the public web endpoint

use std::time::Duration;
use tracing::debug;

use super::{LanguagePair, MtFuture, MtProvider};
use crate::error::{EditorError, EditorResult};

const NAME: &str = "Google Translate";
const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

const LANGUAGES: &[&str] = &[
    "af", "ar", "be", "bg", "ca", "cs", "cy", "da", "de", "el", "en", "es", "et", "eu", "fa",
    "fi", "fr", "ga", "gl", "he", "hi", "hr", "hu", "id", "is", "it", "ja", "ko", "lt", "lv",
    "mk", "ms", "mt", "nl", "no", "pl", "pt", "pt-BR", "pt-PT", "ro", "ru", "sk", "sl", "sq",
    "sr", "sv", "sw", "th", "tl", "tr", "uk", "vi", "zh-CN", "zh-TW",
];

pub struct GoogleTranslate {
    client: reqwest::Client,
    pairs: Vec<LanguagePair>,
}

impl GoogleTranslate {
    pub fn new(timeout_secs: u64) -> EditorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        // Any known language translates into any other
        let pairs = LANGUAGES
            .iter()
            .flat_map(|s| {
                LANGUAGES
                    .iter()
                    .filter(move |t| *t != s)
                    .map(move |t| LanguagePair::new(s, t))
            })
            .collect();

        Ok(Self { client, pairs })
    }

    async fn request(&self, text: &str, from: &str, to: &str) -> EditorResult<String> {
        let url = format!(
            "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
            ENDPOINT,
            from,
            to,
            urlencoding::encode(text)
        );
        debug!("google translate {} -> {}", from, to);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "Mozilla/5.0")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EditorError::provider(
                NAME,
                format!("request failed: {}", response.status()),
            ));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

/// Joins the translated segments of a gtx response
fn parse_response(body: &str) -> EditorResult<String> {
    let parsed: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| EditorError::provider(NAME, format!("unreadable response: {}", e)))?;

    let mut result = String::new();
    if let Some(outer) = parsed.get(0).and_then(|v| v.as_array()) {
        for item in outer {
            if let Some(translated) = item.get(0).and_then(|v| v.as_str()) {
                result.push_str(translated);
            }
        }
    }

    if result.is_empty() {
        return Err(EditorError::provider(NAME, "no translation result"));
    }
    Ok(result)
}

impl MtProvider for GoogleTranslate {
    fn name(&self) -> &str {
        NAME
    }

    fn pairs(&self) -> &[LanguagePair] {
        &self.pairs
    }

    fn validate_pairs(&self) -> bool {
        false
    }

    fn translate<'a>(&'a self, text: &'a str, from: &'a str, to: &'a str) -> MtFuture<'a> {
        Box::pin(self.request(text, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_joins_segments() {
        let body = r#"[[["Bonjour. ","Hello. ",null,null,1],["Au revoir","Bye",null,null,1]],null,"en"]"#;
        assert_eq!(parse_response(body).unwrap(), "Bonjour. Au revoir");
    }

    #[test]
    fn test_parse_response_empty() {
        assert!(matches!(
            parse_response("[null]"),
            Err(EditorError::Provider { .. })
        ));
    }

    #[test]
    fn test_pairs_cover_every_direction() {
        let google = GoogleTranslate::new(5).unwrap();
        assert!(super::super::supports(&google, "en", "fr"));
        assert!(super::super::supports(&google, "fr", "zh-CN"));
        assert!(!super::super::supports(&google, "xx", "fr"));
    }
}
