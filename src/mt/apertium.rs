//! Apertium through an APy server

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{LanguagePair, MtFuture, MtProvider};
use crate::error::{EditorError, EditorResult};

const NAME: &str = "Apertium";
pub const DEFAULT_API_BASE: &str = "https://apertium.org/apy";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PairEntry {
    source_language: String,
    target_language: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    response_data: Option<T>,
    #[serde(default)]
    response_details: Option<String>,
    #[serde(default)]
    response_status: u16,
}

impl<T> Envelope<T> {
    fn into_data(self) -> EditorResult<T> {
        match self.response_data {
            Some(data) if self.response_status == 200 => Ok(data),
            _ => Err(EditorError::provider(
                NAME,
                self.response_details
                    .unwrap_or_else(|| format!("status {}", self.response_status)),
            )),
        }
    }
}

pub struct Apertium {
    client: reqwest::Client,
    api_base: String,
    pairs: Vec<LanguagePair>,
}

impl Apertium {
    /// Connects and loads the pairs the server offers
    pub async fn connect(api_base: &str, timeout_secs: u64) -> EditorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        let mut apertium = Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            pairs: Vec::new(),
        };

        let body = apertium.get(&format!("{}/listPairs", apertium.api_base)).await?;
        apertium.pairs = parse_pairs(&body)?;
        info!("{} offers {} language pairs", NAME, apertium.pairs.len());
        Ok(apertium)
    }

    async fn get(&self, url: &str) -> EditorResult<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() && response.status().as_u16() != 400 {
            // APy reports bad pairs with 400 and a JSON envelope, everything else is fatal
            return Err(EditorError::provider(
                NAME,
                format!("request failed: {}", response.status()),
            ));
        }
        Ok(response.text().await?)
    }

    async fn request(&self, text: &str, from: &str, to: &str) -> EditorResult<String> {
        let url = format!(
            "{}/translate?langpair={}|{}&q={}",
            self.api_base,
            urlencoding::encode(from),
            urlencoding::encode(to),
            urlencoding::encode(text)
        );
        debug!("apertium {} -> {}", from, to);
        let body = self.get(&url).await?;
        parse_translation(&body)
    }
}

fn decode<T: for<'de> Deserialize<'de>>(body: &str) -> EditorResult<T> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| EditorError::provider(NAME, format!("unreadable response: {}", e)))?;
    envelope.into_data()
}

fn parse_pairs(body: &str) -> EditorResult<Vec<LanguagePair>> {
    let entries: Vec<PairEntry> = decode(body)?;
    Ok(entries
        .iter()
        .map(|e| LanguagePair::new(&e.source_language, &e.target_language))
        .collect())
}

fn parse_translation(body: &str) -> EditorResult<String> {
    let data: TranslatedText = decode(body)?;
    Ok(data.translated_text)
}

impl MtProvider for Apertium {
    fn name(&self) -> &str {
        NAME
    }

    fn pairs(&self) -> &[LanguagePair] {
        &self.pairs
    }

    fn validate_pairs(&self) -> bool {
        true
    }

    fn translate<'a>(&'a self, text: &'a str, from: &'a str, to: &'a str) -> MtFuture<'a> {
        Box::pin(self.request(text, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let body = r#"{"responseData": [
            {"sourceLanguage": "en", "targetLanguage": "es"},
            {"sourceLanguage": "es", "targetLanguage": "ca"}
        ], "responseDetails": null, "responseStatus": 200}"#;
        let pairs = parse_pairs(body).unwrap();
        assert_eq!(pairs, vec![LanguagePair::new("en", "es"), LanguagePair::new("es", "ca")]);
    }

    #[test]
    fn test_parse_translation() {
        let body = r#"{"responseData": {"translatedText": "Hola m&oacute;n"},
            "responseDetails": null, "responseStatus": 200}"#;
        let translated = parse_translation(body).unwrap();
        assert_eq!(translated, "Hola m&oacute;n");
        assert_eq!(crate::text::escape::html_to_text(&translated), "Hola món");
    }

    #[test]
    fn test_error_envelope_is_provider_error() {
        let body = r#"{"responseData": null, "responseDetails": "That pair is not installed",
            "responseStatus": 400}"#;
        match parse_translation(body) {
            Err(EditorError::Provider { message, .. }) => {
                assert_eq!(message, "That pair is not installed")
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
