//! Machine translation providers

pub mod apertium;
pub mod google;

use std::future::Future;
use std::pin::Pin;
use tracing::info;

use crate::error::{EditorError, EditorResult};
use crate::text::escape::html_to_text;
use crate::text::placeholder::{extract, restore};

pub use apertium::Apertium;
pub use google::GoogleTranslate;

pub type MtFuture<'a> = Pin<Box<dyn Future<Output = EditorResult<String>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

pub trait MtProvider: Send + Sync {
    fn name(&self) -> &str;

    fn pairs(&self) -> &[LanguagePair];

    /// Whether the exact source/target pair must be listed, or any listed source will do
    fn validate_pairs(&self) -> bool;

    fn translate<'a>(&'a self, text: &'a str, from: &'a str, to: &'a str) -> MtFuture<'a>;
}

/// `pt_BR@latin` -> `pt-BR`
pub fn normalize_code(locale: &str) -> String {
    let clean = locale.replacen('_', "-", 1);
    match clean.find('@') {
        Some(at) => clean[..at].to_string(),
        None => clean,
    }
}

pub fn is_supported_source(pairs: &[LanguagePair], source: &str) -> bool {
    pairs.iter().any(|p| p.source == source)
}

pub fn is_supported_target(pairs: &[LanguagePair], target: &str) -> bool {
    pairs.iter().any(|p| p.target == target)
}

pub fn is_supported_pair(pairs: &[LanguagePair], source: &str, target: &str) -> bool {
    pairs.iter().any(|p| p.source == source && p.target == target)
}

pub fn supports(provider: &dyn MtProvider, source: &str, target: &str) -> bool {
    let pairs = provider.pairs();
    if !is_supported_target(pairs, target) {
        return false;
    }
    if provider.validate_pairs() {
        is_supported_pair(pairs, source, target)
    } else {
        is_supported_source(pairs, source)
    }
}

/// Finds an enabled provider by its name or the first word of it (`google`)
pub fn find_provider<'a>(
    providers: &'a [Box<dyn MtProvider>],
    requested: &str,
) -> Option<&'a dyn MtProvider> {
    let requested = requested.to_lowercase();
    providers
        .iter()
        .find(|p| {
            let name = p.name().to_lowercase();
            name == requested || name.split_whitespace().next() == Some(requested.as_str())
        })
        .map(|p| p.as_ref())
}

/// Translates each plural form, keeping markup and placeholders intact
pub async fn translate_forms(
    provider: &dyn MtProvider,
    sources: &[String],
    from: &str,
    to: &str,
) -> EditorResult<Vec<String>> {
    let from = normalize_code(from);
    let to = normalize_code(to);

    if !supports(provider, &from, &to) {
        return Err(EditorError::provider(
            provider.name(),
            format!("{} -> {} is not supported", from, to),
        ));
    }

    let mut targets = Vec::with_capacity(sources.len());
    for source in sources {
        let (masked, subs) = extract(source);
        let translated = provider.translate(&masked, &from, &to).await?;
        targets.push(restore(&html_to_text(&translated), &subs));
    }

    info!(
        "{} translated {} form(s) {} -> {}",
        provider.name(),
        targets.len(),
        from,
        to
    );
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo {
        pairs: Vec<LanguagePair>,
        validate: bool,
    }

    impl MtProvider for Echo {
        fn name(&self) -> &str {
            "Echo"
        }

        fn pairs(&self) -> &[LanguagePair] {
            &self.pairs
        }

        fn validate_pairs(&self) -> bool {
            self.validate
        }

        fn translate<'a>(&'a self, text: &'a str, _from: &'a str, _to: &'a str) -> MtFuture<'a> {
            // Mimics an engine that answers with HTML escaped text
            let out = text.replace('\'', "&#39;").to_uppercase();
            Box::pin(async move { Ok(out) })
        }
    }

    /// Answers every request with a fixed reply
    struct Canned {
        reply: &'static str,
        pairs: Vec<LanguagePair>,
    }

    impl Canned {
        fn new(reply: &'static str, from: &str, to: &str) -> Self {
            Self {
                reply,
                pairs: vec![LanguagePair::new(from, to)],
            }
        }
    }

    impl MtProvider for Canned {
        fn name(&self) -> &str {
            "Canned"
        }

        fn pairs(&self) -> &[LanguagePair] {
            &self.pairs
        }

        fn validate_pairs(&self) -> bool {
            true
        }

        fn translate<'a>(&'a self, _text: &'a str, _from: &'a str, _to: &'a str) -> MtFuture<'a> {
            let out = self.reply.to_string();
            Box::pin(async move { Ok(out) })
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("pt_BR"), "pt-BR");
        assert_eq!(normalize_code("sr_RS@latin"), "sr-RS");
        assert_eq!(normalize_code("fr"), "fr");
    }

    #[test]
    fn test_supports() {
        let pairs = vec![LanguagePair::new("en", "es"), LanguagePair::new("fr", "ca")];
        let strict = Echo {
            pairs: pairs.clone(),
            validate: true,
        };
        assert!(supports(&strict, "en", "es"));
        assert!(!supports(&strict, "en", "ca"));

        let loose = Echo {
            pairs,
            validate: false,
        };
        assert!(supports(&loose, "en", "ca"));
        assert!(!supports(&loose, "de", "ca"));
        assert!(!supports(&loose, "en", "de"));
    }

    #[test]
    fn test_find_provider_by_first_word() {
        let providers: Vec<Box<dyn MtProvider>> = vec![Box::new(Echo {
            pairs: Vec::new(),
            validate: false,
        })];
        assert!(find_provider(&providers, "echo").is_some());
        assert!(find_provider(&providers, "ECHO").is_some());
        assert!(find_provider(&providers, "apertium").is_none());
    }

    #[tokio::test]
    async fn test_translate_forms_restores_placeholders() {
        let echo = Echo {
            pairs: vec![LanguagePair::new("en", "es")],
            validate: true,
        };
        let out = translate_forms(&echo, &["it's %s".to_string()], "en", "es")
            .await
            .unwrap();
        assert_eq!(out, vec!["IT'S %s".to_string()]);
    }

    #[tokio::test]
    async fn test_translate_forms_decodes_named_entities() {
        let provider = Canned::new("[0][2][1] m&oacute;n &eacute;t&eacute;", "en", "ca");
        let out = translate_forms(&provider, &["<b>%s</b> world summer".to_string()], "en", "ca")
            .await
            .unwrap();
        assert_eq!(out, vec!["<b>%s</b> món été".to_string()]);
    }

    #[tokio::test]
    async fn test_translate_forms_keeps_literal_markers() {
        let source = "Step [1] <a title=\"[2]\">go</a>";
        assert_eq!(extract(source).0, "Step [0] [2]go[3]");

        let provider = Canned::new("Paso [0] [2]ir&aacute;[3]", "en", "es");
        let out = translate_forms(&provider, &[source.to_string()], "en", "es")
            .await
            .unwrap();
        assert_eq!(out, vec!["Paso [1] <a title=\"[2]\">irá</a>".to_string()]);
    }

    #[tokio::test]
    async fn test_unsupported_pair_is_provider_error() {
        let echo = Echo {
            pairs: vec![LanguagePair::new("en", "es")],
            validate: true,
        };
        let err = translate_forms(&echo, &["x".to_string()], "en_US", "de")
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::Provider { .. }));
    }
}
