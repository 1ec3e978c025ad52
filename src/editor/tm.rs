//! Translation memory lookups for the active unit

use tracing::debug;

use super::EditorSession;
use crate::error::{EditorError, EditorResult};
use crate::model::UnitId;
use crate::server::{EditorApi, TmMatch};
use crate::text::{escape::fancy_escape, diff::render_diff};

/// How many TM candidates are shown
pub const MAX_TM_RESULTS: usize = 3;

/// Identifies one lookup; responses for an outdated ticket are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TmTicket {
    generation: u64,
    pub uid: UnitId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TmSuggestion {
    /// Source text of the stored translation
    pub source: String,
    /// Candidate source diffed against the unit's source
    pub source_diff: String,
    pub target: String,
    pub quality: f64,
    pub title: String,
    pub username: Option<String>,
}

pub fn filter_tm_results(source: &str, matches: Vec<TmMatch>) -> Vec<TmSuggestion> {
    matches
        .into_iter()
        .take(MAX_TM_RESULTS)
        .map(|m| TmSuggestion {
            source_diff: render_diff(source, &m.source),
            source: m.source,
            target: fancy_escape(&m.target),
            title: format!("{}% match", m.quality.round()),
            quality: m.quality,
            username: m.username,
        })
        .collect()
}

impl EditorSession {
    /// Starts a lookup for the active unit, invalidating any earlier one
    pub fn begin_tm_lookup(&mut self) -> EditorResult<TmTicket> {
        let uid = self.active_uid.ok_or(EditorError::NoActiveUnit)?;
        Ok(TmTicket {
            generation: self.bump_tm_generation(),
            uid,
        })
    }

    pub fn is_current(&self, ticket: &TmTicket) -> bool {
        ticket.generation == self.tm_generation() && self.active_uid == Some(ticket.uid)
    }

    /// Suggestions to show, or `None` when the response is stale or empty
    pub fn accept_tm_response(
        &self,
        ticket: &TmTicket,
        matches: Vec<TmMatch>,
    ) -> Option<Vec<TmSuggestion>> {
        if !self.is_current(ticket) {
            debug!("dropping stale TM response for unit {}", ticket.uid);
            return None;
        }
        if matches.is_empty() {
            return None;
        }
        let source = self.cache.unit(ticket.uid)?.source_text().to_string();
        Some(filter_tm_results(&source, matches))
    }

    /// Captures what a lookup needs, so the request can run while the session moves on
    pub fn prepare_tm_lookup(&mut self) -> EditorResult<TmRequest> {
        let ticket = self.begin_tm_lookup()?;
        let source = self
            .cache
            .unit(ticket.uid)
            .ok_or(EditorError::UnknownUnit(ticket.uid))?
            .source_text()
            .to_string();
        Ok(TmRequest {
            ticket,
            source_lang: self.meta.source_lang.clone(),
            target_lang: self.meta.target_lang.clone(),
            source,
        })
    }

    /// One lookup run to completion. Nothing else can touch the session meanwhile;
    /// interleaved callers use `prepare_tm_lookup`, `TmRequest::send` and
    /// `accept_tm_response`.
    pub async fn lookup_tm<A: EditorApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> EditorResult<Option<Vec<TmSuggestion>>> {
        let request = self.prepare_tm_lookup()?;
        let matches = request.send(api).await?;
        Ok(self.accept_tm_response(&request.ticket, matches))
    }
}

/// A lookup detached from the session it was prepared on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmRequest {
    pub ticket: TmTicket,
    source_lang: String,
    target_lang: String,
    source: String,
}

impl TmRequest {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub async fn send<A: EditorApi + ?Sized>(&self, api: &A) -> EditorResult<Vec<TmMatch>> {
        api.tm_lookup(&self.source_lang, &self.target_lang, &self.source)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tm(source: &str, target: &str, quality: f64) -> TmMatch {
        TmMatch {
            source: source.to_string(),
            target: target.to_string(),
            quality,
            username: None,
        }
    }

    #[test]
    fn test_filter_keeps_top_three() {
        let results = filter_tm_results(
            "Open file",
            vec![
                tm("Open file", "Ouvrir le fichier", 100.0),
                tm("Open files", "Ouvrir les fichiers", 91.4),
                tm("Open", "Ouvrir", 70.6),
                tm("Close file", "Fermer le fichier", 60.0),
            ],
        );
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "100% match");
        assert_eq!(results[1].title, "91% match");
        assert_eq!(results[2].title, "71% match");
        assert_eq!(results[0].source_diff, "Open file");
        assert!(results[1].source_diff.contains(r#"<span class="diff-insert">s</span>"#));
    }

    #[test]
    fn test_target_is_escaped() {
        let results = filter_tm_results("a", vec![tm("a", "<b>x</b> & y", 50.0)]);
        assert!(results[0].target.contains("&amp;"));
        assert!(results[0].target.contains("highlight-html"));
    }

    #[test]
    fn test_stale_ticket_is_dropped() {
        let mut session = EditorSession::new();
        session.active_uid = Some(1);
        let first = session.begin_tm_lookup().unwrap();
        let second = session.begin_tm_lookup().unwrap();
        assert!(!session.is_current(&first));
        assert!(session.is_current(&second));

        session.active_uid = Some(2);
        assert!(!session.is_current(&second));
        assert!(session.accept_tm_response(&second, vec![tm("a", "b", 1.0)]).is_none());
    }

    #[test]
    fn test_lookup_requires_active_unit() {
        let mut session = EditorSession::new();
        assert!(matches!(
            session.begin_tm_lookup(),
            Err(EditorError::NoActiveUnit)
        ));
    }
}
