//! Editor session: the state behind one translator's view of the unit table

pub mod cache;
pub mod commands;
pub mod dispatch;
pub mod filter;
pub mod fragment;
pub mod navigation;
pub mod tm;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{EditorError, EditorResult};
use crate::model::{Meta, Pager, UnitId};
use crate::mt::{self, MtProvider};
use crate::server::{ContextRows, EditorApi, ViewQuery};
use cache::UnitPageCache;
use filter::FilterState;
use navigation::{Direction, Neighbors};

/// Leading markup and escapes the caret skips after copying the source
static CARET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:<[^>]+>|\[n\|t\]|\W$^\n)*(?:\b|$)").expect("caret regex"));

/// Gap requested for the first "more context" call after an edit row was shown
const INITIAL_CONTEXT_GAP: u32 = 2;

/// Everything needed to draw the table around the unit being edited
#[derive(Debug, Clone, PartialEq)]
pub struct EditView {
    pub uid: UnitId,
    pub page: u32,
    pub num_pages: u32,
    pub before: Vec<UnitId>,
    pub after: Vec<UnitId>,
    /// Edit widget markup as rendered by the server
    pub widget: String,
    pub context: ContextRows,
    pub fuzzy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedTargets {
    pub targets: Vec<String>,
    /// Character offset where the cursor lands in the first target
    pub caret: usize,
}

#[derive(Debug, Default)]
pub struct EditorSession {
    pub cache: UnitPageCache,
    pub pager: Pager,
    pub meta: Meta,
    pub filter: FilterState,
    pub active_uid: Option<UnitId>,
    fragment: String,
    has_results: bool,
    ctxt_gap: u32,
    suggest_mode: bool,
    fuzzy: bool,
    /// Set once fuzzy was toggled by hand, so editing the text no longer clears it
    keep_state: bool,
    tm_generation: u64,
    storecrumbs: Option<String>,
    dircrumbs: Option<String>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn has_results(&self) -> bool {
        self.has_results
    }

    pub fn context_gap(&self) -> u32 {
        self.ctxt_gap
    }

    /// Carries a widened context gap over from an earlier run on the same unit
    pub fn resume_context_gap(&mut self, uid: UnitId, gap: u32) {
        if self.active_uid == Some(uid) && gap > self.ctxt_gap {
            self.ctxt_gap = gap;
        }
    }

    pub fn breadcrumbs(&self) -> (Option<&str>, Option<&str>) {
        (self.dircrumbs.as_deref(), self.storecrumbs.as_deref())
    }

    /// Loads whatever the fragment describes and returns the resulting edit view
    pub async fn apply_fragment<A: EditorApi + ?Sized>(
        &mut self,
        api: &A,
        fragment: &str,
    ) -> EditorResult<EditView> {
        let previous = std::mem::replace(&mut self.fragment, fragment.to_string());
        let previous_filter = self.filter.clone();
        let previous_uid = self.active_uid;
        let mut with_uid = false;
        let mut page = None;

        let requested_uid = fragment::get(fragment, "unit")
            .as_deref()
            .and_then(parse_positive);

        if let Some(uid) = requested_uid {
            self.active_uid = Some(uid);
            if self.cache.contains(uid) && self.has_results {
                debug!("unit {} already cached", uid);
                return self.display_edit_unit(api, uid).await;
            }
            with_uid = true;
        } else if let Some(value) = fragment::get(fragment, "page") {
            page = parse_positive(&value).map(|p| p as u32);
        }

        if let Some(value) = fragment::get(fragment, "filter") {
            self.filter.set_filter(&value);
        }
        if let Some(text) = fragment::get(fragment, "search") {
            let fields = fragment::get(fragment, "sfields");
            self.filter.set_search(&text, fields.as_deref());
        }

        if let Err(e) = self.query(api, page, with_uid).await {
            if matches!(e, EditorError::NoResults) {
                self.fragment = previous;
                self.filter = previous_filter;
                self.active_uid = previous_uid;
            }
            return Err(e);
        }
        self.fetch_pages(api).await?;

        let uid = self.active_uid.ok_or(EditorError::NoActiveUnit)?;
        self.display_edit_unit(api, uid).await
    }

    /// Paginated query that supersedes the cache; an empty answer keeps the old one
    async fn query<A: EditorApi + ?Sized>(
        &mut self,
        api: &A,
        page: Option<u32>,
        with_uid: bool,
    ) -> EditorResult<()> {
        let query = ViewQuery {
            // The page is unknown when the server is asked to locate a unit
            page: if with_uid {
                None
            } else {
                Some(page.unwrap_or(self.pager.number.max(1)))
            },
            uid: if with_uid { self.active_uid } else { None },
            pager: true,
            meta: self.meta.is_empty(),
            filter: self.filter.request_params(),
        };
        let resp = api.view_units(query).await?;

        if self.meta.is_empty()
            && let Some(meta) = resp.meta
        {
            self.meta = meta;
        }

        let pager = match resp.pager {
            Some(pager) if !resp.units.is_empty() => pager,
            _ => {
                warn!("no results for filter {}", self.filter.filter);
                self.filter.rollback();
                return Err(EditorError::NoResults);
            }
        };

        self.cache.evict_all();
        self.pager = pager;
        self.has_results = true;

        let first = resp.units.first().map(|u| u.id);
        self.cache.record_page(pager.number, resp.units);

        if let Some(uid) = resp.uid {
            self.active_uid = Some(uid);
        } else if !self.active_uid.is_some_and(|uid| self.cache.contains(uid)) {
            self.active_uid = first;
        }

        info!(
            "page {}/{} loaded for filter {}",
            pager.number, pager.num_pages, self.filter.filter
        );
        Ok(())
    }

    /// Fetches one page unless it is cached already; returns whether a request was made
    pub async fn fetch_page<A: EditorApi + ?Sized>(
        &mut self,
        api: &A,
        page: u32,
        force: bool,
    ) -> EditorResult<bool> {
        if !force && self.cache.has_page(page) {
            return Ok(false);
        }

        let query = ViewQuery {
            page: Some(page),
            filter: self.filter.request_params(),
            ..Default::default()
        };
        let resp = api.view_units(query).await?;

        if resp.units.is_empty() {
            warn!("page {} came back empty", page);
            return Ok(true);
        }
        self.cache.record_page(page, resp.units);
        Ok(true)
    }

    /// Makes sure the current page and its direct neighbours are cached
    pub async fn fetch_pages<A: EditorApi + ?Sized>(&mut self, api: &A) -> EditorResult<()> {
        for page in self
            .cache
            .pages_to_fetch(self.pager.number, self.pager.num_pages)
        {
            self.fetch_page(api, page, false).await?;
        }
        Ok(())
    }

    pub fn neighbors(&self, uid: UnitId) -> Neighbors {
        navigation::neighbors(&self.cache, uid, self.pager.per_page)
    }

    pub async fn display_edit_unit<A: EditorApi + ?Sized>(
        &mut self,
        api: &A,
        uid: UnitId,
    ) -> EditorResult<EditView> {
        if !self.has_results {
            return Err(EditorError::NoResults);
        }

        if let Some(page) = self.cache.page_of(uid) {
            self.pager.number = page;
        }
        self.fetch_pages(api).await?;
        self.cache.link_adjacent_pages(self.pager.num_pages);

        let fuzzy = self
            .cache
            .unit(uid)
            .map(|u| u.isfuzzy)
            .ok_or(EditorError::UnknownUnit(uid))?;
        let neighbors = self.neighbors(uid);

        let resp = api.edit_unit(uid, self.filter.request_params()).await?;
        if resp.storecrumbs.is_some() {
            self.storecrumbs = resp.storecrumbs;
        }
        if resp.dircrumbs.is_some() {
            self.dircrumbs = resp.dircrumbs;
        }

        let context = resp.ctxt.unwrap_or_default();
        self.ctxt_gap = INITIAL_CONTEXT_GAP;

        self.active_uid = Some(uid);
        self.fuzzy = fuzzy;
        self.keep_state = false;
        // Any lookup still in flight belongs to the previous unit
        self.tm_generation += 1;

        Ok(EditView {
            uid,
            page: self.pager.number,
            num_pages: self.pager.num_pages,
            before: neighbors.before,
            after: neighbors.after,
            widget: resp.editor,
            context,
            fuzzy,
        })
    }

    pub async fn goto_unit<A: EditorApi + ?Sized>(
        &mut self,
        api: &A,
        uid: UnitId,
    ) -> EditorResult<EditView> {
        let fragment = fragment::update_part(&self.fragment, "unit", &uid.to_string(), &["page"]);
        self.apply_fragment(api, &fragment).await
    }

    pub async fn goto_page<A: EditorApi + ?Sized>(
        &mut self,
        api: &A,
        page: u32,
    ) -> EditorResult<EditView> {
        if page == 0 || page > self.pager.num_pages {
            return Err(EditorError::InvalidParam {
                key: "page".to_string(),
                value: page.to_string(),
            });
        }
        let fragment = fragment::update_part(&self.fragment, "page", &page.to_string(), &["unit"]);
        self.apply_fragment(api, &fragment).await
    }

    /// Moves to the linked unit; the edge of the list is terminal and issues no request
    pub async fn navigate<A: EditorApi + ?Sized>(
        &mut self,
        api: &A,
        direction: Direction,
    ) -> EditorResult<EditView> {
        let uid = self.active_uid.ok_or(EditorError::NoActiveUnit)?;
        match navigation::adjacent(&self.cache, uid, direction) {
            Some(target) => self.goto_unit(api, target).await,
            None => Err(EditorError::Terminal(direction.end_message().to_string())),
        }
    }

    pub async fn more_context<A: EditorApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> EditorResult<ContextRows> {
        let uid = self.active_uid.ok_or(EditorError::NoActiveUnit)?;
        let resp = api.context(uid, self.ctxt_gap).await?;
        self.ctxt_gap += 2;
        Ok(resp.ctxt)
    }

    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy
    }

    pub fn go_fuzzy(&mut self) {
        if !self.fuzzy {
            self.keep_state = true;
            self.fuzzy = true;
        }
    }

    pub fn ungo_fuzzy(&mut self) {
        if self.fuzzy {
            self.keep_state = true;
            self.fuzzy = false;
        }
    }

    pub fn toggle_fuzzy(&mut self) {
        self.keep_state = true;
        if self.fuzzy {
            self.ungo_fuzzy();
        } else {
            self.go_fuzzy();
        }
    }

    /// Editing a target clears fuzzy unless the state was pinned by hand
    pub fn on_target_edited(&mut self, original: &str, current: &str) {
        if !self.keep_state && original != current {
            self.ungo_fuzzy();
        }
    }

    pub fn is_suggest_mode(&self) -> bool {
        self.suggest_mode
    }

    pub fn set_suggest_mode(&mut self, on: bool) {
        self.suggest_mode = on;
    }

    pub fn toggle_suggest_mode(&mut self) {
        self.suggest_mode = !self.suggest_mode;
    }

    /// Copies the source forms into `n_targets` targets and marks the unit fuzzy
    pub fn copy_original(&mut self, sources: &[String], n_targets: usize) -> CopiedTargets {
        let Some(last) = sources.last() else {
            return CopiedTargets {
                targets: vec![String::new(); n_targets],
                caret: 0,
            };
        };

        let targets: Vec<String> = (0..n_targets)
            .map(|i| sources.get(i).unwrap_or(last).clone())
            .collect();
        self.go_fuzzy();

        let caret = targets
            .first()
            .and_then(|t| CARET_RE.find(t).map(|m| t[..m.end()].chars().count()))
            .unwrap_or(0);

        CopiedTargets { targets, caret }
    }

    /// Machine translation of the active unit's source forms; a success marks it fuzzy
    pub async fn machine_translate(&mut self, provider: &dyn MtProvider) -> EditorResult<Vec<String>> {
        let uid = self.active_uid.ok_or(EditorError::NoActiveUnit)?;
        let sources: Vec<String> = self
            .cache
            .unit(uid)
            .ok_or(EditorError::UnknownUnit(uid))?
            .source
            .iter()
            .map(|f| f.text.clone())
            .collect();

        let targets = mt::translate_forms(
            provider,
            &sources,
            &self.meta.source_lang,
            &self.meta.target_lang,
        )
        .await?;
        self.go_fuzzy();
        Ok(targets)
    }

    pub(crate) fn bump_tm_generation(&mut self) -> u64 {
        self.tm_generation += 1;
        self.tm_generation
    }

    pub(crate) fn tm_generation(&self) -> u64 {
        self.tm_generation
    }
}

fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|&v| v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_pinning() {
        let mut session = EditorSession::new();
        session.fuzzy = true;
        session.on_target_edited("a", "ab");
        assert!(!session.is_fuzzy());

        // Once pinned by hand, edits no longer clear the flag
        session.toggle_fuzzy();
        assert!(session.is_fuzzy());
        session.on_target_edited("a", "abc");
        assert!(session.is_fuzzy());
    }

    #[test]
    fn test_unchanged_text_keeps_fuzzy() {
        let mut session = EditorSession::new();
        session.fuzzy = true;
        session.on_target_edited("same", "same");
        assert!(session.is_fuzzy());
    }

    #[test]
    fn test_copy_original_falls_back_to_last_form() {
        let mut session = EditorSession::new();
        let copied = session.copy_original(&["<b>File".to_string(), "Files".to_string()], 3);
        assert_eq!(copied.targets, vec!["<b>File", "Files", "Files"]);
        assert_eq!(copied.caret, 3);
        assert!(session.is_fuzzy());
    }

    #[test]
    fn test_copy_original_without_sources() {
        let mut session = EditorSession::new();
        let copied = session.copy_original(&[], 2);
        assert_eq!(copied.targets, vec![String::new(), String::new()]);
        assert!(!session.is_fuzzy());
    }

    #[test]
    fn test_suggest_mode_toggle() {
        let mut session = EditorSession::new();
        assert!(!session.is_suggest_mode());
        session.toggle_suggest_mode();
        assert!(session.is_suggest_mode());
    }
}
