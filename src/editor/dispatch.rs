//! Every user action the editor understands, routed through one `match`

use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::filter::parse_search;
use super::fragment;
use super::navigation::{self, Direction};
use super::tm::TmSuggestion;
use super::{CopiedTargets, EditView, EditorSession};
use crate::error::{EditorError, EditorResult};
use crate::model::UnitId;
use crate::mt::{self, MtProvider};
use crate::server::{CheckOption, ContextRows, EditorApi, SubmitForm, SubmitKind};

const ALL_DONE: &str = "Congratulations, you walked through all items";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Load an arbitrary fragment, as a history change would
    Navigate(String),
    GotoUnit(UnitId),
    GotoPage(u32),
    Next,
    Previous,
    Submit(SubmitForm),
    Suggest(SubmitForm),
    FilterStatus(String),
    FilterChecks(String),
    Search {
        text: String,
        /// Fields ticked in the advanced options, used when the text has no `in:` tokens
        fields: Vec<String>,
    },
    MoreContext,
    LookupTm,
    AcceptSuggestion(u64),
    RejectSuggestion(u64),
    RejectCheck(u64),
    ToggleFuzzy,
    ToggleSuggestMode,
    CopyOriginal,
    MachineTranslate { provider: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    View(EditView),
    /// Challenge markup; the submission has to be resent with an answer
    Captcha(String),
    CheckOptions(Vec<CheckOption>),
    Context(ContextRows),
    /// `None` when the lookup found nothing or was superseded
    Tm(Option<Vec<TmSuggestion>>),
    SuggestionAccepted {
        targets: Vec<String>,
        diffs: HashMap<String, HashMap<String, String>>,
    },
    MachineTranslated(Vec<String>),
    Copied(CopiedTargets),
    /// State changed locally or on the server, nothing new to draw
    Updated,
}

pub struct Dispatcher<'a, A: EditorApi + ?Sized> {
    api: &'a A,
    providers: &'a [Box<dyn MtProvider>],
}

impl<'a, A: EditorApi + ?Sized> Dispatcher<'a, A> {
    pub fn new(api: &'a A, providers: &'a [Box<dyn MtProvider>]) -> Self {
        Self { api, providers }
    }

    pub async fn dispatch(
        &self,
        session: &mut EditorSession,
        command: Command,
    ) -> EditorResult<Outcome> {
        debug!("dispatching {:?}", command);
        let api = self.api;

        match command {
            Command::Navigate(fragment) => {
                Ok(Outcome::View(session.apply_fragment(api, &fragment).await?))
            }
            Command::GotoUnit(uid) => Ok(Outcome::View(session.goto_unit(api, uid).await?)),
            Command::GotoPage(page) => Ok(Outcome::View(session.goto_page(api, page).await?)),
            Command::Next => Ok(Outcome::View(session.navigate(api, Direction::Next).await?)),
            Command::Previous => Ok(Outcome::View(
                session.navigate(api, Direction::Previous).await?,
            )),
            Command::Submit(form) => {
                let kind = if session.is_suggest_mode() {
                    SubmitKind::Suggestion
                } else {
                    SubmitKind::Submission
                };
                self.process_submit(session, kind, form).await
            }
            Command::Suggest(form) => {
                self.process_submit(session, SubmitKind::Suggestion, form)
                    .await
            }
            Command::FilterStatus(name) => self.filter_status(session, &name).await,
            Command::FilterChecks(check) => {
                if check == "none" {
                    return Ok(Outcome::Updated);
                }
                let fragment = format!("filter=checks,{}", check);
                Ok(Outcome::View(session.apply_fragment(api, &fragment).await?))
            }
            Command::Search { text, fields } => {
                let fragment = if text.trim().is_empty() {
                    fragment::update_part(session.fragment(), "filter", "all", &["search", "sfields"])
                } else {
                    parse_search(&text, &fields)
                };
                Ok(Outcome::View(session.apply_fragment(api, &fragment).await?))
            }
            Command::MoreContext => Ok(Outcome::Context(session.more_context(api).await?)),
            Command::LookupTm => Ok(Outcome::Tm(session.lookup_tm(api).await?)),
            Command::AcceptSuggestion(suggestion) => {
                let uid = session.active_uid.ok_or(EditorError::NoActiveUnit)?;
                let resp = api.accept_suggestion(uid, suggestion).await?;
                if let Some(unit) = session.cache.unit_mut(uid) {
                    unit.set_targets(&resp.newtargets);
                    unit.isfuzzy = false;
                }
                session.ungo_fuzzy();
                info!("accepted suggestion {} for unit {}", suggestion, uid);
                Ok(Outcome::SuggestionAccepted {
                    targets: resp.newtargets,
                    diffs: resp.newdiffs,
                })
            }
            Command::RejectSuggestion(suggestion) => {
                let uid = session.active_uid.ok_or(EditorError::NoActiveUnit)?;
                api.reject_suggestion(uid, suggestion).await?;
                info!("rejected suggestion {} for unit {}", suggestion, uid);
                Ok(Outcome::Updated)
            }
            Command::RejectCheck(check) => {
                let uid = session.active_uid.ok_or(EditorError::NoActiveUnit)?;
                api.reject_check(uid, check).await?;
                info!("marked check {} of unit {} as false positive", check, uid);
                Ok(Outcome::Updated)
            }
            Command::ToggleFuzzy => {
                session.toggle_fuzzy();
                Ok(Outcome::Updated)
            }
            Command::ToggleSuggestMode => {
                session.toggle_suggest_mode();
                Ok(Outcome::Updated)
            }
            Command::CopyOriginal => {
                let uid = session.active_uid.ok_or(EditorError::NoActiveUnit)?;
                let unit = session.cache.unit(uid).ok_or(EditorError::UnknownUnit(uid))?;
                let sources: Vec<String> = unit.source.iter().map(|f| f.text.clone()).collect();
                let n_targets = unit.target.len().max(1);
                Ok(Outcome::Copied(session.copy_original(&sources, n_targets)))
            }
            Command::MachineTranslate { provider } => {
                let provider = mt::find_provider(self.providers, &provider)
                    .ok_or_else(|| EditorError::provider(&provider, "provider is not enabled"))?;
                Ok(Outcome::MachineTranslated(
                    session.machine_translate(provider).await?,
                ))
            }
        }
    }

    async fn process_submit(
        &self,
        session: &mut EditorSession,
        kind: SubmitKind,
        form: SubmitForm,
    ) -> EditorResult<Outcome> {
        let uid = session.active_uid.ok_or(EditorError::NoActiveUnit)?;
        let resp = self
            .api
            .submit(uid, kind, form.clone(), session.filter.request_params())
            .await?;

        if let Some(captcha) = resp.captcha {
            warn!("server asked for a captcha before accepting unit {}", uid);
            return Ok(Outcome::Captcha(captcha));
        }

        if kind == SubmitKind::Submission
            && let Some(unit) = session.cache.unit_mut(uid)
        {
            unit.set_targets(&form.targets);
            unit.isfuzzy = form.fuzzy;
        }
        info!("{} saved for unit {}", kind.as_str(), uid);

        match navigation::adjacent(&session.cache, uid, Direction::Next) {
            Some(next) => Ok(Outcome::View(session.goto_unit(self.api, next).await?)),
            None => Err(EditorError::Terminal(ALL_DONE.to_string())),
        }
    }

    async fn filter_status(
        &self,
        session: &mut EditorSession,
        name: &str,
    ) -> EditorResult<Outcome> {
        if name == "checks" {
            let checks = self.api.check_options().await?;
            if checks.is_empty() {
                return Err(EditorError::NoResults);
            }
            return Ok(Outcome::CheckOptions(checks));
        }

        let fragment = format!("filter={}", name);
        Ok(Outcome::View(session.apply_fragment(self.api, &fragment).await?))
    }
}
