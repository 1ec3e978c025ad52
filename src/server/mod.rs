//! Boundary to the translation server

pub mod client;
pub mod models;

use std::future::Future;
use std::pin::Pin;

use crate::error::EditorResult;
use crate::model::UnitId;

pub use client::HttpApi;
pub use models::{
    AcceptResponse, CheckOption, ContextResponse, ContextRows, EditResponse, SubmitForm,
    SubmitKind, SubmitResponse, TmMatch, ViewQuery, ViewResponse,
};

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = EditorResult<T>> + Send + 'a>>;

/// Requests the editor issues; every call is awaited at its single call site
pub trait EditorApi: Send + Sync {
    fn view_units<'a>(&'a self, query: ViewQuery) -> ApiFuture<'a, ViewResponse>;

    fn edit_unit<'a>(
        &'a self,
        uid: UnitId,
        filter: Vec<(String, String)>,
    ) -> ApiFuture<'a, EditResponse>;

    fn context<'a>(&'a self, uid: UnitId, gap: u32) -> ApiFuture<'a, ContextResponse>;

    fn submit<'a>(
        &'a self,
        uid: UnitId,
        kind: SubmitKind,
        form: SubmitForm,
        filter: Vec<(String, String)>,
    ) -> ApiFuture<'a, SubmitResponse>;

    fn accept_suggestion<'a>(
        &'a self,
        uid: UnitId,
        suggestion: u64,
    ) -> ApiFuture<'a, AcceptResponse>;

    fn reject_suggestion<'a>(&'a self, uid: UnitId, suggestion: u64) -> ApiFuture<'a, ()>;

    fn reject_check<'a>(&'a self, uid: UnitId, check: u64) -> ApiFuture<'a, ()>;

    fn check_options<'a>(&'a self) -> ApiFuture<'a, Vec<CheckOption>>;

    fn tm_lookup<'a>(
        &'a self,
        source_lang: &'a str,
        target_lang: &'a str,
        text: &'a str,
    ) -> ApiFuture<'a, Vec<TmMatch>>;
}
