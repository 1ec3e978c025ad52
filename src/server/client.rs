//! HTTP implementation of the editor endpoints

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::models::{
    AcceptResponse, CheckOption, ChecksResponse, ContextResponse, EditResponse, SubmitForm,
    SubmitKind, SubmitResponse, TmMatch, ViewQuery, ViewResponse,
};
use super::{ApiFuture, EditorApi};
use crate::error::{EditorError, EditorResult};
use crate::model::UnitId;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// What the editor is working on: a single store or a whole directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Store(String),
    Directory(String),
}

#[derive(Debug, Clone)]
pub struct HttpApiConfig {
    pub base_url: String,
    pub scope: Scope,
    pub tm_url: Option<String>,
    pub session: Option<String>,
    pub timeout: Duration,
}

impl HttpApiConfig {
    pub fn new(base_url: &str, scope: Scope) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            scope,
            tm_url: None,
            session: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_tm_url(mut self, url: Option<String>) -> Self {
        self.tm_url = url;
        self
    }

    pub fn with_session(mut self, session: Option<String>) -> Self {
        self.session = session;
        self
    }

    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        if let Some(s) = secs {
            self.timeout = Duration::from_secs(s);
        }
        self
    }
}

pub struct HttpApi {
    config: HttpApiConfig,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(config: HttpApiConfig) -> EditorResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(ref session) = config.session {
            let value = HeaderValue::from_str(&format!("sessionid={}", session)).map_err(|_| {
                EditorError::InvalidParam {
                    key: "session".to_string(),
                    value: session.clone(),
                }
            })?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn view_url(&self) -> String {
        match self.config.scope {
            Scope::Store(ref store) => self.url(&format!("{}/view", store)),
            Scope::Directory(ref dir) => self.url(&format!("{}view.html", dir)),
        }
    }

    fn checks_url(&self) -> String {
        match self.config.scope {
            Scope::Store(ref store) => self.url(&format!("{}/checks/", store)),
            Scope::Directory(ref dir) => self.url(&format!("{}checks.html", dir)),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        params: Vec<(String, String)>,
    ) -> EditorResult<T> {
        debug!("GET {} {:?}", url, params);
        let response = self.client.get(&url).query(&params).send().await?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: String,
        params: Vec<(String, String)>,
    ) -> EditorResult<T> {
        debug!("POST {}", url);
        let response = self.client.post(&url).form(&params).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> EditorResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Application errors come back as a JSON encoded message
            let message = serde_json::from_str::<String>(&body).ok();
            return Err(EditorError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl EditorApi for HttpApi {
    fn view_units<'a>(&'a self, query: ViewQuery) -> ApiFuture<'a, ViewResponse> {
        Box::pin(async move { self.get_json(self.view_url(), query.to_params()).await })
    }

    fn edit_unit<'a>(
        &'a self,
        uid: UnitId,
        filter: Vec<(String, String)>,
    ) -> ApiFuture<'a, EditResponse> {
        Box::pin(async move {
            self.get_json(self.url(&format!("/unit/edit/{}", uid)), filter)
                .await
        })
    }

    fn context<'a>(&'a self, uid: UnitId, gap: u32) -> ApiFuture<'a, ContextResponse> {
        Box::pin(async move {
            let params = vec![("gap".to_string(), gap.to_string())];
            self.get_json(self.url(&format!("/unit/context/{}", uid)), params)
                .await
        })
    }

    fn submit<'a>(
        &'a self,
        uid: UnitId,
        kind: SubmitKind,
        form: SubmitForm,
        filter: Vec<(String, String)>,
    ) -> ApiFuture<'a, SubmitResponse> {
        Box::pin(async move {
            let mut params = form.to_params(uid);
            params.extend(filter);
            let url = self.url(&format!("/unit/process/{}/{}", uid, kind.as_str()));
            self.post_json(url, params).await
        })
    }

    fn accept_suggestion<'a>(
        &'a self,
        uid: UnitId,
        suggestion: u64,
    ) -> ApiFuture<'a, AcceptResponse> {
        Box::pin(async move {
            let url = self.url(&format!("/suggestion/accept/{}/{}", uid, suggestion));
            self.post_json(url, vec![("accept".to_string(), "1".to_string())])
                .await
        })
    }

    fn reject_suggestion<'a>(&'a self, uid: UnitId, suggestion: u64) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let url = self.url(&format!("/suggestion/reject/{}/{}", uid, suggestion));
            let _: serde_json::Value = self
                .post_json(url, vec![("reject".to_string(), "1".to_string())])
                .await?;
            Ok(())
        })
    }

    fn reject_check<'a>(&'a self, uid: UnitId, check: u64) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let url = self.url(&format!("/qualitycheck/reject/{}/{}", uid, check));
            let _: serde_json::Value = self
                .post_json(url, vec![("reject".to_string(), "1".to_string())])
                .await?;
            Ok(())
        })
    }

    fn check_options<'a>(&'a self) -> ApiFuture<'a, Vec<CheckOption>> {
        Box::pin(async move {
            let resp: ChecksResponse = self.get_json(self.checks_url(), Vec::new()).await?;
            Ok(resp.checks)
        })
    }

    fn tm_lookup<'a>(
        &'a self,
        source_lang: &'a str,
        target_lang: &'a str,
        text: &'a str,
    ) -> ApiFuture<'a, Vec<TmMatch>> {
        Box::pin(async move {
            let Some(ref tm_url) = self.config.tm_url else {
                return Ok(Vec::new());
            };
            let url = format!(
                "{}{}/{}/unit/{}",
                tm_url,
                source_lang,
                target_lang,
                urlencoding::encode(text)
            );
            self.get_json(url, Vec::new()).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_urls() {
        let api = HttpApi::new(HttpApiConfig::new(
            "http://localhost:8000/",
            Scope::Store("/fr/project/file.po".into()),
        ))
        .unwrap();
        assert_eq!(api.view_url(), "http://localhost:8000/fr/project/file.po/view");
        assert_eq!(
            api.checks_url(),
            "http://localhost:8000/fr/project/file.po/checks/"
        );
    }

    #[test]
    fn test_directory_urls() {
        let api = HttpApi::new(HttpApiConfig::new(
            "http://localhost:8000",
            Scope::Directory("/fr/project/".into()),
        ))
        .unwrap();
        assert_eq!(api.view_url(), "http://localhost:8000/fr/project/view.html");
        assert_eq!(api.checks_url(), "http://localhost:8000/fr/project/checks.html");
    }
}
