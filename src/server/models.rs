//! Wire payloads of the editor endpoints

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{Meta, Pager, Unit};

/// Query parameters of one view request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewQuery {
    pub page: Option<u32>,
    /// Asks the server to locate this unit and return its page
    pub uid: Option<u64>,
    pub pager: bool,
    pub meta: bool,
    pub filter: Vec<(String, String)>,
}

impl ViewQuery {
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(uid) = self.uid {
            params.push(("uid".to_string(), uid.to_string()));
        }
        if self.pager {
            params.push(("pager".to_string(), "true".to_string()));
        }
        if self.meta {
            params.push(("meta".to_string(), "true".to_string()));
        }
        params.extend(self.filter.iter().cloned());
        params
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewResponse {
    #[serde(default)]
    pub pager: Option<Pager>,
    #[serde(default)]
    pub meta: Option<Meta>,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub uid: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContextRows {
    #[serde(default)]
    pub before: Vec<Unit>,
    #[serde(default)]
    pub after: Vec<Unit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditResponse {
    /// Rendered edit widget markup
    #[serde(default)]
    pub editor: String,
    #[serde(default)]
    pub ctxt: Option<ContextRows>,
    #[serde(default)]
    pub storecrumbs: Option<String>,
    #[serde(default)]
    pub dircrumbs: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextResponse {
    #[serde(default)]
    pub ctxt: ContextRows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    Submission,
    Suggestion,
}

impl SubmitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submission => "submission",
            Self::Suggestion => "suggestion",
        }
    }
}

/// Form contents posted for a submission or suggestion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitForm {
    pub targets: Vec<String>,
    pub fuzzy: bool,
    pub captcha_answer: Option<String>,
}

impl SubmitForm {
    pub fn to_params(&self, uid: u64) -> Vec<(String, String)> {
        let mut params = vec![("id".to_string(), uid.to_string())];
        for (i, target) in self.targets.iter().enumerate() {
            params.push((format!("target_f_{}", i), target.clone()));
        }
        if self.fuzzy {
            params.push(("fuzzy".to_string(), "on".to_string()));
        }
        if let Some(ref answer) = self.captcha_answer {
            params.push(("captcha_answer".to_string(), answer.clone()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    /// Challenge markup when the server wants a CAPTCHA solved first
    #[serde(default)]
    pub captcha: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcceptResponse {
    #[serde(default)]
    pub newtargets: Vec<String>,
    /// Suggestion id -> plural form index -> rendered diff
    #[serde(default)]
    pub newdiffs: HashMap<String, HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOption {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChecksResponse {
    #[serde(default)]
    pub checks: Vec<CheckOption>,
}

/// One translation memory candidate
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmMatch {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub quality: f64,
    #[serde(default)]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_query_params() {
        let query = ViewQuery {
            page: Some(2),
            pager: true,
            filter: vec![("unitstates".into(), "fuzzy".into())],
            ..Default::default()
        };
        assert_eq!(
            query.to_params(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("pager".to_string(), "true".to_string()),
                ("unitstates".to_string(), "fuzzy".to_string()),
            ]
        );
    }

    #[test]
    fn test_submit_form_params() {
        let form = SubmitForm {
            targets: vec!["Fichier".into(), "Fichiers".into()],
            fuzzy: true,
            captcha_answer: None,
        };
        let params = form.to_params(12);
        assert_eq!(params[0], ("id".to_string(), "12".to_string()));
        assert_eq!(params[2], ("target_f_1".to_string(), "Fichiers".to_string()));
        assert_eq!(params[3], ("fuzzy".to_string(), "on".to_string()));
    }

    #[test]
    fn test_decode_view_without_pager() {
        let resp: ViewResponse = serde_json::from_str(r#"{"units": []}"#).unwrap();
        assert!(resp.pager.is_none());
        assert!(resp.units.is_empty());
    }

    #[test]
    fn test_decode_accept_response() {
        let resp: AcceptResponse = serde_json::from_str(
            r#"{"newtargets": ["Ouvrir"], "newdiffs": {"4": {"0": "<span>x</span>"}}}"#,
        )
        .unwrap();
        assert_eq!(resp.newtargets, vec!["Ouvrir".to_string()]);
        assert_eq!(resp.newdiffs["4"]["0"], "<span>x</span>");
    }
}
