//! Records exchanged with the translation server

use serde::{Deserialize, Serialize};

pub type UnitId = u64;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextForm {
    #[serde(default)]
    pub text: String,
}

impl TextForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One translatable segment as returned by the view endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    #[serde(default)]
    pub source: Vec<TextForm>,
    #[serde(default)]
    pub target: Vec<TextForm>,
    #[serde(default)]
    pub isfuzzy: bool,
    #[serde(default)]
    pub prev: Option<UnitId>,
    #[serde(default)]
    pub next: Option<UnitId>,
}

impl Unit {
    pub fn source_text(&self) -> &str {
        self.source.first().map(|f| f.text.as_str()).unwrap_or("")
    }

    pub fn target_text(&self) -> &str {
        self.target.first().map(|f| f.text.as_str()).unwrap_or("")
    }

    /// Overlays a fresher copy of the same unit; links survive when the newer record lacks them
    pub fn merge(&mut self, newer: Unit) {
        self.source = newer.source;
        self.target = newer.target;
        self.isfuzzy = newer.isfuzzy;
        if newer.prev.is_some() {
            self.prev = newer.prev;
        }
        if newer.next.is_some() {
            self.next = newer.next;
        }
    }

    pub fn set_targets(&mut self, texts: &[String]) {
        for (i, text) in texts.iter().enumerate() {
            match self.target.get_mut(i) {
                Some(form) => form.text = text.clone(),
                None => self.target.push(TextForm::new(text.clone())),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pager {
    pub number: u32,
    pub num_pages: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_per_page() -> u32 {
    10
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            number: 1,
            num_pages: 0,
            per_page: default_per_page(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub source_lang: String,
    #[serde(default)]
    pub target_lang: String,
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        self.source_lang.is_empty() && self.target_lang.is_empty()
    }
}
