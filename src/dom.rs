//! Page document capability used by the censor engine.
//!
//! Marking a text span is treated as an opaque capability: the engine only
//! asks for occurrences of a string to be wrapped, or for marks to be removed.

use crate::config::StyleConfig;
use crate::error::DomError;
use crate::types::{ElementId, HashId, HASH_DATA_ATTRIBUTE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod memory;

/// Options for wrapping matches of a search string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkOptions {
    /// Tag of the wrapper element
    pub element: String,
    pub class_name: String,
    /// Search inside same-origin iframes
    pub iframes: bool,
    /// Allow a match to span several text nodes
    pub across_elements: bool,
    /// Search each word separately instead of the full phrase
    pub separate_word_search: bool,
}

impl Default for MarkOptions {
    fn default() -> Self {
        Self {
            element: "span".to_string(),
            class_name: "click-censor__censored".to_string(),
            iframes: true,
            across_elements: true,
            separate_word_search: false,
        }
    }
}

/// Options for removing marks; marks matching any `exclude` selector are kept
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnmarkOptions {
    pub exclude: Vec<String>,
}

impl UnmarkOptions {
    /// Remove only marks tagged with `hash_id`. A `None` hash matches no mark.
    pub fn only_hash(hash_id: Option<HashId>) -> Self {
        Self {
            exclude: vec![exclude_other_hashes(hash_id)],
        }
    }
}

/// `:not([data-click-censor-id="<hash>"])`
pub fn exclude_other_hashes(hash_id: Option<HashId>) -> String {
    let value = hash_id.map_or_else(|| "null".to_string(), |hash| hash.to_string());
    format!(":not([data-{}=\"{}\"])", HASH_DATA_ATTRIBUTE, value)
}

/// Inline styling that conceals a span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcealStyle {
    pub background_color: String,
    pub color: String,
    pub user_select: String,
}

impl From<&StyleConfig> for ConcealStyle {
    fn from(style: &StyleConfig) -> Self {
        Self {
            background_color: style.background.clone(),
            color: style.color.clone(),
            user_select: "none".to_string(),
        }
    }
}

impl Default for ConcealStyle {
    fn default() -> Self {
        Self::from(&StyleConfig::default())
    }
}

/// Subset of CSS selectors over data attributes: `[data-k="v"]` and `:not(...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    DataAttribute { key: String, value: String },
    Not(Box<Selector>),
}

impl Selector {
    pub fn parse(input: &str) -> Option<Selector> {
        let input = input.trim();
        if let Some(inner) = input.strip_prefix(":not(").and_then(|s| s.strip_suffix(')')) {
            return Selector::parse(inner).map(|s| Selector::Not(Box::new(s)));
        }

        let body = input.strip_prefix("[data-")?.strip_suffix(']')?;
        let (key, value) = body.split_once('=')?;
        let value = value.trim().trim_matches('"');
        Some(Selector::DataAttribute {
            key: key.trim().to_string(),
            value: value.to_string(),
        })
    }

    /// Match against an element's data attributes (keys without the `data-` prefix).
    pub fn matches(&self, data: &BTreeMap<String, String>) -> bool {
        match self {
            Selector::DataAttribute { key, value } => data.get(key) == Some(value),
            Selector::Not(inner) => !inner.matches(data),
        }
    }
}

/// The page body of one content process
#[async_trait]
pub trait Document: Send + Sync {
    /// Wrap every occurrence of `text`, returning the new mark elements in document order.
    async fn mark(&self, text: &str, options: &MarkOptions) -> Result<Vec<ElementId>, DomError>;

    /// Remove marks not excluded by `options`, returning the removed elements.
    async fn unmark(&self, options: &UnmarkOptions) -> Result<Vec<ElementId>, DomError>;

    /// Set a data attribute (`key` without the `data-` prefix).
    fn set_data(&self, element: ElementId, key: &str, value: &str) -> Result<(), DomError>;

    fn data(&self, element: ElementId, key: &str) -> Option<String>;

    fn apply_style(&self, element: ElementId, style: &ConcealStyle) -> Result<(), DomError>;
}
