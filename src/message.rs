//! Wire messages exchanged between the background and content processes.
//!
//! Messages are JSON objects of the shape `{ "action": ..., "payload": ... }`.

use crate::types::{HashId, MessageSender};
use serde::{Deserialize, Serialize};

/// Payload of `click-censor:update-target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetUpdate {
    pub is_censored: bool,
    pub hash_id: Option<HashId>,
}

impl TargetUpdate {
    /// Build an update; the hash is only carried while the target is censored.
    pub fn new(is_censored: bool, hash_id: HashId) -> Self {
        Self {
            is_censored,
            hash_id: is_censored.then_some(hash_id),
        }
    }
}

/// Payload of `click-censor:uncensor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncensorRequest {
    pub hash_id: Option<HashId>,
}

/// All messages on the extension bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload")]
pub enum Message {
    /// content -> background: hovered censored state changed
    #[serde(rename = "click-censor:update-target")]
    UpdateTarget(TargetUpdate),
    /// background -> content: censor the selected text
    #[serde(rename = "click-censor:censor")]
    Censor(String),
    /// background -> content: remove marks for a hash
    #[serde(rename = "click-censor:uncensor")]
    Uncensor(UncensorRequest),
}

impl Message {
    pub fn action(&self) -> &'static str {
        match self {
            Message::UpdateTarget(_) => "click-censor:update-target",
            Message::Censor(_) => "click-censor:censor",
            Message::Uncensor(_) => "click-censor:uncensor",
        }
    }
}

/// A runtime message together with the identity of its sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub message: Message,
    pub sender: MessageSender,
}

/// Native context-menu click information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuClick {
    pub menu_item_id: String,
    #[serde(default)]
    pub selection_text: Option<String>,
}
