//! Shared identifiers used by both the background and the content process.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic fingerprint of a censored text span.
pub type HashId = i32;

/// Fixed id of the "hide selection" menu item.
pub const CENSOR_ITEM_ID: &str = "click-censor:censor";

/// Fixed id of the "unhide" menu item.
pub const UNCENSOR_ITEM_ID: &str = "click-censor:uncensor";

/// DOM data attribute carrying the decimal hashId of a mark.
pub const HASH_DATA_ATTRIBUTE: &str = "click-censor-id";

/// Browser tab identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Handle to an element in a page document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

/// Opaque handle returned by the native menu create call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MenuHandle(pub String);

/// Identity of the party that sent a runtime message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSender {
    /// Extension id of the sender
    pub id: String,
    /// Tab the message originated from, if any
    pub tab: Option<TabId>,
}

impl MessageSender {
    pub fn new(id: impl Into<String>, tab: Option<TabId>) -> Self {
        Self {
            id: id.into(),
            tab,
        }
    }
}
