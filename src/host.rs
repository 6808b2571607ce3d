//! Native browser capabilities.
//!
//! Menu, tab, and runtime APIs are abstracted behind uniform async traits so the
//! command queue and the router are written once, independent of whether the
//! browser exposes callbacks or promises.

use crate::error::HostError;
use crate::message::Message;
use crate::types::{MenuHandle, TabId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;

/// Where a menu item is offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuContext {
    /// Only when text is selected
    Selection,
    /// Anywhere on the page
    Page,
}

/// Options for creating a native menu item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemOptions {
    pub id: String,
    pub title: String,
    pub contexts: Vec<MenuContext>,
    pub visible: bool,
}

/// Properties changed on an existing native menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub visible: bool,
}

/// Native context menu
#[async_trait]
pub trait MenuHost: Send + Sync {
    /// Create a menu item and return its native handle
    async fn create(&self, options: MenuItemOptions) -> Result<MenuHandle, HostError>;

    /// Update an existing menu item
    async fn update(&self, item_id: &str, update: MenuItemUpdate) -> Result<(), HostError>;
}

/// Native tabs API, as seen from the background process
#[async_trait]
pub trait TabsHost: Send + Sync {
    /// Active tab(s) of the focused window
    async fn query_active(&self) -> Result<Vec<TabId>, HostError>;

    /// Deliver a message to the content process of a tab
    async fn send_message(&self, tab: TabId, message: Message) -> Result<(), HostError>;
}

/// Native runtime API, as seen from a content process
#[async_trait]
pub trait RuntimeHost: Send + Sync {
    /// Id of the extension this content process belongs to
    fn extension_id(&self) -> &str;

    /// Send a message to the background process
    async fn send_message(&self, message: Message) -> Result<(), HostError>;
}
