//! In-memory browser used by the simulator and tests.
//!
//! Records every native menu call, routes tab messages over per-tab unbounded
//! channels, and forwards content messages to a single background receiver.

use super::{MenuHost, MenuItemOptions, MenuItemUpdate, RuntimeHost, TabsHost};
use crate::error::HostError;
use crate::message::{Envelope, Message};
use crate::types::{MenuHandle, MessageSender, TabId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// One recorded native menu call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    Create(String),
    Update { id: String, visible: bool },
}

/// Current native state of a menu item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemRecord {
    pub options: MenuItemOptions,
    pub handle: MenuHandle,
}

#[derive(Default)]
struct MenuState {
    items: BTreeMap<String, MenuItemRecord>,
    calls: Vec<NativeCall>,
}

#[derive(Default)]
struct TabState {
    active: Option<TabId>,
    listeners: HashMap<TabId, UnboundedSender<Message>>,
}

pub struct MemoryBrowser {
    extension_id: String,
    menu: Mutex<MenuState>,
    tabs: Mutex<TabState>,
    runtime: Mutex<Option<UnboundedSender<Envelope>>>,
    /// Suspension points inside each native call, to expose interleavings
    call_yields: usize,
}

impl MemoryBrowser {
    pub fn new(extension_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
            menu: Mutex::new(MenuState::default()),
            tabs: Mutex::new(TabState::default()),
            runtime: Mutex::new(None),
            call_yields: 0,
        }
    }

    /// Make every native menu call suspend `yields` times before completing.
    pub fn with_call_yields(mut self, yields: usize) -> Self {
        self.call_yields = yields;
        self
    }

    pub fn extension_id(&self) -> &str {
        &self.extension_id
    }

    /// Open a tab, make it active, and return the receiving end of its content listener.
    pub fn open_tab(&self, tab: TabId) -> UnboundedReceiver<Message> {
        let (tx, rx) = unbounded_channel();
        let mut tabs = self.tabs.lock();
        tabs.listeners.insert(tab, tx);
        tabs.active = Some(tab);
        rx
    }

    /// Close a tab; messages addressed to it are dropped afterwards.
    pub fn close_tab(&self, tab: TabId) {
        let mut tabs = self.tabs.lock();
        tabs.listeners.remove(&tab);
        if tabs.active == Some(tab) {
            tabs.active = None;
        }
    }

    pub fn activate(&self, tab: TabId) {
        self.tabs.lock().active = Some(tab);
    }

    /// Connect the background listener for runtime messages.
    pub fn connect_runtime(&self) -> UnboundedReceiver<Envelope> {
        let (tx, rx) = unbounded_channel();
        *self.runtime.lock() = Some(tx);
        rx
    }

    /// Runtime port for the content process of `tab`.
    pub fn runtime_port(self: &Arc<Self>, tab: TabId) -> MemoryRuntimePort {
        MemoryRuntimePort {
            browser: Arc::clone(self),
            sender: MessageSender::new(self.extension_id.clone(), Some(tab)),
        }
    }

    /// Runtime port that claims a different extension id.
    pub fn foreign_port(self: &Arc<Self>, sender_id: impl Into<String>) -> MemoryRuntimePort {
        MemoryRuntimePort {
            browser: Arc::clone(self),
            sender: MessageSender::new(sender_id, None),
        }
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.menu.lock().calls.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.menu
            .lock()
            .calls
            .iter()
            .filter(|call| matches!(call, NativeCall::Create(_)))
            .count()
    }

    pub fn update_calls(&self) -> usize {
        self.menu
            .lock()
            .calls
            .iter()
            .filter(|call| matches!(call, NativeCall::Update { .. }))
            .count()
    }

    pub fn item(&self, id: &str) -> Option<MenuItemRecord> {
        self.menu.lock().items.get(id).cloned()
    }

    /// Visibility of a native item; `None` when it does not exist.
    pub fn is_visible(&self, id: &str) -> Option<bool> {
        self.menu.lock().items.get(id).map(|item| item.options.visible)
    }

    async fn suspend(&self) {
        for _ in 0..self.call_yields {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl MenuHost for MemoryBrowser {
    async fn create(&self, options: MenuItemOptions) -> Result<MenuHandle, HostError> {
        self.suspend().await;
        let mut menu = self.menu.lock();
        menu.calls.push(NativeCall::Create(options.id.clone()));
        if menu.items.contains_key(&options.id) {
            return Err(HostError::Native(format!(
                "Cannot create item with duplicate id {}",
                options.id
            )));
        }
        let handle = MenuHandle(options.id.clone());
        debug!(item_id = %options.id, visible = options.visible, "Native menu item created");
        menu.items.insert(
            options.id.clone(),
            MenuItemRecord {
                options,
                handle: handle.clone(),
            },
        );
        Ok(handle)
    }

    async fn update(&self, item_id: &str, update: MenuItemUpdate) -> Result<(), HostError> {
        self.suspend().await;
        let mut menu = self.menu.lock();
        menu.calls.push(NativeCall::Update {
            id: item_id.to_string(),
            visible: update.visible,
        });
        let item = menu
            .items
            .get_mut(item_id)
            .ok_or_else(|| HostError::ItemNotFound(item_id.to_string()))?;
        item.options.visible = update.visible;
        debug!(item_id, visible = update.visible, "Native menu item updated");
        Ok(())
    }
}

#[async_trait]
impl TabsHost for MemoryBrowser {
    async fn query_active(&self) -> Result<Vec<TabId>, HostError> {
        Ok(self.tabs.lock().active.into_iter().collect())
    }

    async fn send_message(&self, tab: TabId, message: Message) -> Result<(), HostError> {
        let tabs = self.tabs.lock();
        let listener = tabs.listeners.get(&tab).ok_or(HostError::NoReceiver(tab))?;
        listener
            .send(message)
            .map_err(|_| HostError::NoReceiver(tab))
    }
}

/// Content-side runtime endpoint bound to one sender identity
#[derive(Clone)]
pub struct MemoryRuntimePort {
    browser: Arc<MemoryBrowser>,
    sender: MessageSender,
}

#[async_trait]
impl RuntimeHost for MemoryRuntimePort {
    fn extension_id(&self) -> &str {
        self.browser.extension_id()
    }

    async fn send_message(&self, message: Message) -> Result<(), HostError> {
        let runtime = self.browser.runtime.lock();
        let tx = runtime.as_ref().ok_or(HostError::Closed)?;
        tx.send(Envelope {
            message,
            sender: self.sender.clone(),
        })
        .map_err(|_| HostError::Closed)
    }
}
