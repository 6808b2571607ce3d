//! Context Menu Controller
//!
//! Owns the two complementary menu items ("censor selection" and "uncensor
//! selection") and the idempotent target state machine that decides which
//! visibility toggles go through the command queue.

use crate::config::MenuConfig;
use crate::error::HostError;
use crate::host::{MenuContext, MenuHost, MenuItemOptions, MenuItemUpdate};
use crate::queue::{CommandQueue, DrainHandle, QueuedCommand};
use crate::types::{MenuHandle, CENSOR_ITEM_ID, UNCENSOR_ITEM_ID};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Queue command that creates a menu item from serialized [`MenuItemOptions`]
pub const CREATE_ITEM_COMMAND: &str = "context-menu-item:create";

/// Queue command id that sets the visibility of `item_id`
pub fn toggle_command_id(item_id: &str) -> String {
    format!("context-menu-item:toggle:{}", item_id)
}

/// Creation state of one menu item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSlot {
    NotCreated,
    /// A native create call is in flight
    Creating,
    Created(MenuHandle),
}

/// Menu item id to native handle map
#[derive(Debug, Default)]
pub struct MenuItemRegistry {
    slots: Mutex<HashMap<String, ItemSlot>>,
}

impl MenuItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, item_id: &str) -> ItemSlot {
        self.slots
            .lock()
            .get(item_id)
            .cloned()
            .unwrap_or(ItemSlot::NotCreated)
    }

    /// Claim the right to create `item_id`. Check and claim happen under one lock,
    /// so at most one caller ever proceeds to the native create.
    fn try_begin_create(&self, item_id: &str) -> bool {
        let mut slots = self.slots.lock();
        match slots.get(item_id) {
            Some(ItemSlot::Creating) | Some(ItemSlot::Created(_)) => false,
            Some(ItemSlot::NotCreated) | None => {
                slots.insert(item_id.to_string(), ItemSlot::Creating);
                true
            }
        }
    }

    fn finish_create(&self, item_id: &str, handle: MenuHandle) {
        self.slots
            .lock()
            .insert(item_id.to_string(), ItemSlot::Created(handle));
    }

    fn abandon_create(&self, item_id: &str) {
        self.slots.lock().remove(item_id);
    }
}

/// Native menu item operations guarded by the registry
#[derive(Clone)]
pub struct MenuItems {
    host: Arc<dyn MenuHost>,
    registry: Arc<MenuItemRegistry>,
}

impl MenuItems {
    pub fn new(host: Arc<dyn MenuHost>) -> Self {
        Self {
            host,
            registry: Arc::new(MenuItemRegistry::new()),
        }
    }

    pub fn registry(&self) -> &MenuItemRegistry {
        &self.registry
    }

    /// Create an item unless it already exists or is being created.
    pub async fn create_item(&self, options: MenuItemOptions) -> Result<(), HostError> {
        if !self.registry.try_begin_create(&options.id) {
            debug!(item_id = %options.id, "Menu item already created or in progress");
            return Ok(());
        }

        let item_id = options.id.clone();
        match self.host.create(options).await {
            Ok(handle) => {
                debug!(item_id = %item_id, "Menu item created");
                self.registry.finish_create(&item_id, handle);
                Ok(())
            }
            Err(err) => {
                self.registry.abandon_create(&item_id);
                Err(err)
            }
        }
    }

    /// Set visibility of a created item. Items that are not created yet are skipped.
    pub async fn set_visible(&self, item_id: &str, visible: bool) -> Result<(), HostError> {
        if !matches!(self.registry.slot(item_id), ItemSlot::Created(_)) {
            debug!(item_id, visible, "Skipping visibility update for uncreated item");
            return Ok(());
        }
        self.host.update(item_id, MenuItemUpdate { visible }).await
    }
}

/// Whether the element under the pointer is censored, as last reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetState {
    #[default]
    UncensoredTarget,
    CensoredTarget,
}

impl From<bool> for TargetState {
    fn from(is_censored: bool) -> Self {
        if is_censored {
            TargetState::CensoredTarget
        } else {
            TargetState::UncensoredTarget
        }
    }
}

impl TargetState {
    pub fn is_censored(self) -> bool {
        self == TargetState::CensoredTarget
    }
}

pub struct ContextMenuController {
    items: MenuItems,
    queue: CommandQueue,
    config: MenuConfig,
    target: Mutex<TargetState>,
}

impl ContextMenuController {
    pub fn new(host: Arc<dyn MenuHost>, queue: CommandQueue, config: MenuConfig) -> Self {
        Self {
            items: MenuItems::new(host),
            queue,
            config,
            target: Mutex::new(TargetState::default()),
        }
    }

    pub fn items(&self) -> &MenuItems {
        &self.items
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn target_state(&self) -> TargetState {
        *self.target.lock()
    }

    /// Register the menu commands and enqueue creation of both items.
    pub fn install(&self) -> Option<DrainHandle> {
        let items = self.items.clone();
        self.queue.register(CREATE_ITEM_COMMAND, move |args| {
            let items = items.clone();
            async move {
                let options: MenuItemOptions = serde_json::from_value(args)
                    .map_err(|e| HostError::Native(format!("Invalid menu item options: {}", e)))?;
                items.create_item(options).await
            }
        });

        for item_id in [CENSOR_ITEM_ID, UNCENSOR_ITEM_ID] {
            let items = self.items.clone();
            self.queue.register(toggle_command_id(item_id), move |args| {
                let items = items.clone();
                async move {
                    let visible = args.as_bool().ok_or_else(|| {
                        HostError::Native(format!("Invalid visibility for {}: {}", item_id, args))
                    })?;
                    items.set_visible(item_id, visible).await
                }
            });
        }

        info!("Context menu commands registered");
        let mut drain = None;
        for options in self.default_items() {
            let args = json!(options);
            drain = self.queue.enqueue(QueuedCommand::new(CREATE_ITEM_COMMAND, args));
        }
        drain
    }

    fn default_items(&self) -> [MenuItemOptions; 2] {
        [
            MenuItemOptions {
                id: CENSOR_ITEM_ID.to_string(),
                title: self.config.censor_title.clone(),
                contexts: vec![MenuContext::Selection],
                visible: true,
            },
            MenuItemOptions {
                id: UNCENSOR_ITEM_ID.to_string(),
                title: self.config.uncensor_title.clone(),
                // Censored text is not selectable
                contexts: vec![MenuContext::Page],
                visible: false,
            },
        ]
    }

    /// Flip the menu between censor and uncensor mode. Repeating the current state is a no-op.
    ///
    /// The target lock is held until both toggles are queued, so concurrent callers
    /// enqueue their pairs in the same order as their state changes.
    pub fn update_target(&self, is_censored: bool) -> Option<DrainHandle> {
        let mut target = self.target.lock();
        let next = TargetState::from(is_censored);
        if *target == next {
            return None;
        }
        *target = next;
        debug!(is_censored, "Menu target changed");

        let censor = self.queue.enqueue(QueuedCommand::reversable(
            toggle_command_id(CENSOR_ITEM_ID),
            json!(!is_censored),
            is_censored,
            !is_censored,
        ));
        let uncensor = self.queue.enqueue(QueuedCommand::reversable(
            toggle_command_id(UNCENSOR_ITEM_ID),
            json!(is_censored),
            !is_censored,
            is_censored,
        ));
        uncensor.or(censor)
    }
}
