//! Messaging Router
//!
//! Background endpoint that turns page notifications into menu transitions and
//! menu clicks into page-directed commands. Delivery to pages is fire-and-forget.

use crate::host::TabsHost;
use crate::menu::ContextMenuController;
use crate::message::{Envelope, MenuClick, Message, TargetUpdate, UncensorRequest};
use crate::types::{HashId, MessageSender, CENSOR_ITEM_ID, UNCENSOR_ITEM_ID};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

pub struct MessagingRouter {
    extension_id: String,
    menu: Arc<ContextMenuController>,
    tabs: Arc<dyn TabsHost>,
    /// Hash of the censored span the user last hovered
    target_hash: Mutex<Option<HashId>>,
}

impl MessagingRouter {
    pub fn new(
        extension_id: impl Into<String>,
        menu: Arc<ContextMenuController>,
        tabs: Arc<dyn TabsHost>,
    ) -> Self {
        Self {
            extension_id: extension_id.into(),
            menu,
            tabs,
            target_hash: Mutex::new(None),
        }
    }

    pub fn target_hash(&self) -> Option<HashId> {
        *self.target_hash.lock()
    }

    /// Handle a runtime message. Messages from other extensions are ignored.
    pub fn handle_message(&self, message: Message, sender: &MessageSender) {
        if sender.id != self.extension_id {
            warn!(sender = %sender.id, "Ignoring message from foreign sender");
            return;
        }

        match message {
            Message::UpdateTarget(update) => self.update_target(update),
            other => debug!(action = other.action(), "Ignoring message not handled by background"),
        }
    }

    fn update_target(&self, update: TargetUpdate) {
        self.menu.update_target(update.is_censored);
        let hash_id = if update.is_censored {
            update.hash_id
        } else {
            None
        };
        *self.target_hash.lock() = hash_id;
        debug!(is_censored = update.is_censored, ?hash_id, "Target updated");
    }

    /// Handle a click on one of the extension's menu items.
    pub async fn handle_menu_click(&self, click: MenuClick) {
        let message = if click.menu_item_id == CENSOR_ITEM_ID {
            Message::Censor(click.selection_text.unwrap_or_default())
        } else if click.menu_item_id == UNCENSOR_ITEM_ID {
            Message::Uncensor(UncensorRequest {
                hash_id: self.target_hash(),
            })
        } else {
            debug!(item_id = %click.menu_item_id, "Ignoring click on unknown menu item");
            return;
        };

        info!(action = message.action(), "Dispatching menu click to active tab");
        self.send_to_active_tabs(message).await;
    }

    async fn send_to_active_tabs(&self, message: Message) {
        let tabs = match self.tabs.query_active().await {
            Ok(tabs) => tabs,
            Err(err) => {
                warn!(error = %err, "Active tab query failed");
                return;
            }
        };

        for tab in tabs {
            if let Err(err) = self.tabs.send_message(tab, message.clone()).await {
                warn!(%tab, error = %err, "Message to tab dropped");
            }
        }
    }

    /// Process runtime messages until the channel closes.
    pub async fn run(&self, mut inbound: UnboundedReceiver<Envelope>) {
        while let Some(envelope) = inbound.recv().await {
            self.handle_message(envelope.message, &envelope.sender);
        }
        debug!("Runtime message channel closed");
    }
}
