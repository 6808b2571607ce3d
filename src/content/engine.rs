//! Censor Engine
//!
//! Owns text marking for one page and the hover state of censored spans. Hover
//! changes are reported upstream only when the derived flag flips, so moving
//! across several censored spans does not flood the message channel.

use super::hover::{HoverChange, HoverTracker};
use crate::dom::{ConcealStyle, Document, MarkOptions, UnmarkOptions};
use crate::error::{DomError, ExtensionError};
use crate::hash::hash_text;
use crate::host::RuntimeHost;
use crate::message::{Message, TargetUpdate};
use crate::telemetry::capture;
use crate::types::{ElementId, HashId, HASH_DATA_ATTRIBUTE};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

pub struct CensorEngine {
    document: Arc<dyn Document>,
    runtime: Arc<dyn RuntimeHost>,
    mark_options: MarkOptions,
    style: ConcealStyle,
    hover: Mutex<HoverTracker>,
    /// Mark elements with hover watchers, and the hash they carry
    armed: Mutex<HashMap<ElementId, HashId>>,
}

impl CensorEngine {
    pub fn new(document: Arc<dyn Document>, runtime: Arc<dyn RuntimeHost>, style: ConcealStyle) -> Self {
        Self {
            document,
            runtime,
            mark_options: MarkOptions::default(),
            style,
            hover: Mutex::new(HoverTracker::new()),
            armed: Mutex::new(HashMap::new()),
        }
    }

    /// Conceal every occurrence of `text` and arm hover watchers on the new marks.
    ///
    /// Earlier marks for the same text are removed first; the unmark pass must
    /// finish before remarking or marks would be applied twice.
    pub async fn censor(&self, text: &str) -> Result<HashId, DomError> {
        let hash_id = hash_text(text);

        let removed = self
            .document
            .unmark(&UnmarkOptions::only_hash(Some(hash_id)))
            .await?;
        self.disarm(&removed);

        let marks = self.document.mark(text, &self.mark_options).await?;
        let value = hash_id.to_string();
        for element in &marks {
            self.document.set_data(*element, HASH_DATA_ATTRIBUTE, &value)?;
            self.document.apply_style(*element, &self.style)?;
            self.armed.lock().insert(*element, hash_id);
        }

        info!(hash_id, marks = marks.len(), "Censored text");
        Ok(hash_id)
    }

    /// Remove only the marks tagged with `hash_id`; returns how many were removed.
    pub async fn uncensor(&self, hash_id: Option<HashId>) -> Result<usize, DomError> {
        let removed = self
            .document
            .unmark(&UnmarkOptions::only_hash(hash_id))
            .await?;
        self.disarm(&removed);
        info!(?hash_id, removed = removed.len(), "Uncensored text");
        Ok(removed.len())
    }

    /// Pointer entered `element`. Ignored unless the element is an armed mark.
    pub async fn mouse_enter(&self, element: ElementId) {
        let Some(hash_id) = self.armed.lock().get(&element).copied() else {
            return;
        };
        let change = self.hover.lock().enter(element);
        if let Some(change) = change {
            self.notify(change, hash_id).await;
        }
    }

    /// Pointer left `element`.
    pub async fn mouse_leave(&self, element: ElementId) {
        let hash_id = self.armed.lock().get(&element).copied().unwrap_or_default();
        let change = self.hover.lock().leave(element);
        if let Some(change) = change {
            self.notify(change, hash_id).await;
        }
    }

    pub fn is_hovering_censored(&self) -> bool {
        self.hover.lock().is_hovering()
    }

    pub fn is_armed(&self, element: ElementId) -> bool {
        self.armed.lock().contains_key(&element)
    }

    /// Handle a message from the background process.
    pub async fn handle_message(&self, message: Message) -> Result<(), ExtensionError> {
        let result = match message {
            Message::Censor(text) if text.is_empty() => {
                debug!("Ignoring censor request without text");
                Ok(())
            }
            Message::Censor(text) => self.censor(&text).await.map(|_| ()),
            Message::Uncensor(request) => self.uncensor(request.hash_id).await.map(|_| ()),
            Message::UpdateTarget(_) => {
                debug!("Ignoring message addressed to the background process");
                Ok(())
            }
        };
        capture("content message listener", result.map_err(ExtensionError::from))
    }

    /// Process page messages until the channel closes.
    pub async fn run(&self, mut messages: UnboundedReceiver<Message>) {
        while let Some(message) = messages.recv().await {
            // Already captured; the listener keeps running.
            let _ = self.handle_message(message).await;
        }
        debug!("Content message channel closed");
    }

    async fn notify(&self, change: HoverChange, hash_id: HashId) {
        debug!(current = change.current, previous = change.previous, "Hover state changed");
        let update = TargetUpdate::new(change.current, hash_id);
        if let Err(err) = self.runtime.send_message(Message::UpdateTarget(update)).await {
            warn!(error = %err, "Dropped target update");
        }
    }

    fn disarm(&self, removed: &[ElementId]) {
        let mut armed = self.armed.lock();
        for element in removed {
            armed.remove(element);
        }
    }
}
