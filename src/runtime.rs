//! Process wiring.
//!
//! [`Background`] assembles the queue, the menu controller and the router.
//! [`Simulation`] connects one background process to one page over the
//! in-memory browser and delivers messages deterministically.

use crate::config::ExtensionConfig;
use crate::content::CensorEngine;
use crate::dom::memory::MemoryDocument;
use crate::dom::{ConcealStyle, Document};
use crate::error::ExtensionError;
use crate::host::memory::MemoryBrowser;
use crate::host::{MenuHost, TabsHost};
use crate::menu::ContextMenuController;
use crate::message::{Envelope, MenuClick, Message};
use crate::queue::{CommandQueue, DrainHandle};
use crate::router::MessagingRouter;
use crate::types::{ElementId, TabId};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

/// The background process
pub struct Background {
    pub queue: CommandQueue,
    pub menu: Arc<ContextMenuController>,
    pub router: Arc<MessagingRouter>,
}

impl Background {
    /// Build the background process and enqueue creation of the menu items.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(
        config: &ExtensionConfig,
        menu_host: Arc<dyn MenuHost>,
        tabs: Arc<dyn TabsHost>,
    ) -> (Self, Option<DrainHandle>) {
        let queue = CommandQueue::new();
        let menu = Arc::new(ContextMenuController::new(
            menu_host,
            queue.clone(),
            config.menu.clone(),
        ));
        let startup = menu.install();
        let router = Arc::new(MessagingRouter::new(
            config.extension_id.clone(),
            Arc::clone(&menu),
            tabs,
        ));
        info!(extension_id = %config.extension_id, "Background process started");
        (
            Self {
                queue,
                menu,
                router,
            },
            startup,
        )
    }
}

/// One background process and one page, wired through a [`MemoryBrowser`]
pub struct Simulation {
    pub browser: Arc<MemoryBrowser>,
    pub background: Background,
    pub document: Arc<MemoryDocument>,
    pub content: Arc<CensorEngine>,
    page_inbox: UnboundedReceiver<Message>,
    runtime_inbox: UnboundedReceiver<Envelope>,
}

impl Simulation {
    pub const TAB: TabId = TabId(1);

    /// Start both processes and wait for the menu items to exist.
    pub async fn start(config: &ExtensionConfig, page: &str) -> Result<Self, ExtensionError> {
        let browser = Arc::new(MemoryBrowser::new(config.extension_id.clone()));
        let page_inbox = browser.open_tab(Self::TAB);
        let runtime_inbox = browser.connect_runtime();

        let (background, startup) = Background::start(
            config,
            Arc::clone(&browser) as Arc<dyn MenuHost>,
            Arc::clone(&browser) as Arc<dyn TabsHost>,
        );
        if let Some(startup) = startup {
            startup.await?;
        }

        let document = Arc::new(MemoryDocument::new(page));
        let content = Arc::new(CensorEngine::new(
            Arc::clone(&document) as Arc<dyn Document>,
            Arc::new(browser.runtime_port(Self::TAB)),
            ConcealStyle::from(&config.style),
        ));

        Ok(Self {
            browser,
            background,
            document,
            content,
            page_inbox,
            runtime_inbox,
        })
    }

    /// Deliver every pending message in both directions, then wait for the menu to settle.
    pub async fn pump(&mut self) -> Result<(), ExtensionError> {
        loop {
            let mut delivered = false;
            while let Ok(message) = self.page_inbox.try_recv() {
                // Already captured; later messages are still delivered.
                let _ = self.content.handle_message(message).await;
                delivered = true;
            }
            while let Ok(envelope) = self.runtime_inbox.try_recv() {
                self.background
                    .router
                    .handle_message(envelope.message, &envelope.sender);
                delivered = true;
            }
            if !delivered {
                break;
            }
        }
        self.background.queue.settled().await?;
        Ok(())
    }

    /// Click a menu item and deliver the resulting messages.
    pub async fn click(
        &mut self,
        item_id: &str,
        selection: Option<&str>,
    ) -> Result<(), ExtensionError> {
        self.background
            .router
            .handle_menu_click(MenuClick {
                menu_item_id: item_id.to_string(),
                selection_text: selection.map(str::to_string),
            })
            .await;
        self.pump().await
    }

    pub async fn hover(&mut self, element: ElementId) -> Result<(), ExtensionError> {
        self.content.mouse_enter(element).await;
        self.pump().await
    }

    pub async fn unhover(&mut self, element: ElementId) -> Result<(), ExtensionError> {
        self.content.mouse_leave(element).await;
        self.pump().await
    }
}
