//! Integration tests for the Messaging Router over the in-memory browser

use click_censor::config::ExtensionConfig;
use click_censor::host::memory::MemoryBrowser;
use click_censor::host::{MenuHost, RuntimeHost, TabsHost};
use click_censor::message::{MenuClick, Message, TargetUpdate, UncensorRequest};
use click_censor::runtime::Background;
use click_censor::types::{TabId, CENSOR_ITEM_ID, UNCENSOR_ITEM_ID};
use std::sync::Arc;

fn config() -> ExtensionConfig {
    ExtensionConfig {
        extension_id: "ext".to_string(),
        ..ExtensionConfig::default()
    }
}

async fn background(browser: &Arc<MemoryBrowser>) -> Background {
    let (background, startup) = Background::start(
        &config(),
        Arc::clone(browser) as Arc<dyn MenuHost>,
        Arc::clone(browser) as Arc<dyn TabsHost>,
    );
    startup.unwrap().await.unwrap();
    background
}

#[tokio::test]
async fn test_router_loop_applies_update_target() {
    let browser = Arc::new(MemoryBrowser::new("ext"));
    let inbound = browser.connect_runtime();
    let background = background(&browser).await;

    let router = Arc::clone(&background.router);
    let listener = tokio::spawn(async move { router.run(inbound).await });

    let port = browser.runtime_port(TabId(1));
    assert_eq!(port.extension_id(), "ext");
    port.send_message(Message::UpdateTarget(TargetUpdate::new(true, 11)))
        .await
        .unwrap();

    for _ in 0..100 {
        if background.router.target_hash().is_some() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(background.router.target_hash(), Some(11));

    background.queue.settled().await.unwrap();
    assert_eq!(browser.is_visible(UNCENSOR_ITEM_ID), Some(true));
    assert_eq!(browser.is_visible(CENSOR_ITEM_ID), Some(false));
    listener.abort();
}

#[tokio::test]
async fn test_foreign_extension_cannot_flip_menu() {
    let browser = Arc::new(MemoryBrowser::new("ext"));
    let mut inbound = browser.connect_runtime();
    let background = background(&browser).await;

    browser
        .foreign_port("other-extension")
        .send_message(Message::UpdateTarget(TargetUpdate::new(true, 1)))
        .await
        .unwrap();
    let envelope = inbound.recv().await.unwrap();
    background
        .router
        .handle_message(envelope.message, &envelope.sender);

    background.queue.settled().await.unwrap();
    assert_eq!(background.router.target_hash(), None);
    assert_eq!(browser.update_calls(), 0);
}

#[tokio::test]
async fn test_clicks_target_only_the_active_tab() {
    let browser = Arc::new(MemoryBrowser::new("ext"));
    let background = background(&browser).await;
    let mut first = browser.open_tab(TabId(1));
    let mut second = browser.open_tab(TabId(2));
    browser.activate(TabId(2));

    background
        .router
        .handle_menu_click(MenuClick {
            menu_item_id: CENSOR_ITEM_ID.to_string(),
            selection_text: Some("word".to_string()),
        })
        .await;

    assert_eq!(second.try_recv().unwrap(), Message::Censor("word".to_string()));
    assert!(first.try_recv().is_err());
}

#[tokio::test]
async fn test_uncensor_without_target_sends_null_hash() {
    let browser = Arc::new(MemoryBrowser::new("ext"));
    let background = background(&browser).await;
    let mut page = browser.open_tab(TabId(1));

    background
        .router
        .handle_menu_click(MenuClick {
            menu_item_id: UNCENSOR_ITEM_ID.to_string(),
            selection_text: None,
        })
        .await;
    assert_eq!(
        page.try_recv().unwrap(),
        Message::Uncensor(UncensorRequest { hash_id: None })
    );
}

#[tokio::test]
async fn test_click_with_no_active_tab_is_silent() {
    let browser = Arc::new(MemoryBrowser::new("ext"));
    let background = background(&browser).await;
    let _page = browser.open_tab(TabId(1));
    browser.close_tab(TabId(1));

    background
        .router
        .handle_menu_click(MenuClick {
            menu_item_id: CENSOR_ITEM_ID.to_string(),
            selection_text: Some("gone".to_string()),
        })
        .await;
}
