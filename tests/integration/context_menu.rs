//! Integration tests for the Context Menu Controller

use click_censor::config::MenuConfig;
use click_censor::host::memory::{MemoryBrowser, NativeCall};
use click_censor::host::{MenuContext, MenuHost, MenuItemOptions};
use click_censor::menu::{ContextMenuController, ItemSlot, MenuItems, TargetState, CREATE_ITEM_COMMAND};
use click_censor::queue::{CommandQueue, QueuedCommand};
use click_censor::types::{CENSOR_ITEM_ID, UNCENSOR_ITEM_ID};
use serde_json::json;
use std::sync::Arc;

async fn installed(browser: &Arc<MemoryBrowser>) -> ContextMenuController {
    let menu = ContextMenuController::new(
        Arc::clone(browser) as Arc<dyn MenuHost>,
        CommandQueue::new(),
        MenuConfig::default(),
    );
    menu.install().unwrap().await.unwrap();
    menu
}

fn item(id: &str) -> MenuItemOptions {
    MenuItemOptions {
        id: id.to_string(),
        title: id.to_uppercase(),
        contexts: vec![MenuContext::Selection],
        visible: true,
    }
}

#[tokio::test]
async fn test_installed_items_match_fixed_contract() {
    let browser = Arc::new(MemoryBrowser::new("ext"));
    installed(&browser).await;

    let censor = browser.item(CENSOR_ITEM_ID).unwrap();
    assert_eq!(censor.options.title, "Hide Selected Text");
    assert_eq!(censor.options.contexts, vec![MenuContext::Selection]);
    assert!(censor.options.visible);

    let uncensor = browser.item(UNCENSOR_ITEM_ID).unwrap();
    assert_eq!(uncensor.options.title, "Unhide Selected Text");
    assert_eq!(uncensor.options.contexts, vec![MenuContext::Page]);
    assert!(!uncensor.options.visible);
}

#[tokio::test]
async fn test_concurrent_create_calls_make_one_native_item() {
    let browser = Arc::new(MemoryBrowser::new("ext").with_call_yields(5));
    let items = MenuItems::new(Arc::clone(&browser) as Arc<dyn MenuHost>);

    let a = items.clone();
    let b = items.clone();
    let first = tokio::spawn(async move { a.create_item(item("shared")).await });
    let second = tokio::spawn(async move { b.create_item(item("shared")).await });
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(browser.create_calls(), 1);
    assert!(matches!(items.registry().slot("shared"), ItemSlot::Created(_)));
}

#[tokio::test]
async fn test_queued_duplicate_create_is_noop() {
    let browser = Arc::new(MemoryBrowser::new("ext"));
    let menu = installed(&browser).await;

    menu.queue()
        .enqueue(QueuedCommand::new(CREATE_ITEM_COMMAND, json!(item(CENSOR_ITEM_ID))))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(browser.create_calls(), 2);
}

#[tokio::test]
async fn test_second_identical_target_update_enqueues_nothing() {
    let browser = Arc::new(MemoryBrowser::new("ext"));
    let menu = installed(&browser).await;

    menu.update_target(true);
    let queued = menu.queue().len();
    assert!(menu.update_target(true).is_none());
    assert_eq!(menu.queue().len(), queued);

    menu.queue().settled().await.unwrap();
    assert_eq!(
        &browser.calls()[2..],
        &[
            NativeCall::Update {
                id: CENSOR_ITEM_ID.to_string(),
                visible: false
            },
            NativeCall::Update {
                id: UNCENSOR_ITEM_ID.to_string(),
                visible: true
            },
        ]
    );
}

#[tokio::test]
async fn test_flicker_while_first_toggle_in_flight() {
    let browser = Arc::new(MemoryBrowser::new("ext").with_call_yields(3));
    let menu = installed(&browser).await;

    menu.update_target(true);
    // The censor toggle is now executing; only the uncensor toggle is pending.
    tokio::task::yield_now().await;
    assert_eq!(menu.queue().len(), 1);

    menu.update_target(false);
    menu.queue().settled().await.unwrap();

    assert_eq!(menu.target_state(), TargetState::UncensoredTarget);
    assert_eq!(browser.is_visible(CENSOR_ITEM_ID), Some(true));
    assert_eq!(browser.is_visible(UNCENSOR_ITEM_ID), Some(false));
    assert_eq!(browser.update_calls(), 2);
}

#[tokio::test]
async fn test_toggle_before_install_is_skipped() {
    let browser = Arc::new(MemoryBrowser::new("ext"));
    let menu = ContextMenuController::new(
        Arc::clone(&browser) as Arc<dyn MenuHost>,
        CommandQueue::new(),
        MenuConfig::default(),
    );
    menu.items().set_visible(CENSOR_ITEM_ID, false).await.unwrap();
    assert!(browser.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_target_updates_keep_menu_in_step() {
    let browser = Arc::new(MemoryBrowser::new("ext").with_call_yields(1));
    let menu = Arc::new(installed(&browser).await);

    let mut tasks = Vec::new();
    for worker in 0..4 {
        let menu = Arc::clone(&menu);
        tasks.push(tokio::spawn(async move {
            for step in 0..50 {
                menu.update_target((worker + step) % 2 == 0);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    menu.queue().settled().await.unwrap();

    let censored = menu.target_state().is_censored();
    assert_eq!(browser.is_visible(CENSOR_ITEM_ID), Some(!censored));
    assert_eq!(browser.is_visible(UNCENSOR_ITEM_ID), Some(censored));
}
