//! Text rendering of simulation state.

use crate::dom::memory::{MemoryDocument, Segment};
use crate::host::memory::MemoryBrowser;
use crate::types::{CENSOR_ITEM_ID, UNCENSOR_ITEM_ID};
use owo_colors::OwoColorize;

/// Render page text; censored spans are drawn black on black when `color` is set,
/// and as `█` blocks otherwise.
pub fn format_page(document: &MemoryDocument, color: bool) -> String {
    document
        .segments()
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => text,
            Segment::Mark(mark) if mark.style.is_some() => {
                if color {
                    mark.text.black().on_black().to_string()
                } else {
                    "█".repeat(mark.text.chars().count())
                }
            }
            Segment::Mark(mark) => mark.text,
        })
        .collect()
}

/// One line per fixed menu item: `<id>: visible|hidden|missing`
pub fn format_menu_state(browser: &MemoryBrowser) -> String {
    [CENSOR_ITEM_ID, UNCENSOR_ITEM_ID]
        .iter()
        .map(|id| {
            let state = match browser.is_visible(id) {
                Some(true) => "visible",
                Some(false) => "hidden",
                None => "missing",
            };
            format!("{}: {}", id, state)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
