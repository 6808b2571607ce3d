//! Content process: per-page censoring and hover tracking.

pub mod engine;
pub mod hover;

pub use engine::CensorEngine;
pub use hover::{HoverChange, HoverTracker};
