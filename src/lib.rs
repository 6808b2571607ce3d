//! Click Censor: hide and reveal selected page text.
//!
//! A background process owns the context menu and applies every change to it
//! through a serialized command queue; a per-page content process owns text
//! marking and hover tracking. The two talk only through typed messages.

pub mod cli;
pub mod config;
pub mod content;
pub mod dom;
pub mod error;
pub mod hash;
pub mod host;
pub mod logging;
pub mod menu;
pub mod message;
pub mod queue;
pub mod router;
pub mod runtime;
pub mod telemetry;
pub mod types;
