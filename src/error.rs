//! Error types for the click-censor background and content processes.

use crate::types::{ElementId, TabId};
use thiserror::Error;

/// Failures reported by a native browser capability
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("No receiving end for message to {0}")]
    NoReceiver(TabId),

    #[error("Menu item not found: {0}")]
    ItemNotFound(String),

    #[error("Message channel closed")]
    Closed,

    #[error("Native call failed: {0}")]
    Native(String),
}

/// Command queue failures.
///
/// Clone so a single drain result can be handed to every waiter batched onto it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("[command-queue] Unknown command \"{0}\"")]
    UnknownCommand(String),

    #[error("[command-queue] Command \"{command}\" failed: {source}")]
    Executor {
        command: String,
        #[source]
        source: HostError,
    },
}

/// Document marking failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Invalid mark text: {0}")]
    InvalidText(String),
}

/// Top-level error for extension wiring, configuration, and the CLI
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ExtensionError {
    fn from(err: config::ConfigError) -> Self {
        ExtensionError::ConfigError(err.to_string())
    }
}
