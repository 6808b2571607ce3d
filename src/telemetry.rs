//! Error capture at listener boundaries.
//!
//! Errors raised inside event listeners are not seen by any caller that could
//! report them, so they are recorded here before being handed back.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::error;

/// One captured listener failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedException {
    pub ts: String,
    pub context: String,
    pub message: String,
}

impl CapturedException {
    pub fn with_now(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Record an error result as a captured exception and return it unchanged.
pub fn capture<T, E: Display>(context: &str, result: Result<T, E>) -> Result<T, E> {
    if let Err(err) = &result {
        let captured = CapturedException::with_now(context, err.to_string());
        error!(
            captured = true,
            ts = %captured.ts,
            context = %captured.context,
            error = %captured.message,
            "Captured exception"
        );
    }
    result
}
