//! Command Queue
//!
//! Serializes mutating calls against a shared native resource (the context menu)
//! into a strictly ordered pipeline with at most one command in flight. A newly
//! enqueued reversable command that exactly undoes a still-pending one cancels
//! both, so state that oscillates back before it was applied costs nothing.

use crate::error::{HostError, QueueError};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Opaque arguments handed to an executor
pub type CommandArgs = Value;

/// Result of one drain cycle
pub type DrainResult = Result<(), QueueError>;

/// Completion of the drain a command joined. Cloneable; every clone resolves
/// with the same result once the queue has been emptied.
pub type DrainHandle = Shared<BoxFuture<'static, DrainResult>>;

type Executor = Arc<dyn Fn(CommandArgs) -> BoxFuture<'static, Result<(), HostError>> + Send + Sync>;

/// Direction of the state change a reversable command enacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: bool,
    pub to: bool,
}

impl Transition {
    pub fn new(from: bool, to: bool) -> Self {
        Self { from, to }
    }

    /// True when `self` exactly undoes `other`.
    pub fn reverses(&self, other: &Transition) -> bool {
        self.from == other.to && self.to == other.from
    }
}

/// One pending mutation
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedCommand {
    pub command_id: String,
    pub args: CommandArgs,
    /// Present only for reversable commands
    pub transition: Option<Transition>,
}

impl QueuedCommand {
    pub fn new(command_id: impl Into<String>, args: CommandArgs) -> Self {
        Self {
            command_id: command_id.into(),
            args,
            transition: None,
        }
    }

    pub fn reversable(command_id: impl Into<String>, args: CommandArgs, from: bool, to: bool) -> Self {
        Self {
            command_id: command_id.into(),
            args,
            transition: Some(Transition::new(from, to)),
        }
    }

    pub fn is_reversable(&self) -> bool {
        self.transition.is_some()
    }

    /// Both reversable, same command id, and inverse transitions.
    ///
    /// Different command ids never cancel, even when their transitions are inverse.
    fn undoes(&self, pending: &QueuedCommand) -> bool {
        match (&self.transition, &pending.transition) {
            (Some(new), Some(old)) => self.command_id == pending.command_id && new.reverses(old),
            _ => false,
        }
    }
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<QueuedCommand>,
    drain: Option<DrainHandle>,
    drains_started: u64,
}

struct QueueInner {
    registry: RwLock<HashMap<String, Executor>>,
    state: Mutex<QueueState>,
}

/// Shared command pipeline. Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct CommandQueue {
    inner: Arc<QueueInner>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(QueueInner {
                registry: RwLock::new(HashMap::new()),
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    /// Bind a command id to an async executor. Re-registering overwrites silently.
    pub fn register<F, Fut>(&self, command_id: impl Into<String>, executor: F)
    where
        F: Fn(CommandArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HostError>> + Send + 'static,
    {
        let command_id = command_id.into();
        debug!(command_id = %command_id, "Registering queue command");
        let executor: Executor = Arc::new(move |args| executor(args).boxed());
        self.inner.registry.write().insert(command_id, executor);
    }

    /// Append a command, or cancel it against the pending command it reverses.
    ///
    /// Returns the drain the command joined, or `None` when it was cancelled.
    /// The drain resolves once the whole queue is empty, not just this command.
    /// Starting a drain spawns it onto the current tokio runtime.
    pub fn enqueue(&self, command: QueuedCommand) -> Option<DrainHandle> {
        let mut state = self.inner.state.lock();

        if command.is_reversable() {
            if let Some(index) = state.pending.iter().rposition(|pending| command.undoes(pending)) {
                state.pending.remove(index);
                debug!(
                    command_id = %command.command_id,
                    remaining = state.pending.len(),
                    "Cancelled command against its pending reverse"
                );
                return None;
            }
        }

        trace!(command_id = %command.command_id, "Enqueued command");
        state.pending.push_back(command);

        if let Some(drain) = &state.drain {
            return Some(drain.clone());
        }

        state.drains_started += 1;
        debug!(drain = state.drains_started, pending = state.pending.len(), "Starting drain");
        let drain = Self::run_drain(Arc::clone(&self.inner)).boxed().shared();
        state.drain = Some(drain.clone());
        drop(state);

        // Drive the drain even when no caller awaits it.
        tokio::spawn(drain.clone());
        Some(drain)
    }

    /// Resolve once the currently active drain (if any) finishes.
    pub async fn settled(&self) -> DrainResult {
        let drain = self.inner.state.lock().drain.clone();
        match drain {
            Some(drain) => drain.await,
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_draining(&self) -> bool {
        self.inner.state.lock().drain.is_some()
    }

    /// Number of drain cycles started so far
    pub fn drains_started(&self) -> u64 {
        self.inner.state.lock().drains_started
    }

    /// Command ids still waiting, front first
    pub fn pending_ids(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .pending
            .iter()
            .map(|command| command.command_id.clone())
            .collect()
    }

    async fn run_drain(inner: Arc<QueueInner>) -> DrainResult {
        loop {
            let command = {
                let mut state = inner.state.lock();
                match state.pending.pop_front() {
                    Some(command) => command,
                    None => {
                        state.drain = None;
                        debug!("Drain finished");
                        return Ok(());
                    }
                }
            };

            let executor = inner.registry.read().get(&command.command_id).cloned();
            let Some(executor) = executor else {
                inner.state.lock().drain = None;
                error!(command_id = %command.command_id, "Unknown command, stopping drain");
                return Err(QueueError::UnknownCommand(command.command_id));
            };

            trace!(command_id = %command.command_id, "Executing command");
            if let Err(source) = executor(command.args).await {
                inner.state.lock().drain = None;
                error!(command_id = %command.command_id, error = %source, "Command failed, stopping drain");
                return Err(QueueError::Executor {
                    command: command.command_id,
                    source,
                });
            }
        }
    }
}
