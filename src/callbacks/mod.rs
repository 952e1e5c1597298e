//! Callback management for host-supplied hooks
//!
//! Host code registers plain functions against identity lifecycle moments
//! (login, logout). Each registered callback gets its own listener task fed
//! from a broadcast channel, so a slow or failing callback cannot stall the
//! code that triggers it.


use std::{fmt, sync::Arc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use uuid::Uuid;

/// Type for callback IDs
pub type CallbackId = Uuid;

/// Trait for types that can be used in callbacks
pub trait CallbackData: Clone + Send + Sync + 'static + fmt::Debug {}

// Implement CallbackData for common types
impl<T> CallbackData for T where T: Clone + Send + Sync + 'static + fmt::Debug {}

// Capacity of the distribution channel behind each registry
const CALLBACK_CHANNEL_CAPACITY: usize = 100;

/// A group of callbacks distributed over a broadcast channel
#[derive(Clone)]
pub struct CallbackRegistry<T: CallbackData> {
    /// The broadcast sender to distribute events
    sender: broadcast::Sender<T>,

    /// Group identifier for categorizing callbacks in logs
    group: Arc<String>,

    /// Listener task per registered callback, kept for cleanup
    listeners: Arc<dashmap::DashMap<CallbackId, JoinHandle<()>>>,
}

impl<T: CallbackData> CallbackRegistry<T> {
    /// Create a new callback registry with a group identifier
    pub fn new(group: &str) -> Self {
        let (sender, _) = broadcast::channel(CALLBACK_CHANNEL_CAPACITY);

        Self {
            sender,
            group: Arc::new(group.to_string()),
            listeners: Arc::new(dashmap::DashMap::new()),
        }
    }

    /// Register a callback function
    pub async fn register<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        let mut receiver = self.sender.subscribe();

        let group = Arc::clone(&self.group);
        let listeners_map = Arc::clone(&self.listeners);

        // Spawn a task to process events for this callback
        let handle = tokio::spawn(async move {
            debug!(
                callback_id = %id,
                group = %group,
                "Started callback listener"
            );

            while let Ok(data) = receiver.recv().await {
                if let Err(e) = callback(data) {
                    error!(
                        callback_id = %id,
                        group = %group,
                        error = %e,
                        "Callback execution failed"
                    );
                }
            }

            // Channel closed; drop our map entry
            listeners_map.remove(&id);

            debug!(
                callback_id = %id,
                group = %group,
                "Callback listener stopped"
            );
        });

        self.listeners.insert(id, handle);

        debug!(
            callback_id = %id,
            group = %self.group,
            "Registered callback"
        );

        id
    }

    /// Unregister a callback by ID, stopping its listener task
    pub async fn unregister(&self, id: CallbackId) -> bool {
        match self.listeners.remove(&id) {
            Some((_, handle)) => {
                handle.abort();
                debug!(
                    callback_id = %id,
                    group = %self.group,
                    "Unregistered callback"
                );
                true
            }
            None => {
                debug!(
                    callback_id = %id,
                    group = %self.group,
                    "Attempted to unregister non-existent callback"
                );
                false
            }
        }
    }

    /// Remove entries whose listener task has ended; a panicked callback
    /// unwinds its listener without reaching the loop's own cleanup
    fn prune_finished(&self) {
        self.listeners.retain(|id, handle| {
            if handle.is_finished() {
                error!(
                    callback_id = %id,
                    group = %self.group,
                    "Callback listener ended unexpectedly, removing it"
                );
                false
            } else {
                true
            }
        });
    }

    /// Trigger all registered callbacks with the provided data
    pub async fn trigger(&self, data: T) -> anyhow::Result<usize> {
        self.prune_finished();
        let listener_count = self.listeners.len();

        if listener_count == 0 {
            // No callbacks registered, just return
            return Ok(0);
        }

        match self.sender.send(data) {
            Ok(count) => {
                debug!(
                    group = %self.group,
                    listeners = listener_count,
                    delivered = count,
                    "Triggered callbacks"
                );
                Ok(count)
            }
            Err(e) => {
                error!(
                    group = %self.group,
                    error = %e,
                    "Failed to trigger callbacks"
                );
                Err(anyhow::anyhow!("Failed to trigger callbacks: {}", e))
            }
        }
    }

    /// Get the number of registered callbacks with a live listener
    pub async fn count(&self) -> usize {
        self.prune_finished();
        self.listeners.len()
    }

    /// Clear all registered callbacks
    pub async fn clear(&self) {
        let count = self.listeners.len();
        for entry in self.listeners.iter() {
            entry.value().abort();
        }
        self.listeners.clear();

        debug!(group = %self.group, count = count, "Cleared all callbacks");
    }
}
