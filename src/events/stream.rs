use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error};

/// Generic event stream for reactive event handling
pub struct EventStream<T: Clone + Send + 'static> {
    sender: broadcast::Sender<T>,
    buffer: Arc<RwLock<VecDeque<T>>>,
    buffer_size: usize,
    stats: Arc<RwLock<EventStreamStats>>,
}

/// Statistics for monitoring stream activity
#[derive(Debug, Clone, Default)]
pub struct EventStreamStats {
    pub events_published: u64,
    pub events_dropped: u64,
    pub subscribers_created: u64,
}

impl<T: Clone + Send + 'static> EventStream<T> {
    /// Create a new event stream with specified channel capacity and
    /// replay buffer size
    pub fn new(capacity: usize, buffer_size: usize) -> Self {
        debug!(capacity, buffer_size, "Creating new event stream");
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(buffer_size))),
            buffer_size,
            stats: Arc::new(RwLock::new(EventStreamStats::default())),
        }
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> Subscriber<T> {
        debug!("New subscriber registered to event stream");

        // Stats are behind an async lock, so count the subscriber from a task
        let stats = Arc::clone(&self.stats);
        tokio::spawn(async move {
            stats.write().await.subscribers_created += 1;
        });

        Subscriber {
            receiver: self.sender.subscribe(),
            buffer: Arc::clone(&self.buffer),
        }
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of subscribers the event reached. An event with
    /// no live subscribers is buffered and counted as dropped, not treated
    /// as a failure.
    pub async fn publish(&self, event: T) -> usize {
        match self.sender.send(event.clone()) {
            Ok(receiver_count) => {
                self.buffer_event(event).await;
                self.stats.write().await.events_published += 1;
                debug!(receivers = receiver_count, "Event published");
                receiver_count
            }
            Err(broadcast::error::SendError(event)) => {
                // No receivers; buffer the event so late subscribers can
                // still replay it
                self.buffer_event(event).await;
                self.stats.write().await.events_dropped += 1;
                debug!("No receivers for event, message buffered");
                0
            }
        }
    }

    /// Store an event in the buffer for replay
    async fn buffer_event(&self, event: T) {
        let mut buffer = self.buffer.write().await;
        buffer.push_back(event);

        // Keep buffer size under control
        while buffer.len() > self.buffer_size {
            buffer.pop_front();
        }
    }

    /// Get the number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get current statistics
    pub async fn get_stats(&self) -> EventStreamStats {
        self.stats.read().await.clone()
    }

    /// Reset statistics counters
    pub async fn reset_stats(&self) {
        *self.stats.write().await = EventStreamStats::default();
        debug!("Event stream statistics reset to defaults");
    }

    /// Get the replay buffer capacity
    pub fn capacity(&self) -> usize {
        self.buffer_size
    }
}

/// Subscriber for receiving events from a stream
pub struct Subscriber<T: Clone + Send + 'static> {
    receiver: broadcast::Receiver<T>,
    buffer: Arc<RwLock<VecDeque<T>>>,
}

impl<T: Clone + Send + 'static> Subscriber<T> {
    /// Receive the next event
    pub async fn recv(&mut self) -> Result<T, broadcast::error::RecvError> {
        let result = self.receiver.recv().await;
        if let Err(broadcast::error::RecvError::Lagged(skipped)) = &result {
            error!(skipped, "Subscriber lagged behind event stream");
        }
        result
    }

    /// Replay events retained in the buffer
    pub async fn replay_buffer(&self) -> Vec<T> {
        let buffer = self.buffer.read().await;
        buffer.iter().cloned().collect()
    }
}

impl<T: Clone + Send + 'static> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            buffer: Arc::clone(&self.buffer),
            buffer_size: self.buffer_size,
            stats: Arc::clone(&self.stats),
        }
    }
}
