use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::events::{
    EventStream, EventStreamStats, IdentityEvent, Subscriber, EVENT_BUFFER_SIZE,
    EVENT_STREAM_CAPACITY,
};
use crate::widget::{IdentityWidget, User};

/// In-process identity widget driven by explicit simulation calls.
///
/// Stands in for the real embedder-supplied widget in demos and tests:
/// it keeps a session value and emits the same lifecycle events a real
/// widget would dispatch.
pub struct ScriptedWidget {
    name: String,
    events: EventStream<IdentityEvent>,
    session: Arc<RwLock<Option<User>>>,
}

impl ScriptedWidget {
    /// Create a widget with no persisted session
    pub fn new() -> Self {
        Self::build("scripted", None)
    }

    /// Create a widget with a custom name and no persisted session
    pub fn with_name(name: &str) -> Self {
        Self::build(name, None)
    }

    /// Create a widget that already holds a session, as if one had been
    /// persisted across a reload
    pub fn with_session(user: User) -> Self {
        Self::build("scripted", Some(user))
    }

    fn build(name: &str, session: Option<User>) -> Self {
        Self {
            name: name.to_string(),
            events: EventStream::new(EVENT_STREAM_CAPACITY, EVENT_BUFFER_SIZE),
            session: Arc::new(RwLock::new(session)),
        }
    }

    /// Simulate a user completing authentication.
    ///
    /// Sets the session and emits `login`. Returns the number of
    /// subscribers the event reached.
    pub async fn simulate_login(&self, user: User) -> usize {
        info!(widget = %self.name, user = %user.label(), "Simulating login");
        *self.session.write().await = Some(user.clone());
        self.events.publish(IdentityEvent::Login { user }).await
    }

    /// Simulate the active session ending.
    ///
    /// Clears the session and emits `logout`. Returns the number of
    /// subscribers the event reached.
    pub async fn simulate_logout(&self) -> usize {
        info!(widget = %self.name, "Simulating logout");
        *self.session.write().await = None;
        self.events.publish(IdentityEvent::Logout).await
    }

    /// Get current event stream statistics
    pub async fn stats(&self) -> EventStreamStats {
        self.events.get_stats().await
    }
}

impl Default for ScriptedWidget {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityWidget for ScriptedWidget {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(&self) -> Result<()> {
        let user = self.session.read().await.clone();
        debug!(
            widget = %self.name,
            has_session = user.is_some(),
            "Widget initializing"
        );
        self.events.publish(IdentityEvent::Init { user }).await;
        Ok(())
    }

    fn subscribe(&self) -> Subscriber<IdentityEvent> {
        self.events.subscribe()
    }

    async fn current_user(&self) -> Option<User> {
        self.session.read().await.clone()
    }
}
