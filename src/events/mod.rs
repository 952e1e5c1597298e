use serde::{Deserialize, Serialize};

use crate::widget::User;

pub mod stream;
pub use stream::{EventStream, EventStreamStats, Subscriber};

// Event stream capacity constants
pub const EVENT_STREAM_CAPACITY: usize = 100;
pub const EVENT_BUFFER_SIZE: usize = 50;

/// Lifecycle events emitted by an identity widget.
///
/// The serialized tag values match the widget's wire-level event names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IdentityEvent {
    /// The widget finished starting up, carrying any session persisted
    /// across reloads
    Init { user: Option<User> },
    /// A user completed authentication through the widget
    Login { user: User },
    /// The active session ended
    Logout,
}

impl IdentityEvent {
    /// Get the wire-level event name
    pub fn kind(&self) -> &'static str {
        match self {
            IdentityEvent::Init { .. } => "init",
            IdentityEvent::Login { .. } => "login",
            IdentityEvent::Logout => "logout",
        }
    }

    /// Get the user carried by this event, if any
    pub fn user(&self) -> Option<&User> {
        match self {
            IdentityEvent::Init { user } => user.as_ref(),
            IdentityEvent::Login { user } => Some(user),
            IdentityEvent::Logout => None,
        }
    }
}
