use anyhow::Result;
use async_trait::async_trait;

use crate::events::{IdentityEvent, Subscriber};

pub mod scripted;
pub mod user;

pub use scripted::ScriptedWidget;
pub use user::User;

/// Common trait for identity widget implementations.
///
/// The widget is an external component: it owns the session, runs the
/// authentication UI, and dispatches the `init`, `login` and `logout`
/// lifecycle events. Everything behind those events (OAuth, tokens,
/// session storage) is the widget's own business.
#[async_trait]
pub trait IdentityWidget: Send + Sync {
    /// Get the widget name
    fn name(&self) -> &str;

    /// Begin widget startup.
    ///
    /// The widget announces readiness by emitting an `init` event carrying
    /// the session persisted across reloads, if one exists.
    async fn init(&self) -> Result<()>;

    /// Subscribe to the widget's lifecycle events
    fn subscribe(&self) -> Subscriber<IdentityEvent>;

    /// Get the current session's user, if any
    async fn current_user(&self) -> Option<User>;
}
