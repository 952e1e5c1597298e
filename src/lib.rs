//! Identity lifecycle bootstrap for static-site CMS preview applications.
//!
//! Wires an embedder-supplied identity widget into the hosting preview
//! app: the bootstrap observes the widget's `init`, `login` and `logout`
//! lifecycle events and performs the post-login navigation to the admin
//! route. Widget startup is deferred until the hosting pane's synchronous
//! setup has finished.

pub mod bootstrap;
pub mod callbacks;
pub mod config;
pub mod context;
pub mod defer;
pub mod error;
pub mod events;
pub mod navigator;
pub mod widget;

#[cfg(test)]
mod tests;

// Re-export core components
pub use crate::bootstrap::{BootstrapHandle, BootstrapState, IdentityBootstrap, Step};
pub use crate::callbacks::{CallbackId, CallbackRegistry};
pub use crate::config::SiteConfig;
pub use crate::context::{IdentityCallbacks, PreviewContext};
pub use crate::defer::defer;
pub use crate::error::{IdentityError, IdentityResult};
pub use crate::events::{EventStream, EventStreamStats, IdentityEvent, Subscriber};
pub use crate::navigator::{
    AnnouncingNavigator, FailingNavigator, Navigator, RecordingNavigator, SystemNavigator,
};
pub use crate::widget::{IdentityWidget, ScriptedWidget, User};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
