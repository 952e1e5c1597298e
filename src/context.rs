use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info};

use crate::callbacks::{CallbackId, CallbackRegistry};
use crate::config::SiteConfig;
use crate::events::IdentityEvent;
use crate::navigator::Navigator;
use crate::widget::{IdentityWidget, User};

/// Application-context analog of the page the widget is embedded in.
///
/// Components that need the widget receive this context instead of
/// reaching for a global. The widget handle is set once at construction
/// and thereafter only read; `widget()` hands out clones of that same
/// shared handle.
#[derive(Clone)]
pub struct PreviewContext {
    widget: Arc<dyn IdentityWidget>,
    navigator: Arc<dyn Navigator>,
    config: SiteConfig,
    callbacks: IdentityCallbacks,
}

impl PreviewContext {
    /// Create a new preview context and start its callback bridge
    pub fn new(
        widget: Arc<dyn IdentityWidget>,
        navigator: Arc<dyn Navigator>,
        config: SiteConfig,
    ) -> Self {
        info!(widget = %widget.name(), "Creating preview context");

        let context = Self {
            widget,
            navigator,
            config,
            callbacks: IdentityCallbacks::new(),
        };
        context.spawn_callback_bridge();
        context
    }

    /// Get the shared widget handle
    pub fn widget(&self) -> Arc<dyn IdentityWidget> {
        Arc::clone(&self.widget)
    }

    /// Get the navigator
    pub fn navigator(&self) -> Arc<dyn Navigator> {
        Arc::clone(&self.navigator)
    }

    /// Get the site configuration
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Get the host callback registries
    pub fn callbacks(&self) -> &IdentityCallbacks {
        &self.callbacks
    }

    /// Fan widget events out to the host callback registries
    fn spawn_callback_bridge(&self) {
        let mut events = self.widget.subscribe();
        let callbacks = self.callbacks.clone();

        tokio::spawn(async move {
            debug!("Callback bridge started");

            loop {
                match events.recv().await {
                    Ok(IdentityEvent::Login { user }) => {
                        if let Err(e) = callbacks.login.trigger(user).await {
                            error!(error = %e, "Failed to trigger login callbacks");
                        }
                    }
                    Ok(IdentityEvent::Logout) => {
                        if let Err(e) = callbacks.logout.trigger(()).await {
                            error!(error = %e, "Failed to trigger logout callbacks");
                        }
                    }
                    Ok(IdentityEvent::Init { .. }) => {}
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }

            debug!("Callback bridge stopped");
        });
    }
}

/// Host-facing callback registries for identity lifecycle moments.
///
/// The analog of other page scripts wiring their own handlers onto the
/// shared widget handle.
#[derive(Clone)]
pub struct IdentityCallbacks {
    login: CallbackRegistry<User>,
    logout: CallbackRegistry<()>,
}

impl IdentityCallbacks {
    fn new() -> Self {
        Self {
            login: CallbackRegistry::new("login"),
            logout: CallbackRegistry::new("logout"),
        }
    }

    /// Register a callback invoked with the user of every login
    pub async fn on_login<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(User) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.login.register(callback).await
    }

    /// Register a callback invoked on every logout
    pub async fn on_logout<F>(&self, callback: F) -> CallbackId
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.logout.register(move |_| callback()).await
    }

    /// Remove a login callback
    pub async fn remove_login(&self, id: CallbackId) -> bool {
        self.login.unregister(id).await
    }

    /// Remove a logout callback
    pub async fn remove_logout(&self, id: CallbackId) -> bool {
        self.logout.unregister(id).await
    }

    /// Get the number of registered login callbacks
    pub async fn login_count(&self) -> usize {
        self.login.count().await
    }

    /// Get the number of registered logout callbacks
    pub async fn logout_count(&self) -> usize {
        self.logout.count().await
    }
}
