use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::context::PreviewContext;
use crate::defer::defer;
use crate::error::errors;
use crate::events::IdentityEvent;
use crate::navigator::Navigator;
use crate::widget::{IdentityWidget, User};

/// The two states the bootstrap oscillates between once armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// No session; the next login navigates to the admin route
    AwaitingLogin,
    /// Session active; a logout re-arms the login navigation
    AwaitingLogout,
}

/// Outcome of applying one lifecycle event to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// State after consuming the event
    pub next: BootstrapState,
    /// Whether the admin redirect fires on this transition
    pub redirect: bool,
}

impl BootstrapState {
    /// Initial state for the session observed at widget initialization
    pub fn for_session(user: Option<&User>) -> Self {
        if user.is_some() {
            BootstrapState::AwaitingLogout
        } else {
            BootstrapState::AwaitingLogin
        }
    }

    /// Apply one lifecycle event, yielding the next state and whether the
    /// redirect fires.
    ///
    /// Exactly one transition redirects: `AwaitingLogin` consuming a
    /// `login`. Repeated logins without an intervening logout land in
    /// `AwaitingLogout` where they are ignored, so each armed cycle
    /// navigates at most once.
    pub fn apply(self, event: &IdentityEvent) -> Step {
        match (self, event) {
            // A (re-)init re-establishes the state from the carried session
            (_, IdentityEvent::Init { user }) => Step {
                next: BootstrapState::for_session(user.as_ref()),
                redirect: false,
            },
            (BootstrapState::AwaitingLogin, IdentityEvent::Login { .. }) => Step {
                next: BootstrapState::AwaitingLogout,
                redirect: true,
            },
            (BootstrapState::AwaitingLogin, IdentityEvent::Logout) => Step {
                next: BootstrapState::AwaitingLogin,
                redirect: false,
            },
            (BootstrapState::AwaitingLogout, IdentityEvent::Login { .. }) => Step {
                next: BootstrapState::AwaitingLogout,
                redirect: false,
            },
            (BootstrapState::AwaitingLogout, IdentityEvent::Logout) => Step {
                next: BootstrapState::AwaitingLogin,
                redirect: false,
            },
        }
    }
}

/// Wires a preview context's identity widget to the post-login redirect.
///
/// The redirect target is computed once from the site configuration when
/// the bootstrap is built.
pub struct IdentityBootstrap {
    widget: Arc<dyn IdentityWidget>,
    navigator: Arc<dyn Navigator>,
    target: String,
}

impl IdentityBootstrap {
    /// Build a bootstrap for the given context
    pub fn new(context: &PreviewContext) -> Self {
        Self {
            widget: context.widget(),
            navigator: context.navigator(),
            target: context.config().admin_route(),
        }
    }

    /// Attach to the widget and begin the lifecycle.
    ///
    /// Subscribes to the widget's events synchronously, so nothing emitted
    /// by startup can be missed, then spawns the driver task and defers the
    /// widget's `init()` call to the next scheduling turn. The hosting
    /// pane's synchronous startup work always finishes before the widget
    /// initializes.
    pub fn attach(self) -> BootstrapHandle {
        let Self {
            widget,
            navigator,
            target,
        } = self;

        info!(
            widget = %widget.name(),
            target = %target,
            "Attaching identity bootstrap"
        );

        let mut events = widget.subscribe();
        let state: Arc<RwLock<Option<BootstrapState>>> = Arc::new(RwLock::new(None));

        let driver_state = Arc::clone(&state);
        let driver_target = target.clone();
        let driver = tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                };

                let current = *driver_state.read().await;
                match current {
                    // Not armed until the widget has initialized
                    None => match &event {
                        IdentityEvent::Init { user } => {
                            let initial = BootstrapState::for_session(user.as_ref());
                            *driver_state.write().await = Some(initial);
                            info!(state = ?initial, "Identity bootstrap armed");
                        }
                        other => {
                            debug!(kind = other.kind(), "Ignoring event before init");
                        }
                    },
                    Some(current) => {
                        let step = current.apply(&event);

                        if step.redirect {
                            info!(
                                target = %driver_target,
                                "Login observed, navigating to admin route"
                            );
                            if let Err(e) = navigator.navigate(&driver_target) {
                                error!(error = %e, "Post-login navigation failed");
                            }
                        }

                        if step.next != current {
                            debug!(
                                from = ?current,
                                to = ?step.next,
                                kind = event.kind(),
                                "Bootstrap state transition"
                            );
                        }

                        *driver_state.write().await = Some(step.next);
                    }
                }
            }

            debug!("Identity bootstrap driver stopped");
        });

        // Give the hosting pane's synchronous startup the rest of this
        // turn before the widget comes up
        let init_task = defer(async move {
            debug!(widget = %widget.name(), "Running deferred widget initialization");
            if let Err(e) = widget.init().await {
                let err = errors::widget_init(widget.name(), e);
                error!(error = %err, "Deferred widget initialization failed");
            }
        });

        BootstrapHandle {
            state,
            target,
            driver,
            init_task,
        }
    }
}

/// Handle to a running bootstrap attachment
pub struct BootstrapHandle {
    state: Arc<RwLock<Option<BootstrapState>>>,
    target: String,
    driver: JoinHandle<()>,
    init_task: JoinHandle<()>,
}

impl BootstrapHandle {
    /// Get the current state, or `None` while the widget has not
    /// initialized yet
    pub async fn state(&self) -> Option<BootstrapState> {
        *self.state.read().await
    }

    /// Get the redirect target this attachment navigates to
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether the driver task is still consuming events
    pub fn is_running(&self) -> bool {
        !self.driver.is_finished()
    }

    /// Stop the driver and any pending deferred initialization
    pub fn shutdown(self) {
        self.driver.abort();
        self.init_task.abort();
        info!("Identity bootstrap detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_event() -> IdentityEvent {
        IdentityEvent::Login {
            user: User::new("u-1", "editor@example.com"),
        }
    }

    #[test]
    fn initial_state_follows_session_presence() {
        let user = User::new("u-1", "editor@example.com");

        assert_eq!(
            BootstrapState::for_session(None),
            BootstrapState::AwaitingLogin
        );
        assert_eq!(
            BootstrapState::for_session(Some(&user)),
            BootstrapState::AwaitingLogout
        );
    }

    #[test]
    fn awaiting_login_redirects_on_login() {
        let step = BootstrapState::AwaitingLogin.apply(&login_event());
        assert_eq!(step.next, BootstrapState::AwaitingLogout);
        assert!(step.redirect, "Armed login must redirect");
    }

    #[test]
    fn awaiting_logout_ignores_login() {
        let step = BootstrapState::AwaitingLogout.apply(&login_event());
        assert_eq!(step.next, BootstrapState::AwaitingLogout);
        assert!(!step.redirect, "Unarmed login must not redirect");
    }

    #[test]
    fn logout_rearms_the_login_redirect() {
        let step = BootstrapState::AwaitingLogout.apply(&IdentityEvent::Logout);
        assert_eq!(step.next, BootstrapState::AwaitingLogin);
        assert!(!step.redirect);

        // The re-armed state redirects on the next login
        let step = step.next.apply(&login_event());
        assert!(step.redirect);
    }

    #[test]
    fn logout_while_awaiting_login_is_a_no_op() {
        let step = BootstrapState::AwaitingLogin.apply(&IdentityEvent::Logout);
        assert_eq!(step.next, BootstrapState::AwaitingLogin);
        assert!(!step.redirect);
    }

    #[test]
    fn init_reestablishes_state_without_redirecting() {
        let user = User::new("u-1", "editor@example.com");

        let step = BootstrapState::AwaitingLogin.apply(&IdentityEvent::Init {
            user: Some(user.clone()),
        });
        assert_eq!(step.next, BootstrapState::AwaitingLogout);
        assert!(!step.redirect);

        let step = BootstrapState::AwaitingLogout.apply(&IdentityEvent::Init { user: None });
        assert_eq!(step.next, BootstrapState::AwaitingLogin);
        assert!(!step.redirect);
    }

    #[test]
    fn each_armed_cycle_redirects_at_most_once() {
        // login, login, login, logout, login: two armed cycles, two redirects
        let events = [
            login_event(),
            login_event(),
            login_event(),
            IdentityEvent::Logout,
            login_event(),
        ];

        let mut state = BootstrapState::for_session(None);
        let mut redirects = 0;
        for event in &events {
            let step = state.apply(event);
            if step.redirect {
                redirects += 1;
            }
            state = step.next;
        }

        assert_eq!(redirects, 2, "One redirect per armed cycle");
        assert_eq!(state, BootstrapState::AwaitingLogout);
    }
}
