//! Tests for the preview context and the host callback bridge

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use tokio::time::{sleep, timeout, Duration};

use crate::config::SiteConfig;
use crate::context::PreviewContext;
use crate::events::IdentityEvent;
use crate::navigator::AnnouncingNavigator;
use crate::widget::{IdentityWidget, ScriptedWidget, User};

fn site_config() -> SiteConfig {
    SiteConfig {
        path_prefix: String::new(),
        public_path: "admin".to_string(),
        open_browser: false,
    }
}

#[tokio::test]
async fn context_hands_out_the_same_widget_handle() {
    let widget: Arc<dyn IdentityWidget> = Arc::new(ScriptedWidget::new());
    let context =
        PreviewContext::new(widget.clone(), Arc::new(AnnouncingNavigator), site_config());

    let handle = context.widget();
    assert!(
        Arc::ptr_eq(&handle, &widget),
        "Context must expose the exact widget instance it was built with"
    );
}

#[tokio::test]
async fn events_flow_through_the_shared_handle() {
    let widget = Arc::new(ScriptedWidget::new());
    let context =
        PreviewContext::new(widget.clone(), Arc::new(AnnouncingNavigator), site_config());

    // Subscribe through the context's handle, fire through the original
    let mut subscriber = context.widget().subscribe();
    widget
        .simulate_login(User::new("u-1", "editor@example.com"))
        .await;

    let event = timeout(Duration::from_secs(1), subscriber.recv())
        .await
        .expect("event should arrive promptly")
        .expect("stream should stay open");

    match event {
        IdentityEvent::Login { user } => assert_eq!(user.id, "u-1"),
        other => panic!("Expected a login event, got {:?}", other),
    }
}

#[tokio::test]
async fn login_and_logout_callbacks_fire_with_payloads() {
    let widget = Arc::new(ScriptedWidget::new());
    let context =
        PreviewContext::new(widget.clone(), Arc::new(AnnouncingNavigator), site_config());

    let logins = Arc::new(AtomicUsize::new(0));
    let logouts = Arc::new(AtomicUsize::new(0));
    let last_label: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let logins_clone = Arc::clone(&logins);
    let label_clone = Arc::clone(&last_label);
    context
        .callbacks()
        .on_login(move |user| {
            logins_clone.fetch_add(1, Ordering::SeqCst);
            *label_clone.lock().expect("label mutex") = Some(user.label().to_string());
            Ok(())
        })
        .await;

    let logouts_clone = Arc::clone(&logouts);
    context
        .callbacks()
        .on_logout(move || {
            logouts_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

    assert_eq!(context.callbacks().login_count().await, 1);
    assert_eq!(context.callbacks().logout_count().await, 1);

    sleep(Duration::from_millis(10)).await;
    widget
        .simulate_login(User::new("u-1", "editor@example.com"))
        .await;
    sleep(Duration::from_millis(50)).await;

    assert_eq!(logins.load(Ordering::SeqCst), 1, "Login callback should fire");
    assert_eq!(logouts.load(Ordering::SeqCst), 0);
    assert_eq!(
        last_label.lock().expect("label mutex").as_deref(),
        Some("editor@example.com"),
        "Login callback should see the user payload"
    );

    widget.simulate_logout().await;
    sleep(Duration::from_millis(50)).await;

    assert_eq!(logins.load(Ordering::SeqCst), 1);
    assert_eq!(logouts.load(Ordering::SeqCst), 1, "Logout callback should fire");
}

#[tokio::test]
async fn removed_callbacks_stop_firing() {
    let widget = Arc::new(ScriptedWidget::new());
    let context =
        PreviewContext::new(widget.clone(), Arc::new(AnnouncingNavigator), site_config());

    let logins = Arc::new(AtomicUsize::new(0));
    let logins_clone = Arc::clone(&logins);
    let id = context
        .callbacks()
        .on_login(move |_| {
            logins_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

    assert!(context.callbacks().remove_login(id).await);
    assert_eq!(context.callbacks().login_count().await, 0);

    widget
        .simulate_login(User::new("u-1", "editor@example.com"))
        .await;
    sleep(Duration::from_millis(50)).await;

    assert_eq!(
        logins.load(Ordering::SeqCst),
        0,
        "A removed callback must not fire"
    );
}

#[tokio::test]
async fn init_events_do_not_reach_host_callbacks() {
    let widget = Arc::new(ScriptedWidget::with_session(User::new(
        "u-1",
        "editor@example.com",
    )));
    let context =
        PreviewContext::new(widget.clone(), Arc::new(AnnouncingNavigator), site_config());

    let fired = Arc::new(AtomicUsize::new(0));

    let fired_login = Arc::clone(&fired);
    context
        .callbacks()
        .on_login(move |_| {
            fired_login.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

    let fired_logout = Arc::clone(&fired);
    context
        .callbacks()
        .on_logout(move || {
            fired_logout.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

    sleep(Duration::from_millis(10)).await;
    widget.init().await.expect("scripted init never fails");
    sleep(Duration::from_millis(50)).await;

    assert_eq!(
        fired.load(Ordering::SeqCst),
        0,
        "Init carries a session but is neither a login nor a logout"
    );
}
