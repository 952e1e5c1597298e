use std::sync::Arc;

use anyhow::Result;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cms_identity::{
    AnnouncingNavigator, IdentityBootstrap, Navigator, PreviewContext, ScriptedWidget,
    SiteConfig, SystemNavigator, User, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let env_file_path = match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(_) => None,
    };

    // Initialize the tracing subscriber for structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level if RUST_LOG is not set
            if cfg!(debug_assertions) {
                // More verbose in debug mode
                "cms_identity=debug,warn".into()
            } else {
                // Less verbose in release mode
                "cms_identity=info,warn".into()
            }
        }))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    info!(version = VERSION, "CMS identity bootstrap demo starting");

    // Log environment loading after logger is initialized
    match env_file_path {
        Some(path) => info!("Loaded environment variables from {}", path.display()),
        None => debug!("No .env file found. Using existing environment variables."),
    };

    // Load configuration
    let config = match std::env::var("CMS_IDENTITY_CONFIG") {
        Ok(path) => SiteConfig::from_file(&path).await?,
        Err(_) => SiteConfig::from_env(),
    };
    config.validate()?;
    info!(route = %config.admin_route(), "Post-login route configured");

    // A persisted session makes the demo start logged in
    let widget = Arc::new(match std::env::var("CMS_DEMO_SESSION") {
        Ok(email) => {
            info!(email = %email, "Starting with a persisted session");
            ScriptedWidget::with_session(User::new("demo-user", email))
        }
        Err(_) => ScriptedWidget::with_name("demo"),
    });

    let navigator: Arc<dyn Navigator> = if config.open_browser {
        Arc::new(SystemNavigator)
    } else {
        Arc::new(AnnouncingNavigator)
    };

    let context = PreviewContext::new(widget.clone(), navigator, config);

    // Host hooks, the way other page scripts would use the shared handle
    context
        .callbacks()
        .on_login(|user| {
            info!(user = %user.label(), "Host callback: user logged in");
            Ok(())
        })
        .await;
    context
        .callbacks()
        .on_logout(|| {
            info!("Host callback: user logged out");
            Ok(())
        })
        .await;

    let handle = IdentityBootstrap::new(&context).attach();

    // Play a short lifecycle: login, logout, login again, then a duplicate
    // login that must not navigate a second time within its cycle
    sleep(Duration::from_millis(50)).await;
    info!(state = ?handle.state().await, "After deferred initialization");

    widget
        .simulate_login(User::new("u-100", "editor@example.com"))
        .await;
    sleep(Duration::from_millis(50)).await;

    widget.simulate_logout().await;
    sleep(Duration::from_millis(50)).await;

    widget
        .simulate_login(User::new("u-100", "editor@example.com").with_display_name("Site Editor"))
        .await;
    widget
        .simulate_login(User::new("u-200", "second@example.com"))
        .await;
    sleep(Duration::from_millis(50)).await;

    // Other components observe the session through the shared handle
    if let Some(user) = context.widget().current_user().await {
        info!(user = %user.label(), "Current session user");
    }

    let stats = widget.stats().await;
    info!(
        published = stats.events_published,
        dropped = stats.events_dropped,
        subscribers = stats.subscribers_created,
        "Event stream statistics"
    );

    handle.shutdown();
    info!("Demo complete");
    Ok(())
}
