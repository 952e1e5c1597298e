use std::sync::Mutex;

use tracing::info;

use crate::error::{errors, IdentityResult};

/// Seam for the bootstrap's sole external output: sending the hosting
/// surface to a new location.
pub trait Navigator: Send + Sync {
    /// Navigate the hosting surface to the given target
    fn navigate(&self, target: &str) -> IdentityResult<()>;
}

/// Navigator that announces the target in the log and goes nowhere.
///
/// Default for the demo binary; embedders provide their own navigator
/// wired to whatever surface hosts the preview.
pub struct AnnouncingNavigator;

impl Navigator for AnnouncingNavigator {
    fn navigate(&self, target: &str) -> IdentityResult<()> {
        info!(target = %target, "Navigation requested");
        Ok(())
    }
}

/// Navigator that opens the target with the system URL opener
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn navigate(&self, target: &str) -> IdentityResult<()> {
        info!(target = %target, "Opening target with system handler");
        open::that(target).map_err(|e| errors::navigation_failed(target, e))
    }
}

/// Navigator that records every target for later inspection
#[derive(Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Create a new recording navigator
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded targets
    pub fn targets(&self) -> Vec<String> {
        self.targets
            .lock()
            .map(|targets| targets.clone())
            .unwrap_or_default()
    }

    /// Get the number of navigations performed
    pub fn count(&self) -> usize {
        self.targets.lock().map(|targets| targets.len()).unwrap_or(0)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) -> IdentityResult<()> {
        let mut targets = self
            .targets
            .lock()
            .map_err(|e| errors::navigation_failed(target, e))?;
        targets.push(target.to_string());
        Ok(())
    }
}

/// Navigator that always fails; the failure-path counterpart of
/// [`RecordingNavigator`] for exercising error handling
pub struct FailingNavigator;

impl Navigator for FailingNavigator {
    fn navigate(&self, target: &str) -> IdentityResult<()> {
        Err(errors::navigation_failed(target, "navigator is wired to fail"))
    }
}
