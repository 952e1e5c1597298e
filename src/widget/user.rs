use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// User record supplied by the identity widget on `init` and `login`.
///
/// The widget owns the session; this record is a transient observation of
/// it and is never stored by the bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier assigned by the identity service
    pub id: String,

    /// Email address the user authenticated with
    pub email: String,

    /// Optional human-facing name
    pub display_name: Option<String>,

    /// Additional provider-specific information
    pub metadata: HashMap<String, Value>,

    /// When this record was issued by the widget
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            metadata: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the human-facing name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Get the best human-facing label for this user
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }

    /// Get a value from the user metadata
    pub fn get_metadata<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<T> {
        match self.metadata.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| anyhow!("Failed to deserialize metadata '{}': {}", key, e)),
            None => Err(anyhow!("Metadata key '{}' not found", key)),
        }
    }

    /// Set a value in the user metadata
    pub fn set_metadata<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| anyhow!("Failed to serialize metadata '{}': {}", key, e))?;
        self.metadata.insert(key.to_string(), json_value);
        Ok(())
    }
}
