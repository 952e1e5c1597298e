use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{errors, IdentityResult};

// Default configuration values
const DEFAULT_PUBLIC_PATH: &str = "admin";

/// Site configuration for the preview application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Prefix the site is served under; empty when served from the root
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,

    /// Path segment of the CMS admin/editor application
    #[serde(default = "default_public_path")]
    pub public_path: String,

    /// Whether navigation targets are opened with the system handler
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

// Default functions
fn default_path_prefix() -> String {
    std::env::var("CMS_PATH_PREFIX").unwrap_or_default()
}

fn default_public_path() -> String {
    std::env::var("CMS_PUBLIC_PATH").unwrap_or_else(|_| DEFAULT_PUBLIC_PATH.to_string())
}

fn default_open_browser() -> bool {
    std::env::var("CMS_OPEN_BROWSER")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(false)
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            path_prefix: default_path_prefix(),
            public_path: default_public_path(),
            open_browser: default_open_browser(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let config = Self::default();
        debug!(
            path_prefix = %config.path_prefix,
            public_path = %config.public_path,
            "Loaded site configuration from environment"
        );
        config
    }

    /// Load configuration from a JSON file
    pub async fn from_file(path: impl AsRef<Path>) -> IdentityResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| errors::config_read(path.display().to_string(), e))?;

        let config: SiteConfig = serde_json::from_str(&contents)
            .map_err(|e| errors::config_parse(path.display().to_string(), e))?;

        info!(path = %path.display(), "Loaded site configuration");
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// The prefix is either empty or a slash-led path without a trailing
    /// slash; the public path is a bare segment. Anything else would
    /// produce a route with doubled or missing separators.
    pub fn validate(&self) -> IdentityResult<()> {
        if self.public_path.is_empty() {
            return Err(errors::config_missing("public_path"));
        }
        if self.public_path.starts_with('/') || self.public_path.ends_with('/') {
            return Err(errors::config_invalid(
                "public_path",
                &self.public_path,
                "must not start or end with a slash",
            ));
        }
        if !self.path_prefix.is_empty() && !self.path_prefix.starts_with('/') {
            return Err(errors::config_invalid(
                "path_prefix",
                &self.path_prefix,
                "must start with a slash when set",
            ));
        }
        if self.path_prefix.ends_with('/') {
            return Err(errors::config_invalid(
                "path_prefix",
                &self.path_prefix,
                "must not end with a slash",
            ));
        }
        Ok(())
    }

    /// Compose the admin route that post-login navigation targets.
    ///
    /// Plain concatenation with a trailing slash; with an empty prefix the
    /// route comes out as `/{public_path}/`. No validation happens here: a
    /// malformed configuration produces a malformed route for the navigator
    /// to deal with.
    pub fn admin_route(&self) -> String {
        format!("{}/{}/", self.path_prefix, self.public_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdentityError;
    use anyhow::Result;

    fn config(path_prefix: &str, public_path: &str) -> SiteConfig {
        SiteConfig {
            path_prefix: path_prefix.to_string(),
            public_path: public_path.to_string(),
            open_browser: false,
        }
    }

    #[test]
    fn admin_route_concatenates_with_trailing_slash() {
        assert_eq!(config("", "admin").admin_route(), "/admin/");
        assert_eq!(config("/site", "admin").admin_route(), "/site/admin/");
        assert_eq!(config("/docs", "editor").admin_route(), "/docs/editor/");
    }

    #[test]
    fn admin_route_performs_no_validation() {
        // A broken prefix flows straight through to the route
        assert_eq!(config("site/", "admin").admin_route(), "site//admin/");
    }

    #[test]
    fn from_env_reads_the_documented_variables() {
        std::env::set_var("CMS_PATH_PREFIX", "/envsite");
        std::env::set_var("CMS_PUBLIC_PATH", "editor");
        std::env::set_var("CMS_OPEN_BROWSER", "true");

        let config = SiteConfig::from_env();
        assert_eq!(config.admin_route(), "/envsite/editor/");
        assert!(config.open_browser);

        std::env::remove_var("CMS_PATH_PREFIX");
        std::env::remove_var("CMS_PUBLIC_PATH");
        std::env::remove_var("CMS_OPEN_BROWSER");

        let config = SiteConfig::from_env();
        assert_eq!(config.path_prefix, "");
        assert_eq!(config.public_path, "admin");
        assert!(!config.open_browser);
    }

    #[test]
    fn validate_accepts_typical_configurations() {
        assert!(config("", "admin").validate().is_ok());
        assert!(config("/site", "admin").validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_public_path() {
        let err = config("", "").validate().expect_err("must be rejected");
        assert!(matches!(err, IdentityError::ConfigMissing { .. }));
    }

    #[test]
    fn validate_rejects_slashed_public_path() {
        let err = config("", "/admin").validate().expect_err("must be rejected");
        assert!(matches!(err, IdentityError::ConfigInvalid { .. }));

        let err = config("", "admin/").validate().expect_err("must be rejected");
        assert!(matches!(err, IdentityError::ConfigInvalid { .. }));
    }

    #[test]
    fn validate_rejects_malformed_prefix() {
        let err = config("site", "admin")
            .validate()
            .expect_err("prefix without leading slash must be rejected");
        assert!(matches!(err, IdentityError::ConfigInvalid { .. }));

        let err = config("/site/", "admin")
            .validate()
            .expect_err("prefix with trailing slash must be rejected");
        assert!(matches!(err, IdentityError::ConfigInvalid { .. }));
    }

    #[tokio::test]
    async fn from_file_reads_json_configuration() -> Result<()> {
        let path = std::env::temp_dir().join("cms-identity-config-test.json");
        fs::write(
            &path,
            r#"{"path_prefix":"/site","public_path":"admin","open_browser":false}"#,
        )
        .await?;

        let config = SiteConfig::from_file(&path).await?;
        assert_eq!(config.admin_route(), "/site/admin/");
        assert!(!config.open_browser);

        fs::remove_file(&path).await.ok();
        Ok(())
    }

    #[tokio::test]
    async fn from_file_reports_missing_files() {
        let missing = std::env::temp_dir().join("cms-identity-no-such-config.json");
        let err = SiteConfig::from_file(&missing)
            .await
            .expect_err("missing file must be reported");
        assert!(matches!(err, IdentityError::ConfigRead { .. }));
    }

    #[tokio::test]
    async fn from_file_reports_malformed_json_as_a_parse_error() -> Result<()> {
        let path = std::env::temp_dir().join("cms-identity-malformed-config-test.json");
        fs::write(&path, "{ not json").await?;

        let err = SiteConfig::from_file(&path)
            .await
            .expect_err("malformed JSON must be reported");
        assert!(
            matches!(&err, IdentityError::ConfigParse { .. }),
            "Parse failures must not report as read failures, got {:?}",
            err
        );

        fs::remove_file(&path).await.ok();
        Ok(())
    }
}
