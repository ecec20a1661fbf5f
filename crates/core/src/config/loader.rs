//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings, or defaults when no file was found
    pub schema: ConfigSchema,
    /// File the settings came from
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist. Without one, the standard locations are
    /// searched and defaults are used when none is present.
    ///
    /// # Errors
    ///
    /// Fails when an explicit path is missing or when the file is not valid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(Path::new(".")),
        };

        let schema = if let Some(ref p) = config_path {
            tracing::debug!(path = %p.display(), "loading tool configuration");
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file(base: &Path) -> Option<PathBuf> {
    let candidates = [
        ".droidspec.toml",
        "droidspec-tool.toml",
        ".config/droidspec.toml",
    ];

    candidates
        .iter()
        .map(|candidate| base.join(candidate))
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.descriptor.path, "droidspec.toml");
        assert!(config.schema.sdk.detect);
    }

    #[test]
    fn test_config_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.toml");
        std::fs::write(
            &path,
            r#"
[sdk]
platforms = [33, 34]
ndk_versions = ["27.0.12077973"]
jdk = 17
detect = false

[properties]
"flutter.versionCode" = 7
"flutter.versionName" = "2.1.0"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.path.as_deref(), Some(path.as_path()));
        assert_eq!(config.schema.sdk.platforms, vec![33, 34]);
        assert_eq!(config.schema.sdk.jdk, Some(17));
        assert!(!config.schema.sdk.detect);

        let overrides = config.schema.property_overrides();
        assert_eq!(overrides.get("flutter.versionCode").map(String::as_str), Some("7"));
        assert_eq!(overrides.get("flutter.versionName").map(String::as_str), Some("2.1.0"));
    }

    #[test]
    fn test_config_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/droidspec-tool.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.toml");
        std::fs::write(&path, "[sdk\nplatforms = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_find_config_file_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_file(dir.path()).is_none());

        std::fs::write(dir.path().join("droidspec-tool.toml"), "").unwrap();
        let found = find_config_file(dir.path()).unwrap();
        assert!(found.ends_with("droidspec-tool.toml"));
    }
}
