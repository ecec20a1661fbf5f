//! Installed Android SDK inventory
//!
//! Answers "is this compile SDK / NDK / JDK installed?" for validation. An
//! empty inventory knows nothing and makes those checks pass vacuously.

use droidspec_core::config::SdkConfig;
use droidspec_core::process::{command_exists, run_command};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

static JAVA_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"version "(\d+)(?:\.(\d+))?"#).expect("valid regex"));

/// What is installed on this machine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SdkInventory {
    /// SDK root that was scanned, if any
    pub sdk_root: Option<PathBuf>,
    /// Installed platform API levels
    pub platforms: BTreeSet<u32>,
    /// Installed NDK revisions
    pub ndk_versions: BTreeSet<String>,
    /// Installed JDK feature release
    pub jdk: Option<u32>,
}

impl SdkInventory {
    /// An inventory that knows nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Declare an installed platform
    #[must_use]
    pub fn with_platform(mut self, api_level: u32) -> Self {
        self.platforms.insert(api_level);
        self
    }

    /// Declare an installed NDK revision
    #[must_use]
    pub fn with_ndk(mut self, revision: impl Into<String>) -> Self {
        self.ndk_versions.insert(revision.into());
        self
    }

    /// Declare the installed JDK
    #[must_use]
    pub fn with_jdk(mut self, major: u32) -> Self {
        self.jdk = Some(major);
        self
    }

    /// Scan the default SDK root and the JDK on PATH
    pub fn detect() -> Self {
        Self::detect_in(default_sdk_root().as_deref())
    }

    /// Scan `root`, when given, and the JDK on PATH
    fn detect_in(root: Option<&Path>) -> Self {
        let mut inventory = root.map(Self::scan).unwrap_or_default();
        inventory.jdk = detect_jdk();
        inventory
    }

    /// Build an inventory from tool configuration, scanning the machine when enabled
    pub fn from_config(config: &SdkConfig) -> Self {
        let mut inventory = match (config.detect, config.expanded_sdk_root()) {
            (true, Some(root)) => Self::detect_in(Some(root.as_path())),
            (true, None) => Self::detect(),
            (false, _) => Self::empty(),
        };

        inventory.platforms.extend(config.platforms.iter().copied());
        inventory
            .ndk_versions
            .extend(config.ndk_versions.iter().cloned());
        if config.jdk.is_some() {
            inventory.jdk = config.jdk;
        }
        inventory
    }

    /// Scan an SDK root for `platforms/android-<N>` and `ndk/<revision>`
    pub fn scan(root: &Path) -> Self {
        let platforms = child_dirs(&root.join("platforms"))
            .filter_map(|name| name.strip_prefix("android-")?.parse().ok())
            .collect();
        let ndk_versions = child_dirs(&root.join("ndk")).collect();

        let inventory = Self {
            sdk_root: Some(root.to_path_buf()),
            platforms,
            ndk_versions,
            jdk: None,
        };
        tracing::debug!(
            root = %root.display(),
            platforms = ?inventory.platforms,
            ndks = ?inventory.ndk_versions,
            "scanned Android SDK"
        );
        inventory
    }

    /// Whether nothing is known
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty() && self.ndk_versions.is_empty() && self.jdk.is_none()
    }

    /// Whether a platform is installed; `None` when platforms are unknown
    pub fn has_platform(&self, api_level: u32) -> Option<bool> {
        (!self.platforms.is_empty()).then(|| self.platforms.contains(&api_level))
    }

    /// Whether an NDK revision is installed; `None` when NDKs are unknown
    pub fn has_ndk(&self, revision: &str) -> Option<bool> {
        (!self.ndk_versions.is_empty()).then(|| self.ndk_versions.contains(revision))
    }
}

/// SDK root from the environment, or the platform default location if present
pub fn default_sdk_root() -> Option<PathBuf> {
    ["ANDROID_HOME", "ANDROID_SDK_ROOT"]
        .iter()
        .filter_map(|var| std::env::var_os(var))
        .map(PathBuf::from)
        .find(|path| path.is_dir())
        .or_else(|| {
            let home = dirs::home_dir()?;
            let candidate = if cfg!(target_os = "macos") {
                home.join("Library/Android/sdk")
            } else {
                home.join("Android/Sdk")
            };
            candidate.is_dir().then_some(candidate)
        })
}

fn child_dirs(dir: &Path) -> impl Iterator<Item = String> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
}

/// Detect the JDK on PATH via `java -version`
pub fn detect_jdk() -> Option<u32> {
    if !command_exists("java") {
        return None;
    }
    let result = run_command("java", &["-version"]).ok()?;
    // `java -version` reports on stderr
    parse_java_version(&result.combined_output())
}

/// Feature release from `java -version` output
///
/// Handles both the legacy `1.8.0_392` scheme and the modern `17.0.9` one.
pub fn parse_java_version(output: &str) -> Option<u32> {
    let caps = JAVA_VERSION.captures(output)?;
    let first: u32 = caps.get(1)?.as_str().parse().ok()?;
    if first == 1 {
        caps.get(2)?.as_str().parse().ok()
    } else {
        Some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inventory_knows_nothing() {
        let inventory = SdkInventory::empty();
        assert!(inventory.is_empty());
        assert_eq!(inventory.has_platform(34), None);
        assert_eq!(inventory.has_ndk("27.0.12077973"), None);
    }

    #[test]
    fn test_builder_methods() {
        let inventory = SdkInventory::empty()
            .with_platform(34)
            .with_ndk("27.0.12077973")
            .with_jdk(17);
        assert_eq!(inventory.has_platform(34), Some(true));
        assert_eq!(inventory.has_platform(35), Some(false));
        assert_eq!(inventory.has_ndk("27.0.12077973"), Some(true));
        assert_eq!(inventory.jdk, Some(17));
    }

    #[test]
    fn test_scan_sdk_root() {
        let root = tempfile::tempdir().unwrap();
        for dir in [
            "platforms/android-33",
            "platforms/android-34",
            "platforms/android-UpsideDownCake",
            "ndk/27.0.12077973",
            "ndk/26.3.11579264",
        ] {
            std::fs::create_dir_all(root.path().join(dir)).unwrap();
        }
        std::fs::write(root.path().join("platforms/readme.txt"), "x").unwrap();

        let inventory = SdkInventory::scan(root.path());
        assert_eq!(inventory.platforms, BTreeSet::from([33, 34]));
        assert_eq!(inventory.ndk_versions.len(), 2);
        assert!(inventory.ndk_versions.contains("26.3.11579264"));
        assert_eq!(inventory.sdk_root.as_deref(), Some(root.path()));
    }

    #[test]
    fn test_scan_missing_root() {
        let inventory = SdkInventory::scan(Path::new("/nonexistent/android-sdk"));
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_from_config_without_detection() {
        let config = SdkConfig {
            platforms: vec![34],
            ndk_versions: vec!["27.0.12077973".to_string()],
            jdk: Some(21),
            detect: false,
            ..SdkConfig::default()
        };
        let inventory = SdkInventory::from_config(&config);
        assert_eq!(inventory.has_platform(34), Some(true));
        assert_eq!(inventory.jdk, Some(21));
        assert!(inventory.sdk_root.is_none());
    }

    #[test]
    fn test_from_config_scans_configured_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("platforms/android-35")).unwrap();
        let config = SdkConfig {
            sdk_root: Some(root.path().display().to_string()),
            platforms: vec![34],
            jdk: Some(17),
            ..SdkConfig::default()
        };
        let inventory = SdkInventory::from_config(&config);
        assert_eq!(inventory.platforms, BTreeSet::from([34, 35]));
        assert_eq!(inventory.jdk, Some(17));
    }

    #[test]
    fn test_detect_scans_default_root_and_jdk() {
        let inventory = SdkInventory::detect();
        assert_eq!(inventory.sdk_root, default_sdk_root());
        assert_eq!(inventory.jdk, detect_jdk());
    }

    #[test]
    fn test_from_config_without_root_detects() {
        let config = SdkConfig::default();
        assert!(config.detect);
        assert_eq!(SdkInventory::from_config(&config), SdkInventory::detect());
    }

    #[test]
    fn test_parse_java_version() {
        assert_eq!(
            parse_java_version("openjdk version \"17.0.9\" 2023-10-17\nOpenJDK Runtime"),
            Some(17)
        );
        assert_eq!(parse_java_version("java version \"1.8.0_392\""), Some(8));
        assert_eq!(parse_java_version("openjdk version \"21\" 2023-09-19"), Some(21));
        assert_eq!(parse_java_version("command not found"), None);
    }
}
