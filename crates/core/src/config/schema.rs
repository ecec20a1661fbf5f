//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// `[descriptor]` section
    #[serde(default)]
    pub descriptor: DescriptorConfig,

    /// `[sdk]` section
    #[serde(default)]
    pub sdk: SdkConfig,

    /// Framework property overrides, e.g. `"flutter.versionCode" = 3`
    #[serde(default)]
    pub properties: BTreeMap<String, toml::Value>,

    /// `[output]` section
    #[serde(default)]
    pub output: OutputConfig,
}

impl ConfigSchema {
    /// Property overrides rendered as plain strings
    pub fn property_overrides(&self) -> BTreeMap<String, String> {
        self.properties
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

/// Where the build descriptor and its companion files live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorConfig {
    /// Descriptor path used when none is given on the command line
    #[serde(default = "default_descriptor_path")]
    pub path: String,

    /// Framework properties file; defaults to `local.properties` next to the descriptor
    #[serde(default)]
    pub properties_file: Option<String>,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            path: default_descriptor_path(),
            properties_file: None,
        }
    }
}

fn default_descriptor_path() -> String {
    "droidspec.toml".to_string()
}

/// Android SDK inventory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    /// SDK root; `~` and `$VARS` are expanded
    #[serde(default)]
    pub sdk_root: Option<String>,

    /// Installed platform API levels to assume in addition to detected ones
    #[serde(default)]
    pub platforms: Vec<u32>,

    /// Installed NDK revisions to assume in addition to detected ones
    #[serde(default)]
    pub ndk_versions: Vec<String>,

    /// Installed JDK major version
    #[serde(default)]
    pub jdk: Option<u32>,

    /// Scan the SDK root and PATH for installed components
    #[serde(default = "default_true")]
    pub detect: bool,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            sdk_root: None,
            platforms: Vec::new(),
            ndk_versions: Vec::new(),
            jdk: None,
            detect: true,
        }
    }
}

impl SdkConfig {
    /// The configured SDK root with shell expansion applied
    pub fn expanded_sdk_root(&self) -> Option<PathBuf> {
        self.sdk_root.as_deref().map(|root| {
            let expanded = shellexpand::full(root)
                .map_or_else(|_| shellexpand::tilde(root), |s| s);
            PathBuf::from(expanded.as_ref())
        })
    }
}

/// Terminal output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Colorize terminal output
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

fn default_true() -> bool {
    true
}
