//! Framework-injected build properties
//!
//! The generated wrapper does not hard-code SDK levels or version numbers; it
//! reads them from the framework's Gradle plugin (`flutter.minSdkVersion`,
//! `flutter.versionCode`, ...). Values are layered: plugin defaults, then the
//! project's `local.properties`, then explicit overrides.

use crate::error::DescriptorError;
use std::collections::BTreeMap;
use std::path::Path;

/// Prefix shared by every framework property reference
pub const REFERENCE_PREFIX: &str = "flutter.";

/// Conventional properties file written by the framework tooling
pub const LOCAL_PROPERTIES: &str = "local.properties";

const DEFAULTS: [(&str, &str); 6] = [
    ("flutter.compileSdkVersion", "34"),
    ("flutter.minSdkVersion", "21"),
    ("flutter.targetSdkVersion", "34"),
    ("flutter.versionCode", "1"),
    ("flutter.versionName", "1.0.0"),
    ("flutter.ndkVersion", "26.3.11579264"),
];

/// Resolved framework property table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkProperties {
    values: BTreeMap<String, String>,
}

impl Default for FrameworkProperties {
    fn default() -> Self {
        Self::defaults()
    }
}

impl FrameworkProperties {
    /// The framework plugin's built-in defaults
    pub fn defaults() -> Self {
        Self {
            values: DEFAULTS
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// An empty table; every reference fails to resolve
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Layer `key=value` pairs from properties-file text over this table
    #[must_use]
    pub fn with_properties_text(mut self, text: &str) -> Self {
        self.values.extend(parse_properties(text));
        self
    }

    /// Layer a properties file over this table
    ///
    /// A missing file leaves the table unchanged.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read.
    pub fn with_properties_file(self, path: &Path) -> Result<Self, DescriptorError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no framework properties file");
            return Ok(self);
        }
        let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "layering framework properties");
        Ok(self.with_properties_text(&text))
    }

    /// Layer explicit overrides over this table
    #[must_use]
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.values
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Value of a property, if known
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Whether a descriptor value is a reference rather than a literal
pub fn is_reference(value: &str) -> bool {
    value.trim().starts_with(REFERENCE_PREFIX)
}

/// Parse Java properties text
///
/// Supports `key=value` and `key: value`, `#` and `!` comment lines, and
/// surrounding whitespace. Line continuations and escapes are not needed for
/// the keys the framework writes.
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let split = line.find(['=', ':'])?;
            let (key, value) = line.split_at(split);
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value[1..].trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let props = FrameworkProperties::defaults();
        assert_eq!(props.get("flutter.minSdkVersion"), Some("21"));
        assert_eq!(props.get("flutter.compileSdkVersion"), Some("34"));
        assert_eq!(props.get("flutter.unknown"), None);
    }

    #[test]
    fn test_parse_properties() {
        let parsed = parse_properties(
            "# generated\nsdk.dir=/opt/android\nflutter.versionCode = 12\n! note\nflutter.versionName: 2.0.1\n\nbroken line\n",
        );
        assert_eq!(parsed.get("sdk.dir").map(String::as_str), Some("/opt/android"));
        assert_eq!(parsed.get("flutter.versionCode").map(String::as_str), Some("12"));
        assert_eq!(parsed.get("flutter.versionName").map(String::as_str), Some("2.0.1"));
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn test_windows_paths_keep_colon() {
        let parsed = parse_properties("flutter.sdk=C:\\flutter\n");
        assert_eq!(parsed.get("flutter.sdk").map(String::as_str), Some("C:\\flutter"));
    }

    #[test]
    fn test_layering_precedence() {
        let props = FrameworkProperties::defaults()
            .with_properties_text("flutter.versionCode=5\nflutter.versionName=1.2.0")
            .with_overrides([("flutter.versionCode", "9")]);
        assert_eq!(props.get("flutter.versionCode"), Some("9"));
        assert_eq!(props.get("flutter.versionName"), Some("1.2.0"));
        assert_eq!(props.get("flutter.minSdkVersion"), Some("21"));
    }

    #[test]
    fn test_properties_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCAL_PROPERTIES);

        let untouched = FrameworkProperties::empty()
            .with_properties_file(&path)
            .unwrap();
        assert_eq!(untouched, FrameworkProperties::empty());

        std::fs::write(&path, "flutter.targetSdkVersion=33\n").unwrap();
        let props = FrameworkProperties::defaults()
            .with_properties_file(&path)
            .unwrap();
        assert_eq!(props.get("flutter.targetSdkVersion"), Some("33"));
    }

    #[test]
    fn test_is_reference() {
        assert!(is_reference("flutter.minSdkVersion"));
        assert!(!is_reference("21"));
        assert!(!is_reference("1.0.0"));
    }
}
