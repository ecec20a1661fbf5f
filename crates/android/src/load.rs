//! Descriptor loading
//!
//! Loading happens in two steps. The persisted text is deserialized into a
//! loose mirror of the file where every field is optional; any syntax or type
//! error there is a [`DescriptorError::Parse`] and nothing is produced. The
//! mirror is then lifted into a [`Descriptor`], resolving framework property
//! references and collecting every missing field into one
//! [`DescriptorError::Validation`].

use crate::descriptor::{
    ApplicationId, AppVersion, BuildType, Dependency, DependencyConfiguration, Descriptor,
    DescriptorParts, JavaOptions, JavaVersion, NdkVersion, SdkVersions, SigningIdentity,
    SigningRef, DEFAULT_FLUTTER_SOURCE, TEMPLATE_PLUGINS,
};
use crate::error::{DescriptorError, Field, FieldIssue, IssueKind, Result};
use crate::properties::{is_reference, FrameworkProperties, LOCAL_PROPERTIES};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Persisted descriptor syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// Pick the format from a file extension; anything but `.json` is TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDescriptor {
    plugins: Option<Vec<String>>,
    #[serde(default)]
    android: RawAndroid,
    #[serde(default)]
    flutter: RawFlutter,
    #[serde(default)]
    dependencies: Vec<RawDependency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAndroid {
    namespace: Option<String>,
    compile_sdk: Option<RawValue>,
    ndk_version: Option<RawValue>,
    #[serde(default)]
    compile_options: RawCompileOptions,
    #[serde(default)]
    kotlin_options: RawKotlinOptions,
    #[serde(default)]
    default_config: RawDefaultConfig,
    #[serde(default)]
    signing_configs: BTreeMap<String, SigningIdentity>,
    #[serde(default)]
    build_types: BTreeMap<String, RawBuildType>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCompileOptions {
    source_compatibility: Option<JavaVersion>,
    target_compatibility: Option<JavaVersion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKotlinOptions {
    jvm_target: Option<JavaVersion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefaultConfig {
    application_id: Option<String>,
    min_sdk: Option<RawValue>,
    target_sdk: Option<RawValue>,
    version_code: Option<RawValue>,
    version_name: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBuildType {
    signing_config: Option<SigningRef>,
    #[serde(default)]
    minify_enabled: bool,
    #[serde(default)]
    shrink_resources: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFlutter {
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDependency {
    Notation(String),
    Declared(RawDeclaredDependency),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDeclaredDependency {
    #[serde(default)]
    configuration: DependencyConfiguration,
    coordinate: String,
}

/// A literal or a framework property reference
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(i64),
    Text(String),
}

/// Load a descriptor from text
///
/// # Errors
///
/// [`DescriptorError::Parse`] for malformed text, [`DescriptorError::Validation`]
/// when required fields are missing or unresolvable.
pub fn load_str(
    text: &str,
    format: Format,
    properties: &FrameworkProperties,
) -> Result<Descriptor> {
    load_named("<inline>", text, format, properties)
}

/// Load a descriptor from text, naming its origin in errors
///
/// # Errors
///
/// See [`load_str`].
pub fn load_named(
    origin: &str,
    text: &str,
    format: Format,
    properties: &FrameworkProperties,
) -> Result<Descriptor> {
    tracing::debug!(origin, ?format, "parsing descriptor");
    let raw = parse_raw(origin, text, format)?;
    let descriptor = lift(origin, raw, properties)?;
    tracing::debug!(
        origin,
        application_id = %descriptor.application_id(),
        dependencies = descriptor.dependencies().len(),
        "descriptor loaded"
    );
    Ok(descriptor)
}

/// Load a descriptor file; the format follows the file extension
///
/// # Errors
///
/// [`DescriptorError::Io`] when the file cannot be read, otherwise as [`load_str`].
pub fn load_file(path: &Path, properties: &FrameworkProperties) -> Result<Descriptor> {
    let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_named(
        &path.display().to_string(),
        &text,
        Format::from_path(path),
        properties,
    )
}

/// Framework defaults layered with the `local.properties` next to a descriptor
///
/// # Errors
///
/// Fails when the properties file exists but cannot be read.
pub fn properties_for(descriptor_path: &Path) -> Result<FrameworkProperties> {
    let dir = descriptor_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    FrameworkProperties::defaults().with_properties_file(&dir.join(LOCAL_PROPERTIES))
}

fn parse_raw(origin: &str, text: &str, format: Format) -> Result<RawDescriptor> {
    let parsed = match format {
        Format::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| DescriptorError::Parse {
        origin: origin.to_string(),
        message: message.trim().to_string(),
    })
}

fn lift(origin: &str, raw: RawDescriptor, properties: &FrameworkProperties) -> Result<Descriptor> {
    let mut issues = Vec::new();
    let android = raw.android;
    let defaults = android.default_config;

    let application_id = non_empty(defaults.application_id);
    if application_id.is_none() {
        issues.push(FieldIssue::missing(Field::ApplicationId));
    }

    let compile = resolve_number(Field::CompileSdk, android.compile_sdk, properties, &mut issues);
    let min = resolve_number(Field::MinSdk, defaults.min_sdk, properties, &mut issues);
    let target = resolve_number(Field::TargetSdk, defaults.target_sdk, properties, &mut issues);
    let code = resolve_number(Field::VersionCode, defaults.version_code, properties, &mut issues);
    let name = resolve_text(Field::VersionName, defaults.version_name, properties, &mut issues);
    let ndk = resolve_text(Field::NdkVersion, android.ndk_version, properties, &mut issues);

    let compile_options = android.compile_options;
    let jvm_target = android.kotlin_options.jvm_target;
    let target_level = compile_options
        .target_compatibility
        .or(compile_options.source_compatibility)
        .or(jvm_target);
    if target_level.is_none() {
        issues.push(FieldIssue::missing(Field::LanguageLevel));
    }

    let (
        Some(application_id),
        Some(compile),
        Some(min),
        Some(target),
        Some(code),
        Some(name),
        Some(ndk),
        Some(target_level),
    ) = (application_id, compile, min, target, code, name, ndk, target_level)
    else {
        return Err(DescriptorError::Validation {
            origin: origin.to_string(),
            issues,
        });
    };

    let java = JavaOptions {
        source: compile_options.source_compatibility.unwrap_or(target_level),
        target: target_level,
        jvm_target: jvm_target.unwrap_or(target_level),
    };

    let application_id = ApplicationId::new(application_id);
    let namespace = non_empty(android.namespace)
        .map_or_else(|| application_id.clone(), ApplicationId::new);

    Ok(Descriptor::from_parts(DescriptorParts {
        plugins: raw
            .plugins
            .unwrap_or_else(|| TEMPLATE_PLUGINS.iter().map(ToString::to_string).collect()),
        application_id,
        namespace,
        sdk: SdkVersions {
            compile,
            min,
            target,
        },
        version: AppVersion { code, name },
        ndk_version: NdkVersion::new(ndk),
        java,
        signing_configs: signing_configs(origin, android.signing_configs)?,
        build_types: build_types(android.build_types),
        flutter_source: non_empty(raw.flutter.source)
            .unwrap_or_else(|| DEFAULT_FLUTTER_SOURCE.to_string()),
        dependencies: raw.dependencies.into_iter().map(dependency).collect(),
    }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_number(
    field: Field,
    raw: Option<RawValue>,
    properties: &FrameworkProperties,
    issues: &mut Vec<FieldIssue>,
) -> Option<u32> {
    let outcome = match raw {
        None => Err(IssueKind::Missing),
        Some(RawValue::Number(n)) => u32::try_from(n)
            .map_err(|_| IssueKind::Invalid(format!("{n} is not a valid non-negative number"))),
        Some(RawValue::Text(text)) => {
            let text = text.trim();
            if is_reference(text) {
                match properties.get(text) {
                    Some(value) => value.trim().parse().map_err(|_| {
                        IssueKind::Invalid(format!(
                            "property '{text}' has non-numeric value '{value}'"
                        ))
                    }),
                    None => Err(IssueKind::Unresolved(text.to_string())),
                }
            } else if text.is_empty() {
                Err(IssueKind::Missing)
            } else {
                text.parse().map_err(|_| {
                    IssueKind::Invalid(format!(
                        "'{text}' is neither a number nor a flutter.* property reference"
                    ))
                })
            }
        }
    };
    outcome.map_err(|kind| issues.push(FieldIssue { field, kind })).ok()
}

fn resolve_text(
    field: Field,
    raw: Option<RawValue>,
    properties: &FrameworkProperties,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    let outcome = match raw {
        None => Err(IssueKind::Missing),
        Some(RawValue::Number(n)) => Ok(n.to_string()),
        Some(RawValue::Text(text)) => {
            let text = text.trim();
            if is_reference(text) {
                properties
                    .get(text)
                    .map(|value| value.trim().to_string())
                    .ok_or_else(|| IssueKind::Unresolved(text.to_string()))
            } else if text.is_empty() {
                Err(IssueKind::Missing)
            } else {
                Ok(text.to_string())
            }
        }
    };
    outcome.map_err(|kind| issues.push(FieldIssue { field, kind })).ok()
}

fn signing_configs(
    origin: &str,
    raw: BTreeMap<String, SigningIdentity>,
) -> Result<BTreeMap<SigningRef, SigningIdentity>> {
    let mut configs = BTreeMap::new();
    configs.insert(SigningRef::Debug, SigningIdentity::default());
    for (name, identity) in raw {
        let reference = match name.as_str() {
            "debug" => SigningRef::Debug,
            "release" => SigningRef::Release,
            other => {
                return Err(DescriptorError::Parse {
                    origin: origin.to_string(),
                    message: format!(
                        "unknown signing config '{other}' in android.signing_configs, expected `debug` or `release`"
                    ),
                });
            }
        };
        configs.insert(reference, identity);
    }
    Ok(configs)
}

fn build_types(raw: BTreeMap<String, RawBuildType>) -> BTreeMap<String, BuildType> {
    let mut types: BTreeMap<String, BuildType> = raw
        .into_iter()
        .map(|(name, bt)| {
            (
                name,
                BuildType {
                    signing_config: bt.signing_config.unwrap_or(SigningRef::Debug),
                    minify_enabled: bt.minify_enabled,
                    shrink_resources: bt.shrink_resources,
                },
            )
        })
        .collect();
    // The generated template signs release builds with the debug key.
    types.entry("release".to_string()).or_default();
    types
}

fn dependency(raw: RawDependency) -> Dependency {
    match raw {
        RawDependency::Notation(notation) => {
            Dependency::new(DependencyConfiguration::Implementation, notation.trim())
        }
        RawDependency::Declared(declared) => {
            Dependency::new(declared.configuration, declared.coordinate.trim())
        }
    }
}
