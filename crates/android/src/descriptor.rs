//! Build configuration descriptor
//!
//! The descriptor is the parsed form of one Android application build file.
//! It is immutable once loaded: fields are private and only exposed through
//! accessors. The single state transition, unvalidated to validated, is
//! encoded in the type parameter and performed by
//! [`Descriptor::validate`](crate::validate).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;

/// Plugin id every application build must apply
pub const APPLICATION_PLUGIN: &str = "com.android.application";

/// Plugins applied by the generated wrapper template
pub const TEMPLATE_PLUGINS: [&str; 3] = [
    APPLICATION_PLUGIN,
    "kotlin-android",
    "dev.flutter.flutter-gradle-plugin",
];

/// Default location of the framework project relative to the app module
pub const DEFAULT_FLUTTER_SOURCE: &str = "../..";

/// Marker: loaded, constraints not yet checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unvalidated;

/// Marker: every cross-field constraint holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Validated;

/// Reverse-domain application identifier, e.g. `com.example.app`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Wrap a raw identifier; shape is checked during validation
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier has the reverse-domain shape
    ///
    /// At least two dot-separated segments, each starting with an ASCII letter
    /// and continuing with ASCII letters, digits or underscores.
    pub fn is_reverse_domain(&self) -> bool {
        let segments: Vec<&str> = self.0.split('.').collect();
        segments.len() >= 2
            && segments.iter().all(|segment| {
                let mut chars = segment.chars();
                chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            })
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// NDK revision, e.g. `27.0.12077973`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NdkVersion(String);

impl NdkVersion {
    /// Wrap a raw revision string
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// The revision text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric `(major, minor, build)` components, if well-formed
    ///
    /// Accepts an optional pre-release suffix after the build number
    /// (`26.0.10404224-beta1`).
    pub fn components(&self) -> Option<(u32, u32, u64)> {
        let core = self.0.split('-').next()?;
        let mut parts = core.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let build = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((major, minor, build))
    }
}

impl fmt::Display for NdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Java language compatibility level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "JavaVersionRepr", into = "String")]
pub enum JavaVersion {
    /// Java 8 (`1.8`)
    V1_8,
    /// Java 11
    V11,
    /// Java 17
    V17,
    /// Java 21
    V21,
}

impl JavaVersion {
    /// All supported levels, lowest first
    pub const ALL: [JavaVersion; 4] = [Self::V1_8, Self::V11, Self::V17, Self::V21];

    /// Feature release number (8, 11, 17, 21)
    pub fn major(self) -> u32 {
        match self {
            Self::V1_8 => 8,
            Self::V11 => 11,
            Self::V17 => 17,
            Self::V21 => 21,
        }
    }

    /// Gradle `JavaVersion` constant name
    pub fn gradle_constant(self) -> &'static str {
        match self {
            Self::V1_8 => "VERSION_1_8",
            Self::V11 => "VERSION_11",
            Self::V17 => "VERSION_17",
            Self::V21 => "VERSION_21",
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1_8 => f.write_str("1.8"),
            other => write!(f, "{}", other.major()),
        }
    }
}

impl FromStr for JavaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed
            .strip_prefix("JavaVersion.")
            .unwrap_or(trimmed)
            .trim_start_matches("VERSION_")
            .replace('_', ".");
        match bare.as_str() {
            "1.8" | "8" => Ok(Self::V1_8),
            "11" => Ok(Self::V11),
            "17" => Ok(Self::V17),
            "21" => Ok(Self::V21),
            _ => Err(format!(
                "unsupported language compatibility level '{trimmed}' (expected 1.8, 11, 17 or 21)"
            )),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JavaVersionRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<JavaVersionRepr> for JavaVersion {
    type Error = String;

    fn try_from(repr: JavaVersionRepr) -> Result<Self, Self::Error> {
        match repr {
            JavaVersionRepr::Number(n) => n.to_string().parse(),
            JavaVersionRepr::Text(s) => s.parse(),
        }
    }
}

impl From<JavaVersion> for String {
    fn from(version: JavaVersion) -> Self {
        version.to_string()
    }
}

/// Named signing identity a build type can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningRef {
    /// The SDK-provided debug keystore; always declared
    Debug,
    /// A release keystore that must be declared explicitly
    Release,
}

impl SigningRef {
    /// Name used in the build file
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

impl fmt::Display for SigningRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keystore details of a signing identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningIdentity {
    /// Keystore file, relative to the app module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_file: Option<PathBuf>,
    /// Key alias inside the keystore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_alias: Option<String>,
    /// Environment variable holding the store password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_password_env: Option<String>,
    /// Environment variable holding the key password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_password_env: Option<String>,
}

/// Per-build-type settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildType {
    /// Signing identity this build type is signed with
    pub signing_config: SigningRef,
    /// Enable code shrinking
    pub minify_enabled: bool,
    /// Enable resource shrinking
    pub shrink_resources: bool,
}

impl Default for BuildType {
    fn default() -> Self {
        Self {
            signing_config: SigningRef::Debug,
            minify_enabled: false,
            shrink_resources: false,
        }
    }
}

/// Gradle dependency configuration a dependency is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyConfiguration {
    #[default]
    Implementation,
    Api,
    CompileOnly,
    RuntimeOnly,
    TestImplementation,
    AndroidTestImplementation,
}

impl DependencyConfiguration {
    /// Name used in the build file
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Implementation => "implementation",
            Self::Api => "api",
            Self::CompileOnly => "compileOnly",
            Self::RuntimeOnly => "runtimeOnly",
            Self::TestImplementation => "testImplementation",
            Self::AndroidTestImplementation => "androidTestImplementation",
        }
    }
}

impl fmt::Display for DependencyConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maven coordinate `group:artifact:version[:classifier]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
}

impl Coordinate {
    /// `group:artifact`, the module part of the coordinate
    pub fn module(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl FromStr for Coordinate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if !(3..=4).contains(&parts.len()) || parts.iter().any(|p| p.trim().is_empty()) {
            return Err(format!(
                "'{s}' is not a group:artifact:version coordinate"
            ));
        }
        if parts.iter().any(|p| p.chars().any(char::is_whitespace)) {
            return Err(format!("'{s}' contains whitespace"));
        }
        Ok(Self {
            group: parts[0].to_string(),
            artifact: parts[1].to_string(),
            version: parts[2].to_string(),
            classifier: parts.get(3).map(ToString::to_string),
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// One declared dependency, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    /// Configuration the dependency belongs to
    pub configuration: DependencyConfiguration,
    /// Dependency notation as written
    pub notation: String,
}

impl Dependency {
    /// Create a dependency entry
    pub fn new(configuration: DependencyConfiguration, notation: impl Into<String>) -> Self {
        Self {
            configuration,
            notation: notation.into(),
        }
    }

    /// Parsed coordinate, if the notation is well-formed
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.notation.parse().ok()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(\"{}\")", self.configuration, self.notation)
    }
}

/// SDK API levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SdkVersions {
    /// Compile target version (`compileSdk`)
    pub compile: u32,
    /// Minimum supported version (`minSdk`)
    pub min: u32,
    /// Target version (`targetSdk`)
    pub target: u32,
}

/// Release version of the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppVersion {
    /// Monotonic release number (`versionCode`)
    pub code: u32,
    /// Human-readable version (`versionName`)
    pub name: String,
}

/// Java and Kotlin compile options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JavaOptions {
    /// `sourceCompatibility`
    pub source: JavaVersion,
    /// `targetCompatibility`
    pub target: JavaVersion,
    /// Kotlin `jvmTarget`
    pub jvm_target: JavaVersion,
}

/// The parsed build configuration descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor<S = Unvalidated> {
    plugins: Vec<String>,
    application_id: ApplicationId,
    namespace: ApplicationId,
    sdk: SdkVersions,
    version: AppVersion,
    ndk_version: NdkVersion,
    java: JavaOptions,
    signing_configs: BTreeMap<SigningRef, SigningIdentity>,
    build_types: BTreeMap<String, BuildType>,
    flutter_source: String,
    dependencies: Vec<Dependency>,
    #[serde(skip)]
    state: PhantomData<S>,
}

/// Everything needed to assemble a descriptor; used by the loader
#[derive(Debug, Clone)]
pub(crate) struct DescriptorParts {
    pub plugins: Vec<String>,
    pub application_id: ApplicationId,
    pub namespace: ApplicationId,
    pub sdk: SdkVersions,
    pub version: AppVersion,
    pub ndk_version: NdkVersion,
    pub java: JavaOptions,
    pub signing_configs: BTreeMap<SigningRef, SigningIdentity>,
    pub build_types: BTreeMap<String, BuildType>,
    pub flutter_source: String,
    pub dependencies: Vec<Dependency>,
}

impl Descriptor<Unvalidated> {
    pub(crate) fn from_parts(parts: DescriptorParts) -> Self {
        Self {
            plugins: parts.plugins,
            application_id: parts.application_id,
            namespace: parts.namespace,
            sdk: parts.sdk,
            version: parts.version,
            ndk_version: parts.ndk_version,
            java: parts.java,
            signing_configs: parts.signing_configs,
            build_types: parts.build_types,
            flutter_source: parts.flutter_source,
            dependencies: parts.dependencies,
            state: PhantomData,
        }
    }

    pub(crate) fn into_validated(self) -> Descriptor<Validated> {
        Descriptor {
            plugins: self.plugins,
            application_id: self.application_id,
            namespace: self.namespace,
            sdk: self.sdk,
            version: self.version,
            ndk_version: self.ndk_version,
            java: self.java,
            signing_configs: self.signing_configs,
            build_types: self.build_types,
            flutter_source: self.flutter_source,
            dependencies: self.dependencies,
            state: PhantomData,
        }
    }
}

impl<S> Descriptor<S> {
    /// Applied Gradle plugin ids, in order
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    /// Application identifier (`applicationId`)
    pub fn application_id(&self) -> &ApplicationId {
        &self.application_id
    }

    /// Code namespace; defaults to the application identifier
    pub fn namespace(&self) -> &ApplicationId {
        &self.namespace
    }

    /// Compile, minimum and target SDK levels
    pub fn sdk(&self) -> SdkVersions {
        self.sdk
    }

    /// Version code and name
    pub fn version(&self) -> &AppVersion {
        &self.version
    }

    /// Native toolchain version
    pub fn ndk_version(&self) -> &NdkVersion {
        &self.ndk_version
    }

    /// Language compatibility levels
    pub fn java(&self) -> JavaOptions {
        self.java
    }

    /// Declared signing identities; `debug` is always present
    pub fn signing_configs(&self) -> &BTreeMap<SigningRef, SigningIdentity> {
        &self.signing_configs
    }

    /// Build types by name
    pub fn build_types(&self) -> &BTreeMap<String, BuildType> {
        &self.build_types
    }

    /// Signing reference of the release build
    pub fn signing_ref(&self) -> SigningRef {
        self.build_types
            .get("release")
            .map_or(SigningRef::Debug, |bt| bt.signing_config)
    }

    /// Framework project location relative to the app module
    pub fn flutter_source(&self) -> &str {
        &self.flutter_source
    }

    /// Declared dependencies in declaration order
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }
}
