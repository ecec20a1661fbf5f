//! Error types for descriptor loading and validation.

use droidspec_core::error::{Error as CoreError, ErrorCode};
use droidspec_core::validation::ValidationError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for descriptor operations.
pub type Result<T> = std::result::Result<T, DescriptorError>;

/// A cross-field constraint that does not hold.
pub type Violation = ValidationError;

/// Required descriptor fields, named the way users think of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ApplicationId,
    CompileSdk,
    MinSdk,
    TargetSdk,
    VersionCode,
    VersionName,
    NdkVersion,
    LanguageLevel,
}

impl Field {
    /// Human-readable field name
    pub fn label(self) -> &'static str {
        match self {
            Self::ApplicationId => "application identifier",
            Self::CompileSdk => "compile target version",
            Self::MinSdk => "minimum supported version",
            Self::TargetSdk => "target version",
            Self::VersionCode => "version code",
            Self::VersionName => "version name",
            Self::NdkVersion => "native toolchain version",
            Self::LanguageLevel => "language compatibility level",
        }
    }

    /// Key path in the persisted descriptor
    pub fn key(self) -> &'static str {
        match self {
            Self::ApplicationId => "android.default_config.application_id",
            Self::CompileSdk => "android.compile_sdk",
            Self::MinSdk => "android.default_config.min_sdk",
            Self::TargetSdk => "android.default_config.target_sdk",
            Self::VersionCode => "android.default_config.version_code",
            Self::VersionName => "android.default_config.version_name",
            Self::NdkVersion => "android.ndk_version",
            Self::LanguageLevel => "android.compile_options.target_compatibility",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.key())
    }
}

/// Why a required field could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The field is absent
    Missing,
    /// The field references a framework property that is not defined
    Unresolved(String),
    /// The field is present but its value cannot be used
    Invalid(String),
}

/// A required field that is missing or unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: Field,
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn missing(field: Field) -> Self {
        Self {
            field,
            kind: IssueKind::Missing,
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "missing required field: {}", self.field),
            IssueKind::Unresolved(reference) => write!(
                f,
                "{} references undefined property '{reference}'",
                self.field
            ),
            IssueKind::Invalid(reason) => write!(f, "{}: {reason}", self.field),
        }
    }
}

/// Errors that can occur while loading, validating or using a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Malformed structure or wrongly typed values
    #[error("Parse error in {origin}: {message}")]
    Parse { origin: String, message: String },

    /// Required fields missing or unresolvable
    #[error("Invalid descriptor {origin}: {}", join(.issues))]
    Validation {
        origin: String,
        issues: Vec<FieldIssue>,
    },

    /// Cross-field constraints violated; lists every violation
    #[error("{} constraint violation(s): {}", .violations.len(), join(.violations))]
    Configuration { violations: Vec<Violation> },

    /// The descriptor or a companion file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendering the build file failed
    #[error("Render error: {0}")]
    Render(String),

    /// The external resolver could not resolve a dependency
    #[error("Failed to resolve {notation}: {message}")]
    Resolve { notation: String, message: String },
}

impl DescriptorError {
    /// Missing or unresolvable fields, if this is a validation error
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            Self::Validation { issues, .. } => issues,
            _ => &[],
        }
    }

    /// Constraint violations, if this is a configuration error
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Configuration { violations } => violations,
            _ => &[],
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<DescriptorError> for CoreError {
    fn from(err: DescriptorError) -> Self {
        match err {
            DescriptorError::Parse { origin, message } => {
                CoreError::new(ErrorCode::ParseError, format!("Malformed descriptor {origin}"))
                    .with_details([message])
                    .with_suggestion("Fix the syntax error; nothing was loaded from this file")
            }
            DescriptorError::Validation { origin, issues } => CoreError::new(
                ErrorCode::IncompleteDescriptor,
                format!("Descriptor {origin} is missing required values"),
            )
            .with_details(issues.iter().map(ToString::to_string))
            .with_suggestion(
                "Declare the listed fields, or define the referenced properties in local.properties",
            ),
            DescriptorError::Configuration { violations } => CoreError::new(
                ErrorCode::ConstraintViolation,
                format!("{} constraint violation(s)", violations.len()),
            )
            .with_details(violations.iter().map(ToString::to_string)),
            DescriptorError::Io { path, source } => {
                let code = if source.kind() == std::io::ErrorKind::NotFound {
                    ErrorCode::FileNotFound
                } else {
                    ErrorCode::IoError
                };
                CoreError::new(code, format!("Failed to read {}", path.display())).with_source(source)
            }
            DescriptorError::Render(message) => CoreError::new(ErrorCode::TemplateError, message),
            DescriptorError::Resolve { notation, message } => CoreError::new(
                ErrorCode::DependencyResolution,
                format!("Failed to resolve {notation}"),
            )
            .with_details([message]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidspec_core::error::exit_codes;

    #[test]
    fn test_field_issue_display() {
        let issue = FieldIssue::missing(Field::ApplicationId);
        assert_eq!(
            issue.to_string(),
            "missing required field: application identifier (android.default_config.application_id)"
        );

        let unresolved = FieldIssue {
            field: Field::MinSdk,
            kind: IssueKind::Unresolved("flutter.minSdk".to_string()),
        };
        assert!(unresolved.to_string().contains("undefined property 'flutter.minSdk'"));
    }

    #[test]
    fn test_validation_error_lists_every_field() {
        let err = DescriptorError::Validation {
            origin: "droidspec.toml".to_string(),
            issues: vec![
                FieldIssue::missing(Field::ApplicationId),
                FieldIssue::missing(Field::VersionName),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("application identifier"));
        assert!(text.contains("version name"));
        assert_eq!(err.issues().len(), 2);
        assert!(err.violations().is_empty());
    }

    #[test]
    fn test_conversion_to_core_error() {
        let parse: CoreError = DescriptorError::Parse {
            origin: "x".to_string(),
            message: "expected `=`".to_string(),
        }
        .into();
        assert_eq!(parse.code, ErrorCode::ParseError);
        assert_eq!(parse.exit_code(), exit_codes::CONFIG_ERROR);

        let config: CoreError = DescriptorError::Configuration {
            violations: vec![Violation::new("sdk", "ORDERING", "min exceeds target")],
        }
        .into();
        assert_eq!(config.code, ErrorCode::ConstraintViolation);
        assert_eq!(config.exit_code(), exit_codes::VALIDATION_ERROR);
        assert_eq!(config.details, vec!["sdk: min exceeds target".to_string()]);
    }
}
