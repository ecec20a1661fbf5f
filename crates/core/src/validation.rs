//! Fluent validation that collects every failure
//!
//! A [`Validator`] never short-circuits: each check appends to the result so a
//! caller can report all problems in one pass.
//!
//! # Example
//!
//! ```rust
//! use droidspec_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("application identifier", "")
//!     .ordered("sdk ordering", "minSdk", 30, "targetSdk", 21)
//!     .validate();
//!
//! assert_eq!(result.errors().len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl ValidationError {
    /// Build an error with no expected/actual annotations
    pub fn new(field: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.to_string(),
            expected: None,
            actual: None,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Split into errors and warnings
    pub fn into_parts(self) -> (Vec<ValidationError>, Vec<ValidationError>) {
        (self.errors, self.warnings)
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    #[must_use]
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate a numeric range
    #[must_use]
    pub fn range<T: PartialOrd + Display>(mut self, field: &str, value: T, min: T, max: T) -> Self {
        if value < min || value > max {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("{value} must be between {min} and {max}"),
                code: "RANGE".to_string(),
                expected: Some(format!("{min} - {max}")),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate that `lower <= upper`
    #[must_use]
    pub fn ordered<T: PartialOrd + Display>(
        mut self,
        field: &str,
        lower_name: &str,
        lower: T,
        upper_name: &str,
        upper: T,
    ) -> Self {
        if lower > upper {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!(
                    "{lower_name} ({lower}) must not exceed {upper_name} ({upper})"
                ),
                code: "ORDERING".to_string(),
                expected: Some(format!("{lower_name} <= {upper_name}")),
                actual: Some(format!("{lower} > {upper}")),
            });
        }
        self
    }

    /// Add a custom validation
    #[must_use]
    pub fn custom<F>(mut self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(message) = f() {
            self.result
                .add_error(ValidationError::new(field, "CUSTOM", message));
        }
        self
    }

    /// Add a custom validation with its own error code
    #[must_use]
    pub fn check(mut self, field: &str, code: &str, failed: bool, message: impl Into<String>) -> Self {
        if failed {
            self.result.add_error(ValidationError::new(field, code, message));
        }
        self
    }

    /// Add a warning (non-blocking)
    #[must_use]
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result
                .add_warning(ValidationError::new(field, "WARNING", message));
        }
        self
    }

    /// Fold an externally built result into this validator
    #[must_use]
    pub fn extend(mut self, other: ValidationResult) -> Self {
        self.result.merge(other);
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_required_validation() {
        let result = Validator::new().required("name", "").validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "REQUIRED");
    }

    #[test]
    fn test_range_validation() {
        let result = Validator::new().range("count", 150, 1, 100).validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "RANGE");
    }

    #[test]
    fn test_ordered_validation() {
        let result = Validator::new()
            .ordered("sdk", "minSdk", 30, "targetSdk", 21)
            .validate();
        assert!(!result.is_valid());
        let err = &result.errors()[0];
        assert_eq!(err.code, "ORDERING");
        assert!(err.message.contains("minSdk (30)"));
        assert!(err.message.contains("targetSdk (21)"));
    }

    #[test]
    fn test_all_failures_collected() {
        let result = Validator::new()
            .required("a", " ")
            .range("b", 0, 1, 10)
            .ordered("c", "x", 2, "y", 1)
            .check("d", "CUSTOM_CODE", true, "bad")
            .validate();
        assert_eq!(result.errors().len(), 4);
        assert_eq!(result.errors()[3].code, "CUSTOM_CODE");
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let result = Validator::new()
            .warn_if("release", true, "signed with debug key")
            .validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_chained_validation() {
        let result = Validator::new()
            .required("name", "test")
            .range("len", 4, 2, 10)
            .validate();
        assert!(result.is_valid());
    }

    proptest! {
        #[test]
        fn ordered_accepts_exactly_non_decreasing_pairs(a in 0u32..100, b in 0u32..100) {
            let result = Validator::new().ordered("pair", "a", a, "b", b).validate();
            prop_assert_eq!(result.is_valid(), a <= b);
        }
    }
}
