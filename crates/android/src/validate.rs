//! Cross-field validation
//!
//! Every constraint is checked on every call; the resulting error lists all
//! violations so they can be fixed in one pass.

use crate::descriptor::{
    Coordinate, Descriptor, SigningRef, Unvalidated, Validated, APPLICATION_PLUGIN,
};
use crate::error::{DescriptorError, Result};
use crate::sdk::SdkInventory;
use droidspec_core::validation::{ValidationResult, Validator};
use std::collections::HashSet;

/// Highest version code the Play Store accepts
pub const MAX_VERSION_CODE: u32 = 2_100_000_000;

impl Descriptor<Unvalidated> {
    /// Check every constraint and move to the validated state
    ///
    /// Warnings are logged and do not fail validation.
    ///
    /// # Errors
    ///
    /// [`DescriptorError::Configuration`] listing every violated constraint.
    pub fn validate(self, inventory: &SdkInventory) -> Result<Descriptor<Validated>> {
        let (errors, warnings) = self.check(inventory).into_parts();

        for warning in &warnings {
            tracing::warn!(field = %warning.field, "{}", warning.message);
        }

        if errors.is_empty() {
            tracing::debug!(application_id = %self.application_id(), "descriptor validated");
            Ok(self.into_validated())
        } else {
            tracing::debug!(violations = errors.len(), "descriptor rejected");
            Err(DescriptorError::Configuration { violations: errors })
        }
    }
}

impl<S> Descriptor<S> {
    /// Run every constraint without changing state
    pub fn check(&self, inventory: &SdkInventory) -> ValidationResult {
        let sdk = self.sdk();
        let java = self.java();
        let ndk = self.ndk_version();

        let mut validator = Validator::new()
            .ordered("sdk ordering", "minSdk", sdk.min, "targetSdk", sdk.target)
            .ordered("sdk ordering", "targetSdk", sdk.target, "compileSdk", sdk.compile)
            .check(
                "applicationId",
                "REVERSE_DOMAIN",
                !self.application_id().is_reverse_domain(),
                format!(
                    "'{}' is not a reverse-domain identifier like com.example.app",
                    self.application_id()
                ),
            )
            .check(
                "namespace",
                "REVERSE_DOMAIN",
                !self.namespace().is_reverse_domain(),
                format!(
                    "'{}' is not a reverse-domain identifier like com.example.app",
                    self.namespace()
                ),
            )
            .range("versionCode", self.version().code, 1, MAX_VERSION_CODE)
            .check(
                "versionName",
                "SEMVER",
                semver::Version::parse(&self.version().name).is_err(),
                format!(
                    "'{}' is not a semantic version like 1.2.3",
                    self.version().name
                ),
            )
            .check(
                "ndkVersion",
                "NDK_REVISION",
                ndk.components().is_none(),
                format!("'{ndk}' is not an NDK revision like 27.0.12077973"),
            )
            .check(
                "ndkVersion",
                "NOT_INSTALLED",
                inventory.has_ndk(ndk.as_str()) == Some(false),
                format!("NDK {ndk} is not installed"),
            )
            .check(
                "compileSdk",
                "NOT_INSTALLED",
                inventory.has_platform(sdk.compile) == Some(false),
                format!("SDK platform android-{} is not installed", sdk.compile),
            )
            .ordered(
                "compileOptions",
                "sourceCompatibility",
                java.source,
                "targetCompatibility",
                java.target,
            )
            .check(
                "kotlinOptions.jvmTarget",
                "JVM_TARGET",
                java.jvm_target != java.target,
                format!(
                    "jvmTarget {} must equal targetCompatibility {}",
                    java.jvm_target, java.target
                ),
            )
            .check(
                "compileOptions.targetCompatibility",
                "NOT_INSTALLED",
                inventory.jdk.is_some_and(|jdk| java.target.major() > jdk),
                format!(
                    "targetCompatibility {} needs a newer JDK than the installed {}",
                    java.target,
                    inventory.jdk.unwrap_or_default()
                ),
            )
            .check(
                "plugins",
                "MISSING_PLUGIN",
                !self.plugins().iter().any(|p| p == APPLICATION_PLUGIN),
                format!("the {APPLICATION_PLUGIN} plugin must be applied"),
            );

        validator = validator.extend(self.check_signing());
        validator = validator.extend(self.check_dependencies());
        validator.validate()
    }

    fn check_signing(&self) -> ValidationResult {
        let mut validator = Validator::new();
        let declared = self.signing_configs();

        for (name, build_type) in self.build_types() {
            let field = format!("buildTypes.{name}.signingConfig");
            validator = validator.check(
                &field,
                "UNDECLARED_SIGNING",
                !declared.contains_key(&build_type.signing_config),
                format!(
                    "references signing config '{}' which is not declared in signingConfigs",
                    build_type.signing_config
                ),
            );
            validator = validator.warn_if(
                &field,
                name == "release" && build_type.signing_config == SigningRef::Debug,
                "release builds are signed with the debug key",
            );
        }

        if let Some(release) = declared.get(&SigningRef::Release) {
            validator = validator
                .check(
                    "signingConfigs.release.storeFile",
                    "REQUIRED",
                    release.store_file.is_none(),
                    "a release signing config needs a store_file",
                )
                .required(
                    "signingConfigs.release.keyAlias",
                    release.key_alias.as_deref().unwrap_or_default(),
                );
        }

        validator.validate()
    }

    fn check_dependencies(&self) -> ValidationResult {
        let mut validator = Validator::new();
        let mut seen = HashSet::new();

        for (index, dependency) in self.dependencies().iter().enumerate() {
            let field = format!("dependencies[{index}]");
            let coordinate = dependency.notation.parse::<Coordinate>();
            validator = validator.custom(&field, || coordinate.as_ref().err().cloned());
            // A coordinate counts once whatever configuration declares it.
            if let Ok(coordinate) = coordinate {
                let message = format!("{coordinate} is declared more than once");
                validator = validator.check(&field, "DUPLICATE", !seen.insert(coordinate), message);
            }
        }

        validator.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::tests::{literal, TEMPLATE};
    use crate::load::{load_str, Format};
    use crate::properties::FrameworkProperties;
    use proptest::prelude::*;

    fn load(text: &str) -> Descriptor {
        load_str(text, Format::Toml, &FrameworkProperties::defaults()).unwrap()
    }

    fn codes(err: &DescriptorError) -> Vec<&str> {
        err.violations().iter().map(|v| v.code.as_str()).collect()
    }

    #[test]
    fn test_ordered_versions_validate() {
        let validated = load(&literal(21, 30, 34))
            .validate(&SdkInventory::empty())
            .unwrap();
        let sdk = validated.sdk();
        assert_eq!((sdk.min, sdk.target, sdk.compile), (21, 30, 34));
    }

    #[test]
    fn test_min_above_target_is_rejected() {
        let err = load(&literal(30, 21, 34))
            .validate(&SdkInventory::empty())
            .unwrap_err();
        assert!(matches!(err, DescriptorError::Configuration { .. }));
        assert_eq!(err.violations().len(), 1);
        let violation = &err.violations()[0];
        assert_eq!(violation.code, "ORDERING");
        assert!(violation.message.contains("minSdk (30)"));
        assert!(violation.message.contains("targetSdk (21)"));
    }

    #[test]
    fn test_target_above_compile_is_rejected() {
        let err = load(&literal(21, 35, 34))
            .validate(&SdkInventory::empty())
            .unwrap_err();
        assert!(err.violations()[0].message.contains("compileSdk (34)"));
    }

    #[test]
    fn test_template_validates_with_debug_signing_warning() {
        let descriptor = load(TEMPLATE);
        let result = descriptor.check(&SdkInventory::empty());
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
        assert!(descriptor.validate(&SdkInventory::empty()).is_ok());
    }

    #[test]
    fn test_every_violation_is_reported() {
        let text = literal(30, 21, 20)
            .replace("dev.droidspec.sample", "sample")
            .replace("\"1.4.0\"", "\"one\"")
            .replace("27.0.12077973", "r27")
            .replace("version_code = 4", "version_code = 0");
        let err = load(&text).validate(&SdkInventory::empty()).unwrap_err();
        assert_eq!(
            codes(&err),
            vec![
                "ORDERING",
                "ORDERING",
                "REVERSE_DOMAIN",
                "REVERSE_DOMAIN",
                "RANGE",
                "SEMVER",
                "NDK_REVISION",
            ]
        );
    }

    #[test]
    fn test_inventory_checks() {
        let inventory = SdkInventory::empty()
            .with_platform(33)
            .with_ndk("26.3.11579264")
            .with_jdk(11);
        let err = load(&literal(21, 30, 34)).validate(&inventory).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["ndkVersion", "compileSdk", "compileOptions.targetCompatibility"]
        );

        let installed = SdkInventory::empty()
            .with_platform(34)
            .with_ndk("27.0.12077973")
            .with_jdk(17);
        assert!(load(&literal(21, 30, 34)).validate(&installed).is_ok());
    }

    #[test]
    fn test_jvm_target_must_match() {
        let text = format!(
            "{}\n[android.kotlin_options]\njvm_target = \"11\"\n",
            literal(21, 30, 34)
        );
        let err = load(&text).validate(&SdkInventory::empty()).unwrap_err();
        assert_eq!(codes(&err), vec!["JVM_TARGET"]);
    }

    #[test]
    fn test_source_above_target_compatibility() {
        let text = literal(21, 30, 34).replace(
            "target_compatibility = 17",
            "target_compatibility = 17\nsource_compatibility = 21",
        );
        let err = load(&text).validate(&SdkInventory::empty()).unwrap_err();
        assert_eq!(err.violations()[0].field, "compileOptions");
    }

    #[test]
    fn test_undeclared_release_signing() {
        let text = format!(
            "{}\n[android.build_types.release]\nsigning_config = \"release\"\n",
            literal(21, 30, 34)
        );
        let err = load(&text).validate(&SdkInventory::empty()).unwrap_err();
        assert_eq!(codes(&err), vec!["UNDECLARED_SIGNING"]);
        assert_eq!(err.violations()[0].field, "buildTypes.release.signingConfig");
    }

    #[test]
    fn test_incomplete_release_identity() {
        let text = format!(
            "{}\n[android.signing_configs.release]\nkey_alias = \" \"\n\n[android.build_types.release]\nsigning_config = \"release\"\n",
            literal(21, 30, 34)
        );
        let err = load(&text).validate(&SdkInventory::empty()).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["signingConfigs.release.storeFile", "signingConfigs.release.keyAlias"]
        );
    }

    #[test]
    fn test_missing_application_plugin() {
        let text = format!("plugins = [\"kotlin-android\"]\n{}", literal(21, 30, 34));
        let err = load(&text).validate(&SdkInventory::empty()).unwrap_err();
        assert_eq!(codes(&err), vec!["MISSING_PLUGIN"]);
    }

    #[test]
    fn test_dependency_checks() {
        let text = format!(
            "dependencies = [\"androidx.core:core-ktx:1.13.1\", \"androidx.core:core-ktx:1.13.1\", \"not-a-coordinate\"]\n{}",
            literal(21, 30, 34)
        );
        let err = load(&text).validate(&SdkInventory::empty()).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["dependencies[1]", "dependencies[2]"]);
        assert_eq!(codes(&err), vec!["DUPLICATE", "CUSTOM"]);
    }

    #[test]
    fn test_duplicate_coordinate_across_configurations() {
        let text = format!(
            r#"dependencies = [
    "androidx.core:core-ktx:1.13.1",
    {{ configuration = "api", coordinate = "androidx.core:core-ktx:1.13.1" }},
    {{ configuration = "testImplementation", coordinate = "junit:junit:4.13.2" }},
]
{}"#,
            literal(21, 30, 34)
        );
        let err = load(&text).validate(&SdkInventory::empty()).unwrap_err();
        assert_eq!(codes(&err), vec!["DUPLICATE"]);
        assert_eq!(err.violations()[0].field, "dependencies[1]");
        assert!(err.violations()[0]
            .message
            .contains("androidx.core:core-ktx:1.13.1 is declared more than once"));
    }

    proptest! {
        #[test]
        fn validated_descriptors_keep_sdk_ordering(
            min in 1u32..40,
            target in 1u32..40,
            compile in 1u32..40,
        ) {
            let outcome = load(&literal(min, target, compile)).validate(&SdkInventory::empty());
            match outcome {
                Ok(validated) => {
                    let sdk = validated.sdk();
                    prop_assert!(sdk.min <= sdk.target && sdk.target <= sdk.compile);
                }
                Err(err) => {
                    prop_assert!(min > target || target > compile);
                    prop_assert!(err.violations().iter().all(|v| v.code == "ORDERING"));
                }
            }
        }
    }
}
