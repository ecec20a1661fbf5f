//! Dependency resolution hand-off
//!
//! The descriptor only declares dependencies. Resolving them is the job of an
//! external resolver; this module hands each declared dependency over, in
//! declaration order, and collects what came back.

use crate::descriptor::{Dependency, Descriptor, Validated};
use crate::error::DescriptorError;
use droidspec_core::process::{run_command, run_command_in_dir};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Something that can resolve a declared dependency
pub trait DependencyResolver {
    /// Resolve one dependency to a human-readable location or version
    ///
    /// # Errors
    ///
    /// [`DescriptorError::Resolve`] when the dependency cannot be resolved.
    fn resolve(&self, dependency: &Dependency) -> Result<String, DescriptorError>;
}

/// Outcome for one declared dependency
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionOutcome {
    pub dependency: Dependency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcomes for every declared dependency, in declaration order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionReport {
    pub outcomes: Vec<ResolutionOutcome>,
}

impl ResolutionReport {
    /// Whether every dependency resolved
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.error.is_none())
    }

    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = &ResolutionOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }
}

/// Hand every declared dependency to `resolver`
///
/// A failure does not stop the remaining dependencies from being resolved.
pub fn resolve_all(
    descriptor: &Descriptor<Validated>,
    resolver: &dyn DependencyResolver,
) -> ResolutionReport {
    let outcomes = descriptor
        .dependencies()
        .iter()
        .map(|dependency| match resolver.resolve(dependency) {
            Ok(resolved) => {
                tracing::debug!(%dependency, %resolved, "dependency resolved");
                ResolutionOutcome {
                    dependency: dependency.clone(),
                    resolved: Some(resolved),
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(%dependency, error = %err, "dependency failed to resolve");
                ResolutionOutcome {
                    dependency: dependency.clone(),
                    resolved: None,
                    error: Some(err.to_string()),
                }
            }
        })
        .collect();

    ResolutionReport { outcomes }
}

/// What a [`CommandResolver`] appends to its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentStyle {
    /// The notation as declared, `group:artifact:version`
    Notation,
    /// Only the module, `group:artifact`
    Module,
}

/// Resolves by running an external command once per dependency
///
/// The command's first non-empty stdout line is the resolution; an empty
/// stdout resolves to the notation itself.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    style: ArgumentStyle,
}

impl CommandResolver {
    /// Run `program args... <notation>`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
            style: ArgumentStyle::Notation,
        }
    }

    /// Ask the Gradle wrapper of `project_dir` for each dependency's insight
    pub fn gradle(project_dir: impl Into<PathBuf>) -> Self {
        let wrapper = if cfg!(windows) {
            "gradlew.bat"
        } else {
            "./gradlew"
        };
        Self {
            program: wrapper.to_string(),
            args: [
                "-q",
                ":app:dependencyInsight",
                "--configuration",
                "releaseRuntimeClasspath",
                "--dependency",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            working_dir: Some(project_dir.into()),
            style: ArgumentStyle::Module,
        }
    }

    /// Choose what gets appended to the arguments
    #[must_use]
    pub fn with_style(mut self, style: ArgumentStyle) -> Self {
        self.style = style;
        self
    }

    fn target(&self, dependency: &Dependency) -> String {
        match self.style {
            ArgumentStyle::Notation => dependency.notation.clone(),
            ArgumentStyle::Module => dependency
                .coordinate()
                .map_or_else(|| dependency.notation.clone(), |c| c.module()),
        }
    }
}

impl DependencyResolver for CommandResolver {
    fn resolve(&self, dependency: &Dependency) -> Result<String, DescriptorError> {
        let target = self.target(dependency);
        let mut args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        args.push(&target);

        let result = match &self.working_dir {
            Some(dir) => run_command_in_dir(&self.program, &args, dir),
            None => run_command(&self.program, &args),
        }
        .map_err(|err| DescriptorError::Resolve {
            notation: dependency.notation.clone(),
            message: err.message,
        })?;

        if !result.success {
            return Err(DescriptorError::Resolve {
                notation: dependency.notation.clone(),
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    result.exit_code,
                    result.stderr.trim()
                ),
            });
        }

        Ok(result
            .first_line()
            .map_or_else(|| dependency.notation.clone(), String::from))
    }
}

/// Resolves from a fixed table keyed by notation
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    table: BTreeMap<String, String>,
}

impl StaticResolver {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a notation to its resolution
    #[must_use]
    pub fn with(mut self, notation: impl Into<String>, resolved: impl Into<String>) -> Self {
        self.table.insert(notation.into(), resolved.into());
        self
    }
}

impl DependencyResolver for StaticResolver {
    fn resolve(&self, dependency: &Dependency) -> Result<String, DescriptorError> {
        self.table
            .get(&dependency.notation)
            .cloned()
            .ok_or_else(|| DescriptorError::Resolve {
                notation: dependency.notation.clone(),
                message: "not found in resolver table".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::tests::literal;
    use crate::load::{load_str, Format};
    use crate::properties::FrameworkProperties;
    use crate::sdk::SdkInventory;

    fn validated_with_deps(deps: &[&str]) -> Descriptor<Validated> {
        let list = deps
            .iter()
            .map(|d| format!("\"{d}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let text = format!("dependencies = [{list}]\n{}", literal(21, 30, 34));
        load_str(&text, Format::Toml, &FrameworkProperties::defaults())
            .unwrap()
            .validate(&SdkInventory::empty())
            .unwrap()
    }

    #[test]
    fn test_static_resolver_keeps_order_and_failures() {
        let descriptor = validated_with_deps(&[
            "androidx.core:core-ktx:1.13.1",
            "com.example:missing:1.0",
            "junit:junit:4.13.2",
        ]);
        let resolver = StaticResolver::new()
            .with("androidx.core:core-ktx:1.13.1", "core-ktx-1.13.1.aar")
            .with("junit:junit:4.13.2", "junit-4.13.2.jar");

        let report = resolve_all(&descriptor, &resolver);
        assert_eq!(report.outcomes.len(), 3);
        assert!(!report.is_complete());
        assert_eq!(report.outcomes[0].resolved.as_deref(), Some("core-ktx-1.13.1.aar"));
        assert_eq!(report.outcomes[2].resolved.as_deref(), Some("junit-4.13.2.jar"));

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].dependency.notation, "com.example:missing:1.0");
    }

    #[test]
    fn test_no_dependencies_is_complete() {
        let report = resolve_all(&validated_with_deps(&[]), &StaticResolver::new());
        assert!(report.outcomes.is_empty());
        assert!(report.is_complete());
    }

    #[test]
    fn test_module_argument_style() {
        let resolver = CommandResolver::gradle("/tmp/project");
        let dep = Dependency::new(
            crate::descriptor::DependencyConfiguration::Implementation,
            "androidx.core:core-ktx:1.13.1",
        );
        assert_eq!(resolver.target(&dep), "androidx.core:core-ktx");
        let resolver = resolver.with_style(ArgumentStyle::Notation);
        assert_eq!(resolver.target(&dep), "androidx.core:core-ktx:1.13.1");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_resolver_uses_stdout() {
        let descriptor = validated_with_deps(&["androidx.core:core-ktx:1.13.1"]);
        let resolver = CommandResolver::new("echo", vec!["resolved".to_string()]);
        let report = resolve_all(&descriptor, &resolver);
        assert!(report.is_complete());
        assert_eq!(
            report.outcomes[0].resolved.as_deref(),
            Some("resolved androidx.core:core-ktx:1.13.1")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_command_resolver_failure() {
        let descriptor = validated_with_deps(&["androidx.core:core-ktx:1.13.1"]);
        let resolver = CommandResolver::new("false", Vec::new());
        let report = resolve_all(&descriptor, &resolver);
        assert!(!report.is_complete());
        assert!(report.outcomes[0]
            .error
            .as_deref()
            .unwrap()
            .contains("false exited with 1"));
    }

    #[test]
    fn test_command_resolver_missing_program() {
        let dep = Dependency::new(
            crate::descriptor::DependencyConfiguration::Api,
            "a:b:1",
        );
        let err = CommandResolver::new("nonexistent_resolver_12345", Vec::new())
            .resolve(&dep)
            .unwrap_err();
        assert!(matches!(err, DescriptorError::Resolve { .. }));
    }
}
