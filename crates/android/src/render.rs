//! Render a validated descriptor as a Gradle Kotlin DSL build file

use crate::descriptor::{Descriptor, SigningRef, Validated};
use crate::error::{DescriptorError, Result};
use handlebars::Handlebars;
use serde::Serialize;

const TEMPLATE_NAME: &str = "build.gradle.kts";

const BUILD_GRADLE_KTS: &str = r#"plugins {
{{#each plugins}}
    id("{{this}}")
{{/each}}
}

android {
    namespace = "{{namespace}}"
    compileSdk = {{compile_sdk}}
    ndkVersion = "{{ndk_version}}"

    compileOptions {
        sourceCompatibility = JavaVersion.{{source_compatibility}}
        targetCompatibility = JavaVersion.{{target_compatibility}}
    }

    kotlinOptions {
        jvmTarget = JavaVersion.{{jvm_target}}.toString()
    }

    defaultConfig {
        applicationId = "{{application_id}}"
        minSdk = {{min_sdk}}
        targetSdk = {{target_sdk}}
        versionCode = {{version_code}}
        versionName = "{{version_name}}"
    }
{{#if signing_configs}}

    signingConfigs {
{{#each signing_configs}}
        create("{{name}}") {
{{#if store_file}}
            storeFile = file("{{store_file}}")
{{/if}}
{{#if key_alias}}
            keyAlias = "{{key_alias}}"
{{/if}}
{{#if store_password_env}}
            storePassword = System.getenv("{{store_password_env}}")
{{/if}}
{{#if key_password_env}}
            keyPassword = System.getenv("{{key_password_env}}")
{{/if}}
        }
{{/each}}
    }
{{/if}}

    buildTypes {
{{#each build_types}}
        {{#if builtin}}{{name}}{{else}}create("{{name}}"){{/if}} {
            signingConfig = signingConfigs.getByName("{{signing_config}}")
{{#if minify_enabled}}
            isMinifyEnabled = true
{{/if}}
{{#if shrink_resources}}
            isShrinkResources = true
{{/if}}
        }
{{/each}}
    }
}

flutter {
    source = "{{flutter_source}}"
}

dependencies {
{{#each dependencies}}
    {{configuration}}("{{notation}}")
{{/each}}
}
"#;

#[derive(Serialize)]
struct BuildFile<'a> {
    plugins: &'a [String],
    namespace: &'a str,
    compile_sdk: u32,
    ndk_version: &'a str,
    source_compatibility: &'static str,
    target_compatibility: &'static str,
    jvm_target: &'static str,
    application_id: &'a str,
    min_sdk: u32,
    target_sdk: u32,
    version_code: u32,
    version_name: &'a str,
    signing_configs: Vec<SigningBlock>,
    build_types: Vec<BuildTypeBlock<'a>>,
    flutter_source: &'a str,
    dependencies: Vec<DependencyLine<'a>>,
}

#[derive(Serialize)]
struct SigningBlock {
    name: &'static str,
    store_file: Option<String>,
    key_alias: Option<String>,
    store_password_env: Option<String>,
    key_password_env: Option<String>,
}

#[derive(Serialize)]
struct BuildTypeBlock<'a> {
    name: &'a str,
    builtin: bool,
    signing_config: &'static str,
    minify_enabled: bool,
    shrink_resources: bool,
}

#[derive(Serialize)]
struct DependencyLine<'a> {
    configuration: &'static str,
    notation: &'a str,
}

/// Render the Kotlin DSL build file for a validated descriptor
///
/// # Errors
///
/// [`DescriptorError::Render`] if the template fails to render.
pub fn render_gradle_kts(descriptor: &Descriptor<Validated>) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(kotlin_escape);
    handlebars
        .register_template_string(TEMPLATE_NAME, BUILD_GRADLE_KTS)
        .map_err(|e| DescriptorError::Render(e.to_string()))?;

    let sdk = descriptor.sdk();
    let java = descriptor.java();
    let version = descriptor.version();

    let data = BuildFile {
        plugins: descriptor.plugins(),
        namespace: descriptor.namespace().as_str(),
        compile_sdk: sdk.compile,
        ndk_version: descriptor.ndk_version().as_str(),
        source_compatibility: java.source.gradle_constant(),
        target_compatibility: java.target.gradle_constant(),
        jvm_target: java.jvm_target.gradle_constant(),
        application_id: descriptor.application_id().as_str(),
        min_sdk: sdk.min,
        target_sdk: sdk.target,
        version_code: version.code,
        version_name: &version.name,
        // The debug keystore is provided by the SDK and never declared in the file.
        signing_configs: descriptor
            .signing_configs()
            .iter()
            .filter(|(reference, _)| **reference != SigningRef::Debug)
            .map(|(reference, identity)| SigningBlock {
                name: reference.as_str(),
                store_file: identity
                    .store_file
                    .as_ref()
                    .map(|p| p.display().to_string()),
                key_alias: identity.key_alias.clone(),
                store_password_env: identity.store_password_env.clone(),
                key_password_env: identity.key_password_env.clone(),
            })
            .collect(),
        build_types: descriptor
            .build_types()
            .iter()
            .map(|(name, build_type)| BuildTypeBlock {
                name,
                builtin: is_builtin_build_type(name),
                signing_config: build_type.signing_config.as_str(),
                minify_enabled: build_type.minify_enabled,
                shrink_resources: build_type.shrink_resources,
            })
            .collect(),
        flutter_source: descriptor.flutter_source(),
        dependencies: descriptor
            .dependencies()
            .iter()
            .map(|dependency| DependencyLine {
                configuration: dependency.configuration.as_str(),
                notation: &dependency.notation,
            })
            .collect(),
    };

    let rendered = handlebars
        .render(TEMPLATE_NAME, &data)
        .map_err(|e| DescriptorError::Render(e.to_string()))?;
    tracing::debug!(bytes = rendered.len(), "rendered build.gradle.kts");
    Ok(rendered)
}

/// `debug` and `release` exist already; every other build type is `create("name")`d
fn is_builtin_build_type(name: &str) -> bool {
    matches!(name, "debug" | "release")
}

/// Every interpolated value lands inside a Kotlin string literal, where `"`
/// would close the literal and `$` would start a string template.
fn kotlin_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '$' => escaped.push_str("\\$"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}
