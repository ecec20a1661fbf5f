//! droidspec CLI
//!
//! Check, inspect and render the Flutter Android application build descriptor.

use clap::{Parser, Subcommand};
use droidspec_android::{
    load_file, properties_for, render_gradle_kts, resolve_all, CommandResolver, Descriptor,
    DescriptorError, DependencyResolver, FrameworkProperties, SdkInventory, Validated,
};
use droidspec_cli::output::{
    format_count, format_duration, print_details, print_error, print_json, print_violations,
    Status,
};
use droidspec_core::config::Config;
use droidspec_core::error::exit_codes;
use droidspec_core::process::which_command;
use droidspec_core::{Error, ErrorCode, Result};
use droidspec_telemetry::{TelemetryConfig, Timer};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "droidspec")]
#[command(about = "Check, inspect and render Flutter Android build descriptors")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Framework properties file (defaults to local.properties next to the descriptor)
    #[arg(long, global = true)]
    properties: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs, and the final error report, as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a descriptor, listing every violation
    Check {
        /// Descriptor file
        file: Option<PathBuf>,
    },

    /// Print the loaded descriptor
    Show {
        /// Descriptor file
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the equivalent build.gradle.kts
    Render {
        /// Descriptor file
        file: Option<PathBuf>,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List declared dependencies, or hand them to a resolver
    Deps {
        /// Descriptor file
        file: Option<PathBuf>,
        /// Resolver command; each dependency notation is appended as the last argument.
        /// End the command with `;` to give the descriptor file after it
        #[arg(
            long,
            num_args = 1..,
            value_terminator = ";",
            allow_hyphen_values = true,
            conflicts_with = "gradle"
        )]
        resolver: Vec<String>,
        /// Resolve through the Gradle wrapper of this Android project directory
        #[arg(long)]
        gradle: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the detected SDK, NDK and JDK inventory
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let telemetry = TelemetryConfig::from_verbosity(cli.verbose, cli.quiet);
    droidspec_telemetry::init_with_config(if cli.log_json {
        telemetry.json()
    } else {
        telemetry
    })?;

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            print_error(&err, cli.log_json);
            err.exit_code()
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<i32> {
    let config = Config::load(cli.config.as_deref())?;
    if !config.schema.output.color {
        owo_colors::set_override(false);
    }

    match &cli.command {
        Commands::Check { file } => run_check(cli, &config, file.as_deref()),
        Commands::Show { file, json } => run_show(cli, &config, file.as_deref(), *json),
        Commands::Render { file, output } => {
            run_render(cli, &config, file.as_deref(), output.as_deref())
        }
        Commands::Deps {
            file,
            resolver,
            gradle,
            json,
        } => {
            let resolver: Option<Box<dyn DependencyResolver>> = match (resolver.split_first(), gradle) {
                (Some((program, args)), _) => {
                    Some(Box::new(CommandResolver::new(program.clone(), args.to_vec())))
                }
                (None, Some(dir)) => Some(Box::new(CommandResolver::gradle(dir))),
                (None, None) => None,
            };
            run_deps(cli, &config, file.as_deref(), resolver.as_deref(), *json)
        }
        Commands::Doctor { json } => run_doctor(&config, *json),
    }
}

/// Descriptor path from the command line, else the configured default
fn descriptor_path(file: Option<&Path>, config: &Config) -> PathBuf {
    file.map_or_else(
        || PathBuf::from(&config.schema.descriptor.path),
        Path::to_path_buf,
    )
}

/// Framework defaults, then the properties file, then configured overrides
fn framework_properties(cli: &Cli, config: &Config, descriptor: &Path) -> Result<FrameworkProperties> {
    let explicit = cli.properties.clone().or_else(|| {
        config
            .schema
            .descriptor
            .properties_file
            .as_ref()
            .map(PathBuf::from)
    });

    let properties = match explicit {
        Some(file) if !file.exists() => return Err(Error::file_not_found(&file)),
        Some(file) => FrameworkProperties::defaults().with_properties_file(&file)?,
        None => properties_for(descriptor)?,
    };
    Ok(properties.with_overrides(config.schema.property_overrides()))
}

fn load(cli: &Cli, config: &Config, file: Option<&Path>) -> Result<Descriptor> {
    let path = descriptor_path(file, config);
    let properties = framework_properties(cli, config, &path)?;
    Ok(load_file(&path, &properties)?)
}

/// Load and validate; constraint violations are printed and mapped to their exit code
fn load_validated(
    cli: &Cli,
    config: &Config,
    file: Option<&Path>,
) -> Result<std::result::Result<Descriptor<Validated>, i32>> {
    let descriptor = load(cli, config, file)?;
    let inventory = SdkInventory::from_config(&config.schema.sdk);
    match descriptor.validate(&inventory) {
        Ok(validated) => Ok(Ok(validated)),
        Err(DescriptorError::Configuration { violations }) => {
            print_violations(&violations);
            Ok(Err(exit_codes::VALIDATION_ERROR))
        }
        Err(err) => Err(err.into()),
    }
}

fn run_check(cli: &Cli, config: &Config, file: Option<&Path>) -> Result<i32> {
    let descriptor = match load(cli, config, file) {
        Ok(descriptor) => descriptor,
        Err(err) if err.code == ErrorCode::IncompleteDescriptor => {
            print_details(&err.message, &err.details);
            return Ok(err.exit_code());
        }
        Err(err) => return Err(err),
    };

    let inventory = SdkInventory::from_config(&config.schema.sdk);
    let result = descriptor.check(&inventory);
    if !cli.quiet {
        for warning in result.warnings() {
            Status::warning(&format!("{}: {}", warning.field, warning.message));
        }
    }
    if !result.is_valid() {
        print_violations(result.errors());
        return Ok(exit_codes::VALIDATION_ERROR);
    }

    if !cli.quiet {
        let sdk = descriptor.sdk();
        Status::success(&format!(
            "{} is valid (minSdk {}, targetSdk {}, compileSdk {})",
            descriptor.application_id(),
            sdk.min,
            sdk.target,
            sdk.compile
        ));
    }
    Ok(exit_codes::SUCCESS)
}

fn run_show(cli: &Cli, config: &Config, file: Option<&Path>, json: bool) -> Result<i32> {
    let descriptor = load(cli, config, file)?;
    if json {
        print_json(&descriptor)?;
        return Ok(exit_codes::SUCCESS);
    }

    let sdk = descriptor.sdk();
    let java = descriptor.java();
    let version = descriptor.version();

    Status::header(descriptor.application_id().as_str());
    println!("  namespace      {}", descriptor.namespace());
    println!("  plugins        {}", descriptor.plugins().join(", "));
    println!("  compileSdk     {}", sdk.compile);
    println!("  minSdk         {}", sdk.min);
    println!("  targetSdk      {}", sdk.target);
    println!("  version        {} ({})", version.name, version.code);
    println!("  ndkVersion     {}", descriptor.ndk_version());
    println!(
        "  java           source {}, target {}, jvmTarget {}",
        java.source, java.target, java.jvm_target
    );
    for (name, build_type) in descriptor.build_types() {
        println!("  buildType      {name} (signing: {})", build_type.signing_config);
    }
    println!("  flutter        {}", descriptor.flutter_source());
    println!(
        "  dependencies   {}",
        format_count(descriptor.dependencies().len(), "dependency", "dependencies")
    );
    for dependency in descriptor.dependencies() {
        println!("    {dependency}");
    }
    Ok(exit_codes::SUCCESS)
}

fn run_render(
    cli: &Cli,
    config: &Config,
    file: Option<&Path>,
    output: Option<&Path>,
) -> Result<i32> {
    let descriptor = match load_validated(cli, config, file)? {
        Ok(descriptor) => descriptor,
        Err(code) => return Ok(code),
    };
    let rendered = render_gradle_kts(&descriptor)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .map_err(|e| Error::io(format!("Failed to write {}: {e}", path.display())))?;
            if !cli.quiet {
                Status::success(&format!("Wrote {}", path.display()));
            }
        }
        None => print!("{rendered}"),
    }
    Ok(exit_codes::SUCCESS)
}

fn run_deps(
    cli: &Cli,
    config: &Config,
    file: Option<&Path>,
    resolver: Option<&dyn DependencyResolver>,
    json: bool,
) -> Result<i32> {
    let descriptor = match load_validated(cli, config, file)? {
        Ok(descriptor) => descriptor,
        Err(code) => return Ok(code),
    };

    let Some(resolver) = resolver else {
        if json {
            print_json(descriptor.dependencies())?;
        } else {
            for dependency in descriptor.dependencies() {
                println!("{dependency}");
            }
        }
        return Ok(exit_codes::SUCCESS);
    };

    droidspec_telemetry::timed_span!(
        "resolve_dependencies",
        count = descriptor.dependencies().len()
    );
    let timer = Timer::start("resolve_dependencies");
    let report = resolve_all(&descriptor, resolver);
    let elapsed = timer.stop();

    if json {
        print_json(&report)?;
    } else {
        for outcome in &report.outcomes {
            match (&outcome.resolved, &outcome.error) {
                (Some(resolved), _) => Status::success(&format!("{} -> {resolved}", outcome.dependency)),
                (None, Some(error)) => Status::error(&format!("{}: {error}", outcome.dependency)),
                (None, None) => {}
            }
        }
        if !cli.quiet {
            Status::info(&format!(
                "Resolved {} in {}",
                format_count(report.outcomes.len(), "dependency", "dependencies"),
                format_duration(elapsed)
            ));
        }
    }

    if report.is_complete() {
        Ok(exit_codes::SUCCESS)
    } else {
        Err(Error::new(
            ErrorCode::DependencyResolution,
            format!(
                "{} failed to resolve",
                format_count(report.failures().count(), "dependency", "dependencies")
            ),
        ))
    }
}

fn run_doctor(config: &Config, json: bool) -> Result<i32> {
    let inventory = SdkInventory::from_config(&config.schema.sdk);
    if json {
        print_json(&inventory)?;
        return Ok(exit_codes::SUCCESS);
    }

    println!("Environment Check");
    println!();

    match &inventory.sdk_root {
        Some(root) => Status::success(&format!("Android SDK: {}", root.display())),
        None => Status::warning("Android SDK: not found (set ANDROID_HOME)"),
    }

    if inventory.platforms.is_empty() {
        Status::warning("Platforms: none detected");
    } else {
        let levels: Vec<String> = inventory.platforms.iter().map(ToString::to_string).collect();
        Status::success(&format!("Platforms: {}", levels.join(", ")));
    }

    if inventory.ndk_versions.is_empty() {
        Status::warning("NDK: none detected");
    } else {
        let revisions: Vec<&str> = inventory.ndk_versions.iter().map(String::as_str).collect();
        Status::success(&format!("NDK: {}", revisions.join(", ")));
    }

    match (inventory.jdk, which_command("java")) {
        (Some(major), Some(path)) => {
            Status::success(&format!("JDK: {major} ({})", path.display()));
        }
        (Some(major), None) => Status::success(&format!("JDK: {major}")),
        (None, _) => Status::warning("JDK: not found"),
    }

    Ok(exit_codes::SUCCESS)
}
