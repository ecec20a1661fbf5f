//! Flutter Android build descriptor
//!
//! This crate provides the application module's build configuration:
//! - Loading a declarative descriptor (TOML or JSON) into immutable values
//! - Resolving `flutter.*` property references against framework defaults
//! - Validating SDK ordering and toolchain constraints
//! - Handing declared dependencies to an external resolver
//! - Rendering the equivalent `build.gradle.kts`
//!
//! ```no_run
//! use droidspec_android::{load_file, properties_for, SdkInventory};
//! use std::path::Path;
//!
//! let path = Path::new("android/app/droidspec.toml");
//! let properties = properties_for(path)?;
//! let descriptor = load_file(path, &properties)?.validate(&SdkInventory::empty())?;
//! println!("{}", descriptor.application_id());
//! # Ok::<(), droidspec_android::DescriptorError>(())
//! ```

pub mod descriptor;
pub mod error;
pub mod load;
pub mod properties;
pub mod render;
pub mod resolve;
pub mod sdk;
pub mod validate;

pub use descriptor::{
    ApplicationId, AppVersion, BuildType, Coordinate, Dependency, DependencyConfiguration,
    Descriptor, JavaOptions, JavaVersion, NdkVersion, SdkVersions, SigningIdentity, SigningRef,
    Unvalidated, Validated,
};
pub use error::{DescriptorError, Field, FieldIssue, IssueKind, Result, Violation};
pub use load::{load_file, load_named, load_str, properties_for, Format};
pub use properties::FrameworkProperties;
pub use render::render_gradle_kts;
pub use resolve::{
    resolve_all, ArgumentStyle, CommandResolver, DependencyResolver, ResolutionOutcome,
    ResolutionReport, StaticResolver,
};
pub use sdk::SdkInventory;
