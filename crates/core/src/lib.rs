//! Core utilities for droidspec
//!
//! This crate provides shared functionality used by the descriptor loader and the CLI:
//!
//! - **Error handling**: Coded errors with context and recovery suggestions
//! - **Validation**: A fluent validator that collects every failure in one pass
//! - **Configuration**: TOML-based tool configuration (SDK locations, property overrides)
//! - **Process execution**: Safe command execution with output capture
//!
//! # Example
//!
//! ```rust
//! use droidspec_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("version name", "1.0.0")
//!     .ordered("sdk ordering", "minSdk", 21, "targetSdk", 30)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};
