//! Terminal output helpers for droidspec
//!
//! Provides shared CLI functionality:
//! - Status messages
//! - Violation and detail listings
//! - JSON output

#![warn(missing_docs)]

pub mod output;
