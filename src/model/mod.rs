//! Core data types for discovered parameters and probe results.
//!
//! This module contains the fundamental types used throughout paramprobe:
//!
//! - [`ParamSet`] - An ordered, deduplicated set of parameter names
//! - [`ScanReport`] - Complete results of one page scan
//! - [`ProbeState`] - Completion signal payload for a reflection probe
//!
//! # Example
//!
//! ```
//! use paramprobe::ParamSet;
//!
//! let mut params = ParamSet::new();
//! params.insert("q");
//! params.insert("page");
//! params.insert("q"); // duplicate, ignored
//!
//! assert_eq!(params.len(), 2);
//! ```

mod param;
mod report;

pub use param::*;
pub use report::*;
