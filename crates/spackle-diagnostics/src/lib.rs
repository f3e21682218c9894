#![doc = include_str!("../README.md")]
#![allow(unused_assignments)] // thiserror/miette derive macros trigger false positives

pub mod fixes;
pub mod location;
pub mod strict;

pub use fixes::{FixKind, FixRecord};
pub use location::LineIndex;
pub use strict::{Diagnostic, DiagnosticKind, Severity, StrictViolation};
