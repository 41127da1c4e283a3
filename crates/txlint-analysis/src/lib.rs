//! Analysis core for txlint.
//!
//! The external driver parses source files, resolves types, and calls
//! [`semantic::analyze`] once per compilation unit; findings come back as a
//! [`txlint_common::DiagnosticBag`] for the driver's sink.

pub mod ast;
pub mod render;
pub mod semantic;

pub use semantic::{analyze, analyze_units, AnalysisError, RuleDescriptor};
