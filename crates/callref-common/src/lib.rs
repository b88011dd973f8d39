//! Common types and utilities for the callref reference resolver.
//!
//! This crate provides foundational types used across all callref crates:
//! - Source spans (`Span`)
//! - Diagnostics and the diagnostic message catalog
//! - The language feature gate (`LanguageFeatures`)
//! - Centralized limits

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Diagnostic types and message catalog
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticMessage, diagnostic_codes, format_message,
};

// Language feature gate
pub mod features;
pub use features::{LanguageFeature, LanguageFeatures};

// Centralized limits and thresholds
pub mod limits;
