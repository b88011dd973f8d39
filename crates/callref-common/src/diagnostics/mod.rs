//! Diagnostic types and message lookup for the reference resolver.
//!
//! The message catalog lives in `data.rs`. Messages are templates with
//! `{0}`, `{1}`, ... placeholders filled by [`format_message`].

use serde::Serialize;

mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes};

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Message = 2,
}

impl DiagnosticCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Message => "message",
        }
    }
}

/// A resolution diagnostic anchored at a byte range of the input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// Create a diagnostic from the catalog entry for `code`, filling the
    /// message placeholders with `args`.
    ///
    /// Unknown codes produce an error diagnostic with an empty template so a
    /// missing catalog entry never aborts resolution.
    #[must_use]
    pub fn from_code(file: &str, start: u32, length: u32, code: u32, args: &[&str]) -> Self {
        let (category, template) = match get_diagnostic_message(code) {
            Some(message) => (message.category, message.message),
            None => (DiagnosticCategory::Error, ""),
        };
        Self {
            file: file.to_string(),
            start,
            length,
            message_text: format_message(template, args),
            category,
            code,
        }
    }

    /// Same diagnostic with a different category.
    #[must_use]
    pub fn with_category(mut self, category: DiagnosticCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_message_fills_placeholders_in_order() {
        let text = format_message("{0} type arguments expected for '{1}'.", &["2", "Map"]);
        assert_eq!(text, "2 type arguments expected for 'Map'.");
    }

    #[test]
    fn from_code_uses_catalog_category_and_template() {
        let diag = Diagnostic::from_code(
            "refs.kt",
            4,
            3,
            diagnostic_codes::UNRESOLVED_REFERENCE,
            &["foo"],
        );
        assert!(diag.is_error());
        assert_eq!(diag.message_text, "Unresolved reference: foo.");
        assert_eq!((diag.start, diag.length), (4, 3));
    }

    #[test]
    fn catalog_codes_are_unique() {
        let mut codes: Vec<u32> = DIAGNOSTIC_MESSAGES.iter().map(|m| m.code).collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn diagnostics_serialize_with_category_name() {
        let diag = Diagnostic::error("a.kt".into(), 0, 1, "boom".into(), 1001);
        let json = serde_json::to_value(&diag).expect("serializable");
        assert_eq!(json["category"], "Error");
        assert_eq!(json["code"], 1001);
    }
}
