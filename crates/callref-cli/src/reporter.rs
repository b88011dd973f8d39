use anyhow::{Context, Result};
use colored::Colorize;
use rustc_hash::FxHashMap;

use callref_common::{Diagnostic, DiagnosticCategory};

use crate::driver::{ReferenceReport, RunReport};

pub struct Reporter {
    color: bool,
    sources: FxHashMap<String, String>,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            sources: FxHashMap::default(),
        }
    }

    /// Register the text diagnostics on `file` point into.
    pub fn add_source(&mut self, file: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(file.into(), text.into());
    }

    /// Results first, one line per reference, then the diagnostics.
    pub fn render_report(&mut self, report: &RunReport) -> String {
        for (file, text) in &report.sources {
            self.add_source(file.clone(), text.clone());
        }

        let mut out = String::new();
        for reference in &report.references {
            out.push_str(&self.format_reference(reference));
            out.push('\n');
        }
        if !report.diagnostics.is_empty() {
            out.push('\n');
            out.push_str(&self.render(&report.diagnostics));
            out.push('\n');
        }
        out
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    fn format_reference(&self, reference: &ReferenceReport) -> String {
        let lhs = reference.lhs.as_deref().unwrap_or("-");
        let ty = reference.ty.as_deref().unwrap_or("<untyped>");
        let (lhs, ty) = if !self.color {
            (lhs.to_string(), ty.to_string())
        } else if reference.valid {
            (lhs.dimmed().to_string(), ty.green().to_string())
        } else {
            (lhs.dimmed().to_string(), ty.red().to_string())
        };
        let marker = if reference.valid { "" } else { " (invalid)" };
        format!("{}: {} [{}]{}", reference.reference, ty, lhs, marker)
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = match self.format_location(&diagnostic.file, diagnostic.start) {
            Some(location) => location,
            None if !diagnostic.file.is_empty() => diagnostic.file.clone(),
            None => "<unknown>".to_string(),
        };

        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        let code = self.format_code(diagnostic.code);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        if let Some(snippet) =
            self.format_snippet(&diagnostic.file, diagnostic.start, diagnostic.length)
        {
            output.push_str(&snippet);
        }
        output
    }

    /// The source line with the diagnostic span underlined:
    ///   1   Foo<Int>::class
    ///       ~~~~~~~~
    fn format_snippet(&self, file: &str, start: u32, length: u32) -> Option<String> {
        if length == 0 {
            return None;
        }
        let (line_num, column) = self.position_for(file, start)?;
        let line_text = self.sources.get(file)?.lines().nth((line_num - 1) as usize)?;

        let span_start = (column - 1) as usize;
        let span_end = span_start + length as usize;
        let mut underline = String::new();
        for (i, ch) in line_text.chars().enumerate() {
            if i >= span_end {
                break;
            }
            let fill = if i < span_start { ' ' } else { '~' };
            let width = if ch == '\t' { 4 } else { 1 };
            underline.extend(std::iter::repeat_n(fill, width));
        }
        if !underline.contains('~') {
            underline.push('~');
        }

        let underline = if self.color {
            underline.red().to_string()
        } else {
            underline
        };
        Some(format!("\n  {line_num:>3}   {line_text}\n        {underline}"))
    }

    fn format_location(&self, file: &str, offset: u32) -> Option<String> {
        let (line, column) = self.position_for(file, offset)?;
        Some(format!("{file}:{line}:{column}"))
    }

    /// One-based line and column of a byte offset.
    fn position_for(&self, file: &str, offset: u32) -> Option<(u32, u32)> {
        let source = self.sources.get(file)?;
        let offset = offset as usize;
        if offset > source.len() {
            return None;
        }
        let before = source.get(..offset)?;
        let line = before.matches('\n').count() as u32 + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() as u32 + 1;
        Some((line, column))
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = match category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Message => "message",
        };

        if !self.color {
            return label.to_string();
        }

        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }

        let label = format!("CALLREF{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}

/// The whole report as pretty-printed JSON.
pub fn render_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize report")
}

#[cfg(test)]
#[path = "tests/reporter_tests.rs"]
mod tests;
