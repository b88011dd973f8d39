use super::{Reporter, render_json};
use crate::driver::{ReferenceReport, RunReport};
use callref_common::{Diagnostic, DiagnosticCategory, diagnostic_codes};
use rustc_hash::FxHashMap;

fn unresolved(file: &str, start: u32, length: u32, name: &str) -> Diagnostic {
    Diagnostic::from_code(file, start, length, diagnostic_codes::UNRESOLVED_REFERENCE, &[name])
}

#[test]
fn diagnostic_has_location_code_and_underline() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("ref0", "Missing::class");

    let rendered = reporter.format_diagnostic(&unresolved("ref0", 0, 7, "Missing"));
    let mut lines = rendered.lines();
    assert_eq!(
        lines.next(),
        Some("ref0:1:1 - error CALLREF1001: Unresolved reference: Missing.")
    );
    assert_eq!(lines.next(), Some("    1   Missing::class"));
    assert_eq!(lines.next(), Some("        ~~~~~~~"));
}

#[test]
fn location_counts_lines_in_multi_line_sources() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("decls.kt", "class A\nfun f(): Nope\n");

    let rendered = reporter.format_diagnostic(&unresolved("decls.kt", 17, 4, "Nope"));
    assert!(rendered.starts_with("decls.kt:2:10 - error"), "{rendered}");
    assert!(rendered.ends_with("                 ~~~~"), "{rendered}");
}

#[test]
fn unknown_file_falls_back_to_its_name() {
    let reporter = Reporter::new(false);
    let warning = unresolved("elsewhere", 3, 2, "x").with_category(DiagnosticCategory::Warning);
    assert_eq!(
        reporter.format_diagnostic(&warning),
        "elsewhere - warning CALLREF1001: Unresolved reference: x."
    );
}

fn sample_report() -> RunReport {
    let mut sources = FxHashMap::default();
    sources.insert("ref0".to_string(), "String::length".to_string());
    sources.insert("ref1".to_string(), "Missing::x".to_string());
    RunReport {
        success: false,
        references: vec![
            ReferenceReport {
                reference: "String::length".to_string(),
                file: "ref0".to_string(),
                lhs: Some("type".to_string()),
                ty: Some("KProperty1<String, Int>".to_string()),
                valid: true,
            },
            ReferenceReport {
                reference: "Missing::x".to_string(),
                file: "ref1".to_string(),
                lhs: None,
                ty: None,
                valid: false,
            },
        ],
        diagnostics: vec![unresolved("ref1", 0, 7, "Missing")],
        sources,
    }
}

#[test]
fn report_lists_results_before_diagnostics() {
    let rendered = Reporter::new(false).render_report(&sample_report());
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "String::length: KProperty1<String, Int> [type]");
    assert_eq!(lines[1], "Missing::x: <untyped> [-] (invalid)");
    assert_eq!(lines[2], "");
    assert!(lines[3].starts_with("ref1:1:1 - error CALLREF1001"));
}

#[test]
fn json_report_skips_sources() {
    let json = render_json(&sample_report()).expect("serializes");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["success"], false);
    assert_eq!(value["references"][0]["type"], "KProperty1<String, Int>");
    assert_eq!(value["references"][1]["lhs"], serde_json::Value::Null);
    assert_eq!(value["diagnostics"][0]["code"], 1001);
    assert!(value.get("sources").is_none());
}
