//! End-to-end runs of the driver over stub files on disk.

use callref_cli::args::CliArgs;
use callref_cli::driver::{reference_file_name, run};
use callref_cli::reporter::Reporter;
use callref_common::diagnostic_codes;
use clap::Parser;
use std::path::Path;

const STUBS: &str = r#"
class Circle {
    val radius: Int
    fun scale(by: Int): Circle
    private fun secret(): Int
}
object Registry { fun count(): Int }
local val c: Circle
local val maybe: Circle?
"#;

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write fixture");
}

fn cli(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["callref", "--decls", "stubs.kt"];
    argv.extend_from_slice(extra);
    CliArgs::parse_from(argv)
}

#[test]
fn resolves_each_reference_against_the_stubs() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "stubs.kt", STUBS);

    let report = run(
        &cli(&["Circle::scale", "c::radius", "Registry::class"]),
        dir.path(),
    )
    .expect("run succeeds");

    assert!(report.success, "{:?}", report.diagnostics);
    let types: Vec<_> = report.references.iter().map(|r| r.ty.as_deref()).collect();
    assert_eq!(
        types,
        [
            Some("KFunction2<Circle, Int, Circle>"),
            Some("KProperty0<Int>"),
            Some("KClass<Registry>"),
        ]
    );
    assert_eq!(report.references[1].lhs.as_deref(), Some("value"));
    assert_eq!(report.references[2].file, reference_file_name(2));
}

#[test]
fn diagnostics_fail_the_run_and_point_at_the_reference() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "stubs.kt", STUBS);

    let report = run(&cli(&["c::radius", "maybe::class"]), dir.path()).expect("run succeeds");
    assert!(!report.success);
    assert_eq!(report.diagnostics.len(), 1);
    let diagnostic = &report.diagnostics[0];
    assert_eq!(
        diagnostic.code,
        diagnostic_codes::EXPRESSION_OF_NULLABLE_TYPE_IN_CLASS_LITERAL_LHS
    );
    assert_eq!(diagnostic.file, reference_file_name(1));

    let rendered = Reporter::new(false).render_report(&report);
    assert!(rendered.contains("ref1:1:1 - error"), "{rendered}");
    assert!(rendered.contains("        ~~~~~"), "{rendered}");
}

#[test]
fn within_grants_access_to_private_members() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "stubs.kt", STUBS);

    let outside = run(&cli(&["Circle::secret"]), dir.path()).expect("run succeeds");
    assert!(!outside.success);
    assert_eq!(outside.diagnostics[0].code, diagnostic_codes::INVISIBLE_MEMBER);

    let inside = run(
        &cli(&["--within", "Circle", "Circle::secret"]),
        dir.path(),
    )
    .expect("run succeeds");
    assert!(inside.success, "{:?}", inside.diagnostics);

    let err = run(&cli(&["--within", "Square", "c::radius"]), dir.path()).unwrap_err();
    assert!(err.to_string().contains("Square"));
}

#[test]
fn config_file_and_flags_switch_features() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "stubs.kt", STUBS);
    write(
        dir.path(),
        "callref.json",
        r#"{ "features": { "boundCallableReferences": false } }"#,
    );

    let report = run(&cli(&["c::radius", "Registry::count"]), dir.path()).expect("run succeeds");
    assert!(!report.success);
    let codes: Vec<u32> = report.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, [diagnostic_codes::UNSUPPORTED_FEATURE]);

    let report = run(&cli(&["--no-reflection", "Registry::class"]), dir.path())
        .expect("run succeeds");
    assert!(!report.success);
    assert_eq!(
        report.diagnostics[0].code,
        diagnostic_codes::MISSING_DEPENDENCY_CLASS
    );
}

#[test]
fn stub_problems_are_reported_with_the_references() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "stubs.kt", "fun broken(): Nope\n");

    let report = run(&cli(&["String::length"]), dir.path()).expect("run succeeds");
    assert!(!report.success);
    assert_eq!(report.references[0].ty.as_deref(), Some("KProperty1<String, Int>"));
    assert!(report.diagnostics[0].file.ends_with("stubs.kt"));
    assert!(report.diagnostics[0].message_text.contains("Nope"));
}

#[test]
fn unreadable_inputs_are_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = run(&cli(&["String::length"]), dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read declarations"));

    write(dir.path(), "stubs.kt", STUBS);
    let err = run(&cli(&["Circle::("]), dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse reference"));
}
