use super::*;
use crate::double_colon::{TypeLhs, ValueLhs};
use crate::context::FlowState;
use callref_common::{DiagnosticCategory, diagnostic_codes};

fn diagnostic(code: u32, start: u32) -> Diagnostic {
    Diagnostic::from_code("test.kt", start, 3, code, &["x"])
}

fn type_lhs(ty: TypeId) -> ReferenceLhs {
    ReferenceLhs::Type(TypeLhs { ty, is_bare: false })
}

#[test]
fn fork_reads_through_to_parent() {
    let mut root = BindingTrace::root("root");
    root.record_expression_type(NodeIndex(1), TypeId::INT);

    let mut child = root.fork("child");
    assert_eq!(child.expression_type(NodeIndex(1)), Some(TypeId::INT));

    child.record_expression_type(NodeIndex(1), TypeId::STRING);
    assert_eq!(child.expression_type(NodeIndex(1)), Some(TypeId::STRING));
    let log = child.into_log();

    assert_eq!(root.expression_type(NodeIndex(1)), Some(TypeId::INT));
    root.absorb(log);
    assert_eq!(root.expression_type(NodeIndex(1)), Some(TypeId::STRING));
}

#[test]
fn discarded_trial_leaves_no_trace() {
    let root = BindingTrace::root("root");
    let mut sandbox = root.fork("trial");
    sandbox.report(diagnostic(diagnostic_codes::UNRESOLVED_REFERENCE, 0));
    sandbox.record_double_colon_lhs(NodeIndex(2), type_lhs(TypeId::STRING));
    let trial = TrialResult {
        value: Some(7),
        log: sandbox.into_log(),
    };

    assert_eq!(trial.discard(), Some(7));
    assert!(root.log().is_empty());
    assert!(root.double_colon_lhs(NodeIndex(2)).is_none());
}

#[test]
fn committed_trial_lands_in_parent() {
    let mut root = BindingTrace::root("root");
    let log = {
        let mut sandbox = root.fork("trial");
        sandbox.report(diagnostic(diagnostic_codes::NO_THIS, 4));
        sandbox.record_qualifier(NodeIndex(3), ClassifierId::STRING);
        sandbox.into_log()
    };
    let trial: TrialResult<()> = TrialResult { value: None, log };
    assert!(!trial.succeeded());

    assert_eq!(trial.commit(&mut root), None);
    assert_eq!(root.diagnostics().len(), 1);
    assert_eq!(root.qualifier(NodeIndex(3)), Some(ClassifierId::STRING));
    assert!(root.has_errors());
}

#[test]
fn duplicate_diagnostics_are_dropped_along_the_chain() {
    let mut root = BindingTrace::root("root");
    root.report(diagnostic(diagnostic_codes::UNRESOLVED_REFERENCE, 0));
    root.report(diagnostic(diagnostic_codes::UNRESOLVED_REFERENCE, 0));
    assert_eq!(root.diagnostics().len(), 1);

    let mut child = root.fork("child");
    child.report(diagnostic(diagnostic_codes::UNRESOLVED_REFERENCE, 0));
    assert!(child.diagnostics().is_empty(), "already reported by the parent");
    child.report(diagnostic(diagnostic_codes::UNRESOLVED_REFERENCE, 5));
    assert_eq!(child.diagnostics().len(), 1, "different range is kept");
}

#[test]
fn same_range_in_another_file_is_not_a_duplicate() {
    let mut root = BindingTrace::root("session");
    root.report(diagnostic(diagnostic_codes::UNRESOLVED_REFERENCE, 0));
    root.report(Diagnostic::from_code(
        "other.kt",
        0,
        3,
        diagnostic_codes::UNRESOLVED_REFERENCE,
        &["y"],
    ));
    let files: Vec<&str> = root.diagnostics().iter().map(|d| d.file.as_str()).collect();
    assert_eq!(files, ["test.kt", "other.kt"]);
}

#[test]
fn nearest_level_wins_in_nested_forks() {
    let mut root = BindingTrace::root("root");
    let value = ReferenceLhs::Value(ValueLhs {
        ty: TypeId::INT,
        is_singleton_qualifier: false,
        flow: FlowState::default(),
    });
    root.record_double_colon_lhs(NodeIndex(9), value.clone());

    let mut middle = root.fork("middle");
    middle.record_double_colon_lhs(NodeIndex(9), type_lhs(TypeId::STRING));
    let inner = middle.fork("inner");

    assert_eq!(inner.double_colon_lhs(NodeIndex(9)), Some(&type_lhs(TypeId::STRING)));
    assert_eq!(inner.name(), "inner");
    assert_eq!(root.double_colon_lhs(NodeIndex(9)), Some(&value));
}

#[test]
fn warnings_do_not_count_as_errors() {
    let mut root = BindingTrace::root("root");
    root.report(
        diagnostic(diagnostic_codes::RESERVED_SYNTAX_IN_CALLABLE_REFERENCE_LHS, 0)
            .with_category(DiagnosticCategory::Warning),
    );
    assert_eq!(root.diagnostics().len(), 1);
    assert!(!root.has_errors());
}

#[test]
fn synthetic_reference_exposes_its_type() {
    let reference = SyntheticReference::PropertyPlaceholder {
        descriptor: CallableId(0),
        ty: TypeId::INT,
    };
    let mut root = BindingTrace::root("root");
    root.record_synthetic_reference(NodeIndex(1), reference.clone());
    assert_eq!(root.synthetic_reference(NodeIndex(1)).map(SyntheticReference::ty), Some(TypeId::INT));
    assert!(!root.log().bindings.is_empty());
}
