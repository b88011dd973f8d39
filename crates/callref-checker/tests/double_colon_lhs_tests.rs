//! Interpretation of the left-hand side of `::`.

mod support;

use callref_checker::{ReferenceLhs, TypeLhs};
use callref_common::{DiagnosticCategory, LanguageFeature, diagnostic_codes};
use support::{COMMON_STUBS, Fixture};

#[test]
fn class_name_resolves_as_type_and_drops_value_attempt() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("Plain::run");

    let lhs = outcome.result.lhs.as_ref().expect("lhs resolved");
    assert_eq!(lhs.kind_name(), "type");
    assert_eq!(fixture.format(lhs.ty()), "Plain");
    // The value attempt reported a missing companion in its sandbox.
    assert!(outcome.log.diagnostics.is_empty(), "{:?}", outcome.log.diagnostics);
}

#[test]
fn lhs_binding_is_keyed_by_the_receiver_node() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("s::length");

    assert_eq!(outcome.log.bindings.double_colon_lhs.len(), 1);
    let (node, recorded) = outcome
        .log
        .bindings
        .double_colon_lhs
        .iter()
        .next()
        .expect("one binding");
    assert_ne!(*node, outcome.parsed.root);
    assert_eq!(Some(recorded), outcome.result.lhs.as_ref());
    assert_eq!(recorded.kind_name(), "value");
}

#[test]
fn local_value_is_committed_without_trying_the_type() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.class_literal("plains::class");

    let Some(ReferenceLhs::Value(value)) = &outcome.result.lhs else {
        panic!("expected a value lhs, got {:?}", outcome.result.lhs);
    };
    assert!(!value.is_singleton_qualifier);
    assert_eq!(fixture.format(value.ty), "Plain");
    assert!(outcome.log.bindings.qualifiers.is_empty(), "type trial never ran");
}

#[test]
fn object_keeps_value_reading_when_type_agrees() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("Obj::ping");

    let Some(ReferenceLhs::Value(value)) = &outcome.result.lhs else {
        panic!("expected an object value, got {:?}", outcome.result.lhs);
    };
    assert!(value.is_singleton_qualifier);
    assert_eq!(outcome.result.lhs.as_ref().map(ReferenceLhs::kind_name), Some("object"));
    assert!(outcome.log.diagnostics.is_empty());
}

#[test]
fn class_with_companion_reads_as_bare_type() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("Foo::size");

    let Some(ReferenceLhs::Type(TypeLhs { ty, is_bare })) = outcome.result.lhs else {
        panic!("expected a type lhs, got {:?}", outcome.result.lhs);
    };
    assert!(is_bare);
    assert_eq!(fixture.format(ty), "Foo<*>");
    assert!(outcome.log.diagnostics.is_empty(), "{:?}", outcome.log.diagnostics);
}

#[test]
fn explicit_type_arguments_make_a_non_bare_type() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("Foo<String>::get");

    let Some(ReferenceLhs::Type(TypeLhs { ty, is_bare })) = outcome.result.lhs else {
        panic!("expected a type lhs, got {:?}", outcome.result.lhs);
    };
    assert!(!is_bare);
    assert_eq!(fixture.format(ty), "Foo<String>");
    assert!(outcome.log.diagnostics.is_empty(), "{:?}", outcome.log.diagnostics);
}

#[test]
fn unresolved_name_keeps_value_diagnostics() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.class_literal("Missing::class");

    assert!(outcome.result.lhs.is_none());
    assert_eq!(outcome.codes(), [diagnostic_codes::UNRESOLVED_REFERENCE]);
    assert_eq!(outcome.anchored_text(diagnostic_codes::UNRESOLVED_REFERENCE), "Missing");
    assert!(outcome.log.bindings.double_colon_lhs.is_empty());
}

#[test]
fn generic_value_call_is_reserved_syntax() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("plains<Int>::run");

    let Some(ReferenceLhs::Value(value)) = &outcome.result.lhs else {
        panic!("expected a value lhs, got {:?}", outcome.result.lhs);
    };
    assert_eq!(fixture.format(value.ty), "Plain");
    assert_eq!(
        outcome.codes(),
        [diagnostic_codes::RESERVED_SYNTAX_IN_CALLABLE_REFERENCE_LHS]
    );
    assert_eq!(
        outcome.anchored_text(diagnostic_codes::RESERVED_SYNTAX_IN_CALLABLE_REFERENCE_LHS),
        "plains<Int>"
    );
    assert!(outcome.result.resolved.is_some());
}

#[test]
fn reserved_syntax_is_a_warning_without_the_prohibition() {
    let fixture = Fixture::new(COMMON_STUBS)
        .with_feature(LanguageFeature::ProhibitReservedReferenceSyntax, false);
    let outcome = fixture.callable_reference("plains<Int>::run");

    let reserved =
        outcome.diagnostic(diagnostic_codes::RESERVED_SYNTAX_IN_CALLABLE_REFERENCE_LHS);
    assert_eq!(reserved.category, DiagnosticCategory::Warning);
}

#[test]
fn nullable_value_with_question_marks_is_reserved() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("n?::length");

    assert!(matches!(outcome.result.lhs, Some(ReferenceLhs::Value(_))));
    assert!(outcome
        .codes()
        .contains(&diagnostic_codes::RESERVED_SYNTAX_IN_CALLABLE_REFERENCE_LHS));
}

#[test]
fn reserved_call_chain_reports_and_leaves_lhs_unresolved() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("holder.box<Int>.plain::run");

    assert!(outcome.result.lhs.is_none());
    assert!(!outcome.result.is_valid);
    assert_eq!(
        outcome.anchored_text(diagnostic_codes::RESERVED_SYNTAX_IN_CALLABLE_REFERENCE_LHS),
        "holder.box<Int>.plain"
    );
    // Nothing the synthetic chain resolved is kept.
    assert!(outcome.log.bindings.expression_types.is_empty());
}

#[test]
fn type_parameter_lhs_is_a_type() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.class_literal("R::class");

    assert!(matches!(
        outcome.result.lhs,
        Some(ReferenceLhs::Type(TypeLhs { is_bare: false, .. }))
    ));
    assert!(outcome.log.diagnostics.is_empty(), "{:?}", outcome.log.diagnostics);
}

#[test]
fn nested_class_through_dotted_chain() {
    let fixture = Fixture::new(
        r#"
        package a.b
        class Outer { class Inner { fun go(): Int } }
        "#,
    );
    let outcome = fixture.callable_reference("a.b.Outer.Inner::go");

    let lhs = outcome.result.lhs.as_ref().expect("lhs resolved");
    assert!(lhs.is_type());
    assert_eq!(fixture.format(lhs.ty()), "Inner");
    assert!(outcome.result.is_valid);
}

#[test]
fn function_needing_a_call_keeps_only_the_value_diagnostics() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("load::length");

    assert!(outcome.result.lhs.is_none());
    assert!(outcome.log.bindings.double_colon_lhs.is_empty());
    // The type attempt's unresolved `load` is dropped with its sandbox; the
    // second diagnostic is the scope lookup of `length`.
    assert_eq!(
        outcome.codes(),
        [
            diagnostic_codes::FUNCTION_CALL_EXPECTED,
            diagnostic_codes::UNRESOLVED_REFERENCE
        ]
    );
    assert_eq!(outcome.anchored_text(diagnostic_codes::FUNCTION_CALL_EXPECTED), "load");
    assert_eq!(outcome.anchored_text(diagnostic_codes::UNRESOLVED_REFERENCE), "length");
}

#[test]
fn type_reading_of_another_type_beats_an_object_value() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.class_literal("Obj::class<Int>");

    let Some(ReferenceLhs::Type(TypeLhs { ty, is_bare: false })) = outcome.result.lhs else {
        panic!("expected a type lhs, got {:?}", outcome.result.lhs);
    };
    assert!(ty.is_error());
    assert_eq!(
        outcome.codes(),
        [diagnostic_codes::WRONG_NUMBER_OF_TYPE_ARGUMENTS]
    );
    assert_eq!(
        outcome.anchored_text(diagnostic_codes::WRONG_NUMBER_OF_TYPE_ARGUMENTS),
        "Obj"
    );
    assert!(outcome.result.ty.is_error());
}
