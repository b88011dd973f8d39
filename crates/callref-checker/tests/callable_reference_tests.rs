//! `lhs::name` resolution, legality checks and reference types.

mod support;

use callref_checker::{CallableReferenceMode, SyntheticReference};
use callref_common::{LanguageFeature, diagnostic_codes};
use support::{COMMON_STUBS, Fixture};

fn reference_type(fixture: &Fixture, source: &str) -> String {
    let outcome = fixture.callable_reference(source);
    assert!(
        outcome.log.diagnostics.is_empty(),
        "{source}: {:?}",
        outcome.log.diagnostics
    );
    assert!(outcome.result.is_valid, "{source}");
    let ty = outcome.result.ty.expect("reference typed");
    fixture.format(ty)
}

#[test]
fn unbound_member_takes_receiver_as_first_parameter() {
    let fixture = Fixture::new(COMMON_STUBS);
    assert_eq!(reference_type(&fixture, "Plain::run"), "KFunction2<Plain, Int, String>");
    assert_eq!(reference_type(&fixture, "Foo<String>::get"), "KFunction1<Foo<String>, String>");
    assert_eq!(reference_type(&fixture, "String::length"), "KProperty1<String, Int>");
}

#[test]
fn bound_member_has_no_receiver_parameter() {
    let fixture = Fixture::new(COMMON_STUBS);
    assert_eq!(reference_type(&fixture, "s::length"), "KProperty0<Int>");
    assert_eq!(reference_type(&fixture, "plains::run"), "KFunction1<Int, String>");
    assert_eq!(reference_type(&fixture, "Obj::ping"), "KFunction0<Int>");
    assert_eq!(reference_type(&fixture, "holder.box::plain"), "KProperty0<Plain>");
}

#[test]
fn constructors_and_top_level_functions() {
    let fixture = Fixture::new(
        r#"
        class Point { constructor(x: Int, y: Int) }
        fun twice(x: Int): Int
        "#,
    );
    assert_eq!(reference_type(&fixture, "::Point"), "KFunction2<Int, Int, Point>");
    assert_eq!(reference_type(&fixture, "::twice"), "KFunction1<Int, Int>");
}

#[test]
fn property_mutability_follows_setter_visibility() {
    let fixture = Fixture::new(COMMON_STUBS);
    assert_eq!(reference_type(&fixture, "Counter::count"), "KMutableProperty1<Counter, Int>");
    assert_eq!(reference_type(&fixture, "Counter::label"), "KProperty1<Counter, String>");

    let inside = Fixture::new(COMMON_STUBS).inside(&["Counter"]);
    assert_eq!(reference_type(&inside, "Counter::label"), "KMutableProperty1<Counter, String>");
}

#[test]
fn synthetic_reference_is_recorded_on_the_expression() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("Counter::count");
    let reference = outcome
        .log
        .bindings
        .synthetic_references
        .get(&outcome.parsed.root)
        .expect("placeholder recorded");
    assert!(matches!(reference, SyntheticReference::PropertyPlaceholder { .. }));
    assert_eq!(Some(reference.ty()), outcome.result.ty);
    assert_eq!(
        outcome.log.bindings.expression_types.get(&outcome.parsed.root).copied(),
        outcome.result.ty
    );
}

#[test]
fn suspend_function_is_typed_but_invalid() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("::load");

    assert!(!outcome.result.is_valid);
    assert_eq!(outcome.codes(), [diagnostic_codes::UNSUPPORTED]);
    assert_eq!(
        outcome.log.diagnostics[0].message_text,
        "Unsupported [Callable references to suspend functions]."
    );
    let ty = outcome.result.ty.expect("reference still typed");
    assert_eq!(fixture.format(ty), "KSuspendFunction0<String>");
}

#[test]
fn empty_name_is_unresolved_with_rendered_expression() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("Plain::");

    assert!(!outcome.result.is_valid);
    assert_eq!(outcome.result.ty, Some(callref_solver::TypeId::ERROR));
    assert_eq!(outcome.codes(), [diagnostic_codes::UNRESOLVED_REFERENCE]);
    assert_eq!(
        outcome.log.diagnostics[0].message_text,
        "Unresolved reference: Plain::."
    );
    assert!(outcome.result.lhs.is_some(), "left-hand side still resolved");
}

#[test]
fn member_with_empty_lhs_is_rejected() {
    let fixture = Fixture::new(COMMON_STUBS).inside(&["Plain"]);
    let outcome = fixture.callable_reference("::run");

    assert!(!outcome.result.is_valid);
    assert!(outcome.result.resolved.is_some());
    assert_eq!(
        outcome.codes(),
        [diagnostic_codes::CALLABLE_REFERENCE_TO_MEMBER_OR_EXTENSION_WITH_EMPTY_LHS]
    );
    assert_eq!(
        outcome.anchored_text(diagnostic_codes::CALLABLE_REFERENCE_TO_MEMBER_OR_EXTENSION_WITH_EMPTY_LHS),
        "run"
    );
}

#[test]
fn annotation_constructor_is_rejected() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("::Marker");
    assert!(!outcome.result.is_valid);
    assert_eq!(
        outcome.codes(),
        [diagnostic_codes::CALLABLE_REFERENCE_TO_ANNOTATION_CONSTRUCTOR]
    );
}

#[test]
fn member_extension_is_rejected() {
    let fixture = Fixture::new(COMMON_STUBS).inside(&["Host"]);
    let outcome = fixture.callable_reference("Plain::helper");
    assert!(!outcome.result.is_valid);
    assert_eq!(
        outcome.codes(),
        [diagnostic_codes::EXTENSION_IN_CLASS_REFERENCE_NOT_ALLOWED]
    );
    assert!(outcome.log.diagnostics[0].message_text.starts_with("'helper'"));
}

#[test]
fn local_variable_reference_is_untyped_and_invalid() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("::s");
    assert!(!outcome.result.is_valid);
    assert_eq!(outcome.result.ty, None);
    assert_eq!(outcome.codes(), [diagnostic_codes::UNSUPPORTED]);
}

#[test]
fn bound_reference_is_gated_except_for_objects() {
    let fixture = Fixture::new(COMMON_STUBS)
        .with_feature(LanguageFeature::BoundCallableReferences, false);

    let outcome = fixture.callable_reference("s::length");
    assert_eq!(outcome.codes(), [diagnostic_codes::UNSUPPORTED_FEATURE]);
    assert_eq!(outcome.anchored_text(diagnostic_codes::UNSUPPORTED_FEATURE), "s");
    assert!(outcome.result.resolved.is_some(), "still resolved");

    let outcome = fixture.callable_reference("Obj::ping");
    assert!(outcome.log.diagnostics.is_empty(), "{:?}", outcome.log.diagnostics);
}

#[test]
fn nullable_receiver_needs_a_safe_call() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("n::length");
    assert_eq!(outcome.codes(), [diagnostic_codes::UNSAFE_CALL]);
    assert!(outcome.result.resolved.is_some());

    let outcome = fixture.callable_reference("n!!::length");
    assert!(outcome.log.diagnostics.is_empty(), "{:?}", outcome.log.diagnostics);
}

#[test]
fn overloads_are_ambiguous_when_eager() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("Over::pick");
    assert_eq!(
        outcome.codes(),
        [diagnostic_codes::CALLABLE_REFERENCE_RESOLUTION_AMBIGUITY]
    );
    assert!(outcome.log.diagnostics[0].message_text.contains("pick(Int): Int"));
    assert!(outcome.log.diagnostics[0].message_text.contains("pick(String): Int"));
    assert_eq!(outcome.result.ty, None);
    assert!(!outcome.result.is_valid);
}

#[test]
fn overloads_stay_silent_in_shape_only_mode() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference_in_mode("Over::pick", CallableReferenceMode::ShapeOnly);
    assert!(outcome.log.diagnostics.is_empty(), "{:?}", outcome.log.diagnostics);
    assert!(outcome.result.resolved.is_none());
    assert_eq!(outcome.result.ty, None);

    let outcome = fixture.callable_reference_in_mode("Plain::run", CallableReferenceMode::ShapeOnly);
    assert!(outcome.result.is_valid);
}

#[test]
fn private_member_is_invisible_outside_its_class() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("Secret::hidden");
    assert_eq!(outcome.codes(), [diagnostic_codes::INVISIBLE_MEMBER]);
    assert_eq!(
        outcome.log.diagnostics[0].message_text,
        "Cannot access 'hidden': it is private in 'Secret'."
    );

    let inside = Fixture::new(COMMON_STUBS).inside(&["Secret"]);
    let outcome = inside.callable_reference("Secret::hidden");
    assert!(outcome.log.diagnostics.is_empty(), "{:?}", outcome.log.diagnostics);
    assert!(outcome.result.is_valid);
}

#[test]
fn missing_reflection_makes_the_reference_invalid() {
    let fixture = Fixture::without_reflection(COMMON_STUBS);
    let outcome = fixture.callable_reference("Plain::run");
    assert_eq!(outcome.codes(), [diagnostic_codes::MISSING_DEPENDENCY_CLASS]);
    assert!(outcome.log.diagnostics[0].message_text.contains("kotlin.reflect.KFunction"));
    assert_eq!(outcome.result.ty, Some(callref_solver::TypeId::ERROR));
    assert!(!outcome.result.is_valid);
}

#[test]
fn type_parameter_lhs_is_not_a_class() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("T::toString");
    assert_eq!(
        outcome.codes(),
        [diagnostic_codes::CALLABLE_REFERENCE_LHS_NOT_A_CLASS]
    );
    assert!(outcome.result.resolved.is_none());
}

#[test]
fn error_typed_lhs_skips_the_name_silently() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("Foo<Missing>::get");
    assert_eq!(outcome.codes(), [diagnostic_codes::UNRESOLVED_REFERENCE]);
    assert_eq!(outcome.anchored_text(diagnostic_codes::UNRESOLVED_REFERENCE), "Missing");
    assert!(outcome.result.resolved.is_none());
}

#[test]
fn unresolved_lhs_falls_back_to_scope_lookup() {
    let fixture = Fixture::new(COMMON_STUBS);
    let outcome = fixture.callable_reference("Missing::load");
    // `load` is found in scope; only the left-hand side is unresolved.
    assert_eq!(outcome.codes()[0], diagnostic_codes::UNRESOLVED_REFERENCE);
    assert!(outcome.result.resolved.is_some());

    let outcome = fixture.callable_reference("Missing::nothing");
    assert_eq!(
        outcome.codes(),
        [
            diagnostic_codes::UNRESOLVED_REFERENCE,
            diagnostic_codes::UNRESOLVED_REFERENCE
        ]
    );
    assert_eq!(outcome.anchored_text(diagnostic_codes::UNRESOLVED_REFERENCE), "Missing");
    assert!(outcome.log.diagnostics[1].message_text.contains("nothing"));
}
