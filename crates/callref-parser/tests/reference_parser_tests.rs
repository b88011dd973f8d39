//! Shape tests for the reference-expression parser.

use callref_parser::{NodeKind, ParsedReference, parse_reference};

fn parse(source: &str) -> ParsedReference {
    parse_reference(source).unwrap_or_else(|err| panic!("failed to parse {source:?}: {err}"))
}

fn receiver_of(parsed: &ParsedReference) -> Option<callref_parser::NodeIndex> {
    match parsed.arena.kind(parsed.root) {
        Some(NodeKind::CallableReference(data)) => data.receiver,
        Some(NodeKind::ClassLiteral(data)) => data.receiver,
        other => panic!("unexpected root {other:?}"),
    }
}

#[test]
fn class_literal_with_question_marks() {
    let parsed = parse("Foo?::class");
    let Some(NodeKind::ClassLiteral(data)) = parsed.arena.kind(parsed.root) else {
        panic!("expected a class literal");
    };
    assert!(data.has_question_marks);
    assert_eq!(parsed.arena.render(parsed.root), "Foo?::class");
}

#[test]
fn generic_segment_without_arguments_is_a_call_without_value_arguments() {
    let parsed = parse("Foo<Int>::bar");
    let lhs = receiver_of(&parsed).expect("has lhs");
    let Some(NodeKind::Call(call)) = parsed.arena.kind(lhs) else {
        panic!("expected a call shape");
    };
    assert!(call.is_without_value_arguments());
    assert_eq!(call.type_args.len(), 1);
}

#[test]
fn empty_parentheses_are_a_value_argument_list() {
    let parsed = parse("Foo<Int>()::bar");
    let lhs = receiver_of(&parsed).expect("has lhs");
    let Some(NodeKind::Call(call)) = parsed.arena.kind(lhs) else {
        panic!("expected a call");
    };
    assert!(!call.is_without_value_arguments());
    assert_eq!(call.value_argument_count(), 0);
}

#[test]
fn trailing_lambda_counts_as_an_argument() {
    let parsed = parse("run { x }::length");
    let lhs = receiver_of(&parsed).expect("has lhs");
    let Some(NodeKind::Call(call)) = parsed.arena.kind(lhs) else {
        panic!("expected a call");
    };
    assert!(call.value_args.is_none());
    assert_eq!(call.value_argument_count(), 1);
}

#[test]
fn dotted_chain_with_generic_segment() {
    let parsed = parse("a.b<String>.c::d");
    assert_eq!(parsed.arena.render(parsed.root), "a.b<String>.c::d");
    let lhs = receiver_of(&parsed).expect("has lhs");
    assert!(matches!(
        parsed.arena.kind(lhs),
        Some(NodeKind::DotQualified(_))
    ));
}

#[test]
fn empty_reference_name_is_kept() {
    let parsed = parse("Foo::");
    let Some(NodeKind::CallableReference(data)) = parsed.arena.kind(parsed.root) else {
        panic!("expected a callable reference");
    };
    assert_eq!(parsed.arena.name_text(data.reference), Some(""));
}

#[test]
fn empty_lhs_reference() {
    let parsed = parse("::println");
    assert!(receiver_of(&parsed).is_none());
}

#[test]
fn not_null_and_safe_calls() {
    let parsed = parse("a?.b!!::c");
    assert_eq!(parsed.arena.render(parsed.root), "a?.b!!::c");
}

#[test]
fn nested_type_arguments_and_star() {
    let parsed = parse("Map<String, List<*>>::class");
    assert_eq!(parsed.arena.render(parsed.root), "Map<String, List<*>>::class");
}

#[test]
fn missing_double_colon_is_an_error() {
    let err = parse_reference("Foo.bar").expect_err("no '::'");
    assert!(err.message.contains("'::'"), "{}", err.message);
}
