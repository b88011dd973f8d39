//! Ordered resolution of several references in one session.

mod support;

use callref_checker::{
    CancellationToken, ReferenceResolution, ResolutionSession, ResolveError, SessionOutcome,
    SessionReference,
};
use callref_common::diagnostic_codes;
use callref_parser::{NodeArena, parse_reference_into};
use support::{COMMON_STUBS, Fixture};

fn parse_all(sources: &[&str]) -> (NodeArena, Vec<SessionReference>) {
    let mut arena = NodeArena::new();
    let references = sources
        .iter()
        .enumerate()
        .map(|(i, source)| SessionReference {
            root: parse_reference_into(&mut arena, source).expect("reference parses"),
            file_name: format!("ref{i}.kt"),
        })
        .collect();
    (arena, references)
}

#[test]
fn resolves_references_in_order() {
    let fixture = Fixture::new(COMMON_STUBS);
    let (arena, references) = parse_all(&["Plain::run", "s::class", "Obj::ping"]);
    let session = ResolutionSession::new(&arena, &fixture.types, &fixture.defs, &fixture.symbols);

    let outcome = session.resolve_all(&references).expect("not cancelled");
    assert!(outcome.is_success());
    assert!(outcome.diagnostics().is_empty(), "{:?}", outcome.diagnostics());

    let results = outcome.results();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].root, references[0].root);
    assert!(matches!(
        &results[0].resolution,
        ReferenceResolution::CallableReference(r) if r.is_valid
    ));
    let ReferenceResolution::ClassLiteral(literal) = &results[1].resolution else {
        panic!("expected a class literal");
    };
    assert_eq!(fixture.format(literal.ty), "KClass<out String>");
    assert_eq!(outcome.bindings().double_colon_lhs.len(), 3);
}

#[test]
fn any_error_fails_the_session_but_keeps_results() {
    let fixture = Fixture::new(COMMON_STUBS);
    let (arena, references) = parse_all(&["Plain::run", "Missing::nothing"]);
    let session = ResolutionSession::new(&arena, &fixture.types, &fixture.defs, &fixture.symbols);

    let outcome = session.resolve_all(&references).expect("not cancelled");
    let SessionOutcome::Failure {
        results,
        diagnostics,
        ..
    } = &outcome
    else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(results.len(), 2);
    assert!(diagnostics
        .iter()
        .all(|d| d.code == diagnostic_codes::UNRESOLVED_REFERENCE && d.file == "ref1.kt"));
}

#[test]
fn same_range_in_different_references_is_reported_for_each() {
    let fixture = Fixture::new(COMMON_STUBS);
    let (arena, references) = parse_all(&["Missing::class", "Absent1::class"]);
    let session = ResolutionSession::new(&arena, &fixture.types, &fixture.defs, &fixture.symbols);

    let outcome = session.resolve_all(&references).expect("not cancelled");
    let reported: Vec<(&str, u32)> = outcome
        .diagnostics()
        .iter()
        .map(|d| (d.file.as_str(), d.code))
        .collect();
    assert_eq!(
        reported,
        [
            ("ref0.kt", diagnostic_codes::UNRESOLVED_REFERENCE),
            ("ref1.kt", diagnostic_codes::UNRESOLVED_REFERENCE),
        ]
    );
}

#[test]
fn scope_owner_applies_to_every_reference() {
    let fixture = Fixture::new(COMMON_STUBS);
    let secret = fixture.classifier(&["Secret"]);
    let (arena, references) = parse_all(&["Secret::hidden"]);

    let outside = ResolutionSession::new(&arena, &fixture.types, &fixture.defs, &fixture.symbols);
    assert!(!outside.resolve_all(&references).expect("not cancelled").is_success());

    let inside = ResolutionSession::new(&arena, &fixture.types, &fixture.defs, &fixture.symbols)
        .with_scope_owner(Some(secret));
    assert!(inside.resolve_all(&references).expect("not cancelled").is_success());
}

#[test]
fn cancelled_token_stops_before_the_next_reference() {
    let fixture = Fixture::new(COMMON_STUBS);
    let (arena, references) = parse_all(&["Plain::run", "Obj::ping"]);
    let token = CancellationToken::new();
    let session = ResolutionSession::new(&arena, &fixture.types, &fixture.defs, &fixture.symbols)
        .with_cancellation(token.clone());

    token.cancel();
    assert!(token.is_cancelled());
    assert_eq!(session.resolve_all(&references), Err(ResolveError::Cancelled));
}

#[test]
fn empty_session_succeeds() {
    let fixture = Fixture::new(COMMON_STUBS);
    let arena = NodeArena::new();
    let session = ResolutionSession::new(&arena, &fixture.types, &fixture.defs, &fixture.symbols);
    let outcome = session.resolve_all(&[]).expect("not cancelled");
    assert!(outcome.is_success());
    assert!(outcome.results().is_empty());
    assert!(outcome.bindings().is_empty());
}
