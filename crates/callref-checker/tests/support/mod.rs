//! Shared fixture for the resolution integration tests: bind a stub file,
//! parse a reference, resolve it with the scope-based collaborators.

#![allow(dead_code)]

use callref_binder::{SymbolTable, bind_declarations};
use callref_checker::{
    BindingTrace, CallableReferenceMode, CallableReferenceResolution, ClassLiteralChecker,
    ClassLiteralResolution, DoubleColonResolver, ResolutionContext, ScopeCallResolver,
    ScopeExpressionChecker, ScopeQualifierResolver, TraceLog,
};
use callref_common::{Diagnostic, LanguageFeature, LanguageFeatures};
use callref_parser::{ParsedReference, parse_declarations, parse_reference};
use callref_solver::{ClassifierId, DefinitionStore, TypeFormatter, TypeId, TypeInterner};

pub const FILE: &str = "test.kt";

pub struct Fixture {
    pub types: TypeInterner,
    pub defs: DefinitionStore,
    pub symbols: SymbolTable,
    pub features: LanguageFeatures,
    pub scope_owner: Option<ClassifierId>,
}

/// A resolution result together with everything it wrote to the trace.
pub struct Outcome<T> {
    pub result: T,
    pub log: TraceLog,
    pub parsed: ParsedReference,
}

impl<T> Outcome<T> {
    pub fn codes(&self) -> Vec<u32> {
        self.log.diagnostics.iter().map(|d| d.code).collect()
    }

    pub fn diagnostic(&self, code: u32) -> &Diagnostic {
        self.log
            .diagnostics
            .iter()
            .find(|d| d.code == code)
            .unwrap_or_else(|| panic!("no diagnostic {code} in {:?}", self.log.diagnostics))
    }

    /// Source text a diagnostic points at.
    pub fn anchored_text(&self, code: u32) -> &str {
        let diagnostic = self.diagnostic(code);
        let start = diagnostic.start as usize;
        &self.parsed.source[start..start + diagnostic.length as usize]
    }
}

impl Fixture {
    pub fn new(stubs: &str) -> Self {
        Self::build(stubs, true)
    }

    pub fn without_reflection(stubs: &str) -> Self {
        Self::build(stubs, false)
    }

    fn build(stubs: &str, reflection: bool) -> Self {
        let file = parse_declarations(stubs).expect("stubs parse");
        let types = TypeInterner::new();
        let mut defs = DefinitionStore::with_builtins(&types, reflection);
        let output = bind_declarations(&file, "decls.kt", &types, &mut defs);
        assert!(output.diagnostics.is_empty(), "stub diagnostics: {:?}", output.diagnostics);
        Fixture {
            types,
            defs,
            symbols: output.symbols,
            features: LanguageFeatures::default(),
            scope_owner: None,
        }
    }

    pub fn with_feature(mut self, feature: LanguageFeature, supported: bool) -> Self {
        self.features = self.features.with(feature, supported);
        self
    }

    /// Resolve inside the body of the class at `path`.
    pub fn inside(mut self, path: &[&str]) -> Self {
        self.scope_owner = Some(self.classifier(path));
        self
    }

    pub fn classifier(&self, path: &[&str]) -> ClassifierId {
        self.symbols
            .classifier_by_path(&self.defs, path)
            .unwrap_or_else(|| panic!("no classifier {path:?}"))
    }

    pub fn format(&self, ty: TypeId) -> String {
        TypeFormatter::new(&self.types, &self.defs).format(ty)
    }

    pub fn class_literal(&self, source: &str) -> Outcome<ClassLiteralResolution> {
        self.class_literal_checked(source, &[])
    }

    pub fn class_literal_checked(
        &self,
        source: &str,
        checkers: &[&dyn ClassLiteralChecker],
    ) -> Outcome<ClassLiteralResolution> {
        let parsed = parse_reference(source).expect("reference parses");
        let qualifiers = ScopeQualifierResolver::new();
        let calls = ScopeCallResolver::new();
        let expressions = ScopeExpressionChecker::new();
        let mut resolver = DoubleColonResolver::new(&qualifiers, &calls);
        for checker in checkers {
            resolver = resolver.with_class_literal_checker(*checker);
        }
        let cx = self.context(&parsed);
        let mut trace = BindingTrace::root("test");
        let result = resolver
            .resolve_class_literal(parsed.root, &cx, &mut trace, &expressions)
            .expect("resolution succeeds");
        Outcome {
            result,
            log: trace.into_log(),
            parsed,
        }
    }

    pub fn callable_reference(&self, source: &str) -> Outcome<CallableReferenceResolution> {
        self.callable_reference_in_mode(source, CallableReferenceMode::Eager)
    }

    pub fn callable_reference_in_mode(
        &self,
        source: &str,
        mode: CallableReferenceMode,
    ) -> Outcome<CallableReferenceResolution> {
        let parsed = parse_reference(source).expect("reference parses");
        let qualifiers = ScopeQualifierResolver::new();
        let calls = ScopeCallResolver::new();
        let expressions = ScopeExpressionChecker::new();
        let resolver = DoubleColonResolver::new(&qualifiers, &calls);
        let cx = self.context(&parsed);
        let mut trace = BindingTrace::root("test");
        let result = resolver
            .resolve_callable_reference(parsed.root, &cx, &mut trace, &expressions, mode)
            .expect("resolution succeeds");
        Outcome {
            result,
            log: trace.into_log(),
            parsed,
        }
    }

    fn context<'a>(&'a self, parsed: &'a ParsedReference) -> ResolutionContext<'a> {
        ResolutionContext::new(
            &parsed.arena,
            FILE,
            &self.types,
            &self.defs,
            &self.symbols,
            &self.features,
        )
        .with_scope_owner(self.scope_owner)
    }
}

/// Stubs most tests resolve against.
pub const COMMON_STUBS: &str = r#"
class Plain {
    fun run(x: Int): String
}
class Foo<T> {
    fun get(): T
    val size: Int
    companion object { fun create(): Foo<Int> }
}
object Obj { fun ping(): Int }
class Counter {
    var count: Int
    var label: String private set
}
class Over {
    fun pick(x: Int): Int
    fun pick(x: String): Int
}
class Secret { private fun hidden(): Int }
annotation class Marker
class Host { fun Plain.helper(): Int }
class Holder { val box: Box }
class Box { val plain: Plain }
suspend fun load(): String
local val s: String
local val n: String?
local val holder: Holder
local val plains: Plain
typeparam T
typeparam reified R
typeparam reified S : Any
"#;
