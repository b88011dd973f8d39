//! Batch resolution of reference expressions.
//!
//! A [`ResolutionSession`] resolves a list of parsed `::` expressions in
//! order against one ambient trace, using the scope-based collaborators.
//! The driver can stop it between expressions through a
//! [`CancellationToken`].

use crate::collaborators::ClassLiteralChecker;
use crate::context::{CallableReferenceMode, ResolutionContext};
use crate::double_colon::{CallableReferenceResolution, ClassLiteralResolution, DoubleColonResolver};
use crate::error::{ResolveError, ResolveResult};
use crate::symbols::{ScopeCallResolver, ScopeExpressionChecker, ScopeQualifierResolver};
use crate::trace::{BindingTable, BindingTrace};
use callref_binder::SymbolTable;
use callref_common::{Diagnostic, LanguageFeatures};
use callref_parser::{NodeArena, NodeIndex, NodeKind};
use callref_solver::{ClassifierId, DefinitionStore, TypeInterner};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Shared stop flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A parsed reference expression and the file its diagnostics belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReference {
    pub root: NodeIndex,
    pub file_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceResolution {
    ClassLiteral(ClassLiteralResolution),
    CallableReference(CallableReferenceResolution),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionResult {
    pub root: NodeIndex,
    pub resolution: ReferenceResolution,
}

/// Everything committed by a session. `Failure` when any error-category
/// diagnostic was committed; results are kept either way.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOutcome {
    Success {
        results: Vec<SessionResult>,
        diagnostics: Vec<Diagnostic>,
        bindings: BindingTable,
    },
    Failure {
        results: Vec<SessionResult>,
        diagnostics: Vec<Diagnostic>,
        bindings: BindingTable,
    },
}

impl SessionOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, SessionOutcome::Success { .. })
    }

    #[must_use]
    pub fn results(&self) -> &[SessionResult] {
        match self {
            SessionOutcome::Success { results, .. } | SessionOutcome::Failure { results, .. } => {
                results
            }
        }
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            SessionOutcome::Success { diagnostics, .. }
            | SessionOutcome::Failure { diagnostics, .. } => diagnostics,
        }
    }

    #[must_use]
    pub const fn bindings(&self) -> &BindingTable {
        match self {
            SessionOutcome::Success { bindings, .. } | SessionOutcome::Failure { bindings, .. } => {
                bindings
            }
        }
    }
}

pub struct ResolutionSession<'a> {
    arena: &'a NodeArena,
    types: &'a TypeInterner,
    defs: &'a DefinitionStore,
    symbols: &'a SymbolTable,
    features: LanguageFeatures,
    scope_owner: Option<ClassifierId>,
    cancellation: CancellationToken,
    expressions: ScopeExpressionChecker,
    qualifiers: ScopeQualifierResolver,
    calls: ScopeCallResolver,
    class_literal_checkers: Vec<&'a dyn ClassLiteralChecker>,
}

impl<'a> ResolutionSession<'a> {
    pub fn new(
        arena: &'a NodeArena,
        types: &'a TypeInterner,
        defs: &'a DefinitionStore,
        symbols: &'a SymbolTable,
    ) -> Self {
        ResolutionSession {
            arena,
            types,
            defs,
            symbols,
            features: LanguageFeatures::default(),
            scope_owner: None,
            cancellation: CancellationToken::new(),
            expressions: ScopeExpressionChecker::new(),
            qualifiers: ScopeQualifierResolver::new(),
            calls: ScopeCallResolver::new(),
            class_literal_checkers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_features(mut self, features: LanguageFeatures) -> Self {
        self.features = features;
        self
    }

    /// Resolve as if inside the body of `owner`.
    #[must_use]
    pub fn with_scope_owner(mut self, owner: Option<ClassifierId>) -> Self {
        self.scope_owner = owner;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    #[must_use]
    pub fn with_class_literal_checker(mut self, checker: &'a dyn ClassLiteralChecker) -> Self {
        self.class_literal_checkers.push(checker);
        self
    }

    /// Resolve `references` in order. Cancellation is checked before each
    /// one, never in the middle of an expression.
    pub fn resolve_all(&self, references: &[SessionReference]) -> ResolveResult<SessionOutcome> {
        let mut resolver = DoubleColonResolver::new(&self.qualifiers, &self.calls);
        for checker in &self.class_literal_checkers {
            resolver = resolver.with_class_literal_checker(*checker);
        }
        let mut trace = BindingTrace::root("session");
        let mut results = Vec::with_capacity(references.len());

        for reference in references {
            if self.cancellation.is_cancelled() {
                info!(resolved = results.len(), "resolution session cancelled");
                return Err(ResolveError::Cancelled);
            }
            let cx = ResolutionContext::new(
                self.arena,
                &reference.file_name,
                self.types,
                self.defs,
                self.symbols,
                &self.features,
            )
            .with_scope_owner(self.scope_owner);
            let resolution = self.resolve_one(&resolver, reference.root, &cx, &mut trace)?;
            results.push(SessionResult {
                root: reference.root,
                resolution,
            });
        }

        let has_errors = trace.has_errors();
        let log = trace.into_log();
        debug!(
            references = results.len(),
            diagnostics = log.diagnostics.len(),
            has_errors,
            "resolution session finished"
        );
        Ok(if has_errors {
            SessionOutcome::Failure {
                results,
                diagnostics: log.diagnostics,
                bindings: log.bindings,
            }
        } else {
            SessionOutcome::Success {
                results,
                diagnostics: log.diagnostics,
                bindings: log.bindings,
            }
        })
    }

    fn resolve_one(
        &self,
        resolver: &DoubleColonResolver<'_>,
        root: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<ReferenceResolution> {
        match self.arena.kind(root) {
            Some(NodeKind::ClassLiteral(_)) => resolver
                .resolve_class_literal(root, cx, trace, &self.expressions)
                .map(ReferenceResolution::ClassLiteral),
            Some(NodeKind::CallableReference(_)) => resolver
                .resolve_callable_reference(
                    root,
                    cx,
                    trace,
                    &self.expressions,
                    CallableReferenceMode::Eager,
                )
                .map(ReferenceResolution::CallableReference),
            _ => Err(ResolveError::UnexpectedNode {
                node: root,
                expected: "class literal or callable reference",
            }),
        }
    }
}
