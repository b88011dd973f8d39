//! Binding trace with forkable sandboxes.
//!
//! A [`BindingTrace`] collects diagnostics and per-node bindings. A trial
//! resolution runs in a child created by [`BindingTrace::fork`]: the child
//! reads through to its ancestors but writes only to its own [`TraceLog`].
//! The log is either absorbed into the parent (commit) or dropped (discard),
//! so an abandoned interpretation leaves nothing behind.

use crate::context::{Call, ResolvedCall};
use crate::double_colon::ReferenceLhs;
use callref_common::Diagnostic;
use callref_parser::NodeIndex;
use callref_solver::{CallableId, ClassifierId, TypeId};
use rustc_hash::FxHashMap;
use tracing::trace;

/// Placeholder bound to a callable reference for later phases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntheticReference {
    AnonymousFunction { descriptor: CallableId, ty: TypeId },
    PropertyPlaceholder { descriptor: CallableId, ty: TypeId },
}

impl SyntheticReference {
    #[must_use]
    pub const fn ty(&self) -> TypeId {
        match self {
            SyntheticReference::AnonymousFunction { ty, .. }
            | SyntheticReference::PropertyPlaceholder { ty, .. } => *ty,
        }
    }
}

/// Per-node facts recorded during resolution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindingTable {
    pub resolved_calls: FxHashMap<NodeIndex, ResolvedCall>,
    pub calls: FxHashMap<NodeIndex, Call>,
    pub expression_types: FxHashMap<NodeIndex, TypeId>,
    /// Class named by a type-position expression.
    pub qualifiers: FxHashMap<NodeIndex, ClassifierId>,
    /// Keyed by the left-hand side of the `::` expression.
    pub double_colon_lhs: FxHashMap<NodeIndex, ReferenceLhs>,
    /// Keyed by the callable reference expression.
    pub synthetic_references: FxHashMap<NodeIndex, SyntheticReference>,
}

impl BindingTable {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolved_calls.is_empty()
            && self.calls.is_empty()
            && self.expression_types.is_empty()
            && self.qualifiers.is_empty()
            && self.double_colon_lhs.is_empty()
            && self.synthetic_references.is_empty()
    }

    fn merge(&mut self, other: BindingTable) {
        self.resolved_calls.extend(other.resolved_calls);
        self.calls.extend(other.calls);
        self.expression_types.extend(other.expression_types);
        self.qualifiers.extend(other.qualifiers);
        self.double_colon_lhs.extend(other.double_colon_lhs);
        self.synthetic_references.extend(other.synthetic_references);
    }
}

/// Everything written to one trace level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceLog {
    pub diagnostics: Vec<Diagnostic>,
    pub bindings: BindingTable,
}

impl TraceLog {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty() && self.bindings.is_empty()
    }
}

pub struct BindingTrace<'p> {
    name: &'static str,
    parent: Option<&'p BindingTrace<'p>>,
    log: TraceLog,
}

impl BindingTrace<'static> {
    #[must_use]
    pub fn root(name: &'static str) -> Self {
        BindingTrace {
            name,
            parent: None,
            log: TraceLog::default(),
        }
    }
}

impl<'p> BindingTrace<'p> {
    /// A sandbox that sees everything recorded so far in `self` and its
    /// ancestors.
    #[must_use]
    pub fn fork(&self, name: &'static str) -> BindingTrace<'_> {
        trace!(parent = self.name, child = name, "fork trace");
        BindingTrace {
            name,
            parent: Some(self),
            log: TraceLog::default(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Merge a sandbox log into this level.
    pub fn absorb(&mut self, log: TraceLog) {
        trace!(
            into = self.name,
            diagnostics = log.diagnostics.len(),
            "absorb trace log"
        );
        for diagnostic in log.diagnostics {
            self.report(diagnostic);
        }
        self.log.bindings.merge(log.bindings);
    }

    #[must_use]
    pub fn into_log(self) -> TraceLog {
        self.log
    }

    #[must_use]
    pub const fn log(&self) -> &TraceLog {
        &self.log
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Record a diagnostic unless the same code was already reported at the
    /// same range of the same file anywhere along the chain.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        if self.has_diagnostic(&diagnostic) {
            trace!(
                code = diagnostic.code,
                start = diagnostic.start,
                "duplicate diagnostic dropped"
            );
            return;
        }
        self.log.diagnostics.push(diagnostic);
    }

    fn has_diagnostic(&self, diagnostic: &Diagnostic) -> bool {
        let same = |d: &Diagnostic| {
            d.code == diagnostic.code
                && d.start == diagnostic.start
                && d.length == diagnostic.length
                && d.file == diagnostic.file
        };
        self.log.diagnostics.iter().any(same)
            || self.parent.is_some_and(|parent| parent.has_diagnostic(diagnostic))
    }

    /// Diagnostics written to this level only.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.log.diagnostics
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.log.diagnostics.iter().any(Diagnostic::is_error)
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    pub fn record_resolved_call(&mut self, node: NodeIndex, call: ResolvedCall) {
        self.log.bindings.resolved_calls.insert(node, call);
    }

    pub fn record_call(&mut self, node: NodeIndex, call: Call) {
        self.log.bindings.calls.insert(node, call);
    }

    pub fn record_expression_type(&mut self, node: NodeIndex, ty: TypeId) {
        self.log.bindings.expression_types.insert(node, ty);
    }

    pub fn record_qualifier(&mut self, node: NodeIndex, classifier: ClassifierId) {
        self.log.bindings.qualifiers.insert(node, classifier);
    }

    pub fn record_double_colon_lhs(&mut self, node: NodeIndex, lhs: ReferenceLhs) {
        self.log.bindings.double_colon_lhs.insert(node, lhs);
    }

    pub fn record_synthetic_reference(&mut self, node: NodeIndex, reference: SyntheticReference) {
        self.log.bindings.synthetic_references.insert(node, reference);
    }

    #[must_use]
    pub fn resolved_call(&self, node: NodeIndex) -> Option<&ResolvedCall> {
        self.lookup(|table| table.resolved_calls.get(&node))
    }

    #[must_use]
    pub fn call(&self, node: NodeIndex) -> Option<&Call> {
        self.lookup(|table| table.calls.get(&node))
    }

    #[must_use]
    pub fn expression_type(&self, node: NodeIndex) -> Option<TypeId> {
        self.lookup(|table| table.expression_types.get(&node)).copied()
    }

    #[must_use]
    pub fn qualifier(&self, node: NodeIndex) -> Option<ClassifierId> {
        self.lookup(|table| table.qualifiers.get(&node)).copied()
    }

    #[must_use]
    pub fn double_colon_lhs(&self, node: NodeIndex) -> Option<&ReferenceLhs> {
        self.lookup(|table| table.double_colon_lhs.get(&node))
    }

    #[must_use]
    pub fn synthetic_reference(&self, node: NodeIndex) -> Option<&SyntheticReference> {
        self.lookup(|table| table.synthetic_references.get(&node))
    }

    /// Nearest level that has a binding wins.
    fn lookup<'s, T: ?Sized>(
        &'s self,
        get: impl Fn(&'s BindingTable) -> Option<&'s T>,
    ) -> Option<&'s T> {
        let mut level: Option<&'s BindingTrace<'_>> = Some(self);
        while let Some(current) = level {
            if let Some(found) = get(&current.log.bindings) {
                return Some(found);
            }
            level = current.parent;
        }
        None
    }
}

/// A resolution attempt run in a sandbox, not yet committed or discarded.
#[derive(Debug)]
#[must_use = "a trial must be committed or discarded"]
pub struct TrialResult<T> {
    pub value: Option<T>,
    pub log: TraceLog,
}

impl<T> TrialResult<T> {
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.value.is_some()
    }

    pub const fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Merge the sandbox into `trace` and hand out the value.
    pub fn commit(self, trace: &mut BindingTrace<'_>) -> Option<T> {
        trace.absorb(self.log);
        self.value
    }

    /// Drop the sandbox, keeping only the value.
    pub fn discard(self) -> Option<T> {
        trace!(
            dropped_diagnostics = self.log.diagnostics.len(),
            "discard trial"
        );
        self.value
    }
}

#[cfg(test)]
#[path = "../tests/trace_tests.rs"]
mod tests;
