//! Left-hand side of `::`: value, type, or reserved syntax.
//!
//! Each interpretation runs in its own sandbox. A plain value wins outright;
//! otherwise the type interpretation is tried as well and the two are
//! settled by the tie-break in [`DoubleColonResolver::settle_interpretations`].
//! Only the winning sandbox reaches the caller's trace.

use super::syntax_shape;
use super::trial::{ValueTrial, run_trial};
use super::{DoubleColonInput, DoubleColonResolver, ReferenceLhs, TypeLhs, ValueLhs};
use crate::collaborators::{ClassifierRef, ExpressionTypeChecker, PossiblyBareType};
use crate::context::{CallTarget, ResolutionContext};
use crate::error::{ResolveError, ResolveResult};
use crate::trace::{BindingTrace, TrialResult};
use callref_common::{DiagnosticCategory, LanguageFeature, diagnostic_codes};
use callref_parser::{NodeArena, NodeIndex, NodeKind};
use callref_solver::{CallableKind, TypeArg};
use std::iter;
use tracing::debug;

impl DoubleColonResolver<'_> {
    /// Resolve the left-hand side of a `::` expression and record the result
    /// keyed by the left-hand side node. `None` when there is no left-hand
    /// side or no interpretation produced a type.
    pub(crate) fn resolve_double_colon_lhs(
        &self,
        input: DoubleColonInput<'_>,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        expressions: &dyn ExpressionTypeChecker,
    ) -> ResolveResult<Option<ReferenceLhs>> {
        let Some(lhs) = input.receiver else {
            return Ok(None);
        };
        let resolved = self.resolve_interpretations(input, lhs, cx, trace, expressions)?;
        match &resolved {
            Some(result) => {
                debug!(kind = result.kind_name(), ty = ?result.ty(), "double-colon lhs resolved");
                trace.record_double_colon_lhs(lhs, result.clone());
            }
            None => debug!("double-colon lhs unresolved"),
        }
        Ok(resolved)
    }

    fn resolve_interpretations(
        &self,
        input: DoubleColonInput<'_>,
        lhs: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        expressions: &dyn ExpressionTypeChecker,
    ) -> ResolveResult<Option<ReferenceLhs>> {
        let arena = cx.arena;
        let could_be_expression = syntax_shape::could_be_expression(arena, lhs);
        let could_be_type = syntax_shape::could_be_type(arena, lhs);

        let mut deferred_value = None;
        if could_be_expression && !input.has_question_marks {
            let trial = run_trial(trace, "double-colon lhs as value", |sandbox| {
                self.resolve_expression_on_lhs(lhs, could_be_type, cx, sandbox, expressions)
            })?;
            match settle_value_trial(trial, trace) {
                ValueTrial::CommittedNow(result) => return Ok(Some(result)),
                ValueTrial::DeferredPendingTieBreak(trial) => deferred_value = Some(trial),
            }
        }

        let is_reserved_call = syntax_shape::is_reserved_call_shape(arena, lhs);
        if (input.has_question_marks && could_be_expression) || is_reserved_call {
            let trial = run_trial(trace, "double-colon lhs as reserved expression", |sandbox| {
                self.resolve_reserved_expression_on_lhs(
                    input,
                    lhs,
                    could_be_type,
                    cx,
                    sandbox,
                    expressions,
                )
            })?;
            if trial.succeeded() {
                debug!("reserved syntax resolved as an expression");
                report_reserved_syntax(lhs, cx, trace);
                if let Some(value) = deferred_value {
                    value.discard();
                }
                return Ok(trial.commit(trace));
            }
            trial.discard();
        }

        if let Some(segments) = syntax_shape::reserved_chain_segments(arena, lhs) {
            let mut synthetic = NodeArena::synthetic_after(arena);
            if let Some(chain) = synthetic.add_dotted_chain(&segments) {
                let chain_cx = cx.with_arena(&synthetic);
                let chain_could_be_type = syntax_shape::could_be_type(&synthetic, chain);
                let trial = run_trial(trace, "double-colon lhs as reserved call chain", |sandbox| {
                    self.resolve_expression_on_lhs(
                        chain,
                        chain_could_be_type,
                        &chain_cx,
                        sandbox,
                        expressions,
                    )
                })?;
                if trial.succeeded() {
                    // The chain only proves the syntax is reserved; the
                    // reference itself stays unresolved.
                    debug!("reserved call chain resolved as an expression");
                    report_reserved_syntax(lhs, cx, trace);
                    trial.discard();
                    if let Some(value) = deferred_value {
                        value.discard();
                    }
                    return Ok(None);
                }
                trial.discard();
            }
        }

        let type_trial = if could_be_type {
            Some(run_trial(trace, "double-colon lhs as type", |sandbox| {
                self.resolve_type_on_lhs(input, lhs, cx, sandbox)
            })?)
        } else {
            None
        };

        Ok(settle_interpretations(deferred_value, type_trial, trace))
    }

    /// The value interpretation shared by the plain and reserved attempts.
    /// Rejects values that would shadow a type reading of the same syntax:
    /// functions when the syntax could be a type, and classes reached through
    /// their companion.
    fn resolve_expression_on_lhs(
        &self,
        node: NodeIndex,
        could_be_type: bool,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        expressions: &dyn ExpressionTypeChecker,
    ) -> ResolveResult<Option<ReferenceLhs>> {
        let info = expressions.resolve_expression(node, cx, trace)?;
        let Some(ty) = info.ty else {
            return Ok(None);
        };

        let mut is_singleton_qualifier = false;
        let target = syntax_shape::qualified_element_selector(cx.arena, node)
            .and_then(|selector| trace.resolved_call(selector))
            .map(|call| call.target);
        match target {
            Some(CallTarget::Callable(id)) => {
                let is_function = cx.defs.callable(id).is_some_and(|callable| {
                    matches!(
                        callable.kind,
                        CallableKind::Function { .. } | CallableKind::Constructor { .. }
                    )
                });
                if is_function && could_be_type {
                    return Ok(None);
                }
            }
            Some(CallTarget::ObjectValue(classifier)) => {
                let Some(info) = cx.defs.classifier(classifier) else {
                    return Ok(None);
                };
                if info.companion.is_some() {
                    return Ok(None);
                }
                is_singleton_qualifier = info.is_object();
            }
            None => {}
        }

        Ok(Some(ReferenceLhs::Value(ValueLhs {
            ty,
            is_singleton_qualifier,
            flow: info.flow,
        })))
    }

    /// `foo<T>::bar` resolves the callee and its type arguments; `a?::b`
    /// resolves `a`.
    fn resolve_reserved_expression_on_lhs(
        &self,
        input: DoubleColonInput<'_>,
        lhs: NodeIndex,
        could_be_type: bool,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        expressions: &dyn ExpressionTypeChecker,
    ) -> ResolveResult<Option<ReferenceLhs>> {
        if let Some(NodeKind::Call(call)) = cx.arena.kind(lhs) {
            if !call.type_args.is_empty() {
                let callee_could_be_type = syntax_shape::could_be_type(cx.arena, call.callee);
                let resolved = self.resolve_expression_on_lhs(
                    call.callee,
                    callee_could_be_type,
                    cx,
                    trace,
                    expressions,
                )?;
                if resolved.is_none() {
                    return Ok(None);
                }
                self.qualifiers
                    .resolve_type_arguments(&call.type_args, cx, trace)?;
                return Ok(resolved);
            }
        }
        if input.has_question_marks {
            return self.resolve_expression_on_lhs(lhs, could_be_type, cx, trace, expressions);
        }
        Ok(None)
    }

    fn resolve_type_on_lhs(
        &self,
        input: DoubleColonInput<'_>,
        lhs: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<Option<ReferenceLhs>> {
        let qualifier = self.qualifiers.resolve_double_colon_lhs(lhs, cx, trace)?;
        let mut projections = qualifier.projections;
        if projections.is_empty() && !input.type_args.is_empty() {
            projections = input.type_args.to_vec();
        }

        let Some(classifier) = qualifier.classifier else {
            self.qualifiers
                .resolve_type_arguments(&projections, cx, trace)?;
            return Ok(None);
        };

        let resolved =
            self.qualifiers
                .resolve_type_for_classifier(lhs, classifier, &projections, cx, trace)?;
        let nullable = input.has_question_marks;
        let type_lhs = match resolved {
            PossiblyBareType::Bare(ClassifierRef::Class(class)) => {
                let params = cx
                    .defs
                    .classifier(class)
                    .map_or(0, |info| info.type_params.len());
                let ty = cx
                    .types
                    .class_type(class, iter::repeat_n(TypeArg::Star, params), nullable);
                TypeLhs { ty, is_bare: true }
            }
            PossiblyBareType::Bare(ClassifierRef::TypeParameter(param)) => {
                let name = cx
                    .defs
                    .type_param(param)
                    .map(|info| info.name.clone())
                    .unwrap_or_default();
                return Err(ResolveError::BareTypeNotAClass { classifier: name });
            }
            PossiblyBareType::Actual(ty) => TypeLhs {
                ty: if nullable {
                    cx.types.make_nullable(ty)
                } else {
                    ty
                },
                is_bare: false,
            },
        };
        Ok(Some(ReferenceLhs::Type(type_lhs)))
    }
}

/// Commit a plain value right away; hold back an object value or a failure
/// for the tie-break.
fn settle_value_trial(trial: TrialResult<ReferenceLhs>, trace: &mut BindingTrace<'_>) -> ValueTrial {
    match trial {
        TrialResult {
            value:
                Some(
                    result @ ReferenceLhs::Value(ValueLhs {
                        is_singleton_qualifier: false,
                        ..
                    }),
                ),
            log,
        } => {
            debug!("lhs is a value, committed");
            trace.absorb(log);
            ValueTrial::CommittedNow(result)
        }
        deferred => ValueTrial::DeferredPendingTieBreak(deferred),
    }
}

/// Pick between the held-back value trial and the type trial. An object
/// that is also the type keeps the value reading; otherwise a type beats a
/// value. When neither succeeded the value attempt's diagnostics win.
fn settle_interpretations(
    value: Option<TrialResult<ReferenceLhs>>,
    ty: Option<TrialResult<ReferenceLhs>>,
    trace: &mut BindingTrace<'_>,
) -> Option<ReferenceLhs> {
    let value_ty = value.as_ref().and_then(|t| t.value()).map(ReferenceLhs::ty);
    let type_ty = ty.as_ref().and_then(|t| t.value()).map(ReferenceLhs::ty);

    match (value, ty) {
        (Some(value), Some(ty)) if value_ty.is_some() && value_ty == type_ty => {
            debug!("object value and type agree, keeping the value");
            ty.discard();
            value.commit(trace)
        }
        (value, Some(ty)) if type_ty.is_some() => {
            debug!("type interpretation wins");
            if let Some(value) = value {
                value.discard();
            }
            ty.commit(trace)
        }
        (Some(value), ty) => {
            debug!(success = value_ty.is_some(), "value interpretation kept");
            if let Some(ty) = ty {
                ty.discard();
            }
            value.commit(trace)
        }
        (None, Some(ty)) => ty.commit(trace),
        (None, None) => None,
    }
}

fn report_reserved_syntax(lhs: NodeIndex, cx: &ResolutionContext<'_>, trace: &mut BindingTrace<'_>) {
    let diagnostic = cx.diagnostic(
        lhs,
        diagnostic_codes::RESERVED_SYNTAX_IN_CALLABLE_REFERENCE_LHS,
        &[],
    );
    let diagnostic = if cx
        .features
        .supports(LanguageFeature::ProhibitReservedReferenceSyntax)
    {
        diagnostic
    } else {
        diagnostic.with_category(DiagnosticCategory::Warning)
    };
    trace.report(diagnostic);
}
