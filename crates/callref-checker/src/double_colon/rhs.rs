//! `lhs::name`: the name after `::`, resolved against receivers derived
//! from the left-hand side, then checked and typed.

use super::class_literal::report_unsupported_feature;
use super::syntax_shape;
use super::trial::run_trial;
use super::{
    CallableReferenceResolution, DoubleColonInput, DoubleColonResolver, ReferenceLhs,
};
use crate::collaborators::ExpressionTypeChecker;
use crate::context::{
    Call, CallableReferenceMode, OverloadResolutionResults, Receiver, ResolutionContext,
};
use crate::error::{ResolveError, ResolveResult};
use crate::trace::BindingTrace;
use callref_common::{LanguageFeature, diagnostic_codes};
use callref_parser::{ClassKind, NodeIndex};
use callref_solver::{CallableId, CallableKind, TypeId};
use smallvec::SmallVec;
use tracing::debug;

enum RhsResolution {
    /// Resolution was not attempted; the reason is already reported.
    NotAttempted,
    /// No receiver produced any candidate.
    NoResult,
    Results(OverloadResolutionResults),
}

impl DoubleColonResolver<'_> {
    pub(crate) fn callable_reference(
        &self,
        input: DoubleColonInput<'_>,
        reference: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        expressions: &dyn ExpressionTypeChecker,
        mode: CallableReferenceMode,
    ) -> ResolveResult<CallableReferenceResolution> {
        let name = cx
            .arena
            .name_text(reference)
            .ok_or(ResolveError::UnexpectedNode {
                node: reference,
                expected: "reference name",
            })?;

        if name.is_empty() {
            // Recovered `lhs::` with nothing after it.
            let lhs = self.resolve_double_colon_lhs(input, cx, trace, expressions)?;
            let rendered = cx.arena.render(input.expression);
            trace.report(cx.diagnostic(
                reference,
                diagnostic_codes::UNRESOLVED_REFERENCE,
                &[&rendered],
            ));
            trace.record_expression_type(input.expression, TypeId::ERROR);
            return Ok(CallableReferenceResolution::failed(lhs, Some(TypeId::ERROR)));
        }

        let lhs = self.resolve_double_colon_lhs(input, cx, trace, expressions)?;
        if let (Some(receiver), Some(ReferenceLhs::Value(value))) = (input.receiver, &lhs) {
            if !value.is_singleton_qualifier
                && !cx.features.supports(LanguageFeature::BoundCallableReferences)
            {
                report_unsupported_feature(receiver, cx, trace);
            }
        }

        let results = match self.resolve_rhs(input, reference, name, lhs.as_ref(), cx, trace, mode)? {
            RhsResolution::NotAttempted => return Ok(CallableReferenceResolution::failed(lhs, None)),
            RhsResolution::NoResult => {
                trace.report(cx.diagnostic(
                    reference,
                    diagnostic_codes::UNRESOLVED_REFERENCE,
                    &[name],
                ));
                return Ok(CallableReferenceResolution::failed(lhs, None));
            }
            RhsResolution::Results(results) => results,
        };

        let Some(call) = results.resulting_call().cloned() else {
            debug!(?results, "no single candidate for callable reference");
            return Ok(CallableReferenceResolution::failed(lhs, None));
        };
        let Some(target) = call.callable() else {
            return Ok(CallableReferenceResolution::failed(lhs, None));
        };

        let allowed = check_reference_is_to_allowed_member(input, reference, target, cx, trace);
        let ty = self.create_reference_type(input.expression, &call, lhs.as_ref(), cx, trace);
        if let Some(ty) = ty {
            trace.record_expression_type(input.expression, ty);
        }
        let is_valid = allowed && ty.is_some_and(|ty| !ty.is_error());
        debug!(name, is_valid, "callable reference resolved");
        Ok(CallableReferenceResolution {
            lhs,
            resolved: Some(call),
            ty,
            is_valid,
        })
    }

    /// Receivers to try, in order, for the resolved left-hand side.
    fn resolve_rhs(
        &self,
        input: DoubleColonInput<'_>,
        reference: NodeIndex,
        name: &str,
        lhs: Option<&ReferenceLhs>,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        mode: CallableReferenceMode,
    ) -> ResolveResult<RhsResolution> {
        let mut receivers: SmallVec<[Option<Receiver>; 2]> = SmallVec::new();
        match (lhs, input.receiver) {
            (Some(lhs), _) if lhs.ty().is_error() => {
                debug!("left-hand side is an error type, reference not resolved");
                return Ok(RhsResolution::NotAttempted);
            }
            (Some(ReferenceLhs::Type(type_lhs)), Some(lhs_node)) => {
                if cx.types.classifier_of(type_lhs.ty).is_none() {
                    trace.report(cx.diagnostic(
                        input.expression,
                        diagnostic_codes::CALLABLE_REFERENCE_LHS_NOT_A_CLASS,
                        &[],
                    ));
                    return Ok(RhsResolution::NotAttempted);
                }
                if let Some(classifier) = trace.qualifier(lhs_node) {
                    receivers.push(Some(Receiver::ClassQualifier {
                        node: lhs_node,
                        classifier,
                    }));
                }
                receivers.push(Some(Receiver::Transient(type_lhs.ty)));
            }
            (Some(ReferenceLhs::Value(value)), Some(lhs_node)) => {
                receivers.push(Some(Receiver::Expression {
                    node: lhs_node,
                    ty: value.ty,
                }));
                if value.is_singleton_qualifier {
                    let qualifier = syntax_shape::callee_name(cx.arena, lhs_node)
                        .zip(cx.types.classifier_of(value.ty));
                    if let Some((node, classifier)) = qualifier {
                        receivers.push(Some(Receiver::ClassQualifier { node, classifier }));
                    }
                }
            }
            // No left-hand side, or one that did not resolve: the name is
            // looked up in scope.
            _ => receivers.push(None),
        }

        for receiver in receivers {
            let attempt =
                self.try_resolve_with_receiver(reference, name, receiver, cx, trace, mode)?;
            if let Some(results) = attempt {
                return Ok(RhsResolution::Results(results));
            }
        }
        Ok(RhsResolution::NoResult)
    }

    /// One overload resolution in a sandbox. Kept when it found anything
    /// usable for `mode`; `None` when it found nothing at all.
    fn try_resolve_with_receiver(
        &self,
        reference: NodeIndex,
        name: &str,
        receiver: Option<Receiver>,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        mode: CallableReferenceMode,
    ) -> ResolveResult<Option<OverloadResolutionResults>> {
        let call = match trace.call(reference) {
            Some(prior) => prior.with_receiver(receiver),
            None => Call {
                callee: reference,
                name: name.to_string(),
                receiver,
            },
        };
        debug!(
            receiver = receiver.as_ref().map_or("none", Receiver::describe),
            "trying callable reference receiver"
        );

        let trial = run_trial(trace, "callable reference rhs", |sandbox| {
            sandbox.record_call(reference, call.clone());
            self.calls
                .resolve_call_for_member(&call, cx, sandbox, mode)
                .map(Some)
        })?;
        let keep = trial.value().is_some_and(|results| match mode {
            CallableReferenceMode::ShapeOnly => results.is_single_result(),
            CallableReferenceMode::Eager => !results.is_nothing(),
        });
        let results = if keep {
            trial.commit(trace)
        } else {
            trial.discard()
        };
        Ok(results.filter(|results| !results.is_nothing()))
    }
}

/// Targets a reference may not be taken to. Every failed check is reported
/// on the name; any failure makes the reference invalid.
fn check_reference_is_to_allowed_member(
    input: DoubleColonInput<'_>,
    reference: NodeIndex,
    target: CallableId,
    cx: &ResolutionContext<'_>,
    trace: &mut BindingTrace<'_>,
) -> bool {
    let Some(descriptor) = cx.defs.callable(target) else {
        return false;
    };
    let mut rejections: SmallVec<[(u32, &str); 2]> = SmallVec::new();

    if input.receiver.is_none() && descriptor.has_receiver() {
        rejections.push((
            diagnostic_codes::CALLABLE_REFERENCE_TO_MEMBER_OR_EXTENSION_WITH_EMPTY_LHS,
            "",
        ));
    }
    if let CallableKind::Constructor { .. } = descriptor.kind {
        let of_annotation = descriptor
            .owner
            .and_then(|owner| cx.defs.classifier(owner))
            .is_some_and(|owner| owner.kind == ClassKind::AnnotationClass);
        if of_annotation {
            rejections.push((diagnostic_codes::CALLABLE_REFERENCE_TO_ANNOTATION_CONSTRUCTOR, ""));
        }
    }
    if descriptor.is_member_extension() {
        rejections.push((
            diagnostic_codes::EXTENSION_IN_CLASS_REFERENCE_NOT_ALLOWED,
            descriptor.name.as_str(),
        ));
    }
    if let CallableKind::LocalVariable { .. } = descriptor.kind {
        rejections.push((
            diagnostic_codes::UNSUPPORTED,
            "References to variables aren't supported yet",
        ));
    }
    if descriptor.is_suspend() {
        rejections.push((
            diagnostic_codes::UNSUPPORTED,
            "Callable references to suspend functions",
        ));
    }

    for &(code, argument) in &rejections {
        let diagnostic = if argument.is_empty() {
            cx.diagnostic(reference, code, &[])
        } else {
            cx.diagnostic(reference, code, &[argument])
        };
        trace.report(diagnostic);
    }
    rejections.is_empty()
}
