//! Overload resolution of callable-reference names.

use super::{
    extension_candidates, implicit_members, lookup_classifier_in_scope, plain_candidate,
};
use crate::collaborators::CallResolver;
use crate::context::{
    Call, CallTarget, CallableReferenceMode, OverloadResolutionResults, Receiver,
    ResolutionContext, ResolvedCall,
};
use crate::error::ResolveResult;
use crate::trace::BindingTrace;
use callref_common::diagnostic_codes;
use callref_solver::{CallableId, CallableKind, MemberCandidate, TypeId, is_visible, members_named};
use tracing::{debug, trace};

/// Finds candidates for a name on a receiver (or in scope) and filters
/// them by visibility. Arguments play no part: a callable reference has
/// none.
#[derive(Debug, Default)]
pub struct ScopeCallResolver;

impl ScopeCallResolver {
    #[must_use]
    pub fn new() -> Self {
        ScopeCallResolver
    }
}

/// Where the candidates came from.
struct Candidates {
    found: Vec<MemberCandidate>,
    /// Found on the non-null version of a nullable value receiver.
    needs_non_null_receiver: bool,
}

impl CallResolver for ScopeCallResolver {
    fn resolve_call_for_member(
        &self,
        call: &Call,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        mode: CallableReferenceMode,
    ) -> ResolveResult<OverloadResolutionResults> {
        if let Some(prior) = trace.resolved_call(call.callee) {
            if prior.receiver == call.receiver {
                trace!(name = %call.name, "reusing resolved call");
                return Ok(OverloadResolutionResults::Success(prior.clone()));
            }
        }

        let candidates = collect_candidates(call, cx);
        if candidates.found.is_empty() {
            return Ok(OverloadResolutionResults::NoCandidates);
        }
        let calls: Vec<ResolvedCall> = candidates
            .found
            .into_iter()
            .map(|candidate| {
                ResolvedCall::new(
                    CallTarget::Callable(candidate.callable),
                    call.receiver,
                    candidate.substitution,
                )
            })
            .collect();

        if candidates.needs_non_null_receiver {
            if let Some(Receiver::Expression { ty, .. }) = call.receiver {
                let rendered = cx.format_type(ty);
                trace.report(cx.diagnostic(
                    call.callee,
                    diagnostic_codes::UNSAFE_CALL,
                    &[&rendered],
                ));
            }
            return Ok(OverloadResolutionResults::CandidatesWithErrors(calls));
        }

        let (visible, invisible): (Vec<ResolvedCall>, Vec<ResolvedCall>) =
            calls.into_iter().partition(|resolved| is_call_visible(resolved, cx));
        debug!(
            name = %call.name,
            visible = visible.len(),
            invisible = invisible.len(),
            "callable reference candidates"
        );

        match visible.len() {
            0 => {
                report_invisible(call, &invisible, cx, trace);
                Ok(OverloadResolutionResults::CandidatesWithErrors(invisible))
            }
            1 => {
                let mut visible = visible;
                let resolved = visible.swap_remove(0);
                trace.record_resolved_call(call.callee, resolved.clone());
                Ok(OverloadResolutionResults::Success(resolved))
            }
            _ => {
                if mode == CallableReferenceMode::Eager {
                    let rendered: Vec<String> = visible
                        .iter()
                        .filter_map(ResolvedCall::callable)
                        .map(|id| describe_callable(id, cx))
                        .collect();
                    trace.report(cx.diagnostic(
                        call.callee,
                        diagnostic_codes::CALLABLE_REFERENCE_RESOLUTION_AMBIGUITY,
                        &[&rendered.join(", ")],
                    ));
                }
                Ok(OverloadResolutionResults::Ambiguous(visible))
            }
        }
    }
}

fn collect_candidates(call: &Call, cx: &ResolutionContext<'_>) -> Candidates {
    let name = call.name.as_str();
    let plain = |found| Candidates {
        found,
        needs_non_null_receiver: false,
    };
    match call.receiver {
        None => plain(scope_candidates(name, cx)),
        Some(Receiver::ClassQualifier { classifier, .. }) => {
            let Some(info) = cx.defs.classifier(classifier) else {
                return plain(Vec::new());
            };
            let statics: Vec<MemberCandidate> = info
                .statics
                .iter()
                .copied()
                .filter(|id| cx.defs.callable(*id).is_some_and(|c| c.name == name))
                .map(plain_candidate)
                .collect();
            if !statics.is_empty() {
                return plain(statics);
            }
            plain(
                cx.defs
                    .nested_named(classifier, name)
                    .and_then(|nested| cx.defs.classifier(nested))
                    .map(|nested| nested.constructors.iter().copied().map(plain_candidate).collect())
                    .unwrap_or_default(),
            )
        }
        Some(Receiver::Expression { ty, .. }) => value_candidates(name, ty, true, cx),
        Some(Receiver::Transient(ty)) => value_candidates(name, ty, false, cx),
    }
}

/// Members of the receiver type, then extensions. For a nullable value only
/// extensions accepting null apply directly; anything else is found on the
/// non-null type and flagged.
fn value_candidates(name: &str, ty: TypeId, is_value: bool, cx: &ResolutionContext<'_>) -> Candidates {
    let nullable_value = is_value && cx.types.is_nullable(ty);
    let base = cx.types.make_non_null(ty);

    if nullable_value {
        let accepting_null = extension_candidates(cx, ty, name);
        if !accepting_null.is_empty() {
            return Candidates {
                found: accepting_null,
                needs_non_null_receiver: false,
            };
        }
    }
    let mut found = members_named(cx.types, cx.defs, base, name);
    if found.is_empty() {
        found = extension_candidates(cx, base, name);
    }
    Candidates {
        needs_non_null_receiver: nullable_value && !found.is_empty(),
        found,
    }
}

/// Locals, members of implicit receivers, top-level callables, then
/// constructors of a class with the name.
fn scope_candidates(name: &str, cx: &ResolutionContext<'_>) -> Vec<MemberCandidate> {
    if let Some(local) = cx.symbols.lookup_local(name) {
        return vec![plain_candidate(local)];
    }
    let members = implicit_members(cx, name);
    if !members.is_empty() {
        return members;
    }
    let top_level = cx.symbols.top_level_callables(name);
    if !top_level.is_empty() {
        return top_level.into_iter().map(plain_candidate).collect();
    }
    lookup_classifier_in_scope(cx, name)
        .and_then(|classifier| cx.defs.classifier(classifier))
        .map(|info| info.constructors.iter().copied().map(plain_candidate).collect())
        .unwrap_or_default()
}

fn is_call_visible(resolved: &ResolvedCall, cx: &ResolutionContext<'_>) -> bool {
    resolved
        .callable()
        .and_then(|id| cx.defs.callable(id))
        .is_some_and(|descriptor| {
            is_visible(
                cx.types,
                cx.defs,
                descriptor.visibility,
                descriptor.owner,
                cx.scope_owner,
            )
        })
}

fn report_invisible(
    call: &Call,
    invisible: &[ResolvedCall],
    cx: &ResolutionContext<'_>,
    trace: &mut BindingTrace<'_>,
) {
    let Some(descriptor) = invisible
        .first()
        .and_then(ResolvedCall::callable)
        .and_then(|id| cx.defs.callable(id))
    else {
        return;
    };
    let owner = descriptor
        .owner
        .map(|owner| cx.classifier_name(owner))
        .unwrap_or_default();
    trace.report(cx.diagnostic(
        call.callee,
        diagnostic_codes::INVISIBLE_MEMBER,
        &[call.name.as_str(), descriptor.visibility.as_str(), owner.as_str()],
    ));
}

/// `name(P1, P2): R` for functions and constructors, `name: T` for
/// properties.
fn describe_callable(id: CallableId, cx: &ResolutionContext<'_>) -> String {
    let Some(descriptor) = cx.defs.callable(id) else {
        return String::new();
    };
    match &descriptor.kind {
        CallableKind::Function { .. } | CallableKind::Constructor { .. } => {
            let params: Vec<String> = descriptor
                .params()
                .iter()
                .map(|param| cx.format_type(param.ty))
                .collect();
            format!(
                "{}({}): {}",
                descriptor.name,
                params.join(", "),
                cx.format_type(descriptor.result_type())
            )
        }
        CallableKind::Property { ty, .. } | CallableKind::LocalVariable { ty, .. } => {
            format!("{}: {}", descriptor.name, cx.format_type(*ty))
        }
    }
}
