//! Expression type-checking for `::` left-hand sides.
//!
//! Covers the expression forms a left-hand side can take: names, dotted and
//! safe-call chains, calls, `!!`, parentheses, literals and `this`. Lambdas
//! only appear as trailing arguments and are not checked.

use super::{
    NamePrefix, candidate_result_type, explicit_type_substitution, extension_candidates,
    filter_candidates, implicit_members, is_plain_function, is_plain_property,
    lookup_classifier_in_scope, plain_candidate, resolve_type_arguments,
};
use crate::collaborators::{ExpressionTypeChecker, ExpressionTypeInfo};
use crate::context::{CallTarget, FlowState, Receiver, ResolutionContext, ResolvedCall};
use crate::error::{ResolveError, ResolveResult};
use crate::trace::BindingTrace;
use callref_common::diagnostic_codes;
use callref_common::limits::MAX_EXPR_CHECK_DEPTH;
use callref_parser::{CallData, LiteralKind, NodeIndex, NodeKind, QualifiedData};
use callref_solver::{
    CallableDescriptor, CallableKind, ClassifierId, MemberCandidate, Substitution, TypeId,
    members_named,
};
use std::cell::Cell;
use tracing::{trace, warn};

/// Resolves expressions against the bound scope.
#[derive(Debug, Default)]
pub struct ScopeExpressionChecker {
    depth: Cell<u32>,
}

impl ScopeExpressionChecker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExpressionTypeChecker for ScopeExpressionChecker {
    fn resolve_expression(
        &self,
        node: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<ExpressionTypeInfo> {
        let depth = self.depth.get();
        if depth >= MAX_EXPR_CHECK_DEPTH {
            warn!(node = %node, "expression nesting too deep, giving up");
            return Ok(ExpressionTypeInfo::new(None, cx.flow.clone()));
        }
        self.depth.set(depth + 1);
        let result = self.check(node, cx, trace);
        self.depth.set(depth);

        let info = result?;
        if let Some(ty) = info.ty {
            trace.record_expression_type(node, ty);
        }
        Ok(info)
    }
}

impl ScopeExpressionChecker {
    fn check(
        &self,
        node: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<ExpressionTypeInfo> {
        let Some(kind) = cx.arena.kind(node) else {
            return Err(ResolveError::UnexpectedNode {
                node,
                expected: "expression",
            });
        };
        trace!(node = %node, kind = kind.describe(), "check expression");
        let plain = |ty: Option<TypeId>| ExpressionTypeInfo::new(ty, cx.flow.clone());

        match kind {
            NodeKind::Name(name) => Ok(plain(self.check_name(node, name, cx, trace))),
            NodeKind::DotQualified(qualified) => self.check_qualified(qualified, false, cx, trace),
            NodeKind::SafeQualified(qualified) => self.check_qualified(qualified, true, cx, trace),
            NodeKind::Call(call) => Ok(plain(self.check_scope_call(node, call, cx, trace)?)),
            NodeKind::NotNull(inner) => self.check_not_null(*inner, cx, trace),
            NodeKind::Parenthesized(inner) => self.resolve_expression(*inner, cx, trace),
            NodeKind::Literal(literal) => Ok(plain(Some(match literal {
                LiteralKind::Int(_) => TypeId::INT,
                LiteralKind::String(_) => TypeId::STRING,
                LiteralKind::Boolean(_) => TypeId::BOOLEAN,
                LiteralKind::Null => TypeId::NULLABLE_NOTHING,
            }))),
            NodeKind::This => {
                let ty = cx
                    .scope_owner
                    .map(|owner| cx.defs.declared_type(cx.types, owner));
                if ty.is_none() {
                    trace.report(cx.diagnostic(node, diagnostic_codes::NO_THIS, &[]));
                }
                Ok(plain(ty))
            }
            NodeKind::Lambda(_) => Ok(plain(Some(TypeId::ERROR))),
            NodeKind::TypeReference(_)
            | NodeKind::StarProjection
            | NodeKind::ClassLiteral(_)
            | NodeKind::CallableReference(_) => Err(ResolveError::UnexpectedNode {
                node,
                expected: "expression",
            }),
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// A name in value position, looked up innermost first.
    fn check_name(
        &self,
        node: NodeIndex,
        name: &str,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> Option<TypeId> {
        if let Some(local) = cx.symbols.lookup_local(name) {
            let declared = cx
                .defs
                .callable(local)
                .map_or(TypeId::ERROR, |local| local.result_type());
            let ty = cx.flow.narrowed_type(local).unwrap_or(declared);
            record_callable(trace, node, &plain_candidate(local), None);
            return Some(ty);
        }

        let members = implicit_members(cx, name);
        let properties = filter_candidates(cx, members.clone(), is_plain_property);
        if let Some(property) = properties.first() {
            record_callable(trace, node, property, None);
            return Some(candidate_result_type(cx, property));
        }
        let top_level: Vec<MemberCandidate> = cx
            .symbols
            .top_level_callables(name)
            .into_iter()
            .map(plain_candidate)
            .collect();
        let properties = filter_candidates(cx, top_level.clone(), is_plain_property);
        if let Some(property) = properties.first() {
            record_callable(trace, node, property, None);
            return Some(candidate_result_type(cx, property));
        }

        if let Some(classifier) = lookup_classifier_in_scope(cx, name) {
            return classifier_value(node, classifier, cx, trace);
        }

        let functions = filter_candidates(cx, members, is_plain_function);
        let functions = if functions.is_empty() {
            filter_candidates(cx, top_level, is_plain_function)
        } else {
            functions
        };
        if let Some(function) = functions.first() {
            report_function_call_expected(node, name, cx, trace);
            record_callable(trace, node, function, None);
            return Some(candidate_result_type(cx, function));
        }

        if cx.symbols.is_package(&[name.to_string()]) {
            trace.report(cx.diagnostic(
                node,
                diagnostic_codes::EXPRESSION_EXPECTED_PACKAGE_FOUND,
                &[],
            ));
            return None;
        }
        report_unresolved(node, name, cx, trace);
        None
    }

    // =========================================================================
    // Qualified expressions
    // =========================================================================

    fn check_qualified(
        &self,
        qualified: &QualifiedData,
        safe: bool,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<ExpressionTypeInfo> {
        let Some(selector) = qualified.selector else {
            let receiver = self.resolve_expression(qualified.receiver, cx, trace)?;
            return Ok(ExpressionTypeInfo::new(None, receiver.flow));
        };

        if !safe {
            if let Some(prefix) = self.name_prefix(qualified.receiver, cx) {
                let ty = self.check_selector_on_prefix(qualified.receiver, selector, prefix, cx, trace)?;
                return Ok(ExpressionTypeInfo::new(ty, cx.flow.clone()));
            }
        }

        let receiver = self.resolve_expression(qualified.receiver, cx, trace)?;
        let Some(receiver_ty) = receiver.ty else {
            return Ok(ExpressionTypeInfo::new(None, receiver.flow));
        };
        if receiver_ty.is_error() {
            return Ok(ExpressionTypeInfo::new(Some(TypeId::ERROR), receiver.flow));
        }

        let nullable = cx.types.is_nullable(receiver_ty);
        if nullable && !safe {
            let rendered = cx.format_type(receiver_ty);
            trace.report(cx.diagnostic(selector, diagnostic_codes::UNSAFE_CALL, &[&rendered]));
        }
        let mut selector_cx = cx.clone();
        selector_cx.flow = receiver.flow.clone();
        let member_receiver = Receiver::Expression {
            node: qualified.receiver,
            ty: receiver_ty,
        };
        let ty = self.check_member_selector(
            selector,
            cx.types.make_non_null(receiver_ty),
            member_receiver,
            &selector_cx,
            trace,
        )?;
        let ty = ty.map(|ty| {
            if safe && nullable {
                cx.types.make_nullable(ty)
            } else {
                ty
            }
        });
        Ok(ExpressionTypeInfo::new(ty, receiver.flow))
    }

    /// A dotted name that denotes a package or classifier rather than a
    /// value. Values shadow classifiers and packages.
    fn name_prefix(&self, node: NodeIndex, cx: &ResolutionContext<'_>) -> Option<NamePrefix> {
        match cx.arena.kind(node)? {
            NodeKind::Name(name) => {
                let is_value = cx.symbols.lookup_local(name).is_some()
                    || !filter_candidates(cx, implicit_members(cx, name), is_plain_property).is_empty()
                    || cx.symbols.top_level_callables(name).into_iter().any(|id| {
                        cx.defs.callable(id).is_some_and(is_plain_property)
                    });
                if is_value {
                    return None;
                }
                NamePrefix::first(cx, name)
            }
            NodeKind::DotQualified(qualified) => {
                let prefix = self.name_prefix(qualified.receiver, cx)?;
                let selector = cx.arena.name_text(qualified.selector?)?;
                prefix.select(cx, selector)
            }
            _ => None,
        }
    }

    /// `selector` after a package or classifier prefix.
    fn check_selector_on_prefix(
        &self,
        receiver: NodeIndex,
        selector: NodeIndex,
        prefix: NamePrefix,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<Option<TypeId>> {
        match cx.arena.kind(selector) {
            Some(NodeKind::Name(name)) => Ok(self.check_name_on_prefix(receiver, selector, name, prefix, cx, trace)),
            Some(NodeKind::Call(call)) => {
                let Some(name) = cx.arena.name_text(call.callee) else {
                    return Ok(None);
                };
                let (candidates, call_receiver) = match &prefix {
                    NamePrefix::Package(path) => {
                        let mut candidates: Vec<MemberCandidate> = cx
                            .symbols
                            .package_callables(path, name)
                            .into_iter()
                            .map(plain_candidate)
                            .collect();
                        candidates = filter_candidates(cx, candidates, is_plain_function);
                        if candidates.is_empty() {
                            candidates = constructors_of(cx, cx.symbols.package_classifier(path, name));
                        }
                        (candidates, None)
                    }
                    NamePrefix::Classifier(classifier) => {
                        self.classifier_call_candidates(receiver, *classifier, name, cx)
                    }
                };
                self.check_call_candidates(selector, call, name, candidates, call_receiver, cx, trace)
            }
            _ => Err(ResolveError::UnexpectedNode {
                node: selector,
                expected: "name or call",
            }),
        }
    }

    fn check_name_on_prefix(
        &self,
        receiver: NodeIndex,
        selector: NodeIndex,
        name: &str,
        prefix: NamePrefix,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> Option<TypeId> {
        match prefix {
            NamePrefix::Package(path) => {
                if let Some(classifier) = cx.symbols.package_classifier(&path, name) {
                    return classifier_value(selector, classifier, cx, trace);
                }
                let callables: Vec<MemberCandidate> = cx
                    .symbols
                    .package_callables(&path, name)
                    .into_iter()
                    .map(plain_candidate)
                    .collect();
                if let Some(property) = filter_candidates(cx, callables.clone(), is_plain_property).first() {
                    record_callable(trace, selector, property, None);
                    return Some(candidate_result_type(cx, property));
                }
                if let Some(function) = filter_candidates(cx, callables, is_plain_function).first() {
                    report_function_call_expected(selector, name, cx, trace);
                    record_callable(trace, selector, function, None);
                    return Some(candidate_result_type(cx, function));
                }
                let mut nested = path;
                nested.push(name.to_string());
                if cx.symbols.is_package(&nested) {
                    trace.report(cx.diagnostic(
                        selector,
                        diagnostic_codes::EXPRESSION_EXPECTED_PACKAGE_FOUND,
                        &[],
                    ));
                } else {
                    report_unresolved(selector, name, cx, trace);
                }
                None
            }
            NamePrefix::Classifier(classifier) => {
                if let Some(nested) = cx.defs.nested_named(classifier, name) {
                    return classifier_value(selector, nested, cx, trace);
                }
                let (candidates, member_receiver) =
                    self.classifier_member_candidates(receiver, classifier, name, cx);
                if let Some(property) = filter_candidates(cx, candidates.clone(), is_plain_property).first() {
                    record_callable(trace, selector, property, member_receiver);
                    return Some(candidate_result_type(cx, property));
                }
                if let Some(function) = filter_candidates(cx, candidates, is_plain_function).first() {
                    report_function_call_expected(selector, name, cx, trace);
                    record_callable(trace, selector, function, member_receiver);
                    return Some(candidate_result_type(cx, function));
                }
                report_unresolved(selector, name, cx, trace);
                None
            }
        }
    }

    /// Statics of `classifier`, or members of the object it denotes as a
    /// value (the object itself or its companion).
    fn classifier_member_candidates(
        &self,
        receiver: NodeIndex,
        classifier: ClassifierId,
        name: &str,
        cx: &ResolutionContext<'_>,
    ) -> (Vec<MemberCandidate>, Option<Receiver>) {
        let statics: Vec<MemberCandidate> = cx
            .defs
            .classifier(classifier)
            .map(|info| {
                info.statics
                    .iter()
                    .copied()
                    .filter(|id| cx.defs.callable(*id).is_some_and(|c| c.name == name))
                    .map(plain_candidate)
                    .collect()
            })
            .unwrap_or_default();
        if !statics.is_empty() {
            return (
                statics,
                Some(Receiver::ClassQualifier {
                    node: receiver,
                    classifier,
                }),
            );
        }
        match object_value_type(classifier, cx) {
            Some(ty) => (
                members_named(cx.types, cx.defs, ty, name),
                Some(Receiver::Expression { node: receiver, ty }),
            ),
            None => (Vec::new(), None),
        }
    }

    fn classifier_call_candidates(
        &self,
        receiver: NodeIndex,
        classifier: ClassifierId,
        name: &str,
        cx: &ResolutionContext<'_>,
    ) -> (Vec<MemberCandidate>, Option<Receiver>) {
        if let Some(nested) = cx.defs.nested_named(classifier, name) {
            return (constructors_of(cx, Some(nested)), None);
        }
        let (candidates, member_receiver) =
            self.classifier_member_candidates(receiver, classifier, name, cx);
        (
            filter_candidates(cx, candidates, is_plain_function),
            member_receiver,
        )
    }

    /// `selector` on a value of type `receiver_ty`: members, then
    /// extensions.
    fn check_member_selector(
        &self,
        selector: NodeIndex,
        receiver_ty: TypeId,
        receiver: Receiver,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<Option<TypeId>> {
        match cx.arena.kind(selector) {
            Some(NodeKind::Name(name)) => {
                let members = members_named(cx.types, cx.defs, receiver_ty, name);
                let extensions = extension_candidates(cx, receiver_ty, name);
                let is_property =
                    |c: &CallableDescriptor| matches!(c.kind, CallableKind::Property { .. });
                let property = filter_candidates(cx, members.clone(), is_plain_property)
                    .into_iter()
                    .next()
                    .or_else(|| filter_candidates(cx, extensions.clone(), is_property).into_iter().next());
                if let Some(property) = property {
                    record_callable(trace, selector, &property, Some(receiver));
                    return Ok(Some(candidate_result_type(cx, &property)));
                }
                let function = filter_candidates(cx, members, |c| c.is_function())
                    .into_iter()
                    .next()
                    .or_else(|| filter_candidates(cx, extensions, |c| c.is_function()).into_iter().next());
                if let Some(function) = function {
                    report_function_call_expected(selector, name, cx, trace);
                    record_callable(trace, selector, &function, Some(receiver));
                    return Ok(Some(candidate_result_type(cx, &function)));
                }
                report_unresolved(selector, name, cx, trace);
                Ok(None)
            }
            Some(NodeKind::Call(call)) => {
                let Some(name) = cx.arena.name_text(call.callee) else {
                    return Ok(None);
                };
                let members = filter_candidates(
                    cx,
                    members_named(cx.types, cx.defs, receiver_ty, name),
                    |c| c.is_function(),
                );
                let candidates = if members.is_empty() {
                    filter_candidates(cx, extension_candidates(cx, receiver_ty, name), |c| {
                        c.is_function()
                    })
                } else {
                    members
                };
                self.check_call_candidates(selector, call, name, candidates, Some(receiver), cx, trace)
            }
            _ => Err(ResolveError::UnexpectedNode {
                node: selector,
                expected: "name or call",
            }),
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// A call without an explicit receiver.
    fn check_scope_call(
        &self,
        node: NodeIndex,
        call: &CallData,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<Option<TypeId>> {
        let Some(name) = cx.arena.name_text(call.callee) else {
            self.resolve_expression(call.callee, cx, trace)?;
            return Ok(None);
        };
        if call.is_without_value_arguments() {
            // `foo<T>` in value position.
            trace.report(cx.diagnostic(
                node,
                diagnostic_codes::TYPE_ARGUMENTS_NOT_ALLOWED,
                &[name],
            ));
            return Ok(None);
        }

        let mut candidates = filter_candidates(cx, implicit_members(cx, name), is_plain_function);
        if candidates.is_empty() {
            let top_level = cx
                .symbols
                .top_level_callables(name)
                .into_iter()
                .map(plain_candidate)
                .collect();
            candidates = filter_candidates(cx, top_level, is_plain_function);
        }
        if candidates.is_empty() {
            candidates = constructors_of(cx, lookup_classifier_in_scope(cx, name));
        }
        self.check_call_candidates(node, call, name, candidates, None, cx, trace)
    }

    /// Pick the candidate whose arity matches, report arity mismatches on
    /// `node`, and type the call.
    fn check_call_candidates(
        &self,
        node: NodeIndex,
        call: &CallData,
        name: &str,
        candidates: Vec<MemberCandidate>,
        receiver: Option<Receiver>,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<Option<TypeId>> {
        let arguments = call
            .value_args
            .iter()
            .flatten()
            .chain(call.lambda_args.iter());
        for argument in arguments {
            self.resolve_expression(*argument, cx, trace)?;
        }
        let explicit = if call.type_args.is_empty() {
            None
        } else {
            Some(resolve_type_arguments(&call.type_args, cx, trace)?)
        };

        let argument_count = call.value_argument_count();
        let arity = |candidate: &MemberCandidate| {
            cx.defs
                .callable(candidate.callable)
                .map_or(0, |c| c.params().len())
        };
        let Some(chosen) = candidates
            .iter()
            .find(|candidate| arity(candidate) == argument_count)
            .or_else(|| candidates.first())
        else {
            report_unresolved(call.callee, name, cx, trace);
            return Ok(None);
        };
        let Some(descriptor) = cx.defs.callable(chosen.callable) else {
            return Ok(None);
        };

        let params = descriptor.params();
        if params.len() > argument_count {
            trace.report(cx.diagnostic(
                node,
                diagnostic_codes::NO_VALUE_FOR_PARAMETER,
                &[&params[argument_count].name],
            ));
        } else if params.len() < argument_count {
            trace.report(cx.diagnostic(node, diagnostic_codes::TOO_MANY_ARGUMENTS, &[name]));
        }

        let substitution = match &explicit {
            Some(args) => explicit_type_substitution(cx, descriptor, args, &chosen.substitution),
            None => chosen.substitution.clone(),
        };
        let resolved = MemberCandidate {
            callable: chosen.callable,
            substitution,
        };
        record_callable(trace, call.callee, &resolved, receiver);
        Ok(Some(candidate_result_type(cx, &resolved)))
    }

    // =========================================================================
    // Not-null assertion
    // =========================================================================

    /// `x!!` is non-null, and narrows `x` for the rest of the expression
    /// when `x` is a local.
    fn check_not_null(
        &self,
        inner: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<ExpressionTypeInfo> {
        let info = self.resolve_expression(inner, cx, trace)?;
        let Some(ty) = info.ty else {
            return Ok(info);
        };
        let non_null = cx.types.make_non_null(ty);
        let mut flow: FlowState = info.flow;
        let local = trace
            .resolved_call(inner)
            .and_then(ResolvedCall::callable)
            .filter(|id| {
                cx.defs
                    .callable(*id)
                    .is_some_and(|c| matches!(c.kind, CallableKind::LocalVariable { .. }))
            });
        if let Some(local) = local {
            flow.narrow(local, non_null);
        }
        Ok(ExpressionTypeInfo::new(Some(non_null), flow))
    }
}

fn constructors_of(cx: &ResolutionContext<'_>, classifier: Option<ClassifierId>) -> Vec<MemberCandidate> {
    classifier
        .and_then(|id| cx.defs.classifier(id))
        .map(|info| info.constructors.iter().copied().map(plain_candidate).collect())
        .unwrap_or_default()
}

/// Type of a classifier name used as a value: the object itself, or the
/// companion of a class.
fn object_value_type(classifier: ClassifierId, cx: &ResolutionContext<'_>) -> Option<TypeId> {
    let info = cx.defs.classifier(classifier)?;
    if info.is_object() {
        Some(cx.defs.declared_type(cx.types, classifier))
    } else {
        info.companion
            .map(|companion| cx.defs.declared_type(cx.types, companion))
    }
}

fn classifier_value(
    node: NodeIndex,
    classifier: ClassifierId,
    cx: &ResolutionContext<'_>,
    trace: &mut BindingTrace<'_>,
) -> Option<TypeId> {
    match object_value_type(classifier, cx) {
        Some(ty) => {
            trace.record_resolved_call(
                node,
                ResolvedCall::new(CallTarget::ObjectValue(classifier), None, Substitution::new()),
            );
            Some(ty)
        }
        None => {
            let name = cx.classifier_name(classifier);
            trace.report(cx.diagnostic(node, diagnostic_codes::NO_COMPANION_OBJECT, &[&name]));
            None
        }
    }
}

fn record_callable(
    trace: &mut BindingTrace<'_>,
    node: NodeIndex,
    candidate: &MemberCandidate,
    receiver: Option<Receiver>,
) {
    trace.record_resolved_call(
        node,
        ResolvedCall::new(
            CallTarget::Callable(candidate.callable),
            receiver,
            candidate.substitution.clone(),
        ),
    );
}

fn report_function_call_expected(
    node: NodeIndex,
    name: &str,
    cx: &ResolutionContext<'_>,
    trace: &mut BindingTrace<'_>,
) {
    trace.report(cx.diagnostic(node, diagnostic_codes::FUNCTION_CALL_EXPECTED, &[name]));
}

fn report_unresolved(node: NodeIndex, name: &str, cx: &ResolutionContext<'_>, trace: &mut BindingTrace<'_>) {
    trace.report(cx.diagnostic(node, diagnostic_codes::UNRESOLVED_REFERENCE, &[name]));
}
