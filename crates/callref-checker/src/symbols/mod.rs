//! Scope-based implementations of the resolution collaborators.
//!
//! They resolve names against the bound declaration stubs: the scope owner
//! and its outer classes first, then the file scope (locals, top-level
//! declarations, default imports), then packages.

mod call_resolver;
mod expression_checker;
mod qualifier_resolver;

pub use call_resolver::ScopeCallResolver;
pub use expression_checker::ScopeExpressionChecker;
pub use qualifier_resolver::ScopeQualifierResolver;

use crate::context::ResolutionContext;
use crate::error::{ResolveError, ResolveResult};
use crate::trace::BindingTrace;
use callref_common::diagnostic_codes;
use callref_parser::{NodeIndex, NodeKind, TypeReferenceData};
use callref_solver::{
    CallableDescriptor, CallableId, CallableKind, ClassifierId, MemberCandidate, Substitution,
    TypeArg, TypeId, TypeParamId, is_subtype, members_named,
};

/// The scope owner followed by its enclosing classifiers, innermost first.
pub(crate) fn enclosing_classifiers(cx: &ResolutionContext<'_>) -> Vec<ClassifierId> {
    let mut out = Vec::new();
    let mut current = cx.scope_owner;
    while let Some(id) = current {
        out.push(id);
        current = cx.defs.classifier(id).and_then(|info| info.outer);
    }
    out
}

/// Types of the implicit `this` receivers: each enclosing classifier, then
/// the companions of those that have one.
pub(crate) fn implicit_receivers(cx: &ResolutionContext<'_>) -> Vec<TypeId> {
    let enclosing = enclosing_classifiers(cx);
    let companions = enclosing
        .iter()
        .filter_map(|id| cx.defs.classifier(*id).and_then(|info| info.companion));
    enclosing
        .iter()
        .copied()
        .chain(companions.collect::<Vec<_>>())
        .map(|id| cx.defs.declared_type(cx.types, id))
        .collect()
}

/// Members named `name` on the nearest implicit receiver that has any.
pub(crate) fn implicit_members(cx: &ResolutionContext<'_>, name: &str) -> Vec<MemberCandidate> {
    implicit_receivers(cx)
        .into_iter()
        .map(|receiver| members_named(cx.types, cx.defs, receiver, name))
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// Extensions named `name` applicable to `receiver`: member extensions of
/// the implicit receivers, then top-level extensions.
pub(crate) fn extension_candidates(
    cx: &ResolutionContext<'_>,
    receiver: TypeId,
    name: &str,
) -> Vec<MemberCandidate> {
    let applies = |descriptor: &CallableDescriptor| {
        descriptor
            .extension_receiver
            .is_some_and(|extension| is_subtype(cx.types, cx.defs, receiver, extension))
    };
    for implicit in implicit_receivers(cx) {
        let found: Vec<MemberCandidate> = members_named(cx.types, cx.defs, implicit, name)
            .into_iter()
            .filter(|candidate| cx.defs.callable(candidate.callable).is_some_and(&applies))
            .collect();
        if !found.is_empty() {
            return found;
        }
    }
    cx.symbols
        .top_level_callables(name)
        .into_iter()
        .filter(|id| cx.defs.callable(*id).is_some_and(&applies))
        .map(plain_candidate)
        .collect()
}

pub(crate) fn plain_candidate(callable: CallableId) -> MemberCandidate {
    MemberCandidate {
        callable,
        substitution: Substitution::new(),
    }
}

/// Keep the candidates whose descriptor matches `keep`.
pub(crate) fn filter_candidates(
    cx: &ResolutionContext<'_>,
    candidates: Vec<MemberCandidate>,
    keep: impl Fn(&CallableDescriptor) -> bool,
) -> Vec<MemberCandidate> {
    candidates
        .into_iter()
        .filter(|candidate| cx.defs.callable(candidate.callable).is_some_and(&keep))
        .collect()
}

pub(crate) fn is_plain_property(descriptor: &CallableDescriptor) -> bool {
    matches!(descriptor.kind, CallableKind::Property { .. })
        && descriptor.extension_receiver.is_none()
}

pub(crate) fn is_plain_function(descriptor: &CallableDescriptor) -> bool {
    descriptor.is_function() && descriptor.extension_receiver.is_none()
}

/// Type of reading or calling `candidate`.
pub(crate) fn candidate_result_type(cx: &ResolutionContext<'_>, candidate: &MemberCandidate) -> TypeId {
    cx.defs
        .callable(candidate.callable)
        .map_or(TypeId::ERROR, |descriptor| {
            cx.types
                .substitute(descriptor.result_type(), &candidate.substitution)
        })
}

/// A classifier by simple name: nested in the scope owner or one of its
/// outer classes, then the file scope.
pub(crate) fn lookup_classifier_in_scope(cx: &ResolutionContext<'_>, name: &str) -> Option<ClassifierId> {
    enclosing_classifiers(cx)
        .into_iter()
        .find_map(|owner| cx.defs.nested_named(owner, name))
        .or_else(|| cx.symbols.lookup_classifier(name))
}

/// A type parameter by name: those of the enclosing classifiers, then the
/// ones declared for the resolution scope.
pub(crate) fn lookup_type_param_in_scope(cx: &ResolutionContext<'_>, name: &str) -> Option<TypeParamId> {
    enclosing_classifiers(cx)
        .into_iter()
        .filter_map(|owner| cx.defs.classifier(owner))
        .flat_map(|info| info.type_params.iter().copied())
        .find(|param| cx.defs.type_param(*param).is_some_and(|p| p.name == name))
        .or_else(|| cx.symbols.lookup_type_param(name))
}

/// What a dotted name prefix denotes when it is not a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NamePrefix {
    Package(Vec<String>),
    Classifier(ClassifierId),
}

impl NamePrefix {
    /// The first segment of a dotted name, if it names a classifier or a
    /// package.
    pub(crate) fn first(cx: &ResolutionContext<'_>, name: &str) -> Option<NamePrefix> {
        if let Some(classifier) = lookup_classifier_in_scope(cx, name) {
            return Some(NamePrefix::Classifier(classifier));
        }
        let path = vec![name.to_string()];
        cx.symbols
            .is_package(&path)
            .then_some(NamePrefix::Package(path))
    }

    /// Extend the prefix by one segment.
    pub(crate) fn select(self, cx: &ResolutionContext<'_>, name: &str) -> Option<NamePrefix> {
        match self {
            NamePrefix::Package(mut path) => {
                if let Some(classifier) = cx.symbols.package_classifier(&path, name) {
                    return Some(NamePrefix::Classifier(classifier));
                }
                path.push(name.to_string());
                cx.symbols
                    .is_package(&path)
                    .then_some(NamePrefix::Package(path))
            }
            NamePrefix::Classifier(outer) => cx.defs.nested_named(outer, name).map(NamePrefix::Classifier),
        }
    }
}

/// A classifier by dotted path, starting from the scope.
fn classifier_by_path_in_scope(cx: &ResolutionContext<'_>, path: &[&str]) -> Option<ClassifierId> {
    walk_name_path(cx, path).or_else(|| cx.symbols.classifier_by_path(cx.defs, path))
}

fn walk_name_path(cx: &ResolutionContext<'_>, path: &[&str]) -> Option<ClassifierId> {
    let (first, rest) = path.split_first()?;
    let mut prefix = NamePrefix::first(cx, first)?;
    for segment in rest {
        prefix = prefix.select(cx, segment)?;
    }
    match prefix {
        NamePrefix::Classifier(classifier) => Some(classifier),
        NamePrefix::Package(_) => None,
    }
}

// =============================================================================
// Type arguments
// =============================================================================

/// Resolve a type-argument node: a type reference or `*`.
pub(crate) fn resolve_type_argument(
    node: NodeIndex,
    cx: &ResolutionContext<'_>,
    trace: &mut BindingTrace<'_>,
) -> ResolveResult<TypeArg> {
    match cx.arena.kind(node) {
        Some(NodeKind::StarProjection) => Ok(TypeArg::Star),
        Some(NodeKind::TypeReference(data)) => Ok(TypeArg::invariant(resolve_type_reference(
            node, data, cx, trace,
        )?)),
        _ => Err(ResolveError::UnexpectedNode {
            node,
            expected: "type argument",
        }),
    }
}

pub(crate) fn resolve_type_arguments(
    args: &[NodeIndex],
    cx: &ResolutionContext<'_>,
    trace: &mut BindingTrace<'_>,
) -> ResolveResult<Vec<TypeArg>> {
    args.iter()
        .map(|arg| resolve_type_argument(*arg, cx, trace))
        .collect()
}

/// Unresolvable or malformed references become the error type with a
/// diagnostic on `node`.
fn resolve_type_reference(
    node: NodeIndex,
    data: &TypeReferenceData,
    cx: &ResolutionContext<'_>,
    trace: &mut BindingTrace<'_>,
) -> ResolveResult<TypeId> {
    let path: Vec<&str> = data.qualifier.iter().map(String::as_str).collect();

    if let [single] = path.as_slice() {
        if let Some(param) = lookup_type_param_in_scope(cx, single) {
            if !data.type_args.is_empty() {
                trace.report(cx.diagnostic(
                    node,
                    diagnostic_codes::TYPE_ARGUMENTS_NOT_ALLOWED,
                    &[*single],
                ));
                return Ok(TypeId::ERROR);
            }
            return Ok(cx.types.type_param(param, data.nullable));
        }
    }

    let Some(classifier) = classifier_by_path_in_scope(cx, &path) else {
        let joined = path.join(".");
        trace.report(cx.diagnostic(
            node,
            diagnostic_codes::UNRESOLVED_REFERENCE,
            &[&joined],
        ));
        return Ok(TypeId::ERROR);
    };

    let expected = cx
        .defs
        .classifier(classifier)
        .map_or(0, |info| info.type_params.len());
    if expected != data.type_args.len() {
        let count = expected.to_string();
        let name = cx.classifier_name(classifier);
        trace.report(cx.diagnostic(
            node,
            diagnostic_codes::WRONG_NUMBER_OF_TYPE_ARGUMENTS,
            &[&count, &name],
        ));
        return Ok(TypeId::ERROR);
    }

    let args = resolve_type_arguments(&data.type_args, cx, trace)?;
    Ok(cx.types.class_type(classifier, args, data.nullable))
}

/// Bind explicitly written type arguments to the type parameters of the
/// callable `descriptor` (or of the class it constructs). Ignored when the
/// counts differ.
pub(crate) fn explicit_type_substitution(
    cx: &ResolutionContext<'_>,
    descriptor: &CallableDescriptor,
    args: &[TypeArg],
    base: &Substitution,
) -> Substitution {
    let params: &[TypeParamId] = match &descriptor.kind {
        CallableKind::Function { type_params, .. } => type_params.as_slice(),
        CallableKind::Constructor { .. } => descriptor
            .owner
            .and_then(|owner| cx.defs.classifier(owner))
            .map_or(&[] as &[TypeParamId], |info| info.type_params.as_slice()),
        CallableKind::Property { .. } | CallableKind::LocalVariable { .. } => &[],
    };
    let mut subst = base.clone();
    if params.len() == args.len() {
        for (param, arg) in params.iter().zip(args) {
            subst.insert(*param, arg.ty().unwrap_or(TypeId::NULLABLE_ANY));
        }
    }
    subst
}
