//! Subtyping, visibility and member lookup.

use crate::def::{CallableId, ClassifierId, DefinitionStore};
use crate::intern::TypeInterner;
use crate::types::{Substitution, TypeArg, TypeData, TypeId, Variance};
use callref_common::limits::MAX_SUPERTYPE_DEPTH;
use callref_parser::Visibility;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// A member found on a receiver type, with the receiver's type arguments
/// mapped onto the declaring classifier's type parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberCandidate {
    pub callable: CallableId,
    pub substitution: Substitution,
}

/// Substitution binding `classifier`'s type parameters to `args`.
/// Star projections are replaced by the parameter's upper bound.
fn arguments_substitution(
    defs: &DefinitionStore,
    classifier: ClassifierId,
    args: &[TypeArg],
) -> Substitution {
    let mut subst = Substitution::new();
    let Some(info) = defs.classifier(classifier) else {
        return subst;
    };
    for (param, arg) in info.type_params.iter().zip(args) {
        let ty = match arg {
            TypeArg::Projection { ty, .. } => *ty,
            TypeArg::Star => defs
                .type_param(*param)
                .map_or(TypeId::NULLABLE_ANY, |p| p.bound()),
        };
        subst.insert(*param, ty);
    }
    subst
}

/// `ty`'s classifier followed by all of its supertypes in breadth-first
/// order, each paired with the substitution that maps that supertype's type
/// parameters onto arguments seen from `ty`.
pub fn supertype_closure(
    types: &TypeInterner,
    defs: &DefinitionStore,
    ty: TypeId,
) -> Vec<(ClassifierId, Substitution)> {
    let start = match types.lookup(ty) {
        Some(TypeData::Class {
            classifier, args, ..
        }) => (classifier, arguments_substitution(defs, classifier, &args)),
        Some(TypeData::TypeParameter { param, .. }) => {
            let bound = defs
                .type_param(param)
                .map_or(TypeId::NULLABLE_ANY, |p| p.bound());
            return supertype_closure(types, defs, bound);
        }
        Some(TypeData::Reflection(_)) => (ClassifierId::ANY, Substitution::new()),
        Some(TypeData::Error) | None => return Vec::new(),
    };

    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    let mut queue = VecDeque::from([(start, 0u32)]);
    while let Some(((classifier, subst), depth)) = queue.pop_front() {
        if depth > MAX_SUPERTYPE_DEPTH || !seen.insert(classifier) {
            continue;
        }
        if let Some(info) = defs.classifier(classifier) {
            for &supertype in &info.supertypes {
                let supertype = types.substitute(supertype, &subst);
                if let Some(TypeData::Class {
                    classifier: parent,
                    args,
                    ..
                }) = types.lookup(supertype)
                {
                    let parent_subst = arguments_substitution(defs, parent, &args);
                    queue.push_back(((parent, parent_subst), depth + 1));
                }
            }
        }
        out.push((classifier, subst));
    }
    out
}

/// Members named `name` on `receiver`. The nearest classifier declaring the
/// name hides the same name in its supertypes.
pub fn members_named(
    types: &TypeInterner,
    defs: &DefinitionStore,
    receiver: TypeId,
    name: &str,
) -> Vec<MemberCandidate> {
    for (classifier, subst) in supertype_closure(types, defs, receiver) {
        let Some(info) = defs.classifier(classifier) else {
            continue;
        };
        let found: Vec<MemberCandidate> = info
            .members
            .iter()
            .filter(|id| defs.callable(**id).is_some_and(|c| c.name == name))
            .map(|id| MemberCandidate {
                callable: *id,
                substitution: subst.clone(),
            })
            .collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

fn is_subclass(types: &TypeInterner, defs: &DefinitionStore, sub: ClassifierId, sup: ClassifierId) -> bool {
    let declared = defs.declared_type(types, sub);
    sub == sup
        || supertype_closure(types, defs, declared)
            .iter()
            .any(|(classifier, _)| *classifier == sup)
}

/// Subtyping between two types. Type parameters on the right-hand side are
/// treated as free and accept anything within their bound. Error types are
/// compatible with everything.
pub fn is_subtype(types: &TypeInterner, defs: &DefinitionStore, sub: TypeId, sup: TypeId) -> bool {
    if sub == sup || sub.is_error() || sup.is_error() {
        return true;
    }
    let (Some(sub_data), Some(sup_data)) = (types.lookup(sub), types.lookup(sup)) else {
        return false;
    };

    match sup_data {
        TypeData::TypeParameter { param, nullable } => {
            let bound = defs
                .type_param(param)
                .map_or(TypeId::NULLABLE_ANY, |p| p.bound());
            let bound = if nullable {
                types.make_nullable(bound)
            } else {
                bound
            };
            is_subtype(types, defs, sub, bound)
        }
        TypeData::Reflection(_) | TypeData::Error => false,
        TypeData::Class {
            classifier: sup_classifier,
            args: sup_args,
            nullable: sup_nullable,
        } => {
            if sub_data.is_nullable() && !sup_nullable {
                return false;
            }
            if sub_data.classifier() == Some(ClassifierId::NOTHING)
                || sup_classifier == ClassifierId::ANY
            {
                return true;
            }
            match sub_data {
                TypeData::TypeParameter { param, .. } => {
                    let bound = defs
                        .type_param(param)
                        .map_or(TypeId::NULLABLE_ANY, |p| p.bound());
                    is_subtype(types, defs, bound, sup)
                }
                TypeData::Class { .. } => {
                    let non_null = types.make_non_null(sub);
                    let Some((_, subst)) = supertype_closure(types, defs, non_null)
                        .into_iter()
                        .find(|(classifier, _)| *classifier == sup_classifier)
                    else {
                        return false;
                    };
                    let params = defs
                        .classifier(sup_classifier)
                        .map(|info| info.type_params.clone())
                        .unwrap_or_default();
                    params.iter().zip(sup_args.iter()).all(|(param, arg)| {
                        let actual = subst.get(*param).unwrap_or(TypeId::NULLABLE_ANY);
                        match arg {
                            TypeArg::Star => true,
                            TypeArg::Projection {
                                variance: Variance::Invariant,
                                ty,
                            } => actual == *ty || actual.is_error() || ty.is_error(),
                            TypeArg::Projection {
                                variance: Variance::Out,
                                ty,
                            } => is_subtype(types, defs, actual, *ty),
                            TypeArg::Projection {
                                variance: Variance::In,
                                ty,
                            } => is_subtype(types, defs, *ty, actual),
                        }
                    })
                }
                TypeData::Reflection(_) | TypeData::Error => false,
            }
        }
    }
}

/// `ty <: Any`: the type cannot hold `null`.
pub fn is_subtype_of_any(types: &TypeInterner, defs: &DefinitionStore, ty: TypeId) -> bool {
    match types.lookup(ty) {
        Some(TypeData::TypeParameter { param, nullable }) => {
            !nullable
                && defs
                    .type_param(param)
                    .is_some_and(|p| is_subtype_of_any(types, defs, p.bound()))
        }
        Some(data) => !data.is_nullable(),
        None => false,
    }
}

/// Whether a declaration with `visibility` owned by `owner` can be used from
/// code inside `scope_owner` (or from top level when `None`).
pub fn is_visible(
    types: &TypeInterner,
    defs: &DefinitionStore,
    visibility: Visibility,
    owner: Option<ClassifierId>,
    scope_owner: Option<ClassifierId>,
) -> bool {
    let Some(owner) = owner else {
        return true;
    };
    let mut scope = scope_owner;
    let mut enclosing = Vec::new();
    while let Some(current) = scope {
        enclosing.push(current);
        scope = defs.classifier(current).and_then(|info| info.outer);
    }
    match visibility {
        Visibility::Public | Visibility::Internal => true,
        Visibility::Private => enclosing.contains(&owner),
        Visibility::Protected => enclosing
            .iter()
            .any(|scope| is_subclass(types, defs, *scope, owner)),
    }
}

#[cfg(test)]
#[path = "../tests/relations_tests.rs"]
mod tests;
