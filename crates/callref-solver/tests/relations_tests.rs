use super::*;
use crate::def::{ClassifierInfo, TypeParamInfo};
use callref_parser::ClassKind;

/// `open class Base<T>`, `class Derived : Base<Int>`, each with one member.
fn hierarchy(types: &TypeInterner) -> (DefinitionStore, ClassifierId, ClassifierId) {
    use crate::def::{CallableDescriptor, CallableKind};

    let mut defs = DefinitionStore::new(types);
    let t = defs.add_type_param(TypeParamInfo::new("T", false));
    let mut base = ClassifierInfo::new("Base", ClassKind::Class, Vec::new());
    base.type_params.push(t);
    base.supertypes.push(TypeId::ANY);
    let base = defs.add_classifier(base);
    let base_ty = defs.declared_type(types, base);
    let mut value = CallableDescriptor::new(
        "value",
        CallableKind::Property {
            ty: types.type_param(t, false),
            is_var: false,
            setter_visibility: Visibility::Public,
        },
    );
    value.owner = Some(base);
    value.dispatch_receiver = Some(base_ty);
    let value = defs.add_callable(value);
    if let Some(info) = defs.classifier_mut(base) {
        info.members.push(value);
    }

    let mut derived = ClassifierInfo::new("Derived", ClassKind::Class, Vec::new());
    derived
        .supertypes
        .push(types.class_type(base, [TypeArg::invariant(TypeId::INT)], false));
    let derived = defs.add_classifier(derived);
    (defs, base, derived)
}

#[test]
fn supertype_closure_maps_arguments_through_the_hierarchy() {
    let types = TypeInterner::new();
    let (defs, base, derived) = hierarchy(&types);
    let derived_ty = types.class_type(derived, [], false);
    let closure = supertype_closure(&types, &defs, derived_ty);
    let classifiers: Vec<_> = closure.iter().map(|(c, _)| *c).collect();
    assert_eq!(classifiers, vec![derived, base, ClassifierId::ANY]);

    let members = members_named(&types, &defs, derived_ty, "value");
    assert_eq!(members.len(), 1);
    let declared = defs
        .callable(members[0].callable)
        .map(|c| c.result_type())
        .expect("member exists");
    assert_eq!(types.substitute(declared, &members[0].substitution), TypeId::INT);
}

#[test]
fn nearest_declaration_hides_supertype_members() {
    let types = TypeInterner::new();
    let defs = DefinitionStore::new(&types);
    let members = members_named(&types, &defs, TypeId::STRING, "toString");
    assert_eq!(members.len(), 1);
    assert!(members_named(&types, &defs, TypeId::STRING, "missing").is_empty());
}

#[test]
fn subtyping_respects_nullability_and_arguments() {
    let types = TypeInterner::new();
    let (defs, base, derived) = hierarchy(&types);
    let derived_ty = types.class_type(derived, [], false);
    let base_int = types.class_type(base, [TypeArg::invariant(TypeId::INT)], false);
    let base_string = types.class_type(base, [TypeArg::invariant(TypeId::STRING)], false);
    let base_star = types.class_type(base, [TypeArg::Star], false);

    assert!(is_subtype(&types, &defs, derived_ty, base_int));
    assert!(!is_subtype(&types, &defs, derived_ty, base_string));
    assert!(is_subtype(&types, &defs, derived_ty, base_star));
    assert!(is_subtype(&types, &defs, TypeId::NOTHING, base_int));
    assert!(!is_subtype(&types, &defs, types.make_nullable(derived_ty), base_star));
    assert!(is_subtype(&types, &defs, types.make_nullable(derived_ty), TypeId::NULLABLE_ANY));
}

#[test]
fn type_parameters_are_subtypes_of_any_only_with_a_non_null_bound() {
    let types = TypeInterner::new();
    let mut defs = DefinitionStore::new(&types);
    let free = defs.add_type_param(TypeParamInfo::new("T", false));
    let mut bounded = TypeParamInfo::new("R", true);
    bounded.upper_bound = Some(TypeId::ANY);
    let bounded = defs.add_type_param(bounded);

    assert!(!is_subtype_of_any(&types, &defs, types.type_param(free, false)));
    assert!(is_subtype_of_any(&types, &defs, types.type_param(bounded, false)));
    assert!(!is_subtype_of_any(&types, &defs, types.type_param(bounded, true)));
    assert!(!is_subtype_of_any(&types, &defs, TypeId::NULLABLE_ANY));
}

#[test]
fn private_and_protected_visibility() {
    let types = TypeInterner::new();
    let (mut defs, base, derived) = hierarchy(&types);
    let mut nested = ClassifierInfo::new("Nested", ClassKind::Class, Vec::new());
    nested.outer = Some(base);
    let nested = defs.add_classifier(nested);

    assert!(is_visible(&types, &defs, Visibility::Private, Some(base), Some(base)));
    assert!(is_visible(&types, &defs, Visibility::Private, Some(base), Some(nested)));
    assert!(!is_visible(&types, &defs, Visibility::Private, Some(base), Some(derived)));
    assert!(!is_visible(&types, &defs, Visibility::Private, Some(base), None));
    assert!(is_visible(&types, &defs, Visibility::Protected, Some(base), Some(derived)));
    assert!(!is_visible(&types, &defs, Visibility::Protected, Some(derived), Some(base)));
    assert!(is_visible(&types, &defs, Visibility::Private, None, None));
}

#[test]
fn deep_acyclic_hierarchy_is_cut_at_the_depth_limit() {
    use callref_common::limits::MAX_SUPERTYPE_DEPTH;

    let types = TypeInterner::new();
    let mut defs = DefinitionStore::new(&types);
    let mut parent: Option<ClassifierId> = None;
    for level in 0..MAX_SUPERTYPE_DEPTH + 10 {
        let mut info = ClassifierInfo::new(format!("C{level}"), ClassKind::Class, Vec::new());
        if let Some(parent) = parent {
            info.supertypes.push(types.class_type(parent, [], false));
        }
        parent = Some(defs.add_classifier(info));
    }
    let deepest = parent.expect("at least one class");

    let closure = supertype_closure(&types, &defs, types.class_type(deepest, [], false));
    assert_eq!(closure.len(), MAX_SUPERTYPE_DEPTH as usize + 1);
    assert_eq!(closure[0].0, deepest);
}
