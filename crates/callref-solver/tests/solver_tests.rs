//! Formatting of the types produced for `::` expressions.

use callref_solver::{
    ClassKind, ClassifierId, ClassifierInfo, DefinitionStore, ReflectionParam, TypeArg,
    TypeFormatter, TypeId, TypeInterner, TypeParamInfo,
};

#[test]
fn formats_class_types_with_projections() {
    let types = TypeInterner::new();
    let defs = DefinitionStore::new(&types);
    let fmt = TypeFormatter::new(&types, &defs);

    let array = types.class_type(ClassifierId::ARRAY, [TypeArg::out(TypeId::STRING)], true);
    assert_eq!(fmt.format(array), "Array<out String>?");
    let star = types.class_type(ClassifierId::ARRAY, [TypeArg::Star], false);
    assert_eq!(fmt.format(star), "Array<*>");
    assert_eq!(fmt.format(TypeId::ERROR), "<error>");
}

#[test]
fn formats_reflection_types_by_arity() {
    let types = TypeInterner::new();
    let mut defs = DefinitionStore::new(&types);
    let foo = defs.add_classifier(ClassifierInfo::new("Foo", ClassKind::Class, Vec::new()));
    let foo_ty = types.class_type(foo, [], false);
    let fmt = TypeFormatter::new(&types, &defs);

    let unbound = types.kfunction(
        Some(foo_ty),
        vec![ReflectionParam {
            name: "x".into(),
            ty: TypeId::INT,
        }],
        TypeId::STRING,
        false,
    );
    assert_eq!(fmt.format(unbound), "KFunction2<Foo, Int, String>");

    let suspend = types.kfunction(None, Vec::new(), TypeId::UNIT, true);
    assert_eq!(fmt.format(suspend), "KSuspendFunction0<Unit>");

    let property = types.kproperty(Some(foo_ty), TypeId::INT, true);
    assert_eq!(fmt.format(property), "KMutableProperty1<Foo, Int>");
    let bound_property = types.kproperty(None, TypeId::INT, false);
    assert_eq!(fmt.format(bound_property), "KProperty0<Int>");

    let class = types.kclass(TypeArg::out(foo_ty));
    assert_eq!(fmt.format(class), "KClass<out Foo>");
}

#[test]
fn formats_type_parameters() {
    let types = TypeInterner::new();
    let mut defs = DefinitionStore::new(&types);
    let t = defs.add_type_param(TypeParamInfo::new("T", true));
    let fmt = TypeFormatter::new(&types, &defs);
    assert_eq!(fmt.format(types.type_param(t, true)), "T?");
}
