//! Binding declaration stubs into definitions and scopes.

use callref_binder::{BindOutput, bind_declarations};
use callref_common::diagnostic_codes;
use callref_parser::{ClassKind, Visibility, parse_declarations};
use callref_solver::{CallableKind, DefinitionStore, TypeFormatter, TypeId, TypeInterner};

fn bind(source: &str) -> (TypeInterner, DefinitionStore, BindOutput) {
    let file = parse_declarations(source).expect("stubs parse");
    let types = TypeInterner::new();
    let mut defs = DefinitionStore::new(&types);
    let output = bind_declarations(&file, "decls.kt", &types, &mut defs);
    (types, defs, output)
}

#[test]
fn binds_classes_members_and_companions() {
    let (types, defs, output) = bind(
        r#"
        class Foo<T> {
            fun get(): T
            var name: String private set
            companion object { fun create(): Foo<Int> }
        }
        "#,
    );
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let foo = output.symbols.lookup_classifier("Foo").expect("Foo is declared");
    let info = defs.classifier(foo).expect("classifier info");
    assert_eq!(info.type_params.len(), 1);
    assert_eq!(info.members.len(), 2);
    assert_eq!(info.constructors.len(), 1, "implicit constructor");

    let companion = info.companion.expect("companion registered");
    let companion_info = defs.classifier(companion).expect("companion info");
    assert_eq!(companion_info.kind, ClassKind::CompanionObject);
    assert_eq!(companion_info.outer, Some(foo));

    let name = defs.callable(info.members[1]).expect("property");
    let CallableKind::Property {
        is_var,
        setter_visibility,
        ..
    } = name.kind
    else {
        panic!("expected a property");
    };
    assert!(is_var);
    assert_eq!(setter_visibility, Visibility::Private);

    let fmt = TypeFormatter::new(&types, &defs);
    let get = defs.callable(info.members[0]).expect("function");
    assert_eq!(fmt.format(get.result_type()), "T");
    assert_eq!(get.dispatch_receiver.map(|ty| fmt.format(ty)).as_deref(), Some("Foo<T>"));
}

#[test]
fn binds_extensions_locals_and_scope_type_params() {
    let (types, defs, output) = bind(
        r#"
        class Foo
        fun Foo.ext(x: Int): String
        local var s: String?
        typeparam reified R : Any
        "#,
    );
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let ext = output.symbols.top_level_callables("ext");
    assert_eq!(ext.len(), 1);
    let ext = defs.callable(ext[0]).expect("ext");
    assert!(ext.extension_receiver.is_some());
    assert!(ext.dispatch_receiver.is_none());

    let local = output.symbols.lookup_local("s").expect("local declared");
    let local = defs.callable(local).expect("local descriptor");
    assert!(matches!(local.kind, CallableKind::LocalVariable { is_var: true, .. }));
    assert!(types.is_nullable(local.result_type()));

    let r = output.symbols.lookup_type_param("R").expect("type param in scope");
    let r = defs.type_param(r).expect("type param info");
    assert!(r.reified);
    assert_eq!(r.upper_bound, Some(TypeId::ANY));
}

#[test]
fn classes_in_packages_resolve_by_qualified_name() {
    let (_, defs, output) = bind(
        r#"
        package a.b
        class Outer { class Inner }
        package c
        fun make(): a.b.Outer.Inner
        "#,
    );
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let inner = output
        .symbols
        .classifier_by_path(&defs, &["a", "b", "Outer", "Inner"])
        .expect("nested class by path");
    assert_eq!(defs.qualified_name(inner), "a.b.Outer.Inner");
    assert!(output.symbols.lookup_classifier("Outer").is_none());
    assert_eq!(output.symbols.package_callables(&["c".to_string()], "make").len(), 1);
}

#[test]
fn bad_types_become_errors_with_diagnostics() {
    let (_, defs, output) = bind(
        r#"
        fun a(): Missing
        fun b(): Array
        "#,
    );
    let codes: Vec<u32> = output.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![
            diagnostic_codes::UNRESOLVED_REFERENCE,
            diagnostic_codes::WRONG_NUMBER_OF_TYPE_ARGUMENTS
        ]
    );
    let a = output.symbols.top_level_callables("a");
    assert_eq!(defs.callable(a[0]).map(|c| c.result_type()), Some(TypeId::ERROR));
}
