//! Definition identifiers and storage.
//!
//! The [`DefinitionStore`] owns every classifier, type parameter and callable
//! known to a resolution run. Declarations are added by the binder; builtins
//! are registered when the store is created.
//!
//! | Id | Refers to |
//! |----|-----------|
//! | [`ClassifierId`] | classes, interfaces, objects, companion objects |
//! | [`TypeParamId`] | type parameters of classifiers, functions, or the scope |
//! | [`CallableId`] | functions, constructors, properties, local variables |

use crate::intern::TypeInterner;
use crate::types::{TypeArg, TypeId};
use bitflags::bitflags;
use callref_parser::{ClassKind, Visibility};
use tracing::trace;

// =============================================================================
// Identifiers
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassifierId(pub u32);

impl ClassifierId {
    pub const ANY: ClassifierId = ClassifierId(0);
    pub const NOTHING: ClassifierId = ClassifierId(1);
    pub const UNIT: ClassifierId = ClassifierId(2);
    pub const INT: ClassifierId = ClassifierId(3);
    pub const STRING: ClassifierId = ClassifierId(4);
    pub const BOOLEAN: ClassifierId = ClassifierId(5);
    pub const ARRAY: ClassifierId = ClassifierId(6);
    pub const INT_ARRAY: ClassifierId = ClassifierId(7);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeParamId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallableId(pub u32);

// =============================================================================
// Classifiers
// =============================================================================

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ClassifierFlags: u8 {
        const BUILTIN = 1 << 0;
        /// `Array<T>`
        const NON_PRIMITIVE_ARRAY = 1 << 1;
        /// `IntArray` and friends
        const PRIMITIVE_ARRAY = 1 << 2;
        /// Reflection support classes (`KClass`, `KFunction`, ...).
        const REFLECTION = 1 << 3;
    }
}

#[derive(Clone, Debug)]
pub struct ClassifierInfo {
    pub name: String,
    pub kind: ClassKind,
    /// Package path; empty for the default package.
    pub package: Vec<String>,
    /// Enclosing classifier for nested declarations.
    pub outer: Option<ClassifierId>,
    pub visibility: Visibility,
    pub flags: ClassifierFlags,
    pub type_params: Vec<TypeParamId>,
    /// Written in terms of this classifier's own type parameters.
    pub supertypes: Vec<TypeId>,
    pub companion: Option<ClassifierId>,
    pub nested: Vec<ClassifierId>,
    /// Members with a dispatch receiver of this classifier.
    pub members: Vec<CallableId>,
    /// Members reachable through the class qualifier (`Foo::bar`).
    pub statics: Vec<CallableId>,
    pub constructors: Vec<CallableId>,
}

impl ClassifierInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ClassKind, package: Vec<String>) -> ClassifierInfo {
        ClassifierInfo {
            name: name.into(),
            kind,
            package,
            outer: None,
            visibility: Visibility::Public,
            flags: ClassifierFlags::empty(),
            type_params: Vec::new(),
            supertypes: Vec::new(),
            companion: None,
            nested: Vec::new(),
            members: Vec::new(),
            statics: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Named singleton: an `object` or a companion object.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.kind, ClassKind::Object | ClassKind::CompanionObject)
    }
}

// =============================================================================
// Type parameters
// =============================================================================

#[derive(Clone, Debug)]
pub struct TypeParamInfo {
    pub name: String,
    pub reified: bool,
    /// `None` means the implicit `Any?` bound.
    pub upper_bound: Option<TypeId>,
}

impl TypeParamInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, reified: bool) -> TypeParamInfo {
        TypeParamInfo {
            name: name.into(),
            reified,
            upper_bound: None,
        }
    }

    #[must_use]
    pub fn bound(&self) -> TypeId {
        self.upper_bound.unwrap_or(TypeId::NULLABLE_ANY)
    }
}

// =============================================================================
// Callables
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueParam {
    pub name: String,
    pub ty: TypeId,
}

#[derive(Clone, Debug)]
pub enum CallableKind {
    Function {
        type_params: Vec<TypeParamId>,
        params: Vec<ValueParam>,
        return_type: TypeId,
        is_suspend: bool,
    },
    Constructor {
        params: Vec<ValueParam>,
        /// The constructed type, with the class's own type parameters as
        /// arguments.
        constructed: TypeId,
    },
    Property {
        ty: TypeId,
        is_var: bool,
        setter_visibility: Visibility,
    },
    LocalVariable {
        ty: TypeId,
        is_var: bool,
    },
}

#[derive(Clone, Debug)]
pub struct CallableDescriptor {
    pub name: String,
    pub kind: CallableKind,
    /// Classifier that declares this callable.
    pub owner: Option<ClassifierId>,
    pub package: Vec<String>,
    pub visibility: Visibility,
    pub dispatch_receiver: Option<TypeId>,
    pub extension_receiver: Option<TypeId>,
}

impl CallableDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CallableKind) -> CallableDescriptor {
        CallableDescriptor {
            name: name.into(),
            kind,
            owner: None,
            package: Vec::new(),
            visibility: Visibility::Public,
            dispatch_receiver: None,
            extension_receiver: None,
        }
    }

    #[must_use]
    pub const fn has_receiver(&self) -> bool {
        self.dispatch_receiver.is_some() || self.extension_receiver.is_some()
    }

    /// Declared as an extension inside a class body.
    #[must_use]
    pub const fn is_member_extension(&self) -> bool {
        self.dispatch_receiver.is_some() && self.extension_receiver.is_some()
    }

    #[must_use]
    pub const fn is_function(&self) -> bool {
        matches!(self.kind, CallableKind::Function { .. })
    }

    #[must_use]
    pub const fn is_suspend(&self) -> bool {
        matches!(
            self.kind,
            CallableKind::Function {
                is_suspend: true,
                ..
            }
        )
    }

    /// Value-parameter list of functions and constructors.
    #[must_use]
    pub fn params(&self) -> &[ValueParam] {
        match &self.kind {
            CallableKind::Function { params, .. } | CallableKind::Constructor { params, .. } => {
                params
            }
            CallableKind::Property { .. } | CallableKind::LocalVariable { .. } => &[],
        }
    }

    /// Type of the value produced by calling or reading this callable.
    #[must_use]
    pub const fn result_type(&self) -> TypeId {
        match &self.kind {
            CallableKind::Function { return_type, .. } => *return_type,
            CallableKind::Constructor { constructed, .. } => *constructed,
            CallableKind::Property { ty, .. } | CallableKind::LocalVariable { ty, .. } => *ty,
        }
    }
}

// =============================================================================
// Reflection classes
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReflectionClass {
    KClass,
    KFunction,
    KProperty,
    KMutableProperty,
}

impl ReflectionClass {
    pub const ALL: [ReflectionClass; 4] = [
        ReflectionClass::KClass,
        ReflectionClass::KFunction,
        ReflectionClass::KProperty,
        ReflectionClass::KMutableProperty,
    ];

    #[must_use]
    pub const fn simple_name(self) -> &'static str {
        match self {
            ReflectionClass::KClass => "KClass",
            ReflectionClass::KFunction => "KFunction",
            ReflectionClass::KProperty => "KProperty",
            ReflectionClass::KMutableProperty => "KMutableProperty",
        }
    }

    #[must_use]
    pub fn qualified_name(self) -> String {
        format!("kotlin.reflect.{}", self.simple_name())
    }
}

// =============================================================================
// DefinitionStore
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct DefinitionStore {
    classifiers: Vec<ClassifierInfo>,
    type_params: Vec<TypeParamInfo>,
    callables: Vec<CallableDescriptor>,
    reflection: Vec<(ReflectionClass, ClassifierId)>,
}

impl DefinitionStore {
    /// Store with builtins and reflection support registered.
    #[must_use]
    pub fn new(types: &TypeInterner) -> DefinitionStore {
        DefinitionStore::with_builtins(types, true)
    }

    /// Store with the builtin classifiers; the reflection classes are only
    /// registered when `reflection` is set.
    #[must_use]
    pub fn with_builtins(types: &TypeInterner, reflection: bool) -> DefinitionStore {
        let mut store = DefinitionStore::default();
        store.register_builtins(types);
        if reflection {
            store.register_reflection();
        }
        trace!(
            classifiers = store.classifiers.len(),
            callables = store.callables.len(),
            reflection,
            "registered builtins"
        );
        store
    }

    pub fn add_classifier(&mut self, info: ClassifierInfo) -> ClassifierId {
        let id = ClassifierId(self.classifiers.len() as u32);
        self.classifiers.push(info);
        id
    }

    pub fn add_type_param(&mut self, info: TypeParamInfo) -> TypeParamId {
        let id = TypeParamId(self.type_params.len() as u32);
        self.type_params.push(info);
        id
    }

    pub fn add_callable(&mut self, descriptor: CallableDescriptor) -> CallableId {
        let id = CallableId(self.callables.len() as u32);
        self.callables.push(descriptor);
        id
    }

    #[must_use]
    pub fn classifier(&self, id: ClassifierId) -> Option<&ClassifierInfo> {
        self.classifiers.get(id.0 as usize)
    }

    pub fn classifier_mut(&mut self, id: ClassifierId) -> Option<&mut ClassifierInfo> {
        self.classifiers.get_mut(id.0 as usize)
    }

    #[must_use]
    pub fn type_param(&self, id: TypeParamId) -> Option<&TypeParamInfo> {
        self.type_params.get(id.0 as usize)
    }

    pub fn type_param_mut(&mut self, id: TypeParamId) -> Option<&mut TypeParamInfo> {
        self.type_params.get_mut(id.0 as usize)
    }

    #[must_use]
    pub fn callable(&self, id: CallableId) -> Option<&CallableDescriptor> {
        self.callables.get(id.0 as usize)
    }

    pub fn callable_mut(&mut self, id: CallableId) -> Option<&mut CallableDescriptor> {
        self.callables.get_mut(id.0 as usize)
    }

    pub fn classifiers(&self) -> impl Iterator<Item = (ClassifierId, &ClassifierInfo)> {
        self.classifiers
            .iter()
            .enumerate()
            .map(|(i, info)| (ClassifierId(i as u32), info))
    }

    pub fn callables(&self) -> impl Iterator<Item = (CallableId, &CallableDescriptor)> {
        self.callables
            .iter()
            .enumerate()
            .map(|(i, descriptor)| (CallableId(i as u32), descriptor))
    }

    #[must_use]
    pub fn reflection_class(&self, class: ReflectionClass) -> Option<ClassifierId> {
        self.reflection
            .iter()
            .find(|(registered, _)| *registered == class)
            .map(|(_, id)| *id)
    }

    #[must_use]
    pub fn nested_named(&self, outer: ClassifierId, name: &str) -> Option<ClassifierId> {
        let info = self.classifier(outer)?;
        info.nested
            .iter()
            .copied()
            .find(|nested| self.classifier(*nested).is_some_and(|n| n.name == name))
    }

    /// `a.b.Outer.Inner`
    #[must_use]
    pub fn qualified_name(&self, id: ClassifierId) -> String {
        let Some(info) = self.classifier(id) else {
            return String::from("<unknown>");
        };
        let mut segments = vec![info.name.as_str()];
        let mut outer = info.outer;
        let mut root = info;
        while let Some(parent) = outer.and_then(|o| self.classifier(o)) {
            segments.push(parent.name.as_str());
            outer = parent.outer;
            root = parent;
        }
        segments.extend(root.package.iter().rev().map(String::as_str));
        segments.reverse();
        segments.join(".")
    }

    /// The classifier's own type as seen from inside it: `Foo<T, R>`.
    pub fn declared_type(&self, types: &TypeInterner, id: ClassifierId) -> TypeId {
        let params = self
            .classifier(id)
            .map(|info| info.type_params.clone())
            .unwrap_or_default();
        types.class_type(
            id,
            params
                .into_iter()
                .map(|param| TypeArg::invariant(types.type_param(param, false))),
            false,
        )
    }

    #[must_use]
    pub fn is_non_primitive_array(&self, id: ClassifierId) -> bool {
        self.classifier(id)
            .is_some_and(|info| info.flags.contains(ClassifierFlags::NON_PRIMITIVE_ARRAY))
    }

    // =========================================================================
    // Builtins
    // =========================================================================

    fn register_builtins(&mut self, types: &TypeInterner) {
        let kotlin = || vec![String::from("kotlin")];
        let builtin = |name: &str, kind: ClassKind| {
            let mut info = ClassifierInfo::new(name, kind, kotlin());
            info.flags = ClassifierFlags::BUILTIN;
            if name != "Any" && name != "Nothing" {
                info.supertypes.push(TypeId::ANY);
            }
            info
        };

        // Order must match the ClassifierId constants.
        let any = self.add_classifier(builtin("Any", ClassKind::Class));
        self.add_classifier(builtin("Nothing", ClassKind::Class));
        self.add_classifier(builtin("Unit", ClassKind::Object));
        let int = self.add_classifier(builtin("Int", ClassKind::Class));
        let string = self.add_classifier(builtin("String", ClassKind::Class));
        let boolean = self.add_classifier(builtin("Boolean", ClassKind::Class));
        let array = self.add_classifier(builtin("Array", ClassKind::Class));
        let int_array = self.add_classifier(builtin("IntArray", ClassKind::Class));
        debug_assert_eq!(int_array, ClassifierId::INT_ARRAY);

        let element = self.add_type_param(TypeParamInfo::new("T", false));
        let element_ty = types.type_param(element, false);
        if let Some(info) = self.classifier_mut(array) {
            info.type_params.push(element);
            info.flags |= ClassifierFlags::NON_PRIMITIVE_ARRAY;
        }
        if let Some(info) = self.classifier_mut(int_array) {
            info.flags |= ClassifierFlags::PRIMITIVE_ARRAY;
        }

        let param = |name: &str, ty| ValueParam {
            name: name.to_string(),
            ty,
        };
        self.add_builtin_function(any, TypeId::ANY, "toString", Vec::new(), TypeId::STRING);
        self.add_builtin_function(any, TypeId::ANY, "hashCode", Vec::new(), TypeId::INT);
        self.add_builtin_function(
            int,
            TypeId::INT,
            "plus",
            vec![param("other", TypeId::INT)],
            TypeId::INT,
        );
        self.add_builtin_function(int, TypeId::INT, "inc", Vec::new(), TypeId::INT);
        self.add_builtin_property(string, TypeId::STRING, "length", TypeId::INT);
        self.add_builtin_function(
            string,
            TypeId::STRING,
            "substring",
            vec![param("startIndex", TypeId::INT)],
            TypeId::STRING,
        );
        self.add_builtin_function(
            string,
            TypeId::STRING,
            "plus",
            vec![param("other", TypeId::NULLABLE_ANY)],
            TypeId::STRING,
        );
        self.add_builtin_function(boolean, TypeId::BOOLEAN, "not", Vec::new(), TypeId::BOOLEAN);

        let array_ty = self.declared_type(types, array);
        self.add_builtin_property(array, array_ty, "size", TypeId::INT);
        self.add_builtin_function(
            array,
            array_ty,
            "get",
            vec![param("index", TypeId::INT)],
            element_ty,
        );
        self.add_builtin_function(
            array,
            array_ty,
            "set",
            vec![param("index", TypeId::INT), param("value", element_ty)],
            TypeId::UNIT,
        );
        let int_array_ty = types.class_type(int_array, [], false);
        self.add_builtin_property(int_array, int_array_ty, "size", TypeId::INT);
        self.add_builtin_function(
            int_array,
            int_array_ty,
            "get",
            vec![param("index", TypeId::INT)],
            TypeId::INT,
        );
    }

    fn add_builtin_function(
        &mut self,
        owner: ClassifierId,
        receiver: TypeId,
        name: &str,
        params: Vec<ValueParam>,
        return_type: TypeId,
    ) {
        let mut descriptor = CallableDescriptor::new(
            name,
            CallableKind::Function {
                type_params: Vec::new(),
                params,
                return_type,
                is_suspend: false,
            },
        );
        descriptor.owner = Some(owner);
        descriptor.package = vec![String::from("kotlin")];
        descriptor.dispatch_receiver = Some(receiver);
        let id = self.add_callable(descriptor);
        if let Some(info) = self.classifier_mut(owner) {
            info.members.push(id);
        }
    }

    fn add_builtin_property(
        &mut self,
        owner: ClassifierId,
        receiver: TypeId,
        name: &str,
        ty: TypeId,
    ) {
        let mut descriptor = CallableDescriptor::new(
            name,
            CallableKind::Property {
                ty,
                is_var: false,
                setter_visibility: Visibility::Public,
            },
        );
        descriptor.owner = Some(owner);
        descriptor.package = vec![String::from("kotlin")];
        descriptor.dispatch_receiver = Some(receiver);
        let id = self.add_callable(descriptor);
        if let Some(info) = self.classifier_mut(owner) {
            info.members.push(id);
        }
    }

    fn register_reflection(&mut self) {
        for class in ReflectionClass::ALL {
            let param = self.add_type_param(TypeParamInfo::new("T", false));
            let mut info = ClassifierInfo::new(
                class.simple_name(),
                ClassKind::Interface,
                vec![String::from("kotlin"), String::from("reflect")],
            );
            info.flags = ClassifierFlags::BUILTIN | ClassifierFlags::REFLECTION;
            info.type_params.push(param);
            info.supertypes.push(TypeId::ANY);
            let id = self.add_classifier(info);
            self.reflection.push((class, id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_match_constants() {
        let types = TypeInterner::new();
        let store = DefinitionStore::new(&types);
        let name = |id| store.classifier(id).map(|info| info.name.as_str());
        assert_eq!(name(ClassifierId::ANY), Some("Any"));
        assert_eq!(name(ClassifierId::STRING), Some("String"));
        assert_eq!(name(ClassifierId::ARRAY), Some("Array"));
        assert_eq!(name(ClassifierId::INT_ARRAY), Some("IntArray"));
        assert!(store.is_non_primitive_array(ClassifierId::ARRAY));
        assert!(!store.is_non_primitive_array(ClassifierId::INT_ARRAY));
    }

    #[test]
    fn reflection_is_optional() {
        let types = TypeInterner::new();
        let with = DefinitionStore::with_builtins(&types, true);
        let without = DefinitionStore::with_builtins(&types, false);
        assert!(with.reflection_class(ReflectionClass::KFunction).is_some());
        assert!(without.reflection_class(ReflectionClass::KFunction).is_none());
    }

    #[test]
    fn qualified_name_includes_outer_classes_and_package() {
        let types = TypeInterner::new();
        let mut store = DefinitionStore::new(&types);
        let outer = store.add_classifier(ClassifierInfo::new(
            "Outer",
            ClassKind::Class,
            vec!["a".into(), "b".into()],
        ));
        let mut inner = ClassifierInfo::new("Inner", ClassKind::Class, vec!["a".into(), "b".into()]);
        inner.outer = Some(outer);
        let inner = store.add_classifier(inner);
        assert_eq!(store.qualified_name(inner), "a.b.Outer.Inner");
        assert_eq!(
            store.qualified_name(ClassifierId::INT),
            "kotlin.Int"
        );
    }
}
