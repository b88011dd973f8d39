//! Declaration binding.
//!
//! Binding runs in two passes so that stubs may refer to classifiers
//! declared later in the file: classifiers and type parameters are declared
//! first, then supertypes, bounds and members are resolved.

use crate::state::{BinderState, TypeScope};
use callref_parser::{
    ClassDecl, ClassKind, ClassMember, DeclFile, FunctionDecl, Item, LocalDecl,
    ParamDecl, PropertyDecl, TypeParamDecl, Visibility,
};
use callref_solver::{
    CallableDescriptor, CallableId, CallableKind, ClassifierId, ClassifierInfo, TypeId,
    TypeParamId, TypeParamInfo, ValueParam,
};
use tracing::trace;

/// A declared classifier awaiting its body.
pub(crate) struct PendingClass<'d> {
    id: ClassifierId,
    decl: &'d ClassDecl,
    package: Vec<String>,
}

impl BinderState<'_> {
    // =========================================================================
    // Pass 1: declare
    // =========================================================================

    pub(crate) fn declare_classifiers<'d>(&mut self, file: &'d DeclFile) -> Vec<PendingClass<'d>> {
        let mut pending = Vec::new();
        for (package, item) in file.items() {
            if let Item::Class(decl) = item {
                let id = self.declare_class(decl, package, None, &mut pending);
                self.symbols.declare_classifier(package, &decl.name, id);
            }
        }
        pending
    }

    fn declare_class<'d>(
        &mut self,
        decl: &'d ClassDecl,
        package: &[String],
        outer: Option<ClassifierId>,
        pending: &mut Vec<PendingClass<'d>>,
    ) -> ClassifierId {
        let mut info = ClassifierInfo::new(decl.name.clone(), decl.kind, package.to_vec());
        info.outer = outer;
        info.visibility = decl.visibility;
        info.type_params = decl
            .type_params
            .iter()
            .map(|param| self.defs.add_type_param(TypeParamInfo::new(&param.name, param.reified)))
            .collect();
        let id = self.defs.add_classifier(info);
        trace!(name = %decl.name, id = id.0, "declared classifier");
        pending.push(PendingClass {
            id,
            decl,
            package: package.to_vec(),
        });

        for member in &decl.members {
            let ClassMember::Class(nested) = member else {
                continue;
            };
            let nested_id = self.declare_class(nested, package, Some(id), pending);
            if let Some(info) = self.defs.classifier_mut(id) {
                info.nested.push(nested_id);
                if nested.kind == ClassKind::CompanionObject {
                    info.companion = Some(nested_id);
                }
            }
        }
        id
    }

    pub(crate) fn bind_scope_type_params(&mut self, file: &DeclFile) {
        let mut declared = Vec::new();
        for (_, item) in file.items() {
            if let Item::TypeParam(param) = item {
                let id = self
                    .defs
                    .add_type_param(TypeParamInfo::new(&param.name, param.reified));
                self.symbols.declare_type_param(&param.name, id);
                declared.push((id, param));
            }
        }
        let scope = TypeScope::default();
        self.bind_bounds(&declared, &scope);
    }

    fn bind_bounds(&mut self, params: &[(TypeParamId, &TypeParamDecl)], scope: &TypeScope) {
        for (id, decl) in params {
            let Some(bound) = &decl.bound else {
                continue;
            };
            let bound = self.resolve_type_ref(bound, scope);
            if let Some(info) = self.defs.type_param_mut(*id) {
                info.upper_bound = Some(bound);
            }
        }
    }

    // =========================================================================
    // Pass 2: bodies
    // =========================================================================

    pub(crate) fn bind_classifier_bodies(&mut self, classes: &[PendingClass<'_>]) {
        for class in classes {
            let scope = TypeScope {
                package: class.package.clone(),
                classifier: Some(class.id),
                function_params: Vec::new(),
            };
            let params: Vec<TypeParamId> = self
                .defs
                .classifier(class.id)
                .map(|info| info.type_params.clone())
                .unwrap_or_default();
            let declared: Vec<(TypeParamId, &TypeParamDecl)> =
                params.into_iter().zip(&class.decl.type_params).collect();
            self.bind_bounds(&declared, &scope);

            let supertypes: Vec<_> = class
                .decl
                .supertypes
                .iter()
                .map(|ty| self.resolve_type_ref(ty, &scope))
                .collect();
            if let Some(info) = self.defs.classifier_mut(class.id) {
                info.supertypes = supertypes;
                if info.supertypes.is_empty() {
                    info.supertypes.push(TypeId::ANY);
                }
            }

            let mut has_constructor = false;
            for member in &class.decl.members {
                match member {
                    ClassMember::Function(function) => {
                        self.bind_function(function, &scope);
                    }
                    ClassMember::Property(property) => {
                        self.bind_property(property, &scope);
                    }
                    ClassMember::Constructor(ctor) => {
                        has_constructor = true;
                        self.bind_constructor(class.id, ctor.visibility, &ctor.params, &scope);
                    }
                    ClassMember::Class(_) => {}
                }
            }
            if !has_constructor && matches!(class.decl.kind, ClassKind::Class | ClassKind::AnnotationClass)
            {
                self.bind_constructor(class.id, Visibility::Public, &[], &scope);
            }
        }
    }

    pub(crate) fn bind_top_level(&mut self, file: &DeclFile) {
        for (package, item) in file.items() {
            let scope = TypeScope {
                package: package.to_vec(),
                classifier: None,
                function_params: Vec::new(),
            };
            match item {
                Item::Function(function) => {
                    let id = self.bind_function(function, &scope);
                    self.symbols.declare_callable(package, &function.name, id);
                }
                Item::Property(property) => {
                    let id = self.bind_property(property, &scope);
                    self.symbols.declare_callable(package, &property.name, id);
                }
                Item::Local(local) => {
                    let id = self.bind_local(local, &scope);
                    self.symbols.declare_local(&local.name, id);
                }
                Item::Class(_) | Item::TypeParam(_) => {}
            }
        }
    }

    // =========================================================================
    // Callables
    // =========================================================================

    /// Attach `descriptor` to the enclosing classifier (if any) and store it.
    fn add_member(
        &mut self,
        mut descriptor: CallableDescriptor,
        scope: &TypeScope,
        is_static: bool,
    ) -> CallableId {
        descriptor.package = scope.package.clone();
        descriptor.owner = scope.classifier;
        if let Some(owner) = scope.classifier {
            if !is_static {
                descriptor.dispatch_receiver = Some(self.defs.declared_type(self.types, owner));
            }
        }
        let id = self.defs.add_callable(descriptor);
        if let Some(info) = scope.classifier.and_then(|owner| self.defs.classifier_mut(owner)) {
            if is_static {
                info.statics.push(id);
            } else {
                info.members.push(id);
            }
        }
        id
    }

    fn bind_params(&mut self, params: &[ParamDecl], scope: &TypeScope) -> Vec<ValueParam> {
        params
            .iter()
            .map(|param| ValueParam {
                name: param.name.clone(),
                ty: self.resolve_type_ref(&param.ty, scope),
            })
            .collect()
    }

    fn bind_function(&mut self, function: &FunctionDecl, outer: &TypeScope) -> CallableId {
        let type_params: Vec<TypeParamId> = function
            .type_params
            .iter()
            .map(|param| self.defs.add_type_param(TypeParamInfo::new(&param.name, param.reified)))
            .collect();
        let mut scope = outer.clone();
        scope.function_params = function
            .type_params
            .iter()
            .map(|param| param.name.clone())
            .zip(type_params.iter().copied())
            .collect();
        let declared: Vec<(TypeParamId, &TypeParamDecl)> =
            type_params.iter().copied().zip(&function.type_params).collect();
        self.bind_bounds(&declared, &scope);

        let extension_receiver = function
            .receiver
            .as_ref()
            .map(|receiver| self.resolve_type_ref(receiver, &scope));
        let params = self.bind_params(&function.params, &scope);
        let return_type = match &function.return_type {
            Some(ty) => self.resolve_type_ref(ty, &scope),
            None => TypeId::UNIT,
        };

        let mut descriptor = CallableDescriptor::new(
            function.name.clone(),
            CallableKind::Function {
                type_params,
                params,
                return_type,
                is_suspend: function.modifiers.is_suspend,
            },
        );
        descriptor.visibility = function.modifiers.visibility;
        descriptor.extension_receiver = extension_receiver;
        self.add_member(descriptor, outer, function.modifiers.is_static)
    }

    fn bind_property(&mut self, property: &PropertyDecl, scope: &TypeScope) -> CallableId {
        let extension_receiver = property
            .receiver
            .as_ref()
            .map(|receiver| self.resolve_type_ref(receiver, scope));
        let ty = self.resolve_type_ref(&property.ty, scope);
        let visibility = property.modifiers.visibility;
        let mut descriptor = CallableDescriptor::new(
            property.name.clone(),
            CallableKind::Property {
                ty,
                is_var: property.is_var,
                setter_visibility: property.setter_visibility.unwrap_or(visibility),
            },
        );
        descriptor.visibility = visibility;
        descriptor.extension_receiver = extension_receiver;
        self.add_member(descriptor, scope, property.modifiers.is_static)
    }

    fn bind_constructor(
        &mut self,
        class: ClassifierId,
        visibility: Visibility,
        params: &[ParamDecl],
        scope: &TypeScope,
    ) {
        let params = self.bind_params(params, scope);
        let constructed = self.defs.declared_type(self.types, class);
        let name = self
            .defs
            .classifier(class)
            .map(|info| info.name.clone())
            .unwrap_or_default();
        let mut descriptor =
            CallableDescriptor::new(name, CallableKind::Constructor { params, constructed });
        descriptor.visibility = visibility;
        descriptor.owner = Some(class);
        descriptor.package = scope.package.clone();
        let id = self.defs.add_callable(descriptor);
        if let Some(info) = self.defs.classifier_mut(class) {
            info.constructors.push(id);
        }
    }

    fn bind_local(&mut self, local: &LocalDecl, scope: &TypeScope) -> CallableId {
        let ty = self.resolve_type_ref(&local.ty, scope);
        let mut descriptor = CallableDescriptor::new(
            local.name.clone(),
            CallableKind::LocalVariable {
                ty,
                is_var: local.is_var,
            },
        );
        descriptor.package = scope.package.clone();
        self.defs.add_callable(descriptor)
    }
}
