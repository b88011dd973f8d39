//! Resolution of types written in declaration stubs.

use crate::state::{BinderState, TypeScope};
use callref_common::diagnostic_codes;
use callref_parser::TypeRefAst;
use callref_solver::{ClassifierId, TypeArg, TypeId, TypeParamId};

impl BinderState<'_> {
    pub(crate) fn resolve_type_ref(&mut self, ty: &TypeRefAst, scope: &TypeScope) -> TypeId {
        let resolved = self.resolve_type_ref_non_null(ty, scope);
        if ty.nullable {
            self.types.make_nullable(resolved)
        } else {
            resolved
        }
    }

    fn resolve_type_ref_non_null(&mut self, ty: &TypeRefAst, scope: &TypeScope) -> TypeId {
        if let [single] = ty.qualifier.as_slice() {
            if let Some(param) = self.type_param_in_scope(single, scope) {
                if !ty.args.is_empty() {
                    self.report(
                        ty.span,
                        diagnostic_codes::TYPE_ARGUMENTS_NOT_ALLOWED,
                        &[single],
                    );
                    return TypeId::ERROR;
                }
                return self.types.type_param(param, false);
            }
        }

        let Some(classifier) = self.resolve_classifier_path(&ty.qualifier, scope) else {
            let written = ty.qualifier.join(".");
            self.report(ty.span, diagnostic_codes::UNRESOLVED_REFERENCE, &[&written]);
            return TypeId::ERROR;
        };

        let (param_count, name) = match self.defs.classifier(classifier) {
            Some(info) => (info.type_params.len(), info.name.clone()),
            None => return TypeId::ERROR,
        };
        if param_count != ty.args.len() {
            let expected = param_count.to_string();
            self.report(
                ty.span,
                diagnostic_codes::WRONG_NUMBER_OF_TYPE_ARGUMENTS,
                &[&expected, &name],
            );
            return TypeId::ERROR;
        }

        let args: Vec<TypeArg> = ty
            .args
            .iter()
            .map(|arg| match arg {
                None => TypeArg::Star,
                Some(arg) => TypeArg::invariant(self.resolve_type_ref(arg, scope)),
            })
            .collect();
        self.types.class_type(classifier, args, false)
    }

    /// Function type parameters, then those of the enclosing classifiers
    /// from the inside out, then the resolution scope's.
    fn type_param_in_scope(&self, name: &str, scope: &TypeScope) -> Option<TypeParamId> {
        if let Some((_, id)) = scope.function_params.iter().find(|(n, _)| n == name) {
            return Some(*id);
        }
        let mut current = scope.classifier;
        while let Some(id) = current {
            let info = self.defs.classifier(id)?;
            let found = info
                .type_params
                .iter()
                .copied()
                .find(|param| self.defs.type_param(*param).is_some_and(|p| p.name == name));
            if found.is_some() {
                return found;
            }
            current = info.outer;
        }
        self.symbols.lookup_type_param(name)
    }

    /// The first segment is looked up among nested classifiers of the
    /// enclosing classes, then in the declaring package, then in the default
    /// scope. Failing that the longest package prefix is tried.
    fn resolve_classifier_path(&self, path: &[String], scope: &TypeScope) -> Option<ClassifierId> {
        let (first, rest) = path.split_first()?;

        let mut start = None;
        let mut enclosing = scope.classifier;
        while let Some(id) = enclosing {
            if let Some(info) = self.defs.classifier(id) {
                if info.name == *first {
                    start = Some(id);
                    break;
                }
            }
            if let Some(nested) = self.defs.nested_named(id, first) {
                start = Some(nested);
                break;
            }
            enclosing = self.defs.classifier(id).and_then(|info| info.outer);
        }
        let start = start
            .or_else(|| self.symbols.package_classifier(&scope.package, first))
            .or_else(|| self.symbols.lookup_classifier(first));

        match start {
            Some(mut current) => {
                for segment in rest {
                    current = self.defs.nested_named(current, segment)?;
                }
                Some(current)
            }
            None => {
                let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                self.symbols.classifier_by_path(&*self.defs, &segments)
            }
        }
    }
}
