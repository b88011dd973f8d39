//! Reflective types of callable references.

use super::{DoubleColonResolver, ReferenceLhs};
use crate::context::{ResolutionContext, ResolvedCall};
use crate::trace::{BindingTrace, SyntheticReference};
use callref_common::diagnostic_codes;
use callref_parser::NodeIndex;
use callref_solver::{CallableKind, ReflectionClass, ReflectionParam, TypeId, is_visible};
use tracing::debug;

impl DoubleColonResolver<'_> {
    /// `KFunction`/`KProperty` type of a reference to `call`'s target, and the
    /// synthetic placeholder later phases read it from.
    ///
    /// An unbound reference (type on the left) takes the receiver as its
    /// first parameter; a bound one does not. `None` for targets a reference
    /// cannot be taken to.
    pub(crate) fn create_reference_type(
        &self,
        expression: NodeIndex,
        call: &ResolvedCall,
        lhs: Option<&ReferenceLhs>,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> Option<TypeId> {
        let id = call.callable()?;
        let descriptor = cx.defs.callable(id)?;
        let receiver = match lhs {
            Some(ReferenceLhs::Type(type_lhs)) if descriptor.has_receiver() => Some(type_lhs.ty),
            _ => None,
        };
        let subst = &call.substitution;

        let (ty, reference) = match &descriptor.kind {
            CallableKind::Function { .. } | CallableKind::Constructor { .. } => {
                let params = descriptor
                    .params()
                    .iter()
                    .map(|param| ReflectionParam {
                        name: param.name.clone(),
                        ty: cx.types.substitute(param.ty, subst),
                    })
                    .collect();
                let return_type = cx.types.substitute(descriptor.result_type(), subst);
                let ty = if require_reflection_class(ReflectionClass::KFunction, expression, cx, trace)
                {
                    cx.types
                        .kfunction(receiver, params, return_type, descriptor.is_suspend())
                } else {
                    TypeId::ERROR
                };
                (ty, SyntheticReference::AnonymousFunction { descriptor: id, ty })
            }
            CallableKind::Property {
                ty,
                is_var,
                setter_visibility,
            } => {
                let mutable = *is_var
                    && is_visible(
                        cx.types,
                        cx.defs,
                        *setter_visibility,
                        descriptor.owner,
                        cx.scope_owner,
                    );
                let value = cx.types.substitute(*ty, subst);
                let class = if mutable {
                    ReflectionClass::KMutableProperty
                } else {
                    ReflectionClass::KProperty
                };
                let ty = if require_reflection_class(class, expression, cx, trace) {
                    cx.types.kproperty(receiver, value, mutable)
                } else {
                    TypeId::ERROR
                };
                (ty, SyntheticReference::PropertyPlaceholder { descriptor: id, ty })
            }
            CallableKind::LocalVariable { .. } => return None,
        };

        debug!(name = %descriptor.name, ty = %cx.format_type(ty), "reference type built");
        trace.record_synthetic_reference(expression, reference);
        Some(ty)
    }
}

fn require_reflection_class(
    class: ReflectionClass,
    expression: NodeIndex,
    cx: &ResolutionContext<'_>,
    trace: &mut BindingTrace<'_>,
) -> bool {
    if cx.defs.reflection_class(class).is_some() {
        return true;
    }
    let name = class.qualified_name();
    trace.report(cx.diagnostic(
        expression,
        diagnostic_codes::MISSING_DEPENDENCY_CLASS,
        &[&name],
    ));
    false
}
