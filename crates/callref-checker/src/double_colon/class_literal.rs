//! `lhs::class`.

use super::{ClassLiteralResolution, DoubleColonInput, DoubleColonResolver, ReferenceLhs, TypeLhs};
use crate::collaborators::ExpressionTypeChecker;
use crate::context::ResolutionContext;
use crate::error::ResolveResult;
use crate::trace::BindingTrace;
use callref_common::{LanguageFeature, diagnostic_codes};
use callref_parser::NodeIndex;
use callref_solver::{ReflectionClass, TypeArg, TypeData, TypeId, is_subtype_of_any};
use tracing::debug;

impl DoubleColonResolver<'_> {
    pub(crate) fn class_literal(
        &self,
        input: DoubleColonInput<'_>,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        expressions: &dyn ExpressionTypeChecker,
    ) -> ResolveResult<ClassLiteralResolution> {
        let Some(receiver) = input.receiver else {
            trace.report(cx.diagnostic(
                input.expression,
                diagnostic_codes::UNSUPPORTED,
                &["class literals with empty left-hand side"],
            ));
            trace.record_expression_type(input.expression, TypeId::ERROR);
            return Ok(ClassLiteralResolution {
                lhs: None,
                ty: TypeId::ERROR,
            });
        };

        let lhs = self.resolve_double_colon_lhs(input, cx, trace, expressions)?;
        let ty = match &lhs {
            Some(result) if !result.ty().is_error() => {
                self.class_literal_type(input, receiver, result, cx, trace)
            }
            _ => TypeId::ERROR,
        };
        trace.record_expression_type(input.expression, ty);
        Ok(ClassLiteralResolution { lhs, ty })
    }

    fn class_literal_type(
        &self,
        input: DoubleColonInput<'_>,
        receiver: NodeIndex,
        lhs: &ReferenceLhs,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> TypeId {
        let inherent = lhs.ty();
        let argument = match lhs {
            ReferenceLhs::Value(value) if !value.is_singleton_qualifier => {
                if !is_subtype_of_any(cx.types, cx.defs, inherent) {
                    let rendered = cx.format_type(inherent);
                    trace.report(cx.diagnostic(
                        receiver,
                        diagnostic_codes::EXPRESSION_OF_NULLABLE_TYPE_IN_CLASS_LITERAL_LHS,
                        &[&rendered],
                    ));
                }
                if !cx.features.supports(LanguageFeature::BoundCallableReferences) {
                    report_unsupported_feature(receiver, cx, trace);
                }
                TypeArg::out(inherent)
            }
            ReferenceLhs::Value(_) => TypeArg::invariant(inherent),
            ReferenceLhs::Type(type_lhs) => {
                check_type_lhs(input, type_lhs, cx, trace);
                TypeArg::invariant(inherent)
            }
        };

        let ty = if cx.defs.reflection_class(ReflectionClass::KClass).is_some() {
            cx.types.kclass(argument)
        } else {
            let name = ReflectionClass::KClass.qualified_name();
            trace.report(cx.diagnostic(
                input.expression,
                diagnostic_codes::MISSING_DEPENDENCY_CLASS,
                &[&name],
            ));
            TypeId::ERROR
        };
        debug!(ty = %cx.format_type(ty), "class literal typed");

        for checker in &self.class_literal_checkers {
            checker.check(input.expression, ty, cx, trace);
        }
        ty
    }
}

pub(super) fn report_unsupported_feature(
    node: NodeIndex,
    cx: &ResolutionContext<'_>,
    trace: &mut BindingTrace<'_>,
) {
    trace.report(cx.diagnostic(
        node,
        diagnostic_codes::UNSUPPORTED_FEATURE,
        &[LanguageFeature::BoundCallableReferences.name()],
    ));
}

/// At most one of these is reported, in this order.
fn check_type_lhs(
    input: DoubleColonInput<'_>,
    lhs: &TypeLhs,
    cx: &ResolutionContext<'_>,
    trace: &mut BindingTrace<'_>,
) {
    let ty = lhs.ty;
    if lhs.is_bare {
        let is_array = cx
            .types
            .classifier_of(ty)
            .is_some_and(|classifier| cx.defs.is_non_primitive_array(classifier));
        if is_array {
            trace.report(cx.diagnostic(
                input.expression,
                diagnostic_codes::ARRAY_CLASS_LITERAL_REQUIRES_ARGUMENT,
                &[],
            ));
        }
        return;
    }

    let type_param = match cx.types.lookup(ty) {
        Some(TypeData::TypeParameter { param, nullable }) => {
            cx.defs.type_param(param).map(|info| (info, nullable))
        }
        _ => None,
    };

    let non_reified = type_param.filter(|(param, nullable)| !param.reified && !nullable);
    if let Some((param, _)) = non_reified {
        trace.report(cx.diagnostic(
            input.expression,
            diagnostic_codes::TYPE_PARAMETER_AS_REIFIED,
            &[&param.name],
        ));
    } else if cx.types.is_nullable(ty) || input.has_question_marks {
        // `T?::class` passes when the bound of `T` already admits null.
        let bound_is_nullable = type_param
            .is_some_and(|(param, _)| !is_subtype_of_any(cx.types, cx.defs, param.bound()));
        if !bound_is_nullable {
            trace.report(cx.diagnostic(
                input.expression,
                diagnostic_codes::NULLABLE_TYPE_IN_CLASS_LITERAL_LHS,
                &[],
            ));
        }
    } else if !is_allowed_in_class_literal(ty, cx) {
        trace.report(cx.diagnostic(
            input.expression,
            diagnostic_codes::CLASS_LITERAL_LHS_NOT_A_CLASS,
            &[],
        ));
    }
}

/// A plain class, an array of allowed element types, or a reified type
/// parameter.
fn is_allowed_in_class_literal(ty: TypeId, cx: &ResolutionContext<'_>) -> bool {
    match cx.types.lookup(ty) {
        Some(TypeData::Class {
            classifier, args, ..
        }) => {
            if cx.defs.is_non_primitive_array(classifier) {
                args.iter().all(|arg| match arg {
                    TypeArg::Star => false,
                    TypeArg::Projection { ty, .. } => is_allowed_in_class_literal(*ty, cx),
                })
            } else {
                args.is_empty()
            }
        }
        Some(TypeData::TypeParameter { param, .. }) => {
            cx.defs.type_param(param).is_some_and(|info| info.reified)
        }
        Some(TypeData::Error | TypeData::Reflection(_)) | None => false,
    }
}
