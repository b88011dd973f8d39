//! Type-position resolution of `::` left-hand sides.

use super::{NamePrefix, lookup_type_param_in_scope, resolve_type_arguments};
use crate::collaborators::{
    ClassifierRef, PossiblyBareType, QualifiedTypeResolver, QualifierResolution,
};
use crate::context::ResolutionContext;
use crate::double_colon::syntax_shape::type_chain_segments;
use crate::error::ResolveResult;
use crate::trace::BindingTrace;
use callref_common::diagnostic_codes;
use callref_parser::NodeIndex;
use callref_solver::{TypeArg, TypeId};
use tracing::trace;

/// Resolves dotted classifier names (`a.b.Outer.Inner<T>`) against the
/// bound scope.
#[derive(Debug, Default)]
pub struct ScopeQualifierResolver;

impl ScopeQualifierResolver {
    #[must_use]
    pub fn new() -> Self {
        ScopeQualifierResolver
    }
}

impl QualifiedTypeResolver for ScopeQualifierResolver {
    fn resolve_double_colon_lhs(
        &self,
        node: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<QualifierResolution> {
        let Some(segments) = type_chain_segments(cx.arena, node) else {
            return Ok(QualifierResolution::default());
        };
        let Some((last, init)) = segments.split_last() else {
            return Ok(QualifierResolution::default());
        };
        let projections = last.type_args.to_vec();

        if init.is_empty() {
            if let Some(param) = lookup_type_param_in_scope(cx, &last.name) {
                return Ok(QualifierResolution {
                    classifier: Some(ClassifierRef::TypeParameter(param)),
                    projections,
                });
            }
        }

        for segment in init.iter().filter(|segment| !segment.type_args.is_empty()) {
            trace.report(cx.diagnostic(
                segment.node,
                diagnostic_codes::TYPE_ARGUMENTS_NOT_ALLOWED,
                &[&segment.name],
            ));
        }

        let mut prefix: Option<NamePrefix> = None;
        for segment in &segments {
            let next = match prefix.take() {
                None => NamePrefix::first(cx, &segment.name),
                Some(current) => current.select(cx, &segment.name),
            };
            let Some(next) = next else {
                trace.report(cx.diagnostic(
                    segment.node,
                    diagnostic_codes::UNRESOLVED_REFERENCE,
                    &[&segment.name],
                ));
                return Ok(QualifierResolution {
                    classifier: None,
                    projections,
                });
            };
            prefix = Some(next);
        }

        match prefix {
            Some(NamePrefix::Classifier(classifier)) => {
                trace!(node = %node, classifier = %cx.classifier_name(classifier), "qualifier resolved");
                trace.record_qualifier(node, classifier);
                Ok(QualifierResolution {
                    classifier: Some(ClassifierRef::Class(classifier)),
                    projections,
                })
            }
            // A bare package is not a type.
            Some(NamePrefix::Package(_)) | None => {
                trace.report(cx.diagnostic(
                    last.node,
                    diagnostic_codes::UNRESOLVED_REFERENCE,
                    &[&last.name],
                ));
                Ok(QualifierResolution {
                    classifier: None,
                    projections,
                })
            }
        }
    }

    fn resolve_type_for_classifier(
        &self,
        node: NodeIndex,
        classifier: ClassifierRef,
        projections: &[NodeIndex],
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<PossiblyBareType> {
        match classifier {
            ClassifierRef::TypeParameter(param) => {
                if !projections.is_empty() {
                    let name = cx
                        .defs
                        .type_param(param)
                        .map(|info| info.name.clone())
                        .unwrap_or_default();
                    trace.report(cx.diagnostic(
                        node,
                        diagnostic_codes::TYPE_ARGUMENTS_NOT_ALLOWED,
                        &[&name],
                    ));
                    return Ok(PossiblyBareType::Actual(TypeId::ERROR));
                }
                Ok(PossiblyBareType::Actual(cx.types.type_param(param, false)))
            }
            ClassifierRef::Class(class) => {
                let expected = cx
                    .defs
                    .classifier(class)
                    .map_or(0, |info| info.type_params.len());
                if projections.is_empty() && expected > 0 {
                    return Ok(PossiblyBareType::Bare(classifier));
                }
                if projections.len() != expected {
                    let count = expected.to_string();
                    let name = cx.classifier_name(class);
                    trace.report(cx.diagnostic(
                        node,
                        diagnostic_codes::WRONG_NUMBER_OF_TYPE_ARGUMENTS,
                        &[&count, &name],
                    ));
                    return Ok(PossiblyBareType::Actual(TypeId::ERROR));
                }
                let args: Vec<TypeArg> = resolve_type_arguments(projections, cx, trace)?;
                // Already reported where the argument failed.
                if args.iter().any(|arg| arg.ty().is_some_and(TypeId::is_error)) {
                    return Ok(PossiblyBareType::Actual(TypeId::ERROR));
                }
                Ok(PossiblyBareType::Actual(cx.types.class_type(class, args, false)))
            }
        }
    }

    fn resolve_type_arguments(
        &self,
        args: &[NodeIndex],
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<Vec<TypeArg>> {
        resolve_type_arguments(args, cx, trace)
    }
}

