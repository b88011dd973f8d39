//! Interfaces of the services double-colon resolution delegates to.
//!
//! The crate ships scope-based implementations in [`crate::symbols`]; a
//! host compiler plugs in its own.

use crate::context::{
    Call, CallableReferenceMode, FlowState, OverloadResolutionResults, ResolutionContext,
};
use crate::error::ResolveResult;
use crate::trace::BindingTrace;
use callref_parser::NodeIndex;
use callref_solver::{ClassifierId, TypeArg, TypeId, TypeParamId};

/// Result of type-checking an expression.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpressionTypeInfo {
    /// `None` when the expression has no type (unresolved, or not a value).
    pub ty: Option<TypeId>,
    pub flow: FlowState,
}

impl ExpressionTypeInfo {
    #[must_use]
    pub fn new(ty: Option<TypeId>, flow: FlowState) -> Self {
        ExpressionTypeInfo { ty, flow }
    }
}

pub trait ExpressionTypeChecker {
    /// Type of the expression at `node`. Diagnostics, resolved calls and
    /// expression types go to `trace`.
    fn resolve_expression(
        &self,
        node: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<ExpressionTypeInfo>;
}

/// A classifier a type-position name can denote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassifierRef {
    Class(ClassifierId),
    TypeParameter(TypeParamId),
}

/// The classifier named by a `::` left-hand side, with the type argument
/// nodes written on its last segment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QualifierResolution {
    pub classifier: Option<ClassifierRef>,
    pub projections: Vec<NodeIndex>,
}

/// A type that may still be missing its type arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PossiblyBareType {
    /// A generic class written without arguments.
    Bare(ClassifierRef),
    Actual(TypeId),
}

pub trait QualifiedTypeResolver {
    /// Resolve `node` as a dotted classifier name. Records the class
    /// qualifier of `node` on success.
    fn resolve_double_colon_lhs(
        &self,
        node: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<QualifierResolution>;

    /// Apply `projections` to `classifier`. With no projections a generic
    /// class comes back bare.
    fn resolve_type_for_classifier(
        &self,
        node: NodeIndex,
        classifier: ClassifierRef,
        projections: &[NodeIndex],
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<PossiblyBareType>;

    /// Resolve type-argument nodes (type references or `*`).
    fn resolve_type_arguments(
        &self,
        args: &[NodeIndex],
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    ) -> ResolveResult<Vec<TypeArg>>;
}

pub trait CallResolver {
    /// Candidates for `call.name` on `call.receiver` (or in scope when there
    /// is none). Records the resolved call on `call.callee` when a single
    /// candidate is chosen.
    fn resolve_call_for_member(
        &self,
        call: &Call,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        mode: CallableReferenceMode,
    ) -> ResolveResult<OverloadResolutionResults>;
}

/// Extra validation of a resolved class literal. Runs after the built-in
/// checks and cannot change the literal's type.
pub trait ClassLiteralChecker {
    fn check(
        &self,
        node: NodeIndex,
        ty: TypeId,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
    );
}
