//! Resolution of `::` expressions: class literals (`lhs::class`) and
//! callable references (`lhs::name`).
//!
//! Both start by deciding what the left-hand side denotes (see `lhs`).
//! Class literals are then validated and typed as `KClass` (see
//! `class_literal`); callable references go on to receiver-ordered overload
//! resolution (see `rhs`) and reflective type construction (see
//! `reflection`).

mod class_literal;
mod lhs;
mod reflection;
mod rhs;
pub(crate) mod syntax_shape;
mod trial;

use crate::collaborators::{
    CallResolver, ClassLiteralChecker, ExpressionTypeChecker, QualifiedTypeResolver,
};
use crate::context::{CallableReferenceMode, FlowState, ResolutionContext, ResolvedCall};
use crate::error::{ResolveError, ResolveResult};
use crate::trace::BindingTrace;
use callref_parser::{NodeIndex, NodeKind};
use callref_solver::TypeId;

/// The left-hand side resolved as a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueLhs {
    pub ty: TypeId,
    /// The left-hand side names a singleton object (`Obj`, `Foo.Companion`)
    /// rather than computing a value.
    pub is_singleton_qualifier: bool,
    pub flow: FlowState,
}

/// The left-hand side resolved as a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeLhs {
    pub ty: TypeId,
    /// A generic class written without type arguments; `ty` carries star
    /// projections.
    pub is_bare: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceLhs {
    Value(ValueLhs),
    Type(TypeLhs),
}

impl ReferenceLhs {
    #[must_use]
    pub const fn ty(&self) -> TypeId {
        match self {
            ReferenceLhs::Value(value) => value.ty,
            ReferenceLhs::Type(ty) => ty.ty,
        }
    }

    #[must_use]
    pub const fn is_type(&self) -> bool {
        matches!(self, ReferenceLhs::Type(_))
    }

    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            ReferenceLhs::Value(ValueLhs {
                is_singleton_qualifier: true,
                ..
            }) => "object",
            ReferenceLhs::Value(_) => "value",
            ReferenceLhs::Type(TypeLhs { is_bare: true, .. }) => "bare type",
            ReferenceLhs::Type(_) => "type",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassLiteralResolution {
    pub lhs: Option<ReferenceLhs>,
    /// `KClass<T>`, `KClass<out T>` for bound literals, or the error type.
    pub ty: TypeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallableReferenceResolution {
    pub lhs: Option<ReferenceLhs>,
    pub resolved: Option<ResolvedCall>,
    /// `None` when no reference type could be built.
    pub ty: Option<TypeId>,
    /// False when a legality check rejected the reference; later phases
    /// must not use it.
    pub is_valid: bool,
}

impl CallableReferenceResolution {
    fn failed(lhs: Option<ReferenceLhs>, ty: Option<TypeId>) -> Self {
        CallableReferenceResolution {
            lhs,
            resolved: None,
            ty,
            is_valid: false,
        }
    }
}

/// The parts of a `::` expression the left-hand side resolution reads.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DoubleColonInput<'n> {
    pub(crate) expression: NodeIndex,
    pub(crate) receiver: Option<NodeIndex>,
    pub(crate) has_question_marks: bool,
    /// Type arguments written after `::class`.
    pub(crate) type_args: &'n [NodeIndex],
}

/// Resolves `::` expressions against the injected collaborators.
///
/// The expression type-checker is passed per call: it usually depends on
/// this resolver itself for nested references.
pub struct DoubleColonResolver<'r> {
    qualifiers: &'r dyn QualifiedTypeResolver,
    calls: &'r dyn CallResolver,
    class_literal_checkers: Vec<&'r dyn ClassLiteralChecker>,
}

impl<'r> DoubleColonResolver<'r> {
    pub fn new(qualifiers: &'r dyn QualifiedTypeResolver, calls: &'r dyn CallResolver) -> Self {
        DoubleColonResolver {
            qualifiers,
            calls,
            class_literal_checkers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_class_literal_checker(mut self, checker: &'r dyn ClassLiteralChecker) -> Self {
        self.class_literal_checkers.push(checker);
        self
    }

    #[tracing::instrument(level = "debug", skip_all, fields(node = %node))]
    pub fn resolve_class_literal(
        &self,
        node: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        expressions: &dyn ExpressionTypeChecker,
    ) -> ResolveResult<ClassLiteralResolution> {
        let Some(NodeKind::ClassLiteral(data)) = cx.arena.kind(node) else {
            return Err(ResolveError::UnexpectedNode {
                node,
                expected: "class literal",
            });
        };
        let input = DoubleColonInput {
            expression: node,
            receiver: data.receiver,
            has_question_marks: data.has_question_marks,
            type_args: &data.type_args,
        };
        self.class_literal(input, cx, trace, expressions)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(node = %node, mode = ?mode))]
    pub fn resolve_callable_reference(
        &self,
        node: NodeIndex,
        cx: &ResolutionContext<'_>,
        trace: &mut BindingTrace<'_>,
        expressions: &dyn ExpressionTypeChecker,
        mode: CallableReferenceMode,
    ) -> ResolveResult<CallableReferenceResolution> {
        let Some(NodeKind::CallableReference(data)) = cx.arena.kind(node) else {
            return Err(ResolveError::UnexpectedNode {
                node,
                expected: "callable reference",
            });
        };
        let input = DoubleColonInput {
            expression: node,
            receiver: data.receiver,
            has_question_marks: data.has_question_marks,
            type_args: &[],
        };
        self.callable_reference(input, data.reference, cx, trace, expressions, mode)
    }
}
