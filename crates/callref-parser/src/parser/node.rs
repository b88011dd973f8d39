//! Node kinds stored in the [`NodeArena`](super::node_arena::NodeArena).
//!
//! The arena holds the left-hand side of `::` expressions, the `::`
//! expressions themselves, and the type references that appear as explicit
//! type arguments. Children are referred to by [`NodeIndex`].

use callref_common::Span;
use smallvec::SmallVec;
use std::fmt;

/// Index of a node in a [`NodeArena`](super::node_arena::NodeArena).
///
/// Indices are unique across an arena and every synthetic arena created
/// after it with [`NodeArena::synthetic_after`](super::node_arena::NodeArena::synthetic_after),
/// so bindings keyed by index never collide between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Int(i64),
    String(String),
    Boolean(bool),
    Null,
}

/// `callee<T>(args) { lambda }`.
///
/// `value_args` is `None` when there is no parenthesized argument list at
/// all, which is different from an empty one: `A<B>` is a type application
/// shape while `A<B>()` is a call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallData {
    pub callee: NodeIndex,
    pub type_args: SmallVec<[NodeIndex; 2]>,
    pub value_args: Option<Vec<NodeIndex>>,
    pub lambda_args: SmallVec<[NodeIndex; 1]>,
}

impl CallData {
    /// No parenthesized argument list and no trailing lambda.
    #[must_use]
    pub fn is_without_value_arguments(&self) -> bool {
        self.value_args.is_none() && self.lambda_args.is_empty()
    }

    #[must_use]
    pub fn value_argument_count(&self) -> usize {
        self.value_args.as_ref().map_or(0, Vec::len) + self.lambda_args.len()
    }
}

/// `receiver.selector` or `receiver?.selector`.
///
/// The selector is absent only in recovered input (`a.`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualifiedData {
    pub receiver: NodeIndex,
    pub selector: Option<NodeIndex>,
}

/// A type written in a type-argument position: `a.b.C<T, *>?`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeReferenceData {
    pub qualifier: SmallVec<[String; 2]>,
    pub type_args: SmallVec<[NodeIndex; 2]>,
    pub nullable: bool,
}

impl TypeReferenceData {
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.qualifier.last().map_or("", String::as_str)
    }
}

/// `lhs::class`.
///
/// `type_args` are type arguments attached to the literal as a whole rather
/// than to the last segment of its left-hand side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassLiteralData {
    pub receiver: Option<NodeIndex>,
    pub has_question_marks: bool,
    pub type_args: SmallVec<[NodeIndex; 1]>,
}

/// `lhs::name`. The reference is always a [`NodeKind::Name`] node; its text
/// is empty for the malformed `lhs::`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallableReferenceData {
    pub receiver: Option<NodeIndex>,
    pub reference: NodeIndex,
    pub has_question_marks: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Name(String),
    Call(CallData),
    DotQualified(QualifiedData),
    SafeQualified(QualifiedData),
    /// `expr!!`
    NotNull(NodeIndex),
    Parenthesized(NodeIndex),
    Literal(LiteralKind),
    This,
    /// `{ body }` used as a trailing lambda argument.
    Lambda(Option<NodeIndex>),
    TypeReference(TypeReferenceData),
    StarProjection,
    ClassLiteral(ClassLiteralData),
    CallableReference(CallableReferenceData),
}

impl NodeKind {
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            NodeKind::Name(_) => "name",
            NodeKind::Call(_) => "call",
            NodeKind::DotQualified(_) => "qualified expression",
            NodeKind::SafeQualified(_) => "safe call",
            NodeKind::NotNull(_) => "not-null assertion",
            NodeKind::Parenthesized(_) => "parenthesized expression",
            NodeKind::Literal(_) => "literal",
            NodeKind::This => "this",
            NodeKind::Lambda(_) => "lambda",
            NodeKind::TypeReference(_) => "type reference",
            NodeKind::StarProjection => "star projection",
            NodeKind::ClassLiteral(_) => "class literal",
            NodeKind::CallableReference(_) => "callable reference",
        }
    }
}
