//! Inputs shared by every resolution step and the call model passed between
//! the double-colon resolver and the overload resolver.

use callref_binder::SymbolTable;
use callref_common::{Diagnostic, LanguageFeatures};
use callref_parser::{NodeArena, NodeIndex};
use callref_solver::{
    CallableId, ClassifierId, DefinitionStore, Substitution, TypeFormatter, TypeId, TypeInterner,
};
use indexmap::IndexMap;

// =============================================================================
// Flow state
// =============================================================================

/// Types of local variables narrowed while resolving an expression
/// (`x!!` narrows `x: T?` to `T`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowState {
    narrowed: IndexMap<CallableId, TypeId>,
}

impl FlowState {
    #[must_use]
    pub fn narrowed_type(&self, local: CallableId) -> Option<TypeId> {
        self.narrowed.get(&local).copied()
    }

    pub fn narrow(&mut self, local: CallableId, ty: TypeId) {
        self.narrowed.insert(local, ty);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.narrowed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CallableId, TypeId)> + '_ {
        self.narrowed.iter().map(|(local, ty)| (*local, *ty))
    }
}

// =============================================================================
// Resolution context
// =============================================================================

/// Everything a resolution step reads. Writes go to the
/// [`BindingTrace`](crate::trace::BindingTrace) passed next to it.
#[derive(Clone)]
pub struct ResolutionContext<'a> {
    pub arena: &'a NodeArena,
    pub file_name: &'a str,
    pub types: &'a TypeInterner,
    pub defs: &'a DefinitionStore,
    pub symbols: &'a SymbolTable,
    pub features: &'a LanguageFeatures,
    /// Classifier whose body the reference appears in, for implicit `this`
    /// and visibility.
    pub scope_owner: Option<ClassifierId>,
    pub flow: FlowState,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        arena: &'a NodeArena,
        file_name: &'a str,
        types: &'a TypeInterner,
        defs: &'a DefinitionStore,
        symbols: &'a SymbolTable,
        features: &'a LanguageFeatures,
    ) -> Self {
        ResolutionContext {
            arena,
            file_name,
            types,
            defs,
            symbols,
            features,
            scope_owner: None,
            flow: FlowState::default(),
        }
    }

    #[must_use]
    pub fn with_scope_owner(mut self, owner: Option<ClassifierId>) -> Self {
        self.scope_owner = owner;
        self
    }

    /// Same context reading nodes from `arena` instead. Used for expressions
    /// synthesized during resolution.
    #[must_use]
    pub fn with_arena<'b>(&self, arena: &'b NodeArena) -> ResolutionContext<'b>
    where
        'a: 'b,
    {
        ResolutionContext {
            arena,
            file_name: self.file_name,
            types: self.types,
            defs: self.defs,
            symbols: self.symbols,
            features: self.features,
            scope_owner: self.scope_owner,
            flow: self.flow.clone(),
        }
    }

    /// Diagnostic for `code` anchored at `node`.
    #[must_use]
    pub fn diagnostic(&self, node: NodeIndex, code: u32, args: &[&str]) -> Diagnostic {
        let span = self.arena.span(node);
        Diagnostic::from_code(self.file_name, span.start, span.len(), code, args)
    }

    #[must_use]
    pub fn format_type(&self, ty: TypeId) -> String {
        TypeFormatter::new(self.types, self.defs).format(ty)
    }

    #[must_use]
    pub fn classifier_name(&self, id: ClassifierId) -> String {
        self.defs
            .classifier(id)
            .map(|info| info.name.clone())
            .unwrap_or_default()
    }
}

// =============================================================================
// Calls
// =============================================================================

/// The receiver a name is resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receiver {
    /// A value: `expr::name` or `expr.name`.
    Expression { node: NodeIndex, ty: TypeId },
    /// The static scope of a class named by `node`.
    ClassQualifier {
        node: NodeIndex,
        classifier: ClassifierId,
    },
    /// A receiver of type `ty` that only exists at the use site of an
    /// unbound reference.
    Transient(TypeId),
}

impl Receiver {
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Receiver::Expression { .. } => "expression",
            Receiver::ClassQualifier { .. } => "class qualifier",
            Receiver::Transient(_) => "transient",
        }
    }
}

/// A call of `name` at `callee`, as handed to overload resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub callee: NodeIndex,
    pub name: String,
    pub receiver: Option<Receiver>,
}

impl Call {
    #[must_use]
    pub fn with_receiver(&self, receiver: Option<Receiver>) -> Call {
        Call {
            callee: self.callee,
            name: self.name.clone(),
            receiver,
        }
    }
}

/// What a resolved name denotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallTarget {
    Callable(CallableId),
    /// The value of a classifier name: an object, or the companion of a
    /// class. Holds the named classifier, not the companion.
    ObjectValue(ClassifierId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCall {
    pub target: CallTarget,
    pub receiver: Option<Receiver>,
    /// Type arguments of the receiver mapped onto the declaring
    /// classifier's type parameters.
    pub substitution: Substitution,
}

impl ResolvedCall {
    #[must_use]
    pub fn new(target: CallTarget, receiver: Option<Receiver>, substitution: Substitution) -> Self {
        ResolvedCall {
            target,
            receiver,
            substitution,
        }
    }

    #[must_use]
    pub const fn callable(&self) -> Option<CallableId> {
        match self.target {
            CallTarget::Callable(id) => Some(id),
            CallTarget::ObjectValue(_) => None,
        }
    }
}

/// Outcome of overload resolution for one receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverloadResolutionResults {
    NoCandidates,
    Success(ResolvedCall),
    Ambiguous(Vec<ResolvedCall>),
    CandidatesWithErrors(Vec<ResolvedCall>),
}

impl OverloadResolutionResults {
    #[must_use]
    pub const fn is_nothing(&self) -> bool {
        matches!(self, OverloadResolutionResults::NoCandidates)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, OverloadResolutionResults::Success(_))
    }

    /// Exactly one candidate survived, with or without errors.
    #[must_use]
    pub fn is_single_result(&self) -> bool {
        match self {
            OverloadResolutionResults::Success(_) => true,
            OverloadResolutionResults::CandidatesWithErrors(calls) => calls.len() == 1,
            OverloadResolutionResults::NoCandidates | OverloadResolutionResults::Ambiguous(_) => {
                false
            }
        }
    }

    /// The call to build a reference from, if there is a single one.
    #[must_use]
    pub fn resulting_call(&self) -> Option<&ResolvedCall> {
        match self {
            OverloadResolutionResults::Success(call) => Some(call),
            OverloadResolutionResults::CandidatesWithErrors(calls) if calls.len() == 1 => {
                calls.first()
            }
            _ => None,
        }
    }
}

/// How the overload resolver treats arguments of a callable reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallableReferenceMode {
    /// Arguments are inferred later from the expected type; only the shape
    /// of a single candidate matters, ambiguity is not reported.
    ShapeOnly,
    #[default]
    Eager,
}
