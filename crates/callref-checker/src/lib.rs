//! Resolution of double-colon expressions (`Foo::bar`, `x::bar`,
//! `Foo::class`) against bound declaration stubs.
//!
//! - `double_colon`: left-hand side interpretation, callable reference and
//!   class literal resolution, reflective types
//! - `trace`: the forkable [`BindingTrace`] that trial resolutions run in
//! - `collaborators`: interfaces for expression typing, qualifier and call
//!   resolution
//! - `symbols`: scope-based implementations of those interfaces
//! - `session`: ordered, cancellable resolution of many expressions

pub mod collaborators;
pub mod context;
pub mod double_colon;
pub mod error;
pub mod session;
pub mod symbols;
pub mod trace;

pub use collaborators::{
    CallResolver, ClassLiteralChecker, ClassifierRef, ExpressionTypeChecker, ExpressionTypeInfo,
    PossiblyBareType, QualifiedTypeResolver, QualifierResolution,
};
pub use context::{
    Call, CallTarget, CallableReferenceMode, FlowState, OverloadResolutionResults, Receiver,
    ResolutionContext, ResolvedCall,
};
pub use double_colon::{
    CallableReferenceResolution, ClassLiteralResolution, DoubleColonResolver, ReferenceLhs,
    TypeLhs, ValueLhs,
};
pub use error::{ResolveError, ResolveResult};
pub use session::{
    CancellationToken, ReferenceResolution, ResolutionSession, SessionOutcome, SessionReference,
    SessionResult,
};
pub use symbols::{ScopeCallResolver, ScopeExpressionChecker, ScopeQualifierResolver};
pub use trace::{BindingTable, BindingTrace, SyntheticReference, TraceLog, TrialResult};
