//! Type representation and queries for the callref reference resolver.
//!
//! - `types` / `intern`: structural types behind interned [`TypeId`]s
//! - `def`: the [`DefinitionStore`] of classifiers, type parameters and
//!   callable descriptors, including builtins
//! - `relations`: subtyping, visibility and member lookup over the store
//! - `format`: source-like rendering of types for messages and output

pub mod def;
pub mod format;
pub mod intern;
pub mod relations;
pub mod types;

pub use def::{
    CallableDescriptor, CallableId, CallableKind, ClassifierFlags, ClassifierId, ClassifierInfo,
    DefinitionStore, ReflectionClass, TypeParamId, TypeParamInfo, ValueParam,
};
pub use format::TypeFormatter;
pub use intern::TypeInterner;
pub use relations::{
    MemberCandidate, is_subtype, is_subtype_of_any, is_visible, members_named, supertype_closure,
};
pub use types::{ReflectionParam, ReflectionType, Substitution, TypeArg, TypeData, TypeId, Variance};

// Declaration-level enums are shared with the stub parser.
pub use callref_parser::{ClassKind, Visibility};
