//! Binder for declaration stubs.
//!
//! Turns a parsed [`DeclFile`](callref_parser::DeclFile) into definitions in
//! a [`DefinitionStore`](callref_solver::DefinitionStore) and the
//! [`SymbolTable`] that name lookup during resolution runs against.

pub mod state;
mod state_binding;
mod state_types;
pub mod symbols;

pub use state::{BindOutput, BinderState, bind_declarations};
pub use symbols::{PackageScope, SymbolTable};
