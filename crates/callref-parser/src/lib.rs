//! Syntax for the callref reference resolver.
//!
//! - `parser::node` / `parser::node_arena` - the node arena holding
//!   reference expressions (`Foo<Int>?::class`, `a.b!!::c`) and type
//!   references
//! - `parser::scanner` - tokenizer shared by both parsers
//! - `parser::state_references` - reference-expression parser
//! - `parser::declarations` - declaration stub AST and parser

pub mod parser;

pub use parser::declarations::{
    ClassDecl, ClassKind, ClassMember, ConstructorDecl, DeclFile, FunctionDecl, Item, LocalDecl,
    Modifiers, PackageBlock, ParamDecl, PropertyDecl, TypeParamDecl, TypeRefAst, Visibility,
    parse_declarations,
};
pub use parser::node::{
    CallData, CallableReferenceData, ClassLiteralData, LiteralKind, Node, NodeIndex, NodeKind,
    QualifiedData, TypeReferenceData,
};
pub use parser::node_arena::NodeArena;
pub use parser::state_references::{ParsedReference, parse_reference, parse_reference_into};
pub use parser::{ParseError, ParseResult};
