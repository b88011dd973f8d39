//! Centralized limits and thresholds for the reference resolver.
//!
//! These guard the recursive parts of the reference implementation of the
//! collaborators (expression checking of nested chains and supertype walks)
//! against pathological inputs.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth the expression checker follows through receivers,
/// call arguments and parentheses before giving up with an error type.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 256;

/// Maximum depth of a supertype walk when collecting members.
///
/// Declaration stubs can contain supertype cycles (`class A : B`,
/// `class B : A`); the walk also keeps a visited set, this bound only caps
/// very deep but acyclic hierarchies.
pub const MAX_SUPERTYPE_DEPTH: u32 = 64;

/// Maximum nesting depth for type arguments in the parser.
pub const MAX_TYPE_ARGUMENT_DEPTH: u32 = 64;
