//! Diagnostic message catalog.
//!
//! Codes 1xxx come from the collaborators (expression checking, type and
//! overload resolution); codes 2xxx come from double-colon resolution itself.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const UNRESOLVED_REFERENCE: u32 = 1001;
    pub const NO_COMPANION_OBJECT: u32 = 1002;
    pub const FUNCTION_CALL_EXPECTED: u32 = 1003;
    pub const EXPRESSION_EXPECTED_PACKAGE_FOUND: u32 = 1004;
    pub const NO_VALUE_FOR_PARAMETER: u32 = 1005;
    pub const TOO_MANY_ARGUMENTS: u32 = 1006;
    pub const UNSAFE_CALL: u32 = 1007;
    pub const NO_THIS: u32 = 1008;
    pub const WRONG_NUMBER_OF_TYPE_ARGUMENTS: u32 = 1009;
    pub const INVISIBLE_MEMBER: u32 = 1010;
    pub const CALLABLE_REFERENCE_RESOLUTION_AMBIGUITY: u32 = 1011;
    pub const TYPE_ARGUMENTS_NOT_ALLOWED: u32 = 1012;

    pub const EXPRESSION_OF_NULLABLE_TYPE_IN_CLASS_LITERAL_LHS: u32 = 2001;
    pub const NULLABLE_TYPE_IN_CLASS_LITERAL_LHS: u32 = 2002;
    pub const ARRAY_CLASS_LITERAL_REQUIRES_ARGUMENT: u32 = 2003;
    pub const TYPE_PARAMETER_AS_REIFIED: u32 = 2004;
    pub const CLASS_LITERAL_LHS_NOT_A_CLASS: u32 = 2005;
    pub const CALLABLE_REFERENCE_LHS_NOT_A_CLASS: u32 = 2006;
    pub const RESERVED_SYNTAX_IN_CALLABLE_REFERENCE_LHS: u32 = 2007;
    pub const CALLABLE_REFERENCE_TO_MEMBER_OR_EXTENSION_WITH_EMPTY_LHS: u32 = 2008;
    pub const CALLABLE_REFERENCE_TO_ANNOTATION_CONSTRUCTOR: u32 = 2009;
    pub const EXTENSION_IN_CLASS_REFERENCE_NOT_ALLOWED: u32 = 2010;
    pub const UNSUPPORTED: u32 = 2011;
    pub const UNSUPPORTED_FEATURE: u32 = 2012;
    pub const MISSING_DEPENDENCY_CLASS: u32 = 2013;
}

use diagnostic_codes as c;

const fn error(code: u32, message: &'static str) -> DiagnosticMessage {
    DiagnosticMessage {
        code,
        category: DiagnosticCategory::Error,
        message,
    }
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    error(c::UNRESOLVED_REFERENCE, "Unresolved reference: {0}."),
    error(
        c::NO_COMPANION_OBJECT,
        "Classifier '{0}' does not have a companion object, and thus must be initialized here.",
    ),
    error(c::FUNCTION_CALL_EXPECTED, "Function invocation '{0}()' expected."),
    error(
        c::EXPRESSION_EXPECTED_PACKAGE_FOUND,
        "Expression expected, but a package name found.",
    ),
    error(c::NO_VALUE_FOR_PARAMETER, "No value passed for parameter '{0}'."),
    error(c::TOO_MANY_ARGUMENTS, "Too many arguments for '{0}'."),
    error(
        c::UNSAFE_CALL,
        "Only safe (?.) or non-null asserted (!!.) calls are allowed on a nullable receiver of type {0}.",
    ),
    error(c::NO_THIS, "'this' is not defined in this context."),
    error(
        c::WRONG_NUMBER_OF_TYPE_ARGUMENTS,
        "{0} type arguments expected for '{1}'.",
    ),
    error(c::INVISIBLE_MEMBER, "Cannot access '{0}': it is {1} in '{2}'."),
    error(
        c::CALLABLE_REFERENCE_RESOLUTION_AMBIGUITY,
        "Callable reference resolution ambiguity: {0}.",
    ),
    error(c::TYPE_ARGUMENTS_NOT_ALLOWED, "Type arguments are not allowed for '{0}'."),
    error(
        c::EXPRESSION_OF_NULLABLE_TYPE_IN_CLASS_LITERAL_LHS,
        "Expression in a class literal has a nullable type '{0}', use !! to make the type non-nullable.",
    ),
    error(
        c::NULLABLE_TYPE_IN_CLASS_LITERAL_LHS,
        "Type in a class literal must not be nullable.",
    ),
    error(
        c::ARRAY_CLASS_LITERAL_REQUIRES_ARGUMENT,
        "Array class literal requires a type argument, please specify one in angle brackets.",
    ),
    error(
        c::TYPE_PARAMETER_AS_REIFIED,
        "Cannot use '{0}' as reified type parameter. Use a class instead.",
    ),
    error(
        c::CLASS_LITERAL_LHS_NOT_A_CLASS,
        "Only classes are allowed on the left hand side of a class literal.",
    ),
    error(
        c::CALLABLE_REFERENCE_LHS_NOT_A_CLASS,
        "Left-hand side of a callable reference cannot be a type parameter.",
    ),
    error(
        c::RESERVED_SYNTAX_IN_CALLABLE_REFERENCE_LHS,
        "This syntax is reserved for future use. To call a reference, enclose it in parentheses.",
    ),
    error(
        c::CALLABLE_REFERENCE_TO_MEMBER_OR_EXTENSION_WITH_EMPTY_LHS,
        "Left-hand side of callable reference with a receiver parameter cannot be empty. Please specify the type of the receiver before '::' explicitly.",
    ),
    error(
        c::CALLABLE_REFERENCE_TO_ANNOTATION_CONSTRUCTOR,
        "Annotation class cannot be instantiated.",
    ),
    error(
        c::EXTENSION_IN_CLASS_REFERENCE_NOT_ALLOWED,
        "'{0}' is a member and an extension at the same time. References to such elements are not allowed.",
    ),
    error(c::UNSUPPORTED, "Unsupported [{0}]."),
    error(
        c::UNSUPPORTED_FEATURE,
        "The feature \"{0}\" is not supported by the current language configuration.",
    ),
    error(
        c::MISSING_DEPENDENCY_CLASS,
        "Cannot access class '{0}'. Reflection support is missing from the environment.",
    ),
];
