//! Language feature gate.
//!
//! Resolution consults the gate for behavior that depends on the active
//! language configuration. The gate is plain data so it can be loaded from a
//! JSON configuration file.

use serde::Deserialize;
use std::fmt;

/// A gated language feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LanguageFeature {
    /// `expr::name` and `expr::class` with a value on the left-hand side.
    BoundCallableReferences,
    /// Report reserved `::` left-hand side syntax as an error instead of a
    /// warning.
    ProhibitReservedReferenceSyntax,
}

impl LanguageFeature {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            LanguageFeature::BoundCallableReferences => "bound callable references",
            LanguageFeature::ProhibitReservedReferenceSyntax => {
                "prohibit reserved callable reference syntax"
            }
        }
    }
}

impl fmt::Display for LanguageFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn enabled() -> bool {
    true
}

/// The set of supported language features.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageFeatures {
    #[serde(default = "enabled")]
    pub bound_callable_references: bool,
    #[serde(default = "enabled")]
    pub prohibit_reserved_reference_syntax: bool,
}

impl Default for LanguageFeatures {
    fn default() -> Self {
        Self {
            bound_callable_references: true,
            prohibit_reserved_reference_syntax: true,
        }
    }
}

impl LanguageFeatures {
    #[must_use]
    pub const fn supports(&self, feature: LanguageFeature) -> bool {
        match feature {
            LanguageFeature::BoundCallableReferences => self.bound_callable_references,
            LanguageFeature::ProhibitReservedReferenceSyntax => {
                self.prohibit_reserved_reference_syntax
            }
        }
    }

    /// Return a copy with `feature` switched on or off.
    #[must_use]
    pub fn with(mut self, feature: LanguageFeature, supported: bool) -> Self {
        match feature {
            LanguageFeature::BoundCallableReferences => self.bound_callable_references = supported,
            LanguageFeature::ProhibitReservedReferenceSyntax => {
                self.prohibit_reserved_reference_syntax = supported;
            }
        }
        self
    }
}
