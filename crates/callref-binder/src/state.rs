//! Binder state and entry point.

use crate::symbols::SymbolTable;
use callref_common::{Diagnostic, Span};
use callref_parser::DeclFile;
use callref_solver::{ClassifierId, DefinitionStore, TypeInterner, TypeParamId};
use tracing::debug;

/// Result of binding a stub file.
#[derive(Clone, Debug)]
pub struct BindOutput {
    pub symbols: SymbolTable,
    /// Problems in the stubs themselves (unresolved type names, wrong
    /// argument counts). Binding always completes; bad types become errors.
    pub diagnostics: Vec<Diagnostic>,
}

/// Names visible while resolving a type written in a stub.
#[derive(Clone, Debug, Default)]
pub(crate) struct TypeScope {
    pub(crate) package: Vec<String>,
    /// Innermost enclosing classifier.
    pub(crate) classifier: Option<ClassifierId>,
    /// Type parameters of the enclosing function.
    pub(crate) function_params: Vec<(String, TypeParamId)>,
}

pub struct BinderState<'a> {
    pub(crate) file_name: &'a str,
    pub(crate) types: &'a TypeInterner,
    pub(crate) defs: &'a mut DefinitionStore,
    pub(crate) symbols: SymbolTable,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'a> BinderState<'a> {
    /// Binder that adds to `defs`. The symbol table starts with every
    /// top-level classifier already in the store.
    pub fn new(file_name: &'a str, types: &'a TypeInterner, defs: &'a mut DefinitionStore) -> Self {
        let symbols = SymbolTable::from_store(defs);
        BinderState {
            file_name,
            types,
            defs,
            symbols,
            diagnostics: Vec::new(),
        }
    }

    pub fn bind_file(mut self, file: &DeclFile) -> BindOutput {
        let classes = self.declare_classifiers(file);
        self.bind_scope_type_params(file);
        self.bind_classifier_bodies(&classes);
        self.bind_top_level(file);
        debug!(
            file = self.file_name,
            classifiers = classes.len(),
            diagnostics = self.diagnostics.len(),
            "bound declaration stubs"
        );
        BindOutput {
            symbols: self.symbols,
            diagnostics: self.diagnostics,
        }
    }

    pub(crate) fn report(&mut self, span: Span, code: u32, args: &[&str]) {
        self.diagnostics.push(Diagnostic::from_code(
            self.file_name,
            span.start,
            span.len(),
            code,
            args,
        ));
    }
}

/// Bind `file` into `defs`, returning the scope for resolution.
pub fn bind_declarations(
    file: &DeclFile,
    file_name: &str,
    types: &TypeInterner,
    defs: &mut DefinitionStore,
) -> BindOutput {
    BinderState::new(file_name, types, defs).bind_file(file)
}
