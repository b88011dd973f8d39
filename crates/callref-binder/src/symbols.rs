//! Scopes visible while resolving a reference expression.
//!
//! Unqualified names resolve against, in order: local variables, type
//! parameters in scope, the default package, then the default imports
//! (`kotlin`). Any package is reachable by its qualified name.

use callref_solver::{CallableId, ClassifierId, DefinitionStore, TypeParamId};
use indexmap::IndexMap;

/// Top-level declarations of one package.
#[derive(Clone, Debug, Default)]
pub struct PackageScope {
    pub classifiers: IndexMap<String, ClassifierId>,
    pub callables: IndexMap<String, Vec<CallableId>>,
}

#[derive(Clone, Debug)]
pub struct SymbolTable {
    packages: IndexMap<Vec<String>, PackageScope>,
    default_imports: Vec<Vec<String>>,
    locals: IndexMap<String, CallableId>,
    type_params: IndexMap<String, TypeParamId>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> SymbolTable {
        SymbolTable {
            packages: IndexMap::new(),
            default_imports: vec![vec![String::from("kotlin")]],
            locals: IndexMap::new(),
            type_params: IndexMap::new(),
        }
    }

    /// Table with every top-level classifier already in `defs` declared in
    /// its package. Used to expose the builtins before binding user stubs.
    #[must_use]
    pub fn from_store(defs: &DefinitionStore) -> SymbolTable {
        let mut table = SymbolTable::new();
        for (id, info) in defs.classifiers() {
            if info.outer.is_none() {
                table.declare_classifier(&info.package, &info.name, id);
            }
        }
        table
    }

    // =========================================================================
    // Declaration
    // =========================================================================

    pub fn declare_classifier(&mut self, package: &[String], name: &str, id: ClassifierId) {
        self.packages
            .entry(package.to_vec())
            .or_default()
            .classifiers
            .insert(name.to_string(), id);
    }

    pub fn declare_callable(&mut self, package: &[String], name: &str, id: CallableId) {
        self.packages
            .entry(package.to_vec())
            .or_default()
            .callables
            .entry(name.to_string())
            .or_default()
            .push(id);
    }

    pub fn declare_local(&mut self, name: &str, id: CallableId) {
        self.locals.insert(name.to_string(), id);
    }

    pub fn declare_type_param(&mut self, name: &str, id: TypeParamId) {
        self.type_params.insert(name.to_string(), id);
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    #[must_use]
    pub fn lookup_local(&self, name: &str) -> Option<CallableId> {
        self.locals.get(name).copied()
    }

    #[must_use]
    pub fn lookup_type_param(&self, name: &str) -> Option<TypeParamId> {
        self.type_params.get(name).copied()
    }

    fn scope_packages(&self) -> impl Iterator<Item = &PackageScope> {
        std::iter::once(Vec::new())
            .chain(self.default_imports.iter().cloned())
            .filter_map(|path| self.packages.get(&path))
    }

    /// Classifier visible by its simple name.
    #[must_use]
    pub fn lookup_classifier(&self, name: &str) -> Option<ClassifierId> {
        self.scope_packages()
            .find_map(|scope| scope.classifiers.get(name).copied())
    }

    /// Top-level functions and properties visible by simple name, from the
    /// nearest package that declares any.
    #[must_use]
    pub fn top_level_callables(&self, name: &str) -> Vec<CallableId> {
        self.scope_packages()
            .find_map(|scope| scope.callables.get(name).filter(|ids| !ids.is_empty()))
            .cloned()
            .unwrap_or_default()
    }

    /// True when `path` names a package or a prefix of one.
    #[must_use]
    pub fn is_package(&self, path: &[String]) -> bool {
        !path.is_empty()
            && self
                .packages
                .keys()
                .any(|package| package.len() >= path.len() && package[..path.len()] == *path)
    }

    #[must_use]
    pub fn package_classifier(&self, path: &[String], name: &str) -> Option<ClassifierId> {
        self.packages
            .get(path)
            .and_then(|scope| scope.classifiers.get(name).copied())
    }

    #[must_use]
    pub fn package_callables(&self, path: &[String], name: &str) -> Vec<CallableId> {
        self.packages
            .get(path)
            .and_then(|scope| scope.callables.get(name).cloned())
            .unwrap_or_default()
    }

    /// Resolve `a.b.Outer.Inner` to a classifier: the longest package prefix,
    /// a classifier in it, then nested classifiers. A single segment uses
    /// the simple-name scope.
    #[must_use]
    pub fn classifier_by_path(&self, defs: &DefinitionStore, path: &[&str]) -> Option<ClassifierId> {
        let first = path.first()?;
        let owned: Vec<String> = path.iter().map(|s| (*s).to_string()).collect();
        let mut start = None;
        for split in (1..path.len()).rev() {
            if let Some(found) = self.package_classifier(&owned[..split], &owned[split]) {
                start = Some((found, split + 1));
                break;
            }
        }
        let (mut current, consumed) = match start {
            Some(found) => found,
            None => (self.lookup_classifier(first)?, 1),
        };
        for segment in &path[consumed..] {
            current = defs.nested_named(current, segment)?;
        }
        Some(current)
    }

    pub fn locals(&self) -> impl Iterator<Item = (&str, CallableId)> {
        self.locals.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn packages(&self) -> impl Iterator<Item = (&[String], &PackageScope)> {
        self.packages
            .iter()
            .map(|(path, scope)| (path.as_slice(), scope))
    }
}
