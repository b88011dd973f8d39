use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use callref_binder::{SymbolTable, bind_declarations};
use callref_checker::{ReferenceResolution, ResolutionSession, SessionReference, SessionResult};
use callref_common::Diagnostic;
use callref_parser::{DeclFile, NodeArena, parse_declarations, parse_reference_into};
use callref_solver::{DefinitionStore, TypeFormatter, TypeInterner};

use crate::args::CliArgs;
use crate::config::{CallrefConfig, ResolvedOptions, find_config, load_config, resolve_options};

/// One resolved reference, rendered for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceReport {
    pub reference: String,
    pub file: String,
    /// `value`, `object`, `type` or `bare type`; absent when the left-hand
    /// side did not resolve or is empty.
    pub lhs: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub success: bool,
    pub references: Vec<ReferenceReport>,
    pub diagnostics: Vec<Diagnostic>,
    /// Source text of every input by the file name diagnostics carry.
    #[serde(skip)]
    pub sources: FxHashMap<String, String>,
}

/// File name that diagnostics on the `index`-th reference carry.
pub fn reference_file_name(index: usize) -> String {
    format!("ref{index}")
}

/// Resolve the references named on the command line.
pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunReport> {
    let config = match find_config(args, cwd) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path)?
        }
        None => CallrefConfig::default(),
    };
    let options = resolve_options(config, args);

    let decls = match &args.decls {
        Some(path) => {
            let path = cwd.join(path);
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read declarations: {}", path.display()))?;
            Some((path.display().to_string(), source))
        }
        None => None,
    };
    let decls = decls
        .as_ref()
        .map(|(name, source)| (name.as_str(), source.as_str()));

    resolve_sources(decls, &args.references, &options)
}

/// Bind `decls` (file name and text) and resolve `references` in order.
pub fn resolve_sources(
    decls: Option<(&str, &str)>,
    references: &[String],
    options: &ResolvedOptions,
) -> Result<RunReport> {
    let mut sources = FxHashMap::default();
    let types = TypeInterner::new();
    let mut defs = DefinitionStore::with_builtins(&types, options.reflection);

    let (file_name, file) = match decls {
        Some((name, source)) => {
            let file = parse_declarations(source)
                .with_context(|| format!("failed to parse declarations: {name}"))?;
            sources.insert(name.to_string(), source.to_string());
            (name, file)
        }
        None => ("<builtins>", DeclFile::default()),
    };
    let output = bind_declarations(&file, file_name, &types, &mut defs);
    let symbols: SymbolTable = output.symbols;
    let mut diagnostics = output.diagnostics;

    let scope_owner = match &options.within {
        Some(path) => {
            let segments: Vec<&str> = path.iter().map(String::as_str).collect();
            match symbols.classifier_by_path(&defs, &segments) {
                Some(owner) => Some(owner),
                None => bail!("--within: no class named '{}'", path.join(".")),
            }
        }
        None => None,
    };

    let mut arena = NodeArena::new();
    let mut session_refs = Vec::with_capacity(references.len());
    for (index, source) in references.iter().enumerate() {
        let root = parse_reference_into(&mut arena, source)
            .with_context(|| format!("failed to parse reference `{source}`"))?;
        let file_name = reference_file_name(index);
        sources.insert(file_name.clone(), source.clone());
        session_refs.push(SessionReference { root, file_name });
    }

    let session = ResolutionSession::new(&arena, &types, &defs, &symbols)
        .with_features(options.features.clone())
        .with_scope_owner(scope_owner);
    let outcome = session.resolve_all(&session_refs)?;

    let formatter = TypeFormatter::new(&types, &defs);
    let reports = outcome
        .results()
        .iter()
        .zip(session_refs.iter().zip(references))
        .map(|(result, (reference, source))| {
            report_for(result, &reference.file_name, source, &formatter)
        })
        .collect();

    let success = outcome.is_success() && !diagnostics.iter().any(Diagnostic::is_error);
    diagnostics.extend_from_slice(outcome.diagnostics());
    info!(
        references = references.len(),
        diagnostics = diagnostics.len(),
        success,
        "resolution finished"
    );

    Ok(RunReport {
        success,
        references: reports,
        diagnostics,
        sources,
    })
}

fn report_for(
    result: &SessionResult,
    file: &str,
    source: &str,
    formatter: &TypeFormatter<'_>,
) -> ReferenceReport {
    let (lhs, ty, valid) = match &result.resolution {
        ReferenceResolution::ClassLiteral(literal) => (
            literal.lhs.as_ref(),
            Some(literal.ty),
            !literal.ty.is_error(),
        ),
        ReferenceResolution::CallableReference(reference) => {
            (reference.lhs.as_ref(), reference.ty, reference.is_valid)
        }
    };
    ReferenceReport {
        reference: source.to_string(),
        file: file.to_string(),
        lhs: lhs.map(|lhs| lhs.kind_name().to_string()),
        ty: ty.map(|ty| formatter.format(ty)),
        valid,
    }
}
