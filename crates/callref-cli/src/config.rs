use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use callref_common::{LanguageFeature, LanguageFeatures};

use crate::args::CliArgs;

pub const CONFIG_FILE_NAME: &str = "callref.json";

/// Contents of `callref.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallrefConfig {
    pub features: LanguageFeatures,
    pub reflection: bool,
}

impl Default for CallrefConfig {
    fn default() -> Self {
        CallrefConfig {
            features: LanguageFeatures::default(),
            reflection: true,
        }
    }
}

/// Settings after command-line flags have been applied over the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub features: LanguageFeatures,
    pub reflection: bool,
    /// Dotted path of the class whose body references resolve in.
    pub within: Option<Vec<String>>,
}

pub fn parse_config(source: &str) -> Result<CallrefConfig> {
    serde_json::from_str(source).context("failed to parse callref.json")
}

pub fn load_config(path: &Path) -> Result<CallrefConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_config(&source).with_context(|| format!("failed to parse config: {}", path.display()))
}

/// The explicit `--config` path, or `callref.json` in `cwd` if it exists.
pub fn find_config(args: &CliArgs, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = &args.config {
        return Some(cwd.join(path));
    }
    let candidate = cwd.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

pub fn resolve_options(config: CallrefConfig, args: &CliArgs) -> ResolvedOptions {
    let mut features = config.features;
    if args.no_bound_references {
        features = features.with(LanguageFeature::BoundCallableReferences, false);
    }
    let within = args.within.as_ref().map(|path| {
        path.split('.')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    });
    ResolvedOptions {
        features,
        reflection: config.reflection && !args.no_reflection,
        within,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
