use super::{CallrefConfig, find_config, load_config, parse_config, resolve_options};
use crate::args::CliArgs;
use callref_common::LanguageFeature;
use clap::Parser;

fn args(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["callref"];
    argv.extend_from_slice(extra);
    argv.push("Foo::bar");
    CliArgs::parse_from(argv)
}

#[test]
fn missing_fields_keep_defaults() {
    let config = parse_config("{}").expect("valid config");
    assert_eq!(config, CallrefConfig::default());
    assert!(config.reflection);
    assert!(config.features.supports(LanguageFeature::BoundCallableReferences));
}

#[test]
fn reads_camel_case_features() {
    let config = parse_config(
        r#"{
          "features": { "prohibitReservedReferenceSyntax": false },
          "reflection": false
        }"#,
    )
    .expect("valid config");
    assert!(!config.reflection);
    assert!(!config.features.supports(LanguageFeature::ProhibitReservedReferenceSyntax));
    assert!(config.features.supports(LanguageFeature::BoundCallableReferences));
}

#[test]
fn rejects_malformed_json() {
    let err = parse_config(r#"{ "reflection": "yes" }"#).unwrap_err();
    assert!(format!("{err:#}").contains("callref.json"));
}

#[test]
fn flags_override_the_file() {
    let config = parse_config(r#"{ "reflection": true }"#).expect("valid config");
    let options = resolve_options(
        config,
        &args(&["--no-bound-references", "--no-reflection", "--within", "a.b.Outer"]),
    );
    assert!(!options.reflection);
    assert!(!options.features.supports(LanguageFeature::BoundCallableReferences));
    assert_eq!(
        options.within,
        Some(vec!["a".to_string(), "b".to_string(), "Outer".to_string()])
    );
}

#[test]
fn config_is_discovered_in_the_working_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert_eq!(find_config(&args(&[]), dir.path()), None);

    let path = dir.path().join("callref.json");
    std::fs::write(&path, r#"{ "reflection": false }"#).expect("write config");
    assert_eq!(find_config(&args(&[]), dir.path()), Some(path.clone()));
    assert!(!load_config(&path).expect("loads").reflection);

    let explicit = find_config(&args(&["--config", "other.json"]), dir.path());
    assert_eq!(explicit, Some(dir.path().join("other.json")));
    assert!(load_config(&dir.path().join("other.json")).is_err());
}
