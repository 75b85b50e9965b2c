//! Translation of public options into engine options
//!
//! Enum translation is total over the public types, with one exception:
//! `LogLevel::Silent` has no counterpart in the stderr log and is rejected
//! as a [`ContractViolation`]. Everything else here validates user input and
//! records problems in the log instead of failing.

use super::{Format, Loader, LogLevel, Platform, SourceMap, StderrColor, StrictOptions, Target};
use crate::engine::{self, ExtensionToLoader, LanguageTarget, default_extension_to_loader};
use crate::error::{ContractResult, ContractViolation};
use crate::fs::FileSystem;
use crate::logging::{self, Log};
use crate::resolver::{DEFAULT_EXTENSION_ORDER, is_non_module_path};
use oxc_syntax::identifier::is_identifier_name;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

impl From<Platform> for engine::Platform {
    fn from(value: Platform) -> Self {
        match value {
            Platform::Browser => engine::Platform::Browser,
            Platform::Node => engine::Platform::Node,
        }
    }
}

impl From<Format> for engine::Format {
    fn from(value: Format) -> Self {
        match value {
            Format::Default => engine::Format::Preserve,
            Format::Iife => engine::Format::Iife,
            Format::CommonJs => engine::Format::CommonJs,
            Format::EsModule => engine::Format::EsModule,
        }
    }
}

impl From<SourceMap> for engine::SourceMap {
    fn from(value: SourceMap) -> Self {
        match value {
            SourceMap::None => engine::SourceMap::None,
            SourceMap::Linked => engine::SourceMap::LinkedWithComment,
            SourceMap::Inline => engine::SourceMap::Inline,
            SourceMap::External => engine::SourceMap::ExternalWithoutComment,
        }
    }
}

impl From<StderrColor> for logging::StderrColor {
    fn from(value: StderrColor) -> Self {
        match value {
            StderrColor::IfTerminal => logging::StderrColor::IfTerminal,
            StderrColor::Never => logging::StderrColor::Never,
            StderrColor::Always => logging::StderrColor::Always,
        }
    }
}

impl TryFrom<LogLevel> for logging::LogLevel {
    type Error = ContractViolation;

    fn try_from(value: LogLevel) -> ContractResult<Self> {
        match value {
            LogLevel::Info => Ok(logging::LogLevel::Info),
            LogLevel::Warning => Ok(logging::LogLevel::Warning),
            LogLevel::Error => Ok(logging::LogLevel::Error),
            LogLevel::Silent => Err(ContractViolation::InvalidLogLevel(
                value.as_str().to_string(),
            )),
        }
    }
}

impl From<Target> for LanguageTarget {
    fn from(value: Target) -> Self {
        match value {
            Target::ESNext => LanguageTarget::ESNext,
            Target::ES2015 => LanguageTarget::ES2015,
            Target::ES2016 => LanguageTarget::ES2016,
            Target::ES2017 => LanguageTarget::ES2017,
            Target::ES2018 => LanguageTarget::ES2018,
            Target::ES2019 => LanguageTarget::ES2019,
            Target::ES2020 => LanguageTarget::ES2020,
        }
    }
}

impl From<StrictOptions> for engine::StrictOptions {
    fn from(value: StrictOptions) -> Self {
        engine::StrictOptions {
            nullish_coalescing: value.nullish_coalescing,
            class_fields: value.class_fields,
        }
    }
}

impl From<Loader> for engine::Loader {
    fn from(value: Loader) -> Self {
        match value {
            Loader::Js => engine::Loader::Js,
            Loader::Jsx => engine::Loader::Jsx,
            Loader::Ts => engine::Loader::Ts,
            Loader::Tsx => engine::Loader::Tsx,
            Loader::Json => engine::Loader::Json,
            Loader::Text => engine::Loader::Text,
            Loader::Base64 => engine::Loader::Base64,
            Loader::DataUrl => engine::Loader::DataUrl,
            Loader::File => engine::Loader::File,
        }
    }
}

/// Whether `text` is a single JavaScript identifier
pub fn is_identifier(text: &str) -> bool {
    is_identifier_name(text)
}

/// Record an error for every external that is a file path
pub fn validate_externals(log: &Log, paths: &[String]) -> HashSet<String> {
    let mut result = HashSet::with_capacity(paths.len());
    for path in paths {
        if is_non_module_path(path) {
            log.add_error(format!("Invalid module name: {:?}", path));
        }
        result.insert(path.clone());
    }
    result
}

/// Resolve the extension order, falling back to the default one
pub fn validate_resolve_extensions(log: &Log, order: Option<&[String]>) -> Vec<String> {
    let Some(order) = order else {
        return DEFAULT_EXTENSION_ORDER.iter().map(|ext| ext.to_string()).collect();
    };

    for ext in order {
        if ext.len() < 2 || !ext.starts_with('.') {
            log.add_error(format!("Invalid file extension: {:?}", ext));
        }
    }
    order.to_vec()
}

/// Layer custom loaders over the defaults.
///
/// The default table is shared as-is when there is nothing to add.
pub fn validate_loaders(log: &Log, loaders: &BTreeMap<String, Loader>) -> ExtensionToLoader {
    let defaults = default_extension_to_loader();
    if loaders.is_empty() {
        return defaults;
    }

    let mut result: HashMap<String, engine::Loader> = (*defaults).clone();
    for (ext, loader) in loaders {
        if ext.len() < 2 || !ext.starts_with('.') || ext[1..].contains('.') {
            log.add_error(format!("Invalid file extension: {:?}", ext));
        }
        result.insert(ext.clone(), (*loader).into());
    }
    Arc::new(result)
}

/// Split a JSX pragma like `React.createElement` into identifier parts
pub fn validate_jsx(log: &Log, text: &str, name: &str) -> Option<Vec<String>> {
    if text.is_empty() {
        return None;
    }

    let parts: Vec<String> = text.split('.').map(str::to_string).collect();
    if parts.iter().any(|part| !is_identifier(part)) {
        log.add_error(format!("Invalid JSX {}: {:?}", name, text));
        return None;
    }
    Some(parts)
}

/// Make a path absolute.
///
/// An empty path means "unset" and stays empty. A path the filesystem can't
/// resolve records an error and is returned unchanged; only the log says
/// whether the result is usable.
pub fn validate_path(log: &Log, fs: &dyn FileSystem, rel_path: &str) -> String {
    if rel_path.is_empty() {
        return String::new();
    }

    match fs.abs(rel_path) {
        Some(abs_path) => abs_path,
        None => {
            log.add_error(format!("Invalid path: {}", rel_path));
            rel_path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFs;

    struct BrokenFs;

    impl FileSystem for BrokenFs {
        fn abs(&self, _path: &str) -> Option<String> {
            None
        }

        fn dir(&self, path: &str) -> String {
            path.to_string()
        }

        fn read_file(&self, _path: &str) -> Option<String> {
            None
        }
    }

    fn texts(log: &Log) -> Vec<String> {
        log.done().into_iter().map(|m| m.text).collect()
    }

    #[test]
    fn test_translate_enums() {
        assert_eq!(engine::Format::from(Format::Default), engine::Format::Preserve);
        assert_eq!(engine::Format::from(Format::Iife), engine::Format::Iife);
        assert_eq!(
            engine::SourceMap::from(SourceMap::Linked),
            engine::SourceMap::LinkedWithComment
        );
        assert_eq!(
            engine::SourceMap::from(SourceMap::External),
            engine::SourceMap::ExternalWithoutComment
        );
        assert_eq!(LanguageTarget::from(Target::ES2017), LanguageTarget::ES2017);
        assert_eq!(engine::Platform::from(Platform::Node), engine::Platform::Node);
        assert_eq!(engine::Loader::from(Loader::DataUrl), engine::Loader::DataUrl);
        assert_eq!(
            logging::StderrColor::from(StderrColor::Always),
            logging::StderrColor::Always
        );
    }

    #[test]
    fn test_silent_log_level_is_a_contract_violation() {
        assert_eq!(
            logging::LogLevel::try_from(LogLevel::Warning),
            Ok(logging::LogLevel::Warning)
        );
        let err = logging::LogLevel::try_from(LogLevel::Silent).unwrap_err();
        assert_eq!(err, ContractViolation::InvalidLogLevel("silent".to_string()));
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("process"));
        assert!(is_identifier("$el"));
        assert!(is_identifier("_private1"));
        assert!(is_identifier("ünïcode"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier("a.b"));
    }

    #[test]
    fn test_externals() {
        let log = Log::new_defer_log();
        let externals = validate_externals(
            &log,
            &["react".to_string(), "./local".to_string(), "fs".to_string()],
        );
        assert_eq!(externals.len(), 3);
        assert!(externals.contains("./local"));
        assert_eq!(texts(&log), vec!["Invalid module name: \"./local\""]);
    }

    #[test]
    fn test_resolve_extensions() {
        let log = Log::new_defer_log();
        assert_eq!(
            validate_resolve_extensions(&log, None),
            vec![".tsx", ".ts", ".jsx", ".mjs", ".cjs", ".js", ".json"]
        );

        let order = vec![".ts".to_string(), "js".to_string(), ".".to_string()];
        assert_eq!(validate_resolve_extensions(&log, Some(&order)), order);
        assert_eq!(
            texts(&log),
            vec![
                "Invalid file extension: \"js\"",
                "Invalid file extension: \".\""
            ]
        );
    }

    #[test]
    fn test_loaders_layer_over_defaults() {
        let log = Log::new_defer_log();
        let loaders = validate_loaders(
            &log,
            &BTreeMap::from([
                (".png".to_string(), Loader::File),
                (".js".to_string(), Loader::Jsx),
            ]),
        );
        assert_eq!(loaders.get(".png"), Some(&engine::Loader::File));
        assert_eq!(loaders.get(".js"), Some(&engine::Loader::Jsx));
        assert_eq!(loaders.get(".ts"), Some(&engine::Loader::Ts));
        assert!(!log.has_errors());

        // The shared default table is untouched
        assert_eq!(default_extension_to_loader().get(".js"), Some(&engine::Loader::Js));
    }

    #[test]
    fn test_loaders_without_custom_entries_share_defaults() {
        let log = Log::new_defer_log();
        let loaders = validate_loaders(&log, &BTreeMap::new());
        assert!(Arc::ptr_eq(&loaders, &default_extension_to_loader()));
    }

    #[test]
    fn test_invalid_loader_extensions() {
        let log = Log::new_defer_log();
        let loaders = validate_loaders(
            &log,
            &BTreeMap::from([
                ("png".to_string(), Loader::File),
                (".d.ts".to_string(), Loader::Ts),
            ]),
        );
        assert_eq!(loaders.get("png"), Some(&engine::Loader::File));
        assert_eq!(
            texts(&log),
            vec![
                "Invalid file extension: \".d.ts\"",
                "Invalid file extension: \"png\""
            ]
        );
    }

    #[test]
    fn test_jsx_pragma() {
        let log = Log::new_defer_log();
        assert_eq!(validate_jsx(&log, "", "factory"), None);
        assert_eq!(
            validate_jsx(&log, "React.createElement", "factory"),
            Some(vec!["React".to_string(), "createElement".to_string()])
        );
        assert!(!log.has_errors());

        assert_eq!(validate_jsx(&log, "React.", "fragment"), None);
        assert_eq!(texts(&log), vec!["Invalid JSX fragment: \"React.\""]);
    }

    #[test]
    fn test_path_validation() {
        let log = Log::new_defer_log();
        let fs = MockFs::default();
        assert_eq!(validate_path(&log, &fs, ""), "");
        assert_eq!(validate_path(&log, &fs, "out/main.js"), "/out/main.js");
        assert!(!log.has_errors());
    }

    #[test]
    fn test_unresolvable_path_records_one_error() {
        let log = Log::new_defer_log();
        assert_eq!(validate_path(&log, &BrokenFs, "src/in.ts"), "src/in.ts");
        assert_eq!(validate_path(&log, &BrokenFs, ""), "");
        assert_eq!(texts(&log), vec!["Invalid path: src/in.ts"]);
    }
}
