//! Internal engine options and the collaborator contract
//!
//! The public API translates caller options into the types in this module and
//! hands them to an [`Engine`]: something that can build a resolver, scan a
//! module graph starting at the entry points, and compile the result into
//! output files. Parsing, linking and code generation all live behind this
//! boundary.
//!
//! With the `transpile` feature, [`TranspileEngine`] provides a per-file
//! implementation on top of OXC.

pub mod defines;
#[cfg(feature = "transpile")]
mod transpile;

#[cfg(feature = "transpile")]
pub use transpile::TranspileEngine;

pub use defines::ProcessedDefines;

use crate::fs::FileSystem;
use crate::logging::Log;
use crate::resolver::{ResolveOptions, Resolver};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Platform the output is meant to run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Browser,
    Node,
}

/// Module format of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Keep whatever module syntax the input used
    #[default]
    Preserve,
    /// Immediately Invoked Function Expression
    Iife,
    CommonJs,
    EsModule,
}

/// How (and whether) a source map is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMap {
    #[default]
    None,
    /// Separate `.map` file plus a `//# sourceMappingURL` comment
    LinkedWithComment,
    /// Data URL appended to the output
    Inline,
    /// Separate `.map` file, no comment
    ExternalWithoutComment,
}

/// Language version the output must run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LanguageTarget {
    ES2015,
    ES2016,
    ES2017,
    ES2018,
    ES2019,
    ES2020,
    #[default]
    ESNext,
}

impl LanguageTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageTarget::ES2015 => "es2015",
            LanguageTarget::ES2016 => "es2016",
            LanguageTarget::ES2017 => "es2017",
            LanguageTarget::ES2018 => "es2018",
            LanguageTarget::ES2019 => "es2019",
            LanguageTarget::ES2020 => "es2020",
            LanguageTarget::ESNext => "esnext",
        }
    }
}

/// Opt-in to exact ECMAScript semantics when lowering syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrictOptions {
    pub nullish_coalescing: bool,
    pub class_fields: bool,
}

/// How a file's contents become a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Loader {
    Js,
    Jsx,
    Ts,
    Tsx,
    Json,
    Text,
    Base64,
    DataUrl,
    /// Copy the file to the output directory and import its path
    File,
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Loader::Js => "js",
            Loader::Jsx => "jsx",
            Loader::Ts => "ts",
            Loader::Tsx => "tsx",
            Loader::Json => "json",
            Loader::Text => "text",
            Loader::Base64 => "base64",
            Loader::DataUrl => "dataurl",
            Loader::File => "file",
        };
        f.write_str(name)
    }
}

/// Extension (including the leading dot) to loader
pub type ExtensionToLoader = Arc<HashMap<String, Loader>>;

lazy_static! {
    static ref DEFAULT_EXTENSION_TO_LOADER: ExtensionToLoader = Arc::new(HashMap::from([
        (".js".to_string(), Loader::Js),
        (".mjs".to_string(), Loader::Js),
        (".cjs".to_string(), Loader::Js),
        (".jsx".to_string(), Loader::Jsx),
        (".ts".to_string(), Loader::Ts),
        (".tsx".to_string(), Loader::Tsx),
        (".json".to_string(), Loader::Json),
        (".txt".to_string(), Loader::Text),
    ]));
}

/// The process-wide default loader table. Shared, never mutated.
pub fn default_extension_to_loader() -> ExtensionToLoader {
    Arc::clone(&DEFAULT_EXTENSION_TO_LOADER)
}

/// JSX pragma, as identifier parts (`React.createElement` → `["React", "createElement"]`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsxOptions {
    pub factory: Option<Vec<String>>,
    pub fragment: Option<Vec<String>>,
}

/// Options consulted for every parsed module
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub target: LanguageTarget,
    pub strict: StrictOptions,
    pub mangle_syntax: bool,
    pub jsx: JsxOptions,
    /// Built once per invocation and shared by every parse
    pub defines: Option<Arc<ProcessedDefines>>,
    pub platform: Platform,
    pub is_bundling: bool,
}

/// In-memory input for transform mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdinInfo {
    pub loader: Loader,
    pub contents: String,
    pub source_file: String,
}

/// Options for scanning and compiling the bundle
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub source_map: SourceMap,
    pub mangle_syntax: bool,
    pub remove_whitespace: bool,
    pub minify_identifiers: bool,
    /// Global variable name for IIFE output
    pub module_name: String,
    pub is_bundling: bool,
    pub code_splitting: bool,
    pub output_format: Format,
    pub abs_output_file: String,
    pub abs_output_dir: String,
    pub abs_metadata_file: String,
    pub extension_to_loader: ExtensionToLoader,
    pub stdin: Option<StdinInfo>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            source_map: SourceMap::None,
            mangle_syntax: false,
            remove_whitespace: false,
            minify_identifiers: false,
            module_name: String::new(),
            is_bundling: false,
            code_splitting: false,
            output_format: Format::Preserve,
            abs_output_file: String::new(),
            abs_output_dir: String::new(),
            abs_metadata_file: String::new(),
            extension_to_loader: default_extension_to_loader(),
            stdin: None,
        }
    }
}

/// A file produced by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub abs_path: String,
    pub contents: Vec<u8>,
}

/// A scanned module graph, ready to be compiled
pub trait Bundle {
    fn compile(&self, log: &Log, options: &BundleOptions) -> Vec<OutputFile>;
}

/// The scan/resolve/compile engine driven by the orchestrators.
///
/// Implementations may process modules in parallel; they report problems by
/// writing to the [`Log`] they are handed.
pub trait Engine {
    fn new_resolver(
        &self,
        fs: Arc<dyn FileSystem>,
        log: &Log,
        options: ResolveOptions,
    ) -> Box<dyn Resolver>;

    fn scan_bundle(
        &self,
        log: &Log,
        fs: Arc<dyn FileSystem>,
        resolver: Box<dyn Resolver>,
        entry_paths: &[String],
        parse_options: &ParseOptions,
        bundle_options: &BundleOptions,
    ) -> Box<dyn Bundle>;
}
