//! Public build and transform API
//!
//! Callers describe what they want with a [`BuildOptions`] or
//! [`TransformOptions`] record and get back a [`BuildResult`] or
//! [`TransformResult`]. Failures never surface as `Err`: every problem with
//! the options or the input is reported in the result's `errors`, and an
//! invocation with errors produces no output.
//!
//! The pipeline for both entry points:
//! 1. set up the log (silent → deferred, otherwise eager stderr)
//! 2. translate public options into engine options, validating as we go
//! 3. check cross-option constraints and derive defaults
//! 4. if nothing went wrong, drive the [`Engine`](crate::engine::Engine)
//! 5. drain the log and position every message

pub mod build;
pub mod config;
pub mod constraints;
pub mod defines;
pub mod messages;
pub mod transform;
pub mod validate;

pub use build::{build, build_with_fs};
pub use transform::transform;

use crate::error::ConfigError;
use crate::logging::{self, Log, StderrOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Declares a closed option enum that can be parsed from its CLI/JSON names
macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $first:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
        #[serde(try_from = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Name used on the command line and in config files
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $first ),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(value: &str) -> Result<Self, ConfigError> {
                match value {
                    $( $first $(| $alias)* => Ok($name::$variant), )+
                    _ => Err(ConfigError::UnknownValue {
                        kind: $kind,
                        value: value.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(value: String) -> Result<Self, ConfigError> {
                value.parse()
            }
        }
    };
}

option_enum! {
    /// Platform the output is meant to run on
    pub enum Platform as "platform" {
        #[default]
        Browser => "browser",
        Node => "node",
    }
}

option_enum! {
    /// Output module format
    pub enum Format as "format" {
        /// Keep the input's format; bundling picks one from the platform
        #[default]
        Default => "default",
        Iife => "iife",
        CommonJs => "cjs" | "commonjs",
        EsModule => "esm",
    }
}

option_enum! {
    /// Source map mode
    pub enum SourceMap as "source map mode" {
        #[default]
        None => "none",
        Linked => "linked" | "true",
        Inline => "inline",
        External => "external",
    }
}

option_enum! {
    /// Whether the stderr log uses colors
    pub enum StderrColor as "color mode" {
        #[default]
        IfTerminal => "auto",
        Never => "never" | "false",
        Always => "always" | "true",
    }
}

option_enum! {
    /// Minimum severity printed to stderr. `Silent` prints nothing.
    pub enum LogLevel as "log level" {
        #[default]
        Info => "info",
        Warning => "warning",
        Error => "error",
        Silent => "silent",
    }
}

option_enum! {
    /// Language version the output must run on
    pub enum Target as "target" {
        #[default]
        ESNext => "esnext",
        ES2015 => "es2015" | "es6",
        ES2016 => "es2016",
        ES2017 => "es2017",
        ES2018 => "es2018",
        ES2019 => "es2019",
        ES2020 => "es2020",
    }
}

option_enum! {
    /// How a file's contents become a module
    pub enum Loader as "loader" {
        #[default]
        Js => "js",
        Jsx => "jsx",
        Ts => "ts",
        Tsx => "tsx",
        Json => "json",
        Text => "text",
        Base64 => "base64",
        DataUrl => "dataurl",
        File => "file",
    }
}

/// Opt-in to exact ECMAScript semantics when lowering syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrictOptions {
    pub nullish_coalescing: bool,
    pub class_fields: bool,
}

/// Options for a file-based build
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildOptions {
    pub color: StderrColor,
    /// Stop printing after this many errors. Zero means no limit.
    pub error_limit: usize,
    pub log_level: LogLevel,

    pub sourcemap: SourceMap,
    pub target: Target,
    pub strict: StrictOptions,

    pub minify_whitespace: bool,
    pub minify_identifiers: bool,
    pub minify_syntax: bool,

    pub jsx_factory: String,
    pub jsx_fragment: String,

    /// Dotted identifier → replacement (an identifier or a JSON literal)
    pub defines: BTreeMap<String, String>,

    /// Global variable name for IIFE output
    pub global_name: String,
    pub bundle: bool,
    pub splitting: bool,
    pub outfile: String,
    pub metafile: String,
    pub outdir: String,
    pub platform: Platform,
    pub format: Format,
    pub externals: Vec<String>,
    /// Extension (with leading dot) → loader, layered over the defaults
    pub loaders: BTreeMap<String, Loader>,
    /// `None` uses the default order
    pub resolve_extensions: Option<Vec<String>>,

    pub entry_points: Vec<String>,
}

/// Options for transforming a single string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformOptions {
    pub color: StderrColor,
    pub error_limit: usize,
    pub log_level: LogLevel,

    pub sourcemap: SourceMap,
    pub target: Target,
    pub strict: StrictOptions,

    pub minify_whitespace: bool,
    pub minify_identifiers: bool,
    pub minify_syntax: bool,

    pub jsx_factory: String,
    pub jsx_fragment: String,

    pub defines: BTreeMap<String, String>,

    /// File name recorded in the source map
    pub sourcefile: String,
    pub loader: Loader,
}

/// Where a message points in its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    /// 1-based
    pub line: usize,
    /// 0-based, in bytes
    pub column: usize,
    /// In bytes
    pub length: usize,
    pub line_text: String,
}

/// An error or warning, with its position when it has one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub location: Option<Location>,
}

/// A file produced by a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct BuildResult {
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
    pub output_files: Vec<OutputFile>,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
    pub js: Vec<u8>,
    pub js_source_map: Vec<u8>,
}

/// Set up the log for one invocation
fn new_log(log_level: LogLevel, color: StderrColor, error_limit: usize) -> Log {
    if log_level == LogLevel::Silent {
        return Log::new_defer_log();
    }

    let log_level = logging::LogLevel::try_from(log_level).unwrap_or_else(|err| panic!("{}", err));
    Log::new_stderr_log(StderrOptions {
        include_source: true,
        error_limit,
        color: color.into(),
        log_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enum_names() {
        assert_eq!("esm".parse::<Format>().unwrap(), Format::EsModule);
        assert_eq!("commonjs".parse::<Format>().unwrap(), Format::CommonJs);
        assert_eq!("node".parse::<Platform>().unwrap(), Platform::Node);
        assert_eq!("es6".parse::<Target>().unwrap(), Target::ES2015);
        assert_eq!("dataurl".parse::<Loader>().unwrap(), Loader::DataUrl);
        assert_eq!(Format::CommonJs.as_str(), "cjs");
    }

    #[test]
    fn test_unknown_enum_name() {
        let err = "amd".parse::<Format>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown format: \"amd\"");
    }

    #[test]
    fn test_defaults() {
        let options = BuildOptions::default();
        assert_eq!(options.platform, Platform::Browser);
        assert_eq!(options.format, Format::Default);
        assert_eq!(options.sourcemap, SourceMap::None);
        assert_eq!(options.target, Target::ESNext);
        assert_eq!(TransformOptions::default().loader, Loader::Js);
    }

    #[test]
    fn test_deserialize_build_options() {
        let options: BuildOptions = serde_json::from_str(
            r#"{
                "entryPoints": ["a.ts", "b.ts"],
                "outdir": "out",
                "bundle": true,
                "format": "esm",
                "platform": "node",
                "defines": { "DEBUG": "false" },
                "loaders": { ".png": "file" },
                "strict": { "classFields": true },
                "logLevel": "silent"
            }"#,
        )
        .unwrap();

        assert_eq!(options.entry_points, vec!["a.ts", "b.ts"]);
        assert_eq!(options.format, Format::EsModule);
        assert_eq!(options.platform, Platform::Node);
        assert_eq!(options.defines.get("DEBUG").map(String::as_str), Some("false"));
        assert_eq!(options.loaders.get(".png"), Some(&Loader::File));
        assert!(options.strict.class_fields);
        assert!(!options.strict.nullish_coalescing);
        assert_eq!(options.log_level, LogLevel::Silent);
        assert_eq!(options.resolve_extensions, None);
    }

    #[test]
    fn test_deserialize_rejects_unknown_enum() {
        let result = serde_json::from_str::<TransformOptions>(r#"{ "loader": "wasm" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_silent_log_is_deferred() {
        let log = new_log(LogLevel::Silent, StderrColor::Never, 0);
        log.add_error("quiet");
        assert_eq!(log.done().len(), 1);
    }
}
