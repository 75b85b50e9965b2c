//! String-based transform entry point
//!
//! The input is wrapped in a one-file in-memory filesystem under its
//! `sourcefile` name and pushed through the same engine as a build.

use super::constraints::check_transform_options;
use super::defines::validate_defines;
use super::messages::messages_of_kind;
use super::validate::validate_jsx;
use super::{TransformOptions, TransformResult, new_log};
use crate::engine::{BundleOptions, Engine, JsxOptions, OutputFile, ParseOptions, StdinInfo};
use crate::fs::{FileSystem, MockFs};
use crate::logging::MsgKind;
use crate::resolver::ResolveOptions;
use std::sync::Arc;

/// Transform a single source string
pub fn transform(input: &str, options: &TransformOptions, engine: &dyn Engine) -> TransformResult {
    let log = new_log(options.log_level, options.color, options.error_limit);

    // Convert and validate the options
    let parse_options = ParseOptions {
        target: options.target.into(),
        strict: options.strict.into(),
        mangle_syntax: options.minify_syntax,
        jsx: JsxOptions {
            factory: validate_jsx(&log, &options.jsx_factory, "factory"),
            fragment: validate_jsx(&log, &options.jsx_fragment, "fragment"),
        },
        defines: validate_defines(&log, &options.defines),
        ..Default::default()
    };
    let bundle_options = BundleOptions {
        source_map: options.sourcemap.into(),
        mangle_syntax: options.minify_syntax,
        remove_whitespace: options.minify_whitespace,
        minify_identifiers: options.minify_identifiers,
        abs_output_file: format!("{}-out", options.sourcefile),
        stdin: Some(StdinInfo {
            loader: options.loader.into(),
            contents: input.to_string(),
            source_file: options.sourcefile.clone(),
        }),
        ..Default::default()
    };

    check_transform_options(&log, &bundle_options);

    let mut results = Vec::new();

    // Stop now if there were errors
    if !log.has_errors() {
        let fs: Arc<dyn FileSystem> =
            Arc::new(MockFs::new([(options.sourcefile.as_str(), input)]));
        let resolver = engine.new_resolver(Arc::clone(&fs), &log, ResolveOptions::default());
        let bundle = engine.scan_bundle(
            &log,
            fs,
            resolver,
            std::slice::from_ref(&options.sourcefile),
            &parse_options,
            &bundle_options,
        );

        if !log.has_errors() {
            results = bundle.compile(&log, &bundle_options);
        }
    }

    let (js, js_source_map) = unpack_results(results);

    let msgs = log.done();
    TransformResult {
        errors: messages_of_kind(MsgKind::Error, &msgs),
        warnings: messages_of_kind(MsgKind::Warning, &msgs),
        js,
        js_source_map,
    }
}

/// Split compiled output into code and source map.
///
/// One file is code only. Two files are paired by the `X` / `X.map` naming
/// convention, in either order. Anything else yields nothing.
fn unpack_results(results: Vec<OutputFile>) -> (Vec<u8>, Vec<u8>) {
    let mut results = results.into_iter();
    match (results.next(), results.next(), results.next()) {
        (Some(js), None, None) => (js.contents, Vec::new()),
        (Some(a), Some(b), None) if a.abs_path == format!("{}.map", b.abs_path) => {
            (b.contents, a.contents)
        }
        (Some(a), Some(b), None) if format!("{}.map", a.abs_path) == b.abs_path => {
            (a.contents, b.contents)
        }
        _ => (Vec::new(), Vec::new()),
    }
}
