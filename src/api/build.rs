//! File-based build entry point

use super::constraints::check_build_options;
use super::defines::validate_defines;
use super::messages::messages_of_kind;
use super::validate::{
    validate_externals, validate_jsx, validate_loaders, validate_path, validate_resolve_extensions,
};
use super::{BuildOptions, BuildResult, OutputFile, new_log};
use crate::engine::{BundleOptions, Engine, JsxOptions, ParseOptions};
use crate::fs::{FileSystem, RealFs};
use crate::logging::MsgKind;
use crate::resolver::ResolveOptions;
use std::sync::Arc;

/// Build the given entry points against the real filesystem
pub fn build(options: &BuildOptions, engine: &dyn Engine) -> BuildResult {
    build_with_fs(options, Arc::new(RealFs::new()), engine)
}

/// Build the given entry points against `fs`
pub fn build_with_fs(
    options: &BuildOptions,
    fs: Arc<dyn FileSystem>,
    engine: &dyn Engine,
) -> BuildResult {
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
        platform: options.platform.into(),
        is_bundling: options.bundle,
    };
    let mut bundle_options = BundleOptions {
        source_map: options.sourcemap.into(),
        mangle_syntax: options.minify_syntax,
        remove_whitespace: options.minify_whitespace,
        minify_identifiers: options.minify_identifiers,
        module_name: options.global_name.clone(),
        is_bundling: options.bundle,
        code_splitting: options.splitting,
        output_format: options.format.into(),
        abs_output_file: validate_path(&log, fs.as_ref(), &options.outfile),
        abs_output_dir: validate_path(&log, fs.as_ref(), &options.outdir),
        abs_metadata_file: validate_path(&log, fs.as_ref(), &options.metafile),
        extension_to_loader: validate_loaders(&log, &options.loaders),
        stdin: None,
    };
    let resolve_options = ResolveOptions {
        platform: options.platform.into(),
        extension_order: validate_resolve_extensions(&log, options.resolve_extensions.as_deref()),
        external_modules: validate_externals(&log, &options.externals),
    };
    let entry_paths: Vec<String> = options
        .entry_points
        .iter()
        .map(|entry_point| validate_path(&log, fs.as_ref(), entry_point))
        .collect();

    check_build_options(
        &log,
        fs.as_ref(),
        entry_paths.len(),
        &mut bundle_options,
        &resolve_options,
    );

    let mut output_files = Vec::new();

    // Stop now if there were errors
    if !log.has_errors() {
        let resolver = engine.new_resolver(Arc::clone(&fs), &log, resolve_options);
        let bundle = engine.scan_bundle(
            &log,
            Arc::clone(&fs),
            resolver,
            &entry_paths,
            &parse_options,
            &bundle_options,
        );

        if !log.has_errors() {
            output_files = bundle
                .compile(&log, &bundle_options)
                .into_iter()
                .map(|file| OutputFile {
                    path: file.abs_path,
                    contents: file.contents,
                })
                .collect();
        }
    }

    let msgs = log.done();
    BuildResult {
        errors: messages_of_kind(MsgKind::Error, &msgs),
        warnings: messages_of_kind(MsgKind::Warning, &msgs),
        output_files,
    }
}
