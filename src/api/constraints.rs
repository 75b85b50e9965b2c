//! Cross-option legality checks and derived defaults
//!
//! Runs after every option has been translated. Every rule is evaluated and
//! each records at most one error, so a single pass reports as many problems
//! as possible. The orchestrators skip the engine if the log holds any error
//! afterwards.

use crate::engine::{BundleOptions, Format, Loader, Platform, SourceMap};
use crate::fs::FileSystem;
use crate::logging::Log;
use crate::resolver::ResolveOptions;

/// Check a build's options and fill in the output directory and format.
pub fn check_build_options(
    log: &Log,
    fs: &dyn FileSystem,
    entry_count: usize,
    bundle: &mut BundleOptions,
    resolve: &ResolveOptions,
) {
    let has_file = !bundle.abs_output_file.is_empty();
    let has_dir = !bundle.abs_output_dir.is_empty();

    if !has_dir && entry_count > 1 {
        log.add_error("Must use \"outdir\" when there are multiple input files");
    }
    if !has_dir && bundle.code_splitting {
        log.add_error("Must use \"outdir\" when code splitting is enabled");
    }
    if has_file && has_dir {
        log.add_error("Cannot use both \"outfile\" and \"outdir\"");
    }

    if has_file && !has_dir {
        bundle.abs_output_dir = fs.dir(&bundle.abs_output_file);
    } else if !has_file && !has_dir {
        // Output goes to stdout, so nothing else can be written
        if !matches!(bundle.source_map, SourceMap::None | SourceMap::Inline) {
            log.add_error("Cannot use an external source map without an output path");
        }
        if !bundle.abs_metadata_file.is_empty() {
            log.add_error("Cannot use \"metafile\" without an output path");
        }
        if bundle
            .extension_to_loader
            .values()
            .any(|loader| *loader == Loader::File)
        {
            log.add_error("Cannot use the \"file\" loader without an output path");
        }
    }

    if !bundle.is_bundling {
        if bundle.output_format != Format::Preserve {
            log.add_error("Cannot use \"format\" without \"bundle\"");
        }
        if !resolve.external_modules.is_empty() {
            log.add_error("Cannot use \"external\" without \"bundle\"");
        }
    } else if bundle.output_format == Format::Preserve {
        bundle.output_format = match resolve.platform {
            Platform::Browser => Format::Iife,
            Platform::Node => Format::CommonJs,
        };
    }

    if bundle.code_splitting && bundle.output_format != Format::EsModule {
        log.add_error("Splitting currently only works with the \"esm\" format");
    }
}

/// Check a transform's options. There is no output file to link a source
/// map from, and the map needs a file name to refer to.
pub fn check_transform_options(log: &Log, bundle: &BundleOptions) {
    if bundle.source_map == SourceMap::LinkedWithComment {
        log.add_error("Cannot transform with linked source maps");
    }

    let has_source_file = bundle
        .stdin
        .as_ref()
        .is_some_and(|stdin| !stdin.source_file.is_empty());
    if bundle.source_map != SourceMap::None && !has_source_file {
        log.add_error("Must use \"sourcefile\" with \"sourcemap\" to set the original file name");
    }
}
