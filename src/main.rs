//! viper-bundle - command line front end
//!
//! `build` bundles entry points from disk, `transform` rewrites stdin to
//! stdout. Diagnostics are printed to stderr by the log as they happen.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use viper_bundle::api::config::{load_build_options, load_transform_options, parse_key_value};
use viper_bundle::api::{
    BuildOptions, Format, Loader, LogLevel, Platform, SourceMap, StderrColor, Target,
    TransformOptions,
};
use viper_bundle::error::ConfigResult;
use viper_bundle::{TranspileEngine, build, transform};

#[derive(Parser)]
#[command(name = "viper-bundle")]
#[command(author, version, about = "Validate options and drive a JavaScript/TypeScript bundler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build entry points from disk
    Build {
        /// Entry point file(s)
        entry_points: Vec<String>,
        /// Write a single output file
        #[arg(long)]
        outfile: Option<String>,
        /// Write output files into this directory
        #[arg(long)]
        outdir: Option<String>,
        /// Write build metadata to this file
        #[arg(long)]
        metafile: Option<String>,
        /// Bundle imports into the output
        #[arg(long)]
        bundle: bool,
        /// Share code between entry points (esm only)
        #[arg(long)]
        splitting: bool,
        /// Output format (iife, cjs, esm)
        #[arg(long)]
        format: Option<Format>,
        /// Platform (browser, node)
        #[arg(long)]
        platform: Option<Platform>,
        /// Leave this module as an import
        #[arg(long = "external")]
        externals: Vec<String>,
        /// Use a loader for an extension (.ext=loader)
        #[arg(long = "loader", value_parser = parse_loader)]
        loaders: Vec<(String, Loader)>,
        /// Extensions to try, in order (comma separated)
        #[arg(long, value_delimiter = ',')]
        resolve_extensions: Vec<String>,
        /// Global name for iife output
        #[arg(long)]
        global_name: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Transform source from stdin and print the result
    Transform {
        /// Loader for the input (js, jsx, ts, tsx, ...)
        #[arg(long)]
        loader: Option<Loader>,
        /// File name recorded in the source map
        #[arg(long)]
        sourcefile: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Flags shared by both commands
#[derive(Args)]
struct CommonArgs {
    /// Load options from a JSON file; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Language target (es2015 ... es2020, esnext)
    #[arg(long)]
    target: Option<Target>,
    /// Emit a source map (linked, inline, external)
    #[arg(long, num_args = 0..=1, default_missing_value = "linked")]
    sourcemap: Option<SourceMap>,
    /// Substitute a global (KEY=VALUE)
    #[arg(long = "define", value_parser = parse_key_value)]
    defines: Vec<(String, String)>,
    /// Turn on every minification
    #[arg(long)]
    minify: bool,
    #[arg(long)]
    minify_whitespace: bool,
    #[arg(long)]
    minify_identifiers: bool,
    #[arg(long)]
    minify_syntax: bool,
    /// JSX factory (e.g. React.createElement)
    #[arg(long)]
    jsx_factory: Option<String>,
    /// JSX fragment (e.g. React.Fragment)
    #[arg(long)]
    jsx_fragment: Option<String>,
    /// Keep exact `document.all` semantics when lowering `??`
    #[arg(long)]
    strict_nullish_coalescing: bool,
    /// Lower class fields with define semantics instead of assignment
    #[arg(long)]
    strict_class_fields: bool,
    /// Minimum level printed (info, warning, error, silent)
    #[arg(long)]
    log_level: Option<LogLevel>,
    /// Colored diagnostics (auto, always, never)
    #[arg(long)]
    color: Option<StderrColor>,
    /// Stop printing errors after this many, 0 for no limit
    #[arg(long)]
    error_limit: Option<usize>,
}

fn parse_loader(arg: &str) -> ConfigResult<(String, Loader)> {
    let (extension, loader) = parse_key_value(arg)?;
    Ok((extension, loader.parse::<Loader>()?))
}

/// Apply the shared flags over options loaded from a config file
macro_rules! apply_common {
    ($options:expr, $common:expr) => {{
        let options = &mut $options;
        let common = $common;
        if let Some(target) = common.target {
            options.target = target;
        }
        if let Some(sourcemap) = common.sourcemap {
            options.sourcemap = sourcemap;
        }
        options.defines.extend(common.defines);
        options.minify_whitespace |= common.minify || common.minify_whitespace;
        options.minify_identifiers |= common.minify || common.minify_identifiers;
        options.minify_syntax |= common.minify || common.minify_syntax;
        if let Some(factory) = common.jsx_factory {
            options.jsx_factory = factory;
        }
        if let Some(fragment) = common.jsx_fragment {
            options.jsx_fragment = fragment;
        }
        options.strict.nullish_coalescing |= common.strict_nullish_coalescing;
        options.strict.class_fields |= common.strict_class_fields;
        if let Some(log_level) = common.log_level {
            options.log_level = log_level;
        }
        if let Some(color) = common.color {
            options.color = color;
        }
        if let Some(error_limit) = common.error_limit {
            options.error_limit = error_limit;
        }
    }};
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            entry_points,
            outfile,
            outdir,
            metafile,
            bundle,
            splitting,
            format,
            platform,
            externals,
            loaders,
            resolve_extensions,
            global_name,
            common,
        } => {
            let mut options = match &common.config {
                Some(path) => load_build_options(path).into_diagnostic()?,
                None => BuildOptions::default(),
            };
            apply_common!(options, common);

            options.entry_points.extend(entry_points);
            options.outfile = outfile.unwrap_or(options.outfile);
            options.outdir = outdir.unwrap_or(options.outdir);
            options.metafile = metafile.unwrap_or(options.metafile);
            options.bundle |= bundle;
            options.splitting |= splitting;
            options.format = format.unwrap_or(options.format);
            options.platform = platform.unwrap_or(options.platform);
            options.externals.extend(externals);
            options.loaders.extend(loaders);
            if !resolve_extensions.is_empty() {
                options.resolve_extensions = Some(resolve_extensions);
            }
            options.global_name = global_name.unwrap_or(options.global_name);

            run_build(&options)
        }
        Commands::Transform {
            loader,
            sourcefile,
            common,
        } => {
            let mut options = match &common.config {
                Some(path) => load_transform_options(path).into_diagnostic()?,
                None => TransformOptions::default(),
            };
            apply_common!(options, common);

            options.loader = loader.unwrap_or(options.loader);
            options.sourcefile = sourcefile.unwrap_or(options.sourcefile);

            run_transform(&options)
        }
    }
}

/// Build and write every artifact
fn run_build(options: &BuildOptions) -> Result<()> {
    let result = build(options, &TranspileEngine::new());
    if !result.errors.is_empty() {
        std::process::exit(1);
    }

    // Without an output path the single artifact goes to stdout
    if options.outfile.is_empty() && options.outdir.is_empty() {
        let mut stdout = std::io::stdout().lock();
        for file in &result.output_files {
            stdout.write_all(&file.contents).into_diagnostic()?;
        }
        return Ok(());
    }

    for file in &result.output_files {
        write_file(Path::new(&file.path), &file.contents)?;
        if options.log_level == LogLevel::Info {
            eprintln!(
                "{} {} ({} bytes)",
                "Wrote".green(),
                file.path,
                file.contents.len()
            );
        }
    }

    Ok(())
}

/// Transform stdin to stdout, writing the map next to the source file
fn run_transform(options: &TransformOptions) -> Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .into_diagnostic()?;

    let result = transform(&input, options, &TranspileEngine::new());
    if !result.errors.is_empty() {
        std::process::exit(1);
    }

    std::io::stdout().write_all(&result.js).into_diagnostic()?;

    if !result.js_source_map.is_empty() && !options.sourcefile.is_empty() {
        let map_path = format!("{}.map", options.sourcefile);
        write_file(Path::new(&map_path), &result.js_source_map)?;
    }

    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    std::fs::write(path, contents).into_diagnostic()?;
    Ok(())
}

