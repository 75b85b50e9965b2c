//! Per-file engine built on OXC
//!
//! Every entry point is parsed, lowered to the target and printed on its
//! own. Imports are left as they are, so this is a transpiler rather than a
//! bundler: the module graph is never linked.

use super::{Bundle, BundleOptions, Engine, Format, Loader, ParseOptions, SourceMap};
use crate::fs::FileSystem;
use crate::logging::{Log, Source};
use crate::resolver::{ModuleResolver, ResolveOptions, Resolved, Resolver};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::{SourceType, Span};
use oxc_transformer::{JsxRuntime, TransformOptions, Transformer};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Output path used when there is nowhere to write
const STDOUT_PATH: &str = "<stdout>";

/// Engine that transpiles each entry point independently
#[derive(Debug, Clone, Copy, Default)]
pub struct TranspileEngine;

impl TranspileEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for TranspileEngine {
    fn new_resolver(
        &self,
        _fs: Arc<dyn FileSystem>,
        _log: &Log,
        options: ResolveOptions,
    ) -> Box<dyn Resolver> {
        Box::new(ModuleResolver::new(&options))
    }

    fn scan_bundle(
        &self,
        log: &Log,
        fs: Arc<dyn FileSystem>,
        resolver: Box<dyn Resolver>,
        entry_paths: &[String],
        parse_options: &ParseOptions,
        bundle_options: &BundleOptions,
    ) -> Box<dyn Bundle> {
        warn_ignored_options(log, parse_options, bundle_options);

        let mut modules = Vec::with_capacity(entry_paths.len());

        for (index, entry) in entry_paths.iter().enumerate() {
            let Some((path, contents, loader)) =
                load_entry(log, &*fs, &*resolver, entry, bundle_options)
            else {
                continue;
            };

            let source = Arc::new(Source {
                index: index as u32,
                key_path: path.clone(),
                pretty_path: entry.clone(),
                contents,
            });

            if let Some(code) = transpile(log, &source, loader, parse_options, bundle_options) {
                modules.push(TranspiledModule { path, code });
            }
        }

        Box::new(TranspiledBundle { modules })
    }
}

/// Record a warning for every option this engine accepts but can't honor
fn warn_ignored_options(
    log: &Log,
    parse_options: &ParseOptions,
    bundle_options: &BundleOptions,
) {
    let mut ignored = Vec::new();
    if parse_options.defines.as_ref().is_some_and(|defines| !defines.is_empty()) {
        ignored.push("define");
    }
    if parse_options.mangle_syntax {
        ignored.push("minify-syntax");
    }
    if bundle_options.minify_identifiers {
        ignored.push("minify-identifiers");
    }

    for option in ignored {
        log.add_warning(format!("The transpile engine ignores the {:?} option", option));
    }
}

/// Find an entry point's contents and the loader that applies to it
fn load_entry(
    log: &Log,
    fs: &dyn FileSystem,
    resolver: &dyn Resolver,
    entry: &str,
    options: &BundleOptions,
) -> Option<(String, String, Loader)> {
    if let Some(stdin) = &options.stdin {
        return Some((entry.to_string(), stdin.contents.clone(), stdin.loader));
    }

    let path = match resolver.resolve(&fs.dir(entry), entry) {
        Some(Resolved::Path(path)) => path,
        Some(Resolved::External(_)) | None => {
            log.add_error(format!("Could not resolve {:?}", entry));
            return None;
        }
    };

    let Some(contents) = fs.read_file(&path) else {
        log.add_error(format!("Could not read from file: {}", path));
        return None;
    };

    let extension = extension_of(&path);
    let Some(loader) = options.extension_to_loader.get(extension).copied() else {
        log.add_error(format!(
            "No loader is configured for {:?} files: {}",
            extension, path
        ));
        return None;
    };

    Some((path, contents, loader))
}

/// Extension of the file name, including the dot
fn extension_of(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(dot) => &name[dot..],
    }
}

/// Parse, lower and print one module
fn transpile(
    log: &Log,
    source: &Arc<Source>,
    loader: Loader,
    parse_options: &ParseOptions,
    bundle_options: &BundleOptions,
) -> Option<String> {
    if !matches!(loader, Loader::Js | Loader::Jsx | Loader::Ts | Loader::Tsx) {
        log.add_error(format!(
            "The transpile engine does not support the {:?} loader",
            loader.to_string()
        ));
        return None;
    }

    // Create allocator for AST nodes
    let allocator = Allocator::default();

    // Determine source type from the loader
    let file_name = format!("input.{}", loader);
    let Ok(source_type) = SourceType::from_path(&file_name) else {
        log.add_error(format!("Unknown file extension: {}", file_name));
        return None;
    };

    // Parse, reporting every error at its label
    let parser_return = Parser::new(&allocator, &source.contents, source_type).parse();
    if !parser_return.errors.is_empty() {
        for error in &parser_return.errors {
            let span = error
                .labels
                .as_ref()
                .and_then(|labels| labels.first())
                .map(|label| {
                    let start = label.offset() as u32;
                    Span::new(start, start + label.len() as u32)
                })
                .unwrap_or(Span::new(0, 0));
            log.add_error_with_source(source, span, error.message.to_string());
        }
        return None;
    }

    let mut program = parser_return.program;

    // Build semantic analysis to get scoping information
    let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();

    // Lowering follows the target, strictness and JSX pragma
    let target = parse_options.target.as_str();
    let mut transform_options = match TransformOptions::from_target(target) {
        Ok(options) => options,
        Err(err) => {
            log.add_error(err);
            return None;
        }
    };
    transform_options.assumptions.no_document_all = !parse_options.strict.nullish_coalescing;
    transform_options.assumptions.set_public_class_fields = !parse_options.strict.class_fields;

    transform_options.jsx.jsx_plugin = true;
    transform_options.jsx.runtime = JsxRuntime::Classic;
    if let Some(factory) = &parse_options.jsx.factory {
        transform_options.jsx.pragma = Some(factory.join(".").into());
    }
    if let Some(fragment) = &parse_options.jsx.fragment {
        transform_options.jsx.pragma_frag = Some(fragment.join(".").into());
    }

    // Transform TypeScript and JSX down to the target
    let transformer_return =
        Transformer::new(&allocator, Path::new(&file_name), &transform_options)
            .build_with_scoping(scoping, &mut program);
    if !transformer_return.errors.is_empty() {
        for error in &transformer_return.errors {
            log.add_error_with_source(source, Span::new(0, 0), error.message.to_string());
        }
        return None;
    }

    // Generate JavaScript code from the transformed AST
    let codegen_options = CodegenOptions {
        minify: bundle_options.remove_whitespace,
        ..Default::default()
    };
    Some(Codegen::new().with_options(codegen_options).build(&program).code)
}

struct TranspiledModule {
    path: String,
    code: String,
}

struct TranspiledBundle {
    modules: Vec<TranspiledModule>,
}

impl TranspiledBundle {
    fn output_path(module: &TranspiledModule, options: &BundleOptions) -> String {
        if !options.abs_output_file.is_empty() {
            return options.abs_output_file.clone();
        }
        if options.abs_output_dir.is_empty() {
            return STDOUT_PATH.to_string();
        }

        let stem = Path::new(&module.path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("out");
        format!("{}/{}.js", options.abs_output_dir.trim_end_matches('/'), stem)
    }
}

impl Bundle for TranspiledBundle {
    fn compile(&self, log: &Log, options: &BundleOptions) -> Vec<super::OutputFile> {
        if options.source_map != SourceMap::None {
            log.add_warning("Source maps are not generated by the transpile engine");
        }

        let mut seen = HashSet::new();
        let mut outputs = Vec::with_capacity(self.modules.len());
        for module in &self.modules {
            let abs_path = Self::output_path(module, options);
            if !seen.insert(abs_path.clone()) {
                log.add_error(format!(
                    "Two output files share the same path: {} (from {})",
                    abs_path, module.path
                ));
                continue;
            }

            let code = match options.output_format {
                Format::Iife => format!("(() => {{\n{}}})();\n", module.code),
                _ => module.code.clone(),
            };
            outputs.push(super::OutputFile {
                abs_path,
                contents: code.into_bytes(),
            });
        }
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{JsxOptions, StdinInfo};
    use crate::fs::{MockFs, RealFs};
    use crate::logging::MsgKind;

    fn stdin_options(loader: Loader, contents: &str) -> BundleOptions {
        BundleOptions {
            abs_output_file: "in-out".to_string(),
            stdin: Some(StdinInfo {
                loader,
                contents: contents.to_string(),
                source_file: "in".to_string(),
            }),
            ..Default::default()
        }
    }

    fn run(
        log: &Log,
        fs: Arc<dyn FileSystem>,
        entries: &[String],
        parse_options: &ParseOptions,
        bundle_options: &BundleOptions,
    ) -> Vec<crate::engine::OutputFile> {
        let engine = TranspileEngine::new();
        let resolver = engine.new_resolver(Arc::clone(&fs), log, ResolveOptions {
            extension_order: vec![".ts".to_string(), ".js".to_string()],
            ..Default::default()
        });
        let bundle = engine.scan_bundle(log, fs, resolver, entries, parse_options, bundle_options);
        bundle.compile(log, bundle_options)
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("/src/app.tsx"), ".tsx");
        assert_eq!(extension_of("/src/a.b/file"), "");
        assert_eq!(extension_of("/src/.hidden"), "");
        assert_eq!(extension_of("C:\\src\\main.ts"), ".ts");
    }

    #[test]
    fn test_strips_types_from_stdin() {
        let log = Log::new_defer_log();
        let options = stdin_options(Loader::Ts, "const message: string = \"hi\";\n");
        let outputs = run(
            &log,
            Arc::new(MockFs::default()),
            &["in".to_string()],
            &ParseOptions::default(),
            &options,
        );

        assert!(!log.has_errors());
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].abs_path, "in-out");
        let code = String::from_utf8(outputs[0].contents.clone()).unwrap();
        assert!(code.contains("\"hi\""));
        assert!(!code.contains(": string"));
    }

    #[test]
    fn test_classic_jsx_pragma() {
        let log = Log::new_defer_log();
        let parse_options = ParseOptions {
            jsx: JsxOptions {
                factory: Some(vec!["h".to_string()]),
                fragment: Some(vec!["Fragment".to_string()]),
            },
            ..Default::default()
        };
        let options = stdin_options(Loader::Jsx, "const el = <div>Hello</div>;\n");
        let outputs = run(
            &log,
            Arc::new(MockFs::default()),
            &["in".to_string()],
            &parse_options,
            &options,
        );

        assert!(!log.has_errors());
        let code = String::from_utf8(outputs[0].contents.clone()).unwrap();
        assert!(code.contains("h("));
    }

    #[test]
    fn test_parse_errors_are_positioned() {
        let log = Log::new_defer_log();
        let options = stdin_options(Loader::Ts, "let x = ;\n");
        let outputs = run(
            &log,
            Arc::new(MockFs::default()),
            &["in".to_string()],
            &ParseOptions::default(),
            &options,
        );

        assert!(outputs.is_empty());
        let msgs = log.done();
        assert!(!msgs.is_empty());
        assert!(msgs.iter().all(|m| m.kind == MsgKind::Error));
        assert_eq!(msgs[0].source.as_ref().unwrap().pretty_path, "in");
    }

    #[test]
    fn test_unsupported_loader() {
        let log = Log::new_defer_log();
        let options = stdin_options(Loader::Json, "{}");
        run(
            &log,
            Arc::new(MockFs::default()),
            &["in".to_string()],
            &ParseOptions::default(),
            &options,
        );

        let texts: Vec<_> = log.done().into_iter().map(|m| m.text).collect();
        assert_eq!(
            texts,
            vec!["The transpile engine does not support the \"json\" loader"]
        );
    }

    #[test]
    fn test_iife_wrapper_and_source_map_warning() {
        let log = Log::new_defer_log();
        let options = BundleOptions {
            output_format: Format::Iife,
            source_map: SourceMap::Inline,
            ..stdin_options(Loader::Js, "console.log(1);\n")
        };
        let outputs = run(
            &log,
            Arc::new(MockFs::default()),
            &["in".to_string()],
            &ParseOptions::default(),
            &options,
        );

        let code = String::from_utf8(outputs[0].contents.clone()).unwrap();
        assert!(code.starts_with("(() => {\n"));
        assert!(code.ends_with("})();\n"));
        assert_eq!(log.warning_count(), 1);
        assert!(!log.has_errors());
    }

    #[test]
    fn test_files_resolved_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.ts"), "export const n: number = 1;\n").unwrap();
        let root = dir.path().to_str().unwrap().to_string();

        let log = Log::new_defer_log();
        let options = BundleOptions {
            abs_output_dir: format!("{}/out", root),
            ..Default::default()
        };
        let outputs = run(
            &log,
            Arc::new(RealFs::new()),
            &[format!("{}/main.ts", root), format!("{}/missing.ts", root)],
            &ParseOptions::default(),
            &options,
        );

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].abs_path, format!("{}/out/main.js", root));
        let texts: Vec<_> = log.done().into_iter().map(|m| m.text).collect();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("Could not resolve"));
    }

    #[test]
    fn test_stdout_path_without_outputs() {
        let module = TranspiledModule {
            path: "/src/a.ts".to_string(),
            code: String::new(),
        };
        assert_eq!(
            TranspiledBundle::output_path(&module, &BundleOptions::default()),
            "<stdout>"
        );
    }

    #[test]
    fn test_unsupported_options_are_reported() {
        let options = crate::api::TransformOptions {
            log_level: crate::api::LogLevel::Silent,
            defines: [("DEBUG".to_string(), "false".to_string())].into(),
            minify_identifiers: true,
            minify_syntax: true,
            ..Default::default()
        };
        let source = "if (DEBUG) { let longName = 1; console.log(longName); }\n";

        let result = crate::api::transform(source, &options, &TranspileEngine::new());
        assert!(result.errors.is_empty());
        let warnings: Vec<_> = result.warnings.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            warnings,
            vec![
                "The transpile engine ignores the \"define\" option",
                "The transpile engine ignores the \"minify-syntax\" option",
                "The transpile engine ignores the \"minify-identifiers\" option",
            ]
        );
        let code = String::from_utf8(result.js).unwrap();
        assert!(code.contains("longName"));
    }

    #[test]
    fn test_no_warnings_without_unsupported_options() {
        let log = Log::new_defer_log();
        let options = stdin_options(Loader::Js, "let a = 1;\n");
        run(
            &log,
            Arc::new(MockFs::default()),
            &["in".to_string()],
            &ParseOptions::default(),
            &options,
        );
        assert_eq!(log.warning_count(), 0);
    }

    #[test]
    fn test_entries_with_the_same_stem_clash() {
        let bundle = TranspiledBundle {
            modules: vec![
                TranspiledModule {
                    path: "/src/a/index.ts".to_string(),
                    code: "a;\n".to_string(),
                },
                TranspiledModule {
                    path: "/src/b/index.ts".to_string(),
                    code: "b;\n".to_string(),
                },
                TranspiledModule {
                    path: "/src/main.ts".to_string(),
                    code: "main;\n".to_string(),
                },
            ],
        };
        let options = BundleOptions {
            abs_output_dir: "/out".to_string(),
            ..Default::default()
        };

        let log = Log::new_defer_log();
        let outputs = bundle.compile(&log, &options);
        let paths: Vec<_> = outputs.iter().map(|o| o.abs_path.as_str()).collect();
        assert_eq!(paths, vec!["/out/index.js", "/out/main.js"]);
        assert_eq!(outputs[0].contents, b"a;\n");

        let texts: Vec<_> = log.done().into_iter().map(|m| m.text).collect();
        assert_eq!(
            texts,
            vec!["Two output files share the same path: /out/index.js (from /src/b/index.ts)"]
        );
    }
}
