//! Module resolution contract
//!
//! The resolution algorithm itself belongs to the engine. This module defines
//! the options the API hands over, the [`Resolver`] trait the engine consumes,
//! and (with the `transpile` feature) a Node.js-compatible resolver built on
//! `oxc_resolver`.

use crate::engine::Platform;
use std::collections::HashSet;

/// Default order in which extensions are tried for extensionless imports
pub const DEFAULT_EXTENSION_ORDER: &[&str] =
    &[".tsx", ".ts", ".jsx", ".mjs", ".cjs", ".js", ".json"];

/// Options used to construct a resolver
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolveOptions {
    pub platform: Platform,
    /// Extensions to try, in order
    pub extension_order: Vec<String>,
    /// Specifiers left unresolved and kept as imports in the output
    pub external_modules: HashSet<String>,
}

/// Result of resolving an import specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Absolute path of the module file
    Path(String),
    /// The specifier was marked external and stays an import
    External(String),
}

/// Resolves import specifiers to files
pub trait Resolver: Send + Sync {
    fn resolve(&self, source_dir: &str, specifier: &str) -> Option<Resolved>;
}

/// Whether `path` names a file rather than a package.
///
/// Such paths can't be externals since they are never looked up in
/// `node_modules`.
pub fn is_non_module_path(path: &str) -> bool {
    if path.starts_with('/')
        || path.starts_with("./")
        || path.starts_with("../")
        || path == "."
        || path == ".."
    {
        return true;
    }

    // Windows absolute path
    let bytes = path.as_bytes();
    bytes.len() > 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

#[cfg(feature = "transpile")]
pub use oxc::ModuleResolver;

#[cfg(feature = "transpile")]
mod oxc {
    use super::{ResolveOptions, Resolved, Resolver};
    use crate::engine::Platform;
    use oxc_resolver::{ResolveOptions as OxcResolveOptions, Resolver as OxcResolver};
    use std::collections::HashSet;

    /// Node.js/Bun-compatible module resolver
    pub struct ModuleResolver {
        resolver: OxcResolver,
        external_modules: HashSet<String>,
    }

    impl ModuleResolver {
        pub fn new(options: &ResolveOptions) -> Self {
            let (condition_names, main_fields, alias_fields) = match options.platform {
                Platform::Browser => (
                    vec!["browser".into(), "import".into(), "default".into()],
                    vec!["browser".into(), "module".into(), "main".into()],
                    vec![vec!["browser".into()]],
                ),
                Platform::Node => (
                    vec!["node".into(), "import".into(), "require".into(), "default".into()],
                    vec!["module".into(), "main".into()],
                    Vec::new(),
                ),
            };

            let resolver = OxcResolver::new(OxcResolveOptions {
                condition_names,
                extensions: options.extension_order.clone(),
                main_fields,
                alias_fields,
                exports_fields: vec![vec!["exports".into()]],
                imports_fields: vec![vec!["imports".into()]],
                ..OxcResolveOptions::default()
            });

            Self {
                resolver,
                external_modules: options.external_modules.clone(),
            }
        }
    }

    impl Resolver for ModuleResolver {
        fn resolve(&self, source_dir: &str, specifier: &str) -> Option<Resolved> {
            if self.external_modules.contains(specifier) {
                return Some(Resolved::External(specifier.to_string()));
            }

            self.resolver
                .resolve(source_dir, specifier)
                .ok()
                .map(|resolution| Resolved::Path(resolution.path().to_string_lossy().into_owned()))
        }
    }

}
