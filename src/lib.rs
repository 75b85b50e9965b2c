//! Viper Bundle - the option-processing front door of a JavaScript/TypeScript bundler
//!
//! Takes a build or transform request, validates and normalizes every option,
//! drives a pluggable scan/compile [`Engine`](engine::Engine), and reports
//! positioned errors and warnings alongside the produced artifacts:
//! - `api`: public options, validation, cross-option rules, orchestrators
//! - `engine`: internal option records and the engine contract
//! - `logging`: thread-safe diagnostics log
//! - `fs` / `resolver`: filesystem and module resolution seams

pub mod api;
pub mod engine;
pub mod error;
pub mod fs;
pub mod logging;
pub mod resolver;

// Re-export commonly used types
pub use api::{
    BuildOptions, BuildResult, Location, Message, OutputFile, TransformOptions, TransformResult,
    build, build_with_fs, transform,
};
pub use engine::{Bundle, Engine};
#[cfg(feature = "transpile")]
pub use engine::TranspileEngine;
pub use error::{ConfigError, ConfigResult, ContractViolation, ContractResult};
pub use fs::{FileSystem, MockFs, RealFs};
pub use logging::Log;
pub use resolver::{ResolveOptions, Resolved, Resolver};
#[cfg(feature = "transpile")]
pub use resolver::ModuleResolver;
