//! The module loader and bootstrap driver of the glas runtime.
//!
//! Modules are files resolved on a search path and folded through one
//! compiler per filename extension; compilers are themselves programs the
//! evaluator runs. The base-language compiler is self-hosted through a
//! two-stage bootstrap with a fixed-point check.

/// Search-path scanning and filename conventions.
pub mod search;
pub use search::{env_search_path, find_module, Found, GLAS_PATH};
/// The loader: caching, cycle detection, compiler pipelines.
pub mod load;
pub use load::{compiler_contract, Compiler, Loader, LoaderEff};
/// The self-hosting bootstrap of the g0 compiler.
pub mod boot;
pub use boot::bootstrap;
/// Host errors at the bootstrap boundary.
pub mod err;
pub use err::{BootError, Result};
