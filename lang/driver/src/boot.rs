use crate::err::{BootError, Result};
use crate::load::{compiler_contract, Compiler, Loader};
use crate::search::{find_module, Found};
use glas_runtime::Effects;
use glas_value::Value;
use std::path::PathBuf;

const BASE_MODULE: &str = "language-g0";

/// Self-hosts the g0 compiler: the built-in compiles `language-g0` from
/// source, the result recompiles itself, and the second and third
/// generations must agree structurally. The surviving loader compiles all
/// further modules through the self-hosted pipeline.
///
/// Only the given search path is consulted, never the working directory:
/// the base language cannot be shadowed by a local file.
pub fn bootstrap(
    builtin: Compiler, search: Vec<PathBuf>, eff: &mut dyn Effects,
) -> Result<Loader> {
    let fp = match find_module(BASE_MODULE, &search) {
        | Found::Hit(fp) => fp,
        | Found::Ambiguous(hits) => {
            return Err(BootError::AmbiguousBase(BASE_MODULE.to_string(), hits))
        }
        | Found::Missing => return Err(BootError::MissingBase(BASE_MODULE.to_string())),
    };

    let (_p0, c0) = generation(builtin, &search, &fp, eff)?;
    let (p1, c1) = generation(c0, &search, &fp, eff)?;
    let mut fixed = Loader::new(c1, search);
    let p2 = fixed.load_file(&fp, eff).ok_or_else(|| BootError::CompileFailed(fp.clone()))?;
    if p1 != p2 {
        return Err(BootError::Diverged(fp));
    }
    log::info!("bootstrap of `{}` reached its fixed point", fp.display());
    Ok(fixed)
}

/// One bootstrap stage: a fresh loader around the given g0 compiles the
/// base module and the artifact must satisfy the compiler contract.
fn generation(
    g0: Compiler, search: &[PathBuf], fp: &PathBuf, eff: &mut dyn Effects,
) -> Result<(Value, Compiler)> {
    let mut loader = Loader::new(g0, search.to_vec());
    let artifact =
        loader.load_file(fp, eff).ok_or_else(|| BootError::CompileFailed(fp.clone()))?;
    let compiler =
        compiler_contract(&artifact).ok_or_else(|| BootError::BadContract(fp.clone()))?;
    Ok((artifact, compiler))
}
