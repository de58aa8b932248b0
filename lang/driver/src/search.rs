use std::path::{Path, PathBuf};

/// Environment variable holding the global module search path.
pub const GLAS_PATH: &str = "GLAS_PATH";

/// Splits a search-path string on `;` into directories, skipping empty
/// segments.
pub fn split_search_path(raw: &str) -> Vec<PathBuf> {
    raw.split(';').filter(|seg| !seg.is_empty()).map(PathBuf::from).collect()
}

/// The directories named by `GLAS_PATH`, in order.
pub fn env_search_path() -> Vec<PathBuf> {
    match std::env::var(GLAS_PATH) {
        | Ok(raw) => split_search_path(&raw),
        | Err(_) => Vec::new(),
    }
}

/// The filename base: everything before the first `.`.
pub fn file_base(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    Some(name.split('.').next().unwrap_or(name))
}

/// Extensions after the first `.`, e.g. `foo.x.g0` yields `["x", "g0"]`.
/// The loader folds compilers over this chain right to left.
pub fn extension_chain(path: &Path) -> Vec<String> {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    name.split('.').skip(1).filter(|seg| !seg.is_empty()).map(str::to_owned).collect()
}

/* --------------------------------- Search --------------------------------- */

/// Outcome of scanning the search path for a module name.
pub enum Found {
    Hit(PathBuf),
    /// Several files in the winning directory claim the name.
    Ambiguous(Vec<PathBuf>),
    Missing,
}

/// Scans directories in order and resolves the first one that offers the
/// module: files in `dir` whose base is `name`, plus files in `dir/name/`
/// whose base is the literal `public`.
pub fn find_module(name: &str, dirs: &[PathBuf]) -> Found {
    for dir in dirs {
        let mut hits = files_with_base(dir, name);
        hits.extend(files_with_base(&dir.join(name), "public"));
        match hits.len() {
            | 0 => continue,
            | 1 => return Found::Hit(hits.remove(0)),
            | _ => return Found::Ambiguous(hits),
        }
    }
    Found::Missing
}

/// Directory listings come back sorted so ambiguity reports are
/// deterministic; unreadable directories count as empty.
fn files_with_base(dir: &Path, base: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out: Vec<PathBuf> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            (path.is_file() && file_base(&path) == Some(base)).then_some(path)
        })
        .collect();
    out.sort();
    out
}
