use crate::search::{extension_chain, find_module, Found};
use glas_runtime::{eval, static_arity, Arity, Effects, Program};
use glas_value::{Bits, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A compiler maps one value to one value, driving further loads through
/// the loader it is handed on each call. Passing the loader explicitly
/// keeps the loader/compiler capability cycle out of the ownership graph.
pub type Compiler = Rc<dyn Fn(&mut Loader, &mut dyn Effects, Value) -> Option<Value>>;

/// The module loader: finds files on the search path, folds them through
/// one compiler per filename extension, caches results, and detects load
/// cycles. All caches are monotonic for the loader's lifetime (the
/// filesystem is treated as constant) and none of them participate in
/// effect transactions.
pub struct Loader {
    search: Vec<PathBuf>,
    /// files currently being loaded, oldest first
    loading: Vec<PathBuf>,
    cache: HashMap<PathBuf, Option<Value>>,
    compilers: HashMap<PathBuf, Option<Compiler>>,
    g0: Compiler,
}

impl Loader {
    pub fn new(g0: Compiler, search: Vec<PathBuf>) -> Self {
        Loader { search, loading: Vec::new(), cache: HashMap::new(), compilers: HashMap::new(), g0 }
    }

    /// A loader with no base language installed: `.g0` files fail to
    /// compile with an error log until an embedder bootstraps one.
    pub fn without_g0(search: Vec<PathBuf>) -> Self {
        let refuse: Compiler = Rc::new(|loader: &mut Loader, eff: &mut dyn Effects, _input| {
            loader.log(eff, "error", "no g0 compiler installed".to_string());
            None
        });
        Loader::new(refuse, search)
    }

    /// The directory module names resolve against first: the home of the
    /// file currently loading, or the working directory at the root.
    fn local_dir(&self) -> PathBuf {
        self.loading
            .last()
            .and_then(|fp| fp.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::with_capacity(self.search.len() + 1);
        dirs.push(self.local_dir());
        dirs.extend(self.search.iter().cloned());
        dirs
    }

    /* -------------------------------- Loading -------------------------------- */

    pub fn load_module(&mut self, name: &str, eff: &mut dyn Effects) -> Option<Value> {
        match find_module(name, &self.search_dirs()) {
            | Found::Hit(fp) => {
                self.log(eff, "info", format!("module `{}` found at `{}`", name, fp.display()));
                self.load_file(&fp, eff)
            }
            | Found::Ambiguous(hits) => {
                self.log(eff, "error", format!("module `{}` is ambiguous: {:?}", name, hits));
                None
            }
            | Found::Missing => {
                self.log(eff, "warn", format!("module `{}` not found", name));
                None
            }
        }
    }

    pub fn load_file(&mut self, path: &Path, eff: &mut dyn Effects) -> Option<Value> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(cached) = self.cache.get(&path) {
            log::debug!("cache hit for `{}`", path.display());
            return cached.clone();
        }
        if self.loading.contains(&path) {
            self.log(eff, "error", format!("module cycle: {}", self.cycle_text(&path)));
            return None;
        }
        self.loading.push(path.clone());
        let artifact = self.compile_file(&path, eff);
        self.loading.pop();
        // failures are cached too: a file is attempted once per loader
        self.cache.insert(path, artifact.clone());
        artifact
    }

    fn compile_file(&mut self, path: &Path, eff: &mut dyn Effects) -> Option<Value> {
        let bytes = match std::fs::read(path) {
            | Ok(bytes) => bytes,
            | Err(error) => {
                self.log(eff, "error", format!("reading `{}`: {}", path.display(), error));
                return None;
            }
        };
        let mut acc = Value::binary(&bytes);
        for suffix in extension_chain(path).iter().rev() {
            let compiler = self.compiler_for(suffix, eff)?;
            acc = match compiler(self, eff, acc) {
                | Some(out) => out,
                | None => {
                    self.log(eff, "error", format!("compiling `{}` failed", path.display()));
                    return None;
                }
            };
        }
        Some(acc)
    }

    /// The cycle rotated to start (and end) at the offending path.
    fn cycle_text(&self, path: &Path) -> String {
        let start = self.loading.iter().position(|fp| fp == path).unwrap_or(0);
        let mut names: Vec<String> =
            self.loading[start..].iter().map(|fp| fp.display().to_string()).collect();
        names.push(path.display().to_string());
        names.join(" -> ")
    }

    /* ------------------------------- Compilers -------------------------------- */

    fn compiler_for(&mut self, suffix: &str, eff: &mut dyn Effects) -> Option<Compiler> {
        if suffix == "g0" {
            return Some(self.g0.clone());
        }
        let module = format!("language-{}", suffix);
        let fp = match find_module(&module, &self.search_dirs()) {
            | Found::Hit(fp) => fp,
            | Found::Ambiguous(hits) => {
                self.log(eff, "error", format!("module `{}` is ambiguous: {:?}", module, hits));
                return None;
            }
            | Found::Missing => {
                self.log(eff, "warn", format!("no language module for `.{}` files", suffix));
                return None;
            }
        };
        let fp = fp.canonicalize().unwrap_or(fp);
        if let Some(cached) = self.compilers.get(&fp) {
            return cached.clone();
        }
        let built = self.build_compiler(&fp, eff);
        self.compilers.insert(fp, built.clone());
        built
    }

    fn build_compiler(&mut self, path: &Path, eff: &mut dyn Effects) -> Option<Compiler> {
        let artifact = self.load_file(path, eff)?;
        match compiler_contract(&artifact) {
            | Some(compiler) => Some(compiler),
            | None => {
                self.log(
                    eff,
                    "error",
                    format!("`{}` does not export a (1,1)-arity `compile` program", path.display()),
                );
                None
            }
        }
    }

    /* -------------------------------- Logging --------------------------------- */

    /// Reports a loader diagnostic through the effect channel, annotated
    /// with the file currently loading. Refusal is fine: diagnostics are
    /// best-effort.
    pub fn log(&self, eff: &mut dyn Effects, level: &str, text: String) {
        let mut record = Value::unit()
            .put_path(&Bits::of_str("lvl"), &Value::sym(level))
            .put_path(&Bits::of_str("text"), &Value::binary(text.as_bytes()));
        record = self.annotate(record);
        let _ = eff.eff(Value::variant("log", &record));
    }

    /// Injects `file:<current loading path>` into a log record.
    fn annotate(&self, record: Value) -> Value {
        match self.loading.last() {
            | Some(fp) => {
                let file = Value::binary(fp.display().to_string().as_bytes());
                record.put_path(&Bits::of_str("file"), &file)
            }
            | None => record,
        }
    }
}

/// Validates the compiler-module contract on an artifact: a record whose
/// `compile` field is a program of static arity (1,1). Wraps the program
/// as a [`Compiler`] evaluated under the loader's effect handler.
pub fn compiler_contract(artifact: &Value) -> Option<Compiler> {
    let field = artifact.get_path(&Bits::of_str("compile"))?;
    let prog = Program::from_value(&field)?;
    if static_arity(&prog) != Some(Arity::new(1, 1)) {
        return None;
    }
    let prog = Rc::new(prog);
    let compiler: Compiler = Rc::new(move |loader: &mut Loader, eff: &mut dyn Effects, input| {
        let mut scoped = LoaderEff { loader, downstream: eff };
        let out = eval(&prog, &mut scoped, im::vector![input])?;
        out.front().cloned()
    });
    Some(compiler)
}

/* ------------------------------ Loader effects ----------------------------- */

/// The handler compiler programs run under: serves `load:<name>` from the
/// loader, stamps `log:<record>` with the loading file, and forwards
/// everything else, transaction frames included, to the downstream
/// handler: loader state is never tentative.
pub struct LoaderEff<'a> {
    pub loader: &'a mut Loader,
    pub downstream: &'a mut dyn Effects,
}

impl Effects for LoaderEff<'_> {
    fn eff(&mut self, request: Value) -> Option<Value> {
        if let Some(name) = request.variant_of("load") {
            let name = name.as_bits().and_then(Bits::to_str)?;
            return self.loader.load_module(&name, self.downstream);
        }
        if let Some(record) = request.variant_of("log") {
            let record = self.loader.annotate(record);
            return self.downstream.eff(Value::variant("log", &record));
        }
        self.downstream.eff(request)
    }
    fn begin(&mut self) {
        self.downstream.begin();
    }
    fn commit(&mut self) {
        self.downstream.commit();
    }
    fn abort(&mut self) {
        self.downstream.abort();
    }
}
