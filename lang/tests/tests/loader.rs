//! Loader scenarios over committed fixture modules, compiled through the
//! toy g0 notation.

use glas_driver::Loader;
use glas_runtime::LogCollector;
use glas_tests::{fixture_dir, logged, toy_g0};
use glas_value::Value;

fn loader() -> Loader {
    Loader::new(toy_g0(), vec![fixture_dir("loader")])
}

#[test]
fn pipeline_compiles_by_extension() {
    let mut logs = LogCollector::new();
    // "hello" is five bytes; the len language measures its bitstring
    let out = loader().load_module("size", &mut logs);
    assert_eq!(out, Some(Value::nat(40)));
}

#[test]
fn extension_chain_folds_right_to_left() {
    let mut logs = LogCollector::new();
    // "abc" → 24 bits, then the width of the number 24 itself
    let out = loader().load_module("double", &mut logs);
    assert_eq!(out, Some(Value::nat(5)));
}

#[test]
fn cache_returns_verbatim_results() {
    let mut logs = LogCollector::new();
    let mut loader = loader();
    let first = loader.load_module("size", &mut logs);
    let second = loader.load_module("size", &mut logs);
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn public_file_resolves_directory_modules() {
    let mut logs = LogCollector::new();
    let out = loader().load_module("pubmod", &mut logs);
    let artifact = out.expect("pubmod/public.g0 provides the module");
    assert!(artifact.get_path(&glas_value::Bits::of_str("answer")).is_some());
}

#[test]
fn ambiguous_modules_are_refused() {
    let mut logs = LogCollector::new();
    let out = loader().load_module("amb", &mut logs);
    assert_eq!(out, None);
    assert_eq!(logged(&logs, "error", "ambiguous"), 1);
}

#[test]
fn missing_modules_warn() {
    let mut logs = LogCollector::new();
    let out = loader().load_module("no-such-module", &mut logs);
    assert_eq!(out, None);
    assert_eq!(logged(&logs, "warn", "not found"), 1);
}

#[test]
fn import_cycles_are_reported_once() {
    let mut logs = LogCollector::new();
    let mut loader = loader();
    // a imports b imports a: the inner probe reports the rotated cycle
    assert_eq!(loader.load_module("a", &mut logs), None);
    assert_eq!(loaded_cycle_errors(&logs), 1);
    // the failure is cached, so the second load stays quiet
    assert_eq!(loader.load_module("b", &mut logs), None);
    assert_eq!(loaded_cycle_errors(&logs), 1);
}

fn loaded_cycle_errors(logs: &LogCollector) -> usize {
    logged(logs, "error", "cycle")
}

#[test]
fn failures_are_cached_without_retry() {
    let mut logs = LogCollector::new();
    let mut loader = loader();
    assert_eq!(loader.load_module("a", &mut logs), None);
    let reported = logs.messages().len();
    assert_eq!(loader.load_module("a", &mut logs), None);
    // cache hit: no fresh diagnostics beyond the found-file note
    assert_eq!(logged(&logs, "error", "cycle"), 1);
    assert!(logs.messages().len() <= reported + 1);
}
