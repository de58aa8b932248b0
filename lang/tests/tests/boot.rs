//! Bootstrap scenarios: the self-hosted g0 fixed point and its failure
//! modes.

use glas_driver::{bootstrap, BootError};
use glas_runtime::LogCollector;
use glas_tests::{fixture_dir, toy_g0};

#[test]
fn bootstrap_reaches_fixed_point() {
    let mut logs = LogCollector::new();
    // the fixture's compile program is a quine over the op set: every
    // generation reproduces the same artifact
    let loader = bootstrap(toy_g0(), vec![fixture_dir("boot")], &mut logs);
    assert!(loader.is_ok(), "bootstrap failed: {:?}", loader.err());
}

#[test]
fn diverging_compiler_fails_bootstrap() {
    let mut logs = LogCollector::new();
    let out = bootstrap(toy_g0(), vec![fixture_dir("boot-bad")], &mut logs);
    match out {
        | Err(BootError::Diverged(fp)) => {
            assert!(fp.ends_with("language-g0.g0"), "unexpected path {:?}", fp)
        }
        | Err(other) => panic!("expected divergence, got {}", other),
        | Ok(_) => panic!("expected divergence, got a loader"),
    }
}

#[test]
fn bootstrap_requires_the_base_module() {
    let mut logs = LogCollector::new();
    let out = bootstrap(toy_g0(), vec![fixture_dir("loader")], &mut logs);
    assert!(matches!(out, Err(BootError::MissingBase(_))));
}
