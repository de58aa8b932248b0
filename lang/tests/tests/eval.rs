//! Evaluator scenarios driven end to end through programs and handlers.

use glas_runtime::syntax::*;
use glas_runtime::{eval, LogCollector, NoEffects};
use glas_tests::{nonzero, rc, seq, try_eff};
use glas_value::{Bits, Value};
use im::vector;

/// fib(16) computed with a loop over a pair of accumulators.
#[test]
fn fibonacci_via_loop() {
    // stack ⟨n, b, a⟩: each pass takes n to n−1 and (b, a) to (a+b, b)
    let step_pair = seq(vec![Op::Copy.into(), Dip(rc(Op::Add)).into(), Op::Swap.into()]);
    let body = seq(vec![
        Program::push(Value::nat(1)),
        Op::Sub.into(),
        Dip(rc(step_pair)).into(),
    ]);
    let fib = seq(vec![
        Program::push(Value::nat(1)),
        Op::Swap.into(),
        Program::push(Value::nat(1)),
        Op::Swap.into(),
        Loop { pred: rc(nonzero()), body: rc(body) }.into(),
        Op::Drop.into(),
        Op::Drop.into(),
    ]);
    let out = eval(&fib, &mut NoEffects, vector![Value::nat(16)]);
    assert_eq!(out, Some(vector![Value::nat(1597)]));
}

/// Absolute difference by speculative subtraction.
#[test]
fn absolute_difference_via_cond() {
    let absdiff: Program = Cond {
        pred: rc(Op::Sub),
        then: rc(Program::nop()),
        alt: rc(seq(vec![Op::Swap.into(), Op::Sub.into()])),
    }
    .into();
    let out = eval(&absdiff, &mut NoEffects, vector![Value::nat(3), Value::nat(10)]);
    assert_eq!(out, Some(vector![Value::nat(7)]));
    let out = eval(&absdiff, &mut NoEffects, vector![Value::nat(10), Value::nat(3)]);
    assert_eq!(out, Some(vector![Value::nat(7)]));
}

/// A failed speculative effect is aborted; committed ones survive in
/// program order.
#[test]
fn transactional_log() {
    let prog = seq(vec![
        try_eff("log"),
        Dip(rc(try_eff("oops"))).into(),
        Dip(rc(Dip(rc(try_eff("log"))))).into(),
    ]);
    let a = Value::sym("a");
    let b = Value::sym("b");
    let c = Value::sym("c");
    let mut logs = LogCollector::new();
    let out = eval(&prog, &mut logs, vector![a.clone(), b.clone(), c.clone()]);
    assert_eq!(out, Some(vector![Value::unit(), b, Value::unit()]));
    assert_eq!(logs.messages(), vector![a, c]);
}

/// An env handler that renames `log` and `oops` into each other and
/// counts successful forwards in its threaded state.
#[test]
fn env_renames_and_counts() {
    // ⟨v⟩ → ⟨label:v⟩
    let rewrap = |label: &str| {
        seq(vec![
            Program::push(Value::unit()),
            Op::Swap.into(),
            Program::push(Value::sym(label)),
            Op::Put.into(),
        ])
    };
    // ⟨req⟩ → ⟨renamed req⟩, failing on unknown labels
    let rename: Program = Cond {
        pred: rc(seq(vec![Program::push(Value::sym("log")), Op::Get.into()])),
        then: rc(rewrap("oops")),
        alt: rc(seq(vec![
            Program::push(Value::sym("oops")),
            Op::Get.into(),
            rewrap("log"),
        ])),
    }
    .into();
    let increment = seq(vec![Program::push(Value::nat(1)), Op::Add.into()]);
    // ⟨req, n⟩ → ⟨reply, n+1⟩
    let handler = seq(vec![rename, Op::Eff.into(), Dip(rc(increment)).into()]);

    let scenario = seq(vec![
        try_eff("log"),
        Dip(rc(try_eff("oops"))).into(),
        Dip(rc(Dip(rc(try_eff("log"))))).into(),
    ]);
    let prog = seq(vec![
        Program::push(Value::nat(0)),
        Env { with: rc(handler), body: rc(scenario) }.into(),
    ]);

    let a = Value::sym("a");
    let b = Value::sym("b");
    let c = Value::sym("c");
    let mut logs = LogCollector::new();
    let out = eval(&prog, &mut logs, vector![a.clone(), b.clone(), c.clone()]);
    assert_eq!(out, Some(vector![Value::nat(1), a, Value::unit(), c]));
    assert_eq!(logs.messages(), vector![b]);
}

/// Record get/put/del through the operator layer for a spread of symbols.
#[test]
fn record_roundtrip() {
    for key in ["k", "compile", "a-long-label", "x0"] {
        for value in [Value::nat(9), Value::sym("v"), Value::pair(Value::nat(1), Value::unit())] {
            let base = Value::unit().put_path(&Bits::of_str("keep"), &Value::nat(1));
            let get_after_put = seq(vec![
                Op::Put.into(),
                Program::push(Value::sym(key)),
                Op::Get.into(),
            ]);
            let st = vector![Value::sym(key), value.clone(), base.clone()];
            let out = eval(&get_after_put, &mut NoEffects, st);
            assert_eq!(out, Some(vector![value.clone()]));

            let get_after_del = seq(vec![
                Op::Put.into(),
                Program::push(Value::sym(key)),
                Op::Del.into(),
                Program::push(Value::sym(key)),
                Op::Get.into(),
            ]);
            let st = vector![Value::sym(key), value, base];
            assert_eq!(eval(&get_after_del, &mut NoEffects, st), None);
        }
    }
}

/// `Cond(p, nop, nop)` behaves as p-if-it-succeeds, nop otherwise.
#[test]
fn cond_idempotence() {
    let succeeding = seq(vec![Program::push(Value::nat(2)), Op::Add.into()]);
    let failing = seq(vec![Program::push(Value::nat(100)), Op::Sub.into()]);
    for (inner, stack, expect) in [
        (succeeding, vector![Value::nat(40)], vector![Value::nat(42)]),
        (failing, vector![Value::nat(40)], vector![Value::nat(40)]),
    ] {
        let guarded: Program =
            Cond { pred: rc(inner), then: rc(Program::nop()), alt: rc(Program::nop()) }.into();
        assert_eq!(eval(&guarded, &mut NoEffects, stack), Some(expect));
    }
}
