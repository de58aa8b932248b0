//! Shared tooling for the scenario tests: a toy g0 notation standing in
//! for the real surface language, fixture paths, and common program
//! builders.

use glas_driver::{Compiler, Loader};
use glas_runtime::syntax::*;
use glas_runtime::{Effects, LogCollector};
use glas_value::{Bits, Value};
use std::path::PathBuf;
use std::rc::Rc;

/// A committed fixture directory under `modules/`.
pub fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("modules").join(name)
}

/* --------------------------------- Toy g0 --------------------------------- */

/// A miniature g0 compiler: whitespace-separated tokens, `:name … ;`
/// definitions collected into a record, `import <module>` loads through
/// the loader, and `[ … ]` quotations push the encoded token list as data.
///
/// This is test tooling only; the real base-language parser lives outside
/// the runtime. It honors the same compile contract, which is enough
/// to exercise pipelines, cycles, and the bootstrap fixed point.
pub fn toy_g0() -> Compiler {
    Rc::new(|loader: &mut Loader, eff: &mut dyn Effects, input| compile_toy(loader, eff, input))
}

fn compile_toy(loader: &mut Loader, eff: &mut dyn Effects, input: Value) -> Option<Value> {
    let text = String::from_utf8(input.as_bits()?.to_bytes()?).ok()?;
    let mut tokens = text.split_whitespace();
    let mut dict = Value::unit();
    while let Some(token) = tokens.next() {
        match token {
            | "import" => {
                let name = tokens.next()?;
                let module = loader.load_module(name, eff)?;
                dict = dict.put_path(&Bits::of_str(name), &module);
            }
            | _ if token.starts_with(':') => {
                let name = token.strip_prefix(':')?;
                let body = encode_until(&mut tokens, ";")?;
                let prog = Value::variant("seq", &Value::list(body));
                dict = dict.put_path(&Bits::of_str(name), &prog);
            }
            | _ => return None,
        }
    }
    Some(dict)
}

/// Encodes tokens up to (and consuming) the given closer.
fn encode_until<'a>(
    tokens: &mut impl Iterator<Item = &'a str>, closer: &str,
) -> Option<im::Vector<Value>> {
    let mut out = im::Vector::new();
    loop {
        let token = tokens.next()?;
        if token == closer {
            return Some(out);
        }
        out.push_back(encode_token(token, tokens)?);
    }
}

fn encode_token<'a>(token: &'a str, tokens: &mut impl Iterator<Item = &'a str>) -> Option<Value> {
    if token == "[" {
        let inner = encode_until(tokens, "]")?;
        return Some(Value::variant("data", &Value::list(inner)));
    }
    if token == "()" {
        return Some(Value::variant("data", &Value::unit()));
    }
    if let Some(sym) = token.strip_prefix('\'') {
        return Some(Value::variant("data", &Value::sym(sym)));
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        let nat: u64 = token.parse().ok()?;
        return Some(Value::variant("data", &Value::nat(nat)));
    }
    Op::from_name(token).map(|op| Value::sym(op.name()))
}

/* ----------------------------- Program builders ---------------------------- */

pub fn rc(p: impl Into<Program>) -> RcProg {
    Rc::new(p.into())
}

pub fn seq(ps: Vec<Program>) -> Program {
    Sequence(ps).into()
}

/// Wraps the stack top as a variant: `⟨v⟩ → ⟨label:v⟩`.
pub fn wrap(label: &str) -> Program {
    seq(vec![
        Program::push(Value::unit()),
        Op::Swap.into(),
        Program::push(Value::sym(label)),
        Op::Put.into(),
    ])
}

/// Offers the stack top to the handler under `label`; on refusal the
/// speculation aborts and the operand survives untouched.
pub fn try_eff(label: &str) -> Program {
    Cond {
        pred: rc(seq(vec![wrap(label), Op::Eff.into()])),
        then: rc(Program::nop()),
        alt: rc(Program::nop()),
    }
    .into()
}

/// Succeeds while the stack top is a nonzero natural.
pub fn nonzero() -> Program {
    let never = seq(vec![
        Program::push(Value::nat(0)),
        Program::push(Value::nat(1)),
        Op::Eq.into(),
    ]);
    Cond {
        pred: rc(seq(vec![Op::Copy.into(), Program::push(Value::nat(0)), Op::Eq.into()])),
        then: rc(never),
        alt: rc(Program::nop()),
    }
    .into()
}

/* ------------------------------ Log inspection ----------------------------- */

/// Collected log payload records whose `lvl` matches and whose `text`
/// contains the needle.
pub fn logged(logs: &LogCollector, level: &str, needle: &str) -> usize {
    logs.messages()
        .iter()
        .filter(|record| {
            let lvl = record.get_path(&Bits::of_str("lvl"));
            let text = record
                .get_path(&Bits::of_str("text"))
                .and_then(|v| v.as_bits().and_then(Bits::to_str));
            lvl == Some(Value::sym(level)) && text.is_some_and(|t| t.contains(needle))
        })
        .count()
}
