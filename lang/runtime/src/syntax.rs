use derive_more::From;
use glas_value::{Bits, Value};
use std::rc::Rc;

/* ----------------------------------- Op ----------------------------------- */

/// A primitive operator, named by a symbol in the runtime ABI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Copy,
    Drop,
    Swap,
    Eq,
    Get,
    Put,
    Del,
    Pushl,
    Pushr,
    Popl,
    Popr,
    Len,
    Split,
    Join,
    Add,
    Sub,
    Mul,
    Div,
    BJoin,
    BSplit,
    BLen,
    Eff,
}

/// Symbolic names are the wire form compilers encode ops with; an
/// implementation accepts these exactly.
pub const OP_NAMES: [(Op, &str); 22] = [
    (Op::Copy, "copy"),
    (Op::Drop, "drop"),
    (Op::Swap, "swap"),
    (Op::Eq, "eq"),
    (Op::Get, "get"),
    (Op::Put, "put"),
    (Op::Del, "del"),
    (Op::Pushl, "pushl"),
    (Op::Pushr, "pushr"),
    (Op::Popl, "popl"),
    (Op::Popr, "popr"),
    (Op::Len, "len"),
    (Op::Split, "split"),
    (Op::Join, "join"),
    (Op::Add, "add"),
    (Op::Sub, "sub"),
    (Op::Mul, "mul"),
    (Op::Div, "div"),
    (Op::BJoin, "bjoin"),
    (Op::BSplit, "bsplit"),
    (Op::BLen, "blen"),
    (Op::Eff, "eff"),
];

impl Op {
    pub fn name(self) -> &'static str {
        let (_, name) = OP_NAMES.iter().find(|(op, _)| *op == self).expect("every op is named");
        name
    }
    pub fn from_name(name: &str) -> Option<Op> {
        let (op, _) = OP_NAMES.iter().find(|(_, n)| *n == name)?;
        Some(*op)
    }
}

/* --------------------------------- Program -------------------------------- */

pub type RcProg = Rc<Program>;

/// `data:V` pushes a literal value.
#[derive(Clone, Debug)]
pub struct Data(pub Value);
/// `seq:[p…]` composes subprograms left to right.
#[derive(Clone, Debug)]
pub struct Sequence(pub Vec<Program>);
/// `dip:P` runs `P` with the stack top set aside.
#[derive(Clone, Debug)]
pub struct Dip(pub RcProg);
/// `cond:(try:T, then:Y, else:N)`: speculative try with abort on failure.
#[derive(Clone, Debug)]
pub struct Cond {
    pub pred: RcProg,
    pub then: RcProg,
    pub alt: RcProg,
}
/// `loop:(while:W, do:D)`: repeat until the predicate aborts.
#[derive(Clone, Debug)]
pub struct Loop {
    pub pred: RcProg,
    pub body: RcProg,
}
/// `env:(with:H, do:P)`: intercept `P`'s effects with handler program `H`.
#[derive(Clone, Debug)]
pub struct Env {
    pub with: RcProg,
    pub body: RcProg,
}
/// `prog:(do:P, ...)`: annotated program; the remaining record is tooling
/// metadata, optionally carrying `arity:(i:…, o:…)`.
#[derive(Clone, Debug)]
pub struct Annotated {
    pub meta: Value,
    pub body: RcProg,
}

#[derive(From, Clone, Debug)]
pub enum Program {
    Op(Op),
    Data(Data),
    Seq(Sequence),
    Dip(Dip),
    Cond(Cond),
    Loop(Loop),
    Env(Env),
    Prog(Annotated),
}

impl Program {
    pub fn nop() -> Program {
        Sequence(Vec::new()).into()
    }
    pub fn push(v: Value) -> Program {
        Data(v).into()
    }

    /// Parse a program value; `None` when the value matches no rule.
    pub fn from_value(v: &Value) -> Option<Program> {
        if let Some(bits) = v.as_bits() {
            if let Some(op) = bits.to_str().as_deref().and_then(Op::from_name) {
                return Some(op.into());
            }
        }
        if let Some(payload) = v.variant_of("data") {
            return Some(Data(payload).into());
        }
        if let Some(payload) = v.variant_of("seq") {
            let items = payload.as_seq()?;
            let progs = items.iter().map(Program::from_value).collect::<Option<Vec<_>>>()?;
            return Some(Sequence(progs).into());
        }
        if let Some(payload) = v.variant_of("dip") {
            return Some(Dip(Rc::new(Program::from_value(&payload)?)).into());
        }
        if let Some(payload) = v.variant_of("cond") {
            let pred = parse_field(&payload, "try")?;
            let then = parse_field(&payload, "then")?;
            let alt = parse_field(&payload, "else")?;
            return Some(Cond { pred, then, alt }.into());
        }
        if let Some(payload) = v.variant_of("loop") {
            let pred = parse_field(&payload, "while")?;
            let body = parse_field(&payload, "do")?;
            return Some(Loop { pred, body }.into());
        }
        if let Some(payload) = v.variant_of("env") {
            let with = parse_field(&payload, "with")?;
            let body = parse_field(&payload, "do")?;
            return Some(Env { with, body }.into());
        }
        if let Some(payload) = v.variant_of("prog") {
            let body = parse_field(&payload, "do")?;
            let meta = payload.del_path(&Bits::of_str("do"));
            return Some(Annotated { meta, body }.into());
        }
        None
    }

    /// Encode back to the value form `from_value` parses.
    pub fn to_value(&self) -> Value {
        match self {
            | Program::Op(op) => Value::sym(op.name()),
            | Program::Data(Data(v)) => Value::variant("data", v),
            | Program::Seq(Sequence(progs)) => {
                let items = progs.iter().map(Program::to_value).collect();
                Value::variant("seq", &Value::list(items))
            }
            | Program::Dip(Dip(body)) => Value::variant("dip", &body.to_value()),
            | Program::Cond(Cond { pred, then, alt }) => {
                let rec = record(&[("try", pred), ("then", then), ("else", alt)]);
                Value::variant("cond", &rec)
            }
            | Program::Loop(Loop { pred, body }) => {
                let rec = record(&[("while", pred), ("do", body)]);
                Value::variant("loop", &rec)
            }
            | Program::Env(Env { with, body }) => {
                let rec = record(&[("with", with), ("do", body)]);
                Value::variant("env", &rec)
            }
            | Program::Prog(Annotated { meta, body }) => {
                let rec = meta.put_path(&Bits::of_str("do"), &body.to_value());
                Value::variant("prog", &rec)
            }
        }
    }
}

fn parse_field(payload: &Value, label: &str) -> Option<RcProg> {
    let v = payload.get_path(&Bits::of_str(label))?;
    Some(Rc::new(Program::from_value(&v)?))
}

fn record(fields: &[(&str, &RcProg)]) -> Value {
    let mut rec = Value::unit();
    for (label, prog) in fields {
        rec = rec.put_path(&Bits::of_str(label), &prog.to_value());
    }
    rec
}
