use crate::syntax::*;
use glas_value::{Bits, Value};

/* ---------------------------------- Arity --------------------------------- */

/// Static stack arity: every successful run consumes exactly `inputs`
/// cells and leaves exactly `outputs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arity {
    pub inputs: u64,
    pub outputs: u64,
}

impl Arity {
    pub fn new(inputs: u64, outputs: u64) -> Self {
        Arity { inputs, outputs }
    }
    /// Sequential composition: `self` then `next`.
    fn then(self, next: Arity) -> Arity {
        if next.inputs <= self.outputs {
            Arity::new(self.inputs, self.outputs - next.inputs + next.outputs)
        } else {
            Arity::new(self.inputs + next.inputs - self.outputs, next.outputs)
        }
    }
    /// One extra cell rides along untouched on both sides.
    fn lifted(self) -> Arity {
        Arity::new(self.inputs + 1, self.outputs + 1)
    }
}

impl Op {
    pub fn arity(self) -> Arity {
        match self {
            | Op::Copy => Arity::new(1, 2),
            | Op::Drop => Arity::new(1, 0),
            | Op::Swap => Arity::new(2, 2),
            | Op::Eq => Arity::new(2, 0),
            | Op::Get => Arity::new(2, 1),
            | Op::Put => Arity::new(3, 1),
            | Op::Del => Arity::new(2, 1),
            | Op::Pushl | Op::Pushr => Arity::new(2, 1),
            | Op::Popl | Op::Popr => Arity::new(1, 2),
            | Op::Len | Op::BLen => Arity::new(1, 1),
            | Op::Split | Op::BSplit => Arity::new(2, 2),
            | Op::Join | Op::BJoin => Arity::new(2, 1),
            | Op::Add | Op::Sub | Op::Mul => Arity::new(2, 1),
            | Op::Div => Arity::new(2, 2),
            | Op::Eff => Arity::new(1, 1),
        }
    }
}

/// Computes the arity of a program; `None` when no consistent arity
/// exists (mismatched branches, unbalanced loops, or a declared arity
/// that disagrees with the body).
pub fn static_arity(prog: &Program) -> Option<Arity> {
    match prog {
        | Program::Op(op) => Some(op.arity()),
        | Program::Data(_) => Some(Arity::new(0, 1)),
        | Program::Seq(Sequence(progs)) => {
            let mut acc = Arity::new(0, 0);
            for p in progs {
                acc = acc.then(static_arity(p)?);
            }
            Some(acc)
        }
        | Program::Dip(Dip(body)) => Some(static_arity(body)?.lifted()),
        | Program::Cond(Cond { pred, then, alt }) => {
            let pass = static_arity(pred)?.then(static_arity(then)?);
            let fail = static_arity(alt)?;
            (pass == fail).then_some(pass)
        }
        | Program::Loop(Loop { pred, body }) => {
            let once = static_arity(pred)?.then(static_arity(body)?);
            (once.inputs == once.outputs).then_some(once)
        }
        | Program::Env(Env { with, body }) => {
            // the handler maps (request, state) to (reply, state)
            let handler = static_arity(with)?;
            (handler == Arity::new(2, 2)).then(|| static_arity(body))?.map(Arity::lifted)
        }
        | Program::Prog(Annotated { meta, body }) => {
            let computed = static_arity(body)?;
            match declared_arity(meta) {
                | Some(declared) if declared != computed => None,
                | _ => Some(computed),
            }
        }
    }
}

/// Reads an `arity:(i:…, o:…)` annotation from program metadata.
pub fn declared_arity(meta: &Value) -> Option<Arity> {
    let ann = meta.get_path(&Bits::of_str("arity"))?;
    let inputs = ann.get_path(&Bits::of_str("i"))?.as_bits()?.to_nat()?;
    let outputs = ann.get_path(&Bits::of_str("o"))?.as_bits()?.to_nat()?;
    Some(Arity::new(inputs, outputs))
}
