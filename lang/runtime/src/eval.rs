use crate::effects::Effects;
use crate::syntax::*;
use glas_value::{bits, Bits, Value};

/// The working stack: a persistent sequence of values, top at the front.
/// The caller's copy is untouched by a failed evaluation.
pub type Stack = im::Vector<Value>;

/// Evaluate `prog` against `stack`. `None` is program failure: a
/// first-class, backtrackable signal. Host errors never travel this
/// channel.
pub fn eval(prog: &Program, handler: &mut dyn Effects, stack: Stack) -> Option<Stack> {
    match prog {
        | Program::Op(op) => eval_op(*op, handler, stack),
        | Program::Data(Data(v)) => {
            let mut stack = stack;
            stack.push_front(v.clone());
            Some(stack)
        }
        | Program::Seq(Sequence(progs)) => {
            let mut stack = stack;
            for p in progs {
                stack = eval(p, handler, stack)?;
            }
            Some(stack)
        }
        | Program::Dip(Dip(body)) => {
            let mut stack = stack;
            let top = stack.pop_front()?;
            let mut stack = eval(body, handler, stack)?;
            stack.push_front(top);
            Some(stack)
        }
        | Program::Cond(Cond { pred, then, alt }) => {
            handler.begin();
            match eval(pred, handler, stack.clone()) {
                | Some(passed) => {
                    handler.commit();
                    eval(then, handler, passed)
                }
                | None => {
                    handler.abort();
                    eval(alt, handler, stack)
                }
            }
        }
        | Program::Loop(Loop { pred, body }) => {
            let mut stack = stack;
            loop {
                handler.begin();
                match eval(pred, handler, stack.clone()) {
                    | Some(passed) => {
                        handler.commit();
                        stack = eval(body, handler, passed)?;
                    }
                    | None => {
                        // predicate failure exits the loop successfully
                        handler.abort();
                        return Some(stack);
                    }
                }
            }
        }
        | Program::Env(Env { with, body }) => {
            let mut stack = stack;
            let state = stack.pop_front()?;
            let mut scoped = EnvEff {
                handler: with.as_ref(),
                outer: handler,
                state: im::vector![state],
                saved: Vec::new(),
            };
            let mut stack = eval(body, &mut scoped, stack)?;
            for v in scoped.state.iter().rev() {
                stack.push_front(v.clone());
            }
            Some(stack)
        }
        | Program::Prog(Annotated { body, .. }) => eval(body, handler, stack),
    }
}

/* ------------------------------- Env handler ------------------------------- */

/// The interposed handler installed by `env`: the handler program runs on
/// its own state stack (seeded from one value popped at `env` entry) with
/// the outer handler active, so it may rewrite, suppress, or dispatch
/// requests. Frames save and restore the state so aborted effects cannot
/// leak through it.
struct EnvEff<'a> {
    handler: &'a Program,
    outer: &'a mut dyn Effects,
    state: Stack,
    saved: Vec<Stack>,
}

impl Effects for EnvEff<'_> {
    fn eff(&mut self, request: Value) -> Option<Value> {
        let mut hstack = self.state.clone();
        hstack.push_front(request);
        let mut hstack = eval(self.handler, self.outer, hstack)?;
        let reply = hstack.pop_front()?;
        self.state = hstack;
        Some(reply)
    }
    fn begin(&mut self) {
        self.saved.push(self.state.clone());
        self.outer.begin();
    }
    fn commit(&mut self) {
        self.saved.pop().expect("commit without matching begin");
        self.outer.commit();
    }
    fn abort(&mut self) {
        self.state = self.saved.pop().expect("abort without matching begin");
        self.outer.abort();
    }
}

/* ------------------------------- Primitives ------------------------------- */

fn eval_op(op: Op, handler: &mut dyn Effects, stack: Stack) -> Option<Stack> {
    let mut stack = stack;
    match op {
        | Op::Copy => {
            let top = stack.front()?.clone();
            stack.push_front(top);
        }
        | Op::Drop => {
            stack.pop_front()?;
        }
        | Op::Swap => {
            let a = stack.pop_front()?;
            let b = stack.pop_front()?;
            stack.push_front(a);
            stack.push_front(b);
        }
        | Op::Eq => {
            let a = stack.pop_front()?;
            let b = stack.pop_front()?;
            if a != b {
                return None;
            }
        }
        | Op::Get => {
            let key = pop_bits(&mut stack)?;
            let rec = stack.pop_front()?;
            stack.push_front(rec.get_path(&key)?);
        }
        | Op::Put => {
            let key = pop_bits(&mut stack)?;
            let val = stack.pop_front()?;
            let rec = stack.pop_front()?;
            stack.push_front(rec.put_path(&key, &val));
        }
        | Op::Del => {
            let key = pop_bits(&mut stack)?;
            let rec = stack.pop_front()?;
            stack.push_front(rec.del_path(&key));
        }
        | Op::Pushl => {
            let item = stack.pop_front()?;
            let mut items = pop_seq(&mut stack)?;
            items.push_front(item);
            stack.push_front(Value::list(items));
        }
        | Op::Pushr => {
            let item = stack.pop_front()?;
            let mut items = pop_seq(&mut stack)?;
            items.push_back(item);
            stack.push_front(Value::list(items));
        }
        | Op::Popl => {
            let mut items = pop_seq(&mut stack)?;
            let item = items.pop_front()?;
            stack.push_front(Value::list(items));
            stack.push_front(item);
        }
        | Op::Popr => {
            let mut items = pop_seq(&mut stack)?;
            let item = items.pop_back()?;
            stack.push_front(Value::list(items));
            stack.push_front(item);
        }
        | Op::Len => {
            let items = pop_seq(&mut stack)?;
            stack.push_front(Value::nat(items.len() as u64));
        }
        | Op::Split => {
            let index = pop_nat(&mut stack)?;
            let mut fore = pop_seq(&mut stack)?;
            let index = usize::try_from(index).ok()?;
            if index > fore.len() {
                return None;
            }
            let aft = fore.split_off(index);
            stack.push_front(Value::list(aft));
            stack.push_front(Value::list(fore));
        }
        | Op::Join => {
            let mut fore = pop_seq(&mut stack)?;
            let aft = pop_seq(&mut stack)?;
            fore.append(aft);
            stack.push_front(Value::list(fore));
        }
        | Op::Add => {
            let a = pop_nat_bits(&mut stack)?;
            let b = pop_nat_bits(&mut stack)?;
            stack.push_front(Value::bits(bits::nat_add(&a, &b)));
        }
        | Op::Sub => {
            let a = pop_nat_bits(&mut stack)?;
            let b = pop_nat_bits(&mut stack)?;
            stack.push_front(Value::bits(bits::nat_sub(&b, &a)?));
        }
        | Op::Mul => {
            let a = pop_nat_bits(&mut stack)?;
            let b = pop_nat_bits(&mut stack)?;
            stack.push_front(Value::bits(bits::nat_mul(&a, &b)));
        }
        | Op::Div => {
            let divisor = pop_nat_bits(&mut stack)?;
            let dividend = pop_nat_bits(&mut stack)?;
            let (quot, rem) = bits::nat_divmod(&dividend, &divisor)?;
            stack.push_front(Value::bits(quot));
            stack.push_front(Value::bits(rem));
        }
        | Op::BJoin => {
            let fore = pop_bits(&mut stack)?;
            let aft = pop_bits(&mut stack)?;
            stack.push_front(Value::bits(fore.concat(&aft)));
        }
        | Op::BSplit => {
            let index = pop_nat(&mut stack)?;
            let whole = pop_bits(&mut stack)?;
            let (fore, aft) = whole.split_at(usize::try_from(index).ok()?)?;
            stack.push_front(Value::bits(aft));
            stack.push_front(Value::bits(fore));
        }
        | Op::BLen => {
            let whole = pop_bits(&mut stack)?;
            stack.push_front(Value::nat(whole.len() as u64));
        }
        | Op::Eff => {
            let request = stack.pop_front()?;
            // each delegated request runs in its own frame: committed on
            // reply, aborted on refusal
            handler.begin();
            match handler.eff(request) {
                | Some(reply) => {
                    handler.commit();
                    stack.push_front(reply);
                }
                | None => {
                    handler.abort();
                    return None;
                }
            }
        }
    }
    Some(stack)
}

fn pop_bits(stack: &mut Stack) -> Option<Bits> {
    let v = stack.pop_front()?;
    let bits = v.as_bits()?.clone();
    Some(bits)
}

fn pop_seq(stack: &mut Stack) -> Option<im::Vector<Value>> {
    let v = stack.pop_front()?;
    v.as_seq()
}

fn pop_nat_bits(stack: &mut Stack) -> Option<Bits> {
    let bits = pop_bits(stack)?;
    // arithmetic accepts canonical naturals only
    bits.is_trimmed().then_some(bits)
}

fn pop_nat(stack: &mut Stack) -> Option<u64> {
    pop_nat_bits(stack)?.to_nat()
}
