use crate::bits::Bits;
use std::rc::Rc;

/* ---------------------------------- Value --------------------------------- */

/// The universal tree datum: a bit-path *stem* ending in a [`Node`].
///
/// One substrate carries every canonical shape:
///
/// - a **bitstring** is a stem ending in [`Node::Leaf`];
/// - a **pair** `(a, b)` is an empty stem over [`Node::Branch`];
/// - a **record** is a radix tree: each key is the bit path of its label,
///   bit `0` descending left and bit `1` right;
/// - a **variant** `label:v` is the label bits prepended to `v`'s stem;
/// - a **list** is unit or a pair of head and tail list, stored compactly
///   as [`Node::Seq`];
/// - **unit** is the empty bitstring, which is also the empty record and
///   the empty list.
///
/// Values are persistent: clones share structure through `Rc` and
/// `im::Vector`, never deep-copying.
#[derive(Clone)]
pub struct Value {
    pub(crate) stem: Bits,
    pub(crate) node: Rc<Node>,
}

#[derive(Clone)]
pub enum Node {
    Leaf,
    Branch(Value, Value),
    /// Compact list node, never empty; `Seq([x, ..rest])` is structurally
    /// the same value as `Branch(x, rest-as-list)`.
    Seq(im::Vector<Value>),
}

impl Value {
    /* ----------------------------- Construction ------------------------------ */

    pub fn unit() -> Value {
        Value { stem: Bits::new(), node: Rc::new(Node::Leaf) }
    }
    pub fn bits(bits: Bits) -> Value {
        Value { stem: bits, node: Rc::new(Node::Leaf) }
    }
    pub fn nat(n: u64) -> Value {
        Value::bits(Bits::from_nat(n))
    }
    /// A symbol: the label bits of UTF-8 text.
    pub fn sym(text: &str) -> Value {
        Value::bits(Bits::of_str(text))
    }
    /// A binary: file bytes or text as a bitstring of whole bytes.
    pub fn binary(bytes: &[u8]) -> Value {
        Value::bits(Bits::of_bytes(bytes))
    }
    pub fn pair(left: Value, right: Value) -> Value {
        Value { stem: Bits::new(), node: Rc::new(Node::Branch(left, right)) }
    }
    pub fn list(items: im::Vector<Value>) -> Value {
        if items.is_empty() {
            return Value::unit();
        }
        Value { stem: Bits::new(), node: Rc::new(Node::Seq(items)) }
    }
    /// Prepend a bit path: `prefixed(p, v)` is the value reached from which
    /// following `p` yields `v`.
    pub fn prefixed(prefix: &Bits, v: &Value) -> Value {
        Value { stem: prefix.concat(&v.stem), node: v.node.clone() }
    }
    /// A single-field record `label:v`.
    pub fn variant(label: &str, v: &Value) -> Value {
        Value::prefixed(&Bits::of_str(label), v)
    }

    /* -------------------------------- Shape ---------------------------------- */

    pub fn is_unit(&self) -> bool {
        self.stem.is_empty() && matches!(*self.node, Node::Leaf)
    }
    /// The whole value as a bitstring, when it is one.
    pub fn as_bits(&self) -> Option<&Bits> {
        match *self.node {
            | Node::Leaf => Some(&self.stem),
            | Node::Branch(..) | Node::Seq(_) => None,
        }
    }
    /// Pair view; compact lists uncons transparently.
    pub fn as_pair(&self) -> Option<(Value, Value)> {
        if !self.stem.is_empty() {
            return None;
        }
        match &*self.node {
            | Node::Leaf => None,
            | Node::Branch(left, right) => Some((left.clone(), right.clone())),
            | Node::Seq(items) => {
                let head = items.front().cloned()?;
                let mut rest = items.clone();
                rest.pop_front();
                Some((head, Value::list(rest)))
            }
        }
    }
    /// List view: walks the cons spine to a sequence, `None` for non-lists.
    pub fn as_seq(&self) -> Option<im::Vector<Value>> {
        let mut out = im::Vector::new();
        let mut cur = self.clone();
        loop {
            if !cur.stem.is_empty() {
                return None;
            }
            match &*cur.node {
                | Node::Leaf => return Some(out),
                | Node::Seq(items) => {
                    out.append(items.clone());
                    return Some(out);
                }
                | Node::Branch(left, right) => {
                    out.push_back(left.clone());
                    cur = right.clone();
                }
            }
        }
    }
    /// The payload of variant `label:v`, when this value carries that label.
    pub fn variant_of(&self, label: &str) -> Option<Value> {
        let rest = self.stem.strip_prefix(&Bits::of_str(label))?;
        Some(Value { stem: rest, node: self.node.clone() })
    }

    /* ------------------------------ Radix paths ------------------------------- */

    /// Descend one bit: `0` goes left, `1` goes right.
    fn step(&self, bit: bool) -> Option<Value> {
        match self.stem.split_first() {
            | Some((s0, rest)) => {
                if s0 != bit {
                    return None;
                }
                Some(Value { stem: rest, node: self.node.clone() })
            }
            | None => {
                let (left, right) = self.as_pair()?;
                Some(if bit { right } else { left })
            }
        }
    }
    /// The subtree at bit path `path`; `None` when the path is absent.
    pub fn get_path(&self, path: &Bits) -> Option<Value> {
        let mut cur = self.clone();
        for bit in path.iter() {
            cur = cur.step(bit)?;
        }
        Some(cur)
    }
    /// Replace the subtree at `path` with `v`, building the path where the
    /// tree ends early. Total.
    pub fn put_path(&self, path: &Bits, v: &Value) -> Value {
        let Some((bit, rest)) = path.split_first() else {
            return v.clone();
        };
        match self.stem.split_first() {
            | Some((s0, srest)) => {
                let child = Value { stem: srest, node: self.node.clone() };
                if s0 == bit {
                    Value::prefixed(&Bits::one(bit), &child.put_path(&rest, v))
                } else {
                    // paths diverge right here
                    let fresh = Value::prefixed(&rest, v);
                    let (left, right) = if bit { (child, fresh) } else { (fresh, child) };
                    Value::pair(left, right)
                }
            }
            | None => match &*self.node {
                | Node::Leaf => Value::prefixed(path, v),
                | Node::Branch(left, right) => {
                    if bit {
                        Value::pair(left.clone(), right.put_path(&rest, v))
                    } else {
                        Value::pair(left.put_path(&rest, v), right.clone())
                    }
                }
                | Node::Seq(items) => {
                    let (head, tail) = self.as_pair().expect("Seq nodes are never empty");
                    if bit {
                        Value::pair(head, tail.put_path(&rest, v))
                    } else {
                        let items = items.update(0, head.put_path(&rest, v));
                        Value::list(items)
                    }
                }
            },
        }
    }
    /// Remove the subtree at `path`, pruning the spine. Total: an absent
    /// path leaves the value unchanged.
    pub fn del_path(&self, path: &Bits) -> Value {
        self.del_rec(path).unwrap_or_else(Value::unit)
    }
    fn del_rec(&self, path: &Bits) -> Option<Value> {
        let Some((bit, rest)) = path.split_first() else {
            return None;
        };
        match self.stem.split_first() {
            | Some((s0, srest)) => {
                if s0 != bit {
                    return Some(self.clone());
                }
                let child = Value { stem: srest, node: self.node.clone() };
                let child = child.del_rec(&rest)?;
                Some(Value::prefixed(&Bits::one(bit), &child))
            }
            | None => {
                let (left, right) = match self.as_pair() {
                    | Some(pair) => pair,
                    // path walks past the end of the tree: nothing to remove
                    | None => return Some(self.clone()),
                };
                let (kept_bit, survivor, gone) =
                    if bit { (false, left, right) } else { (true, right, left) };
                match gone.del_rec(&rest) {
                    | Some(gone) => Some(if bit {
                        Value::pair(survivor, gone)
                    } else {
                        Value::pair(gone, survivor)
                    }),
                    // the branch collapses into a stem extension
                    | None => Some(Value::prefixed(&Bits::one(kept_bit), &survivor)),
                }
            }
        }
    }
}

/* -------------------------------- Equality -------------------------------- */

impl PartialEq for Value {
    /// Canonical-shape structural equality: compact [`Node::Seq`] lists
    /// compare equal to their cons-pair spelling.
    fn eq(&self, other: &Value) -> bool {
        self.stem == other.stem && node_eq(&self.node, &other.node)
    }
}
impl Eq for Value {}

fn node_eq(a: &Node, b: &Node) -> bool {
    match (a, b) {
        | (Node::Leaf, Node::Leaf) => true,
        | (Node::Branch(al, ar), Node::Branch(bl, br)) => al == bl && ar == br,
        | (Node::Seq(xs), Node::Seq(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| x == y)
        }
        | (Node::Seq(xs), Node::Branch(l, r)) | (Node::Branch(l, r), Node::Seq(xs)) => {
            let mut rest = xs.clone();
            let head = rest.pop_front().expect("Seq nodes are never empty");
            head == *l && Value::list(rest) == *r
        }
        | (Node::Leaf, _) | (_, Node::Leaf) => false,
    }
}
