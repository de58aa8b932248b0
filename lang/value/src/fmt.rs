use crate::bits::Bits;
use crate::value::{Node, Value};
use std::fmt;

/// Best-effort readable rendering. The tree carries no type tags, so the
/// printer guesses at shapes: byte-aligned printable stems render as text,
/// short leaves as naturals, everything else as raw bits.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(bits) = self.as_bits() {
            return write_leaf(f, bits);
        }
        if !self.stem.is_empty() {
            write_label(f, &self.stem)?;
            write!(f, ":")?;
            let payload = Value { stem: Bits::new(), node: self.node.clone() };
            return write!(f, "{}", payload);
        }
        if let Some(items) = self.as_seq() {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item)?;
            }
            return write!(f, "]");
        }
        match &*self.node {
            | Node::Branch(left, right) => write!(f, "({}, {})", left, right),
            | Node::Leaf | Node::Seq(_) => unreachable!("handled above"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0b")?;
        for bit in self.iter() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

fn write_leaf(f: &mut fmt::Formatter<'_>, bits: &Bits) -> fmt::Result {
    if bits.is_empty() {
        return write!(f, "()");
    }
    if let Some(text) = printable(bits) {
        return write!(f, "'{}", text);
    }
    if bits.is_trimmed() && bits.len() <= 64 {
        return write!(f, "{}", bits.to_nat().expect("checked length"));
    }
    write!(f, "{:?}", bits)
}

fn write_label(f: &mut fmt::Formatter<'_>, bits: &Bits) -> fmt::Result {
    match printable(bits) {
        | Some(text) => write!(f, "{}", text),
        | None => write!(f, "{:?}", bits),
    }
}

fn printable(bits: &Bits) -> Option<String> {
    let bytes = bits.to_bytes()?;
    if bytes.is_empty() || !bytes.iter().all(|b| (0x20..0x7f).contains(b)) {
        return None;
    }
    String::from_utf8(bytes).ok()
}
