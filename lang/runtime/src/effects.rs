use glas_value::{Bits, Value};

/* --------------------------------- Effects -------------------------------- */

/// The effect handler capability: one-shot requests plus nestable
/// transaction frames. Effects issued between [`Effects::begin`] and the
/// matching [`Effects::commit`] are tentative; [`Effects::abort`] reverts
/// them. The evaluator matches every `begin` with exactly one `commit` or
/// `abort` on every exit path.
pub trait Effects {
    /// Handle one request; `None` refuses it, failing the issuing `eff`.
    fn eff(&mut self, request: Value) -> Option<Value>;
    fn begin(&mut self);
    fn commit(&mut self);
    fn abort(&mut self);
}

/// Refuses every request.
pub struct NoEffects;

impl Effects for NoEffects {
    fn eff(&mut self, _request: Value) -> Option<Value> {
        None
    }
    fn begin(&mut self) {}
    fn commit(&mut self) {}
    fn abort(&mut self) {}
}

/* ------------------------------- Log records ------------------------------ */

/// Builds the request `log:(lvl:<level>, text:<message>)`.
pub fn log_message(level: &str, text: &str) -> Value {
    let rec = Value::unit()
        .put_path(&Bits::of_str("lvl"), &Value::sym(level))
        .put_path(&Bits::of_str("text"), &Value::binary(text.as_bytes()));
    Value::variant("log", &rec)
}

/* ------------------------------ Log collector ------------------------------ */

/// Buffers `log:` payloads in per-frame queues: `commit` concatenates the
/// top frame onto its parent, `abort` drops it. Refuses everything else.
/// This is the handler the scenario tests observe.
pub struct LogCollector {
    frames: Vec<im::Vector<Value>>,
}

impl LogCollector {
    pub fn new() -> Self {
        LogCollector { frames: vec![im::Vector::new()] }
    }
    /// Messages that survived to the root frame.
    pub fn messages(&self) -> im::Vector<Value> {
        self.frames.first().cloned().expect("the root frame is never closed")
    }
}

impl Default for LogCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects for LogCollector {
    fn eff(&mut self, request: Value) -> Option<Value> {
        let payload = request.variant_of("log")?;
        self.frames.last_mut().expect("the root frame is never closed").push_back(payload);
        Some(Value::unit())
    }
    fn begin(&mut self) {
        self.frames.push(im::Vector::new());
    }
    fn commit(&mut self) {
        let top = self.frames.pop().expect("commit without matching begin");
        self.frames.last_mut().expect("commit would close the root frame").append(top);
    }
    fn abort(&mut self) {
        self.frames.pop().expect("abort without matching begin");
        assert!(!self.frames.is_empty(), "abort would close the root frame");
    }
}

/* -------------------------------- Log writer ------------------------------- */

/// Like [`LogCollector`], but records reaching the root frame drain to the
/// `log` facade, mapped by their `lvl` field. The ambient sink for driver
/// binaries.
pub struct LogWriter {
    frames: Vec<Vec<Value>>,
}

impl LogWriter {
    pub fn new() -> Self {
        LogWriter { frames: Vec::new() }
    }
    fn emit(record: &Value) {
        let level = record
            .get_path(&Bits::of_str("lvl"))
            .and_then(|v| v.as_bits().and_then(Bits::to_str));
        match level.as_deref() {
            | Some("error") => log::error!("{}", record),
            | Some("warn") => log::warn!("{}", record),
            | Some("debug") => log::debug!("{}", record),
            | _ => log::info!("{}", record),
        }
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects for LogWriter {
    fn eff(&mut self, request: Value) -> Option<Value> {
        let payload = request.variant_of("log")?;
        match self.frames.last_mut() {
            | Some(frame) => frame.push(payload),
            | None => Self::emit(&payload),
        }
        Some(Value::unit())
    }
    fn begin(&mut self) {
        self.frames.push(Vec::new());
    }
    fn commit(&mut self) {
        let top = self.frames.pop().expect("commit without matching begin");
        match self.frames.last_mut() {
            | Some(frame) => frame.extend(top),
            | None => top.iter().for_each(Self::emit),
        }
    }
    fn abort(&mut self) {
        self.frames.pop().expect("abort without matching begin");
    }
}
