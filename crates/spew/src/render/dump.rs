//! Verbose, multi-line rendering.
//!
//! Every value is annotated with its type, and with its length and capacity
//! where they are meaningful:
//!
//! ```text
//! (Point) {
//!  x: (i64) 1,
//!  tags: (Vec<String>) (len=1 cap=4) {
//!   (String) (len=3) "new"
//!  }
//! }
//! ```

use std::fmt::Write;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::Config;
use crate::model::{Field, IntWidth, Kind, Ptr, Value};
use crate::render::cycle::{CycleTracker, Target};
use crate::render::{
    dispatch, hex, number, sort, Access, Render, SeqView, CIRCULAR_LONG, INVALID, MAX_DEPTH_LONG,
    NIL, POINTER_CHAIN, TRACKERS,
};
use crate::util::indent::{indent_for, push_indent};
use crate::util::{Pooled, Reset};

lazy_static! {
    /// Element types that hold C characters and are shown as a hex dump.
    static ref C_CHAR_TYPE: Regex =
        Regex::new(r"^(?:.*::)?(?:c_char|c_uchar|uint8_t)$").expect("valid regex");
}

/// Appends the verbose rendering of each value, one per line.
pub(crate) fn dump_all(cfg: &Config, out: &mut String, values: &[&Value]) {
    let mut state = DumpState::new(cfg, out);
    for &value in values {
        state.dump_top(value);
    }
}

struct DumpState<'a> {
    cfg: &'a Config,
    out: &'a mut String,
    depth: usize,
    ignore_next_type: bool,
    ignore_next_indent: bool,
    tracker: Pooled<'static, CycleTracker>,
}

impl<'a> DumpState<'a> {
    fn new(cfg: &'a Config, out: &'a mut String) -> Self {
        Self {
            cfg,
            out,
            depth: 0,
            ignore_next_type: false,
            ignore_next_indent: false,
            tracker: TRACKERS.acquire(),
        }
    }

    fn dump_top(&mut self, mut value: &Value) {
        while let Kind::Boxed(Some(inner)) = value.kind() {
            value = &**inner;
        }
        if let Kind::Boxed(None) = value.kind() {
            let _ = writeln!(self.out, "({}) {NIL}", value.ty());
            return;
        }

        self.tracker.reset();
        self.depth = 0;
        self.ignore_next_type = false;
        self.ignore_next_indent = false;
        self.dump(value, Access::TOP);
        self.out.push('\n');
    }

    fn indent(&mut self) {
        if self.ignore_next_indent {
            self.ignore_next_indent = false;
            return;
        }
        push_indent(self.out, &self.cfg.indent, self.depth);
    }

    fn depth_exceeded(&self) -> bool {
        self.cfg.max_depth != 0 && self.depth > self.cfg.max_depth
    }

    fn dump(&mut self, v: &Value, access: Access) {
        match v.kind() {
            Kind::Invalid => {
                if !self.ignore_next_type {
                    self.indent();
                }
                self.ignore_next_type = false;
                self.out.push_str(INVALID);
                return;
            }
            Kind::Ptr(ptr) => {
                self.indent();
                self.dump_ptr(v, ptr, access);
                return;
            }
            _ => {}
        }

        if !self.ignore_next_type {
            self.indent();
            let _ = write!(self.out, "({}) ", v.ty());
        }
        self.ignore_next_type = false;

        self.write_len_cap(v);
        dispatch::print_value(self, v, access);
    }

    fn write_len_cap(&mut self, v: &Value) {
        let (len, cap) = match v.kind() {
            Kind::Bytes(b) => (b.len(), b.cap),
            Kind::Seq(s) => (s.len(), s.cap),
            Kind::Chan { len, cap, .. } => (*len, *cap),
            Kind::Map(m) => (m.len(), 0),
            Kind::Str(s) => (s.len(), 0),
            _ => return,
        };
        let show_cap = !self.cfg.disable_capacities && cap != 0;
        if len == 0 && !show_cap {
            return;
        }

        self.out.push('(');
        if len != 0 {
            let _ = write!(self.out, "len={len}");
        }
        if show_cap {
            if len != 0 {
                self.out.push(' ');
            }
            let _ = write!(self.out, "cap={cap}");
        }
        self.out.push_str(") ");
    }

    fn dump_ptr(&mut self, v: &Value, ptr: &Ptr, access: Access) {
        let unwrapped = self.tracker.unwrap_ptr(ptr, v.type_name(), self.depth);

        self.out.push('(');
        for _ in 0..self.tracker.indirects() {
            self.out.push('*');
        }
        self.out.push_str(&unwrapped.ty);
        self.out.push(')');

        if !self.cfg.disable_pointer_addresses && !self.tracker.chain().is_empty() {
            self.out.push('(');
            for (i, &addr) in self.tracker.chain().iter().enumerate() {
                if i > 0 {
                    self.out.push_str(POINTER_CHAIN);
                }
                number::write_hex_ptr(self.out, addr);
            }
            self.out.push(')');
        }

        self.out.push('(');
        match unwrapped.target {
            Target::Nil => self.out.push_str(NIL),
            Target::Cycle => self.out.push_str(CIRCULAR_LONG),
            Target::Locked => self.out.push_str(INVALID),
            Target::Value { cell, unboxed } => {
                let borrowed = cell.try_borrow();
                match borrowed {
                    Ok(guard) => {
                        let inner = match (unboxed, guard.kind()) {
                            (true, Kind::Boxed(Some(inner))) => &**inner,
                            _ => &*guard,
                        };
                        self.ignore_next_type = true;
                        self.dump(inner, access.deref());
                    }
                    Err(_) => self.out.push_str(INVALID),
                }
            }
        }
        self.out.push(')');
    }

    /// Opens a container, renders its entries unless too deep, and closes it.
    fn nested(&mut self, body: impl FnOnce(&mut Self)) {
        self.out.push_str("{\n");
        self.depth += 1;
        if self.depth_exceeded() {
            tracing::trace!(depth = self.depth, "max depth reached");
            self.indent();
            self.out.push_str(MAX_DEPTH_LONG);
        } else {
            body(self);
        }
        self.depth -= 1;
        self.indent();
        self.out.push('}');
    }

    fn end_entry(&mut self, i: usize, n: usize) {
        self.out.push_str(if i + 1 < n { ",\n" } else { "\n" });
    }

    fn hex_dump(&mut self, data: &[u8]) {
        let indent = indent_for(&self.cfg.indent, self.depth);
        let _ = hex::hex_dump(self.out, data, &indent);
    }

    fn dump_items(&mut self, elem: &str, items: &[Value], fixed: bool, access: Access) {
        if let Some(bytes) = byte_like(elem, items) {
            self.hex_dump(&bytes);
            return;
        }
        let n = items.len();
        for (i, item) in items.iter().enumerate() {
            let (item, item_access) = unpack(item, access.element(fixed));
            self.dump(item, item_access);
            self.end_entry(i, n);
        }
    }
}

/// Steps into a non-empty box.
fn unpack(v: &Value, access: Access) -> (&Value, Access) {
    match v.kind() {
        Kind::Boxed(Some(inner)) => (&**inner, access.entry()),
        _ => (v, access),
    }
}

/// Returns the bytes of a sequence that should be shown as a hex dump: C
/// character types, or 8-bit unsigned integers.
fn byte_like(elem: &str, items: &[Value]) -> Option<Vec<u8>> {
    let first = items.first()?;
    let is_bytes =
        C_CHAR_TYPE.is_match(elem) || matches!(first.kind(), Kind::Uint(_, IntWidth::W8));
    if !is_bytes {
        return None;
    }
    items
        .iter()
        .map(|item| match item.kind() {
            Kind::Int(n, _) => Some(*n as u8),
            Kind::Uint(n, _) => Some(*n as u8),
            _ => None,
        })
        .collect()
}

impl Render for DumpState<'_> {
    fn parts(&mut self) -> (&Config, &mut String) {
        (self.cfg, &mut *self.out)
    }

    fn render(&mut self, v: &Value, access: Access) {
        self.dump(v, access);
    }

    fn render_seq(&mut self, _v: &Value, seq: SeqView<'_>, access: Access) {
        self.nested(|d| match seq {
            SeqView::Bytes(data) => d.hex_dump(data),
            SeqView::Items { elem, items, fixed } => d.dump_items(elem, items, fixed, access),
        });
    }

    fn render_text(&mut self, s: &str) {
        let _ = write!(self.out, "{s:?}");
    }

    fn render_map(&mut self, _v: &Value, entries: &[(Value, Value)], access: Access) {
        self.nested(|d| {
            let entries = sort::ordered(entries, d.cfg, access);
            let n = entries.len();
            for (i, (key, value)) in entries.iter().map(|e| (&e.0, &e.1)).enumerate() {
                let (key, key_access) = unpack(key, access.entry());
                d.dump(key, key_access);
                d.out.push_str(": ");
                d.ignore_next_indent = true;
                let (value, value_access) = unpack(value, access.entry());
                d.dump(value, value_access);
                d.end_entry(i, n);
            }
        });
    }

    fn render_record(&mut self, _v: &Value, fields: &[Field], access: Access) {
        self.nested(|d| {
            let n = fields.len();
            for (i, field) in fields.iter().enumerate() {
                d.indent();
                d.out.push_str(&field.name);
                d.out.push_str(": ");
                d.ignore_next_indent = true;
                let (value, value_access) = unpack(&field.value, access.field(field.exported));
                d.dump(value, value_access);
                d.end_entry(i, n);
            }
        });
    }

    fn render_unknown(&mut self, v: &Value) {
        let _ = write!(self.out, "{v}");
    }
}
