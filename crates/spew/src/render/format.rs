//! Compact, single-line rendering through `std::fmt`.
//!
//! A [`Formatter`] plugs a [`Value`] into the standard formatting machinery.
//! The default `{}` verb produces the compact rendering, and two flags add
//! detail:
//!
//! | verb     | output                                          |
//! |----------|-------------------------------------------------|
//! | `{}`     | `{1 <*>{2 <nil>}}`                              |
//! | `{:+}`   | adds pointer chains: `<*>(0x1f00)`              |
//! | `{:#}`   | adds types and field names: `(*Node){v:(i64)1}` |
//! | `{:+#}`  | both                                            |
//!
//! Every other verb (`{:?}`, `{:x}`, `{:e}`, ...) is forwarded to the
//! value's own implementation of that trait, width and flags included.

use std::borrow::Cow;
use std::fmt::{self, Write};

use crate::config::{default_config, Config};
use crate::model::{Field, Kind, Ptr, Value};
use crate::render::cycle::{CycleTracker, Target};
use crate::render::{
    dispatch, number, sort, Access, Render, SeqView, BUFFERS, CIRCULAR_SHORT, INVALID,
    MAX_DEPTH_SHORT, NIL, POINTER_CHAIN, TRACKERS,
};
use crate::util::Pooled;

/// Adapter that renders a [`Value`] through `std::fmt`.
#[derive(Clone)]
pub struct Formatter<'a> {
    value: &'a Value,
    config: Cow<'a, Config>,
}

impl<'a> Formatter<'a> {
    /// Creates a formatter using a snapshot of the shared default
    /// configuration.
    pub fn new(value: &'a Value) -> Self {
        Self {
            value,
            config: Cow::Owned(default_config()),
        }
    }

    /// Creates a formatter bound to `config`.
    pub fn with_config(value: &'a Value, config: &'a Config) -> Self {
        Self {
            value,
            config: Cow::Borrowed(config),
        }
    }

    /// Returns the wrapped value.
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Flags {
    /// `+`: show pointer chains.
    plus: bool,
    /// `#`: show types and field names.
    sharp: bool,
}

impl fmt::Display for Formatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = Flags {
            plus: f.sign_plus(),
            sharp: f.alternate(),
        };
        let mut buf = BUFFERS.acquire();
        render_compact(&mut buf, self.value, &self.config, flags);
        f.write_str(&buf)
    }
}

macro_rules! forward_verbs {
    ($($verb:ident),* $(,)?) => {
        $(
            impl fmt::$verb for Formatter<'_> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::$verb::fmt(self.value, f)
                }
            }
        )*
    };
}

forward_verbs!(Debug, LowerHex, UpperHex, Octal, Binary, LowerExp, UpperExp);

fn render_compact(out: &mut String, mut value: &Value, cfg: &Config, flags: Flags) {
    while let Kind::Boxed(Some(inner)) = value.kind() {
        value = &**inner;
    }
    if let Kind::Boxed(None) = value.kind() {
        if flags.sharp {
            let _ = write!(out, "({})", value.ty());
        }
        out.push_str(NIL);
        return;
    }

    let mut state = FormatState {
        cfg,
        out,
        depth: 0,
        ignore_next_type: false,
        flags,
        tracker: TRACKERS.acquire(),
    };
    state.format(value, Access::TOP);
}

struct FormatState<'a> {
    cfg: &'a Config,
    out: &'a mut String,
    depth: usize,
    ignore_next_type: bool,
    flags: Flags,
    tracker: Pooled<'static, CycleTracker>,
}

impl FormatState<'_> {
    fn format(&mut self, v: &Value, access: Access) {
        match v.kind() {
            Kind::Invalid => {
                self.ignore_next_type = false;
                self.out.push_str(INVALID);
                return;
            }
            Kind::Ptr(ptr) => {
                self.format_ptr(v, ptr, access);
                return;
            }
            _ => {}
        }

        if !self.ignore_next_type && self.flags.sharp {
            let _ = write!(self.out, "({})", v.ty());
        }
        self.ignore_next_type = false;

        dispatch::print_value(self, v, access);
    }

    /// Steps into a box. The inner value shows its own type, so the
    /// suppression set by the enclosing container is lifted.
    fn unpack<'v>(&mut self, v: &'v Value, access: Access) -> (&'v Value, Access) {
        match v.kind() {
            Kind::Boxed(inner) => {
                self.ignore_next_type = false;
                match inner {
                    Some(inner) => (&**inner, access.entry()),
                    None => (v, access),
                }
            }
            _ => (v, access),
        }
    }

    fn format_ptr(&mut self, v: &Value, ptr: &Ptr, access: Access) {
        let show_types = self.flags.sharp;
        if ptr.is_nil() && (!show_types || self.ignore_next_type) {
            self.out.push_str(NIL);
            self.ignore_next_type = false;
            return;
        }

        let unwrapped = self.tracker.unwrap_ptr(ptr, v.type_name(), self.depth);
        let nil_or_cycle = self.tracker.nil_found() || self.tracker.cycle_found();

        let mut stars = self.tracker.indirects();
        if show_types && !self.ignore_next_type {
            self.out.push('(');
            push_stars(self.out, stars);
            self.out.push_str(&unwrapped.ty);
            self.out.push(')');
        } else {
            if nil_or_cycle {
                stars += unwrapped.ty.matches('*').count();
            }
            self.out.push('<');
            push_stars(self.out, stars);
            self.out.push('>');
        }

        if self.flags.plus && !self.tracker.chain().is_empty() {
            self.out.push('(');
            for (i, &addr) in self.tracker.chain().iter().enumerate() {
                if i > 0 {
                    self.out.push_str(POINTER_CHAIN);
                }
                number::write_hex_ptr(self.out, addr);
            }
            self.out.push(')');
        }

        match unwrapped.target {
            Target::Nil => {
                self.out.push_str(NIL);
                self.ignore_next_type = false;
            }
            Target::Cycle => {
                self.out.push_str(CIRCULAR_SHORT);
                self.ignore_next_type = false;
            }
            Target::Locked => {
                self.out.push_str(INVALID);
                self.ignore_next_type = false;
            }
            Target::Value { cell, unboxed } => {
                let borrowed = cell.try_borrow();
                match borrowed {
                    Ok(guard) => {
                        let inner = match (unboxed, guard.kind()) {
                            (true, Kind::Boxed(Some(inner))) => &**inner,
                            _ => &*guard,
                        };
                        self.ignore_next_type = true;
                        self.format(inner, access.deref());
                    }
                    Err(_) => self.out.push_str(INVALID),
                }
            }
        }
    }

    /// Opens a container, renders its entries unless too deep, and closes it.
    fn nested(&mut self, open: &str, close: char, body: impl FnOnce(&mut Self)) {
        self.out.push_str(open);
        self.depth += 1;
        if self.cfg.max_depth != 0 && self.depth > self.cfg.max_depth {
            tracing::trace!(depth = self.depth, "max depth reached");
            self.out.push_str(MAX_DEPTH_SHORT);
        } else {
            body(self);
        }
        self.depth -= 1;
        self.out.push(close);
    }
}

fn push_stars(out: &mut String, n: usize) {
    for _ in 0..n {
        out.push('*');
    }
}

impl Render for FormatState<'_> {
    fn parts(&mut self) -> (&Config, &mut String) {
        (self.cfg, &mut *self.out)
    }

    fn render(&mut self, v: &Value, access: Access) {
        self.format(v, access);
    }

    fn render_seq(&mut self, _v: &Value, seq: SeqView<'_>, access: Access) {
        self.nested("[", ']', |s| match seq {
            SeqView::Bytes(data) => {
                for (i, b) in data.iter().enumerate() {
                    if i > 0 {
                        s.out.push(' ');
                    }
                    number::write_uint(s.out, u64::from(*b));
                }
            }
            SeqView::Items { items, fixed, .. } => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        s.out.push(' ');
                    }
                    s.ignore_next_type = true;
                    let (item, item_access) = s.unpack(item, access.element(fixed));
                    s.format(item, item_access);
                }
            }
        });
    }

    fn render_text(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn render_map(&mut self, _v: &Value, entries: &[(Value, Value)], access: Access) {
        self.nested("map[", ']', |s| {
            let entries = sort::ordered(entries, s.cfg, access);
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    s.out.push(' ');
                }
                s.ignore_next_type = true;
                let (key, key_access) = s.unpack(&entry.0, access.entry());
                s.format(key, key_access);
                s.out.push(':');
                s.ignore_next_type = true;
                let (value, value_access) = s.unpack(&entry.1, access.entry());
                s.format(value, value_access);
            }
        });
    }

    fn render_record(&mut self, _v: &Value, fields: &[Field], access: Access) {
        self.nested("{", '}', |s| {
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    s.out.push(' ');
                }
                if s.flags.plus || s.flags.sharp {
                    s.out.push_str(&field.name);
                    s.out.push(':');
                }
                let (value, value_access) = s.unpack(&field.value, access.field(field.exported));
                s.format(value, value_access);
            }
        });
    }

    fn render_unknown(&mut self, v: &Value) {
        let _ = match (self.flags.plus, self.flags.sharp) {
            (false, false) => write!(self.out, "{v}"),
            (true, false) => write!(self.out, "{v:+}"),
            (false, true) => write!(self.out, "{v:#}"),
            (true, true) => write!(self.out, "{v:+#}"),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{cell_addr, Method};

    fn linked() -> (Value, crate::model::Cell) {
        let second = Value::record("Node")
            .field("v", 2i64)
            .field("next", Value::nil_ptr("Node"))
            .build()
            .into_cell();
        let first = Value::record("Node")
            .field("v", 1i64)
            .field("next", Value::ptr(&second))
            .build();
        (first, second)
    }

    #[test]
    fn test_default_verb() {
        let cfg = Config::default();
        let (first, _second) = linked();
        assert_eq!(
            Formatter::with_config(&first, &cfg).to_string(),
            "{1 <*>{2 <nil>}}"
        );
    }

    #[test]
    fn test_sharp_adds_types_and_names() {
        let cfg = Config::default();
        let (first, _second) = linked();
        assert_eq!(
            format!("{:#}", Formatter::with_config(&first, &cfg)),
            "(Node){v:(i64)1 next:(*Node){v:(i64)2 next:(*Node)<nil>}}"
        );
    }

    #[test]
    fn test_plus_adds_pointer_chain() {
        let cfg = Config::default();
        let (first, second) = linked();
        assert_eq!(
            format!("{:+}", Formatter::with_config(&first, &cfg)),
            format!("{{v:1 next:<*>({:#x}){{v:2 next:<nil>}}}}", cell_addr(&second))
        );
    }

    #[test]
    fn test_sequences_and_maps() {
        let cfg = Config::default();
        let v = Value::seq("i64", vec![Value::int(1), Value::int(2)]);
        assert_eq!(Formatter::with_config(&v, &cfg).to_string(), "[1 2]");
        assert_eq!(format!("{:#}", Formatter::with_config(&v, &cfg)), "(Vec<i64>)[1 2]");

        let bytes = Value::bytes(vec![1, 2, 3]);
        assert_eq!(Formatter::with_config(&bytes, &cfg).to_string(), "[1 2 3]");

        let m = Value::map("String", "i64", vec![("a".into(), Value::int(1))]);
        assert_eq!(Formatter::with_config(&m, &cfg).to_string(), "map[a:1]");

        let nil = Value::nil_seq("i64");
        assert_eq!(Formatter::with_config(&nil, &cfg).to_string(), "<nil>");
        let empty = Value::seq("i64", vec![]);
        assert_eq!(Formatter::with_config(&empty, &cfg).to_string(), "[]");
    }

    #[test]
    fn test_boxed_elements_show_their_type() {
        let cfg = Config::default();
        let v = Value::seq("dyn Any", vec![Value::boxed(Value::int(1)), Value::nil()]);
        assert_eq!(
            format!("{:#}", Formatter::with_config(&v, &cfg)),
            "(Vec<dyn Any>)[(i64)1 (dyn Any)<nil>]"
        );
    }

    #[test]
    fn test_top_level_box() {
        let cfg = Config::default();
        let nil = Value::nil();
        assert_eq!(Formatter::with_config(&nil, &cfg).to_string(), "<nil>");
        assert_eq!(format!("{:#}", Formatter::with_config(&nil, &cfg)), "(dyn Any)<nil>");
        let boxed = Value::boxed(Value::from("s"));
        assert_eq!(format!("{:#}", Formatter::with_config(&boxed, &cfg)), "(String)s");
    }

    #[test]
    fn test_cycle_marker() {
        let cfg = Config::default();
        let node = Value::record("Node")
            .field("next", Value::nil_ptr("Node"))
            .build()
            .into_cell();
        let ptr = Value::ptr(&node);
        node.borrow_mut().set_field("next", ptr.clone());
        assert_eq!(Formatter::with_config(&ptr, &cfg).to_string(), "<*>{<*><shown>}");
        assert_eq!(
            format!("{:#}", Formatter::with_config(&ptr, &cfg)),
            "(*Node){next:(*Node)<shown>}"
        );
    }

    #[test]
    fn test_max_depth() {
        let cfg = Config {
            max_depth: 1,
            ..Config::default()
        };
        let v = Value::seq("Vec<i64>", vec![Value::seq("i64", vec![Value::int(1)])]);
        assert_eq!(Formatter::with_config(&v, &cfg).to_string(), "[[<max>]]");
    }

    #[test]
    fn test_panicking_method_inside_sequence() {
        let cfg = Config::default();
        let bad = Value::int(3).with_string_method(Method::new(|_| panic!("oops")));
        let v = Value::seq("Bad", vec![Value::int(1), bad, Value::int(5)]);
        assert_eq!(
            Formatter::with_config(&v, &cfg).to_string(),
            "[1 (PANIC=oops)3 5]"
        );
    }

    #[test]
    fn test_invalid_values_keep_sibling_types() {
        let cfg = Config::default();
        let cell = Value::invalid().into_cell();
        let v = Value::record("R")
            .field("a", Value::ptr(&cell))
            .field("b", 1i64)
            .build();
        assert_eq!(
            format!("{:#}", Formatter::with_config(&v, &cfg)),
            "(R){a:(*invalid)<invalid> b:(i64)1}"
        );

        let v = Value::record("R")
            .field("a", Value::invalid())
            .field("b", 1i64)
            .build();
        assert_eq!(
            format!("{:#}", Formatter::with_config(&v, &cfg)),
            "(R){a:<invalid> b:(i64)1}"
        );
    }

    #[test]
    fn test_keys_not_sorted_past_max_depth() {
        let calls = std::rc::Rc::new(std::cell::Cell::new(0usize));
        let key = |id: i64| {
            let calls = calls.clone();
            Value::record("K")
                .field("id", id)
                .build()
                .with_string_method(Method::new(move |_| {
                    calls.set(calls.get() + 1);
                    format!("k{id}")
                }))
        };
        let map = Value::map("K", "i64", vec![(key(2), Value::int(0)), (key(1), Value::int(0))]);
        let v = Value::seq("HashMap<K, i64>", vec![map]);

        let shallow = Config {
            max_depth: 1,
            sort_keys: true,
            ..Config::default()
        };
        assert_eq!(Formatter::with_config(&v, &shallow).to_string(), "[map[<max>]]");
        assert_eq!(calls.get(), 0);

        let full = Config {
            sort_keys: true,
            ..Config::default()
        };
        assert_eq!(Formatter::with_config(&v, &full).to_string(), "[map[k1:0 k2:0]]");
    }

    #[test]
    fn test_other_verbs_forward() {
        let cfg = Config::default();
        let v = Value::int(255);
        assert_eq!(format!("{:x}", Formatter::with_config(&v, &cfg)), "ff");
        assert_eq!(format!("{:#06X}", Formatter::with_config(&v, &cfg)), "0x00FF");
        assert_eq!(format!("{:b}", Formatter::with_config(&v, &cfg)), "11111111");
        let s = Value::from("hi");
        assert_eq!(format!("{:?}", Formatter::with_config(&s, &cfg)), "\"hi\"");
    }
}
