//! Classification of values shared by both output styles.

use crate::model::{Kind, Value};
use crate::render::{methods, number, Access, Render, SeqView, INVALID, NIL};

/// Renders a value that is not an indirection.
///
/// Self-description runs first unless disabled; if it produced the final
/// text nothing else is written. Scalars are written directly and
/// containers are handed to the style's hooks.
pub(crate) fn print_value<R: Render>(r: &mut R, v: &Value, access: Access) {
    if !matches!(v.kind(), Kind::Ptr(_) | Kind::Boxed(_) | Kind::Invalid) {
        let (cfg, out) = r.parts();
        if !cfg.disable_methods && methods::handle_methods(cfg, out, v, access) {
            return;
        }
    }

    match v.kind() {
        Kind::Invalid => r.parts().1.push_str(INVALID),
        Kind::Bool(b) => r.parts().1.push_str(if *b { "true" } else { "false" }),
        Kind::Int(n, _) => number::write_int(r.parts().1, *n),
        Kind::Uint(n, _) => number::write_uint(r.parts().1, *n),
        Kind::Float32(x) => number::write_f32(r.parts().1, *x),
        Kind::Float64(x) => number::write_f64(r.parts().1, *x),
        Kind::Complex64(re, im) => number::write_complex64(r.parts().1, *re, *im),
        Kind::Complex128(re, im) => number::write_complex128(r.parts().1, *re, *im),
        Kind::Str(s) => r.render_text(s),
        Kind::Bytes(b) => match &b.data {
            None => r.parts().1.push_str(NIL),
            Some(data) => r.render_seq(v, SeqView::Bytes(data), access),
        },
        Kind::Seq(seq) => match &seq.items {
            None => r.parts().1.push_str(NIL),
            Some(items) => {
                let view = SeqView::Items {
                    elem: &seq.elem,
                    items,
                    fixed: seq.fixed,
                };
                r.render_seq(v, view, access);
            }
        },
        Kind::Map(map) => match &map.entries {
            None => r.parts().1.push_str(NIL),
            Some(entries) => r.render_map(v, entries, access),
        },
        Kind::Record(fields) => r.render_record(v, fields, access),
        Kind::Boxed(None) => r.parts().1.push_str(NIL),
        Kind::Boxed(Some(inner)) => r.render(inner, access.entry()),
        // Styles unwrap indirections before dispatching; only the address
        // is left to show here.
        Kind::Ptr(p) => number::write_hex_ptr(r.parts().1, p.addr()),
        Kind::Uintptr(addr) | Kind::Func(addr) | Kind::RawPtr(addr) | Kind::Chan { addr, .. } => {
            number::write_hex_ptr(r.parts().1, *addr)
        }
        Kind::Opaque(_) => r.render_unknown(v),
    }
}
