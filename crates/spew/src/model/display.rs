//! `std::fmt` implementations for [`Value`].
//!
//! These never follow more than one indirection, so they terminate on
//! cyclic graphs without any tracking. Nested indirections print as
//! addresses.

use std::fmt;

use crate::model::{Kind, Value};
use crate::render::number;

/// Plain rendering: no types, `&` before a top-level indirection.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        plain(f, self, true)
    }
}

/// Syntax-like rendering with type names.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        syntax(f, self, true)
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, v: &Value) -> Option<fmt::Result> {
    let mut buf = String::new();
    match v.kind() {
        Kind::Float32(x) => number::write_f32(&mut buf, *x),
        Kind::Float64(x) => number::write_f64(&mut buf, *x),
        Kind::Complex64(re, im) => number::write_complex64(&mut buf, *re, *im),
        Kind::Complex128(re, im) => number::write_complex128(&mut buf, *re, *im),
        _ => return None,
    }
    Some(f.write_str(&buf))
}

fn hex_addr(f: &mut fmt::Formatter<'_>, addr: usize) -> fmt::Result {
    let mut buf = String::new();
    number::write_hex_ptr(&mut buf, addr);
    f.write_str(&buf)
}

fn plain(f: &mut fmt::Formatter<'_>, v: &Value, top: bool) -> fmt::Result {
    if let Some(r) = write_number(f, v) {
        return r;
    }
    match v.kind() {
        Kind::Invalid => f.write_str("<invalid>"),
        Kind::Bool(b) => write!(f, "{b}"),
        Kind::Int(n, _) => write!(f, "{n}"),
        Kind::Uint(n, _) => write!(f, "{n}"),
        Kind::Str(s) => f.write_str(s),
        Kind::Bytes(b) => {
            f.write_str("[")?;
            for (i, byte) in b.data.iter().flatten().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{byte}")?;
            }
            f.write_str("]")
        }
        Kind::Seq(seq) => {
            f.write_str("[")?;
            for (i, item) in seq.items.iter().flatten().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                plain(f, item, false)?;
            }
            f.write_str("]")
        }
        Kind::Map(map) => {
            f.write_str("map[")?;
            for (i, (k, val)) in map.entries.iter().flatten().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                plain(f, k, false)?;
                f.write_str(":")?;
                plain(f, val, false)?;
            }
            f.write_str("]")
        }
        Kind::Record(fields) => {
            f.write_str("{")?;
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                plain(f, &field.value, false)?;
            }
            f.write_str("}")
        }
        Kind::Ptr(p) => match &p.target {
            None => f.write_str("<nil>"),
            Some(cell) if top => match cell.try_borrow() {
                Ok(target)
                    if matches!(
                        target.kind(),
                        Kind::Record(_) | Kind::Seq(_) | Kind::Map(_) | Kind::Bytes(_)
                    ) =>
                {
                    f.write_str("&")?;
                    plain(f, &target, false)
                }
                _ => hex_addr(f, p.addr()),
            },
            Some(_) => hex_addr(f, p.addr()),
        },
        Kind::Boxed(None) => f.write_str("<nil>"),
        Kind::Boxed(Some(inner)) => plain(f, inner, top),
        Kind::Uintptr(addr) => write!(f, "{addr}"),
        Kind::Func(addr) | Kind::RawPtr(addr) | Kind::Chan { addr, .. } => hex_addr(f, *addr),
        Kind::Opaque(o) => fmt::Display::fmt(&**o, f),
        Kind::Float32(_) | Kind::Float64(_) | Kind::Complex64(..) | Kind::Complex128(..) => {
            Ok(())
        }
    }
}

fn syntax(f: &mut fmt::Formatter<'_>, v: &Value, top: bool) -> fmt::Result {
    if let Some(r) = write_number(f, v) {
        return r;
    }
    match v.kind() {
        Kind::Str(s) => write!(f, "{s:?}"),
        Kind::Bytes(b) => match &b.data {
            None => write!(f, "{}(nil)", v.ty()),
            Some(data) => {
                write!(f, "{}{{", v.ty())?;
                for (i, byte) in data.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{byte:#04x}")?;
                }
                f.write_str("}")
            }
        },
        Kind::Seq(seq) => match &seq.items {
            None => write!(f, "{}(nil)", v.ty()),
            Some(items) => {
                write!(f, "{}{{", v.ty())?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    syntax(f, item, false)?;
                }
                f.write_str("}")
            }
        },
        Kind::Map(map) => match &map.entries {
            None => write!(f, "{}(nil)", v.ty()),
            Some(entries) => {
                write!(f, "{}{{", v.ty())?;
                for (i, (k, val)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    syntax(f, k, false)?;
                    f.write_str(": ")?;
                    syntax(f, val, false)?;
                }
                f.write_str("}")
            }
        },
        Kind::Record(fields) => {
            write!(f, "{}{{", v.ty())?;
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: ", field.name)?;
                syntax(f, &field.value, false)?;
            }
            f.write_str("}")
        }
        Kind::Ptr(p) => match &p.target {
            None => write!(f, "({})(nil)", v.ty()),
            Some(cell) if top => match cell.try_borrow() {
                Ok(target) => {
                    f.write_str("&")?;
                    syntax(f, &target, false)
                }
                Err(_) => write!(f, "({})({:#x})", v.ty(), p.addr()),
            },
            Some(_) => write!(f, "({})({:#x})", v.ty(), p.addr()),
        },
        Kind::Boxed(None) => write!(f, "{}(nil)", v.ty()),
        Kind::Boxed(Some(inner)) => syntax(f, inner, top),
        Kind::Uintptr(addr) | Kind::Func(addr) | Kind::RawPtr(addr) | Kind::Chan { addr, .. } => {
            write!(f, "({})({:#x})", v.ty(), addr)
        }
        _ => plain(f, v, top),
    }
}

/// Radix and exponent verbs applied element-wise.
#[derive(Clone, Copy)]
enum Verb {
    LowerHex,
    UpperHex,
    Octal,
    Binary,
    LowerExp,
    UpperExp,
}

impl Verb {
    fn int<T>(self, f: &mut fmt::Formatter<'_>, n: &T) -> fmt::Result
    where
        T: fmt::LowerHex + fmt::UpperHex + fmt::Octal + fmt::Binary + fmt::LowerExp + fmt::UpperExp,
    {
        match self {
            Verb::LowerHex => fmt::LowerHex::fmt(n, f),
            Verb::UpperHex => fmt::UpperHex::fmt(n, f),
            Verb::Octal => fmt::Octal::fmt(n, f),
            Verb::Binary => fmt::Binary::fmt(n, f),
            Verb::LowerExp => fmt::LowerExp::fmt(n, f),
            Verb::UpperExp => fmt::UpperExp::fmt(n, f),
        }
    }

    fn float<T>(self, f: &mut fmt::Formatter<'_>, x: &T) -> Option<fmt::Result>
    where
        T: fmt::LowerExp + fmt::UpperExp,
    {
        match self {
            Verb::LowerExp => Some(fmt::LowerExp::fmt(x, f)),
            Verb::UpperExp => Some(fmt::UpperExp::fmt(x, f)),
            _ => None,
        }
    }

    fn text(self, f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> Option<fmt::Result> {
        let upper = match self {
            Verb::LowerHex => false,
            Verb::UpperHex => true,
            _ => return None,
        };
        Some(bytes.iter().try_for_each(|b| {
            if upper {
                write!(f, "{b:02X}")
            } else {
                write!(f, "{b:02x}")
            }
        }))
    }
}

fn verb(f: &mut fmt::Formatter<'_>, v: &Value, vk: Verb) -> fmt::Result {
    match v.kind() {
        Kind::Int(n, _) => vk.int(f, n),
        Kind::Uint(n, _) => vk.int(f, n),
        Kind::Uintptr(addr) | Kind::Func(addr) | Kind::RawPtr(addr) | Kind::Chan { addr, .. } => {
            vk.int(f, &(*addr as u64))
        }
        Kind::Ptr(p) if !p.is_nil() => vk.int(f, &(p.addr() as u64)),
        Kind::Float32(x) => vk.float(f, x).unwrap_or_else(|| plain(f, v, true)),
        Kind::Float64(x) => vk.float(f, x).unwrap_or_else(|| plain(f, v, true)),
        Kind::Str(s) => vk.text(f, s.as_bytes()).unwrap_or_else(|| plain(f, v, true)),
        Kind::Bytes(b) => {
            let data = b.data.as_deref().unwrap_or_default();
            vk.text(f, data).unwrap_or_else(|| plain(f, v, true))
        }
        Kind::Seq(seq) => {
            f.write_str("[")?;
            for (i, item) in seq.items.iter().flatten().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                verb(f, item, vk)?;
            }
            f.write_str("]")
        }
        Kind::Map(map) => {
            f.write_str("map[")?;
            for (i, (k, val)) in map.entries.iter().flatten().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                verb(f, k, vk)?;
                f.write_str(":")?;
                verb(f, val, vk)?;
            }
            f.write_str("]")
        }
        Kind::Record(fields) => {
            f.write_str("{")?;
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                verb(f, &field.value, vk)?;
            }
            f.write_str("}")
        }
        Kind::Boxed(Some(inner)) => verb(f, inner, vk),
        _ => plain(f, v, true),
    }
}

macro_rules! verb_impls {
    ($($trait:ident => $verb:ident),* $(,)?) => {
        $(
            impl fmt::$trait for Value {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    verb(f, self, Verb::$verb)
                }
            }
        )*
    };
}

verb_impls! {
    LowerHex => LowerHex,
    UpperHex => UpperHex,
    Octal => Octal,
    Binary => Binary,
    LowerExp => LowerExp,
    UpperExp => UpperExp,
}
