//! Deterministic ordering of map entries.
//!
//! Keys of one simple shape sort natively. Anything else sorts by a textual
//! surrogate: the self-description when every key has one, then the compact
//! typed rendering when `spew_keys` is set, and finally the plain `Display`
//! text. All sorts are stable and every comparison is a total order.

use std::cmp::Ordering;

use crate::config::Config;
use crate::model::{Kind, Value};
use crate::render::format::Formatter;
use crate::render::{methods, Access};

/// Returns the entries in rendering order: sorted by key when
/// `sort_keys` is set, in insertion order otherwise.
pub(crate) fn ordered<'e>(
    entries: &'e [(Value, Value)],
    cfg: &Config,
    access: Access,
) -> Vec<&'e (Value, Value)> {
    let mut ordered: Vec<&(Value, Value)> = entries.iter().collect();
    if cfg.sort_keys {
        sort_entries(&mut ordered, cfg, access);
    }
    ordered
}

/// Sorts map entries by key.
pub(crate) fn sort_entries(entries: &mut [&(Value, Value)], cfg: &Config, access: Access) {
    let Some(first) = entries.first() else {
        return;
    };

    if let Some(class) = simple_class(&first.0) {
        if entries.iter().all(|e| simple_class(&e.0) == Some(class)) {
            entries.sort_by(|a, b| cmp_keys(&a.0, &b.0));
            return;
        }
    }

    let keys = match surrogate_keys(entries, cfg, access) {
        Some(keys) => keys,
        None => entries.iter().map(|e| e.0.to_string()).collect(),
    };
    let mut keyed: Vec<(String, &(Value, Value))> =
        keys.into_iter().zip(entries.iter().copied()).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    for (slot, (_, entry)) in entries.iter_mut().zip(keyed) {
        *slot = entry;
    }
}

fn surrogate_keys(
    entries: &[&(Value, Value)],
    cfg: &Config,
    access: Access,
) -> Option<Vec<String>> {
    if !cfg.disable_methods {
        let mut keys = Vec::with_capacity(entries.len());
        for entry in entries {
            let mut text = String::new();
            if !methods::handle_methods(cfg, &mut text, &entry.0, access.entry()) {
                break;
            }
            keys.push(text);
        }
        if keys.len() == entries.len() {
            return Some(keys);
        }
    }

    if cfg.spew_keys {
        return Some(
            entries
                .iter()
                .map(|e| format!("{:#}", Formatter::with_config(&e.0, cfg)))
                .collect(),
        );
    }
    None
}

/// Shapes whose keys compare natively. Keys of different classes never
/// compare natively with each other.
fn simple_class(v: &Value) -> Option<u8> {
    Some(match v.kind() {
        Kind::Bool(_) => 0,
        Kind::Int(..) => 1,
        Kind::Uint(..) => 2,
        Kind::Float32(_) | Kind::Float64(_) => 3,
        Kind::Str(_) => 4,
        Kind::Uintptr(_) => 5,
        Kind::Seq(s) if s.fixed => 6,
        Kind::Bytes(b) if b.fixed => 7,
        _ => return None,
    })
}

fn rank(v: &Value) -> u16 {
    match simple_class(v) {
        Some(class) => u16::from(class),
        None => 0x100,
    }
}

/// Total order over keys: by class first, natively within a simple class,
/// and by `Display` text otherwise.
fn cmp_keys(a: &Value, b: &Value) -> Ordering {
    rank(a).cmp(&rank(b)).then_with(|| match (a.kind(), b.kind()) {
        (Kind::Bool(x), Kind::Bool(y)) => x.cmp(y),
        (Kind::Int(x, _), Kind::Int(y, _)) => x.cmp(y),
        (Kind::Uint(x, _), Kind::Uint(y, _)) => x.cmp(y),
        (Kind::Float32(x), Kind::Float32(y)) => x.total_cmp(y),
        (Kind::Float64(x), Kind::Float64(y)) => x.total_cmp(y),
        (Kind::Float32(x), Kind::Float64(y)) => f64::from(*x).total_cmp(y),
        (Kind::Float64(x), Kind::Float32(y)) => x.total_cmp(&f64::from(*y)),
        (Kind::Str(x), Kind::Str(y)) => x.cmp(y),
        (Kind::Uintptr(x), Kind::Uintptr(y)) => x.cmp(y),
        (Kind::Bytes(x), Kind::Bytes(y)) => x.data.cmp(&y.data),
        (Kind::Seq(x), Kind::Seq(y)) => {
            let xs = x.items.as_deref().unwrap_or_default();
            let ys = y.items.as_deref().unwrap_or_default();
            xs.iter()
                .zip(ys)
                .map(|(x, y)| cmp_keys(x, y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| xs.len().cmp(&ys.len()))
        }
        _ => a.to_string().cmp(&b.to_string()),
    })
}
