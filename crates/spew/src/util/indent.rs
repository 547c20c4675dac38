//! Cached indentation strings.

use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

lazy_static! {
    /// Indentation unit -> strings indexed by depth.
    static ref INDENTS: RwLock<FxHashMap<String, Vec<Arc<str>>>> = RwLock::new(FxHashMap::default());
}

/// Returns `unit` repeated `depth` times.
pub fn indent_for(unit: &str, depth: usize) -> Arc<str> {
    {
        let cache = INDENTS.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(unit).and_then(|by_depth| by_depth.get(depth)) {
            return Arc::clone(hit);
        }
    }

    let mut cache = INDENTS.write().unwrap_or_else(PoisonError::into_inner);
    let by_depth = cache.entry(unit.to_string()).or_default();
    while by_depth.len() <= depth {
        let next = unit.repeat(by_depth.len());
        by_depth.push(Arc::from(next));
    }
    Arc::clone(&by_depth[depth])
}

/// Appends `unit` repeated `depth` times.
pub fn push_indent(out: &mut String, unit: &str, depth: usize) {
    match depth {
        0 => {}
        1 => out.push_str(unit),
        _ => out.push_str(&indent_for(unit, depth)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_for() {
        assert_eq!(&*indent_for(" ", 0), "");
        assert_eq!(&*indent_for(" ", 3), "   ");
        assert_eq!(&*indent_for("\t", 2), "\t\t");
        // Lower depths are filled in along the way.
        assert_eq!(&*indent_for("ab", 1), "ab");
    }

    #[test]
    fn test_push_indent() {
        let mut s = String::from(">");
        push_indent(&mut s, "--", 2);
        assert_eq!(s, ">----");
    }
}
