//! Cycle detection while unwrapping chains of indirections.

use rustc_hash::FxHashMap;

use crate::model::{cell_addr, Cell, Kind, Ptr, TypeName};
use crate::util::pool::Reset;

/// Tracks the indirections followed during one render.
///
/// Every identity seen on the active descent is remembered together with the
/// depth it was first reached at. Each unwrap pass first forgets identities
/// recorded at or below its own depth, so a target shared by two sibling
/// branches is not mistaken for a cycle.
#[derive(Debug, Default)]
pub struct CycleTracker {
    seen: FxHashMap<usize, usize>,
    chain: Vec<usize>,
    indirects: usize,
    nil_found: bool,
    cycle_found: bool,
}

impl CycleTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts an unwrap pass at `depth`.
    pub fn begin_unwrap(&mut self, depth: usize) {
        self.chain.clear();
        self.seen.retain(|_, d| *d < depth);
        self.indirects = 0;
        self.nil_found = false;
        self.cycle_found = false;
    }

    /// Records `id` as the next link of the current pass.
    ///
    /// Returns false when `id` is a back-reference, which ends the pass.
    /// After [`begin_unwrap`](Self::begin_unwrap), every remembered identity
    /// is either an ancestor (shallower depth) or an earlier link of this
    /// pass, so both count as cycles and every pass terminates.
    pub fn follow(&mut self, id: usize, depth: usize) -> bool {
        self.chain.push(id);
        if self.seen.contains_key(&id) {
            self.cycle_found = true;
            return false;
        }
        self.indirects += 1;
        self.seen.insert(id, depth);
        true
    }

    /// Records that the chain ended at a nil link.
    pub fn mark_nil(&mut self) {
        self.nil_found = true;
    }

    /// Number of indirections followed in the current pass.
    pub fn indirects(&self) -> usize {
        self.indirects
    }

    pub fn nil_found(&self) -> bool {
        self.nil_found
    }

    pub fn cycle_found(&self) -> bool {
        self.cycle_found
    }

    /// Identities followed in the current pass, in order.
    pub fn chain(&self) -> &[usize] {
        &self.chain
    }

    /// Follows `ptr` (of type `ty`) down to the first value that is not an
    /// indirection, unpacking boxes met along the way.
    pub(crate) fn unwrap_ptr(&mut self, ptr: &Ptr, ty: &TypeName, depth: usize) -> Unwrapped {
        self.begin_unwrap(depth);

        let mut ty = ty.clone();
        let mut next = ptr.target.clone();
        loop {
            let Some(cell) = next.take() else {
                self.mark_nil();
                return Unwrapped::new(Target::Nil, ty);
            };
            if !self.follow(cell_addr(&cell), depth) {
                tracing::trace!(depth, ty = &*ty, "cycle detected");
                return Unwrapped::new(Target::Cycle, ty);
            }

            let step = match cell.try_borrow() {
                Err(_) => Step::Locked,
                Ok(inner) => match inner.kind() {
                    Kind::Ptr(p) => Step::Next(p.target.clone(), inner.type_name().clone()),
                    Kind::Boxed(None) => Step::Nil(inner.type_name().clone()),
                    Kind::Boxed(Some(boxed)) => match boxed.kind() {
                        Kind::Ptr(p) => Step::Next(p.target.clone(), boxed.type_name().clone()),
                        _ => Step::Done(true, boxed.type_name().clone()),
                    },
                    _ => Step::Done(false, inner.type_name().clone()),
                },
            };

            match step {
                Step::Next(target, next_ty) => {
                    next = target;
                    ty = next_ty;
                }
                Step::Nil(nil_ty) => {
                    self.mark_nil();
                    return Unwrapped::new(Target::Nil, nil_ty);
                }
                Step::Done(unboxed, value_ty) => {
                    return Unwrapped::new(Target::Value { cell, unboxed }, value_ty);
                }
                Step::Locked => {
                    // The pointee cannot be read, so name it after the
                    // indirection that reached it.
                    let elem = ty.strip_prefix('*').map_or_else(|| ty.clone(), TypeName::from);
                    return Unwrapped::new(Target::Locked, elem);
                }
            }
        }
    }
}

impl Reset for CycleTracker {
    fn reset(&mut self) {
        self.seen.clear();
        self.begin_unwrap(0);
    }
}

enum Step {
    Next(Option<Cell>, TypeName),
    Nil(TypeName),
    Done(bool, TypeName),
    Locked,
}

/// Where an unwrap pass ended.
pub(crate) enum Target {
    Nil,
    Cycle,
    /// The cell is mutably borrowed elsewhere.
    Locked,
    /// A concrete value; `unboxed` means it sits inside a box in `cell`.
    Value { cell: Cell, unboxed: bool },
}

/// Result of an unwrap pass.
pub(crate) struct Unwrapped {
    pub target: Target,
    /// Type of the value the pass stopped at.
    pub ty: TypeName,
}

impl Unwrapped {
    fn new(target: Target, ty: TypeName) -> Self {
        Self { target, ty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn ptr_of(v: &Value) -> &Ptr {
        match v.kind() {
            Kind::Ptr(p) => p,
            _ => panic!("expected Ptr"),
        }
    }

    #[test]
    fn test_follow_flags_ancestor() {
        let mut t = CycleTracker::new();
        t.begin_unwrap(0);
        assert!(t.follow(0x10, 0));
        t.begin_unwrap(1);
        assert!(!t.follow(0x10, 1));
        assert!(t.cycle_found());
        assert_eq!(t.indirects(), 0);
        assert_eq!(t.chain(), &[0x10]);
    }

    #[test]
    fn test_sibling_branches_are_not_cycles() {
        let mut t = CycleTracker::new();
        t.begin_unwrap(1);
        assert!(t.follow(0x10, 1));
        // Same target reached again from a sibling at the same depth.
        t.begin_unwrap(1);
        assert!(t.follow(0x10, 1));
        assert!(!t.cycle_found());
    }

    #[test]
    fn test_unwrap_counts_indirections() {
        let cell = Value::int(7).into_cell();
        let p1 = Value::ptr(&cell).into_cell();
        let p2 = Value::ptr(&p1);

        let mut t = CycleTracker::new();
        let un = t.unwrap_ptr(ptr_of(&p2), p2.type_name(), 0);
        assert_eq!(t.indirects(), 2);
        assert_eq!(t.chain(), &[cell_addr(&p1), cell_addr(&cell)]);
        assert_eq!(&*un.ty, "i64");
        assert!(matches!(un.target, Target::Value { unboxed: false, .. }));
    }

    #[test]
    fn test_unwrap_nil_keeps_pointer_type() {
        let nil = Value::nil_ptr("Node");
        let mut t = CycleTracker::new();
        let un = t.unwrap_ptr(ptr_of(&nil), nil.type_name(), 0);
        assert!(t.nil_found());
        assert_eq!(t.indirects(), 0);
        assert_eq!(&*un.ty, "*Node");
        assert!(matches!(un.target, Target::Nil));
    }

    #[test]
    fn test_unwrap_through_box() {
        let cell = Value::boxed(Value::from("x")).into_cell();
        let p = Value::ptr(&cell);
        let mut t = CycleTracker::new();
        let un = t.unwrap_ptr(ptr_of(&p), p.type_name(), 0);
        assert_eq!(&*un.ty, "String");
        assert!(matches!(un.target, Target::Value { unboxed: true, .. }));

        let empty = Value::nil().into_cell();
        let p = Value::ptr(&empty);
        let un = t.unwrap_ptr(ptr_of(&p), p.type_name(), 0);
        assert!(t.nil_found());
        assert_eq!(&*un.ty, "dyn Any");
    }

    #[test]
    fn test_pure_pointer_loop_terminates() {
        let a = Value::nil_ptr("Loop").into_cell();
        let b = Value::ptr(&a).into_cell();
        let to_b = Value::ptr(&b);
        a.borrow_mut().set_target(&b);

        let mut t = CycleTracker::new();
        let un = t.unwrap_ptr(ptr_of(&to_b), to_b.type_name(), 0);
        assert!(matches!(un.target, Target::Cycle));
        assert_eq!(t.indirects(), 2);
        assert_eq!(t.chain().len(), 3);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut t = CycleTracker::new();
        t.begin_unwrap(0);
        t.follow(1, 0);
        t.mark_nil();
        t.reset();
        assert!(t.chain().is_empty());
        assert!(!t.nil_found());
        t.begin_unwrap(5);
        assert!(t.follow(1, 5));
    }
}
