//! The dynamic value model.
//!
//! Rust has no runtime reflection, so values to be rendered are described
//! explicitly: a [`Value`] carries its concrete type name, its shape and any
//! self-description methods. Indirections point at shared [`Cell`]s, which
//! lets a value graph contain sharing and cycles.

mod builder;
mod display;
mod method;
mod value;

pub use builder::{MapBuilder, RecordBuilder};
pub use method::{Method, MethodFn, Methods, Receiver};
pub use value::{cell_addr, Bytes, Cell, Field, IntWidth, Kind, Map, Ptr, Seq, TypeName, Value};
