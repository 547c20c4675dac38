//! Deep, cycle-safe pretty printing for dynamic value graphs.
//!
//! This crate renders arbitrary value graphs for debugging, in two styles:
//!
//! - **Verbose** ([`dump`], [`sdump`], [`fdump`]): multi-line and fully
//!   annotated with types, lengths, capacities and indirection addresses.
//!   Byte buffers are shown as a classic hex dump.
//! - **Compact** ([`formatter`], [`sprint`], [`fprint`]): single-line, driven
//!   by `std::fmt` flags (`{}`, `{:+}`, `{:#}`, `{:+#}`).
//!
//! Both styles follow indirections to any depth, detect cycles and print a
//! marker instead of looping, honor an optional depth limit, prefer a
//! value's own self-description (containing any panic it raises), and can
//! sort map keys for stable output.
//!
//! # Quick Start
//!
//! ```rust
//! use spew::{Config, Value};
//!
//! // A node whose `next` field points back at itself.
//! let node = Value::record("Node")
//!     .field("v", 1i64)
//!     .field("next", Value::nil_ptr("Node"))
//!     .build()
//!     .into_cell();
//! let ptr = Value::ptr(&node);
//! node.borrow_mut().set_field("next", ptr.clone());
//!
//! let cfg = Config::builder().disable_pointer_addresses(true).build();
//! assert_eq!(
//!     cfg.sdump(&[&ptr]),
//!     "(*Node)({\n v: (i64) 1,\n next: (*Node)(<already shown>)\n})\n"
//! );
//! assert_eq!(format!("{}", cfg.formatter(&ptr)), "<*>{1 <*><shown>}");
//! ```
//!
//! # Modules
//!
//! - [`model`]: The dynamic value model (Value, Kind, Field, builders)
//! - [`render`]: Traversal, cycle tracking and both output styles
//! - [`config`]: Rendering options and the shared default configuration
//! - [`error`]: Error types
//!
//! # Self-description
//!
//! A value may carry an error-like and a string-like method (see
//! [`Method`]). When present and visible, its text replaces the structural
//! rendering. A method that panics leaves a `(PANIC=message)` marker and the
//! structure is rendered after it.

pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod util;

use std::io;

// Re-export commonly used types at crate root
pub use config::{
    default_config, set_default_config, unsafe_introspection_available, update_default_config,
    Config, ConfigBuilder,
};
pub use error::DumpError;
pub use model::{Cell, Field, IntWidth, Kind, MapBuilder, Method, Methods, RecordBuilder, Value};
pub use render::{hex_dump, Formatter};

/// Writes the verbose rendering of `values` to standard output using the
/// default configuration.
pub fn dump(values: &[&Value]) {
    default_config().dump(values);
}

/// Writes the verbose rendering of `values` to `w` using the default
/// configuration.
pub fn fdump<W: io::Write + ?Sized>(w: &mut W, values: &[&Value]) -> Result<(), DumpError> {
    default_config().fdump(w, values)
}

/// Returns the verbose rendering of `values` using the default
/// configuration.
pub fn sdump(values: &[&Value]) -> String {
    default_config().sdump(values)
}

/// Wraps `value` for compact rendering with the default configuration.
pub fn formatter(value: &Value) -> Formatter<'_> {
    Formatter::new(value)
}

/// Returns the compact rendering of `values` using the default
/// configuration.
pub fn sprint(values: &[&Value]) -> String {
    default_config().sprint(values)
}

/// Writes the compact rendering of `values` to `w` using the default
/// configuration.
pub fn fprint<W: io::Write + ?Sized>(w: &mut W, values: &[&Value]) -> Result<usize, DumpError> {
    default_config().fprint(w, values)
}
