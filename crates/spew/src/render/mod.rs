//! Traversal and rendering of value graphs.
//!
//! Both output styles share one traversal contract: [`Render`] is the set
//! of shape-specific hooks a style provides, and [`dispatch::print_value`]
//! classifies a value and routes it to those hooks. Indirections never reach
//! the dispatcher; each style unwraps them through the [`CycleTracker`].

pub mod cycle;
pub mod dispatch;
pub mod dump;
pub mod format;
pub mod hex;
pub mod methods;
pub mod number;
pub mod sort;

pub use cycle::CycleTracker;
pub use format::Formatter;
pub use hex::{hex_dump, HexDumper};

use crate::config::Config;
use crate::model::{Field, Value};
use crate::util::Pool;

/// Trackers reused across renders.
pub(crate) static TRACKERS: Pool<CycleTracker> = Pool::new(32);
/// Output buffers reused across renders.
pub(crate) static BUFFERS: Pool<String> = Pool::new(32);

pub(crate) const NIL: &str = "<nil>";
pub(crate) const INVALID: &str = "<invalid>";
pub(crate) const MAX_DEPTH_LONG: &str = "<max depth reached>\n";
pub(crate) const MAX_DEPTH_SHORT: &str = "<max>";
pub(crate) const CIRCULAR_LONG: &str = "<already shown>";
pub(crate) const CIRCULAR_SHORT: &str = "<shown>";
pub(crate) const PANIC_OPEN: &str = "(PANIC=";
pub(crate) const POINTER_CHAIN: &str = "->";

/// How a value was reached, which decides what its methods may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Access {
    /// False once the path crosses a non-exported record field.
    pub exported: bool,
    /// True when the value lives behind an indirection.
    pub addressable: bool,
}

impl Access {
    /// A value handed in by the caller.
    pub const TOP: Access = Access {
        exported: true,
        addressable: false,
    };

    /// A record field.
    pub fn field(self, exported: bool) -> Access {
        Access {
            exported: self.exported && exported,
            addressable: self.addressable,
        }
    }

    /// A sequence element. Growable sequences own addressable storage;
    /// fixed arrays inherit from their container.
    pub fn element(self, fixed: bool) -> Access {
        if fixed {
            self
        } else {
            Access {
                addressable: true,
                ..self
            }
        }
    }

    /// A map key or value, or the content of a box.
    pub fn entry(self) -> Access {
        Access {
            addressable: false,
            ..self
        }
    }

    /// The target of an indirection.
    pub fn deref(self) -> Access {
        Access {
            addressable: true,
            ..self
        }
    }
}

/// Borrowed view of a non-nil sequence.
#[derive(Clone, Copy)]
pub(crate) enum SeqView<'v> {
    Bytes(&'v [u8]),
    Items {
        elem: &'v str,
        items: &'v [Value],
        fixed: bool,
    },
}

/// Shape-specific hooks of an output style.
pub(crate) trait Render {
    /// The configuration and the output buffer, borrowed together.
    fn parts(&mut self) -> (&Config, &mut String);

    /// Renders any value, including indirections.
    fn render(&mut self, v: &Value, access: Access);

    fn render_seq(&mut self, v: &Value, seq: SeqView<'_>, access: Access);

    fn render_text(&mut self, s: &str);

    /// Entries come in insertion order; styles sort them once they know
    /// the body will be rendered.
    fn render_map(&mut self, v: &Value, entries: &[(Value, Value)], access: Access);

    fn render_record(&mut self, v: &Value, fields: &[Field], access: Access);

    /// Fallback for shapes the model only knows through `Display`.
    fn render_unknown(&mut self, v: &Value);
}
