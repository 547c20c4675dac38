//! Invocation of self-description methods.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::config::{unsafe_introspection_available, Config};
use crate::model::{Method, Receiver, Value};
use crate::render::{Access, PANIC_OPEN};

/// A self-description capability found on a value.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Capability<'v> {
    Error(&'v Method),
    Stringer(&'v Method),
}

impl<'v> Capability<'v> {
    fn method(self) -> &'v Method {
        match self {
            Capability::Error(m) | Capability::Stringer(m) => m,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Capability::Error(_) => "error",
            Capability::Stringer(_) => "string",
        }
    }
}

/// Returns the capability to invoke, preferring the error-like one.
/// Pointer-receiver methods are only visible when `addressable` holds.
pub(crate) fn capability(v: &Value, addressable: bool) -> Option<Capability<'_>> {
    let visible = |m: &&Method| m.receiver() == Receiver::Value || addressable;
    let methods = v.methods();
    if let Some(m) = methods.error.as_ref().filter(visible) {
        return Some(Capability::Error(m));
    }
    methods.string.as_ref().filter(visible).map(Capability::Stringer)
}

/// Writes the self-description of `v` to `out` if it has one.
///
/// Returns true when the description replaces the structural rendering.
/// A panicking method leaves a `(PANIC=...)` marker and returns false so
/// the structure is still rendered.
pub(crate) fn handle_methods(cfg: &Config, out: &mut String, v: &Value, access: Access) -> bool {
    invoke(cfg, out, v, access, unsafe_introspection_available())
}

fn invoke(cfg: &Config, out: &mut String, v: &Value, access: Access, bypass: bool) -> bool {
    if v.methods().is_empty() {
        return false;
    }

    let mut addressable = access.addressable;
    if !access.exported {
        if !bypass {
            return false;
        }
        addressable = true;
    }
    if !cfg.disable_pointer_methods && bypass {
        addressable = true;
    }

    let Some(cap) = capability(v, addressable) else {
        return false;
    };

    match panic::catch_unwind(AssertUnwindSafe(|| cap.method().call(v))) {
        Ok(text) if cfg.continue_on_method => {
            out.push('(');
            out.push_str(&text);
            out.push_str(") ");
            false
        }
        Ok(text) => {
            out.push_str(&text);
            true
        }
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            tracing::debug!(
                ty = v.ty(),
                kind = v.kind().label(),
                method = cap.label(),
                %msg,
                "self-description panicked"
            );
            out.push_str(PANIC_OPEN);
            out.push_str(&msg);
            out.push(')');
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}
