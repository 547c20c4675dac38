//! Self-description capabilities attached to values.

use std::fmt;
use std::rc::Rc;

use crate::model::Value;

/// Produces the textual self-description of a value.
pub type MethodFn = Rc<dyn Fn(&Value) -> String>;

/// How a self-description is bound to its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// Callable on the value itself.
    Value,
    /// Only callable once the value is addressable.
    Pointer,
}

/// A self-description method.
#[derive(Clone)]
pub struct Method {
    receiver: Receiver,
    func: MethodFn,
}

impl Method {
    /// Creates a method with a value receiver.
    pub fn new(f: impl Fn(&Value) -> String + 'static) -> Self {
        Self {
            receiver: Receiver::Value,
            func: Rc::new(f),
        }
    }

    /// Creates a method with a pointer receiver.
    pub fn pointer(f: impl Fn(&Value) -> String + 'static) -> Self {
        Self {
            receiver: Receiver::Pointer,
            func: Rc::new(f),
        }
    }

    /// Returns how the method is bound.
    pub fn receiver(&self) -> Receiver {
        self.receiver
    }

    /// Invokes the method. May panic; callers catch.
    pub(crate) fn call(&self, value: &Value) -> String {
        (self.func)(value)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}

/// The closed set of self-description capabilities a value may carry.
#[derive(Debug, Clone, Default)]
pub struct Methods {
    /// Error-like description; preferred over `string`.
    pub error: Option<Method>,
    /// String-like description.
    pub string: Option<Method>,
}

impl Methods {
    /// Returns true if no capability is attached.
    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.string.is_none()
    }
}
