//! Dynamic values rendered by the dumper and the compact formatter.
//!
//! A [`Value`] pairs a concrete type name with its classified [`Kind`] and an
//! optional set of self-description [`Methods`]. Indirections share their
//! targets through `Rc<RefCell<Value>>` cells, so graphs may be cyclic.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::model::{Method, Methods};

/// Concrete type name of a value.
pub type TypeName = Rc<str>;

/// Shared, mutable target of an indirection.
pub type Cell = Rc<RefCell<Value>>;

/// Bit width of an integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    /// Pointer-sized (`isize` / `usize`).
    Size,
}

impl IntWidth {
    /// Returns the default Rust spelling of a signed integer of this width.
    pub fn signed_name(self) -> &'static str {
        match self {
            IntWidth::W8 => "i8",
            IntWidth::W16 => "i16",
            IntWidth::W32 => "i32",
            IntWidth::W64 => "i64",
            IntWidth::Size => "isize",
        }
    }

    /// Returns the default Rust spelling of an unsigned integer of this width.
    pub fn unsigned_name(self) -> &'static str {
        match self {
            IntWidth::W8 => "u8",
            IntWidth::W16 => "u16",
            IntWidth::W32 => "u32",
            IntWidth::W64 => "u64",
            IntWidth::Size => "usize",
        }
    }
}

/// A byte sequence: either a growable buffer or a fixed-size array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bytes {
    /// Contents, or `None` for a nil buffer.
    pub data: Option<Vec<u8>>,
    /// Reported capacity (never below the length).
    pub cap: usize,
    /// True for fixed-size arrays, which are never nil.
    pub fixed: bool,
}

impl Bytes {
    /// Returns the number of bytes.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    /// Returns true if there are no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered sequence of values.
#[derive(Debug, Clone)]
pub struct Seq {
    /// Element type name.
    pub elem: TypeName,
    /// Elements, or `None` for a nil sequence.
    pub items: Option<Vec<Value>>,
    /// Reported capacity (never below the length).
    pub cap: usize,
    /// True for fixed-size arrays, which are never nil.
    pub fixed: bool,
}

impl Seq {
    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.items.as_ref().map_or(0, Vec::len)
    }

    /// Returns true if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An unordered mapping. Entries keep insertion order; that order carries no
/// meaning and is only stabilized when key sorting is enabled.
#[derive(Debug, Clone)]
pub struct Map {
    pub key: TypeName,
    pub value: TypeName,
    /// Entries, or `None` for a nil map.
    pub entries: Option<Vec<(Value, Value)>>,
}

impl Map {
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named record field.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: Rc<str>,
    pub value: Value,
    /// Non-exported fields are only introspectable through the bypass.
    pub exported: bool,
}

/// An indirection to a shared cell.
#[derive(Clone)]
pub struct Ptr {
    /// Type name of the pointee.
    pub elem: TypeName,
    /// Target cell, or `None` for a nil indirection.
    pub target: Option<Cell>,
}

impl Ptr {
    /// Returns true for a nil indirection.
    pub fn is_nil(&self) -> bool {
        self.target.is_none()
    }

    /// Returns the identity of the target (its allocation address), or 0.
    pub fn addr(&self) -> usize {
        self.target.as_ref().map_or(0, cell_addr)
    }
}

impl fmt::Debug for Ptr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never follow the target here: it may point back at us.
        f.debug_struct("Ptr")
            .field("elem", &self.elem)
            .field("addr", &format_args!("{:#x}", self.addr()))
            .finish()
    }
}

/// Returns the identity of a cell.
pub fn cell_addr(cell: &Cell) -> usize {
    Rc::as_ptr(cell) as *const () as usize
}

/// The classified shape of a value.
#[derive(Clone)]
pub enum Kind {
    /// Absent value.
    Invalid,
    Bool(bool),
    Int(i64, IntWidth),
    Uint(u64, IntWidth),
    Float32(f32),
    Float64(f64),
    /// Real and imaginary parts.
    Complex64(f32, f32),
    Complex128(f64, f64),
    Str(String),
    Bytes(Bytes),
    Seq(Seq),
    Map(Map),
    /// Fields in declaration order.
    Record(Vec<Field>),
    Ptr(Ptr),
    /// Type-erased container.
    Boxed(Option<Box<Value>>),
    /// Address-sized integer.
    Uintptr(usize),
    /// Callable, identified by its code address.
    Func(usize),
    Chan {
        addr: usize,
        len: usize,
        cap: usize,
    },
    /// Raw, untyped handle.
    RawPtr(usize),
    /// A value this model has no shape for; rendered through its `Display`.
    Opaque(Rc<dyn fmt::Display>),
}

impl Kind {
    /// Short label of the shape, used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Invalid => "invalid",
            Kind::Bool(_) => "bool",
            Kind::Int(..) => "int",
            Kind::Uint(..) => "uint",
            Kind::Float32(_) | Kind::Float64(_) => "float",
            Kind::Complex64(..) | Kind::Complex128(..) => "complex",
            Kind::Str(_) => "string",
            Kind::Bytes(_) => "bytes",
            Kind::Seq(_) => "seq",
            Kind::Map(_) => "map",
            Kind::Record(_) => "record",
            Kind::Ptr(_) => "ptr",
            Kind::Boxed(_) => "boxed",
            Kind::Uintptr(_) => "uintptr",
            Kind::Func(_) => "func",
            Kind::Chan { .. } => "chan",
            Kind::RawPtr(_) => "rawptr",
            Kind::Opaque(_) => "opaque",
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Ptr(p) => fmt::Debug::fmt(p, f),
            Kind::Opaque(o) => write!(f, "Opaque({o})"),
            Kind::Record(fields) => f.debug_tuple("Record").field(fields).finish(),
            Kind::Seq(seq) => fmt::Debug::fmt(seq, f),
            Kind::Map(map) => fmt::Debug::fmt(map, f),
            Kind::Bytes(bytes) => fmt::Debug::fmt(bytes, f),
            Kind::Boxed(inner) => f.debug_tuple("Boxed").field(inner).finish(),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// A dynamically typed value.
#[derive(Clone)]
pub struct Value {
    ty: TypeName,
    kind: Kind,
    methods: Methods,
}

impl Value {
    /// Creates a value from a type name and a kind.
    pub fn new(ty: impl Into<TypeName>, kind: Kind) -> Self {
        Self {
            ty: ty.into(),
            kind,
            methods: Methods::default(),
        }
    }

    /// Returns the concrete type name.
    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub(crate) fn type_name(&self) -> &TypeName {
        &self.ty
    }

    /// Returns the classified shape.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Returns the shape for in-place mutation (e.g. closing a cycle).
    pub fn kind_mut(&mut self) -> &mut Kind {
        &mut self.kind
    }

    /// Returns the self-description methods.
    pub fn methods(&self) -> &Methods {
        &self.methods
    }

    /// Renames the concrete type.
    pub fn named(mut self, ty: impl Into<TypeName>) -> Self {
        self.ty = ty.into();
        self
    }

    /// Attaches an error-like self-description.
    pub fn with_error_method(mut self, method: Method) -> Self {
        self.methods.error = Some(method);
        self
    }

    /// Attaches a string-like self-description.
    pub fn with_string_method(mut self, method: Method) -> Self {
        self.methods.string = Some(method);
        self
    }

    /// Wraps the value in a shared cell so indirections can point at it.
    pub fn into_cell(self) -> Cell {
        Rc::new(RefCell::new(self))
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// The absent value.
    pub fn invalid() -> Self {
        Self::new("invalid", Kind::Invalid)
    }

    pub fn bool(v: bool) -> Self {
        Self::new("bool", Kind::Bool(v))
    }

    /// Signed integer of the given width.
    pub fn int_of(v: i64, width: IntWidth) -> Self {
        Self::new(width.signed_name(), Kind::Int(v, width))
    }

    /// Unsigned integer of the given width.
    pub fn uint_of(v: u64, width: IntWidth) -> Self {
        Self::new(width.unsigned_name(), Kind::Uint(v, width))
    }

    /// 64-bit signed integer.
    pub fn int(v: i64) -> Self {
        Self::int_of(v, IntWidth::W64)
    }

    /// 64-bit unsigned integer.
    pub fn uint(v: u64) -> Self {
        Self::uint_of(v, IntWidth::W64)
    }

    pub fn f32(v: f32) -> Self {
        Self::new("f32", Kind::Float32(v))
    }

    pub fn f64(v: f64) -> Self {
        Self::new("f64", Kind::Float64(v))
    }

    pub fn complex64(re: f32, im: f32) -> Self {
        Self::new("Complex<f32>", Kind::Complex64(re, im))
    }

    pub fn complex128(re: f64, im: f64) -> Self {
        Self::new("Complex<f64>", Kind::Complex128(re, im))
    }

    pub fn string(v: impl Into<String>) -> Self {
        Self::new("String", Kind::Str(v.into()))
    }

    // =========================================================================
    // Sequences and mappings
    // =========================================================================

    /// Growable byte buffer.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let cap = data.len();
        Self::new(
            "Vec<u8>",
            Kind::Bytes(Bytes {
                data: Some(data),
                cap,
                fixed: false,
            }),
        )
    }

    /// Nil byte buffer.
    pub fn nil_bytes() -> Self {
        Self::new(
            "Vec<u8>",
            Kind::Bytes(Bytes {
                data: None,
                cap: 0,
                fixed: false,
            }),
        )
    }

    /// Fixed-size byte array.
    pub fn byte_array(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let len = data.len();
        Self::new(
            format!("[u8; {len}]"),
            Kind::Bytes(Bytes {
                data: Some(data),
                cap: len,
                fixed: true,
            }),
        )
    }

    /// Growable sequence with the given element type.
    pub fn seq(elem: impl Into<TypeName>, items: Vec<Value>) -> Self {
        let elem = elem.into();
        let cap = items.len();
        Self::new(
            format!("Vec<{elem}>"),
            Kind::Seq(Seq {
                elem,
                items: Some(items),
                cap,
                fixed: false,
            }),
        )
    }

    /// Nil sequence with the given element type.
    pub fn nil_seq(elem: impl Into<TypeName>) -> Self {
        let elem = elem.into();
        Self::new(
            format!("Vec<{elem}>"),
            Kind::Seq(Seq {
                elem,
                items: None,
                cap: 0,
                fixed: false,
            }),
        )
    }

    /// Fixed-size array with the given element type.
    pub fn array(elem: impl Into<TypeName>, items: Vec<Value>) -> Self {
        let elem = elem.into();
        let len = items.len();
        Self::new(
            format!("[{elem}; {len}]"),
            Kind::Seq(Seq {
                elem,
                items: Some(items),
                cap: len,
                fixed: true,
            }),
        )
    }

    /// Mapping with the given key and value types.
    pub fn map(
        key: impl Into<TypeName>,
        value: impl Into<TypeName>,
        entries: Vec<(Value, Value)>,
    ) -> Self {
        let (key, value) = (key.into(), value.into());
        Self::new(
            format!("HashMap<{key}, {value}>"),
            Kind::Map(Map {
                key,
                value,
                entries: Some(entries),
            }),
        )
    }

    /// Nil mapping with the given key and value types.
    pub fn nil_map(key: impl Into<TypeName>, value: impl Into<TypeName>) -> Self {
        let (key, value) = (key.into(), value.into());
        Self::new(
            format!("HashMap<{key}, {value}>"),
            Kind::Map(Map {
                key,
                value,
                entries: None,
            }),
        )
    }

    /// Sets the reported capacity of a buffer, sequence or channel.
    ///
    /// The capacity never drops below the current length. Other kinds are
    /// returned unchanged.
    pub fn with_capacity(mut self, cap: usize) -> Self {
        match &mut self.kind {
            Kind::Bytes(b) if !b.fixed => b.cap = cap.max(b.len()),
            Kind::Seq(s) if !s.fixed => s.cap = cap.max(s.len()),
            Kind::Chan { len, cap: c, .. } => *c = cap.max(*len),
            _ => {}
        }
        self
    }

    // =========================================================================
    // Indirections and boxes
    // =========================================================================

    /// Indirection to a shared cell. The pointee type is read from the cell.
    pub fn ptr(cell: &Cell) -> Self {
        let elem: TypeName = match cell.try_borrow() {
            Ok(v) => v.ty.clone(),
            Err(_) => Rc::from("_"),
        };
        Self::new(
            format!("*{elem}"),
            Kind::Ptr(Ptr {
                elem,
                target: Some(Rc::clone(cell)),
            }),
        )
    }

    /// Nil indirection to the given pointee type.
    pub fn nil_ptr(elem: impl Into<TypeName>) -> Self {
        let elem = elem.into();
        Self::new(format!("*{elem}"), Kind::Ptr(Ptr { elem, target: None }))
    }

    /// Type-erased container holding `inner`.
    pub fn boxed(inner: Value) -> Self {
        Self::new("dyn Any", Kind::Boxed(Some(Box::new(inner))))
    }

    /// Empty type-erased container.
    pub fn nil() -> Self {
        Self::new("dyn Any", Kind::Boxed(None))
    }

    // =========================================================================
    // Address-like values
    // =========================================================================

    pub fn uintptr(addr: usize) -> Self {
        Self::new("uintptr", Kind::Uintptr(addr))
    }

    pub fn func(ty: impl Into<TypeName>, addr: usize) -> Self {
        Self::new(ty, Kind::Func(addr))
    }

    pub fn chan(elem: impl Into<TypeName>, addr: usize, len: usize) -> Self {
        let elem: TypeName = elem.into();
        Self::new(
            format!("Receiver<{elem}>"),
            Kind::Chan { addr, len, cap: len },
        )
    }

    pub fn raw_ptr(addr: usize) -> Self {
        Self::new("*const ()", Kind::RawPtr(addr))
    }

    /// A value rendered through its own `Display` implementation.
    pub fn opaque(ty: impl Into<TypeName>, display: impl fmt::Display + 'static) -> Self {
        Self::new(ty, Kind::Opaque(Rc::new(display)))
    }

    // =========================================================================
    // Mutation helpers
    // =========================================================================

    /// Replaces the value of the named record field. Returns false if the
    /// value is not a record or has no such field.
    pub fn set_field(&mut self, name: &str, value: Value) -> bool {
        let Kind::Record(fields) = &mut self.kind else {
            return false;
        };
        match fields.iter_mut().find(|f| &*f.name == name) {
            Some(field) => {
                field.value = value;
                true
            }
            None => false,
        }
    }

    /// Appends to a growable sequence, turning a nil sequence into a
    /// non-nil one. Returns false for any other kind.
    pub fn push(&mut self, value: Value) -> bool {
        match &mut self.kind {
            Kind::Seq(seq) if !seq.fixed => {
                let items = seq.items.get_or_insert_with(Vec::new);
                items.push(value);
                seq.cap = seq.cap.max(items.len());
                true
            }
            _ => false,
        }
    }

    /// Adds an entry to a mapping, turning a nil mapping into a non-nil one.
    /// Returns false for any other kind.
    pub fn insert(&mut self, key: Value, value: Value) -> bool {
        match &mut self.kind {
            Kind::Map(map) => {
                map.entries.get_or_insert_with(Vec::new).push((key, value));
                true
            }
            _ => false,
        }
    }

    /// Points an indirection at a new target. Returns false for any other
    /// kind.
    pub fn set_target(&mut self, cell: &Cell) -> bool {
        match &mut self.kind {
            Kind::Ptr(ptr) => {
                ptr.target = Some(Rc::clone(cell));
                true
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::bool(v)
    }
}

macro_rules! int_from {
    ($($t:ty => $ctor:ident, $width:expr, $wide:ty);* $(;)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$ctor(v as $wide, $width)
                }
            }
        )*
    };
}

int_from! {
    i8 => int_of, IntWidth::W8, i64;
    i16 => int_of, IntWidth::W16, i64;
    i32 => int_of, IntWidth::W32, i64;
    i64 => int_of, IntWidth::W64, i64;
    isize => int_of, IntWidth::Size, i64;
    u8 => uint_of, IntWidth::W8, u64;
    u16 => uint_of, IntWidth::W16, u64;
    u32 => uint_of, IntWidth::W32, u64;
    u64 => uint_of, IntWidth::W64, u64;
    usize => uint_of, IntWidth::Size, u64;
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::f32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::f64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::string(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::bytes(v)
    }
}
