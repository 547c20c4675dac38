//! Rendering configuration and the entry points bound to it.
//!
//! Every entry point exists twice: as a method on an explicit [`Config`],
//! and as a free function in the crate root that uses a snapshot of the
//! shared default configuration.

use std::fmt::{self, Write as _};
use std::io;
use std::sync::{PoisonError, RwLock};

use lazy_static::lazy_static;

use crate::error::DumpError;
use crate::model::{Kind, Value};
use crate::render::dump::dump_all;
use crate::render::{Formatter, BUFFERS};

/// Whether values behind non-exported record fields may be introspected.
///
/// Fixed when the crate is built; the `safe` feature turns it off.
const INTROSPECTION_BYPASS: bool = !cfg!(feature = "safe");

/// Returns true if values reached through non-exported record fields may
/// still have their self-description invoked.
pub fn unsafe_introspection_available() -> bool {
    INTROSPECTION_BYPASS
}

/// Options controlling how values are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Indentation unit for verbose output.
    pub indent: String,
    /// Maximum nesting depth; 0 means unlimited.
    pub max_depth: usize,
    /// Never invoke self-description methods.
    pub disable_methods: bool,
    /// Only invoke pointer-receiver methods on addressable values.
    pub disable_pointer_methods: bool,
    /// Omit indirection addresses from verbose output.
    pub disable_pointer_addresses: bool,
    /// Omit capacities from verbose output.
    pub disable_capacities: bool,
    /// Show a self-description in parentheses and keep rendering the
    /// structure after it.
    pub continue_on_method: bool,
    /// Sort map entries by key.
    pub sort_keys: bool,
    /// Sort keys that have no native order by their typed compact
    /// rendering. Only used with `sort_keys`.
    pub spew_keys: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent: " ".to_string(),
            max_depth: 0,
            disable_methods: false,
            disable_pointer_methods: false,
            disable_pointer_addresses: false,
            disable_capacities: false,
            continue_on_method: false,
            sort_keys: false,
            spew_keys: false,
        }
    }
}

impl Config {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a builder starting from the default settings.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Returns the verbose rendering of `values`, one per line.
    pub fn sdump(&self, values: &[&Value]) -> String {
        let mut out = String::new();
        dump_all(self, &mut out, values);
        out
    }

    /// Writes the verbose rendering of `values` to an I/O sink.
    pub fn fdump<W: io::Write + ?Sized>(
        &self,
        w: &mut W,
        values: &[&Value],
    ) -> Result<(), DumpError> {
        let mut buf = BUFFERS.acquire();
        dump_all(self, &mut buf, values);
        w.write_all(buf.as_bytes())?;
        Ok(())
    }

    /// Writes the verbose rendering of `values` to a text sink.
    pub fn write_dump<W: fmt::Write + ?Sized>(
        &self,
        w: &mut W,
        values: &[&Value],
    ) -> Result<(), DumpError> {
        let mut buf = BUFFERS.acquire();
        dump_all(self, &mut buf, values);
        w.write_str(&buf)?;
        Ok(())
    }

    /// Writes the verbose rendering of `values` to standard output.
    ///
    /// Write failures are logged, not returned.
    pub fn dump(&self, values: &[&Value]) {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if let Err(err) = self.fdump(&mut lock, values) {
            tracing::warn!(error = %err, "failed to write dump to stdout");
        }
    }

    /// Wraps `value` for compact rendering with this configuration.
    pub fn formatter<'a>(&'a self, value: &'a Value) -> Formatter<'a> {
        Formatter::with_config(value, self)
    }

    /// Returns the compact rendering of `values`.
    ///
    /// Operands are separated by a space unless either side is a string
    /// (looking through boxes), so text operands can act as literal
    /// separators: with integers `a = 1` and `b = 2`,
    /// `sprint(&[&a, &"-".into(), &b])` gives `1-2`.
    pub fn sprint(&self, values: &[&Value]) -> String {
        let mut out = String::new();
        let mut prev_is_text = false;
        for (i, value) in values.iter().enumerate() {
            let is_text = is_text(value);
            if i > 0 && !is_text && !prev_is_text {
                out.push(' ');
            }
            let _ = write!(out, "{}", self.formatter(value));
            prev_is_text = is_text;
        }
        out
    }

    /// Writes the compact rendering of `values` to an I/O sink and returns
    /// the number of bytes written.
    pub fn fprint<W: io::Write + ?Sized>(
        &self,
        w: &mut W,
        values: &[&Value],
    ) -> Result<usize, DumpError> {
        let text = self.sprint(values);
        w.write_all(text.as_bytes())?;
        Ok(text.len())
    }
}

fn is_text(mut value: &Value) -> bool {
    while let Kind::Boxed(Some(inner)) = value.kind() {
        value = &**inner;
    }
    matches!(value.kind(), Kind::Str(_))
}

/// Fluent builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation unit.
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.config.indent = indent.into();
        self
    }

    /// Sets the maximum nesting depth (0 = unlimited).
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn disable_methods(mut self, yes: bool) -> Self {
        self.config.disable_methods = yes;
        self
    }

    pub fn disable_pointer_methods(mut self, yes: bool) -> Self {
        self.config.disable_pointer_methods = yes;
        self
    }

    pub fn disable_pointer_addresses(mut self, yes: bool) -> Self {
        self.config.disable_pointer_addresses = yes;
        self
    }

    pub fn disable_capacities(mut self, yes: bool) -> Self {
        self.config.disable_capacities = yes;
        self
    }

    pub fn continue_on_method(mut self, yes: bool) -> Self {
        self.config.continue_on_method = yes;
        self
    }

    pub fn sort_keys(mut self, yes: bool) -> Self {
        self.config.sort_keys = yes;
        self
    }

    pub fn spew_keys(mut self, yes: bool) -> Self {
        self.config.spew_keys = yes;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Config {
        self.config
    }
}

lazy_static! {
    static ref DEFAULT_CONFIG: RwLock<Config> = RwLock::new(Config::default());
}

/// Returns a snapshot of the shared default configuration.
pub fn default_config() -> Config {
    DEFAULT_CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replaces the shared default configuration and returns the previous one.
///
/// Renders already in progress keep the snapshot they started with.
pub fn set_default_config(config: Config) -> Config {
    let mut guard = DEFAULT_CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *guard, config)
}

/// Edits the shared default configuration in place.
pub fn update_default_config(f: impl FnOnce(&mut Config)) {
    let mut guard = DEFAULT_CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_every_field() {
        let cfg = Config::builder()
            .indent("\t")
            .max_depth(3)
            .disable_methods(true)
            .disable_pointer_methods(true)
            .disable_pointer_addresses(true)
            .disable_capacities(true)
            .continue_on_method(true)
            .sort_keys(true)
            .spew_keys(true)
            .build();
        assert_eq!(
            cfg,
            Config {
                indent: "\t".to_string(),
                max_depth: 3,
                disable_methods: true,
                disable_pointer_methods: true,
                disable_pointer_addresses: true,
                disable_capacities: true,
                continue_on_method: true,
                sort_keys: true,
                spew_keys: true,
            }
        );
        assert_eq!(Config::builder().build(), Config::new());
    }

    #[test]
    fn test_sprint_spacing() {
        let cfg = Config::default();
        let a = Value::int(1);
        let b = Value::int(2);
        let s = Value::from("x");
        assert_eq!(cfg.sprint(&[&a, &b]), "1 2");
        assert_eq!(cfg.sprint(&[&a, &s, &b]), "1x2");
        let boxed = Value::boxed(Value::from("-"));
        assert_eq!(cfg.sprint(&[&a, &boxed, &b]), "1-2");
        assert_eq!(cfg.sprint(&[]), "");
    }

    #[test]
    fn test_fdump_and_fprint_write_through() {
        let cfg = Config::default();
        let v = Value::int(7);

        let mut sink = Vec::new();
        cfg.fdump(&mut sink, &[&v, &v]).unwrap();
        assert_eq!(sink, b"(i64) 7\n(i64) 7\n");

        let mut sink = Vec::new();
        assert_eq!(cfg.fprint(&mut sink, &[&v]).unwrap(), 1);
        assert_eq!(sink, b"7");

        let mut text = String::new();
        cfg.write_dump(&mut text, &[&v]).unwrap();
        assert_eq!(text, "(i64) 7\n");
    }

    #[test]
    fn test_fdump_reports_io_errors() {
        struct Broken;
        impl io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("sink closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let err = Config::default()
            .fdump(&mut Broken, &[&Value::int(1)])
            .unwrap_err();
        assert!(matches!(err, DumpError::Io(_)));
    }

    #[test]
    fn test_bypass_follows_feature() {
        assert_eq!(unsafe_introspection_available(), !cfg!(feature = "safe"));
    }
}
