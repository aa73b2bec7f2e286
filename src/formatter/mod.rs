//! Field formatting for delimited export
//!
//! This module decides how a non-null field value becomes text:
//! - [`FormatterRegistry`] maps a declared [`FieldType`] to a [`FormatFn`]
//! - [`builtin`] holds the formatters registered by default
//!
//! # Design
//!
//! Lookup is by exact `FieldType` equality. There is no structural matching:
//! registering a formatter for `Int64` leaves `Int32` fields on the fallback,
//! and `Custom("inet")` is unrelated to `Custom("cidr")`. Types without an
//! entry use the fallback, which writes the value's `Display` form verbatim.

pub mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use crate::source::{FieldType, Value};

pub use builtin::{write_datetime, write_text, write_verbatim, DATETIME_FORMAT};

/// Writes the textual representation of a non-null value.
///
/// Formatters are shared through `Arc` so a registry can be cloned into
/// independent exports and resolved per column without copying closures.
pub type FormatFn = Arc<dyn Fn(&Value, &mut dyn Write) -> io::Result<()> + Send + Sync>;

/// Type-keyed table of field formatters with a verbatim fallback
#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<FieldType, FormatFn>,
    fallback: FormatFn,
}

impl FormatterRegistry {
    /// Create a registry with the built-in text and datetime formatters
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(FieldType::Text, write_text);
        registry.register(FieldType::DateTime, write_datetime);
        registry
    }

    /// Create a registry where every type resolves to the fallback
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
            fallback: Arc::new(write_verbatim),
        }
    }

    /// Associate a formatter with `field_type`.
    ///
    /// A formatter already registered for the same type is replaced.
    pub fn register<F>(&mut self, field_type: FieldType, formatter: F)
    where
        F: Fn(&Value, &mut dyn Write) -> io::Result<()> + Send + Sync + 'static,
    {
        self.formatters.insert(field_type, Arc::new(formatter));
    }

    /// Remove the formatter for `field_type`, returning it to the fallback
    pub fn unregister(&mut self, field_type: &FieldType) -> bool {
        self.formatters.remove(field_type).is_some()
    }

    /// Get the formatter for `field_type`, or the fallback if none is registered
    pub fn resolve(&self, field_type: &FieldType) -> FormatFn {
        self.formatters
            .get(field_type)
            .unwrap_or(&self.fallback)
            .clone()
    }

    pub fn is_registered(&self, field_type: &FieldType) -> bool {
        self.formatters.contains_key(field_type)
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.formatters.keys().map(FieldType::name).collect();
        types.sort_unstable();
        f.debug_struct("FormatterRegistry")
            .field("registered", &types)
            .finish()
    }
}
