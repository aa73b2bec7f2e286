//! Streaming row export to delimited text
//!
//! This library walks a forward-only row source and writes each row as
//! delimited text (PostgreSQL COPY text format by default), formatting values
//! through a per-type registry and reporting progress to observers.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Exporter, option flags and progress notification
//! - `formatter`: Per-type value formatters
//! - `source`: Row sources, schemas and values
//!
//! # Example
//!
//! ```
//! use tsv_export::source::{MemoryRowSource, Schema, Value};
//! use tsv_export::Exporter;
//!
//! # fn main() -> tsv_export::Result<()> {
//! let schema = Schema::parse("id:int,name:text")?;
//! let mut source = MemoryRowSource::with_rows(
//!     schema,
//!     vec![vec![Some(Value::Int32(1)), Some(Value::Text("ada".into()))]],
//! )?;
//!
//! let mut out: Vec<u8> = Vec::new();
//! Exporter::new().export(&mut source, &mut out)?;
//! assert_eq!(String::from_utf8(out).unwrap(), "id\tname\n1\t\"ada\"\n");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod formatter;
pub mod source;

// Re-export commonly used types
pub use config::Config;
pub use error::{ExportError, Result};
pub use export::{ExportOptions, Exporter, ProgressNotifier};
pub use formatter::FormatterRegistry;
pub use source::{FieldType, RowSource, Schema, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
