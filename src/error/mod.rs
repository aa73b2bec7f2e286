//! Error handling for export operations.
//!
//! The taxonomy mirrors the three ways an export can fail:
//! - the row source fails while reading ([`SourceError`])
//! - the sink rejects a write ([`ExportError::Sink`])
//! - a progress observer aborts the pass ([`ExportError::Observer`])
//!
//! None of them is recovered locally. A forward-only cursor cannot be
//! rewound, so the caller sees the first failure at the `export` call and
//! decides whether to re-run against a fresh cursor.
//!
//! # Example
//!
//! ```rust
//! use tsv_export::error::{ExportError, Result};
//!
//! fn observer(count: u64) -> Result<()> {
//!     if count >= 1_000_000 {
//!         return Err(ExportError::Observer("row limit reached".into()));
//!     }
//!     Ok(())
//! }
//! # assert!(observer(10).is_ok());
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ConfigError, ExportError, Result, SourceError};
