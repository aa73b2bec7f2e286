use std::path::PathBuf;
use std::{fmt, io};

/// Crate-wide `Result` type using [`ExportError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Top-level error type for export operations.
///
/// Every failure raised while reading the cursor, writing the sink or
/// notifying a progress observer surfaces as one of these variants at the
/// `export` call site. Nothing is retried.
#[derive(Debug)]
pub enum ExportError {
    /// The row source failed while checking for rows, advancing or reading a field.
    Source(SourceError),

    /// Writing to the sink failed.
    Sink(io::Error),

    /// A progress observer aborted the export.
    Observer(String),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors outside the row-writing path.
    Io(io::Error),

    /// The input file could not be opened.
    Input { path: PathBuf, source: io::Error },

    /// The destination file could not be created.
    Destination { path: PathBuf, source: io::Error },

    /// Generic error with a free-form message.
    Generic(String),
}

/// Row source errors.
#[derive(Debug)]
pub enum SourceError {
    /// Reading the underlying input failed.
    Io(io::Error),

    /// A record could not be decoded.
    Malformed { line: usize, message: String },

    /// A field value does not match its declared type.
    InvalidValue { field: String, message: String },

    /// Field index past the end of the schema.
    FieldOutOfRange(usize),

    /// A field was read before `advance` positioned the cursor on a row.
    NoCurrentRow,

    /// A schema specification could not be parsed.
    InvalidSchema(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Source(e) => write!(f, "Source error: {e}"),
            ExportError::Sink(e) => write!(f, "Failed to write output: {e}"),
            ExportError::Observer(msg) => write!(f, "Export aborted by progress observer: {msg}"),
            ExportError::Config(e) => write!(f, "Configuration error: {e}"),
            ExportError::Io(e) => write!(f, "I/O error: {e}"),
            ExportError::Input { path, source } => {
                write!(f, "Failed to open {}: {source}", path.display())
            }
            ExportError::Destination { path, source } => {
                write!(f, "Failed to create {}: {source}", path.display())
            }
            ExportError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io(e) => write!(f, "Failed to read input: {e}"),
            SourceError::Malformed { line, message } => {
                write!(f, "Malformed record on line {line}: {message}")
            }
            SourceError::InvalidValue { field, message } => {
                write!(f, "Invalid value for field '{field}': {message}")
            }
            SourceError::FieldOutOfRange(idx) => write!(f, "Field index {idx} out of range"),
            SourceError::NoCurrentRow => write!(f, "Cursor is not positioned on a row"),
            SourceError::InvalidSchema(msg) => write!(f, "Invalid schema: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Source(e) => Some(e),
            ExportError::Sink(e) | ExportError::Io(e) => Some(e),
            ExportError::Input { source, .. } | ExportError::Destination { source, .. } => {
                Some(source)
            }
            ExportError::Config(e) => Some(e),
            ExportError::Observer(_) | ExportError::Generic(_) => None,
        }
    }
}

impl std::error::Error for SourceError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to ExportError ========================= */

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<SourceError> for ExportError {
    fn from(err: SourceError) -> Self {
        ExportError::Source(err)
    }
}

impl From<ConfigError> for ExportError {
    fn from(err: ConfigError) -> Self {
        ExportError::Config(err)
    }
}

impl From<String> for ExportError {
    fn from(msg: String) -> Self {
        ExportError::Generic(msg)
    }
}

impl From<&str> for ExportError {
    fn from(msg: &str) -> Self {
        ExportError::Generic(msg.to_owned())
    }
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        SourceError::Io(err)
    }
}
