//! Streaming delimited export
//!
//! [`Exporter`] performs one forward pass over a [`RowSource`], writing one
//! line per row (plus an optional header line) straight into a sink:
//!
//! 1. **Formatting**: each column's formatter is resolved once from the
//!    [`FormatterRegistry`] before the first row is read
//! 2. **Streaming**: fields are written as they are read; nothing beyond the
//!    current row is held
//! 3. **Progress**: the running row count is reported to a
//!    [`ProgressNotifier`] after every row
//!
//! # Example
//!
//! ```rust
//! use tsv_export::export::Exporter;
//! use tsv_export::source::{Column, FieldType, MemoryRowSource, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Column::new("id", FieldType::Int32),
//!     Column::new("name", FieldType::Text),
//! ]);
//! let mut source = MemoryRowSource::with_rows(
//!     schema,
//!     vec![vec![Some(Value::Int32(1)), Some(Value::Text("Ada".into()))]],
//! )?;
//!
//! let mut out: Vec<u8> = Vec::new();
//! Exporter::new().export(&mut source, &mut out)?;
//! assert_eq!(String::from_utf8(out).unwrap(), "id\tname\n1\t\"Ada\"\n");
//! # Ok::<(), tsv_export::error::ExportError>(())
//! ```

pub mod options;
pub mod progress;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::formatter::{FormatFn, FormatterRegistry};
use crate::source::{FieldType, RowSource, Value};

pub use options::ExportOptions;
pub use progress::{ProgressBarObserver, ProgressNotifier, ProgressObserver};

/// Tab, the PostgreSQL `COPY` text-format column delimiter
pub const DEFAULT_COLUMN_SEPARATOR: char = '\t';
/// Unix line ending, written after every line including the last
pub const DEFAULT_ROW_SEPARATOR: &str = "\n";
/// PostgreSQL `COPY` text-format null marker
pub const DEFAULT_NULL_REPRESENTATION: &str = "\\N";

/// Writes rows from a cursor as delimited text.
///
/// Settings are read when [`export`](Exporter::export) starts; changing them
/// between exports is fine, and the borrow checker rules out changing them
/// during one.
pub struct Exporter {
    options: ExportOptions,
    column_separator: char,
    row_separator: String,
    null_representation: String,
    formatters: FormatterRegistry,
    progress: ProgressNotifier,
}

impl Exporter {
    /// Create an exporter with default settings
    ///
    /// Headers on, tab-separated, `\n` line endings, `\N` for null, no
    /// progress notification.
    pub fn new() -> Self {
        Self {
            options: ExportOptions::INCLUDE_HEADERS,
            column_separator: DEFAULT_COLUMN_SEPARATOR,
            row_separator: DEFAULT_ROW_SEPARATOR.to_string(),
            null_representation: DEFAULT_NULL_REPRESENTATION.to_string(),
            formatters: FormatterRegistry::new(),
            progress: ProgressNotifier::new(0),
        }
    }

    /// Create an exporter from the `[export]` config section
    pub fn from_config(config: &ExportConfig) -> Self {
        let mut exporter = Self::new();
        exporter.apply_config(config);
        exporter
    }

    /// Overwrite separators, null marker, header flag and progress interval
    pub fn apply_config(&mut self, config: &ExportConfig) {
        self.options
            .set(ExportOptions::INCLUDE_HEADERS, config.include_headers);
        self.column_separator = config.column_separator;
        self.row_separator = config.row_separator.clone();
        self.null_representation = config.null_representation.clone();
        self.progress.set_interval(config.progress_interval);
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_column_separator(mut self, separator: char) -> Self {
        self.column_separator = separator;
        self
    }

    pub fn with_row_separator(mut self, separator: impl Into<String>) -> Self {
        self.row_separator = separator.into();
        self
    }

    pub fn with_null_representation(mut self, null: impl Into<String>) -> Self {
        self.null_representation = null.into();
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress.set_interval(interval);
        self
    }

    pub fn with_formatters(mut self, formatters: FormatterRegistry) -> Self {
        self.formatters = formatters;
        self
    }

    pub fn options(&self) -> ExportOptions {
        self.options
    }

    pub fn set_options(&mut self, options: ExportOptions) {
        self.options = options;
    }

    pub fn column_separator(&self) -> char {
        self.column_separator
    }

    pub fn row_separator(&self) -> &str {
        &self.row_separator
    }

    pub fn null_representation(&self) -> &str {
        &self.null_representation
    }

    pub fn progress_interval(&self) -> u64 {
        self.progress.interval()
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn formatters_mut(&mut self) -> &mut FormatterRegistry {
        &mut self.formatters
    }

    /// Register a formatter for one field type
    pub fn register_formatter<F>(&mut self, field_type: FieldType, formatter: F)
    where
        F: Fn(&Value, &mut dyn Write) -> std::io::Result<()> + Send + Sync + 'static,
    {
        self.formatters.register(field_type, formatter);
    }

    /// Attach a progress observer, called every `progress_interval` rows
    pub fn on_progress<F>(&mut self, observer: F)
    where
        F: FnMut(u64) -> Result<()> + Send + 'static,
    {
        self.progress.subscribe(observer);
    }

    pub fn progress_mut(&mut self) -> &mut ProgressNotifier {
        &mut self.progress
    }

    /// Export every row of `source` into `sink`
    ///
    /// If the source reports no rows at all, nothing is written, not even
    /// the header. Otherwise the header (when enabled) is followed by one
    /// line per row. The sink is flushed on success; on failure whatever was
    /// already written stays in the sink.
    ///
    /// # Arguments
    /// * `source` - Cursor that has not been advanced yet
    /// * `sink` - Open destination; the caller keeps ownership
    ///
    /// # Returns
    /// * `Result<u64>` - Number of data rows written
    pub fn export<S, W>(&mut self, source: &mut S, sink: &mut W) -> Result<u64>
    where
        S: RowSource + ?Sized,
        W: Write,
    {
        let start_time = Instant::now();
        let out: &mut dyn Write = sink;

        if !source.has_rows()? {
            debug!("Source reports no rows, nothing to export");
            return Ok(0);
        }

        let field_count = source.field_count();
        let formatters: Vec<FormatFn> = (0..field_count)
            .map(|field| self.formatters.resolve(source.field_type(field)))
            .collect();

        let mut separator_buf = [0u8; 4];
        let column_separator = self
            .column_separator
            .encode_utf8(&mut separator_buf)
            .as_bytes();
        let row_separator = self.row_separator.as_bytes();
        let null = self.null_representation.as_bytes();

        info!("Starting export of {} fields", field_count);

        if self.options.contains(ExportOptions::INCLUDE_HEADERS) {
            for field in 0..field_count {
                if field > 0 {
                    out.write_all(column_separator).map_err(ExportError::Sink)?;
                }
                out.write_all(source.field_name(field).as_bytes())
                    .map_err(ExportError::Sink)?;
            }
            out.write_all(row_separator).map_err(ExportError::Sink)?;
            debug!("Wrote header: {} fields", field_count);
        }

        let mut count = 0u64;
        while source.advance()? {
            for (field, format) in formatters.iter().enumerate() {
                if field > 0 {
                    out.write_all(column_separator).map_err(ExportError::Sink)?;
                }
                if source.is_null(field)? {
                    out.write_all(null).map_err(ExportError::Sink)?;
                } else {
                    format(source.value(field)?, &mut *out).map_err(ExportError::Sink)?;
                }
            }
            out.write_all(row_separator).map_err(ExportError::Sink)?;

            count += 1;
            self.progress.record(count)?;
        }

        out.flush().map_err(ExportError::Sink)?;

        info!(
            "Exported {} rows in {} ms",
            count,
            start_time.elapsed().as_millis()
        );
        Ok(count)
    }

    /// Export into a file at `path`, creating or truncating it
    ///
    /// The file is flushed and closed on every exit path. A flush failure
    /// after a failed export is logged and the export error is returned.
    ///
    /// # Returns
    /// * `Result<u64>` - Number of data rows written
    pub fn export_to_path<S, P>(&mut self, source: &mut S, path: P) -> Result<u64>
    where
        S: RowSource + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| ExportError::Destination {
            path: path.to_path_buf(),
            source: err,
        })?;
        debug!("Created output file: {}", path.display());

        let mut writer = BufWriter::new(file);
        let result = self.export(source, &mut writer);
        finish_destination(result, &mut writer, path)
    }
}

/// Flush `writer` after an export into `path`.
///
/// A flush failure becomes [`ExportError::Sink`] unless the export itself
/// already failed, in which case the export error is returned.
fn finish_destination<W: Write>(
    result: Result<u64>,
    writer: &mut W,
    path: &Path,
) -> Result<u64> {
    match (result, writer.flush()) {
        (Ok(count), Ok(())) => {
            debug!("Closed output file: {} ({} rows)", path.display(), count);
            Ok(count)
        }
        (Ok(_), Err(err)) => Err(ExportError::Sink(err)),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(flush_err)) => {
            warn!(
                "Failed to flush {} after export error: {}",
                path.display(),
                flush_err
            );
            Err(err)
        }
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("options", &self.options)
            .field("column_separator", &self.column_separator)
            .field("row_separator", &self.row_separator)
            .field("null_representation", &self.null_representation)
            .field("formatters", &self.formatters)
            .field("progress", &self.progress)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::source::{Column, MemoryRowSource, Schema, SourceResult};
    use chrono::{TimeZone, Utc};
    use std::io;
    use std::sync::{Arc, Mutex};

    fn sample_schema() -> Schema {
        Schema::new(vec![
            Column::new("id", FieldType::Int32),
            Column::new("name", FieldType::Text),
            Column::new("created", FieldType::DateTime),
        ])
    }

    fn sample_row(id: Option<i32>, name: &str) -> Vec<Option<Value>> {
        vec![
            id.map(Value::Int32),
            Some(Value::Text(name.to_string())),
            Some(Value::DateTime(
                Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap(),
            )),
        ]
    }

    fn numbered_source(rows: usize) -> MemoryRowSource {
        let schema = Schema::new(vec![Column::new("n", FieldType::Int64)]);
        let rows = (0..rows)
            .map(|n| vec![Some(Value::Int64(n as i64))])
            .collect();
        MemoryRowSource::with_rows(schema, rows).unwrap()
    }

    fn export_to_string(exporter: &mut Exporter, source: &mut MemoryRowSource) -> String {
        let mut out: Vec<u8> = Vec::new();
        exporter.export(source, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn record_progress(exporter: &mut Exporter) -> Arc<Mutex<Vec<u64>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        exporter.on_progress(move |count| {
            sink.lock().unwrap().push(count);
            Ok(())
        });
        seen
    }

    #[test]
    fn test_export_scenario() {
        let mut source =
            MemoryRowSource::with_rows(sample_schema(), vec![sample_row(Some(1), "A\"B")])
                .unwrap();
        let output = export_to_string(&mut Exporter::new(), &mut source);
        assert_eq!(
            output,
            "id\tname\tcreated\n1\t\"A\"\"B\"\t2020-01-02 03:04:05Z\n"
        );
    }

    #[test]
    fn test_null_field_unquoted() {
        let mut source =
            MemoryRowSource::with_rows(sample_schema(), vec![sample_row(None, "x")]).unwrap();
        let output = export_to_string(&mut Exporter::new(), &mut source);
        let data_line = output.lines().nth(1).unwrap();
        assert_eq!(data_line.split('\t').next().unwrap(), "\\N");
    }

    #[test]
    fn test_null_representation_for_every_type() {
        let schema = Schema::new(vec![
            Column::new("t", FieldType::Text),
            Column::new("d", FieldType::DateTime),
            Column::new("b", FieldType::Boolean),
            Column::new("c", FieldType::Custom("inet".into())),
        ]);
        let mut source =
            MemoryRowSource::with_rows(schema, vec![vec![None, None, None, None]]).unwrap();
        let mut exporter = Exporter::new()
            .with_options(ExportOptions::NONE)
            .with_null_representation("NULL");
        let output = export_to_string(&mut exporter, &mut source);
        assert_eq!(output, "NULL\tNULL\tNULL\tNULL\n");
    }

    #[test]
    fn test_empty_source_writes_nothing() {
        let mut source = MemoryRowSource::new(sample_schema());
        let mut exporter = Exporter::new().with_progress_interval(1);
        let seen = record_progress(&mut exporter);

        let mut out: Vec<u8> = Vec::new();
        let count = exporter.export(&mut source, &mut out).unwrap();
        assert_eq!(count, 0);
        assert!(out.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_headers_disabled() {
        let mut source = MemoryRowSource::with_rows(
            sample_schema(),
            vec![sample_row(Some(1), "a"), sample_row(Some(2), "b")],
        )
        .unwrap();
        let mut exporter = Exporter::new().with_options(ExportOptions::NONE);
        let output = export_to_string(&mut exporter, &mut source);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1\t"));
        assert!(lines[1].starts_with("2\t"));
    }

    #[test]
    fn test_separator_count_per_line() {
        let mut source = MemoryRowSource::with_rows(
            sample_schema(),
            vec![
                sample_row(Some(1), "plain"),
                sample_row(None, "quote \" inside"),
                sample_row(Some(3), "multi\r\nline"),
            ],
        )
        .unwrap();
        let mut exporter = Exporter::new()
            .with_column_separator('|')
            .with_row_separator("\r\n");
        let output = export_to_string(&mut exporter, &mut source);

        assert!(output.ends_with("\r\n"));
        let lines: Vec<&str> = output.split_terminator("\r\n").collect();
        assert_eq!(lines[0], "id|name|created");
        assert_eq!(lines.len(), 4);
        for line in &lines {
            assert_eq!(line.matches('|').count(), 2);
        }
        // CRLF inside the value is folded to LF
        assert!(lines[3].contains("\"multi\nline\""));
    }

    #[test]
    fn test_multibyte_column_separator() {
        let mut source = MemoryRowSource::with_rows(
            sample_schema(),
            vec![sample_row(Some(7), "x")],
        )
        .unwrap();
        let mut exporter = Exporter::new().with_column_separator('¦');
        let output = export_to_string(&mut exporter, &mut source);
        assert_eq!(output.lines().next().unwrap(), "id¦name¦created");
    }

    #[test]
    fn test_progress_counts() {
        for (rows, expected) in [
            (3usize, vec![2u64]),
            (4, vec![2, 4]),
            (1, vec![]),
            (7, vec![2, 4, 6]),
        ] {
            let mut exporter = Exporter::new().with_progress_interval(2);
            let seen = record_progress(&mut exporter);
            let mut source = numbered_source(rows);
            export_to_string(&mut exporter, &mut source);
            assert_eq!(*seen.lock().unwrap(), expected, "rows = {}", rows);
        }
    }

    #[test]
    fn test_progress_disabled_with_zero_interval() {
        let mut exporter = Exporter::new();
        let seen = record_progress(&mut exporter);
        let mut source = numbered_source(10);
        export_to_string(&mut exporter, &mut source);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_observer_error_aborts_export() {
        let mut exporter = Exporter::new()
            .with_options(ExportOptions::NONE)
            .with_progress_interval(2);
        exporter.on_progress(|count| {
            if count >= 2 {
                Err(ExportError::Observer("cancelled".into()))
            } else {
                Ok(())
            }
        });

        let mut source = numbered_source(5);
        let mut out: Vec<u8> = Vec::new();
        let err = exporter.export(&mut source, &mut out).unwrap_err();
        assert!(matches!(err, ExportError::Observer(ref m) if m == "cancelled"));
        // Rows written before the observer fired stay in the sink
        assert_eq!(String::from_utf8(out).unwrap(), "0\n1\n");
    }

    #[test]
    fn test_custom_formatter_used_for_exact_type() {
        let schema = Schema::new(vec![
            Column::new("small", FieldType::Int32),
            Column::new("big", FieldType::Int64),
        ]);
        let mut source = MemoryRowSource::with_rows(
            schema,
            vec![vec![Some(Value::Int32(5)), Some(Value::Int64(5))]],
        )
        .unwrap();
        let mut exporter = Exporter::new().with_options(ExportOptions::NONE);
        exporter.register_formatter(FieldType::Int64, |value, out| {
            write!(out, "{}L", value)
        });
        assert_eq!(export_to_string(&mut exporter, &mut source), "5\t5L\n");
    }

    #[test]
    fn test_from_config() {
        let config = ExportConfig {
            column_separator: ',',
            row_separator: "\r\n".to_string(),
            null_representation: String::new(),
            include_headers: false,
            progress_interval: 10,
        };
        let exporter = Exporter::from_config(&config);
        assert_eq!(exporter.column_separator(), ',');
        assert_eq!(exporter.row_separator(), "\r\n");
        assert_eq!(exporter.null_representation(), "");
        assert!(!exporter.options().contains(ExportOptions::INCLUDE_HEADERS));
        assert_eq!(exporter.progress_interval(), 10);
    }

    /// Sink that fails after accepting `limit` bytes
    struct FailingSink {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.len() + buf.len() > self.limit {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_propagates() {
        let mut source = numbered_source(100);
        let mut sink = FailingSink {
            written: Vec::new(),
            limit: 8,
        };
        let err = Exporter::new().export(&mut source, &mut sink).unwrap_err();
        assert!(matches!(err, ExportError::Sink(_)));
        assert!(sink.written.starts_with(b"n\n0\n"));
    }

    /// Sink that accepts every write but cannot flush
    struct UnflushableSink {
        written: Vec<u8>,
    }

    impl Write for UnflushableSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn test_flush_failure_after_success_is_sink_error() {
        let mut sink = UnflushableSink {
            written: Vec::new(),
        };
        let err = finish_destination(Ok(3), &mut sink, Path::new("out.tsv")).unwrap_err();
        assert!(matches!(err, ExportError::Sink(ref e) if e.to_string() == "device gone"));
    }

    #[test]
    fn test_flush_failure_does_not_mask_export_error() {
        let mut sink = UnflushableSink {
            written: Vec::new(),
        };
        let err = finish_destination(
            Err(ExportError::Observer("stop".to_string())),
            &mut sink,
            Path::new("out.tsv"),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Observer(ref m) if m == "stop"));
    }

    #[test]
    fn test_finish_destination_passes_count_through() {
        let mut out: Vec<u8> = Vec::new();
        let count = finish_destination(Ok(7), &mut out, Path::new("out.tsv")).unwrap();
        assert_eq!(count, 7);
    }

    #[test]
    fn test_export_reports_flush_failure() {
        let mut source = numbered_source(1);
        let mut sink = UnflushableSink {
            written: Vec::new(),
        };
        let err = Exporter::new().export(&mut source, &mut sink).unwrap_err();
        assert!(matches!(err, ExportError::Sink(_)));
        assert_eq!(sink.written, b"n\n0\n");
    }

    /// Source that claims rows up front but yields none
    struct HeaderOnlySource {
        schema: Schema,
    }

    impl RowSource for HeaderOnlySource {
        fn schema(&self) -> &Schema {
            &self.schema
        }

        fn has_rows(&mut self) -> SourceResult<bool> {
            Ok(true)
        }

        fn advance(&mut self) -> SourceResult<bool> {
            Ok(false)
        }

        fn is_null(&self, _index: usize) -> SourceResult<bool> {
            Err(SourceError::NoCurrentRow)
        }

        fn value(&self, _index: usize) -> SourceResult<&Value> {
            Err(SourceError::NoCurrentRow)
        }
    }

    #[test]
    fn test_header_written_when_rows_reported_but_none_yielded() {
        let mut source = HeaderOnlySource {
            schema: Schema::parse("a:int,b:text").unwrap(),
        };
        let mut out: Vec<u8> = Vec::new();
        let count = Exporter::new().export(&mut source, &mut out).unwrap();
        assert_eq!(count, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "a\tb\n");
    }

    #[test]
    fn test_float32_exported_in_shortest_form() {
        let schema = Schema::new(vec![Column::new("r", FieldType::Float32)]);
        let mut source =
            MemoryRowSource::with_rows(schema, vec![vec![Some(Value::Float32(0.1))]]).unwrap();
        let output = export_to_string(&mut Exporter::new(), &mut source);
        assert_eq!(output, "r\n0.1\n");
    }

    /// Source that fails on the nth advance
    struct BrokenSource {
        inner: MemoryRowSource,
        fail_at: usize,
        advanced: usize,
    }

    impl RowSource for BrokenSource {
        fn schema(&self) -> &Schema {
            self.inner.schema()
        }

        fn has_rows(&mut self) -> SourceResult<bool> {
            self.inner.has_rows()
        }

        fn advance(&mut self) -> SourceResult<bool> {
            self.advanced += 1;
            if self.advanced == self.fail_at {
                return Err(SourceError::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset",
                )));
            }
            self.inner.advance()
        }

        fn is_null(&self, index: usize) -> SourceResult<bool> {
            self.inner.is_null(index)
        }

        fn value(&self, index: usize) -> SourceResult<&Value> {
            self.inner.value(index)
        }
    }

    #[test]
    fn test_source_failure_keeps_written_rows() {
        let mut source = BrokenSource {
            inner: numbered_source(5),
            fail_at: 3,
            advanced: 0,
        };
        let mut out: Vec<u8> = Vec::new();
        let err = Exporter::new().export(&mut source, &mut out).unwrap_err();
        assert!(matches!(err, ExportError::Source(SourceError::Io(_))));
        assert_eq!(String::from_utf8(out).unwrap(), "n\n0\n1\n");
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        std::fs::write(&path, "stale content that must be truncated").unwrap();

        let mut source = numbered_source(3);
        let count = Exporter::new().export_to_path(&mut source, &path).unwrap();
        assert_eq!(count, 3);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "n\n0\n1\n2\n");
    }

    #[test]
    fn test_export_to_path_empty_source_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.tsv");
        let mut source = MemoryRowSource::new(sample_schema());
        Exporter::new().export_to_path(&mut source, &path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_export_to_path_flushes_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.tsv");
        let mut source = BrokenSource {
            inner: numbered_source(5),
            fail_at: 3,
            advanced: 0,
        };
        let err = Exporter::new()
            .export_to_path(&mut source, &path)
            .unwrap_err();
        assert!(matches!(err, ExportError::Source(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "n\n0\n1\n");
    }

    #[test]
    fn test_export_to_path_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.tsv");
        let mut source = numbered_source(1);
        let err = Exporter::new()
            .export_to_path(&mut source, &path)
            .unwrap_err();
        assert!(matches!(err, ExportError::Destination { .. }));
    }

    #[test]
    fn test_export_through_dyn_source() {
        let mut source = numbered_source(2);
        let dyn_source: &mut dyn RowSource = &mut source;
        let mut out: Vec<u8> = Vec::new();
        let count = Exporter::new().export(dyn_source, &mut out).unwrap();
        assert_eq!(count, 2);
    }
}
