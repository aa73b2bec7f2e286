//! JSON Lines row source
//!
//! Reads one JSON object per line and decodes the fields named by the schema.
//! Missing keys and JSON `null` both read as null fields; keys not in the
//! schema are ignored.

use std::io::BufRead;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::SourceError;

use super::{FieldType, RowSource, Schema, SourceResult, Value};

/// Row source over a reader of JSON Lines.
pub struct JsonLinesRowSource<R: BufRead> {
    reader: R,
    schema: Schema,
    /// Physical line number of the last line read
    line_no: usize,
    /// A record read ahead by `has_rows`, not yet handed out by `advance`
    pending: Option<(usize, String)>,
    current: Option<Vec<Option<Value>>>,
    rows_read: u64,
    exhausted: bool,
}

impl<R: BufRead> JsonLinesRowSource<R> {
    /// Create a new JSON Lines source
    ///
    /// # Arguments
    /// * `reader` - Buffered reader positioned at the first line
    /// * `schema` - Fields to extract from every record
    pub fn new(reader: R, schema: Schema) -> Self {
        Self {
            reader,
            schema,
            line_no: 0,
            pending: None,
            current: None,
            rows_read: 0,
            exhausted: false,
        }
    }

    /// Read the next non-blank line, if any
    fn read_record(&mut self) -> SourceResult<Option<(usize, String)>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                self.exhausted = true;
                return Ok(None);
            }
            self.line_no += 1;
            if !line.trim().is_empty() {
                return Ok(Some((self.line_no, line)));
            }
        }
    }

    fn decode(&self, line_no: usize, line: &str) -> SourceResult<Vec<Option<Value>>> {
        let record: JsonValue =
            serde_json::from_str(line.trim()).map_err(|e| SourceError::Malformed {
                line: line_no,
                message: e.to_string(),
            })?;

        let object = record.as_object().ok_or_else(|| SourceError::Malformed {
            line: line_no,
            message: "expected a JSON object".to_string(),
        })?;

        self.schema
            .columns
            .iter()
            .map(|column| match object.get(&column.name) {
                None | Some(JsonValue::Null) => Ok(None),
                Some(json) => convert(json, &column.field_type)
                    .map(Some)
                    .map_err(|message| SourceError::InvalidValue {
                        field: column.name.clone(),
                        message: format!("line {}: {}", line_no, message),
                    }),
            })
            .collect()
    }

    fn current_field(&self, index: usize) -> SourceResult<&Option<Value>> {
        self.current
            .as_ref()
            .ok_or(SourceError::NoCurrentRow)?
            .get(index)
            .ok_or(SourceError::FieldOutOfRange(index))
    }
}

impl<R: BufRead> RowSource for JsonLinesRowSource<R> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn has_rows(&mut self) -> SourceResult<bool> {
        if self.rows_read > 0 || self.pending.is_some() {
            return Ok(true);
        }
        self.pending = self.read_record()?;
        Ok(self.pending.is_some())
    }

    fn advance(&mut self) -> SourceResult<bool> {
        let record = match self.pending.take() {
            Some(record) => Some(record),
            None => self.read_record()?,
        };

        match record {
            Some((line_no, line)) => {
                self.current = Some(self.decode(line_no, &line)?);
                self.rows_read += 1;
                Ok(true)
            }
            None => {
                if self.current.take().is_some() {
                    debug!("JSON Lines source exhausted after {} records", self.rows_read);
                }
                Ok(false)
            }
        }
    }

    fn is_null(&self, index: usize) -> SourceResult<bool> {
        Ok(self.current_field(index)?.is_none())
    }

    fn value(&self, index: usize) -> SourceResult<&Value> {
        self.current_field(index)?
            .as_ref()
            .ok_or_else(|| SourceError::InvalidValue {
                field: self.schema.columns[index].name.clone(),
                message: "value is null".to_string(),
            })
    }
}

/// Convert a JSON value into a field value of the declared type
fn convert(json: &JsonValue, field_type: &FieldType) -> Result<Value, String> {
    match field_type {
        FieldType::Text => Ok(Value::Text(match json {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })),
        FieldType::Custom(_) => Ok(Value::Custom(match json {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })),
        FieldType::DateTime => parse_datetime(expect_str(json)?).map(Value::DateTime),
        FieldType::Date => NaiveDate::parse_from_str(expect_str(json)?, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|e| format!("invalid date: {}", e)),
        FieldType::Int16 => expect_i64(json)?
            .try_into()
            .map(Value::Int16)
            .map_err(|_| format!("{} does not fit in int16", json)),
        FieldType::Int32 => expect_i64(json)?
            .try_into()
            .map(Value::Int32)
            .map_err(|_| format!("{} does not fit in int32", json)),
        FieldType::Int64 => expect_i64(json).map(Value::Int64),
        FieldType::Float32 => expect_f64(json).map(|f| Value::Float32(f as f32)),
        FieldType::Float64 => expect_f64(json).map(Value::Float64),
        FieldType::Boolean => json
            .as_bool()
            .map(Value::Boolean)
            .ok_or_else(|| format!("expected a boolean, found {}", json)),
        FieldType::Binary => {
            let text = expect_str(json)?;
            let digits = text.strip_prefix("\\x").unwrap_or(text);
            hex::decode(digits)
                .map(Value::Binary)
                .map_err(|e| format!("invalid hex: {}", e))
        }
    }
}

fn expect_str(json: &JsonValue) -> Result<&str, String> {
    json.as_str()
        .ok_or_else(|| format!("expected a string, found {}", json))
}

fn expect_i64(json: &JsonValue) -> Result<i64, String> {
    json.as_i64()
        .ok_or_else(|| format!("expected an integer, found {}", json))
}

fn expect_f64(json: &JsonValue) -> Result<f64, String> {
    json.as_f64()
        .ok_or_else(|| format!("expected a number, found {}", json))
}

/// Accept RFC 3339 timestamps, or naive `YYYY-MM-DD HH:MM:SS` read as UTC
fn parse_datetime(text: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid datetime '{}'", text))
}
