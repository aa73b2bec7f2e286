//! Row source contract consumed by the exporter
//!
//! A row source is a forward-only, read-once cursor with a fixed schema.
//! The exporter never opens, queries or rewinds one; it only walks it through
//! [`RowSource`]. Two implementations ship with the crate:
//! - [`MemoryRowSource`]: rows held in memory, handy for tests and small tables
//! - [`JsonLinesRowSource`]: one JSON object per line, decoded against a schema

mod jsonl;
mod memory;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::SourceError;

pub use jsonl::JsonLinesRowSource;
pub use memory::MemoryRowSource;

/// Result type for row source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Declared type of a field.
///
/// Formatter lookup matches on exact equality of this value, so `Int32` and
/// `Int64` are different keys, and so are two `Custom` kinds with different
/// names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    DateTime,
    Date,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Boolean,
    Binary,
    /// Any other kind, identified by name (e.g. `inet`, `uuid`, `jsonb`).
    Custom(String),
}

impl FieldType {
    /// Canonical name used in schema specs and logs
    pub fn name(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::DateTime => "datetime",
            FieldType::Date => "date",
            FieldType::Int16 => "int16",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::Float32 => "float32",
            FieldType::Float64 => "float64",
            FieldType::Boolean => "boolean",
            FieldType::Binary => "binary",
            FieldType::Custom(name) => name,
        }
    }
}

impl FromStr for FieldType {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(SourceError::InvalidSchema("empty type name".to_string()));
        }

        let field_type = match name.to_lowercase().as_str() {
            "text" | "string" | "varchar" => FieldType::Text,
            "datetime" | "timestamp" | "timestamptz" => FieldType::DateTime,
            "date" => FieldType::Date,
            "int16" | "smallint" => FieldType::Int16,
            "int32" | "int" | "integer" => FieldType::Int32,
            "int64" | "bigint" => FieldType::Int64,
            "float32" | "real" => FieldType::Float32,
            "float64" | "double" => FieldType::Float64,
            "bool" | "boolean" => FieldType::Boolean,
            "binary" | "bytea" => FieldType::Binary,
            _ => FieldType::Custom(name.to_string()),
        };
        Ok(field_type)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A non-null field value.
///
/// Nulls are not values: a source reports them through [`RowSource::is_null`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Boolean(bool),
    Binary(Vec<u8>),
    /// Already-rendered text for a [`FieldType::Custom`] field.
    Custom(String),
}

impl Value {
    /// Check whether this value can be stored in a field of `field_type`
    pub fn conforms_to(&self, field_type: &FieldType) -> bool {
        matches!(
            (self, field_type),
            (Value::Text(_), FieldType::Text)
                | (Value::DateTime(_), FieldType::DateTime)
                | (Value::Date(_), FieldType::Date)
                | (Value::Int16(_), FieldType::Int16)
                | (Value::Int32(_), FieldType::Int32)
                | (Value::Int64(_), FieldType::Int64)
                | (Value::Float32(_), FieldType::Float32)
                | (Value::Float64(_), FieldType::Float64)
                | (Value::Boolean(_), FieldType::Boolean)
                | (Value::Binary(_), FieldType::Binary)
                | (Value::Custom(_), FieldType::Custom(_))
        )
    }
}

/// Verbatim textual conversion, used by the fallback formatter.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Custom(s) => f.write_str(s),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f%:z")),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Int16(n) => write!(f, "{n}"),
            Value::Int32(n) => write!(f, "{n}"),
            Value::Int64(n) => write!(f, "{n}"),
            Value::Float32(n) => write_float(f, *n),
            Value::Float64(n) => write_float(f, *n),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Binary(bytes) => write!(f, "\\x{}", hex::encode(bytes)),
        }
    }
}

// Rust prints infinities as `inf`; bulk loaders expect `Infinity`.
// Each width prints through its own `Display`.
fn write_float<T>(f: &mut fmt::Formatter<'_>, n: T) -> fmt::Result
where
    T: fmt::Display + Into<f64> + Copy,
{
    let wide: f64 = n.into();
    if wide.is_infinite() {
        f.write_str(if wide > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{n}")
    }
}

/// One named, typed column of a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub field_type: FieldType,
}

impl Column {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered field layout shared by every row of a source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Parse a `name:type,name:type` spec.
    ///
    /// A column without a type (`name`) is treated as text.
    pub fn parse(spec: &str) -> SourceResult<Self> {
        let mut columns = Vec::new();

        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, type_name) = match part.split_once(':') {
                Some((name, type_name)) => (name.trim(), type_name),
                None => (part, "text"),
            };

            if name.is_empty() {
                return Err(SourceError::InvalidSchema(format!(
                    "missing column name in '{}'",
                    part
                )));
            }
            if columns.iter().any(|c: &Column| c.name == name) {
                return Err(SourceError::InvalidSchema(format!(
                    "duplicate column '{}'",
                    name
                )));
            }

            columns.push(Column::new(name, type_name.parse()?));
        }

        if columns.is_empty() {
            return Err(SourceError::InvalidSchema("no columns".to_string()));
        }

        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Forward-only cursor over rows with a fixed schema.
///
/// Callers check [`has_rows`](RowSource::has_rows) once, then call
/// [`advance`](RowSource::advance) until it returns `false`, reading fields
/// of the current row in between. A source cannot be rewound.
pub trait RowSource {
    /// Field layout of every row
    fn schema(&self) -> &Schema;

    /// Report whether the source holds any row at all.
    ///
    /// Must not consume a row: the first `advance` still positions on the
    /// first record.
    fn has_rows(&mut self) -> SourceResult<bool>;

    /// Position on the next row; `false` once the source is exhausted
    fn advance(&mut self) -> SourceResult<bool>;

    /// Check whether field `index` of the current row is null
    fn is_null(&self, index: usize) -> SourceResult<bool>;

    /// Read the non-null value of field `index` of the current row
    fn value(&self, index: usize) -> SourceResult<&Value>;

    fn field_count(&self) -> usize {
        self.schema().len()
    }

    /// # Panics
    /// Panics if `index >= field_count()`.
    fn field_name(&self, index: usize) -> &str {
        &self.schema().columns[index].name
    }

    /// # Panics
    /// Panics if `index >= field_count()`.
    fn field_type(&self, index: usize) -> &FieldType {
        &self.schema().columns[index].field_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_schema() {
        let schema = Schema::parse("id:int, name:text, created:timestamp, addr:inet").unwrap();
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.columns[0].field_type, FieldType::Int32);
        assert_eq!(schema.columns[1].field_type, FieldType::Text);
        assert_eq!(schema.columns[2].field_type, FieldType::DateTime);
        assert_eq!(schema.columns[3].field_type, FieldType::Custom("inet".to_string()));
        assert_eq!(schema.index_of("created"), Some(2));
    }

    #[test]
    fn test_parse_schema_defaults_to_text() {
        let schema = Schema::parse("note").unwrap();
        assert_eq!(schema.columns[0], Column::new("note", FieldType::Text));
    }

    #[test]
    fn test_parse_schema_rejects_duplicates_and_empty() {
        assert!(Schema::parse("a:int,a:text").is_err());
        assert!(Schema::parse(" , ").is_err());
        assert!(Schema::parse(":int").is_err());
    }

    #[test]
    fn test_custom_types_are_distinct() {
        let inet: FieldType = "inet".parse().unwrap();
        let cidr: FieldType = "cidr".parse().unwrap();
        assert_ne!(inet, cidr);
        assert_ne!(FieldType::Int32, FieldType::Int64);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int64(-42).to_string(), "-42");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Float64(1.5).to_string(), "1.5");
        assert_eq!(Value::Float64(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Float32(f32::NAN).to_string(), "NaN");
        assert_eq!(Value::Float32(0.1).to_string(), "0.1");
        assert_eq!(Value::Float32(f32::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Binary(vec![0xde, 0xad]).to_string(), "\\xdead");
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()).to_string(),
            "2020-01-02"
        );
        let dt = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2020-01-02 03:04:05+00:00");
    }

    #[test]
    fn test_value_conforms_to() {
        assert!(Value::Text("x".into()).conforms_to(&FieldType::Text));
        assert!(!Value::Int32(1).conforms_to(&FieldType::Int64));
        assert!(Value::Custom("10.0.0.1".into()).conforms_to(&FieldType::Custom("inet".into())));
    }
}
