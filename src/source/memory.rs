//! In-memory row source

use crate::error::SourceError;

use super::{RowSource, Schema, SourceResult, Value};

/// Row source backed by a vector of rows.
///
/// Rows are validated against the schema when added, so the exporter can
/// rely on every non-null value matching its declared field type.
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    schema: Schema,
    rows: Vec<Vec<Option<Value>>>,
    /// Index of the next row `advance` will move to
    next: usize,
    current: Option<usize>,
}

impl MemoryRowSource {
    /// Create an empty source with the given schema
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            next: 0,
            current: None,
        }
    }

    /// Create a source and load `rows` into it
    pub fn with_rows(schema: Schema, rows: Vec<Vec<Option<Value>>>) -> SourceResult<Self> {
        let mut source = Self::new(schema);
        for row in rows {
            source.push_row(row)?;
        }
        Ok(source)
    }

    /// Append a row; `None` marks a null field
    pub fn push_row(&mut self, row: Vec<Option<Value>>) -> SourceResult<()> {
        if row.len() != self.schema.len() {
            return Err(SourceError::InvalidValue {
                field: format!("row {}", self.rows.len() + 1),
                message: format!(
                    "expected {} fields, got {}",
                    self.schema.len(),
                    row.len()
                ),
            });
        }

        for (column, value) in self.schema.columns.iter().zip(&row) {
            if let Some(value) = value {
                if !value.conforms_to(&column.field_type) {
                    return Err(SourceError::InvalidValue {
                        field: column.name.clone(),
                        message: format!("{:?} is not a {} value", value, column.field_type),
                    });
                }
            }
        }

        self.rows.push(row);
        Ok(())
    }

    fn current_field(&self, index: usize) -> SourceResult<&Option<Value>> {
        let row = self.current.ok_or(SourceError::NoCurrentRow)?;
        self.rows[row]
            .get(index)
            .ok_or(SourceError::FieldOutOfRange(index))
    }
}

impl RowSource for MemoryRowSource {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn has_rows(&mut self) -> SourceResult<bool> {
        Ok(!self.rows.is_empty())
    }

    fn advance(&mut self) -> SourceResult<bool> {
        if self.next < self.rows.len() {
            self.current = Some(self.next);
            self.next += 1;
            Ok(true)
        } else {
            self.current = None;
            Ok(false)
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
