use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;
use std::sync::Arc;

/// Type metadata of a data column (and of a mapped field).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
}

impl FieldType {
    /// Continuous types carry measures; everything else is categorical.
    #[inline]
    pub fn is_continuous(self) -> bool {
        matches!(self, FieldType::Number)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Column {
    pub id: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

impl Column {
    pub fn new(id: impl Into<SmolStr>, field_type: FieldType) -> Self {
        Self { id: id.into(), label: None, field_type }
    }
}

/// Plain tabular data: ordered columns and rows of JSON cells.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DataTable {
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows = rows;
        self
    }

    #[inline]
    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    #[inline]
    pub fn column_type(&self, id: &str) -> Option<FieldType> {
        self.columns.iter().find(|c| c.id == id).map(|c| c.field_type)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A row/column projection over a shared table. Never stored on a model as is:
/// writing one to `data` materializes it into a plain table first.
#[derive(Clone, Debug)]
pub struct DataView {
    source: Arc<DataTable>,
    rows: Option<Vec<usize>>,
    columns: Option<Vec<SmolStr>>,
}

impl DataView {
    pub fn new(source: Arc<DataTable>) -> Self {
        Self { source, rows: None, columns: None }
    }

    pub fn select_rows(mut self, rows: Vec<usize>) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn select_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn source(&self) -> &Arc<DataTable> {
        &self.source
    }

    /// Materializes the projection. Unknown columns and out-of-range rows are errors.
    pub fn to_plain_table(&self) -> Result<DataTable> {
        let indices: Vec<usize> = match &self.columns {
            None => (0..self.source.columns.len()).collect(),
            Some(ids) => ids
                .iter()
                .map(|id| {
                    self.source
                        .column_index(id)
                        .ok_or_else(|| ModelError::InvalidData(format!("unknown column '{}'", id)))
                })
                .collect::<Result<_>>()?,
        };

        let columns = indices.iter().map(|&i| self.source.columns[i].clone()).collect();

        let project = |row: &Vec<Value>| -> Vec<Value> {
            indices
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
                .collect()
        };

        let rows = match &self.rows {
            None => self.source.rows.iter().map(project).collect(),
            Some(selected) => selected
                .iter()
                .map(|&r| {
                    self.source
                        .rows
                        .get(r)
                        .map(project)
                        .ok_or_else(|| ModelError::InvalidData(format!("row {} out of range", r)))
                })
                .collect::<Result<_>>()?,
        };

        Ok(DataTable { columns, rows })
    }
}

/// Anything that can be written to a model's `data` property.
#[derive(Clone, Debug)]
pub enum TableSource {
    Plain(DataTable),
    Shared(Arc<DataTable>),
    View(DataView),
    Wrapped(DataRef),
}

impl From<DataTable> for TableSource {
    fn from(table: DataTable) -> Self {
        TableSource::Plain(table)
    }
}

impl From<Arc<DataTable>> for TableSource {
    fn from(table: Arc<DataTable>) -> Self {
        TableSource::Shared(table)
    }
}

impl From<DataView> for TableSource {
    fn from(view: DataView) -> Self {
        TableSource::View(view)
    }
}

impl From<DataRef> for TableSource {
    fn from(data: DataRef) -> Self {
        TableSource::Wrapped(data)
    }
}

/// Canonical stored form of `data`: a plain table behind a shared handle.
/// Cloning a `DataRef` shares the table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct DataRef(Arc<DataTable>);

impl DataRef {
    /// Unwraps any source to its plain table form and re-wraps it.
    pub fn normalize(source: impl Into<TableSource>) -> Result<Self> {
        match source.into() {
            TableSource::Plain(table) => Ok(DataRef(Arc::new(table))),
            TableSource::Shared(table) => Ok(DataRef(table)),
            TableSource::View(view) => Ok(DataRef(Arc::new(view.to_plain_table()?))),
            TableSource::Wrapped(data) => Ok(data),
        }
    }

    #[inline]
    pub fn table(&self) -> &DataTable {
        &self.0
    }

    #[inline]
    pub fn shared(&self) -> &Arc<DataTable> {
        &self.0
    }

    pub fn ptr_eq(&self, other: &DataRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
