//! Shared helpers for the vizmodel integration tests.
//!
//! [`SpyMapping`] records every invalidation into a shared log so tests can
//! check which mappings were told about a change, and in which order
//! relative to the model's listeners.

#![allow(dead_code)]

use serde_json::json;
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use vizmodel::{
    Column, DataTable, FieldType, KeyClassification, MappingError, MappingField, Model, ModelType,
    ResolvedField, RoleMapping, VisualKeyType,
};

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// A role mapping that logs its invalidations and can be told to fail.
/// Fields are kept exactly as given, repeats included.
#[derive(Debug)]
pub struct SpyMapping {
    label: String,
    fields: Vec<MappingField>,
    key: bool,
    fail: bool,
    log: Log,
    resolved: OnceCell<Vec<ResolvedField>>,
}

impl SpyMapping {
    pub fn new(label: &str, key: bool, fields: &[&str], log: &Log) -> Self {
        Self {
            label: label.to_string(),
            fields: fields.iter().map(|f| MappingField::new(*f)).collect(),
            key,
            fail: false,
            log: log.clone(),
            resolved: OnceCell::new(),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl RoleMapping for SpyMapping {
    fn fields(&self) -> &[MappingField] {
        &self.fields
    }

    fn is_key(&self) -> bool {
        self.key
    }

    fn on_data_or_mapping_changed(&mut self) -> Result<(), MappingError> {
        self.log.borrow_mut().push(self.label.clone());
        self.resolved = OnceCell::new();
        if self.fail {
            return Err(MappingError::Invalidation(format!("{} refused", self.label)));
        }
        Ok(())
    }

    fn resolve(&self, data: Option<&DataTable>) -> &[ResolvedField] {
        self.resolved.get_or_init(|| {
            self.fields
                .iter()
                .map(|f| ResolvedField {
                    name: f.name.clone(),
                    column: data.and_then(|d| d.column_index(&f.name)),
                    field_type: data.and_then(|d| d.column_type(&f.name)),
                })
                .collect()
        })
    }
}

/// Line chart type: `rows` (key), `palette`, `measures` (measure),
/// `columns` (key), `lineWidth` (plain).
pub fn line_type() -> Arc<ModelType> {
    line_type_with(VisualKeyType::DataKey)
}

pub fn line_type_with(key_type: VisualKeyType) -> Arc<ModelType> {
    ModelType::builder("visual/models/Line")
        .visual_key_type(key_type)
        .visual_role("rows", KeyClassification::Key)
        .palette("palette")
        .visual_role("measures", KeyClassification::Measure)
        .visual_role("columns", KeyClassification::Key)
        .plain("lineWidth", vizmodel::ValueKind::Scalar)
        .build()
        .expect("line type")
}

pub fn setup() -> Model {
    Model::new(line_type())
}

/// Installs spies on every role of a line model and clears the log.
pub fn setup_with_spies(log: &Log) -> Model {
    let mut model = setup();
    let mut tx = model.transaction();
    tx.set_mapping("rows", SpyMapping::new("rows", true, &["country"], log))
        .unwrap();
    tx.set_mapping("measures", SpyMapping::new("measures", false, &["sales"], log))
        .unwrap();
    tx.set_mapping("columns", SpyMapping::new("columns", true, &["product"], log))
        .unwrap();
    tx.commit().unwrap();
    log.borrow_mut().clear();
    model
}

pub fn sales_table() -> DataTable {
    DataTable::new(vec![
        Column::new("country", FieldType::String),
        Column::new("product", FieldType::String),
        Column::new("sales", FieldType::Number),
    ])
    .with_rows(vec![
        vec![json!("PT"), json!("chair"), json!(10)],
        vec![json!("ES"), json!("table"), json!(20)],
    ])
}

/// Same columns as [`sales_table`], reordered.
pub fn reordered_sales_table() -> DataTable {
    DataTable::new(vec![
        Column::new("sales", FieldType::Number),
        Column::new("product", FieldType::String),
        Column::new("country", FieldType::String),
    ])
}
