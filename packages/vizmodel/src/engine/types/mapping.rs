//! Visual role mappings.
//!
//! A role mapping binds an ordered, duplicate-free list of data fields to one
//! visual role of a model. The model calls
//! [`RoleMapping::on_data_or_mapping_changed`] on every mapping whenever a
//! commit touches `data` or any role property; implementations drop whatever
//! they derived from the previous state.

use super::table::{DataTable, FieldType};
use crate::error::MappingError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use smol_str::SmolStr;
use std::cell::OnceCell;
use std::fmt;

/// A reference to a data field: its name plus optional type metadata.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MappingField {
    pub name: SmolStr,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
}

impl MappingField {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self { name: name.into(), field_type: None }
    }

    pub fn typed(name: impl Into<SmolStr>, field_type: FieldType) -> Self {
        Self { name: name.into(), field_type: Some(field_type) }
    }
}

impl From<&str> for MappingField {
    fn from(name: &str) -> Self {
        MappingField::new(name)
    }
}

/// Whether a role contributes to the visual's identity (key) or not (measure).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeyClassification {
    Key,
    Measure,
    /// Key iff any mapped field is not continuous. Fields without type
    /// metadata count as categorical.
    #[default]
    Auto,
}

/// A mapped field looked up in the model's current data.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ResolvedField {
    pub name: SmolStr,
    pub column: Option<usize>,
    pub field_type: Option<FieldType>,
}

pub trait RoleMapping: fmt::Debug {
    /// Mapped fields in mapping order.
    fn fields(&self) -> &[MappingField];

    fn is_key(&self) -> bool;

    /// Drops state derived from the previous data or mapping contents.
    fn on_data_or_mapping_changed(&mut self) -> Result<(), MappingError>;

    /// Resolves the mapped fields against `data`. Implementations may cache the
    /// answer until the next [`on_data_or_mapping_changed`](Self::on_data_or_mapping_changed).
    fn resolve(&self, data: Option<&DataTable>) -> &[ResolvedField];

    fn to_spec(&self) -> Value {
        json!({ "fields": self.fields() })
    }
}

/// The stock role mapping.
#[derive(Clone, Debug, Default)]
pub struct VisualRoleMapping {
    fields: Vec<MappingField>,
    key: KeyClassification,
    resolved: OnceCell<Vec<ResolvedField>>,
    invalidations: u64,
}

impl VisualRoleMapping {
    pub fn new(key: KeyClassification) -> Self {
        Self { key, ..Default::default() }
    }

    /// Builds a mapping from `fields`; repeated names keep their first occurrence.
    pub fn with_fields<I, F>(key: KeyClassification, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<MappingField>,
    {
        let mut mapping = Self::new(key);
        for field in fields {
            mapping.push_field(field);
        }
        mapping
    }

    /// Appends `field` unless a field with the same name is already mapped.
    pub fn push_field(&mut self, field: impl Into<MappingField>) -> bool {
        let field = field.into();
        if self.fields.iter().any(|f| f.name == field.name) {
            return false;
        }
        self.fields.push(field);
        self.resolved = OnceCell::new();
        true
    }

    pub fn remove_field(&mut self, name: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.name != name);
        let removed = self.fields.len() != before;
        if removed {
            self.resolved = OnceCell::new();
        }
        removed
    }

    /// Whether a field resolution is currently cached.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Number of times the invalidation hook has run on this value.
    pub fn invalidation_count(&self) -> u64 {
        self.invalidations
    }
}

impl RoleMapping for VisualRoleMapping {
    fn fields(&self) -> &[MappingField] {
        &self.fields
    }

    fn is_key(&self) -> bool {
        match self.key {
            KeyClassification::Key => true,
            KeyClassification::Measure => false,
            KeyClassification::Auto => self
                .fields
                .iter()
                .any(|f| !f.field_type.is_some_and(FieldType::is_continuous)),
        }
    }

    fn on_data_or_mapping_changed(&mut self) -> Result<(), MappingError> {
        self.resolved = OnceCell::new();
        self.invalidations += 1;
        Ok(())
    }

    fn resolve(&self, data: Option<&DataTable>) -> &[ResolvedField] {
        self.resolved.get_or_init(|| {
            self.fields
                .iter()
                .map(|f| ResolvedField {
                    name: f.name.clone(),
                    column: data.and_then(|d| d.column_index(&f.name)),
                    field_type: f
                        .field_type
                        .or_else(|| data.and_then(|d| d.column_type(&f.name))),
                })
                .collect()
        })
    }
}
