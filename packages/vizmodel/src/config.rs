//! File-based model configuration.
//!
//! A config file (YAML, or JSON since JSON is valid YAML) declares a model
//! type and the values of one instance:
//!
//! ```yaml
//! type:
//!   id: visual/models/Bar
//!   visualKeyType: dataKey
//!   properties:
//!     - { name: rows, kind: visualRole, key: key }
//!     - { name: measures, kind: visualRole, key: measure }
//!     - { name: palette, kind: palette }
//! data:
//!   columns: [{ id: country, type: string }, { id: sales, type: number }]
//!   rows: [["PT", 10], ["ES", 20]]
//! mappings:
//!   rows: [country]
//!   measures: [sales]
//! selectionFilter: or
//! ```

use crate::engine::schema::{ModelType, PropertyDescriptor, PropertyKind, VisualKeyType};
use crate::engine::types::{
    Application, DataTable, KeyClassification, MappingField, Palette, ValueKind, VisualRoleMapping,
};
use crate::engine::Model;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use smol_str::SmolStr;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyConfig {
    pub name: SmolStr,
    #[serde(default)]
    pub kind: PropertyKind,
    /// Value kind of plain properties; scalar when absent.
    #[serde(default)]
    pub value_kind: Option<ValueKind>,
    #[serde(default)]
    pub key: KeyClassification,
    #[serde(default)]
    pub required: bool,
}

impl PropertyConfig {
    fn descriptor(&self) -> PropertyDescriptor {
        let descriptor = match self.kind {
            PropertyKind::Plain => PropertyDescriptor::plain(
                self.name.clone(),
                self.value_kind.unwrap_or(ValueKind::Scalar),
            ),
            PropertyKind::VisualRole => {
                PropertyDescriptor::visual_role(self.name.clone(), self.key)
            }
            PropertyKind::ColorPalette => PropertyDescriptor::palette(self.name.clone()),
        };
        descriptor.required(self.required)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeConfig {
    pub id: SmolStr,
    #[serde(default)]
    pub visual_key_type: VisualKeyType,
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
}

/// A mapped field, written either as a bare name or as `{ name, type }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum FieldEntry {
    Name(SmolStr),
    Field(MappingField),
}

impl From<FieldEntry> for MappingField {
    fn from(entry: FieldEntry) -> Self {
        match entry {
            FieldEntry::Name(name) => MappingField::new(name),
            FieldEntry::Field(field) => field,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(rename = "type")]
    pub model_type: TypeConfig,
    #[serde(default)]
    pub application: Option<Application>,
    #[serde(default)]
    pub data: Option<DataTable>,
    #[serde(default)]
    pub mappings: IndexMap<SmolStr, Vec<FieldEntry>>,
    #[serde(default)]
    pub palettes: IndexMap<SmolStr, Vec<SmolStr>>,
    #[serde(default)]
    pub selection_filter: Option<Value>,
    /// Values of plain scalar properties.
    #[serde(default)]
    pub values: IndexMap<SmolStr, Value>,
}

impl ModelConfig {
    pub fn build_type(&self) -> crate::error::Result<Arc<ModelType>> {
        self.model_type
            .properties
            .iter()
            .fold(
                ModelType::builder(self.model_type.id.clone())
                    .visual_key_type(self.model_type.visual_key_type),
                |builder, property| builder.property(property.descriptor()),
            )
            .build()
    }

    /// Creates a model of the configured type and applies every configured
    /// value in a single transaction.
    pub fn instantiate(&self) -> Result<Model> {
        let model_type = self
            .build_type()
            .with_context(|| format!("Invalid model type '{}'", self.model_type.id))?;
        let mut model = Model::new(model_type);

        let mut tx = model.transaction();
        if let Some(application) = &self.application {
            tx.set_application(application.clone())?;
        }
        if let Some(data) = &self.data {
            tx.set_data(data.clone())?;
        }
        for (role, fields) in &self.mappings {
            let key = tx
                .model()
                .model_type()
                .property(role)
                .map(|p| p.key)
                .unwrap_or_default();
            let mapping =
                VisualRoleMapping::with_fields(key, fields.iter().cloned().map(MappingField::from));
            tx.set_mapping(role, mapping)
                .with_context(|| format!("Invalid mapping '{}'", role))?;
        }
        for (name, colors) in &self.palettes {
            tx.set(name, Palette::new(colors.iter().cloned()))
                .with_context(|| format!("Invalid palette '{}'", name))?;
        }
        for (name, value) in &self.values {
            tx.set(name, value.clone())
                .with_context(|| format!("Invalid value for '{}'", name))?;
        }
        if let Some(spec) = &self.selection_filter {
            tx.set_filter_spec(spec).context("Invalid selectionFilter")?;
        }

        let event = tx.commit().context("Failed to apply configured values")?;
        debug!(changed = event.changed.len(), cascaded = event.cascaded, "model instantiated");

        Ok(model)
    }
}

pub fn parse_config(source: &str) -> Result<ModelConfig> {
    serde_yaml::from_str(source).context("Failed to parse model config")
}

/// Load a model configuration from a YAML or JSON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ModelConfig> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model config: {:?}", path))?;
    parse_config(&source)
}
