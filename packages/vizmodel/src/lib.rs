// src/lib.rs

pub mod config;
pub mod engine;
pub mod error;

// Re-export commonly used types for convenience
pub use engine::types::{
    Application, Column, DataRef, DataTable, DataView, FieldType, Filter, FilterNode,
    KeyClassification, MappingField, Palette, PropertyValue, ResolvedField, RoleMapping,
    TableSource, ValueKind, VisualRoleMapping,
};
pub use engine::{
    ChangeEvent, Changeset, Model, ModelType, PropertyDescriptor, PropertyKind, SpecOptions,
    Transaction, VisualKeyType,
};
pub use error::{MappingError, ModelError, Result};
