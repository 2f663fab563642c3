use crate::engine::types::ValueKind;
use smol_str::SmolStr;
use thiserror::Error;

/// Failure raised by a role mapping's invalidation hook.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("invalidation failed: {0}")]
    Invalidation(String),
}

#[derive(Error, Debug, Clone)]
pub enum ModelError {
    #[error("type '{type_id}' has no property '{property}'")]
    UnknownProperty { type_id: SmolStr, property: SmolStr },

    #[error("property '{property}' expects a {expected} value, got {actual}")]
    WrongValueType {
        property: SmolStr,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("required property '{0}' cannot be cleared")]
    RequiredProperty(SmolStr),

    #[error("required property '{0}' is not set")]
    MissingRequired(SmolStr),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("property '{property}' is declared twice on type '{type_id}'")]
    DuplicateProperty { type_id: SmolStr, property: SmolStr },

    #[error("visual key type of '{type_id}' is already fixed by an ancestor")]
    VisualKeyTypeLocked { type_id: SmolStr },

    #[error("role mapping '{property}' failed: {source}")]
    Cascade {
        property: SmolStr,
        #[source]
        source: MappingError,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
