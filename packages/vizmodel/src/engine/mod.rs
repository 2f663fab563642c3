pub mod changeset;
pub mod derived;
pub mod model;
pub mod schema;
pub mod spec;
pub mod types;

pub use changeset::{is_data_or_mapping_changed, ChangeEvent, Changeset, Transaction};
pub use derived::{compute_key_field_names, compute_measure_field_names};
pub use model::{Listener, Model};
pub use schema::{
    is_color_palette, is_visual_role, ModelType, ModelTypeBuilder, PropertyDescriptor,
    PropertyKind, VisualKeyType,
};
pub use spec::SpecOptions;
