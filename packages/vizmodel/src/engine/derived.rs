//! Key and measure field lists.
//!
//! Both lists are recomputed from the current mappings on every call. They
//! are only produced for types whose visual key type is
//! [`VisualKeyType::DataKey`]; for any other type both are empty.

use super::model::Model;
use super::schema::VisualKeyType;
use super::types::{PropertyName, RoleMapping};
use indexmap::IndexSet;

/// Role mappings of `model` in declaration order.
fn role_mappings(model: &Model) -> impl Iterator<Item = &dyn RoleMapping> {
    model
        .model_type()
        .visual_roles()
        .filter_map(move |role| model.mapping(&role.name))
}

fn collect_key_fields(model: &Model) -> IndexSet<PropertyName> {
    let mut keys = IndexSet::new();
    if model.model_type().visual_key_type() != VisualKeyType::DataKey {
        return keys;
    }

    for mapping in role_mappings(model).filter(|m| m.is_key()) {
        for field in mapping.fields() {
            keys.insert(field.name.clone());
        }
    }
    keys
}

/// Field names of key mappings, first occurrence wins.
pub fn compute_key_field_names(model: &Model) -> Vec<PropertyName> {
    collect_key_fields(model).into_iter().collect()
}

/// Field names of non-key mappings that are not already key fields, first
/// occurrence wins.
pub fn compute_measure_field_names(model: &Model) -> Vec<PropertyName> {
    if model.model_type().visual_key_type() != VisualKeyType::DataKey {
        return Vec::new();
    }

    let keys = collect_key_fields(model);
    let mut measures: IndexSet<PropertyName> = IndexSet::new();

    for mapping in role_mappings(model).filter(|m| !m.is_key()) {
        for field in mapping.fields() {
            if !keys.contains(&field.name) {
                measures.insert(field.name.clone());
            }
        }
    }
    measures.into_iter().collect()
}
