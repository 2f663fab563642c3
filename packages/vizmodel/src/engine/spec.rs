//! Model specifications: the JSON form of a model.

use super::model::Model;
use super::schema::{APPLICATION, DATA, SELECTION_FILTER};
use super::types::{FastMap, PropertyName};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Properties left out of JSON-mode specs unless the caller says otherwise.
/// `data` would drag the whole table in (and back-references with it).
const JSON_OMITTED: [&str; 3] = [DATA, SELECTION_FILTER, APPLICATION];

/// Type id key of an emitted spec.
pub const TYPE_KEY: &str = "_";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecOptions {
    /// JSON mode: the spec is headed for text, not for an in-memory clone.
    pub json: bool,
    /// Explicit omission flags; `false` forces inclusion.
    pub omit_props: FastMap<PropertyName, bool>,
}

impl SpecOptions {
    pub fn json() -> Self {
        Self { json: true, ..Default::default() }
    }

    pub fn full() -> Self {
        Self::default()
    }

    pub fn omit(mut self, name: impl Into<PropertyName>, omit: bool) -> Self {
        self.omit_props.insert(name.into(), omit);
        self
    }

    #[inline]
    pub fn is_omitted(&self, name: &str) -> bool {
        self.omit_props.get(name).copied().unwrap_or(false)
    }
}

/// In JSON mode, adds the implicit omissions the caller did not decide on.
fn effective_options(options: &SpecOptions) -> Cow<'_, SpecOptions> {
    if !options.json {
        return Cow::Borrowed(options);
    }

    let mut adjusted = options.clone();
    for name in JSON_OMITTED {
        adjusted
            .omit_props
            .entry(PropertyName::new(name))
            .or_insert(true);
    }
    Cow::Owned(adjusted)
}

/// Emits the type id and every set, non-omitted property in declaration order.
fn serialize_properties(model: &Model, options: &SpecOptions) -> Value {
    let mut spec = Map::new();
    spec.insert(TYPE_KEY.to_string(), Value::from(model.model_type().id()));

    for property in model.model_type().properties() {
        if options.is_omitted(&property.name) {
            continue;
        }
        if let Some(value) = model.get(&property.name) {
            spec.insert(property.name.to_string(), value.to_spec());
        }
    }

    Value::Object(spec)
}

impl Model {
    pub fn to_spec(&self, options: &SpecOptions) -> Value {
        serialize_properties(self, &effective_options(options))
    }
}

/// Serializes the JSON-mode spec.
impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_spec(&SpecOptions::json()).serialize(serializer)
    }
}
