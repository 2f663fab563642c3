use super::filter::Filter;
use super::mapping::RoleMapping;
use super::table::DataRef;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use smol_str::SmolStr;
use std::fmt;

/// Opaque application context a model is shown in.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Application {
    pub name: SmolStr,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub attributes: Value,
}

impl Application {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self { name: name.into(), attributes: Value::Null }
    }
}

/// Ordered list of CSS colors.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    pub colors: Vec<SmolStr>,
}

impl Palette {
    pub fn new<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self { colors: colors.into_iter().map(Into::into).collect() }
    }
}

/// Kind of value a property accepts.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Application,
    Data,
    Filter,
    Mapping,
    Palette,
    Scalar,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Application => "application",
            ValueKind::Data => "data",
            ValueKind::Filter => "filter",
            ValueKind::Mapping => "mapping",
            ValueKind::Palette => "palette",
            ValueKind::Scalar => "scalar",
        };
        f.write_str(name)
    }
}

/// A committed (or staged) property value.
#[derive(Debug)]
pub enum PropertyValue {
    Application(Application),
    Data(DataRef),
    Filter(Filter),
    Mapping(Box<dyn RoleMapping>),
    Palette(Palette),
    Scalar(Value),
}

impl PropertyValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::Application(_) => ValueKind::Application,
            PropertyValue::Data(_) => ValueKind::Data,
            PropertyValue::Filter(_) => ValueKind::Filter,
            PropertyValue::Mapping(_) => ValueKind::Mapping,
            PropertyValue::Palette(_) => ValueKind::Palette,
            PropertyValue::Scalar(_) => ValueKind::Scalar,
        }
    }

    pub fn as_mapping(&self) -> Option<&dyn RoleMapping> {
        match self {
            PropertyValue::Mapping(m) => Some(m.as_ref()),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut (dyn RoleMapping + 'static)> {
        match self {
            PropertyValue::Mapping(m) => Some(m.as_mut()),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&DataRef> {
        match self {
            PropertyValue::Data(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_filter(&self) -> Option<&Filter> {
        match self {
            PropertyValue::Filter(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            PropertyValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// JSON form used by the model serializer.
    pub fn to_spec(&self) -> Value {
        match self {
            PropertyValue::Application(app) => json!(app),
            PropertyValue::Data(data) => json!(data),
            PropertyValue::Filter(filter) => filter.to_spec(),
            PropertyValue::Mapping(mapping) => mapping.to_spec(),
            PropertyValue::Palette(palette) => json!(palette),
            PropertyValue::Scalar(value) => value.clone(),
        }
    }
}

impl From<Application> for PropertyValue {
    fn from(app: Application) -> Self {
        PropertyValue::Application(app)
    }
}

impl From<DataRef> for PropertyValue {
    fn from(data: DataRef) -> Self {
        PropertyValue::Data(data)
    }
}

impl From<Filter> for PropertyValue {
    fn from(filter: Filter) -> Self {
        PropertyValue::Filter(filter)
    }
}

impl From<Palette> for PropertyValue {
    fn from(palette: Palette) -> Self {
        PropertyValue::Palette(palette)
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        PropertyValue::Scalar(value)
    }
}

impl<M: RoleMapping + 'static> From<Box<M>> for PropertyValue {
    fn from(mapping: Box<M>) -> Self {
        PropertyValue::Mapping(mapping)
    }
}
