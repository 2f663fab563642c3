//! Static type descriptors for visual models.
//!
//! A [`ModelType`] lists the properties a model carries, in declaration
//! order, each tagged with a [`PropertyKind`]. Role-mapping and palette
//! properties are recognised by that tag alone.

use super::types::{FastMap, KeyClassification, PropertyName, ValueKind};
use crate::error::{ModelError, Result};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::ops::ControlFlow;
use std::sync::Arc;

pub const APPLICATION: &str = "application";
pub const DATA: &str = "data";
pub const SELECTION_FILTER: &str = "selectionFilter";

pub const BASE_TYPE_ID: &str = "visual/Model";

/// How the identity of a visual element is derived.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VisualKeyType {
    /// Not decided yet; abstract types.
    #[default]
    Undefined,
    /// Elements are identified by the values of the key fields.
    DataKey,
    /// Elements are identified by their row position.
    DataOrdinal,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    #[default]
    Plain,
    VisualRole,
    #[serde(rename = "palette")]
    ColorPalette,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDescriptor {
    pub name: PropertyName,
    pub kind: PropertyKind,
    pub value_kind: ValueKind,
    pub required: bool,
    /// Classification given to the default mapping of a visual role.
    pub key: KeyClassification,
}

impl PropertyDescriptor {
    pub fn plain(name: impl Into<PropertyName>, value_kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Plain,
            value_kind,
            required: false,
            key: KeyClassification::default(),
        }
    }

    pub fn visual_role(name: impl Into<PropertyName>, key: KeyClassification) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::VisualRole,
            value_kind: ValueKind::Mapping,
            required: false,
            key,
        }
    }

    pub fn palette(name: impl Into<PropertyName>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::ColorPalette,
            value_kind: ValueKind::Palette,
            required: false,
            key: KeyClassification::default(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

#[inline]
pub fn is_visual_role(property: &PropertyDescriptor) -> bool {
    property.kind == PropertyKind::VisualRole
}

#[inline]
pub fn is_color_palette(property: &PropertyDescriptor) -> bool {
    property.kind == PropertyKind::ColorPalette
}

lazy_static! {
    static ref BASE: Arc<ModelType> = Arc::new(ModelType {
        id: SmolStr::new_static(BASE_TYPE_ID),
        parent_id: None,
        index: [APPLICATION, DATA, SELECTION_FILTER]
            .iter()
            .enumerate()
            .map(|(i, name)| (SmolStr::new(name), i))
            .collect(),
        properties: vec![
            PropertyDescriptor::plain(APPLICATION, ValueKind::Application),
            PropertyDescriptor::plain(DATA, ValueKind::Data).required(true),
            PropertyDescriptor::plain(SELECTION_FILTER, ValueKind::Filter).required(true),
        ],
        visual_key_type: VisualKeyType::Undefined,
    });
}

#[derive(Debug)]
pub struct ModelType {
    id: SmolStr,
    parent_id: Option<SmolStr>,
    properties: Vec<PropertyDescriptor>,
    index: FastMap<PropertyName, usize>,
    visual_key_type: VisualKeyType,
}

impl ModelType {
    /// The abstract root type: `application`, `data` and `selectionFilter`.
    pub fn base() -> Arc<ModelType> {
        BASE.clone()
    }

    /// Starts a subtype of the base type.
    pub fn builder(id: impl Into<SmolStr>) -> ModelTypeBuilder {
        ModelTypeBuilder::new(id, ModelType::base())
    }

    /// Starts a subtype of `parent`, inheriting its properties and key type.
    pub fn extend(parent: &Arc<ModelType>, id: impl Into<SmolStr>) -> ModelTypeBuilder {
        ModelTypeBuilder::new(id, parent.clone())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn visual_key_type(&self) -> VisualKeyType {
        self.visual_key_type
    }

    /// All properties in declaration order, inherited ones first.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    pub fn require_property(&self, name: &str) -> Result<&PropertyDescriptor> {
        self.property(name).ok_or_else(|| ModelError::UnknownProperty {
            type_id: self.id.clone(),
            property: SmolStr::new(name),
        })
    }

    /// Whether `name` is declared on this type as a visual role.
    #[inline]
    pub fn is_visual_role_name(&self, name: &str) -> bool {
        self.property(name).is_some_and(is_visual_role)
    }

    pub fn visual_roles(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| is_visual_role(p))
    }

    /// Calls `f` with each visual role and its zero-based role index, stopping
    /// at the first `Break`.
    pub fn each_visual_role<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(&PropertyDescriptor, usize) -> ControlFlow<B>,
    {
        for (index, property) in self.visual_roles().enumerate() {
            f(property, index)?;
        }
        ControlFlow::Continue(())
    }
}

pub struct ModelTypeBuilder {
    id: SmolStr,
    parent: Arc<ModelType>,
    properties: Vec<PropertyDescriptor>,
    visual_key_type: Option<VisualKeyType>,
}

impl ModelTypeBuilder {
    fn new(id: impl Into<SmolStr>, parent: Arc<ModelType>) -> Self {
        Self {
            id: id.into(),
            parent,
            properties: Vec::new(),
            visual_key_type: None,
        }
    }

    pub fn visual_key_type(mut self, key_type: VisualKeyType) -> Self {
        self.visual_key_type = Some(key_type);
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn visual_role(self, name: impl Into<PropertyName>, key: KeyClassification) -> Self {
        self.property(PropertyDescriptor::visual_role(name, key))
    }

    pub fn palette(self, name: impl Into<PropertyName>) -> Self {
        self.property(PropertyDescriptor::palette(name))
    }

    pub fn plain(self, name: impl Into<PropertyName>, value_kind: ValueKind) -> Self {
        self.property(PropertyDescriptor::plain(name, value_kind))
    }

    pub fn build(self) -> Result<Arc<ModelType>> {
        let inherited = self.parent.visual_key_type;
        let visual_key_type = match self.visual_key_type {
            None => inherited,
            Some(requested) if inherited == VisualKeyType::Undefined || requested == inherited => {
                requested
            }
            Some(_) => return Err(ModelError::VisualKeyTypeLocked { type_id: self.id }),
        };

        let mut properties = self.parent.properties.clone();
        let mut index = self.parent.index.clone();
        for property in self.properties {
            if index.contains_key(&property.name) {
                return Err(ModelError::DuplicateProperty {
                    type_id: self.id,
                    property: property.name,
                });
            }
            index.insert(property.name.clone(), properties.len());
            properties.push(property);
        }

        Ok(Arc::new(ModelType {
            id: self.id,
            parent_id: Some(self.parent.id.clone()),
            properties,
            index,
            visual_key_type,
        }))
    }
}
