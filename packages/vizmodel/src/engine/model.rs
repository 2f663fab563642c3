use super::changeset::{ChangeEvent, Transaction};
use super::derived::{compute_key_field_names, compute_measure_field_names};
use super::schema::{ModelType, APPLICATION, DATA, SELECTION_FILTER};
use super::types::{
    Application, DataRef, DataTable, FastMap, Filter, PropertyName, PropertyValue, ResolvedField,
    RoleMapping, VisualRoleMapping,
};
use crate::error::{ModelError, Result};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Observer run after each committed transaction.
pub type Listener = Box<dyn FnMut(&Model, &ChangeEvent)>;

/// Values a write replaced, `None` where the property was unset.
pub(crate) type Replaced = Vec<(PropertyName, Option<PropertyValue>)>;

/// A visual model instance: committed property values of one [`ModelType`].
///
/// Values only change through [`Model::transaction`]. Every visual role
/// starts out holding an empty [`VisualRoleMapping`] and `selectionFilter`
/// starts out as the shared empty `or`.
pub struct Model {
    model_type: Arc<ModelType>,
    values: FastMap<PropertyName, PropertyValue>,
    listeners: Vec<Listener>,
    revision: u64,
}

impl Model {
    pub fn new(model_type: Arc<ModelType>) -> Self {
        let mut values: FastMap<PropertyName, PropertyValue> = FastMap::default();
        values.insert(
            PropertyName::new(SELECTION_FILTER),
            PropertyValue::Filter(Filter::empty_or()),
        );
        for role in model_type.visual_roles() {
            values.insert(
                role.name.clone(),
                PropertyValue::Mapping(Box::new(VisualRoleMapping::new(role.key))),
            );
        }

        Self {
            model_type,
            values,
            listeners: Vec::new(),
            revision: 0,
        }
    }

    #[inline]
    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.model_type
    }

    /// Number of committed transactions.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn data(&self) -> Option<&DataTable> {
        self.data_ref().map(DataRef::table)
    }

    pub fn data_ref(&self) -> Option<&DataRef> {
        self.get(DATA).and_then(PropertyValue::as_data)
    }

    pub fn selection_filter(&self) -> Filter {
        self.get(SELECTION_FILTER)
            .and_then(PropertyValue::as_filter)
            .cloned()
            .unwrap_or_default()
    }

    pub fn application(&self) -> Option<&Application> {
        match self.get(APPLICATION) {
            Some(PropertyValue::Application(app)) => Some(app),
            _ => None,
        }
    }

    pub fn mapping(&self, role: &str) -> Option<&dyn RoleMapping> {
        self.get(role).and_then(PropertyValue::as_mapping)
    }

    /// The fields of `role` resolved against the current data.
    pub fn resolve_mapping(&self, role: &str) -> Option<&[ResolvedField]> {
        let data = self.data();
        self.mapping(role).map(|m| m.resolve(data))
    }

    pub fn key_field_names(&self) -> Vec<PropertyName> {
        compute_key_field_names(self)
    }

    pub fn measure_field_names(&self) -> Vec<PropertyName> {
        compute_measure_field_names(self)
    }

    pub fn transaction(&mut self) -> Transaction<'_> {
        Transaction::new(self)
    }

    pub fn on_change(&mut self, listener: impl FnMut(&Model, &ChangeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Required properties that hold no value.
    pub fn validate(&self) -> Vec<ModelError> {
        self.model_type
            .properties()
            .iter()
            .filter(|p| p.required && !self.values.contains_key(&p.name))
            .map(|p| ModelError::MissingRequired(p.name.clone()))
            .collect()
    }

    /// Tells every role mapping, in declaration order, that data or mappings
    /// changed. All roles are notified, not only the ones a commit touched.
    /// Stops at the first mapping that fails.
    pub fn on_data_or_mapping_changed(&mut self) -> Result<()> {
        let model_type = self.model_type.clone();
        for role in model_type.visual_roles() {
            let Some(mapping) = self
                .values
                .get_mut(&role.name)
                .and_then(PropertyValue::as_mapping_mut)
            else {
                continue;
            };
            trace!(role = %role.name, "invalidating role mapping");
            mapping
                .on_data_or_mapping_changed()
                .map_err(|source| ModelError::Cascade {
                    property: role.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Validates every staged write against the type, then performs them all.
    /// Nothing is written if any write is rejected. Returns the values replaced.
    pub(crate) fn write_staged<I>(&mut self, staged: I) -> Result<Replaced>
    where
        I: IntoIterator<Item = (PropertyName, Option<PropertyValue>)>,
    {
        let staged: Vec<_> = staged.into_iter().collect();

        for (name, value) in &staged {
            let property = self.model_type.require_property(name)?;
            match value {
                None if property.required => {
                    return Err(ModelError::RequiredProperty(name.clone()));
                }
                Some(value) if value.kind() != property.value_kind => {
                    return Err(ModelError::WrongValueType {
                        property: name.clone(),
                        expected: property.value_kind,
                        actual: value.kind(),
                    });
                }
                _ => {}
            }
        }

        let previous = staged
            .into_iter()
            .map(|(name, value)| {
                let old = match value {
                    Some(value) => self.values.insert(name.clone(), value),
                    None => self.values.remove(&name),
                };
                (name, old)
            })
            .collect();

        Ok(previous)
    }

    pub(crate) fn restore(&mut self, previous: Replaced) {
        for (name, value) in previous {
            match value {
                Some(value) => {
                    self.values.insert(name, value);
                }
                None => {
                    self.values.remove(&name);
                }
            }
        }
    }

    pub(crate) fn finish(&mut self, mut event: ChangeEvent) -> ChangeEvent {
        self.revision += 1;
        event.revision = self.revision;

        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in listeners.iter_mut() {
            listener(self, &event);
        }
        self.listeners = listeners;

        event
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("type", &self.model_type.id())
            .field("revision", &self.revision)
            .field("values", &self.values)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
