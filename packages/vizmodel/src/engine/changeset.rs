//! Transactions and changesets.
//!
//! A [`Transaction`] stages property writes for one model into a fresh
//! [`Changeset`]. Committing applies the changeset in a fixed order:
//!
//! 1. every staged write is validated, then all are written;
//! 2. relevance is decided: did `data` or any visual role change?
//! 3. if relevant, every role mapping is invalidated, in declaration order;
//! 4. the model's change listeners run.
//!
//! A rejected write aborts before anything is written, whether it was
//! rejected while staging or at commit. A failing mapping aborts the cascade,
//! the writes of the commit are restored and no listener runs.

use super::model::Model;
use super::schema::{ModelType, APPLICATION, DATA, SELECTION_FILTER};
use super::types::{
    Application, DataRef, Filter, PropertyName, PropertyValue, RoleMapping, TableSource,
};
use crate::error::{ModelError, Result};
use indexmap::IndexMap;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, instrument, warn};

/// Names touched by one commit.
pub type ChangedNames = SmallVec<[PropertyName; 4]>;

/// What listeners see once a commit finished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub changed: ChangedNames,
    /// Whether role mappings were invalidated by this commit.
    pub cascaded: bool,
    /// Model revision after the commit.
    pub revision: u64,
}

/// True iff `names` contains `data` or a property `model_type` declares as a
/// visual role.
pub fn is_data_or_mapping_changed<'a, I>(names: I, model_type: &ModelType) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .any(|name| name == DATA || model_type.is_visual_role_name(name))
}

/// Property writes staged by one transaction, in staging order. `None` clears
/// a property.
#[derive(Debug, Default)]
pub struct Changeset {
    staged: IndexMap<PropertyName, Option<PropertyValue>>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a write; staging a name again replaces the earlier value.
    pub fn stage(&mut self, name: impl Into<PropertyName>, value: Option<PropertyValue>) {
        self.staged.insert(name.into(), value);
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.staged.keys().map(PropertyName::as_str)
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn is_data_or_mapping_changed(&self, model_type: &ModelType) -> bool {
        is_data_or_mapping_changed(self.property_names(), model_type)
    }

    /// Writes the staged values into `model` and, if `data` or a visual role
    /// changed, cascades the invalidation to every role mapping.
    #[instrument(
        skip_all,
        fields(model_type = %model.model_type().id(), changes = self.staged.len())
    )]
    pub(crate) fn apply(self, model: &mut Model) -> Result<ChangeEvent> {
        let changed: ChangedNames = self.staged.keys().cloned().collect();

        let previous = model.write_staged(self.staged)?;

        let model_type = model.model_type().clone();
        let cascaded =
            is_data_or_mapping_changed(changed.iter().map(PropertyName::as_str), &model_type);
        debug!(cascaded, "changeset written");

        if cascaded {
            if let Err(err) = model.on_data_or_mapping_changed() {
                warn!(error = %err, "role mapping cascade failed, restoring previous values");
                model.restore(previous);
                return Err(err);
            }
        }

        Ok(ChangeEvent {
            changed,
            cascaded,
            revision: model.revision(),
        })
    }
}

/// Stages writes against one model; nothing is visible until [`commit`](Self::commit).
/// Dropping an uncommitted transaction discards it.
///
/// A staging call that fails poisons the transaction: its error is returned
/// right away and again from `commit`, which then writes nothing.
pub struct Transaction<'m> {
    model: &'m mut Model,
    changeset: Changeset,
    failed: Option<ModelError>,
}

impl<'m> Transaction<'m> {
    pub(crate) fn new(model: &'m mut Model) -> Self {
        Self {
            model,
            changeset: Changeset::new(),
            failed: None,
        }
    }

    /// Keeps the first staging error for `commit`.
    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if self.failed.is_none() {
                self.failed = Some(err.clone());
            }
        }
        result
    }

    /// Whether a staging call failed; such a transaction cannot commit.
    pub fn is_poisoned(&self) -> bool {
        self.failed.is_some()
    }

    pub fn model(&self) -> &Model {
        &*self.model
    }

    pub fn changeset(&self) -> &Changeset {
        &self.changeset
    }

    /// Stages `value` for `name`. Unknown names are rejected here; value
    /// checks happen at commit.
    pub fn set(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<&mut Self> {
        let name = self.declared_name(name)?;
        self.changeset.stage(name, Some(value.into()));
        Ok(self)
    }

    pub fn clear(&mut self, name: &str) -> Result<&mut Self> {
        let name = self.declared_name(name)?;
        self.changeset.stage(name, None);
        Ok(self)
    }

    fn declared_name(&mut self, name: &str) -> Result<PropertyName> {
        let declared = self
            .model
            .model_type()
            .require_property(name)
            .map(|property| property.name.clone());
        self.record(declared)
    }

    /// Stages `data`, normalized to a plain table behind a [`DataRef`].
    pub fn set_data(&mut self, source: impl Into<TableSource>) -> Result<&mut Self> {
        let data = DataRef::normalize(source);
        let data = self.record(data)?;
        self.set(DATA, data)
    }

    pub fn set_mapping<M>(&mut self, role: &str, mapping: M) -> Result<&mut Self>
    where
        M: RoleMapping + 'static,
    {
        self.set(role, PropertyValue::Mapping(Box::new(mapping)))
    }

    pub fn set_selection_filter(&mut self, filter: Filter) -> Result<&mut Self> {
        self.set(SELECTION_FILTER, filter)
    }

    /// Parses `spec` and stages the result as `selectionFilter`.
    pub fn set_filter_spec(&mut self, spec: &Value) -> Result<&mut Self> {
        let filter = Filter::from_spec(spec);
        let filter = self.record(filter)?;
        self.set_selection_filter(filter)
    }

    pub fn set_application(&mut self, application: Application) -> Result<&mut Self> {
        self.set(APPLICATION, application)
    }

    /// Applies the changeset and notifies the model's listeners. An empty
    /// transaction is a no-op: no revision, no listeners. A poisoned one
    /// returns its staging error and changes nothing.
    pub fn commit(self) -> Result<ChangeEvent> {
        let Transaction {
            model,
            changeset,
            failed,
        } = self;

        if let Some(err) = failed {
            warn!(
                error = %err,
                staged = changeset.len(),
                "transaction aborted by a failed staging call"
            );
            return Err(err);
        }

        if changeset.is_empty() {
            return Ok(ChangeEvent {
                changed: ChangedNames::new(),
                cascaded: false,
                revision: model.revision(),
            });
        }

        let event = changeset.apply(model)?;
        Ok(model.finish(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::schema::VisualKeyType;
    use crate::engine::types::{KeyClassification, ValueKind};
    use serde_json::json;
    use std::sync::Arc;

    fn pie_type() -> Arc<ModelType> {
        ModelType::builder("visual/models/Pie")
            .visual_key_type(VisualKeyType::DataKey)
            .visual_role("columns", KeyClassification::Key)
            .visual_role("measures", KeyClassification::Measure)
            .palette("palette")
            .plain("labelsOption", ValueKind::Scalar)
            .build()
            .unwrap()
    }

    #[test]
    fn test_relevance_predicate() {
        let ty = pie_type();
        assert!(!is_data_or_mapping_changed([], &ty));
        assert!(is_data_or_mapping_changed([DATA], &ty));
        assert!(is_data_or_mapping_changed(["labelsOption", "measures"], &ty));
        assert!(!is_data_or_mapping_changed([APPLICATION, SELECTION_FILTER, "palette"], &ty));
        assert!(!is_data_or_mapping_changed(["labelsOption", "nope"], &ty));
    }

    #[test]
    fn test_relevance_ignores_order() {
        let ty = pie_type();
        assert_eq!(
            is_data_or_mapping_changed(["palette", "columns"], &ty),
            is_data_or_mapping_changed(["columns", "palette"], &ty)
        );
    }

    #[test]
    fn test_changeset_keeps_last_staged_value() {
        let mut changeset = Changeset::new();
        changeset.stage("labelsOption", Some(json!("a").into()));
        changeset.stage(APPLICATION, None);
        changeset.stage("labelsOption", Some(json!("b").into()));

        assert_eq!(changeset.len(), 2);
        let names: Vec<&str> = changeset.property_names().collect();
        assert_eq!(names, vec!["labelsOption", APPLICATION]);
        assert!(!changeset.is_data_or_mapping_changed(&pie_type()));
    }

    #[test]
    fn test_unknown_property_rejected_when_staged() {
        let mut model = Model::new(pie_type());
        let mut tx = model.transaction();
        assert!(matches!(
            tx.set("bogus", json!(1)),
            Err(ModelError::UnknownProperty { .. })
        ));
        assert!(tx.changeset().is_empty());
    }

    #[test]
    fn test_empty_commit_is_noop() {
        let mut model = Model::new(pie_type());
        let event = model.transaction().commit().unwrap();
        assert!(event.changed.is_empty());
        assert_eq!(model.revision(), 0);
    }

    #[test]
    fn test_dropped_transaction_discards_writes() {
        let mut model = Model::new(pie_type());
        {
            let mut tx = model.transaction();
            tx.set("labelsOption", json!("inside")).unwrap();
        }
        assert!(model.get("labelsOption").is_none());
    }

    #[test]
    fn test_malformed_filter_spec_surfaces_on_set() {
        let mut model = Model::new(pie_type());
        let mut tx = model.transaction();
        assert!(matches!(
            tx.set_filter_spec(&json!({"_": "isIn", "property": "x"})),
            Err(ModelError::InvalidFilter(_))
        ));
        assert!(tx.is_poisoned());
    }

    #[test]
    fn test_failed_staging_aborts_commit() {
        let mut model = Model::new(pie_type());
        let mut tx = model.transaction();
        tx.set("labelsOption", json!("kept?")).unwrap();
        assert!(tx.set("bogus", json!(1)).is_err());
        // Later failures do not replace the first one.
        assert!(tx.set_filter_spec(&json!("xor")).is_err());
        tx.set("labelsOption", json!("still staged")).unwrap();

        assert!(matches!(
            tx.commit(),
            Err(ModelError::UnknownProperty { property, .. }) if property == "bogus"
        ));
        assert!(model.get("labelsOption").is_none());
        assert_eq!(model.revision(), 0);
    }
}
