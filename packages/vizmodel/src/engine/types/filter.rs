//! Immutable filter expression trees.
//!
//! A [`Filter`] is a cheap handle onto a shared [`FilterNode`] tree. Nothing
//! mutates a tree in place; combinators build new roots that alias the
//! operands they were given. Conversion to a normal form is left to callers.

use crate::error::{ModelError, Result};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;
use std::sync::Arc;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "_", rename_all = "camelCase")]
pub enum FilterNode {
    Or {
        #[serde(default)]
        operands: Vec<Filter>,
    },
    And {
        #[serde(default)]
        operands: Vec<Filter>,
    },
    Not {
        operand: Filter,
    },
    IsEqual {
        property: SmolStr,
        value: Value,
    },
    IsIn {
        property: SmolStr,
        values: Vec<Value>,
    },
    True,
    False,
}

lazy_static! {
    static ref EMPTY_OR: Filter = Filter(Arc::new(FilterNode::Or { operands: Vec::new() }));
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct Filter(Arc<FilterNode>);

impl Default for Filter {
    fn default() -> Self {
        Filter::empty_or()
    }
}

impl From<FilterNode> for Filter {
    fn from(node: FilterNode) -> Self {
        Filter(Arc::new(node))
    }
}

impl Filter {
    /// The neutral `or` with no operands; matches nothing. Every call returns
    /// the same shared instance.
    pub fn empty_or() -> Self {
        EMPTY_OR.clone()
    }

    /// Builds a filter from its JSON spec. A bare string is read as the
    /// short-hand of an operand-less node (`"or"`, `"and"`, `"true"`, `"false"`);
    /// a bare boolean as `true` or `false`.
    pub fn from_spec(spec: &Value) -> Result<Self> {
        if let Value::Bool(flag) = spec {
            return Ok(if *flag { FilterNode::True } else { FilterNode::False }.into());
        }
        if let Some(shorthand) = spec.as_str() {
            return match shorthand {
                "or" => Ok(Filter::empty_or()),
                "and" => Ok(FilterNode::And { operands: Vec::new() }.into()),
                "true" => Ok(FilterNode::True.into()),
                "false" => Ok(FilterNode::False.into()),
                other => Err(ModelError::InvalidFilter(format!(
                    "unknown filter short-hand '{}'",
                    other
                ))),
            };
        }

        serde_json::from_value::<FilterNode>(spec.clone())
            .map(Filter::from)
            .map_err(|e| ModelError::InvalidFilter(e.to_string()))
    }

    pub fn to_spec(&self) -> Value {
        // A tree of plain enums and JSON values always serializes.
        serde_json::to_value(self.node()).unwrap_or(Value::Null)
    }

    #[inline]
    pub fn node(&self) -> &FilterNode {
        &self.0
    }

    pub fn is_empty_or(&self) -> bool {
        matches!(self.node(), FilterNode::Or { operands } if operands.is_empty())
    }

    pub fn ptr_eq(&self, other: &Filter) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn and(&self, other: &Filter) -> Filter {
        FilterNode::And {
            operands: vec![self.clone(), other.clone()],
        }
        .into()
    }

    pub fn or(&self, other: &Filter) -> Filter {
        FilterNode::Or {
            operands: vec![self.clone(), other.clone()],
        }
        .into()
    }

    pub fn negate(&self) -> Filter {
        FilterNode::Not {
            operand: self.clone(),
        }
        .into()
    }
}
