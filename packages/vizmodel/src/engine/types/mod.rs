mod filter;
mod mapping;
mod table;
mod value;

use rustc_hash::FxHasher;
use smol_str::SmolStr;
use std::hash::BuildHasherDefault;

pub type FastMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<FxHasher>>;
pub type PropertyName = SmolStr;

pub use filter::{Filter, FilterNode};
pub use mapping::{KeyClassification, MappingField, ResolvedField, RoleMapping, VisualRoleMapping};
pub use table::{Column, DataRef, DataTable, DataView, FieldType, TableSource};
pub use value::{Application, Palette, PropertyValue, ValueKind};
