//! Work item model: one row of a worklist

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a work item (e.g. a procedure step reference)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkItemId(pub String);

impl WorkItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Kind of entity a work item refers to. Drop handlers declare which kind
/// they accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKind(pub String);

impl ItemKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub const PROCEDURE: &'static str = "procedure";
    pub const ORDER: &'static str = "order";
    pub const REPORT: &'static str = "report";
}

impl From<&str> for ItemKind {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single column value of a work item.
///
/// Values of the same variant compare naturally; `Null` orders before
/// everything else so missing values sort first when ascending.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

static NULL_FIELD: FieldValue = FieldValue::Null;

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Integer(n as i64)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

/// One row of a worklist as returned by the query service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Item ID, unique within a worklist
    pub id: WorkItemId,
    /// Entity kind (procedure, order, ...)
    pub kind: ItemKind,
    /// Named column values
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl WorkItem {
    /// Create an item with no fields
    pub fn new(id: impl Into<WorkItemId>, kind: impl Into<ItemKind>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder method to set a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Value of a field, `Null` when absent
    pub fn field(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&NULL_FIELD)
    }

    /// Iterate the text-valued fields
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.values().filter_map(FieldValue::as_text)
    }
}
