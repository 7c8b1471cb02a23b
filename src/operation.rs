//! Collection operations for one2many / many2many writes.
//!
//! Relational x2many fields are not written with plain values but with a list of
//! commands, each serialized as an `[opcode, id, data]` triple. The opcodes are the
//! command codes documented by the remote API.

use crate::error::DbalError;
use crate::value::Value;
use indexmap::IndexMap;
use serde_json::{json, Value as JsonValue};

/// Command kind, with its wire opcode as discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Create = 0,
    Update = 1,
    Delete = 2,
    Remove = 3,
    Add = 4,
    Clear = 5,
    Replace = 6,
}

impl OperationType {
    pub fn opcode(self) -> i64 {
        self as i64
    }
}

/// Payload carried by a command
#[derive(Debug, Clone, PartialEq)]
pub enum OperationData {
    /// Field values of the linked record (create / update)
    Values(IndexMap<String, Value>),
    /// Full id list (replace)
    Ids(Vec<i64>),
}

/// A single x2many write command
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionOperation {
    kind: OperationType,
    id: i64,
    data: Option<OperationData>,
}

impl CollectionOperation {
    /// Create a new linked record from `data`.
    pub fn create(data: IndexMap<String, Value>) -> Result<Self, DbalError> {
        if data.is_empty() {
            return Err(DbalError::Argument(
                "Create operation requires non-empty data".to_string(),
            ));
        }
        Ok(Self {
            kind: OperationType::Create,
            id: 0,
            data: Some(OperationData::Values(data)),
        })
    }

    /// Update the linked record `id` with `data`.
    pub fn update(id: i64, data: IndexMap<String, Value>) -> Result<Self, DbalError> {
        if data.is_empty() {
            return Err(DbalError::Argument(format!(
                "Update operation on record {id} requires non-empty data"
            )));
        }
        Ok(Self {
            kind: OperationType::Update,
            id,
            data: Some(OperationData::Values(data)),
        })
    }

    /// Link the existing record `id`.
    pub fn add(id: i64) -> Self {
        Self::without_data(OperationType::Add, id)
    }

    /// Unlink the record `id` without deleting it.
    pub fn remove(id: i64) -> Self {
        Self::without_data(OperationType::Remove, id)
    }

    /// Unlink and delete the record `id`.
    pub fn delete(id: i64) -> Self {
        Self::without_data(OperationType::Delete, id)
    }

    /// Replace all links with `ids`.
    pub fn replace(ids: Vec<i64>) -> Self {
        Self {
            kind: OperationType::Replace,
            id: 0,
            data: Some(OperationData::Ids(ids)),
        }
    }

    /// Unlink every record.
    pub fn clear() -> Self {
        Self::without_data(OperationType::Clear, 0)
    }

    fn without_data(kind: OperationType, id: i64) -> Self {
        Self {
            kind,
            id,
            data: None,
        }
    }

    pub fn kind(&self) -> OperationType {
        self.kind
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn data(&self) -> Option<&OperationData> {
        self.data.as_ref()
    }

    /// Wire triple `[opcode, id, data]`.
    pub fn to_array(&self) -> JsonValue {
        let data = match &self.data {
            None => JsonValue::Null,
            Some(OperationData::Ids(ids)) => json!(ids),
            Some(OperationData::Values(values)) => JsonValue::Object(
                values
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_wire()))
                    .collect(),
            ),
        };
        json!([self.kind.opcode(), self.id, data])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> IndexMap<String, Value> {
        let mut data = IndexMap::new();
        data.insert("name".to_string(), Value::from("Follow-up"));
        data
    }

    #[test]
    fn test_opcodes_match_wire_commands() {
        assert_eq!(CollectionOperation::create(data()).unwrap().to_array()[0], json!(0));
        assert_eq!(CollectionOperation::update(1, data()).unwrap().to_array()[0], json!(1));
        assert_eq!(CollectionOperation::delete(1).to_array()[0], json!(2));
        assert_eq!(CollectionOperation::remove(1).to_array()[0], json!(3));
        assert_eq!(CollectionOperation::add(1).to_array()[0], json!(4));
        assert_eq!(CollectionOperation::clear().to_array()[0], json!(5));
        assert_eq!(CollectionOperation::replace(vec![1]).to_array()[0], json!(6));
    }

    #[test]
    fn test_serialization_shapes() {
        assert_eq!(
            CollectionOperation::create(data()).unwrap().to_array(),
            json!([0, 0, {"name": "Follow-up"}])
        );
        assert_eq!(CollectionOperation::add(12).to_array(), json!([4, 12, null]));
        assert_eq!(CollectionOperation::clear().to_array(), json!([5, 0, null]));
        assert_eq!(
            CollectionOperation::replace(vec![3, 4]).to_array(),
            json!([6, 0, [3, 4]])
        );
    }

    #[test]
    fn test_create_and_update_require_data() {
        assert!(matches!(
            CollectionOperation::create(IndexMap::new()),
            Err(DbalError::Argument(_))
        ));
        assert!(matches!(
            CollectionOperation::update(3, IndexMap::new()),
            Err(DbalError::Argument(_))
        ));
    }

    #[test]
    fn test_non_payload_operations_null_data() {
        for op in [
            CollectionOperation::add(1),
            CollectionOperation::remove(1),
            CollectionOperation::delete(1),
            CollectionOperation::clear(),
        ] {
            assert!(op.data().is_none());
        }
    }
}
