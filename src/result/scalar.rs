use super::{ArrayResult, Offset, ResultError};
use crate::value::{Scalar, Value};

/// Null or scalar values, e.g. record ids or a count
pub type ScalarResult = ArrayResult<Scalar>;

impl ArrayResult<Scalar> {
    /// Store a native value; lists, maps and operations are rejected.
    pub fn offset_set_value(&mut self, offset: Option<Offset>, value: Value) -> Result<(), ResultError> {
        let scalar = Scalar::try_from(value).map_err(|rejected| ResultError::InvalidScalar {
            kind: rejected.kind(),
        })?;
        self.offset_set(offset, scalar)
    }

    pub fn from_values<I>(values: I) -> Result<Self, ResultError>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut result = Self::new();
        for value in values {
            result.offset_set_value(None, value)?;
        }
        Ok(result)
    }

    /// Integer entries, skipping everything else.
    pub fn ids(&self) -> Vec<i64> {
        self.values().filter_map(Scalar::as_i64).collect()
    }
}
