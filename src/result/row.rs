use super::{ArrayResult, Offset, ResultError, ScalarResult};
use crate::value::{Row, Scalar, Value};
use std::ops::{Deref, DerefMut};

/// Fetched records.
///
/// The column set is taken from the first row ever inserted and stays fixed,
/// even if that row is later removed. Cursor and offset access come from the
/// wrapped [`ArrayResult`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowResult {
    rows: ArrayResult<Row>,
    columns: Option<Vec<String>>,
}

impl RowResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records keyed `0..n`.
    pub fn from_vec(rows: Vec<Row>) -> Self {
        ArrayResult::from_vec(rows).into()
    }

    pub fn into_inner(self) -> ArrayResult<Row> {
        self.rows
    }

    /// Store a record, fixing the column set on the first insert.
    pub fn offset_set(&mut self, offset: Option<Offset>, row: Row) -> Result<(), ResultError> {
        let columns = self
            .columns
            .is_none()
            .then(|| row.keys().cloned().collect::<Vec<_>>());
        self.rows.offset_set(offset, row)?;
        if columns.is_some() {
            self.columns = columns;
        }
        Ok(())
    }

    /// Store a record given as a native value; anything but a map is rejected.
    pub fn offset_set_value(&mut self, offset: Option<Offset>, value: Value) -> Result<(), ResultError> {
        match value {
            Value::Map(row) => self.offset_set(offset, row),
            other => Err(ResultError::InvalidRow { kind: other.kind() }),
        }
    }

    /// Number of columns of the first inserted row.
    pub fn column_count(&self) -> usize {
        self.columns.as_ref().map_or(0, Vec::len)
    }

    /// Column names of the first inserted row.
    pub fn columns(&self) -> Vec<&str> {
        self.columns
            .as_ref()
            .map(|columns| columns.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// One column across all rows, as scalars.
    pub fn scalars(&self, column: Option<&str>) -> Result<ScalarResult, ResultError> {
        self.project(column, |value| {
            Scalar::try_from(value).map_err(|rejected| ResultError::InvalidScalar {
                kind: rejected.kind(),
            })
        })
    }

    /// One column across all rows, values kept as they are.
    pub fn arrays(&self, column: Option<&str>) -> Result<ArrayResult<Value>, ResultError> {
        self.project(column, Ok)
    }

    /// One column across all rows, each value being a record itself.
    pub fn rows(&self, column: Option<&str>) -> Result<RowResult, ResultError> {
        self.project(column, |value| match value {
            Value::Map(row) => Ok(row),
            other => Err(ResultError::InvalidRow { kind: other.kind() }),
        })
        .map(RowResult::from)
    }

    fn project<T, F>(&self, column: Option<&str>, mut convert: F) -> Result<ArrayResult<T>, ResultError>
    where
        F: FnMut(Value) -> Result<T, ResultError>,
    {
        let column = match column {
            Some(column) => column.to_string(),
            None => match self.columns.as_ref().and_then(|columns| columns.first()) {
                Some(first) => first.clone(),
                None => return Ok(ArrayResult::new()),
            },
        };

        let mut projected = ArrayResult::new();
        for (offset, row) in self.iter() {
            let value = row.get(&column).cloned().ok_or_else(|| ResultError::ColumnNotFound {
                column: column.clone(),
                offset: offset.clone(),
            })?;
            projected.offset_set(Some(offset.clone()), convert(value)?)?;
        }
        Ok(projected)
    }
}

impl From<ArrayResult<Row>> for RowResult {
    fn from(rows: ArrayResult<Row>) -> Self {
        let columns = rows.first().map(|row| row.keys().cloned().collect());
        Self { rows, columns }
    }
}

impl Deref for RowResult {
    type Target = ArrayResult<Row>;

    fn deref(&self) -> &Self::Target {
        &self.rows
    }
}

impl DerefMut for RowResult {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.rows
    }
}

impl IntoIterator for RowResult {
    type Item = (Offset, Row);
    type IntoIter = indexmap::map::IntoIter<Offset, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
