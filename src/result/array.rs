use super::ResultError;
use indexmap::map::Iter;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;

/// Key of an entry in a result container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Offset {
    Index(i64),
    Key(String),
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Index(i) => write!(f, "{}", i),
            Offset::Key(k) => write!(f, "'{}'", k),
        }
    }
}

impl From<i64> for Offset {
    fn from(i: i64) -> Self {
        Offset::Index(i)
    }
}

impl From<usize> for Offset {
    fn from(i: usize) -> Self {
        Offset::Index(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Offset {
    fn from(k: &str) -> Self {
        Offset::Key(k.to_string())
    }
}

impl From<String> for Offset {
    fn from(k: String) -> Self {
        Offset::Key(k)
    }
}

impl TryFrom<&JsonValue> for Offset {
    type Error = ResultError;

    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Number(n) if n.is_i64() => Ok(Offset::Index(n.as_i64().unwrap_or_default())),
            JsonValue::String(s) => Ok(Offset::Key(s.clone())),
            other => Err(ResultError::InvalidOffset {
                offset: other.to_string(),
            }),
        }
    }
}

/// Ordered, offset-keyed container with an internal cursor.
///
/// The cursor starts on the first entry. [`fetch`](Self::fetch) returns the
/// entry under the cursor and moves past it, returning `None` once every entry
/// has been consumed.
///
/// # Examples
///
/// ```
/// use odoo_dbal::result::ArrayResult;
///
/// let mut result = ArrayResult::from_vec(vec!["a", "b"]);
/// assert_eq!(result.fetch(), Some(&"a"));
/// assert_eq!(result.fetch(), Some(&"b"));
/// assert_eq!(result.fetch(), None);
/// result.rewind();
/// assert_eq!(result.current(), Some(&"a"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayResult<T> {
    items: IndexMap<Offset, T>,
    cursor: usize,
}

impl<T> Default for ArrayResult<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
            cursor: 0,
        }
    }
}

impl<T> ArrayResult<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries keyed `0..n`.
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            items: values
                .into_iter()
                .enumerate()
                .map(|(i, value)| (Offset::from(i), value))
                .collect(),
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current(&self) -> Option<&T> {
        self.items.get_index(self.cursor).map(|(_, v)| v)
    }

    /// Offset under the cursor.
    pub fn key(&self) -> Option<&Offset> {
        self.items.get_index(self.cursor).map(|(k, _)| k)
    }

    pub fn fetch(&mut self) -> Option<&T> {
        let index = self.cursor;
        if index >= self.items.len() {
            return None;
        }
        self.cursor += 1;
        self.items.get_index(index).map(|(_, v)| v)
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor to the last entry and return it.
    pub fn last(&mut self) -> Option<&T> {
        self.cursor = self.items.len().saturating_sub(1);
        self.current()
    }

    /// Every `(offset, value)` pair from the start, regardless of the cursor.
    /// The cursor ends up past the last entry.
    pub fn fetch_all(&mut self) -> Iter<'_, Offset, T> {
        self.rewind();
        self.cursor = self.items.len();
        self.items.iter()
    }

    pub fn iter(&self) -> Iter<'_, Offset, T> {
        self.items.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.values().cloned().collect()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first().map(|(_, v)| v)
    }

    pub fn offset_exists(&self, offset: &Offset) -> bool {
        self.items.contains_key(offset)
    }

    pub fn offset_get(&self, offset: &Offset) -> Option<&T> {
        self.items.get(offset)
    }

    /// Store `value` at `offset`, or append it after the highest integer
    /// offset when `offset` is `None`.
    ///
    /// Appending fails once an entry sits at `i64::MAX`.
    pub fn offset_set(&mut self, offset: Option<Offset>, value: T) -> Result<(), ResultError> {
        let offset = match offset {
            Some(offset) => offset,
            None => Offset::Index(self.next_index().ok_or(ResultError::OffsetOverflow)?),
        };
        self.items.insert(offset, value);
        Ok(())
    }

    /// Remove the entry at `offset`, keeping the order of the others.
    pub fn offset_unset(&mut self, offset: &Offset) -> Option<T> {
        let position = self.items.get_index_of(offset)?;
        if position < self.cursor {
            self.cursor -= 1;
        }
        self.items.shift_remove(offset)
    }

    fn next_index(&self) -> Option<i64> {
        let highest = self
            .items
            .keys()
            .filter_map(|k| match k {
                Offset::Index(i) => Some(*i),
                Offset::Key(_) => None,
            })
            .max();
        match highest {
            Some(i) => i.checked_add(1).map(|next| next.max(0)),
            None => Some(0),
        }
    }
}

impl<T> IntoIterator for ArrayResult<T> {
    type Item = (Offset, T);
    type IntoIter = indexmap::map::IntoIter<Offset, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T> FromIterator<(Offset, T)> for ArrayResult<T> {
    fn from_iter<I: IntoIterator<Item = (Offset, T)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
            cursor: 0,
        }
    }
}
