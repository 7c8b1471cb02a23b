use std::fmt;
use std::str::FromStr;

/// State of a [`QueryBuilder`](super::QueryBuilder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuilderMethod {
    /// Fetch records (`search_read`)
    #[default]
    Select,
    /// Fetch record ids (`search`)
    Search,
    /// Create a record (`create`)
    Insert,
    /// Write records (`write`)
    Update,
    /// Delete records (`unlink`)
    Delete,
}

impl BuilderMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            BuilderMethod::Select => "select",
            BuilderMethod::Search => "search",
            BuilderMethod::Insert => "insert",
            BuilderMethod::Update => "update",
            BuilderMethod::Delete => "delete",
        }
    }

    /// Remote method the builder compiles to.
    pub fn query_method(self) -> QueryMethod {
        match self {
            BuilderMethod::Select => QueryMethod::SearchRead,
            BuilderMethod::Search => QueryMethod::Search,
            BuilderMethod::Insert => QueryMethod::Create,
            BuilderMethod::Update => QueryMethod::Write,
            BuilderMethod::Delete => QueryMethod::Unlink,
        }
    }

    /// Select and search read data; the others write it.
    pub fn is_read(self) -> bool {
        matches!(self, BuilderMethod::Select | BuilderMethod::Search)
    }
}

impl fmt::Display for BuilderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote method of a compiled [`Query`](super::Query)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryMethod {
    Create,
    Write,
    Read,
    Search,
    SearchRead,
    SearchCount,
    Unlink,
}

impl QueryMethod {
    pub const ALL: [QueryMethod; 7] = [
        QueryMethod::Create,
        QueryMethod::Write,
        QueryMethod::Read,
        QueryMethod::Search,
        QueryMethod::SearchRead,
        QueryMethod::SearchCount,
        QueryMethod::Unlink,
    ];

    /// Methods returning data rather than a write acknowledgement
    pub const READ_METHODS: [QueryMethod; 4] = [
        QueryMethod::Read,
        QueryMethod::Search,
        QueryMethod::SearchRead,
        QueryMethod::SearchCount,
    ];

    /// Wire token
    pub fn as_str(self) -> &'static str {
        match self {
            QueryMethod::Create => "create",
            QueryMethod::Write => "write",
            QueryMethod::Read => "read",
            QueryMethod::Search => "search",
            QueryMethod::SearchRead => "search_read",
            QueryMethod::SearchCount => "search_count",
            QueryMethod::Unlink => "unlink",
        }
    }

    pub fn is_read(self) -> bool {
        Self::READ_METHODS.contains(&self)
    }

    /// `search` and `search_read`: accept a domain plus offset/limit
    pub fn is_search(self) -> bool {
        matches!(self, QueryMethod::Search | QueryMethod::SearchRead)
    }
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| format!("Unknown query method '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods_map_to_wire_tokens() {
        let tokens: Vec<&str> = [
            BuilderMethod::Select,
            BuilderMethod::Search,
            BuilderMethod::Insert,
            BuilderMethod::Update,
            BuilderMethod::Delete,
        ]
        .iter()
        .map(|m| m.query_method().as_str())
        .collect();
        assert_eq!(tokens, vec!["search_read", "search", "create", "write", "unlink"]);
    }

    #[test]
    fn test_query_method_round_trip_and_kinds() {
        for method in QueryMethod::ALL {
            assert_eq!(method.as_str().parse::<QueryMethod>().unwrap(), method);
        }
        assert!(QueryMethod::SearchCount.is_read());
        assert!(!QueryMethod::Write.is_read());
        assert!(QueryMethod::Search.is_search());
        assert!(!QueryMethod::Read.is_search());
    }
}
