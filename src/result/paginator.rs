use super::ArrayResult;
use crate::error::{DbalError, QueryError};
use crate::query::{Query, QueryMethod};
#[cfg(feature = "tracing")]
use crate::tracing_helpers;
use crate::value::Value;
use std::iter::FusedIterator;

/// Paginator for search query results
///
/// Owns its own copy of the query; every page is fetched from a further copy
/// with `offset` and `limit` set, so the paginated query never changes.
///
/// # Example
///
/// ```no_run
/// use odoo_dbal::{DbalError, Query};
///
/// # fn example(query: &Query) -> Result<(), DbalError> {
/// let mut paginator = query.paginate(Some(50), None)?;
/// let total = paginator.num_items()?;
/// let page_1 = paginator.fetch_page(1)?;
///
/// for page in paginator.pages() {
///     let page = page?;
///     println!("{} rows", page.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Paginator {
    query: Query,
    page_size: usize,
    total_count: Option<usize>,
}

impl Paginator {
    /// # Errors
    ///
    /// Fails when `query` is not a `search`/`search_read` query, or when
    /// `page_size` is zero.
    pub fn new(query: Query, page_size: usize) -> Result<Self, DbalError> {
        if !query.method().is_search() {
            return Err(QueryError::InvalidQueryMethod {
                operation: "paginate",
                method: query.method().to_string(),
                allowed: vec![QueryMethod::Search.to_string(), QueryMethod::SearchRead.to_string()],
            }
            .into());
        }
        if page_size == 0 {
            return Err(DbalError::Argument("Page size must be greater than zero".to_string()));
        }
        Ok(Self {
            query,
            page_size,
            total_count: None,
        })
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total number of matching records.
    ///
    /// Counted with one `search_count` call; the result is cached for
    /// subsequent calls.
    pub fn num_items(&mut self) -> Result<usize, DbalError> {
        if let Some(count) = self.total_count {
            return Ok(count);
        }
        let count = self.query.count()?;
        self.total_count = Some(count);
        Ok(count)
    }

    pub fn num_pages(&mut self) -> Result<usize, DbalError> {
        Ok(self.num_items()?.div_ceil(self.page_size))
    }

    /// Fetch a specific page (1-indexed)
    pub fn fetch_page(&self, page: usize) -> Result<ArrayResult<Value>, DbalError> {
        let offset = page
            .saturating_sub(1)
            .checked_mul(self.page_size)
            .ok_or_else(|| DbalError::Argument(format!("page {} is out of range", page)))?;
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::fetch_page_span(self.query.name(), offset, self.page_size).entered();

        log::trace!("Fetching {} page {} (offset {}, limit {})", self.query.name(), page, offset, self.page_size);
        let mut query = self.query.duplicate();
        query.set_option("offset", offset).set_option("limit", self.page_size);
        query.get_result()
    }

    /// Every page in order.
    ///
    /// The total is counted once, when the first page is requested; iteration
    /// stops after the last counted page or at the first empty page, whichever
    /// comes first. An error ends the iteration after being yielded.
    pub fn pages(self) -> Pages {
        Pages {
            paginator: self,
            next_page: 1,
            total_pages: None,
            done: false,
        }
    }

    /// Every row of every page, fetched page by page.
    pub fn rows(self) -> LazyResult {
        LazyResult::new(self)
    }
}

/// Iterator over the pages of a [`Paginator`]
#[derive(Debug)]
pub struct Pages {
    paginator: Paginator,
    next_page: usize,
    total_pages: Option<usize>,
    done: bool,
}

impl Pages {
    fn fail(&mut self, error: DbalError) -> Option<Result<ArrayResult<Value>, DbalError>> {
        self.done = true;
        Some(Err(error))
    }
}

impl Iterator for Pages {
    type Item = Result<ArrayResult<Value>, DbalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let total_pages = match self.total_pages {
            Some(pages) => pages,
            None => match self.paginator.num_pages() {
                Ok(pages) => *self.total_pages.insert(pages),
                Err(e) => return self.fail(e),
            },
        };
        if self.next_page > total_pages {
            self.done = true;
            return None;
        }

        match self.paginator.fetch_page(self.next_page) {
            Ok(page) if page.is_empty() => {
                log::trace!("Page {} of {} came back empty, stopping", self.next_page, total_pages);
                self.done = true;
                None
            }
            Ok(page) => {
                self.next_page += 1;
                Some(Ok(page))
            }
            Err(e) => self.fail(e),
        }
    }
}

impl FusedIterator for Pages {}

/// Lazy row iterator over a search query, fetching one chunk at a time
///
/// Returned by [`Query::iterate`]. Rows are native values: records for
/// `search_read` queries, ids for `search` queries.
#[derive(Debug)]
pub struct LazyResult {
    pages: Pages,
    buffer: std::vec::IntoIter<Value>,
}

impl LazyResult {
    pub fn new(paginator: Paginator) -> Self {
        Self {
            pages: paginator.pages(),
            buffer: Vec::new().into_iter(),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.pages.paginator.page_size()
    }
}

impl Iterator for LazyResult {
    type Item = Result<Value, DbalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.next() {
                return Some(Ok(row));
            }
            match self.pages.next()? {
                Ok(page) => self.buffer = page.into_iter().map(|(_, row)| row).collect::<Vec<_>>().into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl FusedIterator for LazyResult {}
