//! Cursor state for GraphQL connection pagination.
//!
//! GitHub's GraphQL API paginates every connection with an opaque end cursor
//! and a `hasNextPage` flag. [`PageCursor`] records that pair per entity
//! stream, and [`Connection`] pairs one fetched page of nodes with the cursor
//! that follows it.

use serde::{Deserialize, Serialize};

/// Position within one paginated entity stream.
///
/// A cursor with `has_next_page == false` marks an exhausted stream; no
/// further page may be requested for it. The default value is exhausted and
/// carries no cursor, which is also how streams that were never fetched are
/// represented.
///
/// # Example
///
/// ```
/// use magpie::github::pagination::PageCursor;
///
/// let cursor = PageCursor::new(Some("Y3Vyc29yOjI=".to_owned()), true);
/// assert!(cursor.has_next_page());
/// assert_eq!(cursor.end_cursor(), Some("Y3Vyc29yOjI="));
/// assert!(PageCursor::default().is_exhausted());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    end_cursor: Option<String>,
    has_next_page: bool,
}

impl PageCursor {
    /// Creates a cursor from the `pageInfo` values of a connection.
    #[must_use]
    pub const fn new(end_cursor: Option<String>, has_next_page: bool) -> Self {
        Self {
            end_cursor,
            has_next_page,
        }
    }

    /// Opaque cursor marking the end of the last fetched page.
    #[must_use]
    pub fn end_cursor(&self) -> Option<&str> {
        self.end_cursor.as_deref()
    }

    /// Returns true if the remote stream has more pages.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Returns true if the stream must not be requested again.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        !self.has_next_page
    }
}

/// One fetched page of nodes together with the cursor that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection<T> {
    /// Nodes in remote order.
    pub nodes: Vec<T>,
    /// Cursor after the last node.
    pub page: PageCursor,
}

impl<T> Connection<T> {
    /// An empty, exhausted page.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            page: PageCursor::new(None, false),
        }
    }
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self::empty()
    }
}
