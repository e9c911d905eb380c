//! Relay connection glue
//!
//! A paginated resolver returns a [`PageResult`]; the generated builder turns
//! it into a [`Connection`] by attaching a cursor to every node and deriving
//! [`PageInfo`] from the first and last edge.

/// A page of results returned by a paginated resolver
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResult<T> {
    /// Rows in page order
    pub data: Vec<T>,
    /// Whether rows exist before this page
    pub has_previous_page: bool,
    /// Whether rows exist after this page
    pub has_next_page: bool,
}

/// Relay edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<T> {
    /// The node at this edge
    pub node: T,
    /// Cursor for this edge
    pub cursor: String,
}

/// Relay page info
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageInfo {
    /// Whether there are more items after the last edge
    pub has_next_page: bool,
    /// Whether there are more items before the first edge
    pub has_previous_page: bool,
    /// Cursor of the first edge, `None` for an empty page
    pub start_cursor: Option<String>,
    /// Cursor of the last edge, `None` for an empty page
    pub end_cursor: Option<String>,
}

impl PageInfo {
    pub fn from_edges<T>(edges: &[Edge<T>], has_previous_page: bool, has_next_page: bool) -> Self {
        Self {
            has_next_page,
            has_previous_page,
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
        }
    }
}

/// Relay connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection<T> {
    /// List of edges
    pub edges: Vec<Edge<T>>,
    /// Pagination info
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Build a connection from a page, computing each node's cursor
    pub fn from_page(page: PageResult<T>, cursor_of: impl Fn(&T) -> String) -> Self {
        let edges: Vec<Edge<T>> = page
            .data
            .into_iter()
            .map(|node| Edge {
                cursor: cursor_of(&node),
                node,
            })
            .collect();
        let page_info = PageInfo::from_edges(&edges, page.has_previous_page, page.has_next_page);
        Self { edges, page_info }
    }
}
