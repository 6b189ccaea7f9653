use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Page-number pagination state of a collection.
pub trait Paginator {
    fn current_page(&self) -> u64;

    fn last_page(&self) -> u64;

    fn total(&self) -> u64;

    /// Number of items on the current page.
    fn count(&self) -> u64;

    fn per_page(&self) -> u64;

    fn url(&self, page: u64) -> String;
}

/// Cursor pagination state of a collection. Cursor values are opaque to
/// this crate and emitted as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub current: Value,
    pub prev: Option<Value>,
    pub next: Option<Value>,
    pub count: Option<u64>,
}

impl Cursor {
    pub fn new(current: impl Into<Value>) -> Self {
        Self {
            current: current.into(),
            prev: None,
            next: None,
            count: None,
        }
    }

    pub fn with_prev(mut self, prev: impl Into<Value>) -> Self {
        self.prev = Some(prev.into());
        self
    }

    pub fn with_next(mut self, next: impl Into<Value>) -> Self {
        self.next = Some(next.into());
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }
}

/// A [`Paginator`] over plain numbers, building urls as `{base_url}?page=N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplePaginator {
    pub base_url: String,
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub count: u64,
}

impl SimplePaginator {
    pub fn new(base_url: impl Into<String>, current_page: u64, per_page: u64, total: u64) -> Self {
        let per_page = per_page.max(1);
        let offset = current_page.saturating_sub(1).saturating_mul(per_page);
        let count = total.saturating_sub(offset).min(per_page);
        Self {
            base_url: base_url.into(),
            current_page,
            per_page,
            total,
            count,
        }
    }
}

impl Paginator for SimplePaginator {
    fn current_page(&self) -> u64 {
        self.current_page
    }

    fn last_page(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    fn total(&self) -> u64 {
        self.total
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn per_page(&self) -> u64 {
        self.per_page
    }

    fn url(&self, page: u64) -> String {
        format!("{}?page={page}", self.base_url)
    }
}
