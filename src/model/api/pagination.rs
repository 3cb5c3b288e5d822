use serde::{Deserialize, Serialize};

/// Largest page a client may request. Signed, as form range validators
/// compare against `isize`.
pub const MAX_PAGE_SIZE: isize = 200;

/// Pagination query parameters, 1-indexed.
#[derive(Debug, Clone, FromForm)]
pub struct PaginationRequest {
    #[field(default = 1, validate = range(1..))]
    page_num: usize,
    #[field(default = 50, validate = range(1..=MAX_PAGE_SIZE))]
    page_size: usize,
}

impl PaginationRequest {
    pub fn new(page_num: usize, page_size: usize) -> Self {
        Self {
            page_num,
            page_size,
        }
    }

    pub fn page_num(&self) -> usize {
        self.page_num
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of items before the requested page.
    pub fn skip(&self) -> usize {
        self.page_num.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Cut the requested page out of `items`.
    pub fn paginate<T: Clone>(&self, items: &[T]) -> Paginated<T> {
        let page = items
            .iter()
            .skip(self.skip())
            .take(self.page_size)
            .cloned()
            .collect();
        Paginated {
            pagination: PaginationResult {
                page_num: self.page_num,
                page_size: self.page_size,
                total: items.len(),
            },
            items: page,
        }
    }
}

/// Description of the page that was returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    pub page_num: usize,
    pub page_size: usize,
    pub total: usize,
}

/// One page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub pagination: PaginationResult,
    pub items: Vec<T>,
}
