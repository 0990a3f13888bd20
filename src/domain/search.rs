//! Normalized search request handed to the data store.

use crate::domain::types::{DepartmentId, OutputFormat};

/// Page number used when the caller does not send one.
pub const DEFAULT_PAGE: i64 = 1;
/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Upper bound on the page size used when nothing else is configured.
pub const MAX_PAGE_SIZE: i64 = 100;
/// The store receives the page number as a 32-bit integer.
pub const MAX_PAGE: i64 = i32::MAX as i64;

/// Paging bounds applied while normalizing a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    /// Clamps a requested page number into `[1, MAX_PAGE]`.
    pub fn page(&self, requested: Option<i64>) -> i64 {
        requested.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE)
    }

    /// Clamps a requested page size into `[1, max_page_size]`.
    pub fn page_size(&self, requested: Option<i64>) -> i64 {
        let max = self.max_page_size.max(1);
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, max)
    }
}

/// Validated employee search.
///
/// Built once per incoming call and never mutated afterwards; the accessors
/// are the only way to read it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    department_id: Option<DepartmentId>,
    is_active: Option<bool>,
    search_text: Option<String>,
    page: i64,
    page_size: i64,
    output_format: OutputFormat,
}

impl SearchRequest {
    /// Creates a request, clamping the paging values with `limits`.
    ///
    /// A blank `search_text` is dropped so it never reaches the store as an
    /// empty keyword filter. Any other keyword is kept exactly as sent.
    pub fn new(
        department_id: Option<DepartmentId>,
        is_active: Option<bool>,
        search_text: Option<String>,
        page: Option<i64>,
        page_size: Option<i64>,
        output_format: OutputFormat,
        limits: &PageLimits,
    ) -> Self {
        Self {
            department_id,
            is_active,
            search_text: search_text.filter(|s| !s.trim().is_empty()),
            page: limits.page(page),
            page_size: limits.page_size(page_size),
            output_format,
        }
    }

    pub fn department_id(&self) -> Option<DepartmentId> {
        self.department_id
    }

    pub fn is_active(&self) -> Option<bool> {
        self.is_active
    }

    pub fn search_text(&self) -> Option<&str> {
        self.search_text.as_deref()
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Number of rows preceding the requested page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}
