//! DTOs exposed by the employee search endpoint.

use serde::Deserialize;

use crate::domain::types::OutputFormat;

/// Raw query string of `GET /api/employee/search`.
///
/// Every value is kept as text so that malformed numbers and booleans can be
/// reported as validation errors by the search gateway instead of being
/// rejected by the extractor.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchEmployeesQuery {
    pub department_id: Option<String>,
    pub is_active: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub output_format: Option<String>,
}

/// Response body produced by the search gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedResponse {
    pub format: OutputFormat,
    pub body: String,
    /// Number of matching rows across all pages, when the store reported it.
    pub total: Option<usize>,
}

impl RenderedResponse {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}
