//! Employee search gateway: normalizes the raw query, runs exactly one store
//! call and renders the result.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::employee::EmployeeQueryResult;
use crate::domain::search::SearchRequest;
use crate::domain::types::{DepartmentId, OutputFormat};
use crate::dto::employees::{RenderedResponse, SearchEmployeesQuery};
use crate::models::config::{RenderingMode, SearchSettings};
use crate::render::render_employees;
use crate::repository::EmployeeReader;
use crate::services::{ServiceError, ServiceResult};

/// Treats missing and blank query values the same way.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_integer(name: &str, value: Option<&str>) -> ServiceResult<Option<i64>> {
    non_blank(value)
        .map(|raw| {
            raw.parse::<i64>().map_err(|_| {
                ServiceError::Validation(format!("{name} must be an integer, got '{raw}'"))
            })
        })
        .transpose()
}

fn parse_department_id(value: Option<&str>) -> ServiceResult<Option<DepartmentId>> {
    let Some(raw) = parse_integer("departmentId", value)? else {
        return Ok(None);
    };
    i32::try_from(raw)
        .ok()
        .and_then(|id| DepartmentId::new(id).ok())
        .map(Some)
        .ok_or_else(|| {
            ServiceError::Validation(format!("departmentId must be a positive integer, got {raw}"))
        })
}

fn parse_flag(name: &str, value: Option<&str>) -> ServiceResult<Option<bool>> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) if raw.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(raw) if raw.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(raw) => Err(ServiceError::Validation(format!(
            "{name} must be 'true' or 'false', got '{raw}'"
        ))),
    }
}

/// Stateless entry point for employee searches. Cloning is cheap and clones
/// share the same repository.
pub struct SearchGateway<R> {
    repo: Arc<R>,
    settings: SearchSettings,
}

impl<R> Clone for SearchGateway<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            settings: self.settings.clone(),
        }
    }
}

impl<R> SearchGateway<R>
where
    R: EmployeeReader + Send + Sync + 'static,
{
    pub fn new(repo: R, settings: SearchSettings) -> Self {
        Self {
            repo: Arc::new(repo),
            settings,
        }
    }

    fn output_format(&self, value: Option<&str>) -> ServiceResult<OutputFormat> {
        let Some(raw) = non_blank(value) else {
            return Ok(OutputFormat::default());
        };
        match raw.parse::<OutputFormat>() {
            Ok(format) => Ok(format),
            Err(err) if self.settings.reject_unknown_format => {
                Err(ServiceError::Validation(err.to_string()))
            }
            Err(err) => {
                log::debug!("{err}, falling back to {}", OutputFormat::default());
                Ok(OutputFormat::default())
            }
        }
    }

    /// Validates and normalizes the raw query without touching the store.
    pub fn normalize(&self, raw: &SearchEmployeesQuery) -> ServiceResult<SearchRequest> {
        let department_id = parse_department_id(raw.department_id.as_deref())?;
        let is_active = parse_flag("isActive", raw.is_active.as_deref())?;
        let page = parse_integer("page", raw.page.as_deref())?;
        let page_size = parse_integer("pageSize", raw.page_size.as_deref())?;
        let output_format = self.output_format(raw.output_format.as_deref())?;

        Ok(SearchRequest::new(
            department_id,
            is_active,
            raw.search.clone(),
            page,
            page_size,
            output_format,
            &self.settings.page_limits(),
        ))
    }

    /// Runs a search and renders the page in the requested format.
    ///
    /// Returns [`ServiceError::Cancelled`] if `cancel` fires before the store
    /// answers. The blocking store call itself is not interrupted; its pooled
    /// connection is released as soon as it finishes.
    pub async fn search(
        &self,
        raw: SearchEmployeesQuery,
        cancel: &CancellationToken,
    ) -> ServiceResult<RenderedResponse> {
        let request = self.normalize(&raw)?;
        let format = request.output_format();
        log::debug!("Searching employees with {request:?}");

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ServiceError::Cancelled),
            result = self.query(request) => result,
        }
        .inspect_err(|err| match err {
            ServiceError::Cancelled => log::warn!("Employee search cancelled by caller"),
            err => log::error!("Employee search failed: {err}"),
        })?;

        render(format, result)
    }

    async fn query(&self, request: SearchRequest) -> ServiceResult<EmployeeQueryResult> {
        let repo = Arc::clone(&self.repo);
        let rendering = self.settings.rendering;

        let task = tokio::task::spawn_blocking(move || match rendering {
            RenderingMode::Gateway => repo
                .search_employees(&request)
                .map(|(total, employees)| EmployeeQueryResult::Rows { total, employees }),
            RenderingMode::Store => repo
                .render_employees(&request)
                .map(EmployeeQueryResult::Rendered),
        });

        let joined = match self.settings.query_timeout() {
            Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
                ServiceError::StoreUnavailable(format!(
                    "no answer within {} ms",
                    limit.as_millis()
                ))
            })?,
            None => task.await,
        };

        let result = joined
            .map_err(|err| ServiceError::StoreUnavailable(format!("query task failed: {err}")))??;
        Ok(result)
    }
}

/// Turns a store result into a response body, substituting the format's empty
/// document when there is nothing to forward.
fn render(format: OutputFormat, result: EmployeeQueryResult) -> ServiceResult<RenderedResponse> {
    if result.is_empty() {
        log::debug!("Employee search matched nothing, rendering empty {format} document");
    }

    match result {
        EmployeeQueryResult::Rendered(payload) => Ok(RenderedResponse {
            format,
            body: payload
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| format.empty_body().to_string()),
            total: None,
        }),
        EmployeeQueryResult::Rows { total, employees } => {
            let body = render_employees(format, &employees).map_err(|err| {
                ServiceError::StoreQuery(format!("failed to serialize employees: {err}"))
            })?;
            Ok(RenderedResponse {
                format,
                body,
                total: Some(total),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::employee::Employee;
    use crate::domain::search::MAX_PAGE_SIZE;
    use crate::domain::types::EmployeeId;
    use crate::repository::errors::{RepositoryError, RepositoryResult};
    use crate::repository::mock::MockRepository;

    fn query(pairs: &[(&str, &str)]) -> SearchEmployeesQuery {
        let mut raw = SearchEmployeesQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "departmentId" => raw.department_id = value,
                "isActive" => raw.is_active = value,
                "search" => raw.search = value,
                "page" => raw.page = value,
                "pageSize" => raw.page_size = value,
                "outputFormat" => raw.output_format = value,
                other => panic!("unknown parameter {other}"),
            }
        }
        raw
    }

    fn store_settings() -> SearchSettings {
        SearchSettings {
            rendering: RenderingMode::Store,
            ..SearchSettings::default()
        }
    }

    fn sample_employee() -> Employee {
        Employee {
            id: EmployeeId::new(1).expect("valid id"),
            department_id: DepartmentId::new(4).expect("valid id"),
            first_name: "Siobhan".to_string(),
            last_name: "O'Brien".to_string(),
            email: "siobhan@example.com".to_string(),
            job_title: None,
            is_active: true,
            hire_date: NaiveDate::from_ymd_opt(2021, 3, 1).expect("valid date"),
        }
    }

    /// Store stub that records every request and echoes the keyword back.
    struct EchoStore {
        seen: Mutex<Vec<SearchRequest>>,
    }

    impl EmployeeReader for EchoStore {
        fn search_employees(
            &self,
            request: &SearchRequest,
        ) -> RepositoryResult<(usize, Vec<Employee>)> {
            self.seen.lock().unwrap().push(request.clone());
            Ok((0, vec![]))
        }

        fn render_employees(&self, request: &SearchRequest) -> RepositoryResult<Option<String>> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(request
                .search_text()
                .map(|text| serde_json::json!([{ "search": text }]).to_string()))
        }
    }

    #[tokio::test]
    async fn issues_one_store_call_with_normalized_parameters() {
        let mut repo = MockRepository::new();
        repo.expect_render_employees()
            .withf(|request| {
                request.page() == 1
                    && request.page_size() == MAX_PAGE_SIZE
                    && request.search_text() == Some("O'Brien")
                    && request.output_format() == OutputFormat::Xml
                    && request.department_id().is_none()
                    && request.is_active().is_none()
            })
            .times(1)
            .returning(|_| Ok(Some("<Employees><Employee/></Employees>".to_string())));
        repo.expect_search_employees().times(0);
        let gateway = SearchGateway::new(repo, store_settings());

        let response = gateway
            .search(
                query(&[
                    ("page", "0"),
                    ("pageSize", "500"),
                    ("outputFormat", "xml"),
                    ("search", "O'Brien"),
                ]),
                &CancellationToken::new(),
            )
            .await
            .expect("search succeeds");

        assert_eq!(response.content_type(), "application/xml");
        assert_eq!(response.body, "<Employees><Employee/></Employees>");
        assert_eq!(response.total, None);
    }

    #[tokio::test]
    async fn null_payload_renders_empty_json_array() {
        let mut repo = MockRepository::new();
        repo.expect_render_employees()
            .times(1)
            .returning(|_| Ok(None));
        let gateway = SearchGateway::new(repo, store_settings());

        let response = gateway
            .search(SearchEmployeesQuery::default(), &CancellationToken::new())
            .await
            .expect("search succeeds");

        assert_eq!(response.content_type(), "application/json");
        assert_eq!(response.body, "[]");
    }

    #[tokio::test]
    async fn blank_payload_renders_empty_xml_document() {
        let mut repo = MockRepository::new();
        repo.expect_render_employees()
            .times(1)
            .returning(|_| Ok(Some(String::new())));
        let gateway = SearchGateway::new(repo, store_settings());

        let response = gateway
            .search(
                query(&[("outputFormat", "XML")]),
                &CancellationToken::new(),
            )
            .await
            .expect("search succeeds");

        assert_eq!(response.body, "<Employees></Employees>");
    }

    #[tokio::test]
    async fn format_variants_render_identically() {
        for variants in [["json", "JSON", "Json"], ["xml", "XML", "Xml"]] {
            let mut responses = Vec::new();
            for variant in variants {
                let mut repo = MockRepository::new();
                repo.expect_search_employees()
                    .times(1)
                    .returning(|_| Ok((1, vec![sample_employee()])));
                let gateway = SearchGateway::new(repo, SearchSettings::default());
                let response = gateway
                    .search(
                        query(&[("outputFormat", variant)]),
                        &CancellationToken::new(),
                    )
                    .await
                    .expect("search succeeds");
                responses.push(response);
            }
            assert_eq!(responses[0], responses[1]);
            assert_eq!(responses[1], responses[2]);
        }
    }

    #[tokio::test]
    async fn rows_are_rendered_by_the_gateway() {
        let mut repo = MockRepository::new();
        repo.expect_search_employees()
            .withf(|request| request.department_id().map(DepartmentId::get) == Some(4))
            .times(1)
            .returning(|_| Ok((31, vec![sample_employee()])));
        repo.expect_render_employees().times(0);
        let gateway = SearchGateway::new(repo, SearchSettings::default());

        let response = gateway
            .search(
                query(&[("departmentId", "4"), ("isActive", "TRUE")]),
                &CancellationToken::new(),
            )
            .await
            .expect("search succeeds");

        assert_eq!(response.total, Some(31));
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body[0]["lastName"], "O'Brien");
    }

    #[tokio::test]
    async fn unknown_format_falls_back_to_json() {
        let mut repo = MockRepository::new();
        repo.expect_search_employees()
            .withf(|request| request.output_format() == OutputFormat::Json)
            .times(1)
            .returning(|_| Ok((0, vec![])));
        let gateway = SearchGateway::new(repo, SearchSettings::default());

        let response = gateway
            .search(query(&[("outputFormat", "yaml")]), &CancellationToken::new())
            .await
            .expect("search succeeds");

        assert_eq!(response.content_type(), "application/json");
        assert_eq!(response.body, "[]");
    }

    #[tokio::test]
    async fn unknown_format_is_rejected_in_strict_mode() {
        let mut repo = MockRepository::new();
        repo.expect_search_employees().times(0);
        let settings = SearchSettings {
            reject_unknown_format: true,
            ..SearchSettings::default()
        };
        let gateway = SearchGateway::new(repo, settings);

        let result = gateway
            .search(query(&[("outputFormat", "csv")]), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn malformed_numbers_are_rejected_before_the_store() {
        for pairs in [
            [("page", "two")],
            [("pageSize", "1.5")],
            [("departmentId", "abc")],
            [("departmentId", "0")],
            [("departmentId", "99999999999")],
            [("isActive", "yes")],
        ] {
            let mut repo = MockRepository::new();
            repo.expect_search_employees().times(0);
            repo.expect_render_employees().times(0);
            let gateway = SearchGateway::new(repo, SearchSettings::default());

            let result = gateway.search(query(&pairs), &CancellationToken::new()).await;

            assert!(
                matches!(result, Err(ServiceError::Validation(_))),
                "{pairs:?} should be rejected"
            );
        }
    }

    #[test]
    fn blank_values_are_treated_as_absent() {
        let gateway = SearchGateway::new(MockRepository::new(), SearchSettings::default());

        let request = gateway
            .normalize(&query(&[
                ("departmentId", ""),
                ("isActive", " "),
                ("search", ""),
                ("page", ""),
                ("pageSize", ""),
                ("outputFormat", ""),
            ]))
            .expect("blank values normalize");

        assert_eq!(request.department_id(), None);
        assert_eq!(request.is_active(), None);
        assert_eq!(request.search_text(), None);
        assert_eq!(request.page(), 1);
        assert_eq!(request.page_size(), 20);
        assert_eq!(request.output_format(), OutputFormat::Json);
    }

    #[tokio::test]
    async fn search_text_reaches_store_verbatim() {
        let store = EchoStore {
            seen: Mutex::new(Vec::new()),
        };
        let gateway = SearchGateway::new(store, store_settings());
        let hostile = r#"x%' OR 1=1; --_"#;

        let response = gateway
            .search(query(&[("search", hostile)]), &CancellationToken::new())
            .await
            .expect("search succeeds");

        let echoed: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(echoed[0]["search"], hostile);
        let seen = gateway.repo.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].search_text(), Some(hostile));
    }

    #[tokio::test]
    async fn padded_search_text_is_not_trimmed() {
        let store = EchoStore {
            seen: Mutex::new(Vec::new()),
        };
        let gateway = SearchGateway::new(store, store_settings());

        gateway
            .search(query(&[("search", "  O'Brien ")]), &CancellationToken::new())
            .await
            .expect("search succeeds");

        let seen = gateway.repo.seen.lock().unwrap();
        assert_eq!(seen[0].search_text(), Some("  O'Brien "));
    }

    #[tokio::test]
    async fn repeated_searches_are_identical() {
        let store = EchoStore {
            seen: Mutex::new(Vec::new()),
        };
        let gateway = SearchGateway::new(store, store_settings());
        let raw = query(&[("search", "ann"), ("page", "3")]);

        let first = gateway
            .search(raw.clone(), &CancellationToken::new())
            .await
            .expect("search succeeds");
        let second = gateway
            .search(raw, &CancellationToken::new())
            .await
            .expect("search succeeds");

        assert_eq!(first, second);
        let seen = gateway.repo.seen.lock().unwrap();
        assert_eq!(seen[0], seen[1]);
    }

    #[tokio::test]
    async fn store_errors_are_surfaced() {
        let mut repo = MockRepository::new();
        repo.expect_search_employees()
            .times(1)
            .returning(|_| Err(RepositoryError::ConnectionError("refused".to_string())));
        let gateway = SearchGateway::new(repo, SearchSettings::default());

        let result = gateway
            .search(SearchEmployeesQuery::default(), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ServiceError::StoreUnavailable(_))));

        let mut repo = MockRepository::new();
        repo.expect_search_employees()
            .times(1)
            .returning(|_| Err(RepositoryError::DatabaseError("bad parameter".to_string())));
        let gateway = SearchGateway::new(repo, SearchSettings::default());

        let result = gateway
            .search(SearchEmployeesQuery::default(), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ServiceError::StoreQuery(_))));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let mut repo = MockRepository::new();
        repo.expect_search_employees().times(0);
        let gateway = SearchGateway::new(repo, SearchSettings::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = gateway.search(SearchEmployeesQuery::default(), &cancel).await;

        assert!(matches!(result, Err(ServiceError::Cancelled)));
    }

    #[tokio::test]
    async fn cancellation_during_store_call_aborts_rendering() {
        let mut repo = MockRepository::new();
        repo.expect_search_employees().times(1).returning(|_| {
            std::thread::sleep(Duration::from_millis(200));
            Ok((1, vec![sample_employee()]))
        });
        let gateway = SearchGateway::new(repo, SearchSettings::default());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = gateway.search(SearchEmployeesQuery::default(), &cancel).await;

        assert!(matches!(result, Err(ServiceError::Cancelled)));
    }

    #[tokio::test]
    async fn slow_store_times_out() {
        let mut repo = MockRepository::new();
        repo.expect_search_employees().times(1).returning(|_| {
            std::thread::sleep(Duration::from_millis(200));
            Ok((0, vec![]))
        });
        let settings = SearchSettings {
            query_timeout_ms: Some(20),
            ..SearchSettings::default()
        };
        let gateway = SearchGateway::new(repo, settings);

        let result = gateway
            .search(SearchEmployeesQuery::default(), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ServiceError::StoreUnavailable(_))));
    }
}
