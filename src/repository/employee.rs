//! Repository implementation for employee search.

use std::sync::LazyLock;

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Integer, Nullable, Text};
use diesel::sqlite::Sqlite;

use crate::domain::employee::Employee;
use crate::domain::search::SearchRequest;
use crate::models::employee::{Employee as DbEmployee, RenderedPayload};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, EmployeeReader};
use crate::schema::employees;

/// Escape character used for `LIKE` patterns built from the keyword.
const LIKE_ESCAPE: char = '\\';

/// Wraps the keyword in `%` and escapes `LIKE` metacharacters so that they
/// match literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn filtered(request: &SearchRequest) -> employees::BoxedQuery<'static, Sqlite> {
    let mut query = employees::table.into_boxed();

    if let Some(department_id) = request.department_id() {
        query = query.filter(employees::department_id.eq(department_id.get()));
    }

    if let Some(is_active) = request.is_active() {
        query = query.filter(employees::is_active.eq(is_active));
    }

    if let Some(term) = request.search_text() {
        let pattern = like_pattern(term);
        query = query.filter(
            employees::first_name
                .like(pattern.clone())
                .escape(LIKE_ESCAPE)
                .or(employees::last_name.like(pattern.clone()).escape(LIKE_ESCAPE))
                .or(employees::email.like(pattern.clone()).escape(LIKE_ESCAPE))
                .or(employees::job_title.is_not_null().and(
                    employees::job_title
                        .assume_not_null()
                        .like(pattern)
                        .escape(LIKE_ESCAPE),
                )),
        );
    }

    query
}

/// Escapes a text column for use inside an XML element.
fn xml_text(column: &str) -> String {
    format!(
        "replace(replace(replace(replace(replace({column}, '&', '&amp;'), '<', '&lt;'), \
         '>', '&gt;'), '\"', '&quot;'), '''', '&apos;')"
    )
}

/// Store-side rendering query. Takes exactly six positional parameters:
/// department id, active flag, keyword, page, page size, output format.
/// Yields a single `payload` column that is `NULL` when no row matches.
static RENDER_SQL: LazyLock<String> = LazyLock::new(|| {
    format!(
        r#"
WITH page AS (
    SELECT id, department_id, first_name, last_name, email, job_title, is_active, hire_date
    FROM employees
    WHERE (?1 IS NULL OR department_id = ?1)
      AND (?2 IS NULL OR is_active = ?2)
      AND (?3 IS NULL OR (
            first_name LIKE '%' || {kw} || '%' ESCAPE '\'
            OR last_name LIKE '%' || {kw} || '%' ESCAPE '\'
            OR email LIKE '%' || {kw} || '%' ESCAPE '\'
            OR job_title LIKE '%' || {kw} || '%' ESCAPE '\'))
    ORDER BY last_name, first_name, id
    LIMIT ?5 OFFSET (?4 - 1) * ?5
),
ordered AS (
    SELECT * FROM page ORDER BY last_name, first_name, id
)
SELECT CASE
    WHEN (SELECT COUNT(*) FROM page) = 0 THEN NULL
    WHEN ?6 = 'XML' THEN '<Employees>' || (
        SELECT group_concat(
            '<Employee>'
            || '<EmployeeID>' || id || '</EmployeeID>'
            || '<DepartmentID>' || department_id || '</DepartmentID>'
            || '<FirstName>' || {first_name} || '</FirstName>'
            || '<LastName>' || {last_name} || '</LastName>'
            || '<Email>' || {email} || '</Email>'
            || COALESCE('<JobTitle>' || {job_title} || '</JobTitle>', '')
            || '<IsActive>' || CASE WHEN is_active THEN 'true' ELSE 'false' END || '</IsActive>'
            || '<HireDate>' || hire_date || '</HireDate>'
            || '</Employee>', '')
        FROM ordered
    ) || '</Employees>'
    ELSE (
        SELECT json_group_array(json_object(
            'id', id,
            'departmentId', department_id,
            'firstName', first_name,
            'lastName', last_name,
            'email', email,
            'jobTitle', job_title,
            'isActive', json(CASE WHEN is_active THEN 'true' ELSE 'false' END),
            'hireDate', hire_date))
        FROM ordered
    )
END AS payload
"#,
        kw = r"replace(replace(replace(?3, '\', '\\'), '%', '\%'), '_', '\_')",
        first_name = xml_text("first_name"),
        last_name = xml_text("last_name"),
        email = xml_text("email"),
        job_title = xml_text("job_title"),
    )
});

impl EmployeeReader for DieselRepository {
    fn search_employees(
        &self,
        request: &SearchRequest,
    ) -> RepositoryResult<(usize, Vec<Employee>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(request).count().get_result(&mut conn)?;

        let employees = filtered(request)
            .order((
                employees::last_name.asc(),
                employees::first_name.asc(),
                employees::id.asc(),
            ))
            .limit(request.page_size())
            .offset(request.offset())
            .select(DbEmployee::as_select())
            .load::<DbEmployee>(&mut conn)?
            .into_iter()
            .map(|db_employee| Employee::try_from(db_employee).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, employees))
    }

    fn render_employees(&self, request: &SearchRequest) -> RepositoryResult<Option<String>> {
        let mut conn = self.conn()?;

        let rendered = diesel::sql_query(RENDER_SQL.as_str())
            .bind::<Nullable<Integer>, _>(request.department_id().map(|id| id.get()))
            .bind::<Nullable<Bool>, _>(request.is_active())
            .bind::<Nullable<Text>, _>(request.search_text().map(str::to_string))
            .bind::<BigInt, _>(request.page())
            .bind::<BigInt, _>(request.page_size())
            .bind::<Text, _>(request.output_format().as_str())
            .get_result::<RenderedPayload>(&mut conn)
            .optional()?;

        Ok(rendered.and_then(|row| row.payload))
    }
}
