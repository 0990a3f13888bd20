//! Serialization of employee rows into response bodies.

use std::fmt::Write;

use crate::domain::employee::Employee;
use crate::domain::types::OutputFormat;

/// Replaces the five XML special characters with their entities.
pub fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn push_element(out: &mut String, name: &str, value: impl std::fmt::Display) {
    // Writing into a String cannot fail.
    let _ = write!(out, "<{name}>{value}</{name}>");
}

/// Renders employees as `<Employees><Employee>…</Employee></Employees>`.
pub fn employees_to_xml(employees: &[Employee]) -> String {
    let mut out = String::from("<Employees>");
    for employee in employees {
        out.push_str("<Employee>");
        push_element(&mut out, "EmployeeID", employee.id);
        push_element(&mut out, "DepartmentID", employee.department_id);
        push_element(&mut out, "FirstName", escape_xml(&employee.first_name));
        push_element(&mut out, "LastName", escape_xml(&employee.last_name));
        push_element(&mut out, "Email", escape_xml(&employee.email));
        if let Some(job_title) = &employee.job_title {
            push_element(&mut out, "JobTitle", escape_xml(job_title));
        }
        push_element(&mut out, "IsActive", employee.is_active);
        push_element(&mut out, "HireDate", employee.hire_date.format("%Y-%m-%d"));
        out.push_str("</Employee>");
    }
    out.push_str("</Employees>");
    out
}

/// Serializes a page of employees in the requested format. An empty page
/// yields the format's empty document.
pub fn render_employees(
    format: OutputFormat,
    employees: &[Employee],
) -> Result<String, serde_json::Error> {
    if employees.is_empty() {
        return Ok(format.empty_body().to_string());
    }
    match format {
        OutputFormat::Json => serde_json::to_string(employees),
        OutputFormat::Xml => Ok(employees_to_xml(employees)),
    }
}
