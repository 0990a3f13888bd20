use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::{DepartmentId, EmployeeId};

/// Employee record as returned by the data store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub department_id: DepartmentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub job_title: Option<String>,
    pub is_active: bool,
    pub hire_date: NaiveDate,
}

/// Outcome of a single employee search against the data store.
#[derive(Clone, Debug, PartialEq)]
pub enum EmployeeQueryResult {
    /// Payload already serialized by the store in the requested format.
    /// `None` when the store produced no payload at all.
    Rendered(Option<String>),
    /// Typed rows for the requested page, plus the number of rows matching
    /// the filters across all pages.
    Rows {
        total: usize,
        employees: Vec<Employee>,
    },
}

impl EmployeeQueryResult {
    /// Returns `true` when there is nothing to forward to the caller.
    pub fn is_empty(&self) -> bool {
        match self {
            EmployeeQueryResult::Rendered(payload) => {
                payload.as_deref().is_none_or(|p| p.trim().is_empty())
            }
            EmployeeQueryResult::Rows { employees, .. } => employees.is_empty(),
        }
    }
}
