use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};

use crate::domain::employee::Employee as DomainEmployee;
use crate::domain::types::{DepartmentId, EmployeeId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::employees)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// Diesel model for [`crate::domain::employee::Employee`].
pub struct Employee {
    pub id: i32,
    pub department_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub job_title: Option<String>,
    pub is_active: bool,
    pub hire_date: NaiveDate,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::employees)]
/// Insertable form of [`Employee`].
pub struct NewEmployee<'a> {
    pub department_id: i32,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub job_title: Option<&'a str>,
    pub is_active: bool,
    pub hire_date: NaiveDate,
}

/// Single-column row produced by the store-side rendering query.
#[derive(Debug, QueryableByName)]
pub struct RenderedPayload {
    #[diesel(sql_type = Nullable<Text>)]
    pub payload: Option<String>,
}

impl TryFrom<Employee> for DomainEmployee {
    type Error = TypeConstraintError;

    fn try_from(employee: Employee) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EmployeeId::new(employee.id)?,
            department_id: DepartmentId::new(employee.department_id)?,
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            job_title: employee.job_title,
            is_active: employee.is_active,
            hire_date: employee.hire_date,
        })
    }
}
