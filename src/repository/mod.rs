use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::employee::Employee;
use crate::domain::search::SearchRequest;
use crate::repository::errors::RepositoryResult;

pub mod employee;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

/// Diesel-backed data store. Cheap to clone; every call checks a connection
/// out of the pool and returns it before the call completes.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

/// Read access to employee records.
///
/// Implementations receive every filter as a typed value and must only ever
/// hand them to the database as bound parameters.
pub trait EmployeeReader {
    /// Loads one page of employees matching the request, together with the
    /// number of matches across all pages.
    fn search_employees(&self, request: &SearchRequest)
    -> RepositoryResult<(usize, Vec<Employee>)>;

    /// Lets the store serialize the requested page itself, in the request's
    /// output format. `None` means the store produced no payload.
    fn render_employees(&self, request: &SearchRequest) -> RepositoryResult<Option<String>>;
}
