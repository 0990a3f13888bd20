//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::employee::Employee;
use crate::domain::search::SearchRequest;
use crate::repository::EmployeeReader;
use crate::repository::errors::RepositoryResult;

mock! {
    pub Repository {}

    impl EmployeeReader for Repository {
        fn search_employees(
            &self,
            request: &SearchRequest,
        ) -> RepositoryResult<(usize, Vec<Employee>)>;
        fn render_employees(&self, request: &SearchRequest) -> RepositoryResult<Option<String>>;
    }
}
