//! Driven port for employee persistence.
//!
//! The repository is the only component that talks to the store. It knows
//! nothing of caching, retries or HTTP; absent rows are reported through
//! `Option` or `bool` results rather than errors so that "not found" never
//! trips the circuit breaker.

use async_trait::async_trait;
use chrono::NaiveDate;
use pagination::PageRequest;

use super::define_port_error;
use crate::domain::resilience::TransientError;
use crate::domain::{
    Department, EmailAddress, Employee, EmployeeId, HireDateRange, Position, SalaryRange,
};

define_port_error! {
    /// Errors raised by employee repository adapters.
    pub enum EmployeeRepositoryError {
        /// The store could not be reached or the pool timed out.
        Connection { message: String } => "employee store connection failed: {message}",
        /// The store failed to execute a query for a reason that may clear
        /// on retry, such as a serialization conflict.
        Query { message: String } => "employee store query failed: {message}",
        /// The store refused the statement itself (constraint, type or
        /// length violation) or returned a row that cannot be decoded.
        /// Retrying cannot succeed.
        Rejected { message: String } => "employee store rejected the statement: {message}",
    }
}

impl TransientError for EmployeeRepositoryError {
    fn is_transient(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// Persistence contract for employees.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Load one employee; `None` when no row has `id`.
    async fn find_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, EmployeeRepositoryError>;

    /// One page ordered by salary descending, ties broken by id ascending.
    async fn find_page_by_salary_desc(
        &self,
        page: PageRequest,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError>;

    /// Case-insensitive substring match on the name. The fragment is matched
    /// literally; wildcard characters carry no special meaning.
    async fn find_by_name_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError>;

    /// Exact position match.
    async fn find_by_position(
        &self,
        position: &Position,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError>;

    /// Salaries within the inclusive range.
    async fn find_by_salary_between(
        &self,
        range: SalaryRange,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError>;

    /// Hire dates within the inclusive range.
    async fn find_by_hire_date_between(
        &self,
        range: HireDateRange,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError>;

    /// Number of employees recorded in `department`.
    async fn count_by_department(
        &self,
        department: &Department,
    ) -> Result<u64, EmployeeRepositoryError>;

    /// The employee holding `email`, if any.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Employee>, EmployeeRepositoryError>;

    /// Employees hired on or after `cutoff`, optionally restricted to one
    /// position.
    async fn find_hired_since(
        &self,
        cutoff: NaiveDate,
        position: Option<Position>,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError>;

    /// Highest paid employees holding `position`, at most `limit`.
    async fn find_top_by_position(
        &self,
        position: &Position,
        limit: u32,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError>;

    /// Every stored employee, in no particular order.
    async fn find_all(&self) -> Result<Vec<Employee>, EmployeeRepositoryError>;

    /// Store a new employee under its own id.
    async fn insert(&self, employee: &Employee) -> Result<(), EmployeeRepositoryError>;

    /// Overwrite the stored record. Returns `false` when no row matched.
    async fn update(&self, employee: &Employee) -> Result<bool, EmployeeRepositoryError>;

    /// Remove the record. Returns `false` when no row matched.
    async fn delete(&self, id: EmployeeId) -> Result<bool, EmployeeRepositoryError>;
}
