//! Driving port for employee read use-cases.
//!
//! HTTP handlers depend on this trait rather than on the service so they can
//! be tested against a mock without wiring a store.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{
    Department, EmailAddress, Employee, EmployeeId, Error, HireDateRange, Position,
    SalaryExtremes, SalaryRange,
};

/// Read-side employee use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeQuery: Send + Sync {
    /// One page of employees, highest salary first.
    ///
    /// Falls back to an empty page when the store is unavailable.
    async fn list_employees(&self, page: PageRequest) -> Result<Vec<Employee>, Error>;

    /// Fetch one employee.
    ///
    /// `Err` with [`crate::domain::ErrorCode::NotFound`] when the store has no
    /// such record; `Ok(None)` when the store is unavailable and the fallback
    /// applies.
    async fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>, Error>;

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Employee>, Error>;

    /// Highest paid employees, at most `limit`.
    async fn top_earners(&self, limit: u32) -> Result<Vec<Employee>, Error>;

    async fn salary_extremes(&self) -> Result<SalaryExtremes, Error>;

    /// Employees hired within the last `months` calendar months.
    async fn recent_hires(&self, months: u32) -> Result<Vec<Employee>, Error>;

    async fn find_by_position(&self, position: &Position) -> Result<Vec<Employee>, Error>;

    async fn find_by_salary_range(&self, range: SalaryRange) -> Result<Vec<Employee>, Error>;

    async fn find_by_hire_date_range(&self, range: HireDateRange)
    -> Result<Vec<Employee>, Error>;

    async fn count_by_department(&self, department: &Department) -> Result<u64, Error>;

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Employee>, Error>;

    async fn top_by_position(&self, position: &Position, limit: u32)
    -> Result<Vec<Employee>, Error>;
}
