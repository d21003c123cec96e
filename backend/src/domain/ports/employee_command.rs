//! Driving port for employee write use-cases.

use async_trait::async_trait;

use crate::domain::{Employee, EmployeeDraft, EmployeeId, Error, Promotion};

/// Write-side employee use-cases. Every successful write invalidates the
/// affected cache entries before returning.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeCommand: Send + Sync {
    /// Persist a new employee under a freshly generated identifier.
    async fn create_employee(&self, draft: EmployeeDraft) -> Result<Employee, Error>;

    /// Replace the editable fields of an existing employee.
    async fn update_employee(&self, id: EmployeeId, draft: EmployeeDraft)
    -> Result<Employee, Error>;

    async fn delete_employee(&self, id: EmployeeId) -> Result<(), Error>;

    /// Change position and raise salary.
    async fn promote_employee(&self, id: EmployeeId, promotion: Promotion)
    -> Result<Employee, Error>;
}
