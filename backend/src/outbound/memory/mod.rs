//! In-memory employee repository.
//!
//! Used when no database URL is configured and by behaviour tests. Records
//! live in a `HashMap` behind an async `RwLock`; ordering rules match the
//! Diesel adapter so both behave the same behind the port.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use pagination::PageRequest;
use tokio::sync::RwLock;

use crate::domain::ports::{EmployeeRepository, EmployeeRepositoryError};
use crate::domain::{
    Department, EmailAddress, Employee, EmployeeId, HireDateRange, Position, SalaryRange,
};

/// Salary descending, then id ascending.
fn by_salary_desc(left: &Employee, right: &Employee) -> Ordering {
    right
        .salary()
        .value()
        .total_cmp(&left.salary().value())
        .then_with(|| left.id().as_uuid().cmp(right.id().as_uuid()))
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Employee store held entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeRepository {
    records: RwLock<HashMap<EmployeeId, Employee>>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `employees`.
    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        let records = employees
            .into_iter()
            .map(|employee| (employee.id(), employee))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    async fn filtered(&self, keep: impl Fn(&Employee) -> bool) -> Vec<Employee> {
        let records = self.records.read().await;
        let mut matches: Vec<Employee> = records.values().filter(|e| keep(*e)).cloned().collect();
        matches.sort_by(by_salary_desc);
        matches
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn find_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, EmployeeRepositoryError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_page_by_salary_desc(
        &self,
        page: PageRequest,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let sorted = self.filtered(|_| true).await;
        Ok(sorted
            .into_iter()
            .skip(to_usize(page.offset()))
            .take(to_usize(page.limit()))
            .collect())
    }

    async fn find_by_name_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let needle = fragment.to_lowercase();
        Ok(self
            .filtered(|e| e.name().as_ref().to_lowercase().contains(&needle))
            .await)
    }

    async fn find_by_position(
        &self,
        position: &Position,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        Ok(self.filtered(|e| e.position() == position).await)
    }

    async fn find_by_salary_between(
        &self,
        range: SalaryRange,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        Ok(self.filtered(|e| range.contains(e.salary().value())).await)
    }

    async fn find_by_hire_date_between(
        &self,
        range: HireDateRange,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        Ok(self.filtered(|e| range.contains(e.hire_date())).await)
    }

    async fn count_by_department(
        &self,
        department: &Department,
    ) -> Result<u64, EmployeeRepositoryError> {
        let records = self.records.read().await;
        let count = records
            .values()
            .filter(|e| e.department() == Some(department))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Employee>, EmployeeRepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|e| e.email() == Some(email))
            .cloned())
    }

    async fn find_hired_since(
        &self,
        cutoff: NaiveDate,
        position: Option<Position>,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        Ok(self
            .filtered(|e| {
                e.hire_date() >= cutoff && position.as_ref().is_none_or(|p| e.position() == p)
            })
            .await)
    }

    async fn find_top_by_position(
        &self,
        position: &Position,
        limit: u32,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let mut matches = self.filtered(|e| e.position() == position).await;
        matches.truncate(to_usize(u64::from(limit)));
        Ok(matches)
    }

    async fn find_all(&self) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        Ok(self.filtered(|_| true).await)
    }

    async fn insert(&self, employee: &Employee) -> Result<(), EmployeeRepositoryError> {
        let mut records = self.records.write().await;
        if records.contains_key(&employee.id()) {
            return Err(EmployeeRepositoryError::rejected(format!(
                "duplicate employee id {}",
                employee.id()
            )));
        }
        records.insert(employee.id(), employee.clone());
        Ok(())
    }

    async fn update(&self, employee: &Employee) -> Result<bool, EmployeeRepositoryError> {
        let mut records = self.records.write().await;
        match records.get_mut(&employee.id()) {
            Some(slot) => {
                *slot = employee.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: EmployeeId) -> Result<bool, EmployeeRepositoryError> {
        Ok(self.records.write().await.remove(&id).is_some())
    }
}
