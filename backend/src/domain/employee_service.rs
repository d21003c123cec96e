//! Employee use-cases: cache read-through, resilient store access and cache
//! invalidation after writes.
//!
//! Every repository call goes through the shared [`ResiliencePolicy`]. The
//! list and get-by-id reads degrade to a fallback value when the policy gives
//! up; every other operation reports the failure. Cache errors are logged and
//! treated as misses.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Months;
use mockable::Clock;
use pagination::PageRequest;
use tracing::{error, info, warn};

use crate::domain::ports::{
    CacheNamespace, CachedEmployees, EmployeeCache, EmployeeCacheKey, EmployeeCommand,
    EmployeeQuery, EmployeeRepository, EmployeeRepositoryError,
};
use crate::domain::resilience::{ResilienceError, ResiliencePolicy};
use crate::domain::{
    Department, EmailAddress, Employee, EmployeeDraft, EmployeeId, Error, HireDateRange,
    Position, Promotion, SalaryExtremes, SalaryRange,
};

/// Message returned when salary extremes are requested from an empty store.
pub const NO_EMPLOYEES_FOR_EXTREMES: &str = "no employees available to compute salary extremes";

fn not_found(id: EmployeeId) -> Error {
    Error::not_found(format!("Employee not found with id: {id}"))
}

fn store_error(operation: &'static str, err: ResilienceError<EmployeeRepositoryError>) -> Error {
    match err {
        ResilienceError::Rejected(rejection) => {
            warn!(operation, %rejection, "employee store call rejected");
            Error::service_unavailable("employee store is temporarily unavailable")
        }
        ResilienceError::Exhausted {
            attempts,
            source: source @ EmployeeRepositoryError::Connection { .. },
        } => {
            error!(operation, attempts, error = %source, "employee store unreachable");
            Error::service_unavailable("employee store is temporarily unavailable")
        }
        ResilienceError::Exhausted {
            attempts,
            source:
                source @ (EmployeeRepositoryError::Query { .. }
                | EmployeeRepositoryError::Rejected { .. }),
        } => {
            error!(operation, attempts, error = %source, "employee store query failed");
            Error::internal(format!("employee store query failed during {operation}"))
        }
    }
}

/// Employee service implementing [`EmployeeQuery`] and [`EmployeeCommand`].
pub struct EmployeeService<R: ?Sized, C: ?Sized> {
    repository: Arc<R>,
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
    policy: Arc<ResiliencePolicy>,
}

impl<R, C> EmployeeService<R, C>
where
    R: EmployeeRepository + ?Sized,
    C: EmployeeCache + ?Sized,
{
    pub fn new(
        repository: Arc<R>,
        cache: Arc<C>,
        clock: Arc<dyn Clock>,
        policy: Arc<ResiliencePolicy>,
    ) -> Self {
        Self {
            repository,
            cache,
            clock,
            policy,
        }
    }

    async fn cached(&self, key: &EmployeeCacheKey) -> Option<CachedEmployees> {
        match self.cache.get(key).await {
            Ok(hit) => hit,
            Err(err) => {
                warn!(key = %key, error = %err, "cache read failed; treating as miss");
                None
            }
        }
    }

    async fn remember(&self, key: &EmployeeCacheKey, value: &CachedEmployees) {
        if let Err(err) = self.cache.put(key, value).await {
            warn!(key = %key, error = %err, "cache write failed");
        }
    }

    /// Drop the id entry (when given) and every cached page.
    async fn invalidate(&self, id: Option<EmployeeId>) {
        if let Some(id) = id {
            let key = EmployeeCacheKey::by_id(id);
            if let Err(err) = self.cache.evict(&key).await {
                warn!(key = %key, error = %err, "cache eviction failed");
            }
        }
        if let Err(err) = self.cache.evict_namespace(CacheNamespace::Pages).await {
            warn!(error = %err, "cache page eviction failed");
        }
    }

    async fn load(&self, operation: &'static str, id: EmployeeId) -> Result<Employee, Error> {
        self.policy
            .call(operation, || self.repository.find_by_id(id))
            .await
            .map_err(|err| store_error(operation, err))?
            .ok_or_else(|| not_found(id))
    }

    async fn store_update(&self, employee: &Employee) -> Result<(), Error> {
        let updated = self
            .policy
            .call("update", || self.repository.update(employee))
            .await
            .map_err(|err| store_error("update", err))?;
        if updated {
            Ok(())
        } else {
            Err(not_found(employee.id()))
        }
    }
}

#[async_trait]
impl<R, C> EmployeeQuery for EmployeeService<R, C>
where
    R: EmployeeRepository + ?Sized,
    C: EmployeeCache + ?Sized,
{
    async fn list_employees(&self, page: PageRequest) -> Result<Vec<Employee>, Error> {
        let key = EmployeeCacheKey::page(page);
        if let Some(CachedEmployees::Many(employees)) = self.cached(&key).await {
            return Ok(employees);
        }

        match self
            .policy
            .call("list_employees", || {
                self.repository.find_page_by_salary_desc(page)
            })
            .await
        {
            Ok(employees) => {
                self.remember(&key, &CachedEmployees::Many(employees.clone()))
                    .await;
                Ok(employees)
            }
            Err(err) => {
                warn!(
                    page = page.page(),
                    size = page.size(),
                    error = %err,
                    "listing employees failed; returning empty fallback"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>, Error> {
        let key = EmployeeCacheKey::by_id(id);
        if let Some(CachedEmployees::One(employee)) = self.cached(&key).await {
            return Ok(Some(employee));
        }

        match self
            .policy
            .call("get_employee", || self.repository.find_by_id(id))
            .await
        {
            Ok(Some(employee)) => {
                self.remember(&key, &CachedEmployees::One(employee.clone()))
                    .await;
                Ok(Some(employee))
            }
            Ok(None) => Err(not_found(id)),
            Err(err) => {
                warn!(employee_id = %id, error = %err, "loading employee failed; returning fallback");
                Ok(None)
            }
        }
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Employee>, Error> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Err(Error::invalid_request("search query must not be blank"));
        }
        self.policy
            .call("search_by_name", || {
                self.repository.find_by_name_containing(fragment)
            })
            .await
            .map_err(|err| store_error("search_by_name", err))
    }

    async fn top_earners(&self, limit: u32) -> Result<Vec<Employee>, Error> {
        let page = PageRequest::new(0, limit)
            .map_err(|err| Error::invalid_request(format!("limit: {err}")))?;
        self.policy
            .call("top_earners", || self.repository.find_page_by_salary_desc(page))
            .await
            .map_err(|err| store_error("top_earners", err))
    }

    async fn salary_extremes(&self) -> Result<SalaryExtremes, Error> {
        let employees = self
            .policy
            .call("salary_extremes", || self.repository.find_all())
            .await
            .map_err(|err| store_error("salary_extremes", err))?;
        SalaryExtremes::from_employees(&employees)
            .ok_or_else(|| Error::not_found(NO_EMPLOYEES_FOR_EXTREMES))
    }

    async fn recent_hires(&self, months: u32) -> Result<Vec<Employee>, Error> {
        let today = self.clock.local().date_naive();
        let cutoff = today
            .checked_sub_months(Months::new(months))
            .ok_or_else(|| Error::invalid_request("months reaches before the calendar start"))?;
        self.policy
            .call("recent_hires", || self.repository.find_hired_since(cutoff, None))
            .await
            .map_err(|err| store_error("recent_hires", err))
    }

    async fn find_by_position(&self, position: &Position) -> Result<Vec<Employee>, Error> {
        self.policy
            .call("find_by_position", || self.repository.find_by_position(position))
            .await
            .map_err(|err| store_error("find_by_position", err))
    }

    async fn find_by_salary_range(&self, range: SalaryRange) -> Result<Vec<Employee>, Error> {
        self.policy
            .call("find_by_salary_range", || {
                self.repository.find_by_salary_between(range)
            })
            .await
            .map_err(|err| store_error("find_by_salary_range", err))
    }

    async fn find_by_hire_date_range(
        &self,
        range: HireDateRange,
    ) -> Result<Vec<Employee>, Error> {
        self.policy
            .call("find_by_hire_date_range", || {
                self.repository.find_by_hire_date_between(range)
            })
            .await
            .map_err(|err| store_error("find_by_hire_date_range", err))
    }

    async fn count_by_department(&self, department: &Department) -> Result<u64, Error> {
        self.policy
            .call("count_by_department", || {
                self.repository.count_by_department(department)
            })
            .await
            .map_err(|err| store_error("count_by_department", err))
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Employee>, Error> {
        self.policy
            .call("find_by_email", || self.repository.find_by_email(email))
            .await
            .map_err(|err| store_error("find_by_email", err))
    }

    async fn top_by_position(
        &self,
        position: &Position,
        limit: u32,
    ) -> Result<Vec<Employee>, Error> {
        if limit == 0 {
            return Err(Error::invalid_request("limit must be at least 1"));
        }
        self.policy
            .call("top_by_position", || {
                self.repository.find_top_by_position(position, limit)
            })
            .await
            .map_err(|err| store_error("top_by_position", err))
    }
}

#[async_trait]
impl<R, C> EmployeeCommand for EmployeeService<R, C>
where
    R: EmployeeRepository + ?Sized,
    C: EmployeeCache + ?Sized,
{
    async fn create_employee(&self, draft: EmployeeDraft) -> Result<Employee, Error> {
        let employee = Employee::from_draft(EmployeeId::random(), draft);
        self.policy
            .call("create_employee", || self.repository.insert(&employee))
            .await
            .map_err(|err| store_error("create_employee", err))?;
        self.invalidate(None).await;
        info!(employee_id = %employee.id(), "employee created");
        Ok(employee)
    }

    async fn update_employee(
        &self,
        id: EmployeeId,
        draft: EmployeeDraft,
    ) -> Result<Employee, Error> {
        let mut employee = self.load("update_employee", id).await?;
        employee.apply(draft);
        self.store_update(&employee).await?;
        self.invalidate(Some(id)).await;
        info!(employee_id = %id, "employee updated");
        Ok(employee)
    }

    async fn delete_employee(&self, id: EmployeeId) -> Result<(), Error> {
        let deleted = self
            .policy
            .call("delete_employee", || self.repository.delete(id))
            .await
            .map_err(|err| store_error("delete_employee", err))?;
        if !deleted {
            return Err(not_found(id));
        }
        self.invalidate(Some(id)).await;
        info!(employee_id = %id, "employee deleted");
        Ok(())
    }

    async fn promote_employee(
        &self,
        id: EmployeeId,
        promotion: Promotion,
    ) -> Result<Employee, Error> {
        let mut employee = self.load("promote_employee", id).await?;
        let increase = promotion.increase.value();
        employee.promote(promotion).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(serde_json::json!({
                "field": err.field(),
                "code": err.code(),
            }))
        })?;
        self.store_update(&employee).await?;
        self.invalidate(Some(id)).await;
        info!(
            employee_id = %id,
            position = %employee.position(),
            increase,
            "employee promoted"
        );
        Ok(employee)
    }
}

#[cfg(test)]
#[path = "employee_service_tests.rs"]
mod tests;
