//! PostgreSQL-backed `EmployeeRepository` using Diesel.
//!
//! Each call checks out one pooled connection and runs a single statement.
//! Rows are validated on the way out, so a row that violates a domain rule
//! surfaces as a query error rather than a malformed [`Employee`].

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use tracing::warn;

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{EmployeeRow, NewEmployeeRow};
use super::pool::DbPool;
use super::schema::employees;
use crate::domain::ports::{EmployeeRepository, EmployeeRepositoryError};
use crate::domain::{
    Department, EmailAddress, Employee, EmployeeId, HireDateRange, Position, SalaryRange,
};

/// Escape `LIKE` metacharacters so the fragment matches literally.
pub(crate) fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn row_to_employee(row: EmployeeRow) -> Result<Employee, EmployeeRepositoryError> {
    let id = row.id;
    Employee::try_from(row).map_err(|err| {
        warn!(employee_id = %id, error = %err, "stored employee failed validation");
        EmployeeRepositoryError::rejected(format!("stored employee {id} is invalid: {err}"))
    })
}

fn rows_to_employees(rows: Vec<EmployeeRow>) -> Result<Vec<Employee>, EmployeeRepositoryError> {
    rows.into_iter().map(row_to_employee).collect()
}

/// Diesel implementation of [`EmployeeRepository`].
#[derive(Clone)]
pub struct DieselEmployeeRepository {
    pool: DbPool,
}

impl DieselEmployeeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeRepository for DieselEmployeeRepository {
    async fn find_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = employees::table
            .find(*id.as_uuid())
            .select(EmployeeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_employee).transpose()
    }

    async fn find_page_by_salary_desc(
        &self,
        page: PageRequest,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = employees::table
            .select(EmployeeRow::as_select())
            .order((employees::salario.desc(), employees::id.asc()))
            .limit(to_i64(page.limit()))
            .offset(to_i64(page.offset()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_employees(rows)
    }

    async fn find_by_name_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = employees::table
            .filter(employees::nombre.ilike(like_pattern(fragment)))
            .select(EmployeeRow::as_select())
            .order((employees::salario.desc(), employees::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_employees(rows)
    }

    async fn find_by_position(
        &self,
        position: &Position,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = employees::table
            .filter(employees::puesto.eq(position.as_ref()))
            .select(EmployeeRow::as_select())
            .order((employees::salario.desc(), employees::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_employees(rows)
    }

    async fn find_by_salary_between(
        &self,
        range: SalaryRange,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = employees::table
            .filter(employees::salario.between(range.min(), range.max()))
            .select(EmployeeRow::as_select())
            .order((employees::salario.desc(), employees::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_employees(rows)
    }

    async fn find_by_hire_date_between(
        &self,
        range: HireDateRange,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = employees::table
            .filter(employees::fecha_contratacion.between(range.from(), range.to()))
            .select(EmployeeRow::as_select())
            .order((employees::salario.desc(), employees::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_employees(rows)
    }

    async fn count_by_department(
        &self,
        department: &Department,
    ) -> Result<u64, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = employees::table
            .filter(employees::departamento.eq(department.as_ref()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = employees::table
            .filter(employees::email.eq(email.as_ref()))
            .select(EmployeeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_employee).transpose()
    }

    async fn find_hired_since(
        &self,
        cutoff: NaiveDate,
        position: Option<Position>,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = employees::table
            .filter(employees::fecha_contratacion.ge(cutoff))
            .select(EmployeeRow::as_select())
            .into_boxed();
        if let Some(position) = position.as_ref() {
            query = query.filter(employees::puesto.eq(position.as_ref().to_owned()));
        }
        let rows = query
            .order((employees::salario.desc(), employees::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_employees(rows)
    }

    async fn find_top_by_position(
        &self,
        position: &Position,
        limit: u32,
    ) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = employees::table
            .filter(employees::puesto.eq(position.as_ref()))
            .select(EmployeeRow::as_select())
            .order((employees::salario.desc(), employees::id.asc()))
            .limit(i64::from(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_employees(rows)
    }

    async fn find_all(&self) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = employees::table
            .select(EmployeeRow::as_select())
            .order((employees::salario.desc(), employees::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_employees(rows)
    }

    async fn insert(&self, employee: &Employee) -> Result<(), EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(employees::table)
            .values(NewEmployeeRow::from(employee))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, employee: &Employee) -> Result<bool, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(employees::table.find(*employee.id().as_uuid()))
            .set(NewEmployeeRow::from(employee))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: EmployeeId) -> Result<bool, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(employees::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
