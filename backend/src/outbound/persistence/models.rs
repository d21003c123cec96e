//! Row types for the `employees` table and their domain conversions.

use chrono::NaiveDate;
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::employees;
use crate::domain::{
    Department, EmailAddress, Employee, EmployeeDraft, EmployeeId, EmployeeName,
    EmployeeValidationError, Position, Salary,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EmployeeRow {
    pub id: Uuid,
    pub nombre: String,
    pub puesto: String,
    pub salario: f64,
    pub fecha_contratacion: NaiveDate,
    pub departamento: Option<String>,
    pub email: Option<String>,
}

/// Insert and full-row update payload.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = employees)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct NewEmployeeRow<'a> {
    pub id: Uuid,
    pub nombre: &'a str,
    pub puesto: &'a str,
    pub salario: f64,
    pub fecha_contratacion: NaiveDate,
    pub departamento: Option<&'a str>,
    pub email: Option<&'a str>,
}

impl<'a> From<&'a Employee> for NewEmployeeRow<'a> {
    fn from(employee: &'a Employee) -> Self {
        Self {
            id: *employee.id().as_uuid(),
            nombre: employee.name().as_ref(),
            puesto: employee.position().as_ref(),
            salario: employee.salary().value(),
            fecha_contratacion: employee.hire_date(),
            departamento: employee.department().map(AsRef::as_ref),
            email: employee.email().map(AsRef::as_ref),
        }
    }
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = EmployeeValidationError;

    /// Rows are re-validated so a hand-edited table cannot produce an invalid
    /// domain value.
    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let draft = EmployeeDraft {
            name: EmployeeName::new(row.nombre)?,
            position: Position::new(row.puesto)?,
            salary: Salary::new(row.salario)?,
            hire_date: row.fecha_contratacion,
            department: row.departamento.map(Department::new).transpose()?,
            email: row.email.map(EmailAddress::new).transpose()?,
        };
        Ok(Self::from_draft(EmployeeId::from(row.id), draft))
    }
}
