//! Transfer shapes for the employee endpoints.
//!
//! Request fields are optional at the serde level so a missing field is
//! reported through the same `{"field", "code"}` details as any other
//! validation failure instead of as a body deserialisation error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Department, EmailAddress, Employee, EmployeeDraft, EmployeeName, Error, Position, Salary,
    SalaryExtremes,
};
use crate::inbound::http::validation::{
    FieldName, employee_validation_error, missing_field_error,
};

const NOMBRE: FieldName = FieldName::new("nombre");
const PUESTO: FieldName = FieldName::new("puesto");
const SALARIO: FieldName = FieldName::new("salario");
const FECHA_CONTRATACION: FieldName = FieldName::new("fechaContratacion");

/// Body of `POST /api/v1/employees` and `PUT /api/v1/employees/{id}`.
///
/// `id` is accepted for symmetry with responses and ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    #[schema(format = "uuid")]
    pub id: Option<String>,
    #[schema(example = "Ada Lovelace", min_length = 2, max_length = 100)]
    pub nombre: Option<String>,
    #[schema(example = "Engineer", max_length = 255)]
    pub puesto: Option<String>,
    #[schema(example = 52000.0)]
    pub salario: Option<f64>,
    #[schema(format = "date", example = "2024-01-15")]
    pub fecha_contratacion: Option<String>,
    #[schema(max_length = 255)]
    pub departamento: Option<String>,
    #[schema(max_length = 320)]
    pub email: Option<String>,
}

fn invalid_date_error(value: &str) -> Error {
    Error::invalid_request("fechaContratacion must be a date in yyyy-MM-dd format").with_details(
        serde_json::json!({
            "field": "fechaContratacion",
            "value": value,
            "code": "invalid_date",
        }),
    )
}

fn parse_hire_date(value: Option<String>) -> Result<NaiveDate, Error> {
    let raw = value.ok_or_else(|| missing_field_error(FECHA_CONTRATACION))?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| invalid_date_error(&raw))
}

impl TryFrom<EmployeeRequest> for EmployeeDraft {
    type Error = Error;

    fn try_from(value: EmployeeRequest) -> Result<Self, Self::Error> {
        let EmployeeRequest {
            id: _,
            nombre,
            puesto,
            salario,
            fecha_contratacion,
            departamento,
            email,
        } = value;

        let name = nombre
            .ok_or_else(|| missing_field_error(NOMBRE))
            .and_then(|raw| EmployeeName::new(raw).map_err(|e| employee_validation_error(&e)))?;
        let position = puesto
            .ok_or_else(|| missing_field_error(PUESTO))
            .and_then(|raw| Position::new(raw).map_err(|e| employee_validation_error(&e)))?;
        let salary = salario
            .ok_or_else(|| missing_field_error(SALARIO))
            .and_then(|raw| Salary::new(raw).map_err(|e| employee_validation_error(&e)))?;
        let hire_date = parse_hire_date(fecha_contratacion)?;
        let department = departamento
            .map(Department::new)
            .transpose()
            .map_err(|e| employee_validation_error(&e))?;
        let email = email
            .map(EmailAddress::new)
            .transpose()
            .map_err(|e| employee_validation_error(&e))?;

        Ok(Self {
            name,
            position,
            salary,
            hire_date,
            department,
            email,
        })
    }
}

/// Employee as returned by every read and write endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    #[schema(format = "uuid", example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Ada Lovelace")]
    pub nombre: String,
    #[schema(example = "Engineer")]
    pub puesto: String,
    #[schema(example = 52000.0)]
    pub salario: f64,
    #[schema(value_type = String, format = "date", example = "2024-01-15")]
    pub fecha_contratacion: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departamento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&Employee> for EmployeeResponse {
    fn from(value: &Employee) -> Self {
        Self {
            id: value.id().to_string(),
            nombre: value.name().to_string(),
            puesto: value.position().to_string(),
            salario: value.salary().value(),
            fecha_contratacion: value.hire_date(),
            departamento: value.department().map(ToString::to_string),
            email: value.email().map(ToString::to_string),
        }
    }
}

impl From<Employee> for EmployeeResponse {
    fn from(value: Employee) -> Self {
        Self::from(&value)
    }
}

/// Body of `GET /api/v1/employees/salary-extremes`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct SalaryExtremesResponse {
    /// Lowest paid employee.
    pub min: EmployeeResponse,
    /// Highest paid employee.
    pub max: EmployeeResponse,
}

impl From<SalaryExtremes> for SalaryExtremesResponse {
    fn from(value: SalaryExtremes) -> Self {
        Self {
            min: value.min.into(),
            max: value.max.into(),
        }
    }
}
