//! Employee aggregate and its validated field types.
//!
//! Every field is a newtype whose constructor enforces the field's rules, so
//! an [`Employee`] value is valid by construction. Adapters build drafts from
//! transfer payloads and the service turns them into employees.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod ranges;

pub use ranges::{HireDateRange, SalaryExtremes, SalaryRange};

/// Minimum length of an employee name, in characters.
pub const EMPLOYEE_NAME_MIN: usize = 2;
/// Maximum length of an employee name, in characters.
pub const EMPLOYEE_NAME_MAX: usize = 100;
/// Maximum length of a position or department label, in characters.
pub const LABEL_MAX: usize = 255;
/// Maximum length of an email address, in characters.
pub const EMAIL_MAX: usize = 320;

/// Validation failures for employee fields.
///
/// Each variant names the offending field through [`Self::field`] and a
/// stable machine code through [`Self::code`] so adapters can build
/// structured error details.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmployeeValidationError {
    #[error("employee id must be a valid UUID")]
    InvalidId,
    #[error("nombre must not be blank")]
    BlankName,
    #[error("nombre must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },
    #[error("puesto must not be blank")]
    BlankPosition,
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("salario must be a finite number greater than zero")]
    NonPositiveSalary,
    #[error("salary increase must be a finite number greater than zero")]
    NonPositiveIncrease,
    #[error("salary would overflow after applying the increase")]
    SalaryOverflow,
    #[error("departamento must not be blank when present")]
    BlankDepartment,
    #[error("email must contain exactly one '@' with text on both sides")]
    InvalidEmail,
    #[error("salary range bounds must be finite numbers")]
    NonFiniteSalaryBound,
    #[error("salary range minimum {min} exceeds maximum {max}")]
    InvertedSalaryRange { min: f64, max: f64 },
    #[error("hire date range start {from} is after end {to}")]
    InvertedDateRange { from: NaiveDate, to: NaiveDate },
}

impl EmployeeValidationError {
    /// Transfer-level field name the failure relates to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::BlankName | Self::NameLength { .. } => "nombre",
            Self::BlankPosition => "puesto",
            Self::NonPositiveSalary | Self::SalaryOverflow => "salario",
            Self::NonPositiveIncrease => "salaryIncrease",
            Self::BlankDepartment => "departamento",
            Self::InvalidEmail => "email",
            Self::TooLong { field, .. } => field,
            Self::NonFiniteSalaryBound | Self::InvertedSalaryRange { .. } => "salaryRange",
            Self::InvertedDateRange { .. } => "hireDateRange",
        }
    }

    /// Stable machine-readable failure code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId | Self::InvalidEmail => "invalid_format",
            Self::BlankName | Self::BlankPosition | Self::BlankDepartment => "blank",
            Self::NameLength { .. } | Self::TooLong { .. } => "length",
            Self::NonPositiveSalary | Self::NonPositiveIncrease => "not_positive",
            Self::SalaryOverflow => "overflow",
            Self::NonFiniteSalaryBound => "not_finite",
            Self::InvertedSalaryRange { .. } | Self::InvertedDateRange { .. } => "inverted_range",
        }
    }
}

/// Server-assigned employee identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(Uuid);

impl EmployeeId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its hyphenated text form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, EmployeeValidationError> {
        Uuid::parse_str(id.as_ref().trim())
            .map(Self)
            .map_err(|_| EmployeeValidationError::InvalidId)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for EmployeeId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn at_most(field: &'static str, value: &str, max: usize) -> Result<(), EmployeeValidationError> {
    if value.chars().count() > max {
        Err(EmployeeValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

macro_rules! text_field {
    ($(#[$meta:meta])* $name:ident, $validate:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the value. Surrounding whitespace is trimmed.
            pub fn new(value: impl Into<String>) -> Result<Self, EmployeeValidationError> {
                let value = value.into();
                let trimmed = value.trim();
                let check: fn(&str) -> Result<(), EmployeeValidationError> = $validate;
                check(trimmed)?;
                Ok(Self(trimmed.to_owned()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = EmployeeValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

text_field!(
    /// Employee full name (`nombre`).
    EmployeeName,
    |value| {
        if value.is_empty() {
            return Err(EmployeeValidationError::BlankName);
        }
        let length = value.chars().count();
        if !(EMPLOYEE_NAME_MIN..=EMPLOYEE_NAME_MAX).contains(&length) {
            return Err(EmployeeValidationError::NameLength {
                min: EMPLOYEE_NAME_MIN,
                max: EMPLOYEE_NAME_MAX,
            });
        }
        Ok(())
    }
);

text_field!(
    /// Job title (`puesto`).
    Position,
    |value| {
        if value.is_empty() {
            return Err(EmployeeValidationError::BlankPosition);
        }
        at_most("puesto", value, LABEL_MAX)
    }
);

text_field!(
    /// Department label (`departamento`).
    Department,
    |value| {
        if value.is_empty() {
            return Err(EmployeeValidationError::BlankDepartment);
        }
        at_most("departamento", value, LABEL_MAX)
    }
);

text_field!(
    /// Contact address. Only the `local@domain` shape is checked.
    EmailAddress,
    |value| {
        let mut parts = value.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None)
                if !local.is_empty() && !domain.is_empty() && !value.contains(char::is_whitespace) =>
            {
                at_most("email", value, EMAIL_MAX)
            }
            _ => Err(EmployeeValidationError::InvalidEmail),
        }
    }
);

/// Strictly positive, finite salary (`salario`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Salary(f64);

impl Salary {
    /// Validate and construct a salary.
    pub fn new(value: f64) -> Result<Self, EmployeeValidationError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(EmployeeValidationError::NonPositiveSalary)
        }
    }

    /// Raw amount.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Add `increase`, keeping the result finite.
    pub fn raised_by(self, increase: SalaryIncrease) -> Result<Self, EmployeeValidationError> {
        let raised = self.0 + increase.value();
        if raised.is_finite() {
            Ok(Self(raised))
        } else {
            Err(EmployeeValidationError::SalaryOverflow)
        }
    }
}

impl From<Salary> for f64 {
    fn from(value: Salary) -> Self {
        value.0
    }
}

impl TryFrom<f64> for Salary {
    type Error = EmployeeValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Strictly positive, finite salary increase applied by a promotion.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SalaryIncrease(f64);

impl SalaryIncrease {
    /// Validate and construct an increase.
    pub fn new(value: f64) -> Result<Self, EmployeeValidationError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(EmployeeValidationError::NonPositiveIncrease)
        }
    }

    /// Raw amount.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Validated employee fields without an identifier.
///
/// Used for creation and for full replacement on update.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeDraft {
    pub name: EmployeeName,
    pub position: Position,
    pub salary: Salary,
    pub hire_date: NaiveDate,
    pub department: Option<Department>,
    pub email: Option<EmailAddress>,
}

/// New position plus salary increase for a promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    pub position: Position,
    pub increase: SalaryIncrease,
}

/// Persisted employee record.
///
/// ## Invariants
/// - `id` never changes after creation.
/// - `salary` stays strictly positive and finite across updates and promotions.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use employee_backend::domain::{
///     Employee, EmployeeDraft, EmployeeId, EmployeeName, Position, Promotion, Salary,
///     SalaryIncrease,
/// };
///
/// let draft = EmployeeDraft {
///     name: EmployeeName::new("Ada Lovelace").unwrap(),
///     position: Position::new("Engineer").unwrap(),
///     salary: Salary::new(50_000.0).unwrap(),
///     hire_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
///     department: None,
///     email: None,
/// };
/// let mut employee = Employee::from_draft(EmployeeId::random(), draft);
/// employee
///     .promote(Promotion {
///         position: Position::new("Lead Engineer").unwrap(),
///         increase: SalaryIncrease::new(5_000.0).unwrap(),
///     })
///     .unwrap();
/// assert_eq!(employee.salary().value(), 55_000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    id: EmployeeId,
    #[serde(rename = "nombre")]
    name: EmployeeName,
    #[serde(rename = "puesto")]
    position: Position,
    #[serde(rename = "salario")]
    salary: Salary,
    #[serde(rename = "fechaContratacion")]
    hire_date: NaiveDate,
    #[serde(rename = "departamento", default, skip_serializing_if = "Option::is_none")]
    department: Option<Department>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<EmailAddress>,
}

impl Employee {
    /// Build an employee from a draft and an assigned identifier.
    #[must_use]
    pub fn from_draft(id: EmployeeId, draft: EmployeeDraft) -> Self {
        let EmployeeDraft {
            name,
            position,
            salary,
            hire_date,
            department,
            email,
        } = draft;
        Self {
            id,
            name,
            position,
            salary,
            hire_date,
            department,
            email,
        }
    }

    /// Replace the editable fields with those of `draft`.
    ///
    /// Optional fields are only replaced when the draft carries a value.
    pub fn apply(&mut self, draft: EmployeeDraft) {
        let EmployeeDraft {
            name,
            position,
            salary,
            hire_date,
            department,
            email,
        } = draft;
        self.name = name;
        self.position = position;
        self.salary = salary;
        self.hire_date = hire_date;
        if department.is_some() {
            self.department = department;
        }
        if email.is_some() {
            self.email = email;
        }
    }

    /// Move to a new position and raise the salary.
    ///
    /// The employee is left untouched when the raised salary would overflow.
    pub fn promote(&mut self, promotion: Promotion) -> Result<(), EmployeeValidationError> {
        let salary = self.salary.raised_by(promotion.increase)?;
        self.position = promotion.position;
        self.salary = salary;
        Ok(())
    }

    /// Server-assigned identifier.
    #[must_use]
    pub fn id(&self) -> EmployeeId {
        self.id
    }

    /// Full name.
    #[must_use]
    pub fn name(&self) -> &EmployeeName {
        &self.name
    }

    /// Current job title.
    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Current salary.
    #[must_use]
    pub fn salary(&self) -> Salary {
        self.salary
    }

    /// Date the employee joined.
    #[must_use]
    pub fn hire_date(&self) -> NaiveDate {
        self.hire_date
    }

    /// Department, when recorded.
    #[must_use]
    pub fn department(&self) -> Option<&Department> {
        self.department.as_ref()
    }

    /// Contact address, when recorded.
    #[must_use]
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }
}

#[cfg(test)]
mod tests;
