//! Employee builders shared by unit and integration tests.

use chrono::NaiveDate;

use crate::domain::{
    Department, EmailAddress, Employee, EmployeeDraft, EmployeeId, EmployeeName, Position, Salary,
};

/// Valid draft with the given name, position, salary and hire date.
pub fn draft(name: &str, position: &str, salary: f64, hired: NaiveDate) -> EmployeeDraft {
    EmployeeDraft {
        name: unwrap_valid(EmployeeName::new(name)),
        position: unwrap_valid(Position::new(position)),
        salary: unwrap_valid(Salary::new(salary)),
        hire_date: hired,
        department: None,
        email: None,
    }
}

/// Draft with department and email set.
pub fn full_draft(
    name: &str,
    position: &str,
    salary: f64,
    hired: NaiveDate,
    department: &str,
    email: &str,
) -> EmployeeDraft {
    EmployeeDraft {
        department: Some(unwrap_valid(Department::new(department))),
        email: Some(unwrap_valid(EmailAddress::new(email))),
        ..draft(name, position, salary, hired)
    }
}

/// Employee with a fresh identifier.
pub fn employee(name: &str, position: &str, salary: f64, hired: NaiveDate) -> Employee {
    Employee::from_draft(EmployeeId::random(), draft(name, position, salary, hired))
}

/// Calendar date shorthand.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid test date {year}-{month}-{day}"),
    }
}

fn unwrap_valid<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => panic!("invalid test fixture: {error}"),
    }
}
