//! Validation and mutation rules for the employee aggregate.

use super::*;
use rstest::{fixture, rstest};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[fixture]
fn draft() -> EmployeeDraft {
    EmployeeDraft {
        name: EmployeeName::new("Ada Lovelace").expect("name"),
        position: Position::new("Engineer").expect("position"),
        salary: Salary::new(50_000.0).expect("salary"),
        hire_date: date(2024, 1, 15),
        department: Some(Department::new("R&D").expect("department")),
        email: Some(EmailAddress::new("ada@example.com").expect("email")),
    }
}

#[rstest]
#[case("", EmployeeValidationError::BlankName)]
#[case("   ", EmployeeValidationError::BlankName)]
#[case("A", EmployeeValidationError::NameLength { min: 2, max: 100 })]
fn rejects_invalid_names(#[case] raw: &str, #[case] expected: EmployeeValidationError) {
    assert_eq!(EmployeeName::new(raw), Err(expected));
}

#[rstest]
fn name_length_counts_characters_not_bytes() {
    let hundred = "é".repeat(100);
    assert!(EmployeeName::new(hundred).is_ok());
    assert!(EmployeeName::new("é".repeat(101)).is_err());
}

#[rstest]
fn names_are_trimmed() {
    let name = EmployeeName::new("  Grace Hopper ").expect("valid");
    assert_eq!(name.as_ref(), "Grace Hopper");
}

#[rstest]
#[case(0.0)]
#[case(-1.0)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn rejects_non_positive_salaries(#[case] raw: f64) {
    assert_eq!(Salary::new(raw), Err(EmployeeValidationError::NonPositiveSalary));
}

#[rstest]
#[case("ada@example.com", true)]
#[case("ada@", false)]
#[case("@example.com", false)]
#[case("a@b@c", false)]
#[case("ada example@x.com", false)]
fn email_shape(#[case] raw: &str, #[case] valid: bool) {
    assert_eq!(EmailAddress::new(raw).is_ok(), valid);
}

#[rstest]
fn labels_stop_at_the_column_width() {
    assert!(Position::new("p".repeat(LABEL_MAX)).is_ok());
    assert_eq!(
        Position::new("p".repeat(LABEL_MAX + 1)),
        Err(EmployeeValidationError::TooLong {
            field: "puesto",
            max: LABEL_MAX
        })
    );
    let department = Department::new("d".repeat(LABEL_MAX + 1)).expect_err("too long");
    assert_eq!(department.field(), "departamento");
    assert_eq!(department.code(), "length");
}

#[rstest]
fn email_stops_at_the_column_width() {
    let fits = format!("{}@example.com", "a".repeat(EMAIL_MAX - 12));
    assert!(EmailAddress::new(fits).is_ok());
    let overlong = format!("{}@example.com", "a".repeat(EMAIL_MAX - 11));
    assert_eq!(
        EmailAddress::new(overlong),
        Err(EmployeeValidationError::TooLong {
            field: "email",
            max: EMAIL_MAX
        })
    );
}

#[rstest]
fn apply_replaces_required_fields_and_keeps_id(draft: EmployeeDraft) {
    let id = EmployeeId::random();
    let mut employee = Employee::from_draft(id, draft);
    let replacement = EmployeeDraft {
        name: EmployeeName::new("Ada King").expect("name"),
        position: Position::new("Architect").expect("position"),
        salary: Salary::new(70_000.0).expect("salary"),
        hire_date: date(2023, 5, 1),
        department: None,
        email: None,
    };

    employee.apply(replacement);

    assert_eq!(employee.id(), id);
    assert_eq!(employee.name().as_ref(), "Ada King");
    assert_eq!(employee.position().as_ref(), "Architect");
    assert_eq!(employee.salary().value(), 70_000.0);
    assert_eq!(employee.hire_date(), date(2023, 5, 1));
    assert_eq!(employee.department().map(AsRef::as_ref), Some("R&D"));
    assert_eq!(employee.email().map(AsRef::as_ref), Some("ada@example.com"));
}

#[rstest]
fn promote_adds_increase_and_sets_position(draft: EmployeeDraft) {
    let mut employee = Employee::from_draft(EmployeeId::random(), draft);
    employee
        .promote(Promotion {
            position: Position::new("Lead").expect("position"),
            increase: SalaryIncrease::new(2_500.5).expect("increase"),
        })
        .expect("promotion applies");

    assert_eq!(employee.position().as_ref(), "Lead");
    assert_eq!(employee.salary().value(), 52_500.5);
}

#[rstest]
fn promote_rejects_overflow_without_mutating(mut draft: EmployeeDraft) {
    draft.salary = Salary::new(f64::MAX).expect("salary");
    let mut employee = Employee::from_draft(EmployeeId::random(), draft);
    let before = employee.clone();

    let result = employee.promote(Promotion {
        position: Position::new("Lead").expect("position"),
        increase: SalaryIncrease::new(f64::MAX).expect("increase"),
    });

    assert_eq!(result, Err(EmployeeValidationError::SalaryOverflow));
    assert_eq!(employee, before);
}

#[rstest]
#[case(0.0)]
#[case(-10.0)]
fn rejects_non_positive_increases(#[case] raw: f64) {
    assert!(SalaryIncrease::new(raw).is_err());
}

#[rstest]
fn salary_range_is_inclusive() {
    let range = SalaryRange::new(100.0, 200.0).expect("range");
    assert!(range.contains(100.0));
    assert!(range.contains(200.0));
    assert!(!range.contains(200.01));
    assert!(SalaryRange::new(300.0, 200.0).is_err());
}

#[rstest]
#[case(f64::NAN, 100.0)]
#[case(0.0, f64::INFINITY)]
fn salary_range_rejects_non_finite_bounds(#[case] min: f64, #[case] max: f64) {
    let err = SalaryRange::new(min, max).expect_err("non-finite");
    assert_eq!(err, EmployeeValidationError::NonFiniteSalaryBound);
    assert_eq!(err.field(), "salaryRange");
    assert_eq!(err.code(), "not_finite");
}

#[rstest]
fn hire_date_range_rejects_inverted_bounds() {
    assert!(HireDateRange::new(date(2024, 2, 1), date(2024, 1, 1)).is_err());
    let range = HireDateRange::new(date(2024, 1, 1), date(2024, 1, 31)).expect("range");
    assert!(range.contains(date(2024, 1, 31)));
}

#[rstest]
fn salary_extremes_pick_lowest_and_highest(draft: EmployeeDraft) {
    let make = |salary: f64| {
        let mut d = draft.clone();
        d.salary = Salary::new(salary).expect("salary");
        Employee::from_draft(EmployeeId::random(), d)
    };
    let employees = vec![make(300.0), make(100.0), make(900.0), make(100.0)];

    let extremes = SalaryExtremes::from_employees(&employees).expect("non-empty");

    assert_eq!(extremes.min.id(), employees[1].id());
    assert_eq!(extremes.max.id(), employees[2].id());
    assert!(SalaryExtremes::from_employees(&Vec::<Employee>::new()).is_none());
}

#[rstest]
fn serde_uses_transfer_field_names(draft: EmployeeDraft) {
    let employee = Employee::from_draft(EmployeeId::random(), draft);
    let json = serde_json::to_value(&employee).expect("serialise");
    assert_eq!(json["nombre"], "Ada Lovelace");
    assert_eq!(json["fechaContratacion"], "2024-01-15");
    let back: Employee = serde_json::from_value(json).expect("deserialise");
    assert_eq!(back, employee);
}
