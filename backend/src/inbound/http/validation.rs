//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose details carry the
//! offending `field` and a stable `code`, so clients can point at the input
//! that failed without parsing messages.

use std::ops::RangeInclusive;

use serde_json::json;

use crate::domain::{EmployeeId, EmployeeValidationError, Error};

/// Validation error codes raised by the HTTP layer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    Blank,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::Blank => "blank",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code,
        }))
    }

    fn with_value(self, code: &str, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code,
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField.as_str())
}

pub(crate) fn blank_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must not be blank"))
        .with_code(ErrorCode::Blank.as_str())
}

/// Reject `value` unless it lies in `range`.
pub(crate) fn ensure_in_range(
    value: u32,
    range: RangeInclusive<u32>,
    field: FieldName,
) -> Result<u32, Error> {
    if range.contains(&value) {
        return Ok(value);
    }
    let name = field.as_str();
    Err(ValidationError::new(
        name,
        format!(
            "{name} must be between {} and {}",
            range.start(),
            range.end()
        ),
    )
    .with_value(ErrorCode::OutOfRange.as_str(), value.to_string()))
}

/// Map a domain field validation failure onto the wire error shape.
pub(crate) fn employee_validation_error(err: &EmployeeValidationError) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_code(err.code())
}

/// Require a non-blank string, returning it trimmed.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    let value = value.ok_or_else(|| missing_field_error(field))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(blank_field_error(field));
    }
    Ok(trimmed.to_owned())
}

/// Resolve a path identifier. Text that is not a UUID can name no stored
/// employee, so it is reported as not found.
pub(crate) fn resolve_employee_id(value: &str) -> Result<EmployeeId, Error> {
    EmployeeId::new(value)
        .map_err(|_| Error::not_found(format!("Employee not found with id: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    const LIMIT: FieldName = FieldName::new("limit");

    #[rstest]
    fn missing_field_names_the_field() {
        let err = missing_field_error(FieldName::new("nombre"));
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({"field": "nombre", "code": "missing_field"}))
        );
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    #[case(100)]
    fn values_inside_the_range_pass(#[case] value: u32) {
        assert_eq!(ensure_in_range(value, 1..=100, LIMIT).expect("in range"), value);
    }

    #[rstest]
    #[case(0)]
    #[case(101)]
    fn values_outside_the_range_are_rejected(#[case] value: u32) {
        let err = ensure_in_range(value, 1..=100, LIMIT).expect_err("out of range");
        assert_eq!(err.message(), "limit must be between 1 and 100");
        assert_eq!(
            err.details(),
            Some(&json!({"field": "limit", "value": value.to_string(), "code": "out_of_range"}))
        );
    }

    #[rstest]
    #[case(None, "missing_field")]
    #[case(Some("   "), "blank")]
    fn require_text_rejects_absent_and_blank(#[case] value: Option<&str>, #[case] code: &str) {
        let err = require_text(value.map(str::to_owned), FieldName::new("query"))
            .expect_err("rejected");
        let details = err.details().expect("details");
        assert_eq!(details["code"], code);
        assert_eq!(details["field"], "query");
    }

    #[rstest]
    fn require_text_trims() {
        let text = require_text(Some("  Ana ".to_owned()), FieldName::new("query")).expect("text");
        assert_eq!(text, "Ana");
    }

    #[rstest]
    fn domain_failures_keep_field_and_code() {
        let err = employee_validation_error(&EmployeeValidationError::NonPositiveSalary);
        assert_eq!(
            err.details(),
            Some(&json!({"field": "salario", "code": "not_positive"}))
        );
    }

    #[rstest]
    #[case("42")]
    #[case("not-a-uuid")]
    fn malformed_ids_are_not_found(#[case] raw: &str) {
        let err = resolve_employee_id(raw).expect_err("not a uuid");
        assert_eq!(err.code(), DomainCode::NotFound);
        assert_eq!(err.message(), format!("Employee not found with id: {raw}"));
        assert_eq!(err.details(), None);
    }

    #[rstest]
    fn well_formed_ids_resolve() {
        let raw = "3f2504e0-4f89-41d3-9a0c-0305e82c3301";
        let id = resolve_employee_id(raw).expect("uuid");
        assert_eq!(id.to_string(), raw);
    }
}
