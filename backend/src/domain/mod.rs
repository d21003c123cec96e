//! Domain primitives, ports and services.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failure payload.
//! - [`Employee`] and its validated field types.
//! - [`EmployeeService`]: implements the employee driving ports.
//! - [`resilience`]: retry, circuit breaker, rate limiter and bulkhead.
//! - [`ports`]: traits at the hexagonal boundary.

pub mod auth;
pub mod employee;
pub mod employee_service;
pub mod error;
pub mod ports;
pub mod resilience;
pub mod trace_id;

pub use self::auth::{LoginCredentials, LoginValidationError, Principal, Role};
pub use self::employee::{
    Department, EMAIL_MAX, EMPLOYEE_NAME_MAX, EMPLOYEE_NAME_MIN, EmailAddress, Employee,
    EmployeeDraft, EmployeeId, EmployeeName, EmployeeValidationError, HireDateRange, LABEL_MAX,
    Position, Promotion, Salary, SalaryExtremes, SalaryIncrease, SalaryRange,
};
pub use self::employee_service::EmployeeService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use employee_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
