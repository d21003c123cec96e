//! Authentication primitives: login credentials, roles and the principal.
//!
//! Inbound adapters validate raw strings into [`LoginCredentials`] before
//! calling the login port, and carry the resulting [`Principal`] in the
//! session so later requests can be authorised without another lookup.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::EmployeeId;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller whitespace; it is zeroed on drop.
///
/// # Examples
/// ```
/// use employee_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" hr ", "password").unwrap();
/// assert_eq!(creds.username(), "hr");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username and password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Access role granted to an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access, including deletion and promotion.
    Admin,
    /// Human resources: manages records but cannot delete or promote.
    Hr,
    /// Regular employee: may read their own record only.
    Employee,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Admin => "ADMIN",
            Self::Hr => "HR",
            Self::Employee => "EMPLOYEE",
        };
        f.write_str(label)
    }
}

/// Authenticated caller stored in the session.
///
/// `subject` is the login name for staff roles and the employee identifier
/// for [`Role::Employee`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    subject: String,
    role: Role,
}

impl Principal {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the principal holds any of `roles`.
    #[must_use]
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Whether the principal is the employee identified by `id`.
    #[must_use]
    pub fn is_employee(&self, id: EmployeeId) -> bool {
        self.role == Role::Employee
            && EmployeeId::new(&self.subject).is_ok_and(|subject| subject == id)
    }
}
