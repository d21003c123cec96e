//! Driving port for authentication.
//!
//! Inbound adapters call this port to turn credentials into a [`Principal`]
//! without knowing where accounts live.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Principal, Role};

/// Subject of the fixture employee account.
pub const FIXTURE_EMPLOYEE_SUBJECT: &str = "123e4567-e89b-12d3-a456-426614174000";

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated principal.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error>;
}

/// In-memory accounts, one per role, all with the password `password`.
///
/// | username   | role     | subject                    |
/// |------------|----------|----------------------------|
/// | `admin`    | Admin    | `admin`                    |
/// | `hr`       | Hr       | `hr`                       |
/// | `employee` | Employee | [`FIXTURE_EMPLOYEE_SUBJECT`] |
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error> {
        if credentials.password() != "password" {
            return Err(Error::unauthorized("invalid credentials"));
        }
        match credentials.username() {
            "admin" => Ok(Principal::new("admin", Role::Admin)),
            "hr" => Ok(Principal::new("hr", Role::Hr)),
            "employee" => Ok(Principal::new(FIXTURE_EMPLOYEE_SUBJECT, Role::Employee)),
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}
