//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;

use crate::domain::ports::{
    EmployeeCommand, EmployeeQuery, FixtureLoginService, MockEmployeeCommand, MockEmployeeQuery,
};

use super::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// HTTP state over mocked employee ports and the fixture login service.
pub fn state_with(query: MockEmployeeQuery, command: MockEmployeeCommand) -> HttpState {
    let query: Arc<dyn EmployeeQuery> = Arc::new(query);
    let command: Arc<dyn EmployeeCommand> = Arc::new(command);
    HttpState::new(Arc::new(FixtureLoginService), query, command)
}

/// Extract the session cookie set by a response.
pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}
