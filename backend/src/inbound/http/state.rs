//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{EmployeeCommand, EmployeeQuery, LoginService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub employees: Arc<dyn EmployeeQuery>,
    pub employee_commands: Arc<dyn EmployeeCommand>,
}

impl HttpState {
    /// Construct state from the driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use employee_backend::domain::EmployeeService;
    /// use employee_backend::domain::ports::FixtureLoginService;
    /// use employee_backend::domain::resilience::{ResilienceConfig, ResiliencePolicy};
    /// use employee_backend::inbound::http::state::HttpState;
    /// use employee_backend::outbound::cache::NoOpEmployeeCache;
    /// use employee_backend::outbound::memory::InMemoryEmployeeRepository;
    /// use mockable::DefaultClock;
    ///
    /// let clock = Arc::new(DefaultClock);
    /// let policy = ResiliencePolicy::new("employees", ResilienceConfig::default(), clock.clone());
    /// let service = Arc::new(EmployeeService::new(
    ///     Arc::new(InMemoryEmployeeRepository::new()),
    ///     Arc::new(NoOpEmployeeCache),
    ///     clock,
    ///     Arc::new(policy),
    /// ));
    /// let state = HttpState::new(Arc::new(FixtureLoginService), service.clone(), service);
    /// let _login = state.login.clone();
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        employees: Arc<dyn EmployeeQuery>,
        employee_commands: Arc<dyn EmployeeCommand>,
    ) -> Self {
        Self {
            login,
            employees,
            employee_commands,
        }
    }
}
