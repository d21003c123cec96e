//! Employee records backend.
//!
//! Hexagonal layout: [`domain`] owns the employee model, the ports and the
//! resilience policy; [`inbound`] adapts HTTP requests onto the driving ports;
//! [`outbound`] implements the driven ports against PostgreSQL, Redis and
//! in-memory stores.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
