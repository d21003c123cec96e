//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every employee, auth and health path together with
//! the schema wrappers from [`crate::inbound::http::schemas`], which describe
//! domain types without coupling them to utoipa. The document backs Swagger
//! UI in debug builds and the `openapi-dump` binary.

use crate::inbound::http::employees_dto::{
    EmployeeRequest, EmployeeResponse, SalaryExtremesResponse,
};
use crate::inbound::http::login::LoginRequest;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, PrincipalSchema, RoleSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the employee REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Employee Management API",
        description = "CRUD and reporting endpoints for employee records, guarded by role-based session authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::login::login,
        crate::inbound::http::login::logout,
        crate::inbound::http::employees::list_employees,
        crate::inbound::http::employees::get_employee,
        crate::inbound::http::employees::create_employee,
        crate::inbound::http::employees::update_employee,
        crate::inbound::http::employees::delete_employee,
        crate::inbound::http::employees::search_employees,
        crate::inbound::http::employees::promote_employee,
        crate::inbound::http::employees::top_earners,
        crate::inbound::http::employees::salary_extremes,
        crate::inbound::http::employees::recent_hires,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        PrincipalSchema,
        RoleSchema,
        LoginRequest,
        EmployeeRequest,
        EmployeeResponse,
        SalaryExtremesResponse,
    )),
    tags(
        (name = "auth", description = "Session login and logout"),
        (name = "employees", description = "Employee records and reports"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
