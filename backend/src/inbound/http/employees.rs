//! Employee API handlers.
//!
//! ```text
//! GET    /api/v1/employees?page=0
//! GET    /api/v1/employees/{id}
//! POST   /api/v1/employees
//! PUT    /api/v1/employees/{id}
//! DELETE /api/v1/employees/{id}
//! GET    /api/v1/employees/search?query=ana
//! PUT    /api/v1/employees/{id}/promote?newPosition=Lead&salaryIncrease=5000
//! GET    /api/v1/employees/top-earners?limit=5
//! GET    /api/v1/employees/salary-extremes
//! GET    /api/v1/employees/recent-hires?months=6
//! ```
//!
//! Every handler checks the session principal before calling a port. The
//! fixed paths must be registered ahead of `/employees/{id}`, which
//! [`configure`] takes care of.

use actix_web::http::header::{self, HeaderMap};
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use futures_util::stream;
use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE, PageRequest};
use serde::Deserialize;

use crate::domain::{Employee, EmployeeDraft, Error, Position, Promotion, SalaryIncrease};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{ADMIN_ONLY, STAFF, authorise, require_self_or_roles};
use crate::inbound::http::employees_dto::{
    EmployeeRequest, EmployeeResponse, SalaryExtremesResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, employee_validation_error, ensure_in_range, missing_field_error,
    require_text, resolve_employee_id,
};

/// Media type for newline-delimited JSON list responses.
pub const NDJSON: &str = "application/x-ndjson";

const DEFAULT_TOP_EARNERS: u32 = 5;
const DEFAULT_RECENT_MONTHS: u32 = 6;
const MAX_TOP_EARNERS: u32 = 100;
const MAX_RECENT_MONTHS: u32 = 1_200;

const PAGE: FieldName = FieldName::new("page");
const QUERY: FieldName = FieldName::new("query");
const LIMIT: FieldName = FieldName::new("limit");
const MONTHS: FieldName = FieldName::new("months");
const NEW_POSITION: FieldName = FieldName::new("newPosition");
const SALARY_INCREASE: FieldName = FieldName::new("salaryIncrease");

/// Register the employee handlers in match order.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_employees)
        .service(create_employee)
        .service(search_employees)
        .service(top_earners)
        .service(salary_extremes)
        .service(recent_hires)
        .service(promote_employee)
        .service(get_employee)
        .service(update_employee)
        .service(delete_employee);
}

#[derive(Debug, Default, Deserialize)]
pub struct ListEmployeesQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteQuery {
    pub new_position: Option<String>,
    pub salary_increase: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopEarnersQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentHiresQuery {
    pub months: Option<u32>,
}

fn parse_page(query: ListEmployeesQuery) -> Result<PageRequest, Error> {
    let page = ensure_in_range(query.page.unwrap_or(0), 0..=MAX_PAGE, PAGE)?;
    PageRequest::new(page, DEFAULT_PAGE_SIZE).map_err(|err| Error::invalid_request(err.to_string()))
}

fn parse_promotion(query: PromoteQuery) -> Result<Promotion, Error> {
    let position = require_text(query.new_position, NEW_POSITION)?;
    let position = Position::new(position).map_err(|err| employee_validation_error(&err))?;
    let increase = query
        .salary_increase
        .ok_or_else(|| missing_field_error(SALARY_INCREASE))?;
    let increase = SalaryIncrease::new(increase).map_err(|err| employee_validation_error(&err))?;
    Ok(Promotion { position, increase })
}

fn wants_ndjson(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains(NDJSON))
}

fn ndjson_line(employee: &Employee) -> Result<web::Bytes, Error> {
    let mut line = serde_json::to_vec(&EmployeeResponse::from(employee))
        .map_err(|err| Error::internal(format!("failed to encode employee: {err}")))?;
    line.push(b'\n');
    Ok(web::Bytes::from(line))
}

fn to_responses(employees: Vec<Employee>) -> Vec<EmployeeResponse> {
    employees.into_iter().map(EmployeeResponse::from).collect()
}

/// List one page of employees, highest salary first.
///
/// Send `Accept: application/x-ndjson` to receive one JSON object per line.
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(
        ("page" = Option<u32>, Query, description = "Zero-based page index; pages hold 10 employees")
    ),
    responses(
        (status = 200, description = "Employees on the page, as a JSON array or NDJSON lines",
            body = [EmployeeResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "listEmployees",
    security(("SessionCookie" = []))
)]
#[get("/employees")]
pub async fn list_employees(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    query: web::Query<ListEmployeesQuery>,
) -> ApiResult<HttpResponse> {
    authorise(&session, STAFF)?;
    let page = parse_page(query.into_inner())?;
    let employees = state.employees.list_employees(page).await?;

    if wants_ndjson(request.headers()) {
        let lines: Vec<Result<web::Bytes, Error>> = employees.iter().map(ndjson_line).collect();
        return Ok(HttpResponse::Ok()
            .content_type(NDJSON)
            .streaming(stream::iter(lines)));
    }
    Ok(HttpResponse::Ok().json(to_responses(employees)))
}

/// Fetch one employee.
///
/// Answers `204 No Content` when the store is unavailable and the lookup
/// fell back to an empty result.
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id" = String, Path, description = "Employee identifier (UUID)")),
    responses(
        (status = 200, description = "Employee", body = EmployeeResponse),
        (status = 204, description = "Store unavailable; no employee returned"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "getEmployee",
    security(("SessionCookie" = []))
)]
#[get("/employees/{id}")]
pub async fn get_employee(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let id = resolve_employee_id(&path.into_inner())?;
    require_self_or_roles(&principal, id, STAFF)?;

    match state.employees.get_employee(id).await? {
        Some(employee) => Ok(HttpResponse::Ok().json(EmployeeResponse::from(employee))),
        None => Ok(HttpResponse::NoContent().finish()),
    }
}

/// Create an employee under a server-assigned identifier.
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = EmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "createEmployee",
    security(("SessionCookie" = []))
)]
#[post("/employees")]
pub async fn create_employee(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EmployeeRequest>,
) -> ApiResult<HttpResponse> {
    authorise(&session, STAFF)?;
    let draft = EmployeeDraft::try_from(payload.into_inner())?;
    let employee = state.employee_commands.create_employee(draft).await?;
    Ok(HttpResponse::Created()
        .insert_header((
            header::LOCATION,
            format!("/api/v1/employees/{}", employee.id()),
        ))
        .json(EmployeeResponse::from(employee)))
}

/// Replace the fields of an existing employee.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(("id" = String, Path, description = "Employee identifier (UUID)")),
    request_body = EmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "updateEmployee",
    security(("SessionCookie" = []))
)]
#[put("/employees/{id}")]
pub async fn update_employee(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<EmployeeRequest>,
) -> ApiResult<web::Json<EmployeeResponse>> {
    authorise(&session, STAFF)?;
    let draft = EmployeeDraft::try_from(payload.into_inner())?;
    let id = resolve_employee_id(&path.into_inner())?;
    let employee = state.employee_commands.update_employee(id, draft).await?;
    Ok(web::Json(employee.into()))
}

/// Delete an employee.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id" = String, Path, description = "Employee identifier (UUID)")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "deleteEmployee",
    security(("SessionCookie" = []))
)]
#[delete("/employees/{id}")]
pub async fn delete_employee(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    authorise(&session, ADMIN_ONLY)?;
    let id = resolve_employee_id(&path.into_inner())?;
    state.employee_commands.delete_employee(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Case-insensitive search on the employee name.
#[utoipa::path(
    get,
    path = "/api/v1/employees/search",
    params(("query" = String, Query, description = "Name fragment; must not be blank")),
    responses(
        (status = 200, description = "Matching employees", body = [EmployeeResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "searchEmployees",
    security(("SessionCookie" = []))
)]
#[get("/employees/search")]
pub async fn search_employees(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<EmployeeResponse>>> {
    authorise(&session, STAFF)?;
    let fragment = require_text(query.into_inner().query, QUERY)?;
    let employees = state.employees.search_by_name(&fragment).await?;
    Ok(web::Json(to_responses(employees)))
}

/// Move an employee to a new position with a salary raise.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}/promote",
    params(
        ("id" = String, Path, description = "Employee identifier (UUID)"),
        ("newPosition" = String, Query, description = "Position after the promotion"),
        ("salaryIncrease" = f64, Query, description = "Amount added to the salary; greater than zero")
    ),
    responses(
        (status = 200, description = "Employee promoted", body = EmployeeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "promoteEmployee",
    security(("SessionCookie" = []))
)]
#[put("/employees/{id}/promote")]
pub async fn promote_employee(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<PromoteQuery>,
) -> ApiResult<web::Json<EmployeeResponse>> {
    authorise(&session, ADMIN_ONLY)?;
    let promotion = parse_promotion(query.into_inner())?;
    let id = resolve_employee_id(&path.into_inner())?;
    let employee = state.employee_commands.promote_employee(id, promotion).await?;
    Ok(web::Json(employee.into()))
}

/// Highest paid employees.
#[utoipa::path(
    get,
    path = "/api/v1/employees/top-earners",
    params(("limit" = Option<u32>, Query, description = "Between 1 and 100; defaults to 5")),
    responses(
        (status = 200, description = "Employees by salary, descending", body = [EmployeeResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "topEarners",
    security(("SessionCookie" = []))
)]
#[get("/employees/top-earners")]
pub async fn top_earners(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TopEarnersQuery>,
) -> ApiResult<web::Json<Vec<EmployeeResponse>>> {
    authorise(&session, STAFF)?;
    let limit = ensure_in_range(
        query.limit.unwrap_or(DEFAULT_TOP_EARNERS),
        1..=MAX_TOP_EARNERS,
        LIMIT,
    )?;
    let employees = state.employees.top_earners(limit).await?;
    Ok(web::Json(to_responses(employees)))
}

/// Lowest and highest paid employees.
#[utoipa::path(
    get,
    path = "/api/v1/employees/salary-extremes",
    responses(
        (status = 200, description = "Salary extremes", body = SalaryExtremesResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No employees stored", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "salaryExtremes",
    security(("SessionCookie" = []))
)]
#[get("/employees/salary-extremes")]
pub async fn salary_extremes(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SalaryExtremesResponse>> {
    authorise(&session, STAFF)?;
    let extremes = state.employees.salary_extremes().await?;
    Ok(web::Json(extremes.into()))
}

/// Employees hired within the last `months` calendar months.
#[utoipa::path(
    get,
    path = "/api/v1/employees/recent-hires",
    params(("months" = Option<u32>, Query, description = "Between 0 and 1200; defaults to 6")),
    responses(
        (status = 200, description = "Recently hired employees", body = [EmployeeResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["employees"],
    operation_id = "recentHires",
    security(("SessionCookie" = []))
)]
#[get("/employees/recent-hires")]
pub async fn recent_hires(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<RecentHiresQuery>,
) -> ApiResult<web::Json<Vec<EmployeeResponse>>> {
    authorise(&session, STAFF)?;
    let months = ensure_in_range(
        query.months.unwrap_or(DEFAULT_RECENT_MONTHS),
        0..=MAX_RECENT_MONTHS,
        MONTHS,
    )?;
    let employees = state.employees.recent_hires(months).await?;
    Ok(web::Json(to_responses(employees)))
}

#[cfg(test)]
#[path = "employees_tests.rs"]
mod tests;
