//! Employee management handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use common::{AppError, AppResult};
use domain::{EmployeeResponse, IdentityResult, OperationResult, Policy};

use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Employee list query
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Case-insensitive match on user name, email or names
    pub search: Option<String>,
}

/// Create employee routes
pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_employees))
        .route("/me", get(get_current_employee))
        .route("/:id", delete(delete_employee))
        .route("/:id/deactivate", post(deactivate_employee))
        .route("/:id/activate", post(activate_employee))
        .route("/:id/confirm-email", post(confirm_email))
}

/// Map a failed identity result to an error, otherwise report success.
fn into_operation(result: IdentityResult, prefix: &str) -> AppResult<Json<OperationResult>> {
    let operation = OperationResult::from_identity(&result, prefix);
    if operation.succeeded {
        Ok(Json(operation))
    } else {
        Err(AppError::validation(operation.message))
    }
}

/// Get the current employee
#[utoipa::path(
    get,
    path = "/api/employees/me",
    tag = "Employees",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current employee", body = EmployeeResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_employee(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<EmployeeResponse>> {
    let scope = state.scope(Some(&current_user));
    let employee = scope
        .employees
        .find_by_id(&current_user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(EmployeeResponse::from(employee)))
}

/// List active employees (admin or user)
#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(ListQuery),
    responses(
        (status = 200, description = "Active employees", body = Vec<EmployeeResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_employees(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<EmployeeResponse>>> {
    current_user.require(Policy::AdminUserOnly)?;

    let scope = state.scope(Some(&current_user));
    let employees = scope.employees.list(query.search).await?;

    Ok(Json(employees.iter().map(EmployeeResponse::from).collect()))
}

/// Deactivate an employee (admin only)
#[utoipa::path(
    post,
    path = "/api/employees/{id}/deactivate",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deactivated", body = OperationResult),
        (status = 400, description = "Cannot deactivate your own account"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn deactivate_employee(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<OperationResult>> {
    current_user.require(Policy::AdminOnly)?;

    if current_user.id == id {
        return Err(AppError::validation("Cannot deactivate your own account"));
    }

    let scope = state.scope(Some(&current_user));
    let result = scope.employees.deactivate(&id).await?;
    into_operation(result, "Deactivate employee")
}

/// Reactivate an employee (admin only)
#[utoipa::path(
    post,
    path = "/api/employees/{id}/activate",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee activated", body = OperationResult),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn activate_employee(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<OperationResult>> {
    current_user.require(Policy::AdminOnly)?;

    let scope = state.scope(Some(&current_user));
    let result = scope.employees.activate(&id).await?;
    into_operation(result, "Activate employee")
}

/// Confirm an employee's email address (admin only)
#[utoipa::path(
    post,
    path = "/api/employees/{id}/confirm-email",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Email confirmed", body = OperationResult),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn confirm_email(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<OperationResult>> {
    current_user.require(Policy::AdminOnly)?;

    let scope = state.scope(Some(&current_user));
    let result = scope.employees.confirm_email(&id).await?;
    into_operation(result, "Confirm email")
}

/// Soft delete an employee (admin only, cannot delete self)
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Employee ID")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn delete_employee(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    current_user.require(Policy::AdminOnly)?;

    // Prevent self-deletion
    if current_user.id == id {
        return Err(AppError::validation("Cannot delete your own account"));
    }

    let scope = state.scope(Some(&current_user));
    scope.employees.delete(&id).await?;
    state.tokens(&scope).sign_out(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}
