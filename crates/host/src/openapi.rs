//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::account_handler::{
    LoginRequest, RefreshRequest, RegisterRequest, TokenPairResponse,
};
use domain::{EmployeeResponse, OperationResult};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::account_handler::register,
        crate::handlers::account_handler::login,
        crate::handlers::account_handler::refresh,
        crate::handlers::account_handler::logout,
        crate::handlers::employee_handler::get_current_employee,
        crate::handlers::employee_handler::list_employees,
        crate::handlers::employee_handler::deactivate_employee,
        crate::handlers::employee_handler::activate_employee,
        crate::handlers::employee_handler::confirm_email,
        crate::handlers::employee_handler::delete_employee,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            TokenPairResponse,
            EmployeeResponse,
            OperationResult,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Account", description = "Registration, sign-in and tokens"),
        (name = "Employees", description = "Employee administration"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
