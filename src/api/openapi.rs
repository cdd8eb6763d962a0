//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::OpenApi;

use crate::api::handlers::user_handler;
use crate::domain::User;
use crate::errors::ErrorBody;
use crate::types::UserPage;

/// OpenAPI documentation for the user service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Scaffold",
        version = "0.1.0",
        description = "User CRUD with transactional writes and a Redis read-through cache",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        user_handler::get_user,
        user_handler::create_user,
        user_handler::list_users,
        user_handler::update_user,
        user_handler::delete_user,
        user_handler::get_user_by_email,
        user_handler::get_user_by_external_id,
    ),
    components(
        schemas(
            User,
            UserPage,
            ErrorBody,
            user_handler::CreateUserRequest,
            user_handler::UpdateUserRequest,
        )
    ),
    tags(
        (name = "Users", description = "User management operations")
    )
)]
pub struct ApiDoc;
