//! User handlers.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{UserId, ValidQuery, ValidatedJson};
use crate::api::AppState;
use crate::domain::{NewUser, User, UserChanges, UserListFilter};
use crate::errors::{AppError, AppResult};
use crate::types::{Created, NoContent, Page};

/// User creation request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Email address, unique across users
    #[validate(email(message = "email must be a valid address"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Display name
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "John Doe")]
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub used_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub company: Option<String>,
    /// Birth date as `YYYY-MM-DD`; an empty string means absent
    #[serde(default, deserialize_with = "birth_date")]
    #[schema(value_type = Option<String>, format = Date, example = "1990-05-17")]
    pub birth: Option<NaiveDate>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            email: req.email,
            name: req.name,
            used_name: req.used_name,
            company: req.company,
            birth: req.birth,
        }
    }
}

/// User update request with validation.
///
/// Optional attributes left out are cleared.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Jane Doe")]
    pub name: String,
    /// New email; unchanged when omitted
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub used_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "birth_date")]
    #[schema(value_type = Option<String>, format = Date, example = "1990-05-17")]
    pub birth: Option<NaiveDate>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            email: req.email,
            name: req.name,
            used_name: req.used_name,
            company: req.company,
            birth: req.birth,
        }
    }
}

/// Listing filters and paging
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Exact email match
    pub email: Option<String>,
    /// Substring match on name
    pub name_like: Option<String>,
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Page size, at most 200
    pub page_size: Option<i64>,
}

impl From<ListUsersQuery> for UserListFilter {
    fn from(query: ListUsersQuery) -> Self {
        Self {
            email: query.email,
            name_like: query.name_like,
            page: query.page.unwrap_or_default(),
            page_size: query.page_size.unwrap_or_default(),
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

fn birth_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| de::Error::custom("birth must be a YYYY-MM-DD date")),
    }
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/by-email/:email", get(get_user_by_email))
        .route("/by-external-id/:external_id", get(get_user_by_external_id))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> AppResult<Json<User>> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(user))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<Created<User>> {
    let user = state.user_service.create_user(payload.into()).await?;
    Ok(Created(user))
}

/// List users with optional filters
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = UserPage),
        (status = 400, description = "Malformed query", body = ErrorBody)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListUsersQuery>,
) -> AppResult<Json<Page<User>>> {
    let page = state.user_service.list_users(query.into()).await?;
    Ok(Json(page))
}

/// Update user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    let user = state.user_service.update_user(id, payload.into()).await?;
    Ok(Json(user))
}

/// Delete user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> AppResult<NoContent> {
    state.user_service.delete_user(id).await?;
    Ok(NoContent)
}

/// Get user by email address
#[utoipa::path(
    get,
    path = "/users/by-email/{email}",
    tag = "Users",
    params(
        ("email" = String, Path, description = "Email address")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<User>> {
    let user = state.user_service.get_user_by_email(&email).await?;
    Ok(Json(user))
}

/// Get user by external identifier
#[utoipa::path(
    get,
    path = "/users/by-external-id/{external_id}",
    tag = "Users",
    params(
        ("external_id" = Uuid, Path, description = "External user ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, description = "Malformed UUID", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn get_user_by_external_id(
    State(state): State<AppState>,
    external_id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<User>> {
    let Path(external_id) = external_id.map_err(|e| AppError::invalid(e.body_text()))?;
    let user = state.user_service.get_user_by_external_id(external_id).await?;
    Ok(Json(user))
}
