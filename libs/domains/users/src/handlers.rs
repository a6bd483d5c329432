use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        NotFoundResponse, ServiceUnavailableResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::hasher::CredentialHasher;
use crate::models::{CreateUser, UpdateUser, UserConfirmation, UserResponse};
use crate::repository::UserStore;
use crate::service::UserDirectory;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, update_user, delete_user),
    components(
        schemas(UserResponse, CreateUser, UpdateUser, UserConfirmation),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = "Users", description = "User account management endpoints")
    )
)]
pub struct ApiDoc;

type SharedDirectory<S, H> = Arc<UserDirectory<S, H>>;

/// Create the users router with all HTTP endpoints
pub fn router<S, H>(directory: UserDirectory<S, H>) -> Router
where
    S: UserStore + 'static,
    H: CredentialHasher + 'static,
{
    let shared_directory = Arc::new(directory);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", patch(update_user).delete(delete_user))
        .with_state(shared_directory)
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    responses(
        (status = 200, description = "List of users (possibly empty)", body = Vec<UserResponse>),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_users<S: UserStore, H: CredentialHasher>(
    State(directory): State<SharedDirectory<S, H>>,
) -> UserResult<Json<Vec<UserResponse>>> {
    let users = directory.list_users().await?;
    Ok(Json(users))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created successfully", body = UserConfirmation),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_user<S: UserStore, H: CredentialHasher>(
    State(directory): State<SharedDirectory<S, H>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let confirmation = directory.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// Update a user
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated successfully", body = UserConfirmation),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn update_user<S: UserStore, H: CredentialHasher>(
    State(directory): State<SharedDirectory<S, H>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserConfirmation>> {
    let confirmation = directory.update_user(id, input).await?;
    Ok(Json(confirmation))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = UserConfirmation),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn delete_user<S: UserStore, H: CredentialHasher>(
    State(directory): State<SharedDirectory<S, H>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserConfirmation>> {
    let confirmation = directory.delete_user(id).await?;
    Ok(Json(confirmation))
}
