use crate::actions;
use crate::error::AppResult;
use crate::response::respond;
use crate::services::Session;
use axum::{extract::Path, http::HeaderMap, response::Response, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    /// Username to log in as; unseen names are registered on the spot
    pub username: String,
}

#[utoipa::path(
    get,
    path = "/login",
    responses((status = 200, description = "Empty login form")),
    tag = "session"
)]
pub async fn login_form(session: Session, headers: HeaderMap) -> AppResult<Response> {
    respond(session, actions::user::login_form(session), &headers)
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Logged in; session cookie set"),
        (status = 200, description = "Login form re-rendered with field errors"),
    ),
    tag = "session"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Response> {
    let outcome = actions::user::login(&db, session, &payload.username).await?;
    respond(session, outcome, &headers)
}

#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Logged out; session cookie cleared")),
    tag = "session"
)]
pub async fn logout(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
) -> AppResult<Response> {
    respond(session, actions::user::logout(&db, session), &headers)
}

#[utoipa::path(
    get,
    path = "/users/current",
    responses(
        (status = 200, description = "The logged-in user", body = crate::models::UserModel),
        (status = 303, description = "Nobody is logged in"),
    ),
    tag = "users"
)]
pub async fn current_user(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
) -> AppResult<Response> {
    let outcome = actions::user::current(&db, session).await?;
    respond(session, outcome, &headers)
}

#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All users", body = Vec<crate::models::UserModel>)),
    tag = "users"
)]
pub async fn list_users(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
) -> AppResult<Response> {
    let outcome = actions::user::index(&db, session).await?;
    respond(session, outcome, &headers)
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with the works they voted for", body = serde_json::Value),
        (status = 303, description = "User does not exist"),
    ),
    tag = "users"
)]
pub async fn show_user(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = actions::user::show(&db, session, &id).await?;
    respond(session, outcome, &headers)
}
