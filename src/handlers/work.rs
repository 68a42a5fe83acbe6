use crate::actions;
use crate::error::AppResult;
use crate::response::respond;
use crate::services::{NewWork, Session, WorkChanges};
use axum::{
    extract::Path,
    http::HeaderMap,
    response::Response,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{de::Error as _, Deserialize, Deserializer};
use utoipa::ToSchema;

/// Work fields as submitted by a form. Every key is optional so the same shape serves
/// create (missing keys are empty) and update (missing keys are left alone).
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct WorkParams {
    /// Work title, unique across the catalog
    pub title: Option<String>,
    /// Category tag such as book, movie or album
    pub category: Option<String>,
    /// Author, director or artist
    pub creator: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Year as a number or numeric string; null or "" clears it
    #[serde(deserialize_with = "deserialize_year")]
    #[schema(value_type = Option<i32>)]
    pub publication_year: Option<Option<i32>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YearInput {
    Number(i64),
    Text(String),
}

/// Present keys always deserialize to `Some`, so `None` keeps meaning "not submitted".
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let year = match Option::<YearInput>::deserialize(deserializer)? {
        None => None,
        Some(YearInput::Number(n)) => Some(i32::try_from(n).map_err(D::Error::custom)?),
        Some(YearInput::Text(s)) if s.trim().is_empty() => None,
        Some(YearInput::Text(s)) => Some(s.trim().parse::<i32>().map_err(|_| {
            D::Error::custom(format!("publication_year must be a number, got '{s}'"))
        })?),
    };
    Ok(Some(year))
}

impl From<WorkParams> for NewWork {
    fn from(p: WorkParams) -> Self {
        Self {
            title: p.title.unwrap_or_default(),
            category: p.category.unwrap_or_default(),
            creator: p.creator,
            description: p.description,
            publication_year: p.publication_year.flatten(),
        }
    }
}

impl From<WorkParams> for WorkChanges {
    fn from(p: WorkParams) -> Self {
        Self {
            title: p.title,
            category: p.category,
            creator: p.creator.map(Some),
            description: p.description.map(Some),
            publication_year: p.publication_year,
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Works grouped by category", body = serde_json::Value)),
    tag = "works"
)]
pub async fn home(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
) -> AppResult<Response> {
    let outcome = actions::work::home(&db, session).await?;
    respond(session, outcome, &headers)
}

#[utoipa::path(
    get,
    path = "/works",
    responses((status = 200, description = "All works", body = Vec<crate::models::WorkModel>)),
    tag = "works"
)]
pub async fn list_works(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
) -> AppResult<Response> {
    let outcome = actions::work::index(&db, session).await?;
    respond(session, outcome, &headers)
}

#[utoipa::path(
    get,
    path = "/works/new",
    responses((status = 200, description = "Empty work form")),
    tag = "works"
)]
pub async fn new_work(session: Session, headers: HeaderMap) -> AppResult<Response> {
    respond(session, actions::work::new_form(session), &headers)
}

#[utoipa::path(
    get,
    path = "/works/{id}",
    params(("id" = String, Path, description = "Work ID")),
    responses(
        (status = 200, description = "Work with its voters", body = serde_json::Value),
        (status = 303, description = "Work does not exist"),
    ),
    tag = "works"
)]
pub async fn show_work(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = actions::work::show(&db, session, &id).await?;
    respond(session, outcome, &headers)
}

#[utoipa::path(
    post,
    path = "/works",
    request_body = WorkParams,
    responses(
        (status = 303, description = "Work created, redirect to it"),
        (status = 200, description = "Form re-rendered with field errors"),
        (status = 422, description = "Malformed publication year"),
    ),
    tag = "works"
)]
pub async fn create_work(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
    Json(params): Json<WorkParams>,
) -> AppResult<Response> {
    let outcome = actions::work::create(&db, session, params.into()).await?;
    respond(session, outcome, &headers)
}

#[utoipa::path(
    get,
    path = "/works/{id}/edit",
    params(("id" = String, Path, description = "Work ID")),
    responses(
        (status = 200, description = "Work to edit", body = crate::models::WorkModel),
        (status = 303, description = "Work does not exist"),
    ),
    tag = "works"
)]
pub async fn edit_work(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = actions::work::edit(&db, session, &id).await?;
    respond(session, outcome, &headers)
}

#[utoipa::path(
    put,
    path = "/works/{id}",
    params(("id" = String, Path, description = "Work ID")),
    request_body = WorkParams,
    responses(
        (status = 303, description = "Work updated, or it does not exist"),
        (status = 400, description = "Form re-rendered with field errors"),
    ),
    tag = "works"
)]
pub async fn update_work(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(params): Json<WorkParams>,
) -> AppResult<Response> {
    let outcome = actions::work::update(&db, session, &id, params.into()).await?;
    respond(session, outcome, &headers)
}

#[utoipa::path(
    delete,
    path = "/works/{id}",
    params(("id" = String, Path, description = "Work ID")),
    responses((status = 303, description = "Work destroyed, or it does not exist")),
    tag = "works"
)]
pub async fn destroy_work(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = actions::work::destroy(&db, session, &id).await?;
    respond(session, outcome, &headers)
}

#[utoipa::path(
    post,
    path = "/works/{id}/upvote",
    params(("id" = String, Path, description = "Work ID")),
    responses((status = 303, description = "Back to the referring page with the vote result")),
    tag = "votes"
)]
pub async fn upvote_work(
    Extension(db): Extension<DatabaseConnection>,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = actions::work::upvote(&db, session, &id).await?;
    respond(session, outcome, &headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> serde_json::Result<WorkParams> {
        serde_json::from_str(body)
    }

    #[test]
    fn missing_year_is_not_submitted() {
        let p = parse(r#"{"title":"Dune"}"#).unwrap();
        assert_eq!(p.publication_year, None);
    }

    #[test]
    fn numeric_string_year_is_coerced() {
        let p = parse(r#"{"publication_year":"1996"}"#).unwrap();
        assert_eq!(p.publication_year, Some(Some(1996)));
    }

    #[test]
    fn blank_or_null_year_clears() {
        assert_eq!(
            parse(r#"{"publication_year":""}"#).unwrap().publication_year,
            Some(None)
        );
        assert_eq!(
            parse(r#"{"publication_year":null}"#).unwrap().publication_year,
            Some(None)
        );
    }

    #[test]
    fn non_numeric_year_is_rejected() {
        assert!(parse(r#"{"publication_year":"nineteen"}"#).is_err());
        assert!(parse(r#"{"publication_year":1996.5}"#).is_err());
    }

    #[test]
    fn create_params_default_missing_text_to_empty() {
        let new: NewWork = parse(r#"{"category":"book"}"#).unwrap().into();
        assert_eq!(new.title, "");
        assert_eq!(new.category, "book");
    }

    #[test]
    fn update_params_leave_missing_fields_untouched() {
        let changes: WorkChanges = parse(r#"{"description":"new"}"#).unwrap().into();
        assert!(changes.title.is_none());
        assert!(changes.creator.is_none());
        assert_eq!(changes.description, Some(Some("new".to_string())));
    }
}
