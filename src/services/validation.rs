//! Field and cross-record rules checked before works, users and votes are written.
//!
//! Every check here is advisory with respect to concurrency: the unique indexes created by the
//! migrations are the final word, and the services translate their rejections back into the
//! same shapes produced here.

use crate::{
    error::{AppResult, FieldErrors},
    models::{user, vote, work, User, Vote, Work},
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use validator::Validate;

pub const BLANK: &str = "can't be blank";
pub const TAKEN: &str = "has already been taken";
pub const ALREADY_VOTED: &str = "has already voted for this work";

/// A complete candidate work: either a new record or stored values merged with an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkDraft {
    pub title: String,
    pub category: String,
    pub creator: Option<String>,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
}

impl From<&work::Model> for WorkDraft {
    fn from(model: &work::Model) -> Self {
        Self {
            title: model.title.clone(),
            category: model.category.clone(),
            creator: model.creator.clone(),
            description: model.description.clone(),
            publication_year: model.publication_year,
        }
    }
}

/// Presence rules, checked against trimmed values.
#[derive(Validate)]
struct WorkPresence {
    #[validate(length(min = 1, message = "can't be blank"))]
    title: String,
    #[validate(length(min = 1, message = "can't be blank"))]
    category: String,
}

/// Column widths from the migrations, checked against the values as they will be stored.
#[derive(Validate)]
struct WorkLimits {
    #[validate(length(max = 255, message = "is too long (maximum is 255 characters)"))]
    title: String,
    #[validate(length(max = 32, message = "is too long (maximum is 32 characters)"))]
    category: String,
    #[validate(length(max = 255, message = "is too long (maximum is 255 characters)"))]
    creator: Option<String>,
}

#[derive(Validate)]
struct UserPresence {
    #[validate(length(min = 1, message = "can't be blank"))]
    username: String,
}

#[derive(Validate)]
struct UserLimits {
    #[validate(length(max = 50, message = "is too long (maximum is 50 characters)"))]
    username: String,
}

fn collect(result: Result<(), validator::ValidationErrors>) -> FieldErrors {
    result.map(|_| FieldErrors::new()).unwrap_or_else(FieldErrors::from)
}

/// Rules that need no store access.
pub fn check_work_fields(draft: &WorkDraft) -> FieldErrors {
    let mut errors = collect(
        WorkPresence {
            title: draft.title.trim().to_string(),
            category: draft.category.trim().to_string(),
        }
        .validate(),
    );
    errors.merge(collect(
        WorkLimits {
            title: draft.title.clone(),
            category: draft.category.clone(),
            creator: draft.creator.clone(),
        }
        .validate(),
    ));
    errors
}

pub fn check_username(username: &str) -> FieldErrors {
    let mut errors = collect(
        UserPresence {
            username: username.trim().to_string(),
        }
        .validate(),
    );
    errors.merge(collect(
        UserLimits {
            username: username.to_string(),
        }
        .validate(),
    ));
    errors
}

/// Validate a work candidate. `current_id` is the record being edited, excluded from the
/// title uniqueness check.
pub async fn validate_work<C: ConnectionTrait>(
    conn: &C,
    draft: &WorkDraft,
    current_id: Option<i32>,
) -> AppResult<FieldErrors> {
    let mut errors = check_work_fields(draft);

    if errors.get("title").is_none() && title_taken(conn, &draft.title, current_id).await? {
        errors.add("title", TAKEN);
    }

    Ok(errors)
}

pub async fn validate_user<C: ConnectionTrait>(conn: &C, username: &str) -> AppResult<FieldErrors> {
    let mut errors = check_username(username);

    if errors.is_empty() {
        let existing = User::find()
            .filter(user::Column::Username.eq(username))
            .count(conn)
            .await?;
        if existing > 0 {
            errors.add("username", TAKEN);
        }
    }

    Ok(errors)
}

pub async fn validate_vote<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    work_id: i32,
) -> AppResult<FieldErrors> {
    let existing = Vote::find()
        .filter(vote::Column::UserId.eq(user_id))
        .filter(vote::Column::WorkId.eq(work_id))
        .count(conn)
        .await?;

    if existing > 0 {
        Ok(FieldErrors::single("user", ALREADY_VOTED))
    } else {
        Ok(FieldErrors::new())
    }
}

async fn title_taken<C: ConnectionTrait>(
    conn: &C,
    title: &str,
    current_id: Option<i32>,
) -> AppResult<bool> {
    let mut query = Work::find().filter(work::Column::Title.eq(title));
    if let Some(id) = current_id {
        query = query.filter(work::Column::Id.ne(id));
    }
    Ok(query.count(conn).await? > 0)
}
