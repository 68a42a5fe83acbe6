use super::parse_id;
use crate::{
    error::{AppError, AppResult},
    response::{Flash, Form, Intent, Location, Outcome, Page},
    services::{IdentityService, NewWork, Session, VoteLedger, WorkCatalog, WorkChanges},
};
use sea_orm::DatabaseConnection;

pub const WORK_NOT_FOUND: &str = "That work does not exist";
pub const LOGIN_REQUIRED: &str = "You must log in to do that";
pub const UPVOTED: &str = "Successfully upvoted!";
pub const UPVOTE_FAILED: &str = "Could not upvote...";

fn not_found(session: Session) -> Outcome {
    Outcome::new(
        session,
        Intent::redirect(Location::Works, Flash::error(WORK_NOT_FOUND)),
    )
}

pub async fn home(db: &DatabaseConnection, session: Session) -> AppResult<Outcome> {
    let categories = WorkCatalog::new(db.clone()).list_by_category().await?;
    Ok(Outcome::new(session, Intent::Render(Page::Home { categories })))
}

pub async fn index(db: &DatabaseConnection, session: Session) -> AppResult<Outcome> {
    let works = WorkCatalog::new(db.clone()).list().await?;
    Ok(Outcome::new(session, Intent::Render(Page::Works(works))))
}

pub fn new_form(session: Session) -> Outcome {
    Outcome::new(session, Intent::form(Form::NewWork, Default::default()))
}

pub async fn show(db: &DatabaseConnection, session: Session, raw_id: &str) -> AppResult<Outcome> {
    let Some(id) = parse_id(raw_id) else {
        return Ok(not_found(session));
    };

    let mut work = match WorkCatalog::new(db.clone()).get(id).await {
        Ok(work) => work,
        Err(AppError::NotFound) => return Ok(not_found(session)),
        Err(e) => return Err(e),
    };

    let voters = VoteLedger::new(db.clone()).voters_for_work(id).await?;
    work.vote_count = i32::try_from(voters.len()).unwrap_or(i32::MAX);

    Ok(Outcome::new(
        session,
        Intent::Render(Page::Work { work, voters }),
    ))
}

pub async fn create(
    db: &DatabaseConnection,
    session: Session,
    fields: NewWork,
) -> AppResult<Outcome> {
    match WorkCatalog::new(db.clone()).create(fields).await {
        Ok(work) => Ok(Outcome::new(
            session,
            Intent::redirect(
                Location::Work(work.id),
                Flash::success(format!(
                    "Successfully created {} {}",
                    work.category, work.id
                )),
            ),
        )),
        Err(AppError::Validation(errors)) => {
            Ok(Outcome::new(session, Intent::form(Form::NewWork, errors)))
        }
        Err(e) => Err(e),
    }
}

pub async fn edit(db: &DatabaseConnection, session: Session, raw_id: &str) -> AppResult<Outcome> {
    let Some(id) = parse_id(raw_id) else {
        return Ok(not_found(session));
    };

    match WorkCatalog::new(db.clone()).get(id).await {
        Ok(work) => Ok(Outcome::new(session, Intent::Render(Page::EditWork(work)))),
        Err(AppError::NotFound) => Ok(not_found(session)),
        Err(e) => Err(e),
    }
}

pub async fn update(
    db: &DatabaseConnection,
    session: Session,
    raw_id: &str,
    changes: WorkChanges,
) -> AppResult<Outcome> {
    let Some(id) = parse_id(raw_id) else {
        return Ok(not_found(session));
    };

    match WorkCatalog::new(db.clone()).update(id, changes).await {
        Ok(work) => Ok(Outcome::new(
            session,
            Intent::redirect(
                Location::Work(work.id),
                Flash::success(format!(
                    "Successfully updated {} {}",
                    work.category, work.id
                )),
            ),
        )),
        Err(AppError::NotFound) => Ok(not_found(session)),
        Err(AppError::Validation(errors)) => Ok(Outcome::new(
            session,
            Intent::RenderForm {
                form: Form::EditWork,
                errors,
                bad_request: true,
            },
        )),
        Err(e) => Err(e),
    }
}

pub async fn destroy(
    db: &DatabaseConnection,
    session: Session,
    raw_id: &str,
) -> AppResult<Outcome> {
    let Some(id) = parse_id(raw_id) else {
        return Ok(not_found(session));
    };

    match WorkCatalog::new(db.clone()).destroy(id).await {
        Ok(work) => Ok(Outcome::new(
            session,
            Intent::redirect(
                Location::Root,
                Flash::success(format!(
                    "Successfully destroyed {} {}",
                    work.category, work.id
                )),
            ),
        )),
        Err(AppError::NotFound) => Ok(not_found(session)),
        Err(e) => Err(e),
    }
}

/// Cast the session user's vote for a work.
///
/// Login is checked first, then the work lookup, then the ledger. Every failure redirects
/// back; only the flash message differs.
pub async fn upvote(
    db: &DatabaseConnection,
    session: Session,
    raw_id: &str,
) -> AppResult<Outcome> {
    let back = |flash: Flash| Outcome::new(session, Intent::redirect(Location::Back, flash));

    let user = match IdentityService::new(db.clone()).current_user(&session).await {
        Ok(user) => user,
        Err(AppError::Unauthorized) => return Ok(back(Flash::error(LOGIN_REQUIRED))),
        Err(e) => return Err(e),
    };

    let Some(id) = parse_id(raw_id) else {
        return Ok(not_found(session));
    };
    let work = match WorkCatalog::new(db.clone()).get(id).await {
        Ok(work) => work,
        Err(AppError::NotFound) => return Ok(not_found(session)),
        Err(e) => return Err(e),
    };

    let flash = match VoteLedger::new(db.clone()).cast_vote(user.id, work.id).await {
        Ok(_) => Flash::success(UPVOTED),
        Err(AppError::AlreadyVoted) => Flash::error(format!(
            "{}: {}",
            user.username,
            crate::services::validation::ALREADY_VOTED
        )),
        Err(e) => {
            tracing::error!(user_id = user.id, work_id = work.id, "Vote not saved: {e}");
            Flash::error(UPVOTE_FAILED)
        }
    };

    Ok(back(flash))
}
