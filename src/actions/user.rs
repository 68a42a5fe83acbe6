use super::parse_id;
use crate::{
    error::{AppError, AppResult},
    response::{Flash, Form, Intent, Location, Outcome, Page},
    services::{IdentityService, Login, Session, VoteLedger},
};
use sea_orm::DatabaseConnection;

pub const USER_NOT_FOUND: &str = "That user does not exist";
pub const LOGIN_TO_VIEW: &str = "You must be logged in to see this page!";
pub const LOGGED_OUT: &str = "Successfully logged out";

pub fn login_form(session: Session) -> Outcome {
    Outcome::new(session, Intent::form(Form::Login, Default::default()))
}

/// Log in as `username`, registering it first if it has never been seen.
pub async fn login(
    db: &DatabaseConnection,
    session: Session,
    username: &str,
) -> AppResult<Outcome> {
    let login = match IdentityService::new(db.clone())
        .login_or_register(username)
        .await
    {
        Ok(login) => login,
        Err(AppError::Validation(errors)) => {
            return Ok(Outcome::new(session, Intent::form(Form::Login, errors)))
        }
        Err(e) => return Err(e),
    };

    let user = login.user();
    let message = match &login {
        Login::Existing(_) => format!("Successfully logged in as existing user {}", user.username),
        Login::Created(_) => format!(
            "Successfully created new user {} with ID {}",
            user.username, user.id
        ),
    };

    Ok(Outcome::new(
        Session::for_user(user.id),
        Intent::redirect(Location::Root, Flash::success(message)),
    ))
}

pub fn logout(db: &DatabaseConnection, session: Session) -> Outcome {
    let session = IdentityService::new(db.clone()).logout(session);
    Outcome::new(
        session,
        Intent::redirect(Location::Root, Flash::success(LOGGED_OUT)),
    )
}

pub async fn current(db: &DatabaseConnection, session: Session) -> AppResult<Outcome> {
    match IdentityService::new(db.clone()).current_user(&session).await {
        Ok(user) => Ok(Outcome::new(session, Intent::Render(Page::CurrentUser(user)))),
        Err(AppError::Unauthorized) => Ok(Outcome::new(
            session,
            Intent::redirect(Location::Root, Flash::error(LOGIN_TO_VIEW)),
        )),
        Err(e) => Err(e),
    }
}

pub async fn index(db: &DatabaseConnection, session: Session) -> AppResult<Outcome> {
    let users = IdentityService::new(db.clone()).list().await?;
    Ok(Outcome::new(session, Intent::Render(Page::Users(users))))
}

pub async fn show(db: &DatabaseConnection, session: Session, raw_id: &str) -> AppResult<Outcome> {
    let missing = || {
        Outcome::new(
            session,
            Intent::redirect(Location::Users, Flash::error(USER_NOT_FOUND)),
        )
    };

    let Some(id) = parse_id(raw_id) else {
        return Ok(missing());
    };

    let user = match IdentityService::new(db.clone()).get(id).await {
        Ok(user) => user,
        Err(AppError::NotFound) => return Ok(missing()),
        Err(e) => return Err(e),
    };
    let voted_works = VoteLedger::new(db.clone()).works_voted_by(id).await?;

    Ok(Outcome::new(
        session,
        Intent::Render(Page::User { user, voted_works }),
    ))
}
