use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
    services::validation::{self, TAKEN},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

/// Per-client session state: at most one authenticated user id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: Option<i32>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

/// Result of [`IdentityService::login_or_register`].
#[derive(Debug, Clone, PartialEq)]
pub enum Login {
    Existing(UserModel),
    Created(UserModel),
}

impl Login {
    pub fn user(&self) -> &UserModel {
        match self {
            Login::Existing(user) | Login::Created(user) => user,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Login::Created(_))
    }
}

pub struct IdentityService {
    db: DatabaseConnection,
}

impl IdentityService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Find the user named `username`, creating it on first use.
    pub async fn login_or_register(&self, username: &str) -> AppResult<Login> {
        if let Some(user) = self.find_by_username(username).await? {
            return Ok(Login::Existing(user));
        }

        let errors = validation::validate_user(&self.db, username).await?;
        if errors
            .get("username")
            .is_some_and(|messages| messages.iter().any(|m| m == TAKEN))
        {
            return self.existing_after_race(username).await;
        }
        errors.into_result()?;

        let new_user = user::ActiveModel {
            username: sea_orm::ActiveValue::Set(username.to_string()),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        match new_user.insert(&self.db).await.map_err(AppError::from) {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "User created");
                Ok(Login::Created(user))
            }
            Err(err) if err.is_unique_violation() => self.existing_after_race(username).await,
            Err(err) => Err(err),
        }
    }

    /// Resolve the session's user. A session naming a user that no longer exists counts as
    /// unauthenticated.
    pub async fn current_user(&self, session: &Session) -> AppResult<UserModel> {
        let user_id = session.user_id.ok_or(AppError::Unauthorized)?;
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Drop the authenticated-user marker. Never fails, even for an anonymous session.
    pub fn logout(&self, session: Session) -> Session {
        if let Some(user_id) = session.user_id {
            tracing::info!(user_id, "User logged out");
        }
        Session::anonymous()
    }

    pub async fn list(&self) -> AppResult<Vec<UserModel>> {
        let users = User::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    pub async fn get(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserModel>> {
        let user = User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(user)
    }

    /// Another request registered the same name between our lookup and insert.
    async fn existing_after_race(&self, username: &str) -> AppResult<Login> {
        tracing::debug!(username, "Concurrent registration detected, using existing user");
        self.find_by_username(username)
            .await?
            .map(Login::Existing)
            .ok_or_else(|| anyhow::anyhow!("user '{username}' vanished after unique conflict").into())
    }
}
