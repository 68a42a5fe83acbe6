use crate::{
    error::{AppError, AppResult},
    models::{vote, work, User, UserModel, Vote, VoteModel, Work, WorkModel},
    services::validation,
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};

pub struct VoteLedger {
    db: DatabaseConnection,
}

impl VoteLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record one upvote from `user_id` for `work_id`.
    ///
    /// The caller guarantees both ids resolve. A second vote for the same pair fails with
    /// [`AppError::AlreadyVoted`] and leaves the store untouched, whether the duplicate is
    /// caught by the pre-check or by the `(user_id, work_id)` unique index.
    pub async fn cast_vote(&self, user_id: i32, work_id: i32) -> AppResult<VoteModel> {
        let txn = self.db.begin().await?;

        if !validation::validate_vote(&txn, user_id, work_id)
            .await?
            .is_empty()
        {
            tracing::debug!(user_id, work_id, "Duplicate vote rejected");
            return Err(AppError::AlreadyVoted);
        }

        let new_vote = vote::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            work_id: sea_orm::ActiveValue::Set(work_id),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        let vote = new_vote.insert(&txn).await.map_err(|e| {
            let err = AppError::from(e);
            if err.is_unique_violation() {
                tracing::warn!(user_id, work_id, "Duplicate vote caught by unique index");
                AppError::AlreadyVoted
            } else {
                err
            }
        })?;

        // Cached counter; `vote_count` below stays the authoritative figure.
        Work::update_many()
            .col_expr(
                work::Column::VoteCount,
                Expr::col(work::Column::VoteCount).add(1),
            )
            .filter(work::Column::Id.eq(work_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        tracing::info!(user_id, work_id, vote_id = vote.id, "Vote cast");
        Ok(vote)
    }

    /// Number of votes referencing `work_id`; zero when there are none.
    pub async fn vote_count(&self, work_id: i32) -> AppResult<u64> {
        let count = Vote::find()
            .filter(vote::Column::WorkId.eq(work_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    /// Users who voted for `work_id`, earliest vote first.
    pub async fn voters_for_work(&self, work_id: i32) -> AppResult<Vec<UserModel>> {
        let rows = Vote::find()
            .filter(vote::Column::WorkId.eq(work_id))
            .order_by_asc(vote::Column::Id)
            .find_also_related(User)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().filter_map(|(_, user)| user).collect())
    }

    /// Works `user_id` voted for, earliest vote first.
    pub async fn works_voted_by(&self, user_id: i32) -> AppResult<Vec<WorkModel>> {
        let rows = Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .order_by_asc(vote::Column::Id)
            .find_also_related(Work)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().filter_map(|(_, work)| work).collect())
    }
}
