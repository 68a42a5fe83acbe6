use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{vote, work, Vote, Work, WorkModel},
    services::validation::{self, WorkDraft, TAKEN},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use std::collections::BTreeMap;

/// Fields accepted when creating a work.
#[derive(Debug, Clone, Default)]
pub struct NewWork {
    pub title: String,
    pub category: String,
    pub creator: Option<String>,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
}

/// A partial edit. `None` leaves the stored value alone; for nullable fields
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct WorkChanges {
    pub title: Option<String>,
    pub category: Option<String>,
    pub creator: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub publication_year: Option<Option<i32>>,
}

impl WorkChanges {
    fn apply(self, mut draft: WorkDraft) -> WorkDraft {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(creator) = self.creator {
            draft.creator = optional_text(creator);
        }
        if let Some(description) = self.description {
            draft.description = optional_text(description);
        }
        if let Some(year) = self.publication_year {
            draft.publication_year = year;
        }
        draft
    }
}

impl From<NewWork> for WorkDraft {
    fn from(new: NewWork) -> Self {
        Self {
            title: new.title,
            category: new.category,
            creator: optional_text(new.creator),
            description: optional_text(new.description),
            publication_year: new.publication_year,
        }
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Store-level rejections read the same as the pre-checks: a unique violation on
/// `works.title` becomes the `taken` field error, and a row that vanished before the write
/// becomes `NotFound`.
fn write_error(err: DbErr) -> AppError {
    if matches!(err, DbErr::RecordNotUpdated) {
        return AppError::NotFound;
    }
    let err = AppError::from(err);
    if err.is_unique_violation() {
        tracing::warn!("Title uniqueness enforced by store after pre-check passed");
        AppError::Validation(FieldErrors::single("title", TAKEN))
    } else {
        err
    }
}

pub struct WorkCatalog {
    db: DatabaseConnection,
}

impl WorkCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All works in insertion order.
    pub async fn list(&self) -> AppResult<Vec<WorkModel>> {
        let works = Work::find()
            .order_by_asc(work::Column::Id)
            .all(&self.db)
            .await?;
        Ok(works)
    }

    /// Works grouped by category tag, each group in insertion order.
    pub async fn list_by_category(&self) -> AppResult<BTreeMap<String, Vec<WorkModel>>> {
        let mut groups: BTreeMap<String, Vec<WorkModel>> = BTreeMap::new();
        for work in self.list().await? {
            groups.entry(work.category.clone()).or_default().push(work);
        }
        Ok(groups)
    }

    pub async fn get(&self, id: i32) -> AppResult<WorkModel> {
        Work::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, fields: NewWork) -> AppResult<WorkModel> {
        let draft = WorkDraft::from(fields);
        validation::validate_work(&self.db, &draft, None)
            .await?
            .into_result()?;

        let now = chrono::Utc::now().naive_utc();
        let new_work = work::ActiveModel {
            title: sea_orm::ActiveValue::Set(draft.title),
            category: sea_orm::ActiveValue::Set(draft.category),
            creator: sea_orm::ActiveValue::Set(draft.creator),
            description: sea_orm::ActiveValue::Set(draft.description),
            publication_year: sea_orm::ActiveValue::Set(draft.publication_year),
            vote_count: sea_orm::ActiveValue::Set(0),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let work = new_work.insert(&self.db).await.map_err(write_error)?;
        tracing::info!(work_id = work.id, category = %work.category, "Work created");
        Ok(work)
    }

    pub async fn update(&self, id: i32, changes: WorkChanges) -> AppResult<WorkModel> {
        let txn = self.db.begin().await?;

        let existing = Work::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;
        let draft = changes.apply(WorkDraft::from(&existing));
        validation::validate_work(&txn, &draft, Some(id))
            .await?
            .into_result()?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: work::ActiveModel = existing.into();
        active.title = sea_orm::ActiveValue::Set(draft.title);
        active.category = sea_orm::ActiveValue::Set(draft.category);
        active.creator = sea_orm::ActiveValue::Set(draft.creator);
        active.description = sea_orm::ActiveValue::Set(draft.description);
        active.publication_year = sea_orm::ActiveValue::Set(draft.publication_year);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&txn).await.map_err(write_error)?;
        txn.commit().await?;

        tracing::info!(work_id = updated.id, "Work updated");
        Ok(updated)
    }

    /// Remove a work together with every vote cast for it. Returns the removed record.
    pub async fn destroy(&self, id: i32) -> AppResult<WorkModel> {
        let txn = self.db.begin().await?;

        let existing = Work::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let removed_votes = Vote::delete_many()
            .filter(vote::Column::WorkId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        Work::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(work_id = id, removed_votes, "Work destroyed");
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanished_row_on_write_is_not_found() {
        assert!(matches!(
            write_error(DbErr::RecordNotUpdated),
            AppError::NotFound
        ));
    }

    #[test]
    fn other_write_errors_pass_through() {
        assert!(matches!(
            write_error(DbErr::Custom("disk full".to_string())),
            AppError::Database(_)
        ));
    }

    #[test]
    fn changes_only_touch_given_fields() {
        let base = WorkDraft {
            title: "Alien".to_string(),
            category: "movie".to_string(),
            creator: Some("Ridley Scott".to_string()),
            description: Some("old".to_string()),
            publication_year: Some(1979),
        };
        let changes = WorkChanges {
            publication_year: Some(Some(2000)),
            description: Some(Some("this is a new description!".to_string())),
            ..Default::default()
        };
        let merged = changes.apply(base.clone());
        assert_eq!(merged.title, base.title);
        assert_eq!(merged.category, base.category);
        assert_eq!(merged.creator, base.creator);
        assert_eq!(merged.publication_year, Some(2000));
        assert_eq!(
            merged.description.as_deref(),
            Some("this is a new description!")
        );
    }

    #[test]
    fn explicit_none_clears_nullable_fields() {
        let base = WorkDraft {
            title: "Alien".to_string(),
            category: "movie".to_string(),
            creator: Some("Ridley Scott".to_string()),
            description: None,
            publication_year: Some(1979),
        };
        let merged = WorkChanges {
            creator: Some(Some("  ".to_string())),
            publication_year: Some(None),
            ..Default::default()
        }
        .apply(base);
        assert_eq!(merged.creator, None);
        assert_eq!(merged.publication_year, None);
    }

    #[test]
    fn new_work_drops_blank_optional_text() {
        let draft = WorkDraft::from(NewWork {
            title: "Dune".to_string(),
            category: "book".to_string(),
            creator: Some(String::new()),
            description: Some("desert planet".to_string()),
            publication_year: None,
        });
        assert_eq!(draft.creator, None);
        assert_eq!(draft.description.as_deref(), Some("desert planet"));
    }
}
