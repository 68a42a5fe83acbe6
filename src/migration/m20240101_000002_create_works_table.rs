use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Works {
    Table,
    Id,
    Title,
    Category,
    Creator,
    Description,
    PublicationYear,
    VoteCount,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Works::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Works::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Works::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Works::Category).string_len(32).not_null())
                    .col(ColumnDef::new(Works::Creator).string_len(255).null())
                    .col(ColumnDef::new(Works::Description).text().null())
                    .col(ColumnDef::new(Works::PublicationYear).integer().null())
                    .col(
                        ColumnDef::new(Works::VoteCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Works::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Works::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Authoritative guard for concurrent creates/renames with the same title.
        manager
            .create_index(
                Index::create()
                    .name("idx_works_title_unique")
                    .table(Works::Table)
                    .col(Works::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_works_category")
                    .table(Works::Table)
                    .col(Works::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Works::Table).to_owned())
            .await
    }
}
