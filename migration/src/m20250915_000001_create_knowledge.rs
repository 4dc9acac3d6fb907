use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum AiQuestions {
    Table,
    Id,
    UserId,
    Question,
    Answer,
    IsQuranic,
    CreatedAt,
}

#[derive(DeriveIden)]
enum QuranVerses {
    Table,
    Id,
    SurahName,
    SurahNumber,
    VerseNumber,
    VerseArabic,
    Translation,
    Topic,
    IsActive,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AiQuestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AiQuestions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AiQuestions::UserId).big_integer().null())
                    .col(ColumnDef::new(AiQuestions::Question).text().not_null())
                    .col(ColumnDef::new(AiQuestions::Answer).text().null())
                    .col(
                        ColumnDef::new(AiQuestions::IsQuranic)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AiQuestions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_questions_user")
                            .from(AiQuestions::Table, AiQuestions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuranVerses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuranVerses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuranVerses::SurahName).string_len(100).not_null())
                    .col(ColumnDef::new(QuranVerses::SurahNumber).integer().not_null())
                    .col(ColumnDef::new(QuranVerses::VerseNumber).integer().not_null())
                    .col(ColumnDef::new(QuranVerses::VerseArabic).text().not_null())
                    .col(ColumnDef::new(QuranVerses::Translation).text().null())
                    .col(ColumnDef::new(QuranVerses::Topic).string_len(100).null())
                    .col(
                        ColumnDef::new(QuranVerses::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QuranVerses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AiQuestions::Table).to_owned())
            .await?;
        Ok(())
    }
}
