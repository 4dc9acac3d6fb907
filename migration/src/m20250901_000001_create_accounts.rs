use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Phone,
    Landline,
    Gender,
    UserType,
    IsVerified,
    VerifiedAt,
    VerifiedBy,
    VerificationNotes,
    StudentId,
    EntranceYear,
    Degree,
    FieldOfStudy,
    AcademicRank,
    Specialization,
    TeachingExperience,
    ProfessorCode,
    OfficeHours,
    Website,
    EmployeeId,
    Department,
    Position,
    OfficePhone,
    Responsibility,
    Province,
    City,
    University,
    Faculty,
    Address,
    Role,
    IsActive,
    CreatedAt,
    LastLogin,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Title,
    Message,
    IsRead,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PasswordResetTokens {
    Table,
    Id,
    UserId,
    Token,
    ExpiresAt,
    Used,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string_len(80).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(120).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(200).not_null())
                    .col(ColumnDef::new(Users::FirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(50).not_null())
                    .col(ColumnDef::new(Users::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Users::Landline).string_len(20).null())
                    .col(ColumnDef::new(Users::Gender).string_len(10).not_null())
                    .col(
                        ColumnDef::new(Users::UserType)
                            .string_len(20)
                            .not_null()
                            .default("student"),
                    )
                    .col(
                        ColumnDef::new(Users::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::VerifiedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::VerifiedBy).big_integer().null())
                    .col(ColumnDef::new(Users::VerificationNotes).text().null())
                    .col(ColumnDef::new(Users::StudentId).string_len(50).null())
                    .col(ColumnDef::new(Users::EntranceYear).string_len(4).null())
                    .col(ColumnDef::new(Users::Degree).string_len(100).null())
                    .col(ColumnDef::new(Users::FieldOfStudy).string_len(150).null())
                    .col(ColumnDef::new(Users::AcademicRank).string_len(100).null())
                    .col(ColumnDef::new(Users::Specialization).string_len(200).null())
                    .col(ColumnDef::new(Users::TeachingExperience).integer().null())
                    .col(ColumnDef::new(Users::ProfessorCode).string_len(50).null())
                    .col(ColumnDef::new(Users::OfficeHours).string_len(200).null())
                    .col(ColumnDef::new(Users::Website).string_len(200).null())
                    .col(ColumnDef::new(Users::EmployeeId).string_len(50).null())
                    .col(ColumnDef::new(Users::Department).string_len(100).null())
                    .col(ColumnDef::new(Users::Position).string_len(100).null())
                    .col(ColumnDef::new(Users::OfficePhone).string_len(20).null())
                    .col(ColumnDef::new(Users::Responsibility).text().null())
                    .col(ColumnDef::new(Users::Province).string_len(100).not_null())
                    .col(ColumnDef::new(Users::City).string_len(100).not_null())
                    .col(ColumnDef::new(Users::University).string_len(150).not_null())
                    .col(ColumnDef::new(Users::Faculty).string_len(150).not_null())
                    .col(ColumnDef::new(Users::Address).text().null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(20)
                            .not_null()
                            .default("participant"),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Users::LastLogin).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_verified_by")
                            .from(Users::Table, Users::VerifiedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_users_username")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Notifications::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_user")
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PasswordResetTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PasswordResetTokens::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PasswordResetTokens::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordResetTokens::Token)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordResetTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordResetTokens::Used)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PasswordResetTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_password_reset_tokens_user")
                            .from(PasswordResetTokens::Table, PasswordResetTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_password_reset_tokens_token")
                    .table(PasswordResetTokens::Table)
                    .col(PasswordResetTokens::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PasswordResetTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
