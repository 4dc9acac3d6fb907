use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum QuranCircles {
    Table,
    Id,
    Name,
    Description,
    TeacherName,
    TeacherBio,
    CircleType,
    Level,
    DaysOfWeek,
    StartTime,
    EndTime,
    Location,
    IsOnline,
    OnlineLink,
    Capacity,
    CurrentMembers,
    IsActive,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CircleMembers {
    Table,
    Id,
    CircleId,
    UserId,
    JoinedDate,
    IsActive,
    Role,
    Notes,
}

#[derive(DeriveIden)]
enum CircleSessions {
    Table,
    Id,
    CircleId,
    Title,
    SessionDate,
    StartTime,
    EndTime,
    Topic,
    Description,
    VersesReviewed,
    Notes,
    Homework,
    IsHeld,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SessionAttendances {
    Table,
    Id,
    SessionId,
    MemberId,
    Attended,
    Excuse,
    LateMinutes,
    MarkedBy,
    MarkedAt,
}

#[derive(DeriveIden)]
enum CircleFiles {
    Table,
    Id,
    CircleId,
    Title,
    Description,
    FilePath,
    FileType,
    FileSize,
    UploadedBy,
    UploadedAt,
    IsPublic,
    DownloadCount,
}

#[derive(DeriveIden)]
enum SessionFiles {
    Table,
    Id,
    SessionId,
    Title,
    Description,
    FilePath,
    FileType,
    FileSize,
    UploadedBy,
    UploadedAt,
    DownloadCount,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(QuranCircles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuranCircles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuranCircles::Name).string_len(200).not_null())
                    .col(ColumnDef::new(QuranCircles::Description).text().null())
                    .col(
                        ColumnDef::new(QuranCircles::TeacherName)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(QuranCircles::TeacherBio).text().null())
                    .col(
                        ColumnDef::new(QuranCircles::CircleType)
                            .string_len(50)
                            .not_null()
                            .default("general"),
                    )
                    .col(
                        ColumnDef::new(QuranCircles::Level)
                            .string_len(50)
                            .not_null()
                            .default("beginner"),
                    )
                    .col(ColumnDef::new(QuranCircles::DaysOfWeek).string_len(200).null())
                    .col(ColumnDef::new(QuranCircles::StartTime).string_len(10).null())
                    .col(ColumnDef::new(QuranCircles::EndTime).string_len(10).null())
                    .col(ColumnDef::new(QuranCircles::Location).string_len(200).null())
                    .col(
                        ColumnDef::new(QuranCircles::IsOnline)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(QuranCircles::OnlineLink).string_len(500).null())
                    .col(ColumnDef::new(QuranCircles::Capacity).integer().null())
                    .col(
                        ColumnDef::new(QuranCircles::CurrentMembers)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(QuranCircles::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(QuranCircles::CreatedBy).big_integer().null())
                    .col(
                        ColumnDef::new(QuranCircles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quran_circles_created_by")
                            .from(QuranCircles::Table, QuranCircles::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CircleMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CircleMembers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CircleMembers::CircleId).big_integer().not_null())
                    .col(ColumnDef::new(CircleMembers::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(CircleMembers::JoinedDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CircleMembers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(CircleMembers::Role)
                            .string_len(50)
                            .not_null()
                            .default("member"),
                    )
                    .col(ColumnDef::new(CircleMembers::Notes).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_circle_members_circle")
                            .from(CircleMembers::Table, CircleMembers::CircleId)
                            .to(QuranCircles::Table, QuranCircles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_circle_members_user")
                            .from(CircleMembers::Table, CircleMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_circle_member")
                    .table(CircleMembers::Table)
                    .col(CircleMembers::CircleId)
                    .col(CircleMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CircleSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CircleSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CircleSessions::CircleId).big_integer().not_null())
                    .col(ColumnDef::new(CircleSessions::Title).string_len(200).null())
                    .col(ColumnDef::new(CircleSessions::SessionDate).date().not_null())
                    .col(ColumnDef::new(CircleSessions::StartTime).string_len(10).null())
                    .col(ColumnDef::new(CircleSessions::EndTime).string_len(10).null())
                    .col(ColumnDef::new(CircleSessions::Topic).string_len(500).null())
                    .col(ColumnDef::new(CircleSessions::Description).text().null())
                    .col(ColumnDef::new(CircleSessions::VersesReviewed).text().null())
                    .col(ColumnDef::new(CircleSessions::Notes).text().null())
                    .col(ColumnDef::new(CircleSessions::Homework).text().null())
                    .col(
                        ColumnDef::new(CircleSessions::IsHeld)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CircleSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_circle_sessions_circle")
                            .from(CircleSessions::Table, CircleSessions::CircleId)
                            .to(QuranCircles::Table, QuranCircles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SessionAttendances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionAttendances::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SessionAttendances::SessionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SessionAttendances::MemberId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SessionAttendances::Attended)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(SessionAttendances::Excuse).string_len(200).null())
                    .col(
                        ColumnDef::new(SessionAttendances::LateMinutes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SessionAttendances::MarkedBy).big_integer().null())
                    .col(
                        ColumnDef::new(SessionAttendances::MarkedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_attendances_session")
                            .from(SessionAttendances::Table, SessionAttendances::SessionId)
                            .to(CircleSessions::Table, CircleSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_attendances_member")
                            .from(SessionAttendances::Table, SessionAttendances::MemberId)
                            .to(CircleMembers::Table, CircleMembers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_attendances_marked_by")
                            .from(SessionAttendances::Table, SessionAttendances::MarkedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_attendance")
                    .table(SessionAttendances::Table)
                    .col(SessionAttendances::SessionId)
                    .col(SessionAttendances::MemberId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CircleFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CircleFiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CircleFiles::CircleId).big_integer().not_null())
                    .col(ColumnDef::new(CircleFiles::Title).string_len(200).not_null())
                    .col(ColumnDef::new(CircleFiles::Description).text().null())
                    .col(ColumnDef::new(CircleFiles::FilePath).string_len(500).not_null())
                    .col(ColumnDef::new(CircleFiles::FileType).string_len(50).null())
                    .col(ColumnDef::new(CircleFiles::FileSize).big_integer().null())
                    .col(ColumnDef::new(CircleFiles::UploadedBy).big_integer().null())
                    .col(
                        ColumnDef::new(CircleFiles::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CircleFiles::IsPublic)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(CircleFiles::DownloadCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_circle_files_circle")
                            .from(CircleFiles::Table, CircleFiles::CircleId)
                            .to(QuranCircles::Table, QuranCircles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_circle_files_uploaded_by")
                            .from(CircleFiles::Table, CircleFiles::UploadedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SessionFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionFiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SessionFiles::SessionId).big_integer().not_null())
                    .col(ColumnDef::new(SessionFiles::Title).string_len(200).not_null())
                    .col(ColumnDef::new(SessionFiles::Description).text().null())
                    .col(ColumnDef::new(SessionFiles::FilePath).string_len(500).not_null())
                    .col(ColumnDef::new(SessionFiles::FileType).string_len(50).null())
                    .col(ColumnDef::new(SessionFiles::FileSize).big_integer().null())
                    .col(ColumnDef::new(SessionFiles::UploadedBy).big_integer().null())
                    .col(
                        ColumnDef::new(SessionFiles::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SessionFiles::DownloadCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_files_session")
                            .from(SessionFiles::Table, SessionFiles::SessionId)
                            .to(CircleSessions::Table, CircleSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_files_uploaded_by")
                            .from(SessionFiles::Table, SessionFiles::UploadedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SessionFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CircleFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SessionAttendances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CircleSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CircleMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuranCircles::Table).to_owned())
            .await?;
        Ok(())
    }
}
