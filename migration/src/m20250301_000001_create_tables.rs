use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
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
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建团队表
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teams::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Teams::TeamNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Teams::ProjectTitle).string().not_null())
                    .col(ColumnDef::new(Teams::ProjectCategory).string().not_null())
                    .col(ColumnDef::new(Teams::Batch).string().not_null())
                    .col(ColumnDef::new(Teams::Status).string().not_null())
                    .col(ColumnDef::new(Teams::MentorId).big_integer().null())
                    .col(ColumnDef::new(Teams::LeadId).big_integer().not_null())
                    .col(ColumnDef::new(Teams::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Teams::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Teams::Table, Teams::MentorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Teams::Table, Teams::LeadId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建团队成员表
        manager
            .create_table(
                Table::create()
                    .table(TeamMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeamMembers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TeamMembers::TeamId).big_integer().not_null())
                    .col(ColumnDef::new(TeamMembers::UserId).big_integer().null())
                    .col(ColumnDef::new(TeamMembers::Name).string().not_null())
                    .col(ColumnDef::new(TeamMembers::Email).string().not_null())
                    .col(ColumnDef::new(TeamMembers::Role).string().not_null())
                    .col(ColumnDef::new(TeamMembers::RollNumber).string().null())
                    .col(ColumnDef::new(TeamMembers::Position).integer().not_null())
                    .col(ColumnDef::new(TeamMembers::RemovedAt).big_integer().null())
                    .col(
                        ColumnDef::new(TeamMembers::JoinedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeamMembers::Table, TeamMembers::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeamMembers::Table, TeamMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建团队评分表（每个团队至多一条）
        manager
            .create_table(
                Table::create()
                    .table(Evaluations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Evaluations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::TeamId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Evaluations::MentorId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Evaluations::PosterHalves)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Evaluations::VideoHalves).integer().not_null())
                    .col(
                        ColumnDef::new(Evaluations::ReportHalves)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Evaluations::PptHalves).integer().not_null())
                    .col(
                        ColumnDef::new(Evaluations::GroupScoreHalves)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Evaluations::Status).string().not_null())
                    .col(
                        ColumnDef::new(Evaluations::ExternalEvaluatorName)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::ExternalEvaluatorEmail)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(Evaluations::Remarks).text().null())
                    .col(
                        ColumnDef::new(Evaluations::EvaluatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Evaluations::Table, Evaluations::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Evaluations::Table, Evaluations::MentorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建成员个人评分表
        manager
            .create_table(
                Table::create()
                    .table(IndividualEvaluations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IndividualEvaluations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IndividualEvaluations::EvaluationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndividualEvaluations::TeamMemberId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndividualEvaluations::MemberName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndividualEvaluations::MemberEmail)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndividualEvaluations::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndividualEvaluations::IndividualScoreHalves)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndividualEvaluations::LearningContributionHalves)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndividualEvaluations::PresentationSkillHalves)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndividualEvaluations::ContributionToProjectHalves)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndividualEvaluations::ExternalEvaluatorHalves)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndividualEvaluations::TotalHalves)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                IndividualEvaluations::Table,
                                IndividualEvaluations::EvaluationId,
                            )
                            .to(Evaluations::Table, Evaluations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                IndividualEvaluations::Table,
                                IndividualEvaluations::TeamMemberId,
                            )
                            .to(TeamMembers::Table, TeamMembers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建项目提案表
        manager
            .create_table(
                Table::create()
                    .table(Proposals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Proposals::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Proposals::TeamId).big_integer().not_null())
                    .col(ColumnDef::new(Proposals::AuthorId).big_integer().not_null())
                    .col(ColumnDef::new(Proposals::Title).string().not_null())
                    .col(ColumnDef::new(Proposals::Description).text().not_null())
                    .col(ColumnDef::new(Proposals::Content).text().null())
                    .col(ColumnDef::new(Proposals::Attachment).text().not_null())
                    .col(
                        ColumnDef::new(Proposals::PosterAttachment)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Proposals::PptAttachment).text().not_null())
                    .col(ColumnDef::new(Proposals::Link).text().null())
                    .col(ColumnDef::new(Proposals::State).string().not_null())
                    .col(ColumnDef::new(Proposals::Remarks).text().null())
                    .col(ColumnDef::new(Proposals::ReviewedAt).big_integer().null())
                    .col(ColumnDef::new(Proposals::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Proposals::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Proposals::Table, Proposals::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Proposals::Table, Proposals::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建文件表
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Files::StoredName)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Files::OriginalName).string().not_null())
                    .col(ColumnDef::new(Files::FileSize).big_integer().not_null())
                    .col(ColumnDef::new(Files::FileType).string().not_null())
                    .col(ColumnDef::new(Files::UploadedAt).big_integer().not_null())
                    .col(ColumnDef::new(Files::UserId).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Files::Table, Files::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_mentor_id")
                    .table(Teams::Table)
                    .col(Teams::MentorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_team_id")
                    .table(TeamMembers::Table)
                    .col(TeamMembers::TeamId)
                    .to_owned(),
            )
            .await?;

        // 同一评分下每个成员只能有一条个人评分
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_individual_evaluations_member")
                    .table(IndividualEvaluations::Table)
                    .col(IndividualEvaluations::EvaluationId)
                    .col(IndividualEvaluations::TeamMemberId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_proposals_team_id")
                    .table(Proposals::Table)
                    .col(Proposals::TeamId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Proposals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IndividualEvaluations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Evaluations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Role,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    TeamNumber,
    ProjectTitle,
    ProjectCategory,
    Batch,
    Status,
    MentorId,
    LeadId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeamMembers {
    Table,
    Id,
    TeamId,
    UserId,
    Name,
    Email,
    Role,
    RollNumber,
    Position,
    RemovedAt,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Evaluations {
    Table,
    Id,
    TeamId,
    MentorId,
    PosterHalves,
    VideoHalves,
    ReportHalves,
    PptHalves,
    GroupScoreHalves,
    Status,
    ExternalEvaluatorName,
    ExternalEvaluatorEmail,
    Remarks,
    EvaluatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum IndividualEvaluations {
    Table,
    Id,
    EvaluationId,
    TeamMemberId,
    MemberName,
    MemberEmail,
    Position,
    IndividualScoreHalves,
    LearningContributionHalves,
    PresentationSkillHalves,
    ContributionToProjectHalves,
    ExternalEvaluatorHalves,
    TotalHalves,
}

#[derive(DeriveIden)]
enum Proposals {
    Table,
    Id,
    TeamId,
    AuthorId,
    Title,
    Description,
    Content,
    Attachment,
    PosterAttachment,
    PptAttachment,
    Link,
    State,
    Remarks,
    ReviewedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Files {
    Table,
    StoredName,
    OriginalName,
    FileSize,
    FileType,
    UploadedAt,
    UserId,
}
