use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Employee {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum AppUser {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    AvatarUrl,
    Role,
    EmployeeId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Ticket {
    Table,
    Id,
    Title,
    Description,
    Kind,
    Status,
    AssigneeId,
    CreatedBy,
    Metadata,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppUser::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AppUser::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AppUser::Email).string_len(320).not_null())
                    .col(ColumnDef::new(AppUser::FirstName).string_len(128))
                    .col(ColumnDef::new(AppUser::LastName).string_len(128))
                    .col(ColumnDef::new(AppUser::AvatarUrl).string_len(512))
                    .col(
                        ColumnDef::new(AppUser::Role)
                            .string_len(16)
                            .not_null()
                            .default("STAFF"),
                    )
                    .col(ColumnDef::new(AppUser::EmployeeId).integer())
                    .col(
                        ColumnDef::new(AppUser::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AppUser::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AppUser::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_app_user_employee")
                            .from(AppUser::Table, AppUser::EmployeeId)
                            .to(Employee::Table, Employee::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_app_user_email")
                    .table(AppUser::Table)
                    .col(AppUser::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ticket::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ticket::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Ticket::Description).text())
                    .col(ColumnDef::new(Ticket::Kind).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Ticket::Status)
                            .string_len(16)
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(Ticket::AssigneeId).integer())
                    .col(ColumnDef::new(Ticket::CreatedBy).uuid())
                    .col(ColumnDef::new(Ticket::Metadata).json_binary())
                    .col(
                        ColumnDef::new(Ticket::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Ticket::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_assignee")
                            .from(Ticket::Table, Ticket::AssigneeId)
                            .to(Employee::Table, Employee::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_created_by")
                            .from(Ticket::Table, Ticket::CreatedBy)
                            .to(AppUser::Table, AppUser::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ticket_kind_status")
                    .table(Ticket::Table)
                    .col(Ticket::Kind)
                    .col(Ticket::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ticket::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AppUser::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
