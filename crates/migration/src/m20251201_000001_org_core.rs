use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Department {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Employee {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    Position,
    DepartmentId,
    ManagerId,
    Status,
    AvatarUrl,
    HireDate,
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
                    .table(Department::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Department::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Department::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Department::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // manager_id may form cycles; the org chart builder cuts them on read.
        manager
            .create_table(
                Table::create()
                    .table(Employee::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employee::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employee::FirstName).string_len(128).not_null())
                    .col(ColumnDef::new(Employee::LastName).string_len(128).not_null())
                    .col(ColumnDef::new(Employee::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Employee::Phone).string_len(64))
                    .col(ColumnDef::new(Employee::Position).string_len(128))
                    .col(ColumnDef::new(Employee::DepartmentId).integer())
                    .col(ColumnDef::new(Employee::ManagerId).integer())
                    .col(
                        ColumnDef::new(Employee::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Employee::AvatarUrl).string_len(512))
                    .col(ColumnDef::new(Employee::HireDate).date())
                    .col(
                        ColumnDef::new(Employee::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Employee::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_department")
                            .from(Employee::Table, Employee::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_manager")
                            .from(Employee::Table, Employee::ManagerId)
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
                    .name("idx_employee_email")
                    .table(Employee::Table)
                    .col(Employee::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_manager")
                    .table(Employee::Table)
                    .col(Employee::ManagerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_department")
                    .table(Employee::Table)
                    .col(Employee::DepartmentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Employee::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Department::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
