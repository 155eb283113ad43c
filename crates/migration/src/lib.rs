pub use sea_orm_migration::prelude::*;

mod m20251201_000001_org_core;
mod m20251201_100000_tickets_and_users;

pub struct Migrator;
#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251201_000001_org_core::Migration),
            Box::new(m20251201_100000_tickets_and_users::Migration),
        ]
    }
}
