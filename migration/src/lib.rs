pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_accounts;
mod m20250901_000002_create_events;
mod m20250908_000001_create_circles;
mod m20250915_000001_create_knowledge;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_accounts::Migration),
            Box::new(m20250901_000002_create_events::Migration),
            Box::new(m20250908_000001_create_circles::Migration),
            Box::new(m20250915_000001_create_knowledge::Migration),
        ]
    }
}
