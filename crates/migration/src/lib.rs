pub use sea_orm_migration::prelude::*;

mod m20260301_000001_init;
mod m20260301_000002_goals;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_init::Migration),
            Box::new(m20260301_000002_goals::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;

    use super::*;

    #[tokio::test]
    async fn migrations_apply_and_revert() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let manager = SchemaManager::new(&db);
        for table in [
            "users",
            "api_tokens",
            "budgets",
            "incomes",
            "budget_categories",
            "transactions",
            "goals",
            "goal_transactions",
        ] {
            assert!(manager.has_table(table).await.unwrap(), "{table} missing");
        }

        Migrator::down(&db, None).await.unwrap();
        assert!(!manager.has_table("budgets").await.unwrap());
    }
}
