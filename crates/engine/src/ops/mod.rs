use sea_orm::{ConnectionTrait, DatabaseConnection, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, BudgetCategory, EngineError, Income, ResultEngine, budgets, categories, incomes,
    locks::AggregateLocks, users,
};

mod budget;
mod categories_ops;
mod goals_ops;
mod profile;
mod transactions_ops;

pub use budget::{MonthSummary, SetupStatus};
pub use categories_ops::{CategoryStatistics, CategoryUsage, TransferOutcome};
pub use goals_ops::{GoalStatistics, GoalTransactionOutcome};
pub use transactions_ops::{TransactionListFilter, TransactionPager};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    locks: AggregateLocks,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Active budget of `user_id`, if any.
    async fn find_budget<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<Option<budgets::Model>> {
        Ok(budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .filter(budgets::Column::IsActive.eq(true))
            .one(db)
            .await?)
    }

    async fn require_budget<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<budgets::Model> {
        self.find_budget(db, user_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))
    }

    async fn active_incomes<C: ConnectionTrait>(
        &self,
        db: &C,
        budget_id: &str,
    ) -> ResultEngine<Vec<Income>> {
        incomes::Entity::find()
            .filter(incomes::Column::BudgetId.eq(budget_id))
            .filter(incomes::Column::IsActive.eq(true))
            .order_by_asc(incomes::Column::CreatedAt)
            .order_by_asc(incomes::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(Income::try_from)
            .collect()
    }

    /// Assemble the domain `Budget` with its active incomes.
    async fn budget_snapshot<C: ConnectionTrait>(
        &self,
        db: &C,
        model: budgets::Model,
    ) -> ResultEngine<Budget> {
        let incomes = self.active_incomes(db, &model.id).await?;
        Budget::try_from((model, incomes))
    }

    async fn active_categories<C: ConnectionTrait>(
        &self,
        db: &C,
        budget_id: &str,
    ) -> ResultEngine<Vec<BudgetCategory>> {
        categories::Entity::find()
            .filter(categories::Column::BudgetId.eq(budget_id))
            .filter(categories::Column::IsActive.eq(true))
            .order_by_asc(categories::Column::CreatedAt)
            .order_by_asc(categories::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(BudgetCategory::try_from)
            .collect()
    }

    /// Category `category_id` if it is active and belongs to the budget of
    /// `user_id`. Foreign categories are reported as missing.
    async fn require_category<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<BudgetCategory> {
        let not_found = || EngineError::KeyNotFound("category not exists".to_string());
        let budget = self.find_budget(db, user_id).await?.ok_or_else(not_found)?;
        let model = categories::Entity::find_by_id(category_id.to_string())
            .filter(categories::Column::BudgetId.eq(budget.id))
            .filter(categories::Column::IsActive.eq(true))
            .one(db)
            .await?
            .ok_or_else(not_found)?;
        BudgetCategory::try_from(model)
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            locks: AggregateLocks::default(),
        })
    }
}
