use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetCategory, EngineError, MoneyCents, NewCategory, ResultEngine, TransferCmd, budgets,
    categories,
    util::{normalize_text, parse_uuid},
    validation::{validate_new_category, validate_transfer},
};

use super::{Engine, with_tx};

/// Balances of both categories after a transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub from_category_id: Uuid,
    pub to_category_id: Uuid,
    pub amount: MoneyCents,
    pub from_new_balance: MoneyCents,
    pub to_new_balance: MoneyCents,
}

/// How much of its allocation a category consumed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryUsage {
    pub category_id: Uuid,
    pub name: String,
    pub spent_amount: MoneyCents,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatistics {
    pub total_budgeted: MoneyCents,
    pub total_spent: MoneyCents,
    pub total_available: MoneyCents,
    pub categories_count: usize,
    pub most_used: Option<CategoryUsage>,
    pub least_used: Option<CategoryUsage>,
}

impl CategoryStatistics {
    fn from_categories(categories: &[BudgetCategory]) -> Self {
        let mut most_used: Option<CategoryUsage> = None;
        let mut least_used: Option<CategoryUsage> = None;

        for category in categories.iter().filter(|c| c.allocated_amount.is_positive()) {
            let usage = CategoryUsage {
                category_id: category.id,
                name: category.name.clone(),
                spent_amount: category.spent(),
                percentage: category.spent().percentage_of(category.allocated_amount),
            };
            if most_used
                .as_ref()
                .is_none_or(|most| usage.percentage > most.percentage)
            {
                most_used = Some(usage.clone());
            }
            if least_used
                .as_ref()
                .is_none_or(|least| usage.percentage < least.percentage)
            {
                least_used = Some(usage);
            }
        }

        Self {
            total_budgeted: categories.iter().map(|c| c.allocated_amount).sum(),
            total_spent: categories.iter().map(BudgetCategory::spent).sum(),
            total_available: categories.iter().map(|c| c.current_balance).sum(),
            categories_count: categories.len(),
            most_used,
            least_used,
        }
    }
}

impl Engine {
    /// Active categories of the user's budget, in creation order.
    ///
    /// A user without a budget has no categories.
    pub async fn categories(&self, user_id: Uuid) -> ResultEngine<Vec<BudgetCategory>> {
        with_tx!(self, |db_tx| {
            match self.find_budget(&db_tx, user_id).await? {
                Some(budget) => self.active_categories(&db_tx, &budget.id).await,
                None => Ok(Vec::new()),
            }
        })
    }

    /// Add a category after setup.
    ///
    /// The allocation must fit in the budget's headroom
    /// (`total_income - allocated_amount`); the new category starts fully
    /// funded.
    pub async fn add_category(
        &self,
        user_id: Uuid,
        category: NewCategory,
    ) -> ResultEngine<BudgetCategory> {
        validate_new_category(&category)?;
        let name = normalize_text(&category.name);
        let now = Utc::now();

        let _lock = self.locks.lock(user_id).await;
        let created = with_tx!(self, |db_tx| {
            let budget = self.require_budget(&db_tx, user_id).await?;

            let exists = categories::Entity::find()
                .filter(categories::Column::BudgetId.eq(budget.id.clone()))
                .filter(categories::Column::IsActive.eq(true))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Validation(vec![format!(
                    "category '{name}' already exists"
                )]));
            }

            let allocated = MoneyCents::new(budget.allocated_amount);
            let total_income = MoneyCents::new(budget.total_income);
            let available = total_income - allocated;
            if category.allocated_amount > available {
                return Err(EngineError::InsufficientFunds {
                    available: available.max(MoneyCents::ZERO),
                    requested: category.allocated_amount,
                });
            }

            let budget_id = parse_uuid(&budget.id, "budget")?;
            let created = BudgetCategory::new(
                budget_id,
                name.clone(),
                category.color.trim().to_string(),
                category.allocated_amount,
                now,
            );
            categories::ActiveModel::from(&created).insert(&db_tx).await?;

            let new_allocated = allocated + category.allocated_amount;
            let mut budget: budgets::ActiveModel = budget.into();
            budget.allocated_amount = ActiveValue::Set(new_allocated.cents());
            budget.available_balance = ActiveValue::Set((total_income - new_allocated).cents());
            budget.updated_at = ActiveValue::Set(now);
            budget.update(&db_tx).await?;

            Ok::<_, EngineError>(created)
        })?;

        tracing::info!(
            %user_id,
            category_id = %created.id,
            allocated = %created.allocated_amount,
            "category added"
        );
        Ok(created)
    }

    /// Move `amount` of current balance from one category to another.
    ///
    /// Both categories must belong to the user's budget. Allocations are
    /// unchanged; the sum of balances is preserved.
    pub async fn transfer_between_categories(
        &self,
        cmd: TransferCmd,
    ) -> ResultEngine<TransferOutcome> {
        validate_transfer(&cmd)?;
        let now = Utc::now();

        let _lock = self
            .locks
            .lock_many(&[cmd.from_category_id, cmd.to_category_id])
            .await;
        let outcome = with_tx!(self, |db_tx| {
            let from = self
                .require_category(&db_tx, cmd.user_id, cmd.from_category_id)
                .await?;
            let to = self
                .require_category(&db_tx, cmd.user_id, cmd.to_category_id)
                .await?;

            let from_new_balance = from.preview_debit(cmd.amount)?;
            let to_new_balance = to.preview_credit(cmd.amount)?;

            self.debit_category(&db_tx, from.id, cmd.amount, now).await?;
            self.credit_category(&db_tx, to.id, cmd.amount, None, now)
                .await?;

            Ok::<_, EngineError>(TransferOutcome {
                from_category_id: from.id,
                to_category_id: to.id,
                amount: cmd.amount,
                from_new_balance,
                to_new_balance,
            })
        })?;

        tracing::info!(
            user_id = %cmd.user_id,
            from = %outcome.from_category_id,
            to = %outcome.to_category_id,
            amount = %outcome.amount,
            description = %normalize_text(&cmd.description),
            "transfer between categories"
        );
        Ok(outcome)
    }

    /// Budgeted, spent and available totals over the active categories.
    pub async fn category_statistics(&self, user_id: Uuid) -> ResultEngine<CategoryStatistics> {
        let categories = self.categories(user_id).await?;
        Ok(CategoryStatistics::from_categories(&categories))
    }

    /// Subtract `amount` from a category balance. The row is only updated
    /// when the stored balance still covers `amount`.
    pub(super) async fn debit_category<C: ConnectionTrait>(
        &self,
        db: &C,
        category_id: Uuid,
        amount: MoneyCents,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let result = categories::Entity::update_many()
            .col_expr(
                categories::Column::CurrentBalance,
                Expr::col(categories::Column::CurrentBalance).sub(amount.cents()),
            )
            .col_expr(categories::Column::UpdatedAt, Expr::value(now))
            .filter(categories::Column::Id.eq(category_id.to_string()))
            .filter(categories::Column::CurrentBalance.gte(amount.cents()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Conflict(
                "category balance changed concurrently".to_string(),
            ));
        }
        Ok(())
    }

    /// Add `amount` to a category balance. With `ceiling`, the row is only
    /// updated when the new balance stays at or below it.
    pub(super) async fn credit_category<C: ConnectionTrait>(
        &self,
        db: &C,
        category_id: Uuid,
        amount: MoneyCents,
        ceiling: Option<MoneyCents>,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let mut update = categories::Entity::update_many()
            .col_expr(
                categories::Column::CurrentBalance,
                Expr::col(categories::Column::CurrentBalance).add(amount.cents()),
            )
            .col_expr(categories::Column::UpdatedAt, Expr::value(now))
            .filter(categories::Column::Id.eq(category_id.to_string()));
        if let Some(ceiling) = ceiling {
            update = update
                .filter(categories::Column::CurrentBalance.lte((ceiling - amount).cents()));
        }
        let result = update.exec(db).await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Conflict(
                "category balance changed concurrently".to_string(),
            ));
        }
        Ok(())
    }
}
