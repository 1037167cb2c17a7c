use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Budget, BudgetCategory, EngineError, Income, MoneyCents, NewIncome, ResultEngine,
    SetupBudgetCmd, TransactionKind, budgets, categories, incomes, transactions, users,
    util::{normalize_text, parse_uuid},
    validation::{validate_income, validate_setup},
};

use super::{Engine, with_tx};

const DEFAULT_BUDGET_NAME: &str = "Monthly budget";

/// Onboarding state of a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupStatus {
    pub has_budget: bool,
    pub budget_id: Option<Uuid>,
    pub setup_completed: bool,
}

/// Expense totals of one calendar month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: NaiveDate,
    pub total_expenses: MoneyCents,
    pub transaction_count: u64,
    /// `total_expenses` over the budget's total income, in percent.
    pub budget_usage_percentage: f64,
}

/// `[first day of month, first day of next month)` containing `day`.
fn month_bounds(day: NaiveDate) -> ResultEngine<(NaiveDate, NaiveDate)> {
    let start = day
        .with_day(1)
        .ok_or_else(|| EngineError::invalid("invalid month"))?;
    let end = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    }
    .ok_or_else(|| EngineError::invalid("invalid month"))?;
    Ok((start, end))
}

impl Engine {
    /// Create the user's budget with its incomes and categories in one unit.
    ///
    /// Totals are derived from the request: `total_income` is the sum of the
    /// incomes, `allocated_amount` the sum of the category allocations and
    /// every category starts with `current_balance == allocated_amount`.
    /// On success the user is marked as onboarded.
    pub async fn setup_budget(&self, cmd: SetupBudgetCmd) -> ResultEngine<Budget> {
        validate_setup(&cmd)?;
        let user_id = cmd.user_id;
        let now = Utc::now();

        let _lock = self.locks.lock(user_id).await;
        let budget = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            if self.find_budget(&db_tx, user_id).await?.is_some() {
                return Err(EngineError::InvalidState(
                    "user already has an active budget".to_string(),
                ));
            }

            let budget_id = Uuid::new_v4();
            let incomes: Vec<Income> = cmd
                .incomes
                .iter()
                .map(|income| {
                    Income::new(
                        budget_id,
                        normalize_text(&income.description),
                        income.amount,
                        income.receive_day,
                        now,
                    )
                })
                .collect();
            let categories: Vec<BudgetCategory> = cmd
                .categories
                .iter()
                .map(|category| {
                    BudgetCategory::new(
                        budget_id,
                        normalize_text(&category.name),
                        category.color.trim().to_string(),
                        category.allocated_amount,
                        now,
                    )
                })
                .collect();

            let total_income: MoneyCents = incomes.iter().map(|income| income.amount).sum();
            let allocated_amount: MoneyCents = categories
                .iter()
                .map(|category| category.allocated_amount)
                .sum();

            let budget = Budget {
                id: budget_id,
                user_id,
                name: cmd
                    .name
                    .as_deref()
                    .map(normalize_text)
                    .unwrap_or_else(|| DEFAULT_BUDGET_NAME.to_string()),
                total_income,
                allocated_amount,
                available_balance: total_income - allocated_amount,
                is_active: true,
                created_at: now,
                updated_at: now,
                incomes,
            };

            budgets::ActiveModel::from(&budget).insert(&db_tx).await?;
            for income in &budget.incomes {
                incomes::ActiveModel::from(income).insert(&db_tx).await?;
            }
            for category in &categories {
                categories::ActiveModel::from(category).insert(&db_tx).await?;
            }

            users::ActiveModel {
                id: ActiveValue::Set(user_id.to_string()),
                initial_setup_completed: ActiveValue::Set(true),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok::<_, EngineError>(budget)
        })?;

        tracing::info!(
            %user_id,
            budget_id = %budget.id,
            total_income = %budget.total_income,
            allocated = %budget.allocated_amount,
            "budget configured"
        );
        Ok(budget)
    }

    /// Return the active budget of `user_id` with its active incomes.
    pub async fn budget(&self, user_id: Uuid) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget(&db_tx, user_id).await?;
            self.budget_snapshot(&db_tx, model).await
        })
    }

    /// Whether `user_id` finished onboarding.
    pub async fn setup_status(&self, user_id: Uuid) -> ResultEngine<SetupStatus> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let budget = self.find_budget(&db_tx, user_id).await?;
            let budget_id = match budget {
                Some(model) => Some(parse_uuid(&model.id, "budget")?),
                None => None,
            };
            Ok(SetupStatus {
                has_budget: budget_id.is_some(),
                budget_id,
                setup_completed: user.initial_setup_completed,
            })
        })
    }

    /// Add an income source. The new amount grows `total_income` and the
    /// allocation headroom.
    pub async fn add_income(&self, user_id: Uuid, income: NewIncome) -> ResultEngine<Budget> {
        validate_income(&income)?;
        let now = Utc::now();

        let _lock = self.locks.lock(user_id).await;
        let budget = with_tx!(self, |db_tx| {
            let model = self.require_budget(&db_tx, user_id).await?;
            let mut budget = self.budget_snapshot(&db_tx, model).await?;

            let income = Income::new(
                budget.id,
                normalize_text(&income.description),
                income.amount,
                income.receive_day,
                now,
            );
            incomes::ActiveModel::from(&income).insert(&db_tx).await?;

            budget.total_income = budget
                .total_income
                .checked_add(income.amount)
                .ok_or_else(|| EngineError::invalid("amount too large"))?;
            budget.available_balance = budget.total_income - budget.allocated_amount;
            budget.updated_at = now;
            budget.incomes.push(income);
            self.save_budget_totals(&db_tx, &budget).await?;
            Ok::<_, EngineError>(budget)
        })?;

        tracing::info!(%user_id, total_income = %budget.total_income, "income added");
        Ok(budget)
    }

    /// Deactivate an income source and shrink `total_income` accordingly.
    ///
    /// Allocations are left untouched, so the budget may end up
    /// over-allocated; see [`Budget::is_over_allocated`].
    pub async fn deactivate_income(&self, user_id: Uuid, income_id: Uuid) -> ResultEngine<Budget> {
        let now = Utc::now();

        let _lock = self.locks.lock(user_id).await;
        let budget = with_tx!(self, |db_tx| {
            let model = self.require_budget(&db_tx, user_id).await?;
            let income_model = incomes::Entity::find_by_id(income_id.to_string())
                .filter(incomes::Column::BudgetId.eq(model.id.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("income not exists".to_string()))?;
            if !income_model.is_active {
                return Err(EngineError::InvalidState(
                    "income is already inactive".to_string(),
                ));
            }
            let amount = MoneyCents::new(income_model.amount);

            let mut income: incomes::ActiveModel = income_model.into();
            income.is_active = ActiveValue::Set(false);
            income.update(&db_tx).await?;

            let mut budget = self.budget_snapshot(&db_tx, model).await?;
            budget.total_income -= amount;
            budget.available_balance = budget.total_income - budget.allocated_amount;
            budget.updated_at = now;
            self.save_budget_totals(&db_tx, &budget).await?;
            Ok::<_, EngineError>(budget)
        })?;

        if budget.is_over_allocated() {
            tracing::warn!(
                %user_id,
                total_income = %budget.total_income,
                allocated = %budget.allocated_amount,
                "budget is over-allocated after income deactivation"
            );
        } else {
            tracing::info!(%user_id, %income_id, "income deactivated");
        }
        Ok(budget)
    }

    /// Expense totals of the calendar month containing `month`.
    pub async fn month_summary(
        &self,
        user_id: Uuid,
        month: NaiveDate,
    ) -> ResultEngine<MonthSummary> {
        let (start, end) = month_bounds(month)?;
        let start_at = start.and_time(chrono::NaiveTime::MIN).and_utc();
        let end_at = end.and_time(chrono::NaiveTime::MIN).and_utc();

        with_tx!(self, |db_tx| {
            let budget = self.require_budget(&db_tx, user_id).await?;
            let expenses = transactions::Entity::find()
                .filter(transactions::Column::BudgetId.eq(budget.id.clone()))
                .filter(
                    transactions::Column::TransactionType.eq(TransactionKind::Expense.as_str()),
                )
                .filter(transactions::Column::CreatedAt.gte(start_at))
                .filter(transactions::Column::CreatedAt.lt(end_at))
                .all(&db_tx)
                .await?;

            let total_expenses: MoneyCents = expenses
                .iter()
                .map(|tx| MoneyCents::new(tx.amount))
                .sum();
            Ok(MonthSummary {
                month: start,
                total_expenses,
                transaction_count: expenses.len() as u64,
                budget_usage_percentage: total_expenses
                    .percentage_of(MoneyCents::new(budget.total_income)),
            })
        })
    }

    /// Persist the derived totals of `budget`.
    async fn save_budget_totals<C: ConnectionTrait>(
        &self,
        db: &C,
        budget: &Budget,
    ) -> ResultEngine<()> {
        budgets::ActiveModel {
            id: ActiveValue::Set(budget.id.to_string()),
            total_income: ActiveValue::Set(budget.total_income.cents()),
            allocated_amount: ActiveValue::Set(budget.allocated_amount.cents()),
            available_balance: ActiveValue::Set(budget.available_balance.cents()),
            updated_at: ActiveValue::Set(budget.updated_at),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_wrap_the_year() {
        let day = NaiveDate::from_ymd_opt(2025, 12, 17).unwrap();
        assert_eq!(
            month_bounds(day).unwrap(),
            (
                NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
            )
        );
    }

    #[test]
    fn month_bounds_mid_year() {
        let day = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert_eq!(
            month_bounds(day).unwrap(),
            (
                NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
            )
        );
    }
}
