use chrono::Utc;
use sea_orm::{
    ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    DEFAULT_GOAL_COLOR, EngineError, Goal, GoalTransaction, GoalTransactionKind, GoalTxCmd,
    GoalUpdate, MoneyCents, NewGoalCmd, ResultEngine, goal_transactions, goals,
    util::{normalize_optional_text, normalize_text},
    validation::{validate_goal_transaction, validate_goal_update, validate_new_goal},
};

use super::{Engine, with_tx};

/// Result of a deposit or withdrawal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalTransactionOutcome {
    pub goal: Goal,
    pub new_amount: MoneyCents,
    /// `true` only for the deposit that completed the goal.
    pub completed: bool,
    /// Soft warning: the goal now holds more than its target.
    pub exceeds_target: bool,
    pub transaction: GoalTransaction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalStatistics {
    pub total_goals: usize,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub total_saved: MoneyCents,
    pub total_target: MoneyCents,
    pub average_progress: f64,
}

impl GoalStatistics {
    fn from_goals(goals: &[Goal]) -> Self {
        let average_progress = if goals.is_empty() {
            0.0
        } else {
            goals.iter().map(Goal::progress).sum::<f64>() / goals.len() as f64
        };
        Self {
            total_goals: goals.len(),
            active_goals: goals
                .iter()
                .filter(|goal| goal.is_active && !goal.is_completed)
                .count(),
            completed_goals: goals.iter().filter(|goal| goal.is_completed).count(),
            total_saved: goals.iter().map(|goal| goal.current_amount).sum(),
            total_target: goals.iter().map(|goal| goal.target_amount).sum(),
            average_progress,
        }
    }
}

impl Engine {
    async fn require_goal<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        goal_id: Uuid,
    ) -> ResultEngine<Goal> {
        let model = goals::Entity::find_by_id(goal_id.to_string())
            .filter(goals::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("goal not exists".to_string()))?;
        Goal::try_from(model)
    }

    /// Create a savings goal with nothing saved yet.
    pub async fn create_goal(&self, cmd: NewGoalCmd) -> ResultEngine<Goal> {
        validate_new_goal(&cmd)?;
        let now = Utc::now();
        let goal = Goal {
            id: Uuid::new_v4(),
            user_id: cmd.user_id,
            name: normalize_text(&cmd.name),
            description: normalize_optional_text(cmd.description.as_deref()),
            target_amount: cmd.target_amount,
            current_amount: MoneyCents::ZERO,
            monthly_target: cmd.monthly_target,
            target_date: cmd.target_date,
            color: cmd
                .color
                .as_deref()
                .map(str::trim)
                .filter(|color| !color.is_empty())
                .unwrap_or(DEFAULT_GOAL_COLOR)
                .to_string(),
            is_active: true,
            is_completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        let goal = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, cmd.user_id).await?;
            goals::ActiveModel::from(&goal).insert(&db_tx).await?;
            Ok::<_, EngineError>(goal)
        })?;

        tracing::info!(
            user_id = %goal.user_id,
            goal_id = %goal.id,
            target = %goal.target_amount,
            "goal created"
        );
        Ok(goal)
    }

    /// Goals of `user_id`, newest first. Archived goals are skipped unless
    /// `include_inactive` is set.
    pub async fn goals(&self, user_id: Uuid, include_inactive: bool) -> ResultEngine<Vec<Goal>> {
        with_tx!(self, |db_tx| {
            let mut query = goals::Entity::find()
                .filter(goals::Column::UserId.eq(user_id.to_string()));
            if !include_inactive {
                query = query.filter(goals::Column::IsActive.eq(true));
            }
            query
                .order_by_desc(goals::Column::CreatedAt)
                .order_by_desc(goals::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Goal::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn goal(&self, user_id: Uuid, goal_id: Uuid) -> ResultEngine<Goal> {
        with_tx!(self, |db_tx| self.require_goal(&db_tx, user_id, goal_id).await)
    }

    /// Apply a partial update.
    ///
    /// Changing the target never completes or reopens a goal; completion
    /// only follows a deposit or [`Engine::complete_goal`].
    pub async fn update_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        update: GoalUpdate,
    ) -> ResultEngine<Goal> {
        validate_goal_update(&update)?;
        let now = Utc::now();

        let _lock = self.locks.lock(goal_id).await;
        with_tx!(self, |db_tx| {
            let mut goal = self.require_goal(&db_tx, user_id, goal_id).await?;

            if let Some(name) = update.name.as_deref() {
                goal.name = normalize_text(name);
            }
            if let Some(description) = update.description.as_deref() {
                goal.description = normalize_optional_text(Some(description));
            }
            if let Some(target_amount) = update.target_amount {
                goal.target_amount = target_amount;
            }
            if update.clear_monthly_target {
                goal.monthly_target = None;
            } else if let Some(monthly_target) = update.monthly_target {
                goal.monthly_target = Some(monthly_target);
            }
            if update.clear_target_date {
                goal.target_date = None;
            } else if let Some(target_date) = update.target_date {
                goal.target_date = Some(target_date);
            }
            if let Some(color) = update.color.as_deref().map(str::trim)
                && !color.is_empty()
            {
                goal.color = color.to_string();
            }
            if let Some(is_active) = update.is_active {
                goal.is_active = is_active;
            }
            goal.updated_at = now;

            goals::ActiveModel::from(&goal).update(&db_tx).await?;
            Ok(goal)
        })
    }

    /// Delete a goal together with its transactions.
    pub async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> ResultEngine<()> {
        let _lock = self.locks.lock(goal_id).await;
        with_tx!(self, |db_tx| {
            let goal = self.require_goal(&db_tx, user_id, goal_id).await?;
            goal_transactions::Entity::delete_many()
                .filter(goal_transactions::Column::GoalId.eq(goal.id.to_string()))
                .exec(&db_tx)
                .await?;
            goals::Entity::delete_by_id(goal.id.to_string())
                .exec(&db_tx)
                .await?;
            Ok::<_, EngineError>(())
        })?;

        tracing::info!(%user_id, %goal_id, "goal deleted");
        Ok(())
    }

    /// Mark a goal as completed regardless of its saved amount.
    pub async fn complete_goal(&self, user_id: Uuid, goal_id: Uuid) -> ResultEngine<Goal> {
        let now = Utc::now();

        let _lock = self.locks.lock(goal_id).await;
        let goal = with_tx!(self, |db_tx| {
            let mut goal = self.require_goal(&db_tx, user_id, goal_id).await?;
            if goal.is_completed {
                return Err(EngineError::InvalidState(format!(
                    "goal '{}' is already completed",
                    goal.name
                )));
            }
            goal.is_completed = true;
            goal.completed_at = Some(now);
            goal.updated_at = now;
            goals::ActiveModel::from(&goal).update(&db_tx).await?;
            Ok::<_, EngineError>(goal)
        })?;

        tracing::info!(%user_id, %goal_id, "goal completed");
        Ok(goal)
    }

    /// Deposit into or withdraw from a goal.
    ///
    /// A deposit that brings the saved amount to the target completes the
    /// goal. Deposits beyond the target are accepted and flagged with
    /// `exceeds_target`.
    pub async fn add_goal_transaction(
        &self,
        cmd: GoalTxCmd,
    ) -> ResultEngine<GoalTransactionOutcome> {
        validate_goal_transaction(&cmd)?;
        let now = Utc::now();

        let _lock = self.locks.lock(cmd.goal_id).await;
        let outcome = with_tx!(self, |db_tx| {
            let mut goal = self.require_goal(&db_tx, cmd.user_id, cmd.goal_id).await?;

            let completed = match cmd.kind {
                GoalTransactionKind::Deposit => goal.deposit(cmd.amount, now)?,
                GoalTransactionKind::Withdrawal => {
                    goal.withdraw(cmd.amount, now)?;
                    false
                }
            };

            let transaction = GoalTransaction {
                id: Uuid::new_v4(),
                goal_id: goal.id,
                kind: cmd.kind,
                amount: cmd.amount,
                description: normalize_optional_text(cmd.description.as_deref()),
                created_at: now,
            };
            goals::ActiveModel::from(&goal).update(&db_tx).await?;
            goal_transactions::ActiveModel::from(&transaction)
                .insert(&db_tx)
                .await?;

            Ok::<_, EngineError>(GoalTransactionOutcome {
                new_amount: goal.current_amount,
                exceeds_target: goal.current_amount > goal.target_amount,
                completed,
                goal,
                transaction,
            })
        })?;

        if outcome.completed {
            tracing::info!(
                user_id = %cmd.user_id,
                goal_id = %cmd.goal_id,
                "goal reached its target"
            );
        }
        if outcome.exceeds_target {
            tracing::warn!(
                goal_id = %cmd.goal_id,
                saved = %outcome.new_amount,
                target = %outcome.goal.target_amount,
                "goal holds more than its target"
            );
        }
        Ok(outcome)
    }

    /// Transactions of a goal, newest first.
    pub async fn goal_transactions(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        limit: u64,
    ) -> ResultEngine<Vec<GoalTransaction>> {
        with_tx!(self, |db_tx| {
            let goal = self.require_goal(&db_tx, user_id, goal_id).await?;
            goal_transactions::Entity::find()
                .filter(goal_transactions::Column::GoalId.eq(goal.id.to_string()))
                .order_by_desc(goal_transactions::Column::CreatedAt)
                .order_by_desc(goal_transactions::Column::Id)
                .limit(limit)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(GoalTransaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Totals over every goal of the user, archived ones included.
    pub async fn goal_statistics(&self, user_id: Uuid) -> ResultEngine<GoalStatistics> {
        let goals = self.goals(user_id, true).await?;
        Ok(GoalStatistics::from_goals(&goals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(target: i64, current: i64, is_active: bool, is_completed: bool) -> Goal {
        let now = Utc::now();
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Goal".to_string(),
            description: None,
            target_amount: MoneyCents::new(target),
            current_amount: MoneyCents::new(current),
            monthly_target: None,
            target_date: None,
            color: DEFAULT_GOAL_COLOR.to_string(),
            is_active,
            is_completed,
            completed_at: is_completed.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn statistics_without_goals_are_zero() {
        let stats = GoalStatistics::from_goals(&[]);
        assert_eq!(stats.total_goals, 0);
        assert_eq!(stats.average_progress, 0.0);
        assert_eq!(stats.total_saved, MoneyCents::ZERO);
    }

    #[test]
    fn statistics_count_states() {
        let goals = vec![
            goal(1000_00, 1000_00, true, true),
            goal(1000_00, 500_00, true, false),
            goal(400_00, 0, false, false),
        ];
        let stats = GoalStatistics::from_goals(&goals);
        assert_eq!(stats.total_goals, 3);
        assert_eq!(stats.active_goals, 1);
        assert_eq!(stats.completed_goals, 1);
        assert_eq!(stats.total_saved, MoneyCents::new(1500_00));
        assert_eq!(stats.total_target, MoneyCents::new(2400_00));
        assert_eq!(stats.average_progress, 50.0);
    }
}
