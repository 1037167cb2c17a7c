//! The module contains the representation of a savings goal.
use chrono::{DateTime, NaiveDate, Utc};

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, project_balance, util::parse_uuid};

pub const DEFAULT_GOAL_COLOR: &str = "#EF4444";

/// A savings goal.
///
/// Goals are funded by explicit deposits and withdrawals, never by spending
/// down a budget category. A goal is completed the first time a deposit brings
/// `current_amount` to or above `target_amount`; completion is terminal, while
/// `is_active` can still be toggled to archive the goal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: MoneyCents,
    pub current_amount: MoneyCents,
    pub monthly_target: Option<MoneyCents>,
    pub target_date: Option<NaiveDate>,
    pub color: String,
    pub is_active: bool,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Progress towards the target in percent, capped at 100.
    pub fn progress(&self) -> f64 {
        if !self.target_amount.is_positive() {
            return 0.0;
        }
        self.current_amount
            .percentage_of(self.target_amount)
            .min(100.0)
    }

    /// Applies a deposit in memory.
    ///
    /// Returns `true` when this deposit completed the goal.
    pub(crate) fn deposit(&mut self, amount: MoneyCents, now: DateTime<Utc>) -> ResultEngine<bool> {
        if self.is_completed {
            return Err(EngineError::InvalidState(format!(
                "goal '{}' is already completed",
                self.name
            )));
        }
        self.current_amount = project_balance(self.current_amount, amount)
            .ok_or_else(|| EngineError::invalid("amount too large"))?;
        self.updated_at = now;
        if self.current_amount >= self.target_amount {
            self.is_completed = true;
            self.completed_at = Some(now);
            return Ok(true);
        }
        Ok(false)
    }

    /// Applies a withdrawal in memory.
    pub(crate) fn withdraw(&mut self, amount: MoneyCents, now: DateTime<Utc>) -> ResultEngine<()> {
        if self.is_completed {
            return Err(EngineError::InvalidState(format!(
                "goal '{}' is already completed",
                self.name
            )));
        }
        self.current_amount = project_balance(self.current_amount, -amount).ok_or(
            EngineError::InsufficientFunds {
                available: self.current_amount,
                requested: amount,
            },
        )?;
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: i64,
    pub current_amount: i64,
    pub monthly_target: Option<i64>,
    pub target_date: Option<Date>,
    pub color: String,
    pub is_active: bool,
    pub is_completed: bool,
    pub completed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::goal_transactions::Entity")]
    GoalTransactions,
}

impl Related<super::goal_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoalTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Goal> for ActiveModel {
    fn from(goal: &Goal) -> Self {
        Self {
            id: ActiveValue::Set(goal.id.to_string()),
            user_id: ActiveValue::Set(goal.user_id.to_string()),
            name: ActiveValue::Set(goal.name.clone()),
            description: ActiveValue::Set(goal.description.clone()),
            target_amount: ActiveValue::Set(goal.target_amount.cents()),
            current_amount: ActiveValue::Set(goal.current_amount.cents()),
            monthly_target: ActiveValue::Set(goal.monthly_target.map(MoneyCents::cents)),
            target_date: ActiveValue::Set(goal.target_date),
            color: ActiveValue::Set(goal.color.clone()),
            is_active: ActiveValue::Set(goal.is_active),
            is_completed: ActiveValue::Set(goal.is_completed),
            completed_at: ActiveValue::Set(goal.completed_at),
            created_at: ActiveValue::Set(goal.created_at),
            updated_at: ActiveValue::Set(goal.updated_at),
        }
    }
}

impl TryFrom<Model> for Goal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "goal")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            name: model.name,
            description: model.description,
            target_amount: MoneyCents::new(model.target_amount),
            current_amount: MoneyCents::new(model.current_amount),
            monthly_target: model.monthly_target.map(MoneyCents::new),
            target_date: model.target_date,
            color: model.color,
            is_active: model.is_active,
            is_completed: model.is_completed,
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(current: i64) -> Goal {
        let now = Utc::now();
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Trip".to_string(),
            description: None,
            target_amount: MoneyCents::new(1000_00),
            current_amount: MoneyCents::new(current),
            monthly_target: None,
            target_date: None,
            color: DEFAULT_GOAL_COLOR.to_string(),
            is_active: true,
            is_completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn progress_is_capped() {
        assert_eq!(trip(0).progress(), 0.0);
        assert_eq!(trip(250_00).progress(), 25.0);
        assert_eq!(trip(1500_00).progress(), 100.0);
    }

    #[test]
    fn deposit_reaching_target_completes_once() {
        let mut goal = trip(900_00);
        let now = Utc::now();
        assert_eq!(goal.deposit(MoneyCents::new(150_00), now), Ok(true));
        assert!(goal.is_completed);
        assert_eq!(goal.completed_at, Some(now));
        assert_eq!(goal.current_amount, MoneyCents::new(1050_00));

        let err = goal.deposit(MoneyCents::new(1_00), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
        assert_eq!(goal.completed_at, Some(now));
    }

    #[test]
    fn withdraw_more_than_saved_fails() {
        let mut goal = trip(100_00);
        let err = goal.withdraw(MoneyCents::new(200_00), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientFunds {
                available: MoneyCents::new(100_00),
                requested: MoneyCents::new(200_00),
            }
        );
        assert_eq!(goal.current_amount, MoneyCents::new(100_00));
    }
}
