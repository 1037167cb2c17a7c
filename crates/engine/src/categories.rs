//! The module contains the representation of a budget category.
use chrono::{DateTime, Utc};

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, project_balance, util::parse_uuid};

/// A named spending bucket.
///
/// `allocated_amount` is the share of income assigned to the category when it
/// was created; it is a ceiling, not consumption. `current_balance` is what is
/// left to spend: it starts equal to the allocation, goes down with expenses
/// and moves between categories with transfers.
///
/// # Examples
///
/// A category with an allocation of 500.00 and a balance of 500.00 accepts an
/// expense of 200.00, leaving 300.00. A following expense of 400.00 is
/// rejected because only 300.00 are available.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub color: String,
    pub allocated_amount: MoneyCents,
    pub current_balance: MoneyCents,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BudgetCategory {
    pub(crate) fn new(
        budget_id: Uuid,
        name: String,
        color: String,
        allocated_amount: MoneyCents,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_id,
            name,
            color,
            allocated_amount,
            current_balance: allocated_amount,
            is_active: true,
            created_at,
            updated_at: created_at,
        }
    }

    /// Amount consumed so far (allocation minus what is left).
    pub fn spent(&self) -> MoneyCents {
        self.allocated_amount - self.current_balance
    }

    /// Balance after withdrawing `amount`, or `InsufficientFunds`.
    pub fn preview_debit(&self, amount: MoneyCents) -> ResultEngine<MoneyCents> {
        project_balance(self.current_balance, -amount).ok_or(EngineError::InsufficientFunds {
            available: self.current_balance,
            requested: amount,
        })
    }

    /// Balance after depositing `amount`.
    pub fn preview_credit(&self, amount: MoneyCents) -> ResultEngine<MoneyCents> {
        project_balance(self.current_balance, amount)
            .ok_or_else(|| EngineError::invalid("amount too large"))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub name: String,
    pub color: String,
    pub allocated_amount: i64,
    pub current_balance: i64,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Budget,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BudgetCategory> for ActiveModel {
    fn from(category: &BudgetCategory) -> Self {
        Self {
            id: ActiveValue::Set(category.id.to_string()),
            budget_id: ActiveValue::Set(category.budget_id.to_string()),
            name: ActiveValue::Set(category.name.clone()),
            color: ActiveValue::Set(category.color.clone()),
            allocated_amount: ActiveValue::Set(category.allocated_amount.cents()),
            current_balance: ActiveValue::Set(category.current_balance.cents()),
            is_active: ActiveValue::Set(category.is_active),
            created_at: ActiveValue::Set(category.created_at),
            updated_at: ActiveValue::Set(category.updated_at),
        }
    }
}

impl TryFrom<Model> for BudgetCategory {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            budget_id: parse_uuid(&model.budget_id, "budget")?,
            name: model.name,
            color: model.color,
            allocated_amount: MoneyCents::new(model.allocated_amount),
            current_balance: MoneyCents::new(model.current_balance),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
