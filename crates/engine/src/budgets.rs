//! The module contains the representation of a budget.
use chrono::{DateTime, Utc};

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Income, MoneyCents, util::parse_uuid};

/// The single active budget of a user.
///
/// `available_balance` is the allocation headroom:
/// `total_income - allocated_amount`. It only moves when incomes or
/// category allocations change; expenses draw down category balances and
/// never touch it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub total_income: MoneyCents,
    pub allocated_amount: MoneyCents,
    pub available_balance: MoneyCents,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub incomes: Vec<Income>,
}

impl Budget {
    /// `true` when allocations exceed income, which can only happen after an
    /// income was deactivated.
    pub fn is_over_allocated(&self) -> bool {
        self.allocated_amount > self.total_income
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub total_income: i64,
    pub allocated_amount: i64,
    pub available_balance: i64,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::incomes::Entity")]
    Incomes,
    #[sea_orm(has_many = "super::categories::Entity")]
    Categories,
}

impl Related<super::incomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Incomes.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id.to_string()),
            user_id: ActiveValue::Set(budget.user_id.to_string()),
            name: ActiveValue::Set(budget.name.clone()),
            total_income: ActiveValue::Set(budget.total_income.cents()),
            allocated_amount: ActiveValue::Set(budget.allocated_amount.cents()),
            available_balance: ActiveValue::Set(budget.available_balance.cents()),
            is_active: ActiveValue::Set(budget.is_active),
            created_at: ActiveValue::Set(budget.created_at),
            updated_at: ActiveValue::Set(budget.updated_at),
        }
    }
}

impl TryFrom<(Model, Vec<Income>)> for Budget {
    type Error = EngineError;

    fn try_from((model, incomes): (Model, Vec<Income>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            name: model.name,
            total_income: MoneyCents::new(model.total_income),
            allocated_amount: MoneyCents::new(model.allocated_amount),
            available_balance: MoneyCents::new(model.available_balance),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            incomes,
        })
    }
}
