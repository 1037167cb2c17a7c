//! Income sources of a budget.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    /// Day of the month the income is received (1-31).
    pub receive_day: u8,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Income {
    pub(crate) fn new(
        budget_id: Uuid,
        description: String,
        amount: MoneyCents,
        receive_day: u8,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_id,
            description,
            amount,
            receive_day,
            is_active: true,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incomes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub description: String,
    pub amount: i64,
    pub receive_day: i32,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
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
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Income> for ActiveModel {
    fn from(income: &Income) -> Self {
        Self {
            id: ActiveValue::Set(income.id.to_string()),
            budget_id: ActiveValue::Set(income.budget_id.to_string()),
            description: ActiveValue::Set(income.description.clone()),
            amount: ActiveValue::Set(income.amount.cents()),
            receive_day: ActiveValue::Set(i32::from(income.receive_day)),
            is_active: ActiveValue::Set(income.is_active),
            created_at: ActiveValue::Set(income.created_at),
        }
    }
}

impl TryFrom<Model> for Income {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let receive_day = u8::try_from(model.receive_day).map_err(|_| {
            EngineError::invalid(format!("invalid receive_day {}", model.receive_day))
        })?;
        Ok(Self {
            id: parse_uuid(&model.id, "income")?,
            budget_id: parse_uuid(&model.budget_id, "budget")?,
            description: model.description,
            amount: MoneyCents::new(model.amount),
            receive_day,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}
