//! Transaction primitives.
//!
//! A `Transaction` is an append-only record of money leaving (`expense`) or
//! returning to (`income`) a budget category. Rows are never updated or
//! deleted.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::invalid(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub category_id: Uuid,
    /// Name of the category at read time. Empty on freshly created records.
    pub category_name: String,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub description: String,
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn new(
        budget_id: Uuid,
        category_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_id,
            category_id,
            category_name: String::new(),
            kind,
            amount,
            description,
            is_recurring: false,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub category_id: String,
    pub transaction_type: String,
    pub amount: i64,
    pub description: String,
    pub is_recurring: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            budget_id: ActiveValue::Set(tx.budget_id.to_string()),
            category_id: ActiveValue::Set(tx.category_id.to_string()),
            transaction_type: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount: ActiveValue::Set(tx.amount.cents()),
            description: ActiveValue::Set(tx.description.clone()),
            is_recurring: ActiveValue::Set(tx.is_recurring),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<(Model, Option<String>)> for Transaction {
    type Error = EngineError;

    fn try_from((model, category_name): (Model, Option<String>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            budget_id: parse_uuid(&model.budget_id, "budget")?,
            category_id: parse_uuid(&model.category_id, "category")?,
            category_name: category_name.unwrap_or_default(),
            kind: TransactionKind::try_from(model.transaction_type.as_str())?,
            amount: MoneyCents::new(model.amount),
            description: model.description,
            is_recurring: model.is_recurring,
            created_at: model.created_at,
        })
    }
}
