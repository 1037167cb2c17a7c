//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and giving each operation a value its validation function can
//! inspect before anything touches the database.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{GoalTransactionKind, MoneyCents};

/// An income source declared during setup or added later.
#[derive(Clone, Debug)]
pub struct NewIncome {
    pub description: String,
    pub amount: MoneyCents,
    pub receive_day: u8,
}

/// A category declared during setup or added later.
#[derive(Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub allocated_amount: MoneyCents,
    pub color: String,
}

/// Initial budget setup (onboarding).
#[derive(Clone, Debug)]
pub struct SetupBudgetCmd {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub incomes: Vec<NewIncome>,
    pub categories: Vec<NewCategory>,
}

impl SetupBudgetCmd {
    #[must_use]
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            name: None,
            incomes: Vec::new(),
            categories: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn income(
        mut self,
        description: impl Into<String>,
        amount: MoneyCents,
        receive_day: u8,
    ) -> Self {
        self.incomes.push(NewIncome {
            description: description.into(),
            amount,
            receive_day,
        });
        self
    }

    #[must_use]
    pub fn category(
        mut self,
        name: impl Into<String>,
        allocated_amount: MoneyCents,
        color: impl Into<String>,
    ) -> Self {
        self.categories.push(NewCategory {
            name: name.into(),
            allocated_amount,
            color: color.into(),
        });
        self
    }
}

/// Debit or credit a category.
///
/// Used for both expenses and income (reimbursement) transactions.
#[derive(Clone, Debug)]
pub struct CategoryTxCmd {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: MoneyCents,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl CategoryTxCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        category_id: Uuid,
        amount: MoneyCents,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            category_id,
            amount,
            description: description.into(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Move balance from one category to another.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub user_id: Uuid,
    pub from_category_id: Uuid,
    pub to_category_id: Uuid,
    pub amount: MoneyCents,
    pub description: String,
}

/// Create a savings goal.
#[derive(Clone, Debug)]
pub struct NewGoalCmd {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: MoneyCents,
    pub monthly_target: Option<MoneyCents>,
    pub target_date: Option<NaiveDate>,
    pub color: Option<String>,
}

impl NewGoalCmd {
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>, target_amount: MoneyCents) -> Self {
        Self {
            user_id,
            name: name.into(),
            description: None,
            target_amount,
            monthly_target: None,
            target_date: None,
            color: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn monthly_target(mut self, monthly_target: MoneyCents) -> Self {
        self.monthly_target = Some(monthly_target);
        self
    }

    #[must_use]
    pub fn target_date(mut self, target_date: NaiveDate) -> Self {
        self.target_date = Some(target_date);
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Partial update of a goal. `None` leaves a field untouched; the `clear_*`
/// flags reset the optional plan fields to unset.
#[derive(Clone, Debug, Default)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<MoneyCents>,
    pub monthly_target: Option<MoneyCents>,
    pub clear_monthly_target: bool,
    pub target_date: Option<NaiveDate>,
    pub clear_target_date: bool,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

impl GoalUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.target_amount.is_none()
            && self.monthly_target.is_none()
            && !self.clear_monthly_target
            && self.target_date.is_none()
            && !self.clear_target_date
            && self.color.is_none()
            && self.is_active.is_none()
    }
}

/// Deposit into or withdraw from a goal.
#[derive(Clone, Debug)]
pub struct GoalTxCmd {
    pub user_id: Uuid,
    pub goal_id: Uuid,
    pub kind: GoalTransactionKind,
    pub amount: MoneyCents,
    pub description: Option<String>,
}

/// Partial update of a user profile.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}
