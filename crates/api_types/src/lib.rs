//! Wire types of the HTTP API.
//!
//! Money travels as integer cents (`i64`). Timestamps are RFC 3339 UTC and
//! calendar dates are `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Stable snake_case tag, e.g. `insufficient_funds`.
    pub code: String,
    /// Spendable cents, only for `insufficient_funds`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeNew {
        pub description: String,
        pub amount: i64,
        pub receive_day: u8,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub allocated_amount: i64,
        pub color: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetSetup {
        #[serde(default)]
        pub name: Option<String>,
        pub incomes: Vec<IncomeNew>,
        pub categories: Vec<CategoryNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetTotals {
        pub id: Uuid,
        pub total_income: i64,
        pub allocated_amount: i64,
        pub available_balance: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetSetupResponse {
        pub message: String,
        pub budget: BudgetTotals,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeView {
        pub id: Uuid,
        pub description: String,
        pub amount: i64,
        pub receive_day: u8,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub name: String,
        pub total_income: i64,
        pub allocated_amount: i64,
        pub available_balance: i64,
        /// Allocations exceed income, after an income was deactivated.
        pub over_allocated: bool,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub incomes: Vec<IncomeView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetResponse {
        pub budget: BudgetView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SetupStatusResponse {
        pub has_budget: bool,
        pub budget_id: Option<Uuid>,
        pub setup_completed: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MonthSummaryQuery {
        /// Any day of the month; defaults to today.
        pub month: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthSummaryView {
        pub month: NaiveDate,
        pub total_expenses: i64,
        pub transaction_count: u64,
        pub budget_usage_percentage: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthSummaryResponse {
        pub summary: MonthSummaryView,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub budget_id: Uuid,
        pub name: String,
        pub color: String,
        pub allocated_amount: i64,
        pub current_balance: i64,
        pub spent_amount: i64,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryResponse {
        pub category: CategoryView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoriesResponse {
        pub categories: Vec<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUsageView {
        pub category_id: Uuid,
        pub name: String,
        pub spent_amount: i64,
        pub percentage: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryStatisticsView {
        pub total_budgeted: i64,
        pub total_spent: i64,
        pub total_available: i64,
        pub categories_count: usize,
        pub most_used_category: Option<CategoryUsageView>,
        pub least_used_category: Option<CategoryUsageView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryStatisticsResponse {
        pub statistics: CategoryStatisticsView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub from_category_id: Uuid,
        pub to_category_id: Uuid,
        pub amount: i64,
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferResponse {
        pub message: String,
        pub from_new_balance: i64,
        pub to_new_balance: i64,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    /// Body of `POST /budget/expense` and `POST /budget/income`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTransactionNew {
        pub category_id: Uuid,
        pub amount: i64,
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub budget_id: Uuid,
        pub category_id: Uuid,
        pub category_name: String,
        pub transaction_type: TransactionKind,
        pub amount: i64,
        pub description: String,
        pub is_recurring: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseResponse {
        pub message: String,
        pub expense: TransactionView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeResponse {
        pub message: String,
        pub transaction: TransactionView,
    }

    /// Query of `GET /budget/transactions`. `end_date` is inclusive.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub limit: Option<u64>,
        pub offset: Option<u64>,
        pub category_id: Option<Uuid>,
        pub transaction_type: Option<TransactionKind>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod goal {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum GoalTransactionKind {
        Deposit,
        Withdrawal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub description: Option<String>,
        pub target_amount: i64,
        pub monthly_target: Option<i64>,
        pub target_date: Option<NaiveDate>,
        pub color: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoalUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub target_amount: Option<i64>,
        pub monthly_target: Option<i64>,
        #[serde(default)]
        pub clear_monthly_target: bool,
        pub target_date: Option<NaiveDate>,
        #[serde(default)]
        pub clear_target_date: bool,
        pub color: Option<String>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub target_amount: i64,
        pub current_amount: i64,
        pub monthly_target: Option<i64>,
        pub target_date: Option<NaiveDate>,
        pub color: String,
        pub is_active: bool,
        pub is_completed: bool,
        pub completed_at: Option<DateTime<Utc>>,
        /// Percent of the target saved, capped at 100.
        pub progress: f64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalResponse {
        pub goal: GoalView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalsResponse {
        pub goals: Vec<GoalView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoalListQuery {
        pub include_inactive: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalTransactionNew {
        pub goal_id: Uuid,
        pub transaction_type: GoalTransactionKind,
        pub amount: i64,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalTransactionView {
        pub id: Uuid,
        pub goal_id: Uuid,
        pub transaction_type: GoalTransactionKind,
        pub amount: i64,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalTransactionResponse {
        pub message: String,
        pub new_amount: i64,
        pub goal: GoalView,
        pub completed: bool,
        pub exceeds_target: bool,
        pub transaction: GoalTransactionView,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoalTransactionsQuery {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalTransactionsResponse {
        pub transactions: Vec<GoalTransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalStatisticsView {
        pub total_goals: usize,
        pub active_goals: usize,
        pub completed_goals: usize,
        pub total_saved: i64,
        pub total_target: i64,
        pub average_progress: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalStatisticsResponse {
        pub statistics: GoalStatisticsView,
    }
}

pub mod profile {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub date_of_birth: Option<NaiveDate>,
        pub initial_setup_completed: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileResponse {
        pub profile: ProfileView,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
        pub date_of_birth: Option<NaiveDate>,
    }
}
