//! Budget ledger engine.
//!
//! The engine owns the rules that move money between a budget's income, its
//! categories and the user's savings goals:
//!
//! - setup computes totals and funds every category with its allocation;
//! - expenses draw down a category, never the budget's allocation headroom;
//! - transfers move balance between two categories, zero-sum;
//! - goals are funded by explicit deposits and withdrawals.
//!
//! Every write runs in one database transaction while holding the lock of
//! the aggregate it mutates.

pub use budgets::Budget;
pub use categories::BudgetCategory;
pub use commands::{
    CategoryTxCmd, GoalTxCmd, GoalUpdate, NewCategory, NewGoalCmd, NewIncome, ProfileUpdate,
    SetupBudgetCmd, TransferCmd,
};
pub use error::EngineError;
pub use goal_transactions::{GoalTransaction, GoalTransactionKind};
pub use goals::{DEFAULT_GOAL_COLOR, Goal};
pub use incomes::Income;
pub use money::{MoneyCents, project_balance};
pub use ops::{
    CategoryStatistics, CategoryUsage, Engine, EngineBuilder, GoalStatistics,
    GoalTransactionOutcome, MonthSummary, SetupStatus, TransactionListFilter, TransactionPager,
    TransferOutcome,
};
pub use transactions::{Transaction, TransactionKind};
pub use users::User;
pub use validation::{
    validate_expense, validate_goal_transaction, validate_goal_update, validate_income,
    validate_new_category, validate_new_goal, validate_profile_update, validate_setup,
    validate_transfer,
};

mod budgets;
mod categories;
mod commands;
mod error;
mod goal_transactions;
mod goals;
mod incomes;
mod locks;
mod money;
mod ops;
mod transactions;
mod users;
mod util;
mod validation;

type ResultEngine<T> = Result<T, EngineError>;
