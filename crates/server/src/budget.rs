//! Budget API endpoints.

use api_types::budget::{
    BudgetResponse, BudgetSetup, BudgetSetupResponse, BudgetTotals, BudgetView, IncomeNew,
    IncomeView, MonthSummaryQuery, MonthSummaryResponse, MonthSummaryView, SetupStatusResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{MoneyCents, NewIncome, SetupBudgetCmd};
use uuid::Uuid;

use crate::{ServerError, auth::AuthUser, categories::new_category, server::ServerState};

fn map_income(income: engine::Income) -> IncomeView {
    IncomeView {
        id: income.id,
        description: income.description,
        amount: income.amount.cents(),
        receive_day: income.receive_day,
        is_active: income.is_active,
        created_at: income.created_at,
    }
}

fn map_budget(budget: engine::Budget) -> BudgetView {
    let over_allocated = budget.is_over_allocated();
    BudgetView {
        id: budget.id,
        name: budget.name,
        total_income: budget.total_income.cents(),
        allocated_amount: budget.allocated_amount.cents(),
        available_balance: budget.available_balance.cents(),
        over_allocated,
        is_active: budget.is_active,
        created_at: budget.created_at,
        updated_at: budget.updated_at,
        incomes: budget.incomes.into_iter().map(map_income).collect(),
    }
}

fn new_income(income: IncomeNew) -> NewIncome {
    NewIncome {
        description: income.description,
        amount: MoneyCents::new(income.amount),
        receive_day: income.receive_day,
    }
}

pub async fn setup_status(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<SetupStatusResponse>, ServerError> {
    let status = state.engine.setup_status(user.id).await?;
    Ok(Json(SetupStatusResponse {
        has_budget: status.has_budget,
        budget_id: status.budget_id,
        setup_completed: status.setup_completed,
    }))
}

pub async fn setup(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetSetup>,
) -> Result<(StatusCode, Json<BudgetSetupResponse>), ServerError> {
    let mut cmd = SetupBudgetCmd::new(user.id);
    cmd.name = payload.name;
    cmd.incomes = payload.incomes.into_iter().map(new_income).collect();
    cmd.categories = payload.categories.into_iter().map(new_category).collect();

    let budget = state.engine.setup_budget(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(BudgetSetupResponse {
            message: "budget created".to_string(),
            budget: BudgetTotals {
                id: budget.id,
                total_income: budget.total_income.cents(),
                allocated_amount: budget.allocated_amount.cents(),
                available_balance: budget.available_balance.cents(),
            },
        }),
    ))
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetResponse>, ServerError> {
    let budget = state.engine.budget(user.id).await?;
    Ok(Json(BudgetResponse {
        budget: map_budget(budget),
    }))
}

pub async fn income_new(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeNew>,
) -> Result<(StatusCode, Json<BudgetResponse>), ServerError> {
    let budget = state
        .engine
        .add_income(user.id, new_income(payload))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(BudgetResponse {
            budget: map_budget(budget),
        }),
    ))
}

pub async fn income_deactivate(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(income_id): Path<Uuid>,
) -> Result<Json<BudgetResponse>, ServerError> {
    let budget = state.engine.deactivate_income(user.id, income_id).await?;
    Ok(Json(BudgetResponse {
        budget: map_budget(budget),
    }))
}

pub async fn summary(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<MonthSummaryQuery>,
) -> Result<Json<MonthSummaryResponse>, ServerError> {
    let month = query.month.unwrap_or_else(|| Utc::now().date_naive());
    let summary = state.engine.month_summary(user.id, month).await?;
    Ok(Json(MonthSummaryResponse {
        summary: MonthSummaryView {
            month: summary.month,
            total_expenses: summary.total_expenses.cents(),
            transaction_count: summary.transaction_count,
            budget_usage_percentage: summary.budget_usage_percentage,
        },
    }))
}
