//! Savings goals API endpoints.

use api_types::{
    MessageResponse,
    goal::{
        GoalListQuery, GoalNew, GoalResponse, GoalStatisticsResponse, GoalStatisticsView,
        GoalTransactionKind, GoalTransactionNew, GoalTransactionResponse, GoalTransactionView,
        GoalTransactionsQuery, GoalTransactionsResponse, GoalUpdate, GoalView, GoalsResponse,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{GoalTxCmd, MoneyCents, NewGoalCmd};
use uuid::Uuid;

use crate::{ServerError, auth::AuthUser, server::ServerState};

const DEFAULT_TRANSACTIONS_LIMIT: u64 = 50;

fn map_goal(goal: engine::Goal) -> GoalView {
    GoalView {
        progress: goal.progress(),
        id: goal.id,
        name: goal.name,
        description: goal.description,
        target_amount: goal.target_amount.cents(),
        current_amount: goal.current_amount.cents(),
        monthly_target: goal.monthly_target.map(MoneyCents::cents),
        target_date: goal.target_date,
        color: goal.color,
        is_active: goal.is_active,
        is_completed: goal.is_completed,
        completed_at: goal.completed_at,
        created_at: goal.created_at,
        updated_at: goal.updated_at,
    }
}

fn map_goal_transaction(tx: engine::GoalTransaction) -> GoalTransactionView {
    GoalTransactionView {
        id: tx.id,
        goal_id: tx.goal_id,
        transaction_type: match tx.kind {
            engine::GoalTransactionKind::Deposit => GoalTransactionKind::Deposit,
            engine::GoalTransactionKind::Withdrawal => GoalTransactionKind::Withdrawal,
        },
        amount: tx.amount.cents(),
        description: tx.description,
        created_at: tx.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<GoalListQuery>,
) -> Result<Json<GoalsResponse>, ServerError> {
    let goals = state
        .engine
        .goals(user.id, query.include_inactive.unwrap_or(false))
        .await?
        .into_iter()
        .map(map_goal)
        .collect();

    Ok(Json(GoalsResponse { goals }))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<GoalResponse>), ServerError> {
    let cmd = NewGoalCmd {
        user_id: user.id,
        name: payload.name,
        description: payload.description,
        target_amount: MoneyCents::new(payload.target_amount),
        monthly_target: payload.monthly_target.map(MoneyCents::new),
        target_date: payload.target_date,
        color: payload.color,
    };
    let goal = state.engine.create_goal(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(GoalResponse {
            goal: map_goal(goal),
        }),
    ))
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<GoalResponse>, ServerError> {
    let goal = state.engine.goal(user.id, goal_id).await?;
    Ok(Json(GoalResponse {
        goal: map_goal(goal),
    }))
}

pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<GoalUpdate>,
) -> Result<Json<GoalResponse>, ServerError> {
    let update = engine::GoalUpdate {
        name: payload.name,
        description: payload.description,
        target_amount: payload.target_amount.map(MoneyCents::new),
        monthly_target: payload.monthly_target.map(MoneyCents::new),
        clear_monthly_target: payload.clear_monthly_target,
        target_date: payload.target_date,
        clear_target_date: payload.clear_target_date,
        color: payload.color,
        is_active: payload.is_active,
    };
    if update.is_empty() {
        return Err(ServerError::Generic(
            "provide at least one field to update".to_string(),
        ));
    }

    let goal = state.engine.update_goal(user.id, goal_id, update).await?;
    Ok(Json(GoalResponse {
        goal: map_goal(goal),
    }))
}

pub async fn remove(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.engine.delete_goal(user.id, goal_id).await?;
    Ok(Json(MessageResponse {
        message: "goal deleted".to_string(),
    }))
}

pub async fn complete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<GoalResponse>, ServerError> {
    let goal = state.engine.complete_goal(user.id, goal_id).await?;
    Ok(Json(GoalResponse {
        goal: map_goal(goal),
    }))
}

pub async fn transaction_new(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<GoalTransactionNew>,
) -> Result<Json<GoalTransactionResponse>, ServerError> {
    let kind = match payload.transaction_type {
        GoalTransactionKind::Deposit => engine::GoalTransactionKind::Deposit,
        GoalTransactionKind::Withdrawal => engine::GoalTransactionKind::Withdrawal,
    };
    let outcome = state
        .engine
        .add_goal_transaction(GoalTxCmd {
            user_id: user.id,
            goal_id: payload.goal_id,
            kind,
            amount: MoneyCents::new(payload.amount),
            description: payload.description,
        })
        .await?;

    let message = match (outcome.completed, kind) {
        (true, _) => "goal completed",
        (false, engine::GoalTransactionKind::Deposit) => "deposit recorded",
        (false, engine::GoalTransactionKind::Withdrawal) => "withdrawal recorded",
    };
    Ok(Json(GoalTransactionResponse {
        message: message.to_string(),
        new_amount: outcome.new_amount.cents(),
        goal: map_goal(outcome.goal),
        completed: outcome.completed,
        exceeds_target: outcome.exceeds_target,
        transaction: map_goal_transaction(outcome.transaction),
    }))
}

pub async fn transactions(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
    Query(query): Query<GoalTransactionsQuery>,
) -> Result<Json<GoalTransactionsResponse>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_TRANSACTIONS_LIMIT);
    let transactions = state
        .engine
        .goal_transactions(user.id, goal_id, limit)
        .await?
        .into_iter()
        .map(map_goal_transaction)
        .collect();

    Ok(Json(GoalTransactionsResponse { transactions }))
}

pub async fn statistics(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<GoalStatisticsResponse>, ServerError> {
    let stats = state.engine.goal_statistics(user.id).await?;
    Ok(Json(GoalStatisticsResponse {
        statistics: GoalStatisticsView {
            total_goals: stats.total_goals,
            active_goals: stats.active_goals,
            completed_goals: stats.completed_goals,
            total_saved: stats.total_saved.cents(),
            total_target: stats.total_target.cents(),
            average_progress: stats.average_progress,
        },
    }))
}
