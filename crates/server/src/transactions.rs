//! Transactions API endpoints.

use api_types::transaction::{
    CategoryTransactionNew, ExpenseResponse, IncomeResponse, TransactionKind,
    TransactionListQuery, TransactionListResponse, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use engine::{CategoryTxCmd, MoneyCents, TransactionListFilter};
use uuid::Uuid;

use crate::{ServerError, auth::AuthUser, server::ServerState};

const DEFAULT_LIMIT: u64 = 50;

fn map_kind(kind: engine::TransactionKind) -> TransactionKind {
    match kind {
        engine::TransactionKind::Income => TransactionKind::Income,
        engine::TransactionKind::Expense => TransactionKind::Expense,
    }
}

fn engine_kind(kind: TransactionKind) -> engine::TransactionKind {
    match kind {
        TransactionKind::Income => engine::TransactionKind::Income,
        TransactionKind::Expense => engine::TransactionKind::Expense,
    }
}

fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        budget_id: tx.budget_id,
        category_id: tx.category_id,
        category_name: tx.category_name,
        transaction_type: map_kind(tx.kind),
        amount: tx.amount.cents(),
        description: tx.description,
        is_recurring: tx.is_recurring,
        created_at: tx.created_at,
    }
}

fn category_tx(user_id: Uuid, payload: CategoryTransactionNew) -> CategoryTxCmd {
    CategoryTxCmd::new(
        user_id,
        payload.category_id,
        MoneyCents::new(payload.amount),
        payload.description,
    )
}

fn start_of_day(day: NaiveDate) -> Result<DateTime<Utc>, ServerError> {
    day.and_hms_opt(0, 0, 0)
        .map(|start| start.and_utc())
        .ok_or_else(|| ServerError::Generic(format!("invalid date: {day}")))
}

/// Turn the wire query into an engine filter. `end_date` is inclusive on the
/// wire, so the exclusive bound is the start of the following day.
fn list_filter(query: TransactionListQuery) -> Result<TransactionListFilter, ServerError> {
    let from = query.start_date.map(start_of_day).transpose()?;
    let to = match query.end_date {
        Some(end) => {
            let next = end
                .succ_opt()
                .ok_or_else(|| ServerError::Generic(format!("invalid end_date: {end}")))?;
            Some(start_of_day(next)?)
        }
        None => None,
    };

    Ok(TransactionListFilter {
        category_id: query.category_id,
        kind: query.transaction_type.map(engine_kind),
        from,
        to,
        limit: Some(query.limit.unwrap_or(DEFAULT_LIMIT)),
        offset: query.offset.unwrap_or(0),
    })
}

pub async fn expense_new(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryTransactionNew>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ServerError> {
    let tx = state
        .engine
        .create_expense(category_tx(user.id, payload))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ExpenseResponse {
            message: "expense recorded".to_string(),
            expense: map_transaction(tx),
        }),
    ))
}

pub async fn income_new(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryTransactionNew>,
) -> Result<(StatusCode, Json<IncomeResponse>), ServerError> {
    let tx = state
        .engine
        .record_income(category_tx(user.id, payload))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(IncomeResponse {
            message: "income recorded".to_string(),
            transaction: map_transaction(tx),
        }),
    ))
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = list_filter(query)?;
    let transactions = state
        .engine
        .list_transactions(user.id, &filter)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}
