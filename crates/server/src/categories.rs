//! Categories API endpoints.

use api_types::{
    budget::CategoryNew,
    category::{
        CategoriesResponse, CategoryResponse, CategoryStatisticsResponse, CategoryStatisticsView,
        CategoryUsageView, CategoryView, TransferNew, TransferResponse,
    },
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{MoneyCents, NewCategory, TransferCmd};

use crate::{ServerError, auth::AuthUser, server::ServerState};

fn map_category(category: engine::BudgetCategory) -> CategoryView {
    CategoryView {
        id: category.id,
        budget_id: category.budget_id,
        spent_amount: category.spent().cents(),
        name: category.name,
        color: category.color,
        allocated_amount: category.allocated_amount.cents(),
        current_balance: category.current_balance.cents(),
        is_active: category.is_active,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

fn map_usage(usage: engine::CategoryUsage) -> CategoryUsageView {
    CategoryUsageView {
        category_id: usage.category_id,
        name: usage.name,
        spent_amount: usage.spent_amount.cents(),
        percentage: usage.percentage,
    }
}

pub(crate) fn new_category(category: CategoryNew) -> NewCategory {
    NewCategory {
        name: category.name,
        allocated_amount: MoneyCents::new(category.allocated_amount),
        color: category.color,
    }
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<CategoriesResponse>, ServerError> {
    let categories = state
        .engine
        .categories(user.id)
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(CategoriesResponse { categories }))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryResponse>), ServerError> {
    let category = state
        .engine
        .add_category(user.id, new_category(payload))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            category: map_category(category),
        }),
    ))
}

pub async fn statistics(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryStatisticsResponse>, ServerError> {
    let stats = state.engine.category_statistics(user.id).await?;
    Ok(Json(CategoryStatisticsResponse {
        statistics: CategoryStatisticsView {
            total_budgeted: stats.total_budgeted.cents(),
            total_spent: stats.total_spent.cents(),
            total_available: stats.total_available.cents(),
            categories_count: stats.categories_count,
            most_used_category: stats.most_used.map(map_usage),
            least_used_category: stats.least_used.map(map_usage),
        },
    }))
}

pub async fn transfer(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<Json<TransferResponse>, ServerError> {
    let outcome = state
        .engine
        .transfer_between_categories(TransferCmd {
            user_id: user.id,
            from_category_id: payload.from_category_id,
            to_category_id: payload.to_category_id,
            amount: MoneyCents::new(payload.amount),
            description: payload.description,
        })
        .await?;

    Ok(Json(TransferResponse {
        message: format!("transferred {}", outcome.amount),
        from_new_balance: outcome.from_new_balance.cents(),
        to_new_balance: outcome.to_new_balance.cents(),
    }))
}
