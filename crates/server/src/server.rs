use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{auth, budget, categories, goals, profile, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Every route sits behind the bearer token middleware.
pub fn router(engine: Engine, db: DatabaseConnection) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    Router::new()
        .route("/budget", get(budget::get))
        .route("/budget/setup-status", get(budget::setup_status))
        .route("/budget/setup", post(budget::setup))
        .route("/budget/incomes", post(budget::income_new))
        .route("/budget/incomes/{id}", delete(budget::income_deactivate))
        .route("/budget/summary", get(budget::summary))
        .route(
            "/budget/categories",
            get(categories::list).post(categories::create),
        )
        .route("/budget/categories/statistics", get(categories::statistics))
        .route("/budget/transfer", post(categories::transfer))
        .route("/budget/expense", post(transactions::expense_new))
        .route("/budget/income", post(transactions::income_new))
        .route("/budget/transactions", get(transactions::list))
        .route("/goals", get(goals::list).post(goals::create))
        .route("/goals/statistics", get(goals::statistics))
        .route("/goals/transaction", post(goals::transaction_new))
        .route(
            "/goals/{id}",
            get(goals::get).put(goals::update).delete(goals::remove),
        )
        .route("/goals/{id}/complete", post(goals::complete))
        .route("/goals/{id}/transactions", get(goals::transactions))
        .route("/profile", get(profile::get).put(profile::update))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine, db)).await
}
