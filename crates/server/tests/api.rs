use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use engine::Engine;

struct TestApp {
    router: Router,
    db: DatabaseConnection,
}

async fn app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    TestApp {
        router: server::router(engine, db.clone()),
        db,
    }
}

/// Insert a user and a bearer token for them, return the raw token.
async fn user_with_token(db: &DatabaseConnection, name: &str) -> String {
    let id = Uuid::new_v4();
    let token = format!("token-{}", Uuid::new_v4());
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, name, email, initial_setup_completed, created_at) \
         VALUES (?, ?, ?, ?, ?)",
        vec![
            id.to_string().into(),
            name.into(),
            format!("{}@example.com", name.to_lowercase()).into(),
            false.into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO api_tokens (token_hash, user_id, label, created_at) VALUES (?, ?, ?, ?)",
        vec![
            server::token_digest(&token).into(),
            id.to_string().into(),
            "tests".into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();
    token
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn setup_body() -> Value {
    json!({
        "incomes": [{ "description": "Salary", "amount": 300000, "receive_day": 5 }],
        "categories": [
            { "name": "Groceries", "allocated_amount": 50000, "color": "#22C55E" },
            { "name": "Leisure", "allocated_amount": 20000, "color": "#3B82F6" }
        ]
    })
}

fn category_id(categories: &Value, name: &str) -> String {
    categories["categories"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == name)
        .and_then(|c| c["id"].as_str())
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn missing_or_unknown_token_is_unauthorized() {
    let app = app().await;

    let (status, _) = send(&app, "GET", "/budget", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/budget", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn budget_flow_end_to_end() {
    let app = app().await;
    let token = user_with_token(&app.db, "Ana").await;
    let token = Some(token.as_str());

    let (status, body) = send(&app, "GET", "/budget/setup-status", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_budget"], false);
    assert_eq!(body["setup_completed"], false);

    let (status, _) = send(&app, "GET", "/budget", token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", "/budget/setup", token, Some(setup_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["budget"]["total_income"], 300000);
    assert_eq!(body["budget"]["allocated_amount"], 70000);
    assert_eq!(body["budget"]["available_balance"], 230000);

    let (status, body) = send(&app, "GET", "/budget/setup-status", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_budget"], true);
    assert_eq!(body["setup_completed"], true);

    let (_, categories) = send(&app, "GET", "/budget/categories", token, None).await;
    let groceries = category_id(&categories, "Groceries");
    let leisure = category_id(&categories, "Leisure");

    let expense = json!({ "category_id": groceries, "amount": 12000, "description": "Market" });
    let (status, body) = send(&app, "POST", "/budget/expense", token, Some(expense)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["expense"]["transaction_type"], "expense");
    assert_eq!(body["expense"]["amount"], 12000);

    let too_much = json!({ "category_id": leisure, "amount": 25000, "description": "Concert" });
    let (status, body) = send(&app, "POST", "/budget/expense", token, Some(too_much)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "insufficient_funds");
    assert_eq!(body["available"], 20000);

    let transfer = json!({
        "from_category_id": groceries,
        "to_category_id": leisure,
        "amount": 10000,
        "description": "Rebalance"
    });
    let (status, body) = send(&app, "POST", "/budget/transfer", token, Some(transfer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["from_new_balance"], 28000);
    assert_eq!(body["to_new_balance"], 30000);

    let (status, body) = send(&app, "GET", "/budget", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["budget"]["available_balance"], 230000);

    let (status, body) = send(&app, "GET", "/budget/transactions", token, None).await;
    assert_eq!(status, StatusCode::OK);
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["category_name"], "Groceries");

    let (status, body) = send(&app, "GET", "/budget/summary", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_expenses"], 12000);
    assert_eq!(body["summary"]["transaction_count"], 1);

    let (status, body) = send(&app, "GET", "/budget/categories/statistics", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statistics"]["total_budgeted"], 70000);
    assert_eq!(body["statistics"]["total_spent"], 12000);
    assert_eq!(body["statistics"]["categories_count"], 2);
}

#[tokio::test]
async fn setup_twice_and_bad_input_map_to_error_codes() {
    let app = app().await;
    let token = user_with_token(&app.db, "Bia").await;
    let token = Some(token.as_str());

    let over_allocated = json!({
        "incomes": [{ "description": "Salary", "amount": 300000, "receive_day": 5 }],
        "categories": [{ "name": "Rent", "allocated_amount": 320000, "color": "#22C55E" }]
    });
    let (status, body) = send(&app, "POST", "/budget/setup", token, Some(over_allocated)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, _) = send(&app, "POST", "/budget/setup", token, Some(setup_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, "POST", "/budget/setup", token, Some(setup_body())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_state");
}

#[tokio::test]
async fn goals_flow_end_to_end() {
    let app = app().await;
    let token = user_with_token(&app.db, "Caio").await;
    let token = Some(token.as_str());

    let goal = json!({ "name": "Trip", "target_amount": 100000 });
    let (status, body) = send(&app, "POST", "/goals", token, Some(goal)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["goal"]["color"], "#EF4444");
    let goal_id = body["goal"]["id"].as_str().unwrap().to_string();

    let deposit = json!({ "goal_id": goal_id, "transaction_type": "deposit", "amount": 100000 });
    let (status, body) = send(&app, "POST", "/goals/transaction", token, Some(deposit)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["new_amount"], 100000);
    assert_eq!(body["completed"], true);
    assert_eq!(body["goal"]["progress"], 100.0);

    let again = json!({ "goal_id": goal_id, "transaction_type": "deposit", "amount": 100 });
    let (status, body) = send(&app, "POST", "/goals/transaction", token, Some(again)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_state");

    let uri = format!("/goals/{goal_id}/transactions");
    let (status, body) = send(&app, "GET", &uri, token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/goals/statistics", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statistics"]["completed_goals"], 1);
    assert_eq!(body["statistics"]["total_saved"], 100000);

    let uri = format!("/goals/{goal_id}");
    let (status, _) = send(&app, "DELETE", &uri, token, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &uri, token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_users_goal_is_not_found() {
    let app = app().await;
    let owner = user_with_token(&app.db, "Duda").await;
    let other = user_with_token(&app.db, "Enzo").await;

    let goal = json!({ "name": "Car", "target_amount": 500000 });
    let (_, body) = send(&app, "POST", "/goals", Some(&owner), Some(goal)).await;
    let uri = format!("/goals/{}", body["goal"]["id"].as_str().unwrap());

    let (status, body) = send(&app, "GET", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn goal_update_clears_plan_fields() {
    let app = app().await;
    let token = user_with_token(&app.db, "Gabi").await;
    let token = Some(token.as_str());

    let goal = json!({
        "name": "House",
        "target_amount": 5000000,
        "monthly_target": 50000,
        "target_date": "2031-12-01"
    });
    let (_, body) = send(&app, "POST", "/goals", token, Some(goal)).await;
    assert_eq!(body["goal"]["monthly_target"], 50000);
    let uri = format!("/goals/{}", body["goal"]["id"].as_str().unwrap());

    let clear = json!({ "clear_monthly_target": true, "clear_target_date": true });
    let (status, body) = send(&app, "PUT", &uri, token, Some(clear)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["goal"]["monthly_target"].is_null());
    assert!(body["goal"]["target_date"].is_null());
}

#[tokio::test]
async fn profile_can_be_read_and_updated() {
    let app = app().await;
    let token = user_with_token(&app.db, "Flora").await;
    let token = Some(token.as_str());

    let (status, body) = send(&app, "GET", "/profile", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["email"], "flora@example.com");

    let update = json!({ "name": "Flora Lima", "email": "  Flora.Lima@Example.com " });
    let (status, body) = send(&app, "PUT", "/profile", token, Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["name"], "Flora Lima");
    assert_eq!(body["profile"]["email"], "flora.lima@example.com");
}
