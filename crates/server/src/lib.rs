use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use auth::token_digest;
pub use server::{router, run_with_listener};

mod auth;
mod budget;
mod categories;
mod goals;
mod profile;
mod server;
mod transactions;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::InvalidState(_) | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    let code = err.code().to_string();
    let available = match &err {
        EngineError::InsufficientFunds { available, .. } => Some(available.cents()),
        _ => None,
    };
    let error = match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    };
    ErrorBody {
        error,
        code,
        available,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    code: "bad_request".to_string(),
                    available: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use engine::MoneyCents;
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::Validation(vec!["x".to_string()])).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_insufficient_funds_maps_to_422_with_available() {
        let err = EngineError::InsufficientFunds {
            available: MoneyCents::new(500_00),
            requested: MoneyCents::new(600_00),
        };
        assert_eq!(status_for_engine_error(&err), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_for_engine_error(err);
        assert_eq!(body.code, "insufficient_funds");
        assert_eq!(body.available, Some(500_00));
        assert!(body.error.contains("500.00"));
    }

    #[test]
    fn engine_state_and_conflict_map_to_409() {
        let res = ServerError::from(EngineError::InvalidState("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_are_hidden() {
        let err = EngineError::Database(DbErr::Custom("disk on fire".to_string()));
        assert_eq!(status_for_engine_error(&err), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_for_engine_error(err);
        assert_eq!(body.error, "internal server error");
        assert_eq!(body.code, "internal_error");
        assert_eq!(body.available, None);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
