//! Bearer token authentication.
//!
//! Tokens are issued outside of this service. Only their SHA-256 digest is
//! stored, in the `api_tokens` table.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use sea_orm::entity::prelude::*;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::server::ServerState;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "api_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub token_hash: String,
    pub user_id: String,
    pub label: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// The authenticated caller, inserted into the request extensions.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Lowercase hex SHA-256 of a raw token, as stored in `api_tokens`.
pub fn token_digest(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

pub async fn auth(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if bearer.token().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = Entity::find_by_id(token_digest(bearer.token()))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to look up api token: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let id = Uuid::parse_str(&token.user_id).map_err(|_| {
        tracing::error!("api token bound to a malformed user id");
        StatusCode::UNAUTHORIZED
    })?;

    request.extensions_mut().insert(AuthUser { id });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_lowercase_hex_sha256() {
        assert_eq!(
            token_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
