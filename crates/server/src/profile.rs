//! Profile API endpoints.

use api_types::profile::{ProfileResponse, ProfileUpdate, ProfileView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, auth::AuthUser, server::ServerState};

fn map_profile(user: engine::User) -> ProfileResponse {
    ProfileResponse {
        profile: ProfileView {
            id: user.id,
            name: user.name,
            email: user.email,
            date_of_birth: user.date_of_birth,
            initial_setup_completed: user.initial_setup_completed,
            created_at: user.created_at,
        },
    }
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<ProfileResponse>, ServerError> {
    let profile = state.engine.profile(user.id).await?;
    Ok(Json(map_profile(profile)))
}

pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, ServerError> {
    let update = engine::ProfileUpdate {
        name: payload.name,
        email: payload.email,
        date_of_birth: payload.date_of_birth,
    };
    let profile = state.engine.update_profile(user.id, update).await?;
    Ok(Json(map_profile(profile)))
}
