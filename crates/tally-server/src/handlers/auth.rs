//! Identity-related handlers

use axum::{Extension, Json};
use serde::Serialize;

use crate::CurrentUser;
use tally_core::models::User;

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The user the request acts as
    pub user: User,
    /// How the user was authenticated
    pub auth_method: String,
}

/// GET /api/me - Get the currently authenticated user
pub async fn get_me(Extension(current): Extension<CurrentUser>) -> Json<MeResponse> {
    Json(MeResponse {
        auth_method: current.auth_method.as_str().to_string(),
        user: current.user,
    })
}
