/// User endpoints
///
/// There is no authentication; the frontend lists users so the person at
/// the keyboard can pick who they are.

use axum::{extract::State, Json};
use serde::Serialize;

use taskify_shared::models::user::User;

use crate::app::AppState;
use crate::error::ApiResult;

#[derive(Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UserListResponse>> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(UserListResponse { users }))
}
