use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::core::db::{AppState, Db};
use crate::core::errors::ApiError;
use crate::models::models::User;

/// Symmetric follow toggle. The edge is stored on both endpoints
/// (target.followers and follower.following) and must stay in sync, so both
/// sides are updated in one pass. Presence in target.followers decides the
/// direction of the toggle.
pub fn toggle_follow(db: &mut Db, target_id: &str, follower_id: &str) -> Result<(User, User), ApiError> {
    if target_id == follower_id {
        return Err(ApiError::BadRequest("Cannot follow yourself".to_string()));
    }

    let already = db
        .user(target_id)
        .map(|u| u.followers.iter().any(|f| f == follower_id))
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    if db.user(follower_id).is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    if let Some(target) = db.user_mut(target_id) {
        if already {
            target.followers.retain(|f| f != follower_id);
        } else {
            target.followers.push(follower_id.to_string());
        }
    }
    if let Some(follower) = db.user_mut(follower_id) {
        if already {
            follower.following.retain(|f| f != target_id);
        } else if !follower.following.iter().any(|f| f == target_id) {
            // Guarded push: repairs a one-sided edge instead of doubling it.
            follower.following.push(target_id.to_string());
        }
    }

    let target = db
        .user(target_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let follower = db
        .user(follower_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok((target, follower))
}

// === HTTP Handlers ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowBody {
    #[serde(default)]
    pub follower_id: String,
}

pub async fn toggle(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<FollowBody>,
) -> Result<HttpResponse, ApiError> {
    let target_id = path.into_inner();
    let (target, follower) = state.write(|db| toggle_follow(db, &target_id, &body.follower_id))?;
    info!(target = %target.id, follower = %follower.id, "follow toggled");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "target": target,
        "follower": follower,
    })))
}
