use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::config::MAX_CONTENT_LENGTH;
use crate::core::db::{AppState, Db};
use crate::core::errors::ApiError;
use crate::core::helpers::sanitize_text;
use crate::models::models::{Comment, CommentView};

/// Comments for one post, each joined with the commenting user's current
/// profile, oldest first (chronological reading order, the opposite of the
/// feed's newest-first default).
pub fn list_comments(db: &Db, post_id: &str) -> Result<Vec<CommentView>, ApiError> {
    if db.post(post_id).is_none() {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }
    let mut views: Vec<CommentView> = db
        .comments
        .iter()
        .filter(|c| c.post_id == post_id)
        .map(|c| CommentView {
            user: db.user(&c.user_id).cloned(),
            comment: c.clone(),
        })
        .collect();
    views.sort_by(|a, b| a.comment.created_at.cmp(&b.comment.created_at));
    Ok(views)
}

pub fn create_comment(
    db: &mut Db,
    post_id: &str,
    user_id: &str,
    text: &str,
) -> Result<Comment, ApiError> {
    if db.post(post_id).is_none() {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }
    if db.user(user_id).is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    let text = sanitize_text(text.trim());
    if text.is_empty() {
        return Err(ApiError::BadRequest("Text is required".to_string()));
    }
    if text.len() > MAX_CONTENT_LENGTH {
        return Err(ApiError::BadRequest("Text too long".to_string()));
    }
    Ok(db.insert_comment(post_id.to_string(), user_id.to_string(), text))
}

// === HTTP Handlers ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
}

pub async fn list(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();
    let comments = state.read(|db| list_comments(db, &post_id))?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn create(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CreateBody>,
) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();
    let comment = state.write(|db| create_comment(db, &post_id, &body.user_id, &body.text))?;
    info!(comment = %comment.id, post = %comment.post_id, "comment created");
    Ok(HttpResponse::Created().json(comment))
}
