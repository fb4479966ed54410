use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::config::{MAX_BIO_LENGTH, MAX_NAME_LENGTH};
use crate::core::db::{AppState, Db};
use crate::core::errors::ApiError;
use crate::core::helpers::sanitize_text;
use crate::models::models::User;

pub fn create_user(db: &mut Db, name: &str, avatar: &str, bio: &str) -> Result<User, ApiError> {
    let name = sanitize_text(name.trim());
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ApiError::BadRequest("Name too long".to_string()));
    }
    let bio = sanitize_text(bio.trim());
    if bio.len() > MAX_BIO_LENGTH {
        return Err(ApiError::BadRequest("Bio too long".to_string()));
    }
    Ok(db.insert_user(name, avatar.trim().to_string(), bio))
}

pub fn delete_user(db: &mut Db, id: &str) -> Result<User, ApiError> {
    db.remove_user(id)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

// === HTTP Handlers ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let users = state.read(|db| Ok(db.users.clone()))?;
    Ok(HttpResponse::Ok().json(users))
}

pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let user = state.read(|db| {
        db.user(&user_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    })?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateBody>,
) -> Result<HttpResponse, ApiError> {
    let user = state.write(|db| create_user(db, &body.name, &body.avatar, &body.bio))?;
    info!(user = %user.id, "user created");
    Ok(HttpResponse::Created().json(user))
}

pub async fn remove(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let user = state.write(|db| delete_user(db, &user_id))?;
    info!(user = %user.id, "user deleted with cascade");
    Ok(HttpResponse::NoContent().finish())
}
