use std::cmp::Ordering;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::config::MAX_CONTENT_LENGTH;
use crate::core::db::{AppState, Db};
use crate::core::errors::ApiError;
use crate::core::helpers::sanitize_text;
use crate::models::models::{Post, PostView};

pub fn create_post(db: &mut Db, user_id: &str, content: &str, image: &str) -> Result<Post, ApiError> {
    if user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId is required".to_string()));
    }
    let content = sanitize_text(content.trim());
    if content.is_empty() {
        return Err(ApiError::BadRequest("Content is required".to_string()));
    }
    if content.len() > MAX_CONTENT_LENGTH {
        return Err(ApiError::BadRequest("Content too long".to_string()));
    }
    if db.user(user_id).is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    Ok(db.insert_post(user_id.to_string(), content, image.trim().to_string()))
}

/// Like edges are unidirectional (post -> liking users), so the toggle only
/// touches the post's likes set.
pub fn toggle_like(db: &mut Db, post_id: &str, user_id: &str) -> Result<Post, ApiError> {
    if db.user(user_id).is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    let post = db
        .post_mut(post_id)
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
    if post.likes.iter().any(|l| l == user_id) {
        post.likes.retain(|l| l != user_id);
    } else {
        post.likes.push(user_id.to_string());
    }
    Ok(post.clone())
}

pub fn delete_post(db: &mut Db, post_id: &str) -> Result<Post, ApiError> {
    db.remove_post(post_id)
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))
}

/// Joins each selected post with its author's current profile and live
/// comment count, newest first. Ranking beyond that default is the view
/// layer's call, applied via Ranking.
pub fn enrich_posts(db: &Db, filter_user: Option<&str>) -> Vec<PostView> {
    let mut views: Vec<PostView> = db
        .posts
        .iter()
        .filter(|p| filter_user.map_or(true, |uid| p.user_id == uid))
        .map(|p| PostView {
            user: db.user(&p.user_id).cloned(),
            comment_count: db.comments.iter().filter(|c| c.post_id == p.id).count(),
            post: p.clone(),
        })
        .collect();
    views.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
    views
}

/// Feed orderings, each a tie-break chain ending in newest-first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ranking {
    Following,
    Featured,
    Popular,
}

impl Ranking {
    /// Unknown or absent names fall back to the default chronological feed.
    pub fn from_param(name: Option<&str>) -> Ranking {
        match name {
            Some("featured") => Ranking::Featured,
            Some("popular") => Ranking::Popular,
            _ => Ranking::Following,
        }
    }

    pub fn order(&self, a: &PostView, b: &PostView) -> Ordering {
        let newest = b.post.created_at.cmp(&a.post.created_at);
        match self {
            Ranking::Following => newest,
            Ranking::Featured => b.post.likes.len().cmp(&a.post.likes.len()).then(newest),
            Ranking::Popular => b
                .comment_count
                .cmp(&a.comment_count)
                .then(b.post.likes.len().cmp(&a.post.likes.len()))
                .then(newest),
        }
    }

    pub fn sort(&self, posts: &mut [PostView]) {
        posts.sort_by(|a, b| self.order(a, b));
    }
}

// === HTTP Handlers ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub sort: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeBody {
    #[serde(default)]
    pub user_id: String,
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let mut posts = state.read(|db| Ok(enrich_posts(db, query.user_id.as_deref())))?;
    Ranking::from_param(query.sort.as_deref()).sort(&mut posts);
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();
    let post = state.read(|db| {
        db.post(&post_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))
    })?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateBody>,
) -> Result<HttpResponse, ApiError> {
    let post = state.write(|db| create_post(db, &body.user_id, &body.content, &body.image))?;
    info!(post = %post.id, author = %post.user_id, "post created");
    Ok(HttpResponse::Created().json(post))
}

pub async fn like(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<LikeBody>,
) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();
    let post = state.write(|db| toggle_like(db, &post_id, &body.user_id))?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn remove(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();
    let post = state.write(|db| delete_post(db, &post_id))?;
    info!(post = %post.id, "post deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn db_with_posts() -> Db {
        // Three users, three posts spaced a minute apart so timestamps are
        // distinct. posts[0] is the oldest.
        let mut db = Db::default();
        for name in ["Ana", "Ben", "Cal"] {
            db.insert_user(name.to_string(), String::new(), String::new());
        }
        let ids: Vec<String> = db.users.iter().map(|u| u.id.clone()).collect();

        for (i, author) in ids.iter().enumerate() {
            let post = db.insert_post(author.clone(), format!("post {}", i), String::new());
            let ts = post.created_at - Duration::minutes((ids.len() - i) as i64);
            db.post_mut(&post.id).unwrap().created_at = ts;
        }
        db
    }

    #[test]
    fn fresh_post_starts_unliked_and_uncommented() {
        let mut db = Db::seed();
        db.posts.clear();
        db.comments.clear();
        let post = create_post(&mut db, "u1", "hello", "").unwrap();
        assert!(post.likes.is_empty());
        assert!(!post.id.is_empty());

        let views = enrich_posts(&db, None);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].comment_count, 0);
        assert_eq!(views[0].user.as_ref().unwrap().id, "u1");
    }

    #[test]
    fn create_post_validates_before_touching_the_snapshot() {
        let mut db = Db::seed();
        assert!(matches!(
            create_post(&mut db, "u1", "   ", ""),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            create_post(&mut db, "ghost", "hello", ""),
            Err(ApiError::NotFound(_))
        ));
        assert_eq!(db.posts.len(), 2);
    }

    #[test]
    fn like_toggle_parity() {
        let mut db = Db::seed();
        let liked: Vec<String> = db.post("p1").unwrap().likes.clone();

        // u1 likes own post: odd count of toggles leaves the like in place.
        toggle_like(&mut db, "p1", "u1").unwrap();
        assert!(db.post("p1").unwrap().likes.contains(&"u1".to_string()));

        toggle_like(&mut db, "p1", "u1").unwrap();
        toggle_like(&mut db, "p1", "u1").unwrap();
        assert!(db.post("p1").unwrap().likes.contains(&"u1".to_string()));

        // Back to even: original likes set restored.
        toggle_like(&mut db, "p1", "u1").unwrap();
        assert_eq!(db.post("p1").unwrap().likes, liked);
    }

    #[test]
    fn like_requires_existing_post_and_user() {
        let mut db = Db::seed();
        assert!(matches!(
            toggle_like(&mut db, "ghost", "u1"),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            toggle_like(&mut db, "p1", "ghost"),
            Err(ApiError::NotFound(_))
        ));
        assert_eq!(db.post("p1").unwrap().likes, vec!["u2".to_string()]);
    }

    #[test]
    fn enrich_filters_by_author_and_defaults_newest_first() {
        let db = db_with_posts();
        let all = enrich_posts(&db, None);
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].post.created_at >= w[1].post.created_at));

        let author = db.users[0].id.clone();
        let mine = enrich_posts(&db, Some(&author));
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].post.user_id, author);
    }

    #[test]
    fn author_profile_is_joined_at_read_time() {
        let mut db = Db::seed();
        db.user_mut("u1").unwrap().name = "Alexandra".to_string();
        let views = enrich_posts(&db, Some("u1"));
        assert_eq!(views[0].user.as_ref().unwrap().name, "Alexandra");
    }

    #[test]
    fn featured_ranks_by_likes_then_recency() {
        let mut db = db_with_posts();
        let ids: Vec<String> = db.users.iter().map(|u| u.id.clone()).collect();
        let oldest = db.posts[0].id.clone();
        for uid in &ids {
            toggle_like(&mut db, &oldest, uid).unwrap();
        }

        let mut views = enrich_posts(&db, None);
        Ranking::Featured.sort(&mut views);
        assert_eq!(views[0].post.id, oldest);
        // The remaining (zero-like) posts tie-break newest first.
        assert!(views[1].post.created_at > views[2].post.created_at);
    }

    #[test]
    fn popular_ranks_comments_over_likes_and_recency() {
        let mut db = db_with_posts();
        let ids: Vec<String> = db.users.iter().map(|u| u.id.clone()).collect();
        let oldest = db.posts[0].id.clone();
        let newest = db.posts[2].id.clone();

        // Newest post gets every like; oldest gets two comments.
        for uid in &ids {
            toggle_like(&mut db, &newest, uid).unwrap();
        }
        db.insert_comment(oldest.clone(), ids[1].clone(), "first".to_string());
        db.insert_comment(oldest.clone(), ids[2].clone(), "second".to_string());

        let mut views = enrich_posts(&db, None);
        Ranking::Popular.sort(&mut views);
        assert_eq!(views[0].post.id, oldest, "comment count dominates likes and recency");
        assert_eq!(views[1].post.id, newest, "likes break the zero-comment tie");
    }

    #[test]
    fn unknown_sort_names_fall_back_to_following() {
        assert_eq!(Ranking::from_param(Some("featured")), Ranking::Featured);
        assert_eq!(Ranking::from_param(Some("popular")), Ranking::Popular);
        assert_eq!(Ranking::from_param(Some("bogus")), Ranking::Following);
        assert_eq!(Ranking::from_param(None), Ranking::Following);
    }

    #[test]
    fn delete_post_missing_is_not_found() {
        let mut db = Db::seed();
        assert!(matches!(
            delete_post(&mut db, "ghost"),
            Err(ApiError::NotFound(_))
        ));
    }
}
