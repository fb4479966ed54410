use actix_web::web;

use crate::{comments, follow, posts, users};

/// API surface, one route per core operation.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/users", web::get().to(users::list))
            .route("/users", web::post().to(users::create))
            .route("/users/{id}", web::get().to(users::get))
            .route("/users/{id}", web::delete().to(users::remove))
            .route("/users/{id}/follow", web::post().to(follow::toggle))
            .route("/posts", web::get().to(posts::list))
            .route("/posts", web::post().to(posts::create))
            .route("/posts/{id}", web::get().to(posts::get))
            .route("/posts/{id}", web::delete().to(posts::remove))
            .route("/posts/{id}/like", web::post().to(posts::like))
            .route("/posts/{id}/comments", web::get().to(comments::list))
            .route("/posts/{id}/comments", web::post().to(comments::create)),
    );
}
