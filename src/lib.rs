pub mod comments;
pub mod config;
pub mod core;
pub mod follow;
pub mod models;
pub mod posts;
pub mod routes;
pub mod users;
