use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/register/quipuCheck", post(handlers::quipu_check))
        .route("/login", post(handlers::login))
        .route("/myStore/:user_id", get(handlers::my_store))
        .route("/store/:user_id", get(handlers::store))
        .route("/allStore", get(handlers::all_store))
}
