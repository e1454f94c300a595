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
        .route("/store/:user_id/write/:category", post(handlers::write_message))
        .route("/myStore/:user_id/read/:post_id", get(handlers::read_message))
}
