use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    mailbox::{
        dto::{MemoView, WriteRequest, WrittenMemo},
        repo,
    },
    state::AppState,
    users::repo::User,
};

#[instrument(skip(state, payload))]
pub async fn write_message(
    State(state): State<AppState>,
    AuthUser(writer_id): AuthUser,
    Path((user_id, category)): Path<(i64, String)>,
    Json(payload): Json<WriteRequest>,
) -> Result<Response, ApiError> {
    if user_id == writer_id {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "cannot write a note to your own store" })),
        )
            .into_response());
    }

    let Some(content) = payload.content.filter(|c| !c.is_empty()) else {
        return Err(ApiError::Validation("content must be provided".into()));
    };

    if User::find_by_id(&state.db, user_id).await?.is_none() {
        warn!(user_id, "write to unknown user");
        return Ok((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "user not found" })),
        )
            .into_response());
    }

    // Normally provisioned at registration; first writes to older accounts
    // still go through this.
    repo::ensure_mailbox(&state.db, user_id).await?;
    let memo_id = repo::insert_message(&state.db, user_id, &content, writer_id, &category).await?;

    info!(owner_id = user_id, writer_id, memo_id, "note written");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": format!("{category} note written"),
            "data": WrittenMemo {
                memo_id,
                writer_id,
                content,
                choice_type: category,
            },
        })),
    )
        .into_response())
}

#[instrument(skip(state))]
pub async fn read_message(
    State(state): State<AppState>,
    Path((user_id, post_id)): Path<(i64, i64)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !repo::mailbox_exists(&state.db, user_id).await? {
        return Err(ApiError::NotFound(format!(
            "store for user {user_id} not found"
        )));
    }

    let Some(row) = repo::fetch_message(&state.db, user_id, post_id).await? else {
        return Err(ApiError::NotFound("note not found".into()));
    };

    Ok(Json(json!({
        "status": "success",
        "data": MemoView {
            post_id: row.memo_id,
            writer: row.writer_id,
            content: row.content,
            choice_type: row.choice_type,
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The self-write guard rejects before any pool access, so the handler can
    // run against the lazy fake state.
    async fn self_write(content: Option<&str>) -> Response {
        write_message(
            State(AppState::fake()),
            AuthUser(1),
            Path((1, "A".to_string())),
            Json(WriteRequest {
                content: content.map(str::to_string),
            }),
        )
        .await
        .expect("self-write short-circuits into a response")
    }

    #[tokio::test]
    async fn self_write_is_rejected() {
        let res = self_write(Some("hi")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn self_write_is_rejected_regardless_of_content() {
        for content in [Some(""), None] {
            let res = self_write(content).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND);
        }
    }
}
