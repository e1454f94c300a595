use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
    },
    error::ApiError,
    mailbox,
    state::AppState,
    users::{
        dto::{LoginRequest, LoginResponse, QuipuCheckRequest, RegisterRequest, StoreEntry, StoreProfile},
        repo::{self, User},
    },
};

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let (Some(name), Some(student_id), Some(password), Some(choice_type)) = (
        payload.name.filter(|v| !v.trim().is_empty()),
        payload.student_id.filter(|v| !v.trim().is_empty()),
        payload.password.filter(|v| !v.is_empty()),
        payload.choice_type.filter(|v| !v.trim().is_empty()),
    ) else {
        warn!("register with missing fields");
        return Err(ApiError::Validation(
            "all required fields must be provided".into(),
        ));
    };

    if !repo::roster_contains(&state.db, &student_id).await? {
        warn!(student_id = %student_id, "student ID absent from the Quipu roster");
        return Err(ApiError::Conflict(
            "student ID is not present in the Quipu roster".into(),
        ));
    }

    if User::find_by_student_id(&state.db, &student_id).await?.is_some() {
        warn!(student_id = %student_id, "student ID already registered");
        return Err(ApiError::Conflict("student ID is already registered".into()));
    }

    let hash = hash_password(&password)?;
    let nickname = repo::derive_nickname(&name);

    // The user insert and the mailbox DDL commit or roll back together.
    let mut tx = state.db.begin().await?;
    let user = User::create(
        &mut tx,
        &name,
        &student_id,
        &hash,
        &nickname,
        &choice_type,
        payload.topic.as_deref(),
    )
    .await?;
    mailbox::repo::ensure_mailbox(&mut *tx, user.id).await?;
    tx.commit().await?;

    info!(user_id = user.id, nickname = %user.nickname, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "registration complete" })),
    )
        .into_response())
}

#[instrument(skip(state, payload))]
pub async fn quipu_check(
    State(state): State<AppState>,
    Json(payload): Json<QuipuCheckRequest>,
) -> Result<Response, ApiError> {
    let Some(student_id) = payload.student_id.filter(|v| !v.trim().is_empty()) else {
        return Err(ApiError::Validation("student ID must be provided".into()));
    };

    if repo::roster_contains(&state.db, &student_id).await? {
        Ok((
            StatusCode::OK,
            Json(json!({ "exists": true, "message": "student ID exists" })),
        )
            .into_response())
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "exists": false, "message": "student ID does not exist" })),
        )
            .into_response())
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(student_id), Some(password)) = (
        payload.student_id.filter(|v| !v.trim().is_empty()),
        payload.password.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "all required fields must be provided".into(),
        ));
    };

    let Some(user) = User::find_by_student_id(&state.db, &student_id).await? else {
        warn!(student_id = %student_id, "login for unknown student ID");
        return Err(ApiError::Unauthorized("not a registered member".into()));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = user.id, "login with wrong password");
        return Err(ApiError::Unauthorized("password does not match".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Storage(e)
    })?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse {
        status: "success",
        message: "login successful",
        name: user.username,
        choice_type: user.choice_type,
        token,
    }))
}

/// 404 body for a missing profile, in the store endpoints' envelope.
fn user_not_found(user_id: i64) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "fail",
            "message": format!("User with ID {user_id} not found."),
            "data": null,
        })),
    )
        .into_response()
}

#[instrument(skip(state))]
pub async fn my_store(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Response, ApiError> {
    if caller_id != user_id {
        return Err(ApiError::Forbidden(
            "only the logged-in owner can view their own store".into(),
        ));
    }

    let Some(user) = User::find_by_id(&state.db, user_id).await? else {
        return Ok(user_not_found(user_id));
    };

    Ok(Json(json!({
        "status": "success",
        "message": format!("MyStore for userID {user_id}"),
        "data": StoreProfile {
            username: user.username,
            choice_type: user.choice_type,
        },
    }))
    .into_response())
}

#[instrument(skip(state))]
pub async fn store(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Response, ApiError> {
    let Some(user) = User::find_by_id(&state.db, user_id).await? else {
        return Ok(user_not_found(user_id));
    };

    Ok(Json(json!({
        "status": "success",
        "message": format!("Store for userID {user_id}"),
        "data": StoreProfile {
            username: user.username,
            choice_type: user.choice_type,
        },
    }))
    .into_response())
}

#[instrument(skip(state))]
pub async fn all_store(
    State(state): State<AppState>,
    AuthUser(_caller_id): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let users = User::list_all(&state.db).await?;
    if users.is_empty() {
        return Err(ApiError::NotFound("no users exist".into()));
    }

    let store_list: Vec<StoreEntry> = users
        .iter()
        .map(|u| StoreEntry {
            userid: u.id,
            username: u.username.clone(),
        })
        .collect();

    // Fewer than two users means the sample is just everyone.
    let random_users: Vec<StoreEntry> = repo::sample_users(&users, 2)
        .into_iter()
        .map(|u| StoreEntry {
            userid: u.id,
            username: u.username.clone(),
        })
        .collect();

    Ok(Json(json!({
        "status": "success",
        "data": {
            "store_list": store_list,
            "random_users": random_users,
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_user_renders_fail_with_null_data() {
        let res = user_not_found(7);
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "User with ID 7 not found.");
        assert!(body["data"].is_null());
    }
}
