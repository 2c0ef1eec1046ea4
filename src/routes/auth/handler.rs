use axum::{extract::State, http::StatusCode, response::Json};

use crate::{
    AppState,
    database::models::DEFAULT_ROLE,
    error::{AppError, AppResult},
    routes::AppJson,
    utils::{generate_token, hash_password, verify_password},
};

use super::model::{
    LoginRequest, RegisterRequest, TokenResponse, UserResponse, normalize_email, validate_password,
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let email = normalize_email(&req.email)?;
    validate_password(&req.password)?;

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest("User already exists".into()));
    }

    let password = req.password;
    let hashed = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))?;

    let user = state.users.create(&email, &hashed, DEFAULT_ROLE).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let email = normalize_email(&req.email).map_err(|_| invalid())?;
    let Some(user) = state.users.find_by_email(&email).await? else {
        return Err(invalid());
    };

    let password = req.password;
    let hashed = user.hashed_password.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hashed))
        .await
        .map_err(|e| AppError::Internal(format!("password check task failed: {}", e)))?
        .unwrap_or(false);
    if !matches {
        return Err(invalid());
    }

    let (token, _) = generate_token(&user.id, &user.role, &state.config)
        .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))?;
    Ok(Json(TokenResponse::bearer(token)))
}
