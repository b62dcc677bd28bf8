use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use skylane_core::{User, UserProfile};

use crate::error::AppError;
use crate::extract::CustomerClaims;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct SignupResponse {
    message: String,
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    message: String,
    access_token: String,
    user: UserProfile,
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate the payload
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Missing name, email, or password".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    // 2. Hash the password; the core only ever sees the opaque hash
    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

    // 3. Register (duplicate email surfaces as 409)
    let user = state
        .users
        .create(User::new(req.name.trim(), req.email.trim(), password_hash))
        .await?;

    tracing::info!(user = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".to_string(),
            user: UserProfile::from(&user),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Missing email or password".to_string(),
        ));
    }

    // Verify against the stored hash; unknown emails take the same path
    // out so the response does not reveal which half was wrong.
    let user = state.users.find_by_email(req.email.trim()).await;
    let verified = match &user {
        Some(user) => bcrypt::verify(&req.password, &user.password_hash).unwrap_or(false),
        None => false,
    };
    let user = match (user, verified) {
        (Some(user), true) => user,
        _ => return Err(AppError::Unauthorized("Invalid credentials".to_string())),
    };

    let claims = CustomerClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: "CUSTOMER".to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        access_token: token,
        user: UserProfile::from(&user),
    }))
}
