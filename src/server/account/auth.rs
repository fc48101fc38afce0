//! Email and password accounts.
//!
//! Login hands the user record back to the storefront, which keeps it
//! client-side. No session or token is issued.

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::{hash_password, verify_password};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{LoginRequest, LoginResponse, SignupRequest};
use crate::server::response::{ApiError, MessageResponse, StoreResultExt};
use crate::server::validation::{normalize_email, require, validate_email};
use crate::types::{NewUser, Role};

const EMAIL_TAKEN: &str = "Email already exists";

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> impl IntoResponse {
    let name = require(req.name, "Name is required")?;
    let email = validate_email(req.email)?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Password is required"))?;

    if state
        .store
        .get_user_by_email(&email)
        .api_err("Failed to check email")?
        .is_some()
    {
        return Err(ApiError::conflict(EMAIL_TAKEN));
    }

    let password_hash = hash_password(&password).api_err("Error creating user")?;

    let user = NewUser {
        name,
        email,
        password_hash,
        role: Role::Customer,
    };

    match state.store.create_user(&user) {
        Ok(id) => tracing::info!("Registered user {} ({})", id, user.email),
        Err(Error::AlreadyExists) => return Err(ApiError::conflict(EMAIL_TAKEN)),
        Err(e) => return Err(ApiError::from_store(e, "Error creating user")),
    }

    Ok::<_, ApiError>(MessageResponse::new("User registered successfully"))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let email = normalize_email(req.email)?;
    let password = req.password.unwrap_or_default();

    let user = state
        .store
        .get_user_by_email(&email)
        .api_err("Failed to look up user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !verify_password(&password, &user.password_hash) {
        tracing::info!("Failed login for user {}", user.id);
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    Ok::<_, ApiError>(Json(LoginResponse {
        message: "Login successful",
        user,
    }))
}
