// src/middleware/auth.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState};

// O middleware em si
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(token) = auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        let claims = app_state.auth_service.validate_token(token)?;

        // As claims ficam nos "extensions"; o VendorContext lê de lá
        request.extensions_mut().insert(claims);
        return Ok(next.run(request).await);
    }

    Err(AppError::InvalidToken)
}
