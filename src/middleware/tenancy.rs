// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Claims};

// O fornecedor (tenant) da sessão. Vem do próprio token, nunca de um cabeçalho
// livre, então um usuário não consegue enxergar dados de outro fornecedor.
#[derive(Debug, Clone, Copy)]
pub struct VendorContext(pub Uuid);

impl<S> FromRequestParts<S> for VendorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .map(|claims| VendorContext(claims.vendor_id))
            .ok_or(AppError::InvalidToken)
    }
}
