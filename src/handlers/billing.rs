// src/handlers/billing.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::VendorContext,
    models::billing::{
        Bill, BillEstimate, BillType, CreateBillPayload, Payment, UpdateBillPayload,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateQuery {
    pub customer_id: Uuid,
    pub bill_type: BillType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBillsQuery {
    pub customer_id: Option<Uuid>,
}

// GET /api/bills/estimate
#[utoipa::path(
    get,
    path = "/api/bills/estimate",
    tag = "Billing",
    params(
        ("customerId" = Uuid, Query, description = "Cliente a faturar"),
        ("billType" = BillType, Query, description = "regular ou random")
    ),
    responses(
        (status = 200, description = "Prévia da fatura (nada é gravado)", body = BillEstimate),
        (status = 404, description = "Cliente não encontrado"),
        (status = 422, description = "Cliente sem plano ou plano sem refeições")
    ),
    security(("api_jwt" = []))
)]
pub async fn estimate_bill(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Query(query): Query<EstimateQuery>,
) -> Result<impl IntoResponse, AppError> {
    let estimate = app_state
        .billing_service
        .estimate_bill(vendor.0, query.customer_id, query.bill_type)
        .await?;

    Ok((StatusCode::OK, Json(estimate)))
}

// POST /api/bills
#[utoipa::path(
    post,
    path = "/api/bills",
    tag = "Billing",
    request_body = CreateBillPayload,
    responses(
        (status = 201, description = "Fatura criada", body = Bill),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente ou plano não encontrado"),
        (status = 422, description = "Regra de negócio violada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bill(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Json(payload): Json<CreateBillPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let bill = app_state.billing_service.create_bill(vendor.0, &payload).await?;

    Ok((StatusCode::CREATED, Json(bill)))
}

// GET /api/bills
#[utoipa::path(
    get,
    path = "/api/bills",
    tag = "Billing",
    params(
        ("customerId" = Option<Uuid>, Query, description = "Filtra por cliente")
    ),
    responses(
        (status = 200, description = "Faturas do fornecedor, mais recentes primeiro", body = Vec<Bill>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_bills(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Query(query): Query<ListBillsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let bills = app_state
        .billing_service
        .list_bills(vendor.0, query.customer_id)
        .await?;

    Ok((StatusCode::OK, Json(bills)))
}

// GET /api/bills/{id}
#[utoipa::path(
    get,
    path = "/api/bills/{id}",
    tag = "Billing",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Fatura", body = Bill),
        (status = 404, description = "Fatura não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_bill(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Path(bill_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bill = app_state.billing_service.get_bill(vendor.0, bill_id).await?;

    Ok((StatusCode::OK, Json(bill)))
}

// PUT /api/bills/{id}
#[utoipa::path(
    put,
    path = "/api/bills/{id}",
    tag = "Billing",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    request_body = UpdateBillPayload,
    responses(
        (status = 200, description = "Pagamento registrado", body = Bill),
        (status = 404, description = "Fatura não encontrada"),
        (status = 409, description = "Saldo mudou desde que o formulário foi aberto"),
        (status = 422, description = "Valor pago maior que o total ou fatura fechada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_bill(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Path(bill_id): Path<Uuid>,
    Json(payload): Json<UpdateBillPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let bill = app_state
        .billing_service
        .update_bill(vendor.0, bill_id, &payload)
        .await?;

    Ok((StatusCode::OK, Json(bill)))
}

// POST /api/bills/{id}/refresh
#[utoipa::path(
    post,
    path = "/api/bills/{id}/refresh",
    tag = "Billing",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Fatura reconciliada com as entregas", body = Bill),
        (status = 404, description = "Fatura ou entregas não encontradas"),
        (status = 422, description = "Fatura avulsa não é reconciliável")
    ),
    security(("api_jwt" = []))
)]
pub async fn refresh_bill(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Path(bill_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bill = app_state.billing_service.refresh_bill(vendor.0, bill_id).await?;

    Ok((StatusCode::OK, Json(bill)))
}

// DELETE /api/bills/{id}
#[utoipa::path(
    delete,
    path = "/api/bills/{id}",
    tag = "Billing",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Fatura e pagamentos excluídos"),
        (status = 404, description = "Fatura não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bill(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Path(bill_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.billing_service.delete_bill(vendor.0, bill_id).await?;

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

// GET /api/bills/{id}/payments
#[utoipa::path(
    get,
    path = "/api/bills/{id}/payments",
    tag = "Billing",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Parcelas pagas, da mais antiga para a mais nova", body = Vec<Payment>),
        (status = 404, description = "Fatura não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Path(bill_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let payments = app_state.billing_service.list_payments(vendor.0, bill_id).await?;

    Ok((StatusCode::OK, Json(payments)))
}
