// src/handlers/customers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::VendorContext,
    models::{
        billing::validate_not_negative,
        customer::{Customer, CustomerStatus, Plan, PlanType},
    },
};

// =============================================================================
//  ÁREA 1: PLANOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Almoço + Jantar (60)")]
    pub name: String,

    #[serde(default)]
    pub breakfast: bool,
    #[serde(default)]
    pub lunch: bool,
    #[serde(default)]
    pub dinner: bool,

    #[validate(range(min = 1, message = "O plano precisa de pelo menos 1 marmita"))]
    #[schema(example = 60)]
    pub total_tiffins: i32,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = String, example = "85.00")]
    pub price_per_tiffin: Decimal,
}

// POST /api/plans
#[utoipa::path(
    post,
    path = "/api/plans",
    tag = "Customers",
    request_body = CreatePlanPayload,
    responses(
        (status = 201, description = "Plano criado", body = Plan),
        (status = 400, description = "Dados inválidos"),
        (status = 422, description = "Plano sem nenhuma refeição")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_plan(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Json(payload): Json<CreatePlanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let plan = app_state
        .customer_service
        .create_plan(
            vendor.0,
            &payload.name,
            (payload.breakfast, payload.lunch, payload.dinner),
            payload.total_tiffins,
            payload.price_per_tiffin,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

// GET /api/plans
#[utoipa::path(
    get,
    path = "/api/plans",
    tag = "Customers",
    responses(
        (status = 200, description = "Planos do fornecedor", body = Vec<Plan>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_plans(
    State(app_state): State<AppState>,
    vendor: VendorContext,
) -> Result<impl IntoResponse, AppError> {
    let plans = app_state.customer_service.list_plans(vendor.0).await?;

    Ok((StatusCode::OK, Json(plans)))
}

// =============================================================================
//  ÁREA 2: CLIENTES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Ana Souza")]
    pub name: String,

    #[validate(length(max = 20, message = "Telefone muito longo"))]
    #[schema(example = "+91 98765 43210")]
    pub phone: Option<String>,

    pub address: Option<String>,

    pub plan_id: Option<Uuid>,

    pub plan_type: PlanType,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerStatusPayload {
    pub status: CustomerStatus,
}

#[derive(Debug, Deserialize)]
pub struct ListCustomersQuery {
    pub status: Option<CustomerStatus>,
}

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Customer),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Plano não encontrado"),
        (status = 422, description = "Cliente de assinatura sem plano")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state
        .customer_service
        .create_customer(
            vendor.0,
            &payload.name,
            payload.phone.as_deref(),
            payload.address.as_deref(),
            payload.plan_id,
            payload.plan_type,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    params(
        ("status" = Option<CustomerStatus>, Query, description = "Filtra por status")
    ),
    responses(
        (status = 200, description = "Clientes do fornecedor", body = Vec<Customer>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Query(query): Query<ListCustomersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state
        .customer_service
        .list_customers(vendor.0, query.status)
        .await?;

    Ok((StatusCode::OK, Json(customers)))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .customer_service
        .get_customer(vendor.0, customer_id)
        .await?;

    Ok((StatusCode::OK, Json(customer)))
}

// PATCH /api/customers/{id}/status
#[utoipa::path(
    patch,
    path = "/api/customers/{id}/status",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpdateCustomerStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer_status(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .customer_service
        .update_customer_status(vendor.0, customer_id, payload.status)
        .await?;

    Ok((StatusCode::OK, Json(customer)))
}
