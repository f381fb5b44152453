// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Os cards do topo do painel do fornecedor
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub active_customers: i64,
    pub open_bills: i64,
    #[schema(value_type = String, example = "18250.00")]
    pub outstanding_amount: Decimal, // Soma do saldo devedor das faturas abertas
    #[schema(value_type = String, example = "4200.00")]
    pub expenses_this_month: Decimal,
    #[schema(value_type = String, example = "9800.00")]
    pub collected_this_month: Decimal, // Pagamentos recebidos no mês corrente
}
