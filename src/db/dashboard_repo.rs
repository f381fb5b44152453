// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::dashboard::DashboardSummary};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resumo do fornecedor; `month_start..=month_end` delimita o mês corrente.
    pub async fn get_summary(
        &self,
        vendor_id: Uuid,
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> Result<DashboardSummary, AppError> {
        // Snapshot consistente dos quatro números
        let mut tx = self.pool.begin().await?;

        // A. Clientes ativos
        let active_customers = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM customers WHERE vendor_id = $1 AND status = 'active'",
        )
        .bind(vendor_id)
        .fetch_one(&mut *tx)
        .await?;

        // B. Faturas abertas e saldo devedor
        let (open_bills, outstanding_amount) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(remaining_amount), 0)
            FROM bills
            WHERE vendor_id = $1 AND is_closed = FALSE
            "#,
        )
        .bind(vendor_id)
        .fetch_one(&mut *tx)
        .await?;

        // C. Despesas do mês
        let expenses_this_month = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM expenses
            WHERE vendor_id = $1 AND expense_date BETWEEN $2 AND $3
            "#,
        )
        .bind(vendor_id)
        .bind(month_start)
        .bind(month_end)
        .fetch_one(&mut *tx)
        .await?;

        // D. Recebido no mês
        let collected_this_month = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM payments
            WHERE vendor_id = $1 AND payment_date BETWEEN $2 AND $3
            "#,
        )
        .bind(vendor_id)
        .bind(month_start)
        .bind(month_end)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            active_customers,
            open_bills,
            outstanding_amount,
            expenses_this_month,
            collected_this_month,
        })
    }
}
