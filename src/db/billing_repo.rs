// src/db/billing_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::billing::{Bill, BillDetail, BillType, Payment, PaymentMode, PaymentStatus},
};

/// Campos de uma fatura nova; o número é atribuído na inserção.
#[derive(Debug, Clone)]
pub struct NewBill {
    pub customer_id: Uuid,
    pub bill_type: BillType,
    pub bill_date: NaiveDate,
    pub due_date: NaiveDate,
    pub bill_detail: BillDetail,
    pub total_amount: Decimal,
    pub remaining_amount: Decimal,
    pub discount: Decimal,
    pub payment_status: PaymentStatus,
    pub is_closed: bool,
    pub note: Option<String>,
}

#[derive(Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  FATURAS
    // =========================================================================

    /// Insere com `bill_no = max + 1` na mesma instrução.
    /// Duas criações simultâneas podem colidir no índice único (vendor_id, bill_no);
    /// quem chama decide se tenta de novo.
    pub async fn insert_bill<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        bill: &NewBill,
    ) -> Result<Bill, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Bill>(
            r#"
            INSERT INTO bills (
                vendor_id, customer_id, bill_no, bill_type, bill_date, due_date,
                bill_detail, total_amount, remaining_amount, discount,
                payment_status, is_closed, note
            )
            VALUES (
                $1, $2,
                (SELECT COALESCE(MAX(bill_no), 0) + 1 FROM bills WHERE vendor_id = $1),
                $3, $4, $5, $6, $7, $8, $9, $10, $11, $12
            )
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(bill.customer_id)
        .bind(bill.bill_type)
        .bind(bill.bill_date)
        .bind(bill.due_date)
        .bind(Json(&bill.bill_detail))
        .bind(bill.total_amount)
        .bind(bill.remaining_amount)
        .bind(bill.discount)
        .bind(bill.payment_status)
        .bind(bill.is_closed)
        .bind(bill.note.as_deref())
        .fetch_one(executor)
        .await
    }

    pub async fn find_bill(&self, vendor_id: Uuid, bill_id: Uuid) -> Result<Option<Bill>, AppError> {
        let bill = sqlx::query_as::<_, Bill>(
            "SELECT * FROM bills WHERE vendor_id = $1 AND id = $2",
        )
        .bind(vendor_id)
        .bind(bill_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bill)
    }

    /// Mesma busca, mas trava a linha até o fim da transação.
    pub async fn find_bill_for_update<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        bill_id: Uuid,
    ) -> Result<Option<Bill>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>(
            "SELECT * FROM bills WHERE vendor_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(vendor_id)
        .bind(bill_id)
        .fetch_optional(executor)
        .await?;

        Ok(bill)
    }

    pub async fn list_bills(
        &self,
        vendor_id: Uuid,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<Bill>, AppError> {
        let bills = sqlx::query_as::<_, Bill>(
            r#"
            SELECT * FROM bills
            WHERE vendor_id = $1 AND ($2::uuid IS NULL OR customer_id = $2)
            ORDER BY bill_date DESC, bill_no DESC
            "#,
        )
        .bind(vendor_id)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bills)
    }

    pub async fn update_payment_state<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        bill_id: Uuid,
        remaining_amount: Decimal,
        payment_status: PaymentStatus,
        is_closed: bool,
    ) -> Result<Bill, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            UPDATE bills
            SET remaining_amount = $3, payment_status = $4, is_closed = $5, updated_at = NOW()
            WHERE vendor_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(bill_id)
        .bind(remaining_amount)
        .bind(payment_status)
        .bind(is_closed)
        .fetch_one(executor)
        .await?;

        Ok(bill)
    }

    /// Grava o resultado da reconciliação numa única instrução.
    pub async fn update_reconciled<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        bill_id: Uuid,
        bill_detail: &BillDetail,
        total_amount: Decimal,
        remaining_amount: Decimal,
        is_closed: bool,
    ) -> Result<Bill, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            UPDATE bills
            SET bill_detail = $3, total_amount = $4, remaining_amount = $5,
                is_closed = $6, updated_at = NOW()
            WHERE vendor_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(bill_id)
        .bind(Json(bill_detail))
        .bind(total_amount)
        .bind(remaining_amount)
        .bind(is_closed)
        .fetch_one(executor)
        .await?;

        Ok(bill)
    }

    /// Remove a fatura (pagamentos caem em cascata) e devolve o cliente dono.
    pub async fn delete_bill<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        bill_id: Uuid,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM bills WHERE vendor_id = $1 AND id = $2 RETURNING customer_id",
        )
        .bind(vendor_id)
        .bind(bill_id)
        .fetch_optional(executor)
        .await?;

        Ok(customer_id)
    }

    /// `bill_date` da fatura mais recente que restou para o cliente.
    pub async fn latest_bill_date<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<NaiveDate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let date = sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT bill_date FROM bills
            WHERE vendor_id = $1 AND customer_id = $2
            ORDER BY bill_date DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(vendor_id)
        .bind(customer_id)
        .fetch_optional(executor)
        .await?;

        Ok(date)
    }

    // =========================================================================
    //  PAGAMENTOS (somente inserção)
    // =========================================================================

    pub async fn insert_payment<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        bill_id: Uuid,
        customer_id: Uuid,
        amount: Decimal,
        payment_date: NaiveDate,
        payment_mode: PaymentMode,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (vendor_id, bill_id, customer_id, amount, payment_date, payment_mode)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(bill_id)
        .bind(customer_id)
        .bind(amount)
        .bind(payment_date)
        .bind(payment_mode)
        .fetch_one(executor)
        .await?;

        Ok(payment)
    }

    pub async fn list_payments(&self, vendor_id: Uuid, bill_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT * FROM payments
            WHERE vendor_id = $1 AND bill_id = $2
            ORDER BY payment_date ASC, created_at ASC
            "#,
        )
        .bind(vendor_id)
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}
