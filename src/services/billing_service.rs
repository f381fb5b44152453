// src/services/billing_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Acquire, PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{calendar::MonthYear, error::AppError},
    db::{billing_repo::NewBill, AttendanceRepository, BillingRepository, CustomerRepository},
    models::{
        billing::{
            Bill, BillDetail, BillEstimate, BillType, CreateBillPayload, Payment, PaymentStatus,
            UpdateBillPayload,
        },
        customer::{Customer, Plan, PlanType},
    },
    services::billing_rules,
};

/// Tentativas de inserção quando duas faturas disputam o mesmo `bill_no`.
const BILL_NO_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct BillingService {
    billing_repo: BillingRepository,
    customer_repo: CustomerRepository,
    attendance_repo: AttendanceRepository,
    pool: PgPool,
}

impl BillingService {
    pub fn new(
        billing_repo: BillingRepository,
        customer_repo: CustomerRepository,
        attendance_repo: AttendanceRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            billing_repo,
            customer_repo,
            attendance_repo,
            pool,
        }
    }

    // =========================================================================
    //  ESTIMATIVA
    // =========================================================================

    pub async fn estimate_bill(
        &self,
        vendor_id: Uuid,
        customer_id: Uuid,
        bill_type: BillType,
    ) -> Result<BillEstimate, AppError> {
        let customer = self
            .customer_repo
            .find_customer(&self.pool, vendor_id, customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;

        let plan = match customer.plan_id {
            Some(plan_id) => self.customer_repo.find_plan(&self.pool, vendor_id, plan_id).await?,
            None => None,
        };

        billing_rules::estimate(&customer, plan.as_ref(), bill_type, Utc::now().date_naive())
    }

    // =========================================================================
    //  GERAÇÃO
    // =========================================================================

    /// Cria a fatura, o pagamento inicial (se houver) e atualiza o
    /// `last_bill_date` do cliente, tudo numa transação.
    pub async fn create_bill(
        &self,
        vendor_id: Uuid,
        payload: &CreateBillPayload,
    ) -> Result<Bill, AppError> {
        let amount_paid = payload.amount_paid.unwrap_or(Decimal::ZERO);
        let discount = payload.discount.unwrap_or(Decimal::ZERO);

        // 1. Validação que não depende do banco
        let itemized = match payload.bill_type {
            BillType::Regular => {
                if payload.start_date.is_none() || payload.end_date.is_none() {
                    return Err(AppError::bad_request(
                        "Fatura de assinatura exige startDate e endDate",
                    ));
                }
                None
            }
            BillType::Random => {
                let items = payload.items.as_deref().unwrap_or_default();
                Some(billing_rules::itemized_detail(items)?)
            }
        };

        let mut tx = self.pool.begin().await?;

        // 2. Cliente (e plano, se for assinatura)
        let customer = self
            .customer_repo
            .find_customer(&mut *tx, vendor_id, payload.customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;

        let (detail, total_amount, last_bill_date) = match itemized {
            Some((detail, total)) => (BillDetail::Itemized(detail), total, payload.bill_date),
            None => {
                let plan = self.plan_for_regular_bill(&mut *tx, vendor_id, &customer).await?;
                // datas já conferidas no passo 1
                let (start_date, end_date) = match (payload.start_date, payload.end_date) {
                    (Some(start), Some(end)) => (start, end),
                    _ => return Err(AppError::bad_request("Fatura de assinatura exige startDate e endDate")),
                };
                let (detail, total) = billing_rules::regular_detail(&plan, start_date, end_date)?;
                (BillDetail::Regular(detail), total, end_date)
            }
        };

        // 3. Saldo e status
        let remaining_amount = billing_rules::opening_balance(total_amount, amount_paid, discount)?;
        let bill_type = detail.bill_type();
        let (payment_status, is_closed) = match bill_type {
            // Assinatura é sempre cobrada adiantado: o consumo ainda não aconteceu
            BillType::Regular => (PaymentStatus::Advance, false),
            BillType::Random => (
                billing_rules::payment_status(total_amount, remaining_amount),
                remaining_amount <= Decimal::ZERO,
            ),
        };

        let new_bill = NewBill {
            customer_id: customer.id,
            bill_type,
            bill_date: payload.bill_date,
            due_date: payload.due_date,
            bill_detail: detail,
            total_amount,
            remaining_amount,
            discount,
            payment_status,
            is_closed,
            note: payload.note.clone(),
        };

        // 4. Fatura + pagamento + cliente
        let bill = self.insert_with_bill_no(&mut *tx, vendor_id, &new_bill).await?;

        if amount_paid > Decimal::ZERO {
            self.billing_repo
                .insert_payment(
                    &mut *tx,
                    vendor_id,
                    bill.id,
                    customer.id,
                    amount_paid,
                    payload.payment_date.unwrap_or(payload.bill_date),
                    payload.payment_mode,
                )
                .await?;
        }

        self.customer_repo
            .set_last_bill_date(&mut *tx, vendor_id, customer.id, Some(last_bill_date))
            .await?;

        tx.commit().await?;

        tracing::info!(
            vendor_id = %vendor_id,
            bill_id = %bill.id,
            bill_no = bill.bill_no,
            total = %bill.total_amount,
            "🧾 Fatura criada"
        );
        Ok(bill)
    }

    async fn plan_for_regular_bill(
        &self,
        conn: &mut PgConnection,
        vendor_id: Uuid,
        customer: &Customer,
    ) -> Result<Plan, AppError> {
        if customer.plan_type != PlanType::Regular {
            return Err(AppError::business(format!(
                "Cliente '{}' é avulso e não pode receber fatura de assinatura",
                customer.name
            )));
        }
        let plan_id = customer.plan_id.ok_or_else(|| {
            AppError::business(format!("Cliente '{}' não possui plano vinculado", customer.name))
        })?;

        self.customer_repo
            .find_plan(&mut *conn, vendor_id, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Plano"))
    }

    /// `bill_no = max + 1` por fornecedor. Cada tentativa roda num savepoint
    /// para que uma colisão no índice único não derrube a transação inteira.
    async fn insert_with_bill_no(
        &self,
        conn: &mut PgConnection,
        vendor_id: Uuid,
        bill: &NewBill,
    ) -> Result<Bill, AppError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut savepoint = (&mut *conn).begin().await?;

            match self.billing_repo.insert_bill(&mut *savepoint, vendor_id, bill).await {
                Ok(created) => {
                    savepoint.commit().await?;
                    return Ok(created);
                }
                Err(e) if is_unique_violation(&e) && attempt < BILL_NO_ATTEMPTS => {
                    savepoint.rollback().await?;
                    tracing::warn!(vendor_id = %vendor_id, attempt, "Colisão de bill_no, tentando de novo");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    // =========================================================================
    //  PAGAMENTO
    // =========================================================================

    pub async fn update_bill(
        &self,
        vendor_id: Uuid,
        bill_id: Uuid,
        payload: &UpdateBillPayload,
    ) -> Result<Bill, AppError> {
        let mut tx = self.pool.begin().await?;

        let bill = self
            .billing_repo
            .find_bill_for_update(&mut *tx, vendor_id, bill_id)
            .await?
            .ok_or_else(|| AppError::not_found("Fatura"))?;

        if let Some(expected) = payload.remaining_amount {
            if expected != bill.remaining_amount {
                return Err(AppError::Conflict(format!(
                    "O saldo da fatura mudou ({} → {}); recarregue antes de registrar o pagamento",
                    expected, bill.remaining_amount
                )));
            }
        }

        let outcome = billing_rules::apply_payment(
            bill.bill_type,
            bill.total_amount,
            bill.remaining_amount,
            bill.is_closed,
            payload.amount_paid,
        )?;

        let updated = self
            .billing_repo
            .update_payment_state(
                &mut *tx,
                vendor_id,
                bill.id,
                outcome.remaining_amount,
                outcome.payment_status,
                outcome.is_closed,
            )
            .await?;

        self.billing_repo
            .insert_payment(
                &mut *tx,
                vendor_id,
                bill.id,
                bill.customer_id,
                payload.amount_paid,
                payload.payment_date,
                payload.payment_mode,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            bill_id = %bill.id,
            paid = %payload.amount_paid,
            remaining = %updated.remaining_amount,
            "💰 Pagamento registrado"
        );
        Ok(updated)
    }

    // =========================================================================
    //  RECONCILIAÇÃO
    // =========================================================================

    pub async fn refresh_bill(&self, vendor_id: Uuid, bill_id: Uuid) -> Result<Bill, AppError> {
        let mut tx = self.pool.begin().await?;

        let bill = self
            .billing_repo
            .find_bill_for_update(&mut *tx, vendor_id, bill_id)
            .await?
            .ok_or_else(|| AppError::not_found("Fatura"))?;

        let detail = match &bill.bill_detail.0 {
            BillDetail::Regular(detail) => detail.clone(),
            BillDetail::Itemized(_) => {
                return Err(AppError::business(
                    "Somente faturas de assinatura podem ser reconciliadas",
                ))
            }
        };

        let months = MonthYear::span(detail.start_date, detail.end_date);
        let deliveries = self
            .attendance_repo
            .deliveries_for_months(&mut *tx, vendor_id, bill.customer_id, &months)
            .await?;
        if deliveries.is_empty() {
            return Err(AppError::not_found("Entregas do período da fatura"));
        }

        let result = billing_rules::reconcile(
            &detail,
            bill.total_amount,
            bill.remaining_amount,
            &deliveries,
        )?;

        let updated = self
            .billing_repo
            .update_reconciled(
                &mut *tx,
                vendor_id,
                bill.id,
                &BillDetail::Regular(result.detail),
                result.total_amount,
                result.remaining_amount,
                result.is_closed,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            bill_id = %bill.id,
            months = months.len(),
            total = %updated.total_amount,
            closed = updated.is_closed,
            "🔄 Fatura reconciliada"
        );
        Ok(updated)
    }

    // =========================================================================
    //  EXCLUSÃO E CONSULTAS
    // =========================================================================

    pub async fn delete_bill(&self, vendor_id: Uuid, bill_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let customer_id = self
            .billing_repo
            .delete_bill(&mut *tx, vendor_id, bill_id)
            .await?
            .ok_or_else(|| AppError::not_found("Fatura"))?;

        let last_bill_date = self
            .billing_repo
            .latest_bill_date(&mut *tx, vendor_id, customer_id)
            .await?;

        self.customer_repo
            .set_last_bill_date(&mut *tx, vendor_id, customer_id, last_bill_date)
            .await?;

        tx.commit().await?;

        tracing::info!(bill_id = %bill_id, customer_id = %customer_id, "🗑️ Fatura excluída");
        Ok(())
    }

    pub async fn get_bill(&self, vendor_id: Uuid, bill_id: Uuid) -> Result<Bill, AppError> {
        self.billing_repo
            .find_bill(vendor_id, bill_id)
            .await?
            .ok_or_else(|| AppError::not_found("Fatura"))
    }

    pub async fn list_bills(
        &self,
        vendor_id: Uuid,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<Bill>, AppError> {
        self.billing_repo.list_bills(vendor_id, customer_id).await
    }

    pub async fn list_payments(&self, vendor_id: Uuid, bill_id: Uuid) -> Result<Vec<Payment>, AppError> {
        // 404 em vez de lista vazia quando a fatura não é deste fornecedor
        self.get_bill(vendor_id, bill_id).await?;
        self.billing_repo.list_payments(vendor_id, bill_id).await
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}
