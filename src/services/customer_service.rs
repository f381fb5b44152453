// src/services/customer_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, money::money},
    db::CustomerRepository,
    models::customer::{Customer, CustomerStatus, Plan, PlanType},
};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // =========================================================================
    //  PLANOS
    // =========================================================================

    pub async fn create_plan(
        &self,
        vendor_id: Uuid,
        name: &str,
        meals: (bool, bool, bool),
        total_tiffins: i32,
        price_per_tiffin: Decimal,
    ) -> Result<Plan, AppError> {
        if !(meals.0 || meals.1 || meals.2) {
            return Err(AppError::business("O plano precisa incluir pelo menos uma refeição"));
        }

        let plan = self
            .repo
            .create_plan(vendor_id, name, meals, total_tiffins, money(price_per_tiffin))
            .await?;

        tracing::info!(vendor_id = %vendor_id, plan_id = %plan.id, "Plano criado");
        Ok(plan)
    }

    pub async fn list_plans(&self, vendor_id: Uuid) -> Result<Vec<Plan>, AppError> {
        self.repo.list_plans(vendor_id).await
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn create_customer(
        &self,
        vendor_id: Uuid,
        name: &str,
        phone: Option<&str>,
        address: Option<&str>,
        plan_id: Option<Uuid>,
        plan_type: PlanType,
    ) -> Result<Customer, AppError> {
        // Cliente de assinatura sem plano não consegue gerar fatura
        if plan_type == PlanType::Regular && plan_id.is_none() {
            return Err(AppError::business("Cliente de assinatura precisa de um plano"));
        }

        // O plano tem que ser do mesmo fornecedor
        if let Some(plan_id) = plan_id {
            self.repo
                .find_plan(&self.pool, vendor_id, plan_id)
                .await?
                .ok_or_else(|| AppError::not_found("Plano"))?;
        }

        let customer = self
            .repo
            .create_customer(vendor_id, name, phone, address, plan_id, plan_type)
            .await?;

        tracing::info!(vendor_id = %vendor_id, customer_id = %customer.id, "Cliente criado");
        Ok(customer)
    }

    pub async fn list_customers(
        &self,
        vendor_id: Uuid,
        status: Option<CustomerStatus>,
    ) -> Result<Vec<Customer>, AppError> {
        self.repo.list_customers(vendor_id, status).await
    }

    pub async fn get_customer(&self, vendor_id: Uuid, customer_id: Uuid) -> Result<Customer, AppError> {
        self.repo
            .find_customer(&self.pool, vendor_id, customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))
    }

    pub async fn update_customer_status(
        &self,
        vendor_id: Uuid,
        customer_id: Uuid,
        status: CustomerStatus,
    ) -> Result<Customer, AppError> {
        let customer = self
            .repo
            .update_status(vendor_id, customer_id, status)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;

        tracing::info!(customer_id = %customer_id, status = ?status, "Status do cliente alterado");
        Ok(customer)
    }
}
